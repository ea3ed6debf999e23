use crate::core::ledger::ExpenseLedger;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

const MONTHS_SHOWN: usize = 6;
const TOP_PARTNERS: usize = 5;
const SPENDING_SWING_PCT: f64 = 20.0;
const DOMINANT_CATEGORY_PCT: f64 = 50.0;
const HIGH_AVERAGE_EXPENSE: f64 = 1000.0;
const UNCATEGORISED: &str = "other";

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MonthlySpending {
    /// `YYYY-MM`
    pub month: String,
    pub amount: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CategorySpending {
    pub category: String,
    pub amount: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PartnerSummary {
    pub user_id: String,
    pub name: String,
    pub count: usize,
    pub amount: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Positive,
    Warning,
    Info,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AnalyticsSummary {
    pub total_expenses: f64,
    pub expense_count: usize,
    pub avg_expense_amount: f64,
    pub monthly_spending: Vec<MonthlySpending>,
    pub category_breakdown: Vec<CategorySpending>,
    pub top_partners: Vec<PartnerSummary>,
    pub settlement_ratio: f64,
    pub insights: Vec<Insight>,
}

impl Insight {
    fn new(kind: InsightKind, message: String) -> Self {
        Insight { kind, message }
    }
}

/// Spending analytics over every expense `user_id` bought or shares.
pub fn summarize(user_id: &str, ledgers: &[ExpenseLedger], names: &HashMap<String, String>) -> AnalyticsSummary {
    let ledgers: Vec<&ExpenseLedger> = ledgers.iter().filter(|l| l.involves(user_id)).collect();
    if ledgers.is_empty() {
        return AnalyticsSummary {
            total_expenses: 0.0,
            expense_count: 0,
            avg_expense_amount: 0.0,
            monthly_spending: Vec::new(),
            category_breakdown: Vec::new(),
            top_partners: Vec::new(),
            settlement_ratio: 0.0,
            insights: vec![Insight::new(
                InsightKind::Info,
                "No expenses found. Start adding expenses to see insights!".to_string(),
            )],
        };
    }

    let total_expenses: f64 = ledgers.iter().map(|l| l.expense.amount).sum();
    let expense_count = ledgers.len();
    let avg_expense_amount = total_expenses / expense_count as f64;

    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
    let mut by_category: HashMap<String, f64> = HashMap::new();
    let mut partners: HashMap<String, PartnerSummary> = HashMap::new();
    let mut legs = 0usize;
    let mut settled_legs = 0usize;

    for ledger in &ledgers {
        let expense = &ledger.expense;
        *by_month
            .entry(expense.created_at.format("%Y-%m").to_string())
            .or_insert(0.0) += expense.amount;
        let category = expense
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| UNCATEGORISED.to_string());
        *by_category.entry(category).or_insert(0.0) += expense.amount;

        let share = ledger.share();
        let others = std::iter::once(expense.buyer_id.as_str())
            .chain(ledger.participants.iter().map(|p| p.participant_id.as_str()))
            .filter(|id| *id != user_id);
        for other in others {
            let partner = partners.entry(other.to_string()).or_insert_with(|| PartnerSummary {
                user_id: other.to_string(),
                name: names.get(other).cloned().unwrap_or_else(|| "Unknown".to_string()),
                count: 0,
                amount: 0.0,
            });
            partner.count += 1;
            partner.amount += share;
        }

        legs += ledger.participants.len();
        settled_legs += ledger.settled_count();
    }

    let skip = by_month.len().saturating_sub(MONTHS_SHOWN);
    let monthly_spending: Vec<MonthlySpending> = by_month
        .into_iter()
        .skip(skip)
        .map(|(month, amount)| MonthlySpending { month, amount })
        .collect();

    let mut category_breakdown: Vec<CategorySpending> = by_category
        .into_iter()
        .map(|(category, amount)| CategorySpending { category, amount })
        .collect();
    category_breakdown.sort_by(|a, b| b.amount.total_cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));

    let mut top_partners: Vec<PartnerSummary> = partners.into_values().collect();
    top_partners.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.user_id.cmp(&b.user_id)));
    top_partners.truncate(TOP_PARTNERS);

    let settlement_ratio = if legs == 0 {
        0.0
    } else {
        settled_legs as f64 / legs as f64
    };

    let insights = insights(
        &monthly_spending,
        &category_breakdown,
        &top_partners,
        total_expenses,
        avg_expense_amount,
    );

    AnalyticsSummary {
        total_expenses,
        expense_count,
        avg_expense_amount,
        monthly_spending,
        category_breakdown,
        top_partners,
        settlement_ratio,
        insights,
    }
}

fn insights(
    monthly: &[MonthlySpending],
    categories: &[CategorySpending],
    partners: &[PartnerSummary],
    total: f64,
    average: f64,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let [.., previous, last] = monthly {
        if previous.amount > 0.0 {
            let change = (last.amount - previous.amount) / previous.amount * 100.0;
            if change > SPENDING_SWING_PCT {
                insights.push(Insight::new(
                    InsightKind::Warning,
                    format!("Your spending increased by {:.0}% last month", change),
                ));
            } else if change < -SPENDING_SWING_PCT {
                insights.push(Insight::new(
                    InsightKind::Positive,
                    format!("Great! You reduced spending by {:.0}% last month", change.abs()),
                ));
            }
        }
    }

    if let Some(top) = categories.first() {
        let pct = top.amount / total * 100.0;
        if pct > DOMINANT_CATEGORY_PCT {
            insights.push(Insight::new(
                InsightKind::Info,
                format!("{} accounts for {:.0}% of your expenses", top.category, pct),
            ));
        }
    }

    if average > HIGH_AVERAGE_EXPENSE {
        insights.push(Insight::new(
            InsightKind::Info,
            format!("Your average expense is {:.0}", average),
        ));
    }

    if let Some(partner) = partners.first() {
        insights.push(Insight::new(
            InsightKind::Positive,
            format!(
                "You split most expenses with {} ({} expenses)",
                partner.name, partner.count
            ),
        ));
    }

    if insights.is_empty() {
        insights.push(Insight::new(
            InsightKind::Info,
            "Looking good! Keep tracking your expenses for more insights.".to_string(),
        ));
    }
    insights
}
