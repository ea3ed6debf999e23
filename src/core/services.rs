use crate::auth::jwt::{Claims, JwtService};
use crate::config::Config;
use crate::constants::{
    COMPLETE_SETTLEMENT_RECORDED, EXPENSE_CREATED, INDIVIDUAL_SETTLEMENT_RECORDED, MAX_EXPENSE_AMOUNT,
    MAX_NAME_LENGTH, MAX_TITLE_LENGTH, MAX_UPI_LENGTH, PAYMENT_REMINDER_SENT, PROFILE_SAVED,
};
use crate::core::analytics::{self, AnalyticsSummary};
use crate::core::errors::{FieldError, RoomsplitError};
use crate::core::history::{self, HistoryFilter, SettledExpense, SettlementRecord};
use crate::core::ledger::{self, ExpenseLedger};
use crate::core::models::{
    audit::AppLog,
    balance::{Balance, BalanceDirection},
    expense::{Category, Expense, ExpenseStatus},
    notification::{Notification, NotificationPayload, NotificationType},
    participant::ExpenseParty,
    profile::Profile,
    settlement::{ExpenseShare, Settlement, SettlementType},
};
use crate::core::payment::PaymentIntent;
use crate::infrastructure::cache::Cache;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::notifications::Notifier;
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub jwt_secret: String,
    pub balance_cache_ttl: Duration,
    pub currency: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            jwt_secret: "secret".to_string(),
            balance_cache_ttl: Duration::from_secs(300),
            currency: "INR".to_string(),
        }
    }
}

impl From<&Config> for ServiceConfig {
    fn from(config: &Config) -> Self {
        ServiceConfig {
            jwt_secret: config.jwt_secret.clone(),
            balance_cache_ttl: config.balance_cache_ttl,
            currency: config.currency.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct NewExpense {
    pub title: String,
    pub amount: f64,
    pub category: Option<Category>,
    /// May include the buyer; duplicates are ignored.
    pub participant_ids: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ExpenseSummary {
    pub expense: Expense,
    pub buyer_name: String,
    pub total_participants: usize,
    pub share: f64,
    pub status: ExpenseStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ExpenseDetails {
    pub expense: Expense,
    pub buyer_name: String,
    pub total_participants: usize,
    pub share: f64,
    pub parties: Vec<ExpenseParty>,
    pub settlements: Vec<Settlement>,
    pub status: ExpenseStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CompleteSettlementRequest {
    pub counterparty_id: String,
    pub expense_details: Vec<ExpenseShare>,
    /// Positive when the caller owes the counterparty.
    pub net_amount: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CompleteSettlementReceipt {
    pub settlement: Settlement,
    /// UPI deep link, present when the caller is the paying side.
    pub payment_link: Option<String>,
}

pub struct RoomsplitService<L: LoggingService, S: Storage, C: Cache, N: Notifier> {
    storage: S,
    logging: L,
    cache: C,
    notifier: N,
    jwt_service: JwtService,
    config: ServiceConfig,
}

impl<L: LoggingService, S: Storage, C: Cache, N: Notifier> RoomsplitService<L, S, C, N> {
    pub fn new(storage: S, logging: L, cache: C, notifier: N, config: ServiceConfig) -> Self {
        RoomsplitService {
            storage,
            logging,
            cache,
            notifier,
            jwt_service: JwtService::new(config.jwt_secret.clone()),
            config,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, RoomsplitError> {
        self.jwt_service.validate_token(token)
    }

    pub fn issue_token(&self, user_id: &str) -> Result<String, RoomsplitError> {
        self.jwt_service.generate_token(user_id, chrono::Duration::hours(1))
    }

    async fn require_profile(&self, user_id: &str) -> Result<Profile, RoomsplitError> {
        self.storage
            .get_profile(user_id)
            .await?
            .ok_or_else(|| RoomsplitError::ProfileNotFound(user_id.to_string()))
    }

    async fn require_expense(&self, expense_id: &str) -> Result<Expense, RoomsplitError> {
        self.storage
            .get_expense(expense_id)
            .await?
            .ok_or_else(|| RoomsplitError::ExpenseNotFound(expense_id.to_string()))
    }

    async fn profile_names(&self) -> Result<HashMap<String, String>, RoomsplitError> {
        Ok(self
            .storage
            .list_profiles()
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect())
    }

    // The ledger write has already happened; the action log must not turn it into a failure.
    async fn record_action(&self, action: &str, details: serde_json::Value, user_id: &str) {
        if let Err(e) = self.logging.log_action(action, details, Some(user_id)).await {
            warn!(action, user_id, error = %e, "failed to record action");
        }
    }

    async fn dispatch(
        &self,
        notification_type: NotificationType,
        recipient_id: &str,
        sender_id: &str,
        payload: NotificationPayload,
    ) {
        if let Err(e) = self
            .notifier
            .notify(notification_type, recipient_id, sender_id, payload)
            .await
        {
            warn!(?notification_type, recipient_id, error = %e, "notification dropped");
        }
    }

    async fn invalidate_balances(&self, user_ids: &[&str]) {
        if let Err(e) = self.cache.invalidate_user_balances(user_ids).await {
            warn!(?user_ids, error = %e, "failed to invalidate cached balances");
        }
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), RoomsplitError> {
        if value.trim().is_empty() {
            return Err(RoomsplitError::InvalidInput(
                field.to_string(),
                FieldError::new(field, format!("Invalid {}", field), format!("{} cannot be empty", field)),
            ));
        }
        if value.chars().count() > max_length {
            return Err(RoomsplitError::InvalidInput(
                field.to_string(),
                FieldError::new(
                    field,
                    format!("{} Too Long", field),
                    format!("{} cannot exceed {} characters", field, max_length),
                ),
            ));
        }
        if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
            return Err(RoomsplitError::InvalidInput(
                field.to_string(),
                FieldError::new(
                    field,
                    format!("Invalid {}", field),
                    format!("{} contains invalid characters", field),
                ),
            ));
        }
        Ok(())
    }

    fn validate_amount_input(&self, field: &str, amount: f64) -> Result<(), RoomsplitError> {
        let invalid = |title: &str, description: &str| {
            RoomsplitError::InvalidInput(field.to_string(), FieldError::new(field, title, description))
        };
        if !amount.is_finite() {
            return Err(invalid("Invalid Amount", "Amount must be a finite number"));
        }
        if amount <= 0.0 {
            return Err(invalid("Invalid Amount", "Amount must be greater than 0"));
        }
        if amount > MAX_EXPENSE_AMOUNT {
            return Err(invalid("Amount Too Large", "Amount cannot exceed 1,000,000"));
        }
        if ((amount * 100.0).round() - amount * 100.0).abs() > 1e-6 {
            return Err(invalid("Invalid Amount", "Amount cannot have more than 2 decimal places"));
        }
        Ok(())
    }

    fn validate_upi_input(&self, upi_id: &str) -> Result<(), RoomsplitError> {
        self.validate_string_input("upi_id", upi_id, MAX_UPI_LENGTH)?;
        let well_formed = upi_id
            .split_once('@')
            .is_some_and(|(handle, provider)| {
                !handle.is_empty()
                    && !provider.is_empty()
                    && !provider.contains('@')
                    && upi_id.chars().all(|c| c.is_ascii_alphanumeric() || ".-_@".contains(c))
            });
        if !well_formed {
            return Err(RoomsplitError::InvalidInput(
                "upi_id".to_string(),
                FieldError::new("upi_id", "Invalid UPI ID", "UPI ID must look like name@provider"),
            ));
        }
        Ok(())
    }

    pub async fn save_profile(
        &self,
        user_id: &str,
        name: String,
        upi_id: Option<String>,
    ) -> Result<Profile, RoomsplitError> {
        self.validate_string_input("name", &name, MAX_NAME_LENGTH)?;
        let upi_id = upi_id.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
        if let Some(upi) = &upi_id {
            self.validate_upi_input(upi)?;
        }

        let existing = self.storage.get_profile(user_id).await?;
        let is_new = existing.is_none();
        let profile = Profile {
            id: user_id.to_string(),
            name: name.trim().to_string(),
            upi_id,
            created_at: existing.map(|p| p.created_at).unwrap_or_else(Utc::now),
        };
        let profile = self.storage.save_profile(profile).await?;
        info!(user_id, is_new, "profile saved");

        self.record_action(
            PROFILE_SAVED,
            json!({ "user_id": profile.id, "name": profile.name, "has_upi_id": profile.upi_id.is_some() }),
            user_id,
        )
        .await;

        if is_new {
            for other in self.storage.list_profiles().await? {
                if other.id != profile.id {
                    self.dispatch(
                        NotificationType::NewRoommate,
                        &other.id,
                        &profile.id,
                        NotificationPayload {
                            metadata: Some(json!({ "name": profile.name })),
                            ..Default::default()
                        },
                    )
                    .await;
                }
            }
        }
        Ok(profile)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Profile, RoomsplitError> {
        self.require_profile(user_id).await
    }

    /// Every profile except the caller's, for choosing participants.
    pub async fn list_profiles(&self, user_id: &str) -> Result<Vec<Profile>, RoomsplitError> {
        Ok(self
            .storage
            .list_profiles()
            .await?
            .into_iter()
            .filter(|p| p.id != user_id)
            .collect())
    }

    async fn load_ledgers(&self, expenses: Vec<Expense>) -> Result<Vec<ExpenseLedger>, RoomsplitError> {
        let complete = self.storage.list_settlements(None).await?;
        let loads = expenses.into_iter().map(|expense| {
            let complete = &complete;
            async move {
                let participants = self.storage.list_participants(&expense.id).await?;
                let mut settlements = self.storage.list_settlements(Some(&expense.id)).await?;
                settlements.extend(
                    complete
                        .iter()
                        .filter(|s| s.expense_details.iter().any(|d| d.expense_id == expense.id))
                        .cloned(),
                );
                Ok::<_, RoomsplitError>(ExpenseLedger::new(expense, participants, settlements))
            }
        });
        futures::future::try_join_all(loads).await
    }

    async fn load_ledger(&self, expense: Expense) -> Result<ExpenseLedger, RoomsplitError> {
        let mut ledgers = self.load_ledgers(vec![expense]).await?;
        ledgers
            .pop()
            .ok_or_else(|| RoomsplitError::InternalServerError("ledger load returned nothing".to_string()))
    }

    async fn user_ledgers(&self, user_id: &str) -> Result<Vec<ExpenseLedger>, RoomsplitError> {
        let expenses = self.storage.list_expenses(user_id).await?;
        self.load_ledgers(expenses).await
    }

    fn details_for(
        &self,
        user_id: &str,
        ledger: ExpenseLedger,
        names: &HashMap<String, String>,
    ) -> Result<ExpenseDetails, RoomsplitError> {
        let status = ledger
            .status_for(user_id)
            .ok_or_else(|| RoomsplitError::NotExpenseParty(user_id.to_string(), ledger.id().to_string()))?;
        Ok(ExpenseDetails {
            buyer_name: names.get(&ledger.expense.buyer_id).cloned().unwrap_or_default(),
            total_participants: ledger.total_participants(),
            share: ledger.share(),
            parties: ledger.parties(names),
            status,
            settlements: ledger.settlements,
            expense: ledger.expense,
        })
    }

    pub async fn create_expense(&self, buyer_id: &str, new_expense: NewExpense) -> Result<ExpenseDetails, RoomsplitError> {
        self.require_profile(buyer_id).await?;
        self.validate_string_input("title", &new_expense.title, MAX_TITLE_LENGTH)?;
        self.validate_amount_input("amount", new_expense.amount)?;
        if new_expense.participant_ids.iter().all(|id| id.trim().is_empty()) {
            return Err(RoomsplitError::EmptyParticipants);
        }

        let mut seen = HashSet::new();
        let participant_ids: Vec<String> = new_expense
            .participant_ids
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| id != buyer_id && !id.is_empty())
            .filter(|id| seen.insert(id.clone()))
            .collect();
        for participant_id in &participant_ids {
            self.require_profile(participant_id).await?;
        }

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            title: new_expense.title.trim().to_string(),
            amount: new_expense.amount,
            category: new_expense.category,
            buyer_id: buyer_id.to_string(),
            created_at: Utc::now(),
        };
        let expense = self.storage.insert_expense(expense, participant_ids.clone()).await?;
        let share = ledger::share_of(expense.amount, participant_ids.len() + 1);
        info!(expense_id = %expense.id, buyer_id, amount = expense.amount, participants = participant_ids.len(), "expense created");

        let mut touched: Vec<&str> = participant_ids.iter().map(String::as_str).collect();
        touched.push(buyer_id);
        self.invalidate_balances(&touched).await;

        self.record_action(
            EXPENSE_CREATED,
            json!({
                "expense_id": expense.id,
                "title": expense.title,
                "amount": expense.amount,
                "participant_ids": participant_ids,
            }),
            buyer_id,
        )
        .await;

        for participant_id in &participant_ids {
            self.dispatch(
                NotificationType::ExpenseCreated,
                participant_id,
                buyer_id,
                NotificationPayload {
                    expense_id: Some(expense.id.clone()),
                    amount: Some(share),
                    metadata: Some(json!({ "title": expense.title })),
                    ..Default::default()
                },
            )
            .await;
        }

        let ledger = self.load_ledger(expense).await?;
        let names = self.profile_names().await?;
        self.details_for(buyer_id, ledger, &names)
    }

    /// Expenses the user bought or shares, newest first.
    pub async fn list_expenses(&self, user_id: &str) -> Result<Vec<ExpenseSummary>, RoomsplitError> {
        let ledgers = self.user_ledgers(user_id).await?;
        let names = self.profile_names().await?;
        Ok(ledgers
            .into_iter()
            .filter_map(|ledger| {
                let status = ledger.status_for(user_id)?;
                Some(ExpenseSummary {
                    buyer_name: names.get(&ledger.expense.buyer_id).cloned().unwrap_or_default(),
                    total_participants: ledger.total_participants(),
                    share: ledger.share(),
                    status,
                    expense: ledger.expense,
                })
            })
            .collect())
    }

    pub async fn expense_details(&self, user_id: &str, expense_id: &str) -> Result<ExpenseDetails, RoomsplitError> {
        let expense = self.require_expense(expense_id).await?;
        let ledger = self.load_ledger(expense).await?;
        let names = self.profile_names().await?;
        self.details_for(user_id, ledger, &names)
    }

    /// Marks `participant_id`'s share of `expense_id` as paid.
    pub async fn settle_participant(
        &self,
        actor_id: &str,
        expense_id: &str,
        participant_id: &str,
    ) -> Result<Settlement, RoomsplitError> {
        let expense = self.require_expense(expense_id).await?;
        let ledger = self.load_ledger(expense).await?;
        let buyer_id = ledger.expense.buyer_id.clone();

        if !ledger.involves(actor_id) {
            return Err(RoomsplitError::NotExpenseParty(actor_id.to_string(), expense_id.to_string()));
        }
        if actor_id != buyer_id && actor_id != participant_id {
            return Err(RoomsplitError::CanOnlySettleOwnShare(actor_id.to_string()));
        }
        if participant_id == buyer_id {
            return Err(RoomsplitError::BuyerSelfSettlement(expense_id.to_string()));
        }
        if ledger.participant(participant_id).is_none() {
            return Err(RoomsplitError::ParticipantNotFound(
                expense_id.to_string(),
                participant_id.to_string(),
            ));
        }
        if ledger.is_settled(participant_id) {
            return Err(RoomsplitError::AlreadySettled(participant_id.to_string()));
        }

        let settlement = Settlement {
            id: Uuid::new_v4().to_string(),
            expense_id: Some(expense_id.to_string()),
            payer_id: participant_id.to_string(),
            payee_id: buyer_id.clone(),
            amount: ledger.share(),
            is_settled: true,
            settlement_type: SettlementType::Individual,
            settled_at: Utc::now(),
            expense_details: Vec::new(),
        };
        let settlement = self
            .storage
            .record_settlement(settlement, vec![(expense_id.to_string(), participant_id.to_string())])
            .await?;
        info!(settlement_id = %settlement.id, expense_id, participant_id, actor_id, "individual settlement recorded");

        self.invalidate_balances(&[buyer_id.as_str(), participant_id]).await;
        self.record_action(
            INDIVIDUAL_SETTLEMENT_RECORDED,
            json!({
                "settlement_id": settlement.id,
                "expense_id": expense_id,
                "payer_id": settlement.payer_id,
                "payee_id": settlement.payee_id,
                "amount": settlement.amount,
            }),
            actor_id,
        )
        .await;

        let recipient = if actor_id == buyer_id { participant_id } else { buyer_id.as_str() };
        self.dispatch(
            NotificationType::IndividualSettlement,
            recipient,
            actor_id,
            NotificationPayload {
                expense_id: Some(expense_id.to_string()),
                settlement_id: Some(settlement.id.clone()),
                participant_id: Some(participant_id.to_string()),
                amount: Some(settlement.amount),
                metadata: None,
            },
        )
        .await;

        Ok(settlement)
    }

    /// Settles the whole outstanding balance with one counterparty across the given expenses.
    pub async fn complete_settlement(
        &self,
        actor_id: &str,
        request: CompleteSettlementRequest,
    ) -> Result<CompleteSettlementReceipt, RoomsplitError> {
        let counterparty_id = request.counterparty_id.as_str();
        if counterparty_id == actor_id {
            return Err(RoomsplitError::SelfSettlement);
        }
        self.require_profile(actor_id).await?;
        let counterparty = self.require_profile(counterparty_id).await?;
        let payment_address = counterparty
            .payment_address()
            .ok_or_else(|| RoomsplitError::MissingPaymentAddress(counterparty.id.clone()))?
            .to_string();
        if request.expense_details.is_empty() {
            return Err(RoomsplitError::NothingToSettle(counterparty_id.to_string()));
        }

        let mut expenses = Vec::with_capacity(request.expense_details.len());
        for detail in &request.expense_details {
            if !expenses.iter().any(|e: &Expense| e.id == detail.expense_id) {
                expenses.push(self.require_expense(&detail.expense_id).await?);
            }
        }
        let ledgers: HashMap<String, ExpenseLedger> = self
            .load_ledgers(expenses)
            .await?
            .into_iter()
            .map(|l| (l.expense.id.clone(), l))
            .collect();

        let net = ledger::net_for_legs(actor_id, counterparty_id, &request.expense_details, &ledgers)?;
        if ledger::is_negligible(net) {
            return Err(RoomsplitError::NothingToSettle(counterparty_id.to_string()));
        }
        if !ledger::is_negligible(net - request.net_amount) {
            return Err(RoomsplitError::InvalidSettlementAmount {
                given: request.net_amount,
                expected: net,
            });
        }

        let (payer_id, payee_id) = if net > 0.0 {
            (actor_id, counterparty_id)
        } else {
            (counterparty_id, actor_id)
        };
        let legs: Vec<(String, String)> = request
            .expense_details
            .iter()
            .filter_map(|detail| ledgers.get(&detail.expense_id))
            .flat_map(|ledger| {
                [actor_id, counterparty_id]
                    .into_iter()
                    .filter(|user| ledger.participant(user).is_some())
                    .map(|user| (ledger.expense.id.clone(), user.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect();

        let settlement = Settlement {
            id: Uuid::new_v4().to_string(),
            expense_id: None,
            payer_id: payer_id.to_string(),
            payee_id: payee_id.to_string(),
            amount: net.abs(),
            is_settled: true,
            settlement_type: SettlementType::Complete,
            settled_at: Utc::now(),
            expense_details: request.expense_details.clone(),
        };
        let settlement = self.storage.record_settlement(settlement, legs).await?;
        info!(
            settlement_id = %settlement.id,
            payer_id,
            payee_id,
            amount = settlement.amount,
            expenses = settlement.expense_details.len(),
            "complete settlement recorded"
        );

        self.invalidate_balances(&[actor_id, counterparty_id]).await;
        self.record_action(
            COMPLETE_SETTLEMENT_RECORDED,
            json!({
                "settlement_id": settlement.id,
                "payer_id": settlement.payer_id,
                "payee_id": settlement.payee_id,
                "amount": settlement.amount,
                "expense_ids": settlement.expense_details.iter().map(|d| d.expense_id.clone()).collect::<Vec<_>>(),
            }),
            actor_id,
        )
        .await;
        self.dispatch(
            NotificationType::BalanceSettlement,
            counterparty_id,
            actor_id,
            NotificationPayload {
                settlement_id: Some(settlement.id.clone()),
                amount: Some(settlement.amount),
                metadata: Some(json!({ "expense_count": settlement.expense_details.len() })),
                ..Default::default()
            },
        )
        .await;

        let payment_link = (payer_id == actor_id).then(|| {
            PaymentIntent {
                payee_address: payment_address,
                payee_name: counterparty.name.clone(),
                amount: settlement.amount,
                currency: self.config.currency.clone(),
                memo: format!("Roomsplit settlement ({} expenses)", settlement.expense_details.len()),
            }
            .to_upi_uri()
        });

        Ok(CompleteSettlementReceipt {
            settlement,
            payment_link,
        })
    }

    /// Complete settlement of whatever is currently outstanding with `counterparty_id`.
    pub async fn settle_balance_with(
        &self,
        actor_id: &str,
        counterparty_id: &str,
    ) -> Result<CompleteSettlementReceipt, RoomsplitError> {
        let balance = self
            .compute_balances(actor_id)
            .await?
            .into_iter()
            .find(|b| b.counterparty_id == counterparty_id)
            .ok_or_else(|| RoomsplitError::NothingToSettle(counterparty_id.to_string()))?;
        self.complete_settlement(
            actor_id,
            CompleteSettlementRequest {
                counterparty_id: counterparty_id.to_string(),
                expense_details: balance.legs(),
                net_amount: balance.net_amount,
            },
        )
        .await
    }

    async fn compute_balances(&self, user_id: &str) -> Result<Vec<Balance>, RoomsplitError> {
        let ledgers = self.user_ledgers(user_id).await?;
        let names = self.profile_names().await?;
        Ok(ledger::aggregate_balances(user_id, &ledgers, &names))
    }

    pub async fn get_balances(&self, user_id: &str) -> Result<Vec<Balance>, RoomsplitError> {
        if let Some(balances) = self.cache.get_user_balances(user_id).await? {
            debug!(user_id, "balances served from cache");
            return Ok(balances);
        }
        let balances = self.compute_balances(user_id).await?;
        self.cache
            .save_user_balances(user_id, &balances, self.config.balance_cache_ttl)
            .await?;
        debug!(user_id, counterparties = balances.len(), "balances computed");
        Ok(balances)
    }

    /// Nudges a counterparty who owes `user_id`.
    pub async fn send_payment_reminder(
        &self,
        user_id: &str,
        counterparty_id: &str,
    ) -> Result<Notification, RoomsplitError> {
        let balance = self
            .compute_balances(user_id)
            .await?
            .into_iter()
            .find(|b| b.counterparty_id == counterparty_id && b.direction == BalanceDirection::Owed)
            .ok_or_else(|| RoomsplitError::NoAmountOwed(user_id.to_string(), counterparty_id.to_string()))?;

        let notification = self
            .notifier
            .notify(
                NotificationType::PaymentReminder,
                counterparty_id,
                user_id,
                NotificationPayload {
                    amount: Some(balance.amount()),
                    metadata: Some(json!({ "expense_count": balance.breakdown.len() })),
                    ..Default::default()
                },
            )
            .await?;
        self.record_action(
            PAYMENT_REMINDER_SENT,
            json!({ "counterparty_id": counterparty_id, "amount": balance.amount() }),
            user_id,
        )
        .await;
        Ok(notification)
    }

    pub async fn settlement_history(
        &self,
        user_id: &str,
        filter: &HistoryFilter,
    ) -> Result<Vec<SettlementRecord>, RoomsplitError> {
        let settlements = self.storage.list_user_settlements(user_id).await?;
        let names = self.profile_names().await?;

        let mut titles: HashMap<String, Option<String>> = HashMap::new();
        for id in settlements.iter().flat_map(|s| s.expense_ids()) {
            if !titles.contains_key(id) {
                let title = self.storage.get_expense(id).await?.map(|e| e.title);
                titles.insert(id.to_string(), title);
            }
        }
        let title_of = |id: &str| titles.get(id).cloned().flatten();
        let name_of = |id: &str| names.get(id).cloned().unwrap_or_else(|| "Unknown".to_string());

        let records = settlements
            .into_iter()
            .map(|settlement| SettlementRecord {
                payer_name: name_of(&settlement.payer_id),
                payee_name: name_of(&settlement.payee_id),
                expense_title: settlement.expense_id.as_deref().and_then(title_of),
                settled_expenses: settlement
                    .expense_details
                    .iter()
                    .map(|d| SettledExpense {
                        expense_id: d.expense_id.clone(),
                        expense_title: title_of(&d.expense_id),
                        amount: d.amount,
                    })
                    .collect(),
                settlement,
            })
            .collect();
        Ok(history::filter_history(user_id, records, filter, Utc::now()))
    }

    pub async fn analytics(&self, user_id: &str) -> Result<AnalyticsSummary, RoomsplitError> {
        let ledgers = self.user_ledgers(user_id).await?;
        let names = self.profile_names().await?;
        Ok(analytics::summarize(user_id, &ledgers, &names))
    }

    pub async fn list_notifications(&self, user_id: &str) -> Result<Vec<Notification>, RoomsplitError> {
        self.notifier.list_for(user_id).await
    }

    pub async fn mark_notification_read(&self, user_id: &str, notification_id: &str) -> Result<(), RoomsplitError> {
        let notification = self
            .notifier
            .get(notification_id)
            .await?
            .ok_or_else(|| RoomsplitError::NotificationNotFound(notification_id.to_string()))?;
        if notification.recipient_id != user_id {
            return Err(RoomsplitError::NotNotificationRecipient(
                user_id.to_string(),
                notification_id.to_string(),
            ));
        }
        self.notifier.mark_read(notification_id).await
    }

    pub async fn get_app_logs(&self, user_id: &str) -> Result<Vec<AppLog>, RoomsplitError> {
        self.logging.logs_for_user(user_id).await
    }
}
