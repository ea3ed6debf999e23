use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    api::models::{ErrorResponse, SaveProfileRequest},
    core::{
        analytics::{AnalyticsSummary, CategorySpending, Insight, InsightKind, MonthlySpending, PartnerSummary},
        history::{DateRange, SettledExpense, SettlementRecord},
        models::{
            audit::AppLog,
            balance::{Balance, BalanceDirection, BreakdownItem},
            expense::{Category, Expense, ExpenseStatus, StatusPerspective},
            notification::{Notification, NotificationType},
            participant::{ExpenseParty, PartyRole},
            profile::Profile,
            settlement::{ExpenseShare, Settlement, SettlementType},
        },
        services::{CompleteSettlementReceipt, CompleteSettlementRequest, ExpenseDetails, ExpenseSummary, NewExpense},
    },
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::save_profile,
        super::handlers::get_own_profile,
        super::handlers::get_profile,
        super::handlers::list_profiles,
        super::handlers::create_expense,
        super::handlers::list_expenses,
        super::handlers::get_expense,
        super::handlers::settle_participant,
        super::handlers::get_balances,
        super::handlers::complete_settlement,
        super::handlers::settle_balance_with,
        super::handlers::settlement_history,
        super::handlers::get_analytics,
        super::handlers::list_notifications,
        super::handlers::mark_notification_read,
        super::handlers::send_payment_reminder,
        super::handlers::get_app_logs
    ),
    components(schemas(
        SaveProfileRequest,
        NewExpense,
        CompleteSettlementRequest,
        CompleteSettlementReceipt,
        ErrorResponse,
        Profile,
        Expense,
        Category,
        ExpenseStatus,
        StatusPerspective,
        ExpenseSummary,
        ExpenseDetails,
        ExpenseParty,
        PartyRole,
        Settlement,
        SettlementType,
        ExpenseShare,
        Balance,
        BalanceDirection,
        BreakdownItem,
        SettlementRecord,
        SettledExpense,
        DateRange,
        AnalyticsSummary,
        MonthlySpending,
        CategorySpending,
        PartnerSummary,
        Insight,
        InsightKind,
        Notification,
        NotificationType,
        AppLog
    )),
    modifiers(&BearerAuth),
    info(
        title = "Roomsplit API",
        description = "API for splitting shared household expenses between roommates",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
