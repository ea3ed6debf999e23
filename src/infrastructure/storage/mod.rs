use crate::core::errors::RoomsplitError;
use crate::core::models::{expense::Expense, participant::Participant, profile::Profile, settlement::Settlement};
use async_trait::async_trait;

/// One participant row a settlement marks as paid: `(expense_id, participant_id)`.
pub type SettledLeg = (String, String);

#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_profile(&self, profile: Profile) -> Result<Profile, RoomsplitError>;
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, RoomsplitError>;
    async fn list_profiles(&self) -> Result<Vec<Profile>, RoomsplitError>;

    /// Writes the expense and one unsettled row per participant id together.
    async fn insert_expense(&self, expense: Expense, participant_ids: Vec<String>) -> Result<Expense, RoomsplitError>;
    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, RoomsplitError>;
    /// Expenses the user bought or participates in, newest first.
    async fn list_expenses(&self, user_id: &str) -> Result<Vec<Expense>, RoomsplitError>;

    async fn list_participants(&self, expense_id: &str) -> Result<Vec<Participant>, RoomsplitError>;
    async fn update_participant_settlement(
        &self,
        expense_id: &str,
        participant_id: &str,
        settled: bool,
    ) -> Result<(), RoomsplitError>;

    /// Rows recorded against `expense_id`, or the complete settlements when `None`.
    async fn list_settlements(&self, expense_id: Option<&str>) -> Result<Vec<Settlement>, RoomsplitError>;
    async fn list_user_settlements(&self, user_id: &str) -> Result<Vec<Settlement>, RoomsplitError>;
    async fn insert_settlement(&self, settlement: Settlement) -> Result<Settlement, RoomsplitError>;

    /// Flags every leg as settled and appends `settlement` as one unit of work.
    ///
    /// Nothing is written unless every leg names an existing participant row that
    /// is not already paid. Both checks run under the same write as the insert.
    async fn record_settlement(
        &self,
        settlement: Settlement,
        legs: Vec<SettledLeg>,
    ) -> Result<Settlement, RoomsplitError>;
}

pub mod in_memory;
