use crate::core::errors::RoomsplitError;
use crate::core::models::{expense::Expense, participant::Participant, profile::Profile, settlement::Settlement};
use crate::infrastructure::storage::{SettledLeg, Storage};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    profiles: HashMap<String, Profile>,
    expenses: HashMap<String, Expense>,
    // expense_id -> rows
    participants: HashMap<String, Vec<Participant>>,
    settlements: Vec<Settlement>,
}

impl Tables {
    fn participant_mut(&mut self, expense_id: &str, participant_id: &str) -> Option<&mut Participant> {
        self.participants
            .get_mut(expense_id)?
            .iter_mut()
            .find(|p| p.participant_id == participant_id)
    }

    /// A row counts as paid when flagged or covered by a recorded settlement.
    fn is_settled(&self, expense_id: &str, participant_id: &str) -> bool {
        let flagged = self
            .participants
            .get(expense_id)
            .and_then(|rows| rows.iter().find(|p| p.participant_id == participant_id))
            .is_some_and(|p| p.settlement_status);
        flagged || self.settlements.iter().any(|s| s.covers(expense_id, participant_id))
    }

    fn has_participant(&self, expense_id: &str, participant_id: &str) -> bool {
        self.participants
            .get(expense_id)
            .is_some_and(|rows| rows.iter().any(|p| p.participant_id == participant_id))
    }
}

/// Store backed by process memory. All tables sit behind a single lock so a
/// settlement's flag updates and ledger insert are applied together.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_profile(&self, profile: Profile) -> Result<Profile, RoomsplitError> {
        let mut tables = self.tables.write().await;
        tables.profiles.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, RoomsplitError> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.get(user_id).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, RoomsplitError> {
        let tables = self.tables.read().await;
        let mut profiles: Vec<Profile> = tables.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    async fn insert_expense(&self, expense: Expense, participant_ids: Vec<String>) -> Result<Expense, RoomsplitError> {
        let mut tables = self.tables.write().await;
        if tables.expenses.contains_key(&expense.id) {
            return Err(RoomsplitError::StorageError(format!(
                "Expense {} already exists",
                expense.id
            )));
        }
        let now = Utc::now();
        let rows = participant_ids
            .into_iter()
            .map(|participant_id| Participant {
                expense_id: expense.id.clone(),
                participant_id,
                settlement_status: false,
                created_at: now,
            })
            .collect();
        tables.participants.insert(expense.id.clone(), rows);
        tables.expenses.insert(expense.id.clone(), expense.clone());
        Ok(expense)
    }

    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, RoomsplitError> {
        let tables = self.tables.read().await;
        Ok(tables.expenses.get(expense_id).cloned())
    }

    async fn list_expenses(&self, user_id: &str) -> Result<Vec<Expense>, RoomsplitError> {
        let tables = self.tables.read().await;
        let mut expenses: Vec<Expense> = tables
            .expenses
            .values()
            .filter(|e| e.buyer_id == user_id || tables.has_participant(&e.id, user_id))
            .cloned()
            .collect();
        expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(expenses)
    }

    async fn list_participants(&self, expense_id: &str) -> Result<Vec<Participant>, RoomsplitError> {
        let tables = self.tables.read().await;
        Ok(tables.participants.get(expense_id).cloned().unwrap_or_default())
    }

    async fn update_participant_settlement(
        &self,
        expense_id: &str,
        participant_id: &str,
        settled: bool,
    ) -> Result<(), RoomsplitError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .participant_mut(expense_id, participant_id)
            .ok_or_else(|| RoomsplitError::ParticipantNotFound(expense_id.to_string(), participant_id.to_string()))?;
        row.settlement_status = settled;
        Ok(())
    }

    async fn list_settlements(&self, expense_id: Option<&str>) -> Result<Vec<Settlement>, RoomsplitError> {
        let tables = self.tables.read().await;
        Ok(tables
            .settlements
            .iter()
            .filter(|s| s.expense_id.as_deref() == expense_id)
            .cloned()
            .collect())
    }

    async fn list_user_settlements(&self, user_id: &str) -> Result<Vec<Settlement>, RoomsplitError> {
        let tables = self.tables.read().await;
        Ok(tables
            .settlements
            .iter()
            .filter(|s| s.involves(user_id))
            .cloned()
            .collect())
    }

    async fn insert_settlement(&self, settlement: Settlement) -> Result<Settlement, RoomsplitError> {
        let mut tables = self.tables.write().await;
        tables.settlements.push(settlement.clone());
        Ok(settlement)
    }

    async fn record_settlement(
        &self,
        settlement: Settlement,
        legs: Vec<SettledLeg>,
    ) -> Result<Settlement, RoomsplitError> {
        let mut tables = self.tables.write().await;
        if let Some((expense_id, participant_id)) = legs
            .iter()
            .find(|(expense_id, participant_id)| !tables.has_participant(expense_id, participant_id))
        {
            return Err(RoomsplitError::ConsistencyError(format!(
                "no participant row for {} on expense {}; settlement {} not recorded",
                participant_id, expense_id, settlement.id
            )));
        }
        if let Some((_, participant_id)) = legs
            .iter()
            .find(|(expense_id, participant_id)| tables.is_settled(expense_id, participant_id))
        {
            return Err(RoomsplitError::AlreadySettled(participant_id.clone()));
        }
        for (expense_id, participant_id) in &legs {
            if let Some(row) = tables.participant_mut(expense_id, participant_id) {
                row.settlement_status = true;
            }
        }
        tables.settlements.push(settlement.clone());
        Ok(settlement)
    }
}
