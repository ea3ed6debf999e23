mod api_tests;
mod ledger_tests;

use crate::core::models::{
    expense::{Category, Expense},
    participant::Participant,
};
use crate::core::services::{NewExpense, RoomsplitService, ServiceConfig};
use crate::infrastructure::cache::in_memory::InMemoryCache;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::notifications::in_memory::InMemoryNotifier;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use chrono::Utc;

pub type TestService = RoomsplitService<InMemoryLogging, InMemoryStorage, InMemoryCache, InMemoryNotifier>;

pub const TEST_SECRET: &str = "test-secret";

/// Handles onto the in-memory backends a test service shares state with.
pub struct TestBackends {
    pub storage: InMemoryStorage,
    pub notifier: InMemoryNotifier,
}

pub fn create_test_service() -> TestService {
    create_test_service_with_backends().0
}

pub fn create_test_service_with_backends() -> (TestService, TestBackends) {
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    let cache = InMemoryCache::new();
    let notifier = InMemoryNotifier::new();
    let config = ServiceConfig {
        jwt_secret: TEST_SECRET.to_string(),
        ..ServiceConfig::default()
    };
    let service = RoomsplitService::new(storage.clone(), logging, cache, notifier.clone(), config);
    (service, TestBackends { storage, notifier })
}

/// Creates profiles `alice`, `bob` and `carol`; only bob has a UPI ID.
pub async fn seed_roommates(service: &TestService) {
    service.save_profile("alice", "Alice".to_string(), None).await.unwrap();
    service
        .save_profile("bob", "Bob".to_string(), Some("bob@okbank".to_string()))
        .await
        .unwrap();
    service.save_profile("carol", "Carol".to_string(), None).await.unwrap();
}

pub async fn add_expense(service: &TestService, buyer: &str, title: &str, amount: f64, participants: &[&str]) -> String {
    service
        .create_expense(
            buyer,
            NewExpense {
                title: title.to_string(),
                amount,
                category: Some(Category::Food),
                participant_ids: participants.iter().map(|p| p.to_string()).collect(),
            },
        )
        .await
        .unwrap()
        .expense
        .id
}

pub fn expense(id: &str, buyer: &str, amount: f64) -> Expense {
    Expense {
        id: id.to_string(),
        title: format!("Expense {}", id),
        amount,
        category: None,
        buyer_id: buyer.to_string(),
        created_at: Utc::now(),
    }
}

pub fn participant(expense_id: &str, participant_id: &str, settled: bool) -> Participant {
    Participant {
        expense_id: expense_id.to_string(),
        participant_id: participant_id.to_string(),
        settlement_status: settled,
        created_at: Utc::now(),
    }
}
