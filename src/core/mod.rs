pub mod analytics;
pub mod errors;
pub mod history;
pub mod ledger;
pub mod models;
pub mod payment;
pub mod services;
