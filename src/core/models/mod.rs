pub mod audit;
pub mod balance;
pub mod expense;
pub mod notification;
pub mod participant;
pub mod profile;
pub mod settlement;
