pub mod cache;
pub mod logging;
pub mod notifications;
pub mod storage;
