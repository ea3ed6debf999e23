pub const PROFILE_SAVED: &str = "PROFILE_SAVED";
pub const EXPENSE_CREATED: &str = "EXPENSE_CREATED";
pub const INDIVIDUAL_SETTLEMENT_RECORDED: &str = "INDIVIDUAL_SETTLEMENT_RECORDED";
pub const COMPLETE_SETTLEMENT_RECORDED: &str = "COMPLETE_SETTLEMENT_RECORDED";
pub const PAYMENT_REMINDER_SENT: &str = "PAYMENT_REMINDER_SENT";

pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_UPI_LENGTH: usize = 255;
pub const MAX_EXPENSE_AMOUNT: f64 = 1_000_000.0;
