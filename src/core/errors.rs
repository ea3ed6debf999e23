use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Coarse classification used by callers to decide how to surface an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unauthenticated,
    Authorization,
    NotFound,
    Consistency,
    Internal,
}

#[derive(Error, Debug, Serialize)]
pub enum RoomsplitError {
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),
    #[error("At least one participant is required")]
    EmptyParticipants,
    #[error("Profile {0} has no payment address")]
    MissingPaymentAddress(String),
    #[error("Participant {0} is already settled")]
    AlreadySettled(String),
    #[error("The buyer of expense {0} cannot settle with themselves")]
    BuyerSelfSettlement(String),
    #[error("Cannot settle a balance with yourself")]
    SelfSettlement,
    #[error("No outstanding balance with {0}")]
    NothingToSettle(String),
    #[error("Expense {0} cannot be part of this settlement")]
    InvalidSettlementExpense(String),
    #[error("Settlement amount {given} does not match outstanding {expected}")]
    InvalidSettlementAmount { given: f64, expected: f64 },
    #[error("User {0} is not owed anything by {1}")]
    NoAmountOwed(String, String),

    #[error("Missing or invalid credentials: {0}")]
    Unauthenticated(String),
    #[error("User {0} is not a party to expense {1}")]
    NotExpenseParty(String, String),
    #[error("User {0} may only settle their own share")]
    CanOnlySettleOwnShare(String),
    #[error("User {0} cannot modify notification {1}")]
    NotNotificationRecipient(String, String),

    #[error("Expense {0} not found")]
    ExpenseNotFound(String),
    #[error("Participant {1} not found on expense {0}")]
    ParticipantNotFound(String, String),
    #[error("Profile {0} not found")]
    ProfileNotFound(String),
    #[error("Notification {0} not found")]
    NotificationNotFound(String),

    #[error("Settlement write left the ledger inconsistent: {0}")]
    ConsistencyError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Notification error: {0}")]
    NotificationError(String),
    #[error("Logging error: {0}")]
    LoggingError(String),
    #[error("Cache error: {0}")]
    CacheError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl RoomsplitError {
    pub fn kind(&self) -> ErrorKind {
        use RoomsplitError::*;
        match self {
            InvalidInput(..)
            | EmptyParticipants
            | MissingPaymentAddress(_)
            | AlreadySettled(_)
            | BuyerSelfSettlement(_)
            | SelfSettlement
            | NothingToSettle(_)
            | InvalidSettlementExpense(_)
            | InvalidSettlementAmount { .. }
            | NoAmountOwed(..) => ErrorKind::Validation,
            Unauthenticated(_) => ErrorKind::Unauthenticated,
            NotExpenseParty(..) | CanOnlySettleOwnShare(_) | NotNotificationRecipient(..) => {
                ErrorKind::Authorization
            }
            ExpenseNotFound(_) | ParticipantNotFound(..) | ProfileNotFound(_) | NotificationNotFound(_) => {
                ErrorKind::NotFound
            }
            ConsistencyError(_) => ErrorKind::Consistency,
            StorageError(_) | NotificationError(_) | LoggingError(_) | CacheError(_) | InternalServerError(_) => {
                ErrorKind::Internal
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RoomsplitError>;
