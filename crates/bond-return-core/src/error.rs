use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BondReturnError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("No cash flows remain after the horizon: maturity {maturity}y, elapsed {elapsed}y")]
    EmptyScheduleAfterHorizon { maturity: u32, elapsed: Decimal },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for BondReturnError {
    fn from(e: serde_json::Error) -> Self {
        BondReturnError::SerializationError(e.to_string())
    }
}
