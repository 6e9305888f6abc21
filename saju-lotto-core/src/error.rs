use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed birth input, rejected before any pillar is computed.
    #[error("invalid birth date: {0}")]
    InvalidBirthDate(String),

    /// Lunar date outside the conversion table or not a real lunar date.
    #[error("calendar conversion failed: {0}")]
    CalendarConversion(String),

    /// A modular computation left its enumerated range. Always a logic defect.
    #[error("arithmetic invariant violated: {kind} index {index} out of range")]
    ArithmeticInvariant { kind: &'static str, index: i64 },

    /// No usable base weights. Recovered by the selector's uniform fallback.
    #[error("insufficient weight data: {0}")]
    InsufficientWeightData(String),

    /// The selector produced something that is not a valid 6 + 1 ticket.
    #[error("selection invariant violated: {0}")]
    SelectionInvariant(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The historical weight source itself failed.
    #[error("weight source '{source_name}' failed: {message}")]
    WeightSource { source_name: String, message: String },
}

impl CoreError {
    /// Fatal errors indicate a defect, never bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CoreError::ArithmeticInvariant { .. } | CoreError::SelectionInvariant(_)
        )
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
