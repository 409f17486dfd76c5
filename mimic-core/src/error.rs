//! Error types for Mimic operations
//!
//! Recording, querying and dispatching never fail for ordinary use; absence of
//! records is an empty result, not an error. The variants below cover setup
//! time: loading configuration and binding free-function slots.

/// Result type for Mimic operations
pub type Result<T> = std::result::Result<T, MimicError>;

/// Error types for the Mimic engine
#[derive(Debug, thiserror::Error)]
pub enum MimicError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A free-function slot is already bound to a different recorder or stub
    #[error("Function slot for `{signature}` already has a different {resource} bound")]
    SlotInUse {
        /// Signature of the contested slot
        signature: &'static str,
        /// Which part of the binding conflicted ("recorder" or "stub")
        resource: &'static str,
    },
}

impl From<figment::Error> for MimicError {
    fn from(err: figment::Error) -> Self {
        MimicError::Configuration(format!("Failed to load configuration: {}", err))
    }
}
