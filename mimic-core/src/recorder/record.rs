//! Call record types

use super::erased::ErasedArguments;
use crate::identity::{OperationId, SubjectId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One intercepted call, as stored in the history.
///
/// Records are immutable once appended.
#[derive(Debug)]
pub struct CallRecord {
    pub(crate) sequence: u64,
    pub(crate) recorded_at: DateTime<Utc>,
    pub(crate) operation: OperationId,
    pub(crate) operation_name: &'static str,
    pub(crate) subject: SubjectId,
    pub(crate) arguments: ErasedArguments,
}

impl CallRecord {
    /// Zero-based position in the history
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Wall-clock time of the call
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Operation that was called
    pub fn operation(&self) -> OperationId {
        self.operation
    }

    /// Name of the operation that was called
    pub fn operation_name(&self) -> &'static str {
        self.operation_name
    }

    /// Subject the call was made on; unset for free functions
    pub fn subject(&self) -> SubjectId {
        self.subject
    }

    /// The converted arguments
    pub fn arguments(&self) -> &ErasedArguments {
        &self.arguments
    }

    /// Serializable summary of this record
    pub fn summary(&self) -> CallSummary {
        CallSummary {
            sequence: self.sequence,
            recorded_at: self.recorded_at,
            operation: self.operation,
            operation_name: self.operation_name,
            subject: self.subject,
            argument_types: self.arguments.type_name(),
        }
    }
}

/// Argument-free view of a [`CallRecord`], used for timeline exports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallSummary {
    /// Zero-based position in the history
    pub sequence: u64,

    /// Wall-clock time of the call
    pub recorded_at: DateTime<Utc>,

    /// Operation identity
    pub operation: OperationId,

    /// Operation name
    pub operation_name: &'static str,

    /// Subject identity (`null` for free functions)
    pub subject: SubjectId,

    /// Stored argument tuple type
    pub argument_types: &'static str,
}
