//! The shared call history

use super::erased::ErasedArguments;
use super::record::{CallRecord, CallSummary};
use crate::config::RecorderConfig;
use crate::conversion::{ConversionPolicy, ConvertArgs, DefaultConversion};
use crate::identity::{Operation, SubjectId};
use crate::result::ResultSet;
use chrono::Utc;
use std::cell::RefCell;
use std::fmt;

/// Append-only, ordered ledger of intercepted calls.
///
/// Any number of wrappers may share one recorder through an `Rc`; their calls
/// interleave in one timeline. Arguments are converted with the recorder's
/// policy `C` before they are stored.
pub struct CallRecorder<C = DefaultConversion> {
    policy: C,
    trace_calls: bool,
    history: RefCell<Vec<CallRecord>>,
}

impl<C: ConversionPolicy + Default> CallRecorder<C> {
    /// Create an empty recorder with the default policy value
    pub fn new() -> Self {
        Self::with_policy(C::default())
    }

    /// Create an empty recorder tuned by `config`
    pub fn from_config(config: &RecorderConfig) -> Self {
        Self::with_config_and_policy(config, C::default())
    }
}

impl<C: ConversionPolicy> CallRecorder<C> {
    /// Create an empty recorder using `policy` for conversions
    pub fn with_policy(policy: C) -> Self {
        Self::with_config_and_policy(&RecorderConfig::default(), policy)
    }

    /// Create an empty recorder tuned by `config`, using `policy`
    pub fn with_config_and_policy(config: &RecorderConfig, policy: C) -> Self {
        Self {
            policy,
            trace_calls: config.trace_calls,
            history: RefCell::new(Vec::with_capacity(config.initial_capacity)),
        }
    }

    /// The conversion policy in use
    pub fn policy(&self) -> &C {
        &self.policy
    }

    /// Append one call to the history.
    ///
    /// The arguments are converted first, so a policy may freely call into
    /// other wrappers sharing this recorder.
    pub fn record<P, R>(&self, operation: &Operation<P, R>, subject: SubjectId, arguments: &P)
    where
        C: ConvertArgs<P>,
    {
        let stored = self.policy.convert_args(arguments);
        let id = operation.id();

        let mut history = self.history.borrow_mut();
        let sequence = history.len() as u64;

        if self.trace_calls {
            tracing::trace!(
                operation = operation.name(),
                id = %id,
                subject = %subject,
                sequence,
                "Recorded call"
            );
        }

        history.push(CallRecord {
            sequence,
            recorded_at: Utc::now(),
            operation: id,
            operation_name: operation.name(),
            subject,
            arguments: ErasedArguments::new(stored),
        });
    }

    /// Every recorded call of `operation`, whatever the subject
    pub fn find<P, R>(&self, operation: &Operation<P, R>) -> ResultSet<<C as ConvertArgs<P>>::Stored>
    where
        C: ConvertArgs<P>,
    {
        self.find_for(SubjectId::UNSET, operation)
    }

    /// Recorded calls of `operation` made on `subject`.
    ///
    /// An unset `subject` matches every call.
    pub fn find_for<P, R>(
        &self,
        subject: SubjectId,
        operation: &Operation<P, R>,
    ) -> ResultSet<<C as ConvertArgs<P>>::Stored>
    where
        C: ConvertArgs<P>,
    {
        let id = operation.id();
        let history = self.history.borrow();

        let rows = history
            .iter()
            .filter(|record| record.operation == id && subject.matches(record.subject))
            .filter_map(|record| {
                let tuple = record
                    .arguments
                    .downcast_ref::<<C as ConvertArgs<P>>::Stored>();
                debug_assert!(
                    tuple.is_some(),
                    "record #{} of `{}` holds {} instead of the declared arguments",
                    record.sequence,
                    record.operation_name,
                    record.arguments.type_name()
                );
                if tuple.is_none() {
                    tracing::warn!(
                        sequence = record.sequence,
                        operation = record.operation_name,
                        stored = record.arguments.type_name(),
                        "Skipping record with unexpected argument type"
                    );
                }
                tuple.cloned()
            })
            .collect();

        ResultSet::from_rows(rows)
    }

    /// Number of recorded calls of `operation`
    pub fn count<P, R>(&self, operation: &Operation<P, R>) -> usize {
        self.count_for(SubjectId::UNSET, operation)
    }

    /// Number of recorded calls of `operation` made on `subject`
    pub fn count_for<P, R>(&self, subject: SubjectId, operation: &Operation<P, R>) -> usize {
        let id = operation.id();
        self.history
            .borrow()
            .iter()
            .filter(|record| record.operation == id && subject.matches(record.subject))
            .count()
    }

    /// Total number of recorded calls
    pub fn len(&self) -> usize {
        self.history.borrow().len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.history.borrow().is_empty()
    }

    /// Summary of every recorded call, in order
    pub fn timeline(&self) -> Vec<CallSummary> {
        self.history.borrow().iter().map(CallRecord::summary).collect()
    }
}

impl<C: ConversionPolicy + Default> Default for CallRecorder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for CallRecorder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallRecorder")
            .field("policy", &std::any::type_name::<C>())
            .field("records", &self.history.borrow().len())
            .field("trace_calls", &self.trace_calls)
            .finish()
    }
}
