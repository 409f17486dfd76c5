//! Call recording and retrieval
//!
//! A [`CallRecorder`] is the single ledger behind every wrapper. Each
//! intercepted call becomes one [`CallRecord`]: the operation, the subject it
//! was made on, and the arguments after conversion, type-erased so that calls
//! of any signature share one ordered history.
//!
//! Queries go through the same typed [`Operation`](crate::identity::Operation)
//! handle that recorded the call, which restores the stored argument type:
//!
//! ```rust
//! use mimic_core::identity::{Operation, SubjectId};
//! use mimic_core::recorder::CallRecorder;
//!
//! static SET_INT: Operation<(i32,)> = Operation::new("set_int");
//!
//! let recorder: CallRecorder = CallRecorder::new();
//! let a = SubjectId::generate();
//! let b = SubjectId::generate();
//!
//! recorder.record(&SET_INT, a, &(3,));
//! recorder.record(&SET_INT, b, &(5,));
//!
//! let all = recorder.find(&SET_INT);
//! assert_eq!(all.get::<0>(0), Some(&3));
//! assert_eq!(all.get::<0>(1), Some(&5));
//!
//! let only_b = recorder.find_for(b, &SET_INT);
//! assert_eq!(only_b.into_rows(), vec![(5,)]);
//! ```

pub mod erased;
mod record;
mod store;

pub use erased::ErasedArguments;
pub use record::{CallRecord, CallSummary};
pub use store::CallRecorder;
