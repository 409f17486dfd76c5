//! Interception wrappers and the dispatch gateway
//!
//! Every intercepted call goes through [`dispatch`], whatever the wrapper:
//!
//! 1. the call is recorded, unconditionally;
//! 2. a registered override is invoked with the original arguments;
//! 3. otherwise the delegate (real implementation or stub) is invoked;
//! 4. otherwise the fallback value is returned.
//!
//! Three wrappers share this gateway:
//!
//! - [`Mock`] stands in for a trait object. Its trait impl is written by
//!   hand and forwards each method to [`Mock::call`] or [`Mock::call_mut`].
//! - [`FunctorMock`] stands in for one callable.
//! - [`FunctionMock`] binds a free function signature in a
//!   [`FunctionRegistry`], whose [`target`](FunctionRegistry::target) is the
//!   plain function handed to the code under test.
//!
//! ```rust
//! use mimic_core::dispatch::Mock;
//! use mimic_core::identity::Operation;
//!
//! trait Stove {
//!     fn turn_on_burner(&self, level: u32) -> bool;
//! }
//!
//! static TURN_ON_BURNER: Operation<(u32,), bool> = Operation::new("Stove::turn_on_burner");
//!
//! struct StoveMock(Mock<dyn Stove>);
//!
//! impl Stove for StoveMock {
//!     fn turn_on_burner(&self, level: u32) -> bool {
//!         self.0.call(&TURN_ON_BURNER, (level,), |real, (level,)| real.turn_on_burner(level))
//!     }
//! }
//!
//! let stove = StoveMock(Mock::new());
//! assert!(!stove.turn_on_burner(2000));
//!
//! stove.0.set(&TURN_ON_BURNER, |(level,)| level < 8000);
//! assert!(stove.turn_on_burner(2000));
//!
//! assert_eq!(stove.0.find(&TURN_ON_BURNER).into_rows(), vec![(2000,), (2000,)]);
//! ```

mod function;
mod functor;
mod mock;

pub use function::{FunctionMock, FunctionRegistry};
pub use functor::FunctorMock;
pub use mock::Mock;

use crate::conversion::ConvertArgs;
use crate::identity::{Operation, SubjectId};
use crate::overrides::OverrideTable;
use crate::recorder::CallRecorder;
use std::fmt;

/// Which forwarding tier served a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// A registered override
    Override,
    /// The delegate supplied at construction
    Delegate,
    /// The fallback value
    Default,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Override => write!(f, "override"),
            Tier::Delegate => write!(f, "delegate"),
            Tier::Default => write!(f, "default"),
        }
    }
}

/// Record one call and forward it: override, then delegate, then fallback.
///
/// The override table is only borrowed long enough to clone the behaviour
/// out, so behaviours and delegates may re-enter the same wrapper.
pub fn dispatch<P, R, C, D, F>(
    recorder: &CallRecorder<C>,
    overrides: &OverrideTable,
    operation: &Operation<P, R>,
    subject: SubjectId,
    arguments: P,
    delegate: Option<D>,
    fallback: F,
) -> R
where
    P: 'static,
    R: 'static,
    C: ConvertArgs<P>,
    D: FnOnce(P) -> R,
    F: FnOnce() -> R,
{
    recorder.record(operation, subject, &arguments);

    if let Some(behavior) = overrides.get(operation) {
        trace_tier(operation, subject, Tier::Override);
        behavior(arguments)
    } else if let Some(forward) = delegate {
        trace_tier(operation, subject, Tier::Delegate);
        forward(arguments)
    } else {
        trace_tier(operation, subject, Tier::Default);
        fallback()
    }
}

fn trace_tier<P, R>(operation: &Operation<P, R>, subject: SubjectId, tier: Tier) {
    tracing::trace!(
        operation = operation.name(),
        subject = %subject,
        tier = %tier,
        "Dispatched call"
    );
}

#[cfg(test)]
mod tests;
