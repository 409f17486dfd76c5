//! Callable wrapper

use super::dispatch;
use crate::conversion::{ConversionPolicy, ConvertArgs, DefaultConversion};
use crate::identity::{Operation, SubjectId};
use crate::overrides::OverrideTable;
use crate::recorder::CallRecorder;
use crate::result::ResultSet;
use std::any::type_name;
use std::fmt;
use std::rc::Rc;

/// Signature-keyed identity of every functor wrapper
struct FunctorCall;

/// Recording stand-in for a callable of signature `Fn(P) -> R`.
///
/// Every functor mock with the same signature records under the same
/// operation, and is told apart from its siblings by its own
/// [`SubjectId`].
pub struct FunctorMock<P: 'static, R: 'static, C = DefaultConversion> {
    subject: SubjectId,
    recorder: Rc<CallRecorder<C>>,
    overrides: OverrideTable,
    stub: Option<Box<dyn Fn(P) -> R>>,
    operation: Operation<P, R>,
}

impl<P: 'static, R: 'static, C: ConversionPolicy + Default> FunctorMock<P, R, C> {
    /// Functor with a fresh recorder and no stub
    pub fn new() -> Self {
        Self::with_recorder(Rc::new(CallRecorder::new()))
    }

    /// Functor with a fresh recorder, forwarding to `stub`
    pub fn with_stub(stub: impl Fn(P) -> R + 'static) -> Self {
        Self::with_recorder_and_stub(Rc::new(CallRecorder::new()), stub)
    }
}

impl<P: 'static, R: 'static, C: ConversionPolicy> FunctorMock<P, R, C> {
    /// Functor recording into `recorder`, with no stub
    pub fn with_recorder(recorder: Rc<CallRecorder<C>>) -> Self {
        Self {
            subject: SubjectId::generate(),
            recorder,
            overrides: OverrideTable::new(),
            stub: None,
            operation: Operation::keyed::<FunctorCall>(type_name::<fn(P) -> R>()),
        }
    }

    /// Functor recording into `recorder`, forwarding to `stub`
    pub fn with_recorder_and_stub(
        recorder: Rc<CallRecorder<C>>,
        stub: impl Fn(P) -> R + 'static,
    ) -> Self {
        Self {
            stub: Some(Box::new(stub)),
            ..Self::with_recorder(recorder)
        }
    }

    /// Record and forward one call; falls back to `R::default()`
    pub fn call(&self, arguments: P) -> R
    where
        R: Default,
        C: ConvertArgs<P>,
    {
        self.call_or(arguments, R::default)
    }

    /// Record and forward one call, with an explicit fallback
    pub fn call_or(&self, arguments: P, fallback: impl FnOnce() -> R) -> R
    where
        C: ConvertArgs<P>,
    {
        dispatch(
            &self.recorder,
            &self.overrides,
            &self.operation,
            self.subject,
            arguments,
            self.stub.as_deref(),
            fallback,
        )
    }

    /// Borrow this functor as a plain closure for code under test
    pub fn as_fn(&self) -> impl Fn(P) -> R + '_
    where
        R: Default,
        C: ConvertArgs<P>,
    {
        move |arguments| self.call(arguments)
    }

    /// Replace the call behaviour of this functor
    pub fn set(&self, behavior: impl Fn(P) -> R + 'static) {
        self.overrides.set(&self.operation, behavior);
    }

    /// Remove the override; returns whether there was one
    pub fn unset(&self) -> bool {
        self.overrides.remove(&self.operation)
    }

    /// Calls made on this functor
    pub fn find(&self) -> ResultSet<<C as ConvertArgs<P>>::Stored>
    where
        C: ConvertArgs<P>,
    {
        self.recorder.find_for(self.subject, &self.operation)
    }

    /// Calls made on every functor of this signature sharing the recorder
    pub fn find_all(&self) -> ResultSet<<C as ConvertArgs<P>>::Stored>
    where
        C: ConvertArgs<P>,
    {
        self.recorder.find(&self.operation)
    }

    /// The operation all functors of this signature record under
    pub fn operation(&self) -> &Operation<P, R> {
        &self.operation
    }

    /// Identity under which this functor records
    pub fn subject_id(&self) -> SubjectId {
        self.subject
    }

    /// The recorder this functor records into
    pub fn recorder(&self) -> &Rc<CallRecorder<C>> {
        &self.recorder
    }
}

impl<P: 'static, R: 'static, C: ConversionPolicy + Default> Default for FunctorMock<P, R, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: 'static, R: 'static, C> fmt::Debug for FunctorMock<P, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctorMock")
            .field("operation", &self.operation)
            .field("subject", &self.subject)
            .field("has_stub", &self.stub.is_some())
            .finish_non_exhaustive()
    }
}
