//! Trait-object wrapper

use super::dispatch;
use crate::conversion::{ConversionPolicy, ConvertArgs, DefaultConversion};
use crate::identity::{Operation, SubjectId};
use crate::overrides::OverrideTable;
use crate::recorder::CallRecorder;
use crate::result::ResultSet;
use std::fmt;
use std::rc::Rc;

/// Recording stand-in for an implementation of `T`.
///
/// `T` is usually a trait object. A small newtype around `Mock<dyn Trait>`
/// implements the trait and forwards each method here, naming the method by
/// its [`Operation`] handle. Methods taking `&self` go through
/// [`call`](Self::call), methods taking `&mut self` through
/// [`call_mut`](Self::call_mut), and those are distinct operations even when
/// they share a name.
///
/// Each mock has its own [`SubjectId`] and its own override table, and
/// records into a recorder that may be shared with other wrappers.
pub struct Mock<T: ?Sized, C = DefaultConversion> {
    subject: SubjectId,
    recorder: Rc<CallRecorder<C>>,
    overrides: OverrideTable,
    delegate: Option<Box<T>>,
}

impl<T: ?Sized, C: ConversionPolicy + Default> Mock<T, C> {
    /// Mock with a fresh recorder and no delegate
    pub fn new() -> Self {
        Self::with_recorder(Rc::new(CallRecorder::new()))
    }

    /// Mock with a fresh recorder, forwarding to `delegate`
    pub fn with_delegate(delegate: Box<T>) -> Self {
        Self::with_recorder_and_delegate(Rc::new(CallRecorder::new()), delegate)
    }
}

impl<T: ?Sized, C: ConversionPolicy> Mock<T, C> {
    /// Mock recording into `recorder`, with no delegate
    pub fn with_recorder(recorder: Rc<CallRecorder<C>>) -> Self {
        Self {
            subject: SubjectId::generate(),
            recorder,
            overrides: OverrideTable::new(),
            delegate: None,
        }
    }

    /// Mock recording into `recorder`, forwarding to `delegate`
    pub fn with_recorder_and_delegate(recorder: Rc<CallRecorder<C>>, delegate: Box<T>) -> Self {
        Self {
            delegate: Some(delegate),
            ..Self::with_recorder(recorder)
        }
    }

    /// Intercept a `&self` method; falls back to `R::default()`.
    ///
    /// `forward` receives the delegate and the original arguments when no
    /// override is registered.
    pub fn call<P, R, F>(&self, operation: &Operation<P, R>, arguments: P, forward: F) -> R
    where
        P: 'static,
        R: Default + 'static,
        C: ConvertArgs<P>,
        F: FnOnce(&T, P) -> R,
    {
        self.call_or(operation, arguments, forward, R::default)
    }

    /// Intercept a `&self` method whose result has no sensible default
    pub fn call_or<P, R, F, D>(
        &self,
        operation: &Operation<P, R>,
        arguments: P,
        forward: F,
        fallback: D,
    ) -> R
    where
        P: 'static,
        R: 'static,
        C: ConvertArgs<P>,
        F: FnOnce(&T, P) -> R,
        D: FnOnce() -> R,
    {
        let delegate = self
            .delegate
            .as_deref()
            .map(|real| move |arguments: P| forward(real, arguments));

        dispatch(
            &self.recorder,
            &self.overrides,
            operation,
            self.subject,
            arguments,
            delegate,
            fallback,
        )
    }

    /// Intercept a `&mut self` method; falls back to `R::default()`
    pub fn call_mut<P, R, F>(&mut self, operation: &Operation<P, R>, arguments: P, forward: F) -> R
    where
        P: 'static,
        R: Default + 'static,
        C: ConvertArgs<P>,
        F: FnOnce(&mut T, P) -> R,
    {
        self.call_mut_or(operation, arguments, forward, R::default)
    }

    /// Intercept a `&mut self` method whose result has no sensible default
    pub fn call_mut_or<P, R, F, D>(
        &mut self,
        operation: &Operation<P, R>,
        arguments: P,
        forward: F,
        fallback: D,
    ) -> R
    where
        P: 'static,
        R: 'static,
        C: ConvertArgs<P>,
        F: FnOnce(&mut T, P) -> R,
        D: FnOnce() -> R,
    {
        let delegate = self
            .delegate
            .as_deref_mut()
            .map(|real| move |arguments: P| forward(real, arguments));

        dispatch(
            &self.recorder,
            &self.overrides,
            operation,
            self.subject,
            arguments,
            delegate,
            fallback,
        )
    }

    /// Replace `operation` with `behavior` on this mock only
    pub fn set<P, R>(&self, operation: &Operation<P, R>, behavior: impl Fn(P) -> R + 'static)
    where
        P: 'static,
        R: 'static,
    {
        self.overrides.set(operation, behavior);
    }

    /// Remove the override of `operation`; returns whether there was one
    pub fn unset<P, R>(&self, operation: &Operation<P, R>) -> bool {
        self.overrides.remove(operation)
    }

    /// Calls of `operation` made on this mock
    pub fn find<P, R>(&self, operation: &Operation<P, R>) -> ResultSet<<C as ConvertArgs<P>>::Stored>
    where
        C: ConvertArgs<P>,
    {
        self.recorder.find_for(self.subject, operation)
    }

    /// Calls of `operation` made on any subject sharing this mock's recorder
    pub fn find_all<P, R>(
        &self,
        operation: &Operation<P, R>,
    ) -> ResultSet<<C as ConvertArgs<P>>::Stored>
    where
        C: ConvertArgs<P>,
    {
        self.recorder.find(operation)
    }

    /// Number of calls of `operation` made on this mock
    pub fn count<P, R>(&self, operation: &Operation<P, R>) -> usize {
        self.recorder.count_for(self.subject, operation)
    }

    /// Identity under which this mock records
    pub fn subject_id(&self) -> SubjectId {
        self.subject
    }

    /// The recorder this mock records into
    pub fn recorder(&self) -> &Rc<CallRecorder<C>> {
        &self.recorder
    }

    /// The overrides registered on this mock
    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    /// The delegate, if one was supplied
    pub fn delegate(&self) -> Option<&T> {
        self.delegate.as_deref()
    }

    /// Mutable access to the delegate, if one was supplied
    pub fn delegate_mut(&mut self) -> Option<&mut T> {
        self.delegate.as_deref_mut()
    }
}

impl<T: ?Sized, C: ConversionPolicy + Default> Default for Mock<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, C> fmt::Debug for Mock<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mock")
            .field("subject", &self.subject)
            .field("overrides", &self.overrides)
            .field("has_delegate", &self.delegate.is_some())
            .finish_non_exhaustive()
    }
}
