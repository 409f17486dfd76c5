//! Free-function wrapper
//!
//! A plain function pointer cannot carry per-instance state, so free
//! functions dispatch through a [`FunctionRegistry`]: one slot per signature,
//! holding the recorder, the stub and the overrides shared by every
//! [`FunctionMock`] of that signature. The registry hands out the
//! [`target`](FunctionRegistry::target) to pass to the code under test; the
//! mocks are binding tokens that keep the slot alive.
//!
//! Calls through a target carry no subject, so sibling mocks of one signature
//! see each other's calls. A stub belongs to the mock that supplied it; the
//! slot only holds a weak reference, so the stub stops answering once that
//! mock is dropped.

use super::dispatch;
use crate::conversion::{ConversionPolicy, ConvertArgs, DefaultConversion};
use crate::error::{MimicError, Result};
use crate::identity::{Operation, SubjectId};
use crate::overrides::OverrideTable;
use crate::recorder::CallRecorder;
use crate::result::ResultSet;
use std::any::{Any, TypeId, type_name};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

/// Signature-keyed identity of every free-function wrapper
struct FunctionCall;

type Slots = Rc<RefCell<HashMap<TypeId, Rc<dyn Any>>>>;

type Stub<P, R> = Rc<dyn Fn(P) -> R>;

/// Everything one signature's slot holds while any token is alive
struct Binding<P, R, C> {
    recorder: Rc<CallRecorder<C>>,
    stub: RefCell<Option<Weak<dyn Fn(P) -> R>>>,
    overrides: OverrideTable,
    operation: Operation<P, R>,
    holders: Cell<usize>,
}

impl<P: 'static, R: 'static, C: ConversionPolicy + ConvertArgs<P>> Binding<P, R, C> {
    fn dispatch(&self, arguments: P, fallback: impl FnOnce() -> R) -> R {
        let stub = self.live_stub();
        dispatch(
            &self.recorder,
            &self.overrides,
            &self.operation,
            SubjectId::UNSET,
            arguments,
            stub.as_deref(),
            fallback,
        )
    }
}

impl<P: 'static, R: 'static, C> Binding<P, R, C> {
    fn live_stub(&self) -> Option<Stub<P, R>> {
        self.stub.borrow().as_ref().and_then(Weak::upgrade)
    }
}

fn signature_key<P: 'static, R: 'static>() -> TypeId {
    TypeId::of::<fn(P) -> R>()
}

fn lookup<P: 'static, R: 'static, C: ConversionPolicy>(
    slots: &Slots,
) -> Option<Rc<Binding<P, R, C>>> {
    let slot = slots.borrow().get(&signature_key::<P, R>()).cloned()?;
    slot.downcast::<Binding<P, R, C>>().ok()
}

/// Caller-owned table of free-function dispatch slots.
///
/// Cloning the registry yields another handle to the same table.
///
/// ```rust
/// use mimic_core::dispatch::{FunctionMock, FunctionRegistry};
///
/// fn brew(cups: u8, grind: &dyn Fn((u8,)) -> u32) -> u32 {
///     grind((cups,))
/// }
///
/// let registry: FunctionRegistry = FunctionRegistry::new();
/// let grinder = FunctionMock::<(u8,), u32>::with_stub(&registry, |(cups,)| u32::from(cups) * 7);
///
/// let grind = registry.target::<(u8,), u32>();
/// assert_eq!(brew(2, &grind), 14);
/// assert_eq!(grinder.find().into_rows(), vec![(2,)]);
/// ```
pub struct FunctionRegistry<C = DefaultConversion> {
    slots: Slots,
    policy: PhantomData<fn() -> C>,
}

impl<C: ConversionPolicy> FunctionRegistry<C> {
    /// Create a registry with no bound slots
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(HashMap::new())),
            policy: PhantomData,
        }
    }

    /// The dispatch point for signature `Fn(P) -> R`; falls back to
    /// `R::default()`.
    ///
    /// The slot is looked up on every call, so the target may be taken
    /// before any mock is bound.
    ///
    /// # Panics
    ///
    /// Calling the target panics when no [`FunctionMock`] of this signature
    /// is alive.
    pub fn target<P, R>(&self) -> impl Fn(P) -> R + use<P, R, C>
    where
        P: 'static,
        R: Default + 'static,
        C: ConvertArgs<P>,
    {
        self.target_or(R::default)
    }

    /// Like [`target`](Self::target), with an explicit fallback value
    ///
    /// # Panics
    ///
    /// Calling the target panics when no [`FunctionMock`] of this signature
    /// is alive.
    pub fn target_or<P, R, F>(&self, fallback: F) -> impl Fn(P) -> R + use<P, R, C, F>
    where
        P: 'static,
        R: 'static,
        C: ConvertArgs<P>,
        F: Fn() -> R,
    {
        let slots = Rc::clone(&self.slots);
        move |arguments| match lookup::<P, R, C>(&slots) {
            Some(binding) => binding.dispatch(arguments, &fallback),
            None => panic!(
                "no function mock is bound for `{}`",
                type_name::<fn(P) -> R>()
            ),
        }
    }

    /// Whether a mock of signature `Fn(P) -> R` is alive
    pub fn is_bound<P: 'static, R: 'static>(&self) -> bool {
        self.slots
            .borrow()
            .contains_key(&signature_key::<P, R>())
    }

    /// Number of bound signatures
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Whether no signature is bound
    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

impl<C: ConversionPolicy> Default for FunctionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for FunctionRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
            policy: PhantomData,
        }
    }
}

impl<C> fmt::Debug for FunctionRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("slots", &self.slots.borrow().len())
            .finish()
    }
}

/// Binding token for the free-function slot of signature `Fn(P) -> R`.
///
/// The first token for a signature creates the slot; later ones join it.
/// A recorder can only be supplied when the slot is unbound or already uses
/// that very recorder, and a stub only when no live token supplied one. The
/// slot is released when the last token is dropped.
pub struct FunctionMock<P: 'static, R: 'static, C: ConversionPolicy = DefaultConversion> {
    binding: Rc<Binding<P, R, C>>,
    slots: Slots,
    stub: Option<Stub<P, R>>,
}

impl<P: 'static, R: 'static, C: ConversionPolicy + Default> FunctionMock<P, R, C> {
    /// Join the slot, creating it with a fresh recorder if needed
    pub fn new(registry: &FunctionRegistry<C>) -> Self {
        let joined = Self::bind(registry, None, None, || Rc::new(CallRecorder::new()));
        match joined {
            Ok(mock) => mock,
            Err(err) => panic!("{}", err),
        }
    }

    /// Join the slot and install `stub`
    ///
    /// # Panics
    ///
    /// Panics when a live mock already supplied a stub.
    pub fn with_stub(registry: &FunctionRegistry<C>, stub: impl Fn(P) -> R + 'static) -> Self {
        match Self::try_with_stub(registry, stub) {
            Ok(mock) => mock,
            Err(err) => panic!("{}", err),
        }
    }

    /// Join the slot and install `stub`, reporting a conflict as an error
    ///
    /// # Errors
    ///
    /// Returns [`MimicError::SlotInUse`] when a live mock already supplied a
    /// stub.
    pub fn try_with_stub(
        registry: &FunctionRegistry<C>,
        stub: impl Fn(P) -> R + 'static,
    ) -> Result<Self> {
        Self::bind(registry, None, Some(Rc::new(stub)), || {
            Rc::new(CallRecorder::new())
        })
    }
}

impl<P: 'static, R: 'static, C: ConversionPolicy> FunctionMock<P, R, C> {
    /// Join the slot, recording into `recorder`
    ///
    /// # Panics
    ///
    /// Panics when the slot is bound to a different recorder.
    pub fn with_recorder(registry: &FunctionRegistry<C>, recorder: Rc<CallRecorder<C>>) -> Self {
        match Self::try_with_recorder(registry, recorder) {
            Ok(mock) => mock,
            Err(err) => panic!("{}", err),
        }
    }

    /// Join the slot, recording into `recorder`, reporting a conflict as an
    /// error
    ///
    /// # Errors
    ///
    /// Returns [`MimicError::SlotInUse`] when the slot is bound to a
    /// different recorder.
    pub fn try_with_recorder(
        registry: &FunctionRegistry<C>,
        recorder: Rc<CallRecorder<C>>,
    ) -> Result<Self> {
        let fresh = Rc::clone(&recorder);
        Self::bind(registry, Some(recorder), None, move || fresh)
    }

    /// Join the slot with both a recorder and a stub
    ///
    /// # Panics
    ///
    /// Panics when either is already bound.
    pub fn with_recorder_and_stub(
        registry: &FunctionRegistry<C>,
        recorder: Rc<CallRecorder<C>>,
        stub: impl Fn(P) -> R + 'static,
    ) -> Self {
        match Self::try_with_recorder_and_stub(registry, recorder, stub) {
            Ok(mock) => mock,
            Err(err) => panic!("{}", err),
        }
    }

    /// Join the slot with both a recorder and a stub, reporting a conflict
    /// as an error
    ///
    /// # Errors
    ///
    /// Returns [`MimicError::SlotInUse`] when either is already bound.
    pub fn try_with_recorder_and_stub(
        registry: &FunctionRegistry<C>,
        recorder: Rc<CallRecorder<C>>,
        stub: impl Fn(P) -> R + 'static,
    ) -> Result<Self> {
        let fresh = Rc::clone(&recorder);
        Self::bind(registry, Some(recorder), Some(Rc::new(stub)), move || fresh)
    }

    fn bind(
        registry: &FunctionRegistry<C>,
        recorder: Option<Rc<CallRecorder<C>>>,
        stub: Option<Stub<P, R>>,
        fresh: impl FnOnce() -> Rc<CallRecorder<C>>,
    ) -> Result<Self> {
        let signature = type_name::<fn(P) -> R>();

        let binding = match lookup::<P, R, C>(&registry.slots) {
            Some(binding) => {
                if let Some(recorder) = &recorder
                    && !Rc::ptr_eq(recorder, &binding.recorder)
                {
                    return Err(MimicError::SlotInUse {
                        signature,
                        resource: "recorder",
                    });
                }
                if let Some(stub) = &stub {
                    if binding.live_stub().is_some() {
                        return Err(MimicError::SlotInUse {
                            signature,
                            resource: "stub",
                        });
                    }
                    *binding.stub.borrow_mut() = Some(Rc::downgrade(stub));
                }
                binding
            }
            None => {
                let binding = Rc::new(Binding {
                    recorder: fresh(),
                    stub: RefCell::new(stub.as_ref().map(Rc::downgrade)),
                    overrides: OverrideTable::new(),
                    operation: Operation::keyed::<FunctionCall>(signature),
                    holders: Cell::new(0),
                });
                let slot: Rc<dyn Any> = binding.clone();
                registry
                    .slots
                    .borrow_mut()
                    .insert(signature_key::<P, R>(), slot);
                tracing::debug!(signature, "Bound function slot");
                binding
            }
        };

        binding.holders.set(binding.holders.get() + 1);
        Ok(Self {
            binding,
            slots: Rc::clone(&registry.slots),
            stub,
        })
    }

    /// Call through the shared slot, as the target would
    pub fn call(&self, arguments: P) -> R
    where
        R: Default,
        C: ConvertArgs<P>,
    {
        self.binding.dispatch(arguments, R::default)
    }

    /// Override the behaviour of every mock of this signature
    pub fn set(&self, behavior: impl Fn(P) -> R + 'static) {
        self.binding.overrides.set(&self.binding.operation, behavior);
    }

    /// Remove the override; returns whether there was one
    pub fn unset(&self) -> bool {
        self.binding.overrides.remove(&self.binding.operation)
    }

    /// Every call of this signature through the slot
    pub fn find(&self) -> ResultSet<<C as ConvertArgs<P>>::Stored>
    where
        C: ConvertArgs<P>,
    {
        self.binding.recorder.find(&self.binding.operation)
    }

    /// The operation calls of this signature are recorded under
    pub fn operation(&self) -> &Operation<P, R> {
        &self.binding.operation
    }

    /// The recorder bound to the slot
    pub fn recorder(&self) -> &Rc<CallRecorder<C>> {
        &self.binding.recorder
    }

    /// Always unset: free functions have no subject
    pub fn subject_id(&self) -> SubjectId {
        SubjectId::UNSET
    }
}

impl<P: 'static, R: 'static, C: ConversionPolicy> Drop for FunctionMock<P, R, C> {
    fn drop(&mut self) {
        let holders = self.binding.holders.get().saturating_sub(1);
        self.binding.holders.set(holders);

        if holders == 0 {
            self.slots.borrow_mut().remove(&signature_key::<P, R>());
            tracing::debug!(
                signature = type_name::<fn(P) -> R>(),
                "Released function slot"
            );
        }
    }
}

impl<P: 'static, R: 'static, C: ConversionPolicy> fmt::Debug for FunctionMock<P, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionMock")
            .field("operation", &self.binding.operation)
            .field("holders", &self.binding.holders.get())
            .field("owns_stub", &self.stub.is_some())
            .finish_non_exhaustive()
    }
}
