//! Tests for the dispatch wrappers

use super::*;
use crate::conversion::{ConversionPolicy, Convert, MinimalConversion};
use crate::error::MimicError;
use crate::identity::Operation;
use crate::recorder::CallRecorder;
use std::cell::Cell;
use std::rc::Rc;

trait Counter {
    fn set_int(&self, value: i32);
    fn get_int(&self) -> i32;
    fn label(&self, name: &str) -> String;
    fn bump(&mut self, by: i32) -> i32;
}

static SET_INT: Operation<(i32,)> = Operation::new("Counter::set_int");
static GET_INT: Operation<(), i32> = Operation::new("Counter::get_int");
static LABEL: Operation<(String,), String> = Operation::new("Counter::label");
static BUMP: Operation<(i32,), i32> = Operation::new("Counter::bump");

#[derive(Default)]
struct RealCounter {
    value: Cell<i32>,
}

impl Counter for RealCounter {
    fn set_int(&self, value: i32) {
        self.value.set(value);
    }

    fn get_int(&self) -> i32 {
        self.value.get()
    }

    fn label(&self, name: &str) -> String {
        format!("{}={}", name, self.value.get())
    }

    fn bump(&mut self, by: i32) -> i32 {
        self.value.set(self.value.get() + by);
        self.value.get()
    }
}

struct CounterMock(Mock<dyn Counter>);

impl Counter for CounterMock {
    fn set_int(&self, value: i32) {
        self.0
            .call(&SET_INT, (value,), |real, (value,)| real.set_int(value))
    }

    fn get_int(&self) -> i32 {
        self.0.call(&GET_INT, (), |real, ()| real.get_int())
    }

    fn label(&self, name: &str) -> String {
        self.0
            .call(&LABEL, (name.to_owned(),), |real, _| real.label(name))
    }

    fn bump(&mut self, by: i32) -> i32 {
        self.0.call_mut(&BUMP, (by,), |real, (by,)| real.bump(by))
    }
}

fn real() -> Box<dyn Counter> {
    Box::new(RealCounter::default())
}

#[test]
fn test_default_tier_without_delegate() {
    let mock = CounterMock(Mock::new());

    mock.set_int(4);
    assert_eq!(mock.get_int(), 0);
    assert_eq!(mock.label("x"), "");
    assert_eq!(mock.0.find(&SET_INT).into_rows(), vec![(4,)]);
}

#[test]
fn test_delegate_tier() {
    let mock = CounterMock(Mock::with_delegate(real()));

    mock.set_int(7);
    assert_eq!(mock.get_int(), 7);
    assert_eq!(mock.0.delegate().map(|real| real.get_int()), Some(7));
    assert_eq!(mock.0.count(&GET_INT), 1);
}

#[test]
fn test_fallback_order() {
    let mock = CounterMock(Mock::with_delegate(real()));
    mock.set_int(7);

    mock.0.set(&GET_INT, |()| 100);
    assert_eq!(mock.get_int(), 100);

    assert!(mock.0.unset(&GET_INT));
    assert_eq!(mock.get_int(), 7);

    let bare = CounterMock(Mock::new());
    assert_eq!(bare.get_int(), 0);

    // Every call is recorded regardless of the tier that served it
    assert_eq!(mock.0.count(&GET_INT), 2);
    assert_eq!(bare.0.count(&GET_INT), 1);
}

#[test]
fn test_override_receives_original_arguments() {
    let mock = CounterMock(Mock::with_delegate(real()));
    let seen = Rc::new(Cell::new(0));
    let sink = Rc::clone(&seen);
    mock.0.set(&SET_INT, move |(value,)| sink.set(value));

    mock.set_int(42);

    assert_eq!(seen.get(), 42);
    assert_eq!(mock.0.delegate().map(|real| real.get_int()), Some(0));
}

#[test]
fn test_borrowed_arguments_are_lifted() {
    let mock = CounterMock(Mock::with_delegate(real()));
    mock.set_int(3);

    assert_eq!(mock.label("cups"), "cups=3");
    assert_eq!(
        mock.0.find(&LABEL).get::<0>(0).map(String::as_str),
        Some("cups")
    );
}

#[test]
fn test_mutable_methods() {
    let mut mock = CounterMock(Mock::with_delegate(real()));

    assert_eq!(mock.bump(2), 2);
    assert_eq!(mock.bump(3), 5);
    assert_eq!(mock.0.find(&BUMP).into_rows(), vec![(2,), (3,)]);
    assert_eq!(mock.0.delegate_mut().map(|real| real.bump(1)), Some(6));
}

#[test]
fn test_call_or_for_results_without_default() {
    struct Token(u8);
    static ISSUE: Operation<(), Token> = Operation::new("issue");

    let mock: Mock<dyn Counter> = Mock::new();
    let token = mock.call_or(&ISSUE, (), |_, ()| Token(1), || Token(9));

    assert_eq!(token.0, 9);
}

#[test]
fn test_shared_recorder_interleaves_subjects() {
    let recorder: Rc<CallRecorder> = Rc::new(CallRecorder::new());
    let a = CounterMock(Mock::with_recorder(Rc::clone(&recorder)));
    let b = CounterMock(Mock::with_recorder_and_delegate(Rc::clone(&recorder), real()));

    a.set_int(3);
    b.set_int(5);

    assert_eq!(a.0.find_all(&SET_INT).into_rows(), vec![(3,), (5,)]);
    assert_eq!(b.0.find(&SET_INT).into_rows(), vec![(5,)]);
    assert_eq!(a.0.find(&SET_INT).into_rows(), vec![(3,)]);
    assert_ne!(a.0.subject_id(), b.0.subject_id());
    assert!(Rc::ptr_eq(a.0.recorder(), b.0.recorder()));
}

#[test]
fn test_overrides_are_per_mock() {
    let recorder: Rc<CallRecorder> = Rc::new(CallRecorder::new());
    let a = CounterMock(Mock::with_recorder(Rc::clone(&recorder)));
    let b = CounterMock(Mock::with_recorder(recorder));

    a.0.set(&GET_INT, |()| 1);

    assert_eq!(a.get_int(), 1);
    assert_eq!(b.get_int(), 0);
}

#[test]
fn test_override_may_reenter_the_mock() {
    let mock = Rc::new(CounterMock(Mock::new()));
    let inner = Rc::downgrade(&mock);
    mock.0.set(&GET_INT, move |()| {
        if let Some(mock) = inner.upgrade() {
            mock.set_int(11);
        }
        11
    });

    assert_eq!(mock.get_int(), 11);
    assert_eq!(mock.0.find(&SET_INT).into_rows(), vec![(11,)]);
}

#[test]
fn test_custom_policy_through_mock() {
    struct Negate;

    impl ConversionPolicy for Negate {}

    impl Convert<i32> for Negate {
        type Stored = i32;

        fn convert(&self, value: &i32) -> i32 {
            -value
        }
    }

    impl Convert<String> for Negate {
        type Stored = usize;

        fn convert(&self, value: &String) -> usize {
            value.len()
        }
    }

    let recorder = Rc::new(CallRecorder::with_policy(Negate));
    let mock: Mock<dyn Counter, Negate> = Mock::with_recorder_and_delegate(recorder, real());

    mock.call(&SET_INT, (8,), |real, (value,)| real.set_int(value));
    mock.call(&LABEL, ("four".to_string(),), |real, (name,)| {
        real.label(&name)
    });

    assert_eq!(mock.find(&SET_INT).into_rows(), vec![(-8,)]);
    assert_eq!(mock.find(&LABEL).into_rows(), vec![(4,)]);
    assert_eq!(mock.call(&GET_INT, (), |real, ()| real.get_int()), 8);
}

#[test]
fn test_functors_sharing_a_recorder_see_own_calls() {
    let recorder: Rc<CallRecorder> = Rc::new(CallRecorder::new());
    let first = FunctorMock::<(i32,), bool>::with_recorder(Rc::clone(&recorder));
    let second =
        FunctorMock::<(i32,), bool>::with_recorder_and_stub(Rc::clone(&recorder), |(x,)| x > 0);

    assert!(!first.call((1,)));
    assert!(second.call((2,)));

    assert_eq!(first.find().into_rows(), vec![(1,)]);
    assert_eq!(second.find().into_rows(), vec![(2,)]);
    assert_eq!(first.find_all().len(), 2);
    assert_eq!(first.operation().id(), second.operation().id());
    assert_eq!(recorder.len(), 2);
}

#[test]
fn test_functor_override_and_as_fn() {
    let functor = FunctorMock::<(u32, u32), u32>::with_stub(|(a, b)| a + b);

    let add = functor.as_fn();
    assert_eq!(add((2, 3)), 5);

    functor.set(|(a, b)| a * b);
    assert_eq!(functor.call((2, 3)), 6);

    assert!(functor.unset());
    assert_eq!(functor.call((2, 3)), 5);
    assert_eq!(functor.find().len(), 3);
}

#[test]
fn test_functor_call_or() {
    let functor: FunctorMock<(), Rc<str>> = FunctorMock::new();

    assert_eq!(&*functor.call_or((), || Rc::from("fallback")), "fallback");
}

#[test]
fn test_free_function_siblings_share_calls() {
    let registry: FunctionRegistry = FunctionRegistry::new();
    let first = FunctionMock::<(i32,), i32>::new(&registry);
    let second = FunctionMock::<(i32,), i32>::new(&registry);

    let target = registry.target::<(i32,), i32>();
    target((1,));
    target((2,));

    assert_eq!(first.find().len(), 2);
    assert_eq!(second.find().len(), 2);
    assert!(Rc::ptr_eq(first.recorder(), second.recorder()));
    assert_eq!(first.subject_id(), SubjectId::UNSET);
}

#[test]
fn test_free_function_stub_and_override() {
    let registry: FunctionRegistry = FunctionRegistry::new();
    let mock = FunctionMock::<(i32,), i32>::with_stub(&registry, |(x,)| x + 1);
    let target = registry.target::<(i32,), i32>();

    assert_eq!(target((1,)), 2);

    mock.set(|(x,)| x * 10);
    assert_eq!(target((1,)), 10);
    assert_eq!(mock.call((2,)), 20);

    assert!(mock.unset());
    assert_eq!(target((1,)), 2);
}

#[test]
fn test_free_function_signatures_are_independent() {
    let registry: FunctionRegistry = FunctionRegistry::new();
    let ints = FunctionMock::<(i32,), ()>::new(&registry);
    let floats = FunctionMock::<(f64,), ()>::new(&registry);

    registry.target::<(i32,), ()>()((1,));

    assert_eq!(ints.find().len(), 1);
    assert!(floats.find().is_empty());
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_free_function_slot_released_with_last_token() {
    let registry: FunctionRegistry = FunctionRegistry::new();
    let first = FunctionMock::<(u8,), ()>::new(&registry);
    let second = FunctionMock::<(u8,), ()>::new(&registry);

    drop(first);
    assert!(registry.is_bound::<(u8,), ()>());

    drop(second);
    assert!(!registry.is_bound::<(u8,), ()>());
    assert!(registry.is_empty());

    // A new binding starts from a fresh slot
    let custom: Rc<CallRecorder> = Rc::new(CallRecorder::new());
    let third = FunctionMock::<(u8,), ()>::with_recorder(&registry, Rc::clone(&custom));
    assert!(Rc::ptr_eq(third.recorder(), &custom));
}

#[test]
fn test_free_function_stub_lives_with_its_owner() {
    let registry: FunctionRegistry = FunctionRegistry::new();
    let keeper = FunctionMock::<(i32,), i32>::new(&registry);
    let stubbed = FunctionMock::<(i32,), i32>::with_stub(&registry, |(x,)| x * 10);
    let target = registry.target::<(i32,), i32>();

    assert_eq!(target((2,)), 20);

    drop(stubbed);
    assert!(registry.is_bound::<(i32,), i32>());
    assert_eq!(target((2,)), 0);

    let replacement = FunctionMock::<(i32,), i32>::try_with_stub(&registry, |(x,)| x - 1);
    assert!(replacement.is_ok());
    assert_eq!(target((2,)), 1);
    assert_eq!(keeper.find().len(), 3);
}

#[test]
fn test_free_function_same_recorder_may_join() {
    let registry: FunctionRegistry = FunctionRegistry::new();
    let recorder: Rc<CallRecorder> = Rc::new(CallRecorder::new());
    let _first = FunctionMock::<(), ()>::with_recorder(&registry, Rc::clone(&recorder));

    let second = FunctionMock::<(), ()>::try_with_recorder(&registry, Rc::clone(&recorder));
    assert!(second.is_ok());
}

#[test]
fn test_free_function_conflicts_are_errors() {
    let registry: FunctionRegistry = FunctionRegistry::new();
    let _bound = FunctionMock::<(i32,), i32>::with_stub(&registry, |(x,)| x);

    let recorder = FunctionMock::<(i32,), i32>::try_with_recorder(
        &registry,
        Rc::new(CallRecorder::new()),
    );
    assert!(matches!(
        recorder,
        Err(MimicError::SlotInUse {
            resource: "recorder",
            ..
        })
    ));

    let stub = FunctionMock::<(i32,), i32>::try_with_stub(&registry, |(x,)| x + 1);
    assert!(matches!(
        stub,
        Err(MimicError::SlotInUse {
            resource: "stub",
            ..
        })
    ));
}

#[test]
#[should_panic(expected = "already has a different recorder bound")]
fn test_free_function_recorder_conflict_panics() {
    let registry: FunctionRegistry = FunctionRegistry::new();
    let _first = FunctionMock::<(i32,), ()>::new(&registry);

    let _second = FunctionMock::<(i32,), ()>::with_recorder(&registry, Rc::new(CallRecorder::new()));
}

#[test]
#[should_panic(expected = "already has a different stub bound")]
fn test_free_function_stub_conflict_panics() {
    let registry: FunctionRegistry = FunctionRegistry::new();
    let _first = FunctionMock::<(i32,), ()>::with_stub(&registry, |_| ());

    let _second = FunctionMock::<(i32,), ()>::with_stub(&registry, |_| ());
}

#[test]
#[should_panic(expected = "no function mock is bound")]
fn test_unbound_target_panics() {
    let registry: FunctionRegistry = FunctionRegistry::new();
    let target = registry.target::<(i32,), i32>();

    target((1,));
}

#[test]
fn test_free_function_minimal_policy() {
    let registry: FunctionRegistry<MinimalConversion> = FunctionRegistry::new();
    let mock = FunctionMock::<(Box<u16>,), (), MinimalConversion>::new(&registry);

    let boxed = Box::new(9u16);
    let address: *const u16 = &*boxed;
    registry.target::<(Box<u16>,), ()>()((boxed,));

    assert_eq!(mock.find().get::<0>(0), Some(&address));
}

#[test]
fn test_tier_display() {
    assert_eq!(Tier::Override.to_string(), "override");
    assert_eq!(Tier::Delegate.to_string(), "delegate");
    assert_eq!(Tier::Default.to_string(), "default");
}
