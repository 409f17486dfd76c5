//! Conversion policies applied to arguments before they are recorded
//!
//! Everything is stored by value. That is not always what a test wants: a
//! boxed argument is usually dropped by the callee long before the history is
//! inspected, and a string literal is nicer to compare as an owned `String`.
//! A conversion policy decides, per declared parameter type, what is stored.
//!
//! The policy is an ordinary value injected into a
//! [`CallRecorder`](crate::recorder::CallRecorder), so it may carry state. Its
//! *type* fixes the stored type of every parameter, and the same
//! [`ConvertArgs::Stored`] is used again when the history is queried. That is
//! the contract that keeps the erased history sound.
//!
//! Two policies ship with the crate:
//!
//! | declared type     | [`DefaultConversion`] | [`MinimalConversion`] |
//! |-------------------|-----------------------|-----------------------|
//! | `Box<T>`          | `T` (cloned)          | `*const T` (view)     |
//! | `&'static str`    | `String`              | `&'static str`        |
//! | `Rc<T>`, `Arc<T>` | unchanged             | unchanged             |
//! | anything else     | unchanged             | unchanged             |
//!
//! Types of your own are recorded after implementing [`Convert`] for the
//! policy, or with the [`passthrough!`](crate::passthrough) macro:
//!
//! ```rust
//! use mimic_core::conversion::DefaultConversion;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! pub struct Dish {
//!     pub stars: u8,
//! }
//!
//! mimic_core::passthrough!(DefaultConversion => Dish);
//! ```

use std::borrow::Cow;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

/// Marker for types usable as a recorder's conversion strategy
pub trait ConversionPolicy: 'static {}

/// Conversion of one declared parameter type into its stored form.
///
/// The argument is taken by reference: the original is still forwarded to
/// the override or delegate after recording.
pub trait Convert<T>: ConversionPolicy {
    /// What ends up in the history
    type Stored: Clone + 'static;

    /// Convert one argument
    fn convert(&self, value: &T) -> Self::Stored;
}

/// Conversion of a whole declared parameter tuple.
///
/// Implemented for every policy and every tuple of up to eight parameters
/// whose elements the policy can [`Convert`].
pub trait ConvertArgs<P>: ConversionPolicy {
    /// Tuple of the element-wise stored types
    type Stored: Clone + 'static;

    /// Convert every argument of one call
    fn convert_args(&self, arguments: &P) -> Self::Stored;
}

impl<Policy: ConversionPolicy> ConvertArgs<()> for Policy {
    type Stored = ();

    fn convert_args(&self, _arguments: &()) -> Self::Stored {}
}

macro_rules! tuple_conversion {
    ($($param:ident $idx:tt),+) => {
        impl<Policy, $($param),+> ConvertArgs<($($param,)+)> for Policy
        where
            Policy: ConversionPolicy $(+ Convert<$param>)+,
        {
            type Stored = ($(<Policy as Convert<$param>>::Stored,)+);

            fn convert_args(&self, arguments: &($($param,)+)) -> Self::Stored {
                ($(<Policy as Convert<$param>>::convert(self, &arguments.$idx),)+)
            }
        }
    };
}

tuple_conversion!(A 0);
tuple_conversion!(A 0, B 1);
tuple_conversion!(A 0, B 1, C 2);
tuple_conversion!(A 0, B 1, C 2, D 3);
tuple_conversion!(A 0, B 1, C 2, D 3, E 4);
tuple_conversion!(A 0, B 1, C 2, D 3, E 4, F 5);
tuple_conversion!(A 0, B 1, C 2, D 3, E 4, F 5, G 6);
tuple_conversion!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);

/// Implement [`Convert`] as a plain clone for the listed types.
///
/// ```rust
/// use mimic_core::conversion::{Convert, DefaultConversion};
///
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct Level(pub u8);
///
/// mimic_core::passthrough!(DefaultConversion => Level);
///
/// assert_eq!(DefaultConversion.convert(&Level(3)), Level(3));
/// ```
#[macro_export]
macro_rules! passthrough {
    ($policy:ty => $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::conversion::Convert<$ty> for $policy {
                type Stored = $ty;

                fn convert(&self, value: &$ty) -> Self::Stored {
                    ::std::clone::Clone::clone(value)
                }
            }
        )+
    };
}

/// Generic pass-through impls shared by the bundled policies
macro_rules! shared_conversions {
    ($policy:ty) => {
        passthrough!($policy =>
            (), bool, char,
            i8, i16, i32, i64, i128, isize,
            u8, u16, u32, u64, u128, usize,
            f32, f64,
            String, Cow<'static, str>, Duration,
        );

        impl<T: Clone + 'static> Convert<Vec<T>> for $policy {
            type Stored = Vec<T>;

            fn convert(&self, value: &Vec<T>) -> Self::Stored {
                value.clone()
            }
        }

        impl<T: Clone + 'static> Convert<Option<T>> for $policy {
            type Stored = Option<T>;

            fn convert(&self, value: &Option<T>) -> Self::Stored {
                value.clone()
            }
        }

        impl<T: ?Sized + 'static> Convert<Rc<T>> for $policy {
            type Stored = Rc<T>;

            fn convert(&self, value: &Rc<T>) -> Self::Stored {
                Rc::clone(value)
            }
        }

        impl<T: ?Sized + 'static> Convert<Arc<T>> for $policy {
            type Stored = Arc<T>;

            fn convert(&self, value: &Arc<T>) -> Self::Stored {
                Arc::clone(value)
            }
        }
    };
}

/// The safe default: dereference owning pointers, own string literals.
///
/// Shared pointers are stored as another strong reference, which keeps the
/// pointee alive for as long as the history holds it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConversion;

impl ConversionPolicy for DefaultConversion {}

shared_conversions!(DefaultConversion);

impl<T: Clone + 'static> Convert<Box<T>> for DefaultConversion {
    type Stored = T;

    fn convert(&self, value: &Box<T>) -> Self::Stored {
        (**value).clone()
    }
}

impl Convert<&'static str> for DefaultConversion {
    type Stored = String;

    fn convert(&self, value: &&'static str) -> Self::Stored {
        (*value).to_owned()
    }
}

/// The cheap alternative: store everything as is, except boxes, which are
/// stored as a raw non-owning view.
///
/// The view is never dereferenced by this crate. It is only good for identity
/// comparisons, and it dangles as soon as the box is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalConversion;

impl ConversionPolicy for MinimalConversion {}

shared_conversions!(MinimalConversion);

impl<T: ?Sized + 'static> Convert<Box<T>> for MinimalConversion {
    type Stored = *const T;

    fn convert(&self, value: &Box<T>) -> Self::Stored {
        &**value as *const T
    }
}

passthrough!(MinimalConversion => &'static str);
