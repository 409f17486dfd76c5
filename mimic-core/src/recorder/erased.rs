//! Type-erased storage for one call's converted arguments

use std::any::{Any, type_name};
use std::fmt;

/// Heap-owned argument tuple whose concrete type is forgotten until queried.
///
/// The only way back to the tuple is [`downcast_ref`](Self::downcast_ref)
/// with the exact type that was stored. Any other type yields `None`.
pub struct ErasedArguments {
    tuple: Box<dyn Any>,
    type_name: &'static str,
}

impl ErasedArguments {
    /// Take ownership of a converted argument tuple
    pub fn new<S: 'static>(tuple: S) -> Self {
        Self {
            tuple: Box::new(tuple),
            type_name: type_name::<S>(),
        }
    }

    /// Borrow the tuple as `S`, if that is what was stored
    pub fn downcast_ref<S: 'static>(&self) -> Option<&S> {
        self.tuple.downcast_ref::<S>()
    }

    /// Whether the stored tuple has type `S`
    pub fn is<S: 'static>(&self) -> bool {
        self.tuple.is::<S>()
    }

    /// Name of the stored tuple type, for diagnostics only
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for ErasedArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedArguments")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod erased_tests {
    use super::*;

    #[test]
    fn test_downcast_with_stored_type() {
        let erased = ErasedArguments::new((7i32, String::from("seven")));

        assert!(erased.is::<(i32, String)>());
        assert_eq!(
            erased.downcast_ref::<(i32, String)>(),
            Some(&(7, String::from("seven")))
        );
    }

    #[test]
    fn test_downcast_with_other_type_is_none() {
        let erased = ErasedArguments::new((7i32,));

        assert!(erased.downcast_ref::<(i64,)>().is_none());
        assert!(erased.downcast_ref::<i32>().is_none());
        assert!(erased.type_name().contains("i32"));
    }
}
