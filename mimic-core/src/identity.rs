//! Subject and operation identity
//!
//! A [`SubjectId`] names one intercepted instance (a mock object or functor).
//! An [`Operation`] names one exact intercepted signature and carries its
//! declared parameter tuple and result type, so every record and query made
//! through the same handle agrees on the stored argument type.
//!
//! # Example
//!
//! ```rust
//! use mimic_core::identity::{Operation, SubjectId};
//!
//! static SET_LEVEL: Operation<(i32,)> = Operation::new("Stove::set_level");
//!
//! let a = SubjectId::generate();
//! let b = a;
//! assert_eq!(a, b);
//! assert_ne!(a, SubjectId::generate());
//! assert_eq!(SubjectId::default(), SubjectId::UNSET);
//! assert_eq!(SET_LEVEL.id(), SET_LEVEL.id());
//! ```

use serde::{Serialize, Serializer};
use std::any::TypeId;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Next subject integer. Zero is reserved for [`SubjectId::UNSET`].
static NEXT_SUBJECT: AtomicU64 = AtomicU64::new(1);

/// Next explicitly assigned operation integer.
static NEXT_OPERATION: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of one intercepted subject.
///
/// Identifiers are never recycled: once every copy of a generated identifier
/// is gone, its integer is simply never handed out again. With 64 bits that is
/// enough for a billion identifiers per second for several centuries.
///
/// The uninitialized value compares equal to itself and acts as a wildcard in
/// queries ("any subject") and as "not applicable" when recording free
/// function calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SubjectId(u64);

impl SubjectId {
    /// The uninitialized identity
    pub const UNSET: SubjectId = SubjectId(0);

    /// Generate a new identity that has never been issued before
    pub fn generate() -> Self {
        SubjectId(NEXT_SUBJECT.fetch_add(1, Ordering::Relaxed))
    }

    /// Whether this identity came from [`SubjectId::generate`]
    pub fn is_initialized(&self) -> bool {
        self.0 != 0
    }

    /// Wildcard-aware comparison used by queries.
    ///
    /// An uninitialized query identity matches every recorded subject;
    /// otherwise the identities must be equal.
    pub fn matches(&self, recorded: SubjectId) -> bool {
        !self.is_initialized() || *self == recorded
    }
}

impl From<SubjectId> for bool {
    fn from(id: SubjectId) -> Self {
        id.is_initialized()
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_initialized() {
            write!(f, "subject#{}", self.0)
        } else {
            f.write_str("subject#unset")
        }
    }
}

impl Serialize for SubjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_initialized() {
            serializer.serialize_some(&self.0)
        } else {
            serializer.serialize_none()
        }
    }
}

/// Identifier of one exact intercepted signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(OperationKey);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum OperationKey {
    /// Handed out on first use of a named [`Operation`]
    Assigned(u64),
    /// Shared by every wrapper of one kind and signature
    Signature(TypeId),
}

impl OperationId {
    fn assign() -> Self {
        OperationId(OperationKey::Assigned(
            NEXT_OPERATION.fetch_add(1, Ordering::Relaxed),
        ))
    }

    fn of<K: 'static>() -> Self {
        OperationId(OperationKey::Signature(TypeId::of::<K>()))
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            OperationKey::Assigned(n) => write!(f, "op#{}", n),
            OperationKey::Signature(type_id) => {
                let mut hasher = DefaultHasher::new();
                type_id.hash(&mut hasher);
                write!(f, "op#sig-{:08x}", hasher.finish() as u32)
            }
        }
    }
}

impl Serialize for OperationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Typed handle for one intercepted operation.
///
/// `P` is the declared parameter tuple and `R` the declared result. Handles
/// are normally `static` items next to the trait they describe; the
/// identifier is assigned the first time the handle is used. Two handles are
/// always distinct operations, even when they share a name, which is how
/// overloads and `&self`/`&mut self` variants are told apart.
///
/// Handles are deliberately not `Clone`: always refer to the one handle.
pub struct Operation<P, R = ()> {
    name: &'static str,
    id: OnceLock<OperationId>,
    signature: PhantomData<fn() -> (P, R)>,
}

impl<P, R> Operation<P, R> {
    /// Declare an operation with an explicitly assigned identity
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            id: OnceLock::new(),
            signature: PhantomData,
        }
    }

    /// Identity of this operation
    pub fn id(&self) -> OperationId {
        *self.id.get_or_init(OperationId::assign)
    }

    /// Human readable name, used in logs and timelines
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<P: 'static, R: 'static> Operation<P, R> {
    /// Handle whose identity is derived from the kind marker `K` and the
    /// signature alone.
    ///
    /// Every handle built with the same `K`, `P` and `R` is the same
    /// operation. Functor and free-function wrappers use this so that all
    /// wrappers of one signature record under one operation.
    pub fn keyed<K: 'static>(name: &'static str) -> Self {
        Self {
            name,
            id: OnceLock::from(OperationId::of::<(K, PhantomData<fn(P) -> R>)>()),
            signature: PhantomData,
        }
    }
}

impl<P, R> fmt::Debug for Operation<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("id", &self.id.get())
            .finish()
    }
}

impl<P, R> fmt::Display for Operation<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id())
    }
}

#[cfg(test)]
mod identity_tests {
    use super::*;

    struct Functor;
    struct Function;

    #[test]
    fn test_generated_ids_never_repeat() {
        let ids: Vec<SubjectId> = (0..1000).map(|_| SubjectId::generate()).collect();

        for (i, a) in ids.iter().enumerate() {
            assert!(a.is_initialized());
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_copy_equals_source() {
        let id = SubjectId::generate();
        let copy = id;

        assert_eq!(id, copy);
        assert!(bool::from(copy));
    }

    #[test]
    fn test_default_ids_are_equal() {
        let a = SubjectId::default();
        let b = SubjectId::default();

        assert_eq!(a, b);
        assert_eq!(a, SubjectId::UNSET);
        assert!(!a.is_initialized());
        assert!(!bool::from(a));
    }

    #[test]
    fn test_wildcard_matching() {
        let a = SubjectId::generate();
        let b = SubjectId::generate();

        assert!(SubjectId::UNSET.matches(a));
        assert!(SubjectId::UNSET.matches(SubjectId::UNSET));
        assert!(a.matches(a));
        assert!(!a.matches(b));
        assert!(!a.matches(SubjectId::UNSET));
    }

    #[test]
    fn test_display() {
        assert_eq!(SubjectId::UNSET.to_string(), "subject#unset");
        assert!(SubjectId::generate().to_string().starts_with("subject#"));
    }

    #[test]
    fn test_operations_with_same_name_are_distinct() {
        static GET_LABEL: Operation<(), String> = Operation::new("label");
        static GET_LABEL_MUT: Operation<(), String> = Operation::new("label");

        assert_eq!(GET_LABEL.id(), GET_LABEL.id());
        assert_ne!(GET_LABEL.id(), GET_LABEL_MUT.id());
        assert_eq!(GET_LABEL.name(), GET_LABEL_MUT.name());
    }

    #[test]
    fn test_keyed_operations_share_identity_per_kind_and_signature() {
        let a = Operation::<(i32,), ()>::keyed::<Functor>("call");
        let b = Operation::<(i32,), ()>::keyed::<Functor>("call");
        let other_signature = Operation::<(f64,), ()>::keyed::<Functor>("call");
        let other_kind = Operation::<(i32,), ()>::keyed::<Function>("call");

        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), other_signature.id());
        assert_ne!(a.id(), other_kind.id());
    }

    #[test]
    fn test_subject_serialization() {
        let json = serde_json::to_string(&SubjectId::UNSET).unwrap();
        assert_eq!(json, "null");

        let id = SubjectId::generate();
        let json = serde_json::to_value(id).unwrap();
        assert!(json.is_u64());
    }
}
