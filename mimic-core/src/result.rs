//! Typed, ordered views over recorded calls
//!
//! A [`ResultSet`] owns a copy of the matched argument tuples, one row per
//! call, in the order the calls were recorded. It has no link back to the
//! recorder, so it stays valid while recording continues.
//!
//! Columns are read by position or, when the type is unique within the row,
//! by type:
//!
//! ```rust
//! use mimic_core::result::ResultSet;
//!
//! let rows = ResultSet::from_rows(vec![(3, String::from("three"))]);
//!
//! assert_eq!(rows.get::<0>(0), Some(&3));
//! assert_eq!(rows.get_by_type::<String, _>(0).map(String::as_str), Some("three"));
//! assert_eq!(rows.get::<1>(1), None);
//! ```
//!
//! Asking for a type that occurs in more than one column does not compile:
//!
//! ```rust,compile_fail
//! use mimic_core::result::ResultSet;
//!
//! let rows = ResultSet::from_rows(vec![(1i32, 2i32)]);
//! let _ = rows.get_by_type::<i32, _>(0);
//! ```

use std::ops::Index;

/// Positional access to column `N` of a row tuple
pub trait Column<const N: usize> {
    /// Type of the column
    type Output;

    /// Borrow the column
    fn column(&self) -> &Self::Output;
}

/// Access to the single column of type `T` in a row tuple.
///
/// `I` is one of the [`index`] markers and is always inferred. When several
/// columns have type `T` it cannot be, which rejects the ambiguous lookup at
/// compile time.
pub trait Pick<T, I> {
    /// Borrow the column of type `T`
    fn pick(&self) -> &T;
}

/// Column position markers used by [`Pick`]
pub mod index {
    /// First column
    pub struct Col0;
    /// Second column
    pub struct Col1;
    /// Third column
    pub struct Col2;
    /// Fourth column
    pub struct Col3;
    /// Fifth column
    pub struct Col4;
    /// Sixth column
    pub struct Col5;
    /// Seventh column
    pub struct Col6;
    /// Eighth column
    pub struct Col7;
}

macro_rules! column_impl {
    ([$($all:ident),+] $ty:ident $idx:tt $marker:ident) => {
        impl<$($all),+> Column<$idx> for ($($all,)+) {
            type Output = $ty;

            fn column(&self) -> &$ty {
                &self.$idx
            }
        }

        impl<$($all),+> Pick<$ty, index::$marker> for ($($all,)+) {
            fn pick(&self) -> &$ty {
                &self.$idx
            }
        }
    };
}

macro_rules! column_impls {
    ($all:tt; $($ty:ident $idx:tt $marker:ident),+) => {
        $(column_impl!($all $ty $idx $marker);)+
    };
}

column_impls!([A]; A 0 Col0);
column_impls!([A, B]; A 0 Col0, B 1 Col1);
column_impls!([A, B, C]; A 0 Col0, B 1 Col1, C 2 Col2);
column_impls!([A, B, C, D]; A 0 Col0, B 1 Col1, C 2 Col2, D 3 Col3);
column_impls!([A, B, C, D, E]; A 0 Col0, B 1 Col1, C 2 Col2, D 3 Col3, E 4 Col4);
column_impls!(
    [A, B, C, D, E, F];
    A 0 Col0, B 1 Col1, C 2 Col2, D 3 Col3, E 4 Col4, F 5 Col5
);
column_impls!(
    [A, B, C, D, E, F, G];
    A 0 Col0, B 1 Col1, C 2 Col2, D 3 Col3, E 4 Col4, F 5 Col5, G 6 Col6
);
column_impls!(
    [A, B, C, D, E, F, G, H];
    A 0 Col0, B 1 Col1, C 2 Col2, D 3 Col3, E 4 Col4, F 5 Col5, G 6 Col6, H 7 Col7
);

/// Immutable, ordered rows of recorded arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet<S> {
    rows: Vec<S>,
}

impl<S> ResultSet<S> {
    /// Build a result set from rows already in call order
    pub fn from_rows(rows: Vec<S>) -> Self {
        Self { rows }
    }

    /// Number of recorded calls
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no call matched
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The whole argument tuple of one call
    pub fn row(&self, row: usize) -> Option<&S> {
        self.rows.get(row)
    }

    /// Column `COLUMN` of one call
    pub fn get<const COLUMN: usize>(&self, row: usize) -> Option<&<S as Column<COLUMN>>::Output>
    where
        S: Column<COLUMN>,
    {
        self.rows.get(row).map(Column::<COLUMN>::column)
    }

    /// The column of type `T` of one call; the second parameter is inferred
    pub fn get_by_type<T, I>(&self, row: usize) -> Option<&T>
    where
        S: Pick<T, I>,
    {
        self.rows.get(row).map(Pick::pick)
    }

    /// Column `COLUMN` of every call, in call order
    pub fn column<const COLUMN: usize>(
        &self,
    ) -> impl Iterator<Item = &<S as Column<COLUMN>>::Output>
    where
        S: Column<COLUMN>,
    {
        self.rows.iter().map(Column::<COLUMN>::column)
    }

    /// Iterate over rows in call order
    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.rows.iter()
    }

    /// Take the rows out of the view
    pub fn into_rows(self) -> Vec<S> {
        self.rows
    }
}

impl<S> Default for ResultSet<S> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<S> Index<usize> for ResultSet<S> {
    type Output = S;

    fn index(&self, row: usize) -> &S {
        &self.rows[row]
    }
}

impl<S> IntoIterator for ResultSet<S> {
    type Item = S;
    type IntoIter = std::vec::IntoIter<S>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a, S> IntoIterator for &'a ResultSet<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
