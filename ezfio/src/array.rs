//! Dense multi-dimensional arrays and their nested sequence representation.
//!
//! ## Element order
//! Array elements are held (and stored on disk) in the order written by the Fortran EZFIO library:
//! the **first** dimension varies fastest.
//! Element `(i0, i1, ..., in)` of an array with shape `(d0, d1, ..., dn)` is at flat offset
//! `i0 + d0 * (i1 + d1 * (i2 + ...))`.
//!
//! The nested sequence view ([`Nested`]) groups the flat elements by `d0`, then by `d1`, and so on,
//! so the innermost sequences have length `d0` and the outermost sequence has length `dn`.
//! For example, the array with shape `(2, 3)` and elements `[1, 2, 3, 4, 5, 6]` has the nested form
//! `[[1, 2], [3, 4], [5, 6]]`.
//! [`flatten`] and [`reshape`] are exact inverses under this convention.

use itertools::Itertools;
use thiserror::Error;

use crate::{
    kind::RecordKind,
    value::{IncompatibleValueError, Scalar, Value},
};

/// The shape of an array.
pub type ArrayShape = Vec<usize>;

/// An array creation error.
#[derive(Debug, Error)]
pub enum ArrayCreateError {
    /// The number of elements does not match the shape.
    #[error("got {0} elements, expected {1} for shape {2:?}")]
    InvalidElementCount(usize, usize, ArrayShape),
    /// An array must have at least one dimension.
    #[error("an array must have at least one dimension")]
    ZeroRank,
    /// An element is not compatible with the kind of the array.
    #[error(transparent)]
    IncompatibleElement(#[from] IncompatibleValueError),
}

/// A dense array of scalars of a single [`RecordKind`].
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    kind: RecordKind,
    shape: ArrayShape,
    elements: Vec<Scalar>,
}

impl Array {
    /// Create a new array from `elements` in storage order (first dimension fastest).
    ///
    /// Elements are [coerced](Scalar::coerce) to `kind`.
    ///
    /// # Errors
    /// Returns an [`ArrayCreateError`] if
    ///  - `shape` is empty,
    ///  - the number of elements is not the product of `shape`, or
    ///  - an element cannot be represented as `kind`.
    pub fn new(
        kind: RecordKind,
        shape: ArrayShape,
        elements: Vec<Scalar>,
    ) -> Result<Self, ArrayCreateError> {
        if shape.is_empty() {
            return Err(ArrayCreateError::ZeroRank);
        }
        let num_elements = shape.iter().product::<usize>();
        if elements.len() != num_elements {
            return Err(ArrayCreateError::InvalidElementCount(
                elements.len(),
                num_elements,
                shape,
            ));
        }
        let elements = elements
            .into_iter()
            .map(|element| element.coerce(kind))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            kind,
            shape,
            elements,
        })
    }

    /// Create a new array from a nested sequence.
    ///
    /// The nested sequence is [flattened](flatten) and then interpreted with [`Array::new`].
    /// Only the total number of elements is checked against `shape`, not the nesting itself.
    ///
    /// # Errors
    /// See [`Array::new`].
    pub fn from_nested(
        kind: RecordKind,
        shape: ArrayShape,
        nested: Nested,
    ) -> Result<Self, ArrayCreateError> {
        Self::new(kind, shape, flatten(nested))
    }

    /// The kind of the array elements.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        self.kind
    }

    /// The shape of the array.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The rank (number of dimensions) of the array.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// The number of elements in the array.
    #[must_use]
    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// The elements in storage order.
    #[must_use]
    pub fn elements(&self) -> &[Scalar] {
        &self.elements
    }

    /// Convert into the elements in storage order.
    #[must_use]
    pub fn into_elements(self) -> Vec<Scalar> {
        self.elements
    }

    /// Returns the element at `indices`, or [`None`] if `indices` is out of bounds.
    #[must_use]
    pub fn get(&self, indices: &[usize]) -> Option<&Scalar> {
        if indices.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;
        for (&index, &extent) in indices.iter().zip(&self.shape).rev() {
            if index >= extent {
                return None;
            }
            offset = offset * extent + index;
        }
        self.elements.get(offset)
    }

    /// The largest element, or [`None`] if the array is empty or contains incomparable elements (NaN).
    #[must_use]
    pub fn maxval(&self) -> Option<&Scalar> {
        self.reduce(std::cmp::Ordering::Greater)
    }

    /// The smallest element, or [`None`] if the array is empty or contains incomparable elements (NaN).
    #[must_use]
    pub fn minval(&self) -> Option<&Scalar> {
        self.reduce(std::cmp::Ordering::Less)
    }

    fn reduce(&self, keep: std::cmp::Ordering) -> Option<&Scalar> {
        let mut elements = self.elements.iter();
        let mut best = elements.next()?;
        for element in elements {
            if element.partial_cmp(best)? == keep {
                best = element;
            }
        }
        Some(best)
    }

    /// The number of elements equal to `value`.
    #[must_use]
    pub fn count(&self, value: &Scalar) -> usize {
        self.elements.iter().filter(|element| *element == value).count()
    }

    /// The nested sequence representation of the array.
    #[must_use]
    pub fn to_nested(&self) -> Nested {
        reshape(self.elements.clone(), &self.shape)
    }
}

/// A nested sequence of scalars.
///
/// This is the untyped, shape-free form in which array values are supplied by callers and printed by the
/// command line tool.
#[derive(Clone, Debug, PartialEq)]
pub enum Nested {
    /// A single scalar.
    Scalar(Scalar),
    /// A sequence.
    List(Vec<Nested>),
}

impl Nested {
    /// A Python style representation of the nested sequence.
    #[must_use]
    pub fn repr(&self) -> String {
        match self {
            Self::Scalar(scalar) => scalar.repr(),
            Self::List(items) => format!("[{}]", items.iter().map(Self::repr).join(", ")),
        }
    }

    /// Returns the scalar if this is not a sequence.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            Self::List(_) => None,
        }
    }
}

macro_rules! impl_nested_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Nested {
                fn from(value: $t) -> Self {
                    Self::Scalar(value.into())
                }
            }
        )*
    };
}

impl_nested_from_scalar!(Scalar, i32, i64, f64, bool, String, &str);

impl<T: Into<Nested>> FromIterator<T> for Nested {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::List(iter.into_iter().map(Into::into).collect())
    }
}

impl From<&Array> for Nested {
    fn from(array: &Array) -> Self {
        array.to_nested()
    }
}

impl From<Array> for Nested {
    fn from(array: Array) -> Self {
        reshape(array.elements, &array.shape)
    }
}

impl From<Value> for Nested {
    fn from(value: Value) -> Self {
        match value {
            Value::Scalar(scalar) => Self::Scalar(scalar),
            Value::Array(array) => array.into(),
        }
    }
}

/// Flatten a nested sequence of arbitrary depth into its scalars, depth first.
#[must_use]
pub fn flatten(nested: Nested) -> Vec<Scalar> {
    fn flatten_into(nested: Nested, out: &mut Vec<Scalar>) {
        match nested {
            Nested::Scalar(scalar) => out.push(scalar),
            Nested::List(items) => {
                for item in items {
                    flatten_into(item, out);
                }
            }
        }
    }
    let mut out = Vec::new();
    flatten_into(nested, &mut out);
    out
}

/// Reshape flat `elements` in storage order into a nested sequence with `shape`.
///
/// The elements are chunked by each extent of `shape` except the last, from first to last.
/// Trailing elements which do not fill a whole chunk are discarded.
#[must_use]
pub fn reshape(elements: Vec<Scalar>, shape: &[usize]) -> Nested {
    let mut level: Vec<Nested> = elements.into_iter().map(Nested::Scalar).collect();
    if let Some((_, inner)) = shape.split_last() {
        for &extent in inner {
            if level.is_empty() || extent == 0 {
                level.clear();
                break;
            }
            let chunks = level.into_iter().chunks(extent);
            level = chunks
                .into_iter()
                .map(|chunk| chunk.collect::<Vec<_>>())
                .filter(|chunk| chunk.len() == extent)
                .map(Nested::List)
                .collect();
        }
    }
    Nested::List(level)
}
