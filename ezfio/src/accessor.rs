//! Accessors of the catalogue variables.
//!
//! `get`, `set` and `has` are generic over the [catalogue](crate::catalogue): the kind and shape of a variable
//! come from its [`Variable`] description, and the extents of an array are recomputed from the governing
//! variables on every access.
//!
//! A `get` or `set` of an array first reads each governing variable (each read holding only the lock of that
//! variable), then holds the lock of the array record for the read or write itself.
//! No two record locks are ever held at once.
//! A concurrent write of a governing variable between these steps is not prevented: the array access then
//! fails with [`CodecError::ShapeMismatch`](crate::codec::CodecError::ShapeMismatch) or writes the array with
//! the extents that were read.

use crate::{
    array::{flatten, ArrayShape, Nested},
    catalogue::{try_variable, Dimension, Shape, Source, Variable},
    ezfio::{Ezfio, EzfioError},
    value::{IncompatibleValueError, Scalar, Value},
};

impl Ezfio {
    /// Read the variable `name` (`<section>_<name>`).
    ///
    /// # Errors
    /// Returns [`EzfioError::UnknownVariable`] if `name` is not in the catalogue,
    /// [`EzfioError::RecordNotSet`] if the variable (or a governing variable) has not been written,
    /// or any other error of reading a record.
    pub fn get(&self, name: &str) -> Result<Value, EzfioError> {
        self.get_variable(try_variable(name)?)
    }

    /// Read the variable `name` and convert it to `T`.
    ///
    /// ```no_run
    /// # use ezfio::Ezfio;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let ezfio = Ezfio::open("h2o.ezfio")?;
    /// let nucl_num: i32 = ezfio.get_as("nuclei_nucl_num")?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// Returns [`EzfioError::KindMismatch`] if the value cannot be converted to `T`, or see [`get`](Ezfio::get).
    pub fn get_as<T>(&self, name: &str) -> Result<T, EzfioError>
    where
        T: TryFrom<Value, Error = IncompatibleValueError>,
    {
        Ok(T::try_from(self.get(name)?)?)
    }

    /// Read `variable`.
    ///
    /// # Errors
    /// See [`get`](Ezfio::get).
    pub fn get_variable(&self, variable: &Variable) -> Result<Value, EzfioError> {
        let key = match variable.source() {
            Source::Derived { compute, .. } => return compute(self),
            Source::Stored => variable.key()?,
        };
        match variable.shape() {
            Shape::Scalar => {
                let _lock = self.lock_record(&key);
                Ok(self.read_scalar(&key, variable.kind())?.into())
            }
            Shape::Array(dimensions) => {
                let shape = self.array_shape(dimensions)?;
                let _lock = self.lock_record(&key);
                Ok(self.read_array(&key, variable.kind(), &shape)?.into())
            }
        }
    }

    /// Write the variable `name` (`<section>_<name>`).
    ///
    /// A scalar variable takes a [`Nested::Scalar`].
    /// An array variable takes a nested sequence (or a flat sequence) with as many elements as the product of
    /// its extents, in storage order (see [`reshape`](crate::array::reshape)).
    /// Values are [coerced](crate::value::Scalar::coerce) to the kind of the variable.
    ///
    /// # Errors
    /// Returns
    ///  - [`EzfioError::UnknownVariable`] if `name` is not in the catalogue,
    ///  - [`EzfioError::NotWritable`] if the variable is derived,
    ///  - [`EzfioError::KindMismatch`] or [`EzfioError::InvalidShape`] if `value` does not fit the variable,
    ///  - [`EzfioError::RecordNotSet`] if a governing variable has not been written,
    ///  - [`StorageError::ReadOnly`](crate::storage::StorageError::ReadOnly) if the handle is read only, or any other error of writing a record.
    pub fn set(&self, name: &str, value: impl Into<Nested>) -> Result<(), EzfioError> {
        self.set_variable(try_variable(name)?, value.into())
    }

    /// Write `variable`.
    ///
    /// # Errors
    /// See [`set`](Ezfio::set).
    pub fn set_variable(&self, variable: &Variable, value: Nested) -> Result<(), EzfioError> {
        let key = match variable.source() {
            Source::Derived { .. } => return Err(EzfioError::NotWritable(variable.full_name())),
            Source::Stored => variable.key()?,
        };
        match (variable.shape(), value) {
            (Shape::Scalar, Nested::Scalar(scalar)) => {
                let _lock = self.lock_record(&key);
                self.write_scalar(&key, variable.kind(), scalar)
            }
            (Shape::Scalar, Nested::List(_)) => Err(EzfioError::InvalidShape(
                variable.full_name(),
                "expected a scalar, got a sequence".to_string(),
            )),
            (Shape::Array(dimensions), value) => {
                let shape = self.array_shape(dimensions)?;
                let _lock = self.lock_record(&key);
                self.write_array_elements(&key, variable.kind(), shape, flatten(value))
            }
        }
    }

    /// Returns true if the variable `name` (`<section>_<name>`) has been written.
    ///
    /// `has` is true if and only if a subsequent [`get`](Ezfio::get) would not fail with
    /// [`EzfioError::RecordNotSet`] for this record: the record file can be opened for reading.
    /// A derived variable exists if the variable it is computed from exists.
    /// No lock is taken and the section is never created.
    ///
    /// # Errors
    /// Returns [`EzfioError::UnknownVariable`] if `name` is not in the catalogue, or a [`StorageError`](crate::storage::StorageError) if
    /// the handle is not bound or the record exists but cannot be opened.
    pub fn has(&self, name: &str) -> Result<bool, EzfioError> {
        self.has_variable(try_variable(name)?)
    }

    /// Returns true if `variable` has been written.
    ///
    /// # Errors
    /// See [`has`](Ezfio::has).
    pub fn has_variable(&self, variable: &Variable) -> Result<bool, EzfioError> {
        match variable.source() {
            Source::Derived { from, .. } => self.has(from),
            Source::Stored if variable.is_array() => Ok(self.has_array(&variable.key()?)?),
            Source::Stored => Ok(self.has_scalar(&variable.key()?)?),
        }
    }

    /// Read the integer variable `name` as an array extent.
    ///
    /// # Errors
    /// Returns [`EzfioError::InvalidDimension`] if the value is not a non-negative integer, or see
    /// [`get`](Ezfio::get).
    pub fn dimension(&self, name: &str) -> Result<usize, EzfioError> {
        let value = self.get(name)?;
        value
            .as_scalar()
            .and_then(Scalar::as_i64)
            .and_then(|extent| usize::try_from(extent).ok())
            .ok_or_else(|| EzfioError::InvalidDimension(name.to_string(), value.to_string()))
    }

    /// The current shape of `variable`, or [`None`] if it is a scalar.
    ///
    /// # Errors
    /// Returns an error if a governing variable cannot be read.
    pub fn variable_shape(&self, variable: &Variable) -> Result<Option<ArrayShape>, EzfioError> {
        match variable.shape() {
            Shape::Scalar => Ok(None),
            Shape::Array(dimensions) => self.array_shape(dimensions).map(Some),
        }
    }

    fn array_shape(&self, dimensions: &[Dimension]) -> Result<ArrayShape, EzfioError> {
        dimensions
            .iter()
            .map(|dimension| match dimension {
                Dimension::Fixed(extent) => Ok(*extent),
                Dimension::Variable(name) => self.dimension(name),
                Dimension::Computed(_, compute) => compute(self),
            })
            .collect()
    }
}
