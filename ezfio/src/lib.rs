//! `ezfio` is a Rust library for EZFIO stores: directory-backed, typed record stores holding the wavefunction
//! data exchanged between quantum chemistry calculation steps.
//!
//! A store is a directory of *sections*, each holding *records*.
//! A record is a scalar or a dense array of one of five kinds (integer, 64-bit integer, double precision, logical,
//! character).
//! Scalars are one-line text files, arrays are gzip compressed text files, and every write replaces its record
//! atomically.
//! The extents of an array are not stored with the array: they are read from other records (the *governing*
//! variables), as described by the variable [catalogue].
//!
//! The on-disk format is compatible with stores written by the Fortran and Python EZFIO libraries.
//!
//! ## Example
//! ```rust
//! # use ezfio::{array::{Array, Nested}, Ezfio};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let dir = tempfile::TempDir::new()?;
//! let ezfio = Ezfio::open(dir.path().join("h2.ezfio"))?;
//! ezfio.set("nuclei_nucl_num", 2)?;
//! ezfio.set("nuclei_nucl_label", Nested::from_iter(["H", "H"]))?;
//! ezfio.set("jastrow_j2e_type", "Mu")?;
//!
//! assert!(ezfio.has("nuclei_nucl_label")?);
//! let labels: Array = ezfio.get_as("nuclei_nucl_label")?;
//! assert_eq!(labels.shape(), &[2]);
//! assert_eq!(ezfio.get("jastrow_j2e_type")?.to_string(), "'Mu'");
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//! An [`Ezfio`] handle can be shared between threads.
//! Accesses to the same record are serialised by a per-record lock held by the handle.
//! The locks are local to the handle: they do not protect a store from other handles or other processes.

mod accessor;
pub mod archive;
pub mod array;
pub mod catalogue;
pub mod codec;
pub mod command;
pub mod config;
pub mod ezfio;
pub mod kind;
pub mod storage;
pub mod value;

pub use crate::{
    array::{Array, Nested},
    ezfio::{Ezfio, EzfioError, EzfioOptions},
    kind::RecordKind,
    value::{Scalar, Value},
};
