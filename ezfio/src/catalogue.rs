//! The catalogue of EZFIO variables.
//!
//! Every variable is described by a [`Variable`]: its section, its name, its [`RecordKind`] and its [`Shape`].
//! The extents of an array variable are not stored with the array, they are [`Dimension`]s recomputed from
//! other variables on every access.
//!
//! A variable is addressed by its full name `<section>_<name>`, for example `nuclei_nucl_coord`.

use std::{collections::HashMap, sync::OnceLock};

use crate::{
    ezfio::{Ezfio, EzfioError, METADATA_SECTION},
    kind::RecordKind,
    storage::{RecordKey, RecordKeyError},
    value::Value,
};

/// The extent of one dimension of an array variable.
#[derive(Clone, Copy, Debug)]
pub enum Dimension {
    /// A constant extent.
    Fixed(usize),
    /// The value of another (integer scalar) variable.
    Variable(&'static str),
    /// An extent computed from other variables, with a description of the computation.
    Computed(&'static str, fn(&Ezfio) -> Result<usize, EzfioError>),
}

/// The shape of a variable.
#[derive(Clone, Copy, Debug)]
pub enum Shape {
    /// A scalar.
    Scalar,
    /// An array with the given dimensions, the first dimension varying fastest.
    Array(&'static [Dimension]),
}

/// Where the value of a variable comes from.
#[derive(Clone, Copy, Debug)]
pub enum Source {
    /// The variable is a record in the store.
    Stored,
    /// The variable is computed from the variable `from` on every access and is never stored.
    Derived {
        /// The variable the value is computed from.
        from: &'static str,
        /// The computation.
        compute: fn(&Ezfio) -> Result<Value, EzfioError>,
    },
}

/// A variable of the catalogue.
#[derive(Clone, Copy, Debug)]
pub struct Variable {
    section: &'static str,
    name: &'static str,
    kind: RecordKind,
    shape: Shape,
    source: Source,
}

impl Variable {
    const fn scalar(section: &'static str, name: &'static str, kind: RecordKind) -> Self {
        Self {
            section,
            name,
            kind,
            shape: Shape::Scalar,
            source: Source::Stored,
        }
    }

    const fn array(
        section: &'static str,
        name: &'static str,
        kind: RecordKind,
        dimensions: &'static [Dimension],
    ) -> Self {
        Self {
            section,
            name,
            kind,
            shape: Shape::Array(dimensions),
            source: Source::Stored,
        }
    }

    const fn derived(
        section: &'static str,
        name: &'static str,
        kind: RecordKind,
        from: &'static str,
        compute: fn(&Ezfio) -> Result<Value, EzfioError>,
    ) -> Self {
        Self {
            section,
            name,
            kind,
            shape: Shape::Scalar,
            source: Source::Derived { from, compute },
        }
    }

    /// The section of the variable.
    #[must_use]
    pub const fn section(&self) -> &'static str {
        self.section
    }

    /// The name of the variable within its section.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The full name of the variable, `<section>_<name>`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}_{}", self.section, self.name)
    }

    /// The kind of the variable.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        self.kind
    }

    /// The shape of the variable.
    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// The source of the variable.
    #[must_use]
    pub const fn source(&self) -> Source {
        self.source
    }

    /// Returns true if the variable is an array.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self.shape, Shape::Array(_))
    }

    /// Returns true if the variable is computed rather than stored.
    #[must_use]
    pub const fn is_derived(&self) -> bool {
        matches!(self.source, Source::Derived { .. })
    }

    /// The key of the record holding the variable.
    ///
    /// # Errors
    /// Returns [`RecordKeyError`] if the section or name is not a valid key component.
    pub fn key(&self) -> Result<RecordKey, RecordKeyError> {
        RecordKey::new(self.section, self.name)
    }
}

use Dimension::{Computed, Fixed, Variable as Of};
use RecordKind::{Character, Double, Integer, Logical};

const AO_NUM: Dimension = Of("ao_basis_ao_num");
const AO_PRIM_NUM_MAX: Dimension = Of("ao_basis_ao_prim_num_max");
const NUCL_NUM: Dimension = Of("nuclei_nucl_num");
const JBH_SIZE: Dimension = Of("jastrow_jbh_size");
const J1E_SIZE: Dimension = Of("jastrow_j1e_size");

const PER_NUCLEUS: &[Dimension] = &[NUCL_NUM];
const PER_JBH_TERM_AND_NUCLEUS: &[Dimension] = &[JBH_SIZE, NUCL_NUM];
const PER_J1E_TERM_AND_NUCLEUS: &[Dimension] = &[J1E_SIZE, NUCL_NUM];

fn ao_prim_num_max(ezfio: &Ezfio) -> Result<Value, EzfioError> {
    let ao_prim_num = ezfio.get_as::<crate::array::Array>("ao_basis_ao_prim_num")?;
    ao_prim_num
        .maxval()
        .cloned()
        .map(Value::Scalar)
        .ok_or_else(|| {
            EzfioError::InvalidShape(
                "ao_basis_ao_prim_num_max".to_string(),
                "the maximum of an empty array is undefined".to_string(),
            )
        })
}

fn jast_qmckl_a_vector_size(ezfio: &Ezfio) -> Result<usize, EzfioError> {
    let type_nucl_num = ezfio.dimension("jastrow_jast_qmckl_type_nucl_num")?;
    let aord_num = ezfio.dimension("jastrow_jast_qmckl_aord_num")?;
    Ok(type_nucl_num * aord_num + type_nucl_num)
}

fn jast_qmckl_b_vector_size(ezfio: &Ezfio) -> Result<usize, EzfioError> {
    Ok(ezfio.dimension("jastrow_jast_qmckl_bord_num")? + 1)
}

static VARIABLES: &[Variable] = &[
    // ezfio
    Variable::scalar(METADATA_SECTION, "creation", Character),
    Variable::scalar(METADATA_SECTION, "user", Character),
    Variable::scalar(METADATA_SECTION, "library", Character),
    Variable::scalar(METADATA_SECTION, "last_library", Character),
    // ao_basis
    Variable::scalar("ao_basis", "ao_num", Integer),
    Variable::array("ao_basis", "ao_prim_num", Integer, &[AO_NUM]),
    Variable::array("ao_basis", "ao_nucl", Integer, &[AO_NUM]),
    Variable::array("ao_basis", "ao_power", Integer, &[AO_NUM, Fixed(3)]),
    Variable::derived(
        "ao_basis",
        "ao_prim_num_max",
        Integer,
        "ao_basis_ao_prim_num",
        ao_prim_num_max,
    ),
    Variable::array("ao_basis", "ao_coef", Double, &[AO_NUM, AO_PRIM_NUM_MAX]),
    Variable::array("ao_basis", "ao_expo", Double, &[AO_NUM, AO_PRIM_NUM_MAX]),
    // nuclei
    Variable::scalar("nuclei", "nucl_num", Integer),
    Variable::array("nuclei", "nucl_label", Character, PER_NUCLEUS),
    Variable::array("nuclei", "nucl_charge", Double, PER_NUCLEUS),
    Variable::array("nuclei", "nucl_coord", Double, &[NUCL_NUM, Fixed(3)]),
    // jastrow
    Variable::scalar("jastrow", "j2e_type", Character),
    Variable::scalar("jastrow", "j1e_type", Character),
    Variable::scalar("jastrow", "env_type", Character),
    Variable::scalar("jastrow", "jbh_size", Integer),
    Variable::array("jastrow", "jbh_ee", Double, PER_NUCLEUS),
    Variable::array("jastrow", "jbh_en", Double, PER_NUCLEUS),
    Variable::array("jastrow", "jbh_c", Double, PER_JBH_TERM_AND_NUCLEUS),
    Variable::array("jastrow", "jbh_m", Integer, PER_JBH_TERM_AND_NUCLEUS),
    Variable::array("jastrow", "jbh_n", Integer, PER_JBH_TERM_AND_NUCLEUS),
    Variable::array("jastrow", "jbh_o", Integer, PER_JBH_TERM_AND_NUCLEUS),
    Variable::scalar("jastrow", "a_boys", Double),
    Variable::scalar("jastrow", "nu_erf", Double),
    Variable::array("jastrow", "env_expo", Double, PER_NUCLEUS),
    Variable::array("jastrow", "env_coef", Double, PER_NUCLEUS),
    Variable::scalar("jastrow", "j1e_size", Integer),
    Variable::array("jastrow", "j1e_expo", Double, PER_J1E_TERM_AND_NUCLEUS),
    Variable::array("jastrow", "j1e_coef", Double, PER_J1E_TERM_AND_NUCLEUS),
    Variable::array("jastrow", "j1e_coef_ao", Double, &[AO_NUM]),
    Variable::array("jastrow", "j1e_coef_ao2", Double, &[AO_NUM, AO_NUM]),
    Variable::scalar("jastrow", "mur_type", Integer),
    Variable::scalar("jastrow", "mu_r_ct", Double),
    Variable::scalar("jastrow", "jpsi_type", Character),
    Variable::scalar("jastrow", "inv_sgn_jast", Logical),
    Variable::scalar("jastrow", "jast_a_up_up", Double),
    Variable::scalar("jastrow", "jast_a_up_dn", Double),
    Variable::scalar("jastrow", "jast_b_up_up", Double),
    Variable::scalar("jastrow", "jast_b_up_dn", Double),
    Variable::array("jastrow", "jast_pen", Double, PER_NUCLEUS),
    Variable::array("jastrow", "jast_een_e_a", Double, PER_NUCLEUS),
    Variable::array("jastrow", "jast_een_e_b", Double, PER_NUCLEUS),
    Variable::array("jastrow", "jast_een_n", Double, PER_NUCLEUS),
    Variable::array("jastrow", "jast_core_a1", Double, PER_NUCLEUS),
    Variable::array("jastrow", "jast_core_a2", Double, PER_NUCLEUS),
    Variable::array("jastrow", "jast_core_b1", Double, PER_NUCLEUS),
    Variable::array("jastrow", "jast_core_b2", Double, PER_NUCLEUS),
    Variable::scalar("jastrow", "jast_qmckl_type_nucl_num", Integer),
    Variable::array(
        "jastrow",
        "jast_qmckl_type_nucl_vector",
        Integer,
        PER_NUCLEUS,
    ),
    Variable::scalar("jastrow", "jast_qmckl_rescale_ee", Double),
    Variable::array(
        "jastrow",
        "jast_qmckl_rescale_en",
        Double,
        &[Of("jastrow_jast_qmckl_type_nucl_num")],
    ),
    Variable::scalar("jastrow", "jast_qmckl_aord_num", Integer),
    Variable::scalar("jastrow", "jast_qmckl_bord_num", Integer),
    Variable::scalar("jastrow", "jast_qmckl_cord_num", Integer),
    Variable::array(
        "jastrow",
        "jast_qmckl_a_vector",
        Double,
        &[Computed(
            "jast_qmckl_type_nucl_num * jast_qmckl_aord_num + jast_qmckl_type_nucl_num",
            jast_qmckl_a_vector_size,
        )],
    ),
    Variable::array(
        "jastrow",
        "jast_qmckl_b_vector",
        Double,
        &[Computed("jast_qmckl_bord_num + 1", jast_qmckl_b_vector_size)],
    ),
    Variable::scalar("jastrow", "jast_qmckl_c_vector_size", Integer),
    Variable::array(
        "jastrow",
        "jast_qmckl_c_vector",
        Double,
        &[Of("jastrow_jast_qmckl_c_vector_size")],
    ),
];

/// All variables of the catalogue, grouped by section.
#[must_use]
pub fn variables() -> &'static [Variable] {
    VARIABLES
}

/// Returns the variable with the full name `name` (`<section>_<name>`).
#[must_use]
pub fn variable(name: &str) -> Option<&'static Variable> {
    static BY_NAME: OnceLock<HashMap<String, &'static Variable>> = OnceLock::new();
    BY_NAME
        .get_or_init(|| {
            VARIABLES
                .iter()
                .map(|variable| (variable.full_name(), variable))
                .collect()
        })
        .get(name)
        .copied()
}

/// Returns the variable with the full name `name`.
///
/// # Errors
/// Returns [`EzfioError::UnknownVariable`] if there is no such variable.
pub fn try_variable(name: &str) -> Result<&'static Variable, EzfioError> {
    variable(name).ok_or_else(|| EzfioError::UnknownVariable(name.to_string()))
}
