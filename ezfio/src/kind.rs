//! Record kinds.

use derive_more::Display;

/// The kind of the elements of a record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum RecordKind {
    /// A 32-bit signed integer.
    #[display("integer")]
    Integer,
    /// A 64-bit signed integer.
    #[display("integer*8")]
    Integer64,
    /// An IEEE 754 double precision floating point number.
    #[display("double precision")]
    Double,
    /// A boolean, stored as `T` or `F`.
    #[display("logical")]
    Logical,
    /// A string, stored trimmed of surrounding whitespace.
    #[display("character")]
    Character,
}

impl RecordKind {
    /// All record kinds.
    pub const ALL: [RecordKind; 5] = [
        Self::Integer,
        Self::Integer64,
        Self::Double,
        Self::Logical,
        Self::Character,
    ];

    /// The two letter abbreviation of the kind used in EZFIO configuration files.
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Integer => "in",
            Self::Integer64 => "i8",
            Self::Double => "do",
            Self::Logical => "lo",
            Self::Character => "ch",
        }
    }

    /// Create a kind from its two letter abbreviation.
    ///
    /// `re` (real) is accepted as a synonym of `do`, both are stored as double precision.
    #[must_use]
    pub fn from_abbreviation(abbreviation: &str) -> Option<Self> {
        match abbreviation {
            "in" => Some(Self::Integer),
            "i8" => Some(Self::Integer64),
            "do" | "re" => Some(Self::Double),
            "lo" => Some(Self::Logical),
            "ch" => Some(Self::Character),
            _ => None,
        }
    }

    /// Returns true if the kind is an integer kind.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Integer | Self::Integer64)
    }
}
