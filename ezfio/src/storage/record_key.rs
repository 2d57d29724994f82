use derive_more::{Display, From};
use thiserror::Error;

/// The key of a record: a `section` directory and a record `name` inside it.
///
/// Displayed as `section/name`, which is also the path of the record relative to the store root.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display("{section}/{name}")]
pub struct RecordKey {
    section: String,
    name: String,
}

/// An invalid record key.
#[derive(Debug, From, Error)]
#[error("invalid record key {0}")]
pub struct RecordKeyError(String);

impl RecordKey {
    /// Create a new record key from a `section` and a record `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordKeyError`] if either component is not valid according to [`RecordKey::validate_component()`].
    pub fn new(
        section: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, RecordKeyError> {
        let section = section.into();
        let name = name.into();
        if Self::validate_component(&section) && Self::validate_component(&name) {
            Ok(Self { section, name })
        } else {
            Err(RecordKeyError(format!("{section}/{name}")))
        }
    }

    /// Validates a single key component (a section or a record name).
    ///
    /// A component is a non-empty string without `/` or whitespace which does not start with `.`,
    /// since dot files are reserved for `.version` markers and temporary files.
    #[must_use]
    pub fn validate_component(component: &str) -> bool {
        !component.is_empty()
            && !component.starts_with('.')
            && !component.contains('/')
            && !component.chars().any(char::is_whitespace)
    }

    /// The section of the record.
    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    /// The name of the record within its section.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name of the file holding the record when it is an array.
    #[must_use]
    pub fn array_file_name(&self) -> String {
        format!("{}.gz", self.name)
    }
}

impl TryFrom<&str> for RecordKey {
    type Error = RecordKeyError;

    fn try_from(key: &str) -> Result<Self, Self::Error> {
        match key.split_once('/') {
            Some((section, name)) => Self::new(section, name),
            None => Err(RecordKeyError(key.to_string())),
        }
    }
}
