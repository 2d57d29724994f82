//! The command registry.
//!
//! Every catalogue variable has a `get_<variable>` and a `has_<variable>` command, and every stored variable
//! has a `set_<variable>` command.
//! Command lines are [normalised](normalize_command) by joining their words with `_` and lowercasing, so
//! `get jastrow j2e_type` runs `get_jastrow_j2e_type`.

use std::{collections::BTreeMap, sync::OnceLock};

use derive_more::Display;

use crate::{
    array::Nested,
    catalogue::{variables, Variable},
    ezfio::{Ezfio, EzfioError},
    value::Value,
};

/// The operation of a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Operation {
    /// Read a variable.
    #[display("get")]
    Get,
    /// Write a variable.
    #[display("set")]
    Set,
    /// Check whether a variable has been written.
    #[display("has")]
    Has,
}

/// The output of a command.
#[derive(Clone, Debug, PartialEq)]
pub enum CommandOutput {
    /// The value read by a `get` command.
    Value(Value),
    /// The result of a `has` command.
    Exists(bool),
    /// A `set` command completed.
    Written,
}

/// A command bound to a catalogue variable.
#[derive(Clone, Copy, Debug)]
pub struct Command {
    operation: Operation,
    variable: &'static Variable,
}

impl Command {
    /// The operation of the command.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// The variable of the command.
    #[must_use]
    pub const fn variable(&self) -> &'static Variable {
        self.variable
    }

    /// The name of the command, `<operation>_<variable>`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}_{}", self.operation, self.variable.full_name())
    }

    /// Run the command against `ezfio`.
    ///
    /// `value` is the value written by a `set` command and is ignored by other commands.
    ///
    /// # Errors
    /// Returns [`EzfioError::InvalidShape`] if a `set` command has no value, or the error of the underlying
    /// [`get`](Ezfio::get), [`set`](Ezfio::set) or [`has`](Ezfio::has).
    pub fn run(&self, ezfio: &Ezfio, value: Option<Nested>) -> Result<CommandOutput, EzfioError> {
        tracing::debug!(command = %self.name(), "run");
        match self.operation {
            Operation::Get => Ok(CommandOutput::Value(ezfio.get_variable(self.variable)?)),
            Operation::Has => Ok(CommandOutput::Exists(ezfio.has_variable(self.variable)?)),
            Operation::Set => {
                let value = value.ok_or_else(|| {
                    EzfioError::InvalidShape(self.variable.full_name(), "no value".to_string())
                })?;
                ezfio.set_variable(self.variable, value)?;
                Ok(CommandOutput::Written)
            }
        }
    }
}

/// Normalise the words of a command line into a command name.
///
/// ```
/// # use ezfio::command::normalize_command;
/// assert_eq!(normalize_command(["get", "Jastrow", "j2e_type"]), "get_jastrow_j2e_type");
/// ```
pub fn normalize_command<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    itertools::Itertools::join(
        &mut words.into_iter().map(|word| word.as_ref().to_lowercase()),
        "_",
    )
}

/// A registry of the commands of all catalogue variables.
#[derive(Debug)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Command>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Build the registry from the catalogue.
    #[must_use]
    pub fn new() -> Self {
        let mut commands = BTreeMap::new();
        for variable in variables() {
            let operations: &[Operation] = if variable.is_derived() {
                &[Operation::Get, Operation::Has]
            } else {
                &[Operation::Get, Operation::Set, Operation::Has]
            };
            for &operation in operations {
                let command = Command {
                    operation,
                    variable,
                };
                commands.insert(command.name(), command);
            }
        }
        Self { commands }
    }

    /// The registry of the catalogue, built on first use.
    #[must_use]
    pub fn global() -> &'static Self {
        static REGISTRY: OnceLock<CommandRegistry> = OnceLock::new();
        REGISTRY.get_or_init(Self::new)
    }

    /// Returns the command named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// The names of all commands, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// The number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if the registry has no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn command_names() {
        assert_eq!(
            normalize_command(["GET", "jastrow", "J2E_TYPE"]),
            "get_jastrow_j2e_type"
        );
        assert_eq!(normalize_command(Vec::<String>::new()), "");

        let registry = CommandRegistry::global();
        let stored = variables().iter().filter(|v| !v.is_derived()).count();
        assert_eq!(registry.len(), 2 * variables().len() + stored);
        assert!(registry.get("get_jastrow_j2e_type").is_some());
        assert!(registry.get("set_jastrow_j2e_type").is_some());
        assert!(registry.get("has_jastrow_j2e_type").is_some());
        assert!(registry.get("get_ao_basis_ao_prim_num_max").is_some());
        assert!(registry.get("set_ao_basis_ao_prim_num_max").is_none());
        assert!(registry.get("nonexistent_command").is_none());
        assert!(registry.names().any(|name| name == "has_nuclei_nucl_coord"));
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn command_run() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::TempDir::new()?;
        let ezfio = Ezfio::open(dir.path())?;
        let registry = CommandRegistry::global();
        let command = |name: &str| registry.get(name).copied().ok_or(name.to_string());

        assert_eq!(
            command("has_jastrow_j2e_type")?.run(&ezfio, None)?,
            CommandOutput::Exists(false)
        );
        assert!(matches!(
            command("set_jastrow_j2e_type")?.run(&ezfio, None),
            Err(EzfioError::InvalidShape(_, _))
        ));
        assert_eq!(
            command("set_jastrow_j2e_type")?.run(&ezfio, Some("Mu".into()))?,
            CommandOutput::Written
        );
        assert_eq!(
            command("get_jastrow_j2e_type")?.run(&ezfio, None)?,
            CommandOutput::Value("Mu".into())
        );
        assert_eq!(
            command("has_jastrow_j2e_type")?.run(&ezfio, None)?,
            CommandOutput::Exists(true)
        );
        Ok(())
    }
}
