//! `ezfio` command line tool.
//!
//! Runs a single `get`, `set` or `has` command against the store named by `--file` or `EZFIO_FILE`:
//! ```text
//! ezfio get jastrow j2e_type
//! echo Boys | ezfio set jastrow j2e_type
//! ezfio has nuclei nucl_coord
//! ```

use std::{
    io::Read,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use ezfio::{
    command::{normalize_command, CommandOutput, CommandRegistry, Operation},
    Ezfio, EzfioError, Nested,
};
use tracing_subscriber::EnvFilter;

mod literal;
mod pretty;

use literal::parse_input;
use pretty::PrettyPrinter;

const RULE: &str = "------------------------------------------------------------";

#[derive(Parser, Debug)]
#[command(name = "ezfio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Read and write the records of an EZFIO store")]
#[command(long_about = "Read and write the records of an EZFIO store.\n\n\
    The words of the command are joined with '_', so 'ezfio get jastrow j2e_type' runs\n\
    get_jastrow_j2e_type. 'set' commands read their value from stdin as a literal\n\
    (e.g. [1.0, 2.0] or True) or otherwise as a string.\n\n\
    'has' commands exit with 0 if the record exists and 1 otherwise.\n\n\
    Logging is configured with EZFIO_LOG (e.g. EZFIO_LOG=debug).")]
struct Cli {
    /// The store directory
    #[arg(short, long, env = "EZFIO_FILE")]
    file: Option<PathBuf>,

    /// The command, e.g. `get jastrow j2e_type`
    #[arg(num_args = 0..)]
    command: Vec<String>,
}

fn print_error(file: &Path, context: &str, err: &EzfioError) {
    eprintln!(
        "{RULE}\nEZFIO File     : {}\nEZFIO Error in : {context}\n{RULE}\n\n{err}\n\n{RULE}",
        file.display()
    );
}

fn run(ezfio: &Ezfio, name: &str) -> Result<ExitCode, EzfioError> {
    let Some(command) = CommandRegistry::global().get(name) else {
        eprintln!("{name} not found");
        return Ok(ExitCode::FAILURE);
    };
    let value = if command.operation() == Operation::Set {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .map_err(|err| EzfioError::StorageError(err.into()))?;
        Some(parse_input(&input))
    } else {
        None
    };
    match command.run(ezfio, value)? {
        CommandOutput::Value(value) => {
            println!("{}", PrettyPrinter::default().format(&Nested::from(value)));
            Ok(ExitCode::SUCCESS)
        }
        CommandOutput::Exists(true) | CommandOutput::Written => Ok(ExitCode::SUCCESS),
        CommandOutput::Exists(false) => Ok(ExitCode::FAILURE),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("EZFIO_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(file) = cli.file else {
        eprintln!("EZFIO_FILE not defined");
        return ExitCode::FAILURE;
    };
    let name = normalize_command(&cli.command);

    let ezfio = match Ezfio::open(&file) {
        Ok(ezfio) => ezfio,
        Err(err) => {
            print_error(&file, "set_file", &err);
            return ExitCode::FAILURE;
        }
    };
    run(&ezfio, &name).unwrap_or_else(|err| {
        print_error(&file, &name, &err);
        ExitCode::FAILURE
    })
}
