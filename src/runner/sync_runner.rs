use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use super::{write_report, BoxError, Session};
use crate::config::{Config, Output};
use crate::csv_utils::read_commands;
use crate::ids::SystemIdentifiers;
use crate::stores::{AccountsStore, Storage};

/// Runs the command file with the default configuration and writes the
/// account summary to the provided writer.
pub fn run<P, W>(input_path: P, writer: W) -> Result<(), BoxError>
where
    P: AsRef<Path>,
    W: Write,
{
    run_with_config(input_path, writer, &Config::default())
}

/// Runs the command file against a fresh [`AccountsStore`] with system ids.
pub fn run_with_config<P, W>(input_path: P, writer: W, config: &Config) -> Result<(), BoxError>
where
    P: AsRef<Path>,
    W: Write,
{
    let session = Session::new(Arc::new(AccountsStore::new()), Arc::new(SystemIdentifiers))
        .with_statement_format(config.statement.clone());
    replay(input_path, writer, session, config.output)?;
    Ok(())
}

/// Applies every command in the file to `session`, then writes the report.
///
/// # Arguments
/// * `input_path` - Path to the command CSV file
/// * `writer` - Where to write the report (e.g. stdout)
/// * `session` - Accounts and ledgers the commands run against
/// * `output` - Summary rows or full statements
///
/// # Errors
/// Returns an error if:
/// * The input file cannot be read
/// * The CSV is malformed
/// * The storage backend fails
/// * Writing to the output fails
///
/// Commands rejected by the ledger are logged and skipped.
pub fn replay<P, W, S>(
    input_path: P,
    writer: W,
    mut session: Session<S>,
    output: Output,
) -> Result<Session<S>, BoxError>
where
    P: AsRef<Path>,
    W: Write,
    S: Storage,
{
    for command in read_commands(input_path)? {
        // CSV parsing errors are critical - propagate them
        session.replay(command?)?;
    }
    write_report(&session, output, writer)?;
    Ok(session)
}
