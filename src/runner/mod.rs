//! The runner replays a command file against a fresh in-memory store and
//! writes a report of the resulting accounts.
//!
//! This module provides both a synchronous and an asynchronous runner implementation.
//!
mod async_runner;
mod session;
mod sync_runner;

use std::io::Write;

pub use async_runner::{replay as replay_async, run as run_async};
pub use session::{CommandError, Session};
pub use sync_runner::{replay, run, run_with_config};

use crate::config::Output;
use crate::csv_utils::write_rows;
use crate::stores::Storage;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Writes the final state of every account opened in `session`, in the
/// order the accounts were opened.
fn write_report<S, W>(session: &Session<S>, output: Output, mut writer: W) -> Result<(), BoxError>
where
    S: Storage,
    W: Write,
{
    match output {
        Output::Summary => write_rows(writer, session.rows()?)?,
        Output::Statements => {
            for (i, statement) in session.statements()?.iter().enumerate() {
                if i > 0 {
                    writeln!(writer)?;
                }
                writer.write_all(statement.as_bytes())?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}
