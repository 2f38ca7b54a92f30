//! CSV reading and writing for command files and account summaries.

use std::io::Write;
use std::path::Path;

use crate::dto::{AccountRow, Command};

/// Streams commands from a file. Fields are trimmed, empty ones read as
/// absent.
pub fn read_commands<P>(path: P) -> csv::Result<impl Iterator<Item = csv::Result<Command>>>
where
    P: AsRef<Path>,
{
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?
        .into_deserialize())
}

const SUMMARY_HEADER: [&str; 5] = ["account", "id", "owner", "balance", "transactions"];

/// Writes the summary header followed by one line per row. The header is
/// written even when there are no rows.
pub fn write_rows<W>(writer: W, rows: impl IntoIterator<Item = AccountRow>) -> csv::Result<()>
where
    W: Write,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(SUMMARY_HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
