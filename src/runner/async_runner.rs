use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use super::{write_report, BoxError, Session};
use crate::config::{Config, Output};
use crate::dto::Command;
use crate::ids::SystemIdentifiers;
use crate::stores::{AccountsStore, Storage};

use csv_async::{AsyncReaderBuilder, Error as CsvError, Trim};
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

const BUFFER_SIZE: usize = 1024;

type Result<T, E = BoxError> = std::result::Result<T, E>;

/// Runs the command file async with the given configuration against a fresh
/// [`AccountsStore`], writing the report to the provided writer.
pub async fn run<P, W>(input_path: P, writer: W, config: &Config) -> Result<()>
where
    P: AsRef<Path>,
    W: Write,
{
    let session = Session::new(Arc::new(AccountsStore::new()), Arc::new(SystemIdentifiers))
        .with_statement_format(config.statement.clone());
    replay(input_path, writer, session, config.output).await?;
    Ok(())
}

/// Replays the command file async and writes the report.
/// Spawns two tasks:
/// * CSV reader - streams commands from the input file, deserializes them and
///   sends them to the processor via channel.
/// * Processor - receives commands from the channel and applies them to the
///   session until the channel is closed.
///
/// # Errors
/// Returns an error if:
/// * The input file cannot be read
/// * The CSV is malformed
/// * The storage backend fails
/// * Writing to the output fails
pub async fn replay<P, W, S>(
    input_path: P,
    writer: W,
    session: Session<S>,
    output: Output,
) -> Result<Session<S>>
where
    P: AsRef<Path>,
    W: Write,
    S: Storage + 'static,
{
    // Create channel for passing commands from reader to processor
    let (tx, rx) = mpsc::channel(BUFFER_SIZE);
    let input_path = input_path.as_ref().to_owned();

    let reader_handle = tokio::spawn(read_commands(input_path, tx));
    let processor_handle = tokio::spawn(process_commands(rx, session));

    // A failed processor drops the receiver, which stops the reader early;
    // report the processor's error in that case rather than the reader's
    let read_result = reader_handle.await?;
    let session = processor_handle.await??;
    read_result?;

    write_report(&session, output, writer)?;
    Ok(session)
}

/// Reads and deserializes commands from a CSV file.
/// Returns them through the provided channel.
async fn read_commands(
    input_path: impl AsRef<Path> + Send,
    tx: mpsc::Sender<Command>,
) -> Result<(), CsvError> {
    let file = File::open(input_path).await?;
    let mut csv_reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .create_deserializer(file);

    let mut records = csv_reader.deserialize::<Command>();
    while let Some(result) = records.next().await {
        // CSV parsing errors are critical - propagate them
        let command = result?;
        if tx.send(command).await.is_err() {
            // Receiver dropped, exit gracefully
            break;
        }
    }
    Ok(())
}

/// Applies commands received through the channel.
/// Returns the session once the channel is closed by the reader.
async fn process_commands<S: Storage>(
    mut rx: mpsc::Receiver<Command>,
    mut session: Session<S>,
) -> Result<Session<S>, crate::Error> {
    while let Some(command) = rx.recv().await {
        session.replay(command)?;
    }
    Ok(session)
}
