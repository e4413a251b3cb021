//! Command implementations for the docent CLI.

pub mod ask;
pub mod chat;
pub mod ingest;
pub mod status;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// Print `prompt` to stderr and read one line from stdin.
///
/// Returns `None` at end of input.
pub(crate) fn prompt_line(prompt: &str) -> Result<Option<String>> {
    eprint!("{prompt}");
    io::stderr().flush().context("Failed to flush prompt")?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
