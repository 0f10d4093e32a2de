//! Rendering of the resolved run.

use std::io::Write;

use serde::Serialize;

use crate::cli::Invocation;
use crate::error::Result;
use crate::models::{Logging, Training};

#[derive(Serialize)]
struct Summary<'a> {
    training: &'a Training,
    logging: &'a Logging,
}

/// Write the resolved settings to `out` as pretty-printed JSON.
///
/// Secret fields are never serialised.
///
/// # Errors
///
/// Returns [`crate::error::TrainerError::Encode`] or
/// [`crate::error::TrainerError::Output`] when the summary cannot be
/// produced.
pub fn write_summary(out: &mut impl Write, run: &Invocation) -> Result<()> {
    let summary = Summary {
        training: &run.training,
        logging: &run.logging,
    };
    serde_json::to_writer_pretty(&mut *out, &summary)?;
    writeln!(out)?;
    Ok(())
}
