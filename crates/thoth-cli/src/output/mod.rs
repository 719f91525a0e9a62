use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;

pub mod error;

/// Serialize a response. `Raw` is compact single-line JSON for piping.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Raw => serde_json::to_string(value)?,
    };
    Ok(rendered)
}

/// Write a response to stdout followed by a newline.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}
