//! Run summary persistence.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use shelfscan_core::RunSummary;

/// Write `summary` as pretty-printed JSON, creating parent directories.
pub(crate) fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
