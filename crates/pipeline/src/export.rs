//! Persistence of hybrid rankings as JSON.

use crate::error::Result;
use serde::Serialize;
use sources::ScoredItem;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory used when the caller does not pick one
pub const DEFAULT_OUTPUT_DIR: &str = "hybrid_output";

/// File name for a user's hybrid ranking.
///
/// Characters outside `[A-Za-z0-9_-]` are replaced with `_`.
pub fn output_file_name(user_id: &str) -> String {
    let safe: String = user_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    format!("hybrid_output_user_{safe}.json")
}

/// Write the full ordered ranking for a user as pretty JSON.
///
/// Creates `dir` if needed and returns the path written.
pub fn save_hybrid_recommendations(dir: &Path, user_id: &str, items: &[ScoredItem]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(output_file_name(user_id));

    let mut writer = BufWriter::new(File::create(&path)?);
    write_pretty(&mut writer, items)?;
    writer.flush()?;

    info!(path = %path.display(), items = items.len(), "Saved hybrid recommendations");
    Ok(path)
}

/// Read a ranking back from disk
pub fn load_hybrid_recommendations(path: &Path) -> Result<Vec<ScoredItem>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_pretty<W: Write, T: Serialize + ?Sized>(writer: W, value: &T) -> Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}
