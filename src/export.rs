use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::{ChatError, Result};
use crate::session::Message;

pub const DEFAULT_EXPORT_FILE: &str = "chat_history.json";
const INDENT: &[u8] = b"    ";

pub fn dialogue_json(messages: &[Message]) -> Result<String> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    messages.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Writes `messages` as a 4-space indented JSON array, replacing whatever the
/// file held before.
pub fn save_dialogue(messages: &[Message], path: &Path) -> Result<()> {
    let text = dialogue_json(messages)?;
    let export_error = |source| ChatError::Export {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(export_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(text.as_bytes()).map_err(export_error)?;
    writer.flush().map_err(export_error)?;
    tracing::info!(path = %path.display(), messages = messages.len(), "dialogue exported");
    Ok(())
}
