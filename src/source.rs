use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const PAYLOAD_LOAD_FAILURE: &str = "Could not load the conversation from the backend file.";
pub const PAYLOAD_EMPTY_NOTICE: &str = "The backend conversation file is empty.";

/// Where the raw transcript comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Pasted text on stdin.
    Stdin,
    /// A plain transcript file.
    File(PathBuf),
    /// A `{ "content": "..." }` document as served by the conversation
    /// endpoint. `-` reads it from stdin.
    Payload(PathBuf),
}

/// Body of the conversation endpoint. A missing or null `content` is
/// treated as empty.
#[derive(Debug, Deserialize)]
pub struct ConversationPayload {
    #[serde(default)]
    pub content: Option<String>,
}

/// Raw transcript text plus an optional notice for the user.
#[derive(Debug)]
pub struct Loaded {
    pub text: String,
    pub notice: Option<&'static str>,
}

fn read_stdin() -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("reading stdin")?;
    Ok(buffer)
}

fn read_path_or_stdin(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        read_stdin()
    } else {
        fs::read(path).with_context(|| format!("reading {}", path.display()))
    }
}

/// Transcript text from raw bytes. Terminal captures are not always valid
/// UTF-8; bad sequences become U+FFFD instead of failing the whole read.
pub fn decode_transcript(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!(
                valid_up_to = err.utf8_error().valid_up_to(),
                "transcript is not valid UTF-8, replacing invalid bytes"
            );
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    }
}

/// Decode an endpoint payload into transcript text.
pub fn decode_payload(json: &str) -> Result<Loaded> {
    let payload: ConversationPayload =
        serde_json::from_str(json).context("parsing conversation payload")?;
    let text = payload.content.unwrap_or_default();
    let notice = if text.trim().is_empty() {
        warn!("conversation payload has no content");
        Some(PAYLOAD_EMPTY_NOTICE)
    } else {
        None
    };
    Ok(Loaded { text, notice })
}

impl Source {
    pub fn load(&self) -> Result<Loaded> {
        let loaded = match self {
            Source::Stdin => Loaded {
                text: decode_transcript(read_stdin()?),
                notice: None,
            },
            Source::File(path) => Loaded {
                text: decode_transcript(read_path_or_stdin(path)?),
                notice: None,
            },
            // JSON must be UTF-8, so a payload is never decoded lossily.
            Source::Payload(path) => read_path_or_stdin(path)
                .and_then(|bytes| String::from_utf8(bytes).context("payload is not valid UTF-8"))
                .and_then(|json| decode_payload(&json))
                .context(PAYLOAD_LOAD_FAILURE)?,
        };
        debug!(source = ?self, bytes = loaded.text.len(), "loaded transcript");
        Ok(loaded)
    }
}
