use crate::transcript::{MessageRecord, ParseOptions, Role, Transcript};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Shown instead of an error when there is nothing to parse.
pub const EMPTY_INPUT_HINT: &str =
    "Paste the conversation output (Human/Ai/Tool Message blocks) to visualize it.";

/// The single message surfaced for any parse failure.
pub const PARSE_FAILURE_MESSAGE: &str = "Error parsing conversation. Please check the format.";

/// Input parsed fine but nothing survived the view policy.
pub const NO_MESSAGES_MESSAGE: &str = "No messages found. Please check the conversation format.";

// ===================================================================
// View policy
// ===================================================================

/// Which records a viewer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Assistant blocks with content (or a tool name) only.
    #[default]
    AssistantOnly,
    /// Every record, all roles.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub mode: ViewMode,
    /// Collapse adjacent assistant blocks with identical content.
    pub dedupe: bool,
    pub parse: ParseOptions,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            mode: ViewMode::AssistantOnly,
            dedupe: true,
            parse: ParseOptions::default(),
        }
    }
}

/// Keep assistant records that have content or a tool name.
pub fn assistant_only(records: Vec<MessageRecord>) -> Vec<MessageRecord> {
    records
        .into_iter()
        .filter(|r| r.role() == Role::Assistant && (!r.content.is_empty() || r.tool_name.is_some()))
        .collect()
}

/// Drop an assistant record whose trimmed content equals that of the
/// assistant record kept right before it (typically a response repeated
/// after "Continue"). Non-adjacent repeats stay.
pub fn dedupe_adjacent(records: Vec<MessageRecord>) -> Vec<MessageRecord> {
    let mut kept: Vec<MessageRecord> = Vec::with_capacity(records.len());
    for record in records {
        let duplicate = kept.last().is_some_and(|prev| {
            prev.role() == Role::Assistant
                && record.role() == Role::Assistant
                && prev.content.trim() == record.content.trim()
        });
        if duplicate {
            debug!("dropping repeated assistant message");
            continue;
        }
        kept.push(record);
    }
    kept
}

/// Apply the view mode and, if enabled, deduplication.
pub fn select(transcript: Transcript, options: &ViewOptions) -> Vec<MessageRecord> {
    let records = match options.mode {
        ViewMode::AssistantOnly => assistant_only(transcript.into_records()),
        ViewMode::All => transcript.into_records(),
    };
    if options.dedupe {
        dedupe_adjacent(records)
    } else {
        records
    }
}

// ===================================================================
// Outcome — what the caller displays
// ===================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Blank input: show [`EMPTY_INPUT_HINT`], not an error.
    Empty,
    /// Records to render (possibly none).
    Messages(Vec<MessageRecord>),
    /// Parsing failed; carries [`PARSE_FAILURE_MESSAGE`]. No records leak
    /// out of a failed parse.
    Failed(String),
}

/// Parse `raw` and apply the view policy.
pub fn present(raw: &str, options: &ViewOptions) -> Outcome {
    if raw.trim().is_empty() {
        return Outcome::Empty;
    }
    match Transcript::parse(raw, &options.parse) {
        Ok(transcript) => Outcome::Messages(select(transcript, options)),
        Err(err) => {
            warn!(error = %err, "could not parse conversation");
            Outcome::Failed(PARSE_FAILURE_MESSAGE.to_string())
        }
    }
}
