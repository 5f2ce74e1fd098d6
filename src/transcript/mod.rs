pub mod classify;
mod state;

pub use state::{MessageBuilder, ParserState};

use crate::ansi::strip_ansi;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};

/// Inputs longer than this are rejected rather than scanned.
pub const DEFAULT_MAX_LINES: usize = 200_000;

/// How many lines after a `Tool Calls:` header are folded into the
/// announcing assistant message.
pub const DEFAULT_LOOKAHEAD_LINES: usize = 20;

// ===================================================================
// Role — who produced a message block
// ===================================================================

/// The speaker of a message block, decided by its boundary marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// `Human Message`
    Human,
    /// `Ai Message`
    Assistant,
    /// `Tool Message`
    Tool,
}

impl Role {
    /// Lowercase name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Human => "human",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }

    /// Label shown in the rendered view.
    pub fn badge(self) -> &'static str {
        match self {
            Role::Human => "Human",
            Role::Assistant => "AI Agent",
            Role::Tool => "Tool",
        }
    }
}

// ===================================================================
// MessageRecord — one finalized message block
// ===================================================================

/// A finalized message block.
///
/// The role is fixed when the block's boundary marker is seen and cannot be
/// changed afterwards; everything else is plain data for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRecord {
    role: Role,
    /// Accumulated lines joined by `\n`, without leading or trailing blank lines.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// First `call_<alnum>` token seen in a tool block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Argument lines of a tool block, or tool name → call id for tool
    /// calls announced by an assistant block. Keys keep first-seen order;
    /// last write wins per key.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub tool_args: Map<String, Value>,
}

impl MessageRecord {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_name: None,
            tool_call_id: None,
            tool_args: Map::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

// ===================================================================
// Parse options and errors
// ===================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Upper bound on the number of input lines.
    pub max_lines: usize,
    /// Size of the `Tool Calls:` lookahead window.
    pub lookahead_lines: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            lookahead_lines: DEFAULT_LOOKAHEAD_LINES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input exceeded `ParseOptions::max_lines`.
    TooManyLines { lines: usize, limit: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::TooManyLines { lines, limit } => {
                write!(f, "transcript has {lines} lines, limit is {limit}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

// ===================================================================
// Transcript — every message block, in input order
// ===================================================================

/// A parsed conversation transcript, all roles included.
///
/// Filtering down to what a viewer shows is left to [`crate::view`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    records: Vec<MessageRecord>,
}

impl Transcript {
    /// Parse a raw (possibly ANSI-coloured) transcript.
    ///
    /// Scanning itself never fails; the only error is the line bound.
    pub fn parse(raw: &str, options: &ParseOptions) -> Result<Self, ParseError> {
        let text = strip_ansi(raw);
        let lines = text.lines().count();
        if lines > options.max_lines {
            warn!(lines, limit = options.max_lines, "transcript exceeds line limit");
            return Err(ParseError::TooManyLines {
                lines,
                limit: options.max_lines,
            });
        }

        let mut state = ParserState::new(options.lookahead_lines);
        for line in text.lines() {
            state.consume_line(line);
        }
        let records = state.finish();
        debug!(lines, records = records.len(), "parsed transcript");
        Ok(Self { records })
    }

    /// All records in input order.
    pub fn into_records(self) -> Vec<MessageRecord> {
        self.records
    }
}
