use super::Role;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static CALL_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"call_[A-Za-z0-9]+").unwrap());

static ARG_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+[A-Za-z0-9_]+:").unwrap());

static ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+([A-Za-z0-9_]+):\s*(.+)").unwrap());

static TOOL_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([A-Za-z0-9_]+)\s+\(([^)]+)\)").unwrap());

static EQUALS_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"={30,}").unwrap());

const SEPARATOR_MIN: usize = 30;

// ===================================================================
// Line classification
// ===================================================================

/// What a single line means, given the role of the block it falls in.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// Starts a new message block.
    Boundary(Role),
    /// A recognised field line inside a tool block.
    ToolField(ToolField),
    /// `Tool Calls:` inside an assistant block.
    ToolCallsHeader,
    /// Nothing but 30 or more `=`.
    Separator,
    Blank,
    Content,
}

/// Field lines of a tool block. All of them are consumed, even when
/// nothing could be extracted.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolField {
    Name(String),
    CallId(Option<String>),
    Arg(Option<(String, Value)>),
}

/// Classify `line`. `open` is the role of the block currently being
/// accumulated, if any; tool fields and tool-call headers are only
/// recognised inside blocks of the matching role.
pub fn classify(line: &str, open: Option<Role>) -> LineKind {
    if let Some(role) = boundary_role(line) {
        return LineKind::Boundary(role);
    }
    match open {
        Some(Role::Tool) => {
            if let Some(field) = tool_field(line) {
                return LineKind::ToolField(field);
            }
        }
        Some(Role::Assistant) if line.contains("Tool Calls:") => {
            return LineKind::ToolCallsHeader;
        }
        _ => {}
    }
    if is_separator(line) {
        LineKind::Separator
    } else if line.trim().is_empty() {
        LineKind::Blank
    } else {
        LineKind::Content
    }
}

/// The role announced by a boundary marker line, with or without the
/// surrounding `=` runs.
pub fn boundary_role(line: &str) -> Option<Role> {
    if line.contains("Human Message") {
        Some(Role::Human)
    } else if line.contains("Ai Message") {
        Some(Role::Assistant)
    } else if line.contains("Tool Message") {
        Some(Role::Tool)
    } else {
        None
    }
}

pub fn is_separator(line: &str) -> bool {
    line.len() >= SEPARATOR_MIN && line.bytes().all(|b| b == b'=')
}

/// Whether `line` ends a `Tool Calls:` lookahead window.
pub fn closes_window(line: &str) -> bool {
    EQUALS_RUN.is_match(line) || boundary_role(line).is_some()
}

pub fn call_id(line: &str) -> Option<String> {
    CALL_ID.find(line).map(|m| m.as_str().to_string())
}

/// `<name> (<args>) ... call_<id>` → `(name, call_id)`. Both parts must be
/// on the same line.
pub fn tool_call(line: &str) -> Option<(String, String)> {
    let caps = TOOL_CALL.captures(line)?;
    let id = call_id(line)?;
    Some((caps[1].to_string(), id))
}

// ===================================================================
// Tool block fields
// ===================================================================

fn tool_field(line: &str) -> Option<ToolField> {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed.strip_prefix("Name:") {
        return Some(ToolField::Name(rest.trim().to_string()));
    }
    if line.contains("Call ID:") || line.contains("call_") {
        return Some(ToolField::CallId(call_id(line)));
    }
    // Loose heuristic: any indented `word:` line counts as an argument,
    // including indented prose that happens to contain a colon.
    if trimmed.starts_with("Args:") || ARG_LABEL.is_match(line) {
        let arg = ARG
            .captures(line)
            .map(|caps| (caps[1].to_string(), arg_value(caps[2].trim())));
        return Some(ToolField::Arg(arg));
    }
    None
}

/// JSON objects and arrays are kept structured; anything else is a string.
fn arg_value(raw: &str) -> Value {
    if raw.starts_with(['{', '[']) {
        if let Ok(value) = serde_json::from_str::<Value>(raw) {
            return value;
        }
    }
    Value::String(raw.to_string())
}
