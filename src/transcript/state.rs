use super::classify::{self, LineKind, ToolField};
use super::{MessageRecord, Role};
use serde_json::{Map, Value};
use tracing::trace;

// ===================================================================
// MessageBuilder — the block currently being accumulated
// ===================================================================

/// An open message block: raw content lines plus role-specific scratch
/// fields, reset at every boundary marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBuilder {
    role: Role,
    lines: Vec<String>,
    tool_name: Option<String>,
    tool_call_id: Option<String>,
    tool_args: Map<String, Value>,
}

impl MessageBuilder {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            lines: Vec::new(),
            tool_name: None,
            tool_call_id: None,
            tool_args: Map::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Content lines accumulated so far, untrimmed.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn push_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn apply_tool_field(&mut self, field: ToolField) {
        match field {
            ToolField::Name(name) => self.tool_name = Some(name),
            ToolField::CallId(Some(id)) => self.tool_call_id = Some(id),
            ToolField::Arg(Some((key, value))) => {
                self.tool_args.insert(key, value);
            }
            ToolField::CallId(None) | ToolField::Arg(None) => {}
        }
    }

    /// Close the block.
    pub fn finish(self) -> MessageRecord {
        let mut record = MessageRecord::new(self.role, join_trimmed(&self.lines));
        record.tool_name = self.tool_name;
        record.tool_call_id = self.tool_call_id;
        record.tool_args = self.tool_args;
        record
    }
}

/// Join lines with `\n`, dropping leading and trailing blank lines.
fn join_trimmed(lines: &[String]) -> String {
    let Some(start) = lines.iter().position(|l| !l.trim().is_empty()) else {
        return String::new();
    };
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .unwrap_or(start);
    lines[start..=end].join("\n")
}

// ===================================================================
// ParserState — line-at-a-time accumulator
// ===================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Scanning,
    /// Inside the lines following `Tool Calls:`; `remaining` more lines
    /// may still be folded into the open assistant block.
    ToolCalls { remaining: usize },
}

/// Scan state for one parse. Feed it lines with [`consume_line`] and
/// collect the records with [`finish`].
///
/// A record is only emitted when the next boundary marker arrives (or the
/// input ends), so [`records`] lags one block behind the scan position.
///
/// [`consume_line`]: ParserState::consume_line
/// [`finish`]: ParserState::finish
/// [`records`]: ParserState::records
#[derive(Debug, Clone)]
pub struct ParserState {
    current: Option<MessageBuilder>,
    mode: Mode,
    lookahead_lines: usize,
    records: Vec<MessageRecord>,
}

impl ParserState {
    pub fn new(lookahead_lines: usize) -> Self {
        Self {
            current: None,
            mode: Mode::Scanning,
            lookahead_lines,
            records: Vec::new(),
        }
    }

    /// Advance the scan by one (ANSI-stripped) line.
    pub fn consume_line(&mut self, line: &str) {
        if let Mode::ToolCalls { remaining } = self.mode {
            if !classify::closes_window(line) {
                self.consume_tool_call_line(line);
                self.mode = if remaining > 1 {
                    Mode::ToolCalls {
                        remaining: remaining - 1,
                    }
                } else {
                    Mode::Scanning
                };
                return;
            }
            trace!(remaining, "tool calls window closed early");
            self.mode = Mode::Scanning;
        }

        let open = self.current.as_ref().map(MessageBuilder::role);
        match classify::classify(line, open) {
            LineKind::Boundary(role) => {
                self.finalize_current();
                self.current = Some(MessageBuilder::new(role));
            }
            LineKind::ToolField(field) => {
                if let Some(current) = self.current.as_mut() {
                    current.apply_tool_field(field);
                }
            }
            LineKind::ToolCallsHeader => {
                if let Some(current) = self.current.as_mut() {
                    current.push_line("Tool Calls:");
                }
                if self.lookahead_lines > 0 {
                    self.mode = Mode::ToolCalls {
                        remaining: self.lookahead_lines,
                    };
                }
            }
            LineKind::Separator => {}
            // Before the first boundary there is nothing to append to.
            LineKind::Blank | LineKind::Content => {
                if let Some(current) = self.current.as_mut() {
                    current.push_line(line);
                }
            }
        }
    }

    fn consume_tool_call_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        let Some(current) = self.current.as_mut() else {
            return;
        };
        current.push_line(line);
        if let Some((name, id)) = classify::tool_call(line) {
            current.tool_args.insert(name, Value::String(id));
        }
    }

    fn finalize_current(&mut self) {
        if let Some(current) = self.current.take() {
            self.records.push(current.finish());
        }
    }

    /// The block currently open, if any.
    pub fn current(&self) -> Option<&MessageBuilder> {
        self.current.as_ref()
    }

    /// Records finalized so far.
    pub fn records(&self) -> &[MessageRecord] {
        &self.records
    }

    pub fn in_tool_calls_window(&self) -> bool {
        matches!(self.mode, Mode::ToolCalls { .. })
    }

    /// End of input: close the open block and return every record.
    pub fn finish(mut self) -> Vec<MessageRecord> {
        self.finalize_current();
        self.records
    }
}
