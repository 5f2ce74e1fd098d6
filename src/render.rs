use crate::transcript::MessageRecord;
use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::Serialize;

/// Built-in text layout. Templates see `count` and `messages`; each
/// message has `role`, `badge`, `tool_name`, `tool_call_id`, `arguments`
/// (pretty JSON, or none) and `body`.
pub const DEFAULT_TEMPLATE: &str = r#"Conversation ({{ count }} messages)
{% for m in messages %}

[{{ m.badge }}]{{ " Tool: " ~ m.tool_name if m.tool_name else "" }}{{ " ID: " ~ m.tool_call_id if m.tool_call_id else "" }}
{% if m.arguments %}
Arguments:
{{ m.arguments }}
{% endif %}
{{ m.body }}
{% endfor %}
"#;

/// One record as the template sees it.
#[derive(Debug, Serialize)]
struct RenderedMessage<'a> {
    role: &'static str,
    badge: &'static str,
    tool_name: Option<&'a str>,
    tool_call_id: Option<&'a str>,
    arguments: Option<String>,
    body: String,
}

impl<'a> RenderedMessage<'a> {
    fn from_record(record: &'a MessageRecord) -> Result<Self> {
        let arguments = if record.tool_args.is_empty() {
            None
        } else {
            Some(
                serde_json::to_string_pretty(&record.tool_args)
                    .context("formatting tool arguments")?,
            )
        };
        let body = if !record.content.is_empty() {
            record.content.clone()
        } else if let Some(name) = &record.tool_name {
            format!("Tool: {name}")
        } else {
            "No content".to_string()
        };
        Ok(Self {
            role: record.role().as_str(),
            badge: record.role().badge(),
            tool_name: record.tool_name.as_deref(),
            tool_call_id: record.tool_call_id.as_deref(),
            arguments,
            body,
        })
    }
}

/// Render records through a minijinja template.
pub fn render_text(template: &str, records: &[MessageRecord]) -> Result<String> {
    let messages = records
        .iter()
        .map(RenderedMessage::from_record)
        .collect::<Result<Vec<_>>>()?;

    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    let tmpl = env
        .template_from_str(template)
        .context("parsing conversation template")?;
    tmpl.render(context! { count => messages.len(), messages })
        .context("rendering conversation template")
}

#[derive(Serialize)]
struct JsonView<'a> {
    messages: &'a [MessageRecord],
}

/// Render records as a pretty-printed `{ "messages": [...] }` document.
pub fn render_json(records: &[MessageRecord]) -> Result<String> {
    serde_json::to_string_pretty(&JsonView { messages: records })
        .context("serializing messages")
}
