use crate::render::DEFAULT_TEMPLATE;
use crate::transcript::{DEFAULT_LOOKAHEAD_LINES, DEFAULT_MAX_LINES, ParseOptions};
use crate::view::{ViewMode, ViewOptions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const FILENAME: &str = "convoview.toml";

/// Text output template: either an inline Jinja2 string or a path to a
/// template file (relative to the directory holding `convoview.toml`).
///
/// In TOML this looks like one of:
///
/// ```toml
/// [template]
/// inline = "{% for m in messages %}{{ m.body }}\n{% endfor %}"
///
/// # — or —
///
/// [template]
/// file = "conversation.tmpl"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RenderTemplate {
    Inline(String),
    File(String),
}

impl Default for RenderTemplate {
    fn default() -> Self {
        RenderTemplate::Inline(DEFAULT_TEMPLATE.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Viewer preferences stored in `convoview.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// "assistant_only" or "all".
    #[serde(default)]
    pub view: ViewMode,

    /// Collapse adjacent identical assistant messages.
    #[serde(default = "default_dedupe")]
    pub dedupe: bool,

    /// Refuse transcripts longer than this many lines.
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// Lines folded into an assistant message after `Tool Calls:`.
    #[serde(default = "default_lookahead_lines")]
    pub lookahead_lines: usize,

    /// "text" or "json".
    #[serde(default)]
    pub format: OutputFormat,

    /// Text output template (inline or file reference).
    #[serde(default)]
    pub template: RenderTemplate,

    /// Directory `template.file` is resolved against.
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_dedupe() -> bool {
    true
}

fn default_max_lines() -> usize {
    DEFAULT_MAX_LINES
}

fn default_lookahead_lines() -> usize {
    DEFAULT_LOOKAHEAD_LINES
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            view: ViewMode::default(),
            dedupe: default_dedupe(),
            max_lines: default_max_lines(),
            lookahead_lines: default_lookahead_lines(),
            format: OutputFormat::default(),
            template: RenderTemplate::default(),
            base_dir: PathBuf::from("."),
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

impl Preferences {
    /// Load preferences from an explicitly named file, which must exist.
    /// Missing keys are filled in with defaults via serde.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let mut prefs: Preferences =
            toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
        prefs.base_dir = parent_dir(path);
        debug!(path = %path.display(), "loaded preferences");
        Ok(prefs)
    }

    /// Like [`Preferences::load`], but a missing file means defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::metadata(path) {
            Ok(_) => Self::load(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Preferences {
                base_dir: parent_dir(path),
                ..Preferences::default()
            }),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    /// The effective preferences as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serializing preferences")
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            mode: self.view,
            dedupe: self.dedupe,
            parse: ParseOptions {
                max_lines: self.max_lines,
                lookahead_lines: self.lookahead_lines,
            },
        }
    }

    /// The template source text, reading it from disk for `file = ...`.
    pub fn resolve_template(&self) -> Result<String> {
        match &self.template {
            RenderTemplate::Inline(s) => Ok(s.clone()),
            RenderTemplate::File(filename) => {
                let path = self.base_dir.join(filename);
                fs::read_to_string(&path)
                    .with_context(|| format!("reading template {}", path.display()))
            }
        }
    }
}
