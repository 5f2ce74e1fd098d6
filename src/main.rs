use anyhow::Result;
use clap::Parser;
use convoview::preferences::{self, OutputFormat, Preferences};
use convoview::render;
use convoview::source::Source;
use convoview::view::{self, EMPTY_INPUT_HINT, NO_MESSAGES_MESSAGE, Outcome, ViewMode};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Render an agent conversation transcript as a threaded message view.
#[derive(Debug, Parser)]
#[command(name = "convoview", version)]
struct Cli {
    /// Read the transcript from a file instead of stdin.
    #[arg(long, value_name = "PATH", conflicts_with = "payload")]
    file: Option<PathBuf>,

    /// Read a `{ "content": ... }` JSON payload ("-" for stdin).
    #[arg(long, value_name = "PATH")]
    payload: Option<PathBuf>,

    /// Preferences file (default: ./convoview.toml if present).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show every message, not just assistant responses.
    #[arg(long)]
    all: bool,

    /// Keep adjacent repeated assistant responses.
    #[arg(long)]
    no_dedupe: bool,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Print the effective preferences as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn source(&self) -> Source {
        match (&self.file, &self.payload) {
            (Some(path), _) => Source::File(path.clone()),
            (None, Some(path)) => Source::Payload(path.clone()),
            (None, None) => Source::Stdin,
        }
    }

    fn preferences(&self) -> Result<Preferences> {
        let mut prefs = match &self.config {
            Some(path) => Preferences::load(path)?,
            None => Preferences::load_or_default(Path::new(preferences::FILENAME))?,
        };
        if self.all {
            prefs.view = ViewMode::All;
        }
        if self.no_dedupe {
            prefs.dedupe = false;
        }
        if let Some(format) = self.format {
            prefs.format = format;
        }
        Ok(prefs)
    }
}

/// Returns the process exit code.
fn run(cli: &Cli) -> Result<i32> {
    let prefs = cli.preferences()?;
    if cli.print_config {
        print!("{}", prefs.to_toml()?);
        return Ok(0);
    }

    let loaded = cli.source().load()?;
    if let Some(notice) = loaded.notice {
        eprintln!("{notice}");
    }

    let records = match view::present(&loaded.text, &prefs.view_options()) {
        Outcome::Empty => {
            if loaded.notice.is_none() {
                eprintln!("{EMPTY_INPUT_HINT}");
            }
            Vec::new()
        }
        Outcome::Failed(message) => {
            eprintln!("{message}");
            return Ok(1);
        }
        Outcome::Messages(records) => records,
    };

    match prefs.format {
        OutputFormat::Json => println!("{}", render::render_json(&records)?),
        OutputFormat::Text if records.is_empty() => {
            if !loaded.text.trim().is_empty() {
                println!("{NO_MESSAGES_MESSAGE}");
            }
        }
        OutputFormat::Text => {
            let template = prefs.resolve_template()?;
            println!("{}", render::render_text(&template, &records)?.trim_end());
        }
    }
    Ok(0)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("convoview: {err:#}");
            process::exit(2);
        }
    }
}
