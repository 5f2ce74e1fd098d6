#![allow(dead_code)]

use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};

/// Run the binary in `cwd` with `args`, feeding `stdin`. Returns
/// (exit code, stdout, stderr).
///
/// The binary may exit before reading stdin (bad flags, bad config), so a
/// broken pipe while feeding it is not a failure.
pub fn run_cli_in(cwd: &Path, args: &[&str], stdin: impl AsRef<[u8]>) -> (i32, String, String) {
    let stdin = stdin.as_ref();
    let mut child = Command::new(env!("CARGO_BIN_EXE_convoview"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .stdin(if stdin.is_empty() { Stdio::null() } else { Stdio::piped() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn binary");

    if let Some(mut pipe) = child.stdin.take() {
        match pipe.write_all(stdin) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
            Err(e) => panic!("writing stdin: {e}"),
        }
    }

    let output = child.wait_with_output().unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

/// Run the binary in a fresh empty directory so no stray `convoview.toml`
/// is picked up.
pub fn run_cli(args: &[&str], stdin: impl AsRef<[u8]>) -> (i32, String, String) {
    let dir = tempfile::tempdir().unwrap();
    run_cli_in(dir.path(), args, stdin)
}

/// The worked example: one question, a tool round trip, and an answer.
pub const STOCK_QUOTE: &str = "\
======Human Message======
What is AAPL trading at?
======Ai Message======
Let me check.
Tool Calls:
  get_price (symbol=AAPL) call_1
======Tool Message======
Name: get_price
150.25
======Ai Message======
AAPL is at $150.25.
";

/// Boundary marker wrapped in long `=` runs and ANSI colour codes, the way
/// a terminal log prints it.
pub fn coloured_marker(label: &str) -> String {
    let run = "=".repeat(33);
    format!("\x1b[1m{run}\x1b[0m \x1b[1;32m{label}\x1b[0m \x1b[1m{run}\x1b[0m")
}
