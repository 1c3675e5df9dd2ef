use std::io::Write;
use std::process::{Command as ProcessCommand, Stdio};

use anyhow::{Context, Result, anyhow};

const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
];

/// Pipes `text` into the first clipboard tool that works and returns the
/// tool's name for the status line.
pub(crate) fn copy_to_clipboard(text: &str) -> Result<&'static str> {
    for &(bin, args) in CLIPBOARD_TOOLS {
        let spawned = ProcessCommand::new(bin)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let Ok(mut child) = spawned else {
            continue;
        };

        child
            .stdin
            .take()
            .context("clipboard tool stdin unavailable")?
            .write_all(text.as_bytes())
            .with_context(|| format!("failed writing to {bin}"))?;
        let status = child
            .wait()
            .with_context(|| format!("failed waiting on {bin}"))?;
        if status.success() {
            return Ok(bin);
        }
    }
    Err(anyhow!(
        "no clipboard tool available (tried wl-copy, xclip, xsel, pbcopy)"
    ))
}
