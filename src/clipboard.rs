//! System clipboard access for swatch copying.
//!
//! arboard is the primary path. When it fails (headless session, missing
//! display server) we shell out to whatever copy utility the platform
//! offers. A copy that fails everywhere is logged and otherwise ignored;
//! the toy keeps running.

use std::io::Write;
use std::process::{Command, Stdio};

use log::{debug, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard provider failed: {0}")]
    Provider(String),
    #[error("no clipboard utility accepted the text")]
    NoUtility,
}

#[cfg(target_os = "linux")]
const FALLBACK_COMMANDS: &[&[&str]] = &[&["wl-copy"], &["xclip", "-selection", "clipboard"]];
#[cfg(target_os = "macos")]
const FALLBACK_COMMANDS: &[&[&str]] = &[&["pbcopy"]];
#[cfg(target_os = "windows")]
const FALLBACK_COMMANDS: &[&[&str]] = &[&["clip"]];
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const FALLBACK_COMMANDS: &[&[&str]] = &[];

/// Copy `text` to the system clipboard, trying arboard first and the
/// platform utilities second.
pub fn copy_text(text: &str) -> Result<(), ClipboardError> {
    let provider_err =
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.to_string())) {
            Ok(()) => {
                debug!("copied {text:?} via arboard");
                return Ok(());
            }
            Err(e) => e,
        };
    debug!("arboard unavailable ({provider_err}), trying platform utilities");
    if FALLBACK_COMMANDS.is_empty() {
        return Err(ClipboardError::Provider(provider_err.to_string()));
    }
    fallback_copy(text).map_err(|()| ClipboardError::NoUtility)
}

fn fallback_copy(text: &str) -> Result<(), ()> {
    for cmd in FALLBACK_COMMANDS {
        match pipe_through(cmd, text) {
            Ok(()) => {
                debug!("copied via `{}`", cmd.join(" "));
                return Ok(());
            }
            Err(e) => debug!("`{}` failed: {e}", cmd.join(" ")),
        }
    }
    Err(())
}

fn pipe_through(cmd: &[&str], text: &str) -> std::io::Result<()> {
    let mut child = Command::new(cmd[0])
        .args(&cmd[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    if let Some(stdin) = child.stdin.as_mut() {
        stdin.write_all(text.as_bytes())?;
    }
    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("exit status {status}")))
    }
}

/// Copy and log on failure instead of propagating. The UI shows feedback
/// only when the copy worked.
pub fn copy_or_warn(text: &str) -> bool {
    match copy_text(text) {
        Ok(()) => true,
        Err(e) => {
            warn!("could not copy {text:?}: {e}");
            false
        }
    }
}
