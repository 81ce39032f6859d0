use anyhow::{Context, Result};
use arboard::Clipboard;
use std::sync::mpsc;
use std::time::Duration;
use tracing::debug;

/// Puts `text` on the system clipboard and, unless `clear_after` is zero,
/// blocks until the delay elapses or Ctrl-C arrives, then wipes it.
///
/// Returns whether the clipboard was cleared.
pub fn copy_with_clear(text: &str, clear_after: Duration) -> Result<bool> {
    let mut clipboard = Clipboard::new().context("clipboard unavailable")?;
    clipboard
        .set_text(text.to_owned())
        .context("failed to copy to clipboard")?;

    if clear_after.is_zero() {
        return Ok(false);
    }

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("failed to install interrupt handler")?;

    // either the timer ran out or the user interrupted; clear in both cases
    let _ = rx.recv_timeout(clear_after);

    let current = clipboard.get_text().ok();
    if should_clear(current.as_deref(), text) {
        clipboard.clear().context("failed to clear clipboard")?;
        debug!("clipboard cleared");
        return Ok(true);
    }
    Ok(false)
}

/// Only wipe what we put there; a newer copy by the user stays.
fn should_clear(current: Option<&str>, ours: &str) -> bool {
    current == Some(ours)
}
