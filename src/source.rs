//! Where the protocol bytes come from and where events go.
//!
//! With `--wrap CMD` the command is spawned with piped stdin/stdout and
//! drives the menu for its lifetime; without it the surrounding process does,
//! over our own stdin/stdout. Either way the engine only ever sees an
//! [`OutboundChannel`] and a byte reader.

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use crate::protocol::events::escape_json_string;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The `--wrap` value was empty or had unbalanced quoting.
    #[error("unparseable command line")]
    BadCommandLine,
    #[error("{0}")]
    Spawn(#[source] std::io::Error),
    #[error("child stdio pipes unavailable")]
    Pipes,
}

/// A connected protocol peer: the byte reader, the event writer and the
/// child process when we spawned one.
pub struct Source {
    pub reader: Box<dyn AsyncRead + Unpin>,
    pub writer: Box<dyn AsyncWrite + Unpin + Send>,
    pub child: Option<Child>,
}

impl Source {
    /// Spawn `command_line` and wire its stdio as the protocol peer.
    /// The child is killed if it is still around when the source drops.
    pub fn wrapped(command_line: &str) -> Result<Self, SourceError> {
        let words = shlex::split(command_line).ok_or(SourceError::BadCommandLine)?;
        let (program, args) = words.split_first().ok_or(SourceError::BadCommandLine)?;
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(SourceError::Spawn)?;
        let stdin = child.stdin.take().ok_or(SourceError::Pipes)?;
        let stdout = child.stdout.take().ok_or(SourceError::Pipes)?;
        tracing::info!(command = command_line, "command spawned");
        Ok(Self {
            reader: Box::new(stdout),
            writer: Box::new(stdin),
            child: Some(child),
        })
    }

    /// Use the surrounding process as the peer.
    pub fn stdio() -> Self {
        Self {
            reader: Box::new(tokio::io::stdin()),
            writer: Box::new(tokio::io::stdout()),
            child: None,
        }
    }
}

/// The message shown when the wrapped command cannot be started. Fed through
/// the normal update path so the menu stays up with the error visible.
pub fn spawn_failure_line(command_line: &str, error: &SourceError) -> String {
    let text = format!("Error loading {command_line}:{error}");
    format!(
        r#"{{"close_on_exit": false, "message":"{}"}}"#,
        escape_json_string(&text)
    )
}

/// Sender half handed to the engine. Cheap to clone the liveness flag out
/// of; once marked dead it stays dead and sends become no-ops.
pub struct OutboundChannel {
    tx: mpsc::UnboundedSender<String>,
    alive: Arc<AtomicBool>,
}

impl OutboundChannel {
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let channel = Self {
            tx,
            alive: Arc::new(AtomicBool::new(true)),
        };
        (channel, rx)
    }

    /// Queue one preformatted message. Returns false when the channel is
    /// dead, marking it so if the receiver disappeared underneath us.
    pub fn send(&self, message: String) -> bool {
        if !self.alive.load(Ordering::Relaxed) {
            return false;
        }
        if self.tx.send(message).is_err() {
            tracing::warn!("event writer is gone, closing outbound channel");
            self.alive.store(false, Ordering::Relaxed);
            return false;
        }
        true
    }

    pub fn close(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    /// Shared liveness flag for the writer task.
    pub fn alive_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.alive)
    }
}

/// Drain the outbound queue onto the writer, flushing after every message.
/// A failed write closes the channel and ends the task.
pub async fn write_outbound(
    mut writer: impl AsyncWrite + Unpin,
    mut rx: mpsc::UnboundedReceiver<String>,
    alive: Arc<AtomicBool>,
) {
    while let Some(message) = rx.recv().await {
        let outcome = async {
            writer.write_all(message.as_bytes()).await?;
            writer.flush().await
        }
        .await;
        if let Err(err) = outcome {
            tracing::warn!(error = %err, "event write failed, closing outbound channel");
            alive.store(false, Ordering::Relaxed);
            return;
        }
    }
    tracing::debug!("outbound queue finished");
}
