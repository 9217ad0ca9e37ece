//! The cooperative serving loop.
//!
//! Everything protocol-facing runs on one task: reads are framed into lines,
//! every buffered line is applied before deferred work runs, and only then
//! does the loop yield back to the reactor. Outbound events leave through a
//! separate writer task so a slow consumer never stalls updates.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::task::JoinHandle;

use crate::engine::{reconcile, Engine};
use crate::protocol::framing::LineFramer;
use crate::source::{write_outbound, OutboundChannel, Source};
use crate::view::MenuView;

/// How long to keep reading leftovers after the driving command exited.
const DRAIN_GRACE: Duration = Duration::from_millis(50);

/// Pause between attempts after the update stream reports a read error.
const READ_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Why the loop finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The driving command exited and the page allowed closing.
    CloseRequested,
    /// Interrupt signal received.
    Interrupted,
}

pub struct Runtime<V: MenuView> {
    engine: Engine,
    view: V,
    framer: LineFramer,
}

impl<V: MenuView> Runtime<V> {
    pub fn new(engine: Engine, view: V) -> Self {
        Self {
            engine,
            view,
            framer: LineFramer::new(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Serve the protocol until the peer goes away or we are interrupted.
    pub async fn run(&mut self, source: Source) -> RunOutcome {
        let Source {
            reader,
            writer,
            child,
        } = source;
        let (channel, queue) = OutboundChannel::pair();
        let alive = channel.alive_flag();
        self.engine.attach_outbound(channel);
        let writer_task = tokio::spawn(write_outbound(writer, queue, alive));
        self.engine.emit_init();

        let mut reader = Some(reader);
        let mut child = child;
        let mut buf = vec![0u8; 4096];
        loop {
            tokio::select! {
                read = read_chunk(reader.as_deref_mut(), &mut buf), if reader.is_some() => {
                    match read {
                        Ok(0) => {
                            tracing::info!("update stream reached end of file");
                            reader = None;
                        }
                        Ok(count) => self.process_chunk(&buf[..count]),
                        Err(err) => {
                            // Recoverable: buffered bytes stay in the framer.
                            tracing::warn!(error = %err, "update stream read failed, retrying");
                            tokio::time::sleep(READ_RETRY_DELAY).await;
                        }
                    }
                }
                status = wait_for_exit(child.as_mut()), if child.is_some() => {
                    match status {
                        Ok(status) => tracing::info!(%status, "menu command exited"),
                        Err(err) => tracing::warn!(error = %err, "menu command wait failed"),
                    }
                    child = None;
                    if let Some(rest) = reader.as_deref_mut() {
                        self.drain_remaining(rest).await;
                    }
                    reader = None;
                    self.engine.close_outbound();
                    if self.engine.close_on_exit() {
                        self.finish(writer_task).await;
                        return RunOutcome::CloseRequested;
                    }
                    tracing::info!("closing declined by the page, still serving");
                }
                signal = tokio::signal::ctrl_c() => {
                    if let Err(err) = signal {
                        tracing::warn!(error = %err, "interrupt handler unavailable");
                    }
                    break;
                }
            }
        }
        self.finish(writer_task).await;
        RunOutcome::Interrupted
    }

    /// Keep the menu alive showing a startup failure, with no peer attached.
    pub async fn run_degraded(&mut self, failure_line: &str) -> RunOutcome {
        reconcile::process_line(&mut self.engine, &mut self.view, failure_line);
        self.engine.drain_deferred(&mut self.view);
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "interrupt handler unavailable");
        }
        self.engine.shutdown();
        RunOutcome::Interrupted
    }

    /// Emit the final event and wait for the writer to put everything on the
    /// wire. Closing the outbound side ends the writer's queue; the join
    /// only waits out the buffered backlog.
    async fn finish(&mut self, writer: JoinHandle<()>) {
        self.engine.shutdown();
        if let Err(err) = writer.await {
            tracing::warn!(error = %err, "event writer task ended abnormally");
        }
    }

    /// Frame a chunk, apply every complete line, then run deferred work.
    fn process_chunk(&mut self, bytes: &[u8]) {
        self.framer.feed(bytes);
        while let Some(line) = self.framer.next_line() {
            reconcile::process_line(&mut self.engine, &mut self.view, &line);
        }
        self.engine.drain_deferred(&mut self.view);
    }

    /// After the command exited, pick up whatever it managed to write last.
    /// Bounded by a grace period in case something inherited the pipe.
    async fn drain_remaining(&mut self, reader: &mut (dyn AsyncRead + Unpin + 'static)) {
        let mut buf = vec![0u8; 4096];
        loop {
            match tokio::time::timeout(DRAIN_GRACE, reader.read(&mut buf)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(count)) => self.process_chunk(&buf[..count]),
                Ok(Err(err)) => {
                    tracing::debug!(error = %err, "leftover read failed");
                    break;
                }
                Err(_) => {
                    tracing::debug!("leftover grace period elapsed");
                    break;
                }
            }
        }
    }
}

// Without the explicit bound the object lifetime defaults to the reference's
// own, and each call would then hold the `Option` borrowed for good.
async fn read_chunk(
    reader: Option<&mut (dyn AsyncRead + Unpin + 'static)>,
    buf: &mut [u8],
) -> std::io::Result<usize> {
    match reader {
        Some(reader) => reader.read(buf).await,
        None => std::future::pending().await,
    }
}

async fn wait_for_exit(child: Option<&mut Child>) -> std::io::Result<std::process::ExitStatus> {
    match child {
        Some(child) => child.wait().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SubstringTokenizer;
    use crate::page::MarkupDefault;
    use crate::protocol::events::DEFAULT_EVENT_FORMAT;
    use crate::view::TraceView;

    fn runtime() -> Runtime<TraceView> {
        let engine = Engine::new(
            MarkupDefault::Unspecified,
            DEFAULT_EVENT_FORMAT.to_string(),
            Box::new(SubstringTokenizer),
        );
        Runtime::new(engine, TraceView::default())
    }

    #[test]
    fn chunks_apply_every_complete_line_and_buffer_the_rest() {
        let mut rt = runtime();
        rt.process_chunk(b"{\"message\":\"one\"}\n{\"message\":\"two\"}\n{\"mess");
        assert_eq!(rt.engine().page().message_text(), Some("two"));
        rt.process_chunk(b"age\":\"three\"}\n");
        assert_eq!(rt.engine().page().message_text(), Some("three"));
    }

    #[test]
    fn protocol_input_update_does_not_echo_an_event() {
        let mut rt = runtime();
        let (channel, mut rx) = OutboundChannel::pair();
        rt.engine.attach_outbound(channel);
        rt.process_chunk(b"{\"input\":\"synced\"}\n");
        assert_eq!(rt.view().current_input(), "synced");
        assert_eq!(rt.engine().page().input, "synced");
        assert!(rx.try_recv().is_err(), "no event for protocol-driven input");
    }

    #[test]
    fn keep_alive_blank_lines_are_skipped() {
        let mut rt = runtime();
        rt.process_chunk(b"\n\n{\"message\":\"after keep-alives\"}\n\n");
        assert_eq!(rt.engine().page().message_text(), Some("after keep-alives"));
    }

    #[test]
    fn exit_event_is_on_the_wire_when_teardown_returns() {
        let worker = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let (events_in, mut events_out) = tokio::io::duplex(1024);
        worker.block_on(async {
            let mut rt = runtime();
            let (channel, queue) = OutboundChannel::pair();
            let alive = channel.alive_flag();
            rt.engine.attach_outbound(channel);
            let writer = tokio::spawn(write_outbound(events_in, queue, alive));
            rt.engine.emit_init();
            rt.finish(writer).await;
        });
        // Anything still queued dies with the runtime instead of flushing.
        drop(worker);

        let text = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime")
            .block_on(async move {
                let mut bytes = Vec::new();
                events_out
                    .read_to_end(&mut bytes)
                    .await
                    .expect("events stream drained");
                String::from_utf8(bytes).expect("events are utf8")
            });
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2, "got: {text:?}");
        assert!(lines[0].contains("\"INIT\""));
        assert!(lines[1].contains("\"EXIT\""));
    }
}
