//! Worker process channel.
//!
//! A [`Channel`] implementation backed by a spawned worker process.
//! Frames cross the process boundary as newline-delimited text over the
//! worker's stdio: object frames as single-line JSON, textual frames
//! (compressed mode) verbatim, since base64 text never contains a newline.
//!
//! A supervisor task owns the child handle: it forwards stdout lines as
//! [`ChannelEvent::Message`], reaps the process when it exits, and
//! performs forced kills on behalf of [`Channel::kill`].

// ============================================================================
// Imports
// ============================================================================

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::Frame;
use crate::transport::channel::{Channel, ChannelEvent, ChannelEventSender, ChannelEvents};

// ============================================================================
// ControlMessage
// ============================================================================

/// Requests from the channel handle to the supervisor task.
enum ControlMessage {
    /// Kill the worker and acknowledge once it is reaped.
    Kill(oneshot::Sender<Result<()>>),
}

// ============================================================================
// ProcessChannel
// ============================================================================

/// Channel to a spawned worker process over newline-delimited stdio.
pub struct ProcessChannel {
    /// Worker stdin; `None` after disconnect or kill.
    stdin: Option<ChildStdin>,
    /// Control line to the supervisor task.
    control_tx: mpsc::UnboundedSender<ControlMessage>,
    /// Worker process ID for logging.
    pid: u32,
}

impl ProcessChannel {
    /// Spawns the worker and wires its stdio into a channel.
    ///
    /// `compressed` selects the inbound framing: raw text lines when set,
    /// parsed JSON objects otherwise. Worker stderr is inherited.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProcessLaunchFailed`] if the process fails to
    /// spawn, [`Error::Channel`] if its stdio cannot be captured.
    pub fn spawn(mut command: Command, compressed: bool) -> Result<(Self, ChannelEvents)> {
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let mut child = command.spawn().map_err(Error::process_launch_failed)?;
        let pid = child.id().unwrap_or(0);

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::channel("worker stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::channel("worker stdout not captured"))?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        tokio::spawn(supervise(child, stdout, events_tx, control_rx, compressed));
        info!(pid, "Worker process spawned");

        Ok((
            Self {
                stdin: Some(stdin),
                control_tx,
                pid,
            },
            events_rx,
        ))
    }

    /// Returns the worker's process ID.
    #[inline]
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

// ============================================================================
// ProcessChannel - Channel
// ============================================================================

#[async_trait]
impl Channel for ProcessChannel {
    async fn send(&mut self, frame: Frame) -> Result<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(Error::ChannelClosed);
        };

        let mut line = match frame {
            Frame::Object(value) => serde_json::to_string(&value)?,
            Frame::Text(text) => text,
        };
        line.push('\n');

        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await?;

        trace!(pid = self.pid, bytes = line.len(), "Frame written");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        // Closing stdin tells the worker to wind down on its own.
        if let Some(mut stdin) = self.stdin.take() {
            stdin.shutdown().await?;
        }
        debug!(pid = self.pid, "Worker disconnected");
        Ok(())
    }

    async fn kill(&mut self) -> Result<()> {
        self.stdin.take();

        let (ack, done) = oneshot::channel();
        if self
            .control_tx
            .send(ControlMessage::Kill(ack))
            .is_err()
        {
            // Supervisor already finished: the worker has exited.
            return Ok(());
        }

        match done.await {
            Ok(result) => result,
            // Supervisor raced a natural exit between send and ack.
            Err(_) => Ok(()),
        }
    }
}

// ============================================================================
// Supervisor
// ============================================================================

/// Owns the child: forwards stdout lines, reaps on exit, honors kills.
async fn supervise(
    mut child: Child,
    stdout: ChildStdout,
    events: ChannelEventSender,
    mut control: mpsc::UnboundedReceiver<ControlMessage>,
    compressed: bool,
) {
    let mut lines = BufReader::new(stdout).lines();
    let mut reading = true;
    let mut control_open = true;
    let mut pending_exit: Option<ChannelEvent> = None;

    loop {
        tokio::select! {
            line = lines.next_line(), if reading => {
                match line {
                    Ok(Some(text)) => forward_line(&events, text, compressed),
                    Ok(None) => {
                        debug!("Worker stdout closed");
                        reading = false;
                    }
                    Err(err) => {
                        warn!(error = %err, "Worker stdout read failed");
                        let _ = events.send(ChannelEvent::Error(err.to_string()));
                        reading = false;
                    }
                }
                if !reading && let Some(event) = pending_exit.take() {
                    let _ = events.send(event);
                    break;
                }
            }

            status = child.wait(), if pending_exit.is_none() => {
                let event = exit_event(status);
                if reading {
                    // Buffered stdout drains before the exit is reported.
                    pending_exit = Some(event);
                } else {
                    let _ = events.send(event);
                    break;
                }
            }

            message = control.recv(), if control_open => {
                match message {
                    Some(ControlMessage::Kill(ack)) => {
                        debug!("Killing worker");
                        let result = if pending_exit.is_some() {
                            // Already reaped, nothing left to kill.
                            Ok(())
                        } else {
                            child.kill().await.map_err(Error::from)
                        };
                        let _ = ack.send(result);
                        break;
                    }
                    None => control_open = false,
                }
            }
        }
    }

    debug!("Worker supervisor terminated");
}

/// Builds the channel event for a finished worker.
fn exit_event(status: std::io::Result<std::process::ExitStatus>) -> ChannelEvent {
    match status {
        Ok(status) => {
            let code = status.code();
            let signal = exit_signal(&status);
            debug!(?code, ?signal, "Worker exited");
            ChannelEvent::Exit { code, signal }
        }
        Err(err) => {
            warn!(error = %err, "Waiting for worker failed");
            ChannelEvent::Error(err.to_string())
        }
    }
}

/// Forwards one stdout line as a channel message.
fn forward_line(events: &ChannelEventSender, line: String, compressed: bool) {
    if compressed {
        let _ = events.send(ChannelEvent::Message(Frame::Text(line)));
        return;
    }

    match serde_json::from_str(&line) {
        Ok(value) => {
            let _ = events.send(ChannelEvent::Message(Frame::Object(value)));
        }
        Err(err) => {
            let _ = events.send(ChannelEvent::Error(format!("malformed worker frame: {err}")));
        }
    }
}

/// Extracts the terminating signal, if any (unix only).
#[cfg(unix)]
fn exit_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}

// ============================================================================
// Tests
// ============================================================================
