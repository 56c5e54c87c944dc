// Per-connection reader thread.
//
// `ConnectionReader` owns a background thread that pulls frames off the
// read half of a connection with `read_action` and pushes the decoded
// actions into an `mpsc` inbox. The owner (a server `Session` or a
// `GameClient`) drains the inbox with `poll_action` from its own thread, so
// the only thing shared across threads is the channel and a pair of flags.
//
// Recoverable decode errors (bad terminator, unknown type byte, malformed
// payload) are logged and skipped; the decoder has already resynchronized
// at the next frame boundary. EOF, truncation, and I/O errors end the
// thread and clear the `active` flag. Actions decoded before that point stay
// in the inbox, so an owner must drain `poll_action` before treating an
// inactive reader as lost.
//
// `close()` unblocks the thread by shutting the underlying socket down. The
// shutdown goes through the `StreamShutdown` trait so tests can drive a
// reader from an in-memory buffer.

use std::io::{self, BufReader, Read};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use four_in_a_row_protocol::{Action, DecodeError, read_action};
use tracing::{debug, trace, warn};

/// Something that can be told to stop delivering bytes to a blocked reader.
pub trait StreamShutdown: Send {
    fn shutdown_stream(&self) -> io::Result<()>;
}

impl StreamShutdown for TcpStream {
    fn shutdown_stream(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// No-op shutdown for readers over finite in-memory sources.
impl StreamShutdown for () {
    fn shutdown_stream(&self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct ReaderFlags {
    /// The reader thread is still running.
    active: AtomicBool,
    /// `close()` was called by the owner.
    closed: AtomicBool,
}

pub struct ConnectionReader {
    label: String,
    inbox: Receiver<Action>,
    flags: Arc<ReaderFlags>,
    shutdown: Box<dyn StreamShutdown>,
}

impl ConnectionReader {
    /// Start a reader thread over `source`. `shutdown` is invoked by
    /// `close()` to unblock the thread.
    pub fn spawn<R>(
        label: impl Into<String>,
        source: R,
        shutdown: Box<dyn StreamShutdown>,
    ) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let label = label.into();
        let flags = Arc::new(ReaderFlags::default());
        flags.active.store(true, Ordering::SeqCst);

        let (tx, inbox) = mpsc::channel();
        let thread_flags = Arc::clone(&flags);
        let thread_label = label.clone();
        thread::Builder::new()
            .name(format!("reader-{label}"))
            .spawn(move || reader_loop(source, &thread_label, &tx, &thread_flags))?;

        Ok(Self {
            label,
            inbox,
            flags,
            shutdown,
        })
    }

    /// Start a reader over a cloned read half of `stream`.
    pub fn for_tcp(label: impl Into<String>, stream: &TcpStream) -> io::Result<Self> {
        let read_half = stream.try_clone()?;
        let shutdown_half = stream.try_clone()?;
        Self::spawn(label, BufReader::new(read_half), Box::new(shutdown_half))
    }

    /// Next decoded action, if one is waiting. Never blocks.
    pub fn poll_action(&self) -> Option<Action> {
        self.inbox.try_recv().ok()
    }

    /// Whether the reader thread is still running and `close()` has not
    /// been called. Actions may remain in the inbox after this turns false.
    pub fn is_active(&self) -> bool {
        !self.flags.closed.load(Ordering::SeqCst) && self.flags.active.load(Ordering::SeqCst)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Stop reading. The reader counts as inactive from here on, even
    /// while its thread is still unwinding a blocked read. Safe to call
    /// more than once.
    pub fn close(&self) {
        if self.flags.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.shutdown.shutdown_stream() {
            // NotConnected just means the peer got there first.
            if e.kind() != io::ErrorKind::NotConnected {
                debug!(connection = %self.label, error = %e, "shutdown failed");
            }
        }
    }
}

impl Drop for ConnectionReader {
    fn drop(&mut self) {
        self.close();
    }
}

fn reader_loop<R: Read>(
    mut source: R,
    label: &str,
    tx: &Sender<Action>,
    flags: &ReaderFlags,
) {
    while !flags.closed.load(Ordering::SeqCst) {
        match read_action(&mut source) {
            Ok(Some(action)) => {
                trace!(connection = %label, action_type = %action.action_type(), "frame received");
                if tx.send(action).is_err() {
                    // Owner dropped the inbox.
                    break;
                }
            }
            Ok(None) => {
                debug!(connection = %label, "end of stream");
                break;
            }
            Err(e) if e.is_recoverable() => {
                warn!(connection = %label, error = %e, "discarding frame");
            }
            Err(e) => {
                if flags.closed.load(Ordering::SeqCst) {
                    debug!(connection = %label, error = %e, "reader stopped after close");
                } else if matches!(e, DecodeError::TruncatedStream) {
                    warn!(connection = %label, "connection dropped mid-frame");
                } else {
                    warn!(connection = %label, error = %e, "read failed");
                }
                break;
            }
        }
    }
    flags.active.store(false, Ordering::SeqCst);
}
