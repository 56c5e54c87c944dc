// TCP listener and dispatch thread.
//
// Architecture: thread-per-reader, with one dispatch thread that owns the
// `GameServer`.
//
// - **Listener thread**: nonblocking `accept()` loop that hands new streams
//   to the dispatch thread over an `mpsc` channel and checks `keep_running`
//   between attempts.
// - **Reader threads** (one per connection, see `reader.rs`): decode frames
//   into each session's own inbox.
// - **Dispatch thread**: seats new connections, then runs `poll_once` over
//   the sessions. It never blocks on a socket; when a pass finds nothing to
//   do it sleeps for `idle_poll_ms`.
//
// Shutdown: `ServerHandle::stop` clears `keep_running`. The dispatch thread
// then closes the `GameServer` (which sends every player a server-closed
// Exit) and exits. A player sending a server-closed Exit ends the loop the
// same way from the inside.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::dispatch::GameServer;
use crate::error::ServerError;

const ACCEPT_POLL: Duration = Duration::from_millis(20);

/// Handle returned by `start_server` to control the running server.
pub struct ServerHandle {
    keep_running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ServerHandle {
    /// Close the game (players get a server-closed Exit) and wait for the
    /// dispatch thread to finish.
    pub fn stop(mut self) {
        self.keep_running.store(false, Ordering::SeqCst);
        self.join_thread();
    }

    /// Block until the server shuts itself down.
    pub fn wait(mut self) {
        self.join_thread();
    }

    /// Whether the server is still accepting and dispatching.
    pub fn is_running(&self) -> bool {
        self.keep_running.load(Ordering::SeqCst)
    }

    fn join_thread(&mut self) {
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            error!("dispatch thread panicked");
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.keep_running.store(false, Ordering::SeqCst);
        self.join_thread();
    }
}

/// Bind the listener and start serving. Returns the handle and the address
/// actually bound, which matters when `config.port` is 0.
pub fn start_server(config: &ServerConfig) -> Result<(ServerHandle, SocketAddr), ServerError> {
    config.validate()?;
    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).map_err(|source| ServerError::Bind {
        addr: addr.clone(),
        source,
    })?;
    let local_addr = listener.local_addr()?;
    // Nonblocking so the accept thread can notice `keep_running` going false.
    listener.set_nonblocking(true)?;
    info!(%local_addr, columns = config.columns, rows = config.rows, "server listening");

    let keep_running = Arc::new(AtomicBool::new(true));
    let (tx, rx) = mpsc::channel();

    let keep_running_listener = Arc::clone(&keep_running);
    thread::Builder::new()
        .name("server-accept".into())
        .spawn(move || accept_loop(&listener, &tx, &keep_running_listener))?;

    let server = GameServer::new(config.columns, config.rows);
    let idle = config.idle_poll();
    let keep_running_dispatch = Arc::clone(&keep_running);
    let thread = thread::Builder::new()
        .name("server-dispatch".into())
        .spawn(move || run_dispatch(server, &rx, &keep_running_dispatch, idle))?;

    Ok((
        ServerHandle {
            keep_running,
            thread: Some(thread),
        },
        local_addr,
    ))
}

fn accept_loop(listener: &TcpListener, tx: &Sender<TcpStream>, keep_running: &AtomicBool) {
    while keep_running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!(%peer, "accepted connection");
                if let Err(e) = stream.set_nonblocking(false) {
                    warn!(%peer, error = %e, "could not make stream blocking; dropping it");
                    continue;
                }
                if tx.send(stream).is_err() {
                    break;
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL);
            }
            Err(e) => {
                warn!(error = %e, "accept failed");
                thread::sleep(ACCEPT_POLL);
            }
        }
    }
    debug!("accept loop stopped");
}

fn run_dispatch(
    mut server: GameServer,
    incoming: &Receiver<TcpStream>,
    keep_running: &AtomicBool,
    idle: Duration,
) {
    while keep_running.load(Ordering::SeqCst) {
        while let Ok(stream) = incoming.try_recv() {
            let peer = stream.peer_addr().ok();
            match server.add_connection(stream) {
                Ok(_) => {}
                Err(ServerError::Full) => {
                    info!(?peer, "both slots taken; dropping connection");
                }
                Err(e) => warn!(?peer, error = %e, "could not seat connection"),
            }
        }

        let progressed = server.poll_once();
        if server.is_closed() {
            break;
        }
        if !progressed {
            thread::sleep(idle);
        }
    }
    server.close();
    keep_running.store(false, Ordering::SeqCst);
}
