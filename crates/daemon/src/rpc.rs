use std::fs;
use std::io;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use log::{debug, error, info};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;
use vitrine_protocol::codec::{read_message, write_message};
use vitrine_protocol::{DaemonRequest, DaemonResponse};

use crate::listing::{execute_list, execute_record};
use crate::state::DaemonState;

/// How long the accept loop sleeps when no client is waiting. Bounds how
/// late a shutdown signal is noticed.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Removes the socket file when the server stops, however it stops.
struct SocketGuard<'a> {
    path: &'a Path,
}

impl Drop for SocketGuard<'_> {
    fn drop(&mut self) {
        match fs::remove_file(self.path) {
            Ok(()) => debug!("Removed socket {}", self.path.display()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => error!(
                "Failed to remove Unix socket at {} on shutdown: {err}",
                self.path.display()
            ),
        }
    }
}

pub fn run_rpc_server(state: Arc<DaemonState>) -> anyhow::Result<()> {
    let socket_path = &state.config.socket_path;

    // Handlers only set the flag; the accept loop polls it.
    let shutdown = Arc::new(AtomicBool::new(false));
    for sig in [SIGINT, SIGTERM] {
        flag::register(sig, Arc::clone(&shutdown))
            .with_context(|| format!("Failed to register signal handler for {sig}"))?;
    }

    let listener = bind_socket(socket_path)?;
    let _socket_guard = SocketGuard {
        path: socket_path.as_path(),
    };

    info!("vitrine daemon listening on {}", socket_path.display());

    accept_until(&listener, &shutdown, |stream| {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            if let Err(err) = handle_client(stream, &state) {
                error!("Error while handling client: {err:#}");
            }
        });
    })
    .context("Failed to configure the listening socket")?;

    info!("Shutdown signal observed; RPC server stopped.");
    Ok(())
}

/// Bind `socket_path`, creating its directory and replacing a stale socket.
fn bind_socket(socket_path: &Path) -> anyhow::Result<UnixListener> {
    if let Some(parent) = socket_path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create socket directory {}", parent.display())
        })?;
    }

    if socket_path.exists() {
        fs::remove_file(socket_path).with_context(|| {
            format!(
                "Failed to remove existing socket at {}",
                socket_path.display()
            )
        })?;
    }

    UnixListener::bind(socket_path)
        .with_context(|| format!("Failed to bind Unix socket at {}", socket_path.display()))
}

/// Hand every accepted connection to `on_client` until `shutdown` is set.
///
/// The listener is switched to nonblocking mode: signal handlers installed
/// with `SA_RESTART` would otherwise leave a blocking `accept` parked until
/// the next client arrives.
fn accept_until(
    listener: &UnixListener,
    shutdown: &AtomicBool,
    mut on_client: impl FnMut(UnixStream),
) -> io::Result<()> {
    listener.set_nonblocking(true)?;

    while !shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, _addr)) => {
                // Some platforms let accepted sockets inherit O_NONBLOCK.
                if let Err(err) = stream.set_nonblocking(false) {
                    error!("Dropping client, cannot make its socket blocking: {err}");
                    continue;
                }
                on_client(stream);
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => {
                error!("Accept error: {err}");
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
        }
    }

    Ok(())
}

fn handle_client(mut stream: UnixStream, state: &DaemonState) -> anyhow::Result<()> {
    let request: DaemonRequest =
        read_message(&mut stream).context("Failed to read DaemonRequest")?;

    debug!("Received request: {:?}", request);

    let response = match request {
        DaemonRequest::Ping => DaemonResponse::Pong,
        DaemonRequest::Status => {
            let settings = &state.config.settings;
            DaemonResponse::Status(format!(
                "shared={}, thumbnails={}, db={}, workers={}, url={}",
                settings.shared_root.display(),
                settings.thumbnail_root.display(),
                settings.db_path.display(),
                settings.max_workers,
                state.decorator().base()
            ))
        }
        DaemonRequest::List(req) => execute_list(state, &req),
        DaemonRequest::Record(req) => execute_record(state, &req),
    };

    write_message(&mut stream, &response).context("Failed to write DaemonResponse")
}
