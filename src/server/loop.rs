// Server loop module
// Accepts connections for the lifetime of the process

use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections forever, spawning one task per connection.
///
/// Accept errors (e.g. file descriptor exhaustion) are logged and the loop
/// keeps going; they never affect connections already being served.
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                accept_connection(stream, peer_addr, &state);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}
