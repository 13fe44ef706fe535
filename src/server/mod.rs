// Server module entry
// Listener creation, accept loop and per-connection serving

pub mod connection;
pub mod listener;

// `loop` is a keyword, so the file is mounted under another name
#[path = "loop.rs"]
pub mod server_loop;

// Re-export commonly used items
pub use listener::create_listener;
pub use server_loop::start_server_loop;
