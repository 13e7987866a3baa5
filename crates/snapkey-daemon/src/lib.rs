pub mod daemon;
pub mod listener;
pub mod process;

pub use daemon::{daemon_status, run_worker, start_daemon, stop_daemon};
pub use listener::start_listener;
