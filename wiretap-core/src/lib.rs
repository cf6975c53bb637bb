pub mod args;
pub mod classify;
pub mod config;
pub mod entry;
pub mod error;
pub mod serialize;
pub mod sink;

pub use args::CallArgs;
pub use classify::Failure;
pub use config::WiretapConfig;
pub use entry::{LogEntry, ResponseStatus};
pub use error::WiretapError;
pub use sink::LogSink;
