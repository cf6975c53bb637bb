pub mod builder;
pub mod composite;
pub mod console;
pub mod file;
pub mod file_writer;
pub mod memory;

#[cfg(feature = "remote")]
pub mod remote;

pub use builder::build_sink;
pub use composite::CompositeSink;
pub use console::ConsoleSink;
pub use file::JsonFileSink;
pub use memory::MemorySink;

#[cfg(feature = "remote")]
pub use remote::HttpPushSink;
