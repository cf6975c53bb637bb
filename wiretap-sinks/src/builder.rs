use crate::composite::CompositeSink;
use crate::console::ConsoleSink;
use crate::file::JsonFileSink;
use std::sync::Arc;
use tracing::info;
use wiretap_core::config::SinkConfig;
use wiretap_core::{LogSink, WiretapError};

/// Build the sink described by `config`.
///
/// One enabled sink is returned as is, several are wrapped in a
/// [`CompositeSink`], and with nothing enabled the console sink is used.
/// The remote sink needs the `remote` feature and a running tokio runtime.
pub fn build_sink(config: &SinkConfig) -> Result<Arc<dyn LogSink>, WiretapError> {
    let mut sinks: Vec<Arc<dyn LogSink>> = Vec::new();

    if config.console.enabled {
        sinks.push(Arc::new(ConsoleSink::new(config.console.format)));
    }

    if config.file.enabled {
        sinks.push(Arc::new(JsonFileSink::from_config(&config.file)?));
    }

    if config.remote.enabled {
        sinks.push(remote_sink(config)?);
    }

    let sink: Arc<dyn LogSink> = match sinks.len() {
        0 => Arc::new(ConsoleSink::default()),
        1 => sinks.remove(0),
        _ => Arc::new(CompositeSink::new(sinks)),
    };

    info!(sink = sink.name(), "Log sink ready");
    Ok(sink)
}

#[cfg(feature = "remote")]
fn remote_sink(config: &SinkConfig) -> Result<Arc<dyn LogSink>, WiretapError> {
    if tokio::runtime::Handle::try_current().is_err() {
        return Err(WiretapError::Sink(
            "remote sink must be built inside a tokio runtime".into(),
        ));
    }
    Ok(Arc::new(crate::remote::HttpPushSink::new(config.remote.clone())))
}

#[cfg(not(feature = "remote"))]
fn remote_sink(_config: &SinkConfig) -> Result<Arc<dyn LogSink>, WiretapError> {
    Err(WiretapError::Config(
        "sinks.remote is enabled but wiretap-sinks was built without the `remote` feature".into(),
    ))
}
