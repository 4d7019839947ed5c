use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

const SERVICE_NAME: &str = "ringcore";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global tracing subscriber.
///
/// `json` switches from the human readable formatter to bunyan style json lines on stderr.
/// The level is taken from `RUST_LOG` and defaults to `info`.
pub fn initialize_subscriber(json: bool) {
    if json {
        let formatting_layer =
            BunyanFormattingLayer::new(SERVICE_NAME.to_string(), std::io::stderr);
        Registry::default()
            .with(env_filter())
            .with(JsonStorageLayer)
            .with(formatting_layer)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .init();
    }
}
