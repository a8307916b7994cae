//! Reads `<subject> <json payload>` lines from stdin and dispatches them to
//! the order handlers.

mod config;
mod orders;
mod relay;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rebound::Rebound;

use crate::config::RelayConfig;

/// `RUST_LOG` plus an `info` floor for the library and this binary
/// (targets `rebound` and `rebound_relay`).
fn log_filter(base: EnvFilter) -> Result<EnvFilter> {
    Ok(base.add_directive("rebound=info".parse()?))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(EnvFilter::from_default_env())?)
        .with_writer(std::io::stderr)
        .init();

    info!("Rebound relay starting...");

    let config = RelayConfig::from_env();
    config.log_summary();

    let mut rb = Rebound::with_decoder(config.decoder());
    orders::register(&mut rb);
    info!(events = ?rb.event_names(), "Handlers registered");

    let mapper = config.subject_mapper();
    let stats = relay::run(&rb, &mapper, std::io::stdin().lock())?;

    info!(%stats, "Input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use rebound::SubjectMapper;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn default_filter_keeps_relay_dead_letters() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(log_filter(EnvFilter::new("")).unwrap())
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let mut rb = Rebound::new();
        orders::register(&mut rb);
        tracing::subscriber::with_default(subscriber, || {
            relay::relay_line(&rb, &SubjectMapper::default(), br#"order.shipped {"OrderID":"1"}"#);
        });

        let logs = captured.contents();
        assert!(logs.contains("Dead letter: no handler for event"), "{logs}");
        assert!(logs.contains("rebound_relay::relay"), "{logs}");
    }
}
