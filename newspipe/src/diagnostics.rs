use crate::types::{DiagnosticEvent, DiagnosticLevel, DiagnosticsSink};
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Forwards every event to `tracing` at the event's level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, event: DiagnosticEvent) {
        match event.level() {
            DiagnosticLevel::Debug => debug!("{}", event),
            DiagnosticLevel::Info => info!("{}", event),
            DiagnosticLevel::Warn => warn!("{}", event),
            DiagnosticLevel::Error => error!("{}", event),
        }
    }
}

/// Keeps events in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count_at(&self, level: DiagnosticLevel) -> usize {
        self.events().iter().filter(|e| e.level() == level).count()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, event: DiagnosticEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn record(&self, _event: DiagnosticEvent) {}
}

/// Initialize tracing according to RUST_LOG and AI_NEWSPIPE_LOG_FORMAT.
/// Defaults to `info`; `AI_NEWSPIPE_LOG_FORMAT=json` writes JSON lines.
pub fn init_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match std::env::var("AI_NEWSPIPE_LOG_FORMAT").as_deref() {
        Ok("json") => {
            let _ = registry.with(fmt::layer().json().flatten_event(true)).try_init();
        }
        _ => {
            let _ = registry.with(fmt::layer().with_target(true)).try_init();
        }
    }
}
