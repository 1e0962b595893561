pub mod context;
pub mod events;
pub mod feed;
pub mod ingest;
pub mod line;
pub mod models;
pub mod state;


// Re-exports for convenience
pub use context::{AppConfig, AppConfigExt, ConfigError, resolve_log_path};
pub use events::{EventContext, EventDistributor, EventHandler, EventKind, XivEvent};
pub use ingest::{IngestCounts, LineOutcome, LogIngestor};
pub use line::{LineParser, LineParserRegistry, RawLine};
pub use models::*;
pub use state::{StateSnapshot, XivState, register_state_reducers};
