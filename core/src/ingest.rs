//! Raw line -> event -> distributor.
//!
//! A bad line is logged and counted, never propagated: one malformed line
//! must not stop ingestion of the lines after it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use xivlog_types::AppConfig;

use crate::events::{EventDistributor, EventKind};
use crate::feed::decode_feed_message;
use crate::line::{Dispatch, LineParserRegistry, RawLine, RawLineError};
use crate::state::{XivState, register_state_reducers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Published(EventKind),
    /// Recognised, but nothing to publish.
    Declined,
    /// Blank line, unknown line type or uninteresting feed message.
    Unhandled,
    Malformed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestCounts {
    pub lines: u64,
    pub published: u64,
    pub declined: u64,
    pub unhandled: u64,
    pub malformed: u64,
}

#[derive(Default)]
struct IngestStats {
    lines: AtomicU64,
    published: AtomicU64,
    declined: AtomicU64,
    unhandled: AtomicU64,
    malformed: AtomicU64,
}

impl IngestStats {
    fn record(&self, outcome: LineOutcome) -> LineOutcome {
        self.lines.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            LineOutcome::Published(_) => &self.published,
            LineOutcome::Declined => &self.declined,
            LineOutcome::Unhandled => &self.unhandled,
            LineOutcome::Malformed => &self.malformed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        outcome
    }
}

pub struct LogIngestor {
    registry: LineParserRegistry,
    distributor: Arc<EventDistributor>,
    delimiter: char,
    stats: IngestStats,
}

impl LogIngestor {
    pub fn new(registry: LineParserRegistry, distributor: Arc<EventDistributor>) -> Self {
        Self {
            registry,
            distributor,
            delimiter: xivlog_types::DEFAULT_DELIMITER,
            stats: IngestStats::default(),
        }
    }

    /// Fresh state, reducers registered, built-in parsers.
    pub fn standard(config: &AppConfig) -> Self {
        let distributor = Arc::new(EventDistributor::new(Arc::new(XivState::new())));
        register_state_reducers(&distributor);
        Self::new(LineParserRegistry::with_default_parsers(), distributor).with_delimiter(config.delimiter)
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn distributor(&self) -> &Arc<EventDistributor> {
        &self.distributor
    }

    pub fn state(&self) -> &Arc<XivState> {
        self.distributor.state()
    }

    pub fn registry(&self) -> &LineParserRegistry {
        &self.registry
    }

    pub fn counts(&self) -> IngestCounts {
        IngestCounts {
            lines: self.stats.lines.load(Ordering::Relaxed),
            published: self.stats.published.load(Ordering::Relaxed),
            declined: self.stats.declined.load(Ordering::Relaxed),
            unhandled: self.stats.unhandled.load(Ordering::Relaxed),
            malformed: self.stats.malformed.load(Ordering::Relaxed),
        }
    }

    /// Split and ingest one line of log text.
    pub fn ingest_text(&self, line_number: u64, text: &str) -> LineOutcome {
        match RawLine::split(line_number, text, self.delimiter) {
            Ok(line) => self.ingest(&line),
            Err(RawLineError::Empty { .. }) => self.stats.record(LineOutcome::Unhandled),
            Err(e) => {
                tracing::warn!(line_number, error = %e, "Dropping unreadable log line");
                self.stats.record(LineOutcome::Malformed)
            }
        }
    }

    pub fn ingest(&self, line: &RawLine) -> LineOutcome {
        let outcome = match self.registry.dispatch(line) {
            Ok(Dispatch::Event(event)) => {
                let kind = event.kind();
                self.distributor.publish(event);
                LineOutcome::Published(kind)
            }
            Ok(Dispatch::Declined) => LineOutcome::Declined,
            Ok(Dispatch::Unhandled) => LineOutcome::Unhandled,
            Err(e) => {
                tracing::warn!(
                    line_number = e.line_number,
                    line_type = e.line_type,
                    error = %e.source,
                    "Dropping malformed log line"
                );
                LineOutcome::Malformed
            }
        };
        self.stats.record(outcome)
    }

    /// Ingest one overlay feed message (party or combatant roster).
    pub fn ingest_feed(&self, json: &str) -> LineOutcome {
        let outcome = match decode_feed_message(json) {
            Ok(Some(event)) => {
                let kind = event.kind();
                self.distributor.publish(event);
                LineOutcome::Published(kind)
            }
            Ok(None) => LineOutcome::Unhandled,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed feed message");
                LineOutcome::Malformed
            }
        };
        self.stats.record(outcome)
    }
}
