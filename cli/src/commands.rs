use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::time::Duration;
use xivlog_core::events::{DEFAULT_PRIORITY, EventDistributor, EventKind, handler_fn};
use xivlog_core::{AppConfig, AppConfigExt, LineOutcome, LogIngestor, StateSnapshot, resolve_log_path};

use crate::reader::{LogLine, read_log_lines};

const CHANNEL_CAPACITY: usize = 1024;

pub async fn replay(config: &AppConfig, path: &str, follow: bool, json: bool) -> Result<(), String> {
    let path = resolve_log_path(config, Path::new(path));
    let ingestor = LogIngestor::standard(config);
    let refreshes = watch_refresh_requests(ingestor.distributor());

    let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);
    let poll = Duration::from_millis(config.follow_poll_ms);
    let reader = tokio::spawn({
        let path = path.clone();
        async move { read_log_lines(path, follow, poll, tx).await }
    });

    tracing::info!(path = %path.display(), follow, "Replaying log");

    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    loop {
        tokio::select! {
            line = rx.recv() => match line {
                Some(line) => {
                    ingest_line(&ingestor, &line);
                }
                None => break,
            },
            _ = &mut interrupt, if follow => {
                tracing::info!("Interrupted, stopping replay");
                break;
            }
        }
    }
    drop(rx);

    let read = reader
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| format!("{}: {e}", path.display()))?;
    tracing::info!(lines = read, "Replay finished");

    let snapshot = ingestor.state().snapshot();
    let refreshes = refreshes.load(Ordering::Relaxed);
    if json {
        let report = serde_json::json!({
            "state": snapshot,
            "ingest": ingestor.counts(),
            "distributor": ingestor.distributor().counts(),
            "refresh_requests": refreshes,
        });
        let text = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{text}");
    } else {
        print_summary(&ingestor, &snapshot, refreshes);
    }
    Ok(())
}

pub fn show_config(config: &AppConfig) -> Result<(), String> {
    match AppConfig::config_path() {
        Ok(path) => println!("Config file:   {}", path.display()),
        Err(e) => println!("Config file:   unavailable ({e})"),
    }
    let dir = if config.log_directory.is_empty() {
        "(current directory)"
    } else {
        config.log_directory.as_str()
    };
    println!("Log directory: {dir}");
    println!("Delimiter:     {:?}", config.delimiter);
    println!("Follow poll:   {}ms", config.follow_poll_ms);
    println!("Log filter:    {}", config.log_filter);
    Ok(())
}

// Feed messages (party, combatant roster) may be captured into the same
// stream as log lines; they are the only lines that start with `{`.
fn ingest_line(ingestor: &LogIngestor, line: &LogLine) -> LineOutcome {
    if line.text.trim_start().starts_with('{') {
        ingestor.ingest_feed(&line.text)
    } else {
        ingestor.ingest_text(line.number, &line.text)
    }
}

/// Stand-in for the overlay connection that would answer refresh requests.
fn watch_refresh_requests(distributor: &EventDistributor) -> Arc<AtomicU64> {
    let count = Arc::new(AtomicU64::new(0));
    let sink = Arc::clone(&count);
    distributor.register(
        EventKind::RefreshCombatantsRequest,
        DEFAULT_PRIORITY,
        handler_fn("refresh_request_log", move |ctx, _| {
            let n = sink.fetch_add(1, Ordering::Relaxed) + 1;
            let player = ctx.state().player().map(|p| p.name);
            tracing::info!(request = n, player = ?player, "Combatant refresh requested");
            Ok(())
        }),
    );
    count
}

fn print_summary(ingestor: &LogIngestor, snapshot: &StateSnapshot, refreshes: u64) {
    let counts = ingestor.counts();
    let dist = ingestor.distributor().counts();

    println!(
        "Lines:       {} ({} published, {} declined, {} unhandled, {} malformed)",
        counts.lines, counts.published, counts.declined, counts.unhandled, counts.malformed
    );
    match &snapshot.zone {
        Some(zone) => println!("Zone:        {} ({:#X})", zone.name, zone.id),
        None => println!("Zone:        unknown"),
    }
    match &snapshot.player {
        Some(player) => println!("Player:      {} ({:X})", player.name, player.id),
        None => println!("Player:      unknown"),
    }
    match &snapshot.party {
        Some(party) => {
            let names: Vec<&str> = party.iter().map(|p| p.name.as_str()).collect();
            println!("Party:       {} [{}]", party.len(), names.join(", "));
        }
        None => println!("Party:       unknown"),
    }
    match &snapshot.combatants {
        Some(list) => println!("Combatants:  {}", list.len()),
        None => println!("Combatants:  unknown"),
    }
    println!("Refreshes:   {refreshes}");
    println!(
        "Events:      {} published, {} deliveries, {} handler failures, {} dropped",
        dist.published, dist.deliveries, dist.handler_failures, dist.dropped
    );
}
