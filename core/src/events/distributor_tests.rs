//! Tests for event distribution
//!
//! Covers priority ordering, depth-first follow-up delivery and failure
//! isolation.

use std::sync::{Arc, Mutex};
use std::thread;

use super::*;
use crate::models::{Combatant, Player, Zone};
use crate::state::register_state_reducers;

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn recorder(log: &Log, label: &'static str) -> impl EventHandler + 'static {
    let log = Arc::clone(log);
    handler_fn(label, move |_, event| {
        log.lock().unwrap().push(format!("{label}:{:?}", event.kind()));
        Ok(())
    })
}

fn zone_event(id: u64) -> XivEvent {
    XivEvent::ZoneChange {
        zone: Zone::new(id, "Somewhere"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ordering
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_priority_order_independent_of_registration_order() {
    let dist = EventDistributor::default();
    let log = new_log();

    dist.register(EventKind::ZoneChange, 10, recorder(&log, "late"));
    dist.register(EventKind::ZoneChange, -10, recorder(&log, "early"));
    dist.register(EventKind::ZoneChange, REDUCER_PRIORITY, recorder(&log, "first"));
    dist.register(EventKind::ZoneChange, i32::MAX, recorder(&log, "last"));

    dist.publish(zone_event(1));

    assert_eq!(
        entries(&log),
        vec![
            "first:ZoneChange",
            "early:ZoneChange",
            "late:ZoneChange",
            "last:ZoneChange"
        ]
    );
}

#[test]
fn test_equal_priority_runs_in_registration_order() {
    let dist = EventDistributor::default();
    let log = new_log();

    for label in ["a", "b", "c", "d"] {
        dist.register(EventKind::ZoneChange, DEFAULT_PRIORITY, recorder(&log, label));
    }
    dist.publish(zone_event(1));

    assert_eq!(
        entries(&log),
        vec!["a:ZoneChange", "b:ZoneChange", "c:ZoneChange", "d:ZoneChange"]
    );
}

#[test]
fn test_only_matching_kind_delivered() {
    let dist = EventDistributor::default();
    let log = new_log();

    dist.register(EventKind::PlayerChange, DEFAULT_PRIORITY, recorder(&log, "player"));
    dist.register(EventKind::ZoneChange, DEFAULT_PRIORITY, recorder(&log, "zone"));
    dist.register_any(DEFAULT_PRIORITY, recorder(&log, "any"));

    dist.publish(zone_event(1));

    assert_eq!(entries(&log), vec!["zone:ZoneChange", "any:ZoneChange"]);
}

#[test]
fn test_no_handlers_is_fine() {
    let dist = EventDistributor::default();
    dist.publish(XivEvent::RefreshCombatantsRequest);
    assert_eq!(dist.counts().published, 1);
    assert_eq!(dist.counts().deliveries, 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Depth-first follow-ups
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_follow_up_drains_before_next_sibling() {
    let dist = EventDistributor::default();
    let log = new_log();

    let emit_log = Arc::clone(&log);
    dist.register(
        EventKind::PlayerChange,
        0,
        handler_fn("emitter", move |ctx, _| {
            emit_log.lock().unwrap().push("emitter:start".to_string());
            ctx.publish(XivEvent::RefreshCombatantsRequest);
            ctx.publish(zone_event(2));
            emit_log.lock().unwrap().push("emitter:end".to_string());
            Ok(())
        }),
    );
    dist.register(EventKind::PlayerChange, 1, recorder(&log, "sibling"));
    dist.register(EventKind::RefreshCombatantsRequest, 0, recorder(&log, "refresh"));
    dist.register(EventKind::ZoneChange, 0, recorder(&log, "zone"));

    dist.publish(XivEvent::PlayerChange {
        player: Player::new(1, "Tataru"),
    });

    // Follow-ups wait for the emitting handler to return, then run in
    // publish order, all before the next handler of the original event.
    assert_eq!(
        entries(&log),
        vec![
            "emitter:start",
            "emitter:end",
            "refresh:RefreshCombatantsRequest",
            "zone:ZoneChange",
            "sibling:PlayerChange"
        ]
    );
}

#[test]
fn test_nested_cascade_is_depth_first() {
    let dist = EventDistributor::default();
    let log = new_log();

    // PlayerChange -> ZoneChange -> RefreshCombatantsRequest
    dist.register(
        EventKind::PlayerChange,
        0,
        handler_fn("player_to_zone", |ctx, _| {
            ctx.publish(zone_event(9));
            Ok(())
        }),
    );
    dist.register(
        EventKind::ZoneChange,
        0,
        handler_fn("zone_to_refresh", |ctx, _| {
            ctx.publish(XivEvent::RefreshCombatantsRequest);
            Ok(())
        }),
    );
    dist.register(EventKind::ZoneChange, 1, recorder(&log, "zone_observer"));
    dist.register(EventKind::PlayerChange, 1, recorder(&log, "player_observer"));
    dist.register(EventKind::RefreshCombatantsRequest, 0, recorder(&log, "refresh"));

    dist.publish(XivEvent::PlayerChange {
        player: Player::new(1, "Tataru"),
    });

    assert_eq!(
        entries(&log),
        vec![
            "refresh:RefreshCombatantsRequest",
            "zone_observer:ZoneChange",
            "player_observer:PlayerChange"
        ]
    );
}

#[test]
fn test_direct_publish_from_handler_is_queued() {
    let dist = Arc::new(EventDistributor::default());
    let log = new_log();

    let inner = Arc::clone(&dist);
    let emit_log = Arc::clone(&log);
    dist.register(
        EventKind::ZoneChange,
        0,
        handler_fn("direct", move |_, _| {
            inner.publish(XivEvent::RefreshCombatantsRequest);
            emit_log.lock().unwrap().push("direct:returned".to_string());
            Ok(())
        }),
    );
    dist.register(EventKind::RefreshCombatantsRequest, 0, recorder(&log, "refresh"));

    dist.publish(zone_event(1));

    assert_eq!(
        entries(&log),
        vec!["direct:returned", "refresh:RefreshCombatantsRequest"]
    );
}

#[test]
fn test_publish_returns_after_whole_cascade() {
    let dist = EventDistributor::default();
    register_state_reducers(&dist);
    let log = new_log();
    dist.register(EventKind::RefreshCombatantsRequest, DEFAULT_PRIORITY, recorder(&log, "refresh"));

    dist.publish(XivEvent::PlayerChange {
        player: Player::new(0x10FF0001, "Tataru Taru"),
    });

    assert_eq!(entries(&log), vec!["refresh:RefreshCombatantsRequest"]);
}

#[test]
fn test_runaway_cascade_is_cut_off() {
    let dist = EventDistributor::default();
    dist.register(
        EventKind::RefreshCombatantsRequest,
        0,
        handler_fn("feedback_loop", |ctx, _| {
            ctx.publish(XivEvent::RefreshCombatantsRequest);
            Ok(())
        }),
    );

    dist.publish(XivEvent::RefreshCombatantsRequest);

    let counts = dist.counts();
    assert_eq!(counts.published, MAX_CASCADE_DEPTH as u64);
    assert_eq!(counts.dropped, 1);

    // Still usable afterwards.
    let log = new_log();
    dist.register(EventKind::ZoneChange, 0, recorder(&log, "zone"));
    dist.publish(zone_event(1));
    assert_eq!(entries(&log), vec!["zone:ZoneChange"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Failure isolation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_failing_handler_does_not_stop_siblings() {
    let dist = EventDistributor::default();
    let log = new_log();

    dist.register(EventKind::ZoneChange, 0, handler_fn("fails", |_, _| Err(HandlerError::msg("boom"))));
    dist.register(EventKind::ZoneChange, 1, recorder(&log, "after"));

    dist.publish(zone_event(1));
    dist.publish(zone_event(2));

    assert_eq!(entries(&log), vec!["after:ZoneChange", "after:ZoneChange"]);
    assert_eq!(dist.counts().handler_failures, 2);
}

#[test]
fn test_panicking_handler_is_contained() {
    let dist = EventDistributor::default();
    let log = new_log();

    dist.register(
        EventKind::ZoneChange,
        0,
        handler_fn("panics", |ctx, _| {
            ctx.publish(XivEvent::RefreshCombatantsRequest);
            panic!("handler bug");
        }),
    );
    dist.register(EventKind::ZoneChange, 1, recorder(&log, "after"));
    dist.register(EventKind::RefreshCombatantsRequest, 0, recorder(&log, "refresh"));

    dist.publish(zone_event(1));

    // What the handler published before failing is still delivered.
    assert_eq!(
        entries(&log),
        vec!["refresh:RefreshCombatantsRequest", "after:ZoneChange"]
    );
    assert_eq!(dist.counts().handler_failures, 1);

    dist.publish(zone_event(2));
    assert_eq!(entries(&log).len(), 4);
    assert_eq!(dist.counts().handler_failures, 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unregister() {
    let dist = EventDistributor::default();
    let log = new_log();

    let id = dist.register(EventKind::ZoneChange, 0, recorder(&log, "gone"));
    dist.register(EventKind::ZoneChange, 0, recorder(&log, "kept"));
    assert_eq!(dist.handler_count(), 2);

    assert!(dist.unregister(id));
    assert!(!dist.unregister(id));
    dist.publish(zone_event(1));

    assert_eq!(entries(&log), vec!["kept:ZoneChange"]);
}

#[test]
fn test_register_during_dispatch_applies_to_later_events() {
    let dist = Arc::new(EventDistributor::default());
    let log = new_log();

    let inner = Arc::clone(&dist);
    let late_log = Arc::clone(&log);
    dist.register(
        EventKind::ZoneChange,
        0,
        handler_fn("registrar", move |_, event| {
            if let XivEvent::ZoneChange { zone } = event
                && zone.id == 1
            {
                inner.register(EventKind::ZoneChange, 1, recorder(&late_log, "late"));
            }
            Ok(())
        }),
    );

    dist.publish(zone_event(1));
    assert!(entries(&log).is_empty());

    dist.publish(zone_event(2));
    assert_eq!(entries(&log), vec!["late:ZoneChange"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// State visibility
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_observer_sees_reducer_update() {
    let dist = EventDistributor::default();
    let seen: Arc<Mutex<Vec<Option<Vec<Player>>>>> = Arc::new(Mutex::new(Vec::new()));

    // Observer registered first, reducer second: priority still wins.
    let sink = Arc::clone(&seen);
    dist.register(
        EventKind::PartyChange,
        DEFAULT_PRIORITY,
        handler_fn("party_observer", move |ctx, _| {
            sink.lock()
                .unwrap()
                .push(ctx.state().party_list().map(|p| p.to_vec()));
            Ok(())
        }),
    );
    register_state_reducers(&dist);

    let a = Player::new(0x10FF0001, "A");
    let b = Player::new(0x10FF0002, "B");
    dist.publish(XivEvent::party(vec![a.clone(), b.clone()]));
    dist.publish(XivEvent::party(vec![b.clone()]));

    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some(vec![a, b.clone()]), Some(vec![b])]
    );
}

#[test]
fn test_refresh_observer_sees_new_player() {
    let dist = EventDistributor::default();
    register_state_reducers(&dist);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    dist.register(
        EventKind::RefreshCombatantsRequest,
        DEFAULT_PRIORITY,
        handler_fn("refresh_observer", move |ctx, _| {
            sink.lock().unwrap().push(ctx.state().player().map(|p| p.id));
            Ok(())
        }),
    );

    dist.publish(XivEvent::PlayerChange {
        player: Player::new(0x10FF0001, "Tataru Taru"),
    });

    assert_eq!(*seen.lock().unwrap(), vec![Some(0x10FF0001)]);
}

#[test]
fn test_player_then_combatant_gives_two_refreshes_in_order() {
    let dist = EventDistributor::default();
    register_state_reducers(&dist);
    let log = new_log();

    let sink = Arc::clone(&log);
    dist.register(
        EventKind::RefreshCombatantsRequest,
        DEFAULT_PRIORITY,
        handler_fn("refresh_observer", move |ctx, _| {
            let player = ctx.state().player().map(|p| p.name).unwrap_or_default();
            sink.lock().unwrap().push(format!("refresh after {player}"));
            Ok(())
        }),
    );
    dist.register_any(i32::MAX, recorder(&log, "any"));

    dist.publish(XivEvent::PlayerChange {
        player: Player::new(1, "Tataru"),
    });
    dist.publish(XivEvent::CombatantAdded {
        combatant: Combatant::new(0x4000A1B2, "Striking Dummy"),
    });

    assert_eq!(
        entries(&log),
        vec![
            "refresh after Tataru",
            "any:RefreshCombatantsRequest",
            "any:PlayerChange",
            "refresh after Tataru",
            "any:RefreshCombatantsRequest",
            "any:CombatantAdded"
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Concurrency
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_concurrent_cascades_do_not_interleave() {
    let dist = Arc::new(EventDistributor::default());
    register_state_reducers(&dist);
    let log = new_log();

    dist.register(EventKind::PlayerChange, DEFAULT_PRIORITY, recorder(&log, "player"));
    dist.register(EventKind::RefreshCombatantsRequest, DEFAULT_PRIORITY, recorder(&log, "refresh"));

    let producers: Vec<_> = (0..4)
        .map(|n| {
            let dist = Arc::clone(&dist);
            thread::spawn(move || {
                for i in 0..50 {
                    dist.publish(XivEvent::PlayerChange {
                        player: Player::new(n * 1000 + i, "P"),
                    });
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    // Each PlayerChange cascade is refresh then player, never split.
    let entries = entries(&log);
    assert_eq!(entries.len(), 400);
    for pair in entries.chunks(2) {
        assert_eq!(
            pair,
            ["refresh:RefreshCombatantsRequest", "player:PlayerChange"]
        );
    }
    assert_eq!(dist.counts().handler_failures, 0);
}
