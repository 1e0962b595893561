//! State reducers: the only code that writes to [`XivState`](super::XivState).
//!
//! Each reducer runs at [`REDUCER_PRIORITY`] so every other handler of the
//! same event observes the updated state. A reducer replaces exactly one
//! field and never reads the others.

use crate::events::{
    EventContext, EventDistributor, EventKind, HandlerError, HandlerId, REDUCER_PRIORITY, XivEvent,
    handler_fn,
};

/// Register the full reducer set. Call once, before publishing.
pub fn register_state_reducers(dist: &EventDistributor) -> Vec<HandlerId> {
    vec![
        dist.register(EventKind::ZoneChange, REDUCER_PRIORITY, handler_fn("zone_change", zone_change)),
        dist.register(EventKind::PlayerChange, REDUCER_PRIORITY, handler_fn("player_change", player_change)),
        dist.register(
            EventKind::CombatantAdded,
            REDUCER_PRIORITY,
            handler_fn("combatant_added", request_refresh),
        ),
        dist.register(
            EventKind::CombatantRemoved,
            REDUCER_PRIORITY,
            handler_fn("combatant_removed", request_refresh),
        ),
        dist.register(EventKind::PartyChange, REDUCER_PRIORITY, handler_fn("party_change", party_change)),
        dist.register(
            EventKind::CombatantsSnapshot,
            REDUCER_PRIORITY,
            handler_fn("combatants_snapshot", combatants_snapshot),
        ),
    ]
}

fn zone_change(ctx: &EventContext<'_>, event: &XivEvent) -> Result<(), HandlerError> {
    if let XivEvent::ZoneChange { zone } = event {
        tracing::debug!(zone_id = zone.id, zone = %zone.name, "Zone changed");
        ctx.state().replace_zone(zone.clone());
    }
    Ok(())
}

fn player_change(ctx: &EventContext<'_>, event: &XivEvent) -> Result<(), HandlerError> {
    if let XivEvent::PlayerChange { player } = event {
        tracing::debug!(player_id = player.id, player = %player.name, "Player identified");
        ctx.state().replace_player(player.clone());
        // Combatant data only means something once we know who we are.
        ctx.publish(XivEvent::RefreshCombatantsRequest);
    }
    Ok(())
}

// Adds and removes are never applied to the roster directly. The roster is
// only replaced by a full snapshot, which this asks for.
fn request_refresh(ctx: &EventContext<'_>, event: &XivEvent) -> Result<(), HandlerError> {
    if let XivEvent::CombatantAdded { combatant } | XivEvent::CombatantRemoved { combatant } = event {
        tracing::trace!(combatant_id = combatant.id, kind = ?event.kind(), "Roster changed");
        ctx.publish(XivEvent::RefreshCombatantsRequest);
    }
    Ok(())
}

fn party_change(ctx: &EventContext<'_>, event: &XivEvent) -> Result<(), HandlerError> {
    if let XivEvent::PartyChange { members } = event {
        tracing::debug!(size = members.len(), "Party changed");
        ctx.state().replace_party(members.clone());
    }
    Ok(())
}

fn combatants_snapshot(ctx: &EventContext<'_>, event: &XivEvent) -> Result<(), HandlerError> {
    if let XivEvent::CombatantsSnapshot { combatants } = event {
        tracing::debug!(count = combatants.len(), "Combatant roster replaced");
        ctx.state().replace_combatants(combatants.clone());
    }
    Ok(())
}
