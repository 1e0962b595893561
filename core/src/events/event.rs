use std::sync::Arc;

use crate::models::{Combatant, CombatantMap, Player, Zone};

/// Facts observed in the log, or derived from state, that flow through the
/// [`EventDistributor`](super::EventDistributor).
///
/// Events are immutable once published; handlers receive them by reference.
/// Collections are wrapped in `Arc` so reducers can store them in
/// [`XivState`](crate::state::XivState) without copying.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum XivEvent {
    ZoneChange {
        zone: Zone,
    },
    /// The local character was identified.
    PlayerChange {
        player: Player,
    },
    CombatantAdded {
        combatant: Combatant,
    },
    CombatantRemoved {
        combatant: Combatant,
    },
    /// Full party roster in slot order.
    PartyChange {
        members: Arc<[Player]>,
    },
    /// Complete combatant roster from the overlay feed.
    CombatantsSnapshot {
        combatants: Arc<CombatantMap>,
    },
    /// Ask the feed collaborator for a fresh [`XivEvent::CombatantsSnapshot`].
    RefreshCombatantsRequest,
}

/// Subscription key for an [`XivEvent`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EventKind {
    ZoneChange,
    PlayerChange,
    CombatantAdded,
    CombatantRemoved,
    PartyChange,
    CombatantsSnapshot,
    RefreshCombatantsRequest,
}

impl XivEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ZoneChange { .. } => EventKind::ZoneChange,
            Self::PlayerChange { .. } => EventKind::PlayerChange,
            Self::CombatantAdded { .. } => EventKind::CombatantAdded,
            Self::CombatantRemoved { .. } => EventKind::CombatantRemoved,
            Self::PartyChange { .. } => EventKind::PartyChange,
            Self::CombatantsSnapshot { .. } => EventKind::CombatantsSnapshot,
            Self::RefreshCombatantsRequest => EventKind::RefreshCombatantsRequest,
        }
    }

    pub fn party(members: impl Into<Arc<[Player]>>) -> Self {
        Self::PartyChange {
            members: members.into(),
        }
    }

    pub fn snapshot(combatants: impl IntoIterator<Item = Combatant>) -> Self {
        Self::CombatantsSnapshot {
            combatants: Arc::new(combatants.into_iter().map(|c| (c.id, c)).collect()),
        }
    }
}
