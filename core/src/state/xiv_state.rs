use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use crate::models::{CombatantMap, Player, Zone};

/// Shared view of the game: zone, local player, party and combatants.
///
/// Every field starts out `None` ("not reported yet"), which is distinct from
/// a known-empty party or roster. Fields are only ever replaced wholesale,
/// each by its own reducer in [`super::reducers`]; the setters are
/// crate-private so nothing else can mutate state except by publishing
/// events. Each field sits behind its own lock, so a reader never sees a
/// half-written value, but two fields read one after another may come from
/// different events.
#[derive(Debug, Default)]
pub struct XivState {
    zone: RwLock<Option<Zone>>,
    player: RwLock<Option<Player>>,
    party: RwLock<Option<Arc<[Player]>>>,
    combatants: RwLock<Option<Arc<CombatantMap>>>,
}

/// Point-in-time copy of every field, for display and serialization.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StateSnapshot {
    pub zone: Option<Zone>,
    pub player: Option<Player>,
    pub party: Option<Vec<Player>>,
    pub combatants: Option<Vec<crate::models::Combatant>>,
}

impl XivState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zone(&self) -> Option<Zone> {
        read(&self.zone)
    }

    pub fn player(&self) -> Option<Player> {
        read(&self.player)
    }

    pub fn party_list(&self) -> Option<Arc<[Player]>> {
        read(&self.party)
    }

    pub fn combatants(&self) -> Option<Arc<CombatantMap>> {
        read(&self.combatants)
    }

    /// Whether the local player is currently in `party_list`.
    pub fn player_in_party(&self) -> bool {
        match (self.player(), self.party_list()) {
            (Some(player), Some(party)) => party.iter().any(|p| p.id == player.id),
            _ => false,
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let mut combatants: Option<Vec<_>> = self
            .combatants()
            .map(|map| map.values().cloned().collect());
        if let Some(list) = combatants.as_mut() {
            list.sort_by_key(|c| c.id);
        }

        StateSnapshot {
            zone: self.zone(),
            player: self.player(),
            party: self.party_list().map(|p| p.to_vec()),
            combatants,
        }
    }

    pub(crate) fn replace_zone(&self, zone: Zone) {
        write(&self.zone, Some(zone));
    }

    pub(crate) fn replace_player(&self, player: Player) {
        write(&self.player, Some(player));
    }

    pub(crate) fn replace_party(&self, party: Arc<[Player]>) {
        write(&self.party, Some(party));
    }

    pub(crate) fn replace_combatants(&self, combatants: Arc<CombatantMap>) {
        write(&self.combatants, Some(combatants));
    }
}

// Values are swapped in whole, so a poisoned lock still holds a complete value.
fn read<T: Clone>(lock: &RwLock<T>) -> T {
    lock.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn write<T>(lock: &RwLock<T>, value: T) {
    *lock.write().unwrap_or_else(PoisonError::into_inner) = value;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Combatant;

    #[test]
    fn test_starts_unknown() {
        let state = XivState::new();
        assert!(state.zone().is_none());
        assert!(state.player().is_none());
        assert!(state.party_list().is_none());
        assert!(state.combatants().is_none());
        assert!(!state.player_in_party());
    }

    #[test]
    fn test_empty_party_is_known() {
        let state = XivState::new();
        state.replace_party(Vec::<Player>::new().into());
        assert_eq!(state.party_list().map(|p| p.len()), Some(0));
    }

    #[test]
    fn test_player_in_party() {
        let state = XivState::new();
        state.replace_player(Player::new(1, "Alisaie"));
        state.replace_party(vec![Player::new(2, "Alphinaud"), Player::new(1, "Alisaie")].into());
        assert!(state.player_in_party());
    }

    #[test]
    fn test_snapshot_sorts_combatants() {
        let state = XivState::new();
        let map: CombatantMap = [Combatant::new(3, "C"), Combatant::new(1, "A")]
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        state.replace_combatants(Arc::new(map));
        state.replace_zone(Zone::new(0x7C0, "Limsa Lominsa Lower Decks"));

        let snap = state.snapshot();
        let ids: Vec<u64> = snap.combatants.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(snap.zone.map(|z| z.id), Some(0x7C0));
        assert!(snap.player.is_none());
    }
}
