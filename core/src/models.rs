use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Combatant roster keyed by combatant id.
pub type CombatantMap = HashMap<u64, Combatant>;

/// Actor id ACT writes when a line refers to no entity at all.
pub const NO_ENTITY_ID: u64 = 0xE000_0000;

#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: u64,
    pub name: String,
}

impl Zone {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

// Zones are identified by id; the display name is localized and may differ
// between clients.
impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: u64,
    pub name: String,
}

impl Player {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    pub current: u64,
    pub max: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub heading: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Combatant {
    pub id: u64,
    pub name: String,
    pub job_id: u32,
    pub level: u32,
    /// Id of the owning player for pets and companions, 0 otherwise.
    pub owner_id: u64,
    pub world_id: u32,
    pub world_name: String,
    pub npc_name_id: u64,
    pub npc_id: u64,
    pub hp: Option<HitPoints>,
    pub position: Option<Position>,
}

impl Combatant {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_player(&self) -> bool {
        self.npc_id == 0 && self.owner_id == 0 && self.world_id != 0
    }
}
