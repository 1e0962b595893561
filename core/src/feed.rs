//! Decoding for the overlay feed.
//!
//! The collaborator that answers [`XivEvent::RefreshCombatantsRequest`]
//! speaks OverlayPlugin JSON. Two message shapes matter here:
//!
//! - `{"type":"PartyChanged","party":[{"id":"10FF0001","name":"..."}]}`
//! - `{"combatants":[{"ID":275000001,"Name":"...","CurrentHP":...}]}`,
//!   the reply to `getCombatants`
//!
//! Everything else decodes to `Ok(None)`.

use serde::Deserialize;

use crate::events::XivEvent;
use crate::models::{Combatant, HitPoints, Player, Position};

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("invalid feed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{message_type} message has no {field} field")]
    MissingField {
        message_type: &'static str,
        field: &'static str,
    },

    #[error("party member id {0:?} is not a hex id")]
    BadId(String),
}

#[derive(Debug, Deserialize)]
struct FeedMessage {
    #[serde(rename = "type")]
    message_type: Option<String>,
    party: Option<Vec<PartyMember>>,
    combatants: Option<Vec<FeedCombatant>>,
}

#[derive(Debug, Deserialize)]
struct PartyMember {
    id: String,
    name: String,
}

// `ID` keys the roster map, so it is the one field with no default.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FeedCombatant {
    #[serde(rename = "ID")]
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    job: u32,
    #[serde(default)]
    level: u32,
    #[serde(default, rename = "OwnerID")]
    owner_id: u64,
    #[serde(default, rename = "WorldID")]
    world_id: u32,
    #[serde(default)]
    world_name: String,
    #[serde(default, rename = "BNpcNameID")]
    bnpc_name_id: u64,
    #[serde(default, rename = "BNpcID")]
    bnpc_id: u64,
    #[serde(rename = "CurrentHP")]
    current_hp: Option<u64>,
    #[serde(rename = "MaxHP")]
    max_hp: Option<u64>,
    pos_x: Option<f64>,
    pos_y: Option<f64>,
    pos_z: Option<f64>,
    heading: Option<f64>,
}

impl From<FeedCombatant> for Combatant {
    fn from(c: FeedCombatant) -> Self {
        let hp = c
            .current_hp
            .zip(c.max_hp)
            .map(|(current, max)| HitPoints { current, max });
        let position = match (c.pos_x, c.pos_y, c.pos_z) {
            (Some(x), Some(y), Some(z)) => Some(Position {
                x,
                y,
                z,
                heading: c.heading.unwrap_or_default(),
            }),
            _ => None,
        };

        Combatant {
            id: c.id,
            name: c.name,
            job_id: c.job,
            level: c.level,
            owner_id: c.owner_id,
            world_id: c.world_id,
            world_name: c.world_name,
            npc_name_id: c.bnpc_name_id,
            npc_id: c.bnpc_id,
            hp,
            position,
        }
    }
}

pub fn decode_feed_message(text: &str) -> Result<Option<XivEvent>, FeedError> {
    let message: FeedMessage = serde_json::from_str(text)?;

    if message.message_type.as_deref() == Some("PartyChanged") {
        let party = message.party.ok_or(FeedError::MissingField {
            message_type: "PartyChanged",
            field: "party",
        })?;
        let members = party
            .into_iter()
            .map(|m| Ok(Player::new(parse_hex_id(&m.id)?, m.name)))
            .collect::<Result<Vec<_>, FeedError>>()?;
        return Ok(Some(XivEvent::party(members)));
    }

    if let Some(combatants) = message.combatants {
        return Ok(Some(XivEvent::snapshot(
            combatants.into_iter().map(Combatant::from),
        )));
    }

    Ok(None)
}

fn parse_hex_id(id: &str) -> Result<u64, FeedError> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FeedError::BadId(id.to_string()));
    }
    u64::from_str_radix(id, 16).map_err(|_| FeedError::BadId(id.to_string()))
}
