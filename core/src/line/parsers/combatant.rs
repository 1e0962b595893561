//! `03` AddCombatant and `04` RemoveCombatant share one layout:
//!
//! `id|name|job|level|ownerId|worldId|world|npcNameId|npcId|currentHp|maxHp|
//! currentMp|maxMp|currentTp|maxTp|x|y|z|heading`
//!
//! Older logs stop after the hit points; position is optional.

use chrono::{DateTime, FixedOffset};

use crate::events::XivEvent;
use crate::line::parser::MappedLineParser;
use crate::line::{FieldError, FieldMapper};
use crate::models::{Combatant, HitPoints, NO_ENTITY_ID, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fields {
    Id,
    Name,
    Job,
    Level,
    OwnerId,
    WorldId,
    World,
    NpcNameId,
    NpcId,
    CurrentHp,
    MaxHp,
    CurrentMp,
    MaxMp,
    CurrentTp,
    MaxTp,
    X,
    Y,
    Z,
    Heading,
}

const LAYOUT: &[Fields] = &[
    Fields::Id,
    Fields::Name,
    Fields::Job,
    Fields::Level,
    Fields::OwnerId,
    Fields::WorldId,
    Fields::World,
    Fields::NpcNameId,
    Fields::NpcId,
    Fields::CurrentHp,
    Fields::MaxHp,
    Fields::CurrentMp,
    Fields::MaxMp,
    Fields::CurrentTp,
    Fields::MaxTp,
    Fields::X,
    Fields::Y,
    Fields::Z,
    Fields::Heading,
];

pub fn add_combatant_parser() -> MappedLineParser<Fields> {
    MappedLineParser::new(3, "AddCombatant", LAYOUT, convert_added)
}

pub fn remove_combatant_parser() -> MappedLineParser<Fields> {
    MappedLineParser::new(4, "RemoveCombatant", LAYOUT, convert_removed)
}

fn convert_added(
    fields: &FieldMapper<'_, Fields>,
    _line_number: u64,
    _time: DateTime<FixedOffset>,
) -> Result<Option<XivEvent>, FieldError> {
    Ok(read_combatant(fields)?.map(|combatant| XivEvent::CombatantAdded { combatant }))
}

fn convert_removed(
    fields: &FieldMapper<'_, Fields>,
    _line_number: u64,
    _time: DateTime<FixedOffset>,
) -> Result<Option<XivEvent>, FieldError> {
    Ok(read_combatant(fields)?.map(|combatant| XivEvent::CombatantRemoved { combatant }))
}

fn read_combatant(fields: &FieldMapper<'_, Fields>) -> Result<Option<Combatant>, FieldError> {
    let id = fields.get_hex(Fields::Id)?;
    if id == NO_ENTITY_ID {
        return Ok(None);
    }

    Ok(Some(Combatant {
        id,
        name: fields.get_string(Fields::Name)?.to_string(),
        job_id: fields.get_hex_u32(Fields::Job)?,
        level: fields.get_hex_u32(Fields::Level)?,
        owner_id: fields.get_hex(Fields::OwnerId)?,
        world_id: fields.get_hex_u32(Fields::WorldId)?,
        world_name: fields.get_string(Fields::World)?.to_string(),
        npc_name_id: fields.get_uint(Fields::NpcNameId)?,
        npc_id: fields.get_uint(Fields::NpcId)?,
        hp: Some(HitPoints {
            current: fields.get_uint(Fields::CurrentHp)?,
            max: fields.get_uint(Fields::MaxHp)?,
        }),
        position: read_position(fields)?,
    }))
}

fn read_position(fields: &FieldMapper<'_, Fields>) -> Result<Option<Position>, FieldError> {
    let x = match fields.get_float(Fields::X) {
        Ok(x) => x,
        Err(FieldError::OutOfRange { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };
    Ok(Some(Position {
        x,
        y: fields.get_float(Fields::Y)?,
        z: fields.get_float(Fields::Z)?,
        heading: fields.get_float(Fields::Heading)?,
    }))
}
