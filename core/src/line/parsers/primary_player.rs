use crate::events::XivEvent;
use crate::line::parser::MappedLineParser;
use crate::models::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fields {
    Id,
    Name,
}

/// `02|timestamp|playerId|playerName|hash`
pub fn primary_player_parser() -> MappedLineParser<Fields> {
    MappedLineParser::new(2, "ChangePrimaryPlayer", &[Fields::Id, Fields::Name], |fields, _, _| {
        let player = Player::new(fields.get_hex(Fields::Id)?, fields.get_string(Fields::Name)?);
        Ok(Some(XivEvent::PlayerChange { player }))
    })
}
