use crate::events::XivEvent;
use crate::line::parser::MappedLineParser;
use crate::models::Zone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fields {
    Id,
    Name,
}

/// `01|timestamp|zoneId|zoneName|hash`
pub fn change_zone_parser() -> MappedLineParser<Fields> {
    MappedLineParser::new(1, "ChangeZone", &[Fields::Id, Fields::Name], |fields, _, _| {
        let zone = Zone::new(fields.get_hex(Fields::Id)?, fields.get_string(Fields::Name)?);
        Ok(Some(XivEvent::ZoneChange { zone }))
    })
}
