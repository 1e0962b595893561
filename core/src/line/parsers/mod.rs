//! Built-in ACT network log line parsers.

mod change_zone;
mod combatant;
mod primary_player;

pub use change_zone::change_zone_parser;
pub use combatant::{add_combatant_parser, remove_combatant_parser};
pub use primary_player::primary_player_parser;

use super::parser::LineParser;

pub fn default_parsers() -> Vec<Box<dyn LineParser>> {
    vec![
        Box::new(change_zone_parser()),
        Box::new(primary_player_parser()),
        Box::new(add_combatant_parser()),
        Box::new(remove_combatant_parser()),
    ]
}
