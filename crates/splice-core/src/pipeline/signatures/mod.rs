/*!
# Standard Signatures

The rule set for the map editor bundle, in the order the identifiers they
discover are needed:

1. `map-object`: map object slot and its container, mirrored on every assignment
2. `map-encoder`: encoder constructor, registered where it is defined
3. `reset-state`: selection slots and update routines of the reset routine
4. `undo-history`: the routine that pushes an undo snapshot
5. `chat-listener`: drop the listener removal that disables chat hot-keys
6. `colour-picker`: capture picker arguments and expose a colour setter
*/

pub mod chat_listener;
pub mod colour_picker;
pub mod map_encoder;
pub mod map_object;
pub mod reset_state;
pub mod undo_history;

pub use chat_listener::ChatListenerRule;
pub use colour_picker::ColourPickerRule;
pub use map_encoder::MapEncoderRule;
pub use map_object::MapObjectRule;
pub use reset_state::ResetStateRule;
pub use undo_history::UndoHistoryRule;

use crate::config::SpliceConfig;
use crate::error::Result;

use super::rules::PatchRule;

/// Binding names shared between rules
pub mod ids {
    pub const MAP_OBJECT: &str = "map_object";
    pub const MAP_CONTAINER: &str = "map_container";
    pub const MAP_ENCODER: &str = "map_encoder";
    pub const RESET_ROUTINE: &str = "reset_routine";
    pub const UNDO_ROUTINE: &str = "undo_routine";
    pub const COLOUR_PICKER_KEY: &str = "colour_picker_key";

    /// Per-site binding for the matched fragment
    pub const FRAGMENT: &str = "fragment";

    pub fn update_routine(capability: &str) -> String {
        format!("update.{capability}")
    }

    pub fn selection_slot(capability: &str) -> String {
        format!("selection.{capability}")
    }
}

/// Build the standard rules for `config`
pub fn standard_rules(config: &SpliceConfig) -> Result<Vec<Box<dyn PatchRule>>> {
    Ok(vec![
        Box::new(MapObjectRule::new(&config.anchor_key)?),
        Box::new(MapEncoderRule::new()?),
        Box::new(ResetStateRule::new(
            config.selection_capabilities.clone(),
            config.update_capabilities.clone(),
        )?),
        Box::new(UndoHistoryRule::new()?),
        Box::new(ChatListenerRule::new()?),
        Box::new(ColourPickerRule::new(&config.colour_input_id)?),
    ])
}
