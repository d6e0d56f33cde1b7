/*!
# Hook Namespace

The registry the *rewritten* program populates at run time. The engine never
touches it directly; it only emits code against the slot names declared
here, so this module is the contract between the templates and the host.

Every slot starts absent. Optional callbacks are always invoked behind a
presence guard so an unset slot is a no-op.
*/

use serde::Serialize;

use crate::config::SpliceConfig;

/// What the rewritten program stores in a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// A value mirrored from the program (e.g. the live map object)
    Field,
    /// A program routine exposed for the host to call
    Callable,
    /// Host-provided callback the program invokes if present
    OptionalCallback,
    /// Getter/setter pair over otherwise private state
    Accessor,
}

/// One named slot on the namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookSlot {
    pub key: String,
    pub kind: SlotKind,
    pub description: String,
}

impl HookSlot {
    fn new(key: impl Into<String>, kind: SlotKind, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind,
            description: description.into(),
        }
    }
}

/// The namespace expression and the capability names it exposes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookNamespace {
    root: String,
    update_capabilities: Vec<String>,
    selection_capabilities: Vec<String>,
}

impl HookNamespace {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            update_capabilities: Vec::new(),
            selection_capabilities: Vec::new(),
        }
    }

    pub fn from_config(config: &SpliceConfig) -> Self {
        Self {
            root: config.namespace.clone(),
            update_capabilities: config.update_capabilities.clone(),
            selection_capabilities: config.selection_capabilities.clone(),
        }
    }

    /// The expression the rewritten program uses to reach the namespace
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Reference to a slot, e.g. `window.kklee.mapObject`
    pub fn slot(&self, key: &str) -> String {
        format!("{}.{}", self.root, key)
    }

    /// Marker whose presence means the text was already rewritten
    pub fn marker(&self) -> String {
        format!("{}.", self.root)
    }

    /// Statement that creates the namespace if the host has not
    pub fn prelude(&self) -> String {
        format!("{root}={root}||{{}};", root = self.root)
    }

    /// Every slot the standard rules populate
    pub fn slots(&self) -> Vec<HookSlot> {
        let mut slots = vec![
            HookSlot::new("mapObject", SlotKind::Field, "active top-level map, set on every construction"),
            HookSlot::new("afterNewMapObject", SlotKind::OptionalCallback, "called after mapObject is replaced"),
            HookSlot::new("mapEncoder", SlotKind::Callable, "map encoder constructor"),
        ];
        for capability in &self.update_capabilities {
            slots.push(HookSlot::new(
                format!("update{capability}"),
                SlotKind::Callable,
                format!("wrapped {capability} update routine"),
            ));
            slots.push(HookSlot::new(
                format!("afterUpdate{capability}"),
                SlotKind::OptionalCallback,
                format!("called with the same arguments after update{capability} runs"),
            ));
        }
        for capability in &self.selection_capabilities {
            slots.push(HookSlot::new(
                format!("getCurrent{capability}"),
                SlotKind::Accessor,
                format!("reads the currently selected {capability}"),
            ));
            slots.push(HookSlot::new(
                format!("setCurrent{capability}"),
                SlotKind::Accessor,
                format!("replaces the currently selected {capability}"),
            ));
        }
        slots.extend([
            HookSlot::new("saveToUndoHistory", SlotKind::Callable, "pushes an undo snapshot"),
            HookSlot::new(
                "showColourPickerArguments",
                SlotKind::Field,
                "arguments of the last colour picker invocation",
            ),
            HookSlot::new(
                "setColourPickerColour",
                SlotKind::Callable,
                "re-opens the colour picker with a substituted colour",
            ),
        ]);
        slots
    }
}
