/*!
# Chat Listener

Hiding the lobby unbinds the key handler that opens chat. The unbinding
call (`$(document)[...]("keydown.chat",k2u);`) is removed; the statements
before it in the lobby-hiding function stay as they are.
*/

use crate::error::Result;
use crate::locate::{Locator, PatternSpec};
use crate::pipeline::rules::{PatchRule, RuleOutcome};
use crate::rewrite::remove_fragment;
use crate::source::{Bindings, SourceText};
use crate::template::Template;

/// Group 1 is context that must precede the call; it is written back.
const LISTENER_REMOVAL: &str = r"(this\[.{10,20}\]=function\(\)\{.{20,40}this\[.{10,20}\]=false;.{0,11})\$\(document\)\[.{10,20}\]\(.{10,20},.{3,4}\);";

pub struct ChatListenerRule {
    removal: PatternSpec,
}

impl ChatListenerRule {
    pub fn new() -> Result<Self> {
        Ok(Self {
            removal: PatternSpec::new(LISTENER_REMOVAL)?,
        })
    }
}

impl PatchRule for ChatListenerRule {
    fn name(&self) -> &'static str {
        "chat-listener"
    }

    fn description(&self) -> &'static str {
        "Keeps the chat hot-key listener bound while the lobby is hidden"
    }

    fn templates(&self) -> Vec<&Template> {
        vec![self.removal.template()]
    }

    fn apply(&self, source: SourceText, bindings: &mut Bindings) -> Result<RuleOutcome> {
        let found = Locator::new(self.name(), bindings).locate(source.as_str(), &self.removal)?;
        let source = remove_fragment(source, &found, self.name(), 1)?;
        Ok(RuleOutcome::new(source, 1))
    }
}
