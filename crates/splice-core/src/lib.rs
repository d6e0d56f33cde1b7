//! # Splice Core
//!
//! Signature-based patching of an obfuscated JavaScript bundle, including:
//! - Pattern templates parameterized by previously discovered identifiers
//! - Fragment location and identifier extraction
//! - Hook injection into a run-time namespace object
//! - An ordered, all-or-nothing rule pipeline
//!
//! Identifiers in the bundle change with every upstream build; the rules
//! find them by the shape of the code around them rather than by name.

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod escape;
pub mod extract;
pub mod hooks;
pub mod locate;
pub mod pipeline;
pub mod rewrite;
pub mod source;
pub mod template;

// Re-export commonly used types
pub use config::SpliceConfig;
pub use error::{Result, SpliceError};
pub use escape::escape;
pub use hooks::{HookNamespace, HookSlot, SlotKind};
pub use locate::{Locator, MatchResult, PatternSpec};
pub use pipeline::{PatchOutcome, PatchReport, PatchRule, Pipeline, RuleOutcome};
pub use source::{Bindings, Identifier, SourceText};
pub use template::{Embed, Template};

use tracing_subscriber::EnvFilter;

/// Splice version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for splice components
pub fn init_tracing() {
    init_tracing_with("splice_core=info");
}

/// Initialize tracing with `default_directives` as the filter
///
/// `RUST_LOG` wins when set. Output goes to stderr so patched text on stdout
/// stays clean. A second call is a no-op.
pub fn init_tracing_with(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Patch `source` with the standard rules for `config`
pub fn patch(source: &str, config: &SpliceConfig) -> Result<PatchOutcome> {
    Pipeline::standard(config)?.run(source)
}
