/*!
# Rule Pipeline - Ordered Signature Patching

Applies an ordered list of patch rules to one program text. Each rule
locates a fragment, extracts the identifiers embedded in it, and rewrites the
text; identifiers a rule discovers are bound by name so later rules can build
their patterns and templates from them.

## Architecture

- `PatchRule`: Trait for one locate → extract → rewrite step
- `Pipeline`: Runs rules in order, all-or-nothing
- `signatures`: The standard rules for the map editor bundle

## Example Usage

```rust,no_run
use splice_core::pipeline::Pipeline;
use splice_core::SpliceConfig;

let mut pipeline = Pipeline::standard(&SpliceConfig::default())?;
let outcome = pipeline.run("/* upstream bundle */")?;
println!("{}", outcome.text);
# Ok::<(), splice_core::SpliceError>(())
```
*/

pub mod engine;
pub mod rules;
pub mod signatures;

// Re-export main types
pub use engine::{PatchOutcome, PatchReport, Pipeline, RuleReport};
pub use rules::{PatchRule, RuleOutcome, RuleStats};
