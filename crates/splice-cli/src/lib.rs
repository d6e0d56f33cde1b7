//! # Splice CLI
//!
//! Argument handling and the patch command behind the `splice` binary.

use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;

use splice_core::{HookNamespace, Pipeline, SlotKind, SpliceConfig, SpliceError};

/// Printed when a rule no longer recognises the bundle
pub const FORMAT_DRIFT_NOTICE: &str = "Whoops! The bundle could not be patched. \
This is most likely caused by an upstream update changing its format.\n\
Please report this error.";

/// Printed when the input already carries injected hooks
pub const ALREADY_PATCHED_NOTICE: &str =
    "The input already contains injected hooks; patch the original bundle instead.";

/// The `splice` command line
pub fn command() -> Command {
    Command::new("splice")
        .version(splice_core::VERSION)
        .about("Patch an obfuscated bundle by signature and inject namespace hooks")
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .help("Bundle to patch ('-' or absent reads stdin)")
                .index(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Write the patched bundle here instead of stdout"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("JSON configuration file"),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .help("Print a JSON report of the run to stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Run every rule but do not write the output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-hooks")
                .long("list-hooks")
                .help("List the namespace slots the patched bundle populates")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log every rule at debug level")
                .action(ArgAction::SetTrue),
        )
}

/// Parsed command line options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    /// `None` reads stdin
    pub input: Option<PathBuf>,
    /// `None` writes stdout
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub report: bool,
    pub check: bool,
    pub list_hooks: bool,
    pub verbose: bool,
}

impl CliOptions {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            input: matches
                .get_one::<String>("input")
                .filter(|path| path.as_str() != "-")
                .map(PathBuf::from),
            output: matches.get_one::<String>("output").map(PathBuf::from),
            config: matches.get_one::<String>("config").map(PathBuf::from),
            report: matches.get_flag("report"),
            check: matches.get_flag("check"),
            list_hooks: matches.get_flag("list-hooks"),
            verbose: matches.get_flag("verbose"),
        }
    }
}

/// Install the stderr subscriber for both crates
pub fn init_logging(verbose: bool) {
    splice_core::init_tracing_with(&logging_directives(verbose));
}

/// Default filter when `RUST_LOG` is unset
pub fn logging_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("splice_core={level},splice_cli={level}")
}

pub fn load_config(path: Option<&Path>) -> Result<SpliceConfig> {
    match path {
        Some(path) => SpliceConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(SpliceConfig::default()),
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read stdin")?;
            Ok(source)
        }
    }
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn kind_label(kind: SlotKind) -> &'static str {
    match kind {
        SlotKind::Field => "field",
        SlotKind::Callable => "callable",
        SlotKind::OptionalCallback => "optional callback",
        SlotKind::Accessor => "accessor",
    }
}

/// One line per namespace slot: reference, kind, description
pub fn hook_listing(namespace: &HookNamespace) -> String {
    namespace
        .slots()
        .iter()
        .map(|slot| {
            format!(
                "{:<40} {:<18} {}\n",
                namespace.slot(&slot.key),
                kind_label(slot.kind),
                slot.description
            )
        })
        .collect()
}

/// Execute one invocation
pub fn run(options: &CliOptions) -> Result<()> {
    let config = load_config(options.config.as_deref())?;

    if options.list_hooks {
        let listing = hook_listing(&HookNamespace::from_config(&config));
        return write_output(None, &listing);
    }

    let source = read_input(options.input.as_deref())?;
    let mut pipeline = Pipeline::standard(&config)?;
    let outcome = pipeline.run(&source)?;

    if options.report {
        eprintln!("{}", serde_json::to_string_pretty(&outcome.report)?);
    }

    if options.check {
        info!(rules = outcome.report.rules.len(), "check passed, output not written");
        return Ok(());
    }

    write_output(options.output.as_deref(), outcome.text.as_str())
}

/// Human-readable explanation for errors the user can act on
pub fn failure_notice(error: &anyhow::Error) -> Option<&'static str> {
    match error.downcast_ref::<SpliceError>()? {
        SpliceError::AlreadyPatched { .. } => Some(ALREADY_PATCHED_NOTICE),
        e if e.is_format_drift() => Some(FORMAT_DRIFT_NOTICE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliOptions {
        let matches = command().try_get_matches_from(args.iter().copied()).unwrap();
        CliOptions::from_matches(&matches)
    }

    #[test]
    fn test_defaults_read_stdin_and_write_stdout() {
        assert_eq!(parse(&["splice"]), CliOptions::default());
        assert_eq!(parse(&["splice", "-"]).input, None);
    }

    #[test]
    fn test_logging_builds_on_core_tracing() {
        assert_eq!(logging_directives(false), "splice_core=info,splice_cli=info");
        assert_eq!(logging_directives(true), "splice_core=debug,splice_cli=debug");
        init_logging(true);
        init_logging(false);
    }

    #[test]
    fn test_all_flags() {
        let options = parse(&[
            "splice",
            "bundle.js",
            "-o",
            "out.js",
            "--config",
            "splice.json",
            "--report",
            "--check",
            "--verbose",
        ]);
        assert_eq!(options.input, Some(PathBuf::from("bundle.js")));
        assert_eq!(options.output, Some(PathBuf::from("out.js")));
        assert_eq!(options.config, Some(PathBuf::from("splice.json")));
        assert!(options.report && options.check && options.verbose);
        assert!(!options.list_hooks);
    }

    #[test]
    fn test_hook_listing_uses_namespace() {
        let listing = hook_listing(&HookNamespace::from_config(&SpliceConfig::default()));
        assert_eq!(listing.lines().count(), 24);
        assert!(listing.lines().next().unwrap().starts_with("window.kklee.mapObject "));
        assert!(listing.contains("optional callback"));
    }

    #[test]
    fn test_failure_notice_by_error_kind() {
        let drift = anyhow::Error::from(SpliceError::not_found("undo-history", "x"));
        assert_eq!(failure_notice(&drift), Some(FORMAT_DRIFT_NOTICE));

        let patched = anyhow::Error::from(SpliceError::AlreadyPatched {
            marker: "window.kklee.".to_string(),
        });
        assert_eq!(failure_notice(&patched), Some(ALREADY_PATCHED_NOTICE));

        let io = anyhow::anyhow!("disk on fire");
        assert_eq!(failure_notice(&io), None);
    }
}
