/*!
# Pipeline - Ordered Patch Engine

Runs patch rules strictly in order over one program text. A failing rule
aborts the run and nothing is returned but the error: a half-patched program
is worse than an unpatched one.
*/

use std::collections::HashSet;
use std::time::Instant;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, error, info, info_span};

use crate::config::SpliceConfig;
use crate::error::{Result, SpliceError};
use crate::hooks::HookNamespace;
use crate::source::{Bindings, SourceText, NAMESPACE_BINDING};

use super::rules::{PatchRule, RuleStats};
use super::signatures;

/// Per-rule entry of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RuleReport {
    pub rule: String,
    pub description: String,
    pub sites: usize,
    pub elapsed_us: u64,
}

/// What a successful run did
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchReport {
    pub rules: Vec<RuleReport>,
    pub identifiers: Bindings,
    pub bytes_in: usize,
    pub bytes_out: usize,
}

/// Patched text plus the identifiers discovered on the way
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub text: SourceText,
    pub report: PatchReport,
}

impl PatchOutcome {
    pub fn bindings(&self) -> &Bindings {
        &self.report.identifiers
    }
}

/// Ordered, all-or-nothing rule runner
pub struct Pipeline {
    namespace: HookNamespace,
    rules: Vec<Box<dyn PatchRule>>,
    stats: IndexMap<String, RuleStats>,
    declare_namespace: bool,
}

impl Pipeline {
    pub fn new(namespace: HookNamespace) -> Self {
        Self {
            namespace,
            rules: Vec::new(),
            stats: IndexMap::new(),
            declare_namespace: false,
        }
    }

    /// The standard rule set, in dependency order
    pub fn standard(config: &SpliceConfig) -> Result<Self> {
        config.validate()?;
        let mut pipeline = Self::new(HookNamespace::from_config(config))
            .declare_namespace(config.declare_namespace);
        for rule in signatures::standard_rules(config)? {
            pipeline.add_rule(rule);
        }
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Prefix the output with a statement creating the namespace
    pub fn declare_namespace(mut self, enabled: bool) -> Self {
        self.declare_namespace = enabled;
        self
    }

    /// Append a rule; rules run in the order they were added
    pub fn add_rule(&mut self, rule: Box<dyn PatchRule>) {
        let rule_name = rule.name().to_string();
        self.stats.insert(rule_name.clone(), RuleStats::new(rule_name));
        self.rules.push(rule);
    }

    pub fn namespace(&self) -> &HookNamespace {
        &self.namespace
    }

    /// Check that every rule's requirements and template parameters are
    /// satisfied by the rules before it
    pub fn validate(&self) -> Result<()> {
        let mut available: HashSet<String> = HashSet::new();
        available.insert(NAMESPACE_BINDING.to_string());

        for rule in &self.rules {
            for identifier in rule.requires() {
                if !available.contains(&identifier) {
                    return Err(SpliceError::UnresolvedDependency {
                        rule: rule.name().to_string(),
                        identifier,
                    });
                }
            }

            let produced = rule.produces();
            let mut scope = available.clone();
            scope.extend(produced.iter().cloned());
            scope.extend(rule.locals().into_iter().map(str::to_string));

            for template in rule.templates() {
                if let Some(missing) = template.params().iter().find(|p| !scope.contains(*p)) {
                    return Err(SpliceError::TemplateError {
                        template: template.source().to_string(),
                        identifier: missing.clone(),
                    });
                }
            }

            available.extend(produced);
        }
        Ok(())
    }

    /// Patch `raw`, returning the fully patched text or the first failure
    pub fn run(&mut self, raw: &str) -> Result<PatchOutcome> {
        self.validate()?;

        let marker = self.namespace.marker();
        if raw.contains(&marker) {
            error!(marker = %marker, "refusing to patch already patched source");
            return Err(SpliceError::AlreadyPatched { marker });
        }

        let mut bindings = Bindings::seeded(self.namespace.root());
        let mut source = SourceText::from(raw);
        let mut reports = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let span = info_span!("rule", name = rule.name());
            let _enter = span.enter();
            let start_time = Instant::now();

            let stats = self
                .stats
                .entry(rule.name().to_string())
                .or_insert_with(|| RuleStats::new(rule.name().to_string()));
            stats.applications += 1;

            match rule.apply(source, &mut bindings) {
                Ok(outcome) => {
                    let elapsed_us = start_time.elapsed().as_micros() as u64;
                    stats.sites += outcome.sites as u64;
                    stats.total_time_us += elapsed_us;
                    debug!(sites = outcome.sites, elapsed_us, "rule applied");
                    reports.push(RuleReport {
                        rule: rule.name().to_string(),
                        description: rule.description().to_string(),
                        sites: outcome.sites,
                        elapsed_us,
                    });
                    source = outcome.source;
                }
                Err(e) => {
                    stats.errors += 1;
                    error!(error = %e, "patch rule failed");
                    return Err(e);
                }
            }
        }

        if self.declare_namespace {
            source = SourceText::new(format!("{}{}", self.namespace.prelude(), source));
        }

        info!(
            rules = reports.len(),
            identifiers = bindings.len(),
            bytes_in = raw.len(),
            bytes_out = source.len(),
            "patch complete"
        );

        Ok(PatchOutcome {
            report: PatchReport {
                rules: reports,
                identifiers: bindings,
                bytes_in: raw.len(),
                bytes_out: source.len(),
            },
            text: source,
        })
    }

    /// Get rule statistics, in rule order
    pub fn stats(&self) -> &IndexMap<String, RuleStats> {
        &self.stats
    }

    /// Clear statistics
    pub fn clear_stats(&mut self) {
        for stats in self.stats.values_mut() {
            *stats = RuleStats::new(stats.rule_name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::rules::RuleOutcome;
    use crate::template::{Embed, Template};

    /// Appends `;tag=<value of binding>` and optionally binds a new name
    struct TagRule {
        name: &'static str,
        requires: Vec<String>,
        produces: Vec<String>,
        template: Template,
        fail: bool,
    }

    impl TagRule {
        fn new(name: &'static str, requires: &[&str], produces: &[&str], template: &str) -> Self {
            Self {
                name,
                requires: requires.iter().map(|s| s.to_string()).collect(),
                produces: produces.iter().map(|s| s.to_string()).collect(),
                template: Template::parse(template).unwrap(),
                fail: false,
            }
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }
    }

    impl PatchRule for TagRule {
        fn name(&self) -> &'static str {
            self.name
        }

        fn description(&self) -> &'static str {
            "test rule"
        }

        fn requires(&self) -> Vec<String> {
            self.requires.clone()
        }

        fn produces(&self) -> Vec<String> {
            self.produces.clone()
        }

        fn templates(&self) -> Vec<&Template> {
            vec![&self.template]
        }

        fn apply(&self, source: SourceText, bindings: &mut Bindings) -> Result<RuleOutcome> {
            if self.fail {
                return Err(SpliceError::not_found(self.name, "nothing"));
            }
            for name in &self.produces {
                bindings.bind(name.clone(), format!("{}_value", name));
            }
            let suffix = self.template.render(bindings, Embed::Raw)?;
            Ok(RuleOutcome::new(SourceText::new(format!("{source}{suffix}")), 1))
        }
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(HookNamespace::new("window.test"))
    }

    #[test]
    fn test_rules_run_in_order_and_thread_identifiers() {
        let mut pipeline = pipeline();
        pipeline.add_rule(Box::new(TagRule::new("first", &[], &["a"], ";a=%{a}")));
        pipeline.add_rule(Box::new(TagRule::new("second", &["a"], &[], ";again=%{a}")));

        let outcome = pipeline.run("src").unwrap();
        assert_eq!(outcome.text.as_str(), "src;a=a_value;again=a_value");
        assert_eq!(outcome.report.rules.len(), 2);
        assert_eq!(outcome.report.rules[1].rule, "second");
        assert_eq!(outcome.report.rules[1].description, "test rule");
        assert_eq!(outcome.bindings().get("a").unwrap().as_str(), "a_value");
        assert_eq!(pipeline.stats()["second"].applications, 1);
    }

    #[test]
    fn test_misordered_rules_fail_validation() {
        let mut pipeline = pipeline();
        pipeline.add_rule(Box::new(TagRule::new("second", &["a"], &[], ";%{a}")));
        pipeline.add_rule(Box::new(TagRule::new("first", &[], &["a"], ";%{a}")));

        let err = pipeline.validate().unwrap_err();
        assert!(matches!(
            err,
            SpliceError::UnresolvedDependency { ref rule, ref identifier }
                if rule == "second" && identifier == "a"
        ));
    }

    #[test]
    fn test_undeclared_template_parameter_fails_validation() {
        let mut pipeline = pipeline();
        pipeline.add_rule(Box::new(TagRule::new("only", &[], &[], ";%{ns}.x=%{mystery}")));

        let err = pipeline.validate().unwrap_err();
        assert!(matches!(
            err,
            SpliceError::TemplateError { ref identifier, .. } if identifier == "mystery"
        ));
    }

    #[test]
    fn test_failure_aborts_without_output() {
        let mut pipeline = pipeline();
        pipeline.add_rule(Box::new(TagRule::new("first", &[], &["a"], ";%{a}")));
        pipeline.add_rule(Box::new(TagRule::new("broken", &[], &[], "").failing()));
        pipeline.add_rule(Box::new(TagRule::new("never", &[], &[], ";never")));

        let err = pipeline.run("src").unwrap_err();
        assert!(matches!(err, SpliceError::PatternNotFound { ref rule, .. } if rule == "broken"));
        assert_eq!(pipeline.stats()["broken"].errors, 1);
        assert_eq!(pipeline.stats()["never"].applications, 0);
    }

    #[test]
    fn test_already_patched_input_is_refused() {
        let mut pipeline = pipeline();
        pipeline.add_rule(Box::new(TagRule::new("first", &[], &[], ";%{ns}.hook=1")));

        let once = pipeline.run("src").unwrap();
        let err = pipeline.run(once.text.as_str()).unwrap_err();
        assert!(matches!(
            err,
            SpliceError::AlreadyPatched { ref marker } if marker == "window.test."
        ));
    }

    #[test]
    fn test_declared_namespace_prelude() {
        let mut pipeline = pipeline().declare_namespace(true);
        pipeline.add_rule(Box::new(TagRule::new("first", &[], &[], "")));

        let outcome = pipeline.run("src").unwrap();
        assert_eq!(outcome.text.as_str(), "window.test=window.test||{};src");
    }

    #[test]
    fn test_clear_stats() {
        let mut pipeline = pipeline();
        pipeline.add_rule(Box::new(TagRule::new("first", &[], &[], "")));
        pipeline.run("src").unwrap();
        assert_eq!(pipeline.stats()["first"].sites, 1);

        pipeline.clear_stats();
        assert_eq!(pipeline.stats()["first"].sites, 0);
        assert_eq!(pipeline.stats()["first"].rule_name, "first");
    }
}
