//! Named test stages that can be skipped from the environment.
//!
//! A driver runs its stages in order through [`StageRunner::run_stage`].
//! Setting `SKIP_<stage>` to a truthy value skips that stage, so an operator
//! can keep deployed infrastructure around and re-run only validation while
//! iterating locally:
//!
//! ```bash
//! SKIP_cleanup_infra=true SKIP_cleanup_image=true cargo test --test e2e   # build + deploy, keep it
//! SKIP_build_image=true SKIP_deploy=true cargo test --test e2e            # validate + clean up
//! ```
//!
//! The runner holds no state between calls. Whether a stage ran is reported
//! only through the log sink; a later stage that needs data from a skipped one
//! fails with a not-found error from the store.

use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::skip::{parse_truthy, skip_var_name};
use crate::io::config::StructureConfig;
use crate::logging::{LogSink, default_sink};

/// Source of stage override values.
pub trait SkipSignals {
    /// Value of the variable `name`, if set.
    fn var(&self, name: &str) -> Option<String>;

    /// All `(name, value)` pairs, used to detect whether any stage is skipped.
    fn vars(&self) -> Vec<(String, String)>;
}

/// Reads overrides from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl SkipSignals for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }

    fn vars(&self) -> Vec<(String, String)> {
        env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }
}

/// Fixed set of overrides, for tests and for drivers that compute skips
/// themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSignals {
    vars: BTreeMap<String, String>,
}

impl StaticSignals {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl SkipSignals for StaticSignals {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn vars(&self) -> Vec<(String, String)> {
        self.vars
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

/// Runs or skips named stages based on `<prefix><stage>` overrides.
pub struct StageRunner<S = ProcessEnv> {
    signals: S,
    prefix: String,
    sink: Arc<dyn LogSink>,
}

impl StageRunner<ProcessEnv> {
    /// Runner reading `SKIP_<stage>` from the process environment.
    pub fn new() -> Self {
        Self {
            signals: ProcessEnv,
            prefix: StructureConfig::default().skip_prefix,
            sink: default_sink(),
        }
    }

    /// Runner with a custom override prefix. An empty prefix would turn every
    /// environment variable into an override, so invalid configs are rejected.
    pub fn from_config(cfg: &StructureConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            signals: ProcessEnv,
            prefix: cfg.skip_prefix.clone(),
            sink: default_sink(),
        })
    }
}

impl Default for StageRunner<ProcessEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SkipSignals> StageRunner<S> {
    /// Swap the override source, keeping prefix and sink.
    pub fn with_signals<T: SkipSignals>(self, signals: T) -> StageRunner<T> {
        StageRunner {
            signals,
            prefix: self.prefix,
            sink: self.sink,
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }

    /// True if the override for `stage` is set to a truthy value.
    pub fn should_skip(&self, stage: &str) -> bool {
        let var_name = skip_var_name(&self.prefix, stage);
        let Some(value) = self.signals.var(&var_name) else {
            return false;
        };
        match parse_truthy(&value) {
            Some(skip) => skip,
            None => {
                self.sink.logf(format_args!(
                    "[WARNING] The '{var_name}' environment variable is set to '{value}', which is not a boolean, so executing stage '{stage}'."
                ));
                false
            }
        }
    }

    /// True if any stage override with this runner's prefix is truthy.
    ///
    /// Drivers use this to reuse a working directory from a previous run
    /// instead of starting from a fresh copy.
    pub fn any_stage_skipped(&self) -> bool {
        self.signals.vars().into_iter().any(|(name, value)| {
            name.starts_with(&self.prefix) && parse_truthy(&value) == Some(true)
        })
    }

    /// Run `action` unless the stage is skipped.
    ///
    /// The action runs synchronously on the calling thread. Its error is
    /// returned with the stage name attached and aborts the caller's sequence.
    pub fn run_stage<F>(&self, stage: &str, action: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        let var_name = skip_var_name(&self.prefix, stage);
        if self.should_skip(stage) {
            self.sink.logf(format_args!(
                "The '{var_name}' environment variable is set, so skipping stage '{stage}'."
            ));
            return Ok(());
        }

        self.sink.logf(format_args!(
            "The '{var_name}' environment variable is not set to true, so executing stage '{stage}'."
        ));
        action().with_context(|| format!("stage '{stage}' failed"))?;
        debug!(stage, "stage finished");
        Ok(())
    }
}
