//! Test-only log sink and scripted collaborators.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

use anyhow::{Result, anyhow};

use crate::collaborators::{CloudLookup, ImageBuilder, InfraApplier};
use crate::logging::LogSink;
use crate::options::{ImageBuildOptions, InfraOptions};

/// Collects every log line, one per line.
#[derive(Debug, Default)]
pub struct CaptureSink {
    lines: Mutex<String>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LogSink for CaptureSink {
    fn logf(&self, args: fmt::Arguments<'_>) {
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push_str(&args.to_string());
        lines.push('\n');
    }
}

/// Deployment tool that records calls and serves fixed outputs.
#[derive(Debug, Default)]
pub struct ScriptedApplier {
    outputs: BTreeMap<String, String>,
    calls: RefCell<Vec<String>>,
    applied: RefCell<Vec<InfraOptions>>,
}

impl ScriptedApplier {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_output(mut self, name: &str, value: &str) -> Self {
        self.outputs.insert(name.to_string(), value.to_string());
        self
    }

    /// Call log, e.g. `["apply", "output:url", "destroy"]`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Options passed to each `apply`.
    pub fn applied(&self) -> Vec<InfraOptions> {
        self.applied.borrow().clone()
    }
}

impl InfraApplier for ScriptedApplier {
    fn apply(&self, options: &InfraOptions) -> Result<()> {
        self.calls.borrow_mut().push("apply".to_string());
        self.applied.borrow_mut().push(options.clone());
        Ok(())
    }

    fn destroy(&self, _options: &InfraOptions) -> Result<()> {
        self.calls.borrow_mut().push("destroy".to_string());
        Ok(())
    }

    fn output(&self, _options: &InfraOptions, name: &str) -> Result<String> {
        self.calls.borrow_mut().push(format!("output:{name}"));
        self.outputs
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("no output named '{name}'"))
    }
}

/// Image builder returning a fixed artifact id.
#[derive(Debug)]
pub struct ScriptedBuilder {
    artifact_id: String,
    builds: RefCell<Vec<ImageBuildOptions>>,
}

impl ScriptedBuilder {
    pub fn new(artifact_id: &str) -> Self {
        Self {
            artifact_id: artifact_id.to_string(),
            builds: RefCell::new(Vec::new()),
        }
    }

    pub fn builds(&self) -> Vec<ImageBuildOptions> {
        self.builds.borrow().clone()
    }
}

impl ImageBuilder for ScriptedBuilder {
    fn build(&self, options: &ImageBuildOptions) -> Result<String> {
        self.builds.borrow_mut().push(options.clone());
        Ok(self.artifact_id.clone())
    }
}

/// Cloud lookups with a fixed region; records deleted images.
#[derive(Debug)]
pub struct ScriptedCloud {
    region: String,
    deleted: RefCell<Vec<(String, String)>>,
}

impl ScriptedCloud {
    pub fn new(region: &str) -> Self {
        Self {
            region: region.to_string(),
            deleted: RefCell::new(Vec::new()),
        }
    }

    /// `(region, image_id)` pairs passed to `delete_image`.
    pub fn deleted(&self) -> Vec<(String, String)> {
        self.deleted.borrow().clone()
    }
}

impl CloudLookup for ScriptedCloud {
    fn pick_region(&self) -> Result<String> {
        Ok(self.region.clone())
    }

    fn delete_image(&self, region: &str, image_id: &str) -> Result<()> {
        self.deleted
            .borrow_mut()
            .push((region.to_string(), image_id.to_string()));
        Ok(())
    }
}
