//! Seams for the provisioning tools a staged test drives.
//!
//! Implementations wrap the real deployment, image-build and cloud tooling and
//! own any retry behavior; the options they receive carry a
//! [`RetryPolicy`](crate::options::RetryPolicy) that this crate only stores.
//! `apply` and `destroy` are expected to be idempotent so a re-run stage is
//! harmless.

use anyhow::Result;

use crate::options::{ImageBuildOptions, InfraOptions};

/// Deployment tool (`init` + `apply`, `destroy`, `output`).
pub trait InfraApplier {
    fn apply(&self, options: &InfraOptions) -> Result<()>;

    fn destroy(&self, options: &InfraOptions) -> Result<()>;

    /// Read a named output value of the applied deployment.
    fn output(&self, options: &InfraOptions, name: &str) -> Result<String>;
}

/// Image builder. Returns the id of the built artifact.
pub trait ImageBuilder {
    fn build(&self, options: &ImageBuildOptions) -> Result<String>;
}

/// Cloud API lookups used around a build/deploy cycle.
pub trait CloudLookup {
    /// Pick the region a run should use.
    fn pick_region(&self) -> Result<String>;

    fn delete_image(&self, region: &str, image_id: &str) -> Result<()>;
}
