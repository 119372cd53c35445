//! Value shapes persisted by the typed helpers.
//!
//! These mirror what the provisioning collaborators consume. The store never
//! interprets them; in particular [`RetryPolicy`] is carried through to the
//! collaborators as-is.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Retry settings handed to a collaborator untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Error-text pattern to human-readable reason.
    pub retryable_errors: BTreeMap<String, String>,
    pub max_retries: u32,
    pub time_between_retries_secs: u64,
}

/// Options for the infrastructure-apply collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfraOptions {
    /// Directory holding the deployment code.
    pub working_dir: PathBuf,
    /// Input variables, passed as `-var` style arguments.
    pub vars: BTreeMap<String, Value>,
    pub var_files: Vec<PathBuf>,
    /// Extra environment for the collaborator process.
    pub env: BTreeMap<String, String>,
    pub no_color: bool,
    pub retry: RetryPolicy,
}

/// Options for the image-builder collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageBuildOptions {
    /// Path of the build template.
    pub template: PathBuf,
    /// Restrict the build to one named builder.
    pub only: Option<String>,
    pub vars: BTreeMap<String, String>,
    pub env: BTreeMap<String, String>,
    pub retry: RetryPolicy,
}

/// Options for running commands on a provisioned host over SSH.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteExecOptions {
    pub hostname: String,
    pub user: String,
    pub port: u16,
    /// Name of the key pair to authenticate with; the key itself lives under
    /// its own record.
    pub key_pair_name: Option<String>,
    pub env: BTreeMap<String, String>,
    pub retry: RetryPolicy,
}

impl Default for RemoteExecOptions {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            user: String::new(),
            port: 22,
            key_pair_name: None,
            env: BTreeMap::new(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Options for the cluster client (kubeconfig context and namespace).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterOptions {
    pub context_name: String,
    pub config_path: PathBuf,
    pub namespace: String,
    pub env: BTreeMap<String, String>,
}

/// An asymmetric key pair in PEM / authorized-keys form.
///
/// `Debug` never prints the private half.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Cloud credentials for a run: a key pair registered under `name` in
/// `region`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialBundle {
    pub key_pair: KeyPair,
    pub name: String,
    pub region: String,
}
