//! Logical keys and their mapping to record file names.
//!
//! A key becomes `<key>.json` inside the data directory. Keys are restricted to
//! `[A-Za-z0-9._-]` with no leading `.`, which keeps the mapping injective and
//! keeps every record inside the data directory.
//!
//! Keys are case-sensitive, but `awsRegion` and `AWSREGION` share a file on
//! case-insensitive filesystems; the store refuses to save the second one.

/// Key for the infrastructure-apply options of a run.
pub const INFRA_OPTIONS: &str = "InfraOptions";
/// Key for the image-build options of a run.
pub const IMAGE_BUILD_OPTIONS: &str = "ImageBuildOptions";
/// Key for the remote-execution (SSH) options of a run.
pub const REMOTE_EXEC_OPTIONS: &str = "RemoteExecOptions";
/// Key for the cluster-client options of a run.
pub const CLUSTER_OPTIONS: &str = "ClusterOptions";
/// Key for the built image identifier.
pub const IMAGE_ID: &str = "ImageId";
/// Key for the build artifact identifier.
pub const ARTIFACT_ID: &str = "ArtifactId";
/// Key for the cloud credential bundle (secret).
pub const CREDENTIAL_BUNDLE: &str = "CredentialBundle";
/// Key for a bare SSH key pair (secret).
pub const SSH_KEY_PAIR: &str = "SshKeyPair";

const RECORD_EXTENSION: &str = "json";

/// Check that `key` can be used as a record name.
pub fn validate_key(key: &str) -> Result<(), &'static str> {
    if key.is_empty() {
        return Err("key must not be empty");
    }
    if key.starts_with('.') {
        return Err("key must not start with '.'");
    }
    if key
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-'))
    {
        return Err("key must be [A-Za-z0-9._-] only");
    }
    Ok(())
}

/// File name of the record for an already validated key.
pub fn record_file_name(key: &str) -> String {
    format!("{key}.{RECORD_EXTENSION}")
}
