//! Typed helpers over [`TestDataStore`] for the values stages pass around.
//!
//! Named strings and integers use a caller-chosen key. Everything else lives
//! under one fixed key per working directory (see [`crate::core::key`]).
//! Saves overwrite unless the method name says `if_absent`.

use crate::core::key::{
    ARTIFACT_ID, CLUSTER_OPTIONS, CREDENTIAL_BUNDLE, IMAGE_BUILD_OPTIONS, IMAGE_ID, INFRA_OPTIONS,
    REMOTE_EXEC_OPTIONS, SSH_KEY_PAIR,
};
use crate::error::StoreResult;
use crate::io::store::TestDataStore;
use crate::options::{
    ClusterOptions, CredentialBundle, ImageBuildOptions, InfraOptions, KeyPair, RemoteExecOptions,
};

impl TestDataStore {
    pub fn save_string(&self, name: &str, value: &str) -> StoreResult<()> {
        self.save(name, value, true)
    }

    pub fn load_string(&self, name: &str) -> StoreResult<String> {
        self.load(name)
    }

    pub fn save_int(&self, name: &str, value: i64) -> StoreResult<()> {
        self.save(name, &value, true)
    }

    pub fn load_int(&self, name: &str) -> StoreResult<i64> {
        self.load(name)
    }

    pub fn save_infra_options(&self, options: &InfraOptions) -> StoreResult<()> {
        self.save(INFRA_OPTIONS, options, true)
    }

    /// Keep options saved by an earlier run of the same stage.
    pub fn save_infra_options_if_absent(&self, options: &InfraOptions) -> StoreResult<()> {
        self.save_if_absent(INFRA_OPTIONS, options)
    }

    pub fn load_infra_options(&self) -> StoreResult<InfraOptions> {
        self.load(INFRA_OPTIONS)
    }

    pub fn save_image_build_options(&self, options: &ImageBuildOptions) -> StoreResult<()> {
        self.save(IMAGE_BUILD_OPTIONS, options, true)
    }

    pub fn load_image_build_options(&self) -> StoreResult<ImageBuildOptions> {
        self.load(IMAGE_BUILD_OPTIONS)
    }

    pub fn save_remote_exec_options(&self, options: &RemoteExecOptions) -> StoreResult<()> {
        self.save(REMOTE_EXEC_OPTIONS, options, true)
    }

    pub fn load_remote_exec_options(&self) -> StoreResult<RemoteExecOptions> {
        self.load(REMOTE_EXEC_OPTIONS)
    }

    pub fn save_cluster_options(&self, options: &ClusterOptions) -> StoreResult<()> {
        self.save(CLUSTER_OPTIONS, options, true)
    }

    pub fn load_cluster_options(&self) -> StoreResult<ClusterOptions> {
        self.load(CLUSTER_OPTIONS)
    }

    pub fn save_image_id(&self, image_id: &str) -> StoreResult<()> {
        self.save(IMAGE_ID, image_id, true)
    }

    pub fn load_image_id(&self) -> StoreResult<String> {
        self.load(IMAGE_ID)
    }

    pub fn save_artifact_id(&self, artifact_id: &str) -> StoreResult<()> {
        self.save(ARTIFACT_ID, artifact_id, true)
    }

    pub fn load_artifact_id(&self) -> StoreResult<String> {
        self.load(ARTIFACT_ID)
    }

    /// Persist secret key material. Nothing here logs the value; callers must
    /// not either.
    pub fn save_credentials(&self, bundle: &CredentialBundle) -> StoreResult<()> {
        self.save(CREDENTIAL_BUNDLE, bundle, true)
    }

    pub fn load_credentials(&self) -> StoreResult<CredentialBundle> {
        self.load(CREDENTIAL_BUNDLE)
    }

    pub fn remove_credentials(&self) -> StoreResult<()> {
        self.remove(CREDENTIAL_BUNDLE)
    }

    pub fn save_ssh_key_pair(&self, key_pair: &KeyPair) -> StoreResult<()> {
        self.save(SSH_KEY_PAIR, key_pair, true)
    }

    pub fn load_ssh_key_pair(&self) -> StoreResult<KeyPair> {
        self.load(SSH_KEY_PAIR)
    }
}
