//! Staged build → deploy → validate → cleanup driver against scripted
//! collaborators.
//!
//! The driver is run the way an operator iterates locally: once keeping the
//! infrastructure around, then again skipping build and deploy so only
//! validation and cleanup run against the persisted test data.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Result, ensure};
use serde_json::json;
use test_structure::collaborators::{CloudLookup, ImageBuilder, InfraApplier};
use test_structure::error::StoreError;
use test_structure::io::store::TestDataStore;
use test_structure::logging::{self, NoopSink};
use test_structure::options::{ImageBuildOptions, InfraOptions, RetryPolicy};
use test_structure::stage::{SkipSignals, StageRunner, StaticSignals};
use test_structure::test_support::{ScriptedApplier, ScriptedBuilder, ScriptedCloud};

const IMAGE_ID: &str = "ami-0abc1234";
const URL: &str = "http://203.0.113.10:8080";

struct Pipeline<'a> {
    store: &'a TestDataStore,
    applier: &'a ScriptedApplier,
    builder: &'a ScriptedBuilder,
    cloud: &'a ScriptedCloud,
}

fn retry_policy() -> RetryPolicy {
    RetryPolicy {
        retryable_errors: BTreeMap::from([(
            ".*RequestLimitExceeded.*".to_string(),
            "API throttling".to_string(),
        )]),
        max_retries: 3,
        time_between_retries_secs: 5,
    }
}

impl Pipeline<'_> {
    /// Main stages followed by cleanup stages; cleanup runs even if a main
    /// stage failed, and the first error wins.
    fn run<S: SkipSignals>(&self, stages: &StageRunner<S>) -> Result<()> {
        let main = self.run_main(stages);
        let cleanup = self.run_cleanup(stages);
        main.and(cleanup)
    }

    fn run_main<S: SkipSignals>(&self, stages: &StageRunner<S>) -> Result<()> {
        stages.run_stage("build_image", || {
            let region = self.cloud.pick_region()?;
            self.store.save_string("awsRegion", &region)?;
            let options = ImageBuildOptions {
                template: PathBuf::from("build.pkr.hcl"),
                only: Some("amazon-ebs.ubuntu-ami".to_string()),
                vars: BTreeMap::from([("aws_region".to_string(), region)]),
                retry: retry_policy(),
                ..ImageBuildOptions::default()
            };
            self.store.save_image_build_options(&options)?;
            let image_id = self.builder.build(&options)?;
            self.store.save_image_id(&image_id)?;
            Ok(())
        })?;

        stages.run_stage("deploy", || {
            let region = self.store.load_string("awsRegion")?;
            let image_id = self.store.load_image_id()?;
            let options = InfraOptions {
                working_dir: self.store.dir().to_path_buf(),
                vars: BTreeMap::from([
                    ("aws_region".to_string(), json!(region)),
                    ("ami_id".to_string(), json!(image_id)),
                    ("instance_text".to_string(), json!("Hello, stage!")),
                ]),
                retry: retry_policy(),
                ..InfraOptions::default()
            };
            self.store.save_infra_options(&options)?;
            self.applier.apply(&options)
        })?;

        stages.run_stage("validate", || {
            let options = self.store.load_infra_options()?;
            let url = self.applier.output(&options, "instance_url")?;
            ensure!(url.starts_with("http://"), "unexpected url {url}");
            ensure!(
                options.vars.get("instance_text") == Some(&json!("Hello, stage!")),
                "instance text was not persisted"
            );
            Ok(())
        })
    }

    fn run_cleanup<S: SkipSignals>(&self, stages: &StageRunner<S>) -> Result<()> {
        let infra = stages.run_stage("cleanup_infra", || {
            let options = self.store.load_infra_options()?;
            self.applier.destroy(&options)
        });
        let image = stages.run_stage("cleanup_image", || {
            let region = self.store.load_string("awsRegion")?;
            let image_id = self.store.load_image_id()?;
            self.cloud.delete_image(&region, &image_id)
        });
        infra.and(image)
    }
}

fn stages(signals: StaticSignals) -> StageRunner<StaticSignals> {
    logging::init();
    StageRunner::new().with_signals(signals)
}

fn store_error(err: &anyhow::Error) -> Option<&StoreError> {
    err.chain().find_map(|cause| cause.downcast_ref::<StoreError>())
}

#[test]
fn full_run_builds_deploys_validates_and_cleans_up() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = TestDataStore::new(temp.path());
    let applier = ScriptedApplier::new().with_output("instance_url", URL);
    let builder = ScriptedBuilder::new(IMAGE_ID);
    let cloud = ScriptedCloud::new("us-east-2");
    let pipeline = Pipeline {
        store: &store,
        applier: &applier,
        builder: &builder,
        cloud: &cloud,
    };

    pipeline.run(&stages(StaticSignals::new())).expect("pipeline");

    let builds = builder.builds();
    assert_eq!(builds.len(), 1);
    assert_eq!(builds[0].retry, retry_policy());
    assert_eq!(
        applier.calls(),
        vec!["apply", "output:instance_url", "destroy"]
    );
    assert_eq!(applier.applied()[0].vars["ami_id"], json!(IMAGE_ID));
    assert_eq!(
        cloud.deleted(),
        vec![("us-east-2".to_string(), IMAGE_ID.to_string())]
    );
}

/// First run keeps the infrastructure; second run skips build and deploy and
/// works entirely from the persisted test data.
#[test]
fn iterative_runs_reuse_persisted_state() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = TestDataStore::new(temp.path());

    let applier = ScriptedApplier::new().with_output("instance_url", URL);
    let builder = ScriptedBuilder::new(IMAGE_ID);
    let cloud = ScriptedCloud::new("us-east-2");
    Pipeline {
        store: &store,
        applier: &applier,
        builder: &builder,
        cloud: &cloud,
    }
    .run(&stages(
        StaticSignals::new()
            .with("SKIP_cleanup_infra", "true")
            .with("SKIP_cleanup_image", "true"),
    ))
    .expect("first run");

    assert_eq!(builder.builds().len(), 1);
    assert_eq!(applier.calls(), vec!["apply", "output:instance_url"]);
    assert!(cloud.deleted().is_empty());
    assert!(store.exists("awsRegion").expect("exists"));

    // Fresh collaborators stand in for a new test process.
    let applier = ScriptedApplier::new().with_output("instance_url", URL);
    let builder = ScriptedBuilder::new("ami-should-not-be-built");
    let cloud = ScriptedCloud::new("eu-west-1");
    Pipeline {
        store: &store,
        applier: &applier,
        builder: &builder,
        cloud: &cloud,
    }
    .run(&stages(
        StaticSignals::new()
            .with("SKIP_build_image", "true")
            .with("SKIP_deploy", "1"),
    ))
    .expect("second run");

    assert!(builder.builds().is_empty());
    assert_eq!(applier.calls(), vec!["output:instance_url", "destroy"]);
    assert_eq!(
        cloud.deleted(),
        vec![("us-east-2".to_string(), IMAGE_ID.to_string())]
    );
}

#[test]
fn skipping_a_producer_stage_surfaces_not_found() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = TestDataStore::new(temp.path()).with_sink(std::sync::Arc::new(NoopSink));
    let applier = ScriptedApplier::new().with_output("instance_url", URL);
    let builder = ScriptedBuilder::new(IMAGE_ID);
    let cloud = ScriptedCloud::new("us-east-2");

    let err = Pipeline {
        store: &store,
        applier: &applier,
        builder: &builder,
        cloud: &cloud,
    }
    .run(&stages(StaticSignals::new().with("SKIP_build_image", "true")))
    .unwrap_err();

    assert_eq!(err.to_string(), "stage 'deploy' failed");
    let cause = store_error(&err).expect("store error in chain");
    assert!(cause.is_not_found(), "{cause}");
    assert!(cause.to_string().contains("'awsRegion'"), "{cause}");
    assert!(applier.calls().is_empty());
}

#[test]
fn cleanup_runs_after_failed_validation() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = TestDataStore::new(temp.path());
    let applier = ScriptedApplier::new();
    let builder = ScriptedBuilder::new(IMAGE_ID);
    let cloud = ScriptedCloud::new("us-east-2");

    let err = Pipeline {
        store: &store,
        applier: &applier,
        builder: &builder,
        cloud: &cloud,
    }
    .run(&stages(StaticSignals::new()))
    .unwrap_err();

    assert_eq!(err.to_string(), "stage 'validate' failed");
    assert_eq!(
        applier.calls(),
        vec!["apply", "output:instance_url", "destroy"]
    );
    assert_eq!(cloud.deleted().len(), 1);
}
