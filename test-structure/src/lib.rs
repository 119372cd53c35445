//! Helpers for long-running, multi-stage infrastructure tests.
//!
//! A staged test builds an image, deploys it, validates it and tears it down.
//! Each phase is slow, so this crate lets phases hand state to each other
//! through the filesystem and lets an operator skip phases that already ran:
//!
//! - **[`io::store`]**: a file-per-key test-data store scoped to a working
//!   directory, with typed helpers in [`io::typed`].
//! - **[`stage`]**: runs named stages unless `SKIP_<stage>` is truthy.
//! - **[`core`]**: pure encoding, key and override-parsing logic.
//!
//! ```no_run
//! use test_structure::io::store::TestDataStore;
//! use test_structure::stage::StageRunner;
//!
//! # fn main() -> anyhow::Result<()> {
//! let store = TestDataStore::new("../examples/terraform-packer-example");
//! let stages = StageRunner::new();
//!
//! stages.run_stage("build_ami", || {
//!     store.save_string("awsRegion", "us-east-2")?;
//!     store.save_image_id("ami-0abc1234")?;
//!     Ok(())
//! })?;
//! stages.run_stage("deploy", || {
//!     let image_id = store.load_image_id()?;
//!     println!("deploying {image_id}");
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod collaborators;
pub mod core;
pub mod error;
pub mod io;
pub mod logging;
pub mod options;
pub mod stage;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
