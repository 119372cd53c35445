//! Temporary copies of deployment code for isolated runs.
//!
//! Parallel runs of the same deployment code would share state files and
//! test data if they ran in place. Each run therefore works in its own copy,
//! except while an operator is skipping stages: then the previous run's
//! directory, and the test data saved in it, must be reused.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::stage::{SkipSignals, StageRunner};

/// Copy `root` into a new temp directory and return the path of `module`
/// inside the copy.
///
/// If any stage is being skipped, nothing is copied and `root/module` is
/// returned. The caller owns the returned directory and removes it when done.
/// Hidden entries (`.terraform`, `.git`, ...), local state files and every
/// directory named `data_dir` are left out of the copy, so a fresh run never
/// starts with test data from an earlier one.
pub fn copy_folder_to_temp<S: SkipSignals>(
    stages: &StageRunner<S>,
    data_dir: &str,
    root: &Path,
    module: &Path,
    prefix: &str,
) -> Result<PathBuf> {
    if stages.any_stage_skipped() {
        let in_place = root.join(module);
        stages.sink().logf(format_args!(
            "A stage is being skipped, so reusing {} instead of a temp copy",
            in_place.display()
        ));
        return Ok(in_place);
    }

    let temp_root = tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .context("create temp dir")?
        .keep();
    copy_tree(root, &temp_root, data_dir)?;
    let copied = temp_root.join(module);
    stages.sink().logf(format_args!(
        "Copied {} to {}",
        root.display(),
        temp_root.display()
    ));
    Ok(copied)
}

fn copy_tree(src: &Path, dest: &Path, data_dir: &str) -> Result<()> {
    let walker = WalkDir::new(src)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry, data_dir));
    for entry in walker {
        let entry = entry.with_context(|| format!("walk {}", src.display()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("relativize {}", entry.path().display()))?;
        let target = dest.join(relative);
        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("create directory {}", target.display()))?;
        } else if file_type.is_file() {
            fs::copy(entry.path(), &target).with_context(|| {
                format!("copy {} to {}", entry.path().display(), target.display())
            })?;
        } else {
            debug!(path = %entry.path().display(), "skipping non-regular file");
        }
    }
    Ok(())
}

fn is_excluded(entry: &DirEntry, data_dir: &str) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if entry.file_type().is_dir() && name == data_dir {
        return true;
    }
    name.starts_with('.') || name.starts_with("terraform.tfstate")
}
