//! Repository collaborator: clone, commit and push through the `git` command line.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::Path;
use std::process::{Command, Output};

/// Run `git args...` in `dir`, failing with git's stderr when it exits non-zero.
fn git(dir: &Path, args: &[&str]) -> Result<Output> {
    debug!("git {}", args.join(" "));
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("run git {}", args.join(" ")))?;
    if !output.status.success() {
        anyhow::bail!(
            "git {} failed ({}): {}",
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(output)
}

/// Clone `url` into `dest`, removing whatever is at `dest` first.
pub fn clone_repository(url: &str, dest: &Path) -> Result<()> {
    remove_checkout(dest)?;
    let parent = dest.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent)
        .with_context(|| format!("create checkout parent {}", parent.display()))?;
    let dest_str = dest.to_string_lossy();
    git(parent, &["clone", url, &*dest_str])?;
    info!("Repository cloned to {}", dest.display());
    Ok(())
}

/// Remove a checkout directory if it exists.
pub fn remove_checkout(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).with_context(|| format!("remove {}", dir.display()))?;
    }
    Ok(())
}

pub fn current_branch(dir: &Path) -> Result<String> {
    let out = git(dir, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

/// What [`commit_and_push`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    NothingToCommit,
    Committed { pushed: bool },
}

/// Stage everything, commit with `message` when something is staged, then optionally push the
/// current branch to `origin`. A failed push is logged and reported as `pushed: false`.
pub fn commit_and_push(dir: &Path, message: &str, push: bool) -> Result<PublishOutcome> {
    git(dir, &["add", "-A"])?;
    // `diff --cached --quiet` exits 1 when there are staged changes.
    let staged = !Command::new("git")
        .args(["diff", "--cached", "--quiet"])
        .current_dir(dir)
        .status()
        .context("run git diff --cached")?
        .success();
    if !staged {
        info!("No changes to commit");
        return Ok(PublishOutcome::NothingToCommit);
    }
    git(dir, &["commit", "-m", message])?;
    if !push {
        return Ok(PublishOutcome::Committed { pushed: false });
    }
    let branch = current_branch(dir)?;
    info!("Pushing to branch: {}", branch);
    let pushed = match git(dir, &["push", "-u", "origin", branch.as_str()]) {
        Ok(_) => true,
        Err(e) => {
            warn!("Error pushing to git: {:#}", e);
            false
        }
    };
    Ok(PublishOutcome::Committed { pushed })
}
