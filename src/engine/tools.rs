//! Path, filter and formatting utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Check if a file should be excluded based on OS-specific hidden files
pub fn is_os_hidden_file(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(".DS_Store" | "Thumbs.db" | "Desktop.ini" | ".directory") => true,
        // macOS resource fork files
        Some(name) => name.starts_with("._"),
        None => false,
    }
}

/// True if `path` has one of `extensions` (compared case-insensitively, no leading dot).
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// True if any exclude pattern matches the file name or the full path.
pub fn is_excluded(path: &Path, exclude_patterns: &[String]) -> bool {
    if exclude_patterns.is_empty() {
        return false;
    }
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let path_str = path.to_str().unwrap_or("");
    exclude_patterns
        .iter()
        .any(|pattern| glob_match(pattern, name) || glob_match(pattern, path_str))
}

/// Simple glob pattern matching (supports * and ?)
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern = pattern.strip_prefix('!').unwrap_or(pattern);
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    // Iterative matcher with single-star backtracking.
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while ti < t.len() {
        match p.get(pi).copied() {
            Some('*') => {
                star = Some((pi, ti));
                pi += 1;
            }
            Some('?') => {
                pi += 1;
                ti += 1;
            }
            Some(c) if c == t[ti] => {
                pi += 1;
                ti += 1;
            }
            _ => match star {
                Some((sp, st)) => {
                    pi = sp + 1;
                    ti = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}

/// Find the analyzer executable. Paths with a directory component must point at a file;
/// bare names are looked up on `PATH`.
pub fn resolve_program(program: &Path) -> Result<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        if program.is_file() {
            return Ok(program.to_path_buf());
        }
        anyhow::bail!("analyzer program not found: {}", program.display());
    }
    let path_var = std::env::var_os("PATH").context("PATH is not set")?;
    std::env::split_paths(&path_var)
        .flat_map(|dir| executable_candidates(&dir, program))
        .find(|candidate| candidate.is_file())
        .with_context(|| format!("{} not found on PATH", program.display()))
}

#[cfg(windows)]
fn executable_candidates(dir: &Path, program: &Path) -> Vec<PathBuf> {
    let plain = dir.join(program);
    if program.extension().is_some() {
        return vec![plain];
    }
    vec![
        plain.with_extension("exe"),
        plain.with_extension("cmd"),
        plain.with_extension("bat"),
        plain,
    ]
}

#[cfg(not(windows))]
fn executable_candidates(dir: &Path, program: &Path) -> Vec<PathBuf> {
    vec![dir.join(program)]
}

/// Format milliseconds as `MM:SS` (or `H:MM:SS` past an hour).
pub fn format_eta(millis: u64) -> String {
    let secs = millis.div_ceil(1000);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}
