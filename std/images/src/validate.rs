//! Path normalization and containment checks.
//!
//! Every candidate image path goes through two gates: [`join_within`] rejects
//! names that lexically leave the configured directories before any
//! filesystem access, and [`is_contained`] re-checks the canonical path once
//! the file is known to exist, so symlinks cannot escape either.
//! Containment always compares whole path components, never string prefixes.

use std::path::{Component, Path, PathBuf};

/// Lexically clean a path: drop `.` components and fold `..` into the
/// preceding normal component. `..` at the root is discarded.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Make a directory path absolute and normalized for storage in the
/// directory list. On Windows the drive letter is upper-cased.
pub fn normalize_dir(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    Ok(fold_drive_letter(normalize(&absolute)))
}

#[cfg(windows)]
fn fold_drive_letter(path: PathBuf) -> PathBuf {
    let text = path.to_string_lossy().into_owned();
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(drive), Some(':')) if drive.is_ascii_lowercase() => {
            PathBuf::from(format!("{}{}", drive.to_ascii_uppercase(), &text[1..]))
        }
        _ => path,
    }
}

#[cfg(not(windows))]
fn fold_drive_letter(path: PathBuf) -> PathBuf {
    path
}

/// Join `name` onto `dir` and normalize the result.
///
/// Returns `None` when the joined path is not a descendant of any directory
/// in `allowed` (absolute names, `..` traversal).
pub fn join_within(dir: &Path, name: &str, allowed: &[PathBuf]) -> Option<PathBuf> {
    let candidate = normalize(&dir.join(name));
    is_descendant(&candidate, allowed).then_some(candidate)
}

/// Verify that an existing path, after resolving symlinks, still lies inside
/// one of the allowed directories (also resolved).
pub fn is_contained(path: &Path, allowed: &[PathBuf]) -> std::io::Result<bool> {
    let canonical = path.canonicalize()?;
    let dirs = canonicalize_dirs(allowed);
    Ok(is_descendant(&canonical, &dirs))
}

/// Canonicalize a list of directory paths, skipping any that don't exist.
pub fn canonicalize_dirs(dirs: &[PathBuf]) -> Vec<PathBuf> {
    dirs.iter().filter_map(|d| d.canonicalize().ok()).collect()
}

fn is_descendant(path: &Path, dirs: &[PathBuf]) -> bool {
    dirs.iter().any(|dir| path != dir.as_path() && path.starts_with(dir))
}
