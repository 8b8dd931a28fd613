//! Mirror a local directory tree to the remote host.
//!
//! The walk is lexicographic and sequential: directories are created
//! before their contents, files are sent one at a time, and existing
//! remote files are overwritten unconditionally. There is no checksum
//! comparison and no resume; a failed transfer aborts the mirror.

use std::collections::BTreeSet;
use std::path::Path;

use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::ssh::FileTransfer;

/// Path segments and filename patterns excluded from the mirror.
///
/// Directory names match any path segment; file patterns match the
/// filename only. The defaults cover version-control metadata, the local
/// virtualenv, bytecode caches, and the local database file.
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    pub exclude_dirs: BTreeSet<String>,
    pub exclude_files: Vec<Pattern>,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        let mut opts = Self {
            exclude_dirs: BTreeSet::new(),
            exclude_files: Vec::new(),
        };
        for name in [".git", ".venv", "__pycache__"] {
            opts.exclude_dirs.insert(name.to_string());
        }
        for pattern in ["*.pyc", "db.sqlite3"] {
            if let Ok(compiled) = Pattern::new(pattern) {
                opts.exclude_files.push(compiled);
            }
        }
        opts
    }
}

impl MirrorOptions {
    /// Add a caller-supplied exclude. Patterns containing glob
    /// metacharacters become filename patterns; plain names become
    /// excluded directory segments.
    pub fn exclude(&mut self, pattern: &str) -> Result<()> {
        if pattern.contains(['*', '?', '[']) {
            let compiled = Pattern::new(pattern)
                .map_err(|e| Error::Config(format!("bad exclude pattern '{}': {}", pattern, e)))?;
            self.exclude_files.push(compiled);
        } else {
            self.exclude_dirs.insert(pattern.to_string());
        }
        Ok(())
    }

    fn is_excluded_file(&self, name: &str) -> bool {
        self.exclude_files.iter().any(|p| p.matches(name))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MirrorStats {
    pub files_sent: u64,
    pub files_skipped: u64,
}

/// Ensure a remote directory exists, creating missing ancestors one
/// level at a time.
///
/// Check-then-create: an existence hit suppresses the create call. Not
/// safe against concurrent remote mutation; none is expected, since a
/// session has exactly one caller.
pub fn ensure_dir<T: FileTransfer + ?Sized>(transfer: &mut T, remote_path: &str) -> Result<()> {
    if transfer.exists(remote_path)? {
        return Ok(());
    }

    let absolute = remote_path.starts_with('/');
    let mut current = String::new();
    for segment in remote_path.split('/').filter(|s| !s.is_empty()) {
        if current.is_empty() {
            if absolute {
                current = format!("/{}", segment);
            } else {
                current = segment.to_string();
            }
        } else {
            current = format!("{}/{}", current, segment);
        }
        if !transfer.exists(&current)? {
            transfer.mkdir(&current)?;
        }
    }

    Ok(())
}

/// Mirror `local_root` to `remote_root` in deterministic (lexicographic)
/// walk order, skipping excluded directories and filenames.
pub fn mirror_tree<T: FileTransfer + ?Sized>(
    transfer: &mut T,
    local_root: &Path,
    remote_root: &str,
    opts: &MirrorOptions,
) -> Result<MirrorStats> {
    let mut stats = MirrorStats::default();

    let walker = WalkDir::new(local_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry, &opts.exclude_dirs));

    for entry in walker {
        let entry =
            entry.map_err(|e| Error::Other(format!("walk {}: {}", local_root.display(), e)))?;
        let rel = entry
            .path()
            .strip_prefix(local_root)
            .map_err(|e| Error::Other(format!("walk {}: {}", local_root.display(), e)))?;

        if entry.file_type().is_dir() {
            ensure_dir(transfer, &remote_join(remote_root, rel))?;
        } else if entry.file_type().is_file() {
            let name = entry.file_name().to_string_lossy();
            if opts.is_excluded_file(&name) {
                stats.files_skipped += 1;
                continue;
            }
            let remote_path = remote_join(remote_root, rel);
            transfer.upload(entry.path(), &remote_path)?;
            stats.files_sent += 1;
        }
    }

    log_status!(
        "mirror",
        "Sent {} files to {} ({} skipped)",
        stats.files_sent,
        remote_root,
        stats.files_skipped
    );
    Ok(stats)
}

fn is_excluded_dir(entry: &DirEntry, exclude_dirs: &BTreeSet<String>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| exclude_dirs.contains(name))
            .unwrap_or(false)
}

fn remote_join(root: &str, rel: &Path) -> String {
    let rel: Vec<String> = rel
        .iter()
        .map(|c| c.to_string_lossy().into_owned())
        .collect();
    let root = root.trim_end_matches('/');
    if rel.is_empty() {
        root.to_string()
    } else {
        format!("{}/{}", root, rel.join("/"))
    }
}
