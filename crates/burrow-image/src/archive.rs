//! Sequential tar extraction.
//!
//! Entries are materialized strictly in archive order. Hard links refer to
//! paths extracted earlier in the same archive, so there is no reordering
//! pass. Entry types other than directories, regular files, symlinks, and
//! hard links (devices, FIFOs, global headers) are skipped.

use std::ffi::OsStr;
use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::{self, BufReader, Read};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::{Component, Path, PathBuf};

use burrow_common::error::{BurrowError, Result};

/// Mode used for parent directories that the archive does not list itself.
const PARENT_DIR_MODE: u32 = 0o755;

/// One archive record, classified by the node it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveEntry {
    /// A directory with its archived permission bits.
    Directory {
        /// Path relative to the extraction root.
        path: PathBuf,
        /// Permission bits.
        mode: u32,
    },
    /// A regular file whose content follows the header.
    RegularFile {
        /// Path relative to the extraction root.
        path: PathBuf,
        /// Permission bits.
        mode: u32,
    },
    /// A symbolic link; the target is stored verbatim.
    Symlink {
        /// Path relative to the extraction root.
        path: PathBuf,
        /// Link target, not resolved.
        target: PathBuf,
    },
    /// A hard link to a previously extracted entry.
    Hardlink {
        /// Path relative to the extraction root.
        path: PathBuf,
        /// Archived path of the earlier entry.
        target: PathBuf,
    },
    /// Anything else. Never materialized.
    Other {
        /// Path relative to the extraction root.
        path: PathBuf,
        /// Raw tar type flag.
        kind: u8,
    },
}

impl ArchiveEntry {
    fn from_tar<R: Read>(entry: &tar::Entry<'_, R>) -> Result<Self> {
        let path = entry
            .path()
            .map_err(|e| extraction_error(Path::new("<entry>"), &e))?
            .into_owned();
        let header = entry.header();
        let entry_type = header.entry_type();

        let classified = if entry_type.is_dir() {
            Self::Directory {
                mode: entry_mode(header, &path)?,
                path,
            }
        } else if entry_type.is_file() {
            Self::RegularFile {
                mode: entry_mode(header, &path)?,
                path,
            }
        } else if entry_type.is_symlink() {
            Self::Symlink {
                target: link_target(entry, &path)?,
                path,
            }
        } else if entry_type.is_hard_link() {
            Self::Hardlink {
                target: link_target(entry, &path)?,
                path,
            }
        } else {
            Self::Other {
                kind: entry_type.as_byte(),
                path,
            }
        };
        Ok(classified)
    }
}

fn entry_mode(header: &tar::Header, path: &Path) -> Result<u32> {
    header
        .mode()
        .map(|m| m & 0o7777)
        .map_err(|e| extraction_error(path, &e))
}

fn link_target<R: Read>(entry: &tar::Entry<'_, R>, path: &Path) -> Result<PathBuf> {
    entry
        .link_name()
        .map_err(|e| extraction_error(path, &e))?
        .map(std::borrow::Cow::into_owned)
        .ok_or_else(|| BurrowError::Extraction {
            path: path.to_path_buf(),
            message: "link entry has no target".into(),
        })
}

/// Counts of materialized and skipped entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Directories created or already present.
    pub directories: usize,
    /// Regular files written.
    pub files: usize,
    /// Symbolic links created.
    pub symlinks: usize,
    /// Hard links created.
    pub hardlinks: usize,
    /// Entries of unsupported type.
    pub skipped: usize,
}

/// Extracts the archive at `archive_path` into `target`.
///
/// Files ending in `.gz` or `.tgz` are decompressed on the fly; anything
/// else is read as a plain tar stream.
///
/// # Errors
///
/// Returns [`BurrowError::Filesystem`] if the archive cannot be opened or a
/// node cannot be created, and [`BurrowError::Extraction`] if an entry is
/// malformed, escapes `target`, or links to a path not yet extracted.
pub fn extract_archive(archive_path: &Path, target: &Path) -> Result<ExtractSummary> {
    tracing::info!(
        archive = %archive_path.display(),
        target = %target.display(),
        "extracting archive"
    );

    let file = File::open(archive_path).map_err(|e| BurrowError::Filesystem {
        path: archive_path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let summary = if is_gzip_archive(archive_path) {
        unpack(flate2::read::GzDecoder::new(reader), target)
    } else {
        unpack(reader, target)
    }?;

    tracing::info!(
        directories = summary.directories,
        files = summary.files,
        symlinks = summary.symlinks,
        hardlinks = summary.hardlinks,
        skipped = summary.skipped,
        "extraction completed"
    );
    Ok(summary)
}

/// Extracts a plain tar stream into `target`, entry by entry.
///
/// # Errors
///
/// See [`extract_archive`].
pub fn unpack<R: Read>(reader: R, target: &Path) -> Result<ExtractSummary> {
    let mut archive = tar::Archive::new(reader);
    let entries = archive
        .entries()
        .map_err(|e| extraction_error(target, &e))?;

    let mut summary = ExtractSummary::default();
    for entry in entries {
        let mut entry = entry.map_err(|e| extraction_error(target, &e))?;
        match ArchiveEntry::from_tar(&entry)? {
            ArchiveEntry::Directory { path, mode } => {
                let dest = resolve(target, &path)?;
                create_dir(&dest, mode)?;
                summary.directories += 1;
            }
            ArchiveEntry::RegularFile { path, mode } => {
                let dest = resolve(target, &path)?;
                write_file(&mut entry, &dest, mode)?;
                summary.files += 1;
            }
            ArchiveEntry::Symlink { path, target: link } => {
                let dest = resolve(target, &path)?;
                prepare_link_path(&dest)?;
                std::os::unix::fs::symlink(&link, &dest).map_err(|e| BurrowError::Filesystem {
                    path: dest.clone(),
                    source: e,
                })?;
                summary.symlinks += 1;
            }
            ArchiveEntry::Hardlink { path, target: link } => {
                let dest = resolve(target, &path)?;
                let original = resolve(target, &link)?;
                if fs::symlink_metadata(&original).is_err() {
                    return Err(BurrowError::Extraction {
                        path,
                        message: format!(
                            "hard link target {} has not been extracted yet",
                            link.display()
                        ),
                    });
                }
                prepare_link_path(&dest)?;
                fs::hard_link(&original, &dest).map_err(|e| BurrowError::Filesystem {
                    path: dest.clone(),
                    source: e,
                })?;
                summary.hardlinks += 1;
            }
            ArchiveEntry::Other { path, kind } => {
                tracing::trace!(path = %path.display(), kind = %char::from(kind), "skipping unsupported entry");
                summary.skipped += 1;
            }
        }
    }
    Ok(summary)
}

/// Determines whether the archive is gzip-compressed based on extension.
fn is_gzip_archive(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("tgz"))
}

/// Joins an archived path onto `root`, refusing anything that climbs out of it.
///
/// Every intermediate component that already exists as a symlink must
/// resolve to a location inside `root`; the final component is left alone
/// so that link entries can replace it.
fn resolve(root: &Path, relative: &Path) -> Result<PathBuf> {
    let mut out = root.to_path_buf();
    let mut pending: Option<&OsStr> = None;
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                if let Some(parent) = pending.replace(part) {
                    out.push(parent);
                    ensure_inside(root, &out, relative)?;
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => return Err(escape_error(relative)),
        }
    }
    if let Some(last) = pending {
        out.push(last);
    }
    Ok(out)
}

/// Fails if `prefix` is a symlink whose destination lies outside `root`.
fn ensure_inside(root: &Path, prefix: &Path, relative: &Path) -> Result<()> {
    let is_symlink = fs::symlink_metadata(prefix).is_ok_and(|m| m.file_type().is_symlink());
    if !is_symlink {
        return Ok(());
    }
    match (fs::canonicalize(prefix), fs::canonicalize(root)) {
        (Ok(resolved), Ok(root)) if resolved.starts_with(&root) => Ok(()),
        _ => Err(escape_error(relative)),
    }
}

fn escape_error(relative: &Path) -> BurrowError {
    BurrowError::Extraction {
        path: relative.to_path_buf(),
        message: "entry path escapes the extraction root".into(),
    }
}

fn create_dir(path: &Path, mode: u32) -> Result<()> {
    DirBuilder::new()
        .recursive(true)
        .mode(mode)
        .create(path)
        .map_err(|e| BurrowError::Filesystem {
            path: path.to_path_buf(),
            source: e,
        })
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) => create_dir(parent, PARENT_DIR_MODE),
        None => Ok(()),
    }
}

fn write_file<R: Read>(content: &mut R, dest: &Path, mode: u32) -> Result<()> {
    ensure_parent(dest)?;
    // Never write through a symlink left by an earlier entry.
    if fs::symlink_metadata(dest).is_ok_and(|m| m.file_type().is_symlink()) {
        remove_node(dest)?;
    }
    let mut out = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(mode)
        .open(dest)
        .map_err(|e| BurrowError::Filesystem {
            path: dest.to_path_buf(),
            source: e,
        })?;
    let _ = io::copy(content, &mut out).map_err(|e| extraction_error(dest, &e))?;
    Ok(())
}

fn prepare_link_path(dest: &Path) -> Result<()> {
    ensure_parent(dest)?;
    remove_node(dest)
}

/// Removes whatever node sits at `path`, if any.
fn remove_node(path: &Path) -> Result<()> {
    let removed = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => Err(e),
    };
    removed.map_err(|e| BurrowError::Filesystem {
        path: path.to_path_buf(),
        source: e,
    })
}

fn extraction_error(path: &Path, err: &io::Error) -> BurrowError {
    BurrowError::Extraction {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
