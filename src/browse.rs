//! Directory listings, folder covers, and breadcrumb trails.
//!
//! Read-only filesystem inspection: nothing here decodes a pixel or
//! writes a byte. The gallery's notion of an image is a regular file
//! with a `.jpg` or `.jpeg` extension, compared case-insensitively so
//! camera-cased `.JPG` trees work; everything else is invisible, as are
//! dotfiles.
//!
//! Entries are presented in lexical filename order, the same order the
//! cover search walks, so the cover a folder tile shows is always the
//! first image a visitor would reach by clicking into it.
//!
//! # Failure policy
//!
//! A directory that cannot be read (permissions, or deleted mid-walk)
//! contributes nothing. The cover search skips it and continues with
//! its siblings; listing it produces an empty page. No request dies on
//! a bad directory.

use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn has_jpeg_ext(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Find the representative image for a directory: the first image file
/// in a depth-first walk of its subtree, entries in lexical order.
///
/// The walk is lazy and stops at the first match, so a folder whose
/// first entry is an image costs one directory read no matter how deep
/// the tree goes below it. A subtree with no image at all is walked to
/// exhaustion and yields `None`.
pub fn find_cover(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry.path()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!("cover search skipping unreadable entry under {}: {err}", dir.display());
                None
            }
        })
        .find(|entry| entry.file_type().is_file() && has_jpeg_ext(entry.path()))
        .map(|entry| entry.into_path())
}

/// One entry of a directory listing.
#[derive(Debug, PartialEq, Eq)]
pub enum Entry {
    /// A subdirectory, with the root-relative path of its cover image
    /// when its subtree holds one.
    Folder {
        name: String,
        rel: String,
        cover: Option<String>,
    },
    /// An image file directly inside the directory.
    Image { name: String, rel: String },
}

/// A directory's contents in display order, ready for rendering.
#[derive(Debug)]
pub struct Listing {
    /// Path relative to the gallery root; empty for the root itself.
    pub rel: String,
    pub entries: Vec<Entry>,
}

/// List the directory at `rel` under `root`.
///
/// Subdirectories and image files appear interleaved in lexical order.
/// With `skip_empty` set, folders whose subtree contains no image are
/// omitted; otherwise they show as tiles without a cover.
pub fn list_dir(root: &Path, rel: &str, skip_empty: bool) -> Listing {
    let dir = if rel.is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    };

    let mut paths: Vec<PathBuf> = match std::fs::read_dir(&dir) {
        Ok(reader) => reader.filter_map(|entry| entry.ok()).map(|entry| entry.path()).collect(),
        Err(err) => {
            debug!("cannot list {}: {err}", dir.display());
            Vec::new()
        }
    };
    paths.sort();

    let mut entries = Vec::new();
    for path in paths {
        if is_hidden(&path) {
            continue;
        }
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        let entry_rel = if rel.is_empty() {
            name.clone()
        } else {
            format!("{rel}/{name}")
        };
        if path.is_dir() {
            let cover = find_cover(&path).and_then(|cover| rel_string(root, &cover));
            if cover.is_none() && skip_empty {
                continue;
            }
            entries.push(Entry::Folder {
                name,
                rel: entry_rel,
                cover,
            });
        } else if path.is_file() && has_jpeg_ext(&path) {
            entries.push(Entry::Image {
                name,
                rel: entry_rel,
            });
        }
    }

    Listing {
        rel: rel.to_string(),
        entries,
    }
}

/// `path` relative to `root`, joined with forward slashes.
fn rel_string(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// One step of a breadcrumb trail.
#[derive(Debug, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub href: String,
}

/// Breadcrumb trail for the listing at `rel`, root first.
///
/// The root crumb is labeled "Home" and links to `/`; every path
/// component after it adds one crumb linking to that component's own
/// listing. One crumb per component, so the trail is always exactly
/// `components + 1` long.
pub fn breadcrumbs(rel: &str) -> Vec<Crumb> {
    let mut crumbs = vec![Crumb {
        label: "Home".to_string(),
        href: "/".to_string(),
    }];
    let mut prefix = String::new();
    for part in rel.split('/').filter(|part| !part.is_empty()) {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(part);
        crumbs.push(Crumb {
            label: part.to_string(),
            href: format!("/{prefix}"),
        });
    }
    crumbs
}
