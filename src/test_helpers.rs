//! Shared test utilities for the live-gal test suite.
//!
//! Gallery fixtures are generated at runtime: tests lay out a directory
//! tree in a [`tempfile::TempDir`] and fill it with small synthetic
//! JPEGs, so nothing binary is checked in.

use image::{ImageEncoder, RgbImage};
use std::path::Path;

use crate::browse::{Entry, Listing};

// =========================================================================
// Fixture files
// =========================================================================

/// Write a small valid JPEG with the given dimensions, creating parent
/// directories as needed.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write an empty file, creating parent directories as needed. For tests
/// that only care about names and extensions, not pixel content.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"").unwrap();
}

// =========================================================================
// Listing lookups, panicking with a clear message on miss
// =========================================================================

/// Names of all listing entries in display order.
pub fn entry_names(listing: &Listing) -> Vec<&str> {
    listing.entries.iter().map(entry_name).collect()
}

/// Find a listing entry by name. Panics if not found.
pub fn find_entry<'a>(listing: &'a Listing, name: &str) -> &'a Entry {
    listing
        .entries
        .iter()
        .find(|entry| entry_name(entry) == name)
        .unwrap_or_else(|| {
            let names = entry_names(listing);
            panic!("entry '{name}' not found. Available: {names:?}")
        })
}

fn entry_name(entry: &Entry) -> &str {
    match entry {
        Entry::Folder { name, .. } => name,
        Entry::Image { name, .. } => name,
    }
}
