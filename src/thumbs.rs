//! Get-or-create thumbnail service on top of the ring cache.
//!
//! [`Thumbnailer`] is the one piece of state every request thread
//! shares. Two locks keep that workable without funneling the whole
//! server through a single decode:
//!
//! - the ring cache sits behind a mutex held only to look up or insert,
//!   never while pixels are decoded or resized;
//! - an in-flight registry hands out one gate per cache key, so
//!   concurrent misses on the same path render once while requests for
//!   other paths run untouched.
//!
//! A thread that loses the race to render re-checks the cache after the
//! gate opens and leaves with the winner's handle. Every exit drops the
//! registry entry only while it still holds that thread's own gate, so
//! a late release never unseats a newer gate for the same key.
//!
//! Rendering itself sits behind [`ThumbRenderer`] so tests can count
//! renders without decoding anything.

use crate::cache::ThumbCache;
use crate::imaging::{self, ImagingError};
use image::DynamicImage;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Renders a source file into a square thumbnail image.
pub trait ThumbRenderer: Send + Sync {
    fn render(&self, source: &Path, size: u32) -> Result<DynamicImage, ImagingError>;
}

/// Production renderer: decode the JPEG at `source`, scale and crop to
/// a square.
pub struct JpegRenderer;

impl ThumbRenderer for JpegRenderer {
    fn render(&self, source: &Path, size: u32) -> Result<DynamicImage, ImagingError> {
        let img = imaging::load_jpeg(source)?;
        Ok(imaging::square_thumb(&img, size))
    }
}

/// Shared thumbnail service: ring cache plus per-key render
/// serialization.
pub struct Thumbnailer<R = JpegRenderer> {
    renderer: R,
    size: u32,
    cache: Mutex<ThumbCache>,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Thumbnailer<JpegRenderer> {
    /// Service with the production JPEG renderer.
    pub fn new(capacity: usize, size: u32) -> Self {
        Self::with_renderer(JpegRenderer, capacity, size)
    }
}

impl<R: ThumbRenderer> Thumbnailer<R> {
    pub fn with_renderer(renderer: R, capacity: usize, size: u32) -> Self {
        Self {
            renderer,
            size,
            cache: Mutex::new(ThumbCache::new(capacity)),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Thumbnail edge length in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Return the thumbnail for `source`, rendering and caching it on a
    /// miss.
    ///
    /// `key` is the normalized root-relative path that identifies the
    /// thumbnail in the cache; `source` is where the bytes live on disk.
    /// Concurrent calls with the same key render at most once; the rest
    /// wait and share the result.
    pub fn get_or_create(
        &self,
        key: &str,
        source: &Path,
    ) -> Result<Arc<DynamicImage>, ImagingError> {
        if let Some(hit) = self.cache.lock().lookup(key) {
            debug!("thumb cache hit: {key}");
            return Ok(hit);
        }

        let gate = self.gate_for(key);
        let _turn = gate.lock();

        // Another request may have rendered this key while we queued.
        if let Some(hit) = self.cache.lock().lookup(key) {
            debug!("thumb cache hit after wait: {key}");
            self.release_gate(key, &gate);
            return Ok(hit);
        }

        debug!("thumb cache miss, rendering: {key}");
        let image = match self.renderer.render(source, self.size) {
            Ok(rendered) => Arc::new(rendered),
            Err(err) => {
                self.release_gate(key, &gate);
                return Err(err);
            }
        };
        self.cache.lock().insert(key.to_owned(), Arc::clone(&image));
        self.release_gate(key, &gate);
        Ok(image)
    }

    /// The gate serializing renders of `key`, created on first demand.
    fn gate_for(&self, key: &str) -> Arc<Mutex<()>> {
        Arc::clone(self.in_flight.lock().entry(key.to_owned()).or_default())
    }

    /// Drop `key`'s registry entry if it still points at `gate`. A late
    /// release must not remove a newer gate installed for the same key.
    fn release_gate(&self, key: &str, gate: &Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock();
        if in_flight.get(key).is_some_and(|current| Arc::ptr_eq(current, gate)) {
            in_flight.remove(key);
        }
    }
}
