//! In-memory thumbnail ring with insertion-order eviction.
//!
//! Rendering a thumbnail means decoding a full-size JPEG and resampling
//! it, which dwarfs every other cost in serving a gallery page. This
//! module keeps the most recently rendered thumbnails in memory so a
//! page revisit serves pixels without touching the decoder.
//!
//! # Design
//!
//! The cache is a fixed array of slots plus a write cursor. Inserting
//! always overwrites the slot under the cursor and advances it, wrapping
//! at the end. Entries therefore age out strictly in the order they were
//! inserted.
//!
//! A lookup never moves an entry. A thumbnail requested on every page
//! view is evicted at the same age as one requested once, which
//! under-serves hot entries compared to LRU. In exchange, eviction is a
//! cursor bump, the read path mutates nothing, and memory stays exactly
//! `capacity` images regardless of access pattern.
//!
//! ## Duplicate keys
//!
//! Nothing stops the same key from occupying two slots: the caller can
//! insert a key again after its first copy was presumed evicted, and
//! insertion never scans for an existing copy. Lookups resolve the
//! ambiguity by slot order: the match in the lowest-numbered slot wins.
//! For copies inserted back to back that is the earlier insert.
//!
//! Synchronization is the caller's job ([`Thumbnailer`] wraps this type
//! in a mutex); the cache itself is single-threaded state.
//!
//! [`Thumbnailer`]: crate::thumbs::Thumbnailer

use image::DynamicImage;
use std::sync::Arc;

/// One cached thumbnail: the cache key and the rendered pixels.
///
/// The image sits behind an `Arc` so a hit hands out a handle rather
/// than a copy of the pixel buffer.
struct Thumb {
    key: String,
    image: Arc<DynamicImage>,
}

/// Fixed-capacity thumbnail store with first-in-first-out eviction.
pub struct ThumbCache {
    slots: Vec<Option<Thumb>>,
    cursor: usize,
}

impl ThumbCache {
    /// Create a cache with `capacity` slots, all empty.
    ///
    /// A capacity of zero is raised to one so the ring always has a slot
    /// to write into.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            cursor: 0,
        }
    }

    /// Number of slots, occupied or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find a thumbnail by exact key.
    ///
    /// Scans slots in index order and returns a handle to the first
    /// match. Does not touch the cursor or the entry's position.
    pub fn lookup(&self, key: &str) -> Option<Arc<DynamicImage>> {
        self.slots
            .iter()
            .flatten()
            .find(|thumb| thumb.key == key)
            .map(|thumb| Arc::clone(&thumb.image))
    }

    /// Store a thumbnail in the slot under the cursor and advance it.
    ///
    /// Unconditional: whatever the slot held is dropped, matching key or
    /// not, and no other slot is examined.
    pub fn insert(&mut self, key: String, image: Arc<DynamicImage>) {
        self.slots[self.cursor] = Some(Thumb { key, image });
        self.cursor = (self.cursor + 1) % self.slots.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A distinguishable image: dimensions encode an id.
    fn img(id: u32) -> Arc<DynamicImage> {
        Arc::new(DynamicImage::new_rgb8(id, 1))
    }

    fn width_of(cache: &ThumbCache, key: &str) -> Option<u32> {
        cache.lookup(key).map(|image| image.width())
    }

    // ---- Construction ----

    #[test]
    fn fresh_cache_is_empty_and_misses() {
        let cache = ThumbCache::new(4);
        assert_eq!(cache.capacity(), 4);
        assert!(cache.is_empty());
        assert!(cache.lookup("anything").is_none());
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut cache = ThumbCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert("a".into(), img(1));
        assert!(cache.lookup("a").is_some());
    }

    // ---- Lookup and insert ----

    #[test]
    fn insert_then_lookup_returns_the_image() {
        let mut cache = ThumbCache::new(4);
        cache.insert("trip/a.jpg".into(), img(10));
        assert_eq!(width_of(&cache, "trip/a.jpg"), Some(10));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn lookup_is_exact_match_only() {
        let mut cache = ThumbCache::new(4);
        cache.insert("trip/a.jpg".into(), img(10));
        assert!(cache.lookup("trip/A.jpg").is_none());
        assert!(cache.lookup("trip/a").is_none());
    }

    #[test]
    fn lookup_hands_out_a_shared_handle() {
        let mut cache = ThumbCache::new(2);
        let stored = img(5);
        cache.insert("k".into(), Arc::clone(&stored));
        let hit = cache.lookup("k").unwrap();
        assert!(Arc::ptr_eq(&stored, &hit));
    }

    // ---- Eviction order ----

    #[test]
    fn filling_capacity_evicts_nothing() {
        for capacity in [1, 2, 5, 8] {
            let mut cache = ThumbCache::new(capacity);
            for i in 0..capacity {
                cache.insert(format!("k{i}"), img(i as u32 + 1));
            }
            for i in 0..capacity {
                assert!(
                    cache.lookup(&format!("k{i}")).is_some(),
                    "k{i} evicted early at capacity {capacity}"
                );
            }
        }
    }

    #[test]
    fn insert_beyond_capacity_evicts_oldest_first() {
        for capacity in [1, 2, 5, 8] {
            let mut cache = ThumbCache::new(capacity);
            for i in 0..=capacity {
                cache.insert(format!("k{i}"), img(i as u32 + 1));
            }
            assert!(
                cache.lookup("k0").is_none(),
                "oldest entry survived at capacity {capacity}"
            );
            for i in 1..=capacity {
                assert!(cache.lookup(&format!("k{i}")).is_some());
            }
        }
    }

    #[test]
    fn lookup_does_not_refresh_eviction_order() {
        let mut cache = ThumbCache::new(2);
        cache.insert("a".into(), img(1));
        cache.insert("b".into(), img(2));

        // Touch "a" repeatedly; under LRU this would protect it.
        for _ in 0..5 {
            assert!(cache.lookup("a").is_some());
        }

        cache.insert("c".into(), img(3));
        assert!(cache.lookup("a").is_none(), "hit refreshed a FIFO entry");
        assert!(cache.lookup("b").is_some());
        assert!(cache.lookup("c").is_some());
    }

    #[test]
    fn full_cycle_replaces_every_entry() {
        let mut cache = ThumbCache::new(3);
        for i in 0..3 {
            cache.insert(format!("old{i}"), img(1));
        }
        for i in 0..3 {
            cache.insert(format!("new{i}"), img(2));
        }
        for i in 0..3 {
            assert!(cache.lookup(&format!("old{i}")).is_none());
            assert!(cache.lookup(&format!("new{i}")).is_some());
        }
    }

    // ---- Duplicate keys ----

    #[test]
    fn duplicate_key_lookup_prefers_lowest_slot() {
        let mut cache = ThumbCache::new(4);
        cache.insert("k".into(), img(1));
        cache.insert("k".into(), img(2));
        // Both copies resident; slot order resolves the tie.
        assert_eq!(width_of(&cache, "k"), Some(1));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn duplicate_key_survives_eviction_of_first_copy() {
        let mut cache = ThumbCache::new(2);
        cache.insert("k".into(), img(1));
        cache.insert("k".into(), img(2));
        cache.insert("other".into(), img(3)); // overwrites the first copy
        assert_eq!(width_of(&cache, "k"), Some(2));
    }
}
