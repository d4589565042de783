//! # Live Gal
//!
//! A minimal HTTP server that turns a folder tree of JPEG photos into a
//! browsable gallery. Your filesystem is the gallery: directories become
//! pages of square tiles, images link to their full-resolution selves,
//! and folders wear the first image of their subtree as a cover.
//!
//! # Architecture: Serve, Don't Build
//!
//! Nothing is generated ahead of time and nothing is written to disk.
//! Every page is rendered from the live filesystem at request time, and
//! thumbnails are materialized on first demand:
//!
//! ```text
//! GET /trip          →  read_dir → covers → HTML       (browse + pages)
//! GET /thumb/a.jpg   →  cache hit | decode + resize    (thumbs + cache)
//! GET /image/a.jpg   →  decode → re-encode             (imaging)
//! ```
//!
//! Restarting the process loses only thumbnails, which re-render on the
//! next visit. Editing the photo tree needs no rebuild step at all.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`cache`] | Fixed-capacity thumbnail ring with insertion-order eviction |
//! | [`thumbs`] | Get-or-create thumbnail service with a per-key render guard |
//! | [`imaging`] | JPEG decode, encode, and square-thumbnail resize |
//! | [`browse`] | Directory listings, folder covers, breadcrumb trails |
//! | [`pages`] | Maud-rendered listing pages with embedded CSS |
//! | [`server`] | Thread-per-connection HTTP front end and routing |
//!
//! # Design Decisions
//!
//! ## FIFO, Not LRU
//!
//! The thumbnail cache evicts in plain insertion order ([`cache`]). A
//! lookup never promotes an entry, so hot thumbnails age out exactly as
//! fast as cold ones. LRU would serve skewed traffic better, but the
//! ring keeps the read path mutation-free and memory exactly bounded,
//! and a gallery's working set is one page of thumbnails at a time, so
//! capacity does the real work that recency would.
//!
//! ## One Render Per Key
//!
//! A gallery page fires a volley of thumbnail requests, and a popular
//! page fires the same volley from several visitors at once. The
//! [`thumbs`] service keeps a registry of in-flight keys so concurrent
//! misses on one path decode once and share the result, while distinct
//! paths render in parallel.
//!
//! ## Errors Stay Inside the Request
//!
//! A missing file answers 404, an undecodable one answers 500, and the
//! server moves on. One corrupt JPEG in a folder of thousands costs one
//! broken tile, never the process.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): malformed
//! markup is a compile error, interpolation is auto-escaped, and there
//! is no template directory to ship or get out of sync.

pub mod browse;
pub mod cache;
pub mod imaging;
pub mod pages;
pub mod server;
pub mod thumbs;

#[cfg(test)]
pub(crate) mod test_helpers;
