//! HTML for listing pages.
//!
//! Each directory renders as one self-contained document: a fixed
//! navigation bar holding the breadcrumb trail, then a grid of square
//! tiles. Image tiles link to the full photo and use their thumbnail as
//! tile background; folder tiles link to the child listing and show the
//! folder's cover thumbnail behind its name.
//!
//! The stylesheet is embedded at compile time, except for the tile
//! geometry, which depends on the configured thumbnail size and is
//! generated per process.
//!
//! maud escapes interpolated text; URLs additionally percent-encode
//! each path segment so names with spaces survive the round trip.

use crate::browse::{Crumb, Entry, Listing, breadcrumbs};
use maud::{DOCTYPE, Markup, html};

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Tile geometry for the configured thumbnail edge length. The inner
/// label box is inset 10px on every side.
fn tile_css(size: u32) -> String {
    let inner = size.saturating_sub(20);
    format!(
        ".thumb {{ width: {size}px; height: {size}px; }}\n\
         .thumb-inner {{ width: {inner}px; height: {inner}px; }}"
    )
}

/// Percent-encode each segment of a path-shaped href, keeping the
/// slashes that separate them.
fn encode_href(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (css) }
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the fixed navigation bar with one link per crumb
fn nav_bar(crumbs: &[Crumb]) -> Markup {
    html! {
        div id="navigation" {
            @for crumb in crumbs {
                div.nav {
                    a href=(encode_href(&crumb.href)) { "•\u{a0}\u{a0}\u{a0}" (crumb.label) }
                }
            }
        }
    }
}

/// Renders one square tile of the listing grid
fn tile(entry: &Entry) -> Markup {
    match entry {
        Entry::Image { rel, .. } => {
            let background = background_style(rel);
            html! {
                a href=(encode_href(&format!("/image/{rel}"))) {
                    div.thumb style=(background) {
                        div.thumb-inner { p {} }
                    }
                }
            }
        }
        Entry::Folder { name, rel, cover } => {
            let background = cover.as_deref().map(background_style);
            html! {
                a href=(encode_href(&format!("/{rel}"))) {
                    div.thumb style=[background] {
                        div.thumb-inner { p { (name) } }
                    }
                }
            }
        }
    }
}

fn background_style(thumb_rel: &str) -> String {
    format!(
        "background-image:url(\"{}\");",
        encode_href(&format!("/thumb/{thumb_rel}"))
    )
}

// ============================================================================
// Page Renderer
// ============================================================================

/// Renders a complete listing page for `listing`.
pub fn render_listing(listing: &Listing, thumb_size: u32) -> Markup {
    let css = format!("{}\n\n{}", tile_css(thumb_size), CSS_STATIC);
    let crumbs = breadcrumbs(&listing.rel);
    let title = if listing.rel.is_empty() {
        "Home"
    } else {
        &listing.rel
    };

    let content = html! {
        (nav_bar(&crumbs))
        div id="content" {
            @for entry in &listing.entries {
                (tile(entry))
            }
        }
    };

    base_document(title, &css, content)
}

// ============================================================================
// Tests
// ============================================================================
