use clap::Parser;
use live_gal::server::{Gallery, Settings, run};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "live-gal")]
#[command(about = "Serve a folder tree of JPEG photos as a browsable gallery")]
#[command(long_about = "\
Serve a folder tree of JPEG photos as a browsable gallery

Your filesystem is the gallery. Point live-gal at a directory and every
subdirectory becomes a page of square tiles: images link to the full
photo, folders link deeper and wear the first image of their subtree as
a cover. Thumbnails are rendered on demand and kept in a fixed-size
in-memory cache; nothing is written to disk.

  photos/                        → /
  ├── 2019/                      → /2019
  │   ├── 001.jpg                  (cover of 2019/)
  │   └── winter/                → /2019/winter
  │       └── 042.jpg
  └── portraits/                 → /portraits
      └── anna.jpg               → /image/portraits/anna.jpg

Only .jpg/.jpeg files are served. Set RUST_LOG=debug to watch cache
hits and misses.")]
#[command(version)]
struct Cli {
    /// Directory to serve
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Address and port to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Thumbnails kept in memory before the oldest is evicted
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u32).range(1..))]
    cache_size: u32,

    /// Thumbnail edge length in pixels
    #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(u32).range(1..))]
    thumb_size: u32,

    /// Omit folders whose subtree contains no image
    #[arg(long)]
    skip_empty_dirs: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let listener = TcpListener::bind(&cli.bind)?;
    log::info!(
        "serving {} on http://{}",
        cli.root.display(),
        listener.local_addr()?
    );

    let gallery = Arc::new(Gallery::new(Settings {
        root: cli.root,
        cache_capacity: cli.cache_size as usize,
        thumb_size: cli.thumb_size,
        skip_empty_dirs: cli.skip_empty_dirs,
    }));
    run(gallery, listener)?;
    Ok(())
}
