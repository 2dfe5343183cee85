//! JSON loading utilities.
//!
//! Loaders parse the wire format (JSON arrays of dots or sites), report the
//! path of malformed entries and validate values before anything reaches the
//! engine.
//!
//! # Example
//!
//! ```no_run
//! use traffic_speed::io::loaders::DotLoader;
//! use std::path::Path;
//!
//! let dots = DotLoader::load_from_file(Path::new("dots.json"))
//!     .expect("Failed to load");
//! println!("Loaded {} dots", dots.len());
//! ```

pub mod loaders;


pub use loaders::{DotLoader, SiteLoader};
