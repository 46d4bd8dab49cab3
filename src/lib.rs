//! # banfinator
//!
//! Side-by-side JPEG combiner that keeps the photographers' credits. The
//! creator of each source image is read from its IPTC block (or, failing
//! that, from the EXIF Artist/Copyright tags), the two credits are merged
//! into one caption, and the caption is written back as IPTC into the
//! composed image.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use banfinator::compose::compose_side_by_side;
//! use banfinator::config::Config;
//! use banfinator::creator::Session;
//! use banfinator::exif::NomExifSource;
//! use banfinator::pipeline::{self, embed_caption, load_sides};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!     let left = PathBuf::from("left.jpg");
//!     let right = PathBuf::from("right.jpg");
//!
//!     // Extract both credits concurrently and merge them
//!     let mut session = Session::new(config.caption_policy);
//!     load_sides(
//!         &mut session,
//!         left.clone(),
//!         right.clone(),
//!         Arc::new(NomExifSource),
//!         config.exif_fallback,
//!     )
//!     .await?;
//!     println!("Caption: {}", session.caption());
//!
//!     // Compose, embed, write
//!     let composed = compose_side_by_side(
//!         &std::fs::read(&left)?,
//!         &std::fs::read(&right)?,
//!         &config.canvas,
//!         config.export.jpeg_quality,
//!     )?;
//!     let outcome = embed_caption(composed, session.caption());
//!     pipeline::write_output(config.export.file_name.as_ref(), &outcome.bytes).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! The IPTC layer works on plain byte slices:
//!
//! ```rust
//! use banfinator::creator::merge;
//! use banfinator::iptc;
//!
//! let jpeg = [0xFF, 0xD8, 0xFF, 0xD9];
//! let caption = merge("Jane Doe/TT", "John Smith/TT");
//!
//! let (tagged, truncation) = iptc::embed_creator(&jpeg, &caption).unwrap();
//! assert!(truncation.is_none());
//! assert_eq!(
//!     iptc::find_creator(&tagged).unwrap().as_deref(),
//!     Some("Jane Doe/John Smith/TT")
//! );
//! ```
//!
//! ## Modules
//!
//! - [`iptc`]: JPEG segments, Photoshop 8BIM resources and IPTC-IIM records
//! - [`creator`]: string cleaning, credit merging and the two-sided session
//! - [`exif`]: EXIF Artist/Copyright fallback
//! - [`pipeline`]: input checks, per-image extraction and export
//! - [`compose`]: side-by-side canvas
//! - [`config`]: configuration types and loading/saving
//! - [`error`]: library error type

pub mod compose;
pub mod config;
pub mod creator;
pub mod error;
pub mod exif;
pub mod iptc;
pub mod pipeline;

pub use error::{Error, Result};
