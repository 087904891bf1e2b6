//! A library for reducing images to small color palettes.
//!
//! `palettize` takes a decoded RGB image and maps every pixel onto a palette,
//! either one supplied by the caller or one derived from the image itself.
//! It can apply Floyd–Steinberg dithering during the remap and can summarize
//! the result into a per-palette-entry frequency table.
//!
//! All operations are deterministic: the same inputs always produce
//! bit-identical outputs, including the palette derived by [`reduce_palette`]
//! and the indices produced by [`quantize`].
//!
//! # Features
//! To reduce dependencies and compile times, `palettize` has several `cargo`
//! features that can be turned off or on:
//! - `pipelines`: exposes the [`QuantizePipeline`] builder that serves as the high-level API.
//! - `threads`: exposes parallel versions of some functions via [`rayon`].
//! - `image`: enables integration with the [`image`] crate.
//!
//! # High-Level API
//! To get started with the high-level API, see [`QuantizePipeline`].
//! Here is a quick example:
//! ```no_run
//! # use palettize::{ImageBuffer, QuantizePipeline, analyze_frequency};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("some image")?.into_rgb8();
//! let buffer = ImageBuffer::try_from(&img)?;
//!
//! let indexed = QuantizePipeline::new(&buffer)
//!     .palette_size(16) // derive a 16-color palette from the image
//!     .dither(true)
//!     .indexed()?;
//!
//! let frequencies = analyze_frequency(&indexed);
//! for entry in &frequencies {
//!     println!("color {}: {} pixels", entry.index, entry.count);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod color_counts;
mod dither;
mod error;
mod frequency;
mod hex;
mod kmeans;
mod remap;
mod types;

#[cfg(feature = "pipelines")]
mod api;

pub use color_counts::UniqueColorCounts;
pub use dither::FloydSteinberg;
pub use error::PalettizeError;
pub use frequency::{analyze_frequency, analyze_frequency_full, FrequencyEntry, FrequencyTable};
pub use hex::{hex_to_rgb, rgb_to_hex};
pub use kmeans::reduce_palette;
pub use remap::quantize;
#[cfg(feature = "threads")]
pub use remap::quantize_par;
pub use types::{ImageBuffer, IndexedImage, Palette};

#[cfg(feature = "pipelines")]
pub use api::QuantizePipeline;

/// The maximum supported image size in number of pixels is `u32::MAX`.
pub const MAX_PIXELS: u32 = u32::MAX;

/// The maximum supported number of palette colors is `256`.
pub const MAX_COLORS: u16 = u8::MAX as u16 + 1;

/// `MAX_COLORS` as a `usize` for array and `Vec` lengths.
pub(crate) const MAX_K: usize = MAX_COLORS as usize;
