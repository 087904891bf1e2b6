//! Mapping image pixels onto palette entries.

use crate::{FloydSteinberg, ImageBuffer, IndexedImage, Palette, PalettizeError, MAX_K};
use palette::Srgb;
#[cfg(feature = "threads")]
use rayon::prelude::*;

/// Maps every pixel of `image` to its nearest entry of `palette`.
///
/// The nearest entry minimizes squared Euclidean distance in RGB space; ties
/// resolve to the lowest palette index, so the result is fully determined by
/// the inputs. With `dither` enabled, quantization error is diffused to
/// neighboring pixels in raster order using [`FloydSteinberg`] weights.
///
/// The input buffer is left untouched; the returned [`IndexedImage`] owns a
/// copy of the palette it was produced against.
///
/// # Errors
/// Returns [`PalettizeError::InvalidPaletteSize`] if `palette` is empty or
/// holds more than [`MAX_COLORS`](crate::MAX_COLORS) entries.
///
/// # Examples
/// ```
/// # use palettize::{quantize, ImageBuffer};
/// # use palette::Srgb;
/// # fn main() -> Result<(), palettize::PalettizeError> {
/// let image = ImageBuffer::new(vec![Srgb::new(10u8, 10, 10); 4], 2, 2)?;
/// let palette = [Srgb::new(0u8, 0, 0), Srgb::new(255u8, 255, 255)];
///
/// let indexed = quantize(&image, &palette, false)?;
/// assert_eq!(indexed.indices(), [0, 0, 0, 0]);
/// # Ok(())
/// # }
/// ```
pub fn quantize(
    image: &ImageBuffer,
    palette: &[Srgb<u8>],
    dither: bool,
) -> Result<IndexedImage, PalettizeError> {
    let palette = validate(palette)?;

    let indices = if dither {
        dithered_indices(image, &palette)
    } else {
        image
            .pixels()
            .iter()
            .map(|&pixel| nearest_index(&palette, pixel))
            .collect()
    };

    Ok(IndexedImage::new_unchecked(
        indices,
        palette,
        image.width(),
        image.height(),
    ))
}

/// Like [`quantize`], remapping rows in parallel.
///
/// Produces bit-identical output to [`quantize`]. Dithering propagates error
/// sequentially across the whole image, so with `dither` enabled the remap
/// runs on a single thread regardless.
///
/// # Errors
/// Returns [`PalettizeError::InvalidPaletteSize`] if `palette` is empty or
/// holds more than [`MAX_COLORS`](crate::MAX_COLORS) entries.
#[cfg(feature = "threads")]
pub fn quantize_par(
    image: &ImageBuffer,
    palette: &[Srgb<u8>],
    dither: bool,
) -> Result<IndexedImage, PalettizeError> {
    let palette = validate(palette)?;

    let indices = if dither {
        dithered_indices(image, &palette)
    } else {
        image
            .pixels()
            .par_iter()
            .map(|&pixel| nearest_index(&palette, pixel))
            .collect()
    };

    Ok(IndexedImage::new_unchecked(
        indices,
        palette,
        image.width(),
        image.height(),
    ))
}

/// Checks the palette length and clones it into an owned [`Palette`].
fn validate(palette: &[Srgb<u8>]) -> Result<Palette, PalettizeError> {
    if palette.is_empty() || palette.len() > MAX_K {
        Err(PalettizeError::InvalidPaletteSize(palette.len()))
    } else {
        Ok(Palette::new_unchecked(palette.to_vec()))
    }
}

/// Runs the error diffusion remap over the whole image.
fn dithered_indices(image: &ImageBuffer, palette: &Palette) -> Vec<u8> {
    let mut indices = vec![0u8; image.pixels().len()];
    FloydSteinberg::new().dither(palette, &mut indices, image.pixels(), image.width());
    indices
}

/// The index of the palette entry nearest to `pixel` by squared Euclidean
/// distance, ties resolving to the lowest index.
#[allow(clippy::cast_possible_truncation)]
fn nearest_index(palette: &[Srgb<u8>], pixel: Srgb<u8>) -> u8 {
    let mut min_index = 0;
    let mut min_distance = u32::MAX;
    for (i, entry) in palette.iter().enumerate() {
        let dr = i32::from(pixel.red) - i32::from(entry.red);
        let dg = i32::from(pixel.green) - i32::from(entry.green);
        let db = i32::from(pixel.blue) - i32::from(entry.blue);
        #[allow(clippy::cast_sign_loss)]
        let distance = (dr * dr + dg * dg + db * db) as u32;
        if distance < min_distance {
            min_distance = distance;
            min_index = i;
        }
    }
    min_index as u8
}
