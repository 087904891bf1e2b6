//! Contains the builder struct that serves as the high-level API.

use crate::{
    analyze_frequency, quantize, reduce_palette, FrequencyTable, ImageBuffer, IndexedImage,
    Palette, PalettizeError, MAX_COLORS,
};

#[cfg(feature = "threads")]
use crate::quantize_par;

/// A builder for quantizing an image in one go.
///
/// The pipeline remaps an [`ImageBuffer`] onto either an explicit [`Palette`]
/// or one derived from the image itself via [`reduce_palette`].
///
/// # Examples
/// ```
/// # use palettize::{ImageBuffer, QuantizePipeline};
/// # use palette::Srgb;
/// # fn main() -> Result<(), palettize::PalettizeError> {
/// let image = ImageBuffer::new(vec![Srgb::new(123u8, 45, 67); 16], 4, 4)?;
///
/// let (indexed, frequencies) = QuantizePipeline::new(&image)
///     .palette_size(4)
///     .dither(false)
///     .indexed_with_frequency()?;
///
/// assert_eq!(indexed.palette().num_colors(), 4);
/// assert_eq!(frequencies.total_count(), 16);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct QuantizePipeline<'a> {
    /// The image to quantize.
    image: &'a ImageBuffer,
    /// An explicit target palette, taking precedence over `palette_size`.
    palette: Option<Palette>,
    /// The number of colors to derive when no explicit palette is set.
    palette_size: u16,
    /// Whether to apply Floyd–Steinberg dithering during the remap.
    dither: bool,
}

impl<'a> QuantizePipeline<'a> {
    /// Creates a new [`QuantizePipeline`] for the given image.
    ///
    /// By default, a palette of [`MAX_COLORS`] colors is derived from the
    /// image and dithering is enabled.
    #[must_use]
    pub fn new(image: &'a ImageBuffer) -> Self {
        Self {
            image,
            palette: None,
            palette_size: MAX_COLORS,
            dither: true,
        }
    }

    /// Sets an explicit target palette, overriding any configured size.
    #[must_use]
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    /// Sets the number of colors to derive when no explicit palette is set.
    #[must_use]
    pub fn palette_size(mut self, size: u16) -> Self {
        self.palette_size = size;
        self
    }

    /// Sets whether to apply Floyd–Steinberg dithering during the remap.
    #[must_use]
    pub fn dither(mut self, dither: bool) -> Self {
        self.dither = dither;
        self
    }

    /// Resolves the target palette, deriving one if none was set explicitly.
    fn target_palette(&self) -> Result<Palette, PalettizeError> {
        match &self.palette {
            Some(palette) => Ok(palette.clone()),
            None => reduce_palette(self.image, self.palette_size),
        }
    }

    /// Runs the pipeline, producing an [`IndexedImage`].
    ///
    /// # Errors
    /// Returns [`PalettizeError::InvalidPaletteSize`] if the configured
    /// palette size is `0` or exceeds [`MAX_COLORS`].
    pub fn indexed(self) -> Result<IndexedImage, PalettizeError> {
        let palette = self.target_palette()?;
        quantize(self.image, &palette, self.dither)
    }

    /// Runs the pipeline in parallel, producing an [`IndexedImage`]
    /// bit-identical to the one [`QuantizePipeline::indexed`] returns.
    ///
    /// # Errors
    /// Returns [`PalettizeError::InvalidPaletteSize`] if the configured
    /// palette size is `0` or exceeds [`MAX_COLORS`].
    #[cfg(feature = "threads")]
    pub fn indexed_par(self) -> Result<IndexedImage, PalettizeError> {
        let palette = self.target_palette()?;
        quantize_par(self.image, &palette, self.dither)
    }

    /// Runs the pipeline, producing an [`IndexedImage`] along with its
    /// frequency table.
    ///
    /// # Errors
    /// Returns [`PalettizeError::InvalidPaletteSize`] if the configured
    /// palette size is `0` or exceeds [`MAX_COLORS`].
    pub fn indexed_with_frequency(self) -> Result<(IndexedImage, FrequencyTable), PalettizeError> {
        let indexed = self.indexed()?;
        let frequencies = analyze_frequency(&indexed);
        Ok((indexed, frequencies))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::tests::*;
    use palette::Srgb;

    #[test]
    fn derives_palette_when_none_is_set() {
        let image = ImageBuffer::new(test_data_1024(), 32, 32).unwrap();
        let indexed = QuantizePipeline::new(&image)
            .palette_size(8)
            .indexed()
            .unwrap();

        assert_eq!(indexed.palette().num_colors(), 8);
        assert_eq!(indexed.num_pixels(), 1024);
    }

    #[test]
    fn explicit_palette_takes_precedence() {
        let image = ImageBuffer::new(test_data_1024(), 32, 32).unwrap();
        let palette = Palette::new(test_colors(3, 17)).unwrap();

        let indexed = QuantizePipeline::new(&image)
            .palette_size(64)
            .palette(palette.clone())
            .dither(false)
            .indexed()
            .unwrap();

        assert_eq!(indexed.palette(), &palette);
    }

    #[test]
    fn invalid_size_surfaces_from_reduction() {
        let image = ImageBuffer::new(test_data_1024(), 32, 32).unwrap();
        let result = QuantizePipeline::new(&image).palette_size(0).indexed();
        assert_eq!(result, Err(PalettizeError::InvalidPaletteSize(0)));
    }

    #[test]
    fn frequency_table_matches_remap() {
        let image = ImageBuffer::new(vec![Srgb::new(200u8, 20, 20); 64], 8, 8).unwrap();
        let (indexed, frequencies) = QuantizePipeline::new(&image)
            .palette_size(2)
            .dither(false)
            .indexed_with_frequency()
            .unwrap();

        assert_eq!(frequencies.total_count(), indexed.num_pixels());
    }
}
