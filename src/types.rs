//! Contains the core value types shared across the crate.

use crate::{PalettizeError, MAX_K, MAX_PIXELS};
use palette::Srgb;
use std::ops::Deref;

#[cfg(feature = "image")]
use image::RgbImage;

/// An immutable 2D grid of RGB pixels with explicit dimensions.
///
/// The constructor enforces that `width * height` equals the buffer length,
/// so every `ImageBuffer` handed to the rest of the crate is well formed.
/// The crate never mutates an input buffer; operations always allocate
/// fresh output.
///
/// # Examples
/// ```
/// # use palettize::ImageBuffer;
/// # use palette::Srgb;
/// # fn main() -> Result<(), palettize::PalettizeError> {
/// let pixels = vec![Srgb::new(255u8, 0, 0); 6];
/// let image = ImageBuffer::new(pixels, 3, 2)?;
/// assert_eq!(image.num_pixels(), 6);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    /// The pixels in row-major order.
    pixels: Vec<Srgb<u8>>,
    /// The width in pixels.
    width: u32,
    /// The height in pixels.
    height: u32,
}

impl ImageBuffer {
    /// Creates an [`ImageBuffer`] from row-major `pixels` and its dimensions.
    ///
    /// # Errors
    /// Returns [`PalettizeError::DimensionMismatch`] if `width * height`
    /// does not equal `pixels.len()` or exceeds [`MAX_PIXELS`].
    pub fn new(pixels: Vec<Srgb<u8>>, width: u32, height: u32) -> Result<Self, PalettizeError> {
        let area = u64::from(width) * u64::from(height);
        if area == pixels.len() as u64 && area <= u64::from(MAX_PIXELS) {
            Ok(Self { pixels, width, height })
        } else {
            Err(PalettizeError::DimensionMismatch {
                len: pixels.len(),
                width,
                height,
            })
        }
    }

    /// The pixels in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[Srgb<u8>] {
        &self.pixels
    }

    /// The width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The total number of pixels (`width * height`).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn num_pixels(&self) -> u32 {
        self.pixels.len() as u32
    }
}

#[cfg(feature = "image")]
impl TryFrom<&RgbImage> for ImageBuffer {
    type Error = PalettizeError;

    fn try_from(image: &RgbImage) -> Result<Self, Self::Error> {
        let pixels = image
            .pixels()
            .map(|p| Srgb::new(p.0[0], p.0[1], p.0[2]))
            .collect();
        Self::new(pixels, image.width(), image.height())
    }
}

/// An ordered sequence of quantization target colors.
///
/// Order is significant: index `0` is the first caller-declared color, and
/// index order determines display order downstream. The constructor enforces
/// a length between `1` and [`MAX_COLORS`](crate::MAX_COLORS), the capacity
/// of 8-bit indexing.
///
/// # Examples
/// Use [`Palette::new`] or `try_into` to create a [`Palette`]:
/// ```
/// # use palettize::Palette;
/// # use palette::Srgb;
/// # fn main() -> Result<(), palettize::PalettizeError> {
/// let palette = Palette::new(vec![Srgb::new(0u8, 0, 0), Srgb::new(255, 255, 255)])?;
/// assert_eq!(palette.num_colors(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[repr(transparent)]
pub struct Palette(Vec<Srgb<u8>>);

impl Palette {
    /// Creates a [`Palette`] from the given colors.
    ///
    /// # Errors
    /// Returns [`PalettizeError::InvalidPaletteSize`] if `colors` is empty
    /// or holds more than [`MAX_COLORS`](crate::MAX_COLORS) entries.
    pub fn new(colors: Vec<Srgb<u8>>) -> Result<Self, PalettizeError> {
        if colors.is_empty() || colors.len() > MAX_K {
            Err(PalettizeError::InvalidPaletteSize(colors.len()))
        } else {
            Ok(Self(colors))
        }
    }

    /// Creates a [`Palette`] without checking its length.
    ///
    /// The caller must guarantee a length between `1` and `256`.
    pub(crate) fn new_unchecked(colors: Vec<Srgb<u8>>) -> Self {
        debug_assert!(!colors.is_empty() && colors.len() <= MAX_K);
        Self(colors)
    }

    /// The number of colors in the palette.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn num_colors(&self) -> u16 {
        self.0.len() as u16
    }

    /// Returns the inner `Vec` of colors.
    #[must_use]
    pub fn into_inner(self) -> Vec<Srgb<u8>> {
        self.0
    }
}

impl AsRef<[Srgb<u8>]> for Palette {
    fn as_ref(&self) -> &[Srgb<u8>] {
        self
    }
}

impl Deref for Palette {
    type Target = [Srgb<u8>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Palette> for Vec<Srgb<u8>> {
    fn from(val: Palette) -> Self {
        val.into_inner()
    }
}

impl TryFrom<Vec<Srgb<u8>>> for Palette {
    type Error = PalettizeError;

    fn try_from(colors: Vec<Srgb<u8>>) -> Result<Self, Self::Error> {
        Self::new(colors)
    }
}

/// An image stored as palette indices alongside the [`Palette`] it was
/// produced against.
///
/// Created only by [`quantize`](crate::quantize) (or the pipeline built on
/// it) and immutable afterwards. Every index is a valid index into
/// [`IndexedImage::palette`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    /// Palette indices in row-major order.
    indices: Vec<u8>,
    /// The palette the indices refer to.
    palette: Palette,
    /// The width in pixels.
    width: u32,
    /// The height in pixels.
    height: u32,
}

impl IndexedImage {
    /// Creates an [`IndexedImage`] without validating the indices.
    ///
    /// The caller must guarantee that every index is within the palette and
    /// that `indices.len() == width * height`.
    pub(crate) fn new_unchecked(
        indices: Vec<u8>,
        palette: Palette,
        width: u32,
        height: u32,
    ) -> Self {
        debug_assert_eq!(u64::from(width) * u64::from(height), indices.len() as u64);
        Self { indices, palette, width, height }
    }

    /// Palette indices in row-major order.
    #[must_use]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// The palette the indices refer to.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The total number of pixels (`width * height`).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn num_pixels(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Resolves every index back to its palette color, producing a flat
    /// pixel buffer in row-major order.
    #[must_use]
    pub fn to_pixels(&self) -> Vec<Srgb<u8>> {
        self.indices
            .iter()
            .map(|&i| self.palette[usize::from(i)])
            .collect()
    }

    /// Renders the indexed image to an [`RgbImage`] using the palette colors.
    #[cfg(feature = "image")]
    #[must_use]
    pub fn to_rgbimage(&self) -> RgbImage {
        let mut buf = Vec::with_capacity(self.indices.len() * 3);
        for &i in &self.indices {
            let color = self.palette[usize::from(i)];
            buf.extend_from_slice(&[color.red, color.green, color.blue]);
        }
        #[allow(clippy::expect_used)]
        RgbImage::from_raw(self.width, self.height, buf)
            .expect("buffer length matches dimensions")
    }
}
