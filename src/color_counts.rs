//! Contains the code for color deduplication used by palette reduction.

use crate::ImageBuffer;
use palette::Srgb;

/// Packs a color into a single `u32` key (`0x00RRGGBB`).
#[inline]
const fn pack(color: Srgb<u8>) -> u32 {
    (color.red as u32) << 16 | (color.green as u32) << 8 | color.blue as u32
}

/// Unpacks a `0x00RRGGBB` key back into a color.
#[inline]
#[allow(clippy::cast_possible_truncation)]
const fn unpack(key: u32) -> Srgb<u8> {
    Srgb::new((key >> 16) as u8, (key >> 8) as u8, key as u8)
}

/// The distinct colors of an image and the number of pixels holding each.
///
/// Colors are stored in ascending packed RGB order (`0x00RRGGBB`), so the
/// result is fully determined by the multiset of pixels in the image.
/// Deduplicating first makes the iterative steps of
/// [`reduce_palette`](crate::reduce_palette) proportional to the number of
/// distinct colors rather than the number of pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueColorCounts {
    /// The distinct colors, ascending by packed RGB key.
    colors: Vec<Srgb<u8>>,
    /// The number of pixels holding each color in `colors`.
    counts: Vec<u32>,
    /// The number of pixels in the source image.
    total_count: u32,
}

impl UniqueColorCounts {
    /// Deduplicates the pixels of `image` into distinct colors with counts.
    #[must_use]
    pub fn new(image: &ImageBuffer) -> Self {
        let mut keys = image.pixels().iter().copied().map(pack).collect::<Vec<_>>();
        keys.sort_unstable();

        let mut colors = Vec::new();
        let mut counts: Vec<u32> = Vec::new();
        for &key in &keys {
            match counts.last_mut() {
                Some(count) if colors.last() == Some(&unpack(key)) => *count += 1,
                _ => {
                    colors.push(unpack(key));
                    counts.push(1);
                }
            }
        }

        Self {
            colors,
            counts,
            total_count: image.num_pixels(),
        }
    }

    /// The distinct colors, ascending by packed RGB key.
    #[must_use]
    pub fn colors(&self) -> &[Srgb<u8>] {
        &self.colors
    }

    /// The number of pixels holding each color in [`UniqueColorCounts::colors`].
    ///
    /// Has the same length as `colors`, and every count is nonzero.
    #[must_use]
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// The number of pixels in the source image (the sum of all counts).
    #[must_use]
    pub const fn total_count(&self) -> u32 {
        self.total_count
    }

    /// The number of distinct colors.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn num_colors(&self) -> u32 {
        self.colors.len() as u32
    }

    /// The number of distinct colors as a `usize`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the source image was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
