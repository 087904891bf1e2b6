//! Summarizing indexed images into per-palette-entry frequencies.

use crate::{IndexedImage, MAX_K};
use palette::Srgb;
use std::ops::Deref;

/// One row of a [`FrequencyTable`]: a palette entry and its pixel count.
///
/// The color is copied straight from the palette the image was quantized
/// against, never re-derived from pixel data, so it always matches the
/// palette shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyEntry {
    /// The palette index this entry describes.
    pub index: u8,
    /// The canonical color of that palette index.
    pub color: Srgb<u8>,
    /// The number of pixels assigned to that index.
    pub count: u32,
}

/// Per-palette-entry pixel counts for an [`IndexedImage`].
///
/// Entries follow palette order, and the counts sum to the number of pixels
/// in the summarized image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable(Vec<FrequencyEntry>);

impl FrequencyTable {
    /// The sum of all entry counts.
    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.0.iter().map(|entry| entry.count).sum()
    }

    /// Returns the inner `Vec` of entries.
    #[must_use]
    pub fn into_inner(self) -> Vec<FrequencyEntry> {
        self.0
    }
}

impl Deref for FrequencyTable {
    type Target = [FrequencyEntry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a FrequencyTable {
    type Item = &'a FrequencyEntry;
    type IntoIter = std::slice::Iter<'a, FrequencyEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Counts the pixels assigned to each palette entry of `indexed`.
///
/// Palette entries no pixel was assigned to are omitted; use
/// [`analyze_frequency_full`] to report those as zero-count rows instead.
///
/// # Examples
/// ```
/// # use palettize::{analyze_frequency, quantize, ImageBuffer};
/// # use palette::Srgb;
/// # fn main() -> Result<(), palettize::PalettizeError> {
/// let image = ImageBuffer::new(vec![Srgb::new(250u8, 250, 250); 6], 3, 2)?;
/// let palette = [Srgb::new(0u8, 0, 0), Srgb::new(255u8, 255, 255)];
///
/// let table = analyze_frequency(&quantize(&image, &palette, false)?);
/// assert_eq!(table.len(), 1); // black went unused
/// assert_eq!(table[0].count, 6);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn analyze_frequency(indexed: &IndexedImage) -> FrequencyTable {
    FrequencyTable(
        entries(indexed)
            .filter(|entry| entry.count > 0)
            .collect(),
    )
}

/// Counts the pixels assigned to each palette entry of `indexed`, reporting
/// every entry of the palette including zero-count ones.
#[must_use]
pub fn analyze_frequency_full(indexed: &IndexedImage) -> FrequencyTable {
    FrequencyTable(entries(indexed).collect())
}

/// Tallies indices in a single pass and pairs each palette entry with its
/// count, in palette order.
fn entries(indexed: &IndexedImage) -> impl Iterator<Item = FrequencyEntry> + '_ {
    let mut counts = [0u32; MAX_K];
    for &index in indexed.indices() {
        counts[usize::from(index)] += 1;
    }

    indexed
        .palette()
        .iter()
        .enumerate()
        .map(move |(index, &color)| FrequencyEntry {
            #[allow(clippy::cast_possible_truncation)]
            index: index as u8,
            color,
            count: counts[index],
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::{quantize, tests::*, ImageBuffer};

    fn indexed_1024(palette_len: usize) -> IndexedImage {
        let image = ImageBuffer::new(test_data_1024(), 32, 32).unwrap();
        quantize(&image, &test_colors(palette_len, 21), false).unwrap()
    }

    #[test]
    fn counts_sum_to_pixel_count() {
        let indexed = indexed_1024(16);
        assert_eq!(analyze_frequency(&indexed).total_count(), 1024);
        assert_eq!(analyze_frequency_full(&indexed).total_count(), 1024);
    }

    #[test]
    fn entries_follow_palette_order_with_canonical_colors() {
        let indexed = indexed_1024(16);
        let table = analyze_frequency_full(&indexed);

        assert_eq!(table.len(), 16);
        for (i, entry) in table.iter().enumerate() {
            assert_eq!(usize::from(entry.index), i);
            assert_eq!(entry.color, indexed.palette()[i]);
        }
    }

    #[test]
    fn zero_count_entries_are_omitted_by_default() {
        // a tiny image cannot use all 200 palette entries
        let image = ImageBuffer::new(test_colors(4, 2), 2, 2).unwrap();
        let indexed = quantize(&image, &test_colors(200, 3), false).unwrap();

        let table = analyze_frequency(&indexed);
        assert!(table.len() <= 4);
        assert!(table.iter().all(|entry| entry.count > 0));
        assert_eq!(table.total_count(), 4);

        let full = analyze_frequency_full(&indexed);
        assert_eq!(full.len(), 200);
        assert_eq!(full.total_count(), 4);
    }

    #[test]
    fn counts_match_manual_tally() {
        let indexed = indexed_1024(8);
        let table = analyze_frequency_full(&indexed);

        let mut expected = vec![0u32; 8];
        for &i in indexed.indices() {
            expected[usize::from(i)] += 1;
        }
        let actual = table.iter().map(|entry| entry.count).collect::<Vec<_>>();
        assert_eq!(expected, actual);
    }
}
