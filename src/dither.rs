//! Contains the error diffusion dither implementation.

use crate::MAX_K;
use palette::Srgb;

/// Floyd–Steinberg dithering.
///
/// Pixels are processed in raster order (left-to-right, top-to-bottom) and
/// the quantization error of each pixel is diffused to its not-yet-processed
/// neighbors with the classic 7/16, 3/16, 5/16, 1/16 weights.
#[derive(Debug, Clone, Copy)]
pub struct FloydSteinberg(f32);

impl FloydSteinberg {
    /// The default error diffusion factor.
    ///
    /// A factor of `1.0` diffuses all of the error to the neighboring pixels.
    pub const DEFAULT_ERROR_DIFFUSION: f32 = 1.0;

    /// Creates a new [`FloydSteinberg`] with the default error diffusion factor.
    #[must_use]
    pub const fn new() -> Self {
        Self(Self::DEFAULT_ERROR_DIFFUSION)
    }

    /// Creates a new [`FloydSteinberg`] with the given error diffusion factor.
    ///
    /// This will return `None` if `error_diffusion` is not in the range `0.0..=1.0`.
    #[must_use]
    pub fn with_error_diffusion(error_diffusion: f32) -> Option<Self> {
        if (0.0..=1.0).contains(&error_diffusion) {
            Some(Self(error_diffusion))
        } else {
            None
        }
    }

    /// Gets the error diffusion factor for this [`FloydSteinberg`].
    #[must_use]
    pub const fn error_diffusion(&self) -> f32 {
        self.0
    }
}

impl Default for FloydSteinberg {
    fn default() -> Self {
        Self::new()
    }
}

/// The index and components of the palette entry nearest to `point` by
/// squared Euclidean distance, ties resolving to the lowest index.
#[allow(clippy::cast_possible_truncation)]
fn nearest_entry(palette: &[[f32; 3]], point: [f32; 3]) -> (u8, [f32; 3]) {
    let mut min_index = 0;
    let mut min_distance = f32::INFINITY;
    for (i, entry) in palette.iter().enumerate() {
        let mut distance = 0.0;
        for c in 0..3 {
            let d = point[c] - entry[c];
            distance += d * d;
        }
        if distance < min_distance {
            min_distance = distance;
            min_index = i;
        }
    }
    (min_index as u8, palette[min_index])
}

/// Propagates, stores, and applies the dither error to the pixels.
///
/// Holds the propagated error for the current and the next row, with one
/// padding cell on each side so edge pixels need no bounds checks.
struct ErrorBuf<'a> {
    /// The propagated error for the current row of pixels.
    this_err: &'a mut [[f32; 3]],
    /// The propagated error for the next row of pixels.
    next_err: &'a mut [[f32; 3]],
}

impl<'a> ErrorBuf<'a> {
    /// Create the backing buffer for a new `ErrorBuf`.
    fn new_buf(width: usize) -> Vec<[f32; 3]> {
        vec![[0.0; 3]; 2 * (width + 2)]
    }

    /// Create a new `ErrorBuf` using the given `buf`.
    fn new(width: usize, buf: &'a mut [[f32; 3]]) -> Self {
        let (this_err, next_err) = buf.split_at_mut(width + 2);
        Self { this_err, next_err }
    }

    /// Diffuse the error of pixel `i` to its right and below neighbors.
    #[inline]
    fn propagate(&mut self, i: usize, err: [f32; 3]) {
        for c in 0..3 {
            self.this_err[i + 2][c] += 7.0 / 16.0 * err[c];
            self.next_err[i][c] += 3.0 / 16.0 * err[c];
            self.next_err[i + 1][c] += 5.0 / 16.0 * err[c];
            self.next_err[i + 2][c] += 1.0 / 16.0 * err[c];
        }
    }

    /// Add the accumulated error for pixel `i` to `point`.
    #[inline]
    fn apply(&self, i: usize, point: &mut [f32; 3]) {
        let err = self.this_err[i + 1];
        for c in 0..3 {
            point[c] += err[c];
        }
    }

    /// Swap and reset the error buffers for the next row of pixels.
    #[inline]
    fn next_row(&mut self) {
        std::mem::swap(&mut self.this_err, &mut self.next_err);
        self.next_err.fill([0.0; 3]);
    }
}

impl FloydSteinberg {
    /// Remaps `original_colors` onto `palette`, writing an index per pixel
    /// into `indices` while diffusing quantization error in raster order.
    ///
    /// Each pixel has the propagated error added, is clamped to `[0, 255]`
    /// per channel, and is matched to the nearest palette entry with ties
    /// resolving to the lowest index. The scratch error state lives only for
    /// the duration of the call.
    ///
    /// At most [`MAX_COLORS`](crate::MAX_COLORS) palette entries are
    /// considered; entries beyond that are ignored so every written index
    /// refers to an actual palette entry.
    pub fn dither(
        &self,
        palette: &[Srgb<u8>],
        indices: &mut [u8],
        original_colors: &[Srgb<u8>],
        width: u32,
    ) {
        let &FloydSteinberg(diffusion) = self;

        if palette.is_empty() || original_colors.is_empty() || width == 0 {
            return;
        }

        let palette = &palette[..palette.len().min(MAX_K)];
        let palette = palette
            .iter()
            .map(|c| [f32::from(c.red), f32::from(c.green), f32::from(c.blue)])
            .collect::<Vec<_>>();

        let width = width as usize;
        let mut buf = ErrorBuf::new_buf(width);
        let mut error = ErrorBuf::new(width, &mut buf);

        for (indices, colors) in indices
            .chunks_exact_mut(width)
            .zip(original_colors.chunks_exact(width))
        {
            for (i, (index, &color)) in indices.iter_mut().zip(colors).enumerate() {
                let mut point = [
                    f32::from(color.red),
                    f32::from(color.green),
                    f32::from(color.blue),
                ];
                error.apply(i, &mut point);
                let point = point.map(|c| c.clamp(0.0, 255.0));

                let (nearest_index, nearest_point) = nearest_entry(&palette, point);
                *index = nearest_index;

                let err = std::array::from_fn(|c| diffusion * (point[c] - nearest_point[c]));
                error.propagate(i, err);
            }

            error.next_row();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn empty_inputs() {
        let ditherer = FloydSteinberg::new();

        ditherer.dither(&[], &mut [], &[], 0);

        let colors = test_data_1024();
        #[allow(clippy::cast_possible_truncation)]
        let width = colors.len() as u32;
        ditherer.dither(&[], &mut [], &colors, width);
    }

    #[test]
    fn zero_diffusion_is_plain_nearest() {
        let ditherer = FloydSteinberg::with_error_diffusion(0.0).unwrap();
        let palette = [Srgb::new(0u8, 0, 0), Srgb::new(255u8, 255, 255)];
        let colors = vec![Srgb::new(100u8, 100, 100); 64];

        let mut indices = vec![u8::MAX; 64];
        ditherer.dither(&palette, &mut indices, &colors, 8);
        // 100 is nearer to black, and with no diffusion every pixel matches alike
        assert_eq!(indices, vec![0; 64]);
    }

    #[test]
    fn exact_match_image_unaffected() {
        let ditherer = FloydSteinberg::new();

        // distinct by construction: the red channel enumerates all 256 values
        let palette = (0..=255u8)
            .map(|i| Srgb::new(i, i.wrapping_mul(37), i.wrapping_mul(113)))
            .collect::<Vec<_>>();
        let indices = {
            #[allow(clippy::cast_possible_truncation)]
            let indices = (0..palette.len()).map(|i| i as u8).collect::<Vec<_>>();
            let mut indices = [indices.as_slice(); 4].concat();
            indices.rotate_right(7);
            indices
        };

        let width = 32;
        assert_eq!(width * 32, indices.len());

        let original_colors = indices
            .iter()
            .map(|&i| palette[usize::from(i)])
            .collect::<Vec<_>>();

        let mut new_indices = indices.clone();
        #[allow(clippy::cast_possible_truncation)]
        ditherer.dither(&palette, &mut new_indices, &original_colors, width as u32);
        assert_eq!(indices, new_indices);
    }

    #[test]
    fn oversized_palette_ignores_extra_entries() {
        let ditherer = FloydSteinberg::new();
        let colors = test_data_1024();
        let palette = test_colors(300, 29);

        let mut truncated = vec![0u8; colors.len()];
        ditherer.dither(&palette[..MAX_K], &mut truncated, &colors, 32);

        // entries past the u8 index capacity must not influence the result
        let mut full = vec![0u8; colors.len()];
        ditherer.dither(&palette, &mut full, &colors, 32);

        assert_eq!(truncated, full);
    }

    #[test]
    fn mid_gray_dithers_to_balanced_checkerboard() {
        let ditherer = FloydSteinberg::new();
        let palette = [Srgb::new(0u8, 0, 0), Srgb::new(255u8, 255, 255)];

        let (width, height) = (16usize, 16usize);
        let colors = vec![Srgb::new(128u8, 128, 128); width * height];
        let mut indices = vec![0u8; width * height];
        #[allow(clippy::cast_possible_truncation)]
        ditherer.dither(&palette, &mut indices, &colors, width as u32);

        // roughly half of each color, not a solid fill
        let white = indices.iter().filter(|&&i| i == 1).count();
        let total = width * height;
        assert!(
            white.abs_diff(total / 2) <= total / 8,
            "white count {white} is not close to half of {total}"
        );

        // every row must mix both colors
        for row in indices.chunks_exact(width) {
            assert!(row.contains(&0) && row.contains(&1));
        }

        // alternation dominates: most horizontal neighbors differ
        let transitions = indices
            .chunks_exact(width)
            .flat_map(|row| row.windows(2))
            .filter(|pair| pair[0] != pair[1])
            .count();
        assert!(
            transitions > height * (width - 1) / 2,
            "only {transitions} horizontal transitions"
        );
    }
}
