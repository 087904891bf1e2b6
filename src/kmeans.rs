//! Palette derivation via deterministic weighted k-means.

use crate::{ImageBuffer, Palette, PalettizeError, UniqueColorCounts, MAX_K};
use palette::Srgb;
#[cfg(feature = "threads")]
use rayon::prelude::*;
use std::cmp::Reverse;

/// The iteration cap for Lloyd refinement.
///
/// Assignments usually stabilize well before this on photographic input.
const MAX_ITERATIONS: usize = 16;

/// Derives a palette of exactly `k` colors representative of `image`.
///
/// Distinct colors are clustered by count-weighted k-means in RGB space.
/// Centroids are seeded from the `k` most frequent distinct colors and
/// refined by batch iterations, so the result is reproducible for the same
/// input and `k`. The returned palette is ordered by descending cluster
/// pixel-weight (most prevalent color first).
///
/// If the image has fewer than `k` distinct colors, the remaining slots are
/// filled by duplicating the derived entries, so the palette always holds
/// exactly `k` colors.
///
/// # Errors
/// Returns [`PalettizeError::InvalidPaletteSize`] if `k` is `0` or exceeds
/// [`MAX_COLORS`](crate::MAX_COLORS).
pub fn reduce_palette(image: &ImageBuffer, k: u16) -> Result<Palette, PalettizeError> {
    if k == 0 || usize::from(k) > MAX_K {
        return Err(PalettizeError::InvalidPaletteSize(usize::from(k)));
    }
    let k = usize::from(k);

    let unique = UniqueColorCounts::new(image);
    if unique.is_empty() {
        // Nothing to duplicate from an empty image; fill every slot with black.
        return Ok(Palette::new_unchecked(vec![Srgb::new(0, 0, 0); k]));
    }

    let by_weight = indices_by_descending_count(&unique);

    if unique.len() <= k {
        // Every distinct color is its own cluster.
        let mut colors = by_weight
            .iter()
            .map(|&i| unique.colors()[i])
            .collect::<Vec<_>>();

        let mut source = 0;
        while colors.len() < k {
            colors.push(colors[source]);
            source += 1;
        }

        return Ok(Palette::new_unchecked(colors));
    }

    let points = unique
        .colors()
        .iter()
        .map(|c| [f32::from(c.red), f32::from(c.green), f32::from(c.blue)])
        .collect::<Vec<_>>();

    let mut centroids = by_weight[..k]
        .iter()
        .map(|&i| points[i])
        .collect::<Vec<_>>();

    let mut assignments = vec![0u8; points.len()];
    for _ in 0..MAX_ITERATIONS {
        let changed = assign(&points, &centroids, &mut assignments);
        recompute_centroids(&unique, &points, &assignments, &mut centroids);
        if !changed {
            break;
        }
    }

    // Cluster weights from the final assignment, used for output ordering.
    let mut weights = vec![0u64; k];
    for (&cluster, &count) in assignments.iter().zip(unique.counts()) {
        weights[usize::from(cluster)] += u64::from(count);
    }

    let mut order = (0..k).collect::<Vec<_>>();
    order.sort_by_key(|&i| (Reverse(weights[i]), i));

    let colors = order
        .into_iter()
        .map(|i| round_centroid(centroids[i]))
        .collect();

    Ok(Palette::new_unchecked(colors))
}

/// Returns distinct-color indices sorted by descending count, ties broken by
/// ascending packed RGB key (the order [`UniqueColorCounts`] stores them in).
fn indices_by_descending_count(unique: &UniqueColorCounts) -> Vec<usize> {
    let mut order = (0..unique.len()).collect::<Vec<_>>();
    order.sort_by_key(|&i| (Reverse(unique.counts()[i]), i));
    order
}

/// Assigns each point to its nearest centroid (ties to the lowest index),
/// returning whether any assignment changed.
fn assign(points: &[[f32; 3]], centroids: &[[f32; 3]], assignments: &mut [u8]) -> bool {
    #[cfg(feature = "threads")]
    {
        assignments
            .par_iter_mut()
            .zip(points)
            .map(|(assignment, &point)| {
                let nearest = nearest_centroid(centroids, point);
                let changed = *assignment != nearest;
                *assignment = nearest;
                changed
            })
            .reduce(|| false, |a, b| a | b)
    }

    #[cfg(not(feature = "threads"))]
    {
        let mut changed = false;
        for (assignment, &point) in assignments.iter_mut().zip(points) {
            let nearest = nearest_centroid(centroids, point);
            changed |= *assignment != nearest;
            *assignment = nearest;
        }
        changed
    }
}

/// The index of the centroid nearest to `point` by squared Euclidean
/// distance, ties resolving to the lowest index.
#[allow(clippy::cast_possible_truncation)]
fn nearest_centroid(centroids: &[[f32; 3]], point: [f32; 3]) -> u8 {
    let mut min_index = 0;
    let mut min_distance = f32::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let mut distance = 0.0;
        for c in 0..3 {
            let d = point[c] - centroid[c];
            distance += d * d;
        }
        if distance < min_distance {
            min_distance = distance;
            min_index = i;
        }
    }
    min_index as u8
}

/// Recomputes each centroid as the count-weighted mean of its assigned
/// points. Empty clusters keep their previous centroid.
///
/// Sums are accumulated in integers, so the result does not depend on
/// accumulation order.
fn recompute_centroids(
    unique: &UniqueColorCounts,
    points: &[[f32; 3]],
    assignments: &[u8],
    centroids: &mut [[f32; 3]],
) {
    let mut sums = vec![[0u64; 3]; centroids.len()];
    let mut weights = vec![0u64; centroids.len()];

    for ((&cluster, &point), &count) in assignments.iter().zip(points).zip(unique.counts()) {
        let sum = &mut sums[usize::from(cluster)];
        for c in 0..3 {
            // points are whole numbers from u8 channels, so the cast is exact
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                sum[c] += point[c] as u64 * u64::from(count);
            }
        }
        weights[usize::from(cluster)] += u64::from(count);
    }

    for ((centroid, sum), &weight) in centroids.iter_mut().zip(&sums).zip(&weights) {
        if weight > 0 {
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            {
                *centroid = sum.map(|s| (s as f64 / weight as f64) as f32);
            }
        }
    }
}

/// Rounds a centroid to its integer representative color.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_centroid(centroid: [f32; 3]) -> Srgb<u8> {
    let [r, g, b] = centroid.map(|c| c.round().clamp(0.0, 255.0) as u8);
    Srgb::new(r, g, b)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::tests::*;

    fn image_from(colors: Vec<Srgb<u8>>) -> ImageBuffer {
        #[allow(clippy::cast_possible_truncation)]
        let width = colors.len() as u32;
        ImageBuffer::new(colors, width, 1).unwrap()
    }

    #[test]
    fn rejects_invalid_sizes() {
        let image = image_from(test_data_256());
        assert_eq!(
            reduce_palette(&image, 0),
            Err(PalettizeError::InvalidPaletteSize(0))
        );
        assert_eq!(
            reduce_palette(&image, 300),
            Err(PalettizeError::InvalidPaletteSize(300))
        );
    }

    #[test]
    fn always_returns_exactly_k() {
        let image = image_from(test_data_1024());
        for k in [1, 2, 3, 16, 100, 256] {
            let palette = reduce_palette(&image, k).unwrap();
            assert_eq!(palette.num_colors(), k);
        }
    }

    #[test]
    fn pads_by_duplication_when_colors_are_scarce() {
        let red = Srgb::new(200u8, 0, 0);
        let blue = Srgb::new(0u8, 0, 200);
        let image = image_from([vec![red; 5], vec![blue; 3]].concat());

        let palette = reduce_palette(&image, 5).unwrap();
        assert_eq!(palette.num_colors(), 5);
        // most prevalent first, then cycled duplicates
        assert_eq!(&palette[..], &[red, blue, red, blue, red]);
    }

    #[test]
    fn empty_image_never_fails() {
        let image = image_from(Vec::new());
        let palette = reduce_palette(&image, 4).unwrap();
        assert_eq!(palette.num_colors(), 4);
    }

    #[test]
    fn prevalent_color_comes_first() {
        // two tight clusters, the larger one around green
        let mut colors = Vec::new();
        for i in 0..20u8 {
            colors.push(Srgb::new(10, 200 + i % 8, 10));
        }
        for i in 0..5u8 {
            colors.push(Srgb::new(200 + i % 4, 10, 10));
        }
        let image = image_from(colors);

        let palette = reduce_palette(&image, 2).unwrap();
        let first = palette[0];
        assert!(first.green > first.red, "expected the green cluster first, got {first:?}");
    }

    #[test]
    fn reduction_is_deterministic() {
        let image = image_from(test_data_1024());
        let a = reduce_palette(&image, 16).unwrap();
        let b = reduce_palette(&image, 16).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn centroids_represent_their_cluster() {
        // a single flat color reduces to that color
        let gray = Srgb::new(90u8, 91, 92);
        let image = image_from(vec![gray; 64]);
        let palette = reduce_palette(&image, 1).unwrap();
        assert_eq!(palette[0], gray);
    }
}
