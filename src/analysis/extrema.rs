//! Fractal extrema: local maxima/minima over a symmetric window of `order` bars.

use crate::domain::Timeframe;
use crate::models::{ExtremaKind, ExtremaPoint};

/// Ascending indices of peaks and valleys in one series.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Extrema {
    pub peaks: Vec<usize>,
    pub valleys: Vec<usize>,
}

/// Finds every index `i` with a full window `[i - order, i + order]` where
/// `values[i]` is `>=` (peak) or `<=` (valley) all of its neighbours.
///
/// Ties are inclusive, so a plateau at the top of a window flags every bar of
/// the plateau. Bars closer than `order` to either end are never flagged, and
/// neither are non-finite values.
pub fn find_extrema(values: &[f64], order: usize) -> Extrema {
    Extrema {
        peaks: find_peaks(values, order),
        valleys: find_valleys(values, order),
    }
}

pub fn find_peaks(values: &[f64], order: usize) -> Vec<usize> {
    flag_window_extremes(values, order, |centre, other| centre >= other)
}

pub fn find_valleys(values: &[f64], order: usize) -> Vec<usize> {
    flag_window_extremes(values, order, |centre, other| centre <= other)
}

fn flag_window_extremes<F>(values: &[f64], order: usize, dominates: F) -> Vec<usize>
where
    F: Fn(f64, f64) -> bool,
{
    if order == 0 || values.len() < 2 * order + 1 {
        return Vec::new();
    }

    (order..values.len() - order)
        .filter(|&i| {
            let centre = values[i];
            // NaN fails every comparison, so it can never dominate its window
            centre.is_finite()
                && values[i - order..=i + order]
                    .iter()
                    .all(|&other| dominates(centre, other))
        })
        .collect()
}

/// Peaks on `highs` and valleys on `lows`, tagged with their timeframe.
pub fn swing_points(
    highs: &[f64],
    lows: &[f64],
    order: usize,
    timeframe: Timeframe,
) -> Vec<ExtremaPoint> {
    let peaks = find_peaks(highs, order).into_iter().map(|index| ExtremaPoint {
        index,
        price: highs[index],
        kind: ExtremaKind::Peak,
        timeframe,
    });
    let valleys = find_valleys(lows, order).into_iter().map(|index| ExtremaPoint {
        index,
        price: lows[index],
        kind: ExtremaKind::Valley,
        timeframe,
    });
    peaks.chain(valleys).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rises for `up` bars then falls for `down` bars; apex at index `up`.
    fn tent(up: usize, down: usize) -> Vec<f64> {
        let mut v: Vec<f64> = (0..=up).map(|i| i as f64).collect();
        v.extend((1..=down).map(|i| (up - i.min(up)) as f64 - 0.5 * i as f64));
        v
    }

    #[test]
    fn test_single_apex_for_every_valid_order() {
        let values = tent(10, 10);
        for order in 1..=5 {
            let extrema = find_extrema(&values, order);
            assert_eq!(extrema.peaks, vec![10], "order {}", order);
        }
    }

    #[test]
    fn test_valleys_mirror_peaks() {
        let values: Vec<f64> = tent(8, 8).into_iter().map(|v| -v).collect();
        assert_eq!(find_valleys(&values, 4), vec![8]);
        assert!(find_peaks(&values, 4).is_empty());
    }

    #[test]
    fn test_plateau_flags_every_tie() {
        // Plateau of length 3 at the maximum, order 2 -> 3 <= 2*2+1
        let values = vec![1.0, 2.0, 3.0, 5.0, 5.0, 5.0, 3.0, 2.0, 1.0];
        assert_eq!(find_peaks(&values, 2), vec![3, 4, 5]);
    }

    #[test]
    fn test_edges_never_flagged() {
        // Global maximum sits on the last bar
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert!(find_peaks(&values, 2).is_empty());
        assert!(find_valleys(&values, 2).is_empty());
    }

    #[test]
    fn test_larger_order_is_more_selective() {
        let values = vec![1.0, 3.0, 2.0, 4.0, 1.0, 2.0, 1.5, 6.0, 2.0, 1.0, 0.5];
        let small = find_peaks(&values, 1);
        let large = find_peaks(&values, 3);
        assert_eq!(small, vec![1, 3, 5, 7]);
        assert_eq!(large, vec![3, 7]);
        assert!(large.len() < small.len());
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(find_extrema(&[], 3), Extrema::default());
        assert_eq!(find_extrema(&[1.0, 2.0, 1.0], 0), Extrema::default());
        assert_eq!(find_extrema(&[1.0, 2.0, 1.0, 0.0], 2), Extrema::default());
        assert!(find_peaks(&[1.0, f64::NAN, 1.0], 1).is_empty());
    }

    #[test]
    fn test_swing_points_tags_kind_and_timeframe() {
        let highs = vec![1.0, 3.0, 1.0, 0.5, 1.0];
        let lows = vec![0.5, 0.5, 0.5, -1.0, 0.5];
        let points = swing_points(&highs, &lows, 1, Timeframe::H4);
        let peaks: Vec<_> = points.iter().filter(|p| p.kind == ExtremaKind::Peak).collect();
        let valleys: Vec<_> = points.iter().filter(|p| p.kind == ExtremaKind::Valley).collect();
        assert_eq!(peaks.len(), 1);
        assert_eq!((peaks[0].index, peaks[0].price), (1, 3.0));
        assert!(valleys.iter().any(|p| p.index == 3 && p.price == -1.0));
        assert!(points.iter().all(|p| p.timeframe == Timeframe::H4));
    }
}
