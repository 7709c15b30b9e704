//! Robust dispersion of descriptor match distances.
//!
//! Line descriptor distances are poorly separated, so instead of a fixed
//! threshold the pipeline measures the spread of the current candidate
//! population with the median absolute deviation (MAD), scaled to estimate a
//! Gaussian standard deviation.

use stvo_features::CandidateMatch;

/// Factor turning a MAD into a consistent estimate of a normal standard deviation.
pub const MAD_TO_SIGMA: f64 = 1.4826;

/// Robust dispersion of one extraction call's candidate distances.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DescriptorMad {
    /// Scaled MAD of the best-match distances.
    pub nn_mad: f64,
    /// Scaled MAD of the best/second-best separation (difference for lines,
    /// ratio for points).
    pub nn12_mad: f64,
}

/// Median taken as the element at index `len / 2` after sorting, or `None`
/// for an empty slice. The slice is sorted in place.
pub fn median_in_place(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    Some(values[values.len() / 2])
}

/// Median absolute deviation scaled by [`MAD_TO_SIGMA`]; zero for an empty population.
pub fn scaled_mad(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    let Some(median) = median_in_place(&mut sorted) else {
        return 0.0;
    };
    let mut deviations: Vec<f64> = values.iter().map(|v| (v - median).abs()).collect();
    MAD_TO_SIGMA * median_in_place(&mut deviations).unwrap_or(0.0)
}

/// Dispersion of line candidates: best distances and `second - best` separations.
///
/// Candidates without a second neighbour only contribute to `nn_mad`.
pub fn line_descriptor_mad(candidates: &[CandidateMatch]) -> DescriptorMad {
    let best: Vec<f64> = candidates.iter().map(|c| c.distance).collect();
    let separations: Vec<f64> = candidates.iter().filter_map(|c| c.separation()).collect();
    DescriptorMad {
        nn_mad: scaled_mad(&best),
        nn12_mad: scaled_mad(&separations),
    }
}

/// Dispersion of point candidates: best distances and `best / second` ratios.
///
/// Candidates with an undefined ratio only contribute to `nn_mad`.
pub fn point_descriptor_mad(candidates: &[CandidateMatch]) -> DescriptorMad {
    let best: Vec<f64> = candidates.iter().map(|c| c.distance).collect();
    let ratios: Vec<f64> = candidates.iter().filter_map(|c| c.ratio()).collect();
    DescriptorMad {
        nn_mad: scaled_mad(&best),
        nn12_mad: scaled_mad(&ratios),
    }
}
