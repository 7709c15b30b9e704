use rayon::prelude::*;

use crate::descriptor::{hamming_distance, Descriptors};
use crate::error::FeatureError;

/// The two nearest reference descriptors of one query descriptor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CandidateMatch {
    /// Row of the query descriptor.
    pub query_idx: usize,
    /// Row of the nearest reference descriptor.
    pub train_idx: usize,
    /// Distance to the nearest reference descriptor.
    pub distance: f64,
    /// Distance to the second nearest reference descriptor, absent when the
    /// reference set holds a single descriptor.
    pub second_distance: Option<f64>,
}

impl CandidateMatch {
    /// `second - best`, the absolute separation of the two neighbours.
    pub fn separation(&self) -> Option<f64> {
        self.second_distance.map(|second| second - self.distance)
    }

    /// `best / second`, or `None` when the ratio is undefined.
    pub fn ratio(&self) -> Option<f64> {
        match self.second_distance {
            Some(second) if second > 0.0 => Some(self.distance / second),
            _ => None,
        }
    }
}

/// k-nearest-neighbour search (k = 2) between two binary descriptor sets.
///
/// Implementations return at most one candidate per query row, ordered by
/// query row, and break distance ties toward the lowest reference row.
pub trait DescriptorMatcher: Send + Sync {
    /// Find the two nearest `train` rows of every `query` row.
    fn knn_match(
        &self,
        query: &Descriptors,
        train: &Descriptors,
    ) -> Result<Vec<CandidateMatch>, FeatureError>;
}

fn check_widths(query: &Descriptors, train: &Descriptors) -> Result<bool, FeatureError> {
    if query.is_empty() || train.is_empty() {
        return Ok(false);
    }
    if query.row_bytes() != train.row_bytes() {
        return Err(FeatureError::DescriptorWidthMismatch(
            query.row_bytes(),
            train.row_bytes(),
        ));
    }
    Ok(true)
}

/// Scan every reference row for the best and second best neighbour.
fn nearest_two(query_idx: usize, desc: &[u8], train: &Descriptors) -> CandidateMatch {
    let mut best_j = 0usize;
    let mut best = u32::MAX;
    let mut second = u32::MAX;

    for (j, d2) in train.iter_rows().enumerate() {
        let dist = hamming_distance(desc, d2);
        if dist < best {
            second = best;
            best = dist;
            best_j = j;
        } else if dist < second {
            second = dist;
        }
    }

    CandidateMatch {
        query_idx,
        train_idx: best_j,
        distance: best as f64,
        second_distance: (train.rows() > 1).then_some(second as f64),
    }
}

/// Brute-force Hamming matcher scanning the reference set sequentially.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForceMatcher;

impl DescriptorMatcher for BruteForceMatcher {
    fn knn_match(
        &self,
        query: &Descriptors,
        train: &Descriptors,
    ) -> Result<Vec<CandidateMatch>, FeatureError> {
        if !check_widths(query, train)? {
            return Ok(Vec::new());
        }
        Ok(query
            .iter_rows()
            .enumerate()
            .map(|(i, d1)| nearest_two(i, d1, train))
            .collect())
    }
}

/// Brute-force Hamming matcher distributing query rows over the rayon pool.
///
/// Produces exactly the same candidates as [`BruteForceMatcher`].
#[derive(Clone, Copy, Debug)]
pub struct ParallelBruteForceMatcher {
    /// Minimum number of query rows handled by one rayon task.
    pub min_chunk: usize,
}

impl Default for ParallelBruteForceMatcher {
    fn default() -> Self {
        Self { min_chunk: 16 }
    }
}

impl DescriptorMatcher for ParallelBruteForceMatcher {
    fn knn_match(
        &self,
        query: &Descriptors,
        train: &Descriptors,
    ) -> Result<Vec<CandidateMatch>, FeatureError> {
        if !check_widths(query, train)? {
            return Ok(Vec::new());
        }
        let candidates: Vec<CandidateMatch> = (0..query.rows())
            .into_par_iter()
            .with_min_len(self.min_chunk.max(1))
            .map(|i| nearest_two(i, query.row(i), train))
            .collect();
        log::trace!("parallel knn: {} candidates", candidates.len());
        Ok(candidates)
    }
}
