use std::cmp::Ordering;

use stvo_features::{CandidateMatch, DescriptorMatcher, Descriptors};

use crate::error::StereoError;

/// Left to right candidates, plus the reverse best matches when matching is
/// bidirectional.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StereoCandidates {
    /// Left to right candidates, ordered by left (query) index.
    pub lr: Vec<CandidateMatch>,
    /// For every right index, the left index of its best reverse match.
    pub rl_best: Option<Vec<Option<usize>>>,
}

impl StereoCandidates {
    /// Whether the candidate passes the mutual best match test.
    ///
    /// Without reverse matches every candidate is its own consistent match.
    pub fn is_mutual(&self, candidate: &CandidateMatch) -> bool {
        match &self.rl_best {
            None => true,
            Some(rl_best) => {
                rl_best.get(candidate.train_idx).copied().flatten() == Some(candidate.query_idx)
            }
        }
    }

    /// Number of left to right candidates.
    pub fn len(&self) -> usize {
        self.lr.len()
    }

    /// Whether there is no candidate.
    pub fn is_empty(&self) -> bool {
        self.lr.is_empty()
    }
}

/// Order candidates by their query index.
pub fn by_query_idx(a: &CandidateMatch, b: &CandidateMatch) -> Ordering {
    a.query_idx.cmp(&b.query_idx)
}

/// Dense `train index -> query index` table of reverse best matches.
fn reverse_table(rl: &[CandidateMatch], num_right: usize) -> Vec<Option<usize>> {
    let mut table = vec![None; num_right];
    for candidate in rl {
        if let Some(slot) = table.get_mut(candidate.query_idx) {
            *slot = Some(candidate.train_idx);
        }
    }
    table
}

/// Match left descriptors against right descriptors.
///
/// With `bidirectional` the right descriptors are also matched against the
/// left ones, concurrently when `parallel` is set. Both directions complete
/// before this function returns.
pub fn match_stereo(
    matcher: &dyn DescriptorMatcher,
    left: &Descriptors,
    right: &Descriptors,
    bidirectional: bool,
    parallel: bool,
) -> Result<StereoCandidates, StereoError> {
    let (lr, rl) = if !bidirectional {
        (matcher.knn_match(left, right), None)
    } else if parallel {
        let (lr, rl) = rayon::join(
            || matcher.knn_match(left, right),
            || matcher.knn_match(right, left),
        );
        (lr, Some(rl))
    } else {
        let lr = matcher.knn_match(left, right);
        let rl = matcher.knn_match(right, left);
        (lr, Some(rl))
    };

    let mut lr = lr?;
    lr.sort_by(by_query_idx);

    let rl_best = match rl {
        Some(rl) => {
            let mut rl = rl?;
            rl.sort_by(by_query_idx);
            Some(reverse_table(&rl, right.rows()))
        }
        None => None,
    };

    log::debug!(
        "stereo matching: {} lr candidates, bidirectional: {}",
        lr.len(),
        rl_best.is_some()
    );

    Ok(StereoCandidates { lr, rl_best })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stvo_features::{BruteForceMatcher, FeatureError};

    /// Matcher returning canned candidates in reverse query order.
    struct Canned {
        lr: Vec<CandidateMatch>,
        rl: Vec<CandidateMatch>,
    }

    impl DescriptorMatcher for Canned {
        fn knn_match(
            &self,
            query: &Descriptors,
            _train: &Descriptors,
        ) -> Result<Vec<CandidateMatch>, FeatureError> {
            let mut out = if query.row(0)[0] == 0 {
                self.lr.clone()
            } else {
                self.rl.clone()
            };
            out.reverse();
            Ok(out)
        }
    }

    fn cm(query_idx: usize, train_idx: usize) -> CandidateMatch {
        CandidateMatch {
            query_idx,
            train_idx,
            distance: 1.0,
            second_distance: Some(5.0),
        }
    }

    #[test]
    fn test_candidates_sorted_and_reverse_table() -> Result<(), StereoError> {
        let left = Descriptors::from_rows(&[[0u8; 4], [0u8; 4], [0u8; 4]]);
        let right = Descriptors::from_rows(&[[1u8; 4], [1u8; 4], [1u8; 4]]);
        let matcher = Canned {
            lr: vec![cm(0, 2), cm(1, 0), cm(2, 1)],
            rl: vec![cm(0, 1), cm(1, 0), cm(2, 0)],
        };

        for parallel in [false, true] {
            let candidates = match_stereo(&matcher, &left, &right, true, parallel)?;
            let queries: Vec<usize> = candidates.lr.iter().map(|c| c.query_idx).collect();
            assert_eq!(queries, vec![0, 1, 2]);
            assert_eq!(candidates.rl_best, Some(vec![Some(1), Some(0), Some(0)]));
            // 0 -> 2 -> 0 and 1 -> 0 -> 1 are mutual, 2 -> 1 -> 0 is not
            let mutual: Vec<bool> = candidates
                .lr
                .iter()
                .map(|c| candidates.is_mutual(c))
                .collect();
            assert_eq!(mutual, vec![true, true, false]);
        }
        Ok(())
    }

    #[test]
    fn test_one_directional_is_self_consistent() -> Result<(), StereoError> {
        let left = Descriptors::from_rows(&[[0u8; 4]]);
        let right = Descriptors::from_rows(&[[1u8; 4]]);
        let matcher = Canned {
            lr: vec![cm(0, 0)],
            rl: vec![cm(0, 3)],
        };
        let candidates = match_stereo(&matcher, &left, &right, false, true)?;
        assert!(candidates.rl_best.is_none());
        assert!(candidates.is_mutual(&candidates.lr[0]));
        Ok(())
    }

    #[test]
    fn test_brute_force_mutual_links() -> Result<(), StereoError> {
        let mut near_a = [0u8; 32];
        near_a[0] = 0x03;
        let left = Descriptors::from_rows(&[[0u8; 32], [0xFFu8; 32]]);
        let right = Descriptors::from_rows(&[near_a, [0xFEu8; 32]]);

        let candidates = match_stereo(&BruteForceMatcher, &left, &right, true, false)?;
        assert_eq!(candidates.len(), 2);
        assert!(candidates.lr.iter().all(|c| candidates.is_mutual(c)));

        let empty = Descriptors::empty(32);
        let candidates = match_stereo(&BruteForceMatcher, &empty, &right, true, true)?;
        assert!(candidates.is_empty());
        Ok(())
    }
}
