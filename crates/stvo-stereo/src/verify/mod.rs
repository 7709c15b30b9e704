//! Geometric verification of stereo candidates.
//!
//! A single verifier serves both the first frame of a sequence and the
//! steady-state frames; [`ExtractionMode`] selects identifier assignment and
//! the line uncertainty gate.

mod lines;
mod points;

pub use lines::{rederive_endpoints, verify_lines, EndpointCorrespondence, LineThresholds};
pub use points::verify_points;

/// How an extraction call labels and filters its features.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExtractionMode {
    /// First frame: sequential identifiers, no uncertainty gate.
    Bootstrap,
    /// Steady state: identifiers left unassigned, line uncertainty gate on.
    #[default]
    Tracking,
}

impl ExtractionMode {
    /// Whether line endpoints must pass the covariance bound.
    pub fn uncertainty_gate(self) -> bool {
        matches!(self, Self::Tracking)
    }

    /// Whether accepted features receive sequential identifiers.
    pub fn assigns_ids(self) -> bool {
        matches!(self, Self::Bootstrap)
    }

    /// Identifier of the `n`-th accepted feature.
    pub(crate) fn id_for(self, n: usize) -> Option<usize> {
        self.assigns_ids().then_some(n)
    }
}

/// Accepted features and the left descriptor rows they came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Verified<F> {
    /// Accepted features, in candidate order.
    pub features: Vec<F>,
    /// Left descriptor row of every accepted feature.
    pub descriptor_rows: Vec<usize>,
}

impl<F> Default for Verified<F> {
    fn default() -> Self {
        Self {
            features: Vec::new(),
            descriptor_rows: Vec::new(),
        }
    }
}

impl<F> Verified<F> {
    fn push(&mut self, feature: F, row: usize) {
        self.features.push(feature);
        self.descriptor_rows.push(row);
    }

    /// Number of accepted features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether nothing was accepted.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes() {
        assert!(ExtractionMode::Bootstrap.assigns_ids());
        assert!(!ExtractionMode::Bootstrap.uncertainty_gate());
        assert!(ExtractionMode::Tracking.uncertainty_gate());
        assert_eq!(ExtractionMode::Tracking.id_for(3), None);
        assert_eq!(ExtractionMode::Bootstrap.id_for(3), Some(3));
    }
}
