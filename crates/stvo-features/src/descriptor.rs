use crate::error::FeatureError;

/// Hamming distance between two binary descriptors of the same width.
#[inline]
pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x ^ y).count_ones())
        .sum()
}

/// A dense matrix of binary descriptors, one row per feature.
///
/// Rows stay aligned with the keypoints/keylines they describe: row `i`
/// belongs to feature `i`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Descriptors {
    data: Vec<u8>,
    row_bytes: usize,
}

impl Descriptors {
    /// An empty descriptor matrix with the given row width in bytes.
    pub fn empty(row_bytes: usize) -> Self {
        Self {
            data: Vec::new(),
            row_bytes,
        }
    }

    /// Build a descriptor matrix from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// If the row width is zero or the buffer length is not a multiple of it.
    pub fn from_flat(data: Vec<u8>, row_bytes: usize) -> Result<Self, FeatureError> {
        if row_bytes == 0 || data.len() % row_bytes != 0 {
            return Err(FeatureError::InvalidDescriptorBuffer(data.len(), row_bytes));
        }
        Ok(Self { data, row_bytes })
    }

    /// Build a descriptor matrix from fixed-size rows.
    pub fn from_rows<const N: usize>(rows: &[[u8; N]]) -> Self {
        Self {
            data: rows.iter().flatten().copied().collect(),
            row_bytes: N,
        }
    }

    /// Number of descriptors.
    pub fn rows(&self) -> usize {
        if self.row_bytes == 0 {
            0
        } else {
            self.data.len() / self.row_bytes
        }
    }

    /// Width of every descriptor in bytes.
    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    /// Whether the matrix holds no descriptor.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The descriptor at row `i`.
    ///
    /// PRECONDITION: `i < self.rows()`.
    #[inline]
    pub fn row(&self, i: usize) -> &[u8] {
        &self.data[i * self.row_bytes..(i + 1) * self.row_bytes]
    }

    /// Iterate over all rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.data.chunks_exact(self.row_bytes.max(1))
    }

    /// Append a descriptor row.
    ///
    /// # Errors
    ///
    /// If the row width differs from the matrix width.
    pub fn push_row(&mut self, row: &[u8]) -> Result<(), FeatureError> {
        if row.len() != self.row_bytes {
            return Err(FeatureError::DescriptorWidthMismatch(
                row.len(),
                self.row_bytes,
            ));
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    /// A new matrix holding the given rows, in the given order.
    ///
    /// # Errors
    ///
    /// If any index is out of bounds.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self, FeatureError> {
        let rows = self.rows();
        let mut out = Self {
            data: Vec::with_capacity(indices.len() * self.row_bytes),
            row_bytes: self.row_bytes,
        };
        for &i in indices {
            if i >= rows {
                return Err(FeatureError::RowOutOfBounds(i, rows));
            }
            out.data.extend_from_slice(self.row(i));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hamming_distance() {
        let a = [0u8; 32];
        let b = [0u8; 32];
        assert_eq!(hamming_distance(&a, &b), 0);

        let mut c = [0u8; 32];
        c[0] = 0xFF;
        assert_eq!(hamming_distance(&a, &c), 8);

        let d = [0xFFu8; 32];
        assert_eq!(hamming_distance(&a, &d), 256);
    }

    #[test]
    fn test_from_flat_validates_width() {
        assert!(Descriptors::from_flat(vec![0; 64], 32).is_ok());
        assert_eq!(
            Descriptors::from_flat(vec![0; 65], 32),
            Err(FeatureError::InvalidDescriptorBuffer(65, 32))
        );
        assert!(Descriptors::from_flat(vec![], 0).is_err());
    }

    #[test]
    fn test_select_rows_compacts_in_order() -> Result<(), FeatureError> {
        let desc = Descriptors::from_rows(&[[0u8; 4], [1u8; 4], [2u8; 4], [3u8; 4]]);
        assert_eq!(desc.rows(), 4);

        let kept = desc.select_rows(&[3, 1])?;
        assert_eq!(kept.rows(), 2);
        assert_eq!(kept.row(0), &[3u8; 4]);
        assert_eq!(kept.row(1), &[1u8; 4]);

        assert_eq!(
            desc.select_rows(&[4]),
            Err(FeatureError::RowOutOfBounds(4, 4))
        );
        Ok(())
    }

    #[test]
    fn test_push_row() -> Result<(), FeatureError> {
        let mut desc = Descriptors::empty(2);
        assert!(desc.is_empty());
        desc.push_row(&[1, 2])?;
        assert_eq!(desc.rows(), 1);
        assert!(desc.push_row(&[1, 2, 3]).is_err());
        assert_eq!(desc.iter_rows().count(), 1);
        Ok(())
    }
}
