/// An error type for feature buffers and matchers.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FeatureError {
    /// The descriptor buffer length is not a multiple of the row width.
    #[error("Descriptor buffer of {0} bytes is not a multiple of the row width {1}")]
    InvalidDescriptorBuffer(usize, usize),

    /// Two descriptor sets have different row widths.
    #[error("Descriptor width mismatch ({0} != {1})")]
    DescriptorWidthMismatch(usize, usize),

    /// A descriptor row index is out of bounds.
    #[error("Descriptor row {0} out of bounds for {1} rows")]
    RowOutOfBounds(usize, usize),

    /// A detector backend failed.
    #[error("Detector failure: {0}")]
    Detector(String),
}
