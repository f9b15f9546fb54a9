use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type shared by the filtering core
// ---------------------------------------------------------------------------

/// Every failure a filtering request can report.
///
/// Each variant is surfaced synchronously; nothing is retried internally and
/// a failed stage aborts the whole request.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The source file is missing or unreadable.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Pixel data could not be decoded, or the grid is unusable.
    #[error("cannot decode pixel data: {0}")]
    Format(String),

    /// Mask and frequency field do not have the same (height, width).
    #[error("mask shape {mask:?} does not match spectrum shape {field:?}")]
    DimensionMismatch {
        mask: (usize, usize),
        field: (usize, usize),
    },

    /// Negative radius/smoothing, inner >= outer, or a zero target size.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A single-channel grid was required.
    #[error("expected a grayscale image, got {channels} channels")]
    NotGrayscale { channels: usize },
}

pub type Result<T> = std::result::Result<T, FilterError>;
