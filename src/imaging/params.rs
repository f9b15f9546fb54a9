use std::fmt;

use serde::Serialize;

use crate::error::{FilterError, Result};

// ---------------------------------------------------------------------------
// FilterParameters – validated bandpass settings
// ---------------------------------------------------------------------------

/// Radii and smoothing widths of a bandpass, in frequency-grid cells.
///
/// Only constructible through [`FilterParameters::new`], so every value a
/// request sees is non-negative with `inner_radius < outer_radius`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterParameters {
    inner_radius: u32,
    inner_smooth: u32,
    outer_radius: u32,
    outer_smooth: u32,
}

impl FilterParameters {
    /// Validate raw caller input.
    ///
    /// Takes signed integers because that is what a CLI or config file hands
    /// over; negative values are rejected here rather than wrapped.
    pub fn new(
        inner_radius: i64,
        inner_smooth: i64,
        outer_radius: i64,
        outer_smooth: i64,
    ) -> Result<Self> {
        let params = FilterParameters {
            inner_radius: non_negative("inner radius", inner_radius)?,
            inner_smooth: non_negative("inner smoothing", inner_smooth)?,
            outer_radius: non_negative("outer radius", outer_radius)?,
            outer_smooth: non_negative("outer smoothing", outer_smooth)?,
        };
        if params.inner_radius >= params.outer_radius {
            return Err(FilterError::InvalidParameter(format!(
                "inner radius ({}) must be smaller than outer radius ({})",
                params.inner_radius, params.outer_radius
            )));
        }
        Ok(params)
    }

    pub fn inner_radius(&self) -> u32 {
        self.inner_radius
    }

    pub fn inner_smooth(&self) -> u32 {
        self.inner_smooth
    }

    pub fn outer_radius(&self) -> u32 {
        self.outer_radius
    }

    pub fn outer_smooth(&self) -> u32 {
        self.outer_smooth
    }
}

impl fmt::Display for FilterParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "inradius={} insmooth={} outradius={} outsmooth={}",
            self.inner_radius, self.inner_smooth, self.outer_radius, self.outer_smooth
        )
    }
}

fn non_negative(name: &str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        FilterError::InvalidParameter(format!("{name} must be in 0..={}, got {value}", u32::MAX))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordered_radii() {
        let p = FilterParameters::new(5, 2, 100, 10).unwrap();
        assert_eq!(p.inner_radius(), 5);
        assert_eq!(p.inner_smooth(), 2);
        assert_eq!(p.outer_radius(), 100);
        assert_eq!(p.outer_smooth(), 10);
    }

    #[test]
    fn rejects_negative_values() {
        for args in [(-1, 0, 10, 0), (1, -2, 10, 0), (1, 0, -10, 0), (1, 0, 10, -3)] {
            let err = FilterParameters::new(args.0, args.1, args.2, args.3).unwrap_err();
            assert!(matches!(err, FilterError::InvalidParameter(_)), "{args:?}");
        }
    }

    #[test]
    fn rejects_inner_not_below_outer() {
        assert!(matches!(
            FilterParameters::new(30, 0, 10, 0),
            Err(FilterError::InvalidParameter(_))
        ));
        assert!(matches!(
            FilterParameters::new(10, 0, 10, 0),
            Err(FilterError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_values_beyond_u32() {
        let too_big = i64::from(u32::MAX) + 1;
        assert!(FilterParameters::new(0, 0, too_big, 0).is_err());
    }
}
