use ndarray::Array2;

use super::params::FilterParameters;

// ---------------------------------------------------------------------------
// RadialMask – frequency-domain weights
// ---------------------------------------------------------------------------

/// Real weights in `[0, 1]` laid out like a centred frequency field: the
/// zero frequency sits at `(height / 2, width / 2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialMask {
    weights: Array2<f64>,
}

impl RadialMask {
    /// Annular bandpass.
    ///
    /// The weight at distance `d` from the centre is `rise(d) * fall(d)`:
    ///
    /// * `rise` goes from 0 at `inner_radius - inner_smooth` to 1 at
    ///   `inner_radius + inner_smooth` (0.5 at `inner_radius`),
    /// * `fall` goes from 1 at `outer_radius - outer_smooth` to 0 at
    ///   `outer_radius + outer_smooth` (0.5 at `outer_radius`).
    ///
    /// Both ramps are the cubic smoothstep `t²(3 − 2t)`. A smoothing width of
    /// zero gives a hard step that keeps `d == radius`.
    ///
    /// `inner_radius < outer_radius` is expected but not checked here; see
    /// [`FilterParameters`] for the validated entry point.
    pub fn bandpass(
        shape: (usize, usize),
        inner_radius: u32,
        inner_smooth: u32,
        outer_radius: u32,
        outer_smooth: u32,
    ) -> Self {
        let (cy, cx) = centre(shape);
        let (r_in, s_in) = (f64::from(inner_radius), f64::from(inner_smooth));
        let (r_out, s_out) = (f64::from(outer_radius), f64::from(outer_smooth));

        let weights = Array2::from_shape_fn(shape, |(i, j)| {
            let d = (i as f64 - cy).hypot(j as f64 - cx);
            rise(d, r_in, s_in) * fall(d, r_out, s_out)
        });

        log::debug!(
            "Built bandpass mask {shape:?}: inner {inner_radius}±{inner_smooth}, \
             outer {outer_radius}±{outer_smooth}"
        );
        RadialMask { weights }
    }

    /// Bandpass from validated parameters.
    pub fn from_parameters(shape: (usize, usize), params: &FilterParameters) -> Self {
        Self::bandpass(
            shape,
            params.inner_radius(),
            params.inner_smooth(),
            params.outer_radius(),
            params.outer_smooth(),
        )
    }

    /// A mask that passes everything.
    pub fn identity(shape: (usize, usize)) -> Self {
        RadialMask {
            weights: Array2::ones(shape),
        }
    }

    /// `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        self.weights.dim()
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.weights.get((row, col)).copied()
    }
}

/// Grid centre, matching where the quadrant swap puts the zero frequency.
pub(crate) fn centre((height, width): (usize, usize)) -> (f64, f64) {
    ((height / 2) as f64, (width / 2) as f64)
}

fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn rise(d: f64, radius: f64, smooth: f64) -> f64 {
    if smooth == 0.0 {
        return if d >= radius { 1.0 } else { 0.0 };
    }
    smoothstep((d - (radius - smooth)) / (2.0 * smooth))
}

fn fall(d: f64, radius: f64, smooth: f64) -> f64 {
    if smooth == 0.0 {
        return if d <= radius { 1.0 } else { 0.0 };
    }
    1.0 - smoothstep((d - (radius - smooth)) / (2.0 * smooth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn full_band_is_all_ones() {
        let mask = RadialMask::bandpass((6, 9), 0, 0, u32::MAX, 0);
        assert!(mask.weights().iter().all(|&w| w == 1.0));

        // Largest distance on a 6x9 grid is hypot(3, 4) = 5.
        let mask = RadialMask::bandpass((6, 9), 0, 0, 5, 0);
        assert!(mask.weights().iter().all(|&w| w == 1.0));
    }

    #[test]
    fn collapsed_band_leaves_thin_ring() {
        let mask = RadialMask::bandpass((32, 32), 5, 0, 5, 0);
        let mut lit = 0;
        for ((i, j), &w) in mask.weights().indexed_iter() {
            if w > 0.0 {
                let d = (i as f64 - 16.0).hypot(j as f64 - 16.0);
                assert!((d - 5.0).abs() < 1.0, "weight {w} at distance {d}");
                lit += 1;
            }
        }
        assert!(lit > 0);
        assert!(lit < 32 * 32 / 10);
    }

    #[test]
    fn edges_are_monotonic() {
        let mask = RadialMask::bandpass((64, 64), 8, 4, 20, 6);
        let ray: Vec<f64> = (32..64).map(|j| mask.get(32, j).unwrap()).collect();

        // Rising band [4, 12], falling band [14, 26]; split between them.
        for d in 0..13 {
            assert!(ray[d + 1] >= ray[d], "rising edge dips at d={d}");
        }
        for d in 13..31 {
            assert!(ray[d + 1] <= ray[d], "falling edge rises at d={d}");
        }
        assert_eq!(ray[0], 0.0);
        assert_eq!(ray[4], 0.0);
        assert_eq!(ray[13], 1.0);
        assert_eq!(ray[26], 0.0);
    }

    #[test]
    fn edge_centres_are_half() {
        let mask = RadialMask::bandpass((64, 64), 8, 4, 20, 6);
        assert_abs_diff_eq!(mask.get(32, 40).unwrap(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(mask.get(32, 52).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn weights_stay_in_unit_range() {
        let mask = RadialMask::bandpass((17, 23), 3, 5, 9, 7);
        assert!(mask.weights().iter().all(|&w| (0.0..=1.0).contains(&w)));
    }

    #[test]
    fn mask_is_conjugate_symmetric() {
        for shape in [(8, 9), (7, 6), (16, 16)] {
            let (h, w) = shape;
            let mask = RadialMask::bandpass(shape, 1, 2, 4, 1);
            for i in 0..h {
                for j in 0..w {
                    let mi = (2 * (h / 2) + h - i) % h;
                    let mj = (2 * (w / 2) + w - j) % w;
                    assert_eq!(mask.get(i, j), mask.get(mi, mj), "({i},{j}) in {shape:?}");
                }
            }
        }
    }

    #[test]
    fn from_parameters_matches_bandpass() {
        let params = FilterParameters::new(2, 1, 6, 2).unwrap();
        assert_eq!(
            RadialMask::from_parameters((12, 10), &params),
            RadialMask::bandpass((12, 10), 2, 1, 6, 2)
        );
    }
}
