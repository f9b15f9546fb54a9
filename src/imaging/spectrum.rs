use std::fmt;

use ndarray::{Array2, ArrayView1, Axis, Zip};
use rustfft::num_complex::Complex64;
use rustfft::{FftDirection, FftPlanner};

use super::image::Image;
use super::mask::RadialMask;
use crate::error::{FilterError, Result};

// ---------------------------------------------------------------------------
// FrequencyField – a centred 2D spectrum
// ---------------------------------------------------------------------------

/// Output of [`SpectrumEngine::forward`]: complex coefficients with the zero
/// frequency moved to `(height / 2, width / 2)`.
///
/// Carries the pixel scale of the source so that the inverse transform and
/// the power spectrum land back in the same value range.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyField {
    coefficients: Array2<Complex64>,
    scale: f64,
}

impl FrequencyField {
    /// `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        self.coefficients.dim()
    }

    pub fn coefficients(&self) -> &Array2<Complex64> {
        &self.coefficients
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Element-wise product with `mask`.
    pub fn apply_mask(&self, mask: &RadialMask) -> Result<FrequencyField> {
        if mask.shape() != self.shape() {
            return Err(FilterError::DimensionMismatch {
                mask: mask.shape(),
                field: self.shape(),
            });
        }
        let coefficients = Zip::from(&self.coefficients)
            .and(mask.weights())
            .map_collect(|&c, &w| c * w);
        Ok(FrequencyField {
            coefficients,
            scale: self.scale,
        })
    }

    /// Log-compressed magnitude, `ln(1 + |F|)`, stretched so the strongest
    /// coefficient maps to the source's full scale.
    pub fn power_spectrum(&self) -> PowerSpectrum {
        let log_norm = self.coefficients.mapv(|c| c.norm().ln_1p());
        let max = log_norm.iter().copied().fold(0.0_f64, f64::max);
        let values = if max > 0.0 {
            log_norm.mapv(|v| v / max * self.scale)
        } else {
            Array2::zeros(log_norm.dim())
        };
        PowerSpectrum {
            values,
            scale: self.scale,
        }
    }

    /// Crop or zero-pad symmetrically around the centre to `width × height`.
    ///
    /// A coefficient keeps its frequency offset from the centre, so the
    /// zero frequency stays the zero frequency. Values are rescaled by the
    /// ratio of grid areas so the mean intensity survives the inverse
    /// transform.
    pub fn resize(&self, width: u32, height: u32) -> Result<FrequencyField> {
        if width == 0 || height == 0 {
            return Err(FilterError::InvalidParameter(format!(
                "cannot resize spectrum to {width}x{height}"
            )));
        }
        let (h, w) = self.shape();
        let (new_h, new_w) = (height as usize, width as usize);
        if (new_h, new_w) == (h, w) {
            return Ok(self.clone());
        }

        let gain = (new_h * new_w) as f64 / (h * w) as f64;
        let source_index = |new: usize, new_len: usize, len: usize| {
            let offset = new as isize - (new_len / 2) as isize;
            let idx = offset + (len / 2) as isize;
            (0..len as isize).contains(&idx).then_some(idx as usize)
        };

        let coefficients = Array2::from_shape_fn((new_h, new_w), |(i, j)| {
            match (source_index(i, new_h, h), source_index(j, new_w, w)) {
                (Some(si), Some(sj)) => self.coefficients[[si, sj]] * gain,
                _ => Complex64::new(0.0, 0.0),
            }
        });

        log::debug!("Resized spectrum {w}x{h} -> {new_w}x{new_h}");
        Ok(FrequencyField {
            coefficients,
            scale: self.scale,
        })
    }
}

// ---------------------------------------------------------------------------
// PowerSpectrum – display-only view of a field
// ---------------------------------------------------------------------------

/// Real grid in `[0, scale]`, for viewing only.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSpectrum {
    values: Array2<f64>,
    scale: f64,
}

impl PowerSpectrum {
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Wrap as a grayscale image for the display path.
    pub fn to_image(&self) -> Result<Image> {
        Image::from_gray(self.values.clone(), self.scale)
    }
}

// ---------------------------------------------------------------------------
// SpectrumEngine – forward / inverse transforms
// ---------------------------------------------------------------------------

/// Owns the FFT plan cache for one caller. Do not share across requests.
pub struct SpectrumEngine {
    planner: FftPlanner<f64>,
}

impl Default for SpectrumEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SpectrumEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumEngine").finish_non_exhaustive()
    }
}

impl SpectrumEngine {
    pub fn new() -> Self {
        SpectrumEngine {
            planner: FftPlanner::new(),
        }
    }

    /// 2D DFT of a grayscale image, centred with a quadrant swap.
    pub fn forward(&mut self, image: &Image) -> Result<FrequencyField> {
        let gray = image.gray()?;
        let mut coefficients = gray.mapv(|v| Complex64::new(v, 0.0));
        self.transform_2d(&mut coefficients, FftDirection::Forward);

        let (h, w) = coefficients.dim();
        log::trace!("Forward transform {w}x{h}");
        Ok(FrequencyField {
            coefficients: roll(&coefficients, h / 2, w / 2),
            scale: image.scale(),
        })
    }

    /// Undo the centring, invert the DFT and keep the real part clipped to
    /// `[0, scale]`.
    pub fn inverse(&mut self, field: &FrequencyField) -> Result<Image> {
        let raw = self.inverse_real(field)?;
        let scale = raw.scale();
        let pixels = raw.gray()?.mapv(|v| v.clamp(0.0, scale));
        Image::from_gray(pixels, scale)
    }

    /// Like [`inverse`](Self::inverse) but without clipping: a band that
    /// drops the zero frequency gives a zero-mean, signed grid.
    pub fn inverse_real(&mut self, field: &FrequencyField) -> Result<Image> {
        let (h, w) = field.shape();
        let mut coefficients = roll(&field.coefficients, h - h / 2, w - w / 2);
        self.transform_2d(&mut coefficients, FftDirection::Inverse);

        let norm = 1.0 / (h * w) as f64;
        let pixels = coefficients.mapv(|c| c.re * norm);
        log::trace!("Inverse transform {w}x{h}");
        Image::from_gray(pixels, field.scale)
    }

    /// Resize a grayscale image through the frequency domain.
    pub fn preview(&mut self, image: &Image, width: u32, height: u32) -> Result<Image> {
        let field = self.forward(image)?;
        let resized = field.resize(width, height)?;
        self.inverse(&resized)
    }

    fn transform_2d(&mut self, data: &mut Array2<Complex64>, direction: FftDirection) {
        let (h, w) = data.dim();
        let mut buffer = Vec::with_capacity(h.max(w));
        for (axis, len) in [(Axis(1), w), (Axis(0), h)] {
            let fft = self.planner.plan_fft(len, direction);
            for mut lane in data.lanes_mut(axis) {
                buffer.clear();
                buffer.extend(lane.iter().copied());
                fft.process(&mut buffer);
                lane.assign(&ArrayView1::from(&buffer[..]));
            }
        }
    }
}

/// Circular shift: `out[(i + dy) % h, (j + dx) % w] = data[i, j]`.
fn roll(data: &Array2<Complex64>, dy: usize, dx: usize) -> Array2<Complex64> {
    let (h, w) = data.dim();
    Array2::from_shape_fn((h, w), |(i, j)| {
        data[[(i + h - dy % h) % h, (j + w - dx % w) % w]]
    })
}
