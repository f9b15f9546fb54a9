use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ColorType, DynamicImage, GrayImage, ImageBuffer, ImageError, ImageReader, Luma};
use ndarray::{Array2, Array3, ArrayView2, Axis, Zip};

use crate::error::{FilterError, Result};

/// ITU-R BT.601 luma weights (the same ones PIL uses for mode "L").
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

// ---------------------------------------------------------------------------
// Image – a grid of real-valued samples
// ---------------------------------------------------------------------------

/// A `height × width × channels` grid of samples plus the full-scale value of
/// the source encoding (255 for 8-bit, 65535 for 16-bit, 1.0 for float).
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    samples: Array3<f64>,
    scale: f64,
}

impl Image {
    /// Build an image from raw `(height, width, channels)` samples.
    pub fn from_samples(samples: Array3<f64>, scale: f64) -> Result<Self> {
        if samples.is_empty() {
            return Err(FilterError::Format(format!(
                "image has no samples (shape {:?})",
                samples.dim()
            )));
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(FilterError::InvalidParameter(format!(
                "pixel scale must be positive, got {scale}"
            )));
        }
        Ok(Image { samples, scale })
    }

    /// Build a single-channel image from a `(height, width)` grid.
    pub fn from_gray(gray: Array2<f64>, scale: f64) -> Result<Self> {
        Self::from_samples(gray.insert_axis(Axis(2)), scale)
    }

    /// Decode an image file.  The format is sniffed from the content and
    /// falls back to the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let io_err = |source| FilterError::Io {
            path: path.to_path_buf(),
            source,
        };
        let decoded = ImageReader::open(path)
            .map_err(io_err)?
            .with_guessed_format()
            .map_err(io_err)?
            .decode()
            .map_err(|e| match e {
                ImageError::IoError(source) => io_err(source),
                other => FilterError::Format(other.to_string()),
            })?;

        let image = Self::from_dynamic(decoded)?;
        log::info!(
            "Loaded {} ({}x{}, {} channel(s), scale {})",
            path.display(),
            image.width(),
            image.height(),
            image.channels(),
            image.scale
        );
        Ok(image)
    }

    fn from_dynamic(img: DynamicImage) -> Result<Self> {
        let (width, height) = (img.width() as usize, img.height() as usize);
        let channels = usize::from(img.color().channel_count());

        let (raw, scale) = match img.color() {
            ColorType::L8 => (widen(img.into_luma8().into_raw()), 255.0),
            ColorType::La8 => (widen(img.into_luma_alpha8().into_raw()), 255.0),
            ColorType::Rgb8 => (widen(img.into_rgb8().into_raw()), 255.0),
            ColorType::Rgba8 => (widen(img.into_rgba8().into_raw()), 255.0),
            ColorType::L16 => (widen(img.into_luma16().into_raw()), 65535.0),
            ColorType::La16 => (widen(img.into_luma_alpha16().into_raw()), 65535.0),
            ColorType::Rgb16 => (widen(img.into_rgb16().into_raw()), 65535.0),
            ColorType::Rgba16 => (widen(img.into_rgba16().into_raw()), 65535.0),
            ColorType::Rgb32F => (widen(img.into_rgb32f().into_raw()), 1.0),
            ColorType::Rgba32F => (widen(img.into_rgba32f().into_raw()), 1.0),
            other => {
                return Err(FilterError::Format(format!(
                    "unsupported sample layout {other:?}"
                )))
            }
        };

        let samples = Array3::from_shape_vec((height, width, channels), raw)
            .map_err(|e| FilterError::Format(e.to_string()))?;
        Self::from_samples(samples, scale)
    }

    pub fn height(&self) -> usize {
        self.samples.dim().0
    }

    pub fn width(&self) -> usize {
        self.samples.dim().1
    }

    pub fn channels(&self) -> usize {
        self.samples.dim().2
    }

    /// `(height, width)`, the order every grid in this crate uses.
    pub fn dims(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    /// Full-scale sample value of the source encoding.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn samples(&self) -> &Array3<f64> {
        &self.samples
    }

    pub fn is_grayscale(&self) -> bool {
        self.channels() == 1
    }

    /// The single luminance plane.  Fails on multi-channel images.
    pub fn gray(&self) -> Result<ArrayView2<'_, f64>> {
        if !self.is_grayscale() {
            return Err(FilterError::NotGrayscale {
                channels: self.channels(),
            });
        }
        Ok(self.samples.index_axis(Axis(2), 0))
    }

    /// Collapse to one luminance channel using [`LUMA_WEIGHTS`].
    ///
    /// Alpha is dropped. Single-channel input is returned unchanged.
    pub fn to_grayscale(&self) -> Image {
        let luma = match self.channels() {
            1 | 2 => self.samples.index_axis(Axis(2), 0).to_owned(),
            _ => {
                let [wr, wg, wb] = LUMA_WEIGHTS;
                Zip::from(self.samples.index_axis(Axis(2), 0))
                    .and(self.samples.index_axis(Axis(2), 1))
                    .and(self.samples.index_axis(Axis(2), 2))
                    .map_collect(|&r, &g, &b| wr * r + wg * g + wb * b)
            }
        };
        Image {
            samples: luma.insert_axis(Axis(2)),
            scale: self.scale,
        }
    }

    /// Resample every channel to `width × height` with a bilinear filter.
    pub fn resize(&self, width: u32, height: u32) -> Result<Image> {
        if width == 0 || height == 0 {
            return Err(FilterError::InvalidParameter(format!(
                "cannot resize to {width}x{height}"
            )));
        }
        let (h, w, channels) = self.samples.dim();
        let mut out = Array3::<f64>::zeros((height as usize, width as usize, channels));

        // The resampler clamps float pixels to [0, 1], so work in unit range.
        for (ch, mut plane_out) in out.axis_iter_mut(Axis(2)).enumerate() {
            let plane = self.samples.index_axis(Axis(2), ch);
            let buffer: ImageBuffer<Luma<f32>, Vec<f32>> =
                ImageBuffer::from_fn(w as u32, h as u32, |x, y| {
                    Luma([(plane[[y as usize, x as usize]] / self.scale) as f32])
                });
            let resized = imageops::resize(&buffer, width, height, FilterType::Triangle);
            for (x, y, px) in resized.enumerate_pixels() {
                plane_out[[y as usize, x as usize]] = f64::from(px[0]) * self.scale;
            }
        }

        log::debug!("Resized {w}x{h} -> {width}x{height}");
        Ok(Image {
            samples: out,
            scale: self.scale,
        })
    }

    /// Min/max stretch every sample into `[0, scale]`.
    ///
    /// A flat image maps to all zeros.
    pub fn stretch_to_scale(&self) -> Image {
        let (min, max) = self
            .samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;
        let samples = if range > f64::EPSILON * max.abs().max(1.0) {
            self.samples.mapv(|v| (v - min) / range * self.scale)
        } else {
            Array3::zeros(self.samples.dim())
        };
        Image {
            samples,
            scale: self.scale,
        }
    }

    /// Render to an 8-bit gray buffer, clamping to `[0, scale]`.
    pub fn to_luma8(&self) -> GrayImage {
        let gray = self.to_grayscale();
        let plane = gray.samples.index_axis(Axis(2), 0);
        GrayImage::from_fn(gray.width() as u32, gray.height() as u32, |x, y| {
            let v = plane[[y as usize, x as usize]] / self.scale;
            Luma([(v.clamp(0.0, 1.0) * 255.0).round() as u8])
        })
    }
}

fn widen<T: Into<f64>>(raw: Vec<T>) -> Vec<f64> {
    raw.into_iter().map(Into::into).collect()
}
