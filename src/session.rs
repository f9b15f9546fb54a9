use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::imaging::{FilterParameters, Image, RadialMask, SpectrumEngine};

// ---------------------------------------------------------------------------
// Request stages
// ---------------------------------------------------------------------------

/// Progress of one filtering request, for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loaded,
    Transformed,
    Masked,
    SpectrumComputed,
    Reconstructed,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loaded => "loaded",
            Stage::Transformed => "transformed",
            Stage::Masked => "masked",
            Stage::SpectrumComputed => "spectrum computed",
            Stage::Reconstructed => "reconstructed",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// An output grid plus the name a host uses to label or store it.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedImage {
    pub name: String,
    pub image: Image,
}

impl NamedImage {
    fn new(name: impl Into<String>, image: Image) -> Self {
        NamedImage {
            name: name.into(),
            image,
        }
    }
}

/// The three grids produced by one bandpass request.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutputs {
    /// Grayscale source.
    pub source: NamedImage,
    /// Power spectrum of the masked field.
    pub power_spectrum: NamedImage,
    /// Inverse transform of the masked field, min/max stretched to the
    /// source's pixel range.
    pub reconstructed: NamedImage,
}

impl FilterOutputs {
    /// Outputs in display order: source, spectrum, reconstruction.
    pub fn iter(&self) -> impl Iterator<Item = &NamedImage> {
        [&self.source, &self.power_spectrum, &self.reconstructed].into_iter()
    }
}

// ---------------------------------------------------------------------------
// FilterSession
// ---------------------------------------------------------------------------

/// One grayscale source image and the preview size its outputs are shown at.
///
/// Every call to [`calculate_bandpass`](Self::calculate_bandpass) builds its
/// own engine, field and mask; nothing is cached between requests.
#[derive(Debug, Clone)]
pub struct FilterSession {
    name: String,
    source: Image,
    /// Output size as `(width, height)`; `None` keeps the source size.
    preview: Option<(u32, u32)>,
}

impl FilterSession {
    /// Load `path` and convert it to grayscale. The session is named after
    /// the file stem.
    pub fn open(path: &Path, preview: Option<(u32, u32)>) -> Result<Self> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image")
            .to_string();
        let image = Image::load(path)?;
        Ok(Self::new(name, &image, preview))
    }

    /// Session over an in-memory image.
    pub fn new(name: impl Into<String>, image: &Image, preview: Option<(u32, u32)>) -> Self {
        let session = FilterSession {
            name: name.into(),
            source: image.to_grayscale(),
            preview,
        };
        log::trace!("[{}] {}", session.name, Stage::Loaded);
        session
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full-size grayscale source.
    pub fn source(&self) -> &Image {
        &self.source
    }

    pub fn preview_size(&self) -> Option<(u32, u32)> {
        self.preview
    }

    /// The grayscale source at preview size.
    pub fn source_preview(&self) -> Result<Image> {
        self.fit_preview(&mut SpectrumEngine::new(), &self.source)
    }

    /// Run one bandpass request: transform, mask, then derive the power
    /// spectrum and the reconstruction.
    pub fn calculate_bandpass(&self, params: &FilterParameters) -> Result<FilterOutputs> {
        log::debug!("[{}] bandpass {params}", self.name);
        let mut engine = SpectrumEngine::new();

        let field = engine.forward(&self.source)?;
        self.advance(Stage::Transformed);

        let mask = RadialMask::from_parameters(field.shape(), params);
        let masked = field.apply_mask(&mask)?;
        self.advance(Stage::Masked);

        let spectrum = masked.power_spectrum().to_image()?;
        self.advance(Stage::SpectrumComputed);

        // Byte-scale for display: the band usually drops the zero frequency,
        // so the raw reconstruction is signed around 0.
        let reconstructed = engine.inverse_real(&masked)?.stretch_to_scale();
        self.advance(Stage::Reconstructed);

        let outputs = FilterOutputs {
            source: NamedImage::new(
                self.name.clone(),
                self.fit_preview(&mut engine, &self.source)?,
            ),
            power_spectrum: NamedImage::new(
                format!("{}_ps", self.name),
                self.fit_preview(&mut engine, &spectrum)?,
            ),
            reconstructed: NamedImage::new(
                format!("{}ift", self.name),
                self.fit_preview(&mut engine, &reconstructed)?,
            ),
        };
        self.advance(Stage::Done);

        log::info!(
            "[{}] bandpass finished ({}x{} source)",
            self.name,
            self.source.width(),
            self.source.height()
        );
        Ok(outputs)
    }

    fn fit_preview(&self, engine: &mut SpectrumEngine, image: &Image) -> Result<Image> {
        match self.preview {
            Some((w, h)) => engine.preview(image, w, h),
            None => Ok(image.clone()),
        }
    }

    fn advance(&self, stage: Stage) {
        log::trace!("[{}] {stage}", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use ndarray::{Array2, Array3};
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-6 * 255.0;

    /// 8x8 board of 2x2 cells, bright cell in the top-left corner.
    fn checkerboard() -> Image {
        let gray = Array2::from_shape_fn((8, 8), |(i, j)| {
            if (i / 2 + j / 2) % 2 == 0 {
                255.0
            } else {
                0.0
            }
        });
        Image::from_gray(gray, 255.0).unwrap()
    }

    #[test]
    fn checkerboard_band_matches_reference() {
        let session = FilterSession::new("board", &checkerboard(), None);
        let params = FilterParameters::new(1, 0, 3, 0).unwrap();
        let out = session.calculate_bandpass(&params).unwrap();

        // The board's only non-DC energy sits at (±2, ±2) from the centre,
        // distance 2.83, inside the band; the DC term is blocked.
        let ps = out.power_spectrum.image.gray().unwrap();
        for ((i, j), &v) in ps.indexed_iter() {
            let expected = if [2, 6].contains(&i) && [2, 6].contains(&j) {
                255.0
            } else {
                0.0
            };
            assert!((v - expected).abs() <= TOLERANCE, "ps[{i},{j}] = {v}");
        }

        // Mean removed leaves ±127.5; the stretch maps that onto 0..=255.
        let rec = out.reconstructed.image.gray().unwrap();
        for ((i, j), &v) in rec.indexed_iter() {
            let expected = if (i / 2 + j / 2) % 2 == 0 { 255.0 } else { 0.0 };
            assert!((v - expected).abs() <= TOLERANCE, "ift[{i},{j}] = {v}");
        }

        assert_eq!(out.source.image, checkerboard());
    }

    #[test]
    fn outputs_are_named_and_previewed() {
        let session = FilterSession::new("board", &checkerboard(), Some((12, 10)));
        let params = FilterParameters::new(1, 1, 3, 1).unwrap();
        let out = session.calculate_bandpass(&params).unwrap();

        let names: Vec<&str> = out.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["board", "board_ps", "boardift"]);
        for o in out.iter() {
            assert_eq!(o.image.dims(), (10, 12));
        }
        assert_eq!(session.source_preview().unwrap().dims(), (10, 12));
        assert_eq!(session.source().dims(), (8, 8));
    }

    #[test]
    fn colour_source_is_converted() {
        let rgb = Image::from_samples(Array3::from_elem((4, 4, 3), 100.0), 255.0).unwrap();
        let session = FilterSession::new("rgb", &rgb, None);
        assert!(session.source().is_grayscale());
        for &v in session.source().samples() {
            assert!((v - 100.0).abs() < 1e-9);
        }
        let params = FilterParameters::new(0, 0, 10, 0).unwrap();
        let out = session.calculate_bandpass(&params).unwrap();
        assert!(out.source.image.is_grayscale());
    }

    #[test]
    fn band_keeps_both_half_waves_of_grating() {
        // Grating at spectral radius hypot(6, 8) = 10, inside the default band.
        let phase = |i: usize, j: usize| 2.0 * PI * (8 * j + 6 * i) as f64 / 64.0;
        let gray = Array2::from_shape_fn((64, 64), |(i, j)| 128.0 + 60.0 * phase(i, j).cos());
        let session = FilterSession::new("grating", &Image::from_gray(gray, 255.0).unwrap(), None);
        let params = FilterParameters::new(5, 2, 100, 10).unwrap();
        let out = session.calculate_bandpass(&params).unwrap();

        // DC removed, the cosine survives whole and is stretched onto 0..=255.
        let rec = out.reconstructed.image.gray().unwrap();
        for ((i, j), &v) in rec.indexed_iter() {
            let expected = (phase(i, j).cos() + 1.0) / 2.0 * 255.0;
            assert!((v - expected).abs() <= TOLERANCE, "ift[{i},{j}] = {v}");
        }
        let dark = rec.iter().filter(|&&v| v < 1.0).count();
        assert!(dark < 64 * 64 / 10, "{dark} near-black pixels");
    }

    #[test]
    fn zero_preview_aborts_request() {
        let session = FilterSession::new("board", &checkerboard(), Some((0, 4)));
        let params = FilterParameters::new(1, 0, 3, 0).unwrap();
        assert!(matches!(
            session.calculate_bandpass(&params),
            Err(FilterError::InvalidParameter(_))
        ));
    }

    #[test]
    fn open_missing_file_reports_io() {
        let err = FilterSession::open(Path::new("/nonexistent/board.png"), None).unwrap_err();
        assert!(matches!(err, FilterError::Io { .. }));
    }
}
