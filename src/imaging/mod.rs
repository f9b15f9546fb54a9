/// Filtering core: image grids, masks and transforms.
///
/// Architecture:
/// ```text
///  .png / .jpg / .gif / .bmp / .tiff
///        │
///        ▼
///   ┌──────────┐
///   │  image    │  decode → Image, to_grayscale, resize
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │   spectrum    │  forward → FrequencyField (zero frequency centred)
///   └──────────────┘
///        │            ┌──────────┐
///        ├──────────▶ │  mask     │  RadialMask::bandpass(params)
///        │            └──────────┘
///        ▼
///   apply_mask ──▶ power_spectrum (display)
///              └─▶ inverse → Image (reconstructed)
/// ```
pub mod image;
pub mod mask;
pub mod params;
pub mod spectrum;

pub use self::image::Image;
pub use mask::RadialMask;
pub use params::FilterParameters;
pub use spectrum::{FrequencyField, PowerSpectrum, SpectrumEngine};
