use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use rusty_bandpass::config::Config;
use rusty_bandpass::imaging::FilterParameters;
use rusty_bandpass::{FilterOutputs, FilterSession};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "rusty-bandpass")]
#[command(about = "Apply a frequency-domain bandpass filter to a grayscale image")]
#[command(version, allow_negative_numbers = true)]
struct Cli {
    /// Path to the input image.
    image: PathBuf,

    /// JSON file with default parameters and preview size.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Inner radius of the band (frequency cells).
    #[arg(long)]
    inradius: Option<i64>,

    /// Smoothing width around the inner radius.
    #[arg(long)]
    insmooth: Option<i64>,

    /// Outer radius of the band (frequency cells).
    #[arg(long)]
    outradius: Option<i64>,

    /// Smoothing width around the outer radius.
    #[arg(long)]
    outsmooth: Option<i64>,

    /// Width of the written previews.
    #[arg(long)]
    preview_width: Option<u32>,

    /// Height of the written previews.
    #[arg(long)]
    preview_height: Option<u32>,

    /// Write outputs at the source size.
    #[arg(long)]
    native_size: bool,

    /// Working directory for the outputs.  Defaults to a directory next to
    /// the input, named after its file stem.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied.
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(v) = self.inradius {
            config.inner_radius = v;
        }
        if let Some(v) = self.insmooth {
            config.inner_smooth = v;
        }
        if let Some(v) = self.outradius {
            config.outer_radius = v;
        }
        if let Some(v) = self.outsmooth {
            config.outer_smooth = v;
        }
        if let Some(v) = self.preview_width {
            config.preview_width = v;
        }
        if let Some(v) = self.preview_height {
            config.preview_height = v;
        }
        config.native_size |= self.native_size;
        Ok(config)
    }

    fn working_dir(&self) -> PathBuf {
        if let Some(dir) = &self.out_dir {
            return dir.clone();
        }
        let stem = self
            .image
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "bandpass".into());
        self.image
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(stem)
    }
}

// ---------------------------------------------------------------------------
// Summary printed on success
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct OutputSummary {
    name: String,
    path: PathBuf,
    width: usize,
    height: usize,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    source: PathBuf,
    parameters: FilterParameters,
    outputs: Vec<OutputSummary>,
}

fn write_outputs(outputs: &FilterOutputs, dir: &Path) -> Result<Vec<OutputSummary>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating working directory {}", dir.display()))?;

    outputs
        .iter()
        .map(|out| -> Result<OutputSummary> {
            let path = dir.join(format!("{}.png", out.name));
            out.image
                .to_luma8()
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("Wrote {}", path.display());
            Ok(OutputSummary {
                name: out.name.clone(),
                path,
                width: out.image.width(),
                height: out.image.height(),
            })
        })
        .collect()
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let config = cli.resolve_config()?;
    let params = config.parameters()?;

    let session = FilterSession::open(&cli.image, config.preview())
        .with_context(|| format!("opening {}", cli.image.display()))?;
    let outputs = session
        .calculate_bandpass(&params)
        .with_context(|| format!("filtering {} ({params})", session.name()))?;

    let dir = cli.working_dir();
    let written = write_outputs(&outputs, &dir)?;

    Ok(RunSummary {
        source: cli.image.clone(),
        parameters: params,
        outputs: written,
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Err(e) => {
            log::error!("Bandpass failed: {e:#}");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_bandpass::FilterError;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rusty-bandpass").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse(&["photos/cat.png", "--inradius", "7", "--outsmooth", "3", "--native-size"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(
            config,
            Config {
                inner_radius: 7,
                outer_smooth: 3,
                native_size: true,
                ..Config::default()
            }
        );
        assert_eq!(config.preview(), None);
        assert_eq!(
            config.parameters().unwrap(),
            FilterParameters::new(7, 2, 100, 3).unwrap()
        );
    }

    #[test]
    fn preview_flags_set_output_size() {
        let cli = parse(&["cat.png", "--preview-width", "320", "--preview-height", "240"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.preview(), Some((320, 240)));
    }

    #[test]
    fn flags_win_over_config_file() {
        let path = std::env::temp_dir().join(format!(
            "rusty_bandpass_{}_cli_config.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "outer_radius": 40, "native_size": true }"#).unwrap();
        let cli = parse(&[
            "cat.png",
            "--config",
            path.to_str().unwrap(),
            "--outradius",
            "50",
        ]);
        let config = cli.resolve_config();
        std::fs::remove_file(&path).ok();
        let config = config.unwrap();

        assert_eq!(config.outer_radius, 50);
        assert_eq!(config.inner_radius, 5);
        // A file that asks for native size keeps it without the flag.
        assert!(config.native_size);
    }

    #[test]
    fn missing_config_file_fails() {
        let cli = parse(&["cat.png", "--config", "/nonexistent/bandpass.json"]);
        assert!(cli.resolve_config().is_err());
    }

    #[test]
    fn negative_radius_reaches_validation() {
        let cli = parse(&["cat.png", "--inradius", "-3"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.inner_radius, -3);
        let err = config.parameters().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FilterError>(),
            Some(FilterError::InvalidParameter(_))
        ));
    }

    #[test]
    fn working_dir_defaults_next_to_image() {
        let cli = parse(&["photos/cat.png"]);
        assert_eq!(cli.working_dir(), PathBuf::from("photos/cat"));

        let cli = parse(&["cat.png"]);
        assert_eq!(cli.working_dir(), PathBuf::from("cat"));
    }

    #[test]
    fn out_dir_overrides_working_dir() {
        let cli = parse(&["photos/cat.png", "--out-dir", "/tmp/filtered"]);
        assert_eq!(cli.working_dir(), PathBuf::from("/tmp/filtered"));
    }
}
