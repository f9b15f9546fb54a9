use std::f64::consts::PI;

use anyhow::{Context, Result};
use image::{GrayImage, Luma};

const SIZE: u32 = 256;

/// A cosine grating: `amplitude · cos(2π (fx·x + fy·y) / SIZE)`, where
/// `(fx, fy)` is its position in cells from the centre of the spectrum.
struct Grating {
    fx: f64,
    fy: f64,
    amplitude: f64,
}

impl Grating {
    fn radius(&self) -> f64 {
        self.fx.hypot(self.fy)
    }

    fn at(&self, x: f64, y: f64) -> f64 {
        self.amplitude * (2.0 * PI * (self.fx * x + self.fy * y) / f64::from(SIZE)).cos()
    }
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);

    // Slow gradient, mid-band diagonal grating, fine horizontal stripes.
    let gratings = [
        Grating { fx: 1.0, fy: 0.0, amplitude: 40.0 },
        Grating { fx: 12.0, fy: 9.0, amplitude: 35.0 },
        Grating { fx: 0.0, fy: 60.0, amplitude: 30.0 },
    ];

    let img = GrayImage::from_fn(SIZE, SIZE, |x, y| {
        let signal: f64 = gratings
            .iter()
            .map(|g| g.at(f64::from(x), f64::from(y)))
            .sum();
        let v = 128.0 + signal + rng.gauss(0.0, 6.0);
        Luma([v.clamp(0.0, 255.0).round() as u8])
    });

    let output_path = "sample_bandpass.png";
    img.save(output_path)
        .with_context(|| format!("writing {output_path}"))?;

    log::info!("Wrote {output_path}");
    println!("Wrote {SIZE}x{SIZE} sample to {output_path}");
    for g in &gratings {
        println!(
            "  grating at radius {:.1} (amplitude {})",
            g.radius(),
            g.amplitude
        );
    }
    Ok(())
}
