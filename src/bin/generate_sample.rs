use std::path::PathBuf;

use anyhow::Result;
use krbcam_viewer::config::Settings;
use krbcam_viewer::data::files::{frame_file_name, next_file_number};
use krbcam_viewer::data::loader::save_block_csv;
use krbcam_viewer::data::model::Frame;
use ndarray::{s, Array2};

const ROWS: usize = 64;
const COLS: usize = 96;
const DARK_LEVEL: f64 = 400.0;
const LIGHT_LEVEL: f64 = 1800.0;

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
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Peak OD, centre (row, col) and widths (rows, cols) of a Gaussian cloud.
struct Cloud {
    peak_od: f64,
    center: (f64, f64),
    sigma: (f64, f64),
}

impl Cloud {
    fn od_at(&self, row: usize, col: usize) -> f64 {
        let dr = (row as f64 - self.center.0) / self.sigma.0;
        let dc = (col as f64 - self.center.1) / self.sigma.1;
        self.peak_od * (-(dr * dr + dc * dc) / 2.0).exp()
    }
}

/// One raw block: shadow, light and dark stacked along the rows.
fn kinetic_block(cloud: &Cloud, rng: &mut SimpleRng) -> Frame {
    let dark = Array2::from_shape_fn((ROWS, COLS), |_| rng.gauss(DARK_LEVEL, 5.0).round());
    let light = Array2::from_shape_fn((ROWS, COLS), |(r, c)| {
        dark[[r, c]] + rng.gauss(LIGHT_LEVEL - DARK_LEVEL, 20.0).round()
    });
    let mut shadow = Array2::from_shape_fn((ROWS, COLS), |(r, c)| {
        let transmitted = (light[[r, c]] - dark[[r, c]]) * (-cloud.od_at(r, c)).exp();
        dark[[r, c]] + transmitted.round()
    });
    // Dead column: shadow reads dark, so the OD saturates there.
    shadow.column_mut(COLS - 4).assign(&dark.column(COLS - 4));

    let mut block = Array2::zeros((3 * ROWS, COLS));
    block.slice_mut(s![0..ROWS, ..]).assign(&shadow);
    block.slice_mut(s![ROWS..2 * ROWS, ..]).assign(&light);
    block.slice_mut(s![2 * ROWS.., ..]).assign(&dark);
    block
}

fn main() -> Result<()> {
    env_logger::init();

    let settings = Settings::load()?;
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_acquisition"));
    let file_number = next_file_number(&out_dir, &settings.filename_base)?;

    let mut rng = SimpleRng::new(42);
    let clouds = [
        Cloud {
            peak_od: 1.8,
            center: (30.0, 40.0),
            sigma: (8.0, 12.0),
        },
        Cloud {
            peak_od: 1.1,
            center: (34.0, 52.0),
            sigma: (12.0, 16.0),
        },
    ];

    for k in 0..settings.kinetic_series_length {
        let cloud = &clouds[k % clouds.len()];
        let block = kinetic_block(cloud, &mut rng);
        let path = out_dir.join(frame_file_name(&settings.filename_base, file_number, k)?);
        save_block_csv(&path, &block)?;
        println!("Wrote {}", path.display());
    }

    println!(
        "Acquisition {file_number}: {} kinetic frames of {COLS}x{ROWS} px in {}",
        settings.kinetic_series_length,
        out_dir.display()
    );
    Ok(())
}
