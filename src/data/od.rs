use ndarray::{s, Zip};
use thiserror::Error;

use super::model::{Frame, OdSeries, ProcessedDataset, RawKineticBuffer};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a raw buffer cannot be split into OD series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeProblem {
    #[error("expected {expected} kinetic blocks, found {found}")]
    TooFewBlocks { expected: usize, found: usize },

    #[error("block {block} has {rows} rows, which does not split into {num_sub_images} equal sub-images")]
    UnevenRows {
        block: usize,
        rows: usize,
        num_sub_images: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("invalid buffer shape: {0}")]
    InvalidBufferShape(#[from] ShapeProblem),

    #[error("invalid extractor configuration: {0}")]
    InvalidConfig(&'static str),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Fixed acquisition constants the extractor works with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorConfig {
    /// Number of kinetic blocks to read from each buffer.
    pub kinetic_series_length: usize,
    /// Sub-exposures stacked in each block (shadow, light, dark, ...).
    pub num_sub_images: usize,
    /// OD written where the light passes but the shadow reads zero.
    pub od_max: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            kinetic_series_length: 2,
            num_sub_images: 3,
            od_max: 3.0,
        }
    }
}

impl ExtractorConfig {
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.kinetic_series_length == 0 {
            return Err(ExtractError::InvalidConfig(
                "kinetic series length must be at least 1",
            ));
        }
        if self.num_sub_images < 3 {
            return Err(ExtractError::InvalidConfig(
                "each block needs shadow, light and dark sub-images",
            ));
        }
        if !self.od_max.is_finite() {
            return Err(ExtractError::InvalidConfig("od_max must be finite"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Turns raw kinetic readouts into per-index OD series.
///
/// Stateless: the same buffer always yields the same dataset, and the buffer
/// itself is only read.
#[derive(Debug, Clone, Default)]
pub struct OdExtractor {
    config: ExtractorConfig,
}

impl OdExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Split every kinetic block and compute its OD frame.
    ///
    /// Blocks past the configured series length are ignored.
    pub fn process(&self, buffer: &RawKineticBuffer) -> Result<ProcessedDataset, ExtractError> {
        let k_len = self.config.kinetic_series_length;
        if buffer.len() < k_len {
            return Err(ShapeProblem::TooFewBlocks {
                expected: k_len,
                found: buffer.len(),
            }
            .into());
        }
        if buffer.len() > k_len {
            log::debug!(
                "Ignoring {} trailing blocks beyond kinetic series length {k_len}",
                buffer.len() - k_len
            );
        }

        let mut series = Vec::with_capacity(k_len);
        for (index, block) in buffer.blocks.iter().take(k_len).enumerate() {
            let rows = block.nrows();
            if rows % self.config.num_sub_images != 0 {
                log::warn!("Rejecting kinetic block {index} with {rows} rows");
                return Err(ShapeProblem::UnevenRows {
                    block: index,
                    rows,
                    num_sub_images: self.config.num_sub_images,
                }
                .into());
            }
            let subs = split_sub_frames(block, self.config.num_sub_images)?;
            let od = optical_density(&subs[0], &subs[1], &subs[2], self.config.od_max);
            series.push(OdSeries::new(od, subs));
        }

        if let Some(first) = series.first() {
            log::debug!(
                "Processed {} kinetic frames of {:?} pixels",
                series.len(),
                first.od().dim()
            );
        }
        Ok(ProcessedDataset { series })
    }
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// Cut a block into `num_sub_images` equal horizontal bands, top to bottom.
///
/// The row count must divide evenly. A bare block carries no kinetic index,
/// so an uneven one is reported as block 0.
pub fn split_sub_frames(block: &Frame, num_sub_images: usize) -> Result<Vec<Frame>, ExtractError> {
    if num_sub_images == 0 {
        return Err(ExtractError::InvalidConfig("number of sub-images must be positive"));
    }
    let rows = block.nrows();
    if rows % num_sub_images != 0 {
        return Err(ShapeProblem::UnevenRows {
            block: 0,
            rows,
            num_sub_images,
        }
        .into());
    }
    let height = rows / num_sub_images;
    Ok((0..num_sub_images)
        .map(|j| block.slice(s![j * height..(j + 1) * height, ..]).to_owned())
        .collect())
}

/// Element-wise `ln((light - dark) / (shadow - dark))` with degenerate pixels
/// replaced by finite values (see [`od_pixel`]).
pub fn optical_density(shadow: &Frame, light: &Frame, dark: &Frame, od_max: f64) -> Frame {
    Zip::from(shadow)
        .and(light)
        .and(dark)
        .map_collect(|&s, &l, &d| od_pixel(s - d, l - d, od_max))
}

/// OD of one pixel from its dark-subtracted shadow and background counts.
///
/// | case | result |
/// |---|---|
/// | `shadow_diff == 0`, `background_diff > 0` | `od_max` |
/// | `shadow_diff == 0`, otherwise | `0` |
/// | `background_diff == 0` | `0` |
/// | ratio `<= 0` or NaN | `0` |
/// | ratio `+inf` | `od_max` |
/// | otherwise | `ln(ratio)` |
pub fn od_pixel(shadow_diff: f64, background_diff: f64, od_max: f64) -> f64 {
    if shadow_diff == 0.0 {
        return if background_diff > 0.0 { od_max } else { 0.0 };
    }
    if background_diff == 0.0 {
        return 0.0;
    }
    let ratio = background_diff / shadow_diff;
    if ratio.is_nan() || ratio <= 0.0 {
        return 0.0;
    }
    sanitize(ratio.ln(), od_max)
}

fn sanitize(od: f64, od_max: f64) -> f64 {
    if od == f64::INFINITY {
        od_max
    } else if od.is_finite() {
        od
    } else {
        0.0
    }
}
