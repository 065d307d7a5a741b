use std::fmt;

use ndarray::Array2;

// ---------------------------------------------------------------------------
// Frame – a single 2D detector image
// ---------------------------------------------------------------------------

/// A 2D image indexed `[row, col]`.
pub type Frame = Array2<f64>;

// ---------------------------------------------------------------------------
// RawKineticBuffer – one acquisition as read out from the camera
// ---------------------------------------------------------------------------

/// The raw readout of one fast-kinetics acquisition.
///
/// Each block holds `num_sub_images` exposures stacked along the row axis:
/// shadow first, then light, then dark.
#[derive(Debug, Clone, PartialEq)]
pub struct RawKineticBuffer {
    pub blocks: Vec<Frame>,
}

impl RawKineticBuffer {
    pub fn new(blocks: Vec<Frame>) -> Self {
        Self { blocks }
    }

    /// Number of kinetic blocks in the buffer.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

// ---------------------------------------------------------------------------
// FrameKind – which image of an OD series to look at
// ---------------------------------------------------------------------------

/// Position of an image inside an [`OdSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrameKind {
    Od,
    Shadow,
    Light,
    Dark,
}

impl FrameKind {
    pub const ALL: [FrameKind; 4] = [
        FrameKind::Od,
        FrameKind::Shadow,
        FrameKind::Light,
        FrameKind::Dark,
    ];

    /// Index into [`OdSeries::frames`].
    pub fn index(self) -> usize {
        match self {
            FrameKind::Od => 0,
            FrameKind::Shadow => 1,
            FrameKind::Light => 2,
            FrameKind::Dark => 3,
        }
    }

    /// Whether the frame holds optical density rather than raw counts.
    pub fn is_od(self) -> bool {
        self == FrameKind::Od
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameKind::Od => "OD",
            FrameKind::Shadow => "Shadow",
            FrameKind::Light => "Light",
            FrameKind::Dark => "Dark",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// OdSeries / ProcessedDataset – extractor output
// ---------------------------------------------------------------------------

/// The computed OD frame followed by the raw sub-frames of one kinetic index.
#[derive(Debug, Clone, PartialEq)]
pub struct OdSeries {
    frames: Vec<Frame>,
}

impl OdSeries {
    /// Prepend `od` to the sub-frames, keeping their order.
    pub fn new(od: Frame, sub_frames: Vec<Frame>) -> Self {
        let mut frames = Vec::with_capacity(sub_frames.len() + 1);
        frames.push(od);
        frames.extend(sub_frames);
        Self { frames }
    }

    pub fn od(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn frame(&self, kind: FrameKind) -> Option<&Frame> {
        self.frames.get(kind.index())
    }

    /// All frames in order: `[od, shadow, light, dark, ...]`.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

/// One [`OdSeries`] per kinetic index, in acquisition order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDataset {
    pub series: Vec<OdSeries>,
}

impl ProcessedDataset {
    pub fn series(&self, kinetic_index: usize) -> Option<&OdSeries> {
        self.series.get(kinetic_index)
    }

    pub fn frame(&self, kinetic_index: usize, kind: FrameKind) -> Option<&Frame> {
        self.series(kinetic_index)?.frame(kind)
    }

    /// Number of kinetic indices.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// `(rows, cols)` of the frames, if any.
    pub fn frame_dim(&self) -> Option<(usize, usize)> {
        self.series.first().map(|s| s.od().dim())
    }
}

// ---------------------------------------------------------------------------
// FrameStats – summary numbers shown next to the image
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl FrameStats {
    /// `None` for an empty frame.
    pub fn of(frame: &Frame) -> Option<Self> {
        if frame.is_empty() {
            return None;
        }
        let min = frame.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = frame.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = frame.sum() / frame.len() as f64;
        Some(Self { min, max, mean })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn series_keeps_od_first() {
        let od = Frame::from_elem((1, 1), 9.0);
        let subs = vec![
            Frame::from_elem((1, 1), 1.0),
            Frame::from_elem((1, 1), 2.0),
            Frame::from_elem((1, 1), 3.0),
        ];
        let series = OdSeries::new(od, subs);

        let firsts: Vec<f64> = series.frames().iter().map(|f| f[[0, 0]]).collect();
        assert_eq!(firsts, vec![9.0, 1.0, 2.0, 3.0]);
        assert_eq!(series.frame(FrameKind::Light).unwrap()[[0, 0]], 2.0);
    }

    #[test]
    fn stats_of_small_frame() {
        let frame = array![[1.0, 2.0], [3.0, 6.0]];
        let stats = FrameStats::of(&frame).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 6.0);
        assert_eq!(stats.mean, 3.0);
    }

    #[test]
    fn stats_of_empty_frame() {
        assert!(FrameStats::of(&Frame::zeros((0, 4))).is_none());
    }

    #[test]
    fn frame_kind_labels() {
        let labels: Vec<String> = FrameKind::ALL.iter().map(|k| k.to_string()).collect();
        assert_eq!(labels, ["OD", "Shadow", "Light", "Dark"]);
    }
}
