use std::path::{Path, PathBuf};

use anyhow::Result;
use thiserror::Error;

use crate::color::ColorScale;
use crate::config::Settings;
use crate::data::loader::load_acquisition;
use crate::data::model::{Frame, FrameKind, ProcessedDataset, RawKineticBuffer};
use crate::data::od::{ExtractError, OdExtractor};

// ---------------------------------------------------------------------------
// Selection and display limits
// ---------------------------------------------------------------------------

/// Which image is on screen: kinetic index and frame within its OD series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub kinetic_index: usize,
    pub frame: FrameKind,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            kinetic_index: 0,
            frame: FrameKind::Od,
        }
    }
}

/// Colour range of the image, always `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub min: i64,
    pub max: i64,
}

impl Limits {
    /// Order the pair so that `min <= max`.
    pub fn new(a: i64, b: i64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn scale(&self) -> ColorScale {
        ColorScale::new(self.min as f64, self.max as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitsError {
    #[error("invalid display limit '{0}': must be a number")]
    NotANumber(String),
}

/// Parse a limit entry the way the image window accepts it: any number,
/// truncated toward zero.
pub fn parse_limit(text: &str) -> Result<i64, LimitsError> {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v.trunc() as i64),
        _ => Err(LimitsError::NotANumber(trimmed.to_string())),
    }
}

/// One OD range and one count range per kinetic index.
#[derive(Debug, Clone, PartialEq)]
struct DisplayLimits {
    od: Vec<Limits>,
    counts: Vec<Limits>,
}

impl DisplayLimits {
    fn from_settings(settings: &Settings) -> Self {
        let k_len = settings.kinetic_series_length;
        let [od_a, od_b] = settings.od_limits;
        let [c_a, c_b] = settings.count_limits;
        Self {
            od: vec![Limits::new(od_a, od_b); k_len],
            counts: vec![Limits::new(c_a, c_b); k_len],
        }
    }

    fn slot(&mut self, sel: Selection) -> Option<&mut Limits> {
        let list = if sel.frame.is_od() {
            &mut self.od
        } else {
            &mut self.counts
        };
        list.get_mut(sel.kinetic_index)
    }

    fn get(&self, sel: Selection) -> Option<Limits> {
        let list = if sel.frame.is_od() { &self.od } else { &self.counts };
        list.get(sel.kinetic_index).copied()
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,
    extractor: OdExtractor,

    /// Latest processed acquisition (None until one is loaded).
    pub dataset: Option<ProcessedDataset>,

    /// File the current dataset came from.
    pub source: Option<PathBuf>,

    selection: Selection,
    limits: DisplayLimits,

    /// Text in the min / max entries, applied on Enter.
    pub min_text: String,
    pub max_text: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Bumped whenever the displayed image changes.
    revision: u64,
}

impl AppState {
    pub fn new(settings: Settings, extractor: OdExtractor) -> Self {
        let limits = DisplayLimits::from_settings(&settings);
        let mut state = Self {
            settings,
            extractor,
            dataset: None,
            source: None,
            selection: Selection::default(),
            limits,
            min_text: String::new(),
            max_text: String::new(),
            status_message: None,
            revision: 0,
        };
        state.sync_limit_text();
        state
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Process a raw acquisition and make it the displayed dataset.
    ///
    /// On error the previous dataset stays on screen.
    pub fn ingest(&mut self, buffer: &RawKineticBuffer) -> Result<(), ExtractError> {
        let dataset = self.extractor.process(buffer)?;
        log::info!(
            "Processed acquisition: {} kinetic frames of {:?}",
            dataset.len(),
            dataset.frame_dim()
        );
        self.dataset = Some(dataset);
        self.status_message = None;
        self.touch();
        Ok(())
    }

    /// Load an acquisition from disk and ingest it.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        let buffer = load_acquisition(path, self.settings.kinetic_series_length)?;
        self.ingest(&buffer)?;
        self.source = Some(path.to_path_buf());
        Ok(())
    }

    /// Like [`AppState::load_path`], reporting failure in the status line.
    pub fn open(&mut self, path: &Path) {
        if let Err(e) = self.load_path(path) {
            log::error!("Failed to load {}: {e:#}", path.display());
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    pub fn select_kinetic(&mut self, kinetic_index: usize) {
        if kinetic_index >= self.settings.kinetic_series_length {
            return;
        }
        self.select(Selection {
            kinetic_index,
            ..self.selection
        });
    }

    pub fn select_frame(&mut self, frame: FrameKind) {
        self.select(Selection {
            frame,
            ..self.selection
        });
    }

    fn select(&mut self, selection: Selection) {
        if selection != self.selection {
            self.selection = selection;
            self.sync_limit_text();
            self.touch();
        }
    }

    /// Image for the current selection; `None` means no data available.
    pub fn current_frame(&self) -> Option<&Frame> {
        self.dataset
            .as_ref()?
            .frame(self.selection.kinetic_index, self.selection.frame)
    }

    pub fn current_limits(&self) -> Limits {
        self.limits
            .get(self.selection)
            .unwrap_or_else(|| Limits::new(0, 0))
    }

    /// Parse the min / max entries and store them for the current selection.
    pub fn apply_limit_text(&mut self) -> Result<Limits, LimitsError> {
        let min = parse_limit(&self.min_text)?;
        let max = parse_limit(&self.max_text)?;
        let limits = Limits::new(min, max);
        if let Some(slot) = self.limits.slot(self.selection) {
            *slot = limits;
        }
        self.sync_limit_text();
        self.touch();
        Ok(limits)
    }

    /// [`AppState::apply_limit_text`] with errors shown in the status line.
    pub fn commit_limits(&mut self) {
        match self.apply_limit_text() {
            Ok(_) => self.status_message = None,
            Err(e) => {
                log::warn!("{e}");
                self.status_message = Some(e.to_string());
                self.sync_limit_text();
            }
        }
    }

    fn sync_limit_text(&mut self) {
        let limits = self.current_limits();
        self.min_text = limits.min.to_string();
        self.max_text = limits.max.to_string();
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
