use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use super::files::sibling_frame_paths;
use super::model::{Frame, RawKineticBuffer};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a raw kinetic acquisition from disk.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – one header-less numeric matrix per kinetic index, saved as
///   `{base}{number}a.csv`, `{base}{number}b.csv`, ...; any one of them may be
///   given and the rest are found next to it
/// * `.json` – `{ "blocks": [[[...], ...], ...] }`
pub fn load_acquisition(path: &Path, kinetic_series_length: usize) -> Result<RawKineticBuffer> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let buffer = match ext.as_str() {
        "csv" => load_csv_series(path, kinetic_series_length)?,
        "json" => load_json(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    log::info!(
        "Loaded {} kinetic blocks from {}",
        buffer.len(),
        path.display()
    );
    Ok(buffer)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv_series(path: &Path, kinetic_series_length: usize) -> Result<RawKineticBuffer> {
    let blocks = sibling_frame_paths(path, kinetic_series_length)?
        .iter()
        .map(|p| load_block_csv(p).with_context(|| format!("loading {}", p.display())))
        .collect::<Result<Vec<_>>>()?;
    Ok(RawKineticBuffer::new(blocks))
}

/// Read one header-less CSV matrix into a frame.
pub fn load_block_csv(path: &Path) -> Result<Frame> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;

    let mut values = Vec::new();
    let mut cols: Option<usize> = None;
    let mut rows = 0;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        match cols {
            None => cols = Some(record.len()),
            Some(n) if n != record.len() => {
                bail!("CSV row {row_no} has {} values, expected {n}", record.len())
            }
            Some(_) => {}
        }
        for (j, tok) in record.iter().enumerate() {
            let v = tok
                .parse::<f64>()
                .with_context(|| format!("Row {row_no}, column {j}: '{tok}' is not a number"))?;
            values.push(v);
        }
        rows += 1;
    }

    Frame::from_shape_vec((rows, cols.unwrap_or(0)), values).context("assembling frame")
}

/// Write a frame in the layout [`load_block_csv`] reads.
pub fn save_block_csv(path: &Path, frame: &Frame) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in frame.rows() {
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema:
///
/// ```json
/// { "blocks": [ [[4, 4], [8, 8], [2, 2]], ... ] }
/// ```
#[derive(Debug, Deserialize)]
struct JsonAcquisition {
    blocks: Vec<Vec<Vec<f64>>>,
}

fn load_json(path: &Path) -> Result<RawKineticBuffer> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let parsed: JsonAcquisition = serde_json::from_str(&text).context("parsing JSON")?;

    let blocks = parsed
        .blocks
        .into_iter()
        .enumerate()
        .map(|(i, rows)| rows_to_frame(rows).with_context(|| format!("block {i}")))
        .collect::<Result<Vec<_>>>()?;
    Ok(RawKineticBuffer::new(blocks))
}

fn rows_to_frame(rows: Vec<Vec<f64>>) -> Result<Frame> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
        bail!("row {i} has {} values, expected {n_cols}", row.len());
    }
    let values: Vec<f64> = rows.into_iter().flatten().collect();
    Frame::from_shape_vec((n_rows, n_cols), values).context("assembling frame")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn csv_series_is_read_in_kinetic_order() {
        let tmp = tempfile::tempdir().unwrap();
        let a = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let b = array![[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]];
        save_block_csv(&tmp.path().join("iXon_img4a.csv"), &a).unwrap();
        save_block_csv(&tmp.path().join("iXon_img4b.csv"), &b).unwrap();

        let buffer = load_acquisition(&tmp.path().join("iXon_img4b.csv"), 2).unwrap();
        assert_eq!(buffer.blocks, vec![a, b]);
    }

    #[test]
    fn csv_tolerates_whitespace() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("frame.csv");
        std::fs::write(&path, "1, 2\n 3 ,4\n").unwrap();
        assert_eq!(load_block_csv(&path).unwrap(), array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn ragged_csv_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("frame.csv");
        std::fs::write(&path, "1,2\n3\n").unwrap();
        assert!(load_block_csv(&path).is_err());
    }

    #[test]
    fn non_numeric_csv_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("frame.csv");
        std::fs::write(&path, "1,2\n3,x\n").unwrap();
        let err = load_block_csv(&path).unwrap_err();
        assert!(format!("{err:#}").contains("'x' is not a number"));
    }

    #[test]
    fn missing_sibling_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        save_block_csv(&tmp.path().join("iXon_img4a.csv"), &array![[1.0]]).unwrap();
        assert!(load_acquisition(&tmp.path().join("iXon_img4a.csv"), 2).is_err());
    }

    #[test]
    fn json_blocks() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("acq.json");
        std::fs::write(&path, r#"{"blocks": [[[4, 4], [8, 8], [2, 2]]]}"#).unwrap();
        let buffer = load_acquisition(&path, 1).unwrap();
        assert_eq!(buffer.blocks, vec![array![[4.0, 4.0], [8.0, 8.0], [2.0, 2.0]]]);
    }

    #[test]
    fn ragged_json_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("acq.json");
        std::fs::write(&path, r#"{"blocks": [[[4, 4], [8]]]}"#).unwrap();
        assert!(load_acquisition(&path, 1).is_err());
    }

    #[test]
    fn unknown_extension() {
        assert!(load_acquisition(Path::new("acq.parquet"), 1).is_err());
    }
}
