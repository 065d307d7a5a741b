use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

// ---------------------------------------------------------------------------
// Saved frame naming
// ---------------------------------------------------------------------------
//
// Each acquisition is saved as one CSV per kinetic index:
//   `{base}{file_number}{letter}.csv`, e.g. `iXon_img10a.csv`, `iXon_img10b.csv`

const FRAME_EXTENSION: &str = "csv";

/// Letter tagging kinetic index `k` in a file name (`a` for 0).
pub fn kinetic_letter(k: usize) -> Option<char> {
    u8::try_from(k)
        .ok()
        .filter(|&k| k < 26)
        .map(|k| char::from(b'a' + k))
}

pub fn frame_file_name(base: &str, file_number: u32, kinetic_index: usize) -> Result<String> {
    let letter = kinetic_letter(kinetic_index)
        .with_context(|| format!("kinetic index {kinetic_index} has no file letter"))?;
    Ok(format!("{base}{file_number}{letter}.{FRAME_EXTENSION}"))
}

/// Extract the file number from a saved frame name, e.g. `10` from
/// `iXon_img10a.csv` with base `iXon_img`.
pub fn parse_file_number(file_name: &str, base: &str) -> Option<u32> {
    let rest = file_name.strip_prefix(base)?;
    let stem = rest.strip_suffix(&format!(".{FRAME_EXTENSION}"))?;
    let mut chars = stem.chars();
    let letter = chars.next_back()?;
    if !letter.is_ascii_lowercase() {
        return None;
    }
    chars.as_str().parse().ok()
}

/// First unused file number in `dir`.
///
/// Creates `dir` (and parents) when missing, in which case numbering starts at 0.
pub fn next_file_number(dir: &Path, base: &str) -> Result<u32> {
    if !dir.is_dir() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating save directory {}", dir.display()))?;
        log::info!("Created save directory {}", dir.display());
        return Ok(0);
    }

    let mut next = 0;
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("listing save directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry.context("reading directory entry")?;
        let name = entry.file_name();
        if let Some(n) = name.to_str().and_then(|n| parse_file_number(n, base)) {
            next = next.max(n.saturating_add(1));
        }
    }
    Ok(next)
}

/// Paths of all `k_len` frame files belonging to the same acquisition as
/// `path`, in kinetic order.
pub fn sibling_frame_paths(path: &Path, k_len: usize) -> Result<Vec<PathBuf>> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?;

    let mut chars = stem.chars();
    match chars.next_back() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => bail!(
            "{} does not end in a kinetic index letter (a, b, ...)",
            path.display()
        ),
    }
    let prefix = chars.as_str();
    let dir = path.parent().unwrap_or_else(|| Path::new(""));

    (0..k_len)
        .map(|k| {
            let letter = kinetic_letter(k)
                .with_context(|| format!("kinetic index {k} has no file letter"))?;
            Ok(dir.join(format!("{prefix}{letter}.{FRAME_EXTENSION}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_kinetic_letters() {
        assert_eq!(frame_file_name("iXon_img", 10, 0).unwrap(), "iXon_img10a.csv");
        assert_eq!(frame_file_name("iXon_img", 10, 1).unwrap(), "iXon_img10b.csv");
        assert!(frame_file_name("iXon_img", 1, 26).is_err());
    }

    #[test]
    fn parses_file_numbers() {
        assert_eq!(parse_file_number("iXon_img10a.csv", "iXon_img"), Some(10));
        assert_eq!(parse_file_number("iXon_img0b.csv", "iXon_img"), Some(0));
        assert_eq!(parse_file_number("iXon_img10.csv", "iXon_img"), None);
        assert_eq!(parse_file_number("iXon_imgXa.csv", "iXon_img"), None);
        assert_eq!(parse_file_number("other10a.csv", "iXon_img"), None);
        assert_eq!(parse_file_number("iXon_img10a.png", "iXon_img"), None);
    }

    #[test]
    fn next_number_in_missing_dir_creates_it() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("20240101");
        assert_eq!(next_file_number(&dir, "iXon_img").unwrap(), 0);
        assert!(dir.is_dir());
    }

    #[test]
    fn next_number_skips_past_highest() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["iXon_img3a.csv", "iXon_img3b.csv", "iXon_img12a.csv", "notes.txt"] {
            std::fs::write(tmp.path().join(name), "").unwrap();
        }
        assert_eq!(next_file_number(tmp.path(), "iXon_img").unwrap(), 13);
    }

    #[test]
    fn siblings_in_kinetic_order() {
        let paths = sibling_frame_paths(Path::new("data/iXon_img7b.csv"), 2).unwrap();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("data/iXon_img7a.csv"),
                PathBuf::from("data/iXon_img7b.csv")
            ]
        );
    }

    #[test]
    fn siblings_need_a_letter() {
        assert!(sibling_frame_paths(Path::new("data/iXon_img7.csv"), 2).is_err());
    }
}
