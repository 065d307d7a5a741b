/// Data layer: frame types, file I/O, and the OD pipeline.
///
/// Architecture:
/// ```text
///  iXon_img10a.csv, iXon_img10b.csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse files → RawKineticBuffer
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │    od     │  split shadow/light/dark, compute OD
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ ProcessedDataset │  [od, shadow, light, dark] per kinetic index
///   └──────────────────┘
/// ```

pub mod files;
pub mod loader;
pub mod model;
pub mod od;
