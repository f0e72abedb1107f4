//! Output generation for result segments and the analysis report.
//!
//! # Submodules
//!
//! - [`segments`]: Persists one JSON segment per (country, risk category) batch
//! - [`analysis`]: Summarises every persisted segment into a Markdown report
//!
//! # Output Structure
//!
//! Directory and file names are a slug of the label followed by the first
//! 12 hex digits of its SHA-256.
//!
//! ```text
//! output_dir/
//! ├── ghana-583201c1efbf/
//! │   ├── child_labour-d632673b38b4.json     # one segment per risk category
//! │   └── slavery-f5778592072e.json
//! ├── côte-divoire-95ffc51dd938/
//! │   └── forced_labour-0cf4faa71573.json
//! └── analysis.md               # written by the data_analysis component
//! ```

pub mod analysis;
pub mod segments;
