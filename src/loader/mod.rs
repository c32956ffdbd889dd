//! Point loading: either from a delimited file (local or remote) or from
//! a seeded random generator covering the continental US.

pub mod csv_file;
pub mod synthetic;
pub mod types;

pub use csv_file::{CsvSettings, load_csv, parse_csv, parse_timestamp};
pub use synthetic::{SyntheticSettings, generate_synthetic};
pub use types::PointRecord;
