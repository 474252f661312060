//! CSV row shapes and parsing for distillery and bottle import files.
//!
//! Import files carry a header row and one record per line. Distillery files
//! use the columns `name`, `latitude`, `longitude`, `description`,
//! `tours_available`, and `tour_info`; bottle files use `distillery_name`,
//! `name`, and an optional `age_statement`.
//!
//! Parsing never aborts on a bad record. Each rejected record is reported with
//! its line number so the importer can log it and carry on with the rest.
//!
//! # Example
//!
//! ```
//! use distillery_csv::read_bottles;
//!
//! let csv = concat!(
//!     "distillery_name,name,age_statement\n",
//!     "Yamazaki,Yamazaki,12 Years\n",
//!     "Hakushu,Distiller's Reserve,\n",
//! );
//! let parsed = read_bottles(csv.as_bytes()).expect("headers are present");
//!
//! assert_eq!(parsed.rows.len(), 2);
//! assert_eq!(parsed.rows[1].age_statement, None);
//! assert!(parsed.rejected.is_empty());
//! ```

mod error;
mod reader;
mod rows;

pub use error::{CsvError, RowError};
pub use reader::{
    ParsedRows, read_bottles, read_bottles_from_path, read_distilleries,
    read_distilleries_from_path,
};
pub use rows::{BottleRow, DistilleryRow};
