//! Export functionality for Tally

pub mod csv;

pub use self::csv::export_register_csv;
