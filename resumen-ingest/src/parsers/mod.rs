//! Text interpreters that turn extracted statement text into expense lines.

pub mod metadata;
pub mod statement;

pub use metadata::{MetadataDetector, SPANISH_MONTHS, month_year_es};
pub use statement::{StatementParser, parse_ar_amount};
