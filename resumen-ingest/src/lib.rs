//! resumen-ingest: credit-card statement PDFs to expense lines.
//!
//! Two pure stages: [`extract`] turns raw PDF bytes into best-effort text,
//! [`parsers`] turns that text into [`ParsedExpenseLine`]s plus bank, card
//! network and billing period. [`importer`] ties them together behind the
//! three request-level failures callers must surface.

pub mod error;
pub mod extract;
pub mod importer;
pub mod parsers;
pub mod rules;
pub mod types;

pub use error::{ExtractError, StatementError};
pub use extract::{ExtractOptions, TextExtractor, extract_text};
pub use importer::{StatementImporter, StatementUpload, ensure_pdf_filename, import_statement};
pub use parsers::StatementParser;
pub use rules::{BankRule, NetworkRule, StatementRules};
pub use types::{Bank, CardNetwork, ParseResult, ParsedExpenseLine, StatementMetadata};
