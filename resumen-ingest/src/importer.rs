//! Upload boundary: bytes in, `ParseResult` or a typed failure out.

use chrono::NaiveDate;

use crate::error::{Result, StatementError};
use crate::extract::{ExtractOptions, TextExtractor, non_whitespace_len};
use crate::parsers::StatementParser;
use crate::rules::StatementRules;
use crate::types::ParseResult;

/// Below this many non-whitespace characters the file is treated as a scanned image.
pub const MIN_TEXT_CHARS: usize = 30;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A file as received from the caller.
#[derive(Debug, Clone, Copy)]
pub struct StatementUpload<'a> {
    pub filename: &'a str,
    pub bytes: &'a [u8],
}

/// Reject anything that is not named `*.pdf` (any case).
pub fn ensure_pdf_filename(filename: &str) -> Result<()> {
    if filename.to_lowercase().ends_with(".pdf") {
        Ok(())
    } else {
        Err(StatementError::UnsupportedFile {
            filename: filename.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct StatementImporter {
    extractor: TextExtractor,
    parser: StatementParser,
    max_upload_bytes: usize,
    reference_date: Option<NaiveDate>,
}

impl StatementImporter {
    pub fn new(rules: StatementRules, options: ExtractOptions) -> Result<Self> {
        let extractor = TextExtractor::new(options)?;
        let parser = StatementParser::new(rules)?;
        Ok(Self {
            extractor,
            parser,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            reference_date: None,
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(StatementRules::default(), ExtractOptions::default())
    }

    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    /// Pin the date used when a statement carries no period token.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn parser(&self) -> &StatementParser {
        &self.parser
    }

    pub fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        Ok(self.extractor.extract(bytes)?)
    }

    /// Validate filename and size, then import.
    pub fn import_upload(&self, upload: StatementUpload<'_>) -> Result<ParseResult> {
        ensure_pdf_filename(upload.filename)?;
        if upload.bytes.len() > self.max_upload_bytes {
            return Err(StatementError::FileTooLarge {
                size: upload.bytes.len(),
                limit: self.max_upload_bytes,
            });
        }
        log::info!("importing {} ({} bytes)", upload.filename, upload.bytes.len());
        self.import_bytes(upload.bytes)
    }

    pub fn import_bytes(&self, bytes: &[u8]) -> Result<ParseResult> {
        let text = self.extract_text(bytes).inspect_err(|e| {
            log::warn!("extraction failed: {}", e);
        })?;
        self.import_text(&text)
    }

    /// Interpret already-extracted text, applying the insufficient-text and
    /// no-lines checks.
    pub fn import_text(&self, text: &str) -> Result<ParseResult> {
        let chars = non_whitespace_len(text);
        if chars < MIN_TEXT_CHARS {
            return Err(StatementError::InsufficientText { chars });
        }

        let today = self
            .reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let result = self.parser.parse(text, today);

        if result.lines.is_empty() {
            return Err(StatementError::NoLineItemsFound);
        }

        Ok(result)
    }
}

/// Import raw PDF bytes with the default rules and options.
pub fn import_statement(bytes: &[u8]) -> Result<ParseResult> {
    StatementImporter::with_defaults()?.import_bytes(bytes)
}
