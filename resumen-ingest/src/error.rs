//! Error types for extraction and statement import.

/// Failure while scanning the raw PDF bytes.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("empty input buffer")]
    Empty,

    /// The trailer references an `/Encrypt` dictionary.
    #[error("document is encrypted")]
    Encrypted,

    #[error("invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Request-level failures reported to the caller of the import pipeline.
///
/// Each kind maps to its own remediation message (see [`StatementError::user_message`]);
/// callers must not collapse them into a generic error.
#[derive(Debug, thiserror::Error)]
pub enum StatementError {
    #[error("text extraction failed: {reason}")]
    ExtractionFailed { reason: String },

    /// Too little text came out of the file; most likely a scanned image.
    #[error("insufficient text extracted ({chars} non-whitespace characters)")]
    InsufficientText { chars: usize },

    #[error("no consumption lines found in statement")]
    NoLineItemsFound,

    #[error("unsupported file (expected .pdf): {filename}")]
    UnsupportedFile { filename: String },

    #[error("file too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: usize, limit: usize },

    #[error("invalid statement rules: {0}")]
    InvalidRules(#[from] regex::Error),
}

impl From<ExtractError> for StatementError {
    fn from(err: ExtractError) -> Self {
        StatementError::ExtractionFailed {
            reason: err.to_string(),
        }
    }
}

impl StatementError {
    /// Stable tag for logs and machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            StatementError::ExtractionFailed { .. } => "extraction_failed",
            StatementError::InsufficientText { .. } => "insufficient_text",
            StatementError::NoLineItemsFound => "no_line_items_found",
            StatementError::UnsupportedFile { .. } => "unsupported_file",
            StatementError::FileTooLarge { .. } => "file_too_large",
            StatementError::InvalidRules(_) => "invalid_rules",
        }
    }

    /// Remediation message shown to the person who uploaded the file.
    pub fn user_message(&self) -> String {
        match self {
            StatementError::ExtractionFailed { .. } => {
                "No se pudo leer el PDF. Es posible que el archivo esté protegido con contraseña."
                    .to_string()
            }
            StatementError::InsufficientText { .. } => {
                "El PDF parece ser una imagen escaneada. Descargá el resumen digital desde el home banking."
                    .to_string()
            }
            StatementError::NoLineItemsFound => {
                "No se encontraron consumos en el resumen. El formato no está soportado; podés cargar los gastos manualmente."
                    .to_string()
            }
            StatementError::UnsupportedFile { filename } => {
                format!("El archivo '{}' no es un PDF.", filename)
            }
            StatementError::FileTooLarge { limit, .. } => {
                format!("El archivo supera el tamaño máximo permitido ({} bytes).", limit)
            }
            StatementError::InvalidRules(_) => {
                "La configuración de reglas del resumen es inválida.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StatementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_becomes_extraction_failed() {
        let err: StatementError = ExtractError::Encrypted.into();
        assert_eq!(err.kind(), "extraction_failed");
        assert!(err.to_string().contains("encrypted"));
        assert!(err.user_message().contains("contraseña"));
    }

    #[test]
    fn test_request_failures_have_distinct_messages() {
        let msgs = [
            StatementError::ExtractionFailed { reason: "x".into() }.user_message(),
            StatementError::InsufficientText { chars: 3 }.user_message(),
            StatementError::NoLineItemsFound.user_message(),
        ];
        assert_ne!(msgs[0], msgs[1]);
        assert_ne!(msgs[1], msgs[2]);
        assert_ne!(msgs[0], msgs[2]);
        assert!(msgs[2].contains("manualmente"));
    }
}
