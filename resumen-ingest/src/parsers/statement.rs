//! Argentine credit-card statement interpreter (text).
//!
//! Expected consumption rows after PDF-to-text:
//!   15/01 SUPERMERCADO XYZ CUOTA 01/06 $ 1.234,56
//!   15/01 FARMACIA ABC                     567,00
//!   03-02-25 DEVOLUCION TIENDA 2 de 3    -1.000,00
//!
//! `.` is the thousands separator and `,` the decimal separator.

use chrono::NaiveDate;
use regex::Regex;

use super::metadata::MetadataDetector;
use crate::rules::{StatementRules, prefix_regex};
use crate::types::{ParseResult, ParsedExpenseLine, SINGLE_INSTALLMENT, StatementMetadata};

/// Normalize `1.234,56` / `-567,00` into a positive magnitude.
pub fn parse_ar_amount(raw: &str) -> Option<f64> {
    let normalized = raw.replace('.', "").replace(',', ".");
    normalized.trim().parse::<f64>().ok().map(f64::abs)
}

/// Compiled form of a [`StatementRules`] set. Immutable and shareable across threads.
#[derive(Debug, Clone)]
pub struct StatementParser {
    rules: StatementRules,
    header_re: Option<Regex>,
    fee_re: Option<Regex>,
    amount_re: Regex,
    date_prefix_re: Regex,
    installment_re: Regex,
    spaces_re: Regex,
    trailing_re: Regex,
    metadata: MetadataDetector,
}

impl StatementParser {
    pub fn new(rules: StatementRules) -> Result<Self, regex::Error> {
        Ok(Self {
            header_re: prefix_regex(&rules.header_prefixes)?,
            fee_re: prefix_regex(&rules.fee_prefixes)?,
            amount_re: Regex::new(r"\$?\s*(-?\d{1,3}(?:\.\d{3})*(?:,\d{2})?)\s*$")?,
            date_prefix_re: Regex::new(r"^\d{1,2}[/\-.]\d{1,2}(?:[/\-.]\d{2,4})?\s*")?,
            installment_re: Regex::new(r"(?i)\b(?:cuota\s*)?(\d{1,2})\s*[/de]+\s*(\d{1,2})\b")?,
            spaces_re: Regex::new(r"\s{2,}")?,
            trailing_re: Regex::new(r"[-_]+$")?,
            metadata: MetadataDetector::new()?,
            rules,
        })
    }

    pub fn rules(&self) -> &StatementRules {
        &self.rules
    }

    /// Parse one candidate row. `None` means the row is not a consumption.
    pub fn parse_line(&self, line: &str) -> Option<ParsedExpenseLine> {
        let line = line.trim();
        if line.chars().count() < self.rules.min_line_chars || is_match(self.header_re.as_ref(), line) {
            return None;
        }

        let caps = self.amount_re.captures(line)?;
        let amount_match = caps.get(0)?;
        let amount = parse_ar_amount(&caps[1])?;
        if !amount.is_finite() || amount < self.rules.min_amount {
            log::trace!("dropping stray amount {:?} in {:?}", &caps[1], line);
            return None;
        }

        let head = &line[..amount_match.start()];
        let head = self.date_prefix_re.replace(head, "");

        let (installment, rest) = match self.installment_re.captures(&head) {
            Some(inst) => {
                let current: u32 = inst[1].parse().ok()?;
                let total: u32 = inst[2].parse().ok()?;
                let rest = self.installment_re.replace_all(&head, " ").into_owned();
                (format!("{}/{}", current, total), rest)
            }
            None => (SINGLE_INSTALLMENT.to_string(), head.into_owned()),
        };

        let description = self.clean_description(&rest);
        if description.chars().count() < self.rules.min_description_chars
            || is_match(self.fee_re.as_ref(), &description)
        {
            log::trace!("dropping non-consumption row {:?}", line);
            return None;
        }

        Some(ParsedExpenseLine {
            description,
            amount,
            installment,
            date: None,
        })
    }

    /// Every consumption row in `text`, in document order.
    pub fn parse_lines(&self, text: &str) -> Vec<ParsedExpenseLine> {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .filter_map(|l| self.parse_line(l))
            .collect()
    }

    pub fn detect_metadata(&self, text: &str, today: NaiveDate) -> StatementMetadata {
        self.metadata.detect(&self.rules, text, today)
    }

    /// Interpret a whole statement. An empty `lines` vector is a valid outcome here;
    /// the importer decides whether that is a failure.
    pub fn parse(&self, text: &str, today: NaiveDate) -> ParseResult {
        let lines = self.parse_lines(text);
        let metadata = self.detect_metadata(text, today);
        log::debug!(
            "parsed {} lines (bank={}, network={}, period={})",
            lines.len(),
            metadata.bank,
            metadata.card_network,
            metadata.period
        );
        ParseResult::new(lines, metadata)
    }

    fn clean_description(&self, raw: &str) -> String {
        let collapsed = self.spaces_re.replace_all(raw, " ");
        let trimmed = self.trailing_re.replace(collapsed.trim(), "");
        trimmed.trim().to_string()
    }
}

fn is_match(re: Option<&Regex>, text: &str) -> bool {
    re.is_some_and(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> StatementParser {
        StatementParser::new(StatementRules::default()).unwrap()
    }

    #[test]
    fn test_installment_line() {
        let line = parser()
            .parse_line("15/01 SUPERMERCADO XYZ CUOTA 01/06 $ 1.234,56")
            .unwrap();
        assert_eq!(line.description, "SUPERMERCADO XYZ");
        assert_eq!(line.amount, 1234.56);
        assert_eq!(line.installment, "1/6");
        assert_eq!(line.date, None);
    }

    #[test]
    fn test_default_installment() {
        let line = parser().parse_line("15/01 FARMACIA ABC 567,00").unwrap();
        assert_eq!(line.description, "FARMACIA ABC");
        assert_eq!(line.amount, 567.0);
        assert_eq!(line.installment, "1/1");
    }

    #[test]
    fn test_installment_de_notation_and_credit_sign() {
        let line = parser()
            .parse_line("03-02-25 DEVOLUCION TIENDA 2 de 3 -1.000,00")
            .unwrap();
        assert_eq!(line.description, "DEVOLUCION TIENDA");
        assert_eq!(line.amount, 1000.0);
        assert_eq!(line.installment, "2/3");
    }

    #[test]
    fn test_headers_and_fees_rejected() {
        let p = parser();
        assert!(p.parse_line("Fecha Concepto Monto 1.234,56").is_none());
        assert!(p.parse_line("TOTAL A PAGAR $ 45.678,90").is_none());
        assert!(p.parse_line("15/01 IVA 1.234,56").is_none());
        assert!(p.parse_line("15/01 Impuesto de sellos 120,00").is_none());
        assert!(p.parse_line("15/01 SEGURO DE VIDA 300,00").is_none());
    }

    #[test]
    fn test_noise_rejected() {
        let p = parser();
        // too short
        assert!(p.parse_line("Hoja 1").is_none());
        // no trailing amount
        assert!(p.parse_line("15/01 FARMACIA ABC sin monto").is_none());
        // amount below 1
        assert!(p.parse_line("15/01 REDONDEO CENTAVOS 0,50").is_none());
        // description too short after cleaning
        assert!(p.parse_line("15/01 AB -- 1.500,00").is_none());
    }

    #[test]
    fn test_trailing_separators_stripped() {
        let line = parser().parse_line("20/01 MERCADOLIBRE __ 2.500,00").unwrap();
        assert_eq!(line.description, "MERCADOLIBRE");
    }

    #[test]
    fn test_parse_lines_skips_blank_and_headers() {
        let text = r#"
FECHA     CONCEPTO                       MONTO

15/01 SUPERMERCADO XYZ CUOTA 01/06 $ 1.234,56
   15/01 FARMACIA ABC 567,00
SALDO ANTERIOR 10.000,00
"#;
        let lines = parser().parse_lines(text);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].description, "FARMACIA ABC");
    }

    #[test]
    fn test_custom_rules_change_behaviour() {
        let mut rules = StatementRules::default();
        rules.fee_prefixes.push("comision".to_string());
        rules.min_amount = 1000.0;
        let p = StatementParser::new(rules).unwrap();
        assert!(p.parse_line("15/01 COMISION MANTENIMIENTO 1.500,00").is_none());
        assert!(p.parse_line("15/01 FARMACIA ABC 567,00").is_none());
        assert!(p.parse_line("15/01 SUPERMERCADO XYZ 1.234,56").is_some());
    }

    #[test]
    fn test_parse_ar_amount() {
        assert_eq!(parse_ar_amount("1.234.567,89"), Some(1234567.89));
        assert_eq!(parse_ar_amount("-20,00"), Some(20.0));
        assert_eq!(parse_ar_amount("abc"), None);
    }
}
