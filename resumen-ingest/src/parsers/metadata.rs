//! Document-level detectors: card network, issuing bank and billing period.
//!
//! Examples of what the period detector picks up after PDF-to-text:
//!   CIERRE: 28/02/2025            -> "28/02/2025"
//!   Período: Febrero 2025         -> "Febrero 2025"
//!   Resumen de marzo de 2025      -> "marzo de 2025"

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::rules::StatementRules;
use crate::types::{Bank, CardNetwork, StatementMetadata};

pub const SPANISH_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Format a date the way es-AR renders `{ month: "long", year: "numeric" }`.
pub fn month_year_es(date: NaiveDate) -> String {
    let month = SPANISH_MONTHS[date.month0() as usize];
    format!("{} de {}", month, date.year())
}

#[derive(Debug, Clone)]
pub struct MetadataDetector {
    closing_re: Regex,
    period_label_re: Regex,
    month_year_re: Regex,
}

impl MetadataDetector {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            closing_re: Regex::new(r"(?i)cierre[:\s]*(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{4})")?,
            period_label_re: Regex::new(r"(?i)per[ií]odo[:\s]*([\w\s]+\d{4})")?,
            month_year_re: Regex::new(concat!(
                r"(?i)\b(?:enero|febrero|marzo|abril|mayo|junio|julio|agosto|sep?tiembre",
                r"|octubre|noviembre|diciembre)\s+(?:de\s+)?\d{4}\b"
            ))?,
        })
    }

    pub fn card_network(&self, rules: &StatementRules, text: &str) -> CardNetwork {
        rules.match_network(&text.to_lowercase())
    }

    pub fn bank(&self, rules: &StatementRules, text: &str) -> Bank {
        rules.match_bank(&text.to_lowercase())
    }

    /// Closing date, then explicit period label, then "Month Year".
    pub fn explicit_period(&self, text: &str) -> Option<String> {
        if let Some(caps) = self.closing_re.captures(text) {
            return Some(caps[1].to_string());
        }

        if let Some(caps) = self.period_label_re.captures(text) {
            let period = caps[1].trim();
            if !period.is_empty() {
                return Some(period.to_string());
            }
        }

        self.month_year_re
            .find(text)
            .map(|m| m.as_str().trim().to_string())
    }

    /// Never empty: falls back to `today` rendered as "mes de año".
    pub fn period(&self, text: &str, today: NaiveDate) -> String {
        self.explicit_period(text).unwrap_or_else(|| {
            log::debug!("no period token found, falling back to reference date");
            month_year_es(today)
        })
    }

    pub fn detect(&self, rules: &StatementRules, text: &str, today: NaiveDate) -> StatementMetadata {
        StatementMetadata {
            card_network: self.card_network(rules, text),
            bank: self.bank(rules, text),
            period: self.period(text, today),
        }
    }
}
