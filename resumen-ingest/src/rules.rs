//! Heuristic rule tables for Argentine credit-card statements.
//!
//! Institution-specific keywords and thresholds live here as data.
//! Rule sets are plain serde values and can be loaded from TOML.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{Bank, CardNetwork};

/// Keywords that identify a card network (matched against lowercased text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRule {
    pub network: CardNetwork,
    pub keywords: Vec<String>,
}

/// Keywords that identify an issuing bank (matched against lowercased text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRule {
    pub bank: Bank,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementRules {
    /// Shorter lines are headers, page numbers or noise.
    pub min_line_chars: usize,
    pub min_description_chars: usize,
    /// Amounts below this are treated as stray numbers, not consumptions.
    pub min_amount: f64,
    /// Case-insensitive line prefixes for column headers and summary rows.
    pub header_prefixes: Vec<String>,
    /// Case-insensitive description prefixes for statement-level fees.
    pub fee_prefixes: Vec<String>,
    /// Checked in order; first match wins.
    pub networks: Vec<NetworkRule>,
    /// Checked in order; first match wins.
    pub banks: Vec<BankRule>,
}

impl Default for StatementRules {
    fn default() -> Self {
        Self {
            min_line_chars: 10,
            min_description_chars: 3,
            min_amount: 1.0,
            header_prefixes: strings(&[
                "fecha",
                "concepto",
                "detalle",
                "total",
                "saldo",
                "pago",
                "minimo",
                "vencimiento",
                "número",
                "resumen",
                "cierre",
                "apertura",
            ]),
            fee_prefixes: strings(&["impuesto", "iva", "interes", "seguro de vida", "cargo por"]),
            networks: vec![
                network(CardNetwork::Mastercard, &["mastercard"]),
                network(CardNetwork::Visa, &["visa"]),
                network(CardNetwork::AmericanExpress, &["american express", "amex"]),
            ],
            banks: vec![
                bank(Bank::Galicia, &["galicia"]),
                bank(Bank::Santander, &["santander"]),
                bank(Bank::Bbva, &["bbva", "francés", "frances"]),
                // Bare "nacion" also matches "internacional".
                bank(
                    Bank::Nacion,
                    &[
                        "banco de la nación",
                        "banco de la nacion",
                        "banco nación",
                        "banco nacion",
                        "tarjeta nación",
                        "tarjeta nacion",
                        "nación argentina",
                        "nacion argentina",
                    ],
                ),
                bank(Bank::Macro, &["macro"]),
                bank(Bank::Hsbc, &["hsbc"]),
                bank(Bank::Icbc, &["icbc"]),
                bank(
                    Bank::Provincia,
                    &["banco provincia", "banco de la provincia", "bapro"],
                ),
                bank(Bank::Ciudad, &["banco ciudad", "banco de la ciudad"]),
                bank(Bank::Patagonia, &["patagonia"]),
                bank(Bank::Supervielle, &["supervielle"]),
                bank(Bank::Credicoop, &["credicoop"]),
            ],
        }
    }
}

impl StatementRules {
    /// First network whose keyword appears in `lowered`.
    pub fn match_network(&self, lowered: &str) -> CardNetwork {
        self.networks
            .iter()
            .find(|r| contains_any(lowered, &r.keywords))
            .map(|r| r.network)
            .unwrap_or(CardNetwork::Other)
    }

    /// First bank whose keyword appears in `lowered`.
    pub fn match_bank(&self, lowered: &str) -> Bank {
        self.banks
            .iter()
            .find(|r| contains_any(lowered, &r.keywords))
            .map(|r| r.bank)
            .unwrap_or(Bank::Other)
    }
}

/// Compile a case-insensitive, start-anchored alternation of literal prefixes.
///
/// Returns `None` for an empty list so an empty rule never matches.
pub(crate) fn prefix_regex(prefixes: &[String]) -> Result<Option<Regex>, regex::Error> {
    let alternatives: Vec<String> = prefixes
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(regex::escape)
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    Regex::new(&format!("(?i)^(?:{})", alternatives.join("|"))).map(Some)
}

fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .any(|k| !k.is_empty() && haystack.contains(&k))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn network(network: CardNetwork, keywords: &[&str]) -> NetworkRule {
    NetworkRule {
        network,
        keywords: strings(keywords),
    }
}

fn bank(bank: Bank, keywords: &[&str]) -> BankRule {
    BankRule {
        bank,
        keywords: strings(keywords),
    }
}
