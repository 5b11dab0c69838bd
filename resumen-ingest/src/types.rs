use serde::{Deserialize, Serialize};

/// Default installment for lines without a `CUOTA nn/mm` notation.
pub const SINGLE_INSTALLMENT: &str = "1/1";

/// Card network printed on the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardNetwork {
    Visa,
    Mastercard,
    #[serde(rename = "American Express")]
    AmericanExpress,
    Other,
}

impl CardNetwork {
    pub fn display_name(&self) -> &'static str {
        match self {
            CardNetwork::Visa => "Visa",
            CardNetwork::Mastercard => "Mastercard",
            CardNetwork::AmericanExpress => "American Express",
            CardNetwork::Other => "Other",
        }
    }
}

impl std::fmt::Display for CardNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Issuing bank (Argentine institutions known to the default rules).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bank {
    #[serde(rename = "Banco Galicia")]
    Galicia,
    #[serde(rename = "Banco Santander")]
    Santander,
    #[serde(rename = "BBVA")]
    Bbva,
    #[serde(rename = "Banco Nación")]
    Nacion,
    #[serde(rename = "Banco Macro")]
    Macro,
    #[serde(rename = "HSBC")]
    Hsbc,
    #[serde(rename = "ICBC")]
    Icbc,
    #[serde(rename = "Banco Provincia")]
    Provincia,
    #[serde(rename = "Banco Ciudad")]
    Ciudad,
    #[serde(rename = "Banco Patagonia")]
    Patagonia,
    #[serde(rename = "Banco Supervielle")]
    Supervielle,
    #[serde(rename = "Banco Credicoop")]
    Credicoop,
    Other,
}

impl Bank {
    pub fn display_name(&self) -> &'static str {
        match self {
            Bank::Galicia => "Banco Galicia",
            Bank::Santander => "Banco Santander",
            Bank::Bbva => "BBVA",
            Bank::Nacion => "Banco Nación",
            Bank::Macro => "Banco Macro",
            Bank::Hsbc => "HSBC",
            Bank::Icbc => "ICBC",
            Bank::Provincia => "Banco Provincia",
            Bank::Ciudad => "Banco Ciudad",
            Bank::Patagonia => "Banco Patagonia",
            Bank::Supervielle => "Banco Supervielle",
            Bank::Credicoop => "Banco Credicoop",
            Bank::Other => "Other",
        }
    }
}

impl std::fmt::Display for Bank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One consumption detected on a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedExpenseLine {
    pub description: String,
    /// Always a positive magnitude; credits lose their sign.
    pub amount: f64,
    /// `"current/total"`, e.g. `"3/12"`.
    pub installment: String,
    /// Statements are parsed as one period, so this stays `None` for now.
    pub date: Option<String>,
}

/// Document-level facts inferred once per statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementMetadata {
    pub card_network: CardNetwork,
    pub bank: Bank,
    pub period: String,
}

/// Output of a successful import, handed to the caller as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub lines: Vec<ParsedExpenseLine>,
    pub card_network: CardNetwork,
    pub bank: Bank,
    pub period: String,
    pub total: f64,
}

impl ParseResult {
    pub fn new(lines: Vec<ParsedExpenseLine>, metadata: StatementMetadata) -> Self {
        let total = lines.iter().map(|l| l.amount).sum();
        Self {
            lines,
            card_network: metadata.card_network,
            bank: metadata.bank,
            period: metadata.period,
            total,
        }
    }

    pub fn metadata(&self) -> StatementMetadata {
        StatementMetadata {
            card_network: self.card_network,
            bank: self.bank,
            period: self.period.clone(),
        }
    }
}
