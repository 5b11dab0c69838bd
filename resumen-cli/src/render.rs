use anyhow::{Context, Result};
use clap::ValueEnum;
use resumen_ingest::ParseResult;
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    description: &'a str,
    amount: String,
    installment: &'a str,
}

pub fn render<W: Write>(out: &mut W, result: &ParseResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => render_table(out, result),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, result).context("serialize result")?;
            writeln!(out)?;
            Ok(())
        }
        OutputFormat::Csv => render_csv(out, result),
    }
}

fn render_table<W: Write>(out: &mut W, result: &ParseResult) -> Result<()> {
    writeln!(out, "Banco:   {}", result.bank)?;
    writeln!(out, "Tarjeta: {}", result.card_network)?;
    writeln!(out, "Período: {}", result.period)?;
    writeln!(out)?;

    let width = result
        .lines
        .iter()
        .map(|l| l.description.chars().count())
        .max()
        .unwrap_or(0)
        .max("Descripción".chars().count());

    writeln!(out, "{:<width$}  {:>12}  {:>6}", "Descripción", "Monto", "Cuota")?;
    for line in &result.lines {
        writeln!(
            out,
            "{:<width$}  {:>12.2}  {:>6}",
            line.description, line.amount, line.installment
        )?;
    }
    writeln!(out, "{:<width$}  {:>12.2}", "TOTAL", result.total)?;
    Ok(())
}

fn render_csv<W: Write>(out: &mut W, result: &ParseResult) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for line in &result.lines {
        wtr.serialize(CsvRow {
            description: &line.description,
            amount: format!("{:.2}", line.amount),
            installment: &line.installment,
        })
        .context("write csv row")?;
    }
    wtr.flush().context("flush csv")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumen_ingest::{Bank, CardNetwork, ParsedExpenseLine, StatementMetadata};

    fn sample() -> ParseResult {
        ParseResult::new(
            vec![
                ParsedExpenseLine {
                    description: "SUPERMERCADO XYZ".to_string(),
                    amount: 1234.56,
                    installment: "1/6".to_string(),
                    date: None,
                },
                ParsedExpenseLine {
                    description: "FARMACIA, ABC".to_string(),
                    amount: 567.0,
                    installment: "1/1".to_string(),
                    date: None,
                },
            ],
            StatementMetadata {
                card_network: CardNetwork::Visa,
                bank: Bank::Galicia,
                period: "28/02/2025".to_string(),
            },
        )
    }

    fn rendered(format: OutputFormat) -> String {
        let mut buf = Vec::new();
        render(&mut buf, &sample(), format).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_csv_columns_and_quoting() {
        let out = rendered(OutputFormat::Csv);
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("description,amount,installment"));
        assert_eq!(lines.next(), Some("SUPERMERCADO XYZ,1234.56,1/6"));
        assert_eq!(lines.next(), Some("\"FARMACIA, ABC\",567.00,1/1"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_json_is_the_serialized_result() {
        let v: serde_json::Value = serde_json::from_str(&rendered(OutputFormat::Json)).unwrap();
        assert_eq!(v["bank"], "Banco Galicia");
        assert_eq!(v["lines"][0]["installment"], "1/6");
        assert_eq!(v["total"], 1801.56);
    }

    #[test]
    fn test_table_has_metadata_and_total() {
        let out = rendered(OutputFormat::Table);
        assert!(out.starts_with("Banco:   Banco Galicia\n"));
        assert!(out.contains("Tarjeta: Visa"));
        assert!(out.contains("SUPERMERCADO XYZ"));
        assert!(out.trim_end().ends_with("1801.56"));
    }
}
