use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PAGE_CONTENT: &str = "BT /F1 9 Tf 40 780 Td (BANCO SANTANDER) Tj
0 -12 Td (Mastercard Black - Resumen de cuenta) Tj
0 -12 Td (CIERRE: 27/03/2025) Tj
0 -24 Td (FECHA CONCEPTO MONTO) Tj
0 -12 Td (02/03 LIBRERIA EL ATENEO CUOTA 02/03) Tj 300 0 Td (4.500,00) Tj
-300 -12 Td (05/03 ESTACION DE SERVICIO) Tj 300 0 Td ($ 32.100,50) Tj
-300 -12 Td (05/03 IMPUESTO DE SELLOS) Tj 300 0 Td (120,00) Tj
-300 -24 Td (Fin del resumen) Tj
ET";

fn statement_pdf() -> Vec<u8> {
    let body = PAGE_CONTENT.as_bytes();
    let mut pdf = Vec::new();
    pdf.extend_from_slice(b"%PDF-1.4\n");
    pdf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
    pdf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");
    pdf.extend_from_slice(b"3 0 obj\n<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>\nendobj\n");
    pdf.extend_from_slice(format!("4 0 obj\n<< /Length {} >>\nstream\n", body.len()).as_bytes());
    pdf.extend_from_slice(body);
    pdf.extend_from_slice(b"\nendstream\nendobj\n");
    pdf.extend_from_slice(b"trailer\n<< /Root 1 0 R >>\n%%EOF\n");
    pdf
}

struct Sandbox {
    home: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().unwrap(),
        }
    }

    fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let p = self.home.path().join(name);
        fs::write(&p, bytes).unwrap();
        p
    }

    fn resumen_dir(&self) -> PathBuf {
        self.home.path().join(".resumen")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("resumen").unwrap();
        cmd.env("HOME", self.home.path()).env_remove("RUST_LOG");
        cmd
    }
}

fn arg(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn test_parse_prints_table() {
    let sb = Sandbox::new();
    let pdf = sb.write("marzo.pdf", &statement_pdf());

    sb.cmd()
        .args(["parse", arg(&pdf)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Banco Santander"))
        .stdout(predicate::str::contains("Mastercard"))
        .stdout(predicate::str::contains("27/03/2025"))
        .stdout(predicate::str::contains("LIBRERIA EL ATENEO"))
        .stdout(predicate::str::contains("IMPUESTO").not());
}

#[test]
fn test_parse_csv() {
    let sb = Sandbox::new();
    let pdf = sb.write("marzo.pdf", &statement_pdf());

    sb.cmd()
        .args(["parse", arg(&pdf), "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("description,amount,installment\n"))
        .stdout(predicate::str::contains("LIBRERIA EL ATENEO,4500.00,2/3"))
        .stdout(predicate::str::contains("ESTACION DE SERVICIO,32100.50,1/1"));
}

#[test]
fn test_parse_json_uses_config_default() {
    let sb = Sandbox::new();
    let pdf = sb.write("marzo.pdf", &statement_pdf());
    fs::create_dir_all(sb.resumen_dir()).unwrap();
    fs::write(sb.resumen_dir().join("config.toml"), "output = \"json\"\n").unwrap();

    let out = sb.cmd().args(["parse", arg(&pdf)]).output().unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["bank"], "Banco Santander");
    assert_eq!(v["cardNetwork"], "Mastercard");
    assert_eq!(v["period"], "27/03/2025");
}

#[test]
fn test_non_pdf_is_rejected_with_message() {
    let sb = Sandbox::new();
    let file = sb.write("marzo.txt", &statement_pdf());

    sb.cmd()
        .args(["parse", arg(&file)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no es un PDF"));
}

#[test]
fn test_size_cap_from_flag() {
    let sb = Sandbox::new();
    let pdf = sb.write("marzo.pdf", &statement_pdf());

    sb.cmd()
        .args(["parse", arg(&pdf), "--max-bytes", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tamaño máximo"));
}

#[test]
fn test_scanned_pdf_reports_insufficient_text() {
    let sb = Sandbox::new();
    let pdf = sb.write(
        "scan.pdf",
        b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n",
    );

    sb.cmd()
        .args(["parse", arg(&pdf)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("escaneada"));
}

#[test]
fn test_raw_only_reports_unsupported_layout() {
    let sb = Sandbox::new();
    let pdf = sb.write("marzo.pdf", &statement_pdf());

    sb.cmd()
        .args(["parse", arg(&pdf), "--raw-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("manualmente"));
}

#[test]
fn test_extract_text_prints_rendered_lines() {
    let sb = Sandbox::new();
    let pdf = sb.write("marzo.pdf", &statement_pdf());

    sb.cmd()
        .args(["extract-text", arg(&pdf)])
        .assert()
        .success()
        .stdout(predicate::str::contains("CIERRE: 27/03/2025"));
}

#[test]
fn test_rules_init_then_custom_threshold() {
    let sb = Sandbox::new();
    let pdf = sb.write("marzo.pdf", &statement_pdf());

    sb.cmd()
        .args(["rules", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    let rules_toml = sb.resumen_dir().join("rules.toml");
    assert!(rules_toml.exists());

    sb.cmd()
        .args(["rules", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exist"));

    let custom = sb.write("caros.toml", b"min_amount = 10000.0\n");
    sb.cmd()
        .args(["parse", arg(&pdf), "--format", "csv", "--rules", arg(&custom)])
        .assert()
        .success()
        .stdout(predicate::str::contains("ESTACION DE SERVICIO"))
        .stdout(predicate::str::contains("LIBRERIA").not());
}

#[test]
fn test_rules_show_prints_toml() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["rules", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("min_line_chars = 10"))
        .stdout(predicate::str::contains("[[banks]]"));
}

#[test]
fn test_config_init_writes_defaults() {
    let sb = Sandbox::new();
    sb.cmd().args(["config", "init"]).assert().success();
    let written = fs::read_to_string(sb.resumen_dir().join("config.toml")).unwrap();
    assert!(written.contains("output = \"table\""));
    assert!(written.contains("max_upload_bytes = 10485760"));
}

#[test]
fn test_version_carries_build_sha() {
    Sandbox::new()
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^resumen \d+\.\d+\.\d+ \(\S+\)\n$").unwrap());
}
