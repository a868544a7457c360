use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

#[test]
fn test_preview_writes_pdf_and_prints_total() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("request.pdf");

    let mut cmd = Command::new(cargo_bin!("expense-desk"));
    cmd.env_remove("DOCUMENT_LOCALE")
        .arg("preview")
        .arg("tests/fixtures/request.csv")
        .arg("--output")
        .arg(&output);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Line items: 2"))
        .stdout(predicate::str::contains("Total: R$ 200,00"));

    let bytes = std::fs::read(&output)?;
    assert!(bytes.starts_with(b"%PDF"));
    Ok(())
}

#[test]
fn test_preview_json_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("request.pdf");

    let mut cmd = Command::new(cargo_bin!("expense-desk"));
    cmd.env("DOCUMENT_LOCALE", "en-US")
        .arg("preview")
        .arg("tests/fixtures/request.csv")
        .arg("-o")
        .arg(&output)
        .arg("--json");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"requester\": \"Ana Souza\""))
        .stdout(predicate::str::contains("\"bill_to_client\": \"ACME\""))
        .stdout(predicate::str::contains("Total: R$ 200.00"));
    Ok(())
}

#[test]
fn test_preview_rejects_missing_client_name() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("fields.csv");
    let output = dir.path().join("request.pdf");
    let mut file = std::fs::File::create(&input)?;
    writeln!(file, "field,value")?;
    for line in [
        "tipo_solicitacao,pagamento",
        "solicitante,Bruno Lima",
        "departamento,Sales",
        "cpf_cnpj,987",
        "urgencia,imediato",
        "data_pagamento,30/10/2026",
        "row_count,1",
        "valor_despesa_0,10",
        "cobrar_cliente_0,true",
    ] {
        writeln!(file, "{line}")?;
    }
    drop(file);

    let mut cmd = Command::new(cargo_bin!("expense-desk"));
    cmd.arg("preview").arg(&input).arg("--output").arg(&output);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no client name"));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_preview_missing_input_file() {
    let mut cmd = Command::new(cargo_bin!("expense-desk"));
    cmd.arg("preview")
        .arg("tests/fixtures/does_not_exist.csv")
        .arg("--output")
        .arg("unused.pdf");

    cmd.assert().failure();
}
