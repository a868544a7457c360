use crate::domain::form::FormFields;
use crate::domain::money::{Distance, Money};
use crate::domain::request::{Category, LineItem, NormalizedRequest, RequestKind, RequestRecord, Urgency};
use crate::error::{RequestError, Result};

/// Upper bound for `row_count`.
pub const MAX_ROWS: usize = 1000;

const ROW_COUNT: &str = "row_count";

/// Turns the flat form into a typed record and its ordered line items.
///
/// Pure: the same fields and `fallback_date` always produce the same output.
/// `fallback_date` is used as the request date when the form carries none.
pub fn normalize(fields: &FormFields, fallback_date: &str) -> Result<NormalizedRequest> {
    let record = RequestRecord {
        kind: required(fields, "tipo_solicitacao")?
            .parse::<RequestKind>()
            .map_err(RequestError::ValidationError)?,
        requester: required(fields, "solicitante")?,
        request_date: optional(fields, "data_solicitacao")
            .unwrap_or_else(|| fallback_date.to_string()),
        beneficiary: optional(fields, "beneficiado").unwrap_or_default(),
        department: required(fields, "departamento")?,
        tax_id: required(fields, "cpf_cnpj")?,
        bank: optional(fields, "banco"),
        branch: optional(fields, "agencia"),
        account: optional(fields, "conta"),
        pix_key: optional(fields, "pix"),
        urgency: required(fields, "urgencia")?
            .parse::<Urgency>()
            .map_err(RequestError::ValidationError)?,
        payment_date: required(fields, "data_pagamento")?,
    };

    let row_count = row_count(fields)?;
    let items = (0..row_count)
        .map(|index| line_item(fields, index))
        .collect::<Result<Vec<_>>>()?;

    Ok(NormalizedRequest { record, items })
}

fn line_item(fields: &FormFields, index: usize) -> Result<LineItem> {
    let row = |name: &str| fields.get(&format!("{name}_{index}"));

    let bill_to_client = if is_checked(row("cobrar_cliente")) {
        let client = row("nome_cliente").map(str::trim).unwrap_or("");
        if client.is_empty() {
            return Err(RequestError::ValidationError(format!(
                "Line {}: bill to client is checked but no client name was given",
                index + 1
            )));
        }
        Some(client.to_string())
    } else {
        None
    };

    Ok(LineItem::new(
        row("data").map(str::trim).unwrap_or("").to_string(),
        row("detalhe").map(str::trim).unwrap_or("").to_string(),
        Category::parse(row("tipo").unwrap_or("")),
        Money::lenient(row("valor_despesa")),
        Distance::lenient(row("km_rodado")),
        Money::lenient(row("valor_unit_km")),
        bill_to_client,
    ))
}

fn row_count(fields: &FormFields) -> Result<usize> {
    let count = fields.get(ROW_COUNT).map(leading_count).unwrap_or(0);
    if count > MAX_ROWS {
        return Err(RequestError::ValidationError(format!(
            "Too many line items: {count} (at most {MAX_ROWS})"
        )));
    }
    Ok(count)
}

/// Integer prefix of `raw`: `"3 rows"` is 3, `"2.5"` is 2, `"-1"` and `"abc"` are 0.
fn leading_count(raw: &str) -> usize {
    let raw = raw.trim();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    match &raw[..end] {
        "" => 0,
        digits => digits.parse().unwrap_or(usize::MAX),
    }
}

fn required(fields: &FormFields, name: &str) -> Result<String> {
    optional(fields, name)
        .ok_or_else(|| RequestError::ValidationError(format!("Missing required field: {name}")))
}

fn optional(fields: &FormFields, name: &str) -> Option<String> {
    fields
        .get(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn is_checked(raw: Option<&str>) -> bool {
    raw.map(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "true" | "on" | "1" | "yes"
        )
    })
    .unwrap_or(false)
}
