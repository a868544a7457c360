#![allow(dead_code)]

use expense_desk::application::coordinator::RequestCoordinator;
use expense_desk::application::dispatcher::Dispatcher;
use expense_desk::config::DecodeLimits;
use expense_desk::domain::form::FormFields;
use expense_desk::domain::money::NumberLocale;
use expense_desk::domain::ports::ChatNotifierRef;
use expense_desk::infrastructure::in_memory::{InMemoryChatNotifier, InMemoryMailer};
use expense_desk::interfaces::http::{AppState, SUBMIT_PATH, build_router};
use expense_desk::rendering::DocumentRenderer;
use std::net::SocketAddr;
use std::sync::Arc;

/// Header fields of a valid request, without any line items.
pub fn header_fields() -> Vec<(&'static str, String)> {
    [
        ("tipo_solicitacao", "reembolso"),
        ("solicitante", "Ana Souza"),
        ("data_solicitacao", "15/10/2026"),
        ("beneficiado", "Ana Souza"),
        ("departamento", "Logistics"),
        ("cpf_cnpj", "123.456.789-00"),
        ("banco", "Banco do Brasil"),
        ("agencia", "1234"),
        ("conta", "56789-0"),
        ("pix", "ana@example.com"),
        ("urgencia", "normal"),
        ("data_pagamento", "20/10/2026"),
    ]
    .into_iter()
    .map(|(name, value)| (name, value.to_string()))
    .collect()
}

/// One line item as `(direct amount, distance, rate)`.
pub type Row = (String, String, String);

/// Header fields plus `rows`, indexed the way the web form submits them.
pub fn request_fields(rows: &[Row]) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = header_fields()
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    fields.push(("row_count".to_string(), rows.len().to_string()));
    for (index, (amount, distance, rate)) in rows.iter().enumerate() {
        fields.push((format!("data_{index}"), "01/10/2026".to_string()));
        fields.push((format!("detalhe_{index}"), format!("Expense {index}")));
        fields.push((format!("tipo_{index}"), "Pedágio".to_string()));
        fields.push((format!("valor_despesa_{index}"), amount.clone()));
        fields.push((format!("km_rodado_{index}"), distance.clone()));
        fields.push((format!("valor_unit_km_{index}"), rate.clone()));
        fields.push((format!("cobrar_cliente_{index}"), "false".to_string()));
        fields.push((format!("nome_cliente_{index}"), String::new()));
    }
    fields
}

pub fn form_fields(fields: &[(String, String)]) -> FormFields {
    fields.iter().map(|(name, value)| (name.as_str(), value.as_str())).collect()
}

pub fn two_rows() -> Vec<Row> {
    vec![
        ("100".to_string(), "0".to_string(), "0".to_string()),
        ("0".to_string(), "50".to_string(), "2".to_string()),
    ]
}

pub fn coordinator(mailer: &InMemoryMailer, chat: Option<&InMemoryChatNotifier>) -> RequestCoordinator {
    let chat = chat.map(|chat| Arc::new(chat.clone()) as ChatNotifierRef);
    RequestCoordinator::new(
        DocumentRenderer::default(),
        Dispatcher::new(Arc::new(mailer.clone()), chat, NumberLocale::PtBr),
    )
}

/// Serves `coordinator` on an ephemeral loopback port and returns the endpoint URL.
pub async fn spawn_server(coordinator: RequestCoordinator, limits: DecodeLimits) -> String {
    let app = build_router(AppState::new(coordinator, limits));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    format!("http://{addr}{SUBMIT_PATH}")
}
