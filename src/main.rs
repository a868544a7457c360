use clap::{Parser, Subcommand};
use expense_desk::application::coordinator::{RequestCoordinator, request_date_fallback};
use expense_desk::application::normalizer::normalize;
use expense_desk::config::AppConfig;
use expense_desk::interfaces::csv::fields_reader::FieldsReader;
use expense_desk::interfaces::http::{AppState, SUBMIT_PATH, build_router};
use expense_desk::rendering::DocumentRenderer;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Accept reimbursement and payment requests over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:3000")]
        bind: SocketAddr,
    },
    /// Render the document for a `field,value` CSV without sending anything
    Preview {
        /// Input fields CSV file
        input: PathBuf,

        /// Where to write the PDF
        #[arg(short, long)]
        output: PathBuf,

        /// Also print the normalized request as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Command::Serve { bind } => serve(config, bind).await,
        Command::Preview { input, output, json } => preview(config, input, output, json),
    }
}

async fn serve(config: AppConfig, bind: SocketAddr) -> Result<()> {
    let state = AppState::new(RequestCoordinator::from_config(&config), config.limits);
    let app = build_router(state);

    let listener = TcpListener::bind(bind).await.into_diagnostic()?;
    tracing::info!(
        "listening on http://{}{}",
        listener.local_addr().into_diagnostic()?,
        SUBMIT_PATH
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .into_diagnostic()
}

fn preview(config: AppConfig, input: PathBuf, output: PathBuf, json: bool) -> Result<()> {
    let file = File::open(input).into_diagnostic()?;
    let fields = FieldsReader::new(file).fields().into_diagnostic()?;
    let request = normalize(&fields, &request_date_fallback()).into_diagnostic()?;

    if json {
        let rendered = serde_json::to_string_pretty(&request).into_diagnostic()?;
        println!("{rendered}");
    }

    let document = DocumentRenderer::new(config.locale)
        .render(&request.record, &request.items)
        .into_diagnostic()?;
    std::fs::write(&output, &document.bytes).into_diagnostic()?;
    tracing::info!(path = %output.display(), pages = document.page_count, "Document written");

    println!("Line items: {}", request.items.len());
    println!("Total: {}", config.locale.format_currency(document.grand_total));
    Ok(())
}
