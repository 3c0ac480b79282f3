use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use hotel_sim::api::HotelApi;
use hotel_sim::cities::CityDataset;
use hotel_sim::client::build_client;
use hotel_sim::config::{help_text, Config, LogFormat, ReportFormat};
use hotel_sim::metrics::{gather_metrics_string, register_metrics, start_metrics_server};
use hotel_sim::orchestrator::ScenarioOrchestrator;
use hotel_sim::report;
use hotel_sim::transport::ReqwestTransport;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}\n", e);
            eprintln!("{}", help_text());
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);
    register_metrics()?;

    let client_result = build_client(&config.to_client_config())?;
    let seed = config.seed.unwrap_or_else(rand::random);
    config.log_summary(seed, &client_result.parsed_headers);

    if let Some(port) = config.metrics_port {
        let registry = prometheus::default_registry().clone();
        tokio::spawn(async move {
            start_metrics_server(port, registry).await;
        });
    }

    let cities = CityDataset::load_or_builtin(config.cities_file.as_deref());
    info!(cities = cities.len(), source = ?cities.source(), "Cities dataset ready");

    let transport = Arc::new(ReqwestTransport::new(client_result.client));
    let api = HotelApi::new(transport, &config.base_url);

    let orchestrator = ScenarioOrchestrator::new(config.plan.clone(), seed);
    let mut ctx = orchestrator.context(api, cities);
    let result = orchestrator.run(&mut ctx).await;

    let report = report::generate(ctx.api.observer().records());
    match config.report_format {
        ReportFormat::Text => println!("{}", report.render_text()),
        ReportFormat::Json => match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => error!(error = %e, "Failed to render JSON report"),
        },
    }

    info!(
        seed = result.seed,
        total_calls = result.total_calls,
        duration_ms = result.duration.as_millis() as u64,
        "Run finished"
    );
    debug!(
        "Final metrics:\n{}",
        gather_metrics_string(prometheus::default_registry())
    );

    Ok(())
}
