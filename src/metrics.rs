use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::env;
use std::net::SocketAddr;
use tracing::{error, info};

lazy_static::lazy_static! {
    pub static ref METRIC_NAMESPACE: String =
        env::var("METRIC_NAMESPACE").unwrap_or_else(|_| "hotel_sim".to_string());

    // === Request Metrics ===

    pub static ref REQUESTS_TOTAL: IntCounter =
        IntCounter::with_opts(
            Opts::new("requests_total", "Total number of API calls issued")
                .namespace(METRIC_NAMESPACE.as_str())
        ).expect("requests_total metric");

    pub static ref REQUEST_STATUS_CODES: IntCounterVec =
        IntCounterVec::new(
            Opts::new(
                "requests_status_codes_total",
                "Number of API calls by endpoint and status code",
            )
                .namespace(METRIC_NAMESPACE.as_str()),
            &["endpoint", "status_code"]
        ).expect("requests_status_codes_total metric");

    pub static ref REQUEST_DURATION_SECONDS: HistogramVec =
        HistogramVec::new(
            HistogramOpts::new(
                "request_duration_seconds",
                "API call latencies in seconds"
            ).namespace(METRIC_NAMESPACE.as_str()),
            &["endpoint"]
        ).expect("request_duration_seconds metric");

    // === Scenario Metrics ===

    pub static ref PHASE_DURATION_SECONDS: HistogramVec =
        HistogramVec::new(
            HistogramOpts::new(
                "phase_duration_seconds",
                "Scenario phase duration in seconds"
            ).namespace(METRIC_NAMESPACE.as_str()),
            &["phase"]
        ).expect("phase_duration_seconds metric");

    pub static ref ENTITIES_CREATED_TOTAL: IntCounterVec =
        IntCounterVec::new(
            Opts::new("entities_created_total", "Entities added to the registry")
                .namespace(METRIC_NAMESPACE.as_str()),
            &["kind"]  // actor, hotel, room_type, reservation
        ).expect("entities_created_total metric");

    pub static ref WORKFLOW_SKIPS_TOTAL: IntCounterVec =
        IntCounterVec::new(
            Opts::new(
                "workflow_skips_total",
                "Units of work skipped because a prerequisite or candidate was missing",
            )
                .namespace(METRIC_NAMESPACE.as_str()),
            &["phase", "reason"]
        ).expect("workflow_skips_total metric");
}

/// Registers all metrics with the default Prometheus registry.
pub fn register_metrics() -> Result<(), prometheus::Error> {
    let registry = prometheus::default_registry();

    registry.register(Box::new(REQUESTS_TOTAL.clone()))?;
    registry.register(Box::new(REQUEST_STATUS_CODES.clone()))?;
    registry.register(Box::new(REQUEST_DURATION_SECONDS.clone()))?;

    registry.register(Box::new(PHASE_DURATION_SECONDS.clone()))?;
    registry.register(Box::new(ENTITIES_CREATED_TOTAL.clone()))?;
    registry.register(Box::new(WORKFLOW_SKIPS_TOTAL.clone()))?;

    Ok(())
}

fn encode(registry: &Registry) -> Result<(Vec<u8>, String), prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok((buffer, encoder.format_type().to_string()))
}

/// HTTP handler for the Prometheus metrics endpoint.
pub async fn metrics_handler(
    _req: Request<Body>,
    registry: Registry,
) -> Result<Response<Body>, hyper::Error> {
    let response = match encode(&registry) {
        Ok((buffer, content_type)) => Response::builder()
            .status(200)
            .header("Content-Type", content_type)
            .body(Body::from(buffer)),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            Response::builder()
                .status(500)
                .body(Body::from("failed to encode metrics"))
        }
    };

    Ok(response.unwrap_or_else(|_| Response::new(Body::empty())))
}

/// Serves the registry on `0.0.0.0:<port>/` until the process exits.
pub async fn start_metrics_server(port: u16, registry: Registry) {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    let make_svc = make_service_fn(move |_conn| {
        let registry = registry.clone();
        async move {
            Ok::<_, hyper::Error>(service_fn(move |req| {
                let registry = registry.clone();
                async move { metrics_handler(req, registry).await }
            }))
        }
    });

    let server = match Server::try_bind(&addr) {
        Ok(builder) => builder.serve(make_svc),
        Err(e) => {
            error!(port = port, error = %e, "Could not bind metrics server");
            return;
        }
    };
    info!(port = port, addr = %addr, "Metrics server listening");

    if let Err(e) = server.await {
        error!(error = %e, "Metrics server error");
    }
}

/// Encodes the registry as Prometheus text for the end-of-run dump.
pub fn gather_metrics_string(registry: &Registry) -> String {
    match encode(registry) {
        Ok((buffer, _)) => String::from_utf8(buffer)
            .unwrap_or_else(|_| String::from("# ERROR ENCODING METRICS TO UTF-8")),
        Err(e) => format!("# ERROR ENCODING METRICS: {}", e),
    }
}
