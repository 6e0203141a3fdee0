use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::core::{
    DEFAULT_BATCH_SIZE, DEFAULT_HISTOGRAM_BINS, DEFAULT_ITERATIONS, DEFAULT_SEED,
    DistributionSummary, Inputs, MAX_BATCH_SIZE, MAX_HISTOGRAM_BINS, MAX_ITERATIONS,
    ModelResult, Parameter, ParameterRange, ParameterRanges, run_model,
};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "stoiip",
    about = "Monte Carlo estimate of stock-tank oil initially in place (STOIIP)"
)]
pub struct Cli {
    #[arg(long, default_value_t = DEFAULT_ITERATIONS, help = "Number of Monte Carlo iterations")]
    iterations: usize,
    #[arg(
        long,
        default_value_t = DEFAULT_BATCH_SIZE,
        help = "Number of pre-generated samples per parameter pool"
    )]
    batch_size: usize,
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    #[arg(long, default_value_t = DEFAULT_HISTOGRAM_BINS, help = "Histogram bin count")]
    bins: usize,
    #[arg(long, default_value_t = 114_000_000.0, help = "Gross rock volume lower bound")]
    grv_min: f64,
    #[arg(long, default_value_t = 189_750_000.0, help = "Gross rock volume upper bound")]
    grv_max: f64,
    #[arg(long, default_value_t = 0.1, help = "Porosity lower bound (fraction)")]
    phi_min: f64,
    #[arg(long, default_value_t = 0.5, help = "Porosity upper bound (fraction)")]
    phi_max: f64,
    #[arg(long, default_value_t = 0.6, help = "Oil saturation lower bound (fraction)")]
    s_oil_min: f64,
    #[arg(long, default_value_t = 0.9, help = "Oil saturation upper bound (fraction)")]
    s_oil_max: f64,
    #[arg(long, default_value_t = 1.1, help = "Oil formation factor lower bound (rb/stb)")]
    b_oil_min: f64,
    #[arg(long, default_value_t = 1.8, help = "Oil formation factor upper bound (rb/stb)")]
    b_oil_max: f64,
    #[arg(long, default_value_t = 0.72, help = "Net-to-gross lower bound (fraction)")]
    ntg_min: f64,
    #[arg(long, default_value_t = 0.94, help = "Net-to-gross upper bound (fraction)")]
    ntg_max: f64,
    #[arg(long, help = "Print the full summary as JSON instead of the text report")]
    json: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    iterations: Option<usize>,
    batch_size: Option<usize>,
    seed: Option<u64>,
    bins: Option<usize>,

    grv_min: Option<f64>,
    grv_max: Option<f64>,
    phi_min: Option<f64>,
    phi_max: Option<f64>,
    s_oil_min: Option<f64>,
    s_oil_max: Option<f64>,
    b_oil_min: Option<f64>,
    b_oil_max: Option<f64>,
    ntg_min: Option<f64>,
    ntg_max: Option<f64>,

    include_reserves: Option<bool>,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: Inputs,
    include_reserves: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    iterations: usize,
    batch_size: usize,
    seed: u64,
    ranges: ParameterRanges,
    distinct_values: usize,
    summary: DistributionSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    reserves: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: Cli) -> Result<Inputs, String> {
    if cli.iterations == 0 {
        return Err("--iterations must be > 0".to_string());
    }

    if cli.iterations > MAX_ITERATIONS {
        return Err(format!("--iterations must be <= {MAX_ITERATIONS}"));
    }

    if cli.batch_size == 0 {
        return Err("--batch-size must be > 0".to_string());
    }

    if cli.batch_size > MAX_BATCH_SIZE {
        return Err(format!("--batch-size must be <= {MAX_BATCH_SIZE}"));
    }

    if cli.bins == 0 {
        return Err("--bins must be > 0".to_string());
    }

    if cli.bins > MAX_HISTOGRAM_BINS {
        return Err(format!("--bins must be <= {MAX_HISTOGRAM_BINS}"));
    }

    let ranges = ParameterRanges {
        grv: ParameterRange::new(cli.grv_min, cli.grv_max),
        phi: ParameterRange::new(cli.phi_min, cli.phi_max),
        s_oil: ParameterRange::new(cli.s_oil_min, cli.s_oil_max),
        b_oil: ParameterRange::new(cli.b_oil_min, cli.b_oil_max),
        ntg: ParameterRange::new(cli.ntg_min, cli.ntg_max),
    };
    for parameter in Parameter::ALL {
        let range = ranges.get(parameter);
        let flag = parameter.key().replace('_', "-");
        if !range.lower.is_finite() || !range.upper.is_finite() {
            return Err(format!("--{flag}-min and --{flag}-max must be finite"));
        }
        if range.lower >= range.upper {
            return Err(format!("--{flag}-min must be < --{flag}-max"));
        }
    }

    if ranges.b_oil.lower <= 0.0 {
        return Err("--b-oil-min must be > 0".to_string());
    }

    Ok(Inputs {
        ranges,
        batch_size: cli.batch_size,
        iterations: cli.iterations,
        seed: cli.seed,
        histogram_bins: cli.bins,
    })
}

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let json = cli.json;
    let inputs = build_inputs(cli)?;
    let model = run_model(&inputs).map_err(|e| e.to_string())?;

    if json {
        let response = build_simulate_response(&inputs, &model, false);
        let body = serde_json::to_string_pretty(&response)
            .map_err(|e| format!("failed to serialize summary: {e}"))?;
        println!("{body}");
    } else {
        print!("{}", render_report(&inputs, &model));
    }
    Ok(())
}

// First line is the distinct ECDF value count.
fn render_report(inputs: &Inputs, model: &ModelResult) -> String {
    let summary = &model.summary;
    let mut lines = vec![
        summary.ecdf.len().to_string(),
        format!(
            "STOIIP estimate: {} iterations, pool size {}, seed {}",
            inputs.iterations, inputs.batch_size, inputs.seed
        ),
    ];
    for parameter in Parameter::ALL {
        let range = inputs.ranges.get(parameter);
        lines.push(format!(
            "  {:<6} {:<22} [{}, {}]",
            parameter.key(),
            parameter.description(),
            range.lower,
            range.upper
        ));
    }

    let classes = summary.reserve_classes;
    for (label, value) in [
        ("Mean", summary.mean),
        ("Std dev", summary.std_dev),
        ("P90", classes.p90),
        ("P50", classes.p50),
        ("P10", classes.p10),
    ] {
        lines.push(format!("{label:<9}{value:>18.0} bbl"));
    }

    let markers = summary.percentiles;
    lines.push("ECDF markers:".to_string());
    for (label, value) in [
        ("min", markers.min),
        ("25th", markers.p25),
        ("median", markers.p50),
        ("75th", markers.p75),
        ("max", markers.max),
    ] {
        lines.push(format!("  {label:<7}{value:>18.0} bbl"));
    }

    lines.push("Histogram:".to_string());
    let peak = summary
        .histogram
        .bins
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0)
        .max(1);
    for bin in &summary.histogram.bins {
        let bar = "#".repeat(bin.count * 40 / peak);
        lines.push(format!(
            "  {:>14.0} .. {:>14.0} {:>6} {bar}",
            bin.lower, bin.upper, bin.count
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "STOIIP HTTP API listening");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!(error = %msg, "rejected simulate request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let model = match run_model(&request.inputs) {
        Ok(model) => model,
        Err(e) => {
            error!(error = %e, "simulation failed");
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    let response = build_simulate_response(&request.inputs, &model, request.include_reserves);
    json_response(StatusCode::OK, response)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.iterations {
        cli.iterations = v;
    }
    if let Some(v) = payload.batch_size {
        cli.batch_size = v;
    }
    if let Some(v) = payload.seed {
        cli.seed = v;
    }
    if let Some(v) = payload.bins {
        cli.bins = v;
    }

    if let Some(v) = payload.grv_min {
        cli.grv_min = v;
    }
    if let Some(v) = payload.grv_max {
        cli.grv_max = v;
    }
    if let Some(v) = payload.phi_min {
        cli.phi_min = v;
    }
    if let Some(v) = payload.phi_max {
        cli.phi_max = v;
    }
    if let Some(v) = payload.s_oil_min {
        cli.s_oil_min = v;
    }
    if let Some(v) = payload.s_oil_max {
        cli.s_oil_max = v;
    }
    if let Some(v) = payload.b_oil_min {
        cli.b_oil_min = v;
    }
    if let Some(v) = payload.b_oil_max {
        cli.b_oil_max = v;
    }
    if let Some(v) = payload.ntg_min {
        cli.ntg_min = v;
    }
    if let Some(v) = payload.ntg_max {
        cli.ntg_max = v;
    }

    Ok(ApiRequest {
        inputs: build_inputs(cli)?,
        include_reserves: payload.include_reserves.unwrap_or(false),
    })
}

fn default_cli_for_api() -> Cli {
    let ranges = ParameterRanges::default();
    Cli {
        iterations: DEFAULT_ITERATIONS,
        batch_size: DEFAULT_BATCH_SIZE,
        seed: DEFAULT_SEED,
        bins: DEFAULT_HISTOGRAM_BINS,
        grv_min: ranges.grv.lower,
        grv_max: ranges.grv.upper,
        phi_min: ranges.phi.lower,
        phi_max: ranges.phi.upper,
        s_oil_min: ranges.s_oil.lower,
        s_oil_max: ranges.s_oil.upper,
        b_oil_min: ranges.b_oil.lower,
        b_oil_max: ranges.b_oil.upper,
        ntg_min: ranges.ntg.lower,
        ntg_max: ranges.ntg.upper,
        json: false,
    }
}

fn build_simulate_response(
    inputs: &Inputs,
    model: &ModelResult,
    include_reserves: bool,
) -> SimulateResponse {
    SimulateResponse {
        iterations: inputs.iterations,
        batch_size: inputs.batch_size,
        seed: inputs.seed,
        ranges: inputs.ranges,
        distinct_values: model.summary.ecdf.len(),
        summary: model.summary.clone(),
        reserves: include_reserves.then(|| model.reserves.clone()),
    }
}
