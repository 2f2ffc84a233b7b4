// Registrant Chart - Web Server
// REST API with Axum over a dataset loaded once at start-up

mod templates;

use anyhow::Result;
use askama::Template;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use clap::Parser;
use registrant_chart::{load_csv, logging, render_svg, summarize, AggregateBucket, PipelineSummary};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use templates::IndexTemplate;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "registrant-server", about = "Serves the registrants chart and its data")]
struct Args {
    /// Registrants CSV (header row required)
    #[arg(long)]
    csv: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3000")]
    addr: String,
}

/// Read-only state, computed once before serving
struct Dataset {
    summary: PipelineSummary,
    svg: String,
}

impl Dataset {
    fn new(summary: PipelineSummary) -> Result<Self> {
        let svg = render_svg(&summary.buckets)?;
        Ok(Self { summary, svg })
    }
}

#[derive(Clone)]
struct AppState {
    dataset: Arc<Dataset>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<Option<AggregateBucket>> {
    fn not_found(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/disciplines - Buckets, largest first
async fn get_disciplines(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.dataset.summary.buckets.clone()))
}

/// GET /api/disciplines/:name - One bucket by label ("undefined" = no discipline)
async fn get_discipline(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.dataset.summary.bucket(&name) {
        Some(bucket) => (StatusCode::OK, Json(ApiResponse::ok(Some(bucket.clone())))).into_response(),
        None => {
            warn!(discipline = %name, "unknown discipline requested");
            (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::not_found(format!("Unknown discipline: {}", name))),
            )
                .into_response()
        }
    }
}

/// GET /api/summary - Row counts and buckets
async fn get_summary(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.dataset.summary.clone()))
}

/// GET /chart.svg - Rendered chart
async fn get_chart(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "image/svg+xml")],
        state.dataset.svg.clone(),
    )
}

/// GET / - Chart page
async fn serve_index(State(state): State<AppState>) -> impl IntoResponse {
    let dataset = &state.dataset;
    match IndexTemplate::new(&dataset.summary, &dataset.svg).render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "index page rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Template rendering failed").into_response()
        }
    }
}

fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/disciplines", get(get_disciplines))
        .route("/disciplines/:name", get(get_discipline))
        .route("/summary", get(get_summary))
        .with_state(state.clone());

    Router::new()
        .route("/", get(serve_index))
        .route("/chart.svg", get(get_chart))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    println!("🌐 Registrant Chart - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let registrants = load_csv(&args.csv)?;
    let summary = summarize(&registrants);
    println!("✓ {}", summary.summary());

    let state = AppState {
        dataset: Arc::new(Dataset::new(summary)?),
    };

    let listener = tokio::net::TcpListener::bind(&args.addr).await?;
    info!(addr = %args.addr, "listening");

    println!("\n🚀 Server running on http://{}", args.addr);
    println!("   API:   http://{}/api/disciplines", args.addr);
    println!("   Chart: http://{}/chart.svg", args.addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use registrant_chart::{RawRow, Registrant};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        state_for(&[
            ("Ana", "Futbol"),
            ("Bea", "Futbol"),
            ("Carla", "Tiro con arco"),
            ("Dora", ""),
            ("", "Tenis"),
        ])
    }

    fn state_for(rows: &[(&str, &str)]) -> AppState {
        let registrants: Vec<Registrant> = rows
            .iter()
            .map(|(name, disciplina)| {
                Registrant::from_raw(&RawRow {
                    name: name.to_string(),
                    lastname: "Sosa".to_string(),
                    email: "s@x.com".to_string(),
                    partido: "Lanus".to_string(),
                    provincia: "Buenos Aires".to_string(),
                    disciplina_principal: disciplina.to_string(),
                    ..RawRow::default()
                })
            })
            .collect();

        AppState {
            dataset: Arc::new(Dataset::new(summarize(&registrants)).unwrap()),
        }
    }

    async fn get_body(uri: &str) -> (StatusCode, String) {
        get_body_from(test_state(), uri).await
    }

    async fn get_body_from(state: AppState, uri: &str) -> (StatusCode, String) {
        let response = app(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_body("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": "OK"}));
    }

    #[tokio::test]
    async fn test_disciplines_sorted() {
        let (status, body) = get_body("/api/disciplines").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            json["data"],
            serde_json::json!([
                {"disciplina": "Futbol", "usersTotal": 2},
                {"disciplina": "Tiro con arco", "usersTotal": 1},
                {"disciplina": null, "usersTotal": 1},
            ])
        );
    }

    #[tokio::test]
    async fn test_discipline_lookup() {
        let (status, body) = get_body("/api/disciplines/Tiro%20con%20arco").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"usersTotal\":1"));

        let (status, _) = get_body("/api/disciplines/undefined").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get_body("/api/disciplines/Natacion").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Unknown discipline"));
    }

    #[tokio::test]
    async fn test_summary() {
        let (_, body) = get_body("/api/summary").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["data"]["total_rows"], 5);
        assert_eq!(json["data"]["excluded_rows"], 1);
    }

    #[tokio::test]
    async fn test_chart_and_index() {
        let (status, svg) = get_body("/chart.svg").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(svg.matches("<rect").count(), 3);

        let (status, html) = get_body("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("/api/disciplines/Tiro%20con%20arco"));
        assert!(html.contains("<svg"));
    }

    #[tokio::test]
    async fn test_index_escapes_labels() {
        let state = state_for(&[("Ana", "Salto <alto> & \"largo\""), ("Bea", "Futbol")]);
        let (status, html) = get_body_from(state, "/").await;
        assert_eq!(status, StatusCode::OK);

        // link text and chart label are both escaped
        assert!(html.contains(">Salto &lt;alto&gt; &amp; &quot;largo&quot;</a> (1)"));
        assert!(html.contains(">Salto &lt;alto&gt; &amp; &quot;largo&quot;</text>"));
        assert!(!html.contains("<alto>"));
        assert!(html.contains("/api/disciplines/Salto%20%3Calto%3E%20%26%20%22largo%22"));

        // the chart markup itself is not escaped
        assert!(html.contains("<svg"));
        assert!(!html.contains("&lt;svg"));
        assert!(html.contains("<p>Rows: 2, Complete: 2, Excluded: 0, Disciplines: 2</p>"));
    }
}
