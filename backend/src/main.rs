use std::sync::Arc;

use axum::extract::FromRef;
use axum::http::StatusCode;
use axum::routing::{get, get_service, post};
use axum::{Json, Router};
use leptos::LeptosOptions;
use leptos_axum::{generate_route_list, LeptosRoutes};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod analyst;
mod analyze;
mod config;
mod market;
mod report;

use analyst::{MarketOnlyWriter, OpenAiWriter, ReportWriter};
use analyze::{analyze_handler, AnalysisService};
use config::ServerConfig;
use market::YahooMarket;

#[derive(Clone)]
struct ServerState {
    analysis: Arc<AnalysisService>,
    leptos_options: LeptosOptions,
}

impl FromRef<ServerState> for LeptosOptions {
    fn from_ref(state: &ServerState) -> LeptosOptions {
        state.leptos_options.clone()
    }
}

impl FromRef<ServerState> for Arc<AnalysisService> {
    fn from_ref(state: &ServerState) -> Arc<AnalysisService> {
        state.analysis.clone()
    }
}

async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let market = Arc::new(YahooMarket::from_config(&config)?);
    let writer: Arc<dyn ReportWriter> = match OpenAiWriter::from_config(&config)? {
        Some(openai) => {
            tracing::info!(model = %config.openai_model, "narrative reports enabled");
            Arc::new(openai)
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set; reports use market data only");
            Arc::new(MarketOnlyWriter)
        }
    };

    let leptos_options = LeptosOptions::builder()
        .output_name("ui")
        .site_root(config.site_root.clone())
        .site_addr(config.addr)
        .build();

    let state = ServerState {
        analysis: Arc::new(AnalysisService::new(market, writer)),
        leptos_options: leptos_options.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let leptos_routes = generate_route_list(ui::App);

    let app = Router::new()
        .route("/analyze", post(analyze_handler))
        .route("/health", get(liveness))
        .leptos_routes(&state, leptos_routes, ui::App)
        .fallback_service(
            get_service(ServeDir::new(leptos_options.site_root.clone()))
                .handle_error(|_| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(
        "backend v{} listening on http://{} (site root: {})",
        env!("CARGO_PKG_VERSION"),
        config.addr,
        config.site_root
    );
    axum::serve(listener, app).await?;
    Ok(())
}
