use std::{fs::OpenOptions, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use finboard_rs::{
    AiConfig, AppState, LanguageModelClient, build_router, graceful_shutdown, logging_middleware,
};

/// The JSON API server for finboard_rs.
///
/// The server expects an authentication proxy in front of it that sets the
/// `x-tenant-id` header on every request.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical timezone used to date entries created without a date.
    #[arg(long, default_value = "America/Sao_Paulo")]
    timezone: String,

    /// The root of an OpenAI compatible API.
    #[arg(long, default_value = "https://api.openai.com/v1/")]
    ai_base_url: String,

    /// The model used by the advisor.
    #[arg(long, default_value = "gpt-4o-mini")]
    ai_model: String,

    /// How many seconds to wait for the model to reply.
    #[arg(long, default_value_t = 30)]
    ai_timeout_secs: u64,

    /// The API key for the model. The advisor is disabled without one.
    #[arg(long, env = "AI_API_KEY", hide_env_values = true)]
    ai_api_key: Option<String>,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let ai_config = AiConfig {
        base_url: args.ai_base_url,
        api_key: args.ai_api_key,
        model: args.ai_model,
        timeout: Duration::from_secs(args.ai_timeout_secs),
    };
    let advisor =
        LanguageModelClient::from_config(&ai_config).expect("Could not create the model client");

    if advisor.is_none() {
        tracing::warn!("No AI API key was given, the advisor endpoints are disabled.");
    }

    let conn = Connection::open(&args.db_path).expect("Could not open the database");
    let app_state = AppState::new(conn, &args.timezone, advisor)
        .expect("Could not initialize the application state");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(app_state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("The server stopped unexpectedly");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are handled.
        .on_failure(());

    router.layer(tracing_layer)
}
