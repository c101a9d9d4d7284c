use std::{fs::OpenOptions, net::SocketAddr, process::exit, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use time_tz::timezones;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use cashflow_admin::{
    AppState, PaginationConfig, build_router, graceful_shutdown, logging_middleware,
};

/// The web server for the cash-flow admin.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_PATH")]
    db_path: String,

    /// The port to serve the app from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// The canonical name of the local timezone, used to work out "today".
    #[arg(long, env = "LOCAL_TIMEZONE", default_value = "Europe/Moscow")]
    timezone: String,

    /// The number of transactions shown per page.
    #[arg(long, env = "PAGE_SIZE", default_value_t = 50)]
    page_size: u64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    if timezones::get_by_name(&args.timezone).is_none() {
        tracing::error!("Unknown timezone {}", args.timezone);
        exit(1);
    }

    if args.page_size == 0 {
        tracing::error!("The page size must be at least 1");
        exit(1);
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let connection = match Connection::open(&args.db_path) {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not open database at {}: {error}", args.db_path);
            exit(1);
        }
    };

    let pagination_config = PaginationConfig {
        default_page_size: args.page_size,
        ..Default::default()
    };

    let state = match AppState::new(connection, &args.timezone, pagination_config) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not initialize database: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server stopped with an error: {error}");
        exit(1);
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
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
        // Errors are logged where they happen, so skip the default 5xx logging.
        .on_failure(());

    router.layer(tracing_layer)
}
