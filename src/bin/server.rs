use std::{
    fs::OpenOptions,
    net::SocketAddr,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use shawlet::{
    AppState, EmptyListPolicy, TokenVerifier, build_router, graceful_shutdown, logging_middleware,
};

/// The web server for Shawlet: the record API and the dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The port to serve the app from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// File path to the application SQLite database. Leave empty to use a
    /// temporary database that is deleted on shutdown.
    #[arg(long, env = "DATABASE_URL", default_value = "")]
    database_url: String,

    /// The shared secret the identity provider signs HS256 session tokens with.
    #[arg(long, env = "AUTH_SECRET", hide_env_values = true)]
    auth_secret: Option<String>,

    /// File path to the identity provider's RS256 public key in PEM format.
    #[arg(long, env = "AUTH_PUBLIC_KEY_PATH")]
    auth_public_key: Option<PathBuf>,

    /// The canonical timezone that dates are displayed in, e.g. "Pacific/Auckland".
    #[arg(long, env = "LOCAL_TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// Where the dashboard sends users who are not signed in.
    #[arg(long, env = "SIGN_IN_URL")]
    sign_in_url: Option<String>,

    /// Respond 404 instead of an empty array when a user has no records.
    #[arg(long, env = "EMPTY_LIST_NOT_FOUND")]
    empty_list_not_found: bool,

    /// File path for the debug log.
    #[arg(long, env = "LOG_PATH", default_value = "debug.log")]
    log_path: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    setup_logging(&args.log_path);

    let token_verifier = match token_verifier(&args) {
        Ok(token_verifier) => token_verifier,
        Err(error) => {
            tracing::error!("{error}");
            return ExitCode::FAILURE;
        }
    };

    let empty_list_policy = if args.empty_list_not_found {
        EmptyListPolicy::NotFound
    } else {
        EmptyListPolicy::EmptyArray
    };

    let connection = match open_database(&args.database_url) {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not open a database: {error}");
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::new(connection, token_verifier, &args.timezone) {
        Ok(state) => state
            .with_sign_in_url(args.sign_in_url)
            .with_empty_list_policy(empty_list_policy),
        Err(error) => {
            tracing::error!("Could not initialize the database: {error}");
            return ExitCode::FAILURE;
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server stopped with an error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn token_verifier(args: &Args) -> Result<TokenVerifier, String> {
    if let Some(path) = &args.auth_public_key {
        let pem = std::fs::read(path)
            .map_err(|error| format!("Could not read {}: {error}", path.display()))?;

        return TokenVerifier::from_rsa_pem(&pem).map_err(|error| error.to_string());
    }

    match &args.auth_secret {
        Some(secret) if !secret.is_empty() => Ok(TokenVerifier::from_secret(secret.as_bytes())),
        _ => Err("Either AUTH_SECRET or AUTH_PUBLIC_KEY_PATH must be set.".to_owned()),
    }
}

/// Open the database at `database_url`, falling back to an in-memory database
/// so that the server keeps running.
fn open_database(database_url: &str) -> Result<Connection, rusqlite::Error> {
    if database_url.is_empty() {
        tracing::warn!(
            "No database path given, records will be stored in a temporary database \
            and lost on shutdown"
        );
    }

    Connection::open(database_url).or_else(|error| {
        tracing::error!(
            "Could not open database at \"{database_url}\": {error}. \
            Falling back to an in-memory database"
        );
        Connection::open_in_memory()
    })
}

fn setup_logging(log_path: &Path) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let debug_log = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(log_file) => Some(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(Arc::new(log_file))
                .with_filter(filter::LevelFilter::DEBUG),
        ),
        Err(error) => {
            eprintln!("Could not open log file {}: {error}", log_path.display());
            None
        }
    };

    tracing_subscriber::registry()
        .with(stdout_log.with_filter(filter::LevelFilter::INFO))
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
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
