use std::{future::IntoFuture, process, sync::Arc};

use snapshare::{
    application::{
        AppServices, Backends, auth::AuthPolicy, error::AppError, repos::DocumentStore,
    },
    cache::{Cache, CacheConfig},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        memory::MemoryDocumentStore,
        telemetry,
    },
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli().map_err(InfraError::from)?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let store = init_store(&settings).await?;
    let cache = Cache::connect(&CacheConfig::from(&settings.cache)).await;
    info!(
        target = "snapshare::startup",
        cache = cache.backend_name(),
        "Backends ready"
    );

    let services = AppServices::new(Backends::new(store, cache), auth_policy(&settings.auth));
    let router = http::build_router(ApiState::new(services), &settings.server);

    serve_http(&settings.server, router).await
}

async fn init_store(settings: &config::Settings) -> Result<Arc<dyn DocumentStore>, AppError> {
    let Some(database_url) = settings.database.url.as_deref() else {
        warn!(
            target = "snapshare::startup",
            "No database url configured; documents are kept in memory and lost on exit"
        );
        return Ok(Arc::new(MemoryDocumentStore::new()));
    };

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(InfraError::StoreConnect)?;

    PostgresRepositories::run_migrations(&pool).await.map_err(InfraError::Migration)?;

    info!(target = "snapshare::startup", "Database migrations applied");
    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn auth_policy(settings: &config::AuthSettings) -> AuthPolicy {
    AuthPolicy {
        jwt_secret: settings.jwt_secret.clone(),
        token_ttl: settings.token_ttl,
        attempt_threshold: settings.login_attempt_threshold.get(),
        lock_duration: settings.login_lock,
    }
}

async fn serve_http(server: &config::ServerSettings, router: axum::Router) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(server.addr)
        .await
        .map_err(|source| InfraError::Bind {
            addr: server.addr,
            source,
        })?;
    info!(target = "snapshare::startup", addr = %server.addr, "Listening");

    let shutdown = Arc::new(Notify::new());
    let trigger = shutdown.clone();
    let mut task = tokio::spawn(
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { trigger.notified().await })
            .into_future(),
    );

    tokio::select! {
        joined = &mut task => return server_result(joined),
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                warn!(target = "snapshare::startup", error = %err, "Signal handler failed; shutting down");
            }
        }
    }

    info!(
        target = "snapshare::startup",
        grace_seconds = server.graceful_shutdown.as_secs(),
        "Shutdown requested; draining connections"
    );
    shutdown.notify_one();

    match tokio::time::timeout(server.graceful_shutdown, task).await {
        Ok(joined) => server_result(joined),
        Err(_) => {
            warn!(
                target = "snapshare::startup",
                "Connections still open after the grace period; exiting"
            );
            Ok(())
        }
    }
}

fn server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    joined
        .map_err(|err| AppError::unexpected(format!("server task failed: {err}")))?
        .map_err(|err| AppError::from(InfraError::Serve(err)))
}
