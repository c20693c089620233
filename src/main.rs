use std::{process, sync::Arc, time::Duration};

use catalog::{
    application::{
        categories::CategoryService,
        error::AppError,
        products::ProductService,
        repos::{
            CategoriesRepo, CategoriesWriteRepo, HealthRepo, ProductsRepo, ProductsWriteRepo,
            UsersRepo,
        },
        users::UserService,
    },
    cache::{self, CacheConfig},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};
use sqlx::PgPool;
use tokio::{net::TcpListener, sync::oneshot};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    // A missing .env file is not an error.
    dotenv::dotenv().ok();

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
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::from(InfraError::configuration(err.to_string())))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = init_pool(&settings.database).await?;
    info!(target: "catalog::migrate", "Migrations applied");
    pool.close().await;
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = init_pool(&settings.database).await?;
    let repositories = Arc::new(PostgresRepositories::new(pool));

    let cache_store = cache::connect(&CacheConfig::from(&settings.cache)).await;
    let state = build_api_state(repositories, cache_store, settings.cache.report_ttl);

    serve_http(&settings.server, state).await
}

/// Connects the pool and brings the schema up to date.
async fn init_pool(database: &config::DatabaseSettings) -> Result<PgPool, AppError> {
    let database_url = database.url.as_deref().ok_or_else(|| {
        AppError::validation(
            "database url is required (provide --database-url or set CATALOG__DATABASE__URL/DATABASE_URL)",
        )
    })?;

    let pool = PostgresRepositories::connect(
        database_url,
        database.max_connections.get(),
        database.acquire_timeout,
    )
    .await
    .map_err(|err| AppError::from(InfraError::Connect(err)))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    Ok(pool)
}

fn build_api_state(
    repositories: Arc<PostgresRepositories>,
    cache_store: Arc<dyn cache::CacheStore>,
    report_ttl: Duration,
) -> ApiState {
    let products_repo: Arc<dyn ProductsRepo> = repositories.clone();
    let products_write_repo: Arc<dyn ProductsWriteRepo> = repositories.clone();
    let categories_repo: Arc<dyn CategoriesRepo> = repositories.clone();
    let categories_write_repo: Arc<dyn CategoriesWriteRepo> = repositories.clone();
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let health_repo: Arc<dyn HealthRepo> = repositories;

    let products = ProductService::new(products_repo, products_write_repo)
        .with_cache(cache_store.clone(), report_ttl);

    ApiState {
        products: Arc::new(products),
        categories: Arc::new(
            CategoryService::new(categories_repo, categories_write_repo)
                .with_cache(cache_store.clone()),
        ),
        users: Arc::new(UserService::new(users_repo)),
        health: health_repo,
        cache: cache_store,
    }
}

async fn serve_http(server: &config::ServerSettings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state, server.request_timeout);

    let listener = TcpListener::bind(server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(target: "catalog::http", addr = %server.addr, "Listening");

    let (drain_tx, drain_rx) = oneshot::channel::<()>();
    let serve = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            let _ = drain_rx.await;
        },
    );
    let mut handle = tokio::spawn(serve.into_future());

    tokio::select! {
        result = &mut handle => return server_result(result),
        _ = shutdown_signal() => {}
    }

    info!(
        target: "catalog::http",
        grace_seconds = server.graceful_shutdown.as_secs(),
        "Shutdown requested; draining connections"
    );
    let _ = drain_tx.send(());

    match tokio::time::timeout(server.graceful_shutdown, &mut handle).await {
        Ok(result) => server_result(result),
        Err(_) => {
            warn!(target: "catalog::http", "Graceful shutdown timed out; aborting connections");
            handle.abort();
            Ok(())
        }
    }
}

fn server_result(
    result: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    result
        .map_err(|err| AppError::unexpected(format!("server task failed: {err}")))?
        .map_err(|err| AppError::from(InfraError::from(err)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
