use std::{process, sync::Arc};

use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use viewroute::{
    application::{error::AppError, ports::ContentStore},
    config::{self, ResolveArgs},
    infra::{
        bootstrap::{self, build_runtime},
        error::InfraError,
        http::{self, DispatchState},
        telemetry,
    },
};

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
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Resolve(args) => run_resolve(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let runtime = build_runtime(&settings.templates, &settings.results)?;
    let store: Arc<dyn ContentStore> = runtime.store.clone();
    let state = DispatchState::new(
        runtime.resolver.clone(),
        store,
        &settings.templates.content_type,
    )
    .map_err(|err| {
        InfraError::configuration(format!("invalid templates.content_type: {err}"))
    })?;
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;

    info!(
        addr = %settings.server.addr,
        root = %runtime.store.root().display(),
        extension = %settings.templates.extension,
        "dispatcher listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    info!(
        cached_targets = runtime.resolver.cache().len(),
        "dispatcher stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn run_resolve(settings: config::Settings, args: ResolveArgs) -> Result<(), AppError> {
    let runtime = build_runtime(&settings.templates, &settings.results)?;
    let target = bootstrap::resolve_once(&runtime, &args.action, args.result.as_deref()).await?;
    println!("{target}");
    Ok(())
}
