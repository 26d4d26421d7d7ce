use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::fs;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use backend_application::commands::daily_commands;
use backend_application::commands::import_commands::{self, ImportRequest};
use backend_application::queries::report_queries;
use backend_application::AppState;
use backend_domain::{today, RangeQuery};
use backend_infrastructure::schedule_maintenance;
use backend_interfaces_http::build_router;

use crate::cli::{CleanupArgs, ImportArgs, ReportArgs};
use crate::context::AppContext;

fn build_router_with_layers(state: AppState) -> Router {
    let max_body_bytes = usize::try_from(state.config.max_body_bytes).unwrap_or(usize::MAX);
    build_router(state.clone())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_seconds,
        )))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(context: AppContext) -> Result<()> {
    let state = context.state;

    tokio::spawn(schedule_maintenance(state.clone()));

    let app = build_router_with_layers(state.clone());
    let addr: std::net::SocketAddr = state.config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

pub async fn run_import(context: AppContext, args: ImportArgs) -> Result<()> {
    let bytes = fs::read(&args.file)
        .await
        .with_context(|| format!("read {}", args.file.display()))?;
    let outcome = import_commands::import_sheet(
        &context.state,
        ImportRequest {
            bytes,
            date: args.date.unwrap_or_else(today),
            tag: args.tag,
            tag_filter: args.tag_filter,
            format: Some(args.file.to_string_lossy().to_string()),
            add_new_members: args.add_new_members,
        },
    )
    .await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

pub async fn run_cleanup(context: AppContext, args: CleanupArgs) -> Result<()> {
    let outcome = daily_commands::clean_daily_data(&context.state, args.retention_days).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

pub async fn run_report(context: AppContext, args: ReportArgs) -> Result<()> {
    let query = RangeQuery {
        start: Some(args.start.to_string()),
        end: Some(args.end.to_string()),
        active_only: args.active_only,
    };
    let path = match args.out {
        Some(out) => {
            let html = report_queries::html_report(&context.state, query).await?;
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            fs::write(&out, html)
                .await
                .with_context(|| format!("write {}", out.display()))?;
            out
        }
        None => report_queries::publish_report(&context.state, query).await?,
    };
    println!("{}", path.display());
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("sigterm handler unavailable: {}", err);
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
