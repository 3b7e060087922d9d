use chrono::NaiveDate;
use habit_tracker::{resolve_data_path, router, AppState, Clock, FixedClock, SystemClock};
use std::{env, net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let data_path = resolve_data_path()?;
    if let Some(parent) = data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let state = AppState::new(data_path, resolve_clock());
    if state.store.assign_missing_ids().await? {
        info!(path = %state.store.path().display(), "normalized stored records");
    }

    let app = router(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn resolve_clock() -> Arc<dyn Clock> {
    match env::var("APP_TODAY") {
        Ok(raw) => match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => {
                info!(%date, "using fixed date");
                Arc::new(FixedClock::on(date))
            }
            Err(err) => {
                warn!("ignoring APP_TODAY={raw}: {err}");
                Arc::new(SystemClock)
            }
        },
        Err(_) => Arc::new(SystemClock),
    }
}
