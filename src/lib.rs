pub mod api;
pub mod config;
pub mod dashboard;
pub mod filter;
pub mod model;
pub mod session;
pub mod stats;
pub mod views;

pub use api::{AdminApi, ApiError, HttpApi};
pub use config::{Config, Overrides};
pub use dashboard::{Dashboard, Resource};
pub use filter::OrderFilter;
pub use views::{render, Tab};

use anyhow::{Context, Result};
use log::info;

use model::storage::Session;

pub const SUCCESS_BANNER: &str = "Login successful! Redirecting to dashboard...";

/// Logs in and stores the returned token at the configured session path
pub async fn login<A: AdminApi + ?Sized>(
    api: &A,
    config: &Config,
    email: &str,
    password: &str,
) -> Result<Session> {
    let token = api.login(email, password).await?;
    let session = Session {
        admin_token: token,
        email: email.to_owned(),
    };
    session::write(&config.session_path, &session)
        .with_context(|| format!("Error saving session to {:?}", config.session_path))?;
    info!("Stored admin session for {}", email);
    Ok(session)
}

/// What the operator sees when `login` fails: the server's own message for a
/// rejected login, the full error chain otherwise
pub fn login_failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Status { message, .. }) => message.clone(),
        _ => format!("{:#}", err),
    }
}

/// Fetches everything and renders the chosen tab
pub async fn show<A: AdminApi + ?Sized>(
    api: &A,
    filter: OrderFilter,
    tab: Tab,
    search: Option<&str>,
) -> String {
    let mut dashboard = Dashboard::new(filter);
    dashboard.refresh_all(api).await;
    render(&dashboard, tab, search)
}

/// JSON snapshot of all six collections
pub async fn export<A: AdminApi + ?Sized>(api: &A, filter: OrderFilter) -> Result<String> {
    let mut dashboard = Dashboard::new(filter);
    dashboard.refresh_all(api).await;
    serde_json::to_string_pretty(&dashboard).with_context(|| "Error serialising snapshot")
}
