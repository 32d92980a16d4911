use async_trait::async_trait;
use log::*;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::filter::{orders_url, OrderFilter};
use crate::model::api::{LoginRequest, LoginResponse};
use crate::model::{College, DeliveryPerson, Order, Review, User, Vendor};

pub const LOGIN_PATH: &str = "/api/auth/admin";
pub const USERS_PATH: &str = "/api/auth/users";
pub const VENDORS_PATH: &str = "/api/vendor";
pub const DELIVERY_PERSONS_PATH: &str = "/api/deliveryPerson";
pub const COLLEGES_PATH: &str = "/api/colleges";
pub const REVIEWS_PATH: &str = "/api/auth/reviews";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("failed to de-serialise response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("login response from {url} carried no token")]
    MissingToken { url: String },
}

impl ApiError {
    /// HTTP status of a non-2xx reply, or of the transport failure when it had one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// The remote admin API, one call per resource
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Exchanges credentials for an opaque admin token
    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError>;
    async fn users(&self) -> Result<Vec<User>, ApiError>;
    async fn orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, ApiError>;
    async fn vendors(&self) -> Result<Vec<Vendor>, ApiError>;
    async fn delivery_persons(&self) -> Result<Vec<DeliveryPerson>, ApiError>;
    async fn colleges(&self) -> Result<Vec<College>, ApiError>;
    async fn reviews(&self) -> Result<Vec<Review>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: Url,
    client: Client,
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| ApiError::Transport {
            url: config.base_url.to_string(),
            source,
        })?;
        Ok(HttpApi {
            base_url: config.base_url.clone(),
            client,
        })
    }

    pub fn endpoint(&self, path: &str) -> Url {
        endpoint(&self.base_url, path)
    }

    async fn get_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, ApiError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| transport(&url, source))?;
        let status = response.status();
        let body = response.text().await.map_err(|source| transport(&url, source))?;
        debug!("GET {} -> {}", url, status);
        if !status.is_success() {
            return Err(status_error(status, &body, "Request failed"));
        }
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl AdminApi for HttpApi {
    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let url = self.endpoint(LOGIN_PATH);
        debug!("POST {} for {}", url, email);
        let response = self
            .client
            .post(url.clone())
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|source| transport(&url, source))?;
        let status = response.status();
        let body = response.text().await.map_err(|source| transport(&url, source))?;
        debug!("POST {} -> {}", url, status);
        login_token(&url, status, &body)
    }

    async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.get_list(self.endpoint(USERS_PATH)).await
    }

    async fn orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, ApiError> {
        self.get_list(orders_url(&self.base_url, filter)).await
    }

    async fn vendors(&self) -> Result<Vec<Vendor>, ApiError> {
        self.get_list(self.endpoint(VENDORS_PATH)).await
    }

    async fn delivery_persons(&self) -> Result<Vec<DeliveryPerson>, ApiError> {
        self.get_list(self.endpoint(DELIVERY_PERSONS_PATH)).await
    }

    async fn colleges(&self) -> Result<Vec<College>, ApiError> {
        self.get_list(self.endpoint(COLLEGES_PATH)).await
    }

    async fn reviews(&self) -> Result<Vec<Review>, ApiError> {
        self.get_list(self.endpoint(REVIEWS_PATH)).await
    }
}

pub fn endpoint(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    url.set_path(path);
    url.set_query(None);
    url
}

fn transport(url: &Url, source: reqwest::Error) -> ApiError {
    ApiError::Transport {
        url: url.to_string(),
        source,
    }
}

/// A 2xx only counts as a login when it carries a non-empty token
pub fn login_token(url: &Url, status: StatusCode, body: &str) -> Result<String, ApiError> {
    if !status.is_success() {
        return Err(status_error(status, body, "Login failed"));
    }
    let login: LoginResponse = serde_json::from_str(body).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })?;
    login
        .token
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingToken { url: url.to_string() })
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Uses the server's `error` (or `message`) field when the body has one
pub fn status_error(status: StatusCode, body: &str, fallback: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_owned());
    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}
