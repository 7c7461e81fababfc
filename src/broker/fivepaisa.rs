use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::model::index::Index;

use super::{Broker, crypto};
use super::types::*;

const BASE_URL: &str = "https://Openapi.5paisa.com/VendorsAPI/Service1.svc";

const LOGIN_ROUTE: &str = "/V4/LoginRequestMobileNewbyEmail";
const EXPIRY_ROUTE: &str = "/V2/GetExpiryForSymbolOptions";
const MARKET_DEPTH_ROUTE: &str = "/V1/MarketDepth";
const OPTION_CHAIN_ROUTE: &str = "/GetOptionsForSymbol";

/// NSE.
const EXCHANGE: &str = "N";
/// Derivatives segment.
const DERIVATIVES: &str = "D";

/// App credentials issued by the 5paisa developer console.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Credentials {
    pub app_name: String,
    pub app_source: String,
    pub user_id: String,
    pub password: String,
    pub user_key: String,
    pub encryption_key: String,
}

/// Account login, alongside the app credentials.
#[derive(Debug, Clone)]
pub struct LoginDetails {
    pub credentials: Credentials,
    pub email: String,
    pub password: String,
    /// Date of birth, `YYYYMMDD`; the API uses it as the second factor.
    pub dob: String,
}

/// Login fields as the endpoint expects them, encrypted with the app's key.
struct SealedLogin {
    email: String,
    password: String,
    dob: String,
}

impl SealedLogin {
    fn new(details: &LoginDetails) -> Result<Self, ConfigError> {
        let key = &details.credentials.encryption_key;
        let seal = |field: &str, value: &str| {
            crypto::encrypt(key, value)
                .map_err(|e| ConfigError::Login(format!("encrypting {field}: {e:#}")))
        };
        Ok(SealedLogin {
            email: seal("email", &details.email)?,
            password: seal("password", &details.password)?,
            dob: seal("date of birth", &details.dob)?,
        })
    }
}

/// 5paisa VendorsAPI session.
pub struct FivePaisaClient {
    http: reqwest::Client,
    base_url: String,
    user_key: String,
    client_code: String,
}

impl FivePaisaClient {
    /// Log in and return a session ready for market-data calls.
    pub async fn login(details: &LoginDetails, timeout: Duration) -> Result<Self, ConfigError> {
        Self::login_at(BASE_URL, details, timeout).await
    }

    /// Log in against a different API root.
    pub async fn login_at(
        base_url: &str,
        details: &LoginDetails,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .user_agent("premium-discount/0.1")
            .build()
            .map_err(|e| ConfigError::Login(format!("creating HTTP client: {e}")))?;

        let creds = &details.credentials;
        let sealed = SealedLogin::new(details)?;

        let request = Request {
            head: LoginHead {
                app_name: &creds.app_name,
                app_ver: "1.0",
                key: &creds.user_key,
                os_name: "WEB",
                request_code: "5PLoginV4",
                user_id: &creds.user_id,
                password: &creds.password,
            },
            body: LoginBody {
                Email_id: &sealed.email,
                Password: &sealed.password,
                LocalIP: "192.168.10.10",
                PublicIP: "192.168.10.10",
                HDSerailNumber: "",
                MACAddress: "",
                MachineID: "039377",
                VersionNo: "1.7",
                RequestNo: "1",
                My2PIN: &sealed.dob,
                ConnectionType: "1",
            },
        };

        let url = format!("{base_url}{LOGIN_ROUTE}");
        let resp: Option<LoginResponse> = post(&http, &url, &request)
            .await
            .map_err(|e| ConfigError::Login(format!("{e:#}")))?;
        let resp = resp.unwrap_or_default();

        let message = resp.message.unwrap_or_default();
        if !message.trim().is_empty() {
            return Err(ConfigError::Login(message));
        }
        let client_code = match resp.client_code {
            Some(code) if !code.trim().is_empty() => code,
            _ => return Err(ConfigError::Login("invalid credentials".to_string())),
        };

        info!(client_code = %client_code, "logged in");
        Ok(FivePaisaClient {
            http,
            base_url: base_url.to_string(),
            user_key: creds.user_key.clone(),
            client_code,
        })
    }

    pub fn client_code(&self) -> &str {
        &self.client_code
    }

    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        route: &str,
        body: B,
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, route);
        let request = Request {
            head: KeyHead {
                key: &self.user_key,
            },
            body,
        };
        post(&self.http, &url, &request).await
    }
}

async fn post<Req: Serialize, T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    request: &Req,
) -> Result<Option<T>> {
    debug!(url, "POST");
    let envelope = http
        .post(url)
        .json(request)
        .send()
        .await
        .with_context(|| format!("POST {url}"))?
        .error_for_status()?
        .json::<Envelope<T>>()
        .await
        .with_context(|| format!("decoding response from {url}"))?;
    Ok(envelope.body)
}

#[async_trait]
impl Broker for FivePaisaClient {
    async fn expiry_list(&self, index: Index) -> Result<Option<ExpiryResponse>> {
        self.call(
            EXPIRY_ROUTE,
            SymbolBody {
                client_code: &self.client_code,
                exch: EXCHANGE,
                symbol: index.name(),
            },
        )
        .await
    }

    async fn market_depth(&self, symbol: &str) -> Result<Option<MarketDepthResponse>> {
        self.call(
            MARKET_DEPTH_ROUTE,
            DepthBody {
                client_code: &self.client_code,
                count: 1,
                data: vec![DepthRequest {
                    exchange: EXCHANGE,
                    exchange_type: DERIVATIVES,
                    symbol,
                }],
            },
        )
        .await
    }

    async fn option_chain(
        &self,
        index: Index,
        time_code: i64,
    ) -> Result<Option<OptionChainResponse>> {
        self.call(
            OPTION_CHAIN_ROUTE,
            OptionChainBody {
                client_code: &self.client_code,
                exch: EXCHANGE,
                symbol: index.name(),
                expiry_date: format!("/Date({time_code})/"),
            },
        )
        .await
    }
}
