use serde::{Deserialize, Serialize};

// ── Wire envelope ────────────────────────────────────────────────────

/// Every request goes out as `{"head": ..., "body": ...}`.
#[derive(Debug, Serialize)]
pub struct Request<H, B> {
    pub head: H,
    pub body: B,
}

/// Responses wrap their payload in `body`, which is null on failure.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub head: Option<serde_json::Value>,
    pub body: Option<T>,
}

#[derive(Debug, Serialize)]
pub struct KeyHead<'a> {
    pub key: &'a str,
}

// ── Login ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginHead<'a> {
    pub app_name: &'a str,
    pub app_ver: &'a str,
    pub key: &'a str,
    pub os_name: &'a str,
    pub request_code: &'a str,
    pub user_id: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[allow(non_snake_case)]
pub struct LoginBody<'a> {
    pub Email_id: &'a str,
    pub Password: &'a str,
    pub LocalIP: &'a str,
    pub PublicIP: &'a str,
    pub HDSerailNumber: &'a str,
    pub MACAddress: &'a str,
    pub MachineID: &'a str,
    pub VersionNo: &'a str,
    pub RequestNo: &'a str,
    pub My2PIN: &'a str,
    pub ConnectionType: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "ClientCode", default)]
    pub client_code: Option<String>,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
}

// ── Expiry list / spot ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SymbolBody<'a> {
    pub client_code: &'a str,
    pub exch: &'a str,
    pub symbol: &'a str,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpiryResponse {
    #[serde(rename = "Expiry", default)]
    pub expiry: Vec<ExpiryEntry>,
    /// Latest index quote, served alongside the expiry list.
    #[serde(default)]
    pub lastrate: Vec<LastRate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiryEntry {
    /// `/Date(1669284000000+0530)/`
    #[serde(rename = "ExpiryDate")]
    pub expiry_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastRate {
    #[serde(rename = "LTP")]
    pub ltp: f64,
}

// ── Market depth (futures) ───────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DepthBody<'a> {
    pub client_code: &'a str,
    pub count: usize,
    pub data: Vec<DepthRequest<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DepthRequest<'a> {
    pub exchange: &'a str,
    pub exchange_type: &'a str,
    pub symbol: &'a str,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketDepthResponse {
    #[serde(rename = "Data", default)]
    pub data: Option<Vec<DepthEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthEntry {
    #[serde(rename = "LastTradedPrice")]
    pub last_traded_price: f64,
}

// ── Option chain ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OptionChainBody<'a> {
    pub client_code: &'a str,
    pub exch: &'a str,
    pub symbol: &'a str,
    pub expiry_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionChainResponse {
    #[serde(rename = "Options", default)]
    pub options: Vec<ChainEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainEntry {
    /// `CE` or `PE`.
    #[serde(rename = "CPType")]
    pub cp_type: String,
    #[serde(rename = "StrikeRate")]
    pub strike_rate: f64,
    #[serde(rename = "LastRate")]
    pub last_rate: f64,
}
