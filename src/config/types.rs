use serde::Deserialize;

/// Default batch size used when draining held pages
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Default output collection holding parked pages
pub const DEFAULT_COLLECTION: &str = "login_flow_held_pages";

/// Default key of the flow's configuration blob
pub const DEFAULT_CONFIG_KEY: &str = "login_flow";

/// Default page `vars` key carrying the session cookie
pub const DEFAULT_VARS_KEY: &str = "login_flow_cookie";

/// Construction options for a login flow
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FlowOptions {
    /// Batch size used when querying held pages
    #[serde(rename = "per-page")]
    pub per_page: u32,

    /// Output collection used to store held pages
    pub collection: String,

    /// Key of the flow's configuration blob in the configuration store
    #[serde(rename = "config-key")]
    pub config_key: String,

    /// Page `vars` key that carries the cookie used to fetch
    #[serde(rename = "vars-key")]
    pub vars_key: String,

    /// Replacement list of response keys stripped from held pages
    #[serde(rename = "response-keys")]
    pub response_keys: Option<Vec<String>>,

    /// Keep response keys on held pages instead of stripping them
    #[serde(rename = "keep-response-keys")]
    pub keep_response_keys: bool,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            collection: DEFAULT_COLLECTION.to_string(),
            config_key: DEFAULT_CONFIG_KEY.to_string(),
            vars_key: DEFAULT_VARS_KEY.to_string(),
            response_keys: None,
            keep_response_keys: false,
        }
    }
}
