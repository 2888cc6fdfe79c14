//! Server configuration.
//!
//! Layered the same way at every start:
//!
//! 1. Bundled defaults (`forge.toml` shipped with this crate)
//! 2. A user file: the `--config` path when given, otherwise
//!    `~/.config/forge/forge.toml` and then `./forge.toml`, each if present
//! 3. `FORGE__<SECTION>__<KEY>` environment variables
//! 4. Conventional deployment secrets (`DATABASE_URL`, `GEMINI_KEY`, ...)

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use forge_core::{AccountId, Pricing};
use forge_error::{ConfigError, ForgeResult};
use forge_models::{ProviderKind, ProvidersConfig};
use forge_rate_limit::RateLimitConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../forge.toml");

/// Listener and request handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    bind: String,
    /// End-to-end deadline for one generation
    request_deadline_secs: u64,
    /// Header carrying the caller's country code
    routing_header: String,
    /// Allowed CORS origins; empty allows any origin
    cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            request_deadline_secs: 110,
            routing_header: "x-vercel-ip-country".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Generation deadline.
    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_deadline_secs)
    }
}

/// Prices plus the advisory balance check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct PricingConfig {
    /// Per-mode prices
    #[serde(flatten)]
    prices: Pricing,
    /// Read the balance before calling a provider
    preflight_check: bool,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            prices: Pricing::default(),
            preflight_check: true,
        }
    }
}

/// Where balances and history live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DatabaseBackend {
    /// Postgres through diesel
    #[default]
    Postgres,
    /// Process memory; balances reset on restart
    Memory,
}

/// Ledger and record store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Backend selection
    backend: DatabaseBackend,
    /// Connection string; usually from `DATABASE_URL`
    #[serde(skip_serializing)]
    url: Option<String>,
    /// Maximum pooled connections
    pool_size: u32,
    /// Balance given to unseen accounts by the memory backend
    starting_credits: i64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Postgres,
            url: None,
            pool_size: 10,
            starting_credits: 10,
        }
    }
}

/// Where rendered artifacts go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    /// Supabase Storage bucket
    #[default]
    Supabase,
    /// Local directory
    Filesystem,
}

/// Artifact store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend selection
    backend: StorageBackend,
    /// Supabase bucket name
    bucket: String,
    /// Upload timeout in seconds
    upload_timeout_secs: u64,
    /// Directory for the filesystem backend
    root: PathBuf,
    /// URL prefix the filesystem root is served under, if any
    public_base: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Supabase,
            bucket: "generated-files".to_string(),
            upload_timeout_secs: 30,
            root: PathBuf::from("./generated"),
            public_base: None,
        }
    }
}

impl StorageConfig {
    /// Upload timeout.
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs.max(1))
    }
}

/// How bearer credentials are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuthBackend {
    /// Supabase Auth `/auth/v1/user`
    #[default]
    Supabase,
    /// Fixed token table for local runs
    Static,
}

/// One fixed credential for the static backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct StaticAccount {
    /// Bearer token
    #[serde(skip_serializing)]
    token: String,
    /// Account the token authenticates as
    account: AccountId,
}

impl StaticAccount {
    /// Pairs a token with an account.
    pub fn new(token: impl Into<String>, account: AccountId) -> Self {
        Self {
            token: token.into(),
            account,
        }
    }
}

/// Identity verification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct AuthConfig {
    /// Backend selection
    backend: AuthBackend,
    /// Verification timeout in seconds
    verify_timeout_secs: u64,
    /// Credentials accepted by the static backend
    static_accounts: Vec<StaticAccount>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            backend: AuthBackend::Supabase,
            verify_timeout_secs: 10,
            static_accounts: Vec::new(),
        }
    }
}

impl AuthConfig {
    /// Verification timeout.
    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs.max(1))
    }
}

/// Supabase project credentials, shared by the auth and storage backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct SupabaseConfig {
    /// Project URL
    url: Option<String>,
    /// Public anon key, sent with identity checks
    #[serde(skip_serializing)]
    anon_key: Option<String>,
    /// Service-role key, used for uploads
    #[serde(skip_serializing)]
    service_role_key: Option<String>,
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct ForgeConfig {
    /// Listener settings
    server: ServerConfig,
    /// Admission control
    rate_limit: RateLimitConfig,
    /// Prices
    pricing: PricingConfig,
    /// Content providers
    providers: ProvidersConfig,
    /// Ledger and history
    database: DatabaseConfig,
    /// Artifact store
    storage: StorageConfig,
    /// Identity verification
    auth: AuthConfig,
    /// Supabase project
    supabase: SupabaseConfig,
}

impl ForgeConfig {
    /// Loads configuration from every layer, including process environment secrets.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a file cannot be parsed, a value has the
    /// wrong type, or the result fails [`ForgeConfig::validate`].
    #[instrument]
    pub fn load(path: Option<&Path>) -> ForgeResult<Self> {
        let mut config = Self::from_layers(path)?;
        config.apply_secrets(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Builds from files and `FORGE__` variables only.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a source cannot be read or deserialized.
    pub fn from_layers(path: Option<&Path>) -> Result<Self, ConfigError> {
        debug!(?path, "Loading configuration: env > user file > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        builder = match path {
            Some(path) => builder.add_source(File::from(path.to_path_buf()).required(true)),
            None => {
                if let Some(home) = dirs::home_dir() {
                    let home_config = home.join(".config/forge/forge.toml");
                    builder = builder.add_source(File::from(home_config).required(false));
                }
                builder.add_source(File::with_name("forge").required(false))
            }
        };

        builder
            .add_source(
                Environment::with_prefix("FORGE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))
    }

    /// Applies the conventional deployment variables on top of file settings.
    ///
    /// `lookup` returns the value of a variable; blank values are ignored.
    pub fn apply_secrets(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = get("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(url) = get("SUPABASE_URL") {
            self.supabase.url = Some(url);
        }
        if let Some(key) = get("SUPABASE_ANON_KEY") {
            self.supabase.anon_key = Some(key);
        }
        if let Some(key) = get("SUPABASE_SERVICE_ROLE_KEY") {
            self.supabase.service_role_key = Some(key);
        }
        if let Some(key) = get("GEMINI_KEY") {
            self.providers = std::mem::take(&mut self.providers).with_api_key(ProviderKind::Gemini, key);
        }
        if let Some(key) = get("DEEPSEEK_KEY") {
            self.providers =
                std::mem::take(&mut self.providers).with_api_key(ProviderKind::DeepSeek, key);
        }
        if let Some(mock) = get("MOCK_AI") {
            let mock = matches!(mock.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes");
            self.providers = std::mem::take(&mut self.providers).with_mock(mock);
        }
        if let Some(port) = get("PORT") {
            let host = self
                .server
                .bind
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            self.server.bind = format!("{}:{}", host, port.trim());
        }
    }

    /// Overrides the listen address.
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.server.bind = bind.into();
        self
    }

    /// Checks that the selected backends have what they need.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.request_deadline_secs == 0 {
            return Err(ConfigError::new("server.request_deadline_secs must be positive"));
        }
        self.pricing
            .prices
            .validate()
            .map_err(|reason| ConfigError::new(format!("pricing: {}", reason)))?;
        self.rate_limit
            .validate()
            .map_err(|e| ConfigError::new(format!("rate_limit: {}", e.kind())))?;

        if self.database.backend == DatabaseBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::new(
                "DATABASE_URL is required for the postgres database backend",
            ));
        }
        if self.database.pool_size == 0 {
            return Err(ConfigError::new("database.pool_size must be positive"));
        }

        if self.storage.backend == StorageBackend::Supabase
            && (self.supabase.url.is_none() || self.supabase.service_role_key.is_none())
        {
            return Err(ConfigError::new(
                "SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY are required for supabase storage",
            ));
        }

        match self.auth.backend {
            AuthBackend::Supabase
                if self.supabase.url.is_none() || self.supabase.anon_key.is_none() =>
            {
                Err(ConfigError::new(
                    "SUPABASE_URL and SUPABASE_ANON_KEY are required for supabase auth",
                ))
            }
            AuthBackend::Static if self.auth.static_accounts.is_empty() => Err(ConfigError::new(
                "auth.static_accounts must list at least one credential for static auth",
            )),
            _ => Ok(()),
        }
    }
}
