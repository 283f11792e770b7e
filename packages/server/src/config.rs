use std::path::PathBuf;

use common::DocumentFormat;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Upper bound of the connection pool. Default: 20.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    20
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued tokens. Default: 7 days.
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
}

fn default_token_ttl_days() -> i64 {
    7
}

/// Where uploaded recipe images live and how they are exposed.
#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Filesystem root of the media store. Default: "./media".
    #[serde(default = "default_media_root")]
    pub root: PathBuf,
    /// Public URL prefix prepended to stored keys. Default: "/media/".
    #[serde(default = "default_media_url_prefix")]
    pub url_prefix: String,
    /// Maximum decoded image size in bytes. Default: 5 MiB.
    #[serde(default = "default_max_image_size")]
    pub max_image_size: u64,
}

fn default_media_root() -> PathBuf {
    PathBuf::from("./media")
}
fn default_media_url_prefix() -> String {
    "/media/".into()
}
fn default_max_image_size() -> u64 {
    5 * 1024 * 1024
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            url_prefix: default_media_url_prefix(),
            max_image_size: default_max_image_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    /// Page size used when the request omits `limit`. Default: 6.
    #[serde(default = "default_limit")]
    pub default_limit: u64,
    /// Upper bound for `limit`. Default: 100.
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,
}

fn default_limit() -> u64 {
    6
}
fn default_max_limit() -> u64 {
    100
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ShoppingListConfig {
    #[serde(default)]
    pub format: DocumentFormat,
}

/// Optional JSON fixtures loaded at startup.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeedConfig {
    pub ingredients_path: Option<PathBuf>,
    pub tags_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub shopping_list: ShoppingListConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., FOODGRAM__AUTH__JWT_SECRET)
            .add_source(
                Environment::with_prefix("FOODGRAM")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
