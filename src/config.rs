use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::articles::pagination::DEFAULT_PAGE_SIZE;

/// Runtime configuration.
///
/// Sources, later ones overriding earlier ones:
/// 1. built-in defaults
/// 2. an optional config file (`folio.toml` in the working directory, or `--config`)
/// 3. environment variables prefixed with `FOLIO_`, nested keys separated by `__`
///    (e.g. `FOLIO_DATABASE__URL`, `FOLIO_ADMIN__EMAILS=a@x.dev,b@x.dev`)
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub identity: IdentityConfig,
    pub author: AuthorConfig,
    pub blog: BlogConfig,
    /// Enables the built-in demo users and the cookie login routes.
    ///
    /// The demo session cookie is unsigned JSON, so any client can claim any
    /// identity, admins included. Never enable this in production.
    pub demo_mode: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite://folio.db` or `sqlite::memory:`.
    pub url: String,
    pub max_connections: u32,
}

/// Static allow-list of administrators.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub user_ids: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
}

/// How the authenticating proxy in front of the server identifies users.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub trusted_headers: bool,
    pub user_id_header: String,
    pub email_header: String,
}

/// Author recorded on articles created through the admin API.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorConfig {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlogConfig {
    pub page_size: usize,
}

impl AppConfig {
    /// Load the configuration from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.addr", "127.0.0.1:3000")?
            .set_default("database.url", "sqlite://folio.db")?
            .set_default("database.max_connections", 5)?
            .set_default("admin.user_ids", Vec::<String>::new())?
            .set_default("admin.emails", Vec::<String>::new())?
            .set_default("identity.trusted_headers", false)?
            .set_default("identity.user_id_header", "x-auth-user-id")?
            .set_default("identity.email_header", "x-auth-user-email")?
            .set_default("author.name", "Site Owner")?
            .set_default("author.email", "owner@example.com")?
            .set_default("blog.page_size", DEFAULT_PAGE_SIZE as i64)?
            .set_default("demo_mode", false)?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("folio").required(false)),
        };

        builder
            .add_source(
                Environment::with_prefix("FOLIO")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("admin.user_ids")
                    .with_list_parse_key("admin.emails")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
