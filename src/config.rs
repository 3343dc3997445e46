//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_PASSWORD` - Bearer secret for admin operations
//! - `DATABASE_URL` - `PostgreSQL` connection string (postgres backend only)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 3000)
//! - `CATALOG_BACKEND` - `postgres` or `memory` (default: postgres)
//! - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `WHATSAPP_NUMBER` - Order destination (default: 584121410816)
//! - `STORE_NAME` - Order message header (default: KEROVIC)
//! - `CLOUDINARY_CLOUD_NAME` / `CLOUDINARY_UPLOAD_PRESET` - Image hosting; both or neither
//! - `CLOUDINARY_FOLDER` - Upload folder (default: kerovic)
//! - `MAX_IMAGE_BYTES` - Image size limit (default: 5 MiB)
//! - `NATS_URL` - Publish catalog events when set
//! - `LOG_FORMAT` - `json` for JSON logs

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use crate::domain::aggregates::OrderChannel;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_WHATSAPP_NUMBER: &str = "584121410816";
const DEFAULT_STORE_NAME: &str = "KEROVIC";
const DEFAULT_FOLDER: &str = "kerovic";
const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend { Postgres, Memory }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat { Pretty, Json }

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    pub folder: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub backend: Backend,
    pub database_url: Option<SecretString>,
    pub database_max_connections: u32,
    pub admin_password: SecretString,
    pub whatsapp_number: String,
    pub store_name: String,
    pub cloudinary: Option<CloudinaryConfig>,
    pub max_image_bytes: usize,
    pub nats_url: Option<String>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|key| std::env::var(key).ok()) }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match get("CATALOG_BACKEND").as_deref() {
            None | Some("postgres") => Backend::Postgres,
            Some("memory") => Backend::Memory,
            Some(other) => return Err(ConfigError::InvalidEnvVar("CATALOG_BACKEND", other.to_string())),
        };
        let database_url = get("DATABASE_URL").map(SecretString::from);
        if backend == Backend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar("DATABASE_URL"));
        }
        let admin_password = get("ADMIN_PASSWORD").map(SecretString::from).ok_or(ConfigError::MissingEnvVar("ADMIN_PASSWORD"))?;

        let cloudinary = match (get("CLOUDINARY_CLOUD_NAME"), get("CLOUDINARY_UPLOAD_PRESET")) {
            (Some(cloud_name), Some(upload_preset)) => Some(CloudinaryConfig {
                cloud_name, upload_preset,
                folder: get("CLOUDINARY_FOLDER").unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingEnvVar("CLOUDINARY_UPLOAD_PRESET")),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar("CLOUDINARY_CLOUD_NAME")),
        };

        Ok(Self {
            host: parse_or(get("HOST"), "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: parse_or(get("PORT"), "PORT", DEFAULT_PORT)?,
            backend,
            database_url,
            database_max_connections: parse_or(get("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", 10)?,
            admin_password,
            whatsapp_number: get("WHATSAPP_NUMBER").unwrap_or_else(|| DEFAULT_WHATSAPP_NUMBER.to_string()),
            store_name: get("STORE_NAME").unwrap_or_else(|| DEFAULT_STORE_NAME.to_string()),
            cloudinary,
            max_image_bytes: parse_or(get("MAX_IMAGE_BYTES"), "MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
            nats_url: get("NATS_URL"),
            log_format: if get("LOG_FORMAT").as_deref() == Some("json") { LogFormat::Json } else { LogFormat::Pretty },
        })
    }

    pub fn socket_addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }

    /// Checkout destination for clients that embed the cart and order formatter.
    pub fn order_channel(&self) -> OrderChannel { OrderChannel::new(&self.store_name, &self.whatsapp_number) }

    /// Plain equality against the configured admin secret.
    pub fn is_admin_secret(&self, candidate: &str) -> bool { candidate == self.admin_password.expose_secret() }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        Some(v) => v.parse().map_err(|_| ConfigError::InvalidEnvVar(key, v)),
        None => Ok(default),
    }
}
