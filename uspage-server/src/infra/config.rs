//! Configuration: `.env`, optional `uspage.toml`, environment overrides.
//!
//! Precedence, lowest to highest: built-in defaults, config file,
//! environment variables, command-line flags.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

const DEFAULT_CONFIG_LOCATIONS: &[&str] = &["uspage.toml", "config/uspage.toml"];

#[derive(Debug, Parser)]
#[command(name = "uspage-server", about = "UsPage API server")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Bind host, overriding config and environment
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Bind port, overriding config and environment
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory of the local blob store.
    pub root: PathBuf,
    /// Base URL under which stored blobs are publicly served.
    pub public_base_url: String,
}

/// Shape of `uspage.toml`; every field optional.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    server: FileServerConfig,
    #[serde(default)]
    database: FileDatabaseConfig,
    #[serde(default)]
    storage: FileStorageConfig,
}

#[derive(Debug, Default, Deserialize)]
struct FileServerConfig {
    host: Option<IpAddr>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct FileDatabaseConfig {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct FileStorageConfig {
    root: Option<PathBuf>,
    public_base_url: Option<String>,
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        // Missing .env is fine; a malformed one is not.
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            return Err(err).context("failed to load .env");
        }

        let file = Self::load_file(cli.config.as_deref())?;

        let host = cli
            .host
            .or_else(|| parse_env("USPAGE_HOST"))
            .or(file.server.host)
            .unwrap_or_else(|| "127.0.0.1".parse().expect("valid default host"));
        let port = cli
            .port
            .or_else(|| parse_env("USPAGE_PORT"))
            .or(file.server.port)
            .unwrap_or(8080);

        let url = std::env::var("DATABASE_URL")
            .ok()
            .or(file.database.url)
            .context("DATABASE_URL is not set and no database.url in config file")?;
        let max_connections = parse_env("DB_MAX_CONNECTIONS")
            .or(file.database.max_connections)
            .unwrap_or(10);

        let root = std::env::var_os("MEDIA_ROOT")
            .map(PathBuf::from)
            .or(file.storage.root)
            .unwrap_or_else(|| PathBuf::from("storage/media"));
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .or(file.storage.public_base_url)
            .unwrap_or_else(|| format!("http://{host}:{port}/media"));

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url,
                max_connections,
            },
            storage: StorageConfig {
                root,
                public_base_url,
            },
        })
    }

    fn load_file(explicit: Option<&Path>) -> anyhow::Result<FileConfig> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.exists()),
        };

        let Some(path) = path else {
            return Ok(FileConfig::default());
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|raw| raw.parse().ok())
}
