use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use mytrip_core::{DEFAULT_PAGE_SIZE, SortOrder};
use mytrip_provider_kto::{BASE_URL, KtoConfig};
use serde::Deserialize;

const KEY_VARS: [&str; 2] = ["TOUR_API_KEY", "NEXT_PUBLIC_TOUR_API_KEY"];
const BASE_URL_VAR: &str = "TOUR_API_BASE_URL";
const DEFAULT_CONFIG_FILE: &str = "mytrip.toml";
const DEFAULT_LOG_FILE: &str = "mytrip.log";
const DEFAULT_BOOKMARKS_FILE: &str = "mytrip-bookmarks.json";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Parser)]
#[command(name = "mytrip", version, about = "Browse Korean tourist attractions in the terminal")]
pub(crate) struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Items requested per page.
    #[arg(long)]
    pub page_size: Option<u32>,

    /// File that receives log output.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Optional settings read from the TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub service_key: Option<String>,
    pub base_url: Option<String>,
    pub page_size: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub sort: Option<SortOrder>,
    pub log_file: Option<PathBuf>,
    pub bookmarks_file: Option<PathBuf>,
}

impl FileConfig {
    /// Read `path`. A missing file is only an error when it was asked for explicitly.
    pub(crate) fn load(path: &Path, required: bool) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if !required && err.kind() == ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read config file: {}", path.display()));
            }
        };

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Settings {
    pub service_key: String,
    pub base_url: String,
    pub page_size: u32,
    pub timeout: Duration,
    pub sort: SortOrder,
    pub log_file: PathBuf,
    pub bookmarks_file: PathBuf,
}

impl Settings {
    /// Load `.env`, the config file and the process environment.
    pub(crate) fn load(args: &Args) -> Result<Self> {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            return Err(err).context("Failed to load .env file");
        }

        let (path, required) = match &args.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        let file = FileConfig::load(&path, required)?;

        Self::resolve(args, file, |name| env::var(name).ok())
    }

    /// Merge sources: command line, then environment, then file, then defaults.
    pub(crate) fn resolve(
        args: &Args,
        file: FileConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let non_blank = |value: Option<String>| value.filter(|value| !value.trim().is_empty());

        let service_key = KEY_VARS
            .iter()
            .find_map(|name| non_blank(lookup(name)))
            .or_else(|| non_blank(file.service_key));
        let Some(service_key) = service_key else {
            bail!(
                "No tour API key configured. Set {} or `service_key` in the config file",
                KEY_VARS.join(" or ")
            );
        };

        let base_url = non_blank(lookup(BASE_URL_VAR))
            .or_else(|| non_blank(file.base_url))
            .unwrap_or_else(|| BASE_URL.to_owned());

        let page_size = args
            .page_size
            .or(file.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            bail!("page size must be at least 1");
        }

        Ok(Self {
            service_key: service_key.trim().to_owned(),
            base_url,
            page_size,
            timeout: Duration::from_secs(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            sort: file.sort.unwrap_or_default(),
            log_file: args
                .log_file
                .clone()
                .or(file.log_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            bookmarks_file: file
                .bookmarks_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BOOKMARKS_FILE)),
        })
    }

    pub(crate) fn provider_config(&self) -> KtoConfig {
        KtoConfig {
            base_url: self.base_url.clone(),
            ..KtoConfig::new(self.service_key.clone())
        }
    }
}
