use crate::error::ExportError;
use reqwest::Url;
use std::path::PathBuf;

/// Prefix shared by every environment key the exporter reads.
pub const ENV_PREFIX: &str = "MOCHI_";

pub const DEFAULT_API_BASE_URL: &str = "https://app.mochi.cards/api";
pub const DEFAULT_DECK_NAME: &str = "Chinese";
pub const DEFAULT_OUTPUT_FILE: &str = "chinese_vocab.txt";

/// Settings for a single export run. Built once at startup and only borrowed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
    pub deck_name: String,
    pub output_file: PathBuf,
}

/// Values given on the command line. They win over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub deck_name: Option<String>,
    pub output_file: Option<PathBuf>,
}

impl Config {
    /// Load the configuration from the process environment
    pub fn from_env(overrides: &Overrides) -> Result<Self, ExportError> {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
        Self::from_vars(vars, overrides)
    }

    /// Build a configuration from `(key, value)` pairs.
    ///
    /// Keys are matched case-insensitively against `MOCHI_API_KEY`,
    /// `MOCHI_API_BASE_URL`, `MOCHI_DECK_NAME` and `MOCHI_OUTPUT_FILE`;
    /// anything else is ignored.
    pub fn from_vars<I, K, V>(vars: I, overrides: &Overrides) -> Result<Self, ExportError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut api_key: Option<String> = None;
        let mut api_base_url: Option<String> = None;
        let mut deck_name: Option<String> = None;
        let mut output_file: Option<PathBuf> = None;

        for (key, value) in vars {
            let key = key.as_ref().to_ascii_uppercase();
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value: String = value.into();
            match name {
                "API_KEY" => api_key = Some(value),
                "API_BASE_URL" => api_base_url = Some(value),
                "DECK_NAME" => deck_name = Some(value),
                "OUTPUT_FILE" => output_file = Some(PathBuf::from(value)),
                _ => {}
            }
        }

        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ExportError::Config(format!(
                    "{}API_KEY is not set. Add MOCHI_API_KEY=your_api_key to a .env file or export it",
                    ENV_PREFIX
                ))
            })?;

        let api_base_url = overrides
            .api_base_url
            .clone()
            .or(api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Ok(Self {
            api_key,
            api_base_url: normalize_base_url(&api_base_url)?,
            deck_name: overrides
                .deck_name
                .clone()
                .or(deck_name)
                .unwrap_or_else(|| DEFAULT_DECK_NAME.to_string()),
            output_file: overrides
                .output_file
                .clone()
                .or(output_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
        })
    }

    /// The API key with everything but the first and last four characters hidden
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ExportError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|e| ExportError::Config(format!("Invalid API base URL '{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ExportError::Config(format!(
            "API base URL must start with http:// or https://, got '{}'",
            raw
        )));
    }

    Ok(trimmed.to_string())
}
