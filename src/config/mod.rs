//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach. It is the single place the
//! process environment is consulted; the client itself only ever sees the
//! explicit [`ClientOptions`] assembled here.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.patty.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `PATTY_TOKEN`, or legacy `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--token`/`-t` and friends
//!
//! # Configuration File
//!
//! Place `.patty.toml` in the current directory, home directory, or XDG
//! config directory with:
//!
//! ```toml
//! token = "ghp_example"
//! api_base = "https://api.github.com"
//! request_timeout_ms = 10000
//! cache_ttl_ms = 90000
//! ```

use std::env;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::github::client::{ClientOptions, DEFAULT_API_BASE, DEFAULT_USER_AGENT};
use crate::github::error::GithubError;
use crate::github::locator::PersonalAccessToken;
use crate::github::retry::RetryPolicy;

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `PATTY_TOKEN`, `GITHUB_TOKEN` (legacy), or `--token`: API credential
/// - `PATTY_API_BASE` or `--api-base`: Base endpoint for the provider API
/// - `PATTY_USER_AGENT` or `--user-agent`: Client identification string
/// - `PATTY_REQUEST_TIMEOUT_MS` or `--request-timeout-ms`: Per-attempt
///   timeout in milliseconds
/// - `PATTY_CACHE_TTL_MS` or `--cache-ttl-ms`: Lifetime of memoized lookups
///   in milliseconds
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use patty::PattyConfig;
///
/// let config = PattyConfig::load().expect("failed to load configuration");
/// let options = config.client_options().expect("configuration should assemble");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "PATTY",
    discovery(
        dotfile_name = ".patty.toml",
        config_file_name = "patty.toml",
        app_name = "patty"
    )
)]
pub struct PattyConfig {
    /// Personal access token for GitHub API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `PATTY_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Base endpoint for the provider REST API.
    ///
    /// Defaults to the public GitHub API root. Enterprise installs point
    /// this at their `/api/v3` root.
    #[ortho_config()]
    pub api_base: Option<String>,

    /// Client identification string sent as the user agent.
    #[ortho_config()]
    pub user_agent: Option<String>,

    /// Hard per-attempt request timeout in milliseconds.
    ///
    /// Defaults to 10 seconds.
    #[ortho_config()]
    pub request_timeout_ms: u64,

    /// Disables memoization of single pull request lookups.
    ///
    /// When set, every fetch goes to the network; useful for tests and
    /// consistency-sensitive one-off calls.
    ///
    /// Note: Environment variable `PATTY_NO_CACHE` is not supported because
    /// `ortho_config` does not load boolean values from the environment.
    #[ortho_config()]
    pub no_cache: bool,

    /// Lifetime of memoized lookups in milliseconds.
    ///
    /// Kept short (90 seconds by default), trading staleness for quota
    /// conservation.
    #[ortho_config()]
    pub cache_ttl_ms: u64,
}

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_CACHE_TTL_MS: u64 = 90_000;

impl Default for PattyConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: None,
            user_agent: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            no_cache: false,
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
        }
    }
}

impl PattyConfig {
    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// For backward compatibility, if no token is provided via
    /// `PATTY_TOKEN`, the CLI, or a configuration file, this method falls
    /// back to reading `GITHUB_TOKEN` from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::MissingToken`] when no token source provides
    /// a value.
    pub fn resolve_token(&self) -> Result<String, GithubError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or(GithubError::MissingToken)
    }

    /// Assembles explicit client options from this configuration.
    ///
    /// An absent token is a valid initial state; the resulting client fails
    /// fast until a credential is configured.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::Configuration`] when the base URL does not
    /// parse and [`GithubError::MissingToken`] when a configured token is
    /// blank.
    pub fn client_options(&self) -> Result<ClientOptions, GithubError> {
        let token = match self.resolve_token() {
            Ok(value) => Some(PersonalAccessToken::new(value)?),
            Err(GithubError::MissingToken) => None,
            Err(error) => return Err(error),
        };

        let api_base = Url::parse(self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)).map_err(
            |error| GithubError::Configuration {
                message: format!("invalid API base URL: {error}"),
            },
        )?;

        Ok(ClientOptions {
            token,
            api_base,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
            timeout: Duration::from_millis(self.request_timeout_ms),
            cache_enabled: !self.no_cache,
            cache_ttl: Duration::from_millis(self.cache_ttl_ms),
            retry: RetryPolicy::default(),
        })
    }
}
