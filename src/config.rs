use url::Url;

use crate::error::Error;
use crate::http::RetryPolicy;

/// Backend base URL used when nothing else is configured, matching a local
/// development server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/v1/api";

/// Environment variable consulted by [`ApiConfig::from_env`].
pub const BASE_URL_ENV: &str = "DEVCOLLAB_API_URL";

/// DevCollab API configuration.
///
/// Use [`from_env()`](ApiConfig::from_env) for convention-based setup, or
/// [`default()`](ApiConfig::default) with `with_*` methods for full control.
///
/// ```rust,ignore
/// use devcollab_client::ApiConfig;
///
/// let config = ApiConfig::default()
///     .with_base_url("https://api.devcollab.example/v1/api".parse()?);
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: Url,
    retry: RetryPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.parse().expect("valid default URL"),
            retry: RetryPolicy::default(),
        }
    }
}

impl ApiConfig {
    /// Create a configuration pointing at the given base URL.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            retry: RetryPolicy::default(),
        }
    }

    /// Create a configuration from the environment.
    ///
    /// Reads `DEVCOLLAB_API_URL`; when unset, the default base URL applies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the variable is set but not a valid URL.
    pub fn from_env() -> Result<Self, Error> {
        match std::env::var(BASE_URL_ENV) {
            Ok(raw) => {
                let base_url = raw
                    .parse()
                    .map_err(|e| Error::Config(format!("{BASE_URL_ENV}: {e}")))?;
                Ok(Self::new(base_url))
            }
            Err(_) => Ok(Self::default()),
        }
    }

    /// Override the backend base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: Url) -> Self {
        self.base_url = url;
        self
    }

    /// Override the retry/timeout policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Configured backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Retry/timeout policy applied to every request.
    #[must_use]
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Full URL for an API path.
    ///
    /// Paths are appended to the base URL textually rather than resolved with
    /// [`Url::join`], which would swallow the `/v1/api` suffix. Trailing
    /// slashes on the base are trimmed so `path` (which starts with `/`)
    /// never produces a double slash.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_backend() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url().as_str(), "http://localhost:5000/v1/api");
    }

    #[test]
    fn endpoint_appends_path_to_base() {
        let config = ApiConfig::default();
        assert_eq!(
            config.endpoint("/auth/login"),
            "http://localhost:5000/v1/api/auth/login"
        );
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let config = ApiConfig::new("http://localhost:5000/v1/api/".parse().unwrap());
        assert_eq!(
            config.endpoint("/health"),
            "http://localhost:5000/v1/api/health"
        );
    }

    #[test]
    fn endpoint_handles_bare_host() {
        // Url renders a bare authority with a "/" path.
        let config = ApiConfig::new("http://localhost:5000".parse().unwrap());
        assert_eq!(config.endpoint("/health"), "http://localhost:5000/health");
    }
}
