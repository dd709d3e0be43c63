use super::error::{PostgrestError, PostgrestResult};

/// Runtime configuration describing how to reach the hosted REST endpoint.
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl PostgrestConfig {
    /// Construct a configuration from an explicit base URL (e.g. `https://x.supabase.co/rest/v1`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Attach the anonymous API key sent as `apikey` and bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> PostgrestResult<Self> {
        let base_url = std::env::var("POSTGREST_URL").map_err(|_| PostgrestError::MissingEnvVar {
            var: "POSTGREST_URL",
        })?;

        let mut config = Self::new(base_url);
        if let Ok(api_key) = std::env::var("POSTGREST_API_KEY") {
            config = config.with_api_key(api_key);
        }

        Ok(config)
    }
}
