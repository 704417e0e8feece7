use super::error::{RestLookupError, RestResult};

const DEFAULT_TABLE: &str = "clues";

/// Runtime configuration describing how to reach the hosted clue table.
#[derive(Debug, Clone)]
pub struct RestLookupConfig {
    /// Project URL, without the `/rest/v1` suffix.
    pub base_url: String,
    /// Table holding the clues.
    pub table: String,
    /// Key sent as both `apikey` and bearer token.
    pub api_key: Option<String>,
}

impl RestLookupConfig {
    /// Construct a configuration targeting the default `clues` table.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            table: DEFAULT_TABLE.to_string(),
            api_key: None,
        }
    }

    /// Attach the API key sent as both `apikey` and bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> RestResult<Self> {
        let base_url = std::env::var("CLUE_LOOKUP_URL").map_err(|_| {
            RestLookupError::MissingEnvVar {
                var: "CLUE_LOOKUP_URL",
            }
        })?;

        let mut config = Self::new(base_url);
        if let Some(table) = std::env::var("CLUE_LOOKUP_TABLE")
            .ok()
            .filter(|table| !table.trim().is_empty())
        {
            config.table = table;
        }
        if let Ok(api_key) = std::env::var("CLUE_LOOKUP_API_KEY") {
            config = config.with_api_key(api_key);
        }

        Ok(config)
    }
}
