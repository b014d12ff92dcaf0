use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::llm::ApiProvider;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRagConfig {
    pub database: DatabaseConfig,
    pub generator: GeneratorConfig,
    pub retrieval: RetrievalConfig,
    pub query: QueryConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub read_pool_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub enabled: bool,
    pub provider: ApiProvider,
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Hard upper bound on a single synthesis call.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_tokens: usize,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub lookup_limit: usize,
    pub recommend_limit: usize,
    pub top_rated_limit: usize,
    pub cast_crew_limit: usize,
    /// Cap applied to every plan, including user-requested limits.
    pub max_results: usize,
    /// Movies with fewer TMDB votes are left out of rating-ranked plans.
    pub min_votes_for_ranking: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Input is truncated to this many characters before pattern matching.
    pub max_input_chars: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl MovieRagConfig {
    /// Validate config values, returning errors for clearly broken configurations.
    pub fn validate(&self) -> Result<(), String> {
        if self.database.read_pool_size == 0 {
            return Err("database.read_pool_size must be > 0".into());
        }
        if self.generator.model.trim().is_empty() {
            return Err("generator.model must not be empty".into());
        }
        if self.generator.base_url.trim().is_empty() {
            return Err("generator.base_url must not be empty".into());
        }
        if self.generator.timeout_secs == 0 {
            return Err("generator.timeout_secs must be > 0".into());
        }
        if self.generator.max_tokens == 0 {
            return Err("generator.max_tokens must be > 0".into());
        }
        if !(0.0..=2.0).contains(&self.generator.temperature) {
            return Err("generator.temperature must be in [0.0, 2.0]".into());
        }

        let r = &self.retrieval;
        if r.max_results == 0 {
            return Err("retrieval.max_results must be > 0".into());
        }
        for (name, value) in [
            ("lookup_limit", r.lookup_limit),
            ("recommend_limit", r.recommend_limit),
            ("top_rated_limit", r.top_rated_limit),
            ("cast_crew_limit", r.cast_crew_limit),
        ] {
            if value == 0 {
                return Err(format!("retrieval.{} must be > 0", name));
            }
            if value > r.max_results {
                return Err(format!("retrieval.{} must be <= max_results", name));
            }
        }
        if r.min_votes_for_ranking < 0 {
            return Err("retrieval.min_votes_for_ranking must be >= 0".into());
        }

        if self.query.max_input_chars < 16 {
            return Err("query.max_input_chars must be >= 16".into());
        }
        Ok(())
    }

    /// Load and validate config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MOVIE_AGENT_*` environment overrides on top of the loaded values.
    pub fn apply_env_overrides(&mut self) -> Result<(), String> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("MOVIE_AGENT_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(url) = lookup("MOVIE_AGENT_OLLAMA_BASE_URL") {
            self.generator.base_url = url;
        }
        if let Some(model) = lookup("MOVIE_AGENT_OLLAMA_MODEL") {
            self.generator.model = model;
        }
        if let Some(timeout) = lookup("MOVIE_AGENT_OLLAMA_TIMEOUT") {
            let secs: f64 = timeout
                .trim()
                .parse()
                .map_err(|_| format!("MOVIE_AGENT_OLLAMA_TIMEOUT is not a number: {}", timeout))?;
            self.generator.timeout_secs = secs.ceil().max(1.0) as u64;
        }
        if let Some(level) = lookup("MOVIE_AGENT_LOG_LEVEL") {
            self.log_level = level.to_lowercase();
        }
        self.validate()
    }
}

impl Default for MovieRagConfig {
    fn default() -> Self {
        let db_path = if Path::new("movies.db").exists() {
            PathBuf::from("movies.db")
        } else {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("movie-rag")
                .join("movies.db")
        };

        Self {
            database: DatabaseConfig {
                path: db_path,
                read_pool_size: 4,
            },
            generator: GeneratorConfig {
                enabled: true,
                provider: ApiProvider::Ollama,
                base_url: "http://localhost:11434".to_string(),
                model: "phi3:mini".to_string(),
                api_key: None,
                timeout_secs: 120,
                connect_timeout_secs: 10,
                max_tokens: 512,
                temperature: 0.7,
            },
            retrieval: RetrievalConfig {
                lookup_limit: 3,
                recommend_limit: 10,
                top_rated_limit: 5,
                cast_crew_limit: 10,
                max_results: 50,
                min_votes_for_ranking: 10,
            },
            query: QueryConfig {
                max_input_chars: 1000,
            },
            log_level: default_log_level(),
        }
    }
}
