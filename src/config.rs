use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; the catalog is kept in memory when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL; caching is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// OpenAI API key; model-backed features are disabled when unset
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// Chat completion model identifier
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `<movie id>.mp4` files for movies without a video path
    #[serde(default = "default_video_dir")]
    pub video_dir: String,

    /// Origins allowed by CORS, comma separated in the environment
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_openai_api_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_video_dir() -> String {
    "uploads/videos".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
