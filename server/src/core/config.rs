use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_PORT, ENV_PIPELINE_API_KEY, ENV_PIPELINE_LESSON_URL,
    ENV_PIPELINE_QUIZ_URL, ENV_PIPELINE_USER_ID, ENV_PROFILE_API_KEY, ENV_PROFILE_URL,
};

/// Configuration errors are fatal at startup: the process refuses to serve
/// without complete pipeline credentials rather than failing per request.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("server configuration error: {0} is not set")]
    MissingCredential(&'static str),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Generation-pipeline configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PipelineFileConfig {
    pub api_key: Option<String>,
    pub lesson_url: Option<String>,
    pub quiz_url: Option<String>,
    pub user_id: Option<String>,
}

/// Learner-profile-store configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProfileFileConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

/// Top-level config file structure (lessonsmith.json)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub pipeline: Option<PipelineFileConfig>,
    pub profile: Option<ProfileFileConfig>,
}

// =============================================================================
// Environment Snapshot
// =============================================================================

/// Environment variables captured once at load time.
///
/// Kept as a plain struct so precedence resolution can be tested without
/// mutating process-global state.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub pipeline_api_key: Option<String>,
    pub pipeline_lesson_url: Option<String>,
    pub pipeline_quiz_url: Option<String>,
    pub pipeline_user_id: Option<String>,
    pub profile_url: Option<String>,
    pub profile_api_key: Option<String>,
}

impl EnvConfig {
    pub fn capture() -> Self {
        Self {
            pipeline_api_key: read_env(ENV_PIPELINE_API_KEY),
            pipeline_lesson_url: read_env(ENV_PIPELINE_LESSON_URL),
            pipeline_quiz_url: read_env(ENV_PIPELINE_QUIZ_URL),
            pipeline_user_id: read_env(ENV_PIPELINE_USER_ID),
            profile_url: read_env(ENV_PROFILE_URL),
            profile_api_key: read_env(ENV_PROFILE_API_KEY),
        }
    }
}

/// Read an environment variable, treating empty values as unset
fn read_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Resolved Config
// =============================================================================

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Credentials and endpoints for the generation pipeline.
/// All fields are required; validated once at startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api_key: String,
    pub lesson_url: String,
    pub quiz_url: String,
    pub user_id: String,
}

/// Credentials for the learner profile store. Optional as a whole: when
/// absent the server runs with personalization disabled.
#[derive(Debug, Clone)]
pub struct ProfileConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
    pub profile: Option<ProfileConfig>,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration with precedence: CLI > environment > file > default
    pub fn load(cli: &CliConfig) -> Result<Self, ConfigError> {
        let file = load_file(cli.config.as_deref())?;
        let env = EnvConfig::capture();
        Self::resolve(cli, &file, &env)
    }

    fn resolve(cli: &CliConfig, file: &FileConfig, env: &EnvConfig) -> Result<Self, ConfigError> {
        let file_server = file.server.clone().unwrap_or_default();
        let file_pipeline = file.pipeline.clone().unwrap_or_default();
        let file_profile = file.profile.clone().unwrap_or_default();

        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        };

        let pipeline = PipelineConfig {
            api_key: env
                .pipeline_api_key
                .clone()
                .or(file_pipeline.api_key)
                .ok_or(ConfigError::MissingCredential(ENV_PIPELINE_API_KEY))?,
            lesson_url: env
                .pipeline_lesson_url
                .clone()
                .or(file_pipeline.lesson_url)
                .ok_or(ConfigError::MissingCredential(ENV_PIPELINE_LESSON_URL))?,
            quiz_url: env
                .pipeline_quiz_url
                .clone()
                .or(file_pipeline.quiz_url)
                .ok_or(ConfigError::MissingCredential(ENV_PIPELINE_QUIZ_URL))?,
            user_id: env
                .pipeline_user_id
                .clone()
                .or(file_pipeline.user_id)
                .ok_or(ConfigError::MissingCredential(ENV_PIPELINE_USER_ID))?,
        };

        // Personalization needs both values; a half-configured profile store
        // is treated as disabled rather than an error.
        let profile_url = env.profile_url.clone().or(file_profile.base_url);
        let profile_key = env.profile_api_key.clone().or(file_profile.api_key);
        let profile = match (profile_url, profile_key) {
            (Some(base_url), Some(api_key)) => Some(ProfileConfig { base_url, api_key }),
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!(
                    "Profile store partially configured (need both {} and {}), personalization disabled",
                    ENV_PROFILE_URL,
                    ENV_PROFILE_API_KEY
                );
                None
            }
            (None, None) => None,
        };

        Ok(Self {
            server,
            pipeline,
            profile,
            debug: cli.debug,
        })
    }
}

/// Load the config file. An explicitly-passed path must exist; the default
/// path is optional and silently skipped when absent.
fn load_file(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(CONFIG_FILE_NAME), false),
    };

    if !path.exists() {
        if required {
            return Err(ConfigError::Io {
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                path,
            });
        }
        return Ok(FileConfig::default());
    }

    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
}

/// Check if a host string binds to all interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    host == "0.0.0.0" || host == "::"
}
