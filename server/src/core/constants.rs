// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Lessonsmith";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "lessonsmith";

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "Lessonsmith Backend API";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "lessonsmith.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "LESSONSMITH_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "LESSONSMITH_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "LESSONSMITH_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "LESSONSMITH_LOG";

/// Environment variable for debug mode (logs upstream payloads in full)
pub const ENV_DEBUG: &str = "LESSONSMITH_DEBUG";

// =============================================================================
// Environment Variables - Generation Pipeline
// =============================================================================

/// API key for the generation pipeline
pub const ENV_PIPELINE_API_KEY: &str = "LESSONSMITH_PIPELINE_API_KEY";

/// Pipeline-execution URL for lesson generation
pub const ENV_PIPELINE_LESSON_URL: &str = "LESSONSMITH_PIPELINE_LESSON_URL";

/// Pipeline-execution URL for quiz generation
pub const ENV_PIPELINE_QUIZ_URL: &str = "LESSONSMITH_PIPELINE_QUIZ_URL";

/// Account identifier the pipeline expects in lesson payloads
pub const ENV_PIPELINE_USER_ID: &str = "LESSONSMITH_PIPELINE_USER_ID";

// =============================================================================
// Environment Variables - Learner Profile Store
// =============================================================================

/// Base URL of the learner profile store (personalization)
pub const ENV_PROFILE_URL: &str = "LESSONSMITH_PROFILE_URL";

/// API key for the learner profile store
pub const ENV_PROFILE_API_KEY: &str = "LESSONSMITH_PROFILE_API_KEY";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8000;

/// Default body limit for API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// Upstream Timeouts
// =============================================================================

/// Total timeout for generation-pipeline calls in seconds.
/// Synchronous pipeline execution can take minutes for long lessons.
pub const PIPELINE_TIMEOUT_SECS: u64 = 300;

/// Connect timeout for generation-pipeline calls in seconds
pub const PIPELINE_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Timeout for profile-store query and register calls in seconds
pub const PROFILE_QUERY_TIMEOUT_SECS: u64 = 100;

/// Timeout for profile-store ingest calls in seconds
pub const PROFILE_INGEST_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Segment Reconciliation
// =============================================================================

/// Number of leading records sampled per list when detecting the audio role
pub const AUDIO_SAMPLE_DEPTH: usize = 5;

/// Minimum number of result slots a lesson pipeline response must carry
pub const MIN_RESULT_SLOTS: usize = 2;

// =============================================================================
// Diagnostics
// =============================================================================

/// Maximum characters of offending text attached to parse errors
pub const PREVIEW_MAX_CHARS: usize = 200;
