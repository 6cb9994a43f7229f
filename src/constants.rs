pub const MIN_COUNT: u32 = 1;
pub const WORD_MAX_COUNT: u32 = 50;
pub const SENTENCE_MAX_COUNT: u32 = 10;
pub const PARAGRAPH_MAX_COUNT: u32 = 5;
pub const DEFAULT_COUNT: u32 = 1;

pub const DIAL_MIN: u8 = 0;
pub const DIAL_MAX: u8 = 10;

pub const STATUS_VISIBLE_MS: u64 = 3_000;

pub const ENHANCED_PREF_KEY: &str = "use_enhanced";
pub const DIAL_PREF_KEY_PREFIX: &str = "tuning_";

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000";
pub const GENERATE_PATH: &str = "generate";
pub const CONNECT_TIMEOUT_MS_DEFAULT: u64 = 3_000;
pub const READ_TIMEOUT_MS_DEFAULT: u64 = 30_000;

pub const SETTINGS_FILE: &str = "settings.json";
pub const PREFERENCES_FILE: &str = "preferences.json";
pub const LOG_FILE_PREFIX: &str = "butter-flow.log";

pub const TRANSPORT_FAILURE_MESSAGE: &str = "Failed to generate text. Please try again.";
pub const COPY_OK_MESSAGE: &str = "Copied to clipboard!";
pub const COPY_FAILED_MESSAGE: &str = "Failed to copy text";
pub const NOTHING_TO_COPY_MESSAGE: &str = "Nothing to copy";
