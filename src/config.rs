//! Pipeline configuration module.
//!
//! Handles loading and validating `picflow.toml`. All fields have working
//! defaults; a config file only overrides the values it names. Unknown keys
//! are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! input_dir = "input_images"   # Raw photos to process
//! output_dir = "pics"          # Processed candidates awaiting publish
//! ledger_file = "pics.txt"     # Append-only record of published paths
//! jpeg_quality = 95            # Output JPEG quality (1-100)
//!
//! [watermark]
//! text = "(c) picflow"         # Stamp text, bottom-right corner
//! opacity = 128                # 0 = invisible, 255 = opaque
//! margin = [20, 20]            # Inset from the bottom-right corner
//! font_path = "fonts/display.ttf"  # TrueType face; builtin fallback if absent
//! font_size = 15.0             # Pixel size for the TrueType face
//!
//! [schedule]
//! weekday = 3                  # 0 = Monday .. 6 = Sunday
//! hour = 10
//! minute = 0
//!
//! [publish]
//! hashtags = []                # Appended below the fold of every caption
//! recipients = []              # DM these accounts after a successful post
//! dm_delay_secs = 10           # Pause between DM calls (rate limits)
//! dm_message = "Hey! Check out my latest post: {url}"
//!
//! [commands]
//! # External collaborator commands, argv form. First element is the
//! # program. Empty = not configured.
//! upload = []                  # invoked as: <argv...> <file> <caption>
//! notify = []                  # invoked as: <argv...> <recipient> <message>
//! caption = []                 # invoked as: <argv...> <prompt>
//! ```

use crate::schedule::PostSchedule;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `picflow.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory of raw photos awaiting processing.
    pub input_dir: PathBuf,
    /// Directory of processed candidates awaiting publish.
    pub output_dir: PathBuf,
    /// Append-only ledger of published paths.
    pub ledger_file: PathBuf,
    /// Output JPEG quality (1-100).
    pub jpeg_quality: u8,
    pub watermark: WatermarkConfig,
    pub schedule: PostSchedule,
    pub publish: PublishConfig,
    pub commands: CommandsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatermarkConfig {
    pub text: String,
    pub opacity: u8,
    /// Inset from the bottom-right corner, (x, y).
    pub margin: [u32; 2],
    /// TrueType face; the builtin bitmap face is used when this is absent.
    pub font_path: PathBuf,
    pub font_size: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Hashtag block appended below the fold of every stem-derived caption.
    pub hashtags: Vec<String>,
    /// Accounts to DM after a successful post.
    pub recipients: Vec<String>,
    /// Pause between DM calls, in seconds.
    pub dm_delay_secs: u64,
    /// DM body; `{url}` expands to the latest post URL.
    pub dm_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommandsConfig {
    /// Upload command argv; the file path and caption are appended.
    pub upload: Vec<String>,
    /// Notify command argv; the recipient and message are appended.
    pub notify: Vec<String>,
    /// Caption command argv; the prompt is appended. Empty = derive the
    /// caption from the filename stem.
    pub caption: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input_images"),
            output_dir: PathBuf::from("pics"),
            ledger_file: PathBuf::from("pics.txt"),
            jpeg_quality: 95,
            watermark: WatermarkConfig::default(),
            schedule: PostSchedule::default(),
            publish: PublishConfig::default(),
            commands: CommandsConfig::default(),
        }
    }
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: "(c) picflow".to_string(),
            opacity: 128,
            margin: [20, 20],
            font_path: PathBuf::from("fonts/display.ttf"),
            font_size: 15.0,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            hashtags: Vec::new(),
            recipients: Vec::new(),
            dm_delay_secs: 10,
            dm_message: "Hey! Check out my latest post: {url}".to_string(),
        }
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            upload: Vec::new(),
            notify: Vec::new(),
            caption: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(ConfigError::Validation(
                "jpeg_quality must be 1-100".into(),
            ));
        }
        if self.watermark.font_size <= 0.0 {
            return Err(ConfigError::Validation(
                "watermark.font_size must be positive".into(),
            ));
        }
        self.schedule.validate().map_err(ConfigError::Validation)?;
        for (name, argv) in [
            ("commands.upload", &self.commands.upload),
            ("commands.notify", &self.commands.notify),
            ("commands.caption", &self.commands.caption),
        ] {
            if let Some(program) = argv.first()
                && program.is_empty()
            {
                return Err(ConfigError::Validation(format!(
                    "{name} program must not be empty"
                )));
            }
        }
        Ok(())
    }
}

/// Stock `picflow.toml` with every option documented, for `gen-config`.
pub fn stock_config_toml() -> String {
    r##"# picflow configuration. All options are optional; defaults shown.

# Raw photos to process.
input_dir = "input_images"
# Processed candidates awaiting publish.
output_dir = "pics"
# Append-only record of published paths.
ledger_file = "pics.txt"
# Output JPEG quality (1-100).
jpeg_quality = 95

[watermark]
# Stamp text, drawn translucent white in the bottom-right corner.
text = "(c) picflow"
# 0 = invisible, 255 = opaque.
opacity = 128
# Inset from the bottom-right corner, [x, y].
margin = [20, 20]
# TrueType face. When missing, a builtin bitmap face is used instead.
font_path = "fonts/display.ttf"
font_size = 15.0

[schedule]
# Weekly posting slot. 0 = Monday .. 6 = Sunday.
weekday = 3
hour = 10
minute = 0

[publish]
# Hashtag block appended below the fold of every stem-derived caption.
hashtags = []
# Accounts to DM after a successful post.
recipients = []
# Pause between DM calls, respecting platform rate limits.
dm_delay_secs = 10
# DM body; {url} expands to the latest post URL.
dm_message = "Hey! Check out my latest post: {url}"

[commands]
# External collaborator commands in argv form; the first element is the
# program. picflow appends the operation's arguments:
#   upload  <file> <caption>   -> prints the post id on stdout
#   notify  <recipient> <message>
#   caption <prompt>           -> prints the caption on stdout
upload = []
notify = []
caption = []
"##
    .to_string()
}
