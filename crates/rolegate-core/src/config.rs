//! Configuration management
//!
//! Settings are resolved in the following order:
//! 1. Environment variables
//! 2. The rolegate.toml configuration file
//! 3. Built-in defaults
//!
//! Inside the configuration file, `${VAR_NAME}` is expanded from the
//! environment before parsing, so secrets such as the bot token can stay
//! out of the file itself.
//!
//! Placeholders in the template values (`{}`, `{link}`, `{bot_id}`) are
//! opaque formatting inputs filled in by the render helpers below; the
//! verification logic never inspects them.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::codes::{DEFAULT_CODE_LENGTH, DEFAULT_TTL};
use crate::error::{Error, Result};

/// Main configuration for rolegate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Discord gateway settings (absent in api-only deployments)
    pub discord: Option<DiscordConfig>,

    /// HTTP backend settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Verification session settings
    #[serde(default)]
    pub verification: VerificationConfig,

    /// User-facing text templates
    #[serde(default)]
    pub messages: MessagesConfig,
}

/// Discord gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token
    pub token: String,

    /// Guild the verified role belongs to
    #[serde(default)]
    pub guild_id: u64,

    /// Role granted on successful verification
    #[serde(default)]
    pub verified_role_id: u64,

    /// Channel the verification panel is posted to
    #[serde(default)]
    pub channel_id: u64,

    /// The bot's own user id, substituted into the panel description
    #[serde(default)]
    pub bot_id: u64,

    /// Panel thumbnail URL
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// HTTP backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Port the code backend listens on
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Directory holding the prebuilt frontend bundle
    #[serde(default = "default_dist_dir")]
    pub dist_dir: String,

    /// Base URL the gateway uses to reach the code endpoint
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_api_port(),
            dist_dir: default_dist_dir(),
            backend_url: default_backend_url(),
        }
    }
}

/// Verification session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Link template sent to requesters; `{}` is replaced with the session id
    #[serde(default = "default_verification_url")]
    pub url: String,

    /// Seconds a code stays valid
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Digits per code
    #[serde(default = "default_code_length")]
    pub code_length: usize,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            url: default_verification_url(),
            ttl_seconds: default_ttl_seconds(),
            code_length: default_code_length(),
        }
    }
}

impl VerificationConfig {
    /// Render the verification link for a session id
    pub fn link_for(&self, session_id: &str) -> String {
        self.url.replacen("{}", session_id, 1)
    }

    /// Code time-to-live as a `Duration`
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// User-facing text templates
///
/// Every value here is presentation only. Operators translate or rebrand the
/// flow by editing these strings; none of them affect verification behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    /// Ephemeral reply when the requester already holds the verified role
    #[serde(default = "default_already_verified")]
    pub already_verified: String,

    /// DM sent after initiation; `{link}` is replaced with the rendered link
    #[serde(default = "default_verification_prompt")]
    pub verification_prompt: String,

    /// Ephemeral reply confirming the DM was sent
    #[serde(default = "default_check_your_dm")]
    pub check_your_dm: String,

    /// DM reply on successful verification
    #[serde(default = "default_verified_success")]
    pub verified_success: String,

    /// DM reply when the code matched but the role grant failed
    #[serde(default = "default_verified_fail")]
    pub verified_fail: String,

    /// DM reply on a wrong code
    #[serde(default = "default_wrong_code")]
    pub wrong_code: String,

    /// Ephemeral reply when the prompt DM could not be delivered
    #[serde(default = "default_delivery_failed")]
    pub delivery_failed: String,

    /// Panel embed description; `{bot_id}` is replaced with the bot user id
    #[serde(default = "default_embed_description")]
    pub embed_description: String,

    /// Label of the verify button
    #[serde(default = "default_verify_button_label")]
    pub verify_button_label: String,

    /// Style name of the verify button (primary/secondary/success/danger)
    #[serde(default = "default_verify_button_style")]
    pub verify_button_style: String,

    /// Prefix of the verified-count counter label
    #[serde(default = "default_counter_prefix")]
    pub counter_prefix: String,

    /// Style name of the counter button
    #[serde(default = "default_counter_style")]
    pub counter_style: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            already_verified: default_already_verified(),
            verification_prompt: default_verification_prompt(),
            check_your_dm: default_check_your_dm(),
            verified_success: default_verified_success(),
            verified_fail: default_verified_fail(),
            wrong_code: default_wrong_code(),
            delivery_failed: default_delivery_failed(),
            embed_description: default_embed_description(),
            verify_button_label: default_verify_button_label(),
            verify_button_style: default_verify_button_style(),
            counter_prefix: default_counter_prefix(),
            counter_style: default_counter_style(),
        }
    }
}

impl MessagesConfig {
    /// Render the verification prompt around a link
    pub fn render_prompt(&self, link: &str) -> String {
        self.verification_prompt.replace("{link}", link)
    }

    /// Render the panel embed description for a bot user id
    pub fn render_embed_description(&self, bot_id: u64) -> String {
        self.embed_description
            .replace("{bot_id}", &bot_id.to_string())
    }

    /// Render the counter button label for a holder count
    pub fn render_counter_label(&self, count: usize) -> String {
        format!("{}: {}", self.counter_prefix, count)
    }
}

fn default_api_port() -> u16 {
    5000
}

fn default_dist_dir() -> String {
    "dist".to_string()
}

fn default_backend_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_verification_url() -> String {
    "http://127.0.0.1:5000/?id={}".to_string()
}

fn default_ttl_seconds() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_code_length() -> usize {
    DEFAULT_CODE_LENGTH
}

fn default_already_verified() -> String {
    "You are already verified.".to_string()
}

fn default_verification_prompt() -> String {
    "Open this link to receive your verification code, then send the code back to me here: {link}"
        .to_string()
}

fn default_check_your_dm() -> String {
    "Check your DMs for the verification link.".to_string()
}

fn default_verified_success() -> String {
    "You have been verified. Welcome!".to_string()
}

fn default_verified_fail() -> String {
    "Your code was correct, but the role could not be assigned. Please try again in a moment."
        .to_string()
}

fn default_wrong_code() -> String {
    "Wrong code. Check the code and try again.".to_string()
}

fn default_delivery_failed() -> String {
    "I could not send you a DM. Enable direct messages for this server and try again."
        .to_string()
}

fn default_embed_description() -> String {
    "Click the button below to verify your account. <@{bot_id}> will send you a DM with instructions."
        .to_string()
}

fn default_verify_button_label() -> String {
    "Verify".to_string()
}

fn default_verify_button_style() -> String {
    "success".to_string()
}

fn default_counter_prefix() -> String {
    "Verified".to_string()
}

fn default_counter_style() -> String {
    "secondary".to_string()
}

impl Config {
    /// Expand `${VAR_NAME}` references against the environment
    ///
    /// Unset variables expand to the empty string. Plain `{}`-style
    /// placeholders are left untouched; only `$`-prefixed braces are
    /// interpreted.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // consume '{'

                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '}' {
                        chars.next(); // consume '}'
                        break;
                    }
                    var_name.push(c);
                    chars.next();
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file
    ///
    /// `${VAR_NAME}` references inside the file are expanded from the
    /// environment first; explicit environment variables still win over
    /// parsed values afterwards.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded_content = Self::expand_env_vars(&toml_content);

        let mut config: Config = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from the default locations
    ///
    /// Reads `./rolegate.toml` when it exists, otherwise falls back to
    /// environment variables alone.
    pub fn load() -> Result<Self> {
        if Path::new("rolegate.toml").exists() {
            return Self::from_toml_file("rolegate.toml");
        }

        Self::from_env()
    }

    /// Build configuration purely from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Overlay environment variables on the current values
    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("DISCORD_BOT_TOKEN") {
            let discord = self.discord.get_or_insert_with(|| DiscordConfig {
                token: String::new(),
                guild_id: 0,
                verified_role_id: 0,
                channel_id: 0,
                bot_id: 0,
                thumbnail: None,
            });
            discord.token = token;
        }

        if let Some(discord) = self.discord.as_mut() {
            if let Some(id) = env_u64("GUILD_ID") {
                discord.guild_id = id;
            }
            if let Some(id) = env_u64("VERIFIED_ROLE_ID") {
                discord.verified_role_id = id;
            }
            if let Some(id) = env_u64("CHANNEL_ID") {
                discord.channel_id = id;
            }
            if let Some(id) = env_u64("BOT_ID") {
                discord.bot_id = id;
            }
        }

        if let Ok(port) = std::env::var("API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }
        if let Ok(dir) = std::env::var("DIST_DIR") {
            self.api.dist_dir = dir;
        }
        if let Ok(url) = std::env::var("BACKEND_URL") {
            self.api.backend_url = url;
        }

        if let Ok(url) = std::env::var("VERIFICATION_URL") {
            self.verification.url = url;
        }
        if let Some(secs) = env_u64("CODE_TTL_SECS") {
            self.verification.ttl_seconds = secs;
        }
        if let Some(len) = env_u64("CODE_LENGTH") {
            self.verification.code_length = len as usize;
        }
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
