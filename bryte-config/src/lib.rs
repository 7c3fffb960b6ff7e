//! Loader for site configuration with YAML + environment overlays.
//!
//! Sources are merged in order (files/snippets first, then `BRYTE_`-prefixed
//! environment variables), `${VAR}` placeholders are expanded, and the result is
//! deserialised into [`BryteConfig`]. Nested keys use `__` in environment
//! variables, e.g. `BRYTE_CMS__READ_KEY` overrides `cms.read_key`.
use bryte_common::observability::{LogConfig, LogFormat};
use config::{Config, ConfigError, Environment, File};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const DEFAULT_API_BASE: &str = "https://api.cosmicjs.com";

#[derive(Debug, Deserialize)]
pub struct BryteConfig {
    pub cms: CmsConfig,
    #[serde(default)]
    pub contact: ContactConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Headless CMS bucket credentials.
#[derive(Deserialize)]
pub struct CmsConfig {
    pub bucket_slug: String,
    pub read_key: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Blog posts may live in a separate bucket.
    #[serde(default)]
    pub posts: Option<BucketConfig>,
}

impl CmsConfig {
    /// Bucket holding blog posts, falling back to the main bucket.
    pub fn posts_bucket(&self) -> BucketConfig {
        self.posts.clone().unwrap_or_else(|| BucketConfig {
            bucket_slug: self.bucket_slug.clone(),
            read_key: self.read_key.clone(),
        })
    }
}

impl fmt::Debug for CmsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CmsConfig")
            .field("bucket_slug", &self.bucket_slug)
            .field("read_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("posts", &self.posts)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct BucketConfig {
    pub bucket_slug: String,
    pub read_key: String,
}

impl fmt::Debug for BucketConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketConfig")
            .field("bucket_slug", &self.bucket_slug)
            .field("read_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default = "default_max_name_length", deserialize_with = "scalar")]
    pub max_name_length: usize,
    #[serde(default = "default_max_message_length", deserialize_with = "scalar")]
    pub max_message_length: usize,
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            max_name_length: default_max_name_length(),
            max_message_length: default_max_message_length(),
            smtp: None,
        }
    }
}

/// Sliding window applied per client to contact submissions.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_window_secs", deserialize_with = "scalar")]
    pub window_secs: u64,
    #[serde(default = "default_max_requests", deserialize_with = "scalar")]
    pub max_requests: u32,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
        }
    }
}

#[derive(Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port", deserialize_with = "scalar")]
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Notification recipient; submissions go to `username` when unset.
    #[serde(default)]
    pub to: Option<String>,
}

impl SmtpConfig {
    pub fn recipient(&self) -> &str {
        self.to.as_deref().unwrap_or(&self.username)
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("to", &self.to)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default, deserialize_with = "scalar")]
    pub emit_stderr: bool,
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            emit_stderr: false,
            filter: default_filter(),
        }
    }
}

impl LoggingConfig {
    /// Translate the file-level settings into the tracing initialiser's input.
    pub fn to_log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.emit_stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.into()
}
fn default_max_name_length() -> usize {
    100
}
fn default_max_message_length() -> usize {
    5000
}
fn default_window_secs() -> u64 {
    15 * 60
}
fn default_max_requests() -> u32 {
    5
}
fn default_smtp_port() -> u16 {
    587
}
fn default_filter() -> String {
    "info".into()
}

/// Numbers and booleans given either natively (YAML) or as text (environment).
fn scalar<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + DeserializeOwned,
    T::Err: fmt::Display,
{
    match Value::deserialize(d)? {
        Value::String(s) => s.trim().parse().map_err(de::Error::custom),
        other => T::deserialize(other).map_err(de::Error::custom),
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

fn validate(cfg: &BryteConfig) -> Result<(), ConfigError> {
    let mut required = vec![
        ("cms.bucket_slug", cfg.cms.bucket_slug.as_str()),
        ("cms.read_key", cfg.cms.read_key.as_str()),
    ];
    if let Some(posts) = &cfg.cms.posts {
        required.push(("cms.posts.bucket_slug", posts.bucket_slug.as_str()));
        required.push(("cms.posts.read_key", posts.read_key.as_str()));
    }
    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::Message(format!("{key} must not be empty")));
        }
        if value.contains("${") {
            return Err(ConfigError::Message(format!(
                "{key} references an unset environment variable"
            )));
        }
    }
    if cfg.contact.rate_limit.max_requests == 0 {
        return Err(ConfigError::Message(
            "contact.rate_limit.max_requests must be at least 1".into(),
        ));
    }
    Ok(())
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct BryteConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for BryteConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl BryteConfigLoader {
    /// Start with `BRYTE_` env overrides; add files or snippets before loading.
    ///
    /// ```
    /// use bryte_config::BryteConfigLoader;
    ///
    /// let config = BryteConfigLoader::new()
    ///     .with_yaml_str("cms:\n  bucket_slug: site\n  read_key: abc")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.cms.bucket_slug, "site");
    /// assert_eq!(config.cms.api_base, "https://api.cosmicjs.com");
    /// assert_eq!(config.contact.max_name_length, 100);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`with_file`](Self::with_file) but silently skipped when the file is
    /// missing, so deployments can rely purely on environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use bryte_config::BryteConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOC_COSMIC_KEY", "injected-from-env"); }
    ///
    /// let config = BryteConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// cms:
    ///   bucket_slug: "bryte"
    ///   read_key: "${DOC_COSMIC_KEY}"
    /// contact:
    ///   rate_limit:
    ///     max_requests: 3
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.cms.read_key, "injected-from-env");
    /// assert_eq!(config.contact.rate_limit.max_requests, 3);
    /// assert_eq!(config.contact.rate_limit.window_secs, 900);
    ///
    /// unsafe { std::env::remove_var("DOC_COSMIC_KEY"); }
    /// ```
    pub fn load(self) -> Result<BryteConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("BRYTE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: BryteConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        validate(&typed)?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Providence")), ("STATE", Some("RI"))], || {
            let mut v = json!(["hello-$CITY", { "loc": "${CITY}-${STATE}" }, 42, true, null]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Providence", { "loc": "Providence-RI" }, 42, true, null])
            );
        });
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST_BRYTE}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST_BRYTE}"));
    }

    #[test]
    fn posts_bucket_falls_back_to_main_bucket() {
        let cms = CmsConfig {
            bucket_slug: "main".into(),
            read_key: "k".into(),
            api_base: default_api_base(),
            posts: None,
        };
        assert_eq!(cms.posts_bucket().bucket_slug, "main");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let smtp = SmtpConfig {
            host: "smtp.example.org".into(),
            port: 587,
            username: "site@example.org".into(),
            password: "hunter2".into(),
            to: None,
        };
        let rendered = format!("{smtp:?}");
        assert!(!rendered.contains("hunter2"));
        assert_eq!(smtp.recipient(), "site@example.org");
    }
}
