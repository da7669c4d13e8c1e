use crate::due_date::DisplayLocale;
use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "todo-tui";
const DEFAULT_TABLE: &str = "todos";
const DEFAULT_LOCALE: &str = "ko-KR";

// Values read from config.toml; every key is optional
#[derive(Deserialize, Debug, Default)]
struct FileConfig {
    supabase_url: Option<String>,
    anon_key: Option<String>,
    table: Option<String>,
    locale: Option<String>,
    log_dir: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub supabase_url: String,
    pub anon_key: String,
    pub table: String,
    pub locale: DisplayLocale,
    pub log_dir: PathBuf,
}

impl Config {
    /// Loads `.env`, then `<config_dir>/todo-tui/config.toml`, with
    /// environment variables taking precedence over the file.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let file = match default_config_path() {
            Some(path) if path.exists() => read_file(&path)?,
            _ => FileConfig::default(),
        };

        Self::resolve(file, |key| env::var(key).ok())
    }

    fn resolve(
        file: FileConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let supabase_url = lookup("SUPABASE_URL")
            .or(file.supabase_url)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let anon_key = lookup("SUPABASE_ANON_KEY")
            .or(file.anon_key)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;
        let table = lookup("TODO_TABLE")
            .or(file.table)
            .unwrap_or_else(|| DEFAULT_TABLE.to_string());
        let locale = lookup("TODO_LOCALE")
            .or(file.locale)
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());
        let log_dir = file.log_dir.unwrap_or_else(default_log_dir);

        Ok(Config {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            anon_key,
            table,
            locale: DisplayLocale::from_tag(&locale),
            log_dir,
        })
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(env::temp_dir)
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            supabase_url = "https://file.supabase.co"
            anon_key = "file-key"
            locale = "en-US"
            "#,
        )
        .unwrap();
        let config =
            Config::resolve(file, lookup(&[("SUPABASE_URL", "https://env.supabase.co/")])).unwrap();

        assert_eq!(config.supabase_url, "https://env.supabase.co");
        assert_eq!(config.anon_key, "file-key");
        assert_eq!(config.table, "todos");
        assert_eq!(config.locale, DisplayLocale::English);
    }

    #[test]
    fn test_defaults_to_korean_locale() {
        let config = Config::resolve(
            FileConfig::default(),
            lookup(&[("SUPABASE_URL", "https://x.supabase.co"), ("SUPABASE_ANON_KEY", "k")]),
        )
        .unwrap();
        assert_eq!(config.locale, DisplayLocale::Korean);
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let result = Config::resolve(
            FileConfig::default(),
            lookup(&[("SUPABASE_URL", "https://x.supabase.co")]),
        );
        assert!(matches!(result, Err(ConfigError::Missing("SUPABASE_ANON_KEY"))));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let result: Result<FileConfig, _> = toml::from_str("supabase_url = ");
        assert!(result.is_err());
    }
}
