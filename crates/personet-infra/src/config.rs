//! Global configuration loader for Personet.
//!
//! Reads `config.toml` from the data directory (`~/.personet/` in
//! production) and deserializes it into [`GlobalConfig`]. Falls back to
//! sensible defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use personet_types::config::GlobalConfig;

/// Resolve the data directory from `PERSONET_DATA_DIR`, falling back to
/// `~/.personet`.
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PERSONET_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".personet")
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No config.toml found at {}, using defaults",
                config_path.display()
            );
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!(
                "Failed to read {}: {err}, using defaults",
                config_path.display()
            );
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.bind_addr, "127.0.0.1:8000");
        assert_eq!(config.generation.timeout_secs, 60);
        assert_eq!(config.variants.tag.model, "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(
            &config_path,
            r#"
bind_addr = "0.0.0.0:9000"

[generation]
timeout_secs = 120

[variants.episodic]
model = "gpt-4.1"
temperature = 0.5
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.generation.timeout_secs, 120);
        // Unspecified sections keep their defaults.
        assert_eq!(config.generation.max_tokens, 1024);
        assert_eq!(config.variants.episodic.model, "gpt-4.1");
        assert_eq!(config.variants.tag.model, "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(&config_path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.bind_addr, "127.0.0.1:8000");
    }
}
