use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::blog::{template::DEFAULT_TEMPLATE, PromptTemplate, Style};
use crate::llm::ollama::{DEFAULT_HOST, DEFAULT_MODEL};

/// Environment variable Ollama itself uses for its listen address
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";

/// Optional colour overrides, as `#RRGGBB` or `#RGB`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ThemeColors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Ollama base URL
    pub ollama_host: String,

    /// Model to generate with
    pub model: String,

    /// Prompt template with {blog_style}, {topic} and {words}
    pub template: String,

    /// Style preselected in the form
    pub default_style: Style,

    /// Desktop notification when a blog finishes generating
    pub notifications: bool,

    pub theme: ThemeColors,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ollama_host: DEFAULT_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            template: DEFAULT_TEMPLATE.to_string(),
            default_style: Style::default(),
            notifications: false,
            theme: ThemeColors::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("blogsmith");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        // Keep the user's file untouched, just run with defaults
                        tracing::warn!("Failed to parse config: {}", e);
                        return Ok(AppConfig::default());
                    }
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
        }

        let config = AppConfig::default();
        let _ = config.save();
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the service address: explicit override, then OLLAMA_HOST, then config
    pub fn resolve_host(&self, cli_host: Option<&str>) -> String {
        let env_host = std::env::var(OLLAMA_HOST_ENV).ok();
        Self::pick_host(cli_host, env_host.as_deref(), &self.ollama_host)
    }

    fn pick_host(cli: Option<&str>, env: Option<&str>, configured: &str) -> String {
        cli.or(env.filter(|h| !h.trim().is_empty()))
            .unwrap_or(configured)
            .to_string()
    }

    /// Parse the configured template, falling back to the built-in one
    pub fn prompt_template(&self) -> PromptTemplate {
        match PromptTemplate::new(self.template.as_str()) {
            Ok(template) => {
                tracing::debug!("Using prompt template: {}", template.source());
                template
            }
            Err(e) => {
                tracing::warn!("Invalid prompt template in config ({}), using default", e);
                PromptTemplate::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            ollama_host: "http://gpu-box:11434".to_string(),
            model: "mistral".to_string(),
            template: "{topic} / {words} / {blog_style}".to_string(),
            default_style: Style::CommonPeople,
            notifications: true,
            theme: ThemeColors {
                accent: Some("#FFC107".to_string()),
                ..Default::default()
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config.ollama_host, deserialized.ollama_host);
        assert_eq!(config.model, deserialized.model);
        assert_eq!(config.default_style, deserialized.default_style);
        assert_eq!(config.theme, deserialized.theme);
        assert!(serialized.contains("default_style = \"common-people\""));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: AppConfig = toml::from_str("model = \"phi3\"").unwrap();
        assert_eq!(config.model, "phi3");
        assert_eq!(config.ollama_host, DEFAULT_HOST);
        assert_eq!(config.template, DEFAULT_TEMPLATE);
        assert_eq!(config.default_style, Style::Researchers);
        assert!(!config.notifications);
    }

    #[test]
    fn test_host_precedence() {
        assert_eq!(
            AppConfig::pick_host(Some("cli:1"), Some("env:2"), "cfg:3"),
            "cli:1"
        );
        assert_eq!(AppConfig::pick_host(None, Some("env:2"), "cfg:3"), "env:2");
        assert_eq!(AppConfig::pick_host(None, Some(" "), "cfg:3"), "cfg:3");
        assert_eq!(AppConfig::pick_host(None, None, "cfg:3"), "cfg:3");
    }

    #[test]
    fn test_invalid_template_falls_back() {
        let config = AppConfig {
            template: "{topic} only".to_string(),
            ..Default::default()
        };
        assert_eq!(config.prompt_template(), PromptTemplate::default());
    }
}
