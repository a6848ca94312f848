use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmSection,
}

/// Which extraction reinforcement to use after the heuristic pass.
/// `Heuristics` means no external capability is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    #[default]
    Heuristics,
    Ollama,
    Remote,
}

#[derive(Deserialize)]
pub struct LlmSection {
    #[serde(default)]
    pub backend: LlmBackend,
    /// Hard ceiling on every outbound LLM request. Exceeding it counts
    /// as "capability unavailable" and falls back to the local result.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub ollama: OllamaSection,
    #[serde(default)]
    pub remote: RemoteSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            backend: LlmBackend::default(),
            timeout_secs: default_timeout_secs(),
            ollama: OllamaSection::default(),
            remote: RemoteSection::default(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Deserialize)]
pub struct OllamaSection {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

impl Default for OllamaSection {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_ollama_model() -> String {
    "qwen3:8b".to_string()
}

#[derive(Deserialize)]
pub struct RemoteSection {
    #[serde(default = "default_remote_url")]
    pub base_url: String,
    #[serde(default = "default_remote_model")]
    pub model: String,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            base_url: default_remote_url(),
            model: default_remote_model(),
        }
    }
}

fn default_remote_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_remote_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backend_is_heuristics() {
        let cfg = Config::default();
        assert_eq!(cfg.llm.backend, LlmBackend::Heuristics);
        assert_eq!(cfg.llm.timeout_secs, 30);
    }

    #[test]
    fn parses_minimal_toml() {
        let cfg: Config = toml::from_str("[llm]\nbackend = \"ollama\"\n").unwrap();
        assert_eq!(cfg.llm.backend, LlmBackend::Ollama);
        assert_eq!(cfg.llm.ollama.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.llm.backend, LlmBackend::Heuristics);
    }

    #[test]
    fn remote_section_overrides() {
        let cfg: Config = toml::from_str(
            "[llm]\nbackend = \"remote\"\ntimeout_secs = 10\n\n[llm.remote]\nmodel = \"gpt-4o\"\n",
        )
        .unwrap();
        assert_eq!(cfg.llm.backend, LlmBackend::Remote);
        assert_eq!(cfg.llm.timeout_secs, 10);
        assert_eq!(cfg.llm.remote.model, "gpt-4o");
    }
}
