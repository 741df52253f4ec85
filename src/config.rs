//! Configuração do worktrack carregada a partir de `worktrack.toml`.
//!
//! A struct [`WorkTrackConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! As variáveis de ambiente `WORKTRACK_API_URL` e `WORKTRACK_API_TOKEN` têm
//! precedência sobre o arquivo.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::api::DEFAULT_API_URL;
use crate::lifecycle::Role;

/// Configuração de nível superior carregada de `worktrack.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkTrackConfig {
    /// URL base da API REST do marketplace.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Token bearer já emitido pelo serviço de autenticação.
    #[serde(default)]
    pub api_token: String,

    /// Identificador do usuário autenticado.
    #[serde(default)]
    pub user_id: String,

    /// Papel padrão quando não especificado via CLI.
    #[serde(default = "default_role")]
    pub role: Role,

    /// Tempo máximo para estabelecer a conexão, em segundos.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Tempo máximo de cada requisição, em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

// Valor padrão da URL: backend local.
fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

// Valor padrão do papel: trabalhador.
fn default_role() -> Role {
    Role::Worker
}

// Valor padrão para o timeout de conexão: 10s.
fn default_connect_timeout_secs() -> u64 {
    10
}

// Valor padrão para o timeout de requisição: 30s.
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for WorkTrackConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: String::new(),
            user_id: String::new(),
            role: default_role(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl WorkTrackConfig {
    /// Carrega a configuração de `worktrack.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(Path::new("worktrack.toml"))?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Carrega a configuração de um caminho explícito, sem olhar o ambiente.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = toml::from_str::<WorkTrackConfig>(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Variáveis de ambiente têm precedência sobre o arquivo de configuração.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("WORKTRACK_API_URL")
            && !url.is_empty()
        {
            self.api_url = url;
        }
        if let Some(token) = lookup("WORKTRACK_API_TOKEN")
            && !token.is_empty()
        {
            self.api_token = token;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = WorkTrackConfig::default();
        assert_eq!(config.api_url, "http://localhost:8000/api/v1");
        assert_eq!(config.role, Role::Worker);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.api_token.is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            user_id = "42"
            role = "employer"
        "#;
        let config: WorkTrackConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.user_id, "42");
        assert_eq!(config.role, Role::Employer);
        assert_eq!(config.api_url, "http://localhost:8000/api/v1");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_url = \"https://jobs.example.rw/api/v1\"").unwrap();
        writeln!(file, "api_token = \"from-file\"").unwrap();
        let config = WorkTrackConfig::load_from(file.path()).unwrap();
        assert_eq!(config.api_url, "https://jobs.example.rw/api/v1");
        assert_eq!(config.api_token, "from-file");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkTrackConfig::load_from(&dir.path().join("worktrack.toml")).unwrap();
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "role = \"manager\"").unwrap();
        assert!(WorkTrackConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = WorkTrackConfig {
            api_token: "from-file".into(),
            ..Default::default()
        };
        config.apply_env(|key| match key {
            "WORKTRACK_API_TOKEN" => Some("from-env".into()),
            "WORKTRACK_API_URL" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.api_token, "from-env");
        // Variável vazia não sobrescreve.
        assert_eq!(config.api_url, "http://localhost:8000/api/v1");
    }
}
