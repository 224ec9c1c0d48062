//! Configuração do Invoice Nudger carregada a partir de `nudger.toml`.
//!
//! A struct [`NudgerConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! As variáveis de ambiente `RESEND_API_KEY`, `DEFAULT_FROM_EMAIL`,
//! `CRON_API_KEY` e `ADMIN_API_KEY` têm precedência sobre o arquivo.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::service::SenderSettings;

/// Nome do arquivo procurado no diretório atual quando `--config` não é usado.
pub const DEFAULT_CONFIG_FILE: &str = "nudger.toml";

/// Configuração de nível superior carregada de `nudger.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct NudgerConfig {
    /// Chave da API Resend.
    #[serde(default)]
    pub resend_api_key: String,

    /// URL base da API Resend (alterável para testes).
    #[serde(default = "default_resend_base_url")]
    pub resend_base_url: String,

    /// Remetente padrão dos lembretes.
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// Endereço opcional para respostas dos clientes.
    #[serde(default)]
    pub reply_to: Option<String>,

    /// Chave exigida no header `x-api-key` do endpoint de cron.
    /// Sem chave configurada, o endpoint recusa todas as chamadas.
    #[serde(default)]
    pub cron_api_key: Option<String>,

    /// Chave exigida no header `x-api-key` dos endpoints de administração.
    #[serde(default)]
    pub admin_api_key: Option<String>,

    /// Endereço em que o servidor HTTP escuta.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Arquivo JSON com faturas, clientes, templates e histórico.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

// Valor padrão da URL da Resend.
fn default_resend_base_url() -> String {
    "https://api.resend.com".to_string()
}

// Valor padrão do remetente.
fn default_from_email() -> String {
    "invoices@invoicenudger.com".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_data_file() -> PathBuf {
    PathBuf::from("nudger-data.json")
}

impl Default for NudgerConfig {
    fn default() -> Self {
        Self {
            resend_api_key: String::new(),
            resend_base_url: default_resend_base_url(),
            from_email: default_from_email(),
            reply_to: None,
            cron_api_key: None,
            admin_api_key: None,
            bind_addr: default_bind_addr(),
            data_file: default_data_file(),
        }
    }
}

impl NudgerConfig {
    /// Carrega a configuração de `path`, ou de `nudger.toml` no diretório
    /// atual. Usa valores padrão se o arquivo padrão não existir; um caminho
    /// explícito inexistente é erro.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    // Mesmo que `load`, com a leitura do ambiente injetada.
    fn load_with(path: Option<&Path>, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let p = Path::new(DEFAULT_CONFIG_FILE);
                if p.exists() {
                    Self::from_file(p)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(var);
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = toml::from_str::<NudgerConfig>(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Variáveis de ambiente têm precedência sobre o arquivo de configuração.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| var(name).filter(|v| !v.is_empty());

        if let Some(key) = non_empty("RESEND_API_KEY") {
            self.resend_api_key = key;
        }
        if let Some(from) = non_empty("DEFAULT_FROM_EMAIL") {
            self.from_email = from;
        }
        if let Some(key) = non_empty("CRON_API_KEY") {
            self.cron_api_key = Some(key);
        }
        if let Some(key) = non_empty("ADMIN_API_KEY") {
            self.admin_api_key = Some(key);
        }
    }

    /// Identidade de envio usada pelo serviço de lembretes.
    pub fn sender_settings(&self) -> SenderSettings {
        SenderSettings {
            from: self.from_email.clone(),
            reply_to: self.reply_to.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn default_config_values() {
        let config = NudgerConfig::default();
        assert_eq!(config.from_email, "invoices@invoicenudger.com");
        assert_eq!(config.resend_base_url, "https://api.resend.com");
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert!(config.resend_api_key.is_empty());
        assert!(config.cron_api_key.is_none());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            resend_api_key = "re_123"
            cron_api_key = "cron-secret"
            data_file = "/var/lib/nudger/data.json"
        "#;
        let config: NudgerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.resend_api_key, "re_123");
        assert_eq!(config.cron_api_key.as_deref(), Some("cron-secret"));
        assert_eq!(config.data_file, PathBuf::from("/var/lib/nudger/data.json"));
        assert_eq!(config.from_email, "invoices@invoicenudger.com");
        assert!(config.admin_api_key.is_none());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = NudgerConfig {
            resend_api_key: "from-file".into(),
            ..NudgerConfig::default()
        };
        let env: HashMap<&str, &str> = HashMap::from([
            ("RESEND_API_KEY", "re_env"),
            ("CRON_API_KEY", "cron-env"),
            ("ADMIN_API_KEY", ""),
        ]);
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.resend_api_key, "re_env");
        assert_eq!(config.cron_api_key.as_deref(), Some("cron-env"));
        // Empty values are ignored.
        assert!(config.admin_api_key.is_none());
        assert_eq!(config.from_email, "invoices@invoicenudger.com");
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let result = NudgerConfig::load(Some(Path::new("/definitely/not/here/nudger.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nudger.toml");
        std::fs::write(&path, "from_email = \"billing@studio.test\"\nbind_addr = \"127.0.0.1:9000\"\n").unwrap();
        let config = NudgerConfig::load_with(Some(&path), |_| None).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.sender_settings().from, "billing@studio.test");

        let overridden = NudgerConfig::load_with(Some(&path), |name| {
            (name == "DEFAULT_FROM_EMAIL").then(|| "env@studio.test".to_string())
        })
        .unwrap();
        assert_eq!(overridden.sender_settings().from, "env@studio.test");
        assert_eq!(overridden.bind_addr, "127.0.0.1:9000");
    }
}
