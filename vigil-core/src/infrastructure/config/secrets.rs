// vigil-core/src/infrastructure/config/secrets.rs

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, instrument};

use crate::domain::lender::LenderVault;
use crate::infrastructure::error::InfrastructureError;

/// Where alerts go once a deliverer picks the payload up. The core never
/// speaks SMTP; this block is parsed here so one secrets file carries the
/// whole runtime identity of a deployment.
#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub sender_email: String,
    pub recipients: Vec<String>,
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecretsFile {
    pub lenders: LenderVault,

    #[serde(default)]
    pub email: Option<EmailConfig>,
}

#[instrument(skip(project_dir))]
pub fn load_secrets(project_dir: &Path) -> Result<SecretsFile, InfrastructureError> {
    let path = project_dir.join("secrets.toml");
    if !path.exists() {
        return Err(InfrastructureError::ConfigNotFound(format!(
            "No secrets.toml found in {:?}",
            project_dir
        )));
    }

    let content = fs::read_to_string(&path)?;
    let secrets: SecretsFile = toml::from_str(&content)?;

    if secrets.lenders.is_empty() {
        return Err(InfrastructureError::ConfigError(
            "secrets.toml contains no [lenders.<id>] section".into(),
        ));
    }

    info!(lenders = secrets.lenders.len(), "Secrets loaded");
    Ok(secrets)
}
