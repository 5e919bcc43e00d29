//! Client configuration

use crate::envelope::operations::VerifyMode;
use crate::error::{BaofuError, Result};
use crate::keys::KeyMaterial;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Merchant identity and key file locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub merchant_id: String,
    pub terminal_id: String,
    /// Production gateway when true, test gateway otherwise.
    #[serde(default)]
    pub release_env: bool,
    #[serde(default)]
    pub debug: bool,
    /// Merchant private key, PKCS#1 or PKCS#8 PEM.
    pub private_key_path: PathBuf,
    /// Gateway certificate or public key PEM.
    pub gateway_cert_path: PathBuf,
    #[serde(default)]
    pub verify_mode: VerifyMode,
}

impl ClientConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BaofuError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| BaofuError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<()> {
        if self.merchant_id.trim().is_empty() {
            return Err(BaofuError::InvalidConfig("merchantId is empty".into()));
        }
        if self.terminal_id.trim().is_empty() {
            return Err(BaofuError::InvalidConfig("terminalId is empty".into()));
        }
        Ok(())
    }

    /// Read both key files.
    pub fn load_key_material(&self) -> Result<KeyMaterial> {
        tracing::debug!(
            merchant_id = %self.merchant_id,
            private_key = %self.private_key_path.display(),
            gateway_cert = %self.gateway_cert_path.display(),
            "loading key material"
        );
        KeyMaterial::from_files(
            Some(self.private_key_path.as_path()),
            Some(self.gateway_cert_path.as_path()),
        )
    }
}
