//! Chain configuration with sensible defaults.
//!
//! All network parameters the wallet core depends on are centralized
//! here. Every value has a documented default matching the Halcyon
//! main network.

use serde::{Deserialize, Serialize};

use crate::{HalcyonError, Result};

/// Network parameters for a Halcyon-compatible chain.
///
/// Defaults describe the Halcyon main network. Other deployments
/// (testnets, forks) supply their own values; [`validate`](Self::validate)
/// should be called on any externally sourced configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain identifier the connected node must report, e.g. `halcyon-1`.
    pub chain_id: String,

    /// Bech32 human-readable prefix for account addresses, e.g. `hal`.
    pub bech32_prefix: String,

    /// Base denomination used on the wire and in balances, e.g. `uhal`.
    pub base_denom: String,

    /// Display denomination shown to users, e.g. `HAL`.
    pub display_denom: String,

    /// Decimal places between the display and base denominations.
    /// One display unit equals `10^decimals` base units.
    pub decimals: u8,

    /// Gas limit requested for a token transfer.
    pub gas_limit: u64,

    /// Gas price in base units per gas unit. The transfer fee is
    /// `gas_limit * gas_price` rounded to the nearest base unit.
    pub gas_price: f64,

    /// BIP-44 derivation path for the account key, Cosmos coin type 118.
    pub derivation_path: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: "halcyon-1".to_owned(),
            bech32_prefix: "hal".to_owned(),
            base_denom: "uhal".to_owned(),
            display_denom: "HAL".to_owned(),
            decimals: 6,
            gas_limit: 100_000,
            gas_price: 0.025,
            derivation_path: "m/44'/118'/0'/0/0".to_owned(),
        }
    }
}

impl ChainConfig {
    /// Validates all configuration values.
    ///
    /// Returns an error if any value is outside its acceptable range.
    pub fn validate(&self) -> Result<()> {
        if self.chain_id.trim().is_empty() {
            return Err(HalcyonError::ConfigError {
                reason: "chain_id must not be empty".into(),
            });
        }

        if self.bech32_prefix.is_empty() {
            return Err(HalcyonError::ConfigError {
                reason: "bech32_prefix must not be empty".into(),
            });
        }

        if !self
            .bech32_prefix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(HalcyonError::ConfigError {
                reason: "bech32_prefix must be lowercase ASCII letters or digits".into(),
            });
        }

        if self.base_denom.trim().is_empty() {
            return Err(HalcyonError::ConfigError {
                reason: "base_denom must not be empty".into(),
            });
        }

        if self.display_denom.trim().is_empty() {
            return Err(HalcyonError::ConfigError {
                reason: "display_denom must not be empty".into(),
            });
        }

        if self.decimals > 18 {
            return Err(HalcyonError::ConfigError {
                reason: "decimals must be 0..=18".into(),
            });
        }

        if self.gas_limit == 0 {
            return Err(HalcyonError::ConfigError {
                reason: "gas_limit must be greater than 0".into(),
            });
        }

        if !self.gas_price.is_finite() || self.gas_price < 0.0 {
            return Err(HalcyonError::ConfigError {
                reason: "gas_price must be a finite non-negative number".into(),
            });
        }

        if !self.derivation_path.starts_with("m/") {
            return Err(HalcyonError::ConfigError {
                reason: "derivation_path must start with 'm/'".into(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ChainConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_values_match_mainnet() {
        let config = ChainConfig::default();
        assert_eq!(config.chain_id, "halcyon-1");
        assert_eq!(config.bech32_prefix, "hal");
        assert_eq!(config.base_denom, "uhal");
        assert_eq!(config.display_denom, "HAL");
        assert_eq!(config.decimals, 6);
        assert_eq!(config.gas_limit, 100_000);
        assert_eq!(config.gas_price, 0.025);
        assert_eq!(config.derivation_path, "m/44'/118'/0'/0/0");
    }

    #[test]
    fn empty_chain_id_rejected() {
        let config = ChainConfig {
            chain_id: "  ".to_owned(),
            ..ChainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_prefix_rejected() {
        let config = ChainConfig {
            bech32_prefix: String::new(),
            ..ChainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn uppercase_prefix_rejected() {
        let config = ChainConfig {
            bech32_prefix: "HAL".to_owned(),
            ..ChainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_base_denom_rejected() {
        let config = ChainConfig {
            base_denom: String::new(),
            ..ChainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn excessive_decimals_rejected() {
        let config = ChainConfig {
            decimals: 19,
            ..ChainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_gas_limit_rejected() {
        let config = ChainConfig {
            gas_limit: 0,
            ..ChainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_gas_price_rejected() {
        let config = ChainConfig {
            gas_price: -0.01,
            ..ChainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_finite_gas_price_rejected() {
        let config = ChainConfig {
            gas_price: f64::NAN,
            ..ChainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_gas_price_is_valid() {
        let config = ChainConfig {
            gas_price: 0.0,
            ..ChainConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn relative_derivation_path_rejected() {
        let config = ChainConfig {
            derivation_path: "44'/118'/0'/0/0".to_owned(),
            ..ChainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_serde_roundtrip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let config = ChainConfig::default();
        let json = serde_json::to_string(&config)?;
        let parsed: ChainConfig = serde_json::from_str(&json)?;
        assert_eq!(config, parsed);
        Ok(())
    }
}
