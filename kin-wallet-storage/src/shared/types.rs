use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

// Basic types for storage operations
pub type Quarks = i64;
pub type SequenceNumber = u64;
pub type SecretBytes = Zeroizing<Vec<u8>>;

/// Network environment the storage is namespaced by
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
    Custom(String),
}

impl Network {
    /// Network id used to namespace storage on disk
    pub fn id(&self) -> &str {
        match self {
            Network::Mainnet => "Kin Mainnet ; December 2018",
            Network::Testnet => "Kin Testnet ; December 2018",
            Network::Custom(id) => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Network::Mainnet => "Kin Mainnet",
            Network::Testnet => "Kin Testnet",
            Network::Custom(id) => id,
        }
    }

    /// Parse the short names accepted in configuration; anything else is a custom id
    pub fn from_config_value(value: &str) -> Self {
        match value.trim() {
            "mainnet" | "main" => Network::Mainnet,
            "testnet" | "test" => Network::Testnet,
            other => Network::Custom(other.to_string()),
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Testnet
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_ids() {
        assert_eq!(Network::Mainnet.id(), "Kin Mainnet ; December 2018");
        assert_eq!(Network::Testnet.id(), "Kin Testnet ; December 2018");
        assert_eq!(Network::Custom("local".to_string()).id(), "local");
    }

    #[test]
    fn test_network_from_config_value() {
        assert_eq!(Network::from_config_value("mainnet"), Network::Mainnet);
        assert_eq!(Network::from_config_value(" testnet "), Network::Testnet);
        assert_eq!(
            Network::from_config_value("Private Net ; 2024"),
            Network::Custom("Private Net ; 2024".to_string())
        );
    }
}
