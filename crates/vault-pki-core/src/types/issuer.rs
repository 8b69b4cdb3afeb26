use serde::{Deserialize, Serialize};

/// An issuer as returned by the backend, before decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuerEntry {
    /// Backend identifier of the issuer
    pub issuer_ref: String,

    /// Operator-assigned issuer name, if any
    pub issuer_name: Option<String>,

    /// PEM encoded issuer certificate
    pub certificate: Option<String>,

    /// PEM encoded chain, issuer first and root last
    pub ca_chain: Vec<String>,
}

/// One certificate identity in an issuer's chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainEntry {
    /// Subject CN of the chain certificate
    pub common_name: String,

    /// Serial of the chain certificate, when it could be decoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

/// One certificate authority, resolved within a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerRecord {
    /// Backend identifier of the issuer
    pub issuer_ref: String,

    /// Subject CN of the issuer certificate
    pub common_name: String,

    /// Nearest issuer first, root last. Empty for inactive issuers.
    pub chain_to_root: Vec<ChainEntry>,

    /// False when the backend no longer holds the issuer
    pub is_active: bool,
}

impl IssuerRecord {
    /// The issuer is a root CA when its chain holds only itself
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.chain_to_root.len() == 1
    }

    /// The terminal entry of the chain
    #[must_use]
    pub fn root(&self) -> Option<&ChainEntry> {
        self.chain_to_root.last()
    }
}
