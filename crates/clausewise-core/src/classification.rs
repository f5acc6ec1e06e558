//! Contract classification taxonomy.
//!
//! The reasoning service is asked for one of a closed set of labels. Its reply
//! is free text, so the stored value is either one of those labels or the
//! exact string it sent instead.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Label the schema offers for contracts outside the known set.
///
/// It is a request for manual review, not a contract type: it classifies
/// as [`Classification::Unrecognized`].
pub const OTHER_LABEL: &str = "OTHER";

/// The closed set of contract types the analysis can recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractType {
    ServiceAgreement,
    Nda,
    EmploymentContract,
    LicenseAgreement,
    PurchaseOrder,
}

impl ContractType {
    pub const ALL: [ContractType; 5] = [
        Self::ServiceAgreement,
        Self::Nda,
        Self::EmploymentContract,
        Self::LicenseAgreement,
        Self::PurchaseOrder,
    ];

    /// The wire label, as it appears in the schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServiceAgreement => "SERVICE_AGREEMENT",
            Self::Nda => "NDA",
            Self::EmploymentContract => "EMPLOYMENT_CONTRACT",
            Self::LicenseAgreement => "LICENSE_AGREEMENT",
            Self::PurchaseOrder => "PURCHASE_ORDER",
        }
    }

    /// Exact, case-sensitive match against the wire labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == label)
    }

    /// Badge text: the wire label with underscores as spaces.
    pub fn display_label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ContractType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The classification carried by a contract record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Classification {
    Known(ContractType),
    /// Anything that is not an exact known label, `OTHER` included.
    /// Keeps the original string for display and diagnostics.
    Unrecognized(String),
}

impl Classification {
    pub fn from_label(label: &str) -> Self {
        match ContractType::from_label(label) {
            Some(t) => Self::Known(t),
            None => Self::Unrecognized(label.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(t) => t.as_str(),
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn contract_type(&self) -> Option<ContractType> {
        match self {
            Self::Known(t) => Some(*t),
            Self::Unrecognized(_) => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl From<ContractType> for Classification {
    fn from(t: ContractType) -> Self {
        Self::Known(t)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Classification {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}
