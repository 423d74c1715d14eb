use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// A synchronized pair of source and target ledger accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountMapping {
    pub id: i32,
    pub source_account_id: String,
    pub target_account_id: String,
    pub display_name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating or overwriting the mapping of one source account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccountMapping {
    pub source_account_id: String,
    pub target_account_id: String,
    #[serde(default)]
    pub display_name: String,
}

impl NewAccountMapping {
    pub fn new(
        source_account_id: impl Into<String>,
        target_account_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            source_account_id: source_account_id.into(),
            target_account_id: target_account_id.into(),
            display_name: display_name.into(),
        }
    }

    /// Trims all fields and rejects empty account ids. A blank label falls
    /// back to the source account id.
    pub fn normalized(self) -> Result<Self> {
        let source_account_id = self.source_account_id.trim().to_string();
        let target_account_id = self.target_account_id.trim().to_string();
        if source_account_id.is_empty() {
            return Err(Error::Validation(
                "source account id must not be empty".to_string(),
            ));
        }
        if target_account_id.is_empty() {
            return Err(Error::Validation(format!(
                "target account id must not be empty for source account {}",
                source_account_id
            )));
        }

        let display_name = match self.display_name.trim() {
            "" => source_account_id.clone(),
            name => name.to_string(),
        };

        Ok(Self {
            source_account_id,
            target_account_id,
            display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_trims_and_defaults_label() {
        let mapping = NewAccountMapping::new(" A1 ", " F1", "  ").normalized().unwrap();
        assert_eq!(mapping.source_account_id, "A1");
        assert_eq!(mapping.target_account_id, "F1");
        assert_eq!(mapping.display_name, "A1");
    }

    #[test]
    fn normalized_rejects_missing_ids() {
        assert!(matches!(
            NewAccountMapping::new("", "F1", "Cheque").normalized(),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            NewAccountMapping::new("A1", "   ", "Cheque").normalized(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(NewAccountMapping::new("A1", "F1", "Cheque")).unwrap();
        assert_eq!(json["sourceAccountId"], "A1");
        assert_eq!(json["targetAccountId"], "F1");
        assert_eq!(json["displayName"], "Cheque");
    }
}
