//! Attribute filters for account searches.

use crate::Account;
use serde::{Deserialize, Serialize};

/// Filter condition for [`AccountTree::descendants`](crate::AccountTree::descendants).
///
/// Each non-empty field must match exactly; empty fields do not constrain the
/// search. An empty filter therefore matches every account.
///
/// An empty field always means "any", so accounts whose name is the empty
/// string cannot be selected by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountFilter {
    /// Exact account ID.
    pub id: String,
    /// Exact account name.
    pub name: String,
    /// Exact account type.
    #[serde(rename = "type")]
    pub account_type: String,
}

impl AccountFilter {
    /// A filter matching every account.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the account with this ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Restrict to accounts with this name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Restrict to accounts of this type.
    #[must_use]
    pub fn with_type(mut self, account_type: impl Into<String>) -> Self {
        self.account_type = account_type.into();
        self
    }

    /// Whether no field constrains the search.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.name.is_empty() && self.account_type.is_empty()
    }

    /// Whether `account` satisfies every non-empty field.
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        field_matches(&self.id, &account.id)
            && field_matches(&self.name, &account.name)
            && field_matches(&self.account_type, &account.account_type)
    }
}

fn field_matches(wanted: &str, actual: &str) -> bool {
    wanted.is_empty() || wanted == actual
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeId;

    fn bank(id: &str, name: &str) -> Account {
        Account::new(NodeId(1), Some(NodeId(0)), id, name, "BANK")
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = AccountFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&bank("1", "Checking")));
        assert!(filter.matches(&bank("2", "")));
    }

    #[test]
    fn test_fields_are_anded() {
        let account = bank("1", "Checking");

        assert!(AccountFilter::new().with_id("1").matches(&account));
        assert!(AccountFilter::new()
            .with_id("1")
            .with_type("BANK")
            .matches(&account));
        assert!(!AccountFilter::new()
            .with_id("1")
            .with_type("EXPENSE")
            .matches(&account));
        assert!(!AccountFilter::new()
            .with_name("Savings")
            .with_type("BANK")
            .matches(&account));
    }

    #[test]
    fn test_deserialize_partial_filter() {
        let filter: AccountFilter = serde_json::from_str(r#"{"type": "BANK"}"#).unwrap();
        assert_eq!(filter, AccountFilter::new().with_type("BANK"));
    }
}
