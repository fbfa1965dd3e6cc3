//! Account book — the `accounts.json` document beside the ledger.
//!
//! A small read-modify-write store: the whole document is loaded into
//! memory, mutated, and written back pretty-printed. The open flow consumes
//! an account's name and balance; templates pre-fill open-time parameters.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{Account, AccountConfig, AccountTemplate};

pub const ACCOUNTS_FILE: &str = "accounts.json";

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("account not found: {name}")]
    NotFound { name: String },

    #[error("account already exists: {name}")]
    AlreadyExists { name: String },

    #[error("account config I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse accounts config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// In-memory view of `accounts.json`, saved after every mutation.
#[derive(Debug, Clone)]
pub struct AccountBook {
    path: PathBuf,
    config: AccountConfig,
}

impl AccountBook {
    /// Load the account book from `data_dir`. A missing file yields an empty
    /// book; it is created on the first mutation.
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self, AccountError> {
        let path = data_dir.as_ref().join(ACCOUNTS_FILE);

        let config = if path.exists() {
            let data = fs::read_to_string(&path)?;
            serde_json::from_str(&data)?
        } else {
            AccountConfig::default()
        };

        Ok(Self { path, config })
    }

    fn save(&self) -> Result<(), AccountError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.config)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn accounts(&self) -> &[Account] {
        &self.config.accounts
    }

    pub fn get(&self, name: &str) -> Result<&Account, AccountError> {
        self.config
            .accounts
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| AccountError::NotFound {
                name: name.to_string(),
            })
    }

    /// Add a new account. Duplicate names are rejected.
    pub fn add(&mut self, account: Account) -> Result<(), AccountError> {
        if self.config.accounts.iter().any(|a| a.name == account.name) {
            return Err(AccountError::AlreadyExists { name: account.name });
        }
        self.config.accounts.push(account);
        self.save()
    }

    pub fn set_balance(&mut self, name: &str, balance: f64) -> Result<(), AccountError> {
        let account = self
            .config
            .accounts
            .iter_mut()
            .find(|a| a.name == name)
            .ok_or_else(|| AccountError::NotFound {
                name: name.to_string(),
            })?;
        account.balance = balance;
        self.save()
    }

    pub fn set_template(
        &mut self,
        name: &str,
        template: Option<AccountTemplate>,
    ) -> Result<(), AccountError> {
        let account = self
            .config
            .accounts
            .iter_mut()
            .find(|a| a.name == name)
            .ok_or_else(|| AccountError::NotFound {
                name: name.to_string(),
            })?;
        account.template = template;
        self.save()
    }

    pub fn remove(&mut self, name: &str) -> Result<(), AccountError> {
        let before = self.config.accounts.len();
        self.config.accounts.retain(|a| a.name != name);
        if self.config.accounts.len() == before {
            return Err(AccountError::NotFound {
                name: name.to_string(),
            });
        }
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str, balance: f64) -> Account {
        Account {
            name: name.to_string(),
            balance,
            currency: String::new(),
            template: None,
        }
    }

    #[test]
    fn add_get_update_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = AccountBook::load(dir.path()).unwrap();
        assert!(book.accounts().is_empty());

        book.add(account("main", 10_000.0)).unwrap();
        book.add(account("swing", 2_500.0)).unwrap();
        assert_eq!(book.get("main").unwrap().balance, 10_000.0);

        book.set_balance("main", 12_000.0).unwrap();

        // Reload from disk and confirm persistence.
        let mut book = AccountBook::load(dir.path()).unwrap();
        assert_eq!(book.accounts().len(), 2);
        assert_eq!(book.get("main").unwrap().balance, 12_000.0);

        book.remove("swing").unwrap();
        let book = AccountBook::load(dir.path()).unwrap();
        assert_eq!(book.accounts().len(), 1);
    }

    #[test]
    fn duplicate_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = AccountBook::load(dir.path()).unwrap();
        book.add(account("main", 1.0)).unwrap();
        assert!(matches!(
            book.add(account("main", 2.0)),
            Err(AccountError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn template_set_and_clear_persist() {
        use crate::domain::{Direction, MarketType};

        let dir = tempfile::tempdir().unwrap();
        let mut book = AccountBook::load(dir.path()).unwrap();
        book.add(account("main", 10_000.0)).unwrap();

        book.set_template(
            "main",
            Some(AccountTemplate {
                default_market_type: Some(MarketType::Crypto),
                default_symbol: Some("BTC/USDT".to_string()),
                default_direction: Some(Direction::Long),
            }),
        )
        .unwrap();

        // Reload from disk and confirm the template survived.
        let mut book = AccountBook::load(dir.path()).unwrap();
        let template = book.get("main").unwrap().template.clone().unwrap();
        assert_eq!(template.default_symbol.as_deref(), Some("BTC/USDT"));
        assert_eq!(template.default_market_type, Some(MarketType::Crypto));
        assert_eq!(template.default_direction, Some(Direction::Long));

        book.set_template("main", None).unwrap();
        let book = AccountBook::load(dir.path()).unwrap();
        assert!(book.get("main").unwrap().template.is_none());
    }

    #[test]
    fn unknown_account_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = AccountBook::load(dir.path()).unwrap();
        assert!(matches!(
            book.get("nope"),
            Err(AccountError::NotFound { .. })
        ));
        assert!(matches!(
            book.set_balance("nope", 1.0),
            Err(AccountError::NotFound { .. })
        ));
        assert!(matches!(
            book.set_template("nope", None),
            Err(AccountError::NotFound { .. })
        ));
        assert!(matches!(
            book.remove("nope"),
            Err(AccountError::NotFound { .. })
        ));
    }
}
