//! Registry of started accounts and their prefixes.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::{PreferenceStore, PrefixSet, StoreError};

/// Identity of one authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for AccountId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Public details of a started account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountProfile {
    /// Account identity.
    pub id: AccountId,

    /// Username without the leading `@`, if the account has one.
    pub username: Option<String>,

    /// Display name used in logs.
    pub first_name: String,
}

impl AccountProfile {
    /// Creates a profile, normalizing the username.
    #[must_use]
    pub fn new(id: AccountId, username: Option<String>, first_name: impl Into<String>) -> Self {
        let username = username
            .map(|u| u.trim().trim_start_matches('@').to_owned())
            .filter(|u| !u.is_empty());

        Self {
            id,
            username,
            first_name: first_name.into(),
        }
    }

    /// Returns the username, or an empty string when unset.
    #[must_use]
    pub fn username_or_empty(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    prefixes: HashMap<AccountId, PrefixSet>,
    accounts: Vec<AccountProfile>,
}

/// Process-wide account state, keyed by [`AccountId`].
///
/// Readers (the command filter) and the single writer per account (its own
/// startup and `setprefix` flow) share one lock.
#[derive(Debug, Default)]
pub struct AccountRegistry {
    inner: RwLock<RegistryInner>,
}

impl AccountRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a started account and seeds its prefixes from `store`.
    ///
    /// Falls back to the default prefix when nothing usable is stored.
    /// Starting an account twice refreshes its profile in place.
    pub async fn start_account(
        &self,
        profile: AccountProfile,
        store: &dyn PreferenceStore,
    ) -> Result<PrefixSet, StoreError> {
        let prefixes = match store.get_prefixes(profile.id)? {
            Some(stored) => PrefixSet::new(stored).unwrap_or_else(|e| {
                warn!("Ignoring stored prefixes for account {}: {}", profile.id, e);
                PrefixSet::default()
            }),
            None => PrefixSet::default(),
        };

        let mut inner = self.inner.write().await;
        inner.prefixes.insert(profile.id, prefixes.clone());

        info!(
            "Starting account ({}|{}) with prefixes: {}",
            profile.id, profile.first_name, prefixes
        );

        if let Some(pos) = inner.accounts.iter().position(|a| a.id == profile.id) {
            inner.accounts[pos] = profile;
        } else {
            inner.accounts.push(profile);
        }

        Ok(prefixes)
    }

    /// Returns the prefixes for an account, or the default set if it has none.
    pub async fn prefixes(&self, account: AccountId) -> PrefixSet {
        self.inner
            .read()
            .await
            .prefixes
            .get(&account)
            .cloned()
            .unwrap_or_default()
    }

    /// Replaces the prefixes for an account. Visible to the next lookup.
    pub async fn set_prefixes(&self, account: AccountId, prefixes: PrefixSet) {
        info!("Prefixes for account {} set to: {}", account, prefixes);
        self.inner.write().await.prefixes.insert(account, prefixes);
    }

    /// Saves the prefixes to `store`, then applies them.
    ///
    /// The registry is left untouched if saving fails. The two writes are not
    /// atomic together: callers must keep to one writer per account.
    pub async fn set_prefixes_persisted(
        &self,
        account: AccountId,
        prefixes: PrefixSet,
        store: &dyn PreferenceStore,
    ) -> Result<(), StoreError> {
        store.set_prefixes(account, &prefixes)?;
        self.set_prefixes(account, prefixes).await;
        Ok(())
    }

    /// Returns the profile of a started account.
    pub async fn profile(&self, account: AccountId) -> Option<AccountProfile> {
        self.inner
            .read()
            .await
            .accounts
            .iter()
            .find(|a| a.id == account)
            .cloned()
    }

    /// Returns all started accounts in start order.
    pub async fn accounts(&self) -> Vec<AccountProfile> {
        self.inner.read().await.accounts.clone()
    }

    /// Checks whether an account has been started.
    pub async fn is_started(&self, account: AccountId) -> bool {
        self.inner
            .read()
            .await
            .accounts
            .iter()
            .any(|a| a.id == account)
    }
}
