//! [`UserDirectory`]: registered accounts and the current session.

use crate::{
  Error, Result,
  account::{Account, AccountRecord, ProfileUpdate},
  id::AccountId,
  storage::{KeyValueStore, Persistent, keys},
};

/// The accounts written on first run: one administrator and one member.
pub fn seed_accounts() -> Vec<AccountRecord> {
  vec![
    AccountRecord {
      id:        "admin-1".into(),
      name:      "Admin User".into(),
      email:     "admin@school.edu".into(),
      password:  "admin123".into(),
      is_admin:  true,
      interests: Vec::new(),
    },
    AccountRecord {
      id:        "user-1".into(),
      name:      "John Student".into(),
      email:     "john@school.edu".into(),
      password:  "password123".into(),
      is_admin:  false,
      interests: vec!["Sports".into(), "Music".into()],
    },
  ]
}

/// Owns the account collection and the session.
///
/// Every mutation writes the full document before the in-memory copy changes,
/// so a failed write leaves the directory as it was.
pub struct UserDirectory<K> {
  storage:  Persistent<K>,
  accounts: Vec<AccountRecord>,
  session:  Option<Account>,
}

impl<K: KeyValueStore> UserDirectory<K> {
  /// Load the directory and any saved session, seeding on first run.
  pub fn open(storage: Persistent<K>) -> Result<Self> {
    let accounts = match storage.load::<Vec<AccountRecord>>(keys::ACCOUNTS)? {
      Some(accounts) if !accounts.is_empty() => accounts,
      _ => {
        let seeded = seed_accounts();
        storage.save(keys::ACCOUNTS, &seeded)?;
        tracing::info!(count = seeded.len(), "seeded account directory");
        seeded
      }
    };
    let session = storage.load::<Account>(keys::SESSION)?;
    if let Some(account) = &session {
      tracing::info!(user = %account.id, "restored session");
    }
    Ok(Self { storage, accounts, session })
  }

  // ── Session ─────────────────────────────────────────────────────────────

  /// The currently authenticated account, if any.
  pub fn current(&self) -> Option<&Account> { self.session.as_ref() }

  /// Authenticate a member (non-administrator).
  pub fn login(&mut self, email: &str, password: &str) -> Result<Account> {
    self.authenticate(email, password, false)
  }

  /// Authenticate an administrator.
  pub fn admin_login(&mut self, email: &str, password: &str) -> Result<Account> {
    self.authenticate(email, password, true)
  }

  fn authenticate(&mut self, email: &str, password: &str, admin: bool) -> Result<Account> {
    let account = self
      .accounts
      .iter()
      .find(|a| a.matches_credentials(email, password) && a.is_admin == admin)
      .map(AccountRecord::projection)
      .ok_or(Error::InvalidCredentials)?;
    self.start_session(account.clone())?;
    tracing::info!(user = %account.id, admin, "logged in");
    Ok(account)
  }

  /// Create a member account and sign it in.
  pub fn register(&mut self, name: &str, email: &str, password: &str) -> Result<Account> {
    if self.accounts.iter().any(|a| a.email == email) {
      return Err(Error::EmailAlreadyRegistered(email.to_owned()));
    }

    let record = AccountRecord {
      id:        AccountId::generate(),
      name:      name.to_owned(),
      email:     email.to_owned(),
      password:  password.to_owned(),
      is_admin:  false,
      interests: Vec::new(),
    };
    let account = record.projection();

    let mut accounts = self.accounts.clone();
    accounts.push(record);
    self.commit(accounts)?;
    self.start_session(account.clone())?;

    tracing::info!(user = %account.id, "registered account");
    Ok(account)
  }

  /// End the session. The in-memory session is always cleared; a failure to
  /// remove the saved record is logged.
  pub fn logout(&mut self) {
    if let Some(account) = self.session.take() {
      tracing::info!(user = %account.id, "logged out");
    }
    if let Err(e) = self.storage.clear(keys::SESSION) {
      tracing::warn!(error = %e, "failed to clear saved session");
    }
  }

  fn start_session(&mut self, account: Account) -> Result<()> {
    self.storage.save(keys::SESSION, &account)?;
    self.session = Some(account);
    Ok(())
  }

  // ── Accounts ────────────────────────────────────────────────────────────

  pub fn get(&self, id: &AccountId) -> Option<Account> {
    self.accounts.iter().find(|a| &a.id == id).map(AccountRecord::projection)
  }

  /// Every account, administrators included, in registration order.
  pub fn accounts(&self) -> impl Iterator<Item = Account> + '_ {
    self.accounts.iter().map(AccountRecord::projection)
  }

  /// Non-administrator accounts, optionally filtered by a case-insensitive
  /// substring of name or email.
  pub fn members(&self, search: Option<&str>) -> Vec<Account> {
    let needle = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase);
    self
      .accounts
      .iter()
      .filter(|a| !a.is_admin)
      .filter(|a| match &needle {
        Some(n) => a.name.to_lowercase().contains(n) || a.email.to_lowercase().contains(n),
        None => true,
      })
      .map(AccountRecord::projection)
      .collect()
  }

  /// Apply a profile edit and persist it. The session is refreshed when it
  /// belongs to the edited account.
  pub fn update_profile(&mut self, id: &AccountId, update: ProfileUpdate) -> Result<Account> {
    let index = self
      .accounts
      .iter()
      .position(|a| &a.id == id)
      .ok_or_else(|| Error::AccountNotFound(id.clone()))?;

    let mut accounts = self.accounts.clone();
    update.apply(&mut accounts[index]);
    let account = accounts[index].projection();
    self.commit(accounts)?;

    if self.session.as_ref().is_some_and(|s| &s.id == id) {
      self.start_session(account.clone())?;
    }
    Ok(account)
  }

  fn commit(&mut self, accounts: Vec<AccountRecord>) -> Result<()> {
    self.storage.save(keys::ACCOUNTS, &accounts)?;
    self.accounts = accounts;
    Ok(())
  }
}
