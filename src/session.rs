//! Logged-in identity and its persistence.
//!
//! The identity is stored as JSON under a single key of a small key/value
//! table, so it survives restarts until the user logs out.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::forms::{LoginForm, ValidationErrors};

const SESSION_KEY: &str = "dashboard-user";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
  key   TEXT PRIMARY KEY,
  value TEXT NOT NULL
);
";

/// The logged-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub id: String,
  pub email: String,
  pub name: String,
}

impl Identity {
  /// Mock sign-in: any address is accepted, the display name is its local part
  pub fn from_email(email: &str) -> Self {
    let local = email.split('@').next().unwrap_or_default();
    let mut chars = local.chars();
    let name = match chars.next() {
      Some(first) => first.to_uppercase().chain(chars).collect(),
      None => String::new(),
    };
    Self {
      id: "1".to_string(),
      email: email.to_string(),
      name,
    }
  }

  /// Numeric form of the id, used as the author of new posts
  pub fn user_id(&self) -> u64 {
    self.id.parse().unwrap_or(1)
  }
}

/// Key/value table in a local SQLite file
pub struct SessionStore {
  conn: Connection,
}

impl SessionStore {
  pub fn open(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create session directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open session store at {}: {}", path.display(), e))?;
    Self::with_connection(conn)
  }

  #[cfg(test)]
  pub fn in_memory() -> Result<Self> {
    Self::with_connection(Connection::open_in_memory()?)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(SCHEMA)
      .map_err(|e| eyre!("Failed to run migrations: {}", e))?;
    Ok(Self { conn })
  }

  pub fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(
      self
        .conn
        .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
        .optional()?,
    )
  }

  pub fn set(&self, key: &str, value: &str) -> Result<()> {
    self.conn.execute(
      "INSERT INTO kv (key, value) VALUES (?1, ?2)
       ON CONFLICT(key) DO UPDATE SET value = excluded.value",
      params![key, value],
    )?;
    Ok(())
  }

  pub fn remove(&self, key: &str) -> Result<()> {
    self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
    Ok(())
  }
}

/// Session context, created once at startup and handed to the app
pub struct Session {
  store: SessionStore,
  identity: Option<Identity>,
}

impl Session {
  /// Restore the persisted identity. A value that does not parse is removed
  /// and the session starts logged out.
  pub fn init(store: SessionStore) -> Result<Self> {
    let identity = match store.get(SESSION_KEY)? {
      Some(raw) => match serde_json::from_str::<Identity>(&raw) {
        Ok(identity) => Some(identity),
        Err(e) => {
          warn!(error = %e, "discarding unreadable saved session");
          store.remove(SESSION_KEY)?;
          None
        }
      },
      None => None,
    };
    Ok(Self { store, identity })
  }

  pub fn identity(&self) -> Option<&Identity> {
    self.identity.as_ref()
  }

  pub fn is_logged_in(&self) -> bool {
    self.identity.is_some()
  }

  /// Validates the form, then signs in and persists the identity
  pub fn login(&mut self, form: &LoginForm) -> Result<std::result::Result<Identity, ValidationErrors>> {
    if let Err(errors) = form.validate() {
      return Ok(Err(errors));
    }
    let identity = Identity::from_email(&form.email);
    self.store.set(SESSION_KEY, &serde_json::to_string(&identity)?)?;
    info!(email = %identity.email, "logged in");
    self.identity = Some(identity.clone());
    Ok(Ok(identity))
  }

  pub fn logout(&mut self) -> Result<()> {
    self.identity = None;
    self.store.remove(SESSION_KEY)?;
    info!("logged out");
    Ok(())
  }
}
