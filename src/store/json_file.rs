// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Single-file user repository.
//!
//! All records live in one JSON document. Readers take a shared `fs2` lock
//! on a sidecar `<file>.lock`; writers take an exclusive one and replace the
//! document through a temp file and rename, so a crash mid-write leaves the
//! previous version intact.

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{foreign_token, token_conflict};
use crate::vault_core::constants::store;
use crate::vault_core::errors::VaultError;
use crate::vault_core::models::{CardId, Token, User};
use crate::vault_core::traits::{TokenClaim, UserRepository};

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserDatabase {
    #[serde(default)]
    users: Vec<User>,
}

impl UserDatabase {
    /// Replace or append the record for `user.username`, rejecting foreign tokens.
    fn store(&mut self, user: &User) -> Result<User, VaultError> {
        if let Some(token) = foreign_token(self.users.iter(), user) {
            return Err(token_conflict(&user.username, &token));
        }
        let mut record = user.clone();
        record.updated_at = Some(crate::utils::time::now());
        match self.users.iter_mut().find(|u| u.username == record.username) {
            Some(existing) => *existing = record.clone(),
            None => self.users.push(record.clone()),
        }
        Ok(record)
    }
}

enum LockMode {
    Shared,
    Exclusive,
}

#[derive(Debug, Clone)]
pub struct JsonFileUserRepository {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileUserRepository {
    /// Open the store at `path`. A missing file reads as an empty store and
    /// is created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = sibling(&path, store::LOCK_SUFFIX);
        Self { path, lock_path }
    }

    /// Open the store and write `users` into it, replacing any existing content.
    pub fn create(path: impl Into<PathBuf>, users: Vec<User>) -> Result<Self, VaultError> {
        let repo = Self::open(path);
        repo.with_lock(LockMode::Exclusive, || {
            repo.write_database(&UserDatabase { users })
        })?;
        info!(path = %repo.path.display(), "Created user database");
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_lock<T>(
        &self,
        mode: LockMode,
        f: impl FnOnce() -> Result<T, VaultError>,
    ) -> Result<T, VaultError> {
        if let Some(parent) = self.lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        let locked = match mode {
            LockMode::Shared => FileExt::lock_shared(&lock_file),
            LockMode::Exclusive => FileExt::lock_exclusive(&lock_file),
        };
        locked.map_err(|e| VaultError::Storage(format!("cannot lock user database: {}", e)))?;

        let result = f();
        if let Err(e) = FileExt::unlock(&lock_file) {
            debug!(error = %e, "Failed to release user database lock");
        }
        result
    }

    fn read_database(&self) -> Result<UserDatabase, VaultError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(UserDatabase::default())
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(UserDatabase::default());
        }
        serde_json::from_str(&content).map_err(|e| {
            VaultError::Storage(format!(
                "corrupt user database {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_database(&self, db: &UserDatabase) -> Result<(), VaultError> {
        let tmp_path = sibling(&self.path, store::TEMP_SUFFIX);
        let payload = serde_json::to_vec_pretty(db)?;
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&payload)?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        debug!(path = %self.path.display(), users = db.users.len(), "Wrote user database");
        Ok(())
    }
}

/// `users.json` -> `users.json.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

impl UserRepository for JsonFileUserRepository {
    fn fetch_by_username(&self, username: &str) -> Result<User, VaultError> {
        self.with_lock(LockMode::Shared, || {
            self.read_database()?
                .users
                .into_iter()
                .find(|u| u.username == username)
                .ok_or_else(|| VaultError::IncorrectUserName(username.to_string()))
        })
    }

    fn list_all(&self) -> Result<Vec<User>, VaultError> {
        self.with_lock(LockMode::Shared, || Ok(self.read_database()?.users))
    }

    fn upsert(&self, user: &User) -> Result<(), VaultError> {
        self.with_lock(LockMode::Exclusive, || {
            let mut db = self.read_database()?;
            db.store(user)?;
            self.write_database(&db)
        })
    }

    fn merge_user(&self, user: &User) -> Result<User, VaultError> {
        self.with_lock(LockMode::Exclusive, || {
            let mut db = self.read_database()?;
            let mut record = db
                .users
                .iter()
                .find(|u| u.username == user.username)
                .cloned()
                .unwrap_or_else(|| user.clone());
            record.merge_tokens(user);
            let stored = db.store(&record)?;
            self.write_database(&db)?;
            Ok(stored)
        })
    }

    fn token_owner(&self, token: &Token) -> Result<Option<String>, VaultError> {
        self.with_lock(LockMode::Shared, || {
            Ok(self
                .read_database()?
                .users
                .into_iter()
                .find(|u| u.contains_token(token))
                .map(|u| u.username))
        })
    }

    fn register_token(
        &self,
        username: &str,
        token: &Token,
        card: &CardId,
    ) -> Result<TokenClaim, VaultError> {
        self.with_lock(LockMode::Exclusive, || {
            let mut db = self.read_database()?;
            if db.users.iter().any(|u| u.contains_token(token)) {
                return Ok(TokenClaim::Taken);
            }
            let user = db
                .users
                .iter_mut()
                .find(|u| u.username == username)
                .ok_or_else(|| VaultError::IncorrectUserName(username.to_string()))?;
            user.add_tuple(token.clone(), card.clone());
            user.updated_at = Some(crate::utils::time::now());
            self.write_database(&db)?;
            Ok(TokenClaim::Registered)
        })
    }
}
