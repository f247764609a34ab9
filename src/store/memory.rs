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

//! In-process user repository with a token -> owner index.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use super::{foreign_token, token_conflict};
use crate::vault_core::errors::VaultError;
use crate::vault_core::models::{CardId, Token, User};
use crate::vault_core::traits::{TokenClaim, UserRepository};

#[derive(Default)]
struct State {
    users: BTreeMap<String, User>,
    /// token -> owning username
    token_index: HashMap<Token, String>,
}

impl State {
    fn index_user(&mut self, user: &User) {
        for token in user.tokens() {
            if let Some(prev) = self
                .token_index
                .insert(token.clone(), user.username.clone())
            {
                if prev != user.username {
                    warn!(token = %token, "Duplicate token across users in seed data");
                }
            }
        }
    }

    fn unindex_user(&mut self, username: &str) {
        self.token_index.retain(|_, owner| owner != username);
    }

    /// Replace the record for `user.username`, rejecting foreign tokens.
    fn store(&mut self, user: &User) -> Result<User, VaultError> {
        if let Some(token) = foreign_token(self.users.values(), user) {
            return Err(token_conflict(&user.username, &token));
        }
        let mut record = user.clone();
        record.updated_at = Some(crate::utils::time::now());

        self.unindex_user(&record.username);
        self.index_user(&record);
        self.users.insert(record.username.clone(), record.clone());
        Ok(record)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    state: Mutex<State>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing records. Later records replace earlier ones with
    /// the same username.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut state = State::default();
        for user in users {
            state.unindex_user(&user.username);
            state.index_user(&user);
            state.users.insert(user.username.clone(), user);
        }
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn len(&self) -> Result<usize, VaultError> {
        Ok(self.lock()?.users.len())
    }

    pub fn is_empty(&self) -> Result<bool, VaultError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, VaultError> {
        self.state
            .lock()
            .map_err(|_| VaultError::Storage("user repository lock poisoned".to_string()))
    }
}

impl UserRepository for InMemoryUserRepository {
    fn fetch_by_username(&self, username: &str) -> Result<User, VaultError> {
        self.lock()?
            .users
            .get(username)
            .cloned()
            .ok_or_else(|| VaultError::IncorrectUserName(username.to_string()))
    }

    fn list_all(&self) -> Result<Vec<User>, VaultError> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    fn upsert(&self, user: &User) -> Result<(), VaultError> {
        self.lock()?.store(user).map(|_| ())
    }

    fn merge_user(&self, user: &User) -> Result<User, VaultError> {
        let mut state = self.lock()?;
        let mut record = state
            .users
            .get(&user.username)
            .cloned()
            .unwrap_or_else(|| user.clone());
        record.merge_tokens(user);
        state.store(&record)
    }

    fn token_owner(&self, token: &Token) -> Result<Option<String>, VaultError> {
        Ok(self.lock()?.token_index.get(token).cloned())
    }

    fn register_token(
        &self,
        username: &str,
        token: &Token,
        card: &CardId,
    ) -> Result<TokenClaim, VaultError> {
        let mut state = self.lock()?;
        if state.token_index.contains_key(token) {
            debug!(token = %token, "Token already claimed");
            return Ok(TokenClaim::Taken);
        }
        let user = state
            .users
            .get_mut(username)
            .ok_or_else(|| VaultError::IncorrectUserName(username.to_string()))?;
        user.add_tuple(token.clone(), card.clone());
        user.updated_at = Some(crate::utils::time::now());
        state.token_index.insert(token.clone(), username.to_string());
        Ok(TokenClaim::Registered)
    }
}
