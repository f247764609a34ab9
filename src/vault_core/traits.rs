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

//! Collaborator traits.
//!
//! The session core talks to user storage and to the tokenization algorithm
//! only through these two seams.

use crate::vault_core::errors::VaultError;
use crate::vault_core::models::{CardId, Token, User};

/// Outcome of an attempt to attach a token to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenClaim {
    /// The pair was stored durably.
    Registered,
    /// Some user (possibly the caller) already owns this token.
    Taken,
}

/// Durable store of user records.
pub trait UserRepository: Send + Sync {
    /// Fetch a user by name. Unknown names fail with
    /// [`VaultError::IncorrectUserName`].
    fn fetch_by_username(&self, username: &str) -> Result<User, VaultError>;

    /// Snapshot of every stored user.
    fn list_all(&self) -> Result<Vec<User>, VaultError>;

    /// Insert or replace the record keyed by `user.username`.
    fn upsert(&self, user: &User) -> Result<(), VaultError>;

    /// Name of the user whose token map holds `token`, if any.
    ///
    /// The default performs a fresh scan of every record.
    fn token_owner(&self, token: &Token) -> Result<Option<String>, VaultError> {
        Ok(self
            .list_all()?
            .into_iter()
            .find(|user| user.contains_token(token))
            .map(|user| user.username))
    }

    /// Attach `token -> card` to `username` unless any user already owns `token`.
    ///
    /// The default is check-then-write with no atomicity between the two
    /// steps: two writers may both pass the check for the same token.
    /// Implementations backed by shared storage should override it and do
    /// both steps under one lock.
    fn register_token(
        &self,
        username: &str,
        token: &Token,
        card: &CardId,
    ) -> Result<TokenClaim, VaultError> {
        if self.token_owner(token)?.is_some() {
            return Ok(TokenClaim::Taken);
        }
        let mut user = self.fetch_by_username(username)?;
        user.add_tuple(token.clone(), card.clone());
        self.upsert(&user)?;
        Ok(TokenClaim::Registered)
    }

    /// Persist `user`, keeping every pair already stored for that username.
    ///
    /// The stored record gains the pairs of `user` and is written back; an
    /// unknown username is inserted as given. Returns the record as stored.
    /// The default reads then writes with no atomicity between the two
    /// steps, so a token registered in between is dropped from the record.
    /// Implementations that override [`UserRepository::register_token`]
    /// should override this under the same lock.
    fn merge_user(&self, user: &User) -> Result<User, VaultError> {
        let mut record = match self.fetch_by_username(&user.username) {
            Ok(stored) => stored,
            Err(VaultError::IncorrectUserName(_)) => user.clone(),
            Err(e) => return Err(e),
        };
        record.merge_tokens(user);
        self.upsert(&record)?;
        Ok(record)
    }
}

/// Produces candidate tokens for a card. Candidates need not be unique; the
/// session keeps drawing until it finds one nobody owns.
pub trait CardTokenizer: Send + Sync {
    fn tokenize(&self, card: &CardId) -> Token;
}

impl<F> CardTokenizer for F
where
    F: Fn(&CardId) -> Token + Send + Sync,
{
    fn tokenize(&self, card: &CardId) -> Token {
        self(card)
    }
}
