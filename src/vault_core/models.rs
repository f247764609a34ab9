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

//! Domain models for the vault.
//!
//! Pure data structures for users, credentials, tokens and card identifiers.
//! Nothing in here performs I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::vault_core::constants::{crypto, tokens};

/// Newtype wrapper around Uuid for type-safe session identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new random SessionId
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Surrogate value standing in for a card identifier.
///
/// Ordering is the plain string ordering; callers wanting something else pass
/// their own comparator to the export.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque payment card identifier.
///
/// `Display` yields the raw value (the export table needs it). Use
/// [`CardId::masked`] anywhere the value may end up in a log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Every character but the last four replaced by `*`.
    /// Identifiers of four characters or fewer are masked entirely.
    pub fn masked(&self) -> String {
        let len = self.0.chars().count();
        if len <= tokens::VISIBLE_SUFFIX_LEN {
            return tokens::MASK_CHAR.to_string().repeat(len);
        }
        let hidden = len - tokens::VISIBLE_SUFFIX_LEN;
        self.0
            .chars()
            .enumerate()
            .map(|(i, c)| if i < hidden { tokens::MASK_CHAR } else { c })
            .collect()
    }

    /// Truncated SHA-256 of the identifier, for correlating audit entries.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        let mut hex = hex::encode(digest);
        hex.truncate(crypto::FINGERPRINT_HEX_LENGTH);
        hex
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Stored or submitted credential. Opaque and comparable; never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Compares digests so the running time does not depend on where
    /// the two secrets first differ.
    pub fn matches(&self, other: &Credential) -> bool {
        let a = Sha256::digest(self.0.as_bytes());
        let b = Sha256::digest(other.0.as_bytes());
        a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<REDACTED>)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<REDACTED>")
    }
}

/// A login candidate: who the caller claims to be plus the proof.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: Credential,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Credential::new(password),
        }
    }
}

/// A stored user record.
///
/// Capabilities are not part of the record; they belong to the session
/// that authenticated the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: Credential,
    /// `None` for records whose map was never initialised.
    #[serde(default)]
    pub token_map: Option<BTreeMap<Token, CardId>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Credential::new(password),
            token_map: Some(BTreeMap::new()),
            updated_at: None,
        }
    }

    pub fn card_for(&self, token: &Token) -> Option<&CardId> {
        self.token_map.as_ref().and_then(|map| map.get(token))
    }

    pub fn contains_token(&self, token: &Token) -> bool {
        self.card_for(token).is_some()
    }

    /// Insert a pair, initialising the map if needed. Returns the card
    /// previously stored under the token, if any.
    pub fn add_tuple(&mut self, token: Token, card: CardId) -> Option<CardId> {
        self.token_map
            .get_or_insert_with(BTreeMap::new)
            .insert(token, card)
    }

    /// Copy every pair of `other` into this record.
    pub fn merge_tokens(&mut self, other: &User) {
        for (token, card) in other.token_map.iter().flatten() {
            self.add_tuple(token.clone(), card.clone());
        }
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.token_map.iter().flat_map(|map| map.keys())
    }

    pub fn token_count(&self) -> usize {
        self.token_map.as_ref().map_or(0, BTreeMap::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_keeps_last_four() {
        let card = CardId::new("4111111111111111");
        assert_eq!(card.masked(), "************1111");
        assert_eq!(CardId::new("123").masked(), "***");
        assert_eq!(CardId::new("").masked(), "");
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let card = CardId::new("4111111111111111");
        assert_eq!(card.fingerprint(), card.fingerprint());
        assert_eq!(card.fingerprint().len(), crypto::FINGERPRINT_HEX_LENGTH);
        assert_ne!(card.fingerprint(), CardId::new("5500000000000004").fingerprint());
    }

    #[test]
    fn test_credential_never_printed() {
        let cred = Credential::new("hunter2");
        assert!(!format!("{:?}", cred).contains("hunter2"));
        assert!(!format!("{}", cred).contains("hunter2"));
        assert!(cred.matches(&Credential::new("hunter2")));
        assert!(!cred.matches(&Credential::new("hunter3")));
    }

    #[test]
    fn test_add_tuple_initialises_missing_map() {
        let mut user = User::new("alice", "pw1");
        user.token_map = None;
        assert_eq!(user.token_count(), 0);
        assert!(user.card_for(&Token::from("T1")).is_none());

        user.add_tuple(Token::from("T1"), CardId::from("4111"));
        assert_eq!(user.token_count(), 1);
        assert!(user.contains_token(&Token::from("T1")));
    }

    #[test]
    fn test_user_record_without_token_map_deserializes() {
        let user: User = serde_json::from_str(r#"{"username":"bob","password":"pw"}"#).unwrap();
        assert!(user.token_map.is_none());
        assert!(user.updated_at.is_none());
    }

    #[test]
    fn test_token_display_honours_padding() {
        assert_eq!(format!("{:<5}|", Token::from("T1")), "T1   |");
    }
}
