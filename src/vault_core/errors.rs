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

//! Domain error types - secure error handling with no information disclosure.

use crate::vault_core::models::Token;
use thiserror::Error;

/// Main error type for the vault.
#[derive(Error, Debug)]
pub enum VaultError {
    /// A session was requested without any login candidate.
    #[error("Login failed: no credentials supplied")]
    Login,

    /// No user record exists for the username.
    #[error("Unknown user: {0}")]
    IncorrectUserName(String),

    /// The submitted credential does not match the stored one.
    #[error("Incorrect password for user: {0}")]
    IncorrectUserPassword(String),

    /// The session does not hold the register-token capability.
    #[error("Token registration denied")]
    TokenRegistrationDenied,

    /// The session does not hold the read-card-id capability.
    #[error("Card reading denied")]
    CardReadingDenied,

    /// Lookup miss in the user's token map.
    #[error("Token not registered: {0}")]
    TokenNotRegistered(Token),

    /// The tokenizer kept producing tokens that already exist.
    #[error("No unique token found after {attempts} attempts")]
    TokenSpaceExhausted { attempts: u32 },

    /// Repository failure (lock contention, corrupt data, missing record on update)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Cryptographic error (audit signing)
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O Error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VaultError {
    /// Get user-friendly error message.
    ///
    /// Login failures collapse into one message so callers cannot probe
    /// which usernames exist.
    pub fn user_message(&self) -> String {
        match self {
            VaultError::Login
            | VaultError::IncorrectUserName(_)
            | VaultError::IncorrectUserPassword(_) => "Invalid username or password".to_string(),
            VaultError::TokenRegistrationDenied => "Token registration not permitted".to_string(),
            VaultError::CardReadingDenied => "Card reading not permitted".to_string(),
            VaultError::TokenNotRegistered(_) => "Unknown token".to_string(),
            VaultError::TokenSpaceExhausted { .. } => "Service briefly unavailable".to_string(),
            VaultError::Storage(_) => "Service unavailable".to_string(),
            VaultError::Configuration(_) => "Internal error".to_string(),
            VaultError::Crypto(_) => "Internal error".to_string(),
            VaultError::Serialization(_) => "Internal error".to_string(),
            VaultError::Io(_) => "Internal system error".to_string(),
        }
    }

    /// True for the capability-check failures.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            VaultError::TokenRegistrationDenied | VaultError::CardReadingDenied
        )
    }
}
