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

//! User repositories.
//!
//! Both implementations keep token ownership unique across all users. The
//! check-and-insert of [`UserRepository::register_token`] and the
//! read-merge-write of [`UserRepository::merge_user`] each run under a
//! single lock.
//!
//! [`UserRepository::register_token`]: crate::vault_core::traits::UserRepository::register_token
//! [`UserRepository::merge_user`]: crate::vault_core::traits::UserRepository::merge_user

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileUserRepository;
pub use memory::InMemoryUserRepository;

use crate::vault_core::errors::VaultError;
use crate::vault_core::models::{Token, User};

/// First token in `candidate` already owned by a different user.
fn foreign_token<'a, I>(others: I, candidate: &User) -> Option<Token>
where
    I: IntoIterator<Item = &'a User>,
{
    let others: Vec<&User> = others
        .into_iter()
        .filter(|u| u.username != candidate.username)
        .collect();
    candidate
        .tokens()
        .find(|token| others.iter().any(|u| u.contains_token(token)))
        .cloned()
}

fn token_conflict(username: &str, token: &Token) -> VaultError {
    VaultError::Storage(format!(
        "token {} in record for {} is owned by another user",
        token, username
    ))
}
