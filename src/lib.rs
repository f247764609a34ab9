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

//! cardvault: capability-gated card tokenization sessions.
//!
//! A user authenticates against a stored credential and receives a
//! [`Session`](vault_core::session::Session). The session registers card
//! identifiers under surrogate tokens that are unique across every user in
//! the repository, resolves tokens back to cards, and exports the mapping
//! as a fixed-width table.

pub mod config;
pub mod engine;
pub mod store;
pub mod utils;
pub mod vault_core;

pub use config::Config;
pub use vault_core::errors::VaultError;
pub use vault_core::models::{CardId, Credential, LoginRequest, Token, User};
pub use vault_core::session::{Session, SessionContext, SessionState};
pub use vault_core::traits::{CardTokenizer, TokenClaim, UserRepository};
