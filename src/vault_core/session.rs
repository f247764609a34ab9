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

//! Session lifecycle.
//!
//! A [`Session`] exists only for a successfully authenticated user. Login
//! grants every [`Capability`]; each privileged operation checks its
//! capability before touching anything; [`Session::close`] revokes them all
//! and persists the user. A closed session is not rejected outright: its
//! calls fail with the ordinary denial errors because the capabilities are
//! gone.

use serde_json::json;
use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::export;
use crate::vault_core::audit::AuditLogger;
use crate::vault_core::capabilities::{Capability, CapabilitySet};
use crate::vault_core::constants::audit as events;
use crate::vault_core::crypto::AuditSigner;
use crate::vault_core::errors::VaultError;
use crate::vault_core::models::{CardId, LoginRequest, SessionId, Token, User};
use crate::vault_core::traits::{CardTokenizer, TokenClaim, UserRepository};

/// Shared collaborators handed to every session.
#[derive(Clone)]
pub struct SessionContext {
    pub config: Arc<Config>,
    pub repository: Arc<dyn UserRepository>,
    pub tokenizer: Arc<dyn CardTokenizer>,
    pub audit: AuditLogger,
}

impl SessionContext {
    pub fn new(
        config: Arc<Config>,
        repository: Arc<dyn UserRepository>,
        tokenizer: Arc<dyn CardTokenizer>,
    ) -> Self {
        let audit = AuditLogger::new(AuditSigner::generate(), config.audit_enabled);
        Self {
            config,
            repository,
            tokenizer,
            audit,
        }
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = audit;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Authenticated,
    Closed,
}

pub struct Session {
    id: SessionId,
    ctx: SessionContext,
    user: User,
    capabilities: CapabilitySet,
    state: SessionState,
}

impl Session {
    /// Authenticate `candidate`. `None` fails with [`VaultError::Login`].
    pub fn open(ctx: &SessionContext, candidate: Option<LoginRequest>) -> Result<Self, VaultError> {
        match candidate {
            Some(request) => Self::authenticate(ctx, request),
            None => {
                warn!("Login attempted without credentials");
                Err(VaultError::Login)
            }
        }
    }

    /// Look the user up, compare credentials, and on success bind the stored
    /// record with every capability granted. Nothing is persisted here.
    pub fn authenticate(ctx: &SessionContext, request: LoginRequest) -> Result<Self, VaultError> {
        let id = SessionId::generate();

        let stored = match ctx.repository.fetch_by_username(&request.username) {
            Ok(user) => user,
            Err(e) => {
                if matches!(e, VaultError::IncorrectUserName(_)) {
                    warn!(session_id = %id, username = %request.username, "Unknown user");
                    ctx.audit.log(
                        &id,
                        &request.username,
                        events::LOGIN_FAILED,
                        json!({ "reason": "unknown_user" }),
                    );
                }
                return Err(e);
            }
        };

        if !stored.password.matches(&request.password) {
            warn!(session_id = %id, username = %request.username, "Incorrect password");
            ctx.audit.log(
                &id,
                &request.username,
                events::LOGIN_FAILED,
                json!({ "reason": "incorrect_password" }),
            );
            return Err(VaultError::IncorrectUserPassword(request.username));
        }

        let session = Self {
            id,
            ctx: ctx.clone(),
            user: stored,
            capabilities: CapabilitySet::all(),
            state: SessionState::Authenticated,
        };

        info!(
            session_id = %session.id,
            username = %session.user.username,
            tokens = session.user.token_count(),
            "Session authenticated"
        );
        session.ctx.audit.log(
            &session.id,
            &session.user.username,
            events::SESSION_START,
            json!({ "capabilities": session.granted() }),
        );
        Ok(session)
    }

    /// Tokenize `card` under a token no user in the repository owns yet.
    ///
    /// Candidates are drawn until the repository accepts one. The draw count
    /// is capped by `Config::max_token_attempts` (0 = no cap). The durable
    /// write happens before the in-memory map changes, so a storage failure
    /// leaves the session as it was.
    pub fn register_card(&mut self, card: &CardId) -> Result<Token, VaultError> {
        debug!(session_id = %self.id, card = %card.masked(), "Registering the card");
        self.require(Capability::RegisterToken, VaultError::TokenRegistrationDenied)?;

        let limit = self.ctx.config.token_attempt_limit();
        let mut attempts: u32 = 0;
        loop {
            if let Some(max) = limit {
                if attempts >= max {
                    warn!(
                        session_id = %self.id,
                        attempts,
                        "Token space exhausted, giving up"
                    );
                    return Err(VaultError::TokenSpaceExhausted { attempts });
                }
            }
            attempts = attempts.saturating_add(1);

            let candidate = self.ctx.tokenizer.tokenize(card);
            match self
                .ctx
                .repository
                .register_token(&self.user.username, &candidate, card)?
            {
                TokenClaim::Registered => {
                    self.user.add_tuple(candidate.clone(), card.clone());
                    info!(
                        session_id = %self.id,
                        username = %self.user.username,
                        token = %candidate,
                        attempts,
                        "Registration done"
                    );
                    self.ctx.audit.log(
                        &self.id,
                        &self.user.username,
                        events::TOKEN_REGISTERED,
                        json!({
                            "token": candidate.as_str(),
                            "card": card.masked(),
                            "card_fingerprint": card.fingerprint(),
                            "attempts": attempts,
                        }),
                    );
                    return Ok(candidate);
                }
                TokenClaim::Taken => {
                    debug!(session_id = %self.id, attempt = attempts, "Token collision, drawing again");
                }
            }
        }
    }

    /// Resolve a token of this user back to its card.
    pub fn get_card(&self, token: &Token) -> Result<CardId, VaultError> {
        self.require(Capability::ReadCardId, VaultError::CardReadingDenied)?;

        self.user
            .card_for(token)
            .cloned()
            .ok_or_else(|| VaultError::TokenNotRegistered(token.clone()))
    }

    /// Write the token table to `sink`, rows ordered by `compare`.
    ///
    /// The rows are copied before writing; later registrations do not
    /// affect a table already produced. Returns the number of data rows.
    pub fn export_sorted<F, W>(&self, mut compare: F, sink: &mut W) -> Result<usize, VaultError>
    where
        F: FnMut(&Token, &Token) -> Ordering,
        W: Write + ?Sized,
    {
        self.require(Capability::ReadCardId, VaultError::CardReadingDenied)?;

        let mut rows: Vec<(Token, CardId)> = self
            .user
            .token_map
            .iter()
            .flatten()
            .map(|(t, c)| (t.clone(), c.clone()))
            .collect();
        rows.sort_by(|a, b| compare(&a.0, &b.0));

        let written = export::write_table(rows.iter().map(|(t, c)| (t, c)), sink)?;
        info!(session_id = %self.id, rows = written, "Exported token table");
        Ok(written)
    }

    /// [`Session::export_sorted`] into a file, created or truncated.
    pub fn export_sorted_to_path<F>(&self, compare: F, path: impl AsRef<Path>) -> Result<usize, VaultError>
    where
        F: FnMut(&Token, &Token) -> Ordering,
    {
        // Checked before the file is touched so a denied export leaves no file behind.
        self.require(Capability::ReadCardId, VaultError::CardReadingDenied)?;
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.export_sorted(compare, &mut writer)
    }

    /// Revoke every capability and persist the user.
    ///
    /// Safe to call repeatedly; each call persists again. The revocation
    /// stands even if persisting fails.
    pub fn close(&mut self) -> Result<(), VaultError> {
        self.capabilities.clear();
        self.state = SessionState::Closed;

        // Tokens written by other sessions of the same user stay in the record.
        self.user = self.ctx.repository.merge_user(&self.user)?;

        info!(session_id = %self.id, username = %self.user.username, "Session closed");
        self.ctx.audit.log(
            &self.id,
            &self.user.username,
            events::SESSION_CLOSE,
            json!({ "tokens": self.user.token_count() }),
        );
        Ok(())
    }

    fn require(&self, capability: Capability, denial: VaultError) -> Result<(), VaultError> {
        if self.capabilities.contains(capability) {
            return Ok(());
        }
        warn!(
            session_id = %self.id,
            username = %self.user.username,
            capability = %capability,
            closed = self.is_closed(),
            "Capability check failed"
        );
        self.ctx.audit.log(
            &self.id,
            &self.user.username,
            events::ACCESS_DENIED,
            json!({ "capability": capability.as_str() }),
        );
        Err(denial)
    }

    fn granted(&self) -> Vec<&'static str> {
        self.capabilities.iter().map(Capability::as_str).collect()
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    pub fn can_read_card_id(&self) -> bool {
        self.capabilities.contains(Capability::ReadCardId)
    }

    pub fn can_register_token(&self) -> bool {
        self.capabilities.contains(Capability::RegisterToken)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    /// Drop a single capability without closing the session.
    pub fn revoke(&mut self, capability: Capability) {
        self.capabilities.revoke(capability);
        debug!(session_id = %self.id, capability = %capability, "Capability revoked");
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("username", &self.user.username)
            .field("capabilities", &self.capabilities)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tokenizer::ScriptedTokenizer;
    use crate::store::InMemoryUserRepository;

    fn context(script: &[&str]) -> SessionContext {
        let repo = InMemoryUserRepository::with_users(vec![
            User::new("alice", "pw1"),
            User::new("bob", "pw2"),
        ]);
        SessionContext::new(
            Arc::new(Config::default()),
            Arc::new(repo),
            Arc::new(ScriptedTokenizer::new(script.iter().copied())),
        )
        .with_audit(AuditLogger::disabled())
    }

    #[test]
    fn test_open_without_candidate() {
        let ctx = context(&["T1"]);
        assert!(matches!(Session::open(&ctx, None), Err(VaultError::Login)));
    }

    #[test]
    fn test_revoke_single_capability() {
        let ctx = context(&["T1"]);
        let mut session = Session::authenticate(&ctx, LoginRequest::new("alice", "pw1")).unwrap();
        session.revoke(Capability::RegisterToken);

        assert!(matches!(
            session.register_card(&CardId::from("4111")),
            Err(VaultError::TokenRegistrationDenied)
        ));
        assert!(session.can_read_card_id());
        assert!(!session.is_closed());
    }

    #[test]
    fn test_denied_export_creates_no_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("export.txt");
        let ctx = context(&["T1"]);
        let mut session = Session::authenticate(&ctx, LoginRequest::new("alice", "pw1")).unwrap();
        session.close().unwrap();

        let err = session.export_sorted_to_path(Token::cmp, &path).unwrap_err();
        assert!(matches!(err, VaultError::CardReadingDenied));
        assert!(!path.exists());
    }

    #[test]
    fn test_close_keeps_tokens_from_other_session() {
        let ctx = context(&["T1", "T2"]);
        let mut first = Session::authenticate(&ctx, LoginRequest::new("alice", "pw1")).unwrap();
        let mut second = Session::authenticate(&ctx, LoginRequest::new("alice", "pw1")).unwrap();

        first.register_card(&CardId::from("4111")).unwrap();
        second.register_card(&CardId::from("5500")).unwrap();
        first.close().unwrap();

        let stored = ctx.repository.fetch_by_username("alice").unwrap();
        assert_eq!(stored.token_count(), 2);
        assert_eq!(first.user().token_count(), 2);
    }

    #[test]
    fn test_debug_hides_credentials() {
        let ctx = context(&["T1"]);
        let session = Session::authenticate(&ctx, LoginRequest::new("alice", "pw1")).unwrap();
        let dbg = format!("{:?}", session);
        assert!(dbg.contains("alice"));
        assert!(!dbg.contains("pw1"));
    }
}
