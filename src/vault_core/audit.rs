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

use crate::vault_core::constants::audit;
use crate::vault_core::crypto::AuditSigner;
use crate::vault_core::models::SessionId;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Serialize)]
struct AuditEntry<'a> {
    session_id: String,
    timestamp: String,
    event_type: &'a str,
    username: &'a str,
    details: serde_json::Value,
}

/// Emits signed audit entries on the `audit` tracing target.
#[derive(Debug, Clone)]
pub struct AuditLogger {
    signer: AuditSigner,
    enabled: bool,
}

impl AuditLogger {
    pub fn new(signer: AuditSigner, enabled: bool) -> Self {
        Self { signer, enabled }
    }

    pub fn disabled() -> Self {
        Self::new(AuditSigner::generate(), false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn log(
        &self,
        session_id: &SessionId,
        username: &str,
        event_type: &str,
        details: serde_json::Value,
    ) {
        if !self.enabled {
            return;
        }
        let entry = AuditEntry {
            session_id: session_id.to_string(),
            timestamp: crate::utils::time::now_rfc3339(),
            event_type,
            username,
            details,
        };

        let payload_str = serde_json::to_string(&entry).unwrap_or_default();

        match self.signer.sign(payload_str.as_bytes()) {
            Ok(signature) => info!(
                target: audit::TARGET,
                signature = %signature,
                payload = %payload_str,
                "SECURE_AUDIT_LOG"
            ),
            Err(e) => warn!(
                target: audit::TARGET,
                error = %e,
                payload = %payload_str,
                "UNSIGNED_AUDIT_LOG"
            ),
        }
    }
}
