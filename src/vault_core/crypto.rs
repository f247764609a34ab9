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

//! HMAC signing for audit entries.
//!
//! `AuditSigner` holds an ephemeral key generated per process. Signatures are
//! URL-safe base64 without padding.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::vault_core::constants::crypto;
use crate::vault_core::errors::VaultError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct AuditSigner {
    secret: [u8; crypto::SECRET_KEY_LENGTH],
}

impl AuditSigner {
    /// Create a new signer with a random ephemeral key
    pub fn generate() -> Self {
        let mut secret = [0u8; crypto::SECRET_KEY_LENGTH];
        rand::rng().fill(&mut secret);
        Self { secret }
    }

    fn mac(&self) -> Result<HmacSha256, VaultError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|e| VaultError::Crypto(e.to_string()))
    }

    pub fn sign(&self, payload: &[u8]) -> Result<String, VaultError> {
        let mut mac = self.mac()?;
        mac.update(payload);
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    /// Constant-time verification of a signature produced by [`AuditSigner::sign`].
    pub fn verify(&self, payload: &[u8], signature: &str) -> bool {
        let provided = match URL_SAFE_NO_PAD.decode(signature) {
            Ok(b) => b,
            Err(_) => return false,
        };
        let mut mac = match self.mac() {
            Ok(m) => m,
            Err(_) => return false,
        };
        mac.update(payload);
        mac.verify_slice(&provided).is_ok()
    }
}

impl std::fmt::Debug for AuditSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditSigner")
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let signer = AuditSigner::generate();
        let sig = signer.sign(b"payload").unwrap();
        assert!(signer.verify(b"payload", &sig));
        assert!(!signer.verify(b"payload2", &sig));
        assert!(!signer.verify(b"payload", "not base64!"));
    }

    #[test]
    fn test_keys_differ_between_signers() {
        let a = AuditSigner::generate();
        let b = AuditSigner::generate();
        let sig = a.sign(b"payload").unwrap();
        assert!(!b.verify(b"payload", &sig));
    }
}
