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

//! cardvault Constants - Single source of truth for all configuration values.

/// Cryptographic constants
pub mod crypto {
    /// HMAC-SHA256 secret key length in bytes
    pub const SECRET_KEY_LENGTH: usize = 32;
    /// Hex characters of the card fingerprint kept in audit entries
    pub const FINGERPRINT_HEX_LENGTH: usize = 16;
}

/// Token registration
pub mod tokens {
    /// Default cap on tokenizer draws per registration
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;
    /// Trailing card characters preserved by tokenizers and masking
    pub const VISIBLE_SUFFIX_LEN: usize = 4;
    /// Mask character for card identifiers in logs
    pub const MASK_CHAR: char = '*';
}

/// Sorted export table layout
pub mod export {
    /// Width of each left-justified column
    pub const COLUMN_WIDTH: usize = 20;
    pub const TOKEN_HEADER: &str = "Token: ";
    pub const CARD_HEADER: &str = "CardId: ";
}

/// Audit event names
pub mod audit {
    pub const TARGET: &str = "audit";
    pub const SESSION_START: &str = "SessionStart";
    pub const LOGIN_FAILED: &str = "LoginFailed";
    pub const TOKEN_REGISTERED: &str = "TokenRegistered";
    pub const ACCESS_DENIED: &str = "AccessDenied";
    pub const SESSION_CLOSE: &str = "SessionClose";
}

/// Configuration Environment Variables
pub mod config {
    pub const ENV_CONFIG_PATH: &str = "CARDVAULT_CONFIG";
    pub const ENV_DATABASE_PATH: &str = "CARDVAULT_DATABASE_PATH";
    pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
    pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
    pub const ENV_MAX_TOKEN_ATTEMPTS: &str = "CARDVAULT_MAX_TOKEN_ATTEMPTS";
    pub const ENV_AUDIT_ENABLED: &str = "CARDVAULT_AUDIT_ENABLED";
    pub const DEFAULT_DATABASE_PATH: &str = "users.json";
}

/// File store
pub mod store {
    /// Suffix of the sidecar file holding the exclusive lock
    pub const LOCK_SUFFIX: &str = "lock";
    /// Suffix of the temp file written before the atomic rename
    pub const TEMP_SUFFIX: &str = "tmp";
}
