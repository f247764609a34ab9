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

//! Session capabilities.
//!
//! What a session may currently do, kept apart from who the user is.
//! A login grants the full set; closing the session revokes it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single permission gating one family of session operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Resolve tokens back to card identifiers and export the mapping.
    ReadCardId,
    /// Register new card identifiers under fresh tokens.
    RegisterToken,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::ReadCardId, Capability::RegisterToken];

    const fn bit(self) -> u8 {
        match self {
            Capability::ReadCardId => 0b01,
            Capability::RegisterToken => 0b10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ReadCardId => "read_card_id",
            Capability::RegisterToken => "register_token",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Small bitset of [`Capability`] values.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(Capability::ReadCardId.bit() | Capability::RegisterToken.bit())
    }

    pub fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn grant(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    pub fn revoke(&mut self, capability: Capability) {
        self.0 &= !capability.bit();
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = Self::empty();
        for capability in iter {
            set.grant(capability);
        }
        set
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
