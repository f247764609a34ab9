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

//! Card tokenizers.

use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::vault_core::constants::tokens;
use crate::vault_core::models::{CardId, Token};
use crate::vault_core::traits::CardTokenizer;

/// Replaces every digit of the card with a random digit, except the last
/// four characters, which stay as-is. Non-digit characters (spaces, dashes)
/// keep their position so the token has the card's shape.
///
/// Identifiers of four characters or fewer have every digit replaced.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomDigitTokenizer;

impl RandomDigitTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl CardTokenizer for RandomDigitTokenizer {
    fn tokenize(&self, card: &CardId) -> Token {
        let len = card.as_str().chars().count();
        let keep_from = if len > tokens::VISIBLE_SUFFIX_LEN {
            len - tokens::VISIBLE_SUFFIX_LEN
        } else {
            0
        };
        let mut rng = rand::rng();
        let token: String = card
            .as_str()
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if c.is_ascii_digit() && (i < keep_from || keep_from == 0) {
                    char::from(b'0' + rng.random_range(0..10u8))
                } else {
                    c
                }
            })
            .collect();
        Token::new(token)
    }
}

/// Replays a fixed list of tokens in order, wrapping around at the end.
///
/// Useful for deterministic replays and for exercising the collision path
/// with deliberately repeated candidates.
#[derive(Debug)]
pub struct ScriptedTokenizer {
    script: Vec<Token>,
    cursor: AtomicUsize,
}

impl ScriptedTokenizer {
    /// Panics if `script` is empty.
    pub fn new<I, T>(script: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        let script: Vec<Token> = script.into_iter().map(Into::into).collect();
        assert!(!script.is_empty(), "ScriptedTokenizer needs at least one token");
        Self {
            script,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of tokens handed out so far.
    pub fn draws(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl CardTokenizer for ScriptedTokenizer {
    fn tokenize(&self, _card: &CardId) -> Token {
        let i = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.script[i % self.script.len()].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_tokenizer_keeps_shape_and_suffix() {
        let card = CardId::new("4111-1111-1111-1234");
        let token = RandomDigitTokenizer.tokenize(&card);
        let s = token.as_str();

        assert_eq!(s.len(), card.as_str().len());
        assert!(s.ends_with("1234"));
        assert_eq!(s.chars().nth(4), Some('-'));
        assert_eq!(s.chars().nth(9), Some('-'));
        assert!(s.chars().all(|c| c.is_ascii_digit() || c == '-'));
    }

    #[test]
    fn test_random_tokenizer_varies() {
        let card = CardId::new("4111111111111111");
        let draws: std::collections::HashSet<Token> =
            (0..20).map(|_| RandomDigitTokenizer.tokenize(&card)).collect();
        assert!(draws.len() > 1);
    }

    #[test]
    fn test_short_identifier_fully_replaced() {
        let token = RandomDigitTokenizer.tokenize(&CardId::new("12ab"));
        assert_eq!(token.as_str().len(), 4);
        assert!(token.as_str().ends_with("ab"));
    }

    #[test]
    fn test_scripted_tokenizer_wraps() {
        let tokenizer = ScriptedTokenizer::new(["T1", "T1", "T2"]);
        let card = CardId::new("4111");
        let drawn: Vec<Token> = (0..4).map(|_| tokenizer.tokenize(&card)).collect();
        assert_eq!(
            drawn,
            vec![Token::from("T1"), Token::from("T1"), Token::from("T2"), Token::from("T1")]
        );
        assert_eq!(tokenizer.draws(), 4);
    }
}
