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

//! Fixed-width token table.
//!
//! Two left-justified columns, 20 characters each, one header line and one
//! line per entry. Values longer than the column are written in full.

use std::cmp::Ordering;
use std::fmt::Display;
use std::io::Write;
use tracing::trace;

use crate::vault_core::constants::export;
use crate::vault_core::errors::VaultError;
use crate::vault_core::models::{CardId, Token};

/// Ready-made token orderings for [`crate::vault_core::session::Session::export_sorted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOrder {
    Ascending,
    Descending,
}

impl ExportOrder {
    pub fn compare(self, a: &Token, b: &Token) -> Ordering {
        match self {
            ExportOrder::Ascending => a.cmp(b),
            ExportOrder::Descending => b.cmp(a),
        }
    }
}

pub fn format_row(left: &dyn Display, right: &dyn Display) -> String {
    format!(
        "{:<width$}{:<width$}\n",
        left,
        right,
        width = export::COLUMN_WIDTH
    )
}

pub fn header() -> String {
    format_row(&export::TOKEN_HEADER, &export::CARD_HEADER)
}

/// Write the header and one row per pair, in iteration order.
/// Returns the number of data rows written.
pub fn write_table<'a, W, I>(rows: I, sink: &mut W) -> Result<usize, VaultError>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = (&'a Token, &'a CardId)>,
{
    sink.write_all(header().as_bytes())?;
    let mut written = 0;
    for (token, card) in rows {
        sink.write_all(format_row(token, card).as_bytes())?;
        trace!(token = %token, card = %card.masked(), "Exported row");
        written += 1;
    }
    sink.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let h = header();
        assert_eq!(h.len(), 2 * export::COLUMN_WIDTH + 1);
        assert!(h.starts_with("Token: "));
        assert_eq!(&h[export::COLUMN_WIDTH..export::COLUMN_WIDTH + 8], "CardId: ");
        assert!(h.ends_with('\n'));
    }

    #[test]
    fn test_rows_are_padded() {
        let t = Token::from("T1");
        let c = CardId::from("4111");
        let mut out = Vec::new();
        let n = write_table([(&t, &c)], &mut out).unwrap();
        assert_eq!(n, 1);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], format!("{:<20}{:<20}", "T1", "4111"));
    }

    #[test]
    fn test_long_values_not_truncated() {
        let t = Token::from("T".repeat(25).as_str());
        let row = format_row(&t, &CardId::from("4111"));
        assert!(row.starts_with(&"T".repeat(25)));
        assert!(row.contains("4111"));
    }

    #[test]
    fn test_export_order() {
        let a = Token::from("A");
        let b = Token::from("B");
        assert_eq!(ExportOrder::Ascending.compare(&a, &b), Ordering::Less);
        assert_eq!(ExportOrder::Descending.compare(&a, &b), Ordering::Greater);
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_failure_is_io_error() {
        let err = write_table(std::iter::empty(), &mut FailingSink).unwrap_err();
        assert!(matches!(err, VaultError::Io(_)));
    }
}
