//! Content fingerprint of a source item.
//!
//! SHA-256 over title, notes and due, each normalised to LF line endings and
//! separated by a unit separator so that moving text between fields changes
//! the digest.

use sha2::{Digest, Sha256};

use warrior_core::SourceItem;

const FIELD_SEP: &[u8] = b"\x1f";

/// Hex SHA-256 digest of the item's user-visible content.
pub fn content_hash(item: &SourceItem) -> String {
    let mut h = Sha256::new();
    h.update(item.title.replace("\r\n", "\n").as_bytes());
    h.update(FIELD_SEP);
    h.update(item.notes.replace("\r\n", "\n").as_bytes());
    h.update(FIELD_SEP);
    if let Some(due) = item.due {
        h.update(due.to_rfc3339().as_bytes());
    }
    hex::encode(h.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn identifier_does_not_affect_hash() {
        let a = SourceItem::new("A", "Buy milk");
        let b = SourceItem::new("B", "Buy milk");
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn title_notes_and_due_all_contribute() {
        let base = SourceItem::new("A", "Buy milk");
        let due = Utc.with_ymd_and_hms(2024, 5, 14, 9, 0, 0).unwrap();

        let h = content_hash(&base);
        assert_ne!(h, content_hash(&base.clone().with_notes("2 litres")));
        assert_ne!(h, content_hash(&base.clone().with_due(due)));
        assert_ne!(h, content_hash(&SourceItem::new("A", "Buy oat milk")));
    }

    #[test]
    fn text_moved_between_fields_changes_hash() {
        let a = SourceItem::new("A", "ab").with_notes("c");
        let b = SourceItem::new("A", "a").with_notes("bc");
        assert_ne!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn crlf_and_lf_notes_share_the_same_hash() {
        let a = SourceItem::new("A", "t").with_notes("line1\r\nline2");
        let b = SourceItem::new("A", "t").with_notes("line1\nline2");
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn digest_is_hex_sha256() {
        let h = content_hash(&SourceItem::new("A", "x"));
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
