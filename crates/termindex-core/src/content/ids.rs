//! Content item identifiers.

use crate::config::IndexConfig;
use uuid::Uuid;

const ENCODING: &[u8; 32] = b"0123456789abcdefghjkmnpqrstvwxyz";

/// Generate a 26-character identifier from a random UUID.
///
/// The 128 bits of the UUID are written as base32 digits, most significant
/// first, using an alphabet without `i`, `l`, `o` and `u`.
pub fn generate_id() -> String {
    let value = Uuid::new_v4().as_u128();
    (0..IndexConfig::CONTENT_ITEM_ID_LENGTH)
        .rev()
        .map(|digit| ENCODING[((value >> (digit * 5)) & 0x1f) as usize] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_have_fixed_length() {
        for _ in 0..100 {
            let id = generate_id();
            assert_eq!(id.len(), IndexConfig::CONTENT_ITEM_ID_LENGTH);
            assert!(id.bytes().all(|b| ENCODING.contains(&b)));
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
