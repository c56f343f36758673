//! Fingerprint of a source export, used to suppress duplicate jobs.

use sha2::{Digest, Sha256};

use crate::po::PoEntry;

/// SHA-256 over each entry's context and message id, in export order.
///
/// Every field is length-prefixed (`u64` little endian) and a missing
/// context is tagged apart from an empty one, so moving text across a
/// field or entry boundary always changes the digest. Translations
/// (`msgstr`) do not contribute.
#[must_use]
pub fn compute_content_hash(entries: &[PoEntry]) -> String {
    let mut hasher = Sha256::new();
    for entry in entries {
        match &entry.msgctxt {
            Some(ctxt) => {
                hasher.update([1u8]);
                update_field(&mut hasher, ctxt);
            }
            None => hasher.update([0u8]),
        }
        update_field(&mut hasher, &entry.msgid);
    }
    hex::encode(hasher.finalize())
}

fn update_field(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}
