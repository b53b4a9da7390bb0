//! Nostr witness transport shapes
//!
//! A Nostr witness publishes the Merkle root as the content of a signed
//! event; the event id plays the role of the transaction hash and the
//! author's public key is the publisher.

use serde::{Deserialize, Serialize};

use aqua_core::normalize_hash;

/// A Nostr event as fetched back from a relay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NostrEvent {
    /// Event id (the witness transaction hash)
    pub id: String,
    /// Author public key (the publisher)
    pub pubkey: String,
    /// Event content; carries the anchored root
    pub content: String,
    /// Unix timestamp of the event
    pub created_at: u64,
}

impl NostrEvent {
    /// Does the event content anchor this Merkle root?
    ///
    /// Content is matched exactly or as an embedded substring, since some
    /// publishers wrap the root in a human-readable sentence.
    pub fn anchors_root(&self, merkle_root: &str) -> bool {
        let root = normalize_hash(merkle_root);
        let content = self.content.to_ascii_lowercase();
        normalize_hash(&self.content) == root || content.contains(&root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(content: &str) -> NostrEvent {
        NostrEvent {
            id: "event-id".into(),
            pubkey: "npub-key".into(),
            content: content.into(),
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_exact_content_match() {
        assert!(event("ab12").anchors_root("0xAB12"));
    }

    #[test]
    fn test_embedded_content_match() {
        assert!(event("aqua merkle root: ab12").anchors_root("ab12"));
        assert!(!event("unrelated note").anchors_root("ab12"));
    }
}
