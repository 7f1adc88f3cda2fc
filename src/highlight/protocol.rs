//! Messages crossing the highlight worker boundary.
//!
//! The worker must echo `id` and `key` back unchanged.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out increasing request ids, starting at 1.
#[derive(Debug, Default)]
pub struct RequestIds(u64);

impl RequestIds {
    pub fn next_id(&mut self) -> RequestId {
        self.0 += 1;
        RequestId(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRequest {
    pub id: RequestId,
    pub key: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightReply {
    pub id: RequestId,
    pub key: String,
    /// Highlighted markup.
    pub source: String,
}

impl HighlightRequest {
    pub fn reply(&self, source: String) -> HighlightReply {
        HighlightReply {
            id: self.id,
            key: self.key.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut ids = RequestIds::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(b > a);
        assert_eq!(a.to_string(), "#1");
    }

    #[test]
    fn wire_shape_is_flat() {
        let req = HighlightRequest {
            id: RequestId(7),
            key: "abc".into(),
            source: "+x".into(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"id": 7, "key": "abc", "source": "+x"})
        );
        let reply = req.reply("<b>".into());
        assert_eq!((reply.id, reply.key.as_str()), (RequestId(7), "abc"));
    }
}
