//! Session-scoped payload types.
//!
//! These cover identity announcement and the server's generic
//! acknowledgement and error surfaces.

use serde::{Deserialize, Serialize};

/// Identity announcement (`nick`)
///
/// The first thing a client emits after the transport reports connected.
/// Usernames are self-asserted; the server does not verify or deduplicate
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nick {
    /// The username to speak as for the rest of the session.
    pub nick: String,
}

/// Generic server acknowledgement (`nick_set`, `statement_ok`)
///
/// A pure completion signal. The `reason` text is informational only;
/// consumers treat receipt itself as the acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Human-readable confirmation text.
    #[serde(default)]
    pub reason: String,
}

/// Server-reported error (`error`)
///
/// Surfaced to an external observer, never interpreted or retried by the
/// client core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    /// Server-supplied description of what went wrong.
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nick_serde() {
        let nick = Nick { nick: "alice".to_owned() };

        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&nick, &mut bytes).expect("encode");

        let decoded: Nick = ciborium::de::from_reader(&bytes[..]).expect("decode");
        assert_eq!(nick, decoded);
    }

    #[test]
    fn acknowledgement_reason_defaults_to_empty() {
        // An ack is a signal; servers may omit the reason entirely.
        let empty: std::collections::BTreeMap<String, String> = std::collections::BTreeMap::new();

        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&empty, &mut bytes).expect("encode");

        let decoded: Acknowledgement = ciborium::de::from_reader(&bytes[..]).expect("decode");
        assert_eq!(decoded.reason, "");
    }
}
