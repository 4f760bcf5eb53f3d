use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong between an intent and the bytes on the wire.
#[derive(Debug, Error, PartialEq)]
pub enum NihiaError {
    /// An encoded field falls outside the range its byte may carry.
    #[error("{field} value {value} is out of range")]
    InvalidByteValue { field: &'static str, value: i64 },

    /// A button, light state or mixer info kind that has no entry in its table.
    #[error("unknown {kind}: {name:?}")]
    UnknownIdentifier { kind: &'static str, name: String },

    /// Display text is carried one byte per character.
    #[error("character {character:?} at position {position} cannot be sent as a single byte")]
    NonEncodableCharacter { character: char, position: usize },

    #[error("MIDI transport unavailable: {0}")]
    TransportUnavailable(String),

    #[error("no MIDI port {0}")]
    PortNotFound(String),

    #[error("invalid script {path}: {reason}")]
    InvalidScript { path: String, reason: String },

    #[error("no handshake acknowledgement from the device within {0:?}")]
    HandshakeTimeout(Duration),

    #[error("malformed device message: {0}")]
    MalformedMessage(String),

    /// A mixer report whose payload does not suit its info kind.
    #[error("{kind} reports expect a {expected} payload")]
    MismatchedPayload {
        kind: &'static str,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, NihiaError>;
