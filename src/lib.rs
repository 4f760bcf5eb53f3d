//! Host side of the NIHIA deep integration protocol spoken by Native Instruments
//! keyboards: handshake, button lights, display text and mixer track reports.

pub mod error;
pub mod midi_interface;
pub mod protocol;
pub mod script;
pub mod session;

pub use error::{NihiaError, Result};
pub use protocol::WireMessage;
pub use session::{DeviceSession, MidiSink, PendingHandshake, SessionState};
