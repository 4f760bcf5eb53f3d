//! Wire format of the NIHIA deep integration protocol.
//!
//! Two frame shapes go from host to device:
//! ```text
//! short control:  F0 BF <data1> <data2>
//! long sysex:     F0 00 21 09 00 00 44 43 01 00 <body...> F7
//! ```
//! The long preamble is the Native Instruments manufacturer ID (`00 21 09`)
//! followed by the fixed NIHIA device/command prefix.

use std::{fmt, ops::Deref};

pub mod buttons;
pub mod control;
pub mod inbound;
pub mod sysex;

pub use buttons::{ButtonId, LightState};
pub use control::{
    encode_control, encode_control_checked, encode_encoder_event, handshake_initiate,
    handshake_restart, handshake_terminate, set_button_light,
};
pub use inbound::{decode_device_message, DeviceMessage, EncoderAxis, HandshakeAck};
pub use sysex::{
    checked_mixer_value, encode_display_text, encode_mixer_info, encode_mixer_report,
    DisplayText, MixerInfoKind, MixerPayload, MixerReport, TrackSlot, MAX_DISPLAY_CHARS,
};

pub const SYSEX_START: u8 = 0xF0;
pub const SYSEX_END: u8 = 0xF7;

/// Control change on MIDI channel 16; every short frame carries it.
pub const CONTROL_STATUS: u8 = 0xBF;

/// Preamble shared by every long frame.
pub const NIHIA_HEADER: [u8; 10] = [
    SYSEX_START,
    0x00,
    0x21,
    0x09,
    0x00,
    0x00,
    0x44,
    0x43,
    0x01,
    0x00,
];

/// Command bytes that follow [`NIHIA_HEADER`] in a display text frame.
pub const DISPLAY_TEXT_COMMAND: [u8; 2] = [0x48, 0x00];

/// Number of display/mixer slots the device shows at once.
pub const TRACK_SLOTS: u8 = 8;

/// Data1 of the handshake commands.
pub const HANDSHAKE_HELLO: u8 = 0x01;
pub const HANDSHAKE_GOODBYE: u8 = 0x02;

/// A fully assembled frame, ready to be handed to the transport as one unit.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct WireMessage(Vec<u8>);

impl WireMessage {
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Self {
        WireMessage(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for WireMessage {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for WireMessage {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for WireMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for byte in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{:02X}", byte)?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Debug for WireMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WireMessage[{}]", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_message_displays_as_hex() {
        let msg = WireMessage::from_bytes(vec![0xF0, 0xBF, 0x01, 0x7F]);
        assert_eq!(msg.to_string(), "F0 BF 01 7F");
        assert_eq!(format!("{:?}", msg), "WireMessage[F0 BF 01 7F]");
    }

    #[test]
    fn header_carries_native_instruments_id() {
        assert_eq!(NIHIA_HEADER[0], SYSEX_START);
        assert_eq!(&NIHIA_HEADER[1..4], &[0x00, 0x21, 0x09]);
    }
}
