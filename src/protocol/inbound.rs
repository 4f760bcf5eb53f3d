//! Device to host frames.
//!
//! The device answers on the same channel-16 control change the host uses,
//! either as a plain `BF d1 d2` or wrapped like the outbound `F0 BF d1 d2`.
//! `d1 = 01` acknowledges the handshake and carries the protocol version in `d2`.

use log::debug;

use super::{
    ButtonId, CONTROL_STATUS, HANDSHAKE_GOODBYE, HANDSHAKE_HELLO, NIHIA_HEADER, SYSEX_END,
    SYSEX_START,
};
use crate::error::{NihiaError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeAck {
    pub version: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderAxis {
    Horizontal,
    Vertical,
    Spin,
}

impl EncoderAxis {
    pub fn from_data1(data1: u8) -> Option<EncoderAxis> {
        [EncoderAxis::Horizontal, EncoderAxis::Vertical, EncoderAxis::Spin]
            .into_iter()
            .find(|axis| axis.button().data1() == data1)
    }

    pub fn button(self) -> ButtonId {
        match self {
            EncoderAxis::Horizontal => ButtonId::EncoderHorizontal,
            EncoderAxis::Vertical => ButtonId::EncoderVertical,
            EncoderAxis::Spin => ButtonId::EncoderSpin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceMessage {
    HandshakeAck(HandshakeAck),
    Goodbye,
    /// A button with its own control number; `value` is the raw data2.
    Button { button: ButtonId, value: u8 },
    /// One of the encoder motion pseudo-events (ENCODER_LEFT, ENCODER_PLUS...).
    Encoder(ButtonId),
    /// An encoder axis value that is not one of the fixed motion events.
    EncoderAxis { axis: EncoderAxis, value: u8 },
    /// Body of a long NIHIA frame, between the header and the terminator.
    Sysex(Vec<u8>),
}

pub fn decode_device_message(bytes: &[u8]) -> Result<DeviceMessage> {
    let msg = match bytes {
        [CONTROL_STATUS, data1, data2] | [SYSEX_START, CONTROL_STATUS, data1, data2] => {
            decode_control(*data1, *data2)?
        }
        [.., SYSEX_END] if bytes.len() > NIHIA_HEADER.len() && bytes.starts_with(&NIHIA_HEADER) => {
            DeviceMessage::Sysex(bytes[NIHIA_HEADER.len()..bytes.len() - 1].to_vec())
        }
        _ => {
            return Err(NihiaError::MalformedMessage(format!(
                "unrecognised frame {:02X?}",
                bytes
            )))
        }
    };
    debug!("decoded device message {:?}", msg);
    Ok(msg)
}

fn decode_control(data1: u8, data2: u8) -> Result<DeviceMessage> {
    match data1 {
        HANDSHAKE_HELLO => Ok(DeviceMessage::HandshakeAck(HandshakeAck { version: data2 })),
        HANDSHAKE_GOODBYE => Ok(DeviceMessage::Goodbye),
        _ => {
            if let Some(axis) = EncoderAxis::from_data1(data1) {
                let motion = ButtonId::ALL
                    .iter()
                    .copied()
                    .find(|b| b.data1() == data1 && b.fixed_data2() == Some(data2));
                return Ok(match motion {
                    Some(button) => DeviceMessage::Encoder(button),
                    None => DeviceMessage::EncoderAxis { axis, value: data2 },
                });
            }
            ButtonId::from_data1(data1)
                .map(|button| DeviceMessage::Button {
                    button,
                    value: data2,
                })
                .ok_or_else(|| {
                    NihiaError::MalformedMessage(format!("unknown control number {}", data1))
                })
        }
    }
}
