//! The short `F0 BF d1 d2` command channel: lights, handshake and encoder events.

use log::trace;

use super::{
    ButtonId, LightState, WireMessage, CONTROL_STATUS, HANDSHAKE_GOODBYE, HANDSHAKE_HELLO,
    SYSEX_START,
};
use crate::error::{NihiaError, Result};

/// Composes a short control frame. The status byte never changes, only the data bytes do.
pub fn encode_control(data1: u8, data2: u8) -> WireMessage {
    let msg = WireMessage::from_bytes(vec![SYSEX_START, CONTROL_STATUS, data1, data2]);
    trace!("control frame {}", msg);
    msg
}

/// Like [`encode_control`], for data bytes that arrive as wider integers
/// (command line, scripts).
pub fn encode_control_checked(data1: i64, data2: i64) -> Result<WireMessage> {
    let data1 = data_byte("data1", data1)?;
    let data2 = data_byte("data2", data2)?;
    Ok(encode_control(data1, data2))
}

fn data_byte(field: &'static str, value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| NihiaError::InvalidByteValue { field, value })
}

pub fn set_button_light(button: ButtonId, state: LightState) -> WireMessage {
    encode_control(button.data1(), state.data2())
}

/// Frame for one of the 4D encoder motion events, whose data2 is fixed.
pub fn encode_encoder_event(button: ButtonId) -> Result<WireMessage> {
    match button.fixed_data2() {
        Some(data2) => Ok(encode_control(button.data1(), data2)),
        None => Err(NihiaError::UnknownIdentifier {
            kind: "encoder motion event",
            name: button.name().to_owned(),
        }),
    }
}

pub fn handshake_initiate() -> WireMessage {
    encode_control(HANDSHAKE_HELLO, 1)
}

pub fn handshake_terminate() -> WireMessage {
    encode_control(HANDSHAKE_GOODBYE, 1)
}

/// Goodbye followed by hello. The order matters to the device.
pub fn handshake_restart() -> [WireMessage; 2] {
    [handshake_terminate(), handshake_initiate()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_frames() {
        assert_eq!(handshake_initiate().as_bytes(), &[0xF0, 0xBF, 0x01, 0x01]);
        assert_eq!(handshake_terminate().as_bytes(), &[0xF0, 0xBF, 0x02, 0x01]);
    }

    #[test]
    fn restart_says_goodbye_first() {
        let [first, second] = handshake_restart();
        assert_eq!(first, handshake_terminate());
        assert_eq!(second, handshake_initiate());
    }

    #[test]
    fn button_light_frames() {
        let highlighted = [
            (ButtonId::Rec, 18),
            (ButtonId::Stop, 20),
            (ButtonId::Tempo, 24),
            (ButtonId::Auto, 35),
            (ButtonId::Mute, 67),
            (ButtonId::Solo, 68),
            (ButtonId::ShiftEncoderButton, 97),
            (ButtonId::EncoderSpin, 52),
        ];
        for (button, data1) in highlighted {
            assert_eq!(
                set_button_light(button, LightState::Highlighted).as_bytes(),
                &[0xF0, 0xBF, data1, 1],
                "{button}"
            );
            assert_eq!(
                set_button_light(button, LightState::Idle).as_bytes(),
                &[0xF0, 0xBF, data1, 0],
                "{button}"
            );
        }
    }

    #[test]
    fn every_encoder_event_frame() {
        let events = [
            (ButtonId::EncoderRight, [0xF0, 0xBF, 50, 1]),
            (ButtonId::EncoderLeft, [0xF0, 0xBF, 50, 127]),
            (ButtonId::EncoderUp, [0xF0, 0xBF, 48, 127]),
            (ButtonId::EncoderDown, [0xF0, 0xBF, 48, 1]),
            (ButtonId::EncoderPlus, [0xF0, 0xBF, 52, 1]),
            (ButtonId::EncoderMinus, [0xF0, 0xBF, 52, 127]),
        ];
        for (button, frame) in events {
            assert_eq!(encode_encoder_event(button).unwrap().as_bytes(), &frame, "{button}");
        }
    }

    #[test]
    fn play_light() {
        assert_eq!(
            set_button_light(ButtonId::Play, LightState::Highlighted).as_bytes(),
            &[0xF0, 0xBF, 16, 1]
        );
        assert_eq!(
            set_button_light(ButtonId::CountIn, LightState::Idle).as_bytes(),
            &[0xF0, 0xBF, 19, 0]
        );
    }

    #[test]
    fn encoder_events() {
        assert_eq!(
            encode_encoder_event(ButtonId::EncoderLeft).unwrap().as_bytes(),
            &[0xF0, 0xBF, 50, 127]
        );
        assert_eq!(
            encode_encoder_event(ButtonId::EncoderDown).unwrap().as_bytes(),
            &[0xF0, 0xBF, 48, 1]
        );
        assert!(matches!(
            encode_encoder_event(ButtonId::Stop),
            Err(NihiaError::UnknownIdentifier { .. })
        ));
    }

    #[test]
    fn checked_control_rejects_wide_values() {
        assert_eq!(
            encode_control_checked(255, 0).unwrap().as_bytes(),
            &[0xF0, 0xBF, 0xFF, 0x00]
        );
        assert_eq!(
            encode_control_checked(256, 0),
            Err(NihiaError::InvalidByteValue {
                field: "data1",
                value: 256
            })
        );
        assert_eq!(
            encode_control_checked(3, -1),
            Err(NihiaError::InvalidByteValue {
                field: "data2",
                value: -1
            })
        );
    }

    #[test]
    fn encoding_is_repeatable() {
        assert_eq!(
            set_button_light(ButtonId::Loop, LightState::Highlighted),
            set_button_light(ButtonId::Loop, LightState::Highlighted)
        );
    }
}
