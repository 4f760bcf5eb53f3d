//! Button and light tables.
//!
//! Every button resolves to one data1 value. The 4D encoder motion events share
//! their axis' data1 and fix data2 as well (1 for one direction, 127 for the other).

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::error::NihiaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ButtonId {
    Play,
    Restart,
    Rec,
    CountIn,
    Stop,
    Clear,
    Loop,
    Metro,
    Tempo,
    Undo,
    Redo,
    Quantize,
    Auto,
    Mute,
    Solo,
    EncoderButton,
    ShiftEncoderButton,
    EncoderRight,
    EncoderLeft,
    EncoderUp,
    EncoderDown,
    EncoderPlus,
    EncoderMinus,
    EncoderHorizontal,
    EncoderVertical,
    EncoderSpin,
}

impl ButtonId {
    pub const ALL: [ButtonId; 26] = [
        ButtonId::Play,
        ButtonId::Restart,
        ButtonId::Rec,
        ButtonId::CountIn,
        ButtonId::Stop,
        ButtonId::Clear,
        ButtonId::Loop,
        ButtonId::Metro,
        ButtonId::Tempo,
        ButtonId::Undo,
        ButtonId::Redo,
        ButtonId::Quantize,
        ButtonId::Auto,
        ButtonId::Mute,
        ButtonId::Solo,
        ButtonId::EncoderButton,
        ButtonId::ShiftEncoderButton,
        ButtonId::EncoderRight,
        ButtonId::EncoderLeft,
        ButtonId::EncoderUp,
        ButtonId::EncoderDown,
        ButtonId::EncoderPlus,
        ButtonId::EncoderMinus,
        ButtonId::EncoderHorizontal,
        ButtonId::EncoderVertical,
        ButtonId::EncoderSpin,
    ];

    pub fn data1(self) -> u8 {
        match self {
            ButtonId::Play => 16,
            ButtonId::Restart => 17,
            ButtonId::Rec => 18,
            ButtonId::CountIn => 19,
            ButtonId::Stop => 20,
            ButtonId::Clear => 21,
            ButtonId::Loop => 22,
            ButtonId::Metro => 23,
            ButtonId::Tempo => 24,
            ButtonId::Undo => 32,
            ButtonId::Redo => 33,
            ButtonId::Quantize => 34,
            ButtonId::Auto => 35,
            ButtonId::Mute => 67,
            ButtonId::Solo => 68,
            ButtonId::EncoderButton => 96,
            ButtonId::ShiftEncoderButton => 97,
            ButtonId::EncoderRight | ButtonId::EncoderLeft | ButtonId::EncoderHorizontal => 50,
            ButtonId::EncoderUp | ButtonId::EncoderDown | ButtonId::EncoderVertical => 48,
            ButtonId::EncoderPlus | ButtonId::EncoderMinus | ButtonId::EncoderSpin => 52,
        }
    }

    /// Data2 of the encoder motion events; `None` when the caller supplies it.
    pub fn fixed_data2(self) -> Option<u8> {
        match self {
            ButtonId::EncoderRight | ButtonId::EncoderDown | ButtonId::EncoderPlus => Some(1),
            ButtonId::EncoderLeft | ButtonId::EncoderUp | ButtonId::EncoderMinus => Some(127),
            _ => None,
        }
    }

    pub fn is_motion_event(self) -> bool {
        self.fixed_data2().is_some()
    }

    /// Name as printed on the device, `COUNT_IN` for the Count-In button.
    pub fn name(self) -> &'static str {
        match self {
            ButtonId::Play => "PLAY",
            ButtonId::Restart => "RESTART",
            ButtonId::Rec => "REC",
            ButtonId::CountIn => "COUNT_IN",
            ButtonId::Stop => "STOP",
            ButtonId::Clear => "CLEAR",
            ButtonId::Loop => "LOOP",
            ButtonId::Metro => "METRO",
            ButtonId::Tempo => "TEMPO",
            ButtonId::Undo => "UNDO",
            ButtonId::Redo => "REDO",
            ButtonId::Quantize => "QUANTIZE",
            ButtonId::Auto => "AUTO",
            ButtonId::Mute => "MUTE",
            ButtonId::Solo => "SOLO",
            ButtonId::EncoderButton => "ENCODER_BUTTON",
            ButtonId::ShiftEncoderButton => "SHIFT+ENCODER_BUTTON",
            ButtonId::EncoderRight => "ENCODER_RIGHT",
            ButtonId::EncoderLeft => "ENCODER_LEFT",
            ButtonId::EncoderUp => "ENCODER_UP",
            ButtonId::EncoderDown => "ENCODER_DOWN",
            ButtonId::EncoderPlus => "ENCODER_PLUS",
            ButtonId::EncoderMinus => "ENCODER_MINUS",
            ButtonId::EncoderHorizontal => "ENCODER_HORIZONTAL",
            ButtonId::EncoderVertical => "ENCODER_VERTICAL",
            ButtonId::EncoderSpin => "ENCODER_SPIN",
        }
    }

    /// Reverse lookup for inbound frames. Only buttons with a data1 of their
    /// own resolve here; encoder axes are handled by the inbound decoder.
    pub fn from_data1(data1: u8) -> Option<ButtonId> {
        ButtonId::ALL
            .iter()
            .copied()
            .filter(|b| !b.is_motion_event())
            .filter(|b| {
                !matches!(
                    b,
                    ButtonId::EncoderHorizontal | ButtonId::EncoderVertical | ButtonId::EncoderSpin
                )
            })
            .find(|b| b.data1() == data1)
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ButtonId {
    type Err = NihiaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ButtonId::ALL
            .iter()
            .copied()
            .find(|b| b.name() == s)
            .ok_or_else(|| NihiaError::UnknownIdentifier {
                kind: "button",
                name: s.to_owned(),
            })
    }
}

impl TryFrom<String> for ButtonId {
    type Error = NihiaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The two selectable light levels of a button.
///
/// Transport buttons alternate between idle and highlighted; SHIFT-style buttons
/// between off and on. Both map onto the same two data2 values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "u8")]
pub enum LightState {
    Idle,
    Highlighted,
}

impl LightState {
    pub fn data2(self) -> u8 {
        match self {
            LightState::Idle => 0,
            LightState::Highlighted => 1,
        }
    }
}

impl TryFrom<u8> for LightState {
    type Error = NihiaError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LightState::Idle),
            1 => Ok(LightState::Highlighted),
            other => Err(NihiaError::UnknownIdentifier {
                kind: "light state",
                name: other.to_string(),
            }),
        }
    }
}

impl FromStr for LightState {
    type Err = NihiaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || NihiaError::UnknownIdentifier {
            kind: "light state",
            name: s.to_owned(),
        };
        match s.to_lowercase().as_str() {
            "idle" | "off" => Ok(LightState::Idle),
            "highlighted" | "on" => Ok(LightState::Highlighted),
            other => other
                .parse::<u8>()
                .map_err(|_| unknown())
                .and_then(LightState::try_from),
        }
    }
}
