//! Long sysex frames: display text slots and mixer track reports.

use std::{fmt, str::FromStr};

use log::{trace, warn};
use serde::Deserialize;

use super::{WireMessage, DISPLAY_TEXT_COMMAND, NIHIA_HEADER, SYSEX_END, TRACK_SLOTS};
use crate::error::{NihiaError, Result};

/// Characters the device shows in one display slot.
pub const MAX_DISPLAY_CHARS: usize = 11;

/// One of the eight display/mixer slots, 0 being the leftmost knob.
///
/// Slot 0 also carries temporary messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "u8")]
pub struct TrackSlot(u8);

impl TrackSlot {
    pub fn new(index: u8) -> Result<Self> {
        if index < TRACK_SLOTS {
            Ok(TrackSlot(index))
        } else {
            Err(NihiaError::InvalidByteValue {
                field: "track slot",
                value: index as i64,
            })
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = TrackSlot> {
        (0..TRACK_SLOTS).map(TrackSlot)
    }
}

impl TryFrom<u8> for TrackSlot {
    type Error = NihiaError;

    fn try_from(value: u8) -> Result<Self> {
        TrackSlot::new(value)
    }
}

impl fmt::Display for TrackSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Text for a display slot, already reduced to one byte per character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayText {
    bytes: Vec<u8>,
    truncated: bool,
}

impl DisplayText {
    /// Keeps the first [`MAX_DISPLAY_CHARS`] characters; anything longer is cut
    /// without an error. Only the kept characters must fit in a byte.
    pub fn new(text: &str) -> Result<Self> {
        let mut bytes = Vec::with_capacity(MAX_DISPLAY_CHARS);
        for (position, character) in text.chars().take(MAX_DISPLAY_CHARS).enumerate() {
            let code = u8::try_from(u32::from(character)).map_err(|_| {
                NihiaError::NonEncodableCharacter {
                    character,
                    position,
                }
            })?;
            bytes.push(code);
        }
        let truncated = text.chars().nth(MAX_DISPLAY_CHARS).is_some();
        Ok(DisplayText { bytes, truncated })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn was_truncated(&self) -> bool {
        self.truncated
    }
}

pub fn encode_display_text(slot: TrackSlot, text: &str) -> Result<WireMessage> {
    let text = DisplayText::new(text)?;
    if text.was_truncated() {
        warn!(
            "display text for slot {} cut to {} characters",
            slot, MAX_DISPLAY_CHARS
        );
    }

    let mut buf = Vec::with_capacity(
        NIHIA_HEADER.len() + DISPLAY_TEXT_COMMAND.len() + 2 + text.bytes.len(),
    );
    buf.extend_from_slice(&NIHIA_HEADER);
    buf.extend_from_slice(&DISPLAY_TEXT_COMMAND);
    buf.push(slot.index());
    buf.extend_from_slice(text.as_bytes());
    buf.push(SYSEX_END);

    let msg = WireMessage::from_bytes(buf);
    trace!("display text frame {}", msg);
    Ok(msg)
}

/// The kinds of fact that can be reported about a mixer track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum MixerInfoKind {
    Volume,
    Pan,
    IsMute,
    IsSolo,
    Name,
    /// Tracks that do not exist keep the Mute and Solo buttons dark.
    Exist,
    Selected,
}

impl MixerInfoKind {
    pub const ALL: [MixerInfoKind; 7] = [
        MixerInfoKind::Volume,
        MixerInfoKind::Pan,
        MixerInfoKind::IsMute,
        MixerInfoKind::IsSolo,
        MixerInfoKind::Name,
        MixerInfoKind::Exist,
        MixerInfoKind::Selected,
    ];

    pub fn identifier(self) -> u8 {
        match self {
            MixerInfoKind::Volume => 70,
            MixerInfoKind::Pan => 71,
            MixerInfoKind::IsMute => 67,
            MixerInfoKind::IsSolo => 68,
            MixerInfoKind::Name => 72,
            MixerInfoKind::Exist => 64,
            MixerInfoKind::Selected => 66,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MixerInfoKind::Volume => "VOLUME",
            MixerInfoKind::Pan => "PAN",
            MixerInfoKind::IsMute => "IS_MUTE",
            MixerInfoKind::IsSolo => "IS_SOLO",
            MixerInfoKind::Name => "NAME",
            MixerInfoKind::Exist => "EXIST",
            MixerInfoKind::Selected => "SELECTED",
        }
    }

    /// Flag kinds carry 0/1 in the value byte; the rest carry text.
    pub fn is_flag(self) -> bool {
        matches!(
            self,
            MixerInfoKind::IsMute
                | MixerInfoKind::IsSolo
                | MixerInfoKind::Exist
                | MixerInfoKind::Selected
        )
    }
}

impl fmt::Display for MixerInfoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MixerInfoKind {
    type Err = NihiaError;

    fn from_str(s: &str) -> Result<Self> {
        MixerInfoKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| NihiaError::UnknownIdentifier {
                kind: "mixer info kind",
                name: s.to_owned(),
            })
    }
}

impl TryFrom<String> for MixerInfoKind {
    type Error = NihiaError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Raw mixer report. `info` is sent as its UTF-8 bytes, not one byte per character.
pub fn encode_mixer_info(
    kind: MixerInfoKind,
    track: TrackSlot,
    value: u8,
    info: Option<&str>,
) -> WireMessage {
    let info = info.map(str::as_bytes).unwrap_or_default();

    let mut buf = Vec::with_capacity(NIHIA_HEADER.len() + 4 + info.len());
    buf.extend_from_slice(&NIHIA_HEADER);
    buf.push(kind.identifier());
    buf.push(value);
    buf.push(track.index());
    buf.extend_from_slice(info);
    buf.push(SYSEX_END);

    let msg = WireMessage::from_bytes(buf);
    trace!("mixer {} frame {}", kind, msg);
    msg
}

/// Value byte for a raw report arriving as a wider integer; flag kinds only take 0 or 1.
pub fn checked_mixer_value(kind: MixerInfoKind, value: i64) -> Result<u8> {
    let max = if kind.is_flag() { 1 } else { u8::MAX as i64 };
    if (0..=max).contains(&value) {
        Ok(value as u8)
    } else {
        Err(NihiaError::InvalidByteValue {
            field: "mixer value",
            value,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MixerPayload {
    Flag(bool),
    /// Track name, or the display string of a volume or pan value.
    Text(String),
}

/// A mixer fact whose payload has been checked against its kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "MixerReportFields")]
pub struct MixerReport {
    kind: MixerInfoKind,
    track: TrackSlot,
    payload: MixerPayload,
}

impl MixerReport {
    pub fn new(kind: MixerInfoKind, track: TrackSlot, payload: MixerPayload) -> Result<Self> {
        match (&payload, kind.is_flag()) {
            (MixerPayload::Flag(_), true) | (MixerPayload::Text(_), false) => {
                Ok(MixerReport {
                    kind,
                    track,
                    payload,
                })
            }
            (MixerPayload::Flag(_), false) => Err(NihiaError::MismatchedPayload {
                kind: kind.name(),
                expected: "text",
            }),
            (MixerPayload::Text(_), true) => Err(NihiaError::MismatchedPayload {
                kind: kind.name(),
                expected: "flag",
            }),
        }
    }

    pub fn volume(track: TrackSlot, volume: impl Into<String>) -> Self {
        MixerReport::text(MixerInfoKind::Volume, track, volume.into())
    }

    pub fn pan(track: TrackSlot, pan: impl Into<String>) -> Self {
        MixerReport::text(MixerInfoKind::Pan, track, pan.into())
    }

    pub fn name(track: TrackSlot, name: impl Into<String>) -> Self {
        MixerReport::text(MixerInfoKind::Name, track, name.into())
    }

    pub fn mute(track: TrackSlot, muted: bool) -> Self {
        MixerReport::flag(MixerInfoKind::IsMute, track, muted)
    }

    pub fn solo(track: TrackSlot, soloed: bool) -> Self {
        MixerReport::flag(MixerInfoKind::IsSolo, track, soloed)
    }

    pub fn exist(track: TrackSlot, exists: bool) -> Self {
        MixerReport::flag(MixerInfoKind::Exist, track, exists)
    }

    pub fn selected(track: TrackSlot, selected: bool) -> Self {
        MixerReport::flag(MixerInfoKind::Selected, track, selected)
    }

    fn text(kind: MixerInfoKind, track: TrackSlot, text: String) -> Self {
        MixerReport {
            kind,
            track,
            payload: MixerPayload::Text(text),
        }
    }

    fn flag(kind: MixerInfoKind, track: TrackSlot, flag: bool) -> Self {
        MixerReport {
            kind,
            track,
            payload: MixerPayload::Flag(flag),
        }
    }

    pub fn kind(&self) -> MixerInfoKind {
        self.kind
    }

    pub fn track(&self) -> TrackSlot {
        self.track
    }

    pub fn payload(&self) -> &MixerPayload {
        &self.payload
    }
}

#[derive(Deserialize)]
struct MixerReportFields {
    kind: MixerInfoKind,
    track: TrackSlot,
    #[serde(default)]
    flag: Option<bool>,
    #[serde(default)]
    text: Option<String>,
}

impl TryFrom<MixerReportFields> for MixerReport {
    type Error = NihiaError;

    fn try_from(fields: MixerReportFields) -> Result<Self> {
        let expected = if fields.kind.is_flag() { "flag" } else { "text" };
        let payload = match (fields.flag, fields.text) {
            (Some(flag), None) => MixerPayload::Flag(flag),
            (None, Some(text)) => MixerPayload::Text(text),
            _ => {
                return Err(NihiaError::MismatchedPayload {
                    kind: fields.kind.name(),
                    expected,
                })
            }
        };
        MixerReport::new(fields.kind, fields.track, payload)
    }
}

pub fn encode_mixer_report(report: &MixerReport) -> WireMessage {
    match &report.payload {
        MixerPayload::Flag(flag) => {
            encode_mixer_info(report.kind, report.track, u8::from(*flag), None)
        }
        MixerPayload::Text(text) => encode_mixer_info(report.kind, report.track, 0, Some(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISPLAY_HEADER: [u8; 12] = [
        0xF0, 0x00, 0x21, 0x09, 0x00, 0x00, 0x44, 0x43, 0x01, 0x00, 0x48, 0x00,
    ];

    fn slot(index: u8) -> TrackSlot {
        TrackSlot::new(index).unwrap()
    }

    fn display_body(msg: &WireMessage) -> &[u8] {
        assert_eq!(&msg[..12], &DISPLAY_HEADER);
        assert_eq!(msg.last(), Some(&SYSEX_END));
        &msg[13..msg.len() - 1]
    }

    #[test]
    fn track_slots_stop_at_seven() {
        assert_eq!(slot(7).index(), 7);
        assert_eq!(
            TrackSlot::new(8),
            Err(NihiaError::InvalidByteValue {
                field: "track slot",
                value: 8
            })
        );
        assert_eq!(TrackSlot::all().count(), 8);
    }

    #[test]
    fn display_text_frame_layout() {
        let msg = encode_display_text(slot(3), "Kick").unwrap();
        let mut expected = DISPLAY_HEADER.to_vec();
        expected.extend_from_slice(&[3, b'K', b'i', b'c', b'k', 0xF7]);
        assert_eq!(msg.as_bytes(), expected.as_slice());
    }

    #[test]
    fn display_text_of_ten_and_eleven_characters_is_sent_whole() {
        let ten = encode_display_text(slot(0), "HELLOWORLD").unwrap();
        assert_eq!(display_body(&ten), b"HELLOWORLD");

        let eleven = encode_display_text(slot(0), "HELLOWORLD!").unwrap();
        assert_eq!(display_body(&eleven), b"HELLOWORLD!");
    }

    #[test]
    fn display_text_longer_than_eleven_characters_is_cut() {
        let eleven = encode_display_text(slot(0), "HELLOWORLD!").unwrap();
        let twelve = encode_display_text(slot(0), "HELLOWORLD!!").unwrap();
        assert_eq!(eleven, twelve);

        let long = encode_display_text(slot(1), "A much longer track title").unwrap();
        assert_eq!(display_body(&long), b"A much long");
    }

    #[test]
    fn display_text_uses_one_byte_per_code_point() {
        let msg = encode_display_text(slot(2), "Café").unwrap();
        assert_eq!(display_body(&msg), &[b'C', b'a', b'f', 0xE9]);
    }

    #[test]
    fn display_text_rejects_wide_characters() {
        assert_eq!(
            encode_display_text(slot(0), "Bass ♪"),
            Err(NihiaError::NonEncodableCharacter {
                character: '♪',
                position: 5
            })
        );
        // only the characters that survive truncation are checked
        assert!(encode_display_text(slot(0), "ABCDEFGHIJK♪").is_ok());
    }

    #[test]
    fn empty_display_text() {
        let msg = encode_display_text(slot(4), "").unwrap();
        assert!(display_body(&msg).is_empty());
        assert_eq!(msg.len(), 14);
    }

    #[test]
    fn mixer_identifiers_match_the_device_table() {
        let table = [
            ("VOLUME", 70),
            ("PAN", 71),
            ("IS_MUTE", 67),
            ("IS_SOLO", 68),
            ("NAME", 72),
            ("EXIST", 64),
            ("SELECTED", 66),
        ];
        assert_eq!(table.len(), MixerInfoKind::ALL.len());
        for (name, identifier) in table {
            let kind: MixerInfoKind = name.parse().unwrap();
            assert_eq!(kind.identifier(), identifier, "{name}");
            let msg = encode_mixer_info(kind, slot(5), 0, None);
            assert_eq!(&msg.as_bytes()[10..], &[identifier, 0, 5, 0xF7], "{name} frame");
        }
    }

    #[test]
    fn mixer_identifiers_are_unique() {
        let mut ids: Vec<u8> = MixerInfoKind::ALL.iter().map(|k| k.identifier()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), MixerInfoKind::ALL.len());
    }

    #[test]
    fn mute_report_without_text() {
        let msg = encode_mixer_info(MixerInfoKind::IsMute, slot(3), 1, None);
        assert_eq!(
            msg.as_bytes(),
            &[0xF0, 0x00, 0x21, 0x09, 0x00, 0x00, 0x44, 0x43, 0x01, 0x00, 0x43, 0x01, 0x03, 0xF7]
        );
    }

    #[test]
    fn name_report_carries_utf8_text() {
        let msg = encode_mixer_info(MixerInfoKind::Name, slot(2), 0, Some("Kick"));
        assert_eq!(&msg[..10], &NIHIA_HEADER);
        assert_eq!(&msg[10..13], &[72, 0, 0x02]);
        assert_eq!(&msg[13..msg.len() - 1], b"Kick");
        assert_eq!(msg.last(), Some(&0xF7));

        // unlike display text, names are not squeezed into one byte per character
        let msg = encode_mixer_info(MixerInfoKind::Name, slot(0), 0, Some("Café"));
        assert_eq!(&msg[13..msg.len() - 1], "Café".as_bytes());
    }

    #[test]
    fn typed_reports_encode_like_raw_ones() {
        assert_eq!(
            encode_mixer_report(&MixerReport::mute(slot(3), true)),
            encode_mixer_info(MixerInfoKind::IsMute, slot(3), 1, None)
        );
        assert_eq!(
            encode_mixer_report(&MixerReport::volume(slot(1), "-6.0 dB")),
            encode_mixer_info(MixerInfoKind::Volume, slot(1), 0, Some("-6.0 dB"))
        );
        assert_eq!(
            encode_mixer_report(&MixerReport::exist(slot(5), false)),
            encode_mixer_info(MixerInfoKind::Exist, slot(5), 0, None)
        );
    }

    #[test]
    fn raw_mixer_values() {
        assert_eq!(checked_mixer_value(MixerInfoKind::IsMute, 1), Ok(1));
        assert!(checked_mixer_value(MixerInfoKind::IsMute, 2).is_err());
        assert_eq!(checked_mixer_value(MixerInfoKind::Volume, 200), Ok(200));
        assert_eq!(
            checked_mixer_value(MixerInfoKind::Volume, 300),
            Err(NihiaError::InvalidByteValue {
                field: "mixer value",
                value: 300
            })
        );
    }

    #[test]
    fn report_payload_must_suit_its_kind() {
        assert_eq!(
            MixerReport::new(MixerInfoKind::Pan, slot(0), MixerPayload::Flag(true)),
            Err(NihiaError::MismatchedPayload {
                kind: "PAN",
                expected: "text"
            })
        );
        assert_eq!(
            MixerReport::new(MixerInfoKind::IsSolo, slot(0), MixerPayload::Text("yes".into())),
            Err(NihiaError::MismatchedPayload {
                kind: "IS_SOLO",
                expected: "flag"
            })
        );
    }

    #[test]
    fn reports_deserialize_with_validation() {
        let report: MixerReport =
            serde_json::from_str(r#"{"kind": "SELECTED", "track": 6, "flag": true}"#).unwrap();
        assert_eq!(report, MixerReport::selected(slot(6), true));

        assert!(serde_json::from_str::<MixerReport>(
            r#"{"kind": "NAME", "track": 0, "flag": true}"#
        )
        .is_err());
        assert!(serde_json::from_str::<MixerReport>(
            r#"{"kind": "NAME", "track": 9, "text": "Keys"}"#
        )
        .is_err());
        assert!(serde_json::from_str::<MixerReport>(
            r#"{"kind": "GAIN", "track": 0, "text": "0 dB"}"#
        )
        .is_err());
    }
}
