//! Request scripts: a JSON array of requests replayed through a session.
//!
//! ```json
//! [
//!   { "op": "hello" },
//!   { "op": "light", "button": "PLAY", "state": 1 },
//!   { "op": "text", "slot": 0, "text": "Drums" },
//!   { "op": "report", "report": { "kind": "IS_MUTE", "track": 0, "flag": false } }
//! ]
//! ```

use std::{path::Path, sync::mpsc::Receiver, time::Duration};

use log::{debug, info};
use serde::Deserialize;

use crate::{
    error::{NihiaError, Result},
    protocol::{
        checked_mixer_value, encode_control_checked, ButtonId, DeviceMessage, LightState,
        MixerInfoKind, MixerReport, TrackSlot,
    },
    session::{DeviceSession, MidiSink, PendingHandshake},
};

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Hello,
    Goodbye,
    Restart,
    Light {
        button: ButtonId,
        state: LightState,
    },
    Encoder {
        button: ButtonId,
    },
    Control {
        data1: i64,
        data2: i64,
    },
    Text {
        slot: TrackSlot,
        text: String,
    },
    Mixer {
        kind: MixerInfoKind,
        track: TrackSlot,
        #[serde(default)]
        value: i64,
        #[serde(default)]
        info: Option<String>,
    },
    Report {
        report: MixerReport,
    },
}

impl Request {
    /// Sends the request. Hello and restart hand back the handshake still to be confirmed.
    pub fn apply<S: MidiSink>(
        &self,
        session: &mut DeviceSession<S>,
    ) -> Result<Option<PendingHandshake>> {
        match self {
            Request::Hello => return session.initiate().map(Some),
            Request::Restart => return session.restart_protocol().map(Some),
            Request::Goodbye => session.terminate()?,
            Request::Light { button, state } => session.set_button_light(*button, *state)?,
            Request::Encoder { button } => session.send_encoder_event(*button)?,
            Request::Control { data1, data2 } => {
                session.send_message(&encode_control_checked(*data1, *data2)?)?
            }
            Request::Text { slot, text } => session.show_text(*slot, text)?,
            Request::Mixer {
                kind,
                track,
                value,
                info,
            } => {
                let value = checked_mixer_value(*kind, *value)?;
                session.send_mixer_info(*kind, *track, value, info.as_deref())?
            }
            Request::Report { report } => session.report(report)?,
        }
        Ok(None)
    }
}

pub fn parse_script(json_str: &str) -> serde_json::Result<Vec<Request>> {
    serde_json::from_str::<Vec<Request>>(json_str)
}

pub fn load_script(path: &Path) -> Result<Vec<Request>> {
    let invalid = |reason: String| NihiaError::InvalidScript {
        path: path.display().to_string(),
        reason,
    };
    let json_str = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let requests = parse_script(&json_str).map_err(|e| invalid(e.to_string()))?;
    info!("...Loaded {} requests OK", requests.len());
    Ok(requests)
}

/// Replays `requests` in order and stops at the first failure. Handshakes are
/// confirmed against `inbound` when one is given.
pub fn run_script<S: MidiSink>(
    session: &mut DeviceSession<S>,
    requests: &[Request],
    inbound: Option<&Receiver<DeviceMessage>>,
    handshake_timeout: Duration,
) -> Result<()> {
    for (i, request) in requests.iter().enumerate() {
        debug!("Request #{}: {:?}", i, request);
        if let Some(pending) = request.apply(session)? {
            match inbound {
                Some(rx) => {
                    session.complete_handshake(pending, rx, handshake_timeout)?;
                }
                None => debug!("Not waiting for handshake acknowledgement"),
            }
        }
    }
    Ok(())
}
