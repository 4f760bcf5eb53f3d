use std::{
    sync::mpsc::{Receiver, RecvTimeoutError},
    time::{Duration, Instant},
};

use log::{debug, info, trace, warn};

use crate::{
    error::{NihiaError, Result},
    protocol::{
        self, ButtonId, DeviceMessage, HandshakeAck, LightState, MixerInfoKind, MixerReport,
        TrackSlot, WireMessage,
    },
};

/// Anything that can deliver one complete frame to the device.
pub trait MidiSink {
    fn send(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Records every frame; what tests and dry runs send to.
impl MidiSink for Vec<Vec<u8>> {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.push(bytes.to_vec());
        Ok(())
    }
}

impl<S: MidiSink + ?Sized> MidiSink for &mut S {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes)
    }
}

impl<S: MidiSink + ?Sized> MidiSink for Box<S> {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingAck,
    Connected { version: u8 },
    Terminated,
}

/// A hello that has been sent but not yet answered.
#[derive(Debug)]
#[must_use = "the device has not confirmed the handshake yet"]
pub struct PendingHandshake {
    sent_at: Instant,
}

impl PendingHandshake {
    fn new() -> Self {
        PendingHandshake {
            sent_at: Instant::now(),
        }
    }

    /// Waits for the acknowledgement, counting from when the hello was sent.
    /// Anything else the device sends in the meantime is dropped.
    pub fn wait(
        self,
        inbound: &Receiver<DeviceMessage>,
        timeout: Duration,
    ) -> Result<HandshakeAck> {
        loop {
            let remaining = timeout
                .checked_sub(self.sent_at.elapsed())
                .ok_or(NihiaError::HandshakeTimeout(timeout))?;
            match inbound.recv_timeout(remaining) {
                Ok(DeviceMessage::HandshakeAck(ack)) => return Ok(ack),
                Ok(other) => debug!("Ignoring {:?} while waiting for handshake", other),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(NihiaError::HandshakeTimeout(timeout))
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(NihiaError::TransportUnavailable(
                        "MIDI input closed before the handshake was acknowledged".into(),
                    ))
                }
            }
        }
    }
}

/// Host side of one deep integration session.
///
/// Every request is encoded completely before anything reaches the sink, and each
/// frame is handed over in a single `send`, so a failed encode never leaves half
/// a message on the wire.
pub struct DeviceSession<S: MidiSink> {
    sink: S,
    state: SessionState,
}

impl<S: MidiSink> DeviceSession<S> {
    pub fn new(sink: S) -> Self {
        DeviceSession {
            sink,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Hands one already encoded frame to the sink.
    pub fn send_message(&mut self, msg: &WireMessage) -> Result<()> {
        trace!("-> {}", msg);
        self.sink.send(msg.as_bytes())
    }

    /// Wakes the device from MIDI mode. The device is only in deep integration
    /// mode once the returned handshake has been acknowledged.
    pub fn initiate(&mut self) -> Result<PendingHandshake> {
        self.send_message(&protocol::handshake_initiate())?;
        self.state = SessionState::AwaitingAck;
        debug!("Handshake sent, awaiting device acknowledgement");
        Ok(PendingHandshake::new())
    }

    /// Sends the goodbye; call before the host shuts down.
    pub fn terminate(&mut self) -> Result<()> {
        self.send_message(&protocol::handshake_terminate())?;
        self.state = SessionState::Terminated;
        debug!("Goodbye sent");
        Ok(())
    }

    /// Goodbye then hello, for when the device misbehaves. Nothing else from this
    /// session can be sent between the two frames.
    pub fn restart_protocol(&mut self) -> Result<PendingHandshake> {
        let [goodbye, hello] = protocol::handshake_restart();
        self.send_message(&goodbye)?;
        self.state = SessionState::Terminated;
        self.send_message(&hello)?;
        self.state = SessionState::AwaitingAck;
        debug!("Protocol restarted, awaiting device acknowledgement");
        Ok(PendingHandshake::new())
    }

    pub fn confirm(&mut self, ack: HandshakeAck) {
        if self.state != SessionState::AwaitingAck {
            warn!("Unexpected handshake acknowledgement in state {:?}", self.state);
        }
        info!("Deep integration active, device protocol version {}", ack.version);
        self.state = SessionState::Connected {
            version: ack.version,
        };
    }

    /// Waits for the acknowledgement of `pending` and marks the session connected.
    pub fn complete_handshake(
        &mut self,
        pending: PendingHandshake,
        inbound: &Receiver<DeviceMessage>,
        timeout: Duration,
    ) -> Result<HandshakeAck> {
        let ack = pending.wait(inbound, timeout)?;
        self.confirm(ack);
        Ok(ack)
    }

    /// Updates the session from an inbound message; device button events pass through.
    pub fn handle_device_message(&mut self, msg: &DeviceMessage) {
        match msg {
            DeviceMessage::HandshakeAck(ack) => self.confirm(*ack),
            DeviceMessage::Goodbye => {
                info!("Device left deep integration mode");
                self.state = SessionState::Terminated;
            }
            _ => {}
        }
    }

    pub fn send_control(&mut self, data1: u8, data2: u8) -> Result<()> {
        self.send_message(&protocol::encode_control(data1, data2))
    }

    pub fn set_button_light(&mut self, button: ButtonId, state: LightState) -> Result<()> {
        self.send_message(&protocol::set_button_light(button, state))
    }

    pub fn send_encoder_event(&mut self, button: ButtonId) -> Result<()> {
        let msg = protocol::encode_encoder_event(button)?;
        self.send_message(&msg)
    }

    pub fn show_text(&mut self, slot: TrackSlot, text: &str) -> Result<()> {
        let msg = protocol::encode_display_text(slot, text)?;
        self.send_message(&msg)
    }

    pub fn send_mixer_info(
        &mut self,
        kind: MixerInfoKind,
        track: TrackSlot,
        value: u8,
        info: Option<&str>,
    ) -> Result<()> {
        self.send_message(&protocol::encode_mixer_info(kind, track, value, info))
    }

    pub fn report(&mut self, report: &MixerReport) -> Result<()> {
        self.send_message(&protocol::encode_mixer_report(report))
    }
}
