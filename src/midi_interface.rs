use std::sync::mpsc::Sender;

use log::{debug, info, warn};
use midi_msg::{MidiMsg, ReceiverContext};
use midir::{Ignore, MidiIO, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

use crate::{
    error::{NihiaError, Result},
    protocol::{decode_device_message, DeviceMessage},
    session::MidiSink,
};

const CLIENT_NAME: &str = "nihia-host";

/// Which output port to talk to: an index into the output list, or part of the port name.
/// The input port is always resolved from the chosen output's name.
#[derive(Debug, Clone)]
pub enum PortSelector {
    Index(usize),
    Name(String),
}

impl MidiSink for MidiOutputConnection {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        MidiOutputConnection::send(self, bytes)
            .map_err(|e| NihiaError::TransportUnavailable(e.to_string()))
    }
}

fn transport_error(e: impl std::fmt::Display) -> NihiaError {
    NihiaError::TransportUnavailable(e.to_string())
}

fn port_names<T: MidiIO>(io: &T) -> Result<Vec<String>> {
    io.ports()
        .iter()
        .map(|p| io.port_name(p).map_err(transport_error))
        .collect()
}

/// Input and output port names, each list numbered on its own.
pub fn list_midi_ports() -> Result<(Vec<String>, Vec<String>)> {
    let mut midi_input = MidiInput::new(CLIENT_NAME).map_err(transport_error)?;
    midi_input.ignore(Ignore::None);
    let midi_output = MidiOutput::new(CLIENT_NAME).map_err(transport_error)?;
    Ok((port_names(&midi_input)?, port_names(&midi_output)?))
}

pub fn find_port(names: &[String], selector: &PortSelector) -> Option<usize> {
    match selector {
        PortSelector::Index(index) => (*index < names.len()).then_some(*index),
        PortSelector::Name(name) => {
            let wanted = name.to_lowercase();
            names
                .iter()
                .position(|n| n.to_lowercase().contains(&wanted))
        }
    }
}

/// Port name without case and without a trailing in/out marker, so that
/// "KK DAW Output" and "KK DAW Input" compare equal.
fn port_base_name(name: &str) -> String {
    let mut base = name.trim().to_lowercase();
    for suffix in ["output", "input", "out", "in"] {
        if let Some(stripped) = base.strip_suffix(suffix) {
            if stripped.is_empty() || stripped.ends_with(|c: char| !c.is_alphanumeric()) {
                base = stripped.to_owned();
                break;
            }
        }
    }
    base.trim_end_matches(|c: char| !c.is_alphanumeric())
        .to_owned()
}

/// Index of the input port that belongs to the same device as `output_name`.
pub fn matching_input(output_name: &str, input_names: &[String]) -> Option<usize> {
    input_names
        .iter()
        .position(|n| n == output_name)
        .or_else(|| {
            let wanted = port_base_name(output_name);
            input_names
                .iter()
                .position(|n| port_base_name(n) == wanted)
        })
}

/// Opens the selected output port, returning the connection and the port's name.
pub fn open_output(selector: &PortSelector) -> Result<(MidiOutputConnection, String)> {
    let midi_output = MidiOutput::new(CLIENT_NAME).map_err(transport_error)?;
    let names = port_names(&midi_output)?;
    let index = find_port(&names, selector)
        .ok_or_else(|| NihiaError::PortNotFound(format!("for output {:?}", selector)))?;
    let port = midi_output
        .ports()
        .get(index)
        .cloned()
        .ok_or_else(|| NihiaError::PortNotFound(format!("at output index {}", index)))?;
    let port_name = names[index].clone();

    let connection = midi_output
        .connect(&port, "nihia-out")
        .map_err(|e| transport_error(format!("{:?}: {}", port_name, e)))?;
    info!("MIDI connection open, writing output to '{}'.", port_name);
    Ok((connection, port_name))
}

/// Opens the input port of the device whose output is `output_name` and forwards
/// every decoded NIHIA message. The returned connection must be kept alive for as
/// long as messages are wanted.
pub fn listen_for_device(
    output_name: &str,
    tx: Sender<DeviceMessage>,
) -> Result<MidiInputConnection<()>> {
    let mut midi_input = MidiInput::new(CLIENT_NAME).map_err(transport_error)?;
    midi_input.ignore(Ignore::None);
    let names = port_names(&midi_input)?;
    let index = matching_input(output_name, &names).ok_or_else(|| {
        NihiaError::PortNotFound(format!("for input matching output {:?}", output_name))
    })?;
    let port = midi_input
        .ports()
        .get(index)
        .cloned()
        .ok_or_else(|| NihiaError::PortNotFound(format!("at input index {}", index)))?;
    let port_name = names[index].clone();

    let mut ctx = ReceiverContext::new();
    let connection = midi_input
        .connect(
            &port,
            "nihia-in",
            move |_stamp, midi_bytes, _| match decode_device_message(midi_bytes) {
                Ok(msg) => {
                    if tx.send(msg).is_err() {
                        debug!("Device message dropped, nobody is listening");
                    }
                }
                Err(e) => match MidiMsg::from_midi_with_context(midi_bytes, &mut ctx) {
                    Ok((msg, _len)) => debug!("Ignoring non-NIHIA MIDI message: {:?}", msg),
                    Err(parse_error) => {
                        warn!("{}; not MIDI either: {:?}", e, parse_error)
                    }
                },
            },
            (),
        )
        .map_err(|e| transport_error(format!("{:?}: {}", port_name, e)))?;

    info!("MIDI connection open, reading input from '{}'.", port_name);
    Ok(connection)
}
