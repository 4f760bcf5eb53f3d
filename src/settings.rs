use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nihia_host::{
    midi_interface::PortSelector,
    protocol::{ButtonId, LightState, MixerInfoKind},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[arg(long = "loglevel",default_value_t=String::from("info"))]
    pub log_level: String,

    /// Output port index (see `ports`); takes precedence over the port name.
    /// The input port is the one named like the chosen output
    #[arg(long = "midi.port")]
    pub midi_port: Option<usize>,

    /// Case-insensitive part of the device's MIDI output port name
    #[arg(long = "midi.name", default_value_t=String::from("komplete kontrol"))]
    pub midi_name: String,

    /// Milliseconds to wait for the device to acknowledge the handshake
    #[arg(long = "handshake.timeout", default_value_t = 2000)]
    pub handshake_timeout_ms: u64,

    /// Print the frames instead of opening any MIDI port
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn port_selector(&self) -> PortSelector {
        match self.midi_port {
            Some(index) => PortSelector::Index(index),
            None => PortSelector::Name(self.midi_name.clone()),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List MIDI input and output ports
    Ports,

    /// Switch the device into deep integration mode
    Hello {
        /// Do not wait for the device to acknowledge
        #[arg(long = "no-wait")]
        no_wait: bool,
    },

    /// Return the device to generic MIDI mode
    Goodbye,

    /// Goodbye then hello, for a device that behaves unexpectedly
    Restart {
        #[arg(long = "no-wait")]
        no_wait: bool,
    },

    /// Set a button light, e.g. `light PLAY 1` or `light COUNT_IN off`
    Light { button: ButtonId, state: LightState },

    /// Send a raw `F0 BF <data1> <data2>` frame
    Control {
        #[arg(allow_negative_numbers = true)]
        data1: i64,
        #[arg(allow_negative_numbers = true)]
        data2: i64,
    },

    /// Show text in one of the eight display slots
    Text { slot: u8, text: String },

    /// Report a mixer track fact, e.g. `mixer NAME 0 --info Drums`
    Mixer {
        kind: MixerInfoKind,
        track: u8,

        /// 0 or 1 for IS_MUTE, IS_SOLO, EXIST and SELECTED
        #[arg(long, default_value_t = 0)]
        value: i64,

        /// Text for NAME, VOLUME and PAN
        #[arg(long)]
        info: Option<String>,
    },

    /// Replay a JSON request script
    Script { path: PathBuf },

    /// Handshake, then log everything the device sends; Ctrl+C to quit
    Monitor,
}
