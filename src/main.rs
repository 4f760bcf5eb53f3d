use std::{
    sync::mpsc::{self, Receiver},
    time::Duration,
};

use anyhow::anyhow;
use clap::Parser;
use env_logger::Env;
use log::{debug, info, warn};
use nihia_host::{
    midi_interface::{list_midi_ports, listen_for_device, open_output},
    protocol::{checked_mixer_value, encode_control_checked, DeviceMessage, TrackSlot},
    script::{load_script, run_script},
    DeviceSession, MidiSink, PendingHandshake,
};
use settings::{Cli, Command};

mod settings;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level))
        .filter_module("midir", log::LevelFilter::Warn)
        .init();

    let handshake_timeout = Duration::from_millis(cli.handshake_timeout_ms);

    if runs_offline(&cli) {
        if cli.dry_run {
            warn!("Dry run; no MIDI port is opened");
        }
        let mut session = DeviceSession::new(Vec::<Vec<u8>>::new());
        run_command(&cli.command, &mut session, None, handshake_timeout)?;
        for frame in session.into_sink() {
            println!("{:02X?}", frame);
        }
        return Ok(());
    }

    let selector = cli.port_selector();
    let (output, output_name) = open_output(&selector)?;
    let (device_tx, device_rx) = mpsc::channel();
    // the input connection has to stay alive until the command is done
    let _input = listen_for_device(&output_name, device_tx)?;

    let mut session = DeviceSession::new(output);
    run_command(&cli.command, &mut session, Some(&device_rx), handshake_timeout)
}

/// Listing ports needs no connection, so it runs like a dry run.
fn runs_offline(cli: &Cli) -> bool {
    cli.dry_run || matches!(cli.command, Command::Ports)
}

fn run_command<S: MidiSink>(
    command: &Command,
    session: &mut DeviceSession<S>,
    inbound: Option<&Receiver<DeviceMessage>>,
    handshake_timeout: Duration,
) -> anyhow::Result<()> {
    match command {
        Command::Ports => print_ports()?,
        Command::Hello { no_wait } => {
            let pending = session.initiate()?;
            await_handshake(session, pending, inbound, *no_wait, handshake_timeout)?;
        }
        Command::Goodbye => session.terminate()?,
        Command::Restart { no_wait } => {
            let pending = session.restart_protocol()?;
            await_handshake(session, pending, inbound, *no_wait, handshake_timeout)?;
        }
        Command::Light { button, state } => session.set_button_light(*button, *state)?,
        Command::Control { data1, data2 } => {
            session.send_message(&encode_control_checked(*data1, *data2)?)?
        }
        Command::Text { slot, text } => session.show_text(TrackSlot::new(*slot)?, text)?,
        Command::Mixer {
            kind,
            track,
            value,
            info,
        } => {
            let value = checked_mixer_value(*kind, *value)?;
            session.send_mixer_info(*kind, TrackSlot::new(*track)?, value, info.as_deref())?
        }
        Command::Script { path } => {
            let requests = load_script(path)?;
            run_script(session, &requests, inbound, handshake_timeout)?;
        }
        Command::Monitor => {
            let rx = inbound.ok_or_else(|| anyhow!("monitor needs a MIDI input"))?;
            let pending = session.initiate()?;
            session.complete_handshake(pending, rx, handshake_timeout)?;
            info!("Monitoring device; Ctrl+C to quit");
            for msg in rx.iter() {
                info!("<- {:?}", msg);
                session.handle_device_message(&msg);
                if msg == DeviceMessage::Goodbye {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn print_ports() -> anyhow::Result<()> {
    let (inputs, outputs) = list_midi_ports()?;
    println!("\nAvailable input ports:");
    for (i, name) in inputs.iter().enumerate() {
        println!("{}: {}", i, name);
    }
    println!("\nAvailable output ports (--midi.port picks from these):");
    for (i, name) in outputs.iter().enumerate() {
        println!("{}: {}", i, name);
    }
    Ok(())
}

fn await_handshake<S: MidiSink>(
    session: &mut DeviceSession<S>,
    pending: PendingHandshake,
    inbound: Option<&Receiver<DeviceMessage>>,
    no_wait: bool,
    handshake_timeout: Duration,
) -> anyhow::Result<()> {
    match inbound {
        Some(rx) if !no_wait => {
            session.complete_handshake(pending, rx, handshake_timeout)?;
        }
        _ => debug!("Not waiting for handshake acknowledgement ({:?})", pending),
    }
    Ok(())
}
