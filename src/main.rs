use anyhow::Context;
use clap::{ArgAction, Parser};
use crossbeam_channel as channel;
use std::{io::BufRead, path::PathBuf, thread};

use op1_live_bridge::{
    ctrl_surf::Op1,
    daw::sandbox::Session,
    midi::port::{Direction, InOutManager},
    bridge::Request,
    Bridge, Settings,
};

/// Drive a DAW session from a Teenage Engineering OP-1.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device input port (full name or prefix)
    #[arg(long)]
    input_port: Option<String>,

    /// Device output port (full name or prefix)
    #[arg(long)]
    output_port: Option<String>,

    /// Increase verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// List available MIDI ports and exit
    #[arg(long)]
    list_ports: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())
        .context("Loading settings")?;
    if let Some(input_port) = args.input_port {
        settings.input_port = input_port;
    }
    if let Some(output_port) = args.output_port {
        settings.output_port = output_port;
    }
    settings.validate()?;

    let log_level = match args.verbose {
        0 => settings.log_level(),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(log_level).init();

    log::info!(
        "{} {} starting",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let (midi_tx, midi_rx) = channel::unbounded();
    let mut ports = InOutManager::try_new(settings.client_name.as_str().into(), midi_tx)
        .context("Creating MIDI client")?;
    ports.refresh().context("Listing MIDI ports")?;

    if args.list_ports {
        println!("{}:", Direction::In);
        for name in ports.ins.list() {
            println!("  {name}");
        }
        println!("{}:", Direction::Out);
        for name in ports.outs.list() {
            println!("  {name}");
        }

        return Ok(());
    }

    ports
        .connect(Direction::In, &settings.input_port)
        .with_context(|| format!("Connecting {}", Direction::In))?;
    ports
        .connect(Direction::Out, &settings.output_port)
        .with_context(|| format!("Connecting {}", Direction::Out))?;

    let mut daw = demo_session();
    let (op1, startup) = Op1::new(settings.surface_config(), &mut daw);
    let bridge = Bridge::new(ports, Box::new(op1), startup, daw);

    let (req_tx, req_rx) = channel::unbounded();
    thread::spawn(move || {
        println!("Enter 'r' to reconnect the OP-1, an empty line to quit");
        for line in std::io::stdin().lock().lines() {
            let request = match line.as_deref().map(str::trim) {
                Ok("r") => Request::ResetControlSurface,
                _ => Request::Shutdown,
            };
            if req_tx.send(request).is_err() || request == Request::Shutdown {
                return;
            }
        }
        let _ = req_tx.send(Request::Shutdown);
    });

    let mut bridge = bridge.run_loop(midi_rx, settings.tick_interval(), req_rx);
    bridge.out_mut().disconnect();

    log::info!("Exiting");

    Ok(())
}

/// A small in-memory session to drive from the device.
fn demo_session() -> Session {
    let mut session = Session::new();

    for name in ["intro", "verse", "chorus", "outro"] {
        session.add_scene(name);
    }

    for (name, can_be_armed) in [
        ("drums", true),
        ("bass", true),
        ("keys", true),
        ("lead synth", true),
        ("fx", false),
    ] {
        session.add_track(name, can_be_armed);
    }

    session.set_clip(0, 0, Some(0xff_00_00));
    session.set_clip(0, 1, Some(0xff_00_00));
    session.set_clip(1, 1, Some(0x00_ff_00));
    session.set_clip(2, 2, Some(0xff_ff_00));
    session.set_clip(3, 2, Some(0x00_00_ff));
    session.select_track(Some(0));

    session
}
