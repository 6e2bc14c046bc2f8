//! Custom HID device simulator
//!
//! Runs the command dispatcher on a loopback endpoint, sends each opcode
//! given on the command line as a host packet, and prints the reply.

use anyhow::{Context, Result};
use clap::Parser;
use custom_hid_device::{
    cmd, CommandDispatcher, DeviceConfig, IndicatorId, SignalSource, SimulatedBoard,
};
use custom_hid_transport::protocol::{build_command, hex_dump};
use custom_hid_transport::LoopbackDriver;
use tracing::info;

mod cli;
use cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("custom_hid_device=debug".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DeviceConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DeviceConfig::default(),
    };

    if cli.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let source = match (cli.level, cli.sweep) {
        (Some(level), _) => SignalSource::Constant(level),
        (None, Some(step)) => SignalSource::Sweep { step },
        (None, None) => SignalSource::default(),
    };

    let driver = LoopbackDriver::new();
    let host = driver.host_port();
    let mut dispatcher = CommandDispatcher::new(driver, SimulatedBoard::new(source), config);
    dispatcher.initialize();
    info!("Simulated device ready on endpoint {}", dispatcher.config().endpoint);

    for &opcode in &cli.opcodes {
        host.send(&build_command(opcode, &[]))
            .with_context(|| format!("sending opcode 0x{opcode:02X}"))?;
        dispatcher.run_once();

        println!("> 0x{opcode:02X} {}", cmd::name(opcode));
        let Some(outcome) = dispatcher.last_outcome() else {
            continue;
        };
        println!("  {outcome}");
        if cli.no_read {
            continue;
        }
        match host.receive() {
            Some(reply) if outcome.is_reply() => println!("{}", hex_dump(&reply)),
            _ => println!("  no reply"),
        }
    }

    let indicators = dispatcher.config().indicators;
    let led = |id: IndicatorId| if dispatcher.board().indicator(id) { "on" } else { "off" };
    println!(
        "indicators: {}={} {}={}",
        indicators.primary.0,
        led(indicators.primary),
        indicators.secondary.0,
        led(indicators.secondary)
    );
    println!("{:?}", dispatcher.stats());
    Ok(())
}
