//! PTZ webcam control with face tracking.

use anyhow::{bail, Result};
use clap::Parser;
use log::{info, warn};
use ptz_face_tracker::{
    app::PtzApp,
    cli::{Cli, Command, PresetAction},
    config::Config,
    constants::{control_spec, controls_in_group, ControlGroup},
    presets::apply_preset,
    v4l2::{list_devices, ControlGateway, SystemRunner, V4l2Control},
    values::CurrentValues,
};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(filter));

    let mut config = load_config(cli.config.as_deref());
    if let Some(device) = &cli.device {
        config.camera.device.clone_from(device);
    }
    config.validate()?;

    match cli.resolved_command() {
        Command::Run { track } => {
            let mut app = PtzApp::new(&config, track)?;
            app.run()?;
        }
        Command::Apply { preset } => {
            let values = config.preset_store().require_preset(&preset)?;
            let mut gateway = V4l2Control::new(config.camera.device.clone());
            println!("Applying preset '{}' to {}", preset, config.camera.device);
            for applied in apply_preset(&mut gateway, &values) {
                let status = if applied.ok { "OK" } else { "FAILED" };
                println!("  {}: {} [{}]", applied.control, applied.value, status);
            }
        }
        Command::Devices => {
            let devices = list_devices(&SystemRunner);
            if devices.is_empty() {
                println!("No video devices found");
            }
            for device in devices {
                println!("{}\t{}", device.path, device.name);
            }
        }
        Command::Controls => {
            let gateway = V4l2Control::new(config.camera.device.clone());
            let controls = gateway.list_controls();
            if controls.is_empty() {
                bail!("No controls reported by {}", config.camera.device);
            }
            for group in ControlGroup::ALL {
                println!("{}:", group.title());
                for spec in controls_in_group(group) {
                    match controls.get(spec.name) {
                        Some(range) => println!(
                            "  {}: min={} max={} default={}",
                            spec.name, range.min, range.max, range.default
                        ),
                        None => println!("  {}: (not reported)", spec.name),
                    }
                }
            }
            let others: Vec<_> = controls.iter().filter(|(name, _)| control_spec(name).is_none()).collect();
            if !others.is_empty() {
                println!("Other:");
                for (name, range) in others {
                    println!("  {name}: min={} max={} default={}", range.min, range.max, range.default);
                }
            }
        }
        Command::Presets { action } => {
            let store = config.preset_store();
            match action {
                PresetAction::List => {
                    for name in store.list_names() {
                        println!("{name}");
                    }
                }
                PresetAction::Save { name } => {
                    let gateway = V4l2Control::new(config.camera.device.clone());
                    let values = CurrentValues::seed_from(&gateway);
                    if values.is_empty() {
                        bail!("Could not read any control from {}", config.camera.device);
                    }
                    store.save_preset(&name, values.to_map())?;
                    println!("Saved preset '{}' ({} controls)", name, values.len());
                }
                PresetAction::Delete { name } => {
                    store.delete_preset(&name)?;
                    println!("Deleted preset '{name}'");
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };

    info!("Loading configuration from: {}", path.display());
    match Config::from_file(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config file: {}. Using defaults.", e);
            Config::default()
        }
    }
}
