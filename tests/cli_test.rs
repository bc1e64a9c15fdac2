//! Tests for command line parsing

use clap::Parser;
use ptz_face_tracker::cli::{Cli, Command, PresetAction};
use std::path::PathBuf;

#[test]
fn test_global_flags_before_and_after_subcommand() {
    let cli = Cli::try_parse_from(["ptz-face-tracker", "--device", "/dev/video2", "run", "--track"]).unwrap();
    assert_eq!(cli.device.as_deref(), Some("/dev/video2"));
    assert_eq!(cli.resolved_command(), Command::Run { track: true });

    let cli = Cli::try_parse_from(["ptz-face-tracker", "controls", "--debug", "-C", "ptz.yaml"]).unwrap();
    assert!(cli.debug);
    assert_eq!(cli.config, Some(PathBuf::from("ptz.yaml")));
    assert_eq!(cli.resolved_command(), Command::Controls);
}

#[test]
fn test_apply_defaults_to_default_preset() {
    let cli = Cli::try_parse_from(["ptz-face-tracker", "apply"]).unwrap();
    assert_eq!(
        cli.resolved_command(),
        Command::Apply {
            preset: "Default".to_string()
        }
    );

    let cli = Cli::try_parse_from(["ptz-face-tracker", "apply", "Evening"]).unwrap();
    assert_eq!(
        cli.resolved_command(),
        Command::Apply {
            preset: "Evening".to_string()
        }
    );
}

#[test]
fn test_preset_subcommands() {
    let cli = Cli::try_parse_from(["ptz-face-tracker", "presets", "save", "Studio"]).unwrap();
    assert_eq!(
        cli.resolved_command(),
        Command::Presets {
            action: PresetAction::Save {
                name: "Studio".to_string()
            }
        }
    );

    let cli = Cli::try_parse_from(["ptz-face-tracker", "presets", "list"]).unwrap();
    assert_eq!(
        cli.resolved_command(),
        Command::Presets {
            action: PresetAction::List
        }
    );

    assert!(Cli::try_parse_from(["ptz-face-tracker", "presets", "delete"]).is_err());
}

#[test]
fn test_devices_and_unknown_subcommand() {
    let cli = Cli::try_parse_from(["ptz-face-tracker", "devices"]).unwrap();
    assert_eq!(cli.resolved_command(), Command::Devices);
    assert!(Cli::try_parse_from(["ptz-face-tracker", "fly"]).is_err());
}
