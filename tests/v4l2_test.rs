//! Tests for the `v4l2-ctl` control gateway

use ptz_face_tracker::{
    v4l2::{list_devices, CommandOutput, CommandRunner, ControlGateway, ControlRange, SystemRunner, V4l2Control},
    Error, Result,
};
use std::{
    cell::RefCell,
    time::{Duration, Instant},
};

/// Runner that records invocations and answers from a script
#[derive(Default)]
struct FakeRunner {
    calls: RefCell<Vec<(String, Vec<String>, Duration)>>,
    reply: Option<(bool, String)>,
}

impl FakeRunner {
    fn replying(success: bool, stdout: &str) -> Self {
        Self {
            calls: RefCell::default(),
            reply: Some((success, stdout.to_string())),
        }
    }

    fn unavailable() -> Self {
        Self::default()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput> {
        self.calls
            .borrow_mut()
            .push((program.to_string(), args.to_vec(), timeout));
        match &self.reply {
            Some((success, stdout)) => Ok(CommandOutput {
                success: *success,
                stdout: stdout.clone(),
            }),
            None => Err(Error::HardwareUnavailable("v4l2-ctl not installed".to_string())),
        }
    }
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn test_get_sends_device_and_control() {
    let runner = FakeRunner::replying(true, "pan_absolute: -36000\n");
    let value = V4l2Control::with_runner("/dev/video2", &runner).get("pan_absolute");
    assert_eq!(value, Some(-36_000));

    let calls = runner.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "v4l2-ctl");
    assert_eq!(calls[0].1, args(&["-d", "/dev/video2", "--get-ctrl", "pan_absolute"]));
    assert_eq!(calls[0].2, Duration::from_secs(2));
}

#[test]
fn test_set_formats_assignment() {
    let runner = FakeRunner::replying(true, "");
    let mut gateway = V4l2Control::with_runner("/dev/video0", &runner);
    assert!(gateway.set("pan_absolute", -3_600));

    let calls = runner.calls.borrow();
    assert_eq!(calls[0].1, args(&["-d", "/dev/video0", "--set-ctrl", "pan_absolute=-3600"]));
    assert_eq!(calls[0].2, Duration::from_secs(2));
}

#[test]
fn test_set_device_retargets_requests() {
    let runner = FakeRunner::replying(true, "");
    let mut gateway = V4l2Control::with_runner("/dev/video0", &runner);
    gateway.set_device("/dev/video4");
    gateway.set("zoom_absolute", 10);
    assert_eq!(runner.calls.borrow()[0].1[1], "/dev/video4");
}

#[test]
fn test_nonzero_exit_is_failure() {
    let mut gateway = V4l2Control::with_runner("/dev/video0", FakeRunner::replying(false, "brightness: 75"));
    assert_eq!(gateway.get("brightness"), None);
    assert!(!gateway.set("brightness", 75));
    assert!(gateway.list_controls().is_empty());
}

#[test]
fn test_malformed_output_is_failure() {
    let gateway = V4l2Control::with_runner("/dev/video0", FakeRunner::replying(true, "unknown control"));
    assert_eq!(gateway.get("brightness"), None);
}

#[test]
fn test_unavailable_tool_is_absorbed() {
    let mut gateway = V4l2Control::with_runner("/dev/video0", FakeRunner::unavailable());
    assert_eq!(gateway.get("brightness"), None);
    assert!(!gateway.set("brightness", 10));
    assert!(gateway.list_controls().is_empty());
}

#[test]
fn test_list_controls_uses_longer_timeout() {
    let stdout = "\
                     brightness 0x00980900 (int)    : min=0 max=100 step=1 default=50 value=50
                  zoom_absolute 0x009a090d (int)    : min=0 max=100 step=1 default=50 value=50 flags=volatile
";
    let runner = FakeRunner::replying(true, stdout);
    let controls = V4l2Control::with_runner("/dev/video0", &runner).list_controls();

    assert_eq!(controls.len(), 2);
    assert_eq!(controls["zoom_absolute"], ControlRange { min: 0, max: 100, default: 50 });
    let calls = runner.calls.borrow();
    assert_eq!(calls[0].1, args(&["-d", "/dev/video0", "--list-ctrls"]));
    assert_eq!(calls[0].2, Duration::from_secs(5));
}

#[test]
fn test_list_devices_parses_tool_output() {
    let runner = FakeRunner::replying(true, "Meet Cam (usb-1):\n\t/dev/video0\n\t/dev/video1\n");
    let devices = list_devices(&runner);
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[1].path, "/dev/video1");
    assert_eq!(devices[1].name, "Meet Cam (usb-1)");
    assert_eq!(runner.calls.borrow()[0].1, args(&["--list-devices"]));
}

#[test]
fn test_list_devices_falls_back_to_probing() {
    for device in list_devices(&FakeRunner::unavailable()) {
        assert!(device.path.starts_with("/dev/video"));
        assert!(device.name.starts_with("Camera "));
    }
}

#[cfg(unix)]
#[test]
fn test_system_runner_times_out() {
    let start = Instant::now();
    let result = SystemRunner.run("sleep", &args(&["5"]), Duration::from_millis(100));
    assert!(matches!(result, Err(Error::HardwareUnavailable(_))));
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[cfg(unix)]
#[test]
fn test_system_runner_captures_stdout() {
    let output = SystemRunner
        .run("echo", &args(&["brightness: 42"]), Duration::from_secs(2))
        .unwrap();
    assert!(output.success);
    assert_eq!(output.stdout.trim(), "brightness: 42");
}

#[cfg(unix)]
#[test]
fn test_system_runner_reads_output_larger_than_pipe_buffer() {
    let output = SystemRunner
        .run("sh", &args(&["-c", "yes ptz | head -c 200000"]), Duration::from_secs(5))
        .unwrap();
    assert!(output.success);
    assert_eq!(output.stdout.len(), 200_000);
}
