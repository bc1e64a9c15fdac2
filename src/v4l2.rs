//! Hardware control gateway backed by the `v4l2-ctl` command-line tool.
//!
//! Every request shells out to `v4l2-ctl` with a short timeout so a wedged
//! device can never stall the per-frame loop for long. Failures are absorbed:
//! reads yield `None`, writes yield `false` and enumeration yields an empty map.

use crate::{
    constants::{CONTROL_TIMEOUT_MS, DEFAULT_DEVICE, LIST_TIMEOUT_MS},
    error::{Error, Result},
};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    collections::BTreeMap,
    io::Read,
    path::Path,
    process::{Child, Command, Stdio},
    thread,
    time::{Duration, Instant},
};

static GET_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r":\s*(-?\d+)").expect("valid get-ctrl pattern"));

static LIST_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\w+)\s.*min=(-?\d+)\s+max=(-?\d+).*default=(-?\d+)").expect("valid list-ctrls pattern")
});

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Range reported by the device for one control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRange {
    pub min: i32,
    pub max: i32,
    pub default: i32,
}

/// A capture device found on the system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDevice {
    /// Device node, e.g. `/dev/video0`
    pub path: String,
    /// Human readable card name
    pub name: String,
}

/// Exit status and captured stdout of a finished process
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
}

/// Runs an external program with a time bound.
///
/// Split out from [`V4l2Control`] so the text protocol can be exercised
/// without a camera attached.
pub trait CommandRunner {
    /// Run `program` with `args`, killing it once `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HardwareUnavailable`] when the program cannot be
    /// started or does not finish in time.
    fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput> {
        (**self).run(program, args, timeout)
    }
}

/// [`CommandRunner`] that spawns real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::HardwareUnavailable(format!("failed to start {program}: {e}")))?;

        // Drain stdout while waiting so a chatty child never blocks on a full pipe
        let reader = child.stdout.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut stdout = String::new();
                pipe.read_to_string(&mut stdout).map(|_| stdout)
            })
        });

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    reap(&mut child);
                    return Err(Error::HardwareUnavailable(format!(
                        "{program} timed out after {}ms",
                        timeout.as_millis()
                    )));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    reap(&mut child);
                    return Err(e.into());
                }
            }
        };

        let stdout = match reader {
            Some(handle) => handle
                .join()
                .map_err(|_| Error::HardwareUnavailable(format!("{program} output reader panicked")))??,
            None => String::new(),
        };

        Ok(CommandOutput {
            success: status.success(),
            stdout,
        })
    }
}

/// Kill and wait for a child that is being abandoned
fn reap(child: &mut Child) {
    // The process may exit between the check and the kill
    if let Err(e) = child.kill() {
        debug!("kill failed: {}", e);
    }
    if let Err(e) = child.wait() {
        debug!("wait failed: {}", e);
    }
}

/// Request/response access to a device's named integer controls
pub trait ControlGateway {
    /// Current value of `control`, or `None` when it cannot be read
    fn get(&self, control: &str) -> Option<i32>;

    /// Write `value` to `control`; `false` on any failure. Never retries.
    fn set(&mut self, control: &str, value: i32) -> bool;

    /// Controls the device advertises; empty when enumeration fails
    fn list_controls(&self) -> BTreeMap<String, ControlRange>;
}

/// `v4l2-ctl` wrapper for camera control
#[derive(Debug, Clone)]
pub struct V4l2Control<R: CommandRunner = SystemRunner> {
    device: String,
    runner: R,
}

impl V4l2Control<SystemRunner> {
    /// Create a gateway for `device` that shells out to `v4l2-ctl`
    #[must_use]
    pub fn new(device: impl Into<String>) -> Self {
        Self::with_runner(device, SystemRunner)
    }
}

impl Default for V4l2Control<SystemRunner> {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE)
    }
}

impl<R: CommandRunner> V4l2Control<R> {
    /// Create a gateway that issues its commands through `runner`
    pub fn with_runner(device: impl Into<String>, runner: R) -> Self {
        Self {
            device: device.into(),
            runner,
        }
    }

    /// Device node requests are sent to
    #[must_use]
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Retarget subsequent requests
    pub fn set_device(&mut self, device: impl Into<String>) {
        self.device = device.into();
        debug!("Control gateway now targets {}", self.device);
    }

    fn invoke(&self, request: &[&str], timeout_ms: u64) -> Option<String> {
        let mut args = vec!["-d".to_string(), self.device.clone()];
        args.extend(request.iter().map(|s| (*s).to_string()));

        match self.runner.run("v4l2-ctl", &args, Duration::from_millis(timeout_ms)) {
            Ok(output) if output.success => Some(output.stdout),
            Ok(_) => {
                debug!("v4l2-ctl {:?} on {} exited with failure", request, self.device);
                None
            }
            Err(e) => {
                warn!("v4l2-ctl {:?} on {}: {}", request, self.device, e);
                None
            }
        }
    }
}

impl<R: CommandRunner> ControlGateway for V4l2Control<R> {
    fn get(&self, control: &str) -> Option<i32> {
        self.invoke(&["--get-ctrl", control], CONTROL_TIMEOUT_MS)
            .and_then(|stdout| parse_get_output(&stdout))
    }

    fn set(&mut self, control: &str, value: i32) -> bool {
        let assignment = format!("{control}={value}");
        self.invoke(&["--set-ctrl", &assignment], CONTROL_TIMEOUT_MS).is_some()
    }

    fn list_controls(&self) -> BTreeMap<String, ControlRange> {
        self.invoke(&["--list-ctrls"], LIST_TIMEOUT_MS)
            .map(|stdout| parse_list_output(&stdout))
            .unwrap_or_default()
    }
}

/// Extract the integer from a `--get-ctrl` reply such as `brightness: 75`
#[must_use]
pub fn parse_get_output(stdout: &str) -> Option<i32> {
    GET_VALUE
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse `--list-ctrls` output into name -> (min, max, default)
#[must_use]
pub fn parse_list_output(stdout: &str) -> BTreeMap<String, ControlRange> {
    stdout
        .lines()
        .filter_map(|line| {
            let caps = LIST_LINE.captures(line)?;
            let range = ControlRange {
                min: caps[2].parse().ok()?,
                max: caps[3].parse().ok()?,
                default: caps[4].parse().ok()?,
            };
            Some((caps[1].to_string(), range))
        })
        .collect()
}

/// Parse `--list-devices` output.
///
/// Card names sit on unindented lines ending in `:`; the nodes that belong to
/// them follow on tab-indented lines.
#[must_use]
pub fn parse_device_list(stdout: &str) -> Vec<VideoDevice> {
    let mut devices = Vec::new();
    let mut current_name = "";

    for line in stdout.trim().lines() {
        if !line.starts_with('\t') {
            current_name = line.trim_end().trim_end_matches(':');
        } else if line.contains("/dev/video") {
            devices.push(VideoDevice {
                path: line.trim().to_string(),
                name: current_name.to_string(),
            });
        }
    }

    devices
}

/// List video devices, falling back to probing `/dev/video0..9` when
/// `v4l2-ctl` is unavailable
pub fn list_devices<R: CommandRunner>(runner: &R) -> Vec<VideoDevice> {
    let args = vec!["--list-devices".to_string()];
    match runner.run("v4l2-ctl", &args, Duration::from_millis(LIST_TIMEOUT_MS)) {
        Ok(output) if output.success => parse_device_list(&output.stdout),
        Ok(_) => Vec::new(),
        Err(e) => {
            warn!("Device enumeration failed ({}), probing /dev/video*", e);
            (0..10)
                .map(|i| (i, format!("/dev/video{i}")))
                .filter(|(_, path)| Path::new(path).exists())
                .map(|(i, path)| VideoDevice {
                    path,
                    name: format!("Camera {i}"),
                })
                .collect()
        }
    }
}
