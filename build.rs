//! Build script for detecting system dependencies and providing installation guidance.
//!
//! Checks for OpenCV (linked at build time) and `v4l2-ctl` (invoked at run
//! time) and prints hints when either is missing.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    check_opencv();
    check_v4l2_ctl();

    println!(
        "cargo:rustc-env=BUILD_TARGET={}",
        env::var("TARGET").unwrap_or_default()
    );
}

fn pkg_config_version(package: &str) -> Option<String> {
    let output = Command::new("pkg-config").args(["--modversion", package]).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn check_opencv() {
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");

    match pkg_config_version("opencv4").or_else(|| pkg_config_version("opencv")) {
        Some(version) => println!("cargo:warning=Found OpenCV version: {version}"),
        None => {
            println!("cargo:warning=OpenCV not found via pkg-config. Make sure OpenCV is installed.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install libopencv-dev clang libclang-dev");
        }
    }
}

fn check_v4l2_ctl() {
    // Only meaningful on Linux
    if !env::var("TARGET").unwrap_or_default().contains("linux") {
        return;
    }

    let found = Command::new("v4l2-ctl")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success());

    if !found {
        println!("cargo:warning=v4l2-ctl not found. Camera controls will be unavailable at run time.");
        println!("cargo:warning=On Ubuntu: sudo apt-get install v4l-utils");
    }
}
