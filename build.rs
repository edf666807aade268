//! Embeds the installer version for log headers.
use std::process::Command;

fn main() {
    // Prefer SOUNDNESS_INSTALLER_VERSION if set (e.g., by the release workflow),
    // otherwise fall back to git describe for local development builds.
    if let Ok(version) = std::env::var("SOUNDNESS_INSTALLER_VERSION") {
        println!("cargo:rustc-env=SOUNDNESS_INSTALLER_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=SOUNDNESS_INSTALLER_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=SOUNDNESS_INSTALLER_VERSION");
}
