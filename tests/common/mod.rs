#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    bitstore(repository_dir.path())
        .arg("init")
        .assert()
        .success();

    repository_dir
}

pub fn bitstore(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bitstore").expect("bitstore binary is built");
    cmd.current_dir(dir)
        .env_remove("BITSTORE_REPO")
        .env_remove("BITSTORE_VERIFY_READS");
    cmd
}

/// The reference git, isolated from the user's and system configuration
pub fn git(dir: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(dir)
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .args([
            "-c",
            "index.version=2",
            "-c",
            "feature.manyFiles=false",
            "-c",
            "index.skipHash=false",
            "-c",
            "init.defaultBranch=master",
        ]);
    cmd
}

pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

/// Skip the current test when git is not installed
#[macro_export]
macro_rules! require_git {
    () => {
        if !common::git_available() {
            eprintln!("git not found, skipping");
            return Ok(());
        }
    };
}

pub fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("command runs");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf-8 output")
}

// Helper function to create hexdump representation
pub fn to_hexdump(data: &[u8]) -> String {
    let mut result = String::new();
    for (i, chunk) in data.chunks(16).enumerate() {
        result.push_str(&format!("{:08x}: ", i * 16));

        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                result.push(' ');
            }
            result.push_str(&format!("{:02x} ", byte));
        }

        for j in chunk.len()..16 {
            if j == 8 {
                result.push(' ');
            }
            result.push_str("   ");
        }

        result.push_str(" |");
        for byte in chunk {
            if byte.is_ascii_graphic() {
                result.push(*byte as char);
            } else {
                result.push('.');
            }
        }
        result.push_str("|\n");
    }
    result
}

// Macro to compare index contents with hexdump output on failure
#[macro_export]
macro_rules! assert_index_eq {
    ($bitstore_content:expr, $git_content:expr) => {
        if $bitstore_content != $git_content {
            let bitstore_hexdump = common::to_hexdump($bitstore_content);
            let git_hexdump = common::to_hexdump($git_content);

            pretty_assertions::assert_eq!(
                bitstore_hexdump,
                git_hexdump,
                "\n=== INDEX CONTENTS DIFFER ===\nbitstore index ({} bytes) vs git index ({} bytes)",
                $bitstore_content.len(),
                $git_content.len()
            );
        }
    };
}
