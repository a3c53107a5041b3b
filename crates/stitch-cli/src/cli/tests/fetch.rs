//! Tests for the default download invocation and exit-code mapping.

use super::parse;
use crate::cli::commands::run_forget;
use crate::cli::{exit_code_for, Cli};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use stitch_core::playlist::ParseError;
use stitch_core::registry::{JobRegistry, MemoryStore, PersistMode};
use stitch_core::session::{exit_code, SessionError};

#[test]
fn cli_parse_url_only() {
    let cli = parse(&["stitch", "http://host/a/index.m3u8"]);
    assert!(cli.command.is_none());
    assert_eq!(cli.fetch.url.as_deref(), Some("http://host/a/index.m3u8"));
    assert!(cli.fetch.working_dir.is_none());
    assert!(cli.fetch.output_dir.is_none());
    assert!(!cli.fetch.overwrite);
    assert!(cli.fetch.remux_tool.is_none());
}

#[test]
fn cli_parse_url_and_dir_with_flags() {
    let cli = parse(&[
        "stitch",
        "https://host/a/index.m3u8",
        "episode1",
        "--output-dir",
        "/tmp/out",
        "--overwrite",
        "--remux-tool",
        "ffmpeg",
    ]);
    assert!(cli.command.is_none());
    assert_eq!(cli.fetch.working_dir.as_deref(), Some("episode1"));
    assert_eq!(cli.fetch.output_dir, Some(PathBuf::from("/tmp/out")));
    assert!(cli.fetch.overwrite);
    assert_eq!(cli.fetch.remux_tool, Some(PathBuf::from("ffmpeg")));
}

#[test]
fn cli_requires_url_without_subcommand() {
    assert!(Cli::try_parse_from(["stitch"]).is_err());
    assert!(Cli::try_parse_from(["stitch", "--overwrite"]).is_err());
}

#[test]
fn cli_rejects_extra_positional() {
    assert!(Cli::try_parse_from(["stitch", "http://h/i.m3u8", "dir", "extra"]).is_err());
}

#[test]
fn session_errors_map_to_their_exit_code() {
    let err = anyhow::Error::new(SessionError::Parse(ParseError::NoSegments));
    assert_eq!(exit_code_for(&err), exit_code::PARSE);

    let wrapped = Err::<(), _>(SessionError::Parse(ParseError::EmptyManifest))
        .context("running session")
        .unwrap_err();
    assert_eq!(exit_code_for(&wrapped), exit_code::PARSE);
}

#[test]
fn other_errors_are_general() {
    let err = anyhow::anyhow!("config file unreadable");
    assert_eq!(exit_code_for(&err), exit_code::GENERAL);
}

#[test]
fn forget_with_failing_registry_exits_with_registry_code() {
    let root = tempfile::tempdir().unwrap();
    let store = MemoryStore::new();
    let mut reg = JobRegistry::open(store.clone());
    reg.put("http://h/i.m3u8", "job1").unwrap();
    store.set_fail_saves(true);

    let err = run_forget(&mut reg, root.path(), "http://h/i.m3u8", false).unwrap_err();
    assert_eq!(exit_code_for(&err), exit_code::REGISTRY);
    store.set_fail_saves(false);
}

#[test]
fn batched_flush_failure_exits_with_registry_code() {
    let store = MemoryStore::new();
    let mut reg = JobRegistry::open_with_mode(store.clone(), PersistMode::Batched);
    reg.put("http://h/i.m3u8", "job1").unwrap();
    store.set_fail_saves(true);

    let err = reg.flush().context("saving job registry").unwrap_err();
    assert_eq!(exit_code_for(&err), exit_code::REGISTRY);
    store.set_fail_saves(false);
}
