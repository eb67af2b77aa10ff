//! CLI argument handling.

use cyf_chat::cli::{parse_args, version_string, CliCommand, DEFAULT_MODEL};
use cyf_chat::models::DialogMode;

fn args(list: &[&str]) -> impl Iterator<Item = String> {
    std::iter::once("cyf-chat".to_string())
        .chain(list.iter().map(|s| s.to_string()))
        .collect::<Vec<_>>()
        .into_iter()
}

#[test]
fn test_version_flag_wins_over_prompt() {
    assert_eq!(parse_args(args(&["hello", "--version"])), CliCommand::Version);
    assert!(version_string().contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_multi_turn_prompt() {
    match parse_args(args(&["--multi", "tell", "me", "more"])) {
        CliCommand::Chat(chat) => {
            assert_eq!(chat.mode, DialogMode::Multi);
            assert_eq!(chat.model, DEFAULT_MODEL);
            assert_eq!(chat.prompt, "tell me more");
        }
        other => panic!("Expected chat command, got {:?}", other),
    }
}

#[test]
fn test_help() {
    assert_eq!(parse_args(args(&["-h"])), CliCommand::Help);
}
