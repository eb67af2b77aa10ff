//! Command-line argument parsing for the chat client.

use crate::models::DialogMode;

/// Model used when `--model` is not given
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Options for a chat invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatArgs {
    pub model: String,
    pub mode: DialogMode,
    pub title: Option<String>,
    /// Wait for the whole reply instead of streaming
    pub no_stream: bool,
    pub prompt: String,
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// List stored dialogs for a model
    ListDialogs { model: String },
    /// Send a prompt
    Chat(ChatArgs),
    /// Arguments could not be parsed
    Invalid(String),
}

/// Usage text printed by `--help` and on invalid arguments
pub const USAGE: &str = "\
Usage: cyf-chat [OPTIONS] PROMPT...

Options:
  -m, --model MODEL   Model to use
      --multi         Send recent messages as context
  -t, --title TITLE   Dialog title
      --no-stream     Wait for the complete reply
      --list          List stored dialogs for the model
  -V, --version       Print version
  -h, --help          Print this help

Environment:
  CYF_BASE_URL, CYF_TIMEOUT_SECS, CYF_CONTEXT_COUNT, CYF_CONTENT_POLICY,
  CYF_USER, CYF_PASSWORD, RUST_LOG";

/// Parse command-line arguments (including the program name).
///
/// # Examples
///
/// ```
/// use cyf_chat::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["cyf-chat".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut model = DEFAULT_MODEL.to_string();
    let mut mode = DialogMode::Single;
    let mut title = None;
    let mut no_stream = false;
    let mut list = false;
    let mut prompt: Vec<String> = Vec::new();

    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            "--model" | "-m" => match args.next() {
                Some(value) => model = value,
                None => return CliCommand::Invalid(format!("{} requires a value", arg)),
            },
            "--title" | "-t" => match args.next() {
                Some(value) => title = Some(value),
                None => return CliCommand::Invalid(format!("{} requires a value", arg)),
            },
            "--multi" => mode = DialogMode::Multi,
            "--no-stream" => no_stream = true,
            "--list" => list = true,
            "--" => {
                prompt.extend(args.by_ref());
            }
            other if other.starts_with('-') && other.len() > 1 => {
                return CliCommand::Invalid(format!("unknown option '{}'", other));
            }
            _ => prompt.push(arg),
        }
    }

    if list {
        return CliCommand::ListDialogs { model };
    }
    if prompt.is_empty() {
        return CliCommand::Invalid("missing PROMPT".to_string());
    }

    CliCommand::Chat(ChatArgs {
        model,
        mode,
        title,
        no_stream,
        prompt: prompt.join(" "),
    })
}
