use color_eyre::eyre::eyre;
use color_eyre::Result;
use tokio_util::sync::CancellationToken;

use cyf_chat::adapters::ReqwestHttpClient;
use cyf_chat::cli::{parse_args, version_string, ChatArgs, CliCommand, StreamPrinter, USAGE};
use cyf_chat::controller::{ChatStreamController, StreamOutcome};
use cyf_chat::error::ChatError;
use cyf_chat::models::Credentials;
use cyf_chat::session::ChatSession;
use cyf_chat::startup::{init_tracing, ClientConfig};

type Controller = ChatStreamController<ReqwestHttpClient>;

/// Cancel `token` on Ctrl+C. Ignores the error if a handler is already set.
fn setup_interrupt_handler(token: &CancellationToken) {
    let token = token.clone();
    let _ = ctrlc::set_handler(move || {
        token.cancel();
    });
}

fn report(err: ChatError) -> color_eyre::Report {
    tracing::debug!(code = err.error_code(), "{}", err);
    eyre!("{}\nHint: {}", err.user_message(), err.recovery_hint())
}

async fn run_chat(controller: Controller, args: ChatArgs, credentials: &Credentials) -> Result<()> {
    let mut session = ChatSession::new(controller, args.model).with_mode(args.mode);
    if let Some(title) = args.title {
        session.conversation_mut().set_title(title);
    }

    if args.no_stream {
        let msg = session
            .send_once(&args.prompt, credentials)
            .await
            .map_err(report)?;
        if let Some(reply) = session.conversation().get(msg) {
            println!("{}", reply.content);
        }
        return Ok(());
    }

    let cancel = CancellationToken::new();
    setup_interrupt_handler(&cancel);

    let mut printer = StreamPrinter::new(std::io::stdout(), cancel.clone());
    let (_, outcome) = session
        .send_with(&args.prompt, credentials, &cancel, &mut printer)
        .await
        .map_err(report)?;
    if let Some(err) = printer.take_error() {
        return Err(eyre!("Could not write the reply: {}", err));
    }
    println!();

    match outcome {
        StreamOutcome::Completed => {}
        StreamOutcome::Closed => eprintln!("(connection closed before the reply finished)"),
        StreamOutcome::Cancelled => eprintln!("(cancelled)"),
    }
    Ok(())
}

async fn list_dialogs(controller: Controller, model: &str, credentials: &Credentials) -> Result<()> {
    let dialogs = controller
        .list_dialogs(model, credentials)
        .await
        .map_err(report)?;
    if dialogs.is_empty() {
        println!("No dialogs for {}", model);
    }
    for dialog in dialogs {
        println!("{:>6}  {:<32}  {}", dialog.id, dialog.title, dialog.update_time);
    }
    Ok(())
}

fn main() -> Result<()> {
    let command = parse_args(std::env::args());
    match command {
        CliCommand::Version => {
            println!("{}", version_string());
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        CliCommand::Invalid(ref message) => {
            eprintln!("error: {}\n\n{}", message, USAGE);
            std::process::exit(2);
        }
        CliCommand::ListDialogs { .. } | CliCommand::Chat(_) => {}
    }

    color_eyre::install()?;
    init_tracing();

    let config = ClientConfig::from_env()?;
    let credentials = Credentials::from_env();
    let client = ReqwestHttpClient::with_connect_timeout(config.request_timeout)?;
    let controller = ChatStreamController::new(client, config);

    let runtime = tokio::runtime::Runtime::new()?;
    match command {
        CliCommand::ListDialogs { model } => {
            runtime.block_on(list_dialogs(controller, &model, &credentials))
        }
        CliCommand::Chat(args) => runtime.block_on(run_chat(controller, args, &credentials)),
        _ => Ok(()),
    }
}
