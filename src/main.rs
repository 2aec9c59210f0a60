// turnstream - Streaming turn engine for an AI board assistant
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::Context as _;
use clap::Parser;
use std::fs::OpenOptions;
use turnstream::Cli;
use turnstream::client::{
    AgentRequest, ApiClient, ContentProvider as _, TurnSink as _, reduce_history,
};
use turnstream::error::EngineError;
use turnstream::mention::{
    EntityKind, EntityRef, SessionContext, expand_prompt, find_mention_tokens,
};
use turnstream::stream::ToolStatus;
use turnstream::turn::{Turn, TurnId, TurnRole};

#[allow(clippy::exit)]
fn main() {
    if let Err(err) = run() {
        if let Some(engine_error) = extract_engine_error(&err) {
            eprintln!("{engine_error}");
            eprintln!("{}", engine_error.user_message());
            std::process::exit(engine_error.exit_code());
        }
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_turn(cli))
}

async fn run_turn(cli: Cli) -> anyhow::Result<()> {
    let client = ApiClient::new(cli.base_url.clone());

    if let Some(model) = cli.model.as_deref() {
        let models = client.list_models().await.context("listing models")?;
        if !models.iter().any(|m| m.id == model) {
            let known: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
            anyhow::bail!("unknown model `{model}`; backend offers: {}", known.join(", "));
        }
    }

    let mut session = SessionContext::new();
    if let Some(organization_id) = cli.organization_id.as_deref() {
        let boards = client.list_boards(organization_id).await.context("listing boards")?;
        session.set_boards(boards.iter().map(EntityRef::from).collect());
    }
    if let Some(board_id) = cli.board_id.as_deref() {
        let queries = client.list_queries(board_id).await.context("listing queries")?;
        session.set_queries(queries.iter().map(EntityRef::from).collect());
    }

    seed_mentions(&cli.prompt, &mut session);
    let expanded = expand_prompt(&cli.prompt, &session, &client).await?;

    let mut chat = Vec::new();
    if let Some(chat_id) = cli.chat_id.as_deref() {
        chat = client.list_messages(chat_id).await.context("loading chat history")?;
    }

    let mut request = AgentRequest::new(expanded);
    request.context = cli.context;
    request.chat = reduce_history(&chat);
    request.board_id = cli.board_id.clone();
    request.query_id = cli.query_id.clone();
    request.datastore_id = cli.datastore_id.clone();
    request.chat_id = cli.chat_id.clone();
    request.organization_id = cli.organization_id.clone();
    request.model = cli.model.clone();

    if let Some(board_id) = cli.board_id.as_deref() {
        let code =
            client.fetch(EntityKind::Board, board_id).await.context("fetching board code")?;
        if !code.is_empty() {
            request.code = Some(code);
        }
    }

    let turn_id = TurnId::random();
    tracing::debug!(turn = %turn_id, "opening turn stream");

    let mut prior = Turn::open();
    let turn = client
        .stream_turn(&request, |next| {
            print_transition(&prior, next);
            prior = next.clone();
        })
        .await?;

    if turn.is_streaming {
        anyhow::bail!("stream ended without a terminal frame; partial turn discarded");
    }

    if let Some(chat_id) = cli.chat_id.as_deref() {
        let chat = TurnId::new(chat_id);
        client.append(&chat, TurnRole::User, &cli.prompt).await.context("saving user message")?;
        client
            .append(&chat, TurnRole::Assistant, &turn.content)
            .await
            .context("saving assistant message")?;
        tracing::info!(turn = %turn_id, chat_id, "turn persisted");
    }

    Ok(())
}

/// The composed prompt arrives whole, so the live completion step never
/// ran. Treat every `@name` token whose name exactly matches a known board
/// or query as if it had been committed from the dropdown.
fn seed_mentions(prompt: &str, session: &mut SessionContext) {
    for (_, _, name) in find_mention_tokens(prompt) {
        let entity = session
            .boards()
            .iter()
            .chain(session.queries().iter())
            .find(|entity| entity.name == name)
            .cloned();
        if let Some(entity) = entity {
            session.record_mention(&entity);
        }
    }
}

/// Print what changed between two turn states.
fn print_transition(prior: &Turn, next: &Turn) {
    if let Some(thinking) = next.thinking.as_deref()
        && prior.thinking.as_deref() != Some(thinking)
    {
        println!("thinking: {thinking}");
    }

    // Progress lines only append while streaming, so the new tail is
    // everything past what was already printed.
    if next.is_streaming && next.content.len() > prior.content.len() {
        for line in next.content[prior.content.len()..].lines() {
            if !line.is_empty() {
                println!("{line}");
            }
        }
    }

    for (index, record) in next.tool_calls.iter().enumerate() {
        if prior.tool_calls.get(index).map(|r| r.status) == Some(record.status) {
            continue;
        }
        match record.status {
            ToolStatus::Started => println!("tool {}: started", record.tool),
            ToolStatus::Success => println!("tool {}: ok", record.tool),
            ToolStatus::Error => {
                let detail = record.error.as_deref().unwrap_or("unknown error");
                println!("tool {}: error: {detail}", record.tool);
            }
        }
    }

    if next.code_delta != prior.code_delta
        && let Some(delta) = &next.code_delta
    {
        println!("code updated ({} -> {} bytes)", delta.old_code.len(), delta.new_code.len());
    }

    if next.needs_user_input != prior.needs_user_input
        && let Some(request) = &next.needs_user_input
    {
        println!("input needed: {}", request.message);
        if let Some(error) = &request.error {
            println!("  cause: {error}");
        }
    }

    if prior.is_streaming && !next.is_streaming && !next.content.is_empty() {
        println!();
        println!("{}", next.content);
    }
}

fn extract_engine_error(err: &anyhow::Error) -> Option<EngineError> {
    err.chain().find_map(|cause| cause.downcast_ref::<EngineError>().cloned())
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let Some(path) = cli.log_file.as_ref() else {
        if std::env::var_os("RUST_LOG").is_some() {
            eprintln!(
                "RUST_LOG is set, but tracing is disabled without --log-file <PATH>. \
Use --log-file to enable diagnostics."
            );
        }
        return Ok(());
    };

    let directives = cli
        .log_filter
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_owned());
    let filter = tracing_subscriber::EnvFilter::try_new(directives.as_str())
        .map_err(|e| anyhow::anyhow!("invalid tracing filter `{directives}`: {e}"))?;

    let mut options = OpenOptions::new();
    options.create(true).write(true);
    if cli.log_append {
        options.append(true);
    } else {
        options.truncate(true);
    }
    let file = options
        .open(path)
        .map_err(|e| anyhow::anyhow!("failed to open log file {}: {e}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))?;

    tracing::info!(
        target: "diagnostics",
        version = env!("CARGO_PKG_VERSION"),
        log_file = %path.display(),
        log_filter = %directives,
        log_append = cli.log_append,
        "tracing enabled"
    );

    Ok(())
}
