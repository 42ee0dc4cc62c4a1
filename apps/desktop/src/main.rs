use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{Dialogs, PageController, PageDocument, PostsClient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Drive the postbox pages from the command line")]
struct Args {
    /// Base URL of the site that serves `config.json`.
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    site_url: String,
    /// Write the rendered page here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill the send form and submit it.
    Send {
        /// Form input as `name=value`; repeatable.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Render every stored record.
    Show,
    /// Clear all stored records.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    if name.trim().is_empty() {
        return Err(format!("empty field name in '{raw}'"));
    }
    Ok((name.trim().to_string(), value.to_string()))
}

struct TerminalDialogs {
    assume_yes: bool,
}

impl Dialogs for TerminalDialogs {
    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{message} [y/N] ");
        if let Err(err) = io::stderr().flush() {
            warn!(%err, "failed to flush prompt");
        }
        let mut answer = String::new();
        if let Err(err) = io::stdin().lock().read_line(&mut answer) {
            warn!(%err, "failed to read confirmation");
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }

    fn alert(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let client = PostsClient::new(&args.site_url)?;
    let mut page = match &args.command {
        Command::Send { .. } => PageDocument::index(),
        Command::Show | Command::Clear { .. } => PageDocument::receive(),
    };

    let outcome = run(client, &mut page, args.command).await;
    emit(&page, args.out.as_ref())?;
    outcome
}

async fn run(client: PostsClient, page: &mut PageDocument, command: Command) -> Result<()> {
    let controller = PageController::load(client, page)
        .await
        .context("failed to load site configuration")?;

    match command {
        Command::Send { fields } => {
            for (name, value) in &fields {
                page.set_input(client_core::page::POST_FORM, name, value);
            }
            let record = controller
                .submit(page)
                .await?
                .ok_or_else(|| anyhow!("page has no submission form"))?;
            info!(id = %record.id, "submitted");
        }
        Command::Show => {
            let shown = controller.render_received(page).await?;
            info!(records = ?shown, "rendered");
        }
        Command::Clear { yes } => {
            controller.render_received(page).await?;
            let mut dialogs = TerminalDialogs { assume_yes: yes };
            let cleared = controller.clear_all(page, &mut dialogs).await?;
            info!(cleared, "clear finished");
        }
    }
    Ok(())
}

fn emit(page: &PageDocument, out: Option<&PathBuf>) -> Result<()> {
    let html = page.render();
    match out {
        Some(path) => fs::write(path, html)
            .with_context(|| format!("failed to write page to '{}'", path.display())),
        None => {
            io::stdout().write_all(html.as_bytes())?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_value_fields() {
        assert_eq!(
            parse_field("message=a=b").expect("field"),
            ("message".to_string(), "a=b".to_string())
        );
        assert!(parse_field("novalue").is_err());
        assert!(parse_field(" =x").is_err());
    }

    #[test]
    fn cli_accepts_repeated_fields() {
        let args = Args::try_parse_from([
            "desktop",
            "--site-url",
            "http://localhost:3000",
            "send",
            "--field",
            "name=Ann",
            "--field",
            "message=hi",
        ])
        .expect("args");
        match args.command {
            Command::Send { fields } => assert_eq!(fields.len(), 2),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn assumed_yes_skips_prompt() {
        let mut dialogs = TerminalDialogs { assume_yes: true };
        assert!(dialogs.confirm("sure?"));
    }
}
