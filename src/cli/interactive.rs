//! Live converter session driven by line commands

use super::{rates, ui};
use crate::core::config::AppConfig;
use crate::core::refresh::RateRefresher;
use crate::core::{ConversionEngine, ConversionPair, RateProvider, Side};
use anyhow::{Context, Result, anyhow, bail};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

const HELP: &str = "\
Commands:
  <amount>        edit the focused amount
  1 <amount>      edit the first amount
  2 <amount>      edit the second amount
  clear           clear the focused amount
  from <CODE>     select the first currency
  to <CODE>       select the second currency
  swap            swap the two currencies
  list            list available currencies
  help            show this help
  quit            leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Text typed into a field; `None` targets the focused one.
    Amount(Option<Side>, String),
    Select(Side, String),
    Swap,
    List,
    Help,
    Redraw,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match (word.to_lowercase().as_str(), rest) {
        ("", _) => Command::Redraw,
        ("q" | "quit" | "exit", "") => Command::Quit,
        ("s" | "swap", "") => Command::Swap,
        ("ls" | "list", "") => Command::List,
        ("?" | "help", "") => Command::Help,
        ("clear", "") => Command::Amount(None, String::new()),
        ("from" | "to", "") => bail!("Missing currency code after '{word}'"),
        ("from", code) => Command::Select(Side::First, super::normalize_code(code)),
        ("to", code) => Command::Select(Side::Second, super::normalize_code(code)),
        ("1", text) if !text.is_empty() => Command::Amount(Some(Side::First), text.to_string()),
        ("2", text) if !text.is_empty() => Command::Amount(Some(Side::Second), text.to_string()),
        _ if line.starts_with(|c: char| c.is_ascii_digit() || c == '.') => {
            Command::Amount(None, line.to_string())
        }
        _ => return Err(anyhow!("Unknown command: {line}")),
    };
    Ok(command)
}

/// Applies one user command and returns the field that has focus afterwards.
///
/// Once rates are loaded only listed currencies can be selected; before the
/// first successful fetch any code is accepted.
pub fn apply_command(engine: &mut ConversionEngine, command: Command, focus: Side) -> Result<Side> {
    let focus = match command {
        Command::Amount(side, text) => {
            let side = side.unwrap_or(focus);
            engine.edit(side, &text);
            side
        }
        Command::Select(side, code) => {
            if !engine.rates().is_empty() && !engine.rates().contains(&code) {
                bail!("Unknown currency: {code}");
            }
            engine.select(side, code);
            focus
        }
        Command::Swap => engine.swap(),
        Command::List | Command::Help | Command::Redraw | Command::Quit => focus,
    };
    Ok(focus)
}

fn print_currencies(engine: &ConversionEngine) {
    if engine.rates().is_empty() {
        println!("{}", ui::style_text("No rates loaded yet", ui::StyleType::Subtle));
    } else {
        println!("{}", rates::build_rates_table(engine.rates(), engine.pair()));
    }
}

/// Runs the session until `quit` or end of input and returns the final state.
///
/// The engine is owned by this task; periodic refresh results arrive over a
/// channel and are applied in between user commands.
pub async fn run_session<R>(
    provider: Arc<dyn RateProvider>,
    config: &AppConfig,
    input: R,
) -> Result<ConversionEngine>
where
    R: AsyncBufRead + Unpin,
{
    let mut engine = ConversionEngine::new(ConversionPair::new(
        config.pair.from.clone(),
        config.pair.to.clone(),
    ));
    engine.apply_fetch(provider.fetch_rates(&config.base_currency).await);
    let mut focus = Side::First;
    println!("{}", ui::render_converter(&engine, focus));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let refresher = RateRefresher::new(
        Arc::clone(&provider),
        &config.base_currency,
        config.refresh_interval(),
    )
    .spawn(tx);

    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    debug!("Input closed");
                    break;
                };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(Command::List) => print_currencies(&engine),
                    Ok(command) => match apply_command(&mut engine, command, focus) {
                        Ok(next) => {
                            focus = next;
                            println!("{}", ui::render_converter(&engine, focus));
                        }
                        Err(e) => println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error)),
                    },
                    Err(e) => println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error)),
                }
            }
            Some(outcome) = rx.recv() => {
                engine.apply_fetch(outcome);
                println!("{}", ui::render_converter(&engine, focus));
            }
        }
    }

    refresher.abort();
    Ok(engine)
}

pub async fn run(provider: Arc<dyn RateProvider>, config: &AppConfig) -> Result<()> {
    info!("Starting interactive session");
    println!("{}", ui::style_text("Type 'help' for commands", ui::StyleType::Subtle));
    let stdin = BufReader::new(tokio::io::stdin());
    run_session(provider, config, stdin).await?;
    Ok(())
}
