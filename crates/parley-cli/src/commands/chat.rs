use super::ask::Exchange;
use super::session::{BrowserArgs, ChatBrowser, runtime, settle, waiting_spinner};
use crate::OutputFormat;
use anyhow::Result;
use console::style;
use parley_core::Error as ChatError;
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

/// What the user typed at the `You:` prompt
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Prompt(String),
    Skip,
    Exit,
}

/// Classify one line of user input
pub fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Input::Skip
    } else if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        Input::Exit
    } else {
        Input::Prompt(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Interactive chat until `exit`, `quit`, end of input or Ctrl+C.
///
/// With `--format json` every reply is printed as one JSON line and the
/// prompts go to stderr.
pub fn execute(browser_args: &BrowserArgs, format: OutputFormat) -> Result<()> {
    let runtime = runtime()?;

    let result = runtime.block_on(async {
        let mut chat = ChatBrowser::open(browser_args).await?;

        let banner = "Enter your message (type 'exit' or press Ctrl+C to leave):";
        match format {
            OutputFormat::Pretty => println!("{}", banner),
            OutputFormat::Json => eprintln!("{}", banner),
        }
        let outcome = chat_loop(&mut chat, format).await;

        settle(outcome, chat.close().await)
    });

    // stdin reads run on blocking threads that may still be parked on input
    runtime.shutdown_timeout(Duration::from_millis(100));

    result
}

/// Format one chat turn for stdout
pub fn render_turn(exchange: &Exchange, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(format!("{} {}\n", style("AI:").green().bold(), exchange.reply)),
        OutputFormat::Json => Ok(serde_json::to_string(exchange)?),
    }
}

async fn chat_loop(chat: &mut ChatBrowser, format: OutputFormat) -> Result<()> {
    let prompt_to_stderr = format == OutputFormat::Json;

    loop {
        let line = tokio::select! {
            line = read_line(prompt_to_stderr) => line?,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nExiting...");
                return Ok(());
            }
        };

        let prompt = match line.as_deref().map(parse_input) {
            None | Some(Input::Exit) => return Ok(()),
            Some(Input::Skip) => continue,
            Some(Input::Prompt(prompt)) => prompt,
        };

        let started = Instant::now();
        let spinner = waiting_spinner();
        let reply = tokio::select! {
            reply = chat.session.send(&prompt) => reply,
            _ = tokio::signal::ctrl_c() => {
                spinner.finish_and_clear();
                eprintln!("\nExiting...");
                return Ok(());
            }
        };
        spinner.finish_and_clear();

        match reply {
            Ok(reply) => {
                let exchange = Exchange {
                    prompt,
                    reply,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                };
                println!("{}", render_turn(&exchange, format)?);
            }
            // the page is still usable after a timed-out exchange
            Err(e @ (ChatError::NoReply { .. } | ChatError::UnstableReply { .. })) => {
                eprintln!("{} {}\n", style("Error:").red().bold(), e)
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Prompt with `You: ` and read one line; `None` at end of input
async fn read_line(prompt_to_stderr: bool) -> Result<Option<String>> {
    let line = tokio::task::spawn_blocking(move || -> io::Result<Option<String>> {
        let label = style("You:").cyan().bold();
        if prompt_to_stderr {
            eprint!("{} ", label);
            io::stderr().flush()?;
        } else {
            print!("{} ", label);
            io::stdout().flush()?;
        }

        let mut buf = String::new();
        if io::stdin().lock().read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf))
    })
    .await??;

    Ok(line)
}
