use super::session::{BrowserArgs, ChatBrowser, runtime, settle, waiting_spinner};
use crate::OutputFormat;
use anyhow::Result;
use serde::Serialize;
use std::time::{Duration, Instant};

/// One prompt and the reply it produced
#[derive(Debug, Serialize)]
pub struct Exchange {
    pub prompt: String,
    pub reply: String,
    pub elapsed_ms: u64,
}

/// Send a single prompt, print the reply and close the browser
pub fn execute(words: Vec<String>, browser_args: &BrowserArgs, format: OutputFormat) -> Result<()> {
    let prompt = words.join(" ");

    let runtime = runtime()?;
    let result = runtime.block_on(async {
        let mut chat = ChatBrowser::open(browser_args).await?;

        let started = Instant::now();
        let spinner = waiting_spinner();
        let reply = chat.session.send(&prompt).await;
        let elapsed = started.elapsed();
        spinner.finish_and_clear();

        // Chrome is shut down whether or not the exchange succeeded
        let reply = settle(reply.map_err(anyhow::Error::from), chat.close().await)?;

        let exchange = Exchange {
            prompt: prompt.clone(),
            reply,
            elapsed_ms: elapsed.as_millis() as u64,
        };
        println!("{}", render(&exchange, format)?);
        Ok::<(), anyhow::Error>(())
    });

    runtime.shutdown_timeout(Duration::from_millis(100));

    result
}

/// Format an exchange for stdout
pub fn render(exchange: &Exchange, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(exchange.reply.clone()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(exchange)?),
    }
}
