//! Interactive prompt loop.
//!
//! Reads one line at a time, forwards it to the gateway and prints the answer
//! before reading the next line. Errors are reported and the loop keeps going.

use super::gateway::PromptSender;
use anyhow::{bail, Result};
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// Label printed before each line of input.
pub const INPUT_LABEL: &str = "Enter your prompt for Gemini (type 'exit' to quit): ";

/// Literal that ends the loop, matched ignoring case.
pub const EXIT_COMMAND: &str = "exit";

/// Options for the interactive loop.
#[derive(Debug, Clone, Copy)]
pub struct ReplOptions {
    /// Print [`INPUT_LABEL`] before reading each line.
    pub show_label: bool,
}

impl Default for ReplOptions {
    fn default() -> Self {
        Self { show_label: true }
    }
}

/// Run the loop until `exit` or end of input. Returns the number of prompts sent.
pub async fn run_repl<S, R, W>(
    sender: &S,
    mut input: R,
    output: &mut W,
    options: ReplOptions,
) -> Result<usize>
where
    S: PromptSender + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut sent = 0;
    let mut line = String::new();

    loop {
        if options.show_label {
            write!(output, "{}", INPUT_LABEL)?;
            output.flush()?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("End of input");
            if options.show_label {
                writeln!(output)?;
            }
            break;
        }

        let prompt = line.trim();
        if prompt.eq_ignore_ascii_case(EXIT_COMMAND) {
            break;
        }
        if prompt.is_empty() {
            continue;
        }

        sent += 1;
        match sender.send(prompt).await {
            Ok(text) => writeln!(output, "Gemini response: {}", text)?,
            Err(e) => {
                let e = anyhow::Error::new(e);
                warn!("Gateway request failed: {:#}", e);
                writeln!(output, "Error connecting to the server: {:#}", e)?;
            }
        }
        output.flush()?;
    }

    debug!(sent, "Leaving prompt loop");
    Ok(sent)
}

/// Send a single prompt and print only the generated text.
pub async fn ask_once<S, W>(sender: &S, prompt: &str, output: &mut W) -> Result<()>
where
    S: PromptSender + ?Sized,
    W: Write,
{
    let prompt = prompt.trim();
    if prompt.is_empty() {
        bail!("Prompt is empty");
    }
    let text = sender.send(prompt).await?;
    writeln!(output, "{}", text)?;
    output.flush()?;
    Ok(())
}
