//! Prompt loop: one loaded session, many queries.

use crate::commands::{run_query, QueryOutput};
use anyhow::Result;
use cinematch_core::config::RecommendConfig;
use cinematch_core::Session;
use std::io::{BufRead, Write};

const PROMPT: &str = "Enter a movie title (or 'quit' to exit): ";

/// Reads titles from `input` until end of input or `quit`, writing results
/// to `out`. Unknown titles are reported and the loop continues.
///
/// In JSON mode no prompt is written, so `out` holds only JSON documents.
pub fn run<R: BufRead, W: Write>(
    session: &Session,
    config: &RecommendConfig,
    json: bool,
    input: R,
    mut out: W,
) -> Result<()> {
    prompt(&mut out, json)?;

    for line in input.lines() {
        let line = line?;
        let title = line.trim();

        match title {
            "" => {}
            "quit" | "exit" | "q" => break,
            _ => match run_query(session, title, config, json)? {
                QueryOutput::Found(text) | QueryOutput::NotFound(text) => {
                    writeln!(out, "{}\n", text)?;
                }
            },
        }

        prompt(&mut out, json)?;
    }

    if !json {
        writeln!(out)?;
    }
    Ok(())
}

fn prompt<W: Write>(out: &mut W, json: bool) -> Result<()> {
    if !json {
        write!(out, "{}", PROMPT)?;
        out.flush()?;
    }
    Ok(())
}
