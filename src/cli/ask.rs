use anyhow::{anyhow, Result};
use clap::Args;
use std::fmt::Write as _;
use std::io::{self, Read};
use tracing::{debug, info};

use crate::session::{ConversationController, Message};
use crate::utils::text::string;

/// Ask a single question and print the answer
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask. If not provided, it is read from stdin
    pub question: Vec<String>,

    /// Print only the answer, without its sources
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl AskCommand {
    pub async fn execute(&self, mut controller: ConversationController) -> Result<()> {
        let question = self.get_question()?;

        if question.trim().is_empty() {
            return Err(anyhow!(
                "No question provided. Use arguments or pipe input via stdin."
            ));
        }

        info!(
            "Asking: {}",
            question.chars().take(50).collect::<String>()
        );

        controller
            .submit(&question)
            .ok_or_else(|| anyhow!("No question provided"))?;

        let answer_id = controller
            .settle_next()
            .await
            .ok_or_else(|| anyhow!("no answer received"))?;

        let answer = controller
            .messages()
            .iter()
            .find(|m| m.id == answer_id)
            .ok_or_else(|| anyhow!("no answer received"))?;

        print!("{}", format_answer(answer, !self.quiet));
        Ok(())
    }

    fn get_question(&self) -> Result<String> {
        if !self.question.is_empty() {
            Ok(self.question.join(" "))
        } else {
            debug!("Reading question from stdin");
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| anyhow!("Failed to read from stdin: {}", e))?;
            Ok(buffer)
        }
    }
}

/// Plain-text rendering of an answer and, optionally, its sources
fn format_answer(message: &Message, with_sources: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", message.content);

    if !with_sources || message.sources.is_empty() {
        return out;
    }

    let _ = writeln!(out, "\nSources:");
    for (index, source) in message.sources.iter().enumerate() {
        let _ = write!(out, "[{}] {}", index + 1, source.display_name());
        if let Some(page) = source.display_page() {
            let _ = write!(out, " (Page {})", page);
        }
        let _ = writeln!(out);
        if let Some(url) = source.url() {
            let _ = writeln!(out, "    View PDF: {}", url);
        }
        let _ = writeln!(out, "    {}", string::collapse_whitespace(&source.preview()));
    }

    out
}
