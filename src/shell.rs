use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::agent::{Assistant, Outcome, Phase, Report, EMPTY_QUERY_MESSAGE, NO_ARTICLES_MESSAGE};

const TITLE: &str = "🔍 Smart Search Assistant";

pub fn phase_message(phase: Phase) -> &'static str {
    match phase {
        Phase::Searching => "Searching the web...",
        Phase::Analyzing => "Analyzing results...",
    }
}

/// Status lines go to stderr so stdout holds only the rendered result.
pub fn print_phase(phase: Phase) {
    eprintln!("⏳ {}", phase_message(phase));
}

/// Write an outcome the way the terminal shows it.
pub fn render(out: &mut impl Write, outcome: &Outcome, show_context: bool) -> std::io::Result<()> {
    match outcome {
        Outcome::EmptyQuery => writeln!(out, "⚠️  {EMPTY_QUERY_MESSAGE}"),
        Outcome::NoArticles { search_warning } => {
            if let Some(warning) = search_warning {
                writeln!(out, "⚠️  {warning}")?;
            }
            writeln!(out, "❌ {NO_ARTICLES_MESSAGE}")
        }
        Outcome::Answered(report) => {
            render_answer(out, report)?;
            if show_context {
                render_context(out, report)?;
            }
            Ok(())
        }
    }
}

fn render_answer(out: &mut impl Write, report: &Report) -> std::io::Result<()> {
    writeln!(out, "\n## Research Summary\n")?;
    writeln!(out, "{}\n", report.answer)
}

pub fn render_context(out: &mut impl Write, report: &Report) -> std::io::Result<()> {
    writeln!(out, "--- Raw context ---")?;
    writeln!(out, "{}", report.context_preview)?;
    writeln!(out, "-------------------")
}

/// Parse the result-count answer; empty input keeps the default.
pub fn parse_count(input: &str) -> Result<Option<usize>, std::num::ParseIntError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    input.parse().map(Some)
}

fn is_exit(input: &str) -> bool {
    matches!(input.trim(), "quit" | "exit" | ":q")
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush().context("Failed to flush stdout")?;
    lines.next_line().await.context("Failed to read from stdin")
}

/// Interactive loop: question, result count, answer, optional raw context.
pub async fn run_interactive(assistant: &Assistant, verbose: bool) -> Result<()> {
    let config = assistant.config();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    println!("{TITLE}");
    println!("Type a question and press Enter. `quit` to leave.\n");

    loop {
        let Some(query) = prompt(&mut lines, "Enter your question: ").await? else {
            break;
        };
        if is_exit(&query) {
            break;
        }
        if query.trim().is_empty() {
            render(&mut stdout, &Outcome::EmptyQuery, false)?;
            continue;
        }

        let label = format!(
            "Number of results to analyze ({}-{}) [{}]: ",
            config.min_results, config.max_results, config.default_results
        );
        let Some(raw_count) = prompt(&mut lines, &label).await? else {
            break;
        };
        let requested = match parse_count(&raw_count) {
            Ok(requested) => requested,
            Err(_) => {
                println!("⚠️  Not a number: {}", raw_count.trim());
                continue;
            }
        };
        let count = config.result_count(requested);

        let outcome = assistant.ask(&query, count, print_phase).await;
        render(&mut stdout, &outcome, false)?;

        if let Outcome::Answered(report) = &outcome {
            if verbose {
                eprintln!("{}", report.summary());
            }
            let Some(choice) = prompt(&mut lines, "View raw context? [y/N]: ").await? else {
                break;
            };
            if choice.trim().eq_ignore_ascii_case("y") {
                render_context(&mut stdout, report)?;
            }
        }
        println!();
    }

    Ok(())
}
