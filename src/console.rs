use anyhow::{Context, Result};
use crossterm::style::Stylize;
use crossterm::{cursor, execute, terminal};
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::interpreter::{Effect, Interpreter, LineKind, TranscriptLine};
use crate::launcher;
use crate::submit::FormSubmitter;

/// Tracks how much of the transcript is already on screen.
struct Printer {
    printed: usize,
    generation: u64,
}

impl Printer {
    fn flush_new(&mut self, out: &mut impl Write, interpreter: &Interpreter) -> io::Result<()> {
        let transcript = interpreter.transcript();
        if interpreter.generation() != self.generation {
            if crossterm::tty::IsTty::is_tty(&io::stdout()) {
                execute!(out, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))?;
            }
            self.printed = 0;
            self.generation = interpreter.generation();
        }
        for line in &transcript[self.printed..] {
            writeln!(out, "{}", styled(line))?;
        }
        self.printed = transcript.len();
        out.flush()
    }
}

fn styled(line: &TranscriptLine) -> String {
    match line.kind {
        LineKind::Echo => line.text.as_str().yellow().to_string(),
        LineKind::Output => line.text.as_str().green().to_string(),
        LineKind::Success => line.text.as_str().cyan().to_string(),
        LineKind::Error => line.text.as_str().red().to_string(),
    }
}

fn is_exit(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "exit" | "quit")
}

/// Line-oriented front end: stdin in, styled transcript out.
pub async fn run(config: &Config, mut submitter: FormSubmitter) -> Result<()> {
    let mut interpreter = Interpreter::new(config.create_url.clone());
    let mut printer = Printer { printed: 0, generation: 0 };
    let mut stdout = io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    printer.flush_new(&mut stdout, &interpreter)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                if is_exit(&line) {
                    break;
                }
                for effect in interpreter.dispatch(&line) {
                    match effect {
                        Effect::OpenUrl(url) => {
                            if let Err(err) = launcher::open_url(&url) {
                                tracing::warn!(%url, error = %err, "failed to open browser");
                                interpreter.record_error(format!("Could not open {} ({}). Visit it manually.", url, err));
                            }
                        }
                        Effect::Submit(code) => submitter.submit_async(code),
                    }
                }
            }
            Some(report) = submitter.next_report() => {
                interpreter.record_submission(&report.outcome);
            }
        }
        printer.flush_new(&mut stdout, &interpreter)?;
    }

    while let Some(report) = submitter.next_report().await {
        interpreter.record_submission(&report.outcome);
    }
    printer.flush_new(&mut stdout, &interpreter)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_exit_words() {
        assert!(is_exit("exit"));
        assert!(is_exit("  QUIT "));
        assert!(!is_exit("end"));
    }

    #[test]
    fn printer_emits_only_new_lines() {
        let mut interpreter = Interpreter::new("https://muse.hackclub.dev/");
        let mut printer = Printer { printed: 0, generation: 0 };
        let mut out = Vec::new();

        printer.flush_new(&mut out, &interpreter).unwrap();
        interpreter.dispatch("vinyl");
        let before = out.len();
        printer.flush_new(&mut out, &interpreter).unwrap();
        let text = String::from_utf8_lossy(&out[before..]).into_owned();
        assert!(text.contains("> vinyl"));
        assert!(!text.contains("Welcome to VinylCode"));
        assert_eq!(printer.printed, interpreter.transcript().len());
    }

    #[test]
    fn printer_restarts_after_clear() {
        let mut interpreter = Interpreter::new("https://muse.hackclub.dev/");
        let mut printer = Printer { printed: 0, generation: 0 };
        let mut out = Vec::new();

        printer.flush_new(&mut out, &interpreter).unwrap();
        interpreter.dispatch("clear");
        interpreter.dispatch("preview");
        let before = out.len();
        printer.flush_new(&mut out, &interpreter).unwrap();
        let text = String::from_utf8_lossy(&out[before..]).into_owned();
        assert!(text.contains("> preview"));
        assert!(text.contains("No song code entered yet"));
        assert_eq!(printer.printed, 2);
        assert_eq!(printer.generation, 1);
    }
}
