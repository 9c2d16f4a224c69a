use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use faq_api::{FaqClient, NewFaq, MAX_QUESTION_LENGTH};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::output::create_spinner;

/// Time to back out before a new FAQ is sent
const CONFIRM_DELAY: Duration = Duration::from_secs(4);
const COUNTDOWN_TICK: Duration = Duration::from_millis(100);
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Ctrl+C state shared with the signal handler. A signal during the
/// countdown cancels it; once the submit has started it ends the process.
#[derive(Debug, Default)]
struct Interrupt {
    cancelled: AtomicBool,
    submitting: AtomicBool,
}

impl Interrupt {
    /// Record a Ctrl+C. Returns true when the process should exit now.
    fn signal(&self) -> bool {
        self.cancelled.store(true, Ordering::SeqCst);
        self.submitting.load(Ordering::SeqCst)
    }

    /// Move on to submitting if the countdown confirmed and no Ctrl+C came
    /// in meanwhile.
    fn start_submit(&self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        self.submitting.store(true, Ordering::SeqCst);
        !self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Args, Debug, Clone)]
#[command(about = "Submit a new FAQ")]
pub struct CreateArgs {
    /// Question text (at most 300 characters)
    #[arg(short, long)]
    pub question: String,

    /// Answer text
    #[arg(short, long)]
    pub answer: String,

    /// Submit right away, without the countdown
    #[arg(short, long)]
    pub yes: bool,
}

pub fn execute(args: CreateArgs, config: &Config) -> Result<()> {
    let new = NewFaq::new(&args.question, &args.answer)?;
    let client = FaqClient::new(&config.api_url)?;

    println!("{}", preview(&new).join("\n"));
    println!();

    if !args.yes {
        let interrupt = Arc::new(Interrupt::default());
        let handler = interrupt.clone();
        ctrlc::set_handler(move || {
            if handler.signal() {
                eprintln!("{}", "Interrupted".yellow());
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        })
        .context("Failed to set Ctrl+C handler")?;

        let bar = ProgressBar::new(CONFIRM_DELAY.as_millis() as u64);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:30.cyan/blue}]")?.progress_chars("=> "),
        );

        let confirmed = countdown(CONFIRM_DELAY, &interrupt.cancelled, &bar);
        bar.finish_and_clear();
        if !interrupt.start_submit(confirmed) {
            println!("{}", "Cancelled, nothing was sent".yellow());
            return Ok(());
        }
    }

    let spinner = create_spinner("Submitting...");
    let created = client.create(&new);
    spinner.finish_and_clear();
    let faq = created?;

    println!("{} Added FAQ #{}", "✓".green(), faq.id);
    Ok(())
}

fn preview(new: &NewFaq) -> Vec<String> {
    vec![
        format!(
            "Question ({}/{}): {}",
            new.question.chars().count(),
            MAX_QUESTION_LENGTH,
            new.question
        ),
        format!("Answer: {}", new.answer),
    ]
}

/// Tick `bar` until `delay` passes. Returns false as soon as `cancelled` is
/// set.
fn countdown(delay: Duration, cancelled: &AtomicBool, bar: &ProgressBar) -> bool {
    let start = Instant::now();

    loop {
        if cancelled.load(Ordering::SeqCst) {
            return false;
        }

        let elapsed = start.elapsed();
        if elapsed >= delay {
            bar.set_position(delay.as_millis() as u64);
            return true;
        }

        let remaining = delay - elapsed;
        bar.set_position(elapsed.as_millis() as u64);
        bar.set_message(format!(
            "Sending in {}s, Ctrl+C to cancel",
            remaining.as_secs_f32().ceil() as u64
        ));
        thread::sleep(COUNTDOWN_TICK.min(remaining));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_completes() {
        let cancelled = AtomicBool::new(false);
        let bar = ProgressBar::hidden();

        let start = Instant::now();
        assert!(countdown(Duration::from_millis(150), &cancelled, &bar));
        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[test]
    fn test_countdown_cancelled() {
        let cancelled = AtomicBool::new(true);
        let bar = ProgressBar::hidden();

        let start = Instant::now();
        assert!(!countdown(Duration::from_secs(10), &cancelled, &bar));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_countdown_cancelled_midway() {
        let interrupt = Arc::new(Interrupt::default());
        let handler = interrupt.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            handler.signal()
        });

        let bar = ProgressBar::hidden();
        assert!(!countdown(Duration::from_secs(10), &interrupt.cancelled, &bar));
        assert!(!canceller.join().unwrap());
        assert!(!interrupt.start_submit(false));
    }

    #[test]
    fn test_interrupt_during_submit_exits() {
        let interrupt = Interrupt::default();
        assert!(interrupt.start_submit(true));

        // The countdown is over, so Ctrl+C now has to end the process
        assert!(interrupt.signal());
    }

    #[test]
    fn test_interrupt_after_countdown_before_submit() {
        let interrupt = Interrupt::default();
        let bar = ProgressBar::hidden();
        assert!(countdown(Duration::from_millis(20), &interrupt.cancelled, &bar));

        // Signal lands between the last tick and the submit
        assert!(!interrupt.signal());
        assert!(!interrupt.start_submit(true));
    }

    #[test]
    fn test_preview() {
        let new = NewFaq::new("  How do refunds work? ", "Within 30 days.").unwrap();
        assert_eq!(
            preview(&new),
            vec![
                "Question (20/300): How do refunds work?",
                "Answer: Within 30 days.",
            ]
        );
    }
}
