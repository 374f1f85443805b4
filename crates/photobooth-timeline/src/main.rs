//! photobooth-timeline: print the capture sequence timeline.
//!
//! Runs the countdown state machine against a virtual clock with a
//! scripted backend reply and prints when each page effect happens.
//! Useful for:
//!
//! - Tuning the tick and the pre/post-capture delays
//! - Checking what the page does when the camera fails or never answers
//! - Comparing the recovering and faithful failure policies
//!
//! # Usage
//!
//! ```text
//! cargo run --bin photobooth-timeline -- [OPTIONS]
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use photobooth_sequencer::timeline::{self, ResponseScript, Timeline};
use photobooth_sequencer::{
    BoothConfig, CapturePolicy, Effect, FailurePolicy, Outcome, SequenceTiming,
};

/// Capture countdown timeline preview for the photobooth panel.
///
/// Simulates one capture with the given timing and backend reply and
/// prints every overlay, request, and panel change with its offset.
#[derive(Parser)]
#[command(name = "photobooth-timeline", version)]
struct Cli {
    /// Countdown tick length in milliseconds.
    #[arg(long, default_value_t = millis(SequenceTiming::DEFAULT_TICK), value_parser = clap::builder::RangedU64ValueParser::<u64>::new().range(1..))]
    tick_ms: u64,

    /// Delay between the capture glyph and the capture request.
    #[arg(long, default_value_t = millis(SequenceTiming::DEFAULT_PRE_CAPTURE_DELAY))]
    pre_capture_ms: u64,

    /// Delay between the reply and the panel change.
    #[arg(long, default_value_t = millis(SequenceTiming::DEFAULT_POST_CAPTURE_DELAY))]
    post_capture_ms: u64,

    /// Starting count.
    #[arg(long, default_value_t = SequenceTiming::DEFAULT_INITIAL_COUNT, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(0..=u64::from(SequenceTiming::MAX_INITIAL_COUNT)))]
    count: u32,

    /// Capture request timeout in milliseconds.
    #[arg(long, default_value_t = millis(CapturePolicy::DEFAULT_TIMEOUT), conflicts_with = "no_timeout")]
    timeout_ms: u64,

    /// Wait for the capture reply forever.
    #[arg(long)]
    no_timeout: bool,

    /// Leave the page stalled on failure instead of returning to the
    /// live controls.
    #[arg(long)]
    faithful: bool,

    /// How the simulated backend answers the capture request.
    #[arg(long, value_enum, default_value_t = Response::Succeed)]
    response: Response,

    /// How long the simulated backend takes to answer.
    #[arg(long, default_value_t = 1200)]
    response_after_ms: u64,

    /// Output the timeline as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Full panel config as a JSON string.
    ///
    /// When provided, the timing and policy flags are ignored.  The
    /// response flags still apply.  The JSON must be a valid
    /// `BoothConfig` serialization; missing fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,
}

/// Simulated backend reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Response {
    /// The camera captures and the backend answers `ok`.
    Succeed,
    /// The backend answers with an error.
    Fail,
    /// The backend never answers.
    Never,
}

/// Clamp a duration to whole milliseconds for flag defaults.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Build the timing and capture policy from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual timing and policy flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<(SequenceTiming, CapturePolicy), String> {
    let (timing, capture) = if let Some(ref json) = cli.config_json {
        let config: BoothConfig =
            serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?;
        (config.timing, config.capture)
    } else {
        let timing = SequenceTiming {
            initial_count: cli.count,
            tick: Duration::from_millis(cli.tick_ms),
            pre_capture_delay: Duration::from_millis(cli.pre_capture_ms),
            post_capture_delay: Duration::from_millis(cli.post_capture_ms),
        };
        let capture = CapturePolicy {
            failure: if cli.faithful {
                FailurePolicy::Faithful
            } else {
                FailurePolicy::Recover
            },
            timeout: (!cli.no_timeout).then(|| Duration::from_millis(cli.timeout_ms)),
        };
        (timing, capture)
    };

    timing.validate().map_err(|e| format!("Invalid timing: {e}"))?;
    Ok((timing, capture))
}

/// Build the simulated backend reply from CLI arguments.
fn script_from_cli(cli: &Cli) -> ResponseScript {
    let after = Duration::from_millis(cli.response_after_ms);
    match cli.response {
        Response::Succeed => ResponseScript::SucceedAfter(after),
        Response::Fail => ResponseScript::FailAfter(after, "camera not found".into()),
        Response::Never => ResponseScript::Never,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (timing, capture) = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    let script = script_from_cli(&cli);

    eprintln!("Timing: {timing:#?}");
    eprintln!("Capture: {capture:#?}");
    eprintln!("Response: {script:?}");
    eprintln!();

    let result = timeline::simulate(timing, capture, &script);

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing timeline: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", report(&result));
    }

    ExitCode::SUCCESS
}

/// Human-readable rendering of a timeline.
fn report(timeline: &Timeline) -> String {
    let mut lines = vec![
        format!("{:>8}  {}", "At (ms)", "Effect"),
        "-".repeat(48),
    ];
    for entry in &timeline.entries {
        lines.push(format!(
            "{:>8}  {}",
            entry.at.as_millis(),
            describe(&entry.effect)
        ));
    }
    lines.push("-".repeat(48));
    lines.push(format!(
        "{:>8}  {}",
        timeline.end.as_millis(),
        describe_outcome(timeline.outcome.as_ref())
    ));
    lines.join("\n")
}

fn describe(effect: &Effect) -> String {
    match effect {
        Effect::ShowOverlay { content } => format!("overlay shows {}", content.label()),
        Effect::RemoveOverlay => "overlay removed".into(),
        Effect::SendCapture { timeout: Some(limit) } => {
            format!("capture request sent (timeout {} ms)", limit.as_millis())
        }
        Effect::SendCapture { timeout: None } => "capture request sent (no timeout)".into(),
        Effect::ShowPanel { panel } => format!("{panel} shown"),
        Effect::ReportError { message } => format!("error reported: {message}"),
    }
}

fn describe_outcome(outcome: Option<&Outcome>) -> String {
    match outcome {
        Some(Outcome::Completed) => "finished: completed".into(),
        Some(Outcome::Failed(reason)) => format!("finished: failed ({reason})"),
        Some(Outcome::TimedOut) => "finished: timed out".into(),
        Some(Outcome::Cancelled) => "finished: cancelled".into(),
        None => "stuck waiting for the capture reply".into(),
    }
}
