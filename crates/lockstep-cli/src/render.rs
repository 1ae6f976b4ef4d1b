//! Colored tick-log rendering

use lockstep_engine::{EventKind, ExecutionLog};
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print the log as a per-tick listing: executes in green, terminations in
/// red, empty ticks elided
pub fn print_log(log: &ExecutionLog) -> anyhow::Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    for (tick, events) in log.ticks() {
        if events.is_empty() {
            continue;
        }
        stdout.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(stdout, "tick {tick}")?;
        stdout.reset()?;

        for event in events {
            match event.kind {
                EventKind::Execute => {
                    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                    writeln!(stdout, "  execute   pid {}", event.pid.as_u64())?;
                }
                EventKind::Terminate => {
                    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                    writeln!(stdout, "  terminate pid {}", event.pid.as_u64())?;
                }
            }
            stdout.reset()?;
        }
    }
    Ok(())
}
