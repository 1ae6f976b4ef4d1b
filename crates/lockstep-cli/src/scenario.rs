//! Built-in demo scenarios and the interactive runner

use crate::render;
use crate::stdin_input::StdinInput;
use anyhow::bail;
use lockstep_engine::{Machine, NoPacer, Step, StepFn};
use std::sync::Arc;
use std::time::Duration;

fn build_machine(halt: u64, pace_ms: u64) -> anyhow::Result<Machine<String>> {
    let machine = if pace_ms == 0 {
        Machine::with_pacer(Box::new(NoPacer), halt)?
    } else {
        Machine::new(Duration::from_millis(pace_ms), halt)?
    };
    Ok(machine)
}

/// Counter that holds its state until the terminal token arrives
fn hold_until(terminal: &str) -> StepFn<String> {
    let terminal = terminal.to_string();
    Arc::new(move |state, signal| match signal {
        Some(s) if **s == *terminal => Step::done((*s).clone()),
        _ => Step::running(state.clone()),
    })
}

/// Two-stage producer: "1" arms it, then "2" terminates it with state "2"
fn staged_producer() -> StepFn<String> {
    Arc::new(
        |state, signal| match (state.as_str(), signal.map(String::as_str)) {
            ("0", Some("0")) => Step::running("0".into()),
            ("0", Some("1")) => Step::running("1".into()),
            ("0", Some("2")) => Step::running("0".into()),
            ("1", Some("0")) => Step::running("0".into()),
            ("1", Some("1")) => Step::running("1".into()),
            ("1", Some("2")) => Step::done("2".into()),
            _ => Step::running(state.clone()),
        },
    )
}

/// Channel consumer: ignores everything until the producer's state "2"
/// comes through
fn follower() -> StepFn<String> {
    Arc::new(
        |state, signal| match (state.as_str(), signal.map(String::as_str)) {
            ("0", Some("2")) => Step::done("1".into()),
            _ => Step::running(state.clone()),
        },
    )
}

fn signals(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|token| token.to_string()).collect()
}

fn spawn_scenario(machine: &mut Machine<String>, name: &str) -> anyhow::Result<()> {
    match name {
        "sequence" => {
            machine.spawn_immediate(hold_until("1"), "0".into(), signals(&["0", "0", "0", "1"]));
        }
        "delay" => {
            machine.spawn_delayed(hold_until("1"), "0".into(), 3);
        }
        "parallel" => {
            machine.spawn_immediate(
                hold_until("1"),
                "0".into(),
                signals(&["0", "0", "0", "0", "0", "1"]),
            );
            machine.spawn_delayed(hold_until("b"), "a".into(), 1);
        }
        "queue" => {
            machine.spawn_queued(
                hold_until("1"),
                "0".into(),
                signals(&["0", "0", "0", "0", "1"]),
            );
            machine.spawn_queued(hold_until("b"), "a".into(), signals(&["a", "a", "a", "b"]));
        }
        "conduction" => {
            let producer = machine.spawn_immediate(
                staged_producer(),
                "0".into(),
                signals(&["0", "0", "0", "1", "2"]),
            );
            machine.spawn_channel_linked(follower(), "0".into(), producer)?;
        }
        other => bail!("unknown scenario: {other}"),
    }
    Ok(())
}

fn emit(machine: &Machine<String>, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(machine.log())?);
    } else {
        render::print_log(machine.log())?;
    }
    Ok(())
}

/// Build, run, and render a named scenario
pub fn demo(name: &str, halt: u64, pace_ms: u64, json: bool) -> anyhow::Result<()> {
    let mut machine = build_machine(halt, pace_ms)?;
    spawn_scenario(&mut machine, name)?;
    machine.run()?;
    emit(&machine, json)
}

/// Spawn counter tasks and feed them from stdin until the halt bound
pub fn interactive(tasks: u64, halt: u64, pace_ms: u64, json: bool) -> anyhow::Result<()> {
    let mut machine = build_machine(halt, pace_ms)?;
    for _ in 0..tasks {
        machine.spawn_immediate(hold_until("1"), "0".into(), Vec::new());
    }
    machine.set_io_enabled(true);
    machine.set_input(Box::new(StdinInput::new()));
    machine.run()?;
    emit(&machine, json)
}
