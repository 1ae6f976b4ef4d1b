//! Line-protocol input source over standard input
//!
//! Per pull: one line naming the target pid (an empty line or EOF means no
//! input this tick), then one line of whitespace-separated signal tokens.

use lockstep_engine::{InputSource, Pid};
use std::io::{self, BufRead};

/// Blocking stdin reader for the machine's IO pull
#[derive(Default)]
pub struct StdinInput;

impl StdinInput {
    pub fn new() -> Self {
        Self
    }
}

impl InputSource<String> for StdinInput {
    fn pull(&mut self) -> Option<(Pid, Vec<String>)> {
        let stdin = io::stdin();
        let mut target = String::new();
        stdin.lock().read_line(&mut target).ok()?;
        let target = target.trim();
        if target.is_empty() {
            return None;
        }
        let pid = target.parse::<u64>().ok()?;

        let mut tokens = String::new();
        stdin.lock().read_line(&mut tokens).ok()?;
        let signals = tokens.split_whitespace().map(str::to_string).collect();
        Some((Pid::from_u64(pid), signals))
    }
}
