//! Non-interactive front end
//!
//! `ragtour run` renders a single pass to stdout with the requested triggers
//! on; `ragtour steps` prints the table of contents.

use anyhow::{bail, Result};
use tracing::info;

use crate::tutorial::{ConsoleSurface, SessionState, TriggerStore, TutorialRunner};

/// Render one pass with the given 1-based step numbers triggered on.
pub fn run_pass(runner: &TutorialRunner, step_numbers: &[usize]) -> Result<()> {
    let mut state = SessionState::new();
    for &number in step_numbers {
        if number == 0 || number > runner.len() {
            bail!(
                "No step {} (this walkthrough has {} steps)",
                number,
                runner.len()
            );
        }
        state.set(&TutorialRunner::trigger_key(number - 1), true);
    }

    info!(triggered = step_numbers.len(), "rendering pass");
    let mut surface = ConsoleSurface::stdout();
    runner.render_all(&state, &mut surface)
}

/// Print step numbers and titles without running anything.
pub fn list_steps(runner: &TutorialRunner) {
    for (index, step) in runner.steps().iter().enumerate() {
        println!("{:2}. {}", index + 1, step.title());
    }
}
