//! Tutorial runner
//!
//! The runner holds an ordered list of steps. Each step pairs static
//! explanatory material (title, explanation, display-only code sample) with a
//! deferred action that performs the live demonstration. A render pass walks
//! every step in registration order, emits the static material to a display
//! surface, and executes the action only when the step's trigger is on.
//!
//! The runner holds no loop and no event listener: the host front end calls
//! [`TutorialRunner::render_all`] on every interaction with the current
//! trigger snapshot. Actions are not retried and their errors are not caught;
//! a failing action ends that render pass and the next interaction starts a
//! fresh one.

use anyhow::{Context, Result};

pub mod display;
pub mod state;

pub use display::{BufferSurface, ConsoleSurface, DisplaySurface, SurfaceEvent};
pub use state::{SessionState, TriggerStore};

/// A displayable piece of a step's live result.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputBlock {
    /// Plain text, shown verbatim.
    Text(String),
    /// Structured value, shown pretty-printed.
    Value(serde_json::Value),
}

impl OutputBlock {
    pub fn text(body: impl Into<String>) -> Self {
        OutputBlock::Text(body.into())
    }

    pub fn value(value: serde_json::Value) -> Self {
        OutputBlock::Value(value)
    }
}

/// The deferred operation a step performs when its trigger is on.
pub type StepAction = Box<dyn Fn() -> Result<Vec<OutputBlock>>>;

/// One tutorial unit. Immutable once registered; its identity is its
/// position in the registration order.
pub struct Step {
    title: String,
    explanation: String,
    sample_code: String,
    action: StepAction,
}

impl Step {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn sample_code(&self) -> &str {
        &self.sample_code
    }
}

/// Ordered, stateless sequence of tutorial steps.
#[derive(Default)]
pub struct TutorialRunner {
    steps: Vec<Step>,
}

impl TutorialRunner {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step to the end of the sequence.
    pub fn register_step(
        &mut self,
        title: impl Into<String>,
        explanation: impl Into<String>,
        sample_code: impl Into<String>,
        action: StepAction,
    ) {
        self.steps.push(Step {
            title: title.into(),
            explanation: explanation.into(),
            sample_code: sample_code.into(),
            action,
        });
    }

    /// Trigger-store key for the step at `index`. Positional, since step
    /// identity is positional.
    pub fn trigger_key(index: usize) -> String {
        format!("step.{}", index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Execute one render pass.
    ///
    /// For each step in registration order: emit title, explanation, and code
    /// sample unconditionally, then the toggle reflecting its stored state.
    /// If the trigger is on, invoke the action and emit its output blocks.
    /// The first action error propagates immediately; steps after it are not
    /// rendered in this pass.
    pub fn render_all(
        &self,
        triggers: &dyn TriggerStore,
        surface: &mut dyn DisplaySurface,
    ) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            let key = Self::trigger_key(index);
            surface.heading(index, &step.title);
            surface.text(&step.explanation);
            surface.code(&step.sample_code);

            let on = triggers.get(&key);
            surface.toggle(&key, on);

            if on {
                let blocks = (step.action)()
                    .with_context(|| format!("step {} ({}) failed", index + 1, step.title))?;
                for block in &blocks {
                    surface.value(block);
                }
            }
        }

        Ok(())
    }
}
