//! Display surfaces
//!
//! The runner's only interface to the user is a surface accepting headings,
//! text, code, toggles, and result values. The console surface writes plain
//! text for non-interactive passes; the buffer surface records the emitted
//! events so the TUI (and tests) can regroup them per step.

use std::io::{self, Write};

use super::OutputBlock;

/// Output stream for one render pass.
pub trait DisplaySurface {
    /// Start of a step: its position and title.
    fn heading(&mut self, index: usize, title: &str);

    /// Explanatory text.
    fn text(&mut self, body: &str);

    /// Display-only code sample, never executed.
    fn code(&mut self, source: &str);

    /// The step's trigger control with its current state.
    fn toggle(&mut self, label: &str, on: bool);

    /// One block of a live action's result.
    fn value(&mut self, block: &OutputBlock);
}

/// One recorded display operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Heading { index: usize, title: String },
    Text(String),
    Code(String),
    Toggle { label: String, on: bool },
    Value(OutputBlock),
}

/// Recording surface. Used by the TUI to regroup a pass per step and by
/// tests to assert on what was shown.
#[derive(Debug, Default)]
pub struct BufferSurface {
    events: Vec<SurfaceEvent>,
}

impl BufferSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SurfaceEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<SurfaceEvent> {
        self.events
    }
}

impl DisplaySurface for BufferSurface {
    fn heading(&mut self, index: usize, title: &str) {
        self.events.push(SurfaceEvent::Heading {
            index,
            title: title.to_string(),
        });
    }

    fn text(&mut self, body: &str) {
        self.events.push(SurfaceEvent::Text(body.to_string()));
    }

    fn code(&mut self, source: &str) {
        self.events.push(SurfaceEvent::Code(source.to_string()));
    }

    fn toggle(&mut self, label: &str, on: bool) {
        self.events.push(SurfaceEvent::Toggle {
            label: label.to_string(),
            on,
        });
    }

    fn value(&mut self, block: &OutputBlock) {
        self.events.push(SurfaceEvent::Value(block.clone()));
    }
}

/// Plain-text surface for `ragtour run`.
pub struct ConsoleSurface<W: Write> {
    out: W,
}

impl ConsoleSurface<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySurface for ConsoleSurface<W> {
    fn heading(&mut self, index: usize, title: &str) {
        let _ = writeln!(self.out, "\n=== Step {}: {} ===", index + 1, title);
    }

    fn text(&mut self, body: &str) {
        let _ = writeln!(self.out, "{}", body);
    }

    fn code(&mut self, source: &str) {
        let _ = writeln!(self.out, "    ┌─ code ─────");
        for line in source.lines() {
            let _ = writeln!(self.out, "    │ {}", line);
        }
        let _ = writeln!(self.out, "    └────────────");
    }

    fn toggle(&mut self, label: &str, on: bool) {
        let state = if on { "on" } else { "off" };
        let _ = writeln!(self.out, "    [{}] {}", state, label);
    }

    fn value(&mut self, block: &OutputBlock) {
        match block {
            OutputBlock::Text(body) => {
                let _ = writeln!(self.out, "  > {}", body);
            }
            OutputBlock::Value(value) => {
                let rendered = serde_json::to_string_pretty(value)
                    .unwrap_or_else(|_| value.to_string());
                for line in rendered.lines() {
                    let _ = writeln!(self.out, "  > {}", line);
                }
            }
        }
    }
}
