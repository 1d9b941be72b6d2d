//! TUI application state

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};

use crate::tutorial::{BufferSurface, OutputBlock, SessionState, SurfaceEvent, TutorialRunner};

/// What the detail pane shows for one step after the latest pass.
#[derive(Debug, Clone, Default)]
pub struct StepView {
    pub title: String,
    pub explanation: String,
    pub sample_code: String,
    pub on: bool,
    pub outputs: Vec<OutputBlock>,
    /// Set when this step's action failed and ended the pass.
    pub error: Option<String>,
    /// Set when the pass never reached this step.
    pub skipped: bool,
}

/// Application state
pub struct App {
    runner: TutorialRunner,
    triggers: SessionState,

    /// Per-step render of the latest pass, in step order.
    pub views: Vec<StepView>,

    /// Step the cursor is on.
    pub selected: usize,

    /// Should the app quit?
    pub should_quit: bool,

    /// Recent activity.
    pub logs: Vec<String>,
}

impl App {
    pub fn new(runner: TutorialRunner) -> Self {
        let mut app = Self {
            views: Vec::with_capacity(runner.len()),
            runner,
            triggers: SessionState::new(),
            selected: 0,
            should_quit: false,
            logs: Vec::new(),
        };
        app.run_pass();
        app
    }

    pub fn step_count(&self) -> usize {
        self.runner.len()
    }

    /// Handle keyboard input. Trigger changes re-run the pass immediately.
    pub fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.runner.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let key = TutorialRunner::trigger_key(self.selected);
                let now_on = self.triggers.toggle(&key);
                self.add_log(format!(
                    "step {} toggled {}",
                    self.selected + 1,
                    if now_on { "on" } else { "off" }
                ));
                self.run_pass();
            }
            KeyCode::Char('r') => {
                self.add_log("pass re-run".to_string());
                self.run_pass();
            }
            _ => {}
        }
    }

    /// Render one full pass and regroup its events per step.
    ///
    /// A pass that fails mid-way leaves the error on the step it stopped at;
    /// later steps are marked skipped rather than shown stale.
    pub fn run_pass(&mut self) {
        let mut surface = BufferSurface::new();
        let outcome = self.runner.render_all(&self.triggers, &mut surface);

        self.views = self
            .runner
            .steps()
            .iter()
            .map(|step| StepView {
                title: step.title().to_string(),
                explanation: step.explanation().to_string(),
                sample_code: step.sample_code().to_string(),
                skipped: true,
                ..StepView::default()
            })
            .collect();

        let mut current = 0usize;
        for event in surface.into_events() {
            match event {
                SurfaceEvent::Heading { index, .. } => {
                    current = index;
                    if let Some(view) = self.views.get_mut(current) {
                        view.skipped = false;
                    }
                }
                SurfaceEvent::Toggle { on, .. } => {
                    if let Some(view) = self.views.get_mut(current) {
                        view.on = on;
                    }
                }
                SurfaceEvent::Value(block) => {
                    if let Some(view) = self.views.get_mut(current) {
                        view.outputs.push(block);
                    }
                }
                SurfaceEvent::Text(_) | SurfaceEvent::Code(_) => {}
            }
        }

        if let Err(err) = outcome {
            let message = format!("{:#}", err);
            self.add_log(message.clone());
            if let Some(view) = self.views.get_mut(current) {
                view.error = Some(message);
                view.outputs.clear();
            }
        }
    }

    /// Add a log message, keeping the last 100.
    pub fn add_log(&mut self, message: String) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        self.logs.push(format!("[{}] {}", timestamp, message));
        if self.logs.len() > 100 {
            self.logs.remove(0);
        }
    }
}

/// Run the TUI application
pub fn run_tui(runner: TutorialRunner) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(runner);
    app.add_log("walkthrough started".to_string());
    app.add_log("j/k to move, Space to toggle a step, r to re-run, q to quit".to_string());

    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    // Main loop
    loop {
        terminal.draw(|f| super::ui::draw(f, &app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tutorial::OutputBlock;

    fn stub_runner() -> TutorialRunner {
        let mut runner = TutorialRunner::new();
        runner.register_step(
            "First",
            "Replies with a constant.",
            "reply()?;",
            Box::new(|| Ok(vec![OutputBlock::text("hello")])),
        );
        runner.register_step(
            "Broken",
            "Always fails.",
            "fail()?;",
            Box::new(|| anyhow::bail!("credentials missing")),
        );
        runner.register_step(
            "Last",
            "Never triggered in these tests.",
            "noop()?;",
            Box::new(|| Ok(vec![])),
        );
        runner
    }

    #[test]
    fn test_initial_pass_shows_all_steps_off() {
        let app = App::new(stub_runner());
        assert_eq!(app.views.len(), 3);
        assert!(app.views.iter().all(|v| !v.on && v.outputs.is_empty()));
        assert!(app.views.iter().all(|v| !v.skipped));
    }

    #[test]
    fn test_toggle_runs_action_and_captures_output() {
        let mut app = App::new(stub_runner());
        app.handle_key(KeyCode::Char(' '));

        assert!(app.views[0].on);
        assert_eq!(app.views[0].outputs, vec![OutputBlock::text("hello")]);
    }

    #[test]
    fn test_failed_step_carries_error_and_skips_rest() {
        let mut app = App::new(stub_runner());
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);

        let broken = &app.views[1];
        assert!(broken.on);
        assert!(broken.error.as_deref().unwrap().contains("credentials missing"));
        assert!(app.views[2].skipped);
    }

    #[test]
    fn test_toggle_off_clears_result_on_next_pass() {
        let mut app = App::new(stub_runner());
        app.handle_key(KeyCode::Char(' '));
        assert!(!app.views[0].outputs.is_empty());

        app.handle_key(KeyCode::Char(' '));
        assert!(!app.views[0].on);
        assert!(app.views[0].outputs.is_empty());
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut app = App::new(stub_runner());
        app.handle_key(KeyCode::Up);
        assert_eq!(app.selected, 0);
        for _ in 0..10 {
            app.handle_key(KeyCode::Down);
        }
        assert_eq!(app.selected, 2);
    }

    #[test]
    fn test_q_quits() {
        let mut app = App::new(stub_runner());
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
