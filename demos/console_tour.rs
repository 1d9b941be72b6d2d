//! Offline walkthrough demo
//!
//! Renders the full tour to stdout with canned collaborators, so it runs
//! without credentials or network access:
//!
//! ```bash
//! cargo run --example console_tour
//! ```

use std::fs;
use std::sync::Arc;

use ragtour::steps::{build_walkthrough, Toolbox};
use ragtour::tutorial::{ConsoleSurface, SessionState, TriggerStore, TutorialRunner};

fn main() -> anyhow::Result<()> {
    let workdir = tempfile::tempdir()?;
    let docs_dir = workdir.path().join("data");
    fs::create_dir_all(&docs_dir)?;
    fs::write(
        docs_dir.join("notes.txt"),
        "Retrieval-augmented generation grounds a language model's answers in \
         documents retrieved at query time. This note is the demo corpus.",
    )?;

    let toolbox = Arc::new(Toolbox::offline(docs_dir, workdir.path().join("index")));
    let runner = build_walkthrough(toolbox);

    // Every trigger on: the whole tour runs end to end.
    let mut state = SessionState::new();
    for index in 0..runner.len() {
        state.set(&TutorialRunner::trigger_key(index), true);
    }

    let mut surface = ConsoleSurface::stdout();
    runner.render_all(&state, &mut surface)
}
