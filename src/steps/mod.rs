//! The walkthrough steps
//!
//! Seven steps taking the reader from a one-line completion call to a
//! customized retrieval pipeline over a persisted index. Each step's code
//! sample shows exactly what its action runs; keep them in sync when editing
//! either.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::TourConfig;
use crate::data::MultiFormatLoader;
use crate::index::{Embedder, TokenEmbedder, VectorIndex};
use crate::llm::{CompletionClient, MockCompletion, OpenAiCompletion, PromptTemplate};
use crate::parse::{LlamaCloudParser, MockParser, ResultType, StructuredParser};
use crate::tutorial::{OutputBlock, TutorialRunner};

/// The collaborators the walkthrough steps call into.
pub struct Toolbox {
    pub completion: Arc<dyn CompletionClient>,
    pub parser: Arc<dyn StructuredParser>,
    pub embedder: Arc<dyn Embedder>,
    pub docs_dir: PathBuf,
    pub index_dir: PathBuf,
}

impl Toolbox {
    /// Live collaborators: real completion and parsing services. Credentials
    /// are checked when a step runs, not here.
    pub fn from_config(config: &TourConfig) -> Result<Self> {
        Ok(Self {
            completion: Arc::new(OpenAiCompletion::new(config)?),
            parser: Arc::new(LlamaCloudParser::new(config)?),
            embedder: Arc::new(TokenEmbedder::default()),
            docs_dir: config.docs_dir.clone(),
            index_dir: config.index_dir.clone(),
        })
    }

    /// Canned collaborators for tests and offline demos.
    pub fn offline(docs_dir: PathBuf, index_dir: PathBuf) -> Self {
        Self {
            completion: Arc::new(MockCompletion::new(
                "Michael Jackson is the King of Pop",
            )),
            parser: Arc::new(MockParser::new(
                "# T2202\n\n| Session | Tuition fees |\n| --- | --- |\n| 2024 | 8500.00 |",
            )),
            embedder: Arc::new(TokenEmbedder::default()),
            docs_dir,
            index_dir,
        }
    }
}

/// Build the full walkthrough against a toolbox.
pub fn build_walkthrough(toolbox: Arc<Toolbox>) -> TutorialRunner {
    let mut runner = TutorialRunner::new();
    register_walkthrough(&mut runner, &toolbox);
    runner
}

/// Register the seven steps, in tutorial order.
pub fn register_walkthrough(runner: &mut TutorialRunner, toolbox: &Arc<Toolbox>) {
    register_quick_completion(runner, toolbox);
    register_prompt_template(runner, toolbox);
    register_load_and_index(runner, toolbox);
    register_persist_and_reload(runner, toolbox);
    register_query_persisted(runner, toolbox);
    register_customized_query(runner, toolbox);
    register_structured_parse(runner, toolbox);
}

fn register_quick_completion(runner: &mut TutorialRunner, toolbox: &Arc<Toolbox>) {
    let tb = toolbox.clone();
    runner.register_step(
        "Quick and simple completion",
        "The smallest possible call: send a prompt to the completion service and print \
         whatever comes back. This needs OPENAI_API_KEY in your environment.",
        r#"let client = OpenAiCompletion::new(&config)?;
let reply = client.complete("Michael Jackson is ")?;
println!("{reply}");"#,
        Box::new(move || {
            let reply = tb.completion.complete("Michael Jackson is ")?;
            Ok(vec![OutputBlock::text(reply)])
        }),
    );
}

fn register_prompt_template(runner: &mut TutorialRunner, toolbox: &Arc<Toolbox>) {
    let tb = toolbox.clone();
    runner.register_step(
        "Prompt templates steer the answer",
        "The same question with two different contexts produces two different answers. \
         A template carries {context_str} and {query_str} placeholders filled at call time.",
        r#"let template = PromptTemplate::qa_default();

let prompt = template.format("You are a loyal Michael Jackson fan", "Michael Jackson is ");
println!("{prompt}");
println!("{}", client.complete(&prompt)?);

let prompt = template.format("You are not a fan of Michael Jackson", "Michael Jackson is ");
println!("{prompt}");
println!("{}", client.complete(&prompt)?);"#,
        Box::new(move || {
            let template = PromptTemplate::qa_default();
            let mut blocks = Vec::new();

            for context in [
                "You are a loyal Michael Jackson fan",
                "You are not a fan of Michael Jackson",
            ] {
                let prompt = template.format(context, "Michael Jackson is ");
                blocks.push(OutputBlock::text(prompt.clone()));
                blocks.push(OutputBlock::text(tb.completion.complete(&prompt)?));
            }

            Ok(blocks)
        }),
    );
}

fn register_load_and_index(runner: &mut TutorialRunner, toolbox: &Arc<Toolbox>) {
    let tb = toolbox.clone();
    runner.register_step(
        "Load documents and build an index",
        "Read every supported file from the documents directory, chunk it, embed the \
         chunks, and hold the vector index in memory.",
        r#"let documents = MultiFormatLoader::new().load_directory(&docs_dir)?;
let index = VectorIndex::from_documents(&documents, embedder)?;
println!("{:#?}", documents);
println!("{}", index.summary());"#,
        Box::new(move || {
            let documents = MultiFormatLoader::new().load_directory(&tb.docs_dir)?;
            let index = VectorIndex::from_documents(&documents, tb.embedder.clone())?;

            let doc_summaries: Vec<_> = documents.iter().map(|d| d.summary()).collect();
            Ok(vec![
                OutputBlock::value(serde_json::Value::Array(doc_summaries)),
                OutputBlock::value(index.summary()),
            ])
        }),
    );
}

fn register_persist_and_reload(runner: &mut TutorialRunner, toolbox: &Arc<Toolbox>) {
    let tb = toolbox.clone();
    runner.register_step(
        "Persist the index and rebuild it",
        "Build the index as before, write it to the index directory, then load it back. \
         Later steps read the persisted copy instead of re-indexing.",
        r#"let documents = MultiFormatLoader::new().load_directory(&docs_dir)?;
let index = VectorIndex::from_documents(&documents, embedder.clone())?;
index.persist(&index_dir)?;

let index = VectorIndex::load(&index_dir, embedder)?;
println!("{}", index.summary());"#,
        Box::new(move || {
            let documents = MultiFormatLoader::new().load_directory(&tb.docs_dir)?;
            let index = VectorIndex::from_documents(&documents, tb.embedder.clone())?;
            index.persist(&tb.index_dir)?;

            let reloaded = VectorIndex::load(&tb.index_dir, tb.embedder.clone())?;
            Ok(vec![OutputBlock::value(reloaded.summary())])
        }),
    );
}

fn register_query_persisted(runner: &mut TutorialRunner, toolbox: &Arc<Toolbox>) {
    let tb = toolbox.clone();
    runner.register_step(
        "Query the persisted index",
        "Load the index written by the previous step and ask a question. Retrieval pulls \
         the closest chunks, the template wraps them, and the completion service answers.",
        r#"let index = VectorIndex::load(&index_dir, embedder)?;
let engine = index.as_query_engine(completion);
let response = engine.query("What is the document about")?;
println!("{}", response.answer);"#,
        Box::new(move || {
            let index = VectorIndex::load(&tb.index_dir, tb.embedder.clone())?;
            let engine = index.as_query_engine(tb.completion.clone());
            let response = engine.query("What is the document about")?;
            Ok(vec![OutputBlock::value(response.to_value())])
        }),
    );
}

fn register_customized_query(runner: &mut TutorialRunner, toolbox: &Arc<Toolbox>) {
    let tb = toolbox.clone();
    runner.register_step(
        "Customize the retrieval pipeline",
        "The same query with explicit knobs: pull ten candidate chunks instead of five \
         and drop anything scoring below 0.7 before the prompt is assembled.",
        r#"let index = VectorIndex::load(&index_dir, embedder)?;
let engine = index
    .as_query_engine(completion)
    .with_top_k(10)
    .with_similarity_cutoff(0.7);
let response = engine.query("What is the document about")?;
println!("{}", response.answer);"#,
        Box::new(move || {
            let index = VectorIndex::load(&tb.index_dir, tb.embedder.clone())?;
            let engine = index
                .as_query_engine(tb.completion.clone())
                .with_top_k(10)
                .with_similarity_cutoff(0.7);
            let response = engine.query("What is the document about")?;
            Ok(vec![OutputBlock::value(response.to_value())])
        }),
    );
}

fn register_structured_parse(runner: &mut TutorialRunner, toolbox: &Arc<Toolbox>) {
    let tb = toolbox.clone();
    runner.register_step(
        "Parse a tax slip with tables",
        "Plain text extraction mangles tables, so a scanned tuition slip goes through \
         the parsing service instead. This needs LLAMA_CLOUD_API_KEY. The resulting \
         markdown is indexed and queried like any other document.",
        r#"let documents = parser.parse(&docs_dir.join("T2202.pdf"), ResultType::Markdown)?;
let index = VectorIndex::from_documents(&documents, embedder)?;
let engine = index.as_query_engine(completion);
let response = engine.query("How much are the tuition fees?")?;
println!("{}", response.answer);"#,
        Box::new(move || {
            let slip = tb.docs_dir.join("T2202.pdf");
            let documents = tb.parser.parse(&slip, ResultType::Markdown)?;
            let index = VectorIndex::from_documents(&documents, tb.embedder.clone())?;
            let engine = index.as_query_engine(tb.completion.clone());
            let response = engine.query("How much are the tuition fees?")?;

            let doc_summaries: Vec<_> = documents.iter().map(|d| d.summary()).collect();
            Ok(vec![
                OutputBlock::value(serde_json::Value::Array(doc_summaries)),
                OutputBlock::text(response.answer),
            ])
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tutorial::{BufferSurface, SessionState, SurfaceEvent, TriggerStore};
    use std::fs;
    use tempfile::tempdir;

    fn offline_runner(dir: &std::path::Path) -> TutorialRunner {
        let docs_dir = dir.join("data");
        fs::create_dir_all(&docs_dir).unwrap();
        fs::write(
            docs_dir.join("notes.txt"),
            "Rust is a systems programming language focused on safety.",
        )
        .unwrap();

        let toolbox = Arc::new(Toolbox::offline(docs_dir, dir.join("index")));
        build_walkthrough(toolbox)
    }

    #[test]
    fn test_walkthrough_has_seven_steps_in_order() {
        let dir = tempdir().unwrap();
        let runner = offline_runner(dir.path());

        let titles: Vec<&str> = runner.steps().iter().map(|s| s.title()).collect();
        assert_eq!(titles.len(), 7);
        assert_eq!(titles[0], "Quick and simple completion");
        assert_eq!(titles[6], "Parse a tax slip with tables");
    }

    #[test]
    fn test_all_steps_render_statically_with_triggers_off() {
        let dir = tempdir().unwrap();
        let runner = offline_runner(dir.path());

        let mut surface = BufferSurface::new();
        runner.render_all(&SessionState::new(), &mut surface).unwrap();

        let headings = surface
            .events()
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::Heading { .. }))
            .count();
        assert_eq!(headings, 7);
        assert!(!surface.events().iter().any(|e| matches!(e, SurfaceEvent::Value(_))));
    }

    #[test]
    fn test_persist_step_feeds_query_step() {
        let dir = tempdir().unwrap();
        let runner = offline_runner(dir.path());

        let mut state = SessionState::new();
        // Step 4 persists the index; step 5 loads and queries it.
        state.set(&TutorialRunner::trigger_key(3), true);
        state.set(&TutorialRunner::trigger_key(4), true);

        let mut surface = BufferSurface::new();
        runner.render_all(&state, &mut surface).unwrap();

        assert!(dir.path().join("index").join("chunks.json").exists());

        let answers: Vec<_> = surface
            .events()
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::Value(OutputBlock::Value(v)) => v.get("answer"),
                _ => None,
            })
            .collect();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0], "Michael Jackson is the King of Pop");
    }

    #[test]
    fn test_query_without_persisted_index_fails_the_pass() {
        let dir = tempdir().unwrap();
        let runner = offline_runner(dir.path());

        let mut state = SessionState::new();
        // Step 5 queries the persisted index, which no step has written.
        state.set(&TutorialRunner::trigger_key(4), true);

        let err = runner
            .render_all(&state, &mut BufferSurface::new())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("No persisted index"));
    }

    #[test]
    fn test_structured_parse_step_answers_offline() {
        let dir = tempdir().unwrap();
        let runner = offline_runner(dir.path());

        let mut state = SessionState::new();
        state.set(&TutorialRunner::trigger_key(6), true);

        let mut surface = BufferSurface::new();
        runner.render_all(&state, &mut surface).unwrap();

        assert!(surface.events().iter().any(|e| matches!(
            e,
            SurfaceEvent::Value(OutputBlock::Text(t)) if t.contains("King of Pop")
        )));
    }

    #[test]
    fn test_offline_passes_are_deterministic() {
        let dir = tempdir().unwrap();
        let runner = offline_runner(dir.path());

        let mut state = SessionState::new();
        state.set(&TutorialRunner::trigger_key(2), true);

        let mut first = BufferSurface::new();
        runner.render_all(&state, &mut first).unwrap();
        let mut second = BufferSurface::new();
        runner.render_all(&state, &mut second).unwrap();

        // created_at timestamps differ across builds; compare shapes instead
        assert_eq!(first.events().len(), second.events().len());
    }
}
