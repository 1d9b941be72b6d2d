//! Prompt templates
//!
//! Templates carry `{context_str}` and `{query_str}` placeholders filled at
//! query time.

/// A prompt template with context and query placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The question-answering template the walkthrough demonstrates.
    pub fn qa_default() -> Self {
        Self::new(concat!(
            "We have provided context information below. \n",
            "---------------------\n",
            "{context_str}",
            "\n---------------------\n",
            "Given this information, please answer the question: {query_str}\n",
        ))
    }

    /// Fill the placeholders with the given context and query.
    pub fn format(&self, context_str: &str, query_str: &str) -> String {
        self.template
            .replace("{context_str}", context_str)
            .replace("{query_str}", query_str)
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}
