//! The query orchestrator.
//!
//! One [`Assistant`] owns one conversation: configuration, conversation
//! memory, and handles to the retrieval and generation collaborators. Each
//! query runs strictly sequentially through retrieve, generate, verify,
//! record, and assemble. The answer surfaced to the caller is either a
//! verified generation or the fixed not-available text; an answer the
//! verifier rejected is never returned, and carries no source attribution.

use crate::config::AssistantConfig;
use crate::embeddings::{Embedder, HashEmbedder};
use crate::error::AssistantError;
use crate::llm::{CompletionRequest, LlmProvider};
use crate::memory::ConversationMemory;
use crate::retrieval::{RetrievedDocument, Retriever};
use crate::verify::{FactVerifier, NO_DOCUMENTS_WARNING, VerificationResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fixed answer used whenever nothing grounded can be said.
pub const NOT_AVAILABLE_ANSWER: &str = "That information is not available in the documents.";

const SYSTEM_PROMPT: &str = "Answer the question using ONLY information provided in the context. \
If the information is not present in the context, respond exactly with: \
\"That information is not available in the documents.\" \
Do not include any uncertain or speculative information.";

/// What a query returns to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub question: String,
    /// Verbatim model answer when verification passed, otherwise the fixed
    /// not-available text.
    pub answer: String,
    /// Fraction of answer statements supported by the retrieved context.
    pub confidence: f64,
    /// Deduplicated source descriptors, first-seen retrieval order. Empty
    /// when the answer did not pass verification.
    pub sources: Vec<String>,
    /// Verifier warnings plus retrieval-stage warnings.
    pub warnings: Vec<String>,
    pub is_valid: bool,
}

/// RAG question-answering session.
pub struct Assistant {
    config: AssistantConfig,
    retriever: Arc<dyn Retriever>,
    llm: Arc<dyn LlmProvider>,
    verifier: FactVerifier,
    memory: ConversationMemory,
}

impl Assistant {
    /// Build a session from validated configuration and collaborator handles.
    pub fn new(
        config: AssistantConfig,
        retriever: Arc<dyn Retriever>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self, AssistantError> {
        config.validate()?;
        let embedder: Arc<dyn Embedder> =
            Arc::new(HashEmbedder::new(config.retrieval.embedding_dimensions));
        let verifier = FactVerifier::from_config(&config.verification, embedder);
        let memory = ConversationMemory::new(config.conversation.max_turns);
        Ok(Self {
            config,
            retriever,
            llm,
            verifier,
            memory,
        })
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Reset the conversation.
    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }

    /// Answer a question over the corpus.
    ///
    /// Content-quality issues (no documents, empty generation, failed
    /// verification) come back inside the `QueryResult` with warnings; an
    /// error is returned only when a collaborator backend is unavailable.
    pub async fn query(&mut self, question: &str) -> Result<QueryResult, AssistantError> {
        let question = question.trim();
        debug!(question, "received query");

        let history = if self.config.conversation.enabled && !self.memory.is_empty() {
            Some(self.memory.get_recent_context(self.config.conversation.max_turns))
        } else {
            None
        };

        // Retrieve. A backend failure propagates; an empty result set
        // short-circuits to the fixed not-available response.
        let documents = self
            .retriever
            .retrieve(question, self.config.retrieval.top_k)
            .await?;
        if documents.is_empty() {
            warn!(question, "no relevant documents retrieved");
            return Ok(self.record_and_assemble(
                question,
                NOT_AVAILABLE_ANSWER.to_string(),
                String::new(),
                Vec::new(),
                VerificationResult {
                    is_valid: false,
                    confidence: 0.0,
                    warnings: vec![NO_DOCUMENTS_WARNING.to_string()],
                    checks: Vec::new(),
                },
            ));
        }

        let context = documents
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let sources = dedup_sources(&documents);

        // Generate. A transport failure propagates; empty text flows into
        // the verifier, whose short-circuit treats it as zero confidence.
        let request = CompletionRequest {
            system: Some(SYSTEM_PROMPT.to_string()),
            prompt: build_prompt(history.as_deref(), &context, question),
            temperature: self.config.llm.temperature,
            max_tokens: self.config.llm.max_tokens,
        };
        let response = self.llm.complete(request).await?;
        let answer = response.text.trim().to_string();

        // Verify.
        let verification = self.verifier.validate(&answer, &context, &sources);
        info!(
            question,
            confidence = verification.confidence,
            is_valid = verification.is_valid,
            sources = sources.len(),
            "query verified"
        );

        Ok(self.record_and_assemble(question, answer, context, sources, verification))
    }

    /// Record the turn and assemble the caller-facing result.
    ///
    /// When verification failed, the surfaced answer is the fixed
    /// not-available text and attribution is stripped. The recorded turn
    /// holds the surfaced answer, so rejected generations never leak back
    /// through the conversation history either.
    fn record_and_assemble(
        &mut self,
        question: &str,
        answer: String,
        context: String,
        sources: Vec<String>,
        verification: VerificationResult,
    ) -> QueryResult {
        let (answer, sources) = if verification.is_valid {
            (answer, sources)
        } else {
            (NOT_AVAILABLE_ANSWER.to_string(), Vec::new())
        };

        if self.config.conversation.enabled {
            self.memory.add_turn(question, answer.as_str(), context);
        }

        QueryResult {
            question: question.to_string(),
            answer,
            confidence: verification.confidence,
            sources,
            warnings: verification.warnings,
            is_valid: verification.is_valid,
        }
    }
}

/// Build the grounded-answer prompt.
fn build_prompt(history: Option<&str>, context: &str, question: &str) -> String {
    let mut prompt = String::new();
    if let Some(history) = history {
        prompt.push_str("Previous conversation:\n");
        prompt.push_str(history);
        prompt.push_str("\n\n");
    }
    prompt.push_str("Context:\n");
    prompt.push_str(context);
    prompt.push_str("\n\nQuestion: ");
    prompt.push_str(question);
    prompt.push_str("\n\nAnswer:");
    prompt
}

/// Deduplicate source descriptors, keeping first-seen retrieval order.
fn dedup_sources(documents: &[RetrievedDocument]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();
    for doc in documents {
        if seen.insert(doc.source.as_str()) {
            sources.push(doc.source.clone());
        }
    }
    sources
}
