//! End-to-end tests for the query orchestrator with mock collaborators.

use async_trait::async_trait;
use citeguard_core::assistant::{Assistant, NOT_AVAILABLE_ANSWER};
use citeguard_core::config::AssistantConfig;
use citeguard_core::error::{AssistantError, LlmError, RetrievalError};
use citeguard_core::llm::{LlmProvider, MockLlmProvider};
use citeguard_core::retrieval::{RetrievedDocument, Retriever};
use citeguard_core::verify::NO_DOCUMENTS_WARNING;
use pretty_assertions::assert_eq;
use std::sync::Arc;

/// Retriever returning a fixed document list.
struct FixedRetriever {
    documents: Vec<RetrievedDocument>,
}

impl FixedRetriever {
    fn with_documents(documents: Vec<(&str, &str, f32)>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .map(|(source, text, score)| RetrievedDocument {
                    text: text.to_string(),
                    source: source.to_string(),
                    score,
                })
                .collect(),
        }
    }

    fn empty() -> Self {
        Self {
            documents: Vec::new(),
        }
    }
}

#[async_trait]
impl Retriever for FixedRetriever {
    async fn retrieve(
        &self,
        _query: &str,
        k: usize,
    ) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        Ok(self.documents.iter().take(k).cloned().collect())
    }
}

/// Retriever whose backend is down.
struct UnavailableRetriever;

#[async_trait]
impl Retriever for UnavailableRetriever {
    async fn retrieve(
        &self,
        _query: &str,
        _k: usize,
    ) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        Err(RetrievalError::Index {
            message: "store unreachable".to_string(),
        })
    }
}

const DATA_SCIENCE_FACT: &str =
    "Data science unifies statistics, computer science, and domain knowledge.";

fn assistant(retriever: Arc<dyn Retriever>, llm: Arc<dyn LlmProvider>) -> Assistant {
    Assistant::new(AssistantConfig::default(), retriever, llm).unwrap()
}

// -- Scenario A: answer fully grounded in the retrieved context ------------

#[tokio::test]
async fn test_in_context_answer_is_valid_with_full_confidence() {
    let retriever = Arc::new(FixedRetriever::with_documents(vec![(
        "Data science",
        DATA_SCIENCE_FACT,
        0.92,
    )]));
    let llm = Arc::new(MockLlmProvider::with_response(DATA_SCIENCE_FACT));
    let mut assistant = assistant(retriever, llm);

    let result = assistant.query("What does data science unify?").await.unwrap();
    assert!(result.is_valid);
    assert_eq!(result.confidence, 1.0);
    assert_eq!(result.answer, DATA_SCIENCE_FACT);
    assert_eq!(result.sources, vec!["Data science"]);
    assert!(result.warnings.is_empty());
}

// -- Scenario B: retrieval finds nothing -----------------------------------

#[tokio::test]
async fn test_out_of_context_question_gets_fixed_answer() {
    let retriever = Arc::new(FixedRetriever::empty());
    // Generation must never be consulted on this path.
    let llm = Arc::new(MockLlmProvider::unreachable());
    let mut assistant = assistant(retriever, llm);

    let result = assistant.query("Who is the CEO of Google?").await.unwrap();
    assert_eq!(result.answer, NOT_AVAILABLE_ANSWER);
    assert_eq!(result.confidence, 0.0);
    assert!(result.sources.is_empty());
    assert_eq!(result.warnings, vec![NO_DOCUMENTS_WARNING]);
    assert!(!result.is_valid);
}

// -- Scenario C: partially supported answer --------------------------------

#[tokio::test]
async fn test_partially_supported_answer_confidence_is_half() {
    let retriever = Arc::new(FixedRetriever::with_documents(vec![(
        "Data science",
        DATA_SCIENCE_FACT,
        0.92,
    )]));
    let answer = format!("{DATA_SCIENCE_FACT} Giraffes sleep standing upright in the savanna.");
    let llm = Arc::new(MockLlmProvider::with_response(&answer));

    let mut config = AssistantConfig::default();
    config.verification.similarity_threshold = 0.3;
    config.verification.validity_threshold = Some(0.5);
    let mut assistant = Assistant::new(config, retriever, llm).unwrap();

    let result = assistant.query("What does data science unify?").await.unwrap();
    assert_eq!(result.confidence, 0.5);
    // 0.5 >= validity_threshold, so the answer passes.
    assert!(result.is_valid);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("Giraffes"));
}

#[tokio::test]
async fn test_partially_supported_answer_fails_strict_gate() {
    let retriever = Arc::new(FixedRetriever::with_documents(vec![(
        "Data science",
        DATA_SCIENCE_FACT,
        0.92,
    )]));
    let answer = format!("{DATA_SCIENCE_FACT} Giraffes sleep standing upright in the savanna.");
    let llm = Arc::new(MockLlmProvider::with_response(&answer));

    let mut config = AssistantConfig::default();
    config.verification.validity_threshold = Some(0.75);
    let mut assistant = Assistant::new(config, retriever, llm).unwrap();

    let result = assistant.query("What does data science unify?").await.unwrap();
    assert_eq!(result.confidence, 0.5);
    assert!(!result.is_valid);
    // The rejected generation is replaced and carries no attribution.
    assert_eq!(result.answer, NOT_AVAILABLE_ANSWER);
    assert!(result.sources.is_empty());
}

// -- Gating: an unverified answer is never surfaced ------------------------

#[tokio::test]
async fn test_unsupported_answer_is_replaced_and_unattributed() {
    let retriever = Arc::new(FixedRetriever::with_documents(vec![(
        "Data science",
        DATA_SCIENCE_FACT,
        0.92,
    )]));
    let llm = Arc::new(MockLlmProvider::with_response(
        "The moon is made of green cheese and orbits backwards.",
    ));
    let mut assistant = assistant(retriever, llm);

    let result = assistant.query("What does data science unify?").await.unwrap();
    assert!(!result.is_valid);
    assert_eq!(result.answer, NOT_AVAILABLE_ANSWER);
    assert!(result.sources.is_empty());
    assert!(!result.warnings.is_empty());
    // And the hallucination does not leak into conversation memory either.
    let recorded: Vec<_> = assistant.memory().turns().collect();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].answer, NOT_AVAILABLE_ANSWER);
}

#[tokio::test]
async fn test_empty_generation_is_zero_confidence_not_an_error() {
    let retriever = Arc::new(FixedRetriever::with_documents(vec![(
        "Data science",
        DATA_SCIENCE_FACT,
        0.92,
    )]));
    let llm = Arc::new(MockLlmProvider::with_response("   "));
    let mut assistant = assistant(retriever, llm);

    let result = assistant.query("What does data science unify?").await.unwrap();
    assert!(!result.is_valid);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.answer, NOT_AVAILABLE_ANSWER);
}

// -- Collaborator unavailability propagates as an error --------------------

#[tokio::test]
async fn test_retrieval_backend_failure_propagates() {
    let llm = Arc::new(MockLlmProvider::with_response("unused"));
    let mut assistant = assistant(Arc::new(UnavailableRetriever), llm);

    let err = assistant.query("any question").await.unwrap_err();
    assert!(matches!(err, AssistantError::Retrieval(_)));
}

#[tokio::test]
async fn test_generation_backend_failure_propagates() {
    let retriever = Arc::new(FixedRetriever::with_documents(vec![(
        "Data science",
        DATA_SCIENCE_FACT,
        0.92,
    )]));
    let mut assistant = assistant(retriever, Arc::new(MockLlmProvider::unreachable()));

    let err = assistant.query("any question").await.unwrap_err();
    assert!(matches!(err, AssistantError::Llm(LlmError::Connection { .. })));
}

// -- Conversation memory across turns --------------------------------------

#[tokio::test]
async fn test_turns_are_recorded_in_order_and_bounded() {
    let retriever = Arc::new(FixedRetriever::with_documents(vec![(
        "Data science",
        DATA_SCIENCE_FACT,
        0.92,
    )]));
    let llm = Arc::new(MockLlmProvider::with_response(DATA_SCIENCE_FACT));

    let mut config = AssistantConfig::default();
    config.conversation.max_turns = 2;
    let mut assistant = Assistant::new(config, retriever, llm).unwrap();

    for i in 1..=3 {
        assistant.query(&format!("question {i}")).await.unwrap();
    }

    let questions: Vec<_> = assistant
        .memory()
        .turns()
        .map(|t| t.question.clone())
        .collect();
    assert_eq!(questions, vec!["question 2", "question 3"]);
}

#[tokio::test]
async fn test_no_documents_turn_is_still_recorded() {
    let retriever = Arc::new(FixedRetriever::empty());
    let llm = Arc::new(MockLlmProvider::with_response("unused"));
    let mut assistant = assistant(retriever, llm);

    assistant.query("Who is the CEO of Google?").await.unwrap();
    let recorded: Vec<_> = assistant.memory().turns().collect();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].answer, NOT_AVAILABLE_ANSWER);
    assert_eq!(recorded[0].context, "");
}

#[tokio::test]
async fn test_clear_memory_resets_session() {
    let retriever = Arc::new(FixedRetriever::with_documents(vec![(
        "Data science",
        DATA_SCIENCE_FACT,
        0.92,
    )]));
    let llm = Arc::new(MockLlmProvider::with_response(DATA_SCIENCE_FACT));
    let mut assistant = assistant(retriever, llm);

    assistant.query("What does data science unify?").await.unwrap();
    assert_eq!(assistant.memory().len(), 1);
    assistant.clear_memory();
    assert!(assistant.memory().is_empty());
}
