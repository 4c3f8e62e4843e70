//! Conversation memory — a bounded FIFO log of question/answer turns.
//!
//! One memory instance belongs to one logical conversation. Turns are
//! immutable once appended; when the log exceeds `max_turns`, the oldest
//! turn is evicted. The formatted recent-history view feeds the next
//! generation call so follow-up questions stay coherent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One recorded exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    /// Empty only when generation failed.
    pub answer: String,
    /// Concatenated retrieved-document text used for the answer; empty when
    /// no documents were found.
    pub context: String,
    pub timestamp: DateTime<Utc>,
}

/// Bounded conversation history, oldest turn first.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    turns: VecDeque<ConversationTurn>,
    max_turns: usize,
}

impl ConversationMemory {
    /// Create an empty memory retaining at most `max_turns` turns.
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(max_turns),
            max_turns,
        }
    }

    /// Append a turn, evicting the oldest when over capacity.
    pub fn add_turn(
        &mut self,
        question: impl Into<String>,
        answer: impl Into<String>,
        context: impl Into<String>,
    ) {
        self.turns.push_back(ConversationTurn {
            question: question.into(),
            answer: answer.into(),
            context: context.into(),
            timestamp: Utc::now(),
        });
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    /// Format the last `min(n, len)` turns as a `Q:`/`A:` transcript,
    /// oldest of the selected window first. Pure read.
    pub fn get_recent_context(&self, n: usize) -> String {
        let skip = self.turns.len().saturating_sub(n);
        self.turns
            .iter()
            .skip(skip)
            .map(|turn| format!("Q: {}\nA: {}", turn.question, turn.answer))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Empty the history; used at explicit session reset.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Iterate the retained turns, oldest first.
    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }
}
