//! Grounded prompt construction.

use serde::{Deserialize, Serialize};

use crate::rag::context::format_movie_context;
use crate::types::Movie;

pub const SYSTEM_PROMPT: &str = "You are a knowledgeable and friendly movie expert assistant. \
Answer the user's question using ONLY the movie data provided below. \
Be conversational but concise, aim for 2-4 sentences unless the user asks for detail. \
If the data doesn't contain enough information, say so honestly. \
Never invent facts not present in the data.";

/// A system instruction plus the user-turn text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationPrompt {
    pub system: String,
    pub user: String,
}

impl GenerationPrompt {
    pub fn len(&self) -> usize {
        self.system.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}

/// Prompt that confines the answer to the retrieved movies.
pub fn build_grounded_prompt(question: &str, movies: &[Movie]) -> GenerationPrompt {
    let context = format_movie_context(movies);
    GenerationPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user: format!("MOVIE DATA:\n{}\n\nUSER QUESTION: {}", context, question.trim()),
    }
}
