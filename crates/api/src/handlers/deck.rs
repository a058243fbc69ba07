use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use kotoba_core::model::{Language, LessonId, WordId, WordPair};
use kotoba_core::quiz::{Direction, SessionConfig};

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extractors::{AppPath, AppQuery};

#[derive(Debug, Default, Deserialize)]
pub struct DeckQuery {
    #[serde(default)]
    pub shuffle: bool,
    #[serde(default)]
    pub direction: Direction,
}

#[derive(Debug, Serialize)]
pub struct DeckCard {
    pub word_id: WordId,
    pub prompt: String,
    pub answer: String,
    pub furigana: Option<String>,
    pub pronunciation: Option<String>,
}

impl DeckCard {
    fn new(word: &WordPair, direction: Direction) -> Self {
        Self {
            word_id: word.id(),
            prompt: word.term(direction.prompt_language()).to_string(),
            answer: word.term(direction.answer_language()).to_string(),
            furigana: word.furigana().map(str::to_string),
            pronunciation: word.pronunciation().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeckResponse {
    pub lesson_id: LessonId,
    pub direction: Direction,
    pub prompt_language: Language,
    pub answer_language: Language,
    pub shuffle: bool,
    pub total_cards: usize,
    pub cards: Vec<DeckCard>,
}

/// GET /api/lessons/{id}/deck?shuffle=&direction=
///
/// The deck in session order. Studying happens client side, so nothing
/// about the session is kept on the server.
pub async fn get_deck(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    AppPath(lesson_id): AppPath<u64>,
    AppQuery(query): AppQuery<DeckQuery>,
) -> Result<Json<DeckResponse>, ApiError> {
    let lesson_id = LessonId::new(lesson_id);
    let config = SessionConfig::new(query.direction, query.shuffle);
    let session = state
        .services
        .study()
        .start_session(user, lesson_id, config)
        .await?;

    let cards = session
        .deck()
        .iter()
        .map(|word| DeckCard::new(word, config.direction))
        .collect();
    Ok(Json(DeckResponse {
        lesson_id,
        direction: config.direction,
        prompt_language: config.direction.prompt_language(),
        answer_language: config.direction.answer_language(),
        shuffle: config.shuffle,
        total_cards: session.total_cards(),
        cards,
    }))
}
