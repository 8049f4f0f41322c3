// fixtures.rs
use std::path::Path;

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use crate::db::{PollStore, StoreError};
use crate::models::NewQuestion;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed fixture: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub fn parse(raw: &str) -> Result<Vec<NewQuestion>, FixtureError> {
    Ok(serde_json::from_str(raw)?)
}

/// Inserts every question and its choices; returns how many questions were added.
pub async fn install(store: &dyn PollStore, questions: &[NewQuestion]) -> Result<usize, FixtureError> {
    for new in questions {
        let pub_date = new.pub_date.unwrap_or_else(Utc::now);
        let question = store.create_question(&new.question_text, pub_date).await?;

        for choice_text in &new.choices {
            store.create_choice(question.id, choice_text).await?;
        }
    }

    Ok(questions.len())
}

pub async fn load_file(store: &dyn PollStore, path: &Path) -> Result<usize, FixtureError> {
    let raw = tokio::fs::read_to_string(path).await?;
    let count = install(store, &parse(&raw)?).await?;

    info!("Loaded {count} questions from {}", path.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    const FIXTURE: &str = r#"[
        {
            "question_text": "Favourite colour?",
            "pub_date": "2024-05-01T12:00:00Z",
            "choices": ["Red", "Blue"]
        },
        { "question_text": "Tea or coffee?" }
    ]"#;

    #[tokio::test]
    async fn test_install_creates_questions_and_choices() {
        let store = MemoryStore::new();
        let questions = parse(FIXTURE).unwrap();

        let count = install(&store, &questions).await.unwrap();
        assert_eq!(count, 2);

        let latest = store.latest_questions(5).await.unwrap();
        assert_eq!(latest.len(), 2);
        // No pub_date means "now", so it sorts first.
        assert_eq!(latest[0].question_text, "Tea or coffee?");

        let choices = store.choices(latest[1].id).await.unwrap();
        let texts: Vec<&str> = choices.iter().map(|c| c.choice_text.as_str()).collect();
        assert_eq!(texts, ["Red", "Blue"]);
        assert!(choices.iter().all(|c| c.votes == 0));
    }

    #[test]
    fn test_parse_rejects_missing_text() {
        let result = parse(r#"[{ "choices": ["Red"] }]"#);

        assert!(matches!(result, Err(FixtureError::Json(_))));
    }

    #[tokio::test]
    async fn test_load_bundled_fixture() {
        let store = MemoryStore::new();
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/polls.json"));

        let count = load_file(&store, path).await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(store.latest_questions(5).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let store = MemoryStore::new();

        let result = load_file(&store, Path::new("does/not/exist.json")).await;

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }
}
