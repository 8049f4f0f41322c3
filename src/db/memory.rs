use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{PollStore, StoreError};
use crate::models::{Choice, ChoiceId, Question, QuestionId, MAX_TEXT_LEN};

#[derive(Default)]
struct Tables {
    questions: BTreeMap<QuestionId, Question>,
    choices: BTreeMap<ChoiceId, Choice>,
    next_question_id: i64,
    next_choice_id: i64,
}

/// Keeps everything in process memory. Writers take the lock exclusively, so
/// an increment is never interleaved with another write.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// Same limit as the VARCHAR(200) columns.
fn check_text_len(column: &str, text: &str) -> Result<(), StoreError> {
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(StoreError::Constraint(format!(
            "{column} longer than {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}

#[async_trait]
impl PollStore for MemoryStore {
    async fn latest_questions(&self, limit: usize) -> Result<Vec<Question>, StoreError> {
        let tables = self.tables.read().await;

        let mut questions: Vec<Question> = tables.questions.values().cloned().collect();
        questions.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        questions.truncate(limit);

        Ok(questions)
    }

    async fn question(&self, id: QuestionId) -> Result<Option<Question>, StoreError> {
        Ok(self.tables.read().await.questions.get(&id).cloned())
    }

    async fn choices(&self, question_id: QuestionId) -> Result<Vec<Choice>, StoreError> {
        let tables = self.tables.read().await;

        Ok(tables
            .choices
            .values()
            .filter(|choice| choice.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn increment_votes(
        &self,
        question_id: QuestionId,
        choice_id: ChoiceId,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;

        match tables.choices.get_mut(&choice_id) {
            Some(choice) if choice.question_id == question_id => {
                choice.votes = choice.votes.checked_add(1).ok_or_else(|| {
                    StoreError::Constraint(format!("votes of choice {choice_id} out of range"))
                })?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn create_question(
        &self,
        question_text: &str,
        pub_date: DateTime<Utc>,
    ) -> Result<Question, StoreError> {
        check_text_len("question_text", question_text)?;
        let mut tables = self.tables.write().await;

        tables.next_question_id += 1;
        let question = Question {
            id: QuestionId(tables.next_question_id),
            question_text: question_text.to_string(),
            pub_date,
        };
        tables.questions.insert(question.id, question.clone());

        Ok(question)
    }

    async fn create_choice(
        &self,
        question_id: QuestionId,
        choice_text: &str,
    ) -> Result<Choice, StoreError> {
        check_text_len("choice_text", choice_text)?;
        let mut tables = self.tables.write().await;

        // Postgres enforces the same through the foreign key.
        if !tables.questions.contains_key(&question_id) {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }

        tables.next_choice_id += 1;
        let choice = Choice {
            id: ChoiceId(tables.next_choice_id),
            question_id,
            choice_text: choice_text.to_string(),
            votes: 0,
        };
        tables.choices.insert(choice.id, choice.clone());

        Ok(choice)
    }
}
