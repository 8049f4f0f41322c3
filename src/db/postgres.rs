use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{PollStore, StoreError};
use crate::models::{Choice, ChoiceId, Question, QuestionId};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl PollStore for PgStore {
    async fn latest_questions(&self, limit: usize) -> Result<Vec<Question>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, question_text, pub_date
            FROM polls_question
            ORDER BY pub_date DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn question(&self, id: QuestionId) -> Result<Option<Question>, StoreError> {
        let question = sqlx::query_as::<_, Question>(
            "SELECT id, question_text, pub_date FROM polls_question WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    async fn choices(&self, question_id: QuestionId) -> Result<Vec<Choice>, StoreError> {
        let choices = sqlx::query_as::<_, Choice>(
            r#"
            SELECT id, question_id, choice_text, votes
            FROM polls_choice
            WHERE question_id = $1
            ORDER BY id
            "#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(choices)
    }

    async fn increment_votes(
        &self,
        question_id: QuestionId,
        choice_id: ChoiceId,
    ) -> Result<bool, StoreError> {
        // Ownership check and increment in one statement; Postgres row locks
        // serialize concurrent voters.
        let result = sqlx::query(
            r#"
            UPDATE polls_choice
            SET votes = votes + 1
            WHERE id = $1 AND question_id = $2
            "#,
        )
        .bind(choice_id)
        .bind(question_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn create_question(
        &self,
        question_text: &str,
        pub_date: DateTime<Utc>,
    ) -> Result<Question, StoreError> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO polls_question (question_text, pub_date)
            VALUES ($1, $2)
            RETURNING id, question_text, pub_date
            "#,
        )
        .bind(question_text)
        .bind(pub_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(question)
    }

    async fn create_choice(
        &self,
        question_id: QuestionId,
        choice_text: &str,
    ) -> Result<Choice, StoreError> {
        let choice = sqlx::query_as::<_, Choice>(
            r#"
            INSERT INTO polls_choice (question_id, choice_text, votes)
            VALUES ($1, $2, 0)
            RETURNING id, question_id, choice_text, votes
            "#,
        )
        .bind(question_id)
        .bind(choice_text)
        .fetch_one(&self.pool)
        .await?;

        Ok(choice)
    }
}
