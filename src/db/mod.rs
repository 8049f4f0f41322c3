// src/db/mod.rs
//! Storage for questions and choices.
//!
//! Handlers and services never reach for a global connection; they receive a
//! [`PollStore`] through the application state. Two implementations exist:
//!
//! - [`PgStore`]: PostgreSQL via `sqlx`, used whenever `DATABASE_URL` is set.
//! - [`MemoryStore`]: in-process maps behind a lock, used for local runs and tests.
//!
//! Vote counts only ever change through [`PollStore::increment_votes`], which
//! both implementations perform as a single store-side operation.
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::models::{Choice, ChoiceId, Question, QuestionId};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Constraint violated: {0}")]
    Constraint(String),
}

#[async_trait]
pub trait PollStore: Send + Sync {
    /// Up to `limit` questions, newest `pub_date` first.
    async fn latest_questions(&self, limit: usize) -> Result<Vec<Question>, StoreError>;

    async fn question(&self, id: QuestionId) -> Result<Option<Question>, StoreError>;

    /// Choices of a question in creation order.
    async fn choices(&self, question_id: QuestionId) -> Result<Vec<Choice>, StoreError>;

    /// Adds one vote to `choice_id` if it belongs to `question_id`.
    ///
    /// Returns `false` when no such choice exists under that question, in
    /// which case nothing was written.
    async fn increment_votes(
        &self,
        question_id: QuestionId,
        choice_id: ChoiceId,
    ) -> Result<bool, StoreError>;

    async fn create_question(
        &self,
        question_text: &str,
        pub_date: chrono::DateTime<chrono::Utc>,
    ) -> Result<Question, StoreError>;

    async fn create_choice(
        &self,
        question_id: QuestionId,
        choice_text: &str,
    ) -> Result<Choice, StoreError>;
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<Pool<Postgres>, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Picks the store described by the configuration.
pub async fn connect(config: &Config) -> Result<Arc<dyn PollStore>, StoreError> {
    match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.database_max_connections).await?;
            let store = PgStore::new(pool);
            store.migrate().await?;
            info!("Using PostgreSQL store");
            Ok(Arc::new(store))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
