// src/poll.rs
use tracing::{debug, info};

use crate::db::PollStore;
use crate::error::AppError;
use crate::models::{Choice, ChoiceId, Question, QuestionId};

pub const NO_CHOICE_SELECTED: &str = "You didn't select a choice.";

/// The latest questions, as returned by [`ListQuery::run`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionPage {
    questions: Vec<Question>,
}

impl QuestionPage {
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }
}

impl From<Vec<Question>> for QuestionPage {
    fn from(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

impl<'a> IntoIterator for &'a QuestionPage {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: usize,
    pub allow_empty: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: 5,
            allow_empty: true,
        }
    }
}

impl ListQuery {
    pub async fn run(&self, store: &dyn PollStore) -> Result<QuestionPage, AppError> {
        let page = QuestionPage::from(store.latest_questions(self.limit).await?);

        if page.is_empty() && !self.allow_empty {
            return Err(AppError::NotFound(
                "Empty list and allow_empty is false.".to_string(),
            ));
        }

        Ok(page)
    }
}

pub async fn get_question(store: &dyn PollStore, id: QuestionId) -> Result<Question, AppError> {
    store
        .question(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No question matches id {id}.")))
}

/// A question together with its choices, for the detail and results pages.
pub async fn get_question_with_choices(
    store: &dyn PollStore,
    id: QuestionId,
) -> Result<(Question, Vec<Choice>), AppError> {
    let question = get_question(store, id).await?;
    let choices = store.choices(question.id).await?;

    Ok((question, choices))
}

/// Records one vote for `selection` under `question_id`.
///
/// The counter is bumped by the store itself (`votes = votes + 1`), never
/// read and written back from here. A missing, malformed or foreign choice
/// is a [`AppError::Validation`] and nothing is written.
pub async fn cast_vote(
    store: &dyn PollStore,
    question_id: QuestionId,
    selection: Option<&str>,
) -> Result<Question, AppError> {
    let question = get_question(store, question_id).await?;

    let Some(choice_id) = selection.and_then(|raw| raw.trim().parse::<i64>().ok()).map(ChoiceId) else {
        debug!(%question_id, ?selection, "Vote without a usable choice");
        return Err(AppError::Validation(NO_CHOICE_SELECTED.to_string()));
    };

    if !store.increment_votes(question.id, choice_id).await? {
        debug!(%question_id, %choice_id, "Choice does not belong to question");
        return Err(AppError::Validation(NO_CHOICE_SELECTED.to_string()));
    }

    info!(%question_id, %choice_id, "Vote recorded");
    Ok(question)
}
