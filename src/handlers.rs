// handlers.rs
use axum::{
    extract::{rejection::RawFormRejection, Path, RawForm, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;

use crate::error::AppError;
use crate::models::{QuestionId, VoteForm};
use crate::poll;
use crate::routes::Route;
use crate::state::AppState;
use crate::templates;

/// Path ids only match plain digits; anything else is an unknown page.
fn parse_question_id(raw: &str) -> Result<QuestionId, AppError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::NotFound(format!("No poll at /polls/{raw}/.")));
    }

    raw.parse()
        .map(QuestionId)
        .map_err(|_| AppError::NotFound(format!("No question matches id {raw}.")))
}

/// List the latest questions
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let page = state.index_query().run(state.store.as_ref()).await?;

    Ok(Html(templates::render_index(&page, Utc::now())?))
}

/// Question text and the vote form
pub async fn detail(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let question_id = parse_question_id(&question_id)?;
    let (question, choices) = poll::get_question_with_choices(state.store.as_ref(), question_id).await?;

    Ok(Html(templates::render_detail(&question, &choices, None)?))
}

/// Vote counts for every choice of a question
pub async fn results(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let question_id = parse_question_id(&question_id)?;
    let (question, choices) = poll::get_question_with_choices(state.store.as_ref(), question_id).await?;

    Ok(Html(templates::render_results(&question, &choices)?))
}

/// Count a vote, then send the browser to the results page.
///
/// A bad selection redisplays the form with an error instead of failing.
pub async fn vote(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
    form: Result<RawForm, RawFormRejection>,
) -> Result<Response, AppError> {
    let question_id = parse_question_id(&question_id)?;
    // An unreadable body is treated like an empty form.
    let form = form
        .map(|RawForm(body)| VoteForm::from_urlencoded(&body))
        .unwrap_or_default();

    match poll::cast_vote(state.store.as_ref(), question_id, form.choice.as_deref()).await {
        Ok(question) => Ok(Redirect::to(&Route::Results(question.id).path()).into_response()),
        Err(AppError::Validation(message)) => {
            let (question, choices) =
                poll::get_question_with_choices(state.store.as_ref(), question_id).await?;
            let page = templates::render_detail(&question, &choices, Some(&message))?;
            Ok(Html(page).into_response())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1", Some(1))]
    #[case("0042", Some(42))]
    #[case("", None)]
    #[case("-1", None)]
    #[case("abc", None)]
    #[case("1.5", None)]
    #[case("99999999999999999999", None)]
    fn test_parse_question_id(#[case] raw: &str, #[case] expected: Option<i64>) {
        let parsed = parse_question_id(raw).ok().map(|id| id.0);

        assert_eq!(parsed, expected);
    }
}
