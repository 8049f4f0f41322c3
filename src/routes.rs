// routes.rs
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::handlers;
use crate::models::QuestionId;
use crate::state::AppState;

/// Named routes, reversible into paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Index,
    Detail(QuestionId),
    Results(QuestionId),
    Vote(QuestionId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Index => "/polls/".to_string(),
            Route::Detail(id) => format!("/polls/{id}/"),
            Route::Results(id) => format!("/polls/{id}/result/"),
            Route::Vote(id) => format!("/polls/{id}/vote/"),
        }
    }

    /// Looks a route up by name; every route except `index` needs an id.
    pub fn from_name(name: &str, id: Option<QuestionId>) -> Option<Self> {
        match (name, id) {
            ("index", _) => Some(Route::Index),
            ("detail", Some(id)) => Some(Route::Detail(id)),
            ("results", Some(id)) => Some(Route::Results(id)),
            ("vote", Some(id)) => Some(Route::Vote(id)),
            _ => None,
        }
    }
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/polls/", get(handlers::index))
        .route("/polls/{question_id}/", get(handlers::detail))
        .route("/polls/{question_id}/result/", get(handlers::results))
        .route("/polls/{question_id}/vote/", post(handlers::vote))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("The requested page does not exist.".to_string())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Route::Index, "/polls/")]
    #[case(Route::Detail(QuestionId(5)), "/polls/5/")]
    #[case(Route::Results(QuestionId(5)), "/polls/5/result/")]
    #[case(Route::Vote(QuestionId(5)), "/polls/5/vote/")]
    fn test_reverse(#[case] route: Route, #[case] expected: &str) {
        assert_eq!(route.path(), expected);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Route::from_name("index", None), Some(Route::Index));
        assert_eq!(
            Route::from_name("results", Some(QuestionId(3))),
            Some(Route::Results(QuestionId(3)))
        );
        assert_eq!(Route::from_name("vote", None), None);
        assert_eq!(Route::from_name("admin", Some(QuestionId(3))), None);
    }
}
