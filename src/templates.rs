//! Server-rendered pages.
//!
//! Templates are compiled into the binary and parsed once on first use. They
//! reverse routes through the `url(name=..., id=...)` function instead of
//! hard-coding paths.
use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tera::{Context, Tera, Value};

use crate::models::{Choice, Question, QuestionId};
use crate::poll::QuestionPage;
use crate::routes::Route;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("404.html", include_str!("../templates/404.html")),
    ("polls/index.html", include_str!("../templates/polls/index.html")),
    ("polls/detail.html", include_str!("../templates/polls/detail.html")),
    ("polls/results.html", include_str!("../templates/polls/results.html")),
];

static ENGINE: OnceLock<Tera> = OnceLock::new();

fn engine() -> tera::Result<&'static Tera> {
    if let Some(tera) = ENGINE.get() {
        return Ok(tera);
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())?;
    tera.register_function("url", UrlFor);

    Ok(ENGINE.get_or_init(|| tera))
}

struct UrlFor;

impl tera::Function for UrlFor {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let name = args
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| tera::Error::msg("url() needs a `name` argument"))?;
        let id = args.get("id").and_then(Value::as_i64).map(QuestionId);

        Route::from_name(name, id)
            .map(|route| Value::String(route.path()))
            .ok_or_else(|| tera::Error::msg(format!("No route named `{name}` for id {id:?}")))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

#[derive(Serialize)]
struct IndexEntry<'a> {
    #[serde(flatten)]
    question: &'a Question,
    recent: bool,
}

pub fn render_index(page: &QuestionPage, now: DateTime<Utc>) -> tera::Result<String> {
    let entries: Vec<IndexEntry> = page
        .iter()
        .map(|question| IndexEntry {
            question,
            recent: question.was_published_recently(now),
        })
        .collect();

    let mut context = Context::new();
    context.insert("latest_question_list", &entries);
    engine()?.render("polls/index.html", &context)
}

pub fn render_detail(
    question: &Question,
    choices: &[Choice],
    error_message: Option<&str>,
) -> tera::Result<String> {
    let mut context = Context::new();
    context.insert("question", question);
    context.insert("choices", choices);
    if let Some(message) = error_message {
        context.insert("error_message", message);
    }
    engine()?.render("polls/detail.html", &context)
}

pub fn render_results(question: &Question, choices: &[Choice]) -> tera::Result<String> {
    let mut context = Context::new();
    context.insert("question", question);
    context.insert("choices", choices);
    engine()?.render("polls/results.html", &context)
}

pub fn render_not_found(detail: &str) -> tera::Result<String> {
    let mut context = Context::new();
    context.insert("detail", detail);
    engine()?.render("404.html", &context)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::models::ChoiceId;

    #[fixture]
    fn question() -> Question {
        Question {
            id: QuestionId(1),
            question_text: "Favourite colour?".to_string(),
            pub_date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[fixture]
    fn choices() -> Vec<Choice> {
        vec![
            Choice {
                id: ChoiceId(1),
                question_id: QuestionId(1),
                choice_text: "Red".to_string(),
                votes: 1,
            },
            Choice {
                id: ChoiceId(2),
                question_id: QuestionId(1),
                choice_text: "Blue".to_string(),
                votes: 3,
            },
        ]
    }

    #[test]
    fn test_all_templates_parse() {
        assert!(engine().is_ok());
    }

    #[rstest]
    fn test_detail_has_vote_form(question: Question, choices: Vec<Choice>) {
        let page = render_detail(&question, &choices, None).unwrap();

        assert!(page.contains("Favourite colour?"));
        assert!(page.contains(r#"action="/polls/1/vote/""#));
        assert!(page.contains(r#"name="choice" id="choice1" value="1""#));
        assert!(page.contains(r#"name="choice" id="choice2" value="2""#));
        assert!(!page.contains(r#"class="error""#));
    }

    #[rstest]
    fn test_detail_shows_error_message(question: Question, choices: Vec<Choice>) {
        let page = render_detail(&question, &choices, Some("You didn't select a choice.")).unwrap();

        assert!(page.contains("You didn&#x27;t select a choice."));
    }

    #[rstest]
    fn test_detail_falls_back_to_question_number(mut question: Question, choices: Vec<Choice>) {
        question.question_text.clear();

        let page = render_detail(&question, &choices, None).unwrap();

        assert!(page.contains("<title>You're looking at question 1.</title>"));
        assert!(page.contains("<h1>You're looking at question 1.</h1>"));
    }

    #[rstest]
    fn test_results_pluralizes_votes(question: Question, choices: Vec<Choice>) {
        let page = render_results(&question, &choices).unwrap();

        assert!(page.contains("Red -- 1 vote<"));
        assert!(page.contains("Blue -- 3 votes<"));
        assert!(page.contains(r#"href="/polls/1/""#));
    }

    #[rstest]
    fn test_index_lists_questions(question: Question) {
        let now = question.pub_date + Duration::hours(2);
        let page = render_index(&QuestionPage::from(vec![question]), now).unwrap();

        assert!(page.contains(r#"<a href="/polls/1/">Favourite colour?</a>"#));
        assert!(page.contains(r#"class="recent""#));
    }

    #[test]
    fn test_index_without_questions() {
        let page = render_index(&QuestionPage::default(), Utc::now()).unwrap();

        assert!(page.contains("No polls are available."));
    }

    #[test]
    fn test_unknown_route_name_fails() {
        let mut args = HashMap::new();
        args.insert("name".to_string(), Value::String("admin".to_string()));

        assert!(tera::Function::call(&UrlFor, &args).is_err());
    }
}
