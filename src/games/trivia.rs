//! Multiple-choice questions from the Open Trivia Database.

use std::time::Duration;

use backoff::ExponentialBackoff;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{seq::SliceRandom, Rng};
use serde::Deserialize;
use tracing::{debug, warn};

const QUESTION_URL: &str = "https://opentdb.com/api.php";
const CATEGORY_URL: &str = "https://opentdb.com/api_category.php";

/// Gives up retrying a flaky api after this long.
const MAX_RETRY_TIME: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum TriviaError {
    #[error("couldn't reach the trivia api: {0}")]
    Request(#[from] reqwest::Error),

    #[error("the trivia api returned no question (response code {0})")]
    NoResults(u8),

    #[error("the trivia api sent a badly encoded field: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("the trivia api sent a field that isn't utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl TriviaError {
    /// Rate limits and connection trouble are worth retrying.
    fn backoff(self) -> backoff::Error<Self> {
        let transient = match &self {
            Self::Request(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err.status().is_some_and(|status| {
                        status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    })
            }
            Self::NoResults(code) => *code == RATE_LIMITED,
            Self::Decode(_) | Self::Utf8(_) => false,
        };

        if transient {
            backoff::Error::transient(self)
        } else {
            backoff::Error::permanent(self)
        }
    }
}

const RATE_LIMITED: u8 = 5;

#[derive(Debug, Deserialize)]
struct QuestionResponse {
    response_code: u8,
    results: Vec<RawQuestion>,
}

/// A question as the api sends it, every field base64 encoded.
#[derive(Debug, Clone, Deserialize)]
struct RawQuestion {
    category: String,
    difficulty: String,
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

fn decode(field: &str) -> Result<String, TriviaError> {
    Ok(String::from_utf8(STANDARD.decode(field)?)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub category: String,
    pub difficulty: String,
    options: Vec<String>,
    correct: usize,
}

impl Question {
    fn from_raw(raw: &RawQuestion, rng: &mut impl Rng) -> Result<Self, TriviaError> {
        let correct_answer = decode(&raw.correct_answer)?;

        let mut options = raw
            .incorrect_answers
            .iter()
            .map(|answer| decode(answer))
            .collect::<Result<Vec<_>, _>>()?;
        options.push(correct_answer.clone());
        options.shuffle(rng);

        let correct = options
            .iter()
            .position(|option| *option == correct_answer)
            .unwrap_or_default();

        Ok(Self {
            text: decode(&raw.question)?,
            category: decode(&raw.category)?,
            difficulty: decode(&raw.difficulty)?,
            options,
            correct,
        })
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_answer(&self) -> &str {
        &self.options[self.correct]
    }

    /// `None` unless `input` is the number of one of the options.
    pub fn check(&self, input: &str) -> Option<bool> {
        let choice: usize = input.trim().parse().ok()?;

        (1..=self.options.len())
            .contains(&choice)
            .then(|| choice - 1 == self.correct)
    }

    pub fn description(&self) -> String {
        let options: Vec<String> = self
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("**{}.** {option}", i + 1))
            .collect();

        format!("**{}**\n\n{}", self.text, options.join("\n"))
    }

    pub fn footer(&self) -> String {
        let mut difficulty = self.difficulty.chars();
        let difficulty = match difficulty.next() {
            Some(first) => first.to_uppercase().chain(difficulty).collect(),
            None => String::new(),
        };

        format!("Category: {} | Difficulty: {difficulty}", self.category)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct CategoryResponse {
    trivia_categories: Vec<Category>,
}

#[derive(Debug, Clone, Default)]
pub struct TriviaClient {
    client: reqwest::Client,
}

impl TriviaClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn backoff() -> ExponentialBackoff {
        ExponentialBackoff {
            max_elapsed_time: Some(MAX_RETRY_TIME),
            ..Default::default()
        }
    }

    pub async fn question(&self, category: Option<u32>) -> Result<Question, TriviaError> {
        let mut query = vec![
            ("amount", "1".to_string()),
            ("type", "multiple".to_string()),
            ("encode", "base64".to_string()),
        ];
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }

        let raw = backoff::future::retry_notify(
            Self::backoff(),
            || async {
                let response: QuestionResponse = self
                    .client
                    .get(QUESTION_URL)
                    .query(&query)
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(|err| TriviaError::from(err).backoff())?
                    .json()
                    .await
                    .map_err(|err| TriviaError::from(err).backoff())?;

                match response.results.into_iter().next() {
                    Some(raw) if response.response_code == 0 => Ok(raw),
                    _ => Err(TriviaError::NoResults(response.response_code).backoff()),
                }
            },
            |err, _| warn!("{err}, retrying..."),
        )
        .await?;

        let question = Question::from_raw(&raw, &mut rand::thread_rng())?;
        debug!(category = %question.category, "fetched trivia question");

        Ok(question)
    }

    pub async fn categories(&self) -> Result<Vec<Category>, TriviaError> {
        let response: CategoryResponse = backoff::future::retry_notify(
            Self::backoff(),
            || async {
                self.client
                    .get(CATEGORY_URL)
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(|err| TriviaError::from(err).backoff())?
                    .json()
                    .await
                    .map_err(|err| TriviaError::from(err).backoff())
            },
            |err, _| warn!("{err}, retrying..."),
        )
        .await?;

        Ok(response.trivia_categories)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};

    use super::{Question, QuestionResponse, TriviaError};

    const RESPONSE: &str = r#"{
        "response_code": 0,
        "results": [{
            "type": "bXVsdGlwbGU=",
            "difficulty": "ZWFzeQ==",
            "category": "U2NpZW5jZTogQ29tcHV0ZXJz",
            "question": "V2hhdCBkb2VzIENQVSBzdGFuZCBmb3I/",
            "correct_answer": "Q2VudHJhbCBQcm9jZXNzaW5nIFVuaXQ=",
            "incorrect_answers": [
                "Q2VudHJhbCBQcm9jZXNzIFVuaXQ=",
                "Q29tcHV0ZXIgUGVyc29uYWwgVW5pdA==",
                "Q2VudHJhbCBQcm9jZXNzb3IgVW5pdA=="
            ]
        }]
    }"#;

    fn question(seed: u64) -> Question {
        let response: QuestionResponse = serde_json::from_str(RESPONSE).expect("valid json");
        Question::from_raw(&response.results[0], &mut StdRng::seed_from_u64(seed))
            .expect("valid base64")
    }

    #[test]
    fn decodes_every_field() {
        let question = question(1);

        assert_eq!(question.text, "What does CPU stand for?");
        assert_eq!(question.category, "Science: Computers");
        assert_eq!(question.correct_answer(), "Central Processing Unit");
        assert_eq!(question.options().len(), 4);
        assert_eq!(
            question.footer(),
            "Category: Science: Computers | Difficulty: Easy"
        );
    }

    #[test]
    fn shuffling_tracks_the_answer() {
        for seed in 0..20 {
            let question = question(seed);
            let answer = question
                .options()
                .iter()
                .position(|o| o == "Central Processing Unit")
                .expect("answer is an option")
                + 1;

            for choice in 1..=4 {
                assert_eq!(question.check(&choice.to_string()), Some(choice == answer));
            }
        }
    }

    #[test]
    fn ignores_non_answers() {
        let question = question(3);

        for input in ["0", "5", "-1", "one", "", "1.5"] {
            assert_eq!(question.check(input), None);
        }
        assert!(question.check(" 2 ").is_some());
    }

    #[test]
    fn description_numbers_options() {
        let question = question(4);
        let description = question.description();

        assert!(description.starts_with("**What does CPU stand for?**\n\n**1.** "));
        assert!(description.contains("\n**4.** "));
    }

    #[test]
    fn rejects_bad_base64() {
        let mut response: QuestionResponse = serde_json::from_str(RESPONSE).expect("valid json");
        response.results[0].question = "not base64!".to_string();

        let result = Question::from_raw(&response.results[0], &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(TriviaError::Decode(_))));
    }
}
