//! End-to-end questionnaire scenarios with scripted collaborators.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use skycast::advisor::{Advisor, SessionContext, SessionOutcome};
use skycast::error::SourceError;
use skycast::sources::{
    CatalogKnowledgeBase, UserPrompt, WeatherReport, WeatherSource,
};
use skycast::state::{SkyCondition, TimeOfDay};

/// Prompt that replays a fixed script and records everything shown.
struct ScriptedPrompt {
    answers: Arc<Mutex<VecDeque<String>>>,
    output: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPrompt {
    fn new(answers: &[&str]) -> (Self, Arc<Mutex<VecDeque<String>>>, Arc<Mutex<Vec<String>>>) {
        let answers = Arc::new(Mutex::new(
            answers.iter().map(ToString::to_string).collect::<VecDeque<_>>(),
        ));
        let output = Arc::new(Mutex::new(Vec::new()));
        let prompt = Self {
            answers: Arc::clone(&answers),
            output: Arc::clone(&output),
        };
        (prompt, answers, output)
    }

    fn next_answer(&self, question: &str) -> String {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("script exhausted at question: {question}"))
    }
}

impl UserPrompt for ScriptedPrompt {
    fn ask(&mut self, question: &str, options: &[&str]) -> Result<String, SourceError> {
        let answer = self.next_answer(question);
        assert!(
            options.iter().any(|opt| opt.eq_ignore_ascii_case(&answer)),
            "scripted answer {answer:?} is not an option of {question:?}"
        );
        Ok(answer.to_ascii_lowercase())
    }

    fn ask_text(&mut self, question: &str) -> Result<String, SourceError> {
        Ok(self.next_answer(question))
    }

    fn ask_number(&mut self, question: &str) -> Result<f64, SourceError> {
        let answer = self.next_answer(question);
        Ok(answer.parse().expect("scripted number"))
    }

    fn inform(&mut self, message: &str) {
        self.output.lock().unwrap().push(message.to_string());
    }
}

/// Weather source returning a fixed report or a fixed failure.
struct StubWeather {
    report: Option<WeatherReport>,
}

impl StubWeather {
    fn success(report: WeatherReport) -> Self {
        Self {
            report: Some(report),
        }
    }

    fn failing() -> Self {
        Self { report: None }
    }
}

impl WeatherSource for StubWeather {
    fn fetch(&self, location: &str) -> Result<WeatherReport, SourceError> {
        self.report.ok_or_else(|| SourceError::LocationNotFound {
            query: location.to_string(),
        })
    }
}

fn run_session(
    answers: &[&str],
    weather: StubWeather,
) -> (SessionOutcome, Vec<String>, usize) {
    let (prompt, remaining, output) = ScriptedPrompt::new(answers);
    let ctx = SessionContext::new(
        Box::new(prompt),
        Box::new(weather),
        Box::new(CatalogKnowledgeBase::builtin().unwrap()),
    );
    let outcome = Advisor::new(ctx).run().unwrap();
    let output = output.lock().unwrap().clone();
    let leftover = remaining.lock().unwrap().len();
    (outcome, output, leftover)
}

fn output_contains(output: &[String], needle: &str) -> bool {
    output.iter().any(|line| line.contains(needle))
}

#[test]
fn offline_cold_session_raises_alert_and_asks_for_model() {
    // 10 C is cold code 2; breezy wind is code 1; clear sky means rain 0.
    // Worst parent 2 gives risk 40% which is above the 35% threshold.
    let (outcome, output, leftover) = run_session(
        &[
            "no",       // search online?
            "morning",  // time of day
            "clear",    // sky
            "10",       // temperature
            "breezy",   // wind
            "sport",    // activity
            "no",       // indoor access
            "1",        // risk model: given network
        ],
        StubWeather::failing(),
    );

    assert_eq!(outcome, SessionOutcome::Completed);
    assert_eq!(leftover, 0);
    assert!(output_contains(&output, "Weather alert detected"));
    assert!(output_contains(&output, "The dissatisfaction risk is 40.00%"));
    assert!(output_contains(&output, "RECOMMENDED ACTIVITIES"));
    // Outdoor sport in cold clear morning weather is a direct catalog hit.
    assert!(output_contains(&output, "Brisk hike"));
}

#[test]
fn offline_normal_session_skips_risk_assessment() {
    // 20 C with a clear sky stays in the normal band: no inference at all,
    // so no model question is ever asked.
    let (outcome, output, leftover) = run_session(
        &[
            "no", "morning", "clear", "20", "breezy", "sport", "no",
        ],
        StubWeather::failing(),
    );

    assert_eq!(outcome, SessionOutcome::Completed);
    assert_eq!(leftover, 0);
    assert!(!output_contains(&output, "Weather alert detected"));
    assert!(!output_contains(&output, "dissatisfaction risk"));
    assert!(output_contains(&output, "Park run"));
}

#[test]
fn online_session_learns_from_dataset_and_nullifies_indoor_risk() {
    // 18 km/h wind is code 1; 10 C routes to the cold branch (code 2).
    let report = WeatherReport {
        time_of_day: TimeOfDay::Morning,
        sky: SkyCondition::Clear,
        temperature_c: 10.0,
        wind_kmh: 18.0,
    };
    let (outcome, output, leftover) = run_session(
        &[
            "yes",      // search online
            "Bologna",  // location
            "cultural", // activity
            "yes",      // indoor access
            "2",        // risk model: learned from dataset
        ],
        StubWeather::success(report),
    );

    assert_eq!(outcome, SessionOutcome::Completed);
    assert_eq!(leftover, 0);
    assert!(output_contains(&output, "WEATHER RETRIEVED"));
    assert!(output_contains(&output, "Weather alert detected"));
    assert!(output_contains(
        &output,
        "With access to an indoor facility the risk is nullified!"
    ));
    // Indoor cultural under a cold clear morning falls back to the normal
    // band entry.
    assert!(output_contains(&output, "closest alternative"));
    assert!(output_contains(&output, "Museum visit"));
}

#[test]
fn online_failure_then_decline_aborts() {
    let (outcome, output, leftover) = run_session(
        &[
            "yes",      // search online
            "Atlantis", // location that cannot be resolved
            "no",       // decline manual entry
        ],
        StubWeather::failing(),
    );

    assert_eq!(outcome, SessionOutcome::Aborted);
    assert_eq!(leftover, 0);
    assert!(output_contains(&output, "Could not retrieve the weather"));
    assert!(output_contains(&output, "Closing the advisor."));
    assert!(!output_contains(&output, "RECOMMENDED ACTIVITIES"));
}

#[test]
fn online_failure_falls_back_to_manual_entry() {
    // Heavy rain at 20 C forces the cold branch (critical override), and
    // the out-of-domain cold mapping yields the worst code: risk 80%.
    let (outcome, output, leftover) = run_session(
        &[
            "yes",           // search online
            "Atlantis",      // unresolvable location
            "yes",           // fall back to manual entry
            "evening",       // time of day
            "precipitation", // sky
            "heavy",         // rain intensity
            "20",            // temperature
            "calm",          // wind
            "recreational",  // activity
            "no",            // indoor access
            "1",             // risk model
        ],
        StubWeather::failing(),
    );

    assert_eq!(outcome, SessionOutcome::Completed);
    assert_eq!(leftover, 0);
    assert!(output_contains(&output, "Weather alert detected"));
    assert!(output_contains(&output, "The dissatisfaction risk is 80.00%"));
    // Outdoor under precipitation falls back to the indoor cloudy entry.
    assert!(output_contains(&output, "closest alternative"));
    assert!(output_contains(&output, "Billiards night"));
}

#[test]
fn rain_question_only_appears_under_precipitation() {
    // A cloudy manual session never asks for rain intensity; the script
    // would be exhausted otherwise.
    let (outcome, _, leftover) = run_session(
        &[
            "no", "evening", "cloudy", "22", "calm", "recreational", "no",
        ],
        StubWeather::failing(),
    );
    assert_eq!(outcome, SessionOutcome::Completed);
    assert_eq!(leftover, 0);
}
