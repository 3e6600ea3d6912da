//! The questionnaire rule set.
//!
//! A rule-per-step port of the advisory state machine. Every firing
//! declares at most one new `Action` fact; collaborator failures are
//! turned into state transitions here, never propagated as exceptions.

use tracing::{info, warn};

use super::risk;
use super::session::SessionContext;
use crate::codec::{self, Code, RAIN_ANSWERS, WIND_ANSWERS};
use crate::error::{SkycastResult, ValidationError, WorkflowError};
use crate::fact::{Fact, FactKey};
use crate::sources::CompositeKey;
use crate::state::{ActivityKind, ModelKind, Place, SessionState, SkyCondition, TempBand, TimeOfDay};
use crate::workflow::{Condition, FactPattern, Rule, WorkflowEngine};

const YES_NO: [&str; 2] = ["yes", "no"];

fn parse_answer<T>(
    answer: String,
    parse: impl FnOnce(&str) -> Option<T>,
) -> SkycastResult<T> {
    parse(&answer).map_or_else(
        || Err(ValidationError::UnknownAnswer { answer }.into()),
        Ok,
    )
}

fn require<T>(value: Option<T>, rule: &'static str, binding: &str) -> SkycastResult<T> {
    value.ok_or_else(|| {
        WorkflowError::ActionFailed {
            rule: rule.to_string(),
            message: format!("missing binding '{binding}'"),
        }
        .into()
    })
}

/// Registers the full rule set, in the order that breaks salience ties.
pub fn register_all(engine: &mut WorkflowEngine<SessionContext>) {
    engine.register_rule(ask_search_mode());
    engine.register_rule(fetch_online());
    engine.register_rule(online_success());
    engine.register_rule(online_failure());
    engine.register_rule(declined());
    engine.register_rule(manual_entry());
    engine.register_rule(ask_activity());
    engine.register_rule(choose_model());
    engine.register_rule(print_activity());
    engine.register_rule(print_accessory());
}

fn ask_search_mode() -> Rule<SessionContext> {
    Rule::new(
        "ask-search-mode",
        1,
        Condition::state(SessionState::AskSearchMode),
        |ctx: &mut SessionContext, _, effects| {
            let answer = ctx
                .prompt()
                .ask("Look up the weather online for your city?", &YES_NO)?;
            if answer == "yes" {
                effects.declare(Fact::action(SessionState::FetchOnline));
            } else {
                effects.declare(Fact::action(SessionState::ManualEntry));
            }
            Ok(())
        },
    )
}

fn fetch_online() -> Rule<SessionContext> {
    Rule::new(
        "fetch-online",
        1,
        Condition::All(vec![
            Condition::state(SessionState::FetchOnline),
            Condition::Not(FactPattern::key(FactKey::Fetch)),
        ]),
        |ctx: &mut SessionContext, _, effects| {
            let location = ctx.prompt().ask_text("Where are you?")?;
            match ctx.weather().fetch(&location) {
                Ok(report) => {
                    info!(location = location.as_str(), ?report, "online weather retrieved");
                    // The online path carries no separate rain reading.
                    let rain = Code::MIN;
                    let band = codec::classify_band(report.temperature_c, report.sky, rain);
                    ctx.prompt().inform(&format!(
                        "\n------------------- WEATHER RETRIEVED -------------------\n\
                         Location -> {location}\n\
                         Time of day -> {}\n\
                         Sky -> {}\n\
                         Temperature -> {:.1} C ({})\n\
                         Wind -> {:.1} km/h\n\
                         ----------------------------------------------------------\n",
                        report.time_of_day,
                        report.sky,
                        report.temperature_c,
                        band.label(),
                        report.wind_kmh,
                    ));
                    effects.declare(Fact::time_of_day(report.time_of_day));
                    effects.declare(Fact::sky(report.sky));
                    effects.declare(Fact::rain(rain));
                    effects.declare(Fact::wind(codec::wind_code(report.wind_kmh)));
                    effects.declare(Fact::temp_band(band));
                    effects.declare(Fact::fetch(true));
                }
                Err(error) => {
                    warn!(location = location.as_str(), %error, "online fetch failed");
                    ctx.prompt()
                        .inform(&format!("Could not retrieve the weather: {error}"));
                    effects.declare(Fact::fetch(false));
                }
            }
            Ok(())
        },
    )
}

fn online_success() -> Rule<SessionContext> {
    Rule::new(
        "online-success",
        0,
        Condition::is(FactPattern::equals(FactKey::Fetch, true)),
        |_, _, effects| {
            effects.declare(Fact::action(SessionState::AskActivity));
            Ok(())
        },
    )
}

fn online_failure() -> Rule<SessionContext> {
    Rule::new(
        "online-failure",
        0,
        Condition::All(vec![
            Condition::is(FactPattern::equals(FactKey::Fetch, false)),
            Condition::Not(FactPattern::key(FactKey::Manual)),
        ]),
        |ctx: &mut SessionContext, _, effects| {
            let answer = ctx
                .prompt()
                .ask("Enter the weather data manually instead?", &YES_NO)?;
            effects.declare(Fact::manual(answer == "yes"));
            Ok(())
        },
    )
}

fn declined() -> Rule<SessionContext> {
    Rule::new(
        "declined",
        0,
        Condition::is(FactPattern::equals(FactKey::Manual, false)),
        |ctx: &mut SessionContext, _, effects| {
            ctx.prompt().inform("Closing the advisor.");
            effects.declare(Fact::action(SessionState::Aborted));
            Ok(())
        },
    )
}

fn manual_entry() -> Rule<SessionContext> {
    Rule::new(
        "manual-entry",
        0,
        Condition::AnyOf(vec![
            Condition::is(FactPattern::equals(FactKey::Manual, true)),
            Condition::state(SessionState::ManualEntry),
        ]),
        |ctx: &mut SessionContext, _, effects| {
            let time = parse_answer(
                ctx.prompt().ask("Choose the time of day", &TimeOfDay::OPTIONS)?,
                TimeOfDay::from_answer,
            )?;
            let sky = parse_answer(
                ctx.prompt()
                    .ask("Current sky conditions", &SkyCondition::OPTIONS)?,
                SkyCondition::from_answer,
            )?;
            let rain = if sky == SkyCondition::Precipitation {
                parse_answer(
                    ctx.prompt().ask("Rain intensity", &RAIN_ANSWERS)?,
                    codec::rain_answer_code,
                )?
            } else {
                Code::MIN
            };
            let temperature = ctx.prompt().ask_number("Temperature in degrees Celsius:")?;
            let wind = parse_answer(
                ctx.prompt()
                    .ask("How strong does the wind feel?", &WIND_ANSWERS)?,
                codec::wind_answer_code,
            )?;

            let band = codec::classify_band(temperature, sky, rain);
            effects.declare(Fact::time_of_day(time));
            effects.declare(Fact::sky(sky));
            effects.declare(Fact::rain(rain));
            effects.declare(Fact::wind(wind));
            effects.declare(Fact::temp_band(band));
            effects.declare(Fact::action(SessionState::AskActivity));
            Ok(())
        },
    )
}

fn ask_activity() -> Rule<SessionContext> {
    Rule::new(
        "ask-activity",
        0,
        Condition::All(vec![
            Condition::state(SessionState::AskActivity),
            Condition::is(FactPattern::bind(FactKey::Wind, "wind")),
            Condition::is(FactPattern::bind(FactKey::Rain, "rain")),
            Condition::is(FactPattern::bind(FactKey::TempBand, "band")),
        ]),
        |ctx: &mut SessionContext, bindings, effects| {
            let activity = parse_answer(
                ctx.prompt()
                    .ask("Which kind of activity do you prefer today?", &ActivityKind::OPTIONS)?,
                ActivityKind::from_answer,
            )?;
            effects.declare(Fact::activity(activity));

            let indoor = ctx
                .prompt()
                .ask("Do you have access to a gym or another indoor facility?", &YES_NO)?;
            effects.declare(Fact::indoor(indoor == "yes"));

            let band = require(bindings.band("band"), "ask-activity", "band")?;
            let wind = require(bindings.code("wind"), "ask-activity", "wind")?;
            let rain = require(bindings.code("rain"), "ask-activity", "rain")?;

            let elevated = match risk::assess(ctx, band, wind, rain) {
                Ok(Some(posterior)) => {
                    info!(
                        band = band.label(),
                        risk = posterior.risk_score(),
                        "risk assessment complete"
                    );
                    posterior.is_elevated()
                }
                Ok(None) => false,
                Err(error) => {
                    // Model failure aborts the assessment, not the session.
                    warn!(%error, "risk assessment failed; continuing without an alert");
                    ctx.prompt()
                        .inform("Risk assessment unavailable; continuing without it.");
                    false
                }
            };

            if elevated {
                ctx.prompt().inform(
                    "\n=========================  ALERT BOX  ==========================\n\
                     ---------------- !!! Weather alert detected !!! ----------------\n\
                     ================================================================",
                );
                effects.declare(Fact::action(SessionState::ChooseModel));
            } else {
                match band {
                    TempBand::Hot(_) => ctx.prompt().inform(
                        "Optimal conditions for the proposed activity. No weather alert detected.",
                    ),
                    _ => ctx.prompt().inform(
                        "\n=========================  ALERT BOX  ==========================\n\
                         --------------- No weather alert detected ---------------\n\
                         ================================================================",
                    ),
                }
                effects.declare(Fact::action(SessionState::PrintActivity));
            }
            Ok(())
        },
    )
}

fn choose_model() -> Rule<SessionContext> {
    Rule::new(
        "choose-model",
        1,
        Condition::All(vec![
            Condition::state(SessionState::ChooseModel),
            Condition::is(FactPattern::bind(FactKey::Wind, "wind")),
            Condition::is(FactPattern::bind(FactKey::Rain, "rain")),
            Condition::is(FactPattern::bind(FactKey::TempBand, "band")),
            Condition::is(FactPattern::bind(FactKey::Indoor, "indoor")),
        ]),
        |ctx: &mut SessionContext, bindings, effects| {
            let choice = parse_answer(
                ctx.prompt().ask(
                    "Weather anomaly detected. Select the risk model:\n\
                     (1) given network\n\
                     (2) network learned from the observation dataset\n\
                     Answer:",
                    &ModelKind::OPTIONS,
                )?,
                ModelKind::from_answer,
            )?;
            effects.declare(Fact::model(choice));

            let band = require(bindings.band("band"), "choose-model", "band")?;
            let wind = require(bindings.code("wind"), "choose-model", "wind")?;
            let rain = require(bindings.code("rain"), "choose-model", "rain")?;
            let indoor = require(bindings.truth("indoor"), "choose-model", "indoor")?;

            if choice == ModelKind::Learned {
                if let Some(topology) = risk::topology_for(band) {
                    if !risk::learn_from_dataset(ctx, topology) {
                        ctx.prompt().inform(
                            "The observation dataset is unavailable; using the given network.",
                        );
                    }
                }
            }

            match risk::assess(ctx, band, wind, rain) {
                Ok(Some(posterior)) => {
                    ctx.prompt().inform(
                        "================================================================",
                    );
                    if indoor {
                        ctx.prompt()
                            .inform("With access to an indoor facility the risk is nullified!");
                    } else {
                        ctx.prompt().inform(&format!(
                            "The dissatisfaction risk is {:.2}% due to the weather.",
                            posterior.risk_score()
                        ));
                    }
                    ctx.prompt().inform(
                        "================================================================",
                    );
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(%error, "final risk query failed");
                    ctx.prompt().inform("The final risk figure is unavailable.");
                }
            }

            effects.declare(Fact::action(SessionState::PrintActivity));
            Ok(())
        },
    )
}

fn print_activity() -> Rule<SessionContext> {
    Rule::new(
        "print-activity",
        0,
        Condition::All(vec![
            Condition::state(SessionState::PrintActivity),
            Condition::is(FactPattern::bind(FactKey::Activity, "activity")),
            Condition::is(FactPattern::bind(FactKey::Indoor, "indoor")),
            Condition::is(FactPattern::bind(FactKey::TimeOfDay, "time")),
            Condition::is(FactPattern::bind(FactKey::TempBand, "band")),
            Condition::is(FactPattern::bind(FactKey::Sky, "sky")),
        ]),
        |ctx: &mut SessionContext, bindings, effects| {
            let key = CompositeKey {
                kind: require(bindings.kind("activity"), "print-activity", "activity")?,
                place: Place::from_indoor_access(require(
                    bindings.truth("indoor"),
                    "print-activity",
                    "indoor",
                )?),
                time: require(bindings.time("time"), "print-activity", "time")?,
                band: require(bindings.band("band"), "print-activity", "band")?,
                sky: require(bindings.sky("sky"), "print-activity", "sky")?,
            };

            print_recommendation(ctx, &key);
            effects.declare(Fact::action(SessionState::PrintAccessory));
            Ok(())
        },
    )
}

/// Walks the fallback chain and prints the first hit, or the no-match
/// notice. Catalog failures degrade to the notice as well.
fn print_recommendation(ctx: &mut SessionContext, key: &CompositeKey) {
    let chain = key.fallback_chain();
    for (attempt, candidate) in chain.iter().enumerate() {
        let found = match ctx.knowledge().lookup(candidate) {
            Ok(found) => found,
            Err(error) => {
                warn!(key = %candidate, %error, "catalog lookup failed");
                break;
            }
        };
        if let Some(recommendation) = found {
            if attempt > 0 {
                ctx.prompt().inform(
                    "Notice: no exact match for these conditions; showing the closest alternative.",
                );
            }
            ctx.prompt().inform(&format!(
                "\n-------------------- RECOMMENDED ACTIVITIES --------------------\n\
                 PRIMARY:\t{}\n\
                 SECONDARY:\t{}\n\n\
                 ------------------ NOT RECOMMENDED TODAY -----------------------\n\
                 {}\n\n\
                 -------------------- RECOMMENDED ACCESSORY ---------------------\n\
                 {}",
                recommendation.primary,
                recommendation.secondary,
                recommendation.alternative,
                recommendation.accessory,
            ));
            return;
        }
    }
    ctx.prompt()
        .inform("No recommendation available for these conditions.");
}

fn print_accessory() -> Rule<SessionContext> {
    Rule::new(
        "print-accessory",
        0,
        Condition::state(SessionState::PrintAccessory),
        |ctx: &mut SessionContext, _, effects| {
            ctx.prompt().inform(
                "\n================ ADVISORY SESSION COMPLETE ================",
            );
            effects.declare(Fact::action(SessionState::Completed));
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer_rejects_unknown() {
        let err = parse_answer("noon".to_string(), TimeOfDay::from_answer).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_require_reports_binding_name() {
        let err = require::<Code>(None, "some-rule", "wind").unwrap_err();
        assert!(err.is_workflow());
        assert!(format!("{err}").contains("wind"));
    }

    #[test]
    fn test_register_all_is_complete() {
        let mut engine: WorkflowEngine<SessionContext> = WorkflowEngine::new();
        register_all(&mut engine);
        // One rule per questionnaire step.
        assert_eq!(engine.rule_count(), 10);
    }
}
