//! Interactive quiz session over stdin.
//!
//! The terminal is a thin observer: every keystroke becomes a [`UiEvent`],
//! every printed line comes from a state snapshot or a one-shot effect. The
//! session itself runs in the spawned controller loop.

use std::time::Duration;

use quizflow_core::{
    aggregate, Cooldown, Effect, QuizPhase, QuizState, SessionHandle, Ticker, UiEvent,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;

use super::{print_json, repository, CliResult};

const HELP: &str =
    "commands: <letter> select, submit, next, abandon, yes, no, retry, clear, quit";

enum Input {
    Event(UiEvent),
    Retry,
    Quit,
    Help,
}

fn parse_input(line: &str) -> Input {
    match line {
        "quit" => Input::Quit,
        "submit" => Input::Event(UiEvent::SubmitAnswer),
        "next" => Input::Event(UiEvent::NextQuestion),
        "abandon" => Input::Event(UiEvent::RequestAbandon),
        "yes" => Input::Event(UiEvent::ConfirmAbandon),
        "no" => Input::Event(UiEvent::CancelAbandon),
        "clear" => Input::Event(UiEvent::ClearError),
        "retry" => Input::Retry,
        letter if letter.len() == 1 && letter.chars().all(|c| c.is_ascii_alphabetic()) => {
            Input::Event(UiEvent::SelectAnswer(letter.to_ascii_uppercase()))
        }
        _ => Input::Help,
    }
}

/// Start a fresh session, or resume one when `resume` carries a session id.
pub async fn run(cfg: &Config, resume: Option<String>) -> CliResult {
    let repo = repository(cfg)?;
    let (handle, mut state_rx, mut effects) =
        SessionHandle::spawn(repo.clone(), Duration::from_secs(1));
    if !handle
        .send(UiEvent::InitializeQuiz { session_id: resume })
        .await
    {
        return Err("session loop ended before it could start".into());
    }

    // Retries are held back briefly after a failure; the local ticker
    // drives the countdown independently of the session clock.
    let mut retry_gate = Cooldown::new(cfg.session.retry_cooldown_secs);
    let (_ticker, mut ticks) = Ticker::spawn(Duration::from_secs(1));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut renderer = Renderer::default();
    println!("{HELP}");

    let finished = loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break None;
                }
                let state = state_rx.borrow_and_update().clone();
                renderer.render(&state);
            }
            effect = effects.recv() => match effect {
                Some(Effect::NavigateToResults { session_id }) => break Some(session_id),
                Some(Effect::NavigateBack) => {
                    println!("session abandoned");
                    break None;
                }
                Some(Effect::ShowAbandonConfirmation) => {
                    println!("abandon this quiz? (yes/no)");
                }
                Some(Effect::ShowRetryableError { message }) => {
                    retry_gate.begin();
                    println!("{message} ('retry' available in {}s)", retry_gate.remaining_secs());
                }
                None => break None,
            },
            Some(()) = ticks.recv() => retry_gate.tick(),
            line = lines.next_line() => {
                let Some(line) = line? else { break None };
                match parse_input(line.trim()) {
                    Input::Quit => break None,
                    Input::Help => println!("{HELP}"),
                    Input::Retry => {
                        if retry_gate.is_ready() {
                            if !handle.send(UiEvent::Retry).await {
                                break None;
                            }
                        } else {
                            println!("retry available in {}s", retry_gate.remaining_secs());
                        }
                    }
                    Input::Event(event) => {
                        if !handle.send(event).await {
                            break None;
                        }
                    }
                }
            }
        }
    };

    handle.shutdown().await;
    if let Some(session_id) = finished {
        let view = aggregate(repo.as_ref(), &session_id).await?;
        print_json(&view)?;
    }
    Ok(())
}

/// Turns state snapshots into terminal output, printing only on phase,
/// question or error changes so the per-second clock stays quiet.
#[derive(Default)]
struct Renderer {
    last_phase: Option<QuizPhase>,
    last_question: Option<u32>,
    last_error: Option<String>,
}

impl Renderer {
    fn render(&mut self, state: &QuizState) {
        let error = state.error.as_ref().map(|e| e.message.clone());
        if error != self.last_error {
            if let Some(message) = &error {
                println!("error: {message}");
            }
            self.last_error = error;
        }

        let phase_changed = self.last_phase != Some(state.phase);
        let question_changed = self.last_question != state.question_number();
        self.last_phase = Some(state.phase);
        self.last_question = state.question_number();
        if !phase_changed && !question_changed {
            return;
        }

        match state.phase {
            QuizPhase::Loading => println!("loading quiz..."),
            QuizPhase::QuestionActive => print_question(state),
            QuizPhase::AnswerSubmitting => println!("submitting..."),
            QuizPhase::ExplanationShown => print_explanation(state),
            QuizPhase::Idle | QuizPhase::Completed | QuizPhase::Abandoned => {}
        }
    }
}

fn print_question(state: &QuizState) {
    let Some(session) = &state.session else { return };
    let Some(question) = &session.current_question else {
        return;
    };
    println!();
    println!(
        "[{}] question {}/{} ({}, {})",
        session.title,
        question.question_number,
        session.total_questions,
        question.category,
        question.difficulty
    );
    println!("{}", question.text);
    for option in &question.options {
        println!("  {}) {}", option.letter, option.text);
    }
    println!("score: {}", state.score);
}

fn print_explanation(state: &QuizState) {
    let Some(result) = &state.last_result else {
        return;
    };
    println!();
    println!("{}", result.message);
    if !result.correct {
        println!(
            "correct answer: {}) {}",
            result.correct_answer, result.correct_option_text
        );
    }
    println!("{}", result.explanation);
    println!(
        "score: {}  answered: {}/{}  question time: {}s",
        result.current_score,
        result.questions_answered,
        result.total_questions,
        state.elapsed_seconds
    );
    if result.has_next_question {
        println!("type 'next' for the next question");
    } else {
        println!("type 'next' to finish");
    }
}
