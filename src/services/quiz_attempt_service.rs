use std::{sync::Arc, time::Duration};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::{sync::Mutex, task::JoinHandle, time::Instant};

use crate::{
    api::QuizApi,
    auth::SessionHandle,
    errors::{AppError, AppResult},
    models::domain::{
        Answer, AttemptPhase, AttemptResult, AttemptReview, QuestionId, QuizAttempt, QuizId,
        QuizMeta, ScoreId, SubmitPayload,
    },
    services::{loading::LoadingTracker, notification_service::NotificationChannel},
};

const DETAILS_FAILED: &str = "Failed to load quiz details";
const START_FAILED: &str = "Failed to start quiz";
const SUBMIT_FAILED: &str = "Failed to submit quiz";
const SUBMITTED: &str = "Quiz submitted successfully!";
const REVIEW_FAILED: &str = "Failed to load quiz attempt details";

type PendingSubmission = Shared<BoxFuture<'static, AppResult<AttemptResult>>>;

/// What the views get to see of the controller.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttemptSnapshot {
    pub phase: AttemptPhase,
    pub attempt: Option<QuizAttempt>,
    pub preview: Option<QuizMeta>,
    pub review: Option<AttemptReview>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// No active attempt; nothing changed.
    Inactive,
    Running { remaining: u32 },
    /// Time ran out on this tick and the attempt was submitted.
    Expired(AppResult<AttemptResult>),
}

enum Advance {
    Inactive,
    Running(u32),
    /// At zero and the automatic submission already happened.
    Exhausted,
    Expired(QuizId),
}

struct AttemptState {
    phase: AttemptPhase,
    /// Bumped on every start and reset; responses carrying an older value
    /// are dropped.
    generation: u64,
    attempt: Option<QuizAttempt>,
    auto_submitted: bool,
    in_flight: Option<PendingSubmission>,
    countdown: Option<JoinHandle<()>>,
    preview: Option<QuizMeta>,
    review: Option<AttemptReview>,
    /// Session the state was built under.
    session_epoch: u64,
}

impl AttemptState {
    fn new() -> Self {
        AttemptState {
            phase: AttemptPhase::Idle,
            generation: 0,
            attempt: None,
            auto_submitted: false,
            in_flight: None,
            countdown: None,
            preview: None,
            review: None,
            session_epoch: 0,
        }
    }

    fn cancel_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.abort();
        }
    }

    /// Forgets the current attempt and invalidates anything still in flight.
    fn discard_attempt(&mut self) -> u64 {
        self.cancel_countdown();
        self.generation += 1;
        self.attempt = None;
        self.in_flight = None;
        self.auto_submitted = false;
        self.generation
    }
}

/// Drives one timed quiz attempt: `Idle -> Loading -> Active -> Submitting
/// -> Completed`.
#[derive(Clone)]
pub struct QuizAttemptController {
    api: Arc<dyn QuizApi>,
    session: SessionHandle,
    notifications: NotificationChannel,
    loading: LoadingTracker,
    state: Arc<Mutex<AttemptState>>,
    countdown_period: Option<Duration>,
}

impl QuizAttemptController {
    /// `countdown_period` of `None` leaves ticking to the caller.
    pub fn new(
        api: Arc<dyn QuizApi>,
        session: SessionHandle,
        notifications: NotificationChannel,
        loading: LoadingTracker,
        countdown_period: Option<Duration>,
    ) -> Self {
        let state = AttemptState {
            session_epoch: session.epoch(),
            ..AttemptState::new()
        };
        Self {
            api,
            session,
            notifications,
            loading,
            state: Arc::new(Mutex::new(state)),
            countdown_period,
        }
    }

    /// Everything held here belongs to the session it was loaded under. Once
    /// that session is replaced or cleared the attempt is discarded, its
    /// countdown stopped and its in-flight responses orphaned.
    fn drop_if_signed_out(&self, state: &mut AttemptState) {
        let epoch = self.session.epoch();
        if state.session_epoch == epoch {
            return;
        }
        if state.phase != AttemptPhase::Idle {
            log::info!("Session ended; discarding quiz attempt");
            state.discard_attempt();
            state.phase = AttemptPhase::Idle;
        }
        state.preview = None;
        state.review = None;
        state.session_epoch = epoch;
    }

    pub async fn phase(&self) -> AttemptPhase {
        let mut state = self.state.lock().await;
        self.drop_if_signed_out(&mut state);
        state.phase
    }

    pub async fn snapshot(&self) -> AttemptSnapshot {
        let mut state = self.state.lock().await;
        self.drop_if_signed_out(&mut state);
        AttemptSnapshot {
            phase: state.phase,
            attempt: state.attempt.clone(),
            preview: state.preview.clone(),
            review: state.review.clone(),
        }
    }

    /// Preview fetch; never touches the attempt itself.
    pub async fn fetch_details(&self, quiz_id: QuizId) -> AppResult<QuizMeta> {
        let epoch = self.session.epoch();
        match self.api.get_quiz_details(quiz_id).await {
            Ok(quiz) => {
                let mut state = self.state.lock().await;
                self.drop_if_signed_out(&mut state);
                if state.session_epoch == epoch {
                    state.preview = Some(quiz.clone());
                }
                Ok(quiz)
            }
            Err(err) => {
                log::warn!("Loading details of quiz {} failed: {}", quiz_id, err);
                if !err.is_unauthorized() {
                    self.notifications.error(DETAILS_FAILED);
                }
                Err(err)
            }
        }
    }

    pub async fn start(&self, quiz_id: QuizId) -> AppResult<QuizAttempt> {
        let generation = {
            let mut state = self.state.lock().await;
            self.drop_if_signed_out(&mut state);
            let generation = state.discard_attempt();
            state.phase = AttemptPhase::Loading;
            generation
        };

        let _busy = self.loading.begin();
        let response = self.api.start_quiz(quiz_id).await;

        let mut state = self.state.lock().await;
        self.drop_if_signed_out(&mut state);
        if state.generation != generation {
            log::debug!("Discarding superseded start of quiz {}", quiz_id);
            return Err(AppError::Superseded(format!(
                "Start of quiz {} was superseded",
                quiz_id
            )));
        }

        match response {
            Ok(response) => {
                let attempt = QuizAttempt::begin(response);
                log::info!(
                    "Started quiz {} with {} questions and {}s on the clock",
                    attempt.quiz_id(),
                    attempt.questions.len(),
                    attempt.time_remaining_seconds
                );
                state.attempt = Some(attempt.clone());
                state.phase = AttemptPhase::Active;
                state.countdown = self.spawn_countdown(generation);
                Ok(attempt)
            }
            Err(err) => {
                state.phase = AttemptPhase::Idle;
                drop(state);
                log::warn!("Starting quiz {} failed: {}", quiz_id, err);
                self.notifications.report_failure(&err, START_FAILED);
                Err(err)
            }
        }
    }

    /// Buffers an answer locally. Returns false, changing nothing, unless an
    /// attempt is active and owns the question.
    pub async fn record_answer(&self, question_id: QuestionId, answer: Answer) -> bool {
        let mut state = self.state.lock().await;
        self.drop_if_signed_out(&mut state);
        if state.phase != AttemptPhase::Active {
            log::debug!("Ignoring answer for question {} outside an active attempt", question_id);
            return false;
        }
        let Some(attempt) = state.attempt.as_mut() else {
            return false;
        };
        if !attempt.has_question(question_id) {
            log::warn!(
                "Question {} is not part of quiz {}",
                question_id,
                attempt.quiz_id()
            );
            return false;
        }
        attempt.answers.insert(question_id, answer);
        true
    }

    pub async fn tick(&self, delta_seconds: u32) -> TickOutcome {
        match self.advance(None, delta_seconds).await {
            Advance::Inactive => TickOutcome::Inactive,
            Advance::Running(remaining) => TickOutcome::Running { remaining },
            Advance::Exhausted => TickOutcome::Running { remaining: 0 },
            Advance::Expired(quiz_id) => {
                log::info!("Time is up for quiz {}; submitting", quiz_id);
                TickOutcome::Expired(self.submit(quiz_id).await)
            }
        }
    }

    async fn advance(&self, generation: Option<u64>, delta_seconds: u32) -> Advance {
        let mut state = self.state.lock().await;
        self.drop_if_signed_out(&mut state);
        if state.phase != AttemptPhase::Active
            || generation.is_some_and(|g| g != state.generation)
        {
            return Advance::Inactive;
        }

        let auto_submitted = state.auto_submitted;
        let Some(attempt) = state.attempt.as_mut() else {
            return Advance::Inactive;
        };
        attempt.time_remaining_seconds = attempt.time_remaining_seconds.saturating_sub(delta_seconds);
        let remaining = attempt.time_remaining_seconds;
        let quiz_id = attempt.quiz_id();

        if remaining > 0 {
            return Advance::Running(remaining);
        }
        if auto_submitted {
            return Advance::Exhausted;
        }

        state.auto_submitted = true;
        // Detach instead of abort: the countdown may be the caller here and
        // must survive long enough to run the submission.
        drop(state.countdown.take());
        Advance::Expired(quiz_id)
    }

    fn spawn_countdown(&self, generation: u64) -> Option<JoinHandle<()>> {
        let period = self.countdown_period?;
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        let controller = self.clone();
        Some(runtime.spawn(controller.run_countdown(generation, period)))
    }

    async fn run_countdown(self, generation: u64, period: Duration) {
        let step = u32::try_from(period.as_secs()).unwrap_or(u32::MAX).max(1);
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);

        loop {
            interval.tick().await;
            match self.advance(Some(generation), step).await {
                Advance::Running(_) => continue,
                Advance::Expired(quiz_id) => {
                    log::info!("Time is up for quiz {}; submitting", quiz_id);
                    if let Err(err) = self.submit(quiz_id).await {
                        log::warn!("Automatic submission of quiz {} failed: {}", quiz_id, err);
                    }
                    break;
                }
                Advance::Inactive | Advance::Exhausted => break,
            }
        }
    }

    /// Sends the buffered answers. Calls made while a submission is in
    /// flight wait for that same request; a completed attempt hands back its
    /// stored results.
    pub async fn submit(&self, quiz_id: QuizId) -> AppResult<AttemptResult> {
        let pending = {
            let mut state = self.state.lock().await;
            self.drop_if_signed_out(&mut state);
            let phase = state.phase;
            match phase {
                AttemptPhase::Submitting => match &state.in_flight {
                    Some(pending) => {
                        log::debug!("Joining in-flight submission of quiz {}", quiz_id);
                        pending.clone()
                    }
                    None => {
                        return Err(AppError::InvalidState(
                            "Submission in progress".to_string(),
                        ))
                    }
                },
                AttemptPhase::Completed => {
                    return state
                        .attempt
                        .as_ref()
                        .and_then(|a| a.results.clone())
                        .ok_or_else(|| {
                            AppError::InvalidState("Completed attempt has no results".to_string())
                        });
                }
                AttemptPhase::Active => {
                    let payload = match state.attempt.as_ref() {
                        Some(attempt) if attempt.quiz_id() == quiz_id => SubmitPayload {
                            answers: attempt.answers.clone(),
                            start_time: attempt.start_time,
                        },
                        Some(attempt) => {
                            return Err(AppError::ValidationError(format!(
                                "Quiz {} is not the active attempt (active: {})",
                                quiz_id,
                                attempt.quiz_id()
                            )))
                        }
                        None => {
                            return Err(AppError::InvalidState(
                                "No active quiz attempt".to_string(),
                            ))
                        }
                    };

                    state.cancel_countdown();
                    state.phase = AttemptPhase::Submitting;
                    let pending = self
                        .clone()
                        .submission(quiz_id, state.generation, payload)
                        .boxed()
                        .shared();
                    state.in_flight = Some(pending.clone());
                    pending
                }
                AttemptPhase::Idle | AttemptPhase::Loading => {
                    return Err(AppError::InvalidState(
                        "No active quiz attempt".to_string(),
                    ))
                }
            }
        };

        pending.await
    }

    async fn submission(
        self,
        quiz_id: QuizId,
        generation: u64,
        payload: SubmitPayload,
    ) -> AppResult<AttemptResult> {
        let _busy = self.loading.begin();
        log::info!(
            "Submitting quiz {} with {} answers",
            quiz_id,
            payload.answers.len()
        );
        let response = self.api.submit_quiz(quiz_id, &payload).await;

        let mut state = self.state.lock().await;
        self.drop_if_signed_out(&mut state);
        if state.generation != generation {
            log::debug!("Discarding superseded submission of quiz {}", quiz_id);
            return Err(AppError::Superseded(format!(
                "Submission of quiz {} was superseded",
                quiz_id
            )));
        }
        state.in_flight = None;

        match response {
            Ok(response) => {
                let results = response.results;
                if let Some(attempt) = state.attempt.as_mut() {
                    attempt.results = Some(results.clone());
                }
                state.phase = AttemptPhase::Completed;
                drop(state);
                log::info!(
                    "Quiz {} scored {}/{}",
                    quiz_id,
                    results.score.total_scored,
                    results.score.total_questions
                );
                self.notifications.success(SUBMITTED);
                Ok(results)
            }
            Err(err) => {
                state.phase = AttemptPhase::Active;
                let remaining = state
                    .attempt
                    .as_ref()
                    .map_or(0, |a| a.time_remaining_seconds);
                if remaining > 0 {
                    state.countdown = self.spawn_countdown(generation);
                }
                drop(state);
                log::warn!("Submitting quiz {} failed: {}", quiz_id, err);
                self.notifications.report_failure(&err, SUBMIT_FAILED);
                Err(err)
            }
        }
    }

    /// Loads a past, scored attempt. Independent of the active attempt.
    pub async fn fetch_attempt_review(&self, score_id: ScoreId) -> AppResult<AttemptReview> {
        let epoch = self.session.epoch();
        match self.api.get_quiz_attempt(score_id).await {
            Ok(review) => {
                let mut state = self.state.lock().await;
                self.drop_if_signed_out(&mut state);
                if state.session_epoch == epoch {
                    state.review = Some(review.clone());
                }
                Ok(review)
            }
            Err(err) => {
                log::warn!("Loading attempt {} failed: {}", score_id, err);
                if !err.is_unauthorized() {
                    self.notifications.error(REVIEW_FAILED);
                }
                Err(err)
            }
        }
    }

    /// Back to `Idle` from anywhere; stops the clock and orphans in-flight
    /// responses.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.discard_attempt();
        state.phase = AttemptPhase::Idle;
        state.preview = None;
        log::debug!("Quiz attempt state cleared");
    }
}
