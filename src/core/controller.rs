//! Kiosk controller: the single owner of the session
//!
//! Routes every mutation through [`SessionMachine`], owns the scheduled
//! timeouts (card read, success dwell) and runs the orchestrator when the
//! user confirms. At most one timer is pending per session; every applied
//! transition aborts it, and a timer that fires anyway re-checks the
//! generation it was scheduled at before applying anything.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

use crate::config::{Settings, Timings};
use crate::core::fact::{self, FactGenerator};
use crate::core::orchestrator::Orchestrator;
use crate::core::session::SessionMachine;
use crate::types::{KioskEvent, Language, ReasonCode, Step, StepOutput, UserEvent};

/// Capacity of the live update channel
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Handle to the kiosk. Cheap to clone; all clones share one session.
#[derive(Clone)]
pub struct KioskController {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<ControllerState>,
    orchestrator: Orchestrator,
    timings: Timings,
    updates: broadcast::Sender<StepOutput>,
}

struct ControllerState {
    machine: SessionMachine,
    timer: Option<PendingTimer>,
}

struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

impl KioskController {
    pub fn new(
        default_language: Language,
        timings: Timings,
        facts: Arc<dyn FactGenerator>,
    ) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(ControllerState {
                    machine: SessionMachine::new(default_language),
                    timer: None,
                }),
                orchestrator: Orchestrator::new(facts, timings.processing_floor()),
                timings,
                updates,
            }),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.default_language,
            settings.timings,
            fact::from_settings(&settings.fact),
        )
    }

    /// Receive every applied transition, including timer-driven ones
    pub fn subscribe(&self) -> broadcast::Receiver<StepOutput> {
        self.inner.updates.subscribe()
    }

    pub fn timings(&self) -> Timings {
        self.inner.timings
    }

    /// Current state
    pub async fn snapshot(&self) -> StepOutput {
        self.inner.state.lock().await.machine.current_output()
    }

    /// Sessions completed since start
    pub async fn completed(&self) -> u64 {
        self.inner.state.lock().await.machine.completed()
    }

    /// Handle one user input
    pub async fn dispatch(&self, event: UserEvent) -> StepOutput {
        let mut state = self.inner.state.lock().await;
        let step = state.machine.step();
        if !step.accepts_input() {
            debug!(event = ?event, %step, "input dropped while busy");
            return state.machine.report(ReasonCode::I001_NOT_VALID_FOR_STEP);
        }
        match event {
            UserEvent::TapCard => self.tap_card(&mut state),
            other => self.apply_locked(&mut state, other.into()),
        }
    }

    /// Schedule card detection after the read delay. A second tap restarts it.
    fn tap_card(&self, state: &mut ControllerState) -> StepOutput {
        if state.machine.step() != Step::ScanCard {
            return state.machine.apply(KioskEvent::CardDetected);
        }
        let delay = self.inner.timings.card_read();
        self.schedule(state, delay, KioskEvent::CardDetected);
        state.machine.report(ReasonCode::P001_CARD_READING)
    }

    fn apply_locked(&self, state: &mut ControllerState, event: KioskEvent) -> StepOutput {
        let output = state.machine.apply(event);
        if output.reason.is_ignored() {
            return output;
        }

        if let Some(timer) = state.timer.take() {
            debug!(generation = timer.generation, "pending timer cancelled");
            timer.handle.abort();
        }

        if output.step_changed() {
            match output.step {
                Step::Processing => self.start_processing(state),
                Step::Success => {
                    let dwell = self.inner.timings.success_dwell();
                    self.schedule(state, dwell, KioskEvent::DwellElapsed);
                }
                _ => {}
            }
        }

        // No subscribers is fine
        let _ = self.inner.updates.send(output.clone());
        output
    }

    /// Replace the pending timer with one firing `event` after `delay`
    fn schedule(&self, state: &mut ControllerState, delay: Duration, event: KioskEvent) {
        let generation = state.machine.generation();
        let this = self.clone();
        let event_name = event.name();
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            this.fire(generation, event).await;
        });

        debug!(
            generation,
            event = event_name,
            delay_ms = delay.as_millis() as u64,
            "timer scheduled"
        );
        if let Some(old) = state.timer.replace(PendingTimer { generation, handle }) {
            old.handle.abort();
        }
    }

    /// Run the orchestrator on a snapshot; its result re-enters as an event
    fn start_processing(&self, state: &mut ControllerState) {
        let request = state.machine.fact_request();
        let generation = state.machine.generation();
        let this = self.clone();
        tokio::spawn(async move {
            let result = this.inner.orchestrator.confirm(request).await;
            this.fire(
                generation,
                KioskEvent::ProcessingDone {
                    fact: result.fact_text,
                },
            )
            .await;
        });
    }

    /// Apply a scheduled event unless the session moved on
    async fn fire(&self, generation: u64, event: KioskEvent) {
        let mut state = self.inner.state.lock().await;
        if state.machine.generation() != generation {
            debug!(
                scheduled = generation,
                current = state.machine.generation(),
                event = event.name(),
                "stale timer dropped"
            );
            return;
        }
        // This task is the pending timer; detach rather than abort itself
        state.timer = None;
        self.apply_locked(&mut state, event);
    }
}

impl std::fmt::Debug for KioskController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KioskController")
            .field("timings", &self.inner.timings)
            .field("orchestrator", &self.inner.orchestrator)
            .finish_non_exhaustive()
    }
}
