//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ecopay::config::Timings;
use ecopay::core::{FactGenerator, FactRequest, KioskController};
use ecopay::error::FactError;
use ecopay::types::{Language, Material, Step, StepOutput, UserEvent};
use tokio::sync::broadcast;

pub enum Behavior {
    Reply(&'static str, Duration),
    Fail,
}

/// Fact generator with a fixed behavior that records its calls
pub struct ScriptedFacts {
    behavior: Behavior,
    calls: AtomicUsize,
    last_request: Mutex<Option<FactRequest>>,
}

impl ScriptedFacts {
    pub fn reply(text: &'static str, delay: Duration) -> Arc<Self> {
        Arc::new(Self::with(Behavior::Reply(text, delay)))
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self::with(Behavior::Fail))
    }

    fn with(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<FactRequest> {
        *self.last_request.lock().unwrap()
    }
}

#[async_trait]
impl FactGenerator for ScriptedFacts {
    async fn generate_fact(&self, request: FactRequest) -> Result<String, FactError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        match &self.behavior {
            Behavior::Reply(text, delay) => {
                tokio::time::sleep(*delay).await;
                Ok(text.to_string())
            }
            Behavior::Fail => Err(FactError::Upstream { status: 500 }),
        }
    }
}

/// Controller with default timings (800ms / 2000ms / 8000ms)
pub fn controller(facts: Arc<ScriptedFacts>) -> KioskController {
    KioskController::new(Language::Aze, Timings::default(), facts)
}

/// Receive updates until one reports `step`
pub async fn next_step(rx: &mut broadcast::Receiver<StepOutput>, step: Step) -> StepOutput {
    loop {
        match rx.recv().await {
            Ok(output) if output.step == step => return output,
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => panic!("update channel closed"),
        }
    }
}

/// Welcome → Inserting with the given material
pub async fn drive_to_inserting(
    controller: &KioskController,
    rx: &mut broadcast::Receiver<StepOutput>,
    material: Material,
) {
    controller.dispatch(UserEvent::Start).await;
    controller.dispatch(UserEvent::TapCard).await;
    next_step(rx, Step::SelectType).await;
    let output = controller
        .dispatch(UserEvent::ChooseMaterial { material })
        .await;
    assert_eq!(output.step, Step::Inserting);
}

/// Welcome → Success with `count` items
pub async fn drive_to_success(
    controller: &KioskController,
    rx: &mut broadcast::Receiver<StepOutput>,
    material: Material,
    count: u32,
) -> StepOutput {
    drive_to_inserting(controller, rx, material).await;
    for _ in 0..count {
        controller.dispatch(UserEvent::Increment).await;
    }
    controller.dispatch(UserEvent::Confirm).await;
    next_step(rx, Step::Success).await
}
