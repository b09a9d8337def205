use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

use crate::pipeline::pipeline_config::{ConfigError, PipelineConfig};
use crate::pipeline::pipeline_controller::{PipelineController, PipelineParts};
use crate::pipeline::pipeline_event::{ControlCommand, PipelineEvent};
use crate::shared::camera_selector::CameraSelector;
use crate::shared::constants::SHUTDOWN_GRACE_MS;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn pipeline thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Runs a [`PipelineController`] on a dedicated thread.
///
/// Layout: `[camera handler | detector | scheduler | controls] → events → pipeline`
///
/// Every collaborator reports through one event channel, and only the
/// pipeline thread touches controller state.
pub struct ThreadedPipelineRuntime;

impl ThreadedPipelineRuntime {
    /// Validates `config`, spawns the pipeline thread and opens the
    /// configured camera.
    pub fn spawn(
        config: PipelineConfig,
        parts: PipelineParts,
    ) -> Result<PipelineHandle, RuntimeError> {
        config.validate()?;
        let (tx, rx) = crossbeam_channel::unbounded::<PipelineEvent>();
        let controls = PipelineControls { events: tx.clone() };

        let worker = thread::Builder::new()
            .name("pipeline".into())
            .spawn(move || {
                let mut controller = PipelineController::new(config, parts, tx);
                controller.start();
                run_until_terminated(&mut controller, &rx);
                drain_late_opens(
                    &mut controller,
                    &rx,
                    Duration::from_millis(SHUTDOWN_GRACE_MS),
                );
                log::debug!("Pipeline thread exiting");
            })?;

        Ok(PipelineHandle {
            controls,
            worker: Some(worker),
        })
    }
}

fn run_until_terminated(controller: &mut PipelineController, rx: &Receiver<PipelineEvent>) {
    for event in rx.iter() {
        controller.handle(event);
        if controller.is_terminated() {
            return;
        }
    }
}

/// Keeps handling events after shutdown until no open is outstanding, so a
/// session that opens late is still closed.
fn drain_late_opens(
    controller: &mut PipelineController,
    rx: &Receiver<PipelineEvent>,
    grace: Duration,
) {
    let deadline = Instant::now() + grace;
    while !controller.is_quiescent() {
        match rx.recv_deadline(deadline) {
            Ok(event) => controller.handle(event),
            Err(_) => {
                log::warn!("Camera open still pending {}ms after shutdown", grace.as_millis());
                return;
            }
        }
    }
}

/// Cloneable sender for user requests. Safe to use from any thread.
#[derive(Clone, Debug)]
pub struct PipelineControls {
    events: Sender<PipelineEvent>,
}

impl PipelineControls {
    /// Returns `false` if the pipeline has already stopped.
    pub fn select_camera(&self, selector: CameraSelector) -> bool {
        self.send(ControlCommand::SelectCamera(selector))
    }

    pub fn toggle_camera(&self) -> bool {
        self.send(ControlCommand::ToggleCamera)
    }

    pub fn shutdown(&self) -> bool {
        self.send(ControlCommand::Shutdown)
    }

    fn send(&self, command: ControlCommand) -> bool {
        self.events.send(PipelineEvent::Control(command)).is_ok()
    }
}

/// Owner of the pipeline thread. Dropping it shuts the pipeline down.
pub struct PipelineHandle {
    controls: PipelineControls,
    worker: Option<thread::JoinHandle<()>>,
}

impl PipelineHandle {
    pub fn controls(&self) -> PipelineControls {
        self.controls.clone()
    }

    /// Requests shutdown and waits for the pipeline thread to release
    /// the camera and exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.controls.shutdown();
        if worker.join().is_err() {
            log::error!("Pipeline thread panicked");
        }
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
