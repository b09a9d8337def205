use std::mem;
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Sender;

use crate::camera::domain::camera_port::{CameraError, CameraPort, OpenRequest};
use crate::camera::domain::camera_session::SessionHandle;
use crate::camera::domain::raw_capture::RawCapture;
use crate::detection::domain::detector_port::{DetectionOutcome, DetectorPort};
use crate::detection::domain::emotion_classifier::classify;
use crate::pipeline::capture_scheduler::{TickScheduler, Ticker};
use crate::pipeline::frame_pipeline::FramePipeline;
use crate::pipeline::pipeline_config::PipelineConfig;
use crate::pipeline::pipeline_error::PipelineError;
use crate::pipeline::pipeline_event::{ControlCommand, CycleId, PipelineEvent, SessionToken};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::result_sink::{CycleResult, ResultSink};
use crate::shared::camera_selector::CameraSelector;
use crate::shared::completion::Completion;
use crate::shared::oriented_frame::OrientedFrame;

/// Collaborators the controller drives.
pub struct PipelineParts {
    pub camera: Box<dyn CameraPort>,
    pub detector: Box<dyn DetectorPort>,
    pub frames: FramePipeline,
    pub scheduler: Box<dyn TickScheduler>,
    pub sink: Box<dyn ResultSink>,
    pub logger: Box<dyn PipelineLogger>,
}

/// Coarse controller state, for observers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Idle,
    Opening,
    /// Streaming with no capture or detection outstanding.
    StreamingReady,
    StreamingBusy,
    Closing,
}

enum ControllerState {
    Idle,
    Opening {
        session: SessionToken,
        selector: CameraSelector,
        /// Selection requested while the open was in flight.
        pending: Option<CameraSelector>,
    },
    Streaming {
        session: SessionToken,
        handle: SessionHandle,
        cycle: Cycle,
    },
    Closing {
        session: SessionToken,
        next: CameraSelector,
    },
}

enum Cycle {
    Ready,
    Capturing {
        id: CycleId,
    },
    Detecting {
        id: CycleId,
        frame: Arc<OrientedFrame>,
        submitted_at: Instant,
    },
}

/// Owns camera lifecycle and the capture → decode → detect → publish cycle.
///
/// Every method runs on the pipeline's single execution context; ports
/// report back by posting [`PipelineEvent`]s onto `events`, which the
/// runtime feeds to [`handle`](Self::handle). Completions are tagged with
/// the session and cycle that issued them and are ignored once stale.
///
/// Invariants:
/// - at most one camera session is live, and it is only ever held here;
/// - at most one detector submission is outstanding, across sessions;
/// - ticks never queue: a tick that finds the pipeline busy or not
///   streaming is dropped.
pub struct PipelineController {
    config: PipelineConfig,
    camera: Box<dyn CameraPort>,
    detector: Box<dyn DetectorPort>,
    frames: FramePipeline,
    scheduler: Box<dyn TickScheduler>,
    sink: Box<dyn ResultSink>,
    logger: Box<dyn PipelineLogger>,
    events: Sender<PipelineEvent>,
    state: ControllerState,
    selector: CameraSelector,
    next_session: u64,
    next_cycle: u64,
    outstanding_detection: Option<CycleId>,
    /// Open issued under a session that is no longer current.
    abandoned_open: Option<SessionToken>,
    permission_denied: bool,
    terminated: bool,
}

impl PipelineController {
    pub fn new(config: PipelineConfig, parts: PipelineParts, events: Sender<PipelineEvent>) -> Self {
        let selector = config.initial_camera;
        Self {
            config,
            camera: parts.camera,
            detector: parts.detector,
            frames: parts.frames,
            scheduler: parts.scheduler,
            sink: parts.sink,
            logger: parts.logger,
            events,
            state: ControllerState::Idle,
            selector,
            next_session: 0,
            next_cycle: 0,
            outstanding_detection: None,
            abandoned_open: None,
            permission_denied: false,
            terminated: false,
        }
    }

    /// Opens the configured initial camera.
    pub fn start(&mut self) {
        self.select_camera(self.config.initial_camera);
    }

    pub fn phase(&self) -> PipelinePhase {
        match &self.state {
            ControllerState::Idle => PipelinePhase::Idle,
            ControllerState::Opening { .. } => PipelinePhase::Opening,
            ControllerState::Streaming {
                cycle: Cycle::Ready,
                ..
            } if self.outstanding_detection.is_none() => PipelinePhase::StreamingReady,
            ControllerState::Streaming { .. } => PipelinePhase::StreamingBusy,
            ControllerState::Closing { .. } => PipelinePhase::Closing,
        }
    }

    /// Most recently requested camera.
    pub fn selector(&self) -> CameraSelector {
        self.selector
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Terminated, with no in-flight open that could still hand back a
    /// session needing release.
    pub fn is_quiescent(&self) -> bool {
        self.terminated && self.abandoned_open.is_none()
    }

    pub fn handle(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Control(ControlCommand::SelectCamera(selector)) => {
                self.select_camera(selector)
            }
            PipelineEvent::Control(ControlCommand::ToggleCamera) => self.toggle_camera(),
            PipelineEvent::Control(ControlCommand::Shutdown) => self.shutdown(),
            PipelineEvent::Tick { session } => self.on_tick(session),
            PipelineEvent::Opened { session, result } => self.on_opened(session, result),
            PipelineEvent::Closed { session } => self.on_closed(session),
            PipelineEvent::CaptureComplete {
                session,
                cycle,
                result,
            } => self.on_capture_complete(session, cycle, result),
            PipelineEvent::DetectionComplete {
                session,
                cycle,
                outcome,
            } => self.on_detection_complete(session, cycle, outcome),
        }
    }

    pub fn select_camera(&mut self, selector: CameraSelector) {
        if self.terminated {
            log::debug!("Ignoring camera selection after shutdown");
            return;
        }
        if self.permission_denied {
            log::warn!("Camera permission was denied; not opening {selector} camera");
            return;
        }
        self.selector = selector;

        match mem::replace(&mut self.state, ControllerState::Idle) {
            ControllerState::Idle => self.begin_open(selector),
            ControllerState::Opening {
                session,
                selector: opening,
                ..
            } => {
                let pending = (selector != opening).then_some(selector);
                self.state = ControllerState::Opening {
                    session,
                    selector: opening,
                    pending,
                };
            }
            ControllerState::Streaming {
                session,
                handle,
                cycle,
            } => {
                if handle.selector() == selector {
                    self.state = ControllerState::Streaming {
                        session,
                        handle,
                        cycle,
                    };
                } else {
                    self.logger
                        .info(&format!("Switching camera {} -> {selector}", handle.selector()));
                    self.begin_close(session, handle, selector);
                }
            }
            ControllerState::Closing { session, .. } => {
                self.state = ControllerState::Closing {
                    session,
                    next: selector,
                };
            }
        }
    }

    pub fn toggle_camera(&mut self) {
        self.select_camera(self.selector.toggled());
    }

    /// Stops everything and releases the session. Terminal.
    pub fn shutdown(&mut self) {
        if self.terminated {
            return;
        }
        self.scheduler.stop();

        match mem::replace(&mut self.state, ControllerState::Idle) {
            ControllerState::Streaming { handle, .. } => {
                self.camera.stop_preview(&handle);
                self.camera.close(handle, Completion::detached());
            }
            ControllerState::Opening { session, .. } => self.abandoned_open = Some(session),
            ControllerState::Closing { .. } | ControllerState::Idle => {}
        }

        self.terminated = true;
        self.logger.info("Pipeline shut down");
        self.logger.summary();
    }

    fn begin_open(&mut self, selector: CameraSelector) {
        self.next_session += 1;
        let session = SessionToken(self.next_session);
        let request = OpenRequest {
            selector,
            width: self.config.capture_width,
            height: self.config.capture_height,
        };
        log::debug!("Opening {selector} camera (session {})", session.0);

        self.state = ControllerState::Opening {
            session,
            selector,
            pending: None,
        };
        let done = self.completion(move |result| PipelineEvent::Opened { session, result });
        self.camera.open(request, done);
    }

    fn begin_close(&mut self, session: SessionToken, handle: SessionHandle, next: CameraSelector) {
        self.scheduler.stop();
        self.camera.stop_preview(&handle);
        self.state = ControllerState::Closing { session, next };
        let done = self.completion(move |()| PipelineEvent::Closed { session });
        self.camera.close(handle, done);
    }

    fn on_opened(&mut self, session: SessionToken, result: Result<SessionHandle, CameraError>) {
        let current = matches!(
            &self.state,
            ControllerState::Opening { session: s, .. } if *s == session
        );
        if !current {
            self.release_stale_open(session, result);
            return;
        }
        let ControllerState::Opening {
            selector, pending, ..
        } = mem::replace(&mut self.state, ControllerState::Idle)
        else {
            return;
        };

        match result {
            Ok(handle) => match pending {
                Some(next) => self.begin_close(session, handle, next),
                None => self.start_streaming(session, handle),
            },
            Err(e) => {
                self.report_open_failure(selector, e);
                if let Some(next) = pending.filter(|_| !self.permission_denied) {
                    self.begin_open(next);
                }
            }
        }
    }

    fn release_stale_open(
        &mut self,
        session: SessionToken,
        result: Result<SessionHandle, CameraError>,
    ) {
        if self.abandoned_open == Some(session) {
            self.abandoned_open = None;
        }
        if let Ok(handle) = result {
            log::debug!("Closing camera session opened after it was abandoned");
            self.camera.close(handle, Completion::detached());
        }
    }

    fn start_streaming(&mut self, session: SessionToken, handle: SessionHandle) {
        let selector = handle.selector();
        if let Err(e) = self.camera.start_preview(&handle) {
            self.logger.error(&PipelineError::DeviceOpenFailed {
                selector,
                reason: format!("preview failed to start: {e}"),
            });
            self.camera.close(handle, Completion::detached());
            return;
        }

        self.scheduler.start(
            self.config.capture_interval(),
            Ticker::new(self.events.clone(), session),
        );
        self.state = ControllerState::Streaming {
            session,
            handle,
            cycle: Cycle::Ready,
        };
        self.logger.info(&format!(
            "Streaming from {selector} camera, capturing every {}ms",
            self.config.capture_interval_ms
        ));
    }

    fn report_open_failure(&mut self, selector: CameraSelector, error: CameraError) {
        let reason = error.to_string();
        let failure = match error {
            CameraError::PermissionDenied(_) => {
                self.permission_denied = true;
                PipelineError::PermissionDenied { selector, reason }
            }
            _ => PipelineError::DeviceOpenFailed { selector, reason },
        };
        self.logger.error(&failure);
    }

    fn on_closed(&mut self, session: SessionToken) {
        match self.state {
            ControllerState::Closing { session: s, next } if s == session => self.begin_open(next),
            _ => log::debug!("Ignoring stale close of session {}", session.0),
        }
    }

    fn on_tick(&mut self, session: SessionToken) {
        let outstanding_detection = self.outstanding_detection.is_some();
        let ControllerState::Streaming {
            session: current,
            handle,
            cycle,
        } = &mut self.state
        else {
            log::debug!("Tick dropped: not streaming");
            return;
        };
        if *current != session {
            log::debug!("Tick dropped: from previous session {}", session.0);
            return;
        }
        if !matches!(cycle, Cycle::Ready) || outstanding_detection {
            self.logger.metric("dropped_ticks", 1.0);
            log::debug!("Tick dropped: previous cycle still in flight");
            return;
        }

        self.next_cycle += 1;
        let id = CycleId(self.next_cycle);
        *cycle = Cycle::Capturing { id };

        let tx = self.events.clone();
        let done = Completion::new(move |result| {
            let event = PipelineEvent::CaptureComplete {
                session,
                cycle: id,
                result,
            };
            if tx.send(event).is_err() {
                log::debug!("Pipeline stopped; dropping capture result");
            }
        });
        self.camera.request_still_capture(handle, done);
    }

    fn on_capture_complete(
        &mut self,
        session: SessionToken,
        cycle_id: CycleId,
        result: Result<RawCapture, CameraError>,
    ) {
        let ControllerState::Streaming {
            session: current,
            cycle,
            ..
        } = &mut self.state
        else {
            log::debug!("Ignoring capture completed after streaming stopped");
            return;
        };
        let in_flight = matches!(cycle, Cycle::Capturing { id } if *id == cycle_id);
        if *current != session || !in_flight {
            log::debug!("Ignoring stale capture for cycle {}", cycle_id.0);
            return;
        }
        *cycle = Cycle::Ready;

        let capture = match result {
            Ok(capture) => capture,
            Err(e) => {
                self.logger.error(&PipelineError::CaptureFailed {
                    reason: e.to_string(),
                });
                return;
            }
        };

        let started = Instant::now();
        let frame = match self.frames.decode(capture) {
            Ok(frame) => Arc::new(frame),
            Err(e) => {
                self.logger.error(&PipelineError::DecodeFailed {
                    reason: e.to_string(),
                });
                return;
            }
        };
        self.logger
            .timing("decode", started.elapsed().as_secs_f64() * 1000.0);

        self.submit_detection(session, cycle_id, frame);
    }

    fn submit_detection(&mut self, session: SessionToken, id: CycleId, frame: Arc<OrientedFrame>) {
        if let ControllerState::Streaming { cycle, .. } = &mut self.state {
            *cycle = Cycle::Detecting {
                id,
                frame: frame.clone(),
                submitted_at: Instant::now(),
            };
        }
        self.outstanding_detection = Some(id);
        let done = self.completion(move |outcome| PipelineEvent::DetectionComplete {
            session,
            cycle: id,
            outcome,
        });
        self.detector.submit(frame, done);
    }

    fn on_detection_complete(
        &mut self,
        session: SessionToken,
        cycle_id: CycleId,
        outcome: DetectionOutcome,
    ) {
        if self.outstanding_detection == Some(cycle_id) {
            self.outstanding_detection = None;
        }

        let ControllerState::Streaming {
            session: current,
            cycle,
            ..
        } = &mut self.state
        else {
            log::debug!("Discarding detection result after streaming stopped");
            return;
        };
        let in_flight = matches!(cycle, Cycle::Detecting { id, .. } if *id == cycle_id);
        if *current != session || !in_flight {
            log::debug!("Discarding stale detection result for cycle {}", cycle_id.0);
            return;
        }
        let Cycle::Detecting {
            frame,
            submitted_at,
            ..
        } = mem::replace(cycle, Cycle::Ready)
        else {
            return;
        };
        self.logger
            .timing("detect", submitted_at.elapsed().as_secs_f64() * 1000.0);

        match outcome {
            DetectionOutcome::Faces(faces) => {
                for (i, face) in faces.iter().enumerate() {
                    log::debug!(
                        "Face{}: smiling={:?} left_eye_open={:?} right_eye_open={:?}",
                        i + 1,
                        face.smiling,
                        face.left_eye_open,
                        face.right_eye_open
                    );
                }
                let labels: Vec<_> = faces.iter().map(classify).collect();
                let face_count = faces.len();
                self.logger.metric("faces", face_count as f64);
                self.sink.publish(CycleResult {
                    display_frame: frame,
                    face_count,
                    labels,
                });
                self.logger.cycle_published(face_count);
            }
            DetectionOutcome::Failure(reason) => {
                self.logger
                    .error(&PipelineError::DetectionFailed { reason });
            }
        }
    }

    /// A completion that posts its value, wrapped by `wrap`, onto the event channel.
    fn completion<T: Send + 'static>(
        &self,
        wrap: impl FnOnce(T) -> PipelineEvent + Send + 'static,
    ) -> Completion<T> {
        let tx = self.events.clone();
        Completion::new(move |value| {
            if tx.send(wrap(value)).is_err() {
                log::debug!("Pipeline stopped; dropping completion");
            }
        })
    }
}
