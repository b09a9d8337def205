//! Scriptable fakes for driving the pipeline controller step by step.

use std::collections::{HashSet, VecDeque};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::Receiver;

use crate::camera::domain::camera_port::{CameraError, CameraPort, OpenRequest};
use crate::camera::domain::camera_session::SessionHandle;
use crate::camera::domain::raw_capture::RawCapture;
use crate::detection::domain::detector_port::{DetectionOutcome, DetectorPort};
use crate::pipeline::capture_scheduler::{TickScheduler, Ticker};
use crate::pipeline::frame_pipeline::FramePipeline;
use crate::pipeline::pipeline_config::PipelineConfig;
use crate::pipeline::pipeline_controller::{PipelineController, PipelineParts};
use crate::pipeline::pipeline_error::PipelineError;
use crate::pipeline::pipeline_event::PipelineEvent;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::result_sink::{CycleResult, ResultSink};
use crate::shared::camera_selector::CameraSelector;
use crate::shared::completion::Completion;
use crate::shared::oriented_frame::OrientedFrame;

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[derive(Default)]
pub struct CameraState {
    pub opens: Vec<OpenRequest>,
    pub pending_opens: VecDeque<(OpenRequest, Completion<Result<SessionHandle, CameraError>>)>,
    pub pending_captures: VecDeque<(u64, Completion<Result<RawCapture, CameraError>>)>,
    pub pending_closes: VecDeque<Completion<()>>,
    pub previews_started: Vec<u64>,
    pub previews_stopped: Vec<u64>,
    pub closed: Vec<u64>,
    pub live: HashSet<u64>,
    pub fail_preview: bool,
    next_id: u64,
}

impl CameraState {
    /// Sessions opened and not yet closed.
    pub fn live_sessions(&self) -> usize {
        self.live.len()
    }
}

pub struct FakeCamera(pub Arc<Mutex<CameraState>>);

impl CameraPort for FakeCamera {
    fn open(
        &mut self,
        request: OpenRequest,
        done: Completion<Result<SessionHandle, CameraError>>,
    ) {
        let mut state = self.0.lock().unwrap();
        state.opens.push(request);
        state.pending_opens.push_back((request, done));
    }

    fn start_preview(&mut self, session: &SessionHandle) -> Result<(), CameraError> {
        let mut state = self.0.lock().unwrap();
        if state.fail_preview {
            return Err(CameraError::Disconnected);
        }
        state.previews_started.push(session.id());
        Ok(())
    }

    fn stop_preview(&mut self, session: &SessionHandle) {
        self.0.lock().unwrap().previews_stopped.push(session.id());
    }

    fn request_still_capture(
        &mut self,
        session: &SessionHandle,
        done: Completion<Result<RawCapture, CameraError>>,
    ) {
        self.0
            .lock()
            .unwrap()
            .pending_captures
            .push_back((session.id(), done));
    }

    fn close(&mut self, session: SessionHandle, done: Completion<()>) {
        let mut state = self.0.lock().unwrap();
        state.live.remove(&session.id());
        state.closed.push(session.id());
        state.pending_closes.push_back(done);
    }
}

#[derive(Default)]
pub struct DetectorState {
    pub pending: VecDeque<(Arc<OrientedFrame>, Completion<DetectionOutcome>)>,
    pub submitted: usize,
    pub max_outstanding: usize,
}

pub struct FakeDetector(pub Arc<Mutex<DetectorState>>);

impl DetectorPort for FakeDetector {
    fn submit(&mut self, frame: Arc<OrientedFrame>, done: Completion<DetectionOutcome>) {
        let mut state = self.0.lock().unwrap();
        state.submitted += 1;
        state.pending.push_back((frame, done));
        state.max_outstanding = state.max_outstanding.max(state.pending.len());
    }
}

#[derive(Default)]
pub struct SchedulerState {
    pub ticker: Option<Ticker>,
    pub interval: Option<Duration>,
    pub starts: usize,
    pub stops: usize,
}

pub struct FakeScheduler(pub Arc<Mutex<SchedulerState>>);

impl TickScheduler for FakeScheduler {
    fn start(&mut self, interval: Duration, ticker: Ticker) {
        let mut state = self.0.lock().unwrap();
        state.starts += 1;
        state.interval = Some(interval);
        state.ticker = Some(ticker);
    }

    fn stop(&mut self) {
        let mut state = self.0.lock().unwrap();
        state.stops += 1;
        state.ticker = None;
    }
}

pub struct RecordingSink(pub Arc<Mutex<Vec<CycleResult>>>);

impl ResultSink for RecordingSink {
    fn publish(&mut self, result: CycleResult) {
        self.0.lock().unwrap().push(result);
    }
}

#[derive(Default)]
pub struct LoggerState {
    pub errors: Vec<PipelineError>,
    pub metrics: Vec<(String, f64)>,
    pub timings: Vec<String>,
    pub summaries: usize,
}

pub struct RecordingLogger(pub Arc<Mutex<LoggerState>>);

impl PipelineLogger for RecordingLogger {
    fn cycle_published(&mut self, _face_count: usize) {}

    fn timing(&mut self, stage: &str, _duration_ms: f64) {
        self.0.lock().unwrap().timings.push(stage.to_string());
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.0.lock().unwrap().metrics.push((name.to_string(), value));
    }

    fn info(&mut self, _message: &str) {}

    fn error(&mut self, error: &PipelineError) {
        self.0.lock().unwrap().errors.push(error.clone());
    }

    fn summary(&self) {
        self.0.lock().unwrap().summaries += 1;
    }
}

/// A controller wired to fakes, with helpers that complete outstanding
/// requests and feed the resulting events back in.
pub struct Harness {
    pub controller: PipelineController,
    pub events: Receiver<PipelineEvent>,
    pub camera: Arc<Mutex<CameraState>>,
    pub detector: Arc<Mutex<DetectorState>>,
    pub scheduler: Arc<Mutex<SchedulerState>>,
    pub published: Arc<Mutex<Vec<CycleResult>>>,
    pub logger: Arc<Mutex<LoggerState>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        let camera = Arc::new(Mutex::new(CameraState::default()));
        let detector = Arc::new(Mutex::new(DetectorState::default()));
        let scheduler = Arc::new(Mutex::new(SchedulerState::default()));
        let published = Arc::new(Mutex::new(Vec::new()));
        let logger = Arc::new(Mutex::new(LoggerState::default()));
        let (tx, rx) = crossbeam_channel::unbounded();

        let parts = PipelineParts {
            camera: Box::new(FakeCamera(camera.clone())),
            detector: Box::new(FakeDetector(detector.clone())),
            frames: FramePipeline::default(),
            scheduler: Box::new(FakeScheduler(scheduler.clone())),
            sink: Box::new(RecordingSink(published.clone())),
            logger: Box::new(RecordingLogger(logger.clone())),
        };

        Self {
            controller: PipelineController::new(config, parts, tx),
            events: rx,
            camera,
            detector,
            scheduler,
            published,
            logger,
        }
    }

    /// Feeds every queued event to the controller.
    pub fn pump(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.controller.handle(event);
        }
    }

    /// Completes the oldest outstanding open successfully.
    pub fn open_succeeds(&mut self) {
        let (handle, done) = {
            let mut state = self.camera.lock().unwrap();
            let (request, done) = state.pending_opens.pop_front().unwrap();
            state.next_id += 1;
            let id = state.next_id;
            state.live.insert(id);
            (SessionHandle::new(id, request.selector), done)
        };
        done.complete(Ok(handle));
        self.pump();
    }

    pub fn open_fails(&mut self, error: CameraError) {
        let (_, done) = self.camera.lock().unwrap().pending_opens.pop_front().unwrap();
        done.complete(Err(error));
        self.pump();
    }

    pub fn close_completes(&mut self) {
        let done = self.camera.lock().unwrap().pending_closes.pop_front().unwrap();
        done.complete(());
        self.pump();
    }

    /// Fires the scheduler's current ticker. Returns `false` if no timer runs.
    pub fn tick(&mut self) -> bool {
        let ticker = self.scheduler.lock().unwrap().ticker.clone();
        let fired = ticker.map(|t| t.fire()).unwrap_or(false);
        self.pump();
        fired
    }

    pub fn capture_succeeds(&mut self, selector: CameraSelector) {
        self.capture_completes(Ok(RawCapture::new(png_bytes(4, 2), selector, 0)));
    }

    pub fn capture_completes(&mut self, result: Result<RawCapture, CameraError>) {
        let (_, done) = self
            .camera
            .lock()
            .unwrap()
            .pending_captures
            .pop_front()
            .unwrap();
        done.complete(result);
        self.pump();
    }

    pub fn detection_completes(&mut self, outcome: DetectionOutcome) {
        let (_, done) = self.detector.lock().unwrap().pending.pop_front().unwrap();
        done.complete(outcome);
        self.pump();
    }

    /// Starts the controller and brings the initial session up.
    pub fn streaming(mut self) -> Self {
        self.controller.start();
        self.open_succeeds();
        self
    }

    pub fn live_sessions(&self) -> usize {
        self.camera.lock().unwrap().live_sessions()
    }

    pub fn opens(&self) -> Vec<CameraSelector> {
        self.camera
            .lock()
            .unwrap()
            .opens
            .iter()
            .map(|r| r.selector)
            .collect()
    }

    pub fn pending_captures(&self) -> usize {
        self.camera.lock().unwrap().pending_captures.len()
    }

    pub fn submissions(&self) -> usize {
        self.detector.lock().unwrap().submitted
    }

    pub fn errors(&self) -> Vec<PipelineError> {
        self.logger.lock().unwrap().errors.clone()
    }
}
