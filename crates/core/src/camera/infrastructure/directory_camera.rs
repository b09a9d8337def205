use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{SendError, Sender};

use crate::camera::domain::camera_port::{CameraError, CameraPort, OpenRequest};
use crate::camera::domain::camera_session::SessionHandle;
use crate::camera::domain::raw_capture::RawCapture;
use crate::shared::camera_selector::CameraSelector;
use crate::shared::completion::Completion;
use crate::shared::constants::IMAGE_EXTENSIONS;

/// A [`CameraPort`] backed by folders of still images.
///
/// Each selector maps to a sub-directory of `root` (`front/`, `back/`).
/// Every capture returns the next image file in name order, wrapping around.
/// All device work happens on one background handler thread, so requests
/// are served strictly in the order they were made.
pub struct DirectoryCamera {
    jobs: Option<Sender<CameraJob>>,
    worker: Option<thread::JoinHandle<()>>,
    live_sessions: Arc<AtomicUsize>,
}

enum CameraJob {
    Open {
        request: OpenRequest,
        done: Completion<Result<SessionHandle, CameraError>>,
    },
    StartPreview {
        session: u64,
    },
    StopPreview {
        session: u64,
    },
    Capture {
        session: u64,
        done: Completion<Result<RawCapture, CameraError>>,
    },
    Close {
        session: u64,
        done: Completion<()>,
    },
}

impl CameraJob {
    fn fail(self) {
        match self {
            CameraJob::Open { done, .. } => done.complete(Err(CameraError::Disconnected)),
            CameraJob::Capture { done, .. } => done.complete(Err(CameraError::Disconnected)),
            CameraJob::Close { done, .. } => done.complete(()),
            CameraJob::StartPreview { .. } | CameraJob::StopPreview { .. } => {}
        }
    }
}

struct OpenSession {
    selector: CameraSelector,
    stills: Vec<PathBuf>,
    cursor: usize,
    captured: u64,
    previewing: bool,
}

struct CameraWorker {
    root: PathBuf,
    next_session: u64,
    sessions: HashMap<u64, OpenSession>,
    live_sessions: Arc<AtomicUsize>,
}

impl DirectoryCamera {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let live_sessions = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = crossbeam_channel::unbounded::<CameraJob>();

        let mut worker = CameraWorker {
            root,
            next_session: 1,
            sessions: HashMap::new(),
            live_sessions: live_sessions.clone(),
        };
        let handle = thread::Builder::new()
            .name("camera-handler".into())
            .spawn(move || {
                for job in rx {
                    worker.run(job);
                }
            })
            .ok();
        if handle.is_none() {
            log::error!("Failed to spawn camera handler thread");
        }

        Self {
            jobs: handle.as_ref().map(|_| tx),
            worker: handle,
            live_sessions,
        }
    }

    /// Sessions opened and not yet closed.
    pub fn live_sessions(&self) -> usize {
        self.live_sessions.load(Ordering::SeqCst)
    }

    /// Shared live-session counter, readable after the camera is handed off.
    pub fn live_session_gauge(&self) -> Arc<AtomicUsize> {
        self.live_sessions.clone()
    }

    fn dispatch(&self, job: CameraJob) -> bool {
        match &self.jobs {
            Some(tx) => match tx.send(job) {
                Ok(()) => true,
                Err(SendError(job)) => {
                    job.fail();
                    false
                }
            },
            None => {
                job.fail();
                false
            }
        }
    }
}

impl Drop for DirectoryCamera {
    fn drop(&mut self) {
        drop(self.jobs.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Camera handler thread panicked");
            }
        }
    }
}

impl CameraPort for DirectoryCamera {
    fn open(
        &mut self,
        request: OpenRequest,
        done: Completion<Result<SessionHandle, CameraError>>,
    ) {
        self.dispatch(CameraJob::Open { request, done });
    }

    fn start_preview(&mut self, session: &SessionHandle) -> Result<(), CameraError> {
        if self.dispatch(CameraJob::StartPreview {
            session: session.id(),
        }) {
            Ok(())
        } else {
            Err(CameraError::Disconnected)
        }
    }

    fn stop_preview(&mut self, session: &SessionHandle) {
        self.dispatch(CameraJob::StopPreview {
            session: session.id(),
        });
    }

    fn request_still_capture(
        &mut self,
        session: &SessionHandle,
        done: Completion<Result<RawCapture, CameraError>>,
    ) {
        self.dispatch(CameraJob::Capture {
            session: session.id(),
            done,
        });
    }

    fn close(&mut self, session: SessionHandle, done: Completion<()>) {
        self.dispatch(CameraJob::Close {
            session: session.id(),
            done,
        });
    }
}

impl CameraWorker {
    fn run(&mut self, job: CameraJob) {
        match job {
            CameraJob::Open { request, done } => done.complete(self.open(request)),
            CameraJob::StartPreview { session } => self.set_previewing(session, true),
            CameraJob::StopPreview { session } => self.set_previewing(session, false),
            CameraJob::Capture { session, done } => done.complete(self.capture(session)),
            CameraJob::Close { session, done } => {
                if self.sessions.remove(&session).is_some() {
                    self.live_sessions.fetch_sub(1, Ordering::SeqCst);
                    log::debug!("Closed camera session {session}");
                }
                done.complete(());
            }
        }
    }

    fn open(&mut self, request: OpenRequest) -> Result<SessionHandle, CameraError> {
        let dir = self.root.join(request.selector.as_str());
        if !dir.is_dir() {
            return Err(CameraError::NotFound(request.selector));
        }
        let stills = list_stills(&dir).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => {
                CameraError::PermissionDenied(format!("{}: {e}", dir.display()))
            }
            _ => CameraError::Io(e),
        })?;
        if stills.is_empty() {
            return Err(CameraError::NoFrames(request.selector));
        }

        let id = self.next_session;
        self.next_session += 1;
        log::debug!(
            "Opened {} camera session {id} ({} stills, requested {}x{})",
            request.selector,
            stills.len(),
            request.width,
            request.height
        );
        self.sessions.insert(
            id,
            OpenSession {
                selector: request.selector,
                stills,
                cursor: 0,
                captured: 0,
                previewing: false,
            },
        );
        self.live_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(SessionHandle::new(id, request.selector))
    }

    fn set_previewing(&mut self, session: u64, previewing: bool) {
        if let Some(open) = self.sessions.get_mut(&session) {
            open.previewing = previewing;
        }
    }

    fn capture(&mut self, session: u64) -> Result<RawCapture, CameraError> {
        let open = self
            .sessions
            .get_mut(&session)
            .ok_or(CameraError::UnknownSession(session))?;
        if !open.previewing {
            return Err(CameraError::NotPreviewing(session));
        }

        let path = &open.stills[open.cursor];
        let bytes = fs::read(path)?;
        open.cursor = (open.cursor + 1) % open.stills.len();
        let sequence = open.captured;
        open.captured += 1;
        Ok(RawCapture::new(bytes, open.selector, sequence))
    }
}

fn list_stills(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut stills = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image(&path) {
            stills.push(path);
        }
    }
    stills.sort();
    Ok(stills)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
