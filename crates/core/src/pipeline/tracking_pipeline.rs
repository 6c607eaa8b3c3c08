use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::capture::domain::capture_device::CaptureDevice;
use crate::capture::domain::capture_settings::CaptureSettings;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::matching_engine::MatchingEngine;
use crate::pipeline::event_dispatcher::{EventDispatcher, FaceEventConsumer, Notification};
use crate::pipeline::frame_intake::FrameIntake;
use crate::pipeline::pipeline_config::PipelineConfig;
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;

/// Runs face tracking on dedicated threads.
///
/// Layout: `capture → intake [detect/match] → delivery`
///
/// The capture thread pushes frames into a bounded queue and evicts the
/// oldest pending frame when intake falls behind. The intake thread owns
/// the record store, so frames are applied strictly one at a time. Events
/// reach the consumer on the dispatcher's delivery thread.
pub struct TrackingPipeline {
    config: PipelineConfig,
    idle: Option<IdleParts>,
    running: Option<RunningPipeline>,
    dispatcher: Option<EventDispatcher>,
}

struct IdleParts {
    device: Box<dyn CaptureDevice>,
    detector: Box<dyn FaceDetector>,
    logger: Box<dyn PipelineLogger>,
}

struct RunningPipeline {
    settings: CaptureSettings,
    cancelled: Arc<AtomicBool>,
    dropped: Arc<AtomicUsize>,
    capture_handle: JoinHandle<Box<dyn CaptureDevice>>,
    intake_handle: JoinHandle<IntakeWorker>,
}

/// State owned by the intake thread.
struct IntakeWorker {
    intake: FrameIntake,
    detector: Box<dyn FaceDetector>,
    logger: Box<dyn PipelineLogger>,
}

impl TrackingPipeline {
    pub fn new(
        device: Box<dyn CaptureDevice>,
        detector: Box<dyn FaceDetector>,
        consumer: Box<dyn FaceEventConsumer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            config,
            idle: Some(IdleParts {
                device,
                detector,
                logger: Box::new(NullPipelineLogger),
            }),
            running: None,
            dispatcher: Some(EventDispatcher::spawn(consumer)),
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        if let Some(parts) = self.idle.as_mut() {
            parts.logger = logger;
        }
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Settings the device applied, while running.
    pub fn settings(&self) -> Option<&CaptureSettings> {
        self.running.as_ref().map(|r| &r.settings)
    }

    /// Opens the capture device and starts processing frames.
    ///
    /// On failure the consumer is notified once and the pipeline stays
    /// idle; calling `open` again retries. Opening a running pipeline
    /// returns its current settings.
    pub fn open(&mut self) -> Result<CaptureSettings, TrackingError> {
        if let Some(running) = &self.running {
            return Ok(running.settings.clone());
        }
        let Some(events) = self.dispatcher.as_ref().and_then(EventDispatcher::sender) else {
            return Err(TrackingError::DeviceUnavailable(
                "event delivery has shut down".into(),
            ));
        };
        let Some(mut parts) = self.idle.take() else {
            let error = TrackingError::DeviceUnavailable(
                "pipeline components were lost when a worker thread panicked".into(),
            );
            self.notify(Notification::Failed(error.clone()));
            return Err(error);
        };

        let settings = match parts.device.open(&self.config.capture) {
            Ok(settings) => settings,
            Err(error) => {
                log::error!("Failed to open capture device: {error}");
                parts.device.close();
                self.idle = Some(parts);
                self.notify(Notification::Failed(error.clone()));
                return Err(error);
            }
        };

        parts.logger.info(&format!(
            "Capture opened: {} {}x{} @ {} fps",
            settings.device_name, settings.width, settings.height, settings.frame_rate
        ));
        self.notify(Notification::CaptureOpened(settings.clone()));

        let IdleParts {
            device,
            detector,
            logger,
        } = parts;
        let worker = IntakeWorker {
            intake: FrameIntake::new(
                MatchingEngine::new(self.config.margin),
                self.config.view_size,
                self.config.grace_frames,
            ),
            detector,
            logger,
        };

        let cancelled = Arc::new(AtomicBool::new(false));
        let dropped = Arc::new(AtomicUsize::new(0));
        let (frame_tx, frame_rx) =
            crossbeam_channel::bounded::<Frame>(self.config.frame_queue_capacity.max(1));

        let capture_handle = spawn_capture(
            device,
            frame_tx,
            frame_rx.clone(),
            cancelled.clone(),
            dropped.clone(),
        );
        let intake_handle = spawn_intake(worker, frame_rx, events, cancelled.clone());

        self.running = Some(RunningPipeline {
            settings: settings.clone(),
            cancelled,
            dropped,
            capture_handle,
            intake_handle,
        });
        Ok(settings)
    }

    /// Stops capture, abandons queued frames and reports `TrackingLost` if
    /// faces were being tracked. Returns once no further event can be
    /// produced by this run.
    pub fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };
        running.cancelled.store(true, Ordering::Relaxed);
        self.shut_down(running)
    }

    /// Processes every frame until the device stops delivering, then shuts
    /// down like `close`.
    pub fn wait(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };
        self.shut_down(running)
    }

    /// Closes the pipeline, delivers everything still queued and hands the
    /// consumer back.
    pub fn finish(mut self) -> Option<Box<dyn FaceEventConsumer>> {
        if let Err(e) = self.close() {
            log::error!("Pipeline shutdown failed: {e}");
        }
        self.dispatcher.take()?.join()
    }

    fn notify(&self, notification: Notification) {
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.dispatch(notification);
        }
    }

    /// Joins both worker threads and coalesces the first error encountered.
    fn shut_down(&mut self, running: RunningPipeline) -> Result<(), Box<dyn std::error::Error>> {
        let RunningPipeline {
            dropped,
            capture_handle,
            intake_handle,
            ..
        } = running;
        let mut first_error: Option<Box<dyn std::error::Error>> = None;

        let device = match capture_handle.join() {
            Ok(device) => Some(device),
            Err(_) => {
                first_error.get_or_insert_with(|| "Capture thread panicked".into());
                None
            }
        };
        let worker = match intake_handle.join() {
            Ok(worker) => Some(worker),
            Err(_) => {
                first_error.get_or_insert_with(|| "Intake thread panicked".into());
                None
            }
        };

        let dropped = dropped.load(Ordering::Relaxed);
        if dropped > 0 {
            log::warn!("Dropped {dropped} frame(s) to keep up with capture");
        }

        if let (Some(device), Some(mut worker)) = (device, worker) {
            worker.logger.metric("dropped_frames", dropped as f64);
            worker.logger.summary();
            self.idle = Some(IdleParts {
                device,
                detector: worker.detector,
                logger: worker.logger,
            });
        }
        log::info!("Capture closed");

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for TrackingPipeline {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("Pipeline shutdown failed: {e}");
        }
    }
}

impl IntakeWorker {
    fn process(&mut self, frame: &Frame) -> Option<Notification> {
        let mode = self.intake.mode();

        let started = Instant::now();
        let requested = self
            .intake
            .request_observations(frame, self.detector.as_mut());
        self.logger.timing("detect", elapsed_ms(started));

        let notification = match requested {
            Ok((request, observations)) => {
                let started = Instant::now();
                let report = self.intake.ingest(request, observations);
                self.logger.timing("match", elapsed_ms(started));
                report.event.map(Notification::Face)
            }
            Err(error) => {
                log::warn!("{error}");
                Some(Notification::Failed(error))
            }
        };

        self.logger
            .metric("faces", self.intake.store().count() as f64);
        self.logger.frame_processed(frame.index(), mode);
        notification
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

fn spawn_capture(
    mut device: Box<dyn CaptureDevice>,
    frame_tx: Sender<Frame>,
    stale_rx: Receiver<Frame>,
    cancelled: Arc<AtomicBool>,
    dropped: Arc<AtomicUsize>,
) -> JoinHandle<Box<dyn CaptureDevice>> {
    std::thread::spawn(move || {
        while !cancelled.load(Ordering::Relaxed) {
            let Some(frame) = device.next_frame() else {
                break;
            };
            if !offer_frame(&frame_tx, &stale_rx, frame, &dropped) {
                break;
            }
        }
        device.close();
        device
    })
}

/// Queues `frame`, evicting the oldest pending frame if the queue is full.
/// Returns false once the intake side has gone away.
fn offer_frame(
    frame_tx: &Sender<Frame>,
    stale_rx: &Receiver<Frame>,
    mut frame: Frame,
    dropped: &AtomicUsize,
) -> bool {
    loop {
        match frame_tx.try_send(frame) {
            Ok(()) => return true,
            Err(TrySendError::Disconnected(_)) => return false,
            Err(TrySendError::Full(rejected)) => {
                frame = rejected;
                if let Ok(stale) = stale_rx.try_recv() {
                    dropped.fetch_add(1, Ordering::Relaxed);
                    log::debug!(
                        "Dropped frame {} in favor of frame {}",
                        stale.index(),
                        frame.index()
                    );
                }
            }
        }
    }
}

fn spawn_intake(
    mut worker: IntakeWorker,
    frame_rx: Receiver<Frame>,
    events: Sender<Notification>,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<IntakeWorker> {
    std::thread::spawn(move || {
        let _stop_capture = CancelOnExit(cancelled.clone());
        for frame in frame_rx.iter() {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            if let Some(notification) = worker.process(&frame) {
                if events.send(notification).is_err() {
                    break;
                }
            }
        }
        if let Some(event) = worker.intake.reset() {
            let _ = events.send(Notification::Face(event));
        }
        worker
    })
}

/// Raises the cancel flag when dropped, including during a panic, so the
/// capture thread never outlives the intake thread.
struct CancelOnExit(Arc<AtomicBool>);

impl Drop for CancelOnExit {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}
