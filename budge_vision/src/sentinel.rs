// THEORY:
// The `sentinel` is the long-running control loop around the pipeline. It owns
// the three external collaborators (frame source, display, alert) behind small
// traits, so the loop can run against a real camera or against scripted
// stand-ins in tests.
//
// Key architectural principles:
// 1.  **One Loop, One Owner**: capture, process, act, wait. The pipeline and its
//     tracker state live on this loop's stack and are never shared.
// 2.  **Two Real Exits**: the alert (success) and a frame source failure. The
//     loop has no iteration cap and no timeout. An external shutdown signal is
//     the only other way out.
// 3.  **Guaranteed Restore**: the display is dimmed through a guard whose `Drop`
//     restores it, so every exit path, including errors and interruption, puts
//     the screen back the way it was.

use crate::config::SentinelConfig;
use crate::core_modules::frame::RawFrame;
use crate::core_modules::sensitivity::Thresholds;
use crate::error::BudgeResult;
use crate::pipeline::{CycleReport, MotionPipeline, Transition};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Delivers raw frames from a camera or a recording.
pub trait FrameSource {
    /// Blocks until the next frame is available.
    ///
    /// Any error is treated as fatal by the sentinel.
    fn read_frame(&mut self) -> BudgeResult<RawFrame>;
}

/// Turns the screen off while the sentinel watches and back on afterwards.
pub trait DisplayControl {
    fn suppress(&mut self) -> BudgeResult<()>;
    fn restore(&mut self) -> BudgeResult<()>;
}

/// Signals that the device has been moved.
pub trait AlertEmitter {
    fn emit(&mut self) -> BudgeResult<()>;
}

/// Receives every cycle report, e.g. to render the change mask.
pub trait CycleObserver {
    fn observe(&mut self, report: &CycleReport) -> BudgeResult<()>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn read_frame(&mut self) -> BudgeResult<RawFrame> {
        (**self).read_frame()
    }
}

impl<T: DisplayControl + ?Sized> DisplayControl for Box<T> {
    fn suppress(&mut self) -> BudgeResult<()> {
        (**self).suppress()
    }

    fn restore(&mut self) -> BudgeResult<()> {
        (**self).restore()
    }
}

impl<T: AlertEmitter + ?Sized> AlertEmitter for Box<T> {
    fn emit(&mut self) -> BudgeResult<()> {
        (**self).emit()
    }
}

/// A display controller that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDisplay;

impl DisplayControl for NoopDisplay {
    fn suppress(&mut self) -> BudgeResult<()> {
        Ok(())
    }

    fn restore(&mut self) -> BudgeResult<()> {
        Ok(())
    }
}

/// How the watch ended when it did not end in an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentinelOutcome {
    /// The event threshold was reached and the alert was emitted.
    Alerted { events: u32, frames: u64 },
    /// The shutdown signal fired first.
    Interrupted { frames: u64 },
}

/// Fixed pauses used by the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentinelTiming {
    pub camera_warmup: Duration,
    pub lighting_settle: Duration,
    pub frame_wait: Duration,
}

impl SentinelTiming {
    pub fn from_config(config: &SentinelConfig) -> Self {
        Self {
            camera_warmup: config.camera_warmup(),
            lighting_settle: config.lighting_settle(),
            frame_wait: config.frame_wait(),
        }
    }

    /// No pauses at all.
    pub fn immediate() -> Self {
        Self {
            camera_warmup: Duration::ZERO,
            lighting_settle: Duration::ZERO,
            frame_wait: Duration::ZERO,
        }
    }
}

/// Restores the display when dropped, if it was suppressed.
struct DisplayGuard<'a, D: DisplayControl> {
    display: &'a mut D,
    suppressed: bool,
}

impl<'a, D: DisplayControl> DisplayGuard<'a, D> {
    fn suppress(display: &'a mut D) -> Self {
        let suppressed = match display.suppress() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Could not suppress display, continuing with it on");
                false
            }
        };
        Self {
            display,
            suppressed,
        }
    }
}

impl<D: DisplayControl> Drop for DisplayGuard<'_, D> {
    fn drop(&mut self) {
        if !self.suppressed {
            return;
        }
        match self.display.restore() {
            Ok(()) => debug!("Display restored"),
            Err(e) => warn!(error = %e, "Failed to restore display"),
        }
    }
}

/// The motion sentinel control loop.
pub struct Sentinel<S, D, A> {
    source: S,
    display: D,
    alert: A,
    thresholds: Thresholds,
    timing: SentinelTiming,
    observers: Vec<Box<dyn CycleObserver>>,
}

impl<S, D, A> Sentinel<S, D, A>
where
    S: FrameSource,
    D: DisplayControl,
    A: AlertEmitter,
{
    pub fn new(
        source: S,
        display: D,
        alert: A,
        thresholds: Thresholds,
        timing: SentinelTiming,
    ) -> Self {
        Self {
            source,
            display,
            alert,
            thresholds,
            timing,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn CycleObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Hands the collaborators back, e.g. to inspect test stand-ins.
    pub fn into_parts(self) -> (S, D, A) {
        (self.source, self.display, self.alert)
    }

    /// Watches until the device is moved, the source fails, or `shutdown` completes.
    pub async fn run_until<F>(&mut self, shutdown: F) -> BudgeResult<SentinelOutcome>
    where
        F: Future<Output = ()>,
    {
        let Self {
            source,
            display,
            alert,
            thresholds,
            timing,
            observers,
        } = self;
        let thresholds = *thresholds;
        let timing = *timing;
        let mut shutdown = std::pin::pin!(shutdown);

        info!(
            nz = thresholds.change_threshold,
            consec = thresholds.consecutive_threshold,
            events = thresholds.event_threshold,
            wait = ?timing.frame_wait,
            "Sentinel starting"
        );

        if pause(timing.camera_warmup, &mut shutdown).await {
            return Ok(SentinelOutcome::Interrupted { frames: 0 });
        }

        let _display = DisplayGuard::suppress(display);

        if pause(timing.lighting_settle, &mut shutdown).await {
            return Ok(SentinelOutcome::Interrupted { frames: 0 });
        }

        let background = source.read_frame().inspect_err(|e| {
            error!(error = %e, "Couldn't grab first frame");
        })?;
        let mut pipeline = MotionPipeline::new(thresholds, &background);
        drop(background);

        let mut frames: u64 = 0;
        loop {
            if pause(timing.frame_wait, &mut shutdown).await {
                info!(frames, "Shutdown requested, stopping sentinel");
                return Ok(SentinelOutcome::Interrupted { frames });
            }

            let raw = match source.read_frame() {
                Ok(raw) => raw,
                Err(e) => {
                    pipeline.fail();
                    error!(
                        error = %e,
                        frames,
                        phase = ?pipeline.phase(),
                        "Couldn't grab next frame"
                    );
                    return Err(e);
                }
            };
            frames += 1;

            let report = pipeline.process_frame(&raw)?;
            info!(
                top = report.score.top,
                bottom = report.score.bottom,
                left = report.score.left,
                right = report.score.right,
                total = report.score.total,
                moved = report.moved,
                consecutive = report.consecutive_motion_count,
                events = report.confirmed_event_count,
                "{}",
                report.summary()
            );

            for observer in observers.iter_mut() {
                if let Err(e) = observer.observe(&report) {
                    warn!(error = %e, "Cycle observer failed");
                }
            }

            match report.transition {
                Transition::Alert { events } => {
                    info!(events, frames, "Device moved, raising alert");
                    alert.emit()?;
                    return Ok(SentinelOutcome::Alerted { events, frames });
                }
                Transition::EventConfirmed { events } => {
                    debug!(events, "Sustained motion confirmed, background rebased");
                }
                Transition::Counted | Transition::Halted => {}
            }
        }
    }
}

/// Sleeps for `duration`, returning `true` early if `shutdown` completes first.
async fn pause<F>(duration: Duration, shutdown: &mut Pin<&mut F>) -> bool
where
    F: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = shutdown.as_mut() => true,
        _ = tokio::time::sleep(duration) => false,
    }
}
