//! Fixed-rate presentation loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::overlay::{Overlay, OverlayState};
use super::scene::{self, Camera, Viewport};
use super::surface::{RenderError, Surface};
use super::transform::{AxisRemap, RenderTransform};
use crate::handoff::OrientationHandoff;
use crate::telemetry::OrientationSample;

/// Deadline ticker. Ticks that are already past are skipped, not replayed.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self::starting_at(period, Instant::now())
    }

    pub fn starting_at(period: Duration, start: Instant) -> Self {
        let period = period.max(Duration::from_micros(1));
        Self {
            period,
            next: start + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Work out the wait until the next tick as of `now`, advancing the
    /// deadline. Returns the wait and the number of ticks skipped.
    ///
    /// A late tick fires at once; whole periods that passed meanwhile are
    /// dropped.
    pub fn advance(&mut self, now: Instant) -> (Duration, u64) {
        if now < self.next {
            let wait = self.next - now;
            self.next += self.period;
            return (wait, 0);
        }

        let behind = now - self.next;
        let missed = (behind.as_nanos() / self.period.as_nanos()) as u64;
        let step = self.period.as_nanos() * (missed as u128 + 1);
        self.next += Duration::from_nanos(u64::try_from(step).unwrap_or(u64::MAX));
        (Duration::ZERO, missed)
    }

    /// Sleep until the next tick. Returns the number of ticks skipped.
    pub fn wait(&mut self) -> u64 {
        let (wait, missed) = self.advance(Instant::now());
        if !wait.is_zero() {
            thread::sleep(wait);
        }
        missed
    }
}

/// Frames per second over a sliding one-second window.
#[derive(Debug, Default)]
struct RateMeter {
    window_start: Option<Instant>,
    frames: u32,
    fps: f32,
}

impl RateMeter {
    fn tick(&mut self, now: Instant) {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        let elapsed = now.duration_since(start);
        if elapsed >= Duration::from_secs(1) {
            self.fps = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.window_start = Some(now);
        }
    }
}

/// Presentation settings resolved from config and command line.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenterSettings {
    pub fps: u32,
    pub overlay: bool,
    pub scale: f32,
    pub remap: AxisRemap,
    /// Stop after this many frames
    pub max_frames: Option<u64>,
}

impl Default for PresenterSettings {
    fn default() -> Self {
        Self {
            fps: 30,
            overlay: true,
            scale: 1.0,
            remap: AxisRemap::default(),
            max_frames: None,
        }
    }
}

impl PresenterSettings {
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

/// Why the presentation loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentExit {
    /// The surface reported a quit key or hang-up
    #[default]
    QuitRequested,
    /// The process-wide interrupt flag was raised
    Interrupted,
    /// The configured frame limit was reached
    FrameLimit,
}

/// Summary of one presentation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresentStats {
    pub frames: u64,
    pub skipped_ticks: u64,
    pub exit: PresentExit,
}

/// Consumer side: snapshots the handoff each tick and draws it.
pub struct Presenter {
    settings: PresenterSettings,
    camera: Camera,
    overlay: Overlay,
    handoff: Arc<OrientationHandoff>,
    quit: Arc<AtomicBool>,
}

impl Presenter {
    pub fn new(
        settings: PresenterSettings,
        handoff: Arc<OrientationHandoff>,
        quit: Arc<AtomicBool>,
    ) -> Self {
        let overlay = Overlay::with_visibility(settings.overlay);
        Self {
            settings,
            camera: Camera::default(),
            overlay,
            handoff,
            quit,
        }
    }

    /// Run until a quit request, an interrupt or the frame limit.
    ///
    /// `link_up` is asked once per frame whether the ingestion loop is
    /// still running.
    pub fn run<S>(
        &mut self,
        surface: &mut S,
        link_up: &dyn Fn() -> bool,
    ) -> Result<PresentStats, RenderError>
    where
        S: Surface + ?Sized,
    {
        let mut ticker = Ticker::new(self.settings.frame_period());
        let mut rate = RateMeter::default();
        let mut stats = PresentStats::default();

        log::debug!(
            "Presenting at {} fps (period {:?})",
            self.settings.fps,
            ticker.period()
        );

        loop {
            if self.quit.load(Ordering::SeqCst) {
                stats.exit = PresentExit::Interrupted;
                break;
            }
            if surface.poll_quit()? {
                stats.exit = PresentExit::QuitRequested;
                break;
            }

            let sample = self.handoff.snapshot();
            self.draw_frame(surface, &sample, link_up(), rate.fps)?;
            stats.frames += 1;
            rate.tick(Instant::now());

            if self.settings.max_frames.is_some_and(|max| stats.frames >= max) {
                stats.exit = PresentExit::FrameLimit;
                break;
            }

            let missed = ticker.wait();
            if missed > 0 {
                log::trace!("Skipped {} frame ticks", missed);
            }
            stats.skipped_ticks += missed;
        }

        log::debug!(
            "Presentation ended ({:?}) after {} frames, {} ticks skipped",
            stats.exit,
            stats.frames,
            stats.skipped_ticks
        );
        Ok(stats)
    }

    /// Draw one frame for `sample`.
    pub fn draw_frame<S>(
        &self,
        surface: &mut S,
        sample: &OrientationSample,
        link_up: bool,
        fps: f32,
    ) -> Result<(), RenderError>
    where
        S: Surface + ?Sized,
    {
        surface.begin_frame()?;
        surface.present_sample(sample)?;

        let (cols, rows) = surface.size();
        if cols >= 2 && rows >= 2 {
            let viewport = Viewport::new(&self.camera, cols, rows, surface.cell_aspect());
            let transform =
                RenderTransform::from_sample(sample, self.settings.remap, self.settings.scale);

            scene::draw_grid(surface, &viewport);
            scene::draw_body(surface, &viewport, &transform);

            if self.overlay.visible {
                let state = OverlayState {
                    sample,
                    published: self.handoff.publish_count(),
                    link_up,
                    fps,
                };
                for (row, line) in self.overlay.lines(&state).iter().enumerate() {
                    surface.draw_text(0, row as u16, line);
                }
                surface.draw_text(0, rows - 1, self.overlay.footer());
            }
        }

        surface.end_frame()
    }
}

impl std::fmt::Debug for Presenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presenter")
            .field("settings", &self.settings)
            .field("overlay", &self.overlay.visible)
            .finish_non_exhaustive()
    }
}
