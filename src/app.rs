//! Session orchestration: wire the transport, ingestion thread and
//! presentation loop together and tear them down in order.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ConfigError};
use crate::handoff::OrientationHandoff;
use crate::ingest::{IngestError, IngestStats, Ingestor};
use crate::render::{PresentStats, PresenterSettings, Presenter, RenderError, Surface};
use crate::telemetry::{Grammar, OrientationSample};
use crate::transport::{RecordSource, TransportError};

/// Top-level error for a visualizer run.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to set Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Everything one run needs, after config and command line are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub device: PathBuf,
    pub grammar: Grammar,
    pub baud: u32,
    pub flow_control: bool,
    pub poll_interval: Option<Duration>,
    pub max_record_len: usize,
    pub presenter: PresenterSettings,
    /// Print samples instead of drawing
    pub headless: bool,
}

impl RunSettings {
    /// Build run settings for `device` from a validated config.
    pub fn resolve(device: PathBuf, config: &Config, headless: bool) -> Result<Self, AppError> {
        config.validate()?;
        let poll_interval = match config.serial.poll_interval_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };
        Ok(Self {
            device,
            grammar: config.decoder.grammar,
            baud: config.serial.baud,
            flow_control: config.serial.flow_control,
            poll_interval,
            max_record_len: config.serial.max_record_len,
            presenter: PresenterSettings {
                fps: config.render.fps,
                overlay: config.render.overlay,
                scale: config.render.scale,
                remap: config.axis_remap()?,
                max_frames: None,
            },
            headless,
        })
    }

    #[cfg(unix)]
    pub fn line_mode(&self) -> crate::transport::LineMode {
        crate::transport::LineMode {
            baud: self.baud,
            hardware_flow_control: self.flow_control,
            poll_interval: self.poll_interval,
        }
    }
}

/// What a finished session hands back.
#[derive(Debug)]
pub struct SessionReport<S> {
    /// The transport, for the caller to close
    pub source: S,
    pub ingest_stats: IngestStats,
    /// How the ingestion loop ended
    pub ingest_result: Result<(), TransportError>,
    /// How the presentation loop ended
    pub present_result: Result<PresentStats, RenderError>,
}

/// One visualizer session over a record source.
///
/// Owns the handoff slot and the quit flag; nothing is global.
pub struct Session<S> {
    source: S,
    grammar: Grammar,
    max_record_len: usize,
    handoff: Arc<OrientationHandoff>,
    quit: Arc<AtomicBool>,
}

impl<S> Session<S>
where
    S: RecordSource + Send + 'static,
{
    pub fn new(source: S, grammar: Grammar, max_record_len: usize) -> Self {
        Self {
            source,
            grammar,
            max_record_len,
            handoff: Arc::new(OrientationHandoff::new(OrientationSample::initial(grammar))),
            quit: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that ends the presentation loop when raised.
    pub fn quit_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.quit)
    }

    pub fn handoff(&self) -> Arc<OrientationHandoff> {
        Arc::clone(&self.handoff)
    }

    /// Give up the session without running it.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Run ingestion in the background and present on this thread.
    ///
    /// When presentation ends, for any reason, ingestion is stopped and
    /// joined before this returns, so the transport in the report is no
    /// longer in use.
    pub fn run<F>(
        self,
        surface: &mut F,
        settings: PresenterSettings,
    ) -> Result<SessionReport<S>, AppError>
    where
        F: Surface + ?Sized,
    {
        let ingestor = Ingestor::spawn(
            self.source,
            self.grammar,
            Arc::clone(&self.handoff),
            self.max_record_len,
        )?;

        let mut presenter = Presenter::new(settings, self.handoff, Arc::clone(&self.quit));
        let present_result = presenter.run(surface, &|| !ingestor.is_finished());

        log::debug!("Stopping ingestion");
        let report = ingestor.stop()?;

        Ok(SessionReport {
            source: report.source,
            ingest_stats: report.stats,
            ingest_result: report.result,
            present_result,
        })
    }
}

impl<S> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("grammar", &self.grammar)
            .field("max_record_len", &self.max_record_len)
            .field("quit", &self.quit.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Log the outcome of a finished session and split off the transport.
///
/// A dropped link is not a failure of the run; a broken surface is.
pub fn finish<S>(report: SessionReport<S>) -> (S, Result<PresentStats, AppError>) {
    log::info!("Ingestion: {}", report.ingest_stats);
    match &report.ingest_result {
        Ok(()) => log::debug!("Ingestion stopped cleanly"),
        Err(e) => log::warn!("Ingestion ended early: {}", e),
    }
    let result = report.present_result.map_err(AppError::from);
    if let Ok(stats) = &result {
        log::info!(
            "Presented {} frames ({} ticks skipped)",
            stats.frames,
            stats.skipped_ticks
        );
    }
    (report.source, result)
}

/// Open the device, run a session to completion, then release the device.
#[cfg(unix)]
pub fn run(settings: &RunSettings, frame_limit: Option<u64>) -> Result<PresentStats, AppError> {
    use crate::render::{PrintSurface, TerminalSurface};
    use crate::transport::SerialChannel;

    let mut channel = SerialChannel::open(&settings.device)?;
    if let Err(e) = channel.configure(&settings.line_mode()) {
        channel.close();
        return Err(e.into());
    }

    let session = Session::new(channel, settings.grammar, settings.max_record_len);
    let quit = session.quit_flag();
    if let Err(e) = ctrlc::set_handler(move || quit.store(true, Ordering::SeqCst)) {
        session.into_source().close();
        return Err(e.into());
    }

    let mut presenter = settings.presenter.clone();
    presenter.max_frames = frame_limit;

    let report = if settings.headless {
        let mut surface = PrintSurface::stdout();
        session.run(&mut surface, presenter)?
    } else {
        let mut surface = match TerminalSurface::new() {
            Ok(surface) => surface,
            Err(e) => {
                session.into_source().close();
                return Err(e.into());
            }
        };
        let report = session.run(&mut surface, presenter)?;
        if let Err(e) = surface.close() {
            log::warn!("Failed to restore terminal: {}", e);
        }
        report
    };

    let (channel, result) = finish(report);
    channel.close();
    result
}

#[cfg(not(unix))]
pub fn run(_settings: &RunSettings, _frame_limit: Option<u64>) -> Result<PresentStats, AppError> {
    Err(TransportError::Unsupported.into())
}
