//! Session tests: ingestion and presentation running together.

use std::collections::VecDeque;
use std::time::Duration;

use glam::Vec2;
use imu_visualizer::app::{finish, Session};
use imu_visualizer::render::{
    PresentExit, PresenterSettings, PrintSurface, RenderError, Surface,
};
use imu_visualizer::telemetry::{Grammar, OrientationSample};
use imu_visualizer::transport::{ReadOutcome, RecordSource, TransportError};

/// Replays records at a steady pace, then reports the link gone.
struct ScriptedSource {
    records: VecDeque<&'static [u8]>,
    pace: Duration,
}

impl ScriptedSource {
    fn new(records: &[&'static [u8]]) -> Self {
        Self {
            records: records.iter().copied().collect(),
            pace: Duration::from_millis(2),
        }
    }
}

impl RecordSource for ScriptedSource {
    fn read_record(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, TransportError> {
        std::thread::sleep(self.pace);
        let record = self.records.pop_front().ok_or(TransportError::Disconnected)?;
        let n = record.len().min(buf.len());
        buf[..n].copy_from_slice(&record[..n]);
        Ok(ReadOutcome::Record(n))
    }
}

/// Keeps the overlay text of the last frame.
#[derive(Default)]
struct TextSurface {
    frame_text: Vec<String>,
    last_text: Vec<String>,
    frames: u64,
}

impl Surface for TextSurface {
    fn size(&self) -> (u16, u16) {
        (80, 24)
    }

    fn begin_frame(&mut self) -> Result<(), RenderError> {
        self.frame_text.clear();
        Ok(())
    }

    fn draw_line(&mut self, _from: Vec2, _to: Vec2, _glyph: char) {}

    fn draw_text(&mut self, _col: u16, _row: u16, text: &str) {
        self.frame_text.push(text.to_string());
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        self.last_text = std::mem::take(&mut self.frame_text);
        self.frames += 1;
        Ok(())
    }

    fn poll_quit(&mut self) -> Result<bool, RenderError> {
        Ok(false)
    }
}

fn settings(frames: u64) -> PresenterSettings {
    PresenterSettings {
        fps: 100,
        max_frames: Some(frames),
        ..Default::default()
    }
}

#[test]
fn test_headless_prints_decoded_samples() {
    let source = ScriptedSource::new(&[
        b"Ang.x = 10\t\tAng.y = 20\n",
        b"noise\n",
        b"Ang.x = 11\t\tAng.y = 21\n",
    ]);
    let session = Session::new(source, Grammar::Euler, 256);
    let mut surface = PrintSurface::new(Vec::new());

    let report = session.run(&mut surface, settings(30)).unwrap();
    assert_eq!(report.ingest_stats.decoded, 2);
    assert_eq!(report.ingest_stats.misses, 1);
    assert!(matches!(report.ingest_result, Err(TransportError::Disconnected)));

    let (_source, result) = finish(report);
    assert_eq!(result.unwrap().exit, PresentExit::FrameLimit);

    let text = String::from_utf8(surface.into_inner()).unwrap();
    assert!(text.ends_with("x = 11\ty = 21\n"), "{:?}", text);
}

#[test]
fn test_presentation_outlives_lost_link() {
    let source = ScriptedSource::new(&[b"w = 0.5 x = 0.0 y = 0.0 z = 0.0\n"]);
    let session = Session::new(source, Grammar::Quaternion, 256);
    let handoff = session.handoff();
    let mut surface = TextSurface::default();

    let report = session.run(&mut surface, settings(40)).unwrap();
    assert!(report.ingest_result.is_err());
    assert_eq!(surface.frames, 40);

    // The last good sample is still shown, with the link reported down
    assert_eq!(
        handoff.snapshot(),
        OrientationSample::Quaternion {
            w: 0.5,
            x: 0.0,
            y: 0.0,
            z: 0.0
        }
    );
    assert!(surface.last_text.iter().any(|t| t.contains("link: down")));
    assert!(surface.last_text.iter().any(|t| t.contains("|q| = 0.5000")));
}
