//! Presentation - the consumer side.
//!
//! # Structure
//!
//! - [`transform`] - Sample to model transform (axis remap, rotation matrix)
//! - [`scene`] - Camera, ground grid and the oriented cube
//! - [`presenter`] - Fixed-rate loop drawing the latest sample
//! - [`surface`] - What a frame is drawn onto
//! - [`terminal`] - Full-screen terminal surface
//! - [`print`] - Headless surface printing samples as text

mod canvas;
mod overlay;
mod presenter;
mod print;
mod scene;
mod surface;
mod terminal;
mod transform;

pub use canvas::CharCanvas;
pub use overlay::{Overlay, OverlayState};
pub use presenter::{PresentExit, PresentStats, Presenter, PresenterSettings, Ticker};
pub use print::PrintSurface;
pub use scene::{Camera, Viewport};
pub use surface::{RenderError, Surface};
pub use terminal::{is_quit_key, ScreenGuard, ScreenLogWriter, TerminalSurface};
pub use transform::{rotation_matrix, AxisRemap, RenderTransform};
