//! Projection of the document onto the rendered window.
//!
//! The editor never renders the whole document. `ViewportProjector` maps the
//! pixel scroll offset to a small `[start, end)` line range (plus overscan),
//! and `ViewportProjector::frame` assembles a paint-ready [`Frame`] for that
//! range: gutter numbers, highlighted segments per line, caret geometry,
//! selection rectangles and the IME preedit overlay.
//!
//! Geometry:
//! - line `i` occupies `[i * lh, (i + 1) * lh)` in content space;
//! - the rendered slice is translated by `start * lh - scroll_top`;
//! - caret x is the measured width of the text left of the caret column.
//!
//! Measurement is delegated to a [`TextMeasure`]; [`MonospaceMeasure`] is the
//! fixed-pitch implementation used by the headless binary and tests.

pub mod frame;
pub mod measure;
pub mod segments;
pub mod viewport;

pub use frame::{CompositionOverlay, CursorGeometry, Frame, FrameInput, FrameLine, SelectionRect};
pub use measure::{MonospaceMeasure, TextMeasure};
pub use segments::{RenderSegment, render_segments};
pub use viewport::{Viewport, ViewportProjector, VisibleRange};
