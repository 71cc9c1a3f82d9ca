//! DoodlePad is a children's drawing pad with freehand tools, decorative stamps,
//! "rotate the last stamp", and linear undo/redo over full-canvas snapshots.

pub mod logger;

pub mod assets;
pub mod canvas;
pub mod cli;
pub mod components;
pub mod ops;
pub mod pad;

pub use assets::{PadSettings, StampAssets};
pub use components::colors::StrokeColor;
pub use components::tools::{StampKind, Tool};
pub use pad::{Clock, DrawingPad, SystemClock};
