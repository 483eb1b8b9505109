//! RunMat Graphics - handle-based graphics object property engine.
//!
//! Objects (figures, axes, lines, text, ui controls, ...) live in a tree
//! rooted at handle `0` and are addressed by numeric handles. Every object
//! carries a typed, validated property set; writes fire listeners, update
//! derived state (data limits, ticks, camera transform, text extents) and
//! queue callbacks that a single interpreter thread drains.

pub mod commands;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod events;
pub mod handle;
pub mod kinds;
pub mod logging;
pub mod manager;
pub mod object;
pub mod property;
pub mod ticks;
pub mod toolkit;
pub mod transform;
pub mod units;
pub mod value;

mod guard;
mod props;

pub use config::{ConfigLoader, GraphicsConfig};
pub use engine::{ErrorSink, GraphicsEngine, ZoomMode};
pub use error::{ErrorClass, GraphicsError, GraphicsResult};
pub use events::{BusyAction, EventPoster, GraphicsEvent};
pub use handle::Handle;
pub use kinds::ObjectKind;
pub use logging::{init_logging, LoggingGuard, LoggingOptions};
pub use property::{Property, PropertyKind, PropertySet};
pub use toolkit::{Interpreter, TextMeasurer, TextRequest, Toolkit};
pub use units::Units;
pub use value::{StructValue, Tensor, Value};

pub use props::factory_properties;
