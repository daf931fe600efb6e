//! Spatial (D-pad) navigation for keyboard and remote-control driven UIs.
//!
//! Focusable elements are grouped into sections. Arrow keys move focus to the
//! geometrically closest element in the pressed direction, following each
//! section's restrict and enter policies. Every focus transition is announced
//! through cancelable notifications delivered to the host document and to
//! registered handlers.
//!
//! The engine owns a [`Document`] implementation and never caches element
//! geometry: each navigation request reads the current layout.

pub mod config;
pub mod controller;
pub mod dom;
pub mod events;
pub mod geometry;
pub mod handlers;
pub mod input;
pub mod partition;
pub mod ranker;
pub mod section;
pub mod selector;

pub use config::{EngineSettings, EnterTo, GlobalConfig, NavOptions, Restrict, SectionConfig};
pub use controller::{FocusState, SpatialNavigation};
pub use dom::{Document, MemoryDocument, NodeId};
pub use events::{Cause, HandlerOutcome, NavEvent, NotificationKind};
pub use geometry::{BoundingBox, Rect};
pub use handlers::{fragment_of, sibling_traversal, visible_sibling};
pub use input::{KeyDisposition, KeyMods};
pub use ranker::Direction;
pub use section::{Section, SectionRegistry};
pub use selector::ElementSelector;
