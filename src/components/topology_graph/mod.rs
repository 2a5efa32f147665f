//! Force-directed Zigbee topology visualization component.
//!
//! Renders the devices and links of a Zigbee mesh on an HTML canvas with:
//! - Physics-based device positioning via a self-contained force simulation
//! - Directed links folded into straight or lens-shaped visual edges
//! - Drag to pin, double-click to unpin, hover to highlight a neighborhood
//! - Pinned positions saved to and restored from a layout store
//!
//! # Example
//!
//! ```ignore
//! use zigzag_graph::{TopologyCanvas, TopologyData, Zig, Zag, Relation};
//!
//! let data = TopologyData {
//!     nodes: vec![Zig::new("00:0d:6f"), Zig::new("84:ba:20")],
//!     links: vec![Zag::new("00:0d:6f", "84:ba:20", Relation::Child)],
//! };
//!
//! view! { <TopologyCanvas data=data /> }
//! ```

pub mod aggregate;
pub mod binder;
mod component;
pub mod config;
pub mod curve;
pub mod error;
pub mod interaction;
pub mod persistence;
mod render;
pub mod simulation;
pub mod source;
pub mod state;
pub mod theme;
pub mod types;

pub use component::TopologyCanvas;
pub use config::DisplayConfig;
pub use error::{ConfigError, LayoutError, SourceError};
pub use persistence::{LayoutEntry, LayoutStore, LocalStorageLayoutStore, MemoryLayoutStore};
pub use source::UnrecognizedRelationPolicy;
pub use state::ZigzagGraph;
pub use theme::Theme;
pub use types::{Relation, TopologyData, Zag, Zig, ZigRole};
