pub mod error;
pub mod handles;
pub mod hit;
pub mod image;
pub mod paint;
pub mod reconcile;
pub mod surface;

pub use error::RenderError;
pub use handles::{Anchor, HandleBox};
pub use hit::hit_test;
pub use paint::paint_scene;
pub use reconcile::{ImageCache, ImageSlot, ReconcileReport, Reconciler};
pub use surface::{NodeKind, NodeProps, RenderSurface, RetainedNode, RetainedScene};
