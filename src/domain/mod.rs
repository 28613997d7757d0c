//! Domain layer - tracked products, price diffing, registry lifecycle

pub mod diff;
pub mod product;
pub mod registry;
pub mod store;

pub use diff::{ChangeEvent, ChangeKind, DiffEngine};
pub use product::{PriceSnapshot, TrackedProduct};
pub use registry::ProductRegistry;
pub use store::ProductStore;
