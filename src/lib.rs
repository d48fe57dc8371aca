//! Cloth cutting-layout estimator.
//!
//! Packs the rectangular cloth pieces an order needs onto fixed-width rolls
//! and picks the stocked batch long enough to cut them from.

pub mod config;
pub mod error;
pub mod grid;
pub mod inventory;
pub mod order;
pub mod planner;
pub mod queue;
pub mod render;
pub mod selector;
pub mod shelf;
pub mod types;

pub use error::{LayoutError, Result};
pub use inventory::{AccessoryStock, Material, Patch, StockItem, StockSnapshot};
pub use order::{AccessoryRequirement, OrderLine, Product};
pub use planner::{Allocation, ArticleOutcome, LayoutPlanner, OrderPlan, PackingResult};
pub use queue::MaterialRequirement;
pub use shelf::{Layout, ShelfPacker};
pub use types::{Article, Batch, Demand, Placement, Rect};
