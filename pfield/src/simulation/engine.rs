//! High-level runtime engine settings
//!
//! Selects the layout, particle count, palette and seed used when the
//! particle store is created on mount

use super::states::{Layout, Rgb};

#[derive(Debug, Clone)]
pub struct Engine {
    pub layout: Layout, // chain, grid or drift
    pub count: usize, // store size, fixed per mount
    pub palette: Rgb, // colour for chain and grid particles
    pub seed: Option<u64>, // None = fresh entropy on every mount
}
