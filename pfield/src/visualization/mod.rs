pub mod field_vis2d;
pub mod headless;
