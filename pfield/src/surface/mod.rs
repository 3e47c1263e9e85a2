pub mod host;
pub mod headless;
pub mod manager;
