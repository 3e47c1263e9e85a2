pub mod states;
pub mod params;
pub mod engine;
pub mod pointer;
pub mod layout;
pub mod forces;
pub mod integrator;
pub mod scenario;
