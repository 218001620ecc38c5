pub mod advisor;

pub use advisor::AdvisorHandler;
