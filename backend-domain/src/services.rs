// Pure domain services

pub mod aggregator;
pub mod normalizer;
pub mod roster;

pub use aggregator::*;
pub use normalizer::*;
pub use roster::*;
