//! Differentiation, pattern-based integration, and numeric limit sampling.

pub mod differentiate;
pub mod integrate;
pub mod limit;

pub use differentiate::differentiate;
pub use integrate::integrate;
pub use limit::limit;
