pub mod reconstruct;
pub mod role;

pub use reconstruct::{reconstruct, Reconstructed};
pub use role::detect_role;
