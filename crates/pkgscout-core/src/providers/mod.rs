// Provider implementations for package registries
pub mod npm;

pub use npm::NpmProvider;
