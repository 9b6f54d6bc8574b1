// npm registry API client
pub mod npm;

pub use npm::{NpmClient, NpmError, NpmLinks, NpmPackage, NpmSearchObject, NpmSearchResponse};
