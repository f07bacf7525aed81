pub mod generator;
pub mod reentry;
pub mod registry;

pub use reentry::{IssuedReentry, ReentryError, ReentryIssuer};
pub use registry::{TokenError, TokenRegistry};
