//! GitHub integration: token identity check before a release

mod identity;

pub use identity::{GitHubIdentityClient, IdentityProbe};
