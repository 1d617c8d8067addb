//! Build fixture sites and verify the code-block highlighting output
//!
//! A [`scenario::Scenario`] pairs a fixture build with checks on the
//! emitted HTML pages and asset directory. Scenarios are usually declared
//! in `ecverify.toml` (see [`config`]).

pub mod assets;
pub mod config;
pub mod fixture;
pub mod report;
pub mod scenario;
pub mod util;
pub mod validate;

pub use fixture::{build, BuildError, BuiltSite, FixtureDescriptor, StderrPolicy};
pub use scenario::{Check, Scenario};
pub use validate::{asset_base_path, validate_html, HtmlPattern, SiteConfig, ValidationOptions};
