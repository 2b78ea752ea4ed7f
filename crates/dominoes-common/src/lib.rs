//! ---
//! nd_section: "01-core-functionality"
//! nd_subsection: "module"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Shared settings and version metadata."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
//! Settings file discovery and version metadata consumed by the
//! `dominoes-run` front end.

pub mod settings;
pub mod version;

pub use settings::{HarnessSettings, LoadedSettings};
pub use version::VersionInfo;
