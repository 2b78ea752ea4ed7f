//! ---
//! nd_section: "01-core-functionality"
//! nd_subsection: "module"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Build and version metadata."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
use std::fmt;

/// Version details reported by `--version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub package: &'static str,
    pub version: &'static str,
    pub profile: &'static str,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            package: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            profile: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            },
        }
    }

    /// Multi-line description including the build profile.
    pub fn extended(&self) -> String {
        format!(
            "dominoes-run {}\npackage: {}\nprofile: {}",
            self.version, self.package, self.profile
        )
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.package, self.version)
    }
}
