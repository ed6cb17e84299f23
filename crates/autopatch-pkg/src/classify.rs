//! Pending update classification
//!
//! Package manager listings are not structured output. A line is taken as a
//! package entry only when its whitespace-split shape matches what the
//! family's listing command prints for real packages; everything else
//! (headers, progress, diagnostics) is dropped.

use tracing::{debug, trace};

use crate::types::{DistroFamily, PackageListing};

/// Name fragments that keep a package out of unattended installs
pub const FORBIDDEN_KEYWORDS: [&str; 3] = ["kernel", "systemd", "grub"];

const RPM_ARCH_MARKERS: [&str; 3] = ["x86_64", "aarch64", "noarch"];
const DEBIAN_VENDOR_MARKERS: [&str; 2] = ["ubuntu", "deb"];

/// Expected shape of a package line for one distribution family
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineShape {
    /// `yum check-update`: `name.arch  version  repository`
    Rpm,
    /// `apt-get --show-upgraded --verbose-versions upgrade`:
    /// `name  (old  =>  new)`
    Debian {
        /// Release codename, e.g. `jammy`
        codename: String,
    },
}

impl LineShape {
    /// Shape for a family, given the host's release codename
    pub fn for_family(family: DistroFamily, codename: impl Into<String>) -> Self {
        match family {
            DistroFamily::Rpm => LineShape::Rpm,
            DistroFamily::Debian => LineShape::Debian {
                codename: codename.into(),
            },
        }
    }

    /// Number of whitespace-separated tokens on a package line
    #[must_use]
    pub fn expected_columns(&self) -> usize {
        match self {
            LineShape::Rpm => 3,
            LineShape::Debian { .. } => 4,
        }
    }

    /// Return the package-name token if `line` is a candidate package entry
    #[must_use]
    pub fn candidate_name<'a>(&self, line: &'a str) -> Option<&'a str> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != self.expected_columns() {
            return None;
        }

        let marked = match self {
            LineShape::Rpm => RPM_ARCH_MARKERS.iter().any(|m| tokens[0].contains(m)),
            LineShape::Debian { codename } => {
                DEBIAN_VENDOR_MARKERS.iter().any(|m| tokens[1].contains(m))
                    || (!codename.is_empty() && tokens[3].contains(codename.as_str()))
            }
        };

        marked.then_some(tokens[0])
    }
}

/// Check whether a package name must be installed by hand
///
/// Case-sensitive substring match against [`FORBIDDEN_KEYWORDS`].
#[must_use]
pub fn is_manual_only(name: &str) -> bool {
    FORBIDDEN_KEYWORDS.iter().any(|k| name.contains(k))
}

/// Packages of one run, split by what happens to them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedUpdates {
    /// Installed automatically, in listing order
    pub updatable: Vec<String>,
    /// Reported for manual installation, in listing order
    pub manual_only: Vec<String>,
    /// Subset of `updatable` whose upgrade failed
    pub failed: Vec<String>,
}

impl ClassifiedUpdates {
    /// Split a raw listing into updatable and manual-only packages
    #[must_use]
    pub fn classify(listing: &PackageListing, shape: &LineShape) -> Self {
        let mut classified = Self::default();

        for line in listing.lines() {
            let Some(name) = shape.candidate_name(line) else {
                trace!(line, "ignoring non-package line");
                continue;
            };

            if is_manual_only(name) {
                classified.manual_only.push(name.to_string());
            } else {
                classified.updatable.push(name.to_string());
            }
        }

        debug!(
            updatable = classified.updatable.len(),
            manual_only = classified.manual_only.len(),
            "classified pending updates"
        );

        classified
    }

    /// Nothing to install automatically
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.updatable.is_empty()
    }

    /// Number of packages upgraded successfully
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.updatable.len() - self.failed.len()
    }

    /// `failed` appears in `updatable` in the same relative order
    #[must_use]
    pub fn failed_is_subsequence(&self) -> bool {
        let mut remaining = self.updatable.iter();
        self.failed
            .iter()
            .all(|f| remaining.by_ref().any(|u| u == f))
    }
}
