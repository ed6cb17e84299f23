//! Type definitions for package management

/// Raw output of a "what needs updating" query
///
/// Produced once per run and handed straight to the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageListing(String);

impl PackageListing {
    /// Wrap raw package manager output
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Iterate over the raw lines
    pub fn lines(&self) -> std::str::Lines<'_> {
        self.0.lines()
    }

    /// Raw text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Exit status of a single package upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus(pub i32);

impl ExitStatus {
    /// Check if the upgrade succeeded (exit code 0)
    #[must_use]
    pub fn success(self) -> bool {
        self.0 == 0
    }
}

/// Supported distribution families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistroFamily {
    /// RHEL, CentOS, Fedora and derivatives (yum)
    Rpm,
    /// Debian, Ubuntu and derivatives (apt)
    Debian,
}

impl DistroFamily {
    /// Map an os-release `ID` or `ID_LIKE` entry to a family
    #[must_use]
    pub fn from_os_id(id: &str) -> Option<Self> {
        match id.to_ascii_lowercase().as_str() {
            "centos" | "rhel" | "fedora" | "rocky" | "almalinux" | "ol" | "amzn" => {
                Some(DistroFamily::Rpm)
            }
            "debian" | "ubuntu" | "linuxmint" | "pop" | "raspbian" => Some(DistroFamily::Debian),
            _ => None,
        }
    }
}

impl std::fmt::Display for DistroFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistroFamily::Rpm => write!(f, "rpm"),
            DistroFamily::Debian => write!(f, "debian"),
        }
    }
}
