//! Cloud-drive backends and search targets.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumCount, EnumIter, EnumString};

/// A cloud-drive provider reachable through the search and transfer APIs.
///
/// The string form (`quark`, `ali`, ...) is the identifier used on the wire
/// for credential lookups.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Backend {
    Quark,
    Ali,
    Baidu,
    Uc,
    Xunlei,
}

/// Domain fragments per backend, checked in order; the first hit wins.
const DOMAIN_TABLE: &[(Backend, &[&str])] = &[
    (Backend::Quark, &["pan.quark.cn"]),
    (Backend::Ali, &["www.alipan.com", "www.aliyundrive.com"]),
    (Backend::Baidu, &["pan.baidu.com"]),
    (Backend::Uc, &["drive.uc.cn", "fast.uc.cn"]),
    (Backend::Xunlei, &["pan.xunlei.com"]),
];

impl Backend {
    /// Matches a share URL against the domain table.
    ///
    /// Returns `None` when no known domain appears in the URL.
    pub fn match_url(url: &str) -> Option<Backend> {
        let lower = url.to_lowercase();
        DOMAIN_TABLE
            .iter()
            .find(|(_, domains)| domains.iter().any(|d| lower.contains(d)))
            .map(|(backend, _)| *backend)
    }

    /// Identifies the backend of a share URL, defaulting to Quark when the
    /// URL matches nothing.
    pub fn identify(url: &str) -> Backend {
        Self::match_url(url).unwrap_or(Backend::Quark)
    }

    /// Upstream `is_type` code for a narrow search on this backend.
    ///
    /// Ali has no narrow search of its own.
    pub fn search_code(self) -> Option<u8> {
        match self {
            Backend::Quark => Some(0),
            Backend::Baidu => Some(2),
            Backend::Uc => Some(3),
            Backend::Xunlei => Some(4),
            Backend::Ali => None,
        }
    }

    /// Human-facing label used in rendered listings.
    pub fn label(self) -> &'static str {
        match self {
            Backend::Quark => "Quark",
            Backend::Ali => "Ali",
            Backend::Baidu => "Baidu",
            Backend::Uc => "UC",
            Backend::Xunlei => "Xunlei",
        }
    }

    /// Dense index in declaration order, below `Backend::COUNT`.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A backend that has a narrow search, paired with its `is_type` code.
///
/// Only obtainable through [`TryFrom<Backend>`], so every narrow target
/// carries a valid code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Backend", into = "Backend")]
pub struct NarrowBackend {
    backend: Backend,
    code: u8,
}

impl NarrowBackend {
    pub fn backend(self) -> Backend {
        self.backend
    }

    pub fn code(self) -> u8 {
        self.code
    }
}

impl TryFrom<Backend> for NarrowBackend {
    type Error = String;

    fn try_from(backend: Backend) -> Result<Self, Self::Error> {
        backend
            .search_code()
            .map(|code| Self { backend, code })
            .ok_or_else(|| format!("backend '{}' has no search", backend))
    }
}

impl From<NarrowBackend> for Backend {
    fn from(narrow: NarrowBackend) -> Self {
        narrow.backend
    }
}

/// Which upstream search a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "backend")]
pub enum SearchTarget {
    /// Search restricted to a single backend.
    Narrow(NarrowBackend),
    /// Search across every backend at once.
    FullNetwork,
}

impl SearchTarget {
    /// Builds a narrow target, rejecting backends without a search code.
    pub fn narrow(backend: Backend) -> Option<Self> {
        NarrowBackend::try_from(backend).ok().map(Self::Narrow)
    }

    /// The backend of a narrow target.
    pub fn backend(&self) -> Option<Backend> {
        match self {
            Self::Narrow(narrow) => Some(narrow.backend()),
            Self::FullNetwork => None,
        }
    }

    pub fn is_full_network(&self) -> bool {
        matches!(self, Self::FullNetwork)
    }
}

impl Default for SearchTarget {
    fn default() -> Self {
        Self::Narrow(NarrowBackend {
            backend: Backend::Quark,
            code: 0,
        })
    }
}

impl std::fmt::Display for SearchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchTarget::Narrow(narrow) => write!(f, "{}", narrow.backend()),
            SearchTarget::FullNetwork => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for SearchTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(SearchTarget::FullNetwork);
        }
        let backend = s
            .parse::<Backend>()
            .map_err(|_| format!("unknown backend '{}'", s))?;
        NarrowBackend::try_from(backend).map(SearchTarget::Narrow)
    }
}
