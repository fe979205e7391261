use crate::traits::AddrInfo;
use tracing::trace;

/// Family tag used by iproute2 for IPv4 entries
const INET: &str = "inet";

/// Family tag used by iproute2 for IPv6 entries
const INET6: &str = "inet6";

/// Address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Classify an iproute2 family tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            INET => Some(Self::V4),
            INET6 => Some(Self::V6),
            _ => None,
        }
    }

    /// The iproute2 family tag
    pub fn tag(self) -> &'static str {
        match self {
            Self::V4 => INET,
            Self::V6 => INET6,
        }
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V4 => f.write_str("IPv4"),
            Self::V6 => f.write_str("IPv6"),
        }
    }
}

/// Candidate addresses grouped by family, each in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFamilyGroup {
    pub v4: Vec<String>,
    pub v6: Vec<String>,
}

impl AddressFamilyGroup {
    /// Candidates of one family
    pub fn family(&self, family: AddressFamily) -> &[String] {
        match family {
            AddressFamily::V4 => &self.v4,
            AddressFamily::V6 => &self.v6,
        }
    }

    /// True if neither family has a candidate
    pub fn is_empty(&self) -> bool {
        self.v4.is_empty() && self.v6.is_empty()
    }
}

/// Partition address entries into IPv4 and IPv6 candidates
///
/// Entries with an unknown family tag or without a non-empty local address
/// are dropped silently. Duplicates are kept.
pub fn split_families(entries: impl IntoIterator<Item = AddrInfo>) -> AddressFamilyGroup {
    let mut groups = AddressFamilyGroup::default();

    for entry in entries {
        let family = entry.family.as_deref().and_then(AddressFamily::from_tag);
        match (family, entry.local) {
            (Some(AddressFamily::V4), Some(local)) if !local.is_empty() => groups.v4.push(local),
            (Some(AddressFamily::V6), Some(local)) if !local.is_empty() => groups.v6.push(local),
            (_, local) => {
                trace!(family = ?entry.family, local = ?local, "Skipping address entry");
            }
        }
    }

    groups
}
