use super::{AddressFamily, AddressFamilyGroup, RoutableAddress};
use crate::error::Result;
use crate::traits::RouteLookup;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::{debug, info};

/// IPv4 probe destination (TEST-NET-1, RFC 5737)
pub const PROBE_DESTINATION_V4: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 0));

/// IPv6 probe destination (documentation prefix, RFC 3849)
pub const PROBE_DESTINATION_V6: IpAddr = IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0));

impl AddressFamily {
    /// Destination whose route decides which local address is used for global traffic
    pub fn probe_destination(self) -> IpAddr {
        match self {
            Self::V4 => PROBE_DESTINATION_V4,
            Self::V6 => PROBE_DESTINATION_V6,
        }
    }
}

/// Keep the candidates the system would use as source for global traffic
///
/// IPv4 results come first, then IPv6, each in candidate order. At most one
/// route lookup is made per family and none for a family without candidates.
pub async fn sieve(
    groups: &AddressFamilyGroup,
    routes: &dyn RouteLookup,
) -> Result<Vec<RoutableAddress>> {
    let mut routable = sieve_family(groups.family(AddressFamily::V4), AddressFamily::V4, routes).await?;
    routable.extend(sieve_family(groups.family(AddressFamily::V6), AddressFamily::V6, routes).await?);
    Ok(routable)
}

/// Sieve the candidates of a single family
pub async fn sieve_family(
    candidates: &[String],
    family: AddressFamily,
    routes: &dyn RouteLookup,
) -> Result<Vec<RoutableAddress>> {
    if candidates.is_empty() {
        debug!("No {} candidates, skipping route lookup", family);
        return Ok(Vec::new());
    }

    let destination = family.probe_destination();
    let decision = routes.route_get(destination).await?;
    debug!("Route to {}: {}", destination, decision.trim());

    let routable: Vec<RoutableAddress> = candidates
        .iter()
        .filter(|candidate| {
            let selected = contains_word(&decision, candidate);
            if !selected {
                info!("{} address {} is not used for global traffic, skipping", family, candidate);
            }
            selected
        })
        .map(|candidate| RoutableAddress::new(candidate.clone(), family))
        .collect();

    Ok(routable)
}

/// Whether `token` occurs in `text` as a whole word
///
/// The token is matched literally. Both of its ends must sit on a word
/// boundary: exactly one of the characters on either side of the boundary is
/// a word character (alphanumeric or `_`), with the edges of `text` counting
/// as non-word. "10.0.0.5" is therefore found in "src 10.0.0.5 uid" but not in
/// "src 10.0.0.50 uid".
pub fn contains_word(text: &str, token: &str) -> bool {
    let (Some(first), Some(last)) = (token.chars().next(), token.chars().next_back()) else {
        return false;
    };

    match_starts(text, token).any(|start| {
        let end = start + token.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        is_word_char(before) != is_word_char(Some(first))
            && is_word_char(Some(last)) != is_word_char(after)
    })
}

fn is_word_char(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_alphanumeric() || c == '_')
}

// `str::match_indices` skips matches that overlap an earlier one, which
// would hide "1.1" in "21.1.1" after the rejected first hit.
fn match_starts<'a>(text: &'a str, token: &'a str) -> impl Iterator<Item = usize> + 'a {
    text.char_indices()
        .map(|(index, _)| index)
        .filter(move |&index| text[index..].starts_with(token))
}
