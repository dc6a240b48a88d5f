// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! The requested-identity (`Subject`) and accumulated-name-constraint types
//! that the chain builder and the validator facade share. `DNSName`/
//! `DNSPattern` are re-exported from `x509-types` rather than redefined here,
//! since the wildcard/suffix rules they implement are identical whether
//! they're used for SAN matching or for name constraints.

use std::net::IpAddr;

pub use x509_types::common::{DNSName, DNSPattern};
use x509_types::extensions::SubjectAlternativeName;
use x509_types::name::{GeneralName, IpNetwork};

/// Represents a logical certificate "subject," i.e. a principal matching one
/// of the names listed in a certificate's `subjectAltNames` extension.
#[derive(Clone, Debug)]
pub enum Subject {
    Dns(DNSName),
    Ip(IpAddr),
}

impl Subject {
    fn matches_general_name(&self, general_name: &GeneralName) -> bool {
        match (general_name, self) {
            (GeneralName::DNSName(pattern), Self::Dns(name)) => {
                DNSPattern::new(pattern).map_or(false, |p| p.matches(name))
            }
            (GeneralName::IPAddress(addr), Self::Ip(name)) => addr == name,
            _ => false,
        }
    }

    /// Returns true if any of the names in the given `SubjectAlternativeName`
    /// match this `Subject`.
    pub fn matches(&self, san: &SubjectAlternativeName) -> bool {
        san.iter().any(|gn| self.matches_general_name(gn))
    }
}

/// Normalizes a `nameConstraints` DNS subtree base (spec §4.1: "a leading dot
/// is allowed and ignored").
fn normalize_dns_constraint(constraint: &str) -> &str {
    constraint.strip_prefix('.').unwrap_or(constraint)
}

fn dns_constraint_matches(constraint: &str, candidate: &str) -> bool {
    let constraint = normalize_dns_constraint(constraint);
    if candidate.eq_ignore_ascii_case(constraint) {
        return true;
    }
    match candidate.len().checked_sub(constraint.len() + 1) {
        Some(split) if candidate.as_bytes()[split] == b'.' => {
            candidate[split + 1..].eq_ignore_ascii_case(constraint)
        }
        _ => false,
    }
}

/// The permitted/excluded name constraints accumulated while walking the
/// chain builder's DFS from the leaf towards a trust anchor (spec §4.3,
/// §9 "Accumulated name constraints").
///
/// Per RFC 5280, a name satisfies the *accumulated* permitted set only if it
/// matches at least one entry from *every* individual CA's non-empty
/// permitted list along the path (an AND-of-ORs); it's excluded if it
/// matches *any* CA's excluded entry anywhere on the path (a flat union).
/// Each `push` call returns a new, independent value — the parent's is left
/// untouched, matching spec's "without mutating the parent's" requirement.
#[derive(Clone, Debug, Default)]
pub struct NameConstraintSet {
    permitted_dns_layers: Vec<Vec<String>>,
    excluded_dns: Vec<String>,
    permitted_ip_layers: Vec<Vec<IpNetwork>>,
    excluded_ip: Vec<IpNetwork>,
}

impl NameConstraintSet {
    pub fn push(
        &self,
        permitted: &[GeneralName],
        excluded: &[GeneralName],
    ) -> Self {
        let mut next = self.clone();

        let permitted_dns: Vec<String> = permitted
            .iter()
            .filter_map(GeneralName::dns_name)
            .map(str::to_owned)
            .collect();
        if !permitted_dns.is_empty() {
            next.permitted_dns_layers.push(permitted_dns);
        }

        let permitted_ip: Vec<IpNetwork> =
            permitted.iter().filter_map(GeneralName::ip_network).copied().collect();
        if !permitted_ip.is_empty() {
            next.permitted_ip_layers.push(permitted_ip);
        }

        next.excluded_dns
            .extend(excluded.iter().filter_map(GeneralName::dns_name).map(str::to_owned));
        next.excluded_ip
            .extend(excluded.iter().filter_map(GeneralName::ip_network).copied());

        next
    }

    /// Whether `san` satisfies every constraint accumulated so far.
    pub fn permits(&self, san: &SubjectAlternativeName) -> bool {
        san.iter().all(|gn| self.permits_name(gn))
    }

    fn permits_name(&self, gn: &GeneralName) -> bool {
        match gn {
            GeneralName::DNSName(name) => {
                if self.excluded_dns.iter().any(|c| dns_constraint_matches(c, name)) {
                    return false;
                }
                self.permitted_dns_layers
                    .iter()
                    .all(|layer| layer.iter().any(|c| dns_constraint_matches(c, name)))
            }
            GeneralName::IPAddress(addr) => {
                if self.excluded_ip.iter().any(|net| net.contains(addr)) {
                    return false;
                }
                self.permitted_ip_layers
                    .iter()
                    .all(|layer| layer.iter().any(|net| net.contains(addr)))
            }
            // Name types this crate doesn't evaluate constraints over are
            // never restricted (spec §3: "never match positively").
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dns(s: &str) -> GeneralName {
        GeneralName::DNSName(s.to_string())
    }

    fn san(names: Vec<GeneralName>) -> SubjectAlternativeName {
        SubjectAlternativeName::new(names)
    }

    #[test]
    fn test_subject_matches_wildcard() {
        let subject = Subject::Dns(DNSName::new("sub.example.com").unwrap());
        assert!(subject.matches(&san(vec![dns("*.example.com")])));
        assert!(!subject.matches(&san(vec![dns("example.com")])));
    }

    #[test]
    fn test_name_constraints_permitted_and_excluded() {
        let set = NameConstraintSet::default().push(
            &[dns(".example.com")],
            &[dns("subsub.example.com")],
        );

        assert!(set.permits(&san(vec![dns("sub.example.com")])));
        assert!(!set.permits(&san(vec![dns("subsub.example.com")])));
        assert!(!set.permits(&san(vec![dns("other.com")])));
    }

    #[test]
    fn test_name_constraints_unmentioned_type_is_permitted() {
        // permitted_subtrees only mentions DNS; an IP SAN is unconstrained.
        let set = NameConstraintSet::default().push(&[dns(".example.com")], &[]);
        let ip_san = san(vec![GeneralName::IPAddress("127.0.0.1".parse().unwrap())]);
        assert!(set.permits(&ip_san));
    }

    #[test]
    fn test_name_constraints_layered_is_conjunctive() {
        let first = NameConstraintSet::default().push(&[dns("example.com")], &[]);
        let second = first.push(&[dns("sub.example.com")], &[]);

        // Satisfies the inner CA's constraint but not the outer CA's.
        assert!(first.permits(&san(vec![dns("sub.example.com")])));
        assert!(second.permits(&san(vec![dns("sub.example.com")])));
        // First pushed a constraint that's incompatible with a name that
        // only the second would accept.
        assert!(!second.permits(&san(vec![dns("other.example.com")])));
    }
}
