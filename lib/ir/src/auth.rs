//! Authorization directive merging.
//!
//! Only two directive shapes exist: an "allow API key" flag and a named
//! Cognito group list. Merging is a boolean OR plus a set union; the group
//! set is kept sorted, so the canonical rendering of a merged spec is
//! independent of the order directives were collected in. Byte-identical
//! regeneration on unchanged input depends on this.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Canonical authorization metadata for a document, operation or field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSpec {
    pub api_key: bool,
    pub groups: BTreeSet<String>,
}

impl AuthSpec {
    pub fn api_key_only() -> Self {
        Self {
            api_key: true,
            groups: BTreeSet::new(),
        }
    }

    pub fn groups<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            api_key: false,
            groups: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.api_key && self.groups.is_empty()
    }

    /// Merge another spec into this one: OR the api-key flags, union the
    /// group sets.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            api_key: self.api_key || other.api_key,
            groups: self.groups.union(&other.groups).cloned().collect(),
        }
    }

    /// Merge any number of specs. The result is the same for every
    /// permutation of the input.
    pub fn merge_all<'a, I>(specs: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>,
    {
        specs
            .into_iter()
            .fold(Self::default(), |acc, s| acc.merge(s))
    }

    /// First group name that is not a valid Cognito group token, if any.
    /// Valid tokens are non-empty and drawn from `[A-Za-z0-9_-]`.
    pub fn invalid_group(&self) -> Option<&str> {
        self.groups
            .iter()
            .map(String::as_str)
            .find(|g| g.is_empty() || !g.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'))
    }

    /// Canonical directive clauses: at most two, API-key clause first,
    /// then the sorted group clause.
    pub fn clauses(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.api_key {
            out.push("@aws_api_key".to_string());
        }
        if !self.groups.is_empty() {
            let quoted: Vec<String> = self.groups.iter().map(|g| format!("\"{g}\"")).collect();
            out.push(format!(
                "@aws_cognito_user_pools(cognito_groups: [{}])",
                quoted.join(", ")
            ));
        }
        out
    }

    /// Clauses joined for inline rendering; empty string when no auth.
    pub fn render_suffix(&self) -> String {
        let clauses = self.clauses();
        if clauses.is_empty() {
            String::new()
        } else {
            format!(" {}", clauses.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_or_plus_union() {
        let a = AuthSpec::api_key_only();
        let b = AuthSpec::groups(["Ops", "Admins"]);
        let merged = a.merge(&b);
        assert!(merged.api_key);
        assert_eq!(
            merged.groups.iter().collect::<Vec<_>>(),
            vec!["Admins", "Ops"]
        );
    }

    #[test]
    fn merge_order_never_matters() {
        let specs = [
            AuthSpec::groups(["Zeta", "Admins"]),
            AuthSpec::api_key_only(),
            AuthSpec::groups(["Admins", "Ops"]),
            AuthSpec::default(),
        ];

        // Every permutation of the inputs must render byte-identically.
        let reference = AuthSpec::merge_all(specs.iter()).clauses();
        let permutations: [[usize; 4]; 5] = [
            [3, 2, 1, 0],
            [1, 0, 3, 2],
            [2, 3, 0, 1],
            [0, 2, 1, 3],
            [3, 1, 2, 0],
        ];
        for perm in permutations {
            let merged = AuthSpec::merge_all(perm.iter().map(|&i| &specs[i]));
            assert_eq!(merged.clauses(), reference);
        }
    }

    #[test]
    fn duplicate_groups_collapse() {
        let merged = AuthSpec::groups(["Admins"]).merge(&AuthSpec::groups(["Admins"]));
        assert_eq!(merged.groups.len(), 1);
    }

    #[test]
    fn clause_order_api_key_first() {
        let spec = AuthSpec {
            api_key: true,
            groups: ["Ops".to_string()].into_iter().collect(),
        };
        let clauses = spec.clauses();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0], "@aws_api_key");
        assert_eq!(
            clauses[1],
            "@aws_cognito_user_pools(cognito_groups: [\"Ops\"])"
        );
    }

    #[test]
    fn empty_spec_renders_nothing() {
        assert!(AuthSpec::default().clauses().is_empty());
        assert_eq!(AuthSpec::default().render_suffix(), "");
    }

    #[test]
    fn group_validation() {
        assert!(AuthSpec::groups(["Admins", "ops-team", "a_b"]).invalid_group().is_none());
        assert_eq!(AuthSpec::groups([""]).invalid_group(), Some(""));
        assert_eq!(
            AuthSpec::groups(["bad group"]).invalid_group(),
            Some("bad group")
        );
    }
}
