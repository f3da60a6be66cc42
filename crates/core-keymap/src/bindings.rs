use core_events::KeyToken;
use core_layout::{ConfigError, LayoutMapping};
use smallvec::SmallVec;
use tracing::trace;

/// Role a key plays inside prefix collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Digit,
    Negate,
    Commit,
    CommitAndContinue,
    CommitWithDecimal,
}

impl Binding {
    pub fn role(self) -> &'static str {
        match self {
            Binding::Digit => "digit",
            Binding::Negate => "negate",
            Binding::Commit => "commit",
            Binding::CommitAndContinue => "commit-and-continue",
            Binding::CommitWithDecimal => "decimal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Bound(Binding),
    Unbound,
}

/// Flat key to role table for one installation.
#[derive(Debug, Clone)]
pub struct BindingTable {
    entries: SmallVec<[(KeyToken, Binding); 16]>,
}

impl BindingTable {
    /// Bind every mapped key as a digit, then each role list in order.
    /// A key may carry only one role.
    pub fn build(
        mapping: &LayoutMapping,
        roles: &[(Binding, &[KeyToken])],
    ) -> Result<Self, ConfigError> {
        let mut table = BindingTable {
            entries: SmallVec::new(),
        };
        for key in mapping.keys() {
            table.insert(key.clone(), Binding::Digit)?;
        }
        for (binding, keys) in roles {
            for key in keys.iter() {
                table.insert(key.clone(), *binding)?;
            }
        }
        Ok(table)
    }

    fn insert(&mut self, key: KeyToken, binding: Binding) -> Result<(), ConfigError> {
        if let Some((_, existing)) = self.entries.iter().find(|(k, _)| *k == key) {
            if *existing == binding {
                trace!(target: "keymap.registry", key = %key, role = binding.role(), "duplicate_binding_ignored");
                return Ok(());
            }
            return Err(ConfigError::ConflictingBinding {
                key,
                first: existing.role(),
                second: binding.role(),
            });
        }
        self.entries.push((key, binding));
        Ok(())
    }

    pub fn resolve(&self, key: &KeyToken) -> Resolution {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map_or(Resolution::Unbound, |(_, b)| Resolution::Bound(*b))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyToken, Binding)> {
        self.entries.iter().map(|(k, b)| (k, *b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_layout::{DigitOrderSpec, LayoutSpec, resolve};
    use pretty_assertions::assert_eq;

    fn qwerty() -> LayoutMapping {
        resolve(&LayoutSpec::default(), &DigitOrderSpec::default(), false)
            .unwrap()
            .mapping
    }

    fn k(name: &str) -> KeyToken {
        KeyToken::parse(name).unwrap()
    }

    #[test]
    fn digits_and_roles_resolve() {
        let commit: &[KeyToken] = &[k("RET")];
        let negate: &[KeyToken] = &[k("-")];
        let table = BindingTable::build(
            &qwerty(),
            &[(Binding::Commit, commit), (Binding::Negate, negate)],
        )
        .unwrap();
        assert_eq!(table.len(), 12);
        assert_eq!(table.resolve(&k("a")), Resolution::Bound(Binding::Digit));
        assert_eq!(table.resolve(&k("RET")), Resolution::Bound(Binding::Commit));
        assert_eq!(table.resolve(&k("-")), Resolution::Bound(Binding::Negate));
        assert_eq!(table.resolve(&k("z")), Resolution::Unbound);
    }

    #[test]
    fn digit_key_reused_as_commit_conflicts() {
        let commit: &[KeyToken] = &[k(";")];
        let err = BindingTable::build(&qwerty(), &[(Binding::Commit, commit)]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::ConflictingBinding {
                key: k(";"),
                first: "digit",
                second: "commit"
            }
        );
    }

    #[test]
    fn same_role_listed_twice_is_tolerated() {
        let commit: &[KeyToken] = &[k("RET"), k("RET")];
        let table = BindingTable::build(&qwerty(), &[(Binding::Commit, commit)]).unwrap();
        assert_eq!(table.len(), 11);
    }

    #[test]
    fn modified_key_is_distinct_from_plain_key() {
        let decimal: &[KeyToken] = &[k("C-a")];
        let table =
            BindingTable::build(&qwerty(), &[(Binding::CommitWithDecimal, decimal)]).unwrap();
        assert_eq!(
            table.resolve(&k("C-a")),
            Resolution::Bound(Binding::CommitWithDecimal)
        );
        assert_eq!(table.resolve(&k("a")), Resolution::Bound(Binding::Digit));
    }
}
