use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
}

/// Identity of one referenced class member. Two symbols are the same tally
/// key if and only if all four fields match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    /// Internal (slash-separated) name of the declaring class.
    pub owner: String,
    pub member: String,
    pub signature: String,
    pub kind: MemberKind,
}

impl Symbol {
    pub fn new(
        owner: impl Into<String>,
        member: impl Into<String>,
        signature: impl Into<String>,
        kind: MemberKind,
    ) -> Self {
        Self {
            owner: owner.into(),
            member: member.into(),
            signature: signature.into(),
            kind,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.owner, self.member, self.signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_canonical_form() {
        let sym = Symbol::new("org/pkg/Api", "foo", "()V", MemberKind::Method);
        assert_eq!(sym.to_string(), "org/pkg/Api.foo:()V");
    }

    #[test]
    fn equality_is_structural_over_all_fields() {
        let method = Symbol::new("org/pkg/Api", "foo", "()V", MemberKind::Method);
        let field = Symbol::new("org/pkg/Api", "foo", "()V", MemberKind::Field);
        assert_eq!(
            method,
            Symbol::new("org/pkg/Api", "foo", "()V", MemberKind::Method)
        );
        assert_ne!(method, field);
        assert_ne!(
            method,
            Symbol::new("org/pkg/Api", "foo", "(I)V", MemberKind::Method)
        );
    }
}
