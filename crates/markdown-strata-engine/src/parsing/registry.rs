//! Tokenizer registration.
//!
//! Registration is configuration: it is validated once when the parser is
//! built and read-only afterwards.

use std::collections::HashMap;

use bitflags::bitflags;

use crate::error::ConfigError;

use super::{
    ast::NodeKind,
    blocks::{BlockTokenizer, FallbackBlockTokenizer},
    inline::{InlineTokenizer, TextTokenizer},
};

bitflags! {
    /// Lifecycle phases a registered tokenizer takes part in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Phases: u8 {
        const MATCH = 1 << 0;
        const POST_MATCH = 1 << 1;
        const PARSE = 1 << 2;
        const POST_PARSE = 1 << 3;
    }
}

impl Default for Phases {
    fn default() -> Self {
        Phases::all()
    }
}

/// A tokenizer plus the phases it is enabled for.
pub struct Registered<T: ?Sized> {
    pub tokenizer: Box<T>,
    pub phases: Phases,
}

struct Claim {
    name: &'static str,
    priority: i32,
    types: &'static [NodeKind],
    phases: Phases,
}

/// Rejects overlapping recognized types and equal priorities among
/// tokenizers sharing a phase. The fallback only takes part in the type check.
fn validate(
    claims: &[Claim],
    fallback_name: &'static str,
    fallback_types: &[NodeKind],
) -> Result<(), ConfigError> {
    for (i, a) in claims.iter().enumerate() {
        if let Some(&kind) = a.types.iter().find(|&&k| fallback_types.contains(&k)) {
            return Err(ConfigError::DuplicateType {
                kind,
                first: fallback_name,
                second: a.name,
            });
        }
        for b in &claims[i + 1..] {
            if !a.phases.intersects(b.phases) {
                continue;
            }
            if let Some(&kind) = a.types.iter().find(|&&k| b.types.contains(&k)) {
                return Err(ConfigError::DuplicateType {
                    kind,
                    first: a.name,
                    second: b.name,
                });
            }
            if a.priority == b.priority {
                return Err(ConfigError::DuplicatePriority {
                    priority: a.priority,
                    first: a.name,
                    second: b.name,
                });
            }
        }
    }
    Ok(())
}

/// Registered block tokenizers, highest priority first.
pub struct BlockRegistry {
    entries: Vec<Registered<dyn BlockTokenizer>>,
    fallback: Box<dyn FallbackBlockTokenizer>,
    by_kind: HashMap<NodeKind, usize>,
}

impl BlockRegistry {
    pub fn new(
        mut entries: Vec<Registered<dyn BlockTokenizer>>,
        fallback: Box<dyn FallbackBlockTokenizer>,
    ) -> Result<Self, ConfigError> {
        let claims: Vec<Claim> = entries
            .iter()
            .map(|e| Claim {
                name: e.tokenizer.name(),
                priority: e.tokenizer.priority(),
                types: e.tokenizer.recognized_types(),
                phases: e.phases,
            })
            .collect();
        validate(&claims, fallback.name(), fallback.recognized_types())?;

        entries.sort_by_key(|e| std::cmp::Reverse(e.tokenizer.priority()));
        let mut by_kind = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            for &kind in entry.tokenizer.recognized_types() {
                by_kind.entry(kind).or_insert(i);
            }
        }
        Ok(Self {
            entries,
            fallback,
            by_kind,
        })
    }

    /// Tokenizers that may open blocks, in priority order.
    pub fn matchers(&self) -> impl Iterator<Item = &dyn BlockTokenizer> + '_ {
        self.with_phase(Phases::MATCH)
    }

    /// Tokenizers enabled for `phase`, in priority order. The fallback is
    /// always enabled and comes last.
    pub fn with_phase(&self, phase: Phases) -> impl Iterator<Item = &dyn BlockTokenizer> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.phases.contains(phase))
            .map(|e| e.tokenizer.as_ref() as &dyn BlockTokenizer)
            .chain((phase != Phases::MATCH).then(|| self.fallback.as_block()))
    }

    /// The tokenizer owning `kind` and its enabled phases.
    pub fn lookup(&self, kind: NodeKind) -> Option<(&dyn BlockTokenizer, Phases)> {
        if self.fallback.recognized_types().contains(&kind) {
            return Some((self.fallback.as_block(), Phases::all()));
        }
        let entry = &self.entries[*self.by_kind.get(kind)?];
        Some((entry.tokenizer.as_ref() as &dyn BlockTokenizer, entry.phases))
    }

    pub fn tokenizer_for(&self, kind: NodeKind) -> Option<&dyn BlockTokenizer> {
        self.lookup(kind).map(|(t, _)| t)
    }

    pub fn fallback(&self) -> &dyn FallbackBlockTokenizer {
        self.fallback.as_ref()
    }
}

/// Registered inline tokenizers, highest priority first.
pub struct InlineRegistry {
    entries: Vec<Registered<dyn InlineTokenizer>>,
    text: Box<dyn TextTokenizer>,
}

impl InlineRegistry {
    pub fn new(
        mut entries: Vec<Registered<dyn InlineTokenizer>>,
        text: Box<dyn TextTokenizer>,
    ) -> Result<Self, ConfigError> {
        let claims: Vec<Claim> = entries
            .iter()
            .map(|e| Claim {
                name: e.tokenizer.name(),
                priority: e.tokenizer.priority(),
                types: e.tokenizer.recognized_types(),
                phases: e.phases,
            })
            .collect();
        validate(&claims, text.name(), &[text.kind()])?;
        entries.sort_by_key(|e| std::cmp::Reverse(e.tokenizer.priority()));
        Ok(Self { entries, text })
    }

    pub fn entries(&self) -> &[Registered<dyn InlineTokenizer>] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Registered<dyn InlineTokenizer>> {
        self.entries.get(index)
    }

    pub fn text(&self) -> &dyn TextTokenizer {
        self.text.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::blocks::kinds::{AtxHeading, Paragraph, ThematicBreak};
    use crate::parsing::inline::kinds::{Emphasis, Text};

    fn block(t: impl BlockTokenizer + 'static) -> Registered<dyn BlockTokenizer> {
        Registered {
            tokenizer: Box::new(t),
            phases: Phases::all(),
        }
    }

    #[test]
    fn sorts_by_descending_priority() {
        let registry = BlockRegistry::new(
            vec![block(ThematicBreak::default()), block(AtxHeading::default())],
            Box::new(Paragraph::default()),
        )
        .unwrap();
        let names: Vec<_> = registry.matchers().map(|t| t.name()).collect();
        assert_eq!(names, vec!["atx-heading", "thematic-break"]);
    }

    #[test]
    fn duplicate_type_is_rejected() {
        let err = BlockRegistry::new(
            vec![block(AtxHeading::default()), block(AtxHeading::with_priority(1))],
            Box::new(Paragraph::default()),
        )
        .err()
        .unwrap();
        assert!(matches!(err, ConfigError::DuplicateType { kind: "heading", .. }));
    }

    #[test]
    fn duplicate_priority_is_rejected() {
        let err = BlockRegistry::new(
            vec![
                block(AtxHeading::with_priority(5)),
                block(ThematicBreak::with_priority(5)),
            ],
            Box::new(Paragraph::default()),
        )
        .err()
        .unwrap();
        assert_eq!(
            err,
            ConfigError::DuplicatePriority {
                priority: 5,
                first: "atx-heading",
                second: "thematic-break",
            }
        );
    }

    #[test]
    fn disjoint_phases_may_share_priority() {
        let registry = BlockRegistry::new(
            vec![
                Registered {
                    tokenizer: Box::new(AtxHeading::with_priority(5)),
                    phases: Phases::MATCH,
                },
                Registered {
                    tokenizer: Box::new(ThematicBreak::with_priority(5)),
                    phases: Phases::PARSE,
                },
            ],
            Box::new(Paragraph::default()),
        );
        assert!(registry.is_ok());
    }

    #[test]
    fn fallback_type_cannot_be_reused() {
        let err = InlineRegistry::new(
            vec![Registered {
                tokenizer: Box::new(Emphasis::default()),
                phases: Phases::all(),
            }],
            Box::new(Text::with_kind("emphasis")),
        )
        .err()
        .unwrap();
        assert!(matches!(err, ConfigError::DuplicateType { kind: "emphasis", .. }));
    }

    #[test]
    fn lookup_finds_fallback() {
        let registry = BlockRegistry::new(vec![], Box::new(Paragraph::default())).unwrap();
        let (tokenizer, phases) = registry.lookup("paragraph").unwrap();
        assert_eq!(tokenizer.name(), "paragraph");
        assert_eq!(phases, Phases::all());
        assert!(registry.lookup("heading").is_none());
    }
}
