use serde::Serialize;

use crate::classify::ValueClass;

use super::StructureLedger;

/// Class changes redaction may cause. Identical classes are always allowed.
const ALLOWED_TRANSITIONS: &[(ValueClass, ValueClass)] = &[
    (ValueClass::LongNumericId, ValueClass::PlainText),
    (ValueClass::TokenLike, ValueClass::PlainText),
    (ValueClass::Url, ValueClass::Url),
];

pub fn transition_allowed(from: ValueClass, to: ValueClass) -> bool {
    from == to || ALLOWED_TRANSITIONS.contains(&(from, to))
}

/// A structural change that must block the fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    MissingNode {
        node_path: String,
    },
    TagMismatch {
        node_path: String,
        raw: String,
        sanitized: String,
    },
    MissingAttribute {
        node_path: String,
        attribute: String,
    },
    ClassTransition {
        node_path: String,
        attribute: String,
        from: ValueClass,
        to: ValueClass,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::MissingNode { node_path } => write!(f, "missing node: {node_path}"),
            Violation::TagMismatch {
                node_path,
                raw,
                sanitized,
            } => write!(f, "tag mismatch at {node_path}: {raw} -> {sanitized}"),
            Violation::MissingAttribute {
                node_path,
                attribute,
            } => write!(f, "missing attribute at {node_path}: {attribute}"),
            Violation::ClassTransition {
                node_path,
                attribute,
                from,
                to,
            } => write!(
                f,
                "disallowed class transition at {node_path} [{attribute}]: {from} -> {to}"
            ),
        }
    }
}

/// Informational finding; never blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    ExtraNode { node_path: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::ExtraNode { node_path } => write!(f, "sanitized-only node: {node_path}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerDiff {
    pub ok: bool,
    pub violations: Vec<Violation>,
    pub warnings: Vec<Warning>,
}

impl LedgerDiff {
    pub fn violation_messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// Compare ledgers of the same document before and after redaction, joined by node path.
pub fn diff(raw: &StructureLedger, sanitized: &StructureLedger) -> LedgerDiff {
    let mut violations = Vec::new();

    for before in &raw.nodes {
        let path = &before.node_path;
        let Some(after) = sanitized.get(path) else {
            violations.push(Violation::MissingNode {
                node_path: path.clone(),
            });
            continue;
        };

        if before.tag_name != after.tag_name {
            violations.push(Violation::TagMismatch {
                node_path: path.clone(),
                raw: before.tag_name.clone(),
                sanitized: after.tag_name.clone(),
            });
        }

        for (attribute, &from) in &before.attribute_value_class {
            match after.attribute_value_class.get(attribute) {
                None => violations.push(Violation::MissingAttribute {
                    node_path: path.clone(),
                    attribute: attribute.clone(),
                }),
                Some(&to) if !transition_allowed(from, to) => {
                    violations.push(Violation::ClassTransition {
                        node_path: path.clone(),
                        attribute: attribute.clone(),
                        from,
                        to,
                    })
                }
                Some(_) => {}
            }
        }
    }

    let warnings: Vec<Warning> = sanitized
        .nodes
        .iter()
        .filter(|node| raw.get(&node.node_path).is_none())
        .map(|node| Warning::ExtraNode {
            node_path: node.node_path.clone(),
        })
        .collect();

    LedgerDiff {
        ok: violations.is_empty(),
        violations,
        warnings,
    }
}
