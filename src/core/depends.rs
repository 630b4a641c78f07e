//! `Depends:` header parsing and constraint evaluation.
//!
//! A depends line is a comma-separated list of atoms, each a package
//! name with an optional `(op version)` constraint. Alternative groups
//! (`a | b`) and architecture-qualified atoms (`foo [amd64]`) are kept
//! as opaque text and only satisfiable by a whole-string name match;
//! resolving them properly needs a dedicated pass.

use std::fmt;

use crate::core::error::{Result, RunepkgError};
use crate::core::version::{ConstraintOp, Version};

/// One parsed element of a `Depends:` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepAtom {
    /// Package name, or the raw text of an opaque alternative group.
    pub package: String,
    pub constraint: Option<DepConstraint>,
}

/// A version constraint, kept textual so unknown operators can be
/// warned about instead of failing the whole stanza.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepConstraint {
    pub op: String,
    pub version: String,
}

impl DepAtom {
    /// Whether `installed` (the version present under this atom's name)
    /// satisfies the constraint. Atoms without a constraint are
    /// satisfied by any version. Unknown operators and unparseable
    /// versions are warned about and treated as satisfied, so a
    /// malformed stanza never blocks an install.
    pub fn is_satisfied_by(&self, installed: &Version) -> bool {
        let Some(constraint) = &self.constraint else {
            return true;
        };

        let Some(op) = ConstraintOp::parse(&constraint.op) else {
            tracing::warn!(
                atom = %self,
                op = %constraint.op,
                "unknown constraint operator, treating as satisfied"
            );
            return true;
        };

        let wanted = match constraint.version.parse::<Version>() {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(atom = %self, %err, "unparseable constraint version, treating as satisfied");
                return true;
            }
        };

        op.evaluate(installed, &wanted)
    }
}

impl fmt::Display for DepAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(c) => write!(f, "{} ({} {})", self.package, c.op, c.version),
            None => f.write_str(&self.package),
        }
    }
}

/// Parse a `Depends:` value. An empty or missing value is an empty list.
pub fn parse_depends(value: &str) -> Result<Vec<DepAtom>> {
    let mut atoms = Vec::new();

    for raw in value.split(',') {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        // Alternatives and architecture qualifiers stay opaque.
        if raw.contains('|') || raw.contains('[') {
            atoms.push(DepAtom {
                package: raw.to_string(),
                constraint: None,
            });
            continue;
        }

        match raw.split_once('(') {
            None => atoms.push(DepAtom {
                package: raw.to_string(),
                constraint: None,
            }),
            Some((name, rest)) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(RunepkgError::Parse(format!(
                        "depends atom {raw} has a constraint but no package name"
                    )));
                }
                let inner = rest.trim_end().strip_suffix(')').ok_or_else(|| {
                    RunepkgError::Parse(format!("unterminated constraint in depends atom {raw}"))
                })?;
                let mut parts = inner.split_whitespace();
                let (op, version) = match (parts.next(), parts.next(), parts.next()) {
                    (Some(op), Some(version), None) => (op, version),
                    _ => {
                        return Err(RunepkgError::Parse(format!(
                            "constraint in depends atom {raw} is not `op version`"
                        )));
                    }
                };
                atoms.push(DepAtom {
                    package: name.to_string(),
                    constraint: Some(DepConstraint {
                        op: op.to_string(),
                        version: version.to_string(),
                    }),
                });
            }
        }
    }

    Ok(atoms)
}
