//! Debian version parsing and total ordering.
//!
//! A version string has the form `[epoch:]upstream[-revision]`. Ordering
//! compares epochs numerically, then upstream, then revision, each with
//! the dpkg collation: the operands are walked as alternating non-digit
//! and digit runs, digit runs compare numerically, and within non-digit
//! runs `~` sorts before the end of the string and before every other
//! character, while letters sort before the remaining punctuation.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::core::error::{Result, RunepkgError};

#[derive(Debug, Clone)]
pub struct Version {
    epoch: u32,
    upstream: String,
    revision: Option<String>,
}

// Equality follows the collation, not the spelling: `1.09` and `1.9`
// are the same version.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Version {
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }
}

impl FromStr for Version {
    type Err = RunepkgError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RunepkgError::Parse("empty version string".into()));
        }

        let (epoch, rest) = match s.split_once(':') {
            Some((epoch, rest)) => {
                let epoch = epoch.parse::<u32>().map_err(|_| {
                    RunepkgError::Parse(format!("non-numeric epoch in version {s}"))
                })?;
                (epoch, rest)
            }
            None => (0, s),
        };

        if rest.is_empty() {
            return Err(RunepkgError::Parse(format!("empty upstream in version {s}")));
        }

        // The last hyphen separates the Debian revision; earlier hyphens
        // belong to the upstream version.
        let (upstream, revision) = match rest.rsplit_once('-') {
            Some((upstream, revision)) if !upstream.is_empty() => {
                (upstream.to_string(), Some(revision.to_string()))
            }
            _ => (rest.to_string(), None),
        };

        Ok(Self {
            epoch,
            upstream,
            revision,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}:", self.epoch)?;
        }
        f.write_str(&self.upstream)?;
        if let Some(rev) = &self.revision {
            write!(f, "-{rev}")?;
        }
        Ok(())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.epoch.cmp(&other.epoch) {
            Ordering::Equal => {}
            v => return v,
        }

        match collate(&self.upstream, &other.upstream) {
            Ordering::Equal => {}
            v => return v,
        }

        collate(
            self.revision.as_deref().unwrap_or("0"),
            other.revision.as_deref().unwrap_or("0"),
        )
    }
}

/// Rank of a single byte within a non-digit run.
///
/// `~` ranks below the end of the string (0), letters keep their code
/// point, and everything else is pushed above the letters.
fn char_rank(c: Option<u8>) -> i32 {
    match c {
        None => 0,
        Some(b'~') => -1,
        Some(c) if c.is_ascii_alphabetic() => i32::from(c),
        Some(c) => i32::from(c) + 256,
    }
}

/// The dpkg collation over one upstream or revision fragment.
pub fn collate(left: &str, right: &str) -> Ordering {
    let a = left.as_bytes();
    let b = right.as_bytes();
    let (mut i, mut j) = (0usize, 0usize);

    while i < a.len() || j < b.len() {
        // Non-digit run, character by character.
        while (i < a.len() && !a[i].is_ascii_digit()) || (j < b.len() && !b[j].is_ascii_digit()) {
            let ra = char_rank(a.get(i).filter(|c| !c.is_ascii_digit()).copied());
            let rb = char_rank(b.get(j).filter(|c| !c.is_ascii_digit()).copied());
            match ra.cmp(&rb) {
                Ordering::Equal => {}
                v => return v,
            }
            if ra == 0 && rb == 0 {
                // Both sides are at a digit or at the end; the non-digit
                // run is exhausted.
                break;
            }
            if i < a.len() && !a[i].is_ascii_digit() {
                i += 1;
            }
            if j < b.len() && !b[j].is_ascii_digit() {
                j += 1;
            }
        }

        // Digit run, numerically: skip leading zeros, then the longer
        // remaining run wins, then the first differing digit.
        while i < a.len() && a[i] == b'0' {
            i += 1;
        }
        while j < b.len() && b[j] == b'0' {
            j += 1;
        }

        let mut first_diff = Ordering::Equal;
        while i < a.len() && j < b.len() && a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            if first_diff == Ordering::Equal {
                first_diff = a[i].cmp(&b[j]);
            }
            i += 1;
            j += 1;
        }
        if i < a.len() && a[i].is_ascii_digit() {
            return Ordering::Greater;
        }
        if j < b.len() && b[j].is_ascii_digit() {
            return Ordering::Less;
        }
        if first_diff != Ordering::Equal {
            return first_diff;
        }
    }

    Ordering::Equal
}

/// Comparison operator of a version constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ConstraintOp {
    /// Recognize a constraint operator, accepting both the dpkg and the
    /// shell-style spellings.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "=" | "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            "<" | "<<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" | ">>" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            _ => None,
        }
    }

    /// Evaluate this operator for `installed op wanted`.
    pub fn evaluate(self, installed: &Version, wanted: &Version) -> bool {
        let cmp = installed.cmp(wanted);
        match self {
            Self::Eq => cmp == Ordering::Equal,
            Self::Ne => cmp != Ordering::Equal,
            Self::Lt => cmp == Ordering::Less,
            Self::Le => cmp != Ordering::Greater,
            Self::Gt => cmp == Ordering::Greater,
            Self::Ge => cmp != Ordering::Less,
        }
    }
}
