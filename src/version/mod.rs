// src/version/mod.rs

//! Package versions and requirement matching
//!
//! Versions use the `[epoch:]version[-release]` layout. Requirements are the
//! constraint side of a dependency request, e.g. `>= 1.0, < 2.0` or `~> 1.4`.

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;

/// A parsed package version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub epoch: u64,
    pub version: String,
    pub release: Option<String>,
}

impl Version {
    /// Parse a version string
    ///
    /// Format: [epoch:]version[-release]
    /// - "1.2.3" -> epoch=0, version="1.2.3", release=None
    /// - "2:1.2.3-4" -> epoch=2, version="1.2.3", release=Some("4")
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (epoch, rest) = match s.split_once(':') {
            Some(("", rest)) => (0, rest),
            Some((e, rest)) => {
                let epoch = e.parse::<u64>().map_err(|err| {
                    Error::ParseError(format!("Invalid epoch in version '{s}': {err}"))
                })?;
                (epoch, rest)
            }
            None => (0, s),
        };

        let (version, release) = match rest.split_once('-') {
            Some((v, r)) => (v.to_string(), Some(r.to_string())),
            None => (rest.to_string(), None),
        };

        if version.is_empty() {
            return Err(Error::ParseError(format!(
                "Empty version component in '{s}'"
            )));
        }

        Ok(Self {
            epoch,
            version,
            release,
        })
    }

    /// Numeric segments of the version component; non-numeric segments count as 0
    pub fn segments(&self) -> Vec<u64> {
        self.version
            .split('.')
            .map(|part| part.parse::<u64>().unwrap_or(0))
            .collect()
    }

    /// Normalize to a semver::Version for ordering
    fn to_semver(&self) -> semver::Version {
        if let Ok(v) = semver::Version::parse(&self.version) {
            return v;
        }

        let segments = self.segments();
        let at = |i: usize| segments.get(i).copied().unwrap_or(0);
        semver::Version::new(at(0), at(1), at(2))
    }

    /// Upper bound for a pessimistic (`~>`) requirement
    ///
    /// Drops the last segment and increments the one before it:
    /// `1.4.2` -> `1.5`, `1.4` -> `2`, `3` -> `4`. Returns `None` when the
    /// segment to increment is already `u64::MAX`, i.e. there is no upper bound.
    fn bump(&self) -> Option<Version> {
        let mut segments = self.segments();
        if segments.len() > 1 {
            segments.pop();
        }
        if let Some(last) = segments.last_mut() {
            *last = last.checked_add(1)?;
        }

        let version = segments
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");

        Some(Version {
            epoch: self.epoch,
            version,
            release: None,
        })
    }

    /// Segment-wise numeric comparison, padding the shorter side with zeros
    fn cmp_segments(&self, other: &Self) -> Ordering {
        let ours = self.segments();
        let theirs = other.segments();
        let len = ours.len().max(theirs.len());
        (0..len)
            .map(|i| {
                let a = ours.get(i).copied().unwrap_or(0);
                let b = theirs.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}:", self.epoch)?;
        }
        write!(f, "{}", self.version)?;
        if let Some(ref release) = self.release {
            write!(f, "-{}", release)?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.to_semver().cmp(&other.to_semver()))
            .then_with(|| self.cmp_segments(other))
            // "1.2" and "1.2.0" normalize alike but are distinct values
            .then_with(|| self.version.cmp(&other.version))
            .then_with(|| self.release.cmp(&other.release))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Version requirement attached to a dependency
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// Any version is acceptable
    Any,
    Exact(Version),
    NotEqual(Version),
    GreaterThan(Version),
    GreaterOrEqual(Version),
    LessThan(Version),
    LessOrEqual(Version),
    /// `~> v`: at least `v`, below the next significant release
    Pessimistic(Version),
    /// Every listed requirement must hold
    All(Vec<Requirement>),
}

impl Requirement {
    /// Parse a requirement string
    ///
    /// Examples: `"*"`, `"1.2.3"`, `">= 1.0, < 2.0"`, `"~> 1.4"`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "*" {
            return Ok(Requirement::Any);
        }

        if s.contains(',') {
            let parts = s
                .split(',')
                .map(Self::parse)
                .collect::<Result<Vec<_>>>()?;
            return Ok(Requirement::All(parts));
        }

        let (op, rest) = [">=", "<=", "!=", "~>", ">", "<", "="]
            .iter()
            .find_map(|op| s.strip_prefix(op).map(|rest| (*op, rest)))
            .unwrap_or(("=", s));

        let version = Version::parse(rest)?;
        Ok(match op {
            ">=" => Requirement::GreaterOrEqual(version),
            "<=" => Requirement::LessOrEqual(version),
            "!=" => Requirement::NotEqual(version),
            "~>" => Requirement::Pessimistic(version),
            ">" => Requirement::GreaterThan(version),
            "<" => Requirement::LessThan(version),
            _ => Requirement::Exact(version),
        })
    }

    /// Check if a version satisfies this requirement
    pub fn satisfied_by(&self, version: &Version) -> bool {
        match self {
            Requirement::Any => true,
            Requirement::Exact(v) => version == v,
            Requirement::NotEqual(v) => version != v,
            Requirement::GreaterThan(v) => version > v,
            Requirement::GreaterOrEqual(v) => version >= v,
            Requirement::LessThan(v) => version < v,
            Requirement::LessOrEqual(v) => version <= v,
            Requirement::Pessimistic(v) => {
                version >= v && v.bump().is_none_or(|upper| *version < upper)
            }
            Requirement::All(parts) => parts.iter().all(|r| r.satisfied_by(version)),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Any => write!(f, ">= 0"),
            Requirement::Exact(v) => write!(f, "= {}", v),
            Requirement::NotEqual(v) => write!(f, "!= {}", v),
            Requirement::GreaterThan(v) => write!(f, "> {}", v),
            Requirement::GreaterOrEqual(v) => write!(f, ">= {}", v),
            Requirement::LessThan(v) => write!(f, "< {}", v),
            Requirement::LessOrEqual(v) => write!(f, "<= {}", v),
            Requirement::Pessimistic(v) => write!(f, "~> {}", v),
            Requirement::All(parts) => {
                let rendered: Vec<String> = parts.iter().map(ToString::to_string).collect();
                write!(f, "{}", rendered.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_version_parse_full() {
        let version = v("1:2.3.4-5");
        assert_eq!(version.epoch, 1);
        assert_eq!(version.version, "2.3.4");
        assert_eq!(version.release, Some("5".to_string()));
    }

    #[test]
    fn test_version_parse_empty_epoch() {
        let version = v(":1.02.208");
        assert_eq!(version.epoch, 0);
        assert_eq!(version.version, "1.02.208");
    }

    #[test]
    fn test_version_parse_rejects_empty() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("x:1.0").is_err());
    }

    #[test]
    fn test_version_ordering() {
        assert!(v("1:1.0.0") > v("2.0.0"));
        assert!(v("1.2.3") < v("1.2.10"));
        assert!(v("1.2.3-1") < v("1.2.3-2"));
        assert_ne!(v("1.2").cmp(&v("1.2.0")), Ordering::Equal);
    }

    #[test]
    fn test_version_ordering_beyond_three_segments() {
        assert_eq!(v("1.2.3.10").cmp(&v("1.2.3.9")), Ordering::Greater);
        assert!(v("1.2.3.1") > v("1.2.3"));
        assert!(v("2.0.0.0.1") > v("2.0.0.0"));

        assert!(Requirement::parse(">= 1.2.3.9").unwrap().satisfied_by(&v("1.2.3.10")));
        let req = Requirement::parse("~> 1.2.3.4").unwrap();
        assert!(req.satisfied_by(&v("1.2.3.10")));
        assert!(!req.satisfied_by(&v("1.2.4")));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(v("1.2.3").to_string(), "1.2.3");
        assert_eq!(v("2:1.2.3-4").to_string(), "2:1.2.3-4");
    }

    #[test]
    fn test_requirement_range() {
        let req = Requirement::parse(">= 1.0.0, < 2.0.0").unwrap();
        assert!(req.satisfied_by(&v("1.5.0")));
        assert!(!req.satisfied_by(&v("2.0.0")));
        assert!(!req.satisfied_by(&v("0.9.0")));
        assert_eq!(req.to_string(), ">= 1.0.0, < 2.0.0");
    }

    #[test]
    fn test_requirement_bare_version_is_exact() {
        let req = Requirement::parse("1.2.0").unwrap();
        assert_eq!(req, Requirement::Exact(v("1.2.0")));
        assert!(!req.satisfied_by(&v("1.2.1")));
    }

    #[test]
    fn test_requirement_pessimistic() {
        let req = Requirement::parse("~> 1.4.2").unwrap();
        assert!(req.satisfied_by(&v("1.4.2")));
        assert!(req.satisfied_by(&v("1.4.9")));
        assert!(!req.satisfied_by(&v("1.5.0")));

        let req = Requirement::parse("~> 1.4").unwrap();
        assert!(req.satisfied_by(&v("1.9.0")));
        assert!(!req.satisfied_by(&v("2.0.0")));
    }

    #[test]
    fn test_requirement_pessimistic_at_segment_limit() {
        let req = Requirement::parse("~> 18446744073709551615").unwrap();
        assert!(req.satisfied_by(&v("18446744073709551615")));
        assert!(!req.satisfied_by(&v("1.0")));

        let req = Requirement::parse("~> 18446744073709551615.3").unwrap();
        assert!(req.satisfied_by(&v("18446744073709551615.9")));
    }

    #[test]
    fn test_requirement_any() {
        let req = Requirement::parse("*").unwrap();
        assert!(req.satisfied_by(&v("99.99.99")));
        assert_eq!(req.to_string(), ">= 0");
    }
}
