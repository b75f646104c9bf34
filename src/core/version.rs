// Logrep - core/version.rs
//
// Version tracking for contextual matches:
//   - `VersionDetector` recognises version-announcement lines.
//   - `VersionGate` holds the most recently announced version and checks it
//     against the configured `VersionConstraint`.
//
// Core layer: pure logic, no I/O.

use crate::util::constants;
use crate::util::error::{ConfigError, ParseError};
use semver::{Comparator, Op, Version, VersionReq};
use std::fmt;

// =============================================================================
// Detector
// =============================================================================

/// Recognises lines such as
/// `I (312) cpu_start: App version: v1.2.4\x1b[0m`.
#[derive(Debug, Clone)]
pub struct VersionDetector {
    marker: String,
}

impl Default for VersionDetector {
    fn default() -> Self {
        Self::new(constants::DEFAULT_VERSION_MARKER)
    }
}

impl VersionDetector {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Returns `(true, token)` for an announcement line, otherwise
    /// `(false, "unknown")`.
    ///
    /// The token is the last whitespace-delimited field with one leading `v`
    /// and one ANSI reset sequence removed.
    pub fn detect(&self, raw: &str) -> (bool, String) {
        if !raw.contains(&self.marker) {
            return (false, constants::UNKNOWN_VERSION.to_string());
        }

        let last = raw.split_whitespace().last().unwrap_or("");
        let token = last.strip_prefix('v').unwrap_or(last);
        (true, token.replacen(constants::ANSI_RESET, "", 1))
    }
}

// =============================================================================
// Constraint
// =============================================================================

/// A parsed version-range expression: comma-separated clauses that must all
/// hold, e.g. `>=1.2.4`, `>= 1.0, < 2.0`, `~> 1.2`, `!= 1.2.4` or `1.2.4`.
///
/// Operators are `=`, `!=`, `>`, `>=`, `<`, `<=` and `~>` (pessimistic: the
/// last given component may grow, the ones before it are fixed). A bare
/// version means exact equality. Missing components are zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    expression: String,
    req: VersionReq,
    excluded: Vec<Version>,
}

impl VersionConstraint {
    pub fn parse(expression: &str) -> Result<Self, ConfigError> {
        let invalid = |source| ConfigError::InvalidConstraint {
            expression: expression.to_string(),
            source,
        };

        let mut req = VersionReq {
            comparators: Vec::new(),
        };
        let mut excluded = Vec::new();

        for clause in expression.split(',') {
            let clause = clause.trim();
            if let Some(rest) = clause.strip_prefix("!=") {
                excluded.push(normalize_version(rest).map_err(invalid)?);
            } else if let Some(rest) = clause.strip_prefix("~>") {
                req.comparators
                    .extend(pessimistic_bounds(rest).map_err(invalid)?);
            } else {
                let (op, rest) = split_operator(clause);
                let version = normalize_version(rest).map_err(invalid)?;
                req.comparators.push(comparator(op, &version));
            }
        }

        Ok(Self {
            expression: expression.to_string(),
            req,
            excluded,
        })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.req.matches(version) && !self.excluded.iter().any(|x| same_precedence(x, version))
    }

    pub fn as_str(&self) -> &str {
        &self.expression
    }
}

impl Default for VersionConstraint {
    fn default() -> Self {
        Self {
            expression: constants::DEFAULT_VERSION_CONSTRAINT.to_string(),
            req: VersionReq {
                comparators: vec![comparator(Op::GreaterEq, &Version::new(0, 0, 0))],
            },
            excluded: Vec::new(),
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Longest operators first so `>=` is not read as `>`.
fn split_operator(clause: &str) -> (Op, &str) {
    const OPERATORS: [(&str, Op); 5] = [
        (">=", Op::GreaterEq),
        ("<=", Op::LessEq),
        (">", Op::Greater),
        ("<", Op::Less),
        ("=", Op::Exact),
    ];
    OPERATORS
        .iter()
        .find_map(|(text, op)| clause.strip_prefix(text).map(|rest| (*op, rest)))
        .unwrap_or((Op::Exact, clause))
}

/// `~> 1.2` is `>=1.2.0, <2.0.0`; `~> 1.2.3` is `>=1.2.3, <1.3.0`;
/// `~> 1` is `>=1.0.0`.
fn pessimistic_bounds(raw: &str) -> Result<Vec<Comparator>, semver::Error> {
    let lower = normalize_version(raw)?;
    let upper = match numeric_components(raw) {
        0 | 1 => None,
        2 => Some(Version::new(lower.major + 1, 0, 0)),
        3 => Some(Version::new(lower.major, lower.minor + 1, 0)),
        _ => Some(Version::new(lower.major, lower.minor, lower.patch + 1)),
    };

    let mut bounds = vec![comparator(Op::GreaterEq, &lower)];
    if let Some(upper) = upper {
        bounds.push(comparator(Op::Less, &upper));
    }
    Ok(bounds)
}

fn comparator(op: Op, version: &Version) -> Comparator {
    Comparator {
        op,
        major: version.major,
        minor: Some(version.minor),
        patch: Some(version.patch),
        pre: version.pre.clone(),
    }
}

/// Equality ignoring build metadata.
fn same_precedence(a: &Version, b: &Version) -> bool {
    a.major == b.major && a.minor == b.minor && a.patch == b.patch && a.pre == b.pre
}

// =============================================================================
// Version tokens
// =============================================================================

/// Parse a version token leniently.
///
/// Accepted beyond strict semver: a leading `v`, fewer than three numeric
/// components (padded with zero), leading zeros (`01.2.3`), and more than
/// three numeric components. Components past the third are kept as build
/// metadata (`1.2.3.4` becomes `1.2.3+4`), so they do not take part in
/// constraint matching.
pub fn parse_version(raw: &str) -> Result<Version, ParseError> {
    normalize_version(raw).map_err(|source| ParseError::InvalidVersion {
        raw_version: raw.trim().to_string(),
        source,
    })
}

fn normalize_version(raw: &str) -> Result<Version, semver::Error> {
    let raw = raw.trim();
    let strict_err = match Version::parse(raw) {
        Ok(version) => return Ok(version),
        Err(e) => e,
    };

    let unprefixed = raw.strip_prefix('v').unwrap_or(raw);
    let core_len = unprefixed.find(['-', '+']).unwrap_or(unprefixed.len());
    let (core, rest) = unprefixed.split_at(core_len);
    let (pre, build) = match rest.find('+') {
        Some(idx) => (&rest[..idx], Some(&rest[idx + 1..])),
        None => (rest, None),
    };

    let numbers: Option<Vec<u64>> = core
        .split('.')
        .map(|part| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            part.parse().ok()
        })
        .collect();
    let Some(mut numbers) = numbers else {
        return Err(strict_err);
    };

    let extra: Vec<String> = numbers.iter().skip(3).map(u64::to_string).collect();
    numbers.resize(3, 0);

    let mut normalized = format!("{}.{}.{}{pre}", numbers[0], numbers[1], numbers[2]);
    let build_parts: Vec<&str> = extra
        .iter()
        .map(String::as_str)
        .chain(build)
        .collect();
    if !build_parts.is_empty() {
        normalized.push('+');
        normalized.push_str(&build_parts.join("."));
    }

    Version::parse(&normalized).map_err(|_| strict_err)
}

/// Number of dot-separated components before any prerelease or build suffix.
fn numeric_components(raw: &str) -> usize {
    let raw = raw.trim();
    let raw = raw.strip_prefix('v').unwrap_or(raw);
    let core_len = raw.find(['-', '+']).unwrap_or(raw.len());
    raw[..core_len].split('.').count()
}

// =============================================================================
// Gate
// =============================================================================

/// Holds the version currently in effect.
///
/// Replaced wholesale on every valid announcement. With no version known the
/// gate admits everything, so logs written before the first marker (or logs
/// that never carry one) are still searched.
#[derive(Debug, Clone, Default)]
pub struct VersionGate {
    current: Option<Version>,
}

impl VersionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known version.
    pub fn with_version(version: Version) -> Self {
        Self {
            current: Some(version),
        }
    }

    pub fn current(&self) -> Option<&Version> {
        self.current.as_ref()
    }

    /// Replace the held version with `raw` if it parses. A malformed token
    /// leaves the previous version in place.
    pub fn update(&mut self, raw: &str) -> Result<&Version, ParseError> {
        let version = parse_version(raw)?;
        Ok(&*self.current.insert(version))
    }

    pub fn admits(&self, constraint: &VersionConstraint) -> bool {
        match &self.current {
            None => true,
            Some(version) => constraint.matches(version),
        }
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_detect_strips_prefix_and_ansi_reset() {
        let line = "I (312) cpu_start: App version: v1.2.4\x1b[0m";
        assert_eq!(
            VersionDetector::default().detect(line),
            (true, "1.2.4".to_string())
        );
    }

    #[test]
    fn test_detect_without_marker() {
        assert_eq!(
            VersionDetector::default().detect("2020-08-20 10:00:00,000 : boot"),
            (false, "unknown".to_string())
        );
    }

    #[test]
    fn test_detect_token_without_v_prefix() {
        let (hit, token) = VersionDetector::default().detect("cpu_start: App version: 2.0.0");
        assert!(hit);
        assert_eq!(token, "2.0.0");
    }

    #[test]
    fn test_detect_custom_marker() {
        let detector = VersionDetector::new("firmware rev");
        let (hit, token) = detector.detect("boot: firmware rev v3.1.0");
        assert!(hit);
        assert_eq!(token, "3.1.0");
    }

    #[test]
    fn test_parse_version_pads_short_forms() {
        assert_eq!(parse_version("1.2").unwrap(), v("1.2.0"));
        assert_eq!(parse_version("2").unwrap(), v("2.0.0"));
        assert_eq!(parse_version("1.2-rc1").unwrap(), v("1.2.0-rc1"));
    }

    #[test]
    fn test_parse_version_rejects_garbage() {
        assert!(matches!(
            parse_version("unknown"),
            Err(ParseError::InvalidVersion { .. })
        ));
        assert!(parse_version("").is_err());
        assert!(parse_version("1..2").is_err());
    }

    #[test]
    fn test_gate_without_version_admits_everything() {
        let gate = VersionGate::new();
        for expr in [">=1.2.4", "<0.0.1", "=9.9.9", ">=0"] {
            let c = VersionConstraint::parse(expr).unwrap();
            assert!(gate.admits(&c), "empty gate should admit {expr}");
        }
    }

    #[test]
    fn test_gate_checks_known_version() {
        let mut gate = VersionGate::new();
        let c = VersionConstraint::parse(">=2.0.0").unwrap();
        gate.update("2.0.0").unwrap();
        assert!(gate.admits(&c));
        gate.update("1.0.0").unwrap();
        assert!(!gate.admits(&c));
    }

    #[test]
    fn test_malformed_update_keeps_previous_version() {
        let mut gate = VersionGate::with_version(v("1.2.4"));
        assert!(gate.update("not-a-version").is_err());
        assert_eq!(gate.current(), Some(&v("1.2.4")));
    }

    #[test]
    fn test_reset_clears_version() {
        let mut gate = VersionGate::with_version(v("1.0.0"));
        gate.reset();
        assert_eq!(gate.current(), None);
    }

    #[test]
    fn test_constraint_rejects_invalid_expression() {
        assert!(matches!(
            VersionConstraint::parse("newest please"),
            Err(ConfigError::InvalidConstraint { .. })
        ));
    }

    #[test]
    fn test_default_constraint_admits_release_versions() {
        let c = VersionConstraint::default();
        assert!(c.matches(&v("0.0.1")));
        assert!(c.matches(&v("10.4.2")));
        assert_eq!(c.as_str(), ">=0");
    }

    #[test]
    fn test_parsed_zero_constraint_admits_release_versions() {
        let c = VersionConstraint::parse(">=0").unwrap();
        assert!(c.matches(&v("0.0.0")));
        assert!(c.matches(&v("1.2.4")));
    }

    #[test]
    fn test_bare_version_is_exact() {
        let c = VersionConstraint::parse("1.2.4").unwrap();
        assert!(c.matches(&v("1.2.4")));
        assert!(!c.matches(&v("1.9.0")));
        assert!(!c.matches(&v("1.2.5")));
    }

    #[test]
    fn test_exact_partial_version_is_zero_padded() {
        let c = VersionConstraint::parse("= 1.2").unwrap();
        assert!(c.matches(&v("1.2.0")));
        assert!(!c.matches(&v("1.2.7")));
    }

    #[test]
    fn test_pessimistic_constraint() {
        let minor = VersionConstraint::parse("~> 1.2").unwrap();
        assert!(minor.matches(&v("1.2.0")));
        assert!(minor.matches(&v("1.9.3")));
        assert!(!minor.matches(&v("2.0.0")));
        assert!(!minor.matches(&v("1.1.9")));

        let patch = VersionConstraint::parse("~>1.2.3").unwrap();
        assert!(patch.matches(&v("1.2.9")));
        assert!(!patch.matches(&v("1.3.0")));
        assert!(!patch.matches(&v("1.2.2")));

        let major = VersionConstraint::parse("~> 1").unwrap();
        assert!(major.matches(&v("7.0.0")));
        assert!(!major.matches(&v("0.9.0")));
    }

    #[test]
    fn test_not_equal_constraint() {
        let c = VersionConstraint::parse("!= 1.2.4").unwrap();
        assert!(!c.matches(&v("1.2.4")));
        assert!(c.matches(&v("1.2.5")));

        let range = VersionConstraint::parse(">= 1.0, != 1.2.4, < 2.0").unwrap();
        assert!(range.matches(&v("1.2.3")));
        assert!(!range.matches(&v("1.2.4")));
        assert!(!range.matches(&v("2.0.0")));
    }

    #[test]
    fn test_constraint_versions_accept_prefix_and_leading_zeros() {
        let c = VersionConstraint::parse(">=v01.02").unwrap();
        assert!(c.matches(&v("1.2.0")));
        assert!(!c.matches(&v("1.1.9")));
    }

    #[test]
    fn test_parse_version_accepts_leading_zeros() {
        assert_eq!(parse_version("01.2.3").unwrap(), v("1.2.3"));
        assert_eq!(parse_version("1.02.003").unwrap(), v("1.2.3"));
    }

    #[test]
    fn test_parse_version_keeps_fourth_component_as_build() {
        let four = parse_version("1.2.3.4").unwrap();
        assert_eq!((four.major, four.minor, four.patch), (1, 2, 3));
        assert_eq!(four.build.as_str(), "4");
        assert!(VersionConstraint::parse(">=1.2.3").unwrap().matches(&four));

        let with_pre = parse_version("1.2.3.4-beta+git").unwrap();
        assert_eq!(with_pre.pre.as_str(), "beta");
        assert_eq!(with_pre.build.as_str(), "4.git");
    }

    #[test]
    fn test_gate_update_accepts_four_part_token() {
        let mut gate = VersionGate::with_version(v("1.0.0"));
        gate.update("2.1.0.17").unwrap();
        assert_eq!(gate.current().map(|x| (x.major, x.minor)), Some((2, 1)));
    }

    #[test]
    fn test_empty_clause_is_rejected() {
        assert!(VersionConstraint::parse("").is_err());
        assert!(VersionConstraint::parse(">=1.0,").is_err());
        assert!(VersionConstraint::parse("~>").is_err());
    }

    #[test]
    fn test_compound_constraint() {
        let c = VersionConstraint::parse(">=1.0, <2.0").unwrap();
        assert!(c.matches(&v("1.5.0")));
        assert!(!c.matches(&v("2.0.0")));
    }
}
