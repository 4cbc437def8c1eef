//! SemVer version and constraint arithmetic (spec §4.1).
//!
//! Constraints are kept as the exact strings an item declared (spec §9, "dynamic
//! records") and parsed lazily here rather than up front, since they are also passed
//! back through to [`crate::catalog::Catalog::list_matching_versions`] verbatim.

use semver::{Version, VersionReq};

use crate::error::{ResolveError, ResolveResult};

/// Returns `true` if `v` parses as a valid semver version.
pub fn is_valid(v: &str) -> bool {
    Version::parse(v).is_ok()
}

/// Parse a version string, returning a structured error on failure.
pub fn parse(v: &str) -> ResolveResult<Version> {
    Version::parse(v).map_err(|_| ResolveError::InvalidVersion(v.to_string()))
}

/// Parse a constraint expression, returning a structured error on failure.
pub fn parse_constraint(c: &str) -> ResolveResult<VersionReq> {
    VersionReq::parse(c).map_err(|_| ResolveError::InvalidConstraint(c.to_string()))
}

/// Tolerant parser used for the loader's declared game-version field, which may be a
/// bare integer (e.g. `"109000"`) rather than a full semver string. Produces a
/// canonical valid version when possible.
///
/// A bare integer `N` coerces to `N.0.0`. A `MAJOR.MINOR` pair coerces to
/// `MAJOR.MINOR.0`. A string that already parses as semver is returned unchanged.
pub fn coerce(s: &str) -> Option<Version> {
    let s = s.trim();

    if let Ok(v) = Version::parse(s) {
        return Some(v);
    }

    let parts: Vec<&str> = s.split('.').collect();
    let candidate = match parts.as_slice() {
        [major] => format!("{major}.0.0"),
        [major, minor] => format!("{major}.{minor}.0"),
        _ => return None,
    };

    Version::parse(&candidate).ok()
}

/// Build a `">=<coerced>"` constraint string from a possibly-bare version field, as
/// used to synthesize the loader's and a mod's `SatisfactoryGame`/`SML` dependency.
pub fn coerce_to_minimum_constraint(s: &str) -> ResolveResult<String> {
    let version = coerce(s).ok_or_else(|| ResolveError::InvalidVersion(s.to_string()))?;
    Ok(format!(">={version}"))
}

/// Does `v` satisfy the single constraint `c`?
pub fn satisfies(v: &Version, c: &str) -> ResolveResult<bool> {
    let req = parse_constraint(c)?;
    Ok(req.matches(v))
}

/// Does `v` satisfy every constraint in `constraints`?
pub fn satisfies_all<S: AsRef<str>>(v: &Version, constraints: &[S]) -> ResolveResult<bool> {
    for c in constraints {
        if !satisfies(v, c.as_ref())? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// SemVer precedence comparison: `-1`, `0`, or `1`.
pub fn compare(a: &Version, b: &Version) -> std::cmp::Ordering {
    a.cmp(b)
}
