//! Version ordering and bumping
//!
//! Ordering is *descending recency*: `compare(a, b)` is `Less` when `a` is
//! the newer version, so sorting with it puts the latest release first.

use std::cmp::Ordering;
use std::sync::LazyLock;

use changelint_core::{clean_version, ReleaseType};
use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version, VersionReq};

/// Bare numeric release candidate suffix, e.g. `-rc9`
static RC_SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-rc(?P<n>\d+)$").expect("Invalid regex"));

/// Compare two version strings, latest first
///
/// Invalid versions sort after valid ones; two invalid versions compare
/// as plain strings.
pub fn compare(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    match (sortable(a), sortable(b)) {
        (Some(a), Some(b)) => precedence(&b, &a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Whether the keys are already in latest-first order
pub fn is_sorted<'a>(versions: impl IntoIterator<Item = &'a str>) -> bool {
    let versions: Vec<&str> = versions.into_iter().collect();
    versions
        .windows(2)
        .all(|pair| compare(pair[0], pair[1]) != Ordering::Greater)
}

/// Whether `version` is exactly a normalized semantic version
///
/// `v1.0.0` and `=1.0.0` parse, but are not accepted here.
pub fn is_valid(version: &str) -> bool {
    clean_version(version).as_deref() == Some(version)
}

/// Whether `a` is strictly newer than `b`; false if either is invalid
pub fn gt(a: &str, b: &str) -> bool {
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => precedence(&a, &b) == Ordering::Greater,
        _ => false,
    }
}

/// Next version after `from` for a bump keyword
///
/// Follows npm's increment rules: a pre-release is finished by the matching
/// plain bump (`1.1.0-0` minor → `1.1.0`), and the `pre*` keywords start a
/// new pre-release numbered `0`.
pub fn bump(from: &str, release: ReleaseType) -> Option<String> {
    let mut version = parse(from)?;
    version.build = BuildMetadata::EMPTY;

    match release {
        ReleaseType::Major => {
            if version.minor != 0 || version.patch != 0 || version.pre.is_empty() {
                version.major += 1;
            }
            version.minor = 0;
            version.patch = 0;
            version.pre = Prerelease::EMPTY;
        }
        ReleaseType::Minor => {
            if version.patch != 0 || version.pre.is_empty() {
                version.minor += 1;
            }
            version.patch = 0;
            version.pre = Prerelease::EMPTY;
        }
        ReleaseType::Patch => {
            if version.pre.is_empty() {
                version.patch += 1;
            }
            version.pre = Prerelease::EMPTY;
        }
        ReleaseType::Premajor => {
            version.major += 1;
            version.minor = 0;
            version.patch = 0;
            version.pre = first_prerelease();
        }
        ReleaseType::Preminor => {
            version.minor += 1;
            version.patch = 0;
            version.pre = first_prerelease();
        }
        ReleaseType::Prepatch => {
            version.patch += 1;
            version.pre = first_prerelease();
        }
        ReleaseType::Prerelease => {
            if version.pre.is_empty() {
                version.patch += 1;
                version.pre = first_prerelease();
            } else {
                version.pre = next_prerelease(&version.pre)?;
            }
        }
    }

    Some(version.to_string())
}

/// Whether a version satisfies a range such as `>=1.0.0` or `^2`
pub fn satisfies(version: &str, range: &VersionReq) -> bool {
    parse(version).is_some_and(|v| range.matches(&v))
}

/// Parse a range, rejecting plain versions
///
/// `semver` reads a bare `1.2.3` as `^1.2.3`; such targets are literal
/// versions, not ranges.
pub fn parse_range(range: &str) -> Option<VersionReq> {
    if clean_version(range).is_some() {
        return None;
    }
    VersionReq::parse(range).ok()
}

fn parse(version: &str) -> Option<Version> {
    clean_version(version).and_then(|v| Version::parse(&v).ok())
}

fn sortable(version: &str) -> Option<Version> {
    let cleaned = clean_version(version)?;
    let dotted = RC_SUFFIX_REGEX.replace(&cleaned, "-rc.$n");
    Version::parse(&dotted).ok()
}

/// Semantic version precedence, ignoring build metadata
fn precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch)
        .cmp(&(b.major, b.minor, b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

fn first_prerelease() -> Prerelease {
    Prerelease::new("0").unwrap_or(Prerelease::EMPTY)
}

/// Increment the last numeric identifier, or append `.0` when none is numeric
fn next_prerelease(pre: &Prerelease) -> Option<Prerelease> {
    let mut identifiers: Vec<String> = pre.as_str().split('.').map(String::from).collect();

    let numeric = identifiers
        .iter_mut()
        .rev()
        .find_map(|id| id.parse::<u64>().ok().map(|n| (id, n)));

    match numeric {
        Some((id, n)) => *id = (n + 1).to_string(),
        None => identifiers.push("0".to_string()),
    }

    Prerelease::new(&identifiers.join(".")).ok()
}
