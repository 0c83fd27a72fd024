//! Taxon-concept name resolution for phyloref specifiers.
//!
//! # Responsibility
//! - Define the resolver capability the store consumes when deriving
//!   phylogenies from specifiers.
//! - Provide a default resolver over Phyx taxon-concept specifiers.
//!
//! # Invariants
//! - Resolution is pure: same specifier, same answer.
//! - A resolver never returns `Some("")`; empty names are reported as `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// Genus, specific epithet and optional infraspecific epithet, separated by
// a space or an underscore. The infraspecific epithet may follow a rank
// marker (`var.`, `subsp.`, `ssp.`, `f.`). Authority strings start
// upper-case, so they do not match the trailing epithet group.
static MULTINOMIAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([A-Z][a-z]+)[ _]([a-z-]+)(?:[ _]+(?:(var|subsp|ssp|f)\.?[ _]+)?([a-z-]+))?\b",
    )
    .expect("valid multinomial regex")
});

static UNINOMIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][a-z]+)\b").expect("valid uninomial regex"));

const RANK_MARKERS: [&str; 4] = ["var", "subsp", "ssp", "f"];

/// Resolves a specifier (taxon-concept reference) to a complete taxon name.
pub trait TaxonNameResolver {
    fn resolve_name(&self, specifier: &Value) -> Option<String>;
}

impl<F> TaxonNameResolver for F
where
    F: Fn(&Value) -> Option<String>,
{
    fn resolve_name(&self, specifier: &Value) -> Option<String> {
        self(specifier).filter(|name| !name.is_empty())
    }
}

/// Default resolver for Phyx taxon-concept specifiers.
///
/// Lookup order:
/// 1. `hasName.nameComplete`
/// 2. complete name parsed from `hasName.label`
/// 3. complete name parsed from the specifier's own `label`
///
/// Specimen specifiers carry no name and resolve to `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecifierNameResolver;

impl TaxonNameResolver for SpecifierNameResolver {
    fn resolve_name(&self, specifier: &Value) -> Option<String> {
        let has_name = specifier.get("hasName");

        if let Some(complete) = has_name
            .and_then(|name| name.get("nameComplete"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            return Some(complete.to_string());
        }

        has_name
            .and_then(|name| name.get("label"))
            .and_then(Value::as_str)
            .and_then(parse_name_complete)
            .or_else(|| {
                specifier
                    .get("label")
                    .and_then(Value::as_str)
                    .and_then(parse_name_complete)
            })
    }
}

/// Extracts the complete scientific name from a verbatim name string.
///
/// Handles uninomials (`Aves`), binomials (`Homo sapiens`) and trinomials
/// (`Homo sapiens neanderthalensis`, `Homo sapiens var. alba`); trailing
/// authority and year are dropped. Underscore separators are normalized to
/// spaces and rank markers are written with a trailing dot. A rank marker
/// without an epithet is dropped.
pub fn parse_name_complete(verbatim: &str) -> Option<String> {
    let verbatim = verbatim.trim();

    if let Some(caps) = MULTINOMIAL_RE.captures(verbatim) {
        let mut name = format!("{} {}", &caps[1], &caps[2]);
        if let Some(epithet) = caps.get(4).map(|m| m.as_str()) {
            match caps.get(3) {
                Some(marker) => {
                    name.push_str(&format!(" {}. {epithet}", marker.as_str()));
                }
                None if RANK_MARKERS.contains(&epithet) => {}
                None => {
                    name.push(' ');
                    name.push_str(epithet);
                }
            }
        }
        return Some(name);
    }

    UNINOMIAL_RE
        .captures(verbatim)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
