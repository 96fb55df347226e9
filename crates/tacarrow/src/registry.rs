//! Closed set of supported symbols and symbol-code lookup.
//!
//! A code selects a symbol only when it equals one of the canonical keys
//! (`G*G*OLAGM-`, `G*G*OLAGS-`, `G*G*OAF---`). Anything else is "not
//! applicable" and yields `None`, never an error.
//!
//! `CodeMatching::Sidc` is an opt-in for feeds that carry concrete SIDCs:
//! only the first 10 characters count, case is ignored, and positions 2 and
//! 4 (standard identity and status, `*` in the keys) match anything.

use crate::kernel::{Geometry, LineString};
use crate::symbol::{compile_oaf, compile_olagm, compile_olags, SymbolContext, SymbolError};

const CODE_LEN: usize = 10;
const WILDCARDS: [usize; 2] = [1, 3];

/// How record codes are compared with the canonical keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CodeMatching {
    /// Exact key lookup.
    #[default]
    Exact,
    /// 2525-style SIDC comparison with identity/status wildcards.
    Sidc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Main attack: buffered corridor with a notched arrowhead.
    Olagm,
    /// Supporting attack: buffered corridor with a rectangular cutout and a triangular head.
    Olags,
    /// Axis of advance, feint: base line with two chevrons.
    Oaf,
}

impl SymbolKind {
    pub const ALL: [SymbolKind; 3] = [SymbolKind::Olagm, SymbolKind::Olags, SymbolKind::Oaf];

    pub fn canonical_code(self) -> &'static str {
        match self {
            SymbolKind::Olagm => "G*G*OLAGM-",
            SymbolKind::Olags => "G*G*OLAGS-",
            SymbolKind::Oaf => "G*G*OAF---",
        }
    }

    /// Exact lookup of a canonical key.
    pub fn from_code(code: &str) -> Option<SymbolKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.canonical_code() == code)
    }

    /// Wildcard lookup of a concrete SIDC (see `CodeMatching::Sidc`).
    pub fn from_sidc(code: &str) -> Option<SymbolKind> {
        let code = code.trim().as_bytes();
        if code.len() < CODE_LEN {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|kind| matches_key(kind.canonical_code().as_bytes(), &code[..CODE_LEN]))
    }

    pub fn lookup(code: &str, matching: CodeMatching) -> Option<SymbolKind> {
        match matching {
            CodeMatching::Exact => Self::from_code(code),
            CodeMatching::Sidc => Self::from_sidc(code),
        }
    }

    pub fn compile(
        self,
        ctx: &SymbolContext<'_>,
        line: &LineString,
        width: f64,
    ) -> Result<Geometry, SymbolError> {
        match self {
            SymbolKind::Olagm => compile_olagm(ctx, line, width),
            SymbolKind::Olags => compile_olags(ctx, line, width),
            SymbolKind::Oaf => compile_oaf(ctx, line, width),
        }
    }
}

fn matches_key(key: &[u8], code: &[u8]) -> bool {
    key.iter()
        .zip(code)
        .enumerate()
        .all(|(i, (k, c))| WILDCARDS.contains(&i) || k.eq_ignore_ascii_case(c))
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::GeoKernel;
    use crate::projection::WebMercator;

    #[test]
    fn canonical_codes_round_trip() {
        for kind in SymbolKind::ALL {
            assert_eq!(SymbolKind::from_code(kind.canonical_code()), Some(kind));
        }
    }

    #[test]
    fn default_lookup_is_exact() {
        for code in ["GFGPOLAGM-", "g*g*olagm-", "G*G*OLAGM-XYZ", " G*G*OAF---", "G*G*OLAGS"] {
            assert_eq!(SymbolKind::from_code(code), None, "{code:?}");
            assert_eq!(SymbolKind::lookup(code, CodeMatching::default()), None, "{code:?}");
        }
        assert_eq!(
            SymbolKind::lookup("G*G*OLAGS-", CodeMatching::Exact),
            Some(SymbolKind::Olags)
        );
    }

    #[test]
    fn sidc_matching_treats_identity_and_status_as_wildcards() {
        assert_eq!(SymbolKind::from_sidc("GFGPOLAGM-"), Some(SymbolKind::Olagm));
        assert_eq!(SymbolKind::from_sidc("GHGAOLAGS-"), Some(SymbolKind::Olags));
        assert_eq!(SymbolKind::from_sidc("GUGPOAF---"), Some(SymbolKind::Oaf));
        // other positions are significant
        assert_eq!(SymbolKind::from_sidc("SFGPOLAGM-"), None);
        assert_eq!(SymbolKind::from_sidc("GFGPOLAGX-"), None);
    }

    #[test]
    fn sidc_matching_ignores_suffix_case_and_whitespace() {
        assert_eq!(
            SymbolKind::lookup("GFGPOLAGM-****X", CodeMatching::Sidc),
            Some(SymbolKind::Olagm)
        );
        assert_eq!(SymbolKind::from_sidc("gfgpoaf---"), Some(SymbolKind::Oaf));
        assert_eq!(SymbolKind::from_sidc("  GFGPOLAGS-  "), Some(SymbolKind::Olags));
    }

    #[test]
    fn unknown_and_short_codes_are_absent() {
        for code in ["", "OLAGM", "G*G*OLAG", "GFGPOLAR--", "GFGPOAA---"] {
            assert_eq!(SymbolKind::from_code(code), None, "{code:?}");
            assert_eq!(SymbolKind::from_sidc(code), None, "{code:?}");
        }
    }

    #[test]
    fn compile_dispatches_to_the_matching_compiler() {
        let kernel = GeoKernel::new();
        let proj = WebMercator::default();
        let ctx = SymbolContext::new(&kernel, &proj);
        let line = LineString::from(vec![(10.0, 50.0), (10.0, 50.05)]);
        assert_eq!(
            SymbolKind::Oaf.compile(&ctx, &line, 500.0),
            compile_oaf(&ctx, &line, 500.0)
        );
        assert_eq!(
            SymbolKind::Olags.compile(&ctx, &line, 500.0),
            compile_olags(&ctx, &line, 500.0)
        );
        assert_eq!(
            SymbolKind::Olagm.compile(&ctx, &line, 500.0),
            compile_olagm(&ctx, &line, 500.0)
        );
    }
}
