// =============================================================================
// Shared types used across the metal spot tracker
// =============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Grams per troy ounce. Spot prices arrive in USD per troy ounce; per-gram
/// figures are derived with this constant.
pub const OZ_TROY_TO_GRAM: f64 = 31.103_476_8;

/// Convert a USD-per-troy-ounce price into USD per gram.
pub fn usd_oz_to_usd_gram(usd_oz: f64) -> f64 {
    usd_oz / OZ_TROY_TO_GRAM
}

/// The fixed set of tracked metals.
///
/// Each metal carries two symbols: the one the upstream price API expects
/// (`api_symbol`) and the one used for storage files and snapshot keys
/// (`storage_symbol`). They differ only for copper, where the API speaks the
/// futures ticker `HG` but the stored series keeps the ISO-style `XCU`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metal {
    Gold,
    Silver,
    Platinum,
    Palladium,
    Copper,
}

impl Metal {
    /// Every tracked metal, in fetch order.
    pub const ALL: [Metal; 5] = [
        Metal::Gold,
        Metal::Silver,
        Metal::Platinum,
        Metal::Palladium,
        Metal::Copper,
    ];

    /// Symbol used when requesting the spot price upstream.
    pub fn api_symbol(&self) -> &'static str {
        match self {
            Self::Gold => "XAU",
            Self::Silver => "XAG",
            Self::Platinum => "XPT",
            Self::Palladium => "XPD",
            Self::Copper => "HG",
        }
    }

    /// Symbol used for series files and snapshot map keys.
    pub fn storage_symbol(&self) -> &'static str {
        match self {
            Self::Gold => "XAU",
            Self::Silver => "XAG",
            Self::Platinum => "XPT",
            Self::Palladium => "XPD",
            Self::Copper => "XCU",
        }
    }

    /// Display name carried verbatim in the snapshot for the dashboards.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gold => "Ouro",
            Self::Silver => "Prata",
            Self::Platinum => "Platina",
            Self::Palladium => "Paládio",
            Self::Copper => "Cobre",
        }
    }

    /// Parse a metal from a symbol string, case-insensitive.
    ///
    /// Accepts the storage symbols (`XAU` … `XCU`), the short aliases
    /// (`AU`, `AG`, `PT`, `PD`, `CU`) and copper's API ticker `HG`.
    /// Unknown symbols return `None`; callers decide whether to warn or skip.
    pub fn parse(symbol: &str) -> Option<Metal> {
        match symbol.trim().to_uppercase().as_str() {
            "XAU" | "AU" => Some(Self::Gold),
            "XAG" | "AG" => Some(Self::Silver),
            "XPT" | "PT" => Some(Self::Platinum),
            "XPD" | "PD" => Some(Self::Palladium),
            "XCU" | "CU" | "HG" => Some(Self::Copper),
            _ => None,
        }
    }
}

impl std::fmt::Display for Metal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.storage_symbol())
    }
}

/// Per-metal slice of the consolidated snapshot.
///
/// Every numeric field is `Option<f64>` and serialises as JSON `null` when the
/// value is absent or undefined for this tick — never `NaN` or `Infinity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalQuote {
    pub name: String,
    pub usd_oz: Option<f64>,
    pub usd_g: Option<f64>,
    pub brl_oz: Option<f64>,
    pub brl_g: Option<f64>,
    pub chg_1h: Option<f64>,
    pub chg_24h: Option<f64>,
}

/// Consolidated snapshot covering all metals for one tick.
///
/// Overwritten wholesale every tick; no history is kept for it. The metals
/// map is a `BTreeMap` so identical ticks serialise to identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestSnapshot {
    /// Tick timestamp, unix seconds UTC.
    pub timestamp: i64,
    #[serde(rename = "usdToBrl")]
    pub usd_to_brl: f64,
    pub metals: BTreeMap<String, MetalQuote>,
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_storage_symbols_and_aliases() {
        assert_eq!(Metal::parse("XAU"), Some(Metal::Gold));
        assert_eq!(Metal::parse("au"), Some(Metal::Gold));
        assert_eq!(Metal::parse("Ag"), Some(Metal::Silver));
        assert_eq!(Metal::parse("pt"), Some(Metal::Platinum));
        assert_eq!(Metal::parse("PD"), Some(Metal::Palladium));
        assert_eq!(Metal::parse("cu"), Some(Metal::Copper));
        assert_eq!(Metal::parse(" xcu "), Some(Metal::Copper));
    }

    #[test]
    fn parse_accepts_copper_api_ticker() {
        assert_eq!(Metal::parse("HG"), Some(Metal::Copper));
        assert_eq!(Metal::parse("hg"), Some(Metal::Copper));
    }

    #[test]
    fn parse_rejects_unknown_symbols() {
        assert_eq!(Metal::parse("XAUUSD"), None);
        assert_eq!(Metal::parse(""), None);
        assert_eq!(Metal::parse("FE"), None);
    }

    #[test]
    fn copper_api_and_storage_symbols_differ() {
        assert_eq!(Metal::Copper.api_symbol(), "HG");
        assert_eq!(Metal::Copper.storage_symbol(), "XCU");
        // All others use the same symbol on both sides.
        for m in [Metal::Gold, Metal::Silver, Metal::Platinum, Metal::Palladium] {
            assert_eq!(m.api_symbol(), m.storage_symbol());
        }
    }

    #[test]
    fn display_uses_storage_symbol() {
        assert_eq!(Metal::Copper.to_string(), "XCU");
        assert_eq!(Metal::Gold.to_string(), "XAU");
    }

    #[test]
    fn ounce_to_gram_conversion() {
        let per_gram = usd_oz_to_usd_gram(2000.0);
        assert!((per_gram - 64.301_492_443).abs() < 1e-6);
    }

    #[test]
    fn absent_quote_fields_serialise_as_null() {
        let quote = MetalQuote {
            name: "Prata".to_string(),
            usd_oz: None,
            usd_g: None,
            brl_oz: None,
            brl_g: None,
            chg_1h: None,
            chg_24h: None,
        };
        let json = serde_json::to_string(&quote).unwrap();
        assert!(json.contains("\"usd_oz\":null"));
        assert!(json.contains("\"chg_24h\":null"));
        assert!(!json.contains("NaN"));
    }

    #[test]
    fn snapshot_roundtrip_keeps_camel_case_rate_key() {
        let mut metals = BTreeMap::new();
        metals.insert(
            "XAU".to_string(),
            MetalQuote {
                name: "Ouro".to_string(),
                usd_oz: Some(2000.0),
                usd_g: Some(usd_oz_to_usd_gram(2000.0)),
                brl_oz: Some(10_000.0),
                brl_g: Some(usd_oz_to_usd_gram(10_000.0)),
                chg_1h: Some(0.5),
                chg_24h: None,
            },
        );
        let snapshot = LatestSnapshot {
            timestamp: 1_700_000_000,
            usd_to_brl: 5.0,
            metals,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"usdToBrl\":5.0"));

        let back: LatestSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
