//! Category Classification
//!
//! Maps an item's display name to a [`Category`]. The rules are brittle
//! substring heuristics, so they sit behind a trait and can be replaced.

use crate::model::Category;

/// Category labeling policy
pub trait CategoryClassifier: Send + Sync {
    /// Must be total: every name maps to some category
    fn classify(&self, market_name: &str) -> Category;
}

const KNIFE_KEYWORDS: &[&str] = &[
    "knife", "bayonet", "karambit", "butterfly", "flip", "gut", "huntsman", "falchion", "bowie",
    "shadow", "daggers", "ursus", "navaja", "stiletto", "talon", "survival", "nomad", "skeleton",
    "paracord", "kukri",
];

const PACKAGE_KEYWORDS: &[&str] = &["capsule", "package", "souvenir"];

const CHARM_KEYWORDS: &[&str] = &["charm", "keychain"];

/// Keyword rules, checked in order:
///
/// 1. any knife keyword → knives (wins over everything below)
/// 2. "case" without "key", without "|" and not "case hardened" → containers
/// 3. "key" → keys
/// 4. capsule / package / souvenir → packages
/// 5. charm / keychain → charms
/// 6. sticker → stickers
/// 7. gloves → gloves
/// 8. otherwise weapons
///
/// The "|" exclusion keeps skins like `AK-47 | Case Hardened` out of
/// containers. Note that "keychain" contains "key", so charms with that word
/// land in keys; this matches how the market data has been labeled so far.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeywordClassifier;

impl CategoryClassifier for KeywordClassifier {
    fn classify(&self, market_name: &str) -> Category {
        let name = market_name.to_lowercase();
        let has = |kw: &str| name.contains(kw);

        if KNIFE_KEYWORDS.iter().any(|kw| has(kw)) {
            return Category::Knives;
        }
        if has("case") && !has("key") && !has("case hardened") && !has("|") {
            return Category::Containers;
        }
        if has("key") {
            return Category::Keys;
        }
        if PACKAGE_KEYWORDS.iter().any(|kw| has(kw)) {
            return Category::Packages;
        }
        if CHARM_KEYWORDS.iter().any(|kw| has(kw)) {
            return Category::Charms;
        }
        if has("sticker") {
            return Category::Stickers;
        }
        if has("gloves") {
            return Category::Gloves;
        }
        Category::Weapons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(name: &str) -> Category {
        KeywordClassifier.classify(name)
    }

    #[test]
    fn test_knives_win() {
        assert_eq!(classify("★ Karambit | Doppler (Factory New)"), Category::Knives);
        assert_eq!(classify("★ M9 Bayonet | Case Hardened"), Category::Knives);
        assert_eq!(classify("★ Shadow Daggers"), Category::Knives);
    }

    #[test]
    fn test_containers() {
        assert_eq!(classify("Revolution Case"), Category::Containers);
        assert_eq!(classify("Chroma 2 Case"), Category::Containers);
        // pipe marks a skin, not a crate
        assert_eq!(classify("AK-47 | Case Hardened (Field-Tested)"), Category::Weapons);
        assert_eq!(classify("Five-SeveN | Case Hardened"), Category::Weapons);
    }

    #[test]
    fn test_keys() {
        assert_eq!(classify("Revolution Case Key"), Category::Keys);
        assert_eq!(classify("Operation Breakout Case Key"), Category::Keys);
    }

    #[test]
    fn test_packages_charms_stickers_gloves() {
        assert_eq!(classify("Paris 2023 Legends Sticker Capsule"), Category::Packages);
        assert_eq!(classify("Souvenir AWP | Safari Mesh"), Category::Packages);
        assert_eq!(classify("Charm | Baby Karat"), Category::Charms);
        assert_eq!(classify("Sticker | Natus Vincere (Holo)"), Category::Stickers);
        assert_eq!(classify("★ Sport Gloves | Vice (Minimal Wear)"), Category::Gloves);
    }

    #[test]
    fn test_default_is_weapons() {
        assert_eq!(classify("AK-47 | Redline (Field-Tested)"), Category::Weapons);
        assert_eq!(classify(""), Category::Weapons);
    }
}
