//! Message Formatting
//!
//! Labels, emoji, price shorthand and the interpretive text shown next to
//! trend numbers.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use skin_advisor::{Category, ItemTrend, Recommendation};

/// Longest message a chat transport accepts
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Currency sign of the upstream price list
pub const CURRENCY: &str = "₽";

pub const fn recommendation_emoji(recommendation: Recommendation) -> &'static str {
    match recommendation {
        Recommendation::Buy => "🟢",
        Recommendation::Hold => "🟡",
        Recommendation::Sell => "🔴",
    }
}

pub const fn category_emoji(category: Category) -> &'static str {
    match category {
        Category::Knives => "🔪",
        Category::Weapons => "🔫",
        Category::Containers => "📦",
        Category::Keys => "🗝️",
        Category::Packages => "📤",
        Category::Gloves => "🧤",
        Category::Stickers => "🏷️",
        Category::Charms => "🎯",
    }
}

pub const fn category_label(category: Category) -> &'static str {
    match category {
        Category::Knives => "Knives",
        Category::Weapons => "Weapons",
        Category::Containers => "Cases",
        Category::Keys => "Keys",
        Category::Packages => "Packages",
        Category::Gloves => "Gloves",
        Category::Stickers => "Stickers",
        Category::Charms => "Charms",
    }
}

/// Heading for a ranked list
pub fn list_title(category: Option<Category>) -> String {
    category.map_or_else(
        || "⭐ Top across all categories".to_string(),
        |c| format!("{} Top {}", category_emoji(c), category_label(c)),
    )
}

/// Short price: `1.5M`, `25K`, `999`
pub fn format_price(price: Decimal) -> String {
    if price >= dec!(1000000) {
        format!("{:.1}M", (price / dec!(1000000)).round_dp(1))
    } else if price >= dec!(1000) {
        format!("{}K", (price / dec!(1000)).round_dp(0))
    } else {
        format!("{}", price.round_dp(0))
    }
}

/// Cut to `max_chars` characters, marking the cut with "..."
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// One-line advice shown in ranked lists
pub fn investment_advice(trend: &ItemTrend) -> &'static str {
    let score = trend.trend_score;
    if score >= 8 && trend.growth_rate > 10.0 {
        "Strong buy, excellent growth potential"
    } else if score >= 7 && trend.current_price < dec!(10) {
        "Cheap asset with good prospects"
    } else if score >= 7 && trend.current_price > dec!(100) {
        "Stable premium investment"
    } else if score >= 6 {
        "Moderate potential, good for diversification"
    } else {
        "Risky investment, needs research"
    }
}

/// Bullet points interpreting score, growth, price, category and volatility
pub fn detailed_analysis(trend: &ItemTrend) -> String {
    let mut lines = Vec::new();

    if trend.trend_score >= 8 {
        lines.push("✅ High score points to strong growth prospects");
    } else if trend.trend_score >= 6 {
        lines.push("⚡ Average score, the item has potential");
    }

    if trend.growth_rate > 15.0 {
        lines.push("🚀 Price is growing actively");
    } else if trend.growth_rate > 5.0 {
        lines.push("📈 Steady positive trend");
    }

    if trend.current_price < dec!(10) {
        lines.push("💎 Low entry price, minimal risk");
    } else if trend.current_price > dec!(100) {
        lines.push("💰 Premium segment for serious investors");
    }

    match trend.category {
        Category::Knives => lines.push("🔪 Knives are the most stable long-term category"),
        Category::Weapons => lines.push("🔫 Weapons have high liquidity and demand"),
        Category::Containers => lines.push("📦 Cases tend to appreciate over time"),
        Category::Gloves => lines.push("🧤 Gloves are rare with limited supply"),
        _ => {}
    }

    if trend.volatility < 10.0 {
        lines.push("🛡️ Stable price, low risk of loss");
    } else if trend.volatility > 30.0 {
        lines.push("⚡ High volatility, fast swings are possible");
    }

    lines.join("\n")
}

/// What to do with the item, by recommendation and category
pub fn investment_strategy(trend: &ItemTrend) -> String {
    let mut lines = Vec::new();

    match trend.recommendation {
        Recommendation::Buy => {
            lines.push("🟢 Buy now, good entry point");
            if trend.current_price < dec!(50) {
                lines.push("💡 Several units can be bought for diversification");
            }
            lines.push("⏰ Suggested holding period: 3-6 months");
        }
        Recommendation::Hold => {
            lines.push("🟡 Hold if you already own it");
            lines.push("📊 Watch the trend, consider buying on a dip");
        }
        Recommendation::Sell => {
            lines.push("🔴 Sell, high risk of decline");
            lines.push("💸 Consider taking profit if you hold it");
        }
    }

    match trend.category {
        Category::Knives => lines.push("🔪 Prefer knives in good condition (MW, FN)"),
        Category::Containers => lines.push("📦 Cases are a long game, hold at least a year"),
        Category::Weapons => lines.push("🔫 Popular weapons (AK, M4, AWP) are preferable"),
        _ => {}
    }

    lines.join("\n")
}

/// Growth with a marker when it is a price-tier default rather than measured
pub fn growth_label(trend: &ItemTrend) -> String {
    let mut label = format!("{:.1}%", trend.growth_rate);
    if trend.growth_source == skin_advisor::GrowthSource::PriceTierHeuristic {
        label.push_str(" (estimate, single price point)");
    }
    label
}

/// Split text into chunks of at most `limit` characters, preferring line breaks.
///
/// The newline at a split point is dropped. A line longer than `limit` is cut
/// mid-line.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut parts = Vec::new();
    let mut rest = text;

    while rest.chars().count() > limit {
        let cut = rest
            .char_indices()
            .nth(limit)
            .map_or(rest.len(), |(i, _)| i);
        let head = &rest[..cut];

        match head.rfind('\n') {
            Some(nl) if nl > 0 => {
                parts.push(head[..nl].to_string());
                rest = &rest[nl + 1..];
            }
            _ => {
                parts.push(head.to_string());
                rest = &rest[cut..];
            }
        }
    }

    if !rest.is_empty() || parts.is_empty() {
        parts.push(rest.to_string());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use skin_advisor::GrowthSource;

    fn trend(score: u8, growth: f64, price: Decimal, category: Category) -> ItemTrend {
        ItemTrend {
            item_id: 1,
            hash_name: "x".into(),
            market_name: "x".into(),
            category,
            image_url: String::new(),
            current_price: price,
            growth_rate: growth,
            growth_source: GrowthSource::Measured,
            volatility: 20.0,
            trend_score: score,
            recommendation: skin_advisor::trend::recommendation(score, growth),
            predicted_growth: 0.0,
            expected_roi: None,
            data_points: 10,
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(dec!(2500000)), "2.5M");
        assert_eq!(format_price(dec!(2000000)), "2.0M");
        assert_eq!(format_price(dec!(25000)), "25K");
        assert_eq!(format_price(dec!(4000)), "4K");
        assert_eq!(format_price(dec!(999)), "999");
        assert_eq!(format_price(dec!(87.10)), "87");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("AK-47 | Redline", 30), "AK-47 | Redline");
        assert_eq!(truncate("★ Karambit | Doppler (Factory New)", 12), "★ Karambi...");
    }

    #[test]
    fn test_advice_tiers() {
        assert_eq!(
            investment_advice(&trend(9, 25.0, dec!(500), Category::Knives)),
            "Strong buy, excellent growth potential"
        );
        assert_eq!(
            investment_advice(&trend(7, 3.0, dec!(5), Category::Containers)),
            "Cheap asset with good prospects"
        );
        assert_eq!(
            investment_advice(&trend(7, 3.0, dec!(500), Category::Weapons)),
            "Stable premium investment"
        );
        assert_eq!(
            investment_advice(&trend(4, -10.0, dec!(50), Category::Weapons)),
            "Risky investment, needs research"
        );
    }

    #[test]
    fn test_strategy_follows_recommendation() {
        let buy = investment_strategy(&trend(9, 25.0, dec!(20), Category::Containers));
        assert!(buy.starts_with("🟢"));
        assert!(buy.contains("Several units"));
        assert!(buy.contains("hold at least a year"));

        let sell = investment_strategy(&trend(3, -40.0, dec!(20), Category::Stickers));
        assert!(sell.starts_with("🔴"));
        assert_eq!(sell.lines().count(), 2);
    }

    #[test]
    fn test_heuristic_growth_is_marked() {
        let mut t = trend(6, 10.0, dec!(50), Category::Weapons);
        assert_eq!(growth_label(&t), "10.0%");
        t.growth_source = GrowthSource::PriceTierHeuristic;
        assert!(growth_label(&t).contains("estimate"));
    }

    #[test]
    fn test_split_short_message_untouched() {
        assert_eq!(split_message("hello", 4000), vec!["hello".to_string()]);
        assert_eq!(split_message("", 4000), vec![String::new()]);
    }

    #[test]
    fn test_split_at_line_boundary() {
        let line = "x".repeat(30);
        let text = [line.as_str(); 5].join("\n");

        let parts = split_message(&text, 100);

        assert!(parts.iter().all(|p| p.chars().count() <= 100));
        assert_eq!(parts[0], [line.as_str(); 3].join("\n"));
        assert_eq!(parts.join("\n"), text);
    }

    #[test]
    fn test_split_long_line_hard() {
        let text = "y".repeat(250);
        let parts = split_message(&text, 100);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        let text = "🟢".repeat(10);
        let parts = split_message(&text, 4);
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.chars().count() <= 4));
    }
}
