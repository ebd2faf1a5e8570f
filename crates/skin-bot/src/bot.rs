//! Bot Service
//!
//! Maps chat input to replies. Stateless per chat: every button carries the
//! full context it needs (`page_2_knives`, `item_17`).
//!
//! ```text
//!   input ──► Command::parse ──► dispatch ──► Vec<Reply>
//!                                   │
//!                 /analyze ─────────┴──► spawned sweep ──► broadcast<Notification>
//! ```

use std::sync::Arc;

use rust_decimal::Decimal;
use skin_advisor::model::IMAGE_BASE_URL;
use skin_advisor::scheduler::run_analysis;
use skin_advisor::{
    BudgetAdvisor, BudgetAllocation, Category, ItemId, ItemTrend, PriceStore, TrendAnalyzer, TrendQuery,
    TrendRepository,
};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::command::{Command, scope_slug};
use crate::config::BotConfig;
use crate::error::{BotError, Result};
use crate::format::{
    CURRENCY, MAX_MESSAGE_CHARS, category_emoji, category_label, detailed_analysis, format_price,
    growth_label, investment_advice, investment_strategy, list_title, recommendation_emoji,
    split_message, truncate,
};
use crate::message::{Button, ChatId, Notification, Reply};

/// Buffered notifications per subscriber
const NOTIFICATION_CAPACITY: usize = 64;

/// Preset budget buttons: (label, payload)
const BUDGET_PRESETS: [(&str, &str); 5] = [
    ("5 000₽", "budget_5000"),
    ("10 000₽", "budget_10000"),
    ("25 000₽", "budget_25000"),
    ("50 000₽", "budget_50000"),
    ("100 000₽", "budget_100000"),
];

/// Category menu layout, two per row
const MENU_ROWS: [[Category; 2]; 4] = [
    [Category::Knives, Category::Weapons],
    [Category::Containers, Category::Gloves],
    [Category::Keys, Category::Packages],
    [Category::Stickers, Category::Charms],
];

const WELCOME: &str = "🎮 *Welcome to the CS2 Skin Analyzer!*

This bot helps you find promising skins to invest in.

📊 *Commands:*
/top - Top promising skins (paginated)
/budget - Build an investment portfolio for your budget
/analyze - Run a market analysis now

🚀 *How it works:*
Price trends are scored from 1 to 10, where 10 is the most promising buy.

💡 *Recommendations:*
• 🟢 BUY - worth buying
• 🟡 HOLD - keep if you own it
• 🔴 SELL - consider selling

🔍 *Navigation:*
• Tap an item for a detailed analysis
• Use ⬅️➡️ to move between pages";

const UNKNOWN_COMMAND: &str = "Unknown command. Use /start for help.";

pub struct BotService {
    prices: Arc<dyn PriceStore>,
    trends: Arc<dyn TrendRepository>,
    analyzer: Arc<TrendAnalyzer>,
    advisor: BudgetAdvisor,
    config: BotConfig,
    notifications: broadcast::Sender<Notification>,
}

impl BotService {
    pub fn new(
        prices: Arc<dyn PriceStore>,
        trends: Arc<dyn TrendRepository>,
        analyzer: Arc<TrendAnalyzer>,
        advisor: BudgetAdvisor,
        config: BotConfig,
    ) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            prices,
            trends,
            analyzer,
            advisor,
            config,
            notifications,
        }
    }

    pub const fn config(&self) -> &BotConfig {
        &self.config
    }

    pub const fn advisor(&self) -> &BudgetAdvisor {
        &self.advisor
    }

    /// Receive notifications for every chat; filter by `chat_id` on the consumer side
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Handle one message or button press. Plain text that is not a command
    /// or an amount yields no replies.
    ///
    /// `/analyze` spawns a task, so this must run inside a tokio runtime.
    pub fn handle(&self, chat_id: ChatId, input: &str) -> Vec<Reply> {
        let Some(command) = Command::parse(input) else {
            return Vec::new();
        };
        tracing::debug!(chat_id, ?command, "handling command");

        self.dispatch(chat_id, command).unwrap_or_else(|e| {
            if matches!(e, BotError::Advisor(_)) {
                tracing::warn!(chat_id, error = %e, retryable = e.is_retryable(), "command failed");
            }
            vec![Reply::text(self.error_text(&e))]
        })
    }

    fn dispatch(&self, chat_id: ChatId, command: Command) -> Result<Vec<Reply>> {
        match command {
            Command::Start => Ok(vec![Reply::text(WELCOME)]),
            Command::Top => Ok(vec![category_menu()]),
            Command::Budget => Ok(vec![self.budget_menu()]),
            Command::Analyze => Ok(vec![self.start_analysis(chat_id)]),
            Command::List { category, page } => self.ranked_list(category, page).map(|r| vec![r]),
            Command::Item(id) => self.item_details(id).map(|r| vec![r]),
            Command::Plan(budget) => self.budget_plan(budget),
            Command::CustomBudget => Ok(vec![Reply::text(format!(
                "💰 Enter your budget as a number in {CURRENCY}:\nFor example: 15000"
            ))]),
            Command::Unknown(_) => Ok(vec![Reply::text(UNKNOWN_COMMAND)]),
        }
    }

    fn error_text(&self, error: &BotError) -> String {
        match error {
            BotError::BudgetTooLow(_) => {
                format!("❌ Minimum budget: {}{CURRENCY}", self.config.min_budget)
            }
            BotError::BudgetTooHigh(_) => {
                format!("❌ Maximum budget: {}{CURRENCY}", self.config.max_budget)
            }
            other => other.user_message(),
        }
    }

    /// Acknowledge now, report through the notification channel later
    fn start_analysis(&self, chat_id: ChatId) -> Reply {
        let run_id = Uuid::new_v4();
        let analyzer = self.analyzer.clone();
        let notifications = self.notifications.clone();

        tracing::info!(chat_id, %run_id, "analysis requested from chat");

        tokio::spawn(async move {
            let reply = match run_analysis(analyzer).await {
                Ok(report) => Reply::text(format!(
                    "✅ Analysis complete! {} items analyzed, {} skipped, {} failed.\nUse /top to see the results.",
                    report.analyzed, report.skipped, report.failed
                ))
                .with_buttons(vec![vec![Button::new("📊 Top items", "back_to_top")]]),
                Err(e) => {
                    tracing::error!(%run_id, error = %e, "requested analysis failed");
                    Reply::text(format!("❌ Analysis failed: {}", e.user_message()))
                }
            };

            if notifications.send(Notification::new(run_id, chat_id, reply)).is_err() {
                tracing::debug!(%run_id, "no subscribers for analysis notification");
            }
        });

        Reply::text("🔄 Starting market analysis... This may take a few minutes.")
    }

    fn ranked_list(&self, category: Option<Category>, page: usize) -> Result<Reply> {
        let query = TrendQuery::new(self.config.list_limit)
            .with_category(category)
            .with_min_score(self.config.min_score);
        let trends = self.trends.top(&query)?;

        if trends.is_empty() {
            return Ok(Reply::text(
                "No analyzed items in this category yet. Try /analyze to refresh.",
            )
            .with_buttons(vec![back_to_menu_row()]));
        }

        let page_size = self.config.page_size.max(1);
        let total_pages = trends.len().div_ceil(page_size);
        let page = page.clamp(1, total_pages);
        let start = (page - 1) * page_size;
        let shown = &trends[start..(start + page_size).min(trends.len())];

        let mut text = format!("🏆 *{}* (page {page}/{total_pages})\n\n", list_title(category));
        for (n, trend) in (start + 1..).zip(shown) {
            text.push_str(&list_entry(n, trend));
        }

        let mut buttons: Vec<Vec<Button>> = shown
            .iter()
            .map(|t| {
                vec![Button::new(
                    format!("📊 {}", truncate(&t.market_name, 30)),
                    format!("item_{}", t.item_id),
                )]
            })
            .collect();

        let slug = scope_slug(category);
        let mut nav = Vec::new();
        if page > 1 {
            nav.push(Button::new("⬅️ Prev", format!("page_{}_{slug}", page - 1)));
        }
        if page < total_pages {
            nav.push(Button::new("Next ➡️", format!("page_{}_{slug}", page + 1)));
        }
        if !nav.is_empty() {
            buttons.push(nav);
        }
        buttons.push(back_to_menu_row());

        Ok(Reply::text(text).with_buttons(buttons))
    }

    fn item_details(&self, item_id: ItemId) -> Result<Reply> {
        let trend = self
            .trends
            .trend(item_id)?
            .ok_or(BotError::NotAnalyzed(item_id))?;
        let data_points = self.prices.observation_count(item_id)?;

        let mut text = String::from("📊 *Detailed investment analysis*\n\n");
        text.push_str(&format!(
            "{} *{}*\n📂 Category: {}\n\n",
            category_emoji(trend.category),
            trend.market_name,
            category_label(trend.category)
        ));
        text.push_str(&format!("💰 *Price:* {:.2} {CURRENCY}\n", trend.current_price));
        text.push_str(&format!("📈 *Growth:* {} over the period\n", growth_label(&trend)));
        text.push_str(&format!("🔮 *Forecast:* {:.1}% over the next 7 periods\n", trend.predicted_growth));
        text.push_str(&format!("📊 *Volatility:* {:.1}%\n", trend.volatility));
        text.push_str(&format!("⭐ *Score:* {}/10\n", trend.trend_score));
        text.push_str(&format!(
            "{} *Recommendation:* {}\n\n",
            recommendation_emoji(trend.recommendation),
            trend.recommendation
        ));

        text.push_str("🔍 *Why consider it:*\n");
        text.push_str(&detailed_analysis(&trend));
        text.push_str("\n\n📈 *Investment strategy:*\n");
        text.push_str(&investment_strategy(&trend));
        text.push_str(&format!("\n\n📊 *Data reliability:* {data_points} points\n"));

        let reply = Reply::text(text)
            .with_buttons(vec![vec![Button::new("⬅️ Back to list", "back_to_top")]]);

        Ok(if has_real_image(&trend) {
            reply.with_image(trend.image_url)
        } else {
            reply
        })
    }

    fn budget_menu(&self) -> Reply {
        let roi = min_roi_percent(self.advisor.min_expected_roi());
        let text = format!(
            "💰 *Budget calculator*

Builds a portfolio for your capital from items with an expected return of at least *{roi}%*.

🎯 *What it does:*
• Picks the top items with the best forecasts
• Spreads your budget across promising skins
• Diversifies across categories
• Shows the expected profit over 6-12 months

💡 *Enter your budget in {CURRENCY}:*
For example: 10000"
        );

        let buttons: Vec<Button> = BUDGET_PRESETS
            .iter()
            .map(|&(label, data)| Button::new(label, data))
            .chain(std::iter::once(Button::new("💬 Enter my own", "budget_custom")))
            .collect();

        Reply::text(text).with_buttons(buttons.chunks(2).map(<[Button]>::to_vec).collect())
    }

    fn budget_plan(&self, budget: Decimal) -> Result<Vec<Reply>> {
        if budget < self.config.min_budget {
            return Err(BotError::BudgetTooLow(budget));
        }
        if budget > self.config.max_budget {
            return Err(BotError::BudgetTooHigh(budget));
        }

        let plan = self.advisor.plan(budget)?;
        if plan.is_empty() {
            let roi = min_roi_percent(self.advisor.min_expected_roi());
            return Ok(vec![Reply::text(format!(
                "❌ No items fit your budget with the required {roi}%+ return"
            ))]);
        }

        let mut text = format!("💰 *Optimal portfolio for {}{CURRENCY}*\n\n", format_price(budget));
        text.push_str("📊 *Summary:*\n");
        text.push_str(&format!("💵 To invest: {}{CURRENCY}\n", format_price(plan.total_cost)));
        text.push_str(&format!("💰 Remaining: {}{CURRENCY}\n", format_price(plan.remaining())));
        text.push_str(&format!("📈 Expected profit: {}{CURRENCY}\n", format_price(plan.expected_profit)));
        if let Some(roi) = plan.overall_roi() {
            text.push_str(&format!("🎯 Overall ROI: {roi:.0}%\n"));
        }
        text.push_str("\n🛒 *Recommended purchases:*\n\n");

        for (n, line) in (1..).zip(&plan.lines) {
            text.push_str(&format!(
                "{n}. {} *{}*\n   💸 {}{CURRENCY} × {} = {}{CURRENCY}\n   📈 ROI: {} (+{}{CURRENCY})\n   ⭐ Score: {}/10\n\n",
                category_emoji(line.category),
                line.market_name,
                format_price(line.unit_price),
                line.quantity,
                format_price(line.total_cost),
                roi_label(line),
                format_price(line.expected_profit),
                line.trend_score,
            ));
        }

        text.push_str("⚠️ *Important:*\n");
        text.push_str("• This is a forecast, real returns may differ\n");
        text.push_str("• Only invest money you are prepared to lose\n");
        text.push_str("• Suggested holding period: 6-12 months\n");
        text.push_str("• Keep an eye on game and market updates");

        let mut replies: Vec<Reply> = split_message(&text, MAX_MESSAGE_CHARS)
            .into_iter()
            .map(Reply::text)
            .collect();
        replies.push(
            Reply::text("💡 Want to recalculate with a different budget?").with_buttons(vec![vec![
                Button::new("🔄 New plan", "budget_new"),
                Button::new("📊 Top items", "back_to_top"),
            ]]),
        );
        Ok(replies)
    }
}

fn category_menu() -> Reply {
    let mut text = String::from("📂 *Choose a category:*\n\n");
    text.push_str("🔪 Knives - the most expensive and stable investments\n");
    text.push_str("🔫 Weapons - popular skins with good potential\n");
    text.push_str("📦 Cases - containers with skins\n");
    text.push_str("🧤 Gloves - rare and valuable items\n");
    text.push_str("🗝️ Keys - for opening cases\n");
    text.push_str("📤 Packages - capsules and souvenirs\n");
    text.push_str("🏷️ Stickers - collectible value\n");
    text.push_str("🎯 Charms - the newest item category\n");
    text.push_str("⭐ All categories - overall top");

    let mut rows: Vec<Vec<Button>> = MENU_ROWS
        .iter()
        .map(|row| {
            row.iter()
                .map(|&c| {
                    Button::new(
                        format!("{} {}", category_emoji(c), category_label(c)),
                        format!("cat_{c}"),
                    )
                })
                .collect()
        })
        .collect();
    rows.push(vec![Button::new("⭐ All categories", "cat_all")]);

    Reply::text(text).with_buttons(rows)
}

fn back_to_menu_row() -> Vec<Button> {
    vec![Button::new("📂 Choose category", "back_to_top")]
}

fn list_entry(n: usize, trend: &ItemTrend) -> String {
    format!(
        "{n}. {} {} {}\n   📊 Score: {}/10 | 💰 {:.2} {CURRENCY} | 📈 {:.1}%\n   💡 {}\n\n",
        recommendation_emoji(trend.recommendation),
        category_emoji(trend.category),
        trend.market_name,
        trend.trend_score,
        trend.current_price,
        trend.growth_rate,
        investment_advice(trend),
    )
}

fn has_real_image(trend: &ItemTrend) -> bool {
    !trend.image_url.is_empty()
        && trend.image_url.strip_prefix(IMAGE_BASE_URL) != Some("placeholder")
}

/// `2.1` → `210`
fn min_roi_percent(roi: Decimal) -> Decimal {
    roi.checked_mul(Decimal::ONE_HUNDRED).unwrap_or(roi).normalize()
}

/// "280%", or the raw multiplier when the percentage does not fit
fn roi_label(line: &BudgetAllocation) -> String {
    line.roi_percent().map_or_else(
        || format!("×{}", line.expected_roi.round_dp(2)),
        |percent| format!("{percent:.0}%"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use skin_advisor::model::NewItem;
    use skin_advisor::{
        GrowthSource, ItemCatalog, MemoryMarketStore, PriceObservation, Recommendation,
        TrendRecord,
    };
    use std::time::Duration;

    fn service(store: &Arc<MemoryMarketStore>) -> BotService {
        let analyzer = Arc::new(TrendAnalyzer::new(store.clone(), store.clone(), store.clone()));
        BotService::new(
            store.clone(),
            store.clone(),
            analyzer,
            BudgetAdvisor::new(store.clone()),
            BotConfig::default(),
        )
    }

    fn seed(
        store: &MemoryMarketStore,
        name: &str,
        category: Category,
        price: Decimal,
        score: u8,
        growth: f64,
    ) -> ItemId {
        let id = store.upsert_item(&NewItem::new(name, category)).unwrap();
        store
            .record(id, PriceObservation::new(price, Utc::now()).unwrap())
            .unwrap();
        store
            .upsert(&TrendRecord {
                item_id: id,
                growth_rate: growth,
                growth_source: GrowthSource::Measured,
                volatility: 8.0,
                trend_score: score,
                recommendation: skin_advisor::trend::recommendation(score, growth),
                predicted_growth: 4.0,
                data_points: 12,
                analyzed_at: Utc::now(),
            })
            .unwrap();
        id
    }

    fn data(reply: &Reply) -> Vec<&str> {
        reply.button_data().collect()
    }

    #[test]
    fn test_plain_text_is_ignored() {
        let store = Arc::new(MemoryMarketStore::new());
        assert!(service(&store).handle(1, "hello there").is_empty());
    }

    #[test]
    fn test_start_and_unknown() {
        let store = Arc::new(MemoryMarketStore::new());
        let bot = service(&store);

        let start = bot.handle(1, "/start");
        assert!(start[0].text.contains("/budget"));

        let unknown = bot.handle(1, "/moon");
        assert_eq!(unknown[0].text, UNKNOWN_COMMAND);
    }

    #[test]
    fn test_category_menu_covers_every_category() {
        let store = Arc::new(MemoryMarketStore::new());
        let replies = service(&store).handle(1, "/top");
        let buttons = data(&replies[0]);

        for category in Category::ALL {
            assert!(buttons.contains(&format!("cat_{category}").as_str()));
        }
        assert_eq!(buttons.last(), Some(&"cat_all"));
    }

    #[test]
    fn test_list_pages() {
        let store = Arc::new(MemoryMarketStore::new());
        for i in 0..7u8 {
            seed(&store, &format!("AK-47 | Skin {i}"), Category::Weapons, dec!(100), 9, 20.0 + f64::from(i));
        }
        let bot = service(&store);

        let first = bot.handle(1, "cat_weapons");
        let buttons = data(&first[0]);
        assert!(first[0].text.contains("page 1/2"));
        assert_eq!(buttons.iter().filter(|d| d.starts_with("item_")).count(), 5);
        assert!(buttons.contains(&"page_2_weapons"));
        assert!(!buttons.iter().any(|d| d.starts_with("page_0")));

        let second = bot.handle(1, "page_2_weapons");
        let buttons = data(&second[0]);
        assert_eq!(buttons.iter().filter(|d| d.starts_with("item_")).count(), 2);
        assert!(buttons.contains(&"page_1_weapons"));
        assert!(second[0].text.contains("6. "));

        let clamped = bot.handle(1, "page_9_weapons");
        assert!(clamped[0].text.contains("page 2/2"));
    }

    #[test]
    fn test_list_respects_min_score_and_category() {
        let store = Arc::new(MemoryMarketStore::new());
        seed(&store, "P90 | Asiimov", Category::Weapons, dec!(100), 4, -20.0);
        seed(&store, "★ Flip Knife | Fade", Category::Knives, dec!(9000), 8, 30.0);
        let bot = service(&store);

        let weapons = bot.handle(1, "cat_weapons");
        assert!(weapons[0].text.starts_with("No analyzed items"));

        let all = bot.handle(1, "cat_all");
        assert!(all[0].text.contains("★ Flip Knife | Fade"));
        assert!(!all[0].text.contains("P90"));
    }

    #[test]
    fn test_item_details() {
        let store = Arc::new(MemoryMarketStore::new());
        let id = seed(&store, "★ Karambit | Doppler", Category::Knives, dec!(98500), 9, 25.0);
        let bot = service(&store);

        let replies = bot.handle(1, &format!("item_{id}"));
        let text = &replies[0].text;

        assert!(text.contains("★ Karambit | Doppler"));
        assert!(text.contains("98500.00"));
        assert!(text.contains("🟢 *Recommendation:* BUY"));
        assert!(text.contains("Data reliability:* 1 points"));
        // placeholder images are not attached
        assert_eq!(replies[0].image_url, None);

        let missing = bot.handle(1, "item_999");
        assert!(missing[0].text.contains("No analysis"));
    }

    #[test]
    fn test_budget_menu_presets() {
        let store = Arc::new(MemoryMarketStore::new());
        let replies = service(&store).handle(1, "/budget");

        assert!(replies[0].text.contains("210%"));
        assert_eq!(
            data(&replies[0]),
            vec![
                "budget_5000",
                "budget_10000",
                "budget_25000",
                "budget_50000",
                "budget_100000",
                "budget_custom"
            ]
        );
        assert_eq!(replies[0].buttons.len(), 3);
    }

    #[test]
    fn test_budget_bounds() {
        let store = Arc::new(MemoryMarketStore::new());
        let bot = service(&store);

        assert_eq!(bot.handle(1, "500")[0].text, "❌ Minimum budget: 1000₽");
        assert_eq!(bot.handle(1, "20000000")[0].text, "❌ Maximum budget: 10000000₽");
    }

    #[test]
    fn test_budget_plan() {
        let store = Arc::new(MemoryMarketStore::new());
        seed(&store, "★ Karambit | Fade", Category::Knives, dec!(1000), 9, 180.0);
        let bot = service(&store);

        let replies = bot.handle(1, "budget_10000");

        assert_eq!(replies.len(), 2);
        let plan = &replies[0].text;
        assert!(plan.contains("Optimal portfolio for 10K₽"));
        assert!(plan.contains("1K₽ × 3 = 3K₽"));
        assert!(plan.contains("ROI: 280%"));
        assert_eq!(data(&replies[1]), vec!["budget_new", "back_to_top"]);
    }

    #[test]
    fn test_budget_plan_with_runaway_growth_fails_cleanly() {
        let store = Arc::new(MemoryMarketStore::new());
        seed(&store, "★ Butterfly Knife | Doppler", Category::Knives, dec!(1000), 9, 5e28);
        let bot = service(&store);

        let replies = bot.handle(1, "budget_10000");

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].text, "❌ An unexpected error occurred.");
    }

    #[test]
    fn test_roi_label() {
        let mut line = BudgetAllocation {
            item_id: 1,
            market_name: "AWP | Asiimov".into(),
            category: Category::Weapons,
            unit_price: dec!(100),
            quantity: 1,
            total_cost: dec!(100),
            expected_roi: dec!(2.8),
            expected_profit: dec!(180),
            trend_score: 9,
            recommendation: Recommendation::Buy,
        };
        assert_eq!(roi_label(&line), "280%");

        line.expected_roi = dec!(70000000000000000000000000000);
        assert_eq!(roi_label(&line), "×70000000000000000000000000000");
    }

    #[test]
    fn test_empty_plan_message() {
        let store = Arc::new(MemoryMarketStore::new());
        let replies = service(&store).handle(1, "10000");
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("210%+"));
    }

    #[tokio::test]
    async fn test_analyze_notifies_requesting_chat() {
        let store = Arc::new(MemoryMarketStore::new());
        let id = store
            .upsert_item(&NewItem::new("Revolution Case", Category::Containers))
            .unwrap();
        for (minutes, price) in [(20, dec!(80)), (10, dec!(84)), (0, dec!(90))] {
            let at = Utc::now() - chrono::Duration::minutes(minutes);
            store.record(id, PriceObservation::new(price, at).unwrap()).unwrap();
        }
        let bot = service(&store);
        let mut rx = bot.subscribe();

        let ack = bot.handle(42, "/analyze");
        assert!(ack[0].text.starts_with("🔄"));

        let note = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(note.chat_id, 42);
        assert!(note.reply.text.contains("1 items analyzed"));
        assert!(store.trend(id).unwrap().is_some());
        assert_ne!(
            store.trend(id).unwrap().unwrap().recommendation,
            Recommendation::Sell
        );
    }
}
