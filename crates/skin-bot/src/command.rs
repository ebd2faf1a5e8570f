//! Command Parsing
//!
//! Typed or pressed input is normalized into a [`Command`]:
//!
//! ```text
//!   "/start", "/top", "/budget", "/analyze"   slash commands (an "@botname" suffix is ignored)
//!   "cat_<c>" | "cat_all"                     ranked list, page 1
//!   "page_<n>_<c>"                            ranked list, page n
//!   "item_<id>"                               item details
//!   "budget_<amount>" | "budget_custom" | "budget_new"
//!   "back_to_top"                             category menu
//!   "15000"                                   plain budget amount
//! ```

use std::str::FromStr;

use rust_decimal::Decimal;
use skin_advisor::{Category, ItemId};

/// Parsed user input
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    /// Category menu
    Top,
    /// Budget menu
    Budget,
    Analyze,
    /// Ranked list; `None` means every category
    List {
        category: Option<Category>,
        page: usize,
    },
    Item(ItemId),
    /// Plan for an amount, from a preset button or typed text
    Plan(Decimal),
    /// Prompt for a typed amount
    CustomBudget,
    /// Unrecognized slash command or button payload
    Unknown(String),
}

impl Command {
    /// Parse one input. `None` for ordinary text the bot should ignore.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();

        if let Some(command) = input.strip_prefix('/') {
            let name = command
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .split('@')
                .next()
                .unwrap_or_default();
            return Some(match name {
                "start" | "help" => Self::Start,
                "top" => Self::Top,
                "budget" => Self::Budget,
                "analyze" => Self::Analyze,
                _ => Self::Unknown(input.to_string()),
            });
        }

        if input == "back_to_top" {
            return Some(Self::Top);
        }
        if let Some(slug) = input.strip_prefix("cat_") {
            return Some(
                parse_scope(slug).map_or_else(
                    || Self::Unknown(input.to_string()),
                    |category| Self::List { category, page: 1 },
                ),
            );
        }
        if let Some(rest) = input.strip_prefix("page_") {
            return Some(parse_page(rest).unwrap_or_else(|| Self::Unknown(input.to_string())));
        }
        if let Some(id) = input.strip_prefix("item_") {
            return Some(
                id.parse()
                    .map_or_else(|_| Self::Unknown(input.to_string()), Self::Item),
            );
        }
        if let Some(action) = input.strip_prefix("budget_") {
            return Some(match action {
                "custom" => Self::CustomBudget,
                "new" => Self::Budget,
                amount => parse_amount(amount).map_or_else(|| Self::Unknown(input.to_string()), Self::Plan),
            });
        }

        parse_amount(input).map(Self::Plan)
    }
}

/// `all` → every category, a known slug → that category
fn parse_scope(slug: &str) -> Option<Option<Category>> {
    if slug == "all" {
        Some(None)
    } else {
        Category::parse(slug).map(Some)
    }
}

/// `<n>_<scope>`; a missing scope means every category
fn parse_page(rest: &str) -> Option<Command> {
    let (page, scope) = rest.split_once('_').unwrap_or((rest, "all"));
    let page = page.parse().ok()?;
    let category = parse_scope(scope)?;
    Some(Command::List { category, page })
}

/// Strictly positive decimal amount
fn parse_amount(s: &str) -> Option<Decimal> {
    Decimal::from_str(s.trim())
        .ok()
        .filter(|amount| *amount > Decimal::ZERO)
}

/// Inverse of the `cat_` / `page_` scope slug
pub fn scope_slug(category: Option<Category>) -> &'static str {
    category.map_or("all", Category::as_str)
}
