//! User-facing message texts

use rust_decimal::Decimal;

use crate::domain::diff::{ChangeEvent, ChangeKind};
use crate::domain::product::TrackedProduct;
use crate::shared::types::format_price;

pub fn help_text() -> String {
    "🤖 Welcome to Zalando Price Monitor Bot!\n\n\
     Available commands:\n\
     /add <url> - Start monitoring a new product\n\
     /list - List all monitored products\n\
     /remove <url> - Remove a product from monitoring\n\
     /status - Check bot status\n\
     /help - Show this help message\n\n\
     Send me a Zalando.nl product URL and I'll monitor its price!"
        .to_string()
}

pub fn status_text(check_interval_secs: u64, tracked: usize) -> String {
    format!(
        "📊 Bot Status\n\n\
         🔄 Check interval: {check_interval_secs} seconds\n\
         📦 Your monitored products: {tracked}\n\
         ✅ Bot is running normally"
    )
}

pub fn added_text(product: &TrackedProduct, check_interval_secs: u64) -> String {
    format!(
        "✅ Added to monitoring:\n\
         📦 {}\n\
         ⏰ Check interval: {} seconds\n\
         I'll fetch the current price on the next check and notify you when it changes!",
        product.title, check_interval_secs
    )
}

pub fn removed_text(product: &TrackedProduct) -> String {
    format!("✅ Removed {} from monitoring.", product.title)
}

pub fn list_text(products: &[TrackedProduct]) -> String {
    if products.is_empty() {
        return "You have no products being monitored.".to_string();
    }

    let mut message = String::from("📊 Your Monitored Products:\n\n");
    for product in products {
        message.push_str(&format!("📦 {}\n", product.title));
        match product.last_known_price {
            Some(price) => message.push_str(&format!("💰 Last price: {}\n", format_price(price))),
            None => message.push_str("💰 Last price: not fetched yet\n"),
        }
        message.push_str(&format!(
            "⏰ Added: {}\n🔗 {}\n\n",
            product.added_at.format("%Y-%m-%d"),
            product.url
        ));
    }
    message
}

/// One-time notice when a product keeps failing to fetch
pub fn failure_notice(product: &TrackedProduct, failures: u32) -> String {
    format!(
        "⚠️ I couldn't check {} for {} cycles in a row.\n\
         The page may have been taken down or the shop is blocking me.\n\
         I'll keep trying; /remove {} to stop monitoring it.",
        product.title, failures, product.url
    )
}

pub fn change_alert(event: &ChangeEvent) -> String {
    match event.kind {
        ChangeKind::Increase | ChangeKind::Decrease => price_alert(event),
        ChangeKind::BackInStock => format!(
            "🎉 Back in stock!\n\n📦 {}\n💰 Current price: {}\n🔗 {}",
            event.title,
            format_price(event.new_price),
            event.url
        ),
        ChangeKind::OutOfStock => format!(
            "🚫 Out of stock\n\n📦 {}\nI'll let you know when it's available again.\n🔗 {}",
            event.title, event.url
        ),
    }
}

fn price_alert(event: &ChangeEvent) -> String {
    let change = event.new_price - event.previous_price;
    let arrow = if change > Decimal::ZERO { "📈" } else { "📉" };
    format!(
        "💰 Price Change Alert!\n\n\
         📦 {}\n\
         Old price: {}\n\
         New price: {}\n\
         Change: {arrow} {} ({})\n\n\
         🔗 {}",
        event.title,
        format_price(event.previous_price),
        format_price(event.new_price),
        format_price(change.abs()),
        percent_change(event.previous_price, event.new_price),
        event.url
    )
}

fn percent_change(old: Decimal, new: Decimal) -> String {
    if old.is_zero() {
        return "n/a".to_string();
    }
    let pct = (new - old) / old * Decimal::from(100);
    let sign = if pct.is_sign_negative() { "" } else { "+" };
    format!("{sign}{pct:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: ChangeKind, old: &str, new: &str) -> ChangeEvent {
        ChangeEvent {
            owner_id: 1,
            url: "https://www.zalando.nl/x.html".into(),
            title: "Nike Air Max 90".into(),
            previous_price: old.parse().unwrap(),
            new_price: new.parse().unwrap(),
            kind,
        }
    }

    #[test]
    fn decrease_alert_shows_both_prices_and_signed_percentage() {
        let text = change_alert(&event(ChangeKind::Decrease, "50.00", "45.00"));
        assert!(text.contains("Old price: €50.00"));
        assert!(text.contains("New price: €45.00"));
        assert!(text.contains("📉 €5.00 (-10.0%)"));
    }

    #[test]
    fn increase_alert_points_up() {
        let text = change_alert(&event(ChangeKind::Increase, "40.00", "50.00"));
        assert!(text.contains("📈 €10.00 (+25.0%)"));
    }

    #[test]
    fn stock_alerts_mention_the_product() {
        let restock = change_alert(&event(ChangeKind::BackInStock, "45.00", "45.00"));
        assert!(restock.contains("Back in stock"));
        assert!(restock.contains("€45.00"));

        let gone = change_alert(&event(ChangeKind::OutOfStock, "45.00", "45.00"));
        assert!(gone.contains("Out of stock"));
    }

    #[test]
    fn list_text_handles_never_fetched_products() {
        let product = TrackedProduct::new(1, "https://www.zalando.nl/x.html".into(), "X".into());
        let text = list_text(&[product]);
        assert!(text.contains("not fetched yet"));
    }
}
