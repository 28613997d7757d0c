//! Common types used across the application

use rust_decimal::Decimal;

/// Telegram chat id of the user who registered a product
pub type OwnerId = i64;

/// Format a price in the notation shown to users (€38.99)
pub fn format_price(price: Decimal) -> String {
    format!("€{:.2}", price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_two_decimals() {
        assert_eq!(format_price("38.99".parse().unwrap()), "€38.99");
        assert_eq!(format_price("50".parse().unwrap()), "€50.00");
        assert_eq!(format_price("7.5".parse().unwrap()), "€7.50");
    }
}
