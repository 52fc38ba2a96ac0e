//! Keyword classification of transactions.

use super::vocabulary::CATEGORY_KEYWORDS;
use crate::models::Category;

/// Classify a description by the first keyword group it contains.
pub fn classify(description: &str) -> Category {
    let lower = description.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(classify("Зачисление средств"), Category::Income);
        assert_eq!(classify("Оплата покупки"), Category::Payment);
        assert_eq!(classify("Внутрибанковский перевод"), Category::Transfer);
        assert_eq!(classify("Выдача наличных в банкомате"), Category::Withdrawal);
        assert_eq!(classify("Плата за обслуживание"), Category::Fee);
        assert_eq!(classify("случайный текст"), Category::Other);
        assert_eq!(classify(""), Category::Other);
    }

    #[test]
    fn test_group_order_wins() {
        // "перевод на счет" is income even though "перевод" alone is a transfer.
        assert_eq!(classify("Перевод на счет 40817"), Category::Income);
        // Payment keywords are checked before fee keywords.
        assert_eq!(classify("Комиссия за платеж"), Category::Payment);
    }
}
