//! Locale vocabulary: bank aliases, category keywords, header names.
//!
//! Everything language-specific lives here as plain data; the matching code
//! elsewhere only iterates these tables.

use crate::models::Category;

/// Bank name returned when no alias or generic pattern matches.
pub const UNKNOWN_BANK: &str = "Неизвестный банк";

/// Alias patterns per bank, tested against lower-cased text in order.
pub const BANK_ALIASES: &[(&str, &[&str])] = &[
    (
        "ТБанк",
        &[
            r"тбанк",
            r"t-bank",
            r"тинькофф",
            r"tinkoff",
            r"акционерное общество.*тбанк",
            r"справка о движении средств.*тбанк",
        ],
    ),
    (
        "Яндекс Банк",
        &[r"яндекс\.банк", r"yandex\.bank", r"яндекс банк", r"ао.*яндекс банк"],
    ),
    ("Сбербанк", &[r"сбербанк", r"сберегательный банк", r"пао сбербанк"]),
    ("ВТБ", &[r"втб", r"банк втб", r"пао.*втб"]),
    ("Альфа-Банк", &[r"альфа.банк", r"alfa.bank"]),
];

/// Legal-entity patterns capturing a bank name, tested case-insensitively
/// against the original-case text.
pub const GENERIC_BANK_PATTERNS: &[&str] = &[
    r"ао\s+«([^»]+банк[^»]*)»",
    r"пао\s+«([^»]+банк[^»]*)»",
    r"ооо\s+«([^»]+банк[^»]*)»",
    r"акционерное общество\s+([^,\n]+банк[^,\n]*)",
    r"([А-Я][а-я]+\s+[Бб]анк)",
];

/// Statement period patterns; each captures a start and an end date.
pub const PERIOD_PATTERNS: &[&str] = &[
    r"за период\s+с\s+(\d{2}\.\d{2}\.\d{4})\s+по\s+(\d{2}\.\d{2}\.\d{4})",
    r"период\s+с\s+(\d{2}\.\d{2}\.\d{4})\s+по\s+(\d{2}\.\d{2}\.\d{4})",
    r"с\s+(\d{2}\.\d{2}\.\d{4})\s+по\s+(\d{2}\.\d{2}\.\d{4})",
    r"движение.*с\s+(\d{2}\.\d{2}\.\d{4})\s+по\s+(\d{2}\.\d{2}\.\d{4})",
];

/// Contract and account number patterns; each captures one token.
pub const CONTRACT_PATTERNS: &[&str] = &[
    r"договор[а-я]*\s*№?\s*([A-Z0-9\-]+)",
    r"номер договора:?\s*([A-Z0-9\-]+)",
    r"лицевой счет:?\s*([A-Z0-9\-]+)",
    r"счет:?\s*([A-Z0-9\-]+)",
];

/// Page-level hints that a page carries a transaction table.
pub const TRANSACTION_PAGE_INDICATORS: &[&str] = &[
    r"дата.*операции",
    r"дата.*списания",
    r"дата.*зачисления",
    r"сумма.*операции",
    r"описание.*операции",
    r"получатель.*плательщик",
    r"\d{2}\.\d{2}\.\d{4}.*\d{2}\.\d{2}\.\d{4}.*[+-]?\d+.*₽",
    r"внутрибанковский.*перевод",
    r"операция.*bitkoi",
    r"перевод.*договор",
    r"зачисление.*средств",
];

/// Keyword groups in classification order; first group with a hit wins.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Income,
        &["входящий", "поступление", "зачисление", "перевод на счет"],
    ),
    (
        Category::Payment,
        &["платеж", "оплата", "списание", "покупка"],
    ),
    (
        Category::Transfer,
        &["перевод", "перечисление", "внутрибанковский"],
    ),
    (Category::Withdrawal, &["снятие", "выдача", "банкомат"]),
    (Category::Fee, &["комиссия", "плата за"]),
];

/// Words that mark a cell as a column header in the primary table backend.
pub const HEADER_INDICATORS: &[&str] = &[
    "дата",
    "сумма",
    "описание",
    "операция",
    "получатель",
    "отправитель",
    "назначение",
    "валюта",
    "карта",
    "зачисления",
    "списания",
    "плательщик",
    "перевод",
    "date",
    "amount",
    "description",
    "currency",
    "card",
];

/// Minimum number of indicator cells for a row to count as the header.
pub const HEADER_MIN_MATCHES: usize = 2;

/// Header keywords for the secondary table backend.
pub const PAGE_HEADER_KEYWORDS: &[&str] = &["дата", "сумма", "описание", "операция"];

/// Amount columns, most specific first.
pub const AMOUNT_KEYS: &[&str] = &[
    "сумма в валюте операции",
    "сумма операции в валюте карты",
    "сумма в валюте эсп",
    "сумма операции",
    "сумма",
    "amount",
];

/// Columns never scanned for a fallback amount.
pub const NON_AMOUNT_KEYS: &[&str] = &[
    "дата",
    "время",
    "date",
    "time",
    "карта",
    "номер карты",
    "card",
    "описание",
    "description",
];

/// Date columns, most specific first.
pub const DATE_KEYS: &[&str] = &[
    "дата и время операции",
    "дата операции",
    "дата списания",
    "дата зачисления",
    "дата обработки",
    "дата",
    "date",
];

/// Description columns, most specific first.
pub const DESCRIPTION_KEYS: &[&str] = &[
    "описание операции",
    "описание",
    "назначение платежа",
    "назначение",
    "получатель",
    "плательщик",
    "операция",
    "description",
];

/// Fallback descriptions must be longer than this many characters.
pub const DESCRIPTION_FALLBACK_MIN_CHARS: usize = 10;

pub const REASON_MISSING_DATE: &str = "Отсутствует дата";
pub const REASON_MISSING_AMOUNT: &str = "Отсутствует сумма";
pub const REASON_MISSING_DESCRIPTION: &str = "Отсутствует описание";
pub const REASON_REGEX_UNPARSED: &str = "Не удалось распарсить дату или сумму";

/// Pattern templates for the text fallback, most specific first.
pub const REGEX_TEMPLATES: &[&str] = &[
    r"(\d{2}\.\d{2}\.\d{4})\s+(\d{2}:\d{2})\s+(\d{2}\.\d{2}\.\d{4})\s+(\d{2}:\d{2})\s+([+-]?\d+[,.]?\d*)\s*₽?\s+([+-]?\d+[,.]?\d*)\s*₽?\s+(.+?)\s+(\d{4})",
    r"(\d{2}\.\d{2}\.\d{4})\s+.*?([+-]?\d+[,.]?\d*)\s*₽?\s+([+-]?\d+[,.]?\d*)\s*₽?\s+(.+?)\s+(\d{4})",
    r"(\d{2}\.\d{2}\.\d{4}).*?([+-]?\d+[,.]?\d*)\s*₽.*?(Операция|Платеж|Перевод|Зачисление|Внутрибанковский|Оплата).*?(\d{4})",
];
