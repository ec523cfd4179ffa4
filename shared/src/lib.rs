use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raw expense form input exactly as a front end collects it.
///
/// These six text fields are the complete external contract for creating or
/// editing a record. Nothing here is validated yet; the ledger backend turns a
/// form into a record only after every field passes validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseForm {
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    /// One of the six category tags (e.g. "food")
    pub category: String,
    /// Free text, must not be blank after trimming
    pub description: String,
    /// "card" or "cash"
    pub payment: String,
    /// Decimal string convertible to a positive number
    pub amount: String,
    /// ISO-like currency tag (e.g. "KRW", "JPY")
    pub currency: String,
}

/// Expense category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Transportation,
    Accommodation,
    Food,
    Shopping,
    Activity,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Transportation,
        Category::Accommodation,
        Category::Food,
        Category::Shopping,
        Category::Activity,
        Category::Other,
    ];

    /// Stable tag used in storage and at the UI boundary
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Transportation => "transportation",
            Category::Accommodation => "accommodation",
            Category::Food => "food",
            Category::Shopping => "shopping",
            Category::Activity => "activity",
            Category::Other => "other",
        }
    }

    /// Localized name shown in tables and exports
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Transportation => "교통",
            Category::Accommodation => "숙박",
            Category::Food => "식사",
            Category::Shopping => "쇼핑",
            Category::Activity => "활동",
            Category::Other => "기타",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Category {
    type Err = ExpenseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.tag() == s.trim())
            .ok_or(ExpenseValidationError::InvalidCategory)
    }
}

/// How an expense was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Cash,
}

impl PaymentMethod {
    pub fn tag(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "카드",
            PaymentMethod::Cash => "현금",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for PaymentMethod {
    type Err = ExpenseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "card" => Ok(PaymentMethod::Card),
            "cash" => Ok(PaymentMethod::Cash),
            _ => Err(ExpenseValidationError::InvalidPaymentMethod),
        }
    }
}

/// Currency an expense was paid in.
///
/// KRW and JPY are first-class because the statistics normalize between
/// them; any other three-letter code is carried through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Currency {
    Krw,
    Jpy,
    Other(String),
}

impl Currency {
    pub fn code(&self) -> &str {
        match self {
            Currency::Krw => "KRW",
            Currency::Jpy => "JPY",
            Currency::Other(code) => code,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = ExpenseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        match code.as_str() {
            "KRW" => Ok(Currency::Krw),
            "JPY" => Ok(Currency::Jpy),
            _ if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
                Ok(Currency::Other(code))
            }
            _ => Err(ExpenseValidationError::InvalidCurrency),
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = ExpenseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

/// Active category filter of the expense table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(selected) => *selected == category,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CategoryFilter::All => "전체",
            CategoryFilter::Only(category) => category.display_name(),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ExpenseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(CategoryFilter::All),
            other => other.parse().map(CategoryFilter::Only),
        }
    }
}

/// Reasons an expense form is rejected.
///
/// Checked in declaration order; only the first failing field is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ExpenseValidationError {
    #[error("날짜를 선택해주세요.")]
    MissingDate,
    #[error("항목을 선택해주세요.")]
    InvalidCategory,
    #[error("내용을 입력해주세요.")]
    EmptyDescription,
    #[error("결제방법을 선택해주세요.")]
    InvalidPaymentMethod,
    #[error("올바른 금액을 입력해주세요.")]
    InvalidAmount,
    #[error("통화를 선택해주세요.")]
    InvalidCurrency,
}

/// Configuration for the expense ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Key the serialized ledger is stored under
    pub storage_key: String,
    /// Export filename prefix; the export date is appended
    pub export_file_prefix: String,
    /// Currency code -> KRW multiplier. Fixed example rates, not live exchange rates.
    pub conversion_rates: BTreeMap<String, f64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        let mut conversion_rates = BTreeMap::new();
        conversion_rates.insert("JPY".to_string(), 8.5);
        Self {
            storage_key: "budgetData".to_string(),
            export_file_prefix: "홋카이도_여행_가계부".to_string(),
            conversion_rates,
        }
    }
}

/// Format an amount the way the ko-KR locale displays currency.
///
/// KRW and JPY have no minor unit and are rounded to whole numbers.
pub fn format_currency(amount: f64, currency: &Currency) -> String {
    match currency {
        Currency::Krw => format!("₩{}", group_thousands(amount, 0)),
        Currency::Jpy => format!("JP¥{}", group_thousands(amount, 0)),
        Currency::Other(code) => format!("{} {}", code, group_thousands(amount, 2)),
    }
}

fn group_thousands(amount: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, amount.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    if amount < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}
