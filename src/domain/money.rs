use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use std::str::FromStr;

/// A non-negative monetary value.
///
/// Wraps `rust_decimal::Decimal` so that amounts never go through binary
/// floating point. Arithmetic saturates instead of overflowing, which keeps
/// totals and rendering infallible for any input the normalizer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Money(pub Decimal);

/// A travelled distance, multiplied by a per-unit [`Money`] rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Distance(pub Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Coerces a raw form value, see [`lenient_decimal`].
    pub fn lenient(raw: Option<&str>) -> Self {
        Self(lenient_decimal(raw))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Distance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn lenient(raw: Option<&str>) -> Self {
        Self(lenient_decimal(raw))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Mul<Money> for Distance {
    type Output = Money;
    fn mul(self, rate: Money) -> Money {
        Money(self.0.saturating_mul(rate.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Reads a form value as a non-negative decimal without ever failing.
///
/// Absent, empty or non-numeric input becomes zero. Only the leading numeric
/// prefix is considered (`"12.5km"` reads as `12.5`), and negative values are
/// clamped to zero.
pub fn lenient_decimal(raw: Option<&str>) -> Decimal {
    let Some(text) = raw else {
        return Decimal::ZERO;
    };
    let Some(literal) = numeric_prefix(text.trim()) else {
        return Decimal::ZERO;
    };
    Decimal::from_str(&literal)
        .map(|value| value.max(Decimal::ZERO))
        .unwrap_or(Decimal::ZERO)
}

fn numeric_prefix(text: &str) -> Option<String> {
    let mut chars = text.chars().peekable();
    let mut literal = String::new();
    if let Some(sign) = chars.next_if(|c| *c == '-' || *c == '+') {
        if sign == '-' {
            literal.push('-');
        }
    }

    let mut integer = String::new();
    while let Some(digit) = chars.next_if(char::is_ascii_digit) {
        integer.push(digit);
    }
    let mut fraction = String::new();
    if chars.next_if_eq(&'.').is_some() {
        while let Some(digit) = chars.next_if(char::is_ascii_digit) {
            fraction.push(digit);
        }
    }

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    literal.push_str(if integer.is_empty() { "0" } else { &integer });
    if !fraction.is_empty() {
        literal.push('.');
        literal.push_str(&fraction);
    }
    Some(literal)
}

/// Separator convention used when printing amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberLocale {
    /// `1.234,56`
    #[default]
    PtBr,
    /// `1,234.56`
    EnUs,
}

impl NumberLocale {
    fn separators(self) -> (char, char) {
        match self {
            NumberLocale::PtBr => ('.', ','),
            NumberLocale::EnUs => (',', '.'),
        }
    }

    /// Formats with exactly two decimal places, rounding midpoints away from zero.
    pub fn format_amount(self, amount: Money) -> String {
        let rounded = amount
            .value()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        self.group(&format!("{rounded:.2}"))
    }

    pub fn format_currency(self, amount: Money) -> String {
        format!("R$ {}", self.format_amount(amount))
    }

    /// Formats a distance with as many decimals as it carries, `-` when zero.
    pub fn format_distance(self, distance: Distance) -> String {
        if distance.is_zero() {
            return "-".to_string();
        }
        self.group(&distance.value().normalize().to_string())
    }

    fn group(self, plain: &str) -> String {
        let (thousands, decimal) = self.separators();
        let (sign, unsigned) = match plain.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", plain),
        };
        let (integer, fraction) = match unsigned.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (unsigned, None),
        };

        let mut grouped = String::with_capacity(plain.len() + integer.len() / 3);
        for (index, digit) in integer.chars().enumerate() {
            if index > 0 && (integer.len() - index) % 3 == 0 {
                grouped.push(thousands);
            }
            grouped.push(digit);
        }

        let mut out = String::from(sign);
        out.push_str(&grouped);
        if let Some(fraction) = fraction {
            out.push(decimal);
            out.push_str(fraction);
        }
        out
    }
}

impl FromStr for NumberLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(NumberLocale::PtBr),
            "en-us" | "en" => Ok(NumberLocale::EnUs),
            other => Err(format!("unsupported locale '{other}'")),
        }
    }
}
