//! Two-of-three value reconciliation.
//!
//! A line item carries three related numbers: price per unit, quantity and
//! total paid, with `total = price × quantity`. Given any two of them this
//! module derives the third. All parsing of the user's raw text happens
//! here (and in [`ShoppingList::subtotal`](crate::list::ShoppingList::subtotal),
//! which reuses [`parse_number`]); nothing else in the crate does arithmetic
//! on field text.
//!
//! # Rules
//!
//! | present                  | derived                          |
//! |--------------------------|----------------------------------|
//! | price, quantity          | total = price × quantity         |
//! | price, quantity, total   | total = price × quantity         |
//! | total, price             | quantity = total / price         |
//! | total, quantity          | price = total / quantity         |
//! | fewer than two           | rejected, nothing changes        |
//!
//! A field is *present* when it parses to a finite number strictly greater
//! than zero. Zero and negative values count as absent here even though
//! they are valid stored text.
//!
//! # Example
//!
//! ```
//! use grocertrack::reconcile::{reconcile, NumericField, Outcome};
//!
//! match reconcile("2.5", "4", "") {
//!     Outcome::Derived(d) => {
//!         assert_eq!(d.field, NumericField::TotalPaid);
//!         assert_eq!(d.value, "10");
//!     }
//!     Outcome::Rejected(_) => unreachable!(),
//! }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places kept in derived values.
pub const DECIMAL_PLACES: usize = 3;

/// From this magnitude up, values are written in exponent form (`1e+21`).
const EXPONENT_THRESHOLD: f64 = 1e21;

/// One of the three numeric fields of a line item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericField {
    PricePerUnit,
    Quantity,
    TotalPaid,
}

impl NumericField {
    /// All fields, in display order.
    pub const ALL: [NumericField; 3] = [
        NumericField::PricePerUnit,
        NumericField::Quantity,
        NumericField::TotalPaid,
    ];

    /// Persisted key for this field.
    pub fn key(&self) -> &'static str {
        match self {
            NumericField::PricePerUnit => "pricePerUnit",
            NumericField::Quantity => "quantity",
            NumericField::TotalPaid => "totalPaid",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single computed field, ready to merge into a line item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Derivation {
    /// Which field was computed.
    pub field: NumericField,
    /// Formatted value (see [`format_number`]).
    pub value: String,
}

/// Why a reconciliation was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Fewer than two fields were present.
    InsufficientInputs { present: usize },
}

/// Result of [`reconcile`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Exactly one field was computed. The other two are left as they were.
    Derived(Derivation),
    /// Nothing was computed and no field may change.
    Rejected(Rejection),
}

impl Outcome {
    /// True when a value was derived.
    pub fn is_derived(&self) -> bool {
        matches!(self, Outcome::Derived(_))
    }

    /// The derivation, if any.
    pub fn derivation(&self) -> Option<&Derivation> {
        match self {
            Outcome::Derived(d) => Some(d),
            Outcome::Rejected(_) => None,
        }
    }

    /// Convert into a `Result`, mapping a rejection to
    /// [`Error::InsufficientInputs`].
    pub fn into_result(self) -> Result<Derivation> {
        match self {
            Outcome::Derived(d) => Ok(d),
            Outcome::Rejected(Rejection::InsufficientInputs { present }) => {
                Err(Error::InsufficientInputs { present })
            }
        }
    }
}

/// Parse the leading number out of user text.
///
/// Leading whitespace is skipped, then the longest prefix that reads as a
/// decimal number (optional sign, digits, optional fraction, optional
/// exponent) or `Infinity` is taken. Anything after it is ignored, so
/// `"2.5kg"` parses as `2.5`. Returns `None` when there is no numeric prefix.
pub fn parse_number(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        // A lone "." only counts when digits surround it on at least one side.
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Parse `text` as a usable reconciliation input.
///
/// Returns the value only when it is finite and strictly positive.
pub fn present_value(text: &str) -> Option<f64> {
    parse_number(text).filter(|v| v.is_finite() && *v > 0.0)
}

/// Whether `text` counts as present for reconciliation.
pub fn is_present(text: &str) -> bool {
    present_value(text).is_some()
}

/// Round to [`DECIMAL_PLACES`] and render in minimal form.
///
/// Rounding works on the exact decimal value of the double, so `0.0075`
/// (stored as 0.00749999...) becomes `"0.007"`. A value exactly halfway
/// between two candidates takes the one further from zero: `0.0625` becomes
/// `"0.063"`. Trailing zeros and a dangling decimal point are dropped, and
/// magnitudes of 1e21 and above use exponent form. Non-finite input renders
/// as `""`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if value.abs() >= EXPONENT_THRESHOLD {
        return format!("{:e}", value).replacen('e', "e+", 1);
    }

    // Re-parsing drops trailing zeros and yields the shortest text.
    let rounded = match to_fixed(value.abs()).parse::<f64>() {
        Ok(rounded) => rounded,
        Err(_) => return String::new(),
    };
    if rounded == 0.0 {
        return "0".to_string();
    }
    if value < 0.0 {
        format!("-{}", rounded)
    } else {
        rounded.to_string()
    }
}

/// `magnitude` rounded to [`DECIMAL_PLACES`] as fixed-point text.
fn to_fixed(magnitude: f64) -> String {
    // At three places a double sits exactly on a tie only when it is an
    // odd number of sixteenths (0.0625, 0.1875, ...).
    let sixteenths = magnitude * 16.0;
    if sixteenths.fract() != 0.0 || sixteenths % 2.0 != 1.0 {
        return format!("{:.*}", DECIMAL_PLACES, magnitude);
    }
    let exact = format!("{:.*}", DECIMAL_PLACES + 1, magnitude);
    increment_last_digit(&exact[..exact.len() - 1])
}

/// Add one unit in the last place of plain decimal text.
fn increment_last_digit(text: &str) -> String {
    let mut digits: Vec<char> = text.chars().collect();
    let mut i = digits.len();
    while i > 0 {
        i -= 1;
        match digits[i] {
            '.' => continue,
            '9' => digits[i] = '0',
            d => {
                digits[i] = char::from(d as u8 + 1);
                return digits.into_iter().collect();
            }
        }
    }
    std::iter::once('1').chain(digits).collect()
}

/// Derive the missing value from the two present ones.
///
/// When all three are present, total is recomputed from price × quantity
/// and the stored total is ignored.
pub fn reconcile(price: &str, quantity: &str, total: &str) -> Outcome {
    let p = present_value(price);
    let q = present_value(quantity);
    let t = present_value(total);

    let (field, value) = match (p, q, t) {
        (Some(p), Some(q), _) => (NumericField::TotalPaid, p * q),
        (Some(p), None, Some(t)) => (NumericField::Quantity, t / p),
        (None, Some(q), Some(t)) => (NumericField::PricePerUnit, t / q),
        _ => {
            let present = [p, q, t].iter().filter(|v| v.is_some()).count();
            return Outcome::Rejected(Rejection::InsufficientInputs { present });
        }
    };

    Outcome::Derived(Derivation {
        field,
        value: format_number(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derived(outcome: Outcome) -> Derivation {
        match outcome {
            Outcome::Derived(d) => d,
            Outcome::Rejected(r) => panic!("Expected derivation, got {:?}", r),
        }
    }

    #[test]
    fn test_price_and_quantity_derive_total() {
        let d = derived(reconcile("2.5", "4", ""));
        assert_eq!(d.field, NumericField::TotalPaid);
        assert_eq!(d.value, "10");
    }

    #[test]
    fn test_total_and_quantity_derive_price() {
        let d = derived(reconcile("", "4", "10"));
        assert_eq!(d.field, NumericField::PricePerUnit);
        assert_eq!(d.value, "2.5");
    }

    #[test]
    fn test_total_and_price_derive_quantity() {
        let d = derived(reconcile("2.5", "", "10"));
        assert_eq!(d.field, NumericField::Quantity);
        assert_eq!(d.value, "4");
    }

    #[test]
    fn test_all_present_recomputes_total() {
        let d = derived(reconcile("3", "2", "100"));
        assert_eq!(d.field, NumericField::TotalPaid);
        assert_eq!(d.value, "6");
    }

    #[test]
    fn test_single_value_rejected() {
        assert_eq!(
            reconcile("", "", "10"),
            Outcome::Rejected(Rejection::InsufficientInputs { present: 1 })
        );
    }

    #[test]
    fn test_nothing_present_rejected() {
        assert_eq!(
            reconcile("", "abc", "  "),
            Outcome::Rejected(Rejection::InsufficientInputs { present: 0 })
        );
    }

    #[test]
    fn test_zero_counts_as_absent() {
        assert_eq!(
            reconcile("0", "5", ""),
            Outcome::Rejected(Rejection::InsufficientInputs { present: 1 })
        );
    }

    #[test]
    fn test_negative_counts_as_absent() {
        let d = derived(reconcile("-2", "5", "10"));
        assert_eq!(d.field, NumericField::PricePerUnit);
        assert_eq!(d.value, "2");
    }

    #[test]
    fn test_infinity_counts_as_absent() {
        assert!(!reconcile("Infinity", "5", "").is_derived());
    }

    #[test]
    fn test_rounds_to_three_places() {
        let d = derived(reconcile("", "3", "10"));
        assert_eq!(d.value, "3.333");

        let d = derived(reconcile("", "3", "20"));
        assert_eq!(d.value, "6.667");
    }

    #[test]
    fn test_into_result() {
        let err = reconcile("1", "", "").into_result().unwrap_err();
        assert_eq!(err, Error::InsufficientInputs { present: 1 });

        let ok = reconcile("1", "2", "").into_result().unwrap();
        assert_eq!(ok.value, "2");
    }

    #[test]
    fn test_parse_number_lenient_prefix() {
        assert_eq!(parse_number("2.5kg"), Some(2.5));
        assert_eq!(parse_number("  7"), Some(7.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("5."), Some(5.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("1e"), Some(1.0));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("+3"), Some(3.0));
        assert_eq!(parse_number("Infinity"), Some(f64::INFINITY));
    }

    #[test]
    fn test_parse_number_rejects_non_numeric() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("e5"), None);
    }

    #[test]
    fn test_format_number_minimal() {
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(2.0005), "2.001");
        assert_eq!(format_number(0.0001), "0");
    }

    #[test]
    fn test_format_number_rounds_exact_decimal_value() {
        // 0.01 * 0.75 is stored just below 0.0075.
        assert_eq!(format_number(0.01 * 0.75), "0.007");
        assert_eq!(format_number(2.0005), "2.001");
        assert_eq!(format_number(1.0 / 3.0), "0.333");
    }

    #[test]
    fn test_format_number_exact_ties_round_up() {
        assert_eq!(format_number(0.0625), "0.063");
        assert_eq!(format_number(0.1875), "0.188");
        assert_eq!(format_number(9.9375), "9.938");
        assert_eq!(format_number(99.9375), "99.938");
        assert_eq!(format_number(-0.0625), "-0.063");
        assert_eq!(derived(reconcile("0.25", "0.25", "")).value, "0.063");
    }

    #[test]
    fn test_format_number_large_values_keep_three_places() {
        let d = derived(reconcile("", "3", "4000000000000"));
        assert_eq!(d.field, NumericField::PricePerUnit);
        assert_eq!(d.value, "1333333333333.333");

        assert_eq!(format_number(123456789012.34567), "123456789012.346");
        assert_eq!(format_number(1e20), "100000000000000000000");
    }

    #[test]
    fn test_format_number_exponent_form() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e21), "1.5e+21");
        assert_eq!(format_number(-2e22), "-2e+22");
    }

    #[test]
    fn test_increment_last_digit_carries() {
        assert_eq!(increment_last_digit("0.062"), "0.063");
        assert_eq!(increment_last_digit("9.999"), "10.000");
        assert_eq!(increment_last_digit("0.999"), "1.000");
    }

    #[test]
    fn test_format_number_non_finite() {
        assert_eq!(format_number(f64::NAN), "");
        assert_eq!(format_number(f64::INFINITY), "");
        assert_eq!(format_number(f64::NEG_INFINITY), "");
    }

    #[test]
    fn test_format_number_idempotent_on_minimal_text() {
        let once = format_number(parse_number("7").unwrap());
        assert_eq!(once, "7");
        let twice = format_number(parse_number(&once).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_numeric_field_keys() {
        assert_eq!(NumericField::PricePerUnit.key(), "pricePerUnit");
        assert_eq!(NumericField::Quantity.to_string(), "quantity");
        assert_eq!(NumericField::ALL.len(), 3);
    }
}
