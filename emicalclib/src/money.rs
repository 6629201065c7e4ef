//! Отображение сумм в рупиях: крупные — в лакхах и кротах, мелкие — с разделителями.

use rust_decimal::{Decimal, RoundingStrategy};

const LAKH: i64 = 100_000;
const CRORE: i64 = 10_000_000;

pub fn format_inr(amount: Decimal) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    let abs = amount.abs();

    if abs >= Decimal::from(CRORE) {
        format!("{sign}₹{} Cr", two_places(abs / Decimal::from(CRORE)))
    } else if abs >= Decimal::from(LAKH) {
        format!("{sign}₹{} L", two_places(abs / Decimal::from(LAKH)))
    } else {
        format!("{sign}₹{}", group_thousands(abs))
    }
}

/// Полная сумма с индийской группировкой (`₹1,01,000`), без сокращений.
pub fn format_inr_full(amount: Decimal) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{sign}₹{}", group_indian(amount.abs()))
}

fn two_places(v: Decimal) -> String {
    format!("{:.2}", v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

// ниже лакха индийская и западная группировка совпадают
fn group_thousands(v: Decimal) -> String {
    let whole = v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero).trunc().to_string();
    let mut out = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// последние три цифры, дальше группы по две: 12,34,56,789
fn group_indian(v: Decimal) -> String {
    let whole = v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero).trunc().to_string();
    let Some(head_len) = whole.len().checked_sub(3).filter(|&n| n > 0) else {
        return whole;
    };
    let (head, tail) = whole.split_at(head_len);
    let mut out = String::with_capacity(whole.len() + whole.len() / 2);
    for (i, ch) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push(',');
    out.push_str(tail);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn formats_by_magnitude() {
        assert_eq!(format_inr(dec!(16134)), "₹16,134");
        assert_eq!(format_inr(dec!(999)), "₹999");
        assert_eq!(format_inr(dec!(0)), "₹0");
        assert_eq!(format_inr(dec!(500000)), "₹5.00 L");
        assert_eq!(format_inr(dec!(580824)), "₹5.81 L");
        assert_eq!(format_inr(dec!(25000000)), "₹2.50 Cr");
        assert_eq!(format_inr(dec!(-80824)), "-₹80,824");
    }

    #[test]
    fn full_format_groups_lakhs_and_crores() {
        assert_eq!(format_inr_full(dec!(101000)), "₹1,01,000");
        assert_eq!(format_inr_full(dec!(16134)), "₹16,134");
        assert_eq!(format_inr_full(dec!(999)), "₹999");
        assert_eq!(format_inr_full(dec!(0)), "₹0");
        assert_eq!(format_inr_full(dec!(123456789)), "₹12,34,56,789");
        assert_eq!(format_inr_full(dec!(1234567.5)), "₹12,34,568");
        assert_eq!(format_inr_full(dec!(-250000)), "-₹2,50,000");
    }
}
