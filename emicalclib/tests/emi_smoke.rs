use emicalclib::{compute_amortization, model::LoanQuote, EmiError};
use rust_decimal_macros::dec;

#[test]
fn five_lakh_at_ten_percent_for_three_years() {
    let res = compute_amortization(dec!(500000), dec!(10), 36).expect("valid quote");
    assert_eq!(res.monthly_installment, dec!(16134));
    assert!((res.exact.monthly_rate - 0.0083333).abs() < 1e-6);
    // точные суммы: 16133.59 * 36
    assert!((res.exact.total_payment - 580_809.3).abs() < 1.0);
    assert!((res.exact.total_interest - 80_809.3).abs() < 1.0);
    assert_eq!(res.total_payment, dec!(580809));
    assert_eq!(res.total_interest, dec!(80809));
}

#[test]
fn near_zero_rate_is_principal_over_tenure() {
    let res = compute_amortization(dec!(120000), dec!(0.0000001), 12).unwrap();
    assert_eq!(res.monthly_installment, dec!(10000));
    assert_eq!(res.total_payment, dec!(120000));
}

#[test]
fn one_month_tenure() {
    let res = compute_amortization(dec!(300000), dec!(9), 1).unwrap();
    // 300000 * (1 + 0.0075)
    assert_eq!(res.monthly_installment, dec!(302250));
}

#[test]
fn negative_principal_and_zero_tenure_are_invalid() {
    let err = compute_amortization(dec!(-100), dec!(10), 12).unwrap_err();
    assert!(matches!(err, EmiError::InvalidInput { field: "principal", .. }));

    let err = compute_amortization(dec!(100000), dec!(10), 0).unwrap_err();
    assert!(matches!(err, EmiError::InvalidInput { field: "tenure_months", .. }));
}

#[test]
fn quote_deserialization_validates() {
    let ok: LoanQuote =
        serde_json::from_str(r#"{"principal":"500000","annual_rate_percent":"10","tenure_months":36}"#).unwrap();
    assert_eq!(ok.tenure_months(), 36);

    let bad = serde_json::from_str::<LoanQuote>(r#"{"principal":"0","annual_rate_percent":"10","tenure_months":36}"#);
    assert!(bad.is_err());
}

#[test]
fn shares_may_not_sum_to_hundred() {
    // доли округляются независимо; проверяем только диапазон суммы
    for (p, rate, n) in [(dec!(100000), dec!(12.5), 7), (dec!(75000), dec!(13), 30), (dec!(50000), dec!(8.3), 18)] {
        let res = compute_amortization(p, rate, n).unwrap();
        let sum = u32::from(res.principal_share) + u32::from(res.interest_share);
        assert!((99..=101).contains(&sum), "{p} {rate} {n}: {sum}");
    }
}
