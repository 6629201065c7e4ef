use emicalclib::{
    formats::{json::Json, text::Text},
    model::Report,
    traits::WriteReport,
    LoanQuote,
};
use rust_decimal_macros::dec;

fn report() -> Report {
    Report::new(LoanQuote::new(dec!(500000), dec!(10), 36).unwrap())
        .unwrap()
        .with_product("Tractor Loan")
}

#[test]
fn text_report_uses_rupee_format() {
    let mut out = Vec::new();
    Text::write(&mut out, &[report()]).expect("write text");
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Tractor Loan"));
    assert!(text.contains("₹16,134"));
    assert!(text.contains("₹5.00 L"));
    assert!(text.contains("36 months (3.0 yrs)"));
    assert!(text.contains("principal 86% / interest 14%"));
}

#[test]
fn monthly_emi_above_a_lakh_is_printed_in_full() {
    let big = Report::new(LoanQuote::new(dec!(100000), dec!(12), 1).unwrap()).unwrap();
    let mut out = Vec::new();
    Text::write(&mut out, &[big]).unwrap();
    let text = String::from_utf8(out).unwrap();
    let emi_line = text.lines().find(|l| l.starts_with("Monthly EMI")).unwrap();
    assert!(emi_line.ends_with("₹1,01,000"), "{emi_line}");
    assert!(text.contains("₹1.01 L"), "total payment keeps the short form");
}

#[test]
fn text_report_with_schedule_lists_every_month() {
    let mut out = Vec::new();
    Text::write(&mut out, &[report().with_schedule().unwrap()]).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.lines().any(|l| l.trim_start().starts_with("36 ")));
}

#[test]
fn json_report_round_trips_through_value() {
    let mut out = Vec::new();
    Json::write(&mut out, &[report()]).expect("write json");
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v[0]["product"], "Tractor Loan");
    assert_eq!(v[0]["result"]["monthly_installment"], "16134");
    assert_eq!(v[0]["quote"]["tenure_months"], 36);
    assert!(v[0].get("schedule").is_none());
}
