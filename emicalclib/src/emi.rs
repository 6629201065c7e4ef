//! Расчёт аннуитетного платежа (EMI) по формуле убывающего остатка.
//!
//! `emi = P * r * (1 + r)^N / ((1 + r)^N - 1)`, где `r` — месячная ставка
//! в долях. Формула закрытая, поэтому расчёт O(1) и не зависит от срока.

use crate::{
    error::{EmiError, Result},
    model::{AmortizationResult, ExactAmortization, LoanQuote},
};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Ниже этой месячной ставки `(1 + r)^N - 1` теряет точность, и платёж
/// считается как `P / N`.
pub const RATE_EPSILON: f64 = 1e-9;

/// Проверяет входные данные и считает платёж, итоговые суммы и доли.
pub fn compute_amortization(
    principal: Decimal,
    annual_rate_percent: Decimal,
    tenure_months: u32,
) -> Result<AmortizationResult> {
    LoanQuote::new(principal, annual_rate_percent, tenure_months)?.amortize()
}

/// Годовая ставка в процентах -> месячная ставка в долях.
pub fn monthly_rate(annual_rate_percent: Decimal) -> Result<f64> {
    let annual = to_f64("annual_rate_percent", annual_rate_percent)?;
    Ok(annual / 12.0 / 100.0)
}

/// Месячный платёж без округления.
pub fn installment(principal: f64, monthly_rate: f64, tenure_months: u32) -> f64 {
    let n = f64::from(tenure_months);
    if monthly_rate < RATE_EPSILON {
        return principal / n;
    }
    // (1 + r)^N - 1 через ln_1p/exp_m1: при малых r прямое вычитание теряет разряды
    let growth_less_one = (n * monthly_rate.ln_1p()).exp_m1();
    if growth_less_one.is_infinite() {
        // предел формулы при N -> inf: платятся только проценты
        return principal * monthly_rate;
    }
    principal * monthly_rate * (growth_less_one + 1.0) / growth_less_one
}

pub(crate) fn exact(quote: &LoanQuote) -> Result<ExactAmortization> {
    let principal = to_f64("principal", quote.principal())?;
    let monthly_rate = monthly_rate(quote.annual_rate_percent())?;
    let monthly_installment = installment(principal, monthly_rate, quote.tenure_months());
    // (P / N) * N может оказаться на ulp меньше P; без процентов итог равен P
    let total_payment = if monthly_rate < RATE_EPSILON {
        principal
    } else {
        monthly_installment * f64::from(quote.tenure_months())
    };

    Ok(ExactAmortization {
        monthly_rate,
        monthly_installment,
        total_payment,
        total_interest: total_payment - principal,
    })
}

pub(crate) fn amortize(quote: &LoanQuote) -> Result<AmortizationResult> {
    let exact = exact(quote)?;
    let principal = to_f64("principal", quote.principal())?;

    let result = AmortizationResult {
        monthly_installment: whole_units("principal", exact.monthly_installment)?,
        total_payment: whole_units("principal", exact.total_payment)?,
        total_interest: whole_units("principal", exact.total_interest)?,
        principal_share: percent_of(principal, exact.total_payment),
        interest_share: percent_of(exact.total_interest, exact.total_payment),
        exact,
    };

    tracing::trace!(
        principal = %quote.principal(),
        rate = %quote.annual_rate_percent(),
        tenure = quote.tenure_months(),
        emi = %result.monthly_installment,
        "amortization computed"
    );
    Ok(result)
}

// доли округляются независимо: в сумме может выйти 99 или 101
fn percent_of(part: f64, whole: f64) -> u8 {
    (part / whole * 100.0).round().clamp(0.0, 100.0) as u8
}

fn whole_units(field: &'static str, value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(EmiError::invalid(field, "amount is out of range"));
    }
    // -0.0 после округления не должен печататься как "-0"
    let whole = value.round() + 0.0;
    Decimal::from_f64(whole)
        .map(|d| d.round_dp(0))
        .ok_or_else(|| EmiError::invalid(field, "amount is out of range"))
}

pub(crate) fn to_f64(field: &'static str, value: Decimal) -> Result<f64> {
    value
        .to_f64()
        .ok_or_else(|| EmiError::invalid(field, format!("{value} is not representable")))
}
