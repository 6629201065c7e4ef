//! Помесячный график погашения: доли процентов и основного долга в каждом платеже.

use crate::{error::Result, emi, model::LoanQuote};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Installment {
    pub month: u32,
    pub opening_balance: f64,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub closing_balance: f64,
}

/// Итератор по платежам. Последний платёж гасит остаток целиком, так что
/// `closing_balance` последней строки всегда 0.
#[derive(Debug, Clone)]
pub struct AmortizationSchedule {
    balance: f64,
    rate: f64,
    payment: f64,
    month: u32,
    tenure: u32,
}

impl AmortizationSchedule {
    /// Ставка и платёж берутся из того же расчёта, что и [`LoanQuote::amortize`].
    pub fn new(quote: &LoanQuote) -> Result<Self> {
        let principal = emi::to_f64("principal", quote.principal())?;
        let exact = emi::exact(quote)?;
        let rate = if exact.monthly_rate < emi::RATE_EPSILON { 0.0 } else { exact.monthly_rate };

        Ok(Self {
            balance: principal,
            rate,
            payment: exact.monthly_installment,
            month: 0,
            tenure: quote.tenure_months(),
        })
    }

    /// Сумма основного долга и процентов по всем оставшимся платежам.
    pub fn totals(self) -> (f64, f64) {
        self.fold((0.0, 0.0), |(p, i), row| (p + row.principal, i + row.interest))
    }
}

impl Iterator for AmortizationSchedule {
    type Item = Installment;

    fn next(&mut self) -> Option<Installment> {
        if self.month >= self.tenure {
            return None;
        }
        self.month += 1;

        let opening = self.balance;
        let interest = opening * self.rate;
        let (payment, principal) = if self.month == self.tenure {
            (opening + interest, opening)
        } else {
            (self.payment, self.payment - interest)
        };
        self.balance = if self.month == self.tenure { 0.0 } else { opening - principal };

        Some(Installment {
            month: self.month,
            opening_balance: opening,
            payment,
            interest,
            principal,
            closing_balance: self.balance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.tenure - self.month) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for AmortizationSchedule {}
