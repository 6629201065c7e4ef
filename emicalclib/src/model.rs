//! Доменные модели расчёта: входная заявка на расчёт и его результат.

use crate::error::{EmiError, Result};
use crate::schedule::Installment;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Параметры кредита для расчёта EMI. Создаётся только через [`LoanQuote::new`],
/// поэтому все поля уже проверены.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawQuote")]
pub struct LoanQuote {
    principal: Decimal,
    annual_rate_percent: Decimal,
    tenure_months: u32,
}

#[derive(Deserialize)]
struct RawQuote {
    principal: Decimal,
    annual_rate_percent: Decimal,
    tenure_months: u32,
}

impl TryFrom<RawQuote> for LoanQuote {
    type Error = EmiError;

    fn try_from(raw: RawQuote) -> Result<Self> {
        LoanQuote::new(raw.principal, raw.annual_rate_percent, raw.tenure_months)
    }
}

impl LoanQuote {
    pub fn new(principal: Decimal, annual_rate_percent: Decimal, tenure_months: u32) -> Result<Self> {
        if principal <= Decimal::ZERO {
            return Err(EmiError::invalid("principal", format!("must be positive, got {principal}")));
        }
        if annual_rate_percent <= Decimal::ZERO {
            return Err(EmiError::invalid(
                "annual_rate_percent",
                format!("must be positive, got {annual_rate_percent}"),
            ));
        }
        if tenure_months < 1 {
            return Err(EmiError::invalid("tenure_months", "must be at least 1 month"));
        }
        Ok(Self { principal, annual_rate_percent, tenure_months })
    }

    pub fn principal(&self) -> Decimal {
        self.principal
    }

    pub fn annual_rate_percent(&self) -> Decimal {
        self.annual_rate_percent
    }

    pub fn tenure_months(&self) -> u32 {
        self.tenure_months
    }

    /// Копия с другой суммой; проверки те же, что и в [`LoanQuote::new`].
    pub fn with_principal(&self, principal: Decimal) -> Result<Self> {
        Self::new(principal, self.annual_rate_percent, self.tenure_months)
    }

    pub fn with_rate(&self, annual_rate_percent: Decimal) -> Result<Self> {
        Self::new(self.principal, annual_rate_percent, self.tenure_months)
    }

    pub fn with_tenure(&self, tenure_months: u32) -> Result<Self> {
        Self::new(self.principal, self.annual_rate_percent, tenure_months)
    }

    pub fn amortize(&self) -> Result<AmortizationResult> {
        crate::emi::amortize(self)
    }
}

/// Точные (неокруглённые) значения расчёта для дальнейших вычислений.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ExactAmortization {
    pub monthly_rate: f64,
    pub monthly_installment: f64,
    pub total_payment: f64,
    pub total_interest: f64,
}

/// Результат расчёта: суммы округлены до целых единиц валюты для показа,
/// доли — до целого процента, каждая независимо.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AmortizationResult {
    pub monthly_installment: Decimal,
    pub total_payment: Decimal,
    pub total_interest: Decimal,
    pub principal_share: u8,
    pub interest_share: u8,
    pub exact: ExactAmortization,
}

/// Всё, что нужно форматам вывода для одной заявки на расчёт.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    pub quote: LoanQuote,
    pub result: AmortizationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<Installment>>,
}

impl Report {
    pub fn new(quote: LoanQuote) -> Result<Self> {
        Ok(Self { product: None, quote, result: quote.amortize()?, schedule: None })
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn with_schedule(mut self) -> Result<Self> {
        self.schedule = Some(crate::schedule::AmortizationSchedule::new(&self.quote)?.collect());
        Ok(self)
    }
}
