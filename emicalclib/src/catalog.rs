//! Каталог кредитных продуктов и границы ползунков калькулятора.

use crate::{
    error::{EmiError, Result},
    model::LoanQuote,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoanProduct {
    pub id: String,
    pub name: String,
    pub min_rate: Decimal,
    pub max_rate: Decimal,
    pub max_amount: Decimal,
    pub max_tenure: u32,
}

impl LoanProduct {
    /// Выбор продукта: ставка сбрасывается на минимальную, сумма и срок
    /// урезаются до лимитов продукта.
    pub fn apply(&self, quote: &LoanQuote) -> Result<LoanQuote> {
        LoanQuote::new(
            quote.principal().min(self.max_amount),
            self.min_rate,
            quote.tenure_months().min(self.max_tenure),
        )
    }

    pub fn bounds(&self) -> SliderBounds {
        SliderBounds::for_product(Some(self))
    }

    fn check(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(EmiError::invalid("id", "product id is empty"));
        }
        if self.min_rate <= Decimal::ZERO || self.min_rate > self.max_rate {
            return Err(EmiError::invalid(
                "min_rate",
                format!("{}: rate range {}..{} is empty", self.id, self.min_rate, self.max_rate),
            ));
        }
        if self.max_amount <= Decimal::ZERO {
            return Err(EmiError::invalid("max_amount", format!("{}: must be positive", self.id)));
        }
        if self.max_tenure < 1 {
            return Err(EmiError::invalid("max_tenure", format!("{}: must be at least 1", self.id)));
        }
        Ok(())
    }
}

fn product(id: &str, name: &str, min_rate: Decimal, max_rate: Decimal, max_amount: i64, max_tenure: u32) -> LoanProduct {
    LoanProduct {
        id: id.into(),
        name: name.into(),
        min_rate,
        max_rate,
        max_amount: Decimal::from(max_amount),
        max_tenure,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    products: Vec<LoanProduct>,
}

impl Catalog {
    /// Продукты, для которых калькулятор знает ставки и лимиты.
    pub fn builtin() -> Self {
        let pct = |whole: i64, tenths: u32| Decimal::new(whole * 10 + i64::from(tenths), 1).normalize();
        Self {
            products: vec![
                product("Kisan_Credit_Card", "Kisan Credit Card", pct(9, 0), pct(11, 5), 300_000, 12),
                product("Tractor_Loan", "Tractor Loan", pct(10, 0), pct(12, 0), 1_500_000, 108),
                product("Agri_Transport", "Agri Transport", pct(10, 5), pct(12, 5), 25_000_000, 84),
                product("Banana_Cultivation", "Banana Cultivation", pct(9, 5), pct(11, 0), 1_000_000, 60),
                product("Mini_Dairy", "Mini Dairy", pct(10, 0), pct(12, 0), 1_000_000, 60),
                product("Commercial_Dairy", "Commercial Dairy", pct(10, 0), pct(12, 0), 250_000_000, 84),
                product("Poultry_Broiler", "Poultry Farm - Broiler", pct(10, 5), pct(12, 0), 250_000_000, 84),
                product("Rice_Mill_Loan", "Rice Mill Loan", pct(11, 0), pct(13, 0), 50_000_000, 120),
                product("Composite_Fish_Farm", "Composite Fish Farm", pct(10, 0), pct(12, 0), 10_000_000, 96),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&LoanProduct> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&LoanProduct> {
        self.get(id).ok_or_else(|| EmiError::UnknownProduct(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoanProduct> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Добавляет продукт или заменяет существующий с тем же `id`.
    pub fn upsert(&mut self, product: LoanProduct) -> Result<()> {
        product.check()?;
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => {
                tracing::debug!(id = %product.id, "overriding catalog product");
                *slot = product;
            }
            None => {
                tracing::debug!(id = %product.id, "adding catalog product");
                self.products.push(product);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
    pub step: T,
}

impl<T: PartialOrd + Copy> Range<T> {
    pub fn contains(&self, v: T) -> bool {
        self.min <= v && v <= self.max
    }
}

/// Границы ползунков суммы, ставки и срока; без продукта — общие значения по умолчанию.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct SliderBounds {
    pub amount: Range<Decimal>,
    pub rate: Range<Decimal>,
    pub tenure: Range<u32>,
}

impl SliderBounds {
    pub const MIN_AMOUNT: i64 = 50_000;
    pub const DEFAULT_MAX_AMOUNT: i64 = 10_000_000;
    pub const MIN_TENURE: u32 = 6;
    pub const DEFAULT_MAX_TENURE: u32 = 120;

    pub fn for_product(product: Option<&LoanProduct>) -> Self {
        Self {
            amount: Range {
                min: Decimal::from(Self::MIN_AMOUNT),
                max: product.map_or(Decimal::from(Self::DEFAULT_MAX_AMOUNT), |p| p.max_amount),
                step: Decimal::from(10_000),
            },
            rate: Range {
                min: product.map_or(Decimal::from(8), |p| p.min_rate),
                max: product.map_or(Decimal::from(15), |p| p.max_rate),
                step: Decimal::new(1, 1),
            },
            tenure: Range {
                min: Self::MIN_TENURE,
                max: product.map_or(Self::DEFAULT_MAX_TENURE, |p| p.max_tenure),
                step: 6,
            },
        }
    }

    pub fn check(&self, quote: &LoanQuote) -> Result<()> {
        if !self.amount.contains(quote.principal()) {
            return Err(EmiError::invalid(
                "principal",
                format!("{} is outside {}..={}", quote.principal(), self.amount.min, self.amount.max),
            ));
        }
        if !self.rate.contains(quote.annual_rate_percent()) {
            return Err(EmiError::invalid(
                "annual_rate_percent",
                format!("{} is outside {}..={}", quote.annual_rate_percent(), self.rate.min, self.rate.max),
            ));
        }
        if !self.tenure.contains(quote.tenure_months()) {
            return Err(EmiError::invalid(
                "tenure_months",
                format!("{} is outside {}..={}", quote.tenure_months(), self.tenure.min, self.tenure.max),
            ));
        }
        Ok(())
    }
}
