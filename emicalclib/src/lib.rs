//! emicalclib — расчёт аннуитетных платежей (EMI), графики погашения,
//! каталог агрокредитов и правила проверки заявки.

pub mod application;
pub mod catalog;
pub mod emi;
pub mod error;
pub mod model;
pub mod money;
pub mod schedule;
pub mod traits;

pub mod formats {
    pub mod csv;
    pub mod json;
    pub mod text;
}

pub use emi::compute_amortization;
pub use error::{EmiError, Result};
pub use model::{AmortizationResult, LoanQuote};
