//! Унифицированные трэйты чтения/записи на основе std::io::{BufRead, Write}.

use crate::{
    error::Result,
    model::{LoanQuote, Report},
};
use std::io::{BufRead, Write};

/// Строка пакетного файла: параметры расчёта и, возможно, продукт.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRow {
    pub line: u64,
    pub product: Option<String>,
    pub quote: LoanQuote,
}

pub trait ReadQuotes {
    fn read<R: BufRead>(r: R) -> Result<Vec<QuoteRow>>;
}

pub trait WriteReport {
    fn write<W: Write>(w: W, reports: &[Report]) -> Result<()>;
}
