//! CSV: пакетный ввод и сводка / график на выходе.
//!
//! Вход: `principal,annual_rate_percent,tenure_months[,product]`.
//! Сводка: `product,principal,annual_rate_percent,tenure_months,monthly_installment,total_payment,total_interest,principal_share,interest_share`.
//! График: `quote,month,opening_balance,payment,interest,principal,closing_balance`.
//! Заявки: колонки [`APPLICATION_HEADERS`], все значения в кавычках.

use crate::{
    application::SubmittedApplication,
    error::{EmiError, Result},
    model::{LoanQuote, Report},
    traits::{QuoteRow, ReadQuotes, WriteReport},
};
use chrono::NaiveDate;
use csv::{QuoteStyle, ReaderBuilder, Trim, WriterBuilder};
use rust_decimal::Decimal;
use std::io::{BufRead, Write};

#[derive(serde::Deserialize)]
struct CsvRow {
    principal: String,
    annual_rate_percent: String,
    tenure_months: String,
    #[serde(default)]
    product: Option<String>,
}

#[derive(serde::Serialize)]
struct CsvOutRow<'a> {
    product: Option<&'a str>,
    principal: Decimal,
    annual_rate_percent: Decimal,
    tenure_months: u32,
    monthly_installment: Decimal,
    total_payment: Decimal,
    total_interest: Decimal,
    principal_share: u8,
    interest_share: u8,
}

#[derive(serde::Serialize)]
struct ScheduleOutRow {
    quote: usize,
    month: u32,
    opening_balance: String,
    payment: String,
    interest: String,
    principal: String,
    closing_balance: String,
}

pub struct Csv;

impl ReadQuotes for Csv {
    fn read<R: BufRead>(r: R) -> Result<Vec<QuoteRow>> {
        let mut rdr = ReaderBuilder::new().flexible(true).trim(Trim::All).from_reader(r);
        let mut rows = Vec::new();

        for (i, rec) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = rec?;
            // строка 1 — заголовок
            let line = i as u64 + 2;

            let principal = row
                .principal
                .parse::<Decimal>()
                .map_err(|e| EmiError::Parse(format!("line {line}: principal: {e}")))?;
            let rate = row
                .annual_rate_percent
                .parse::<Decimal>()
                .map_err(|e| EmiError::Parse(format!("line {line}: annual_rate_percent: {e}")))?;
            let tenure = parse_tenure(&row.tenure_months)?;

            rows.push(QuoteRow {
                line,
                product: row.product.filter(|p| !p.is_empty()),
                quote: LoanQuote::new(principal, rate, tenure)?,
            });
        }

        tracing::debug!(rows = rows.len(), "quotes read from csv");
        Ok(rows)
    }
}

impl WriteReport for Csv {
    fn write<W: Write>(mut w: W, reports: &[Report]) -> Result<()> {
        let mut wrt = WriterBuilder::new().from_writer(&mut w);

        for rep in reports {
            wrt.serialize(CsvOutRow {
                product: rep.product.as_deref(),
                principal: rep.quote.principal(),
                annual_rate_percent: rep.quote.annual_rate_percent(),
                tenure_months: rep.quote.tenure_months(),
                monthly_installment: rep.result.monthly_installment,
                total_payment: rep.result.total_payment,
                total_interest: rep.result.total_interest,
                principal_share: rep.result.principal_share,
                interest_share: rep.result.interest_share,
            })?;
        }
        wrt.flush()?;
        Ok(())
    }
}

/// Помесячный график; отчёты без графика пропускаются.
pub struct ScheduleCsv;

impl WriteReport for ScheduleCsv {
    fn write<W: Write>(mut w: W, reports: &[Report]) -> Result<()> {
        let mut wrt = WriterBuilder::new().from_writer(&mut w);
        let cents = |v: f64| format!("{v:.2}");

        for (idx, rep) in reports.iter().enumerate() {
            for row in rep.schedule.iter().flatten() {
                wrt.serialize(ScheduleOutRow {
                    quote: idx + 1,
                    month: row.month,
                    opening_balance: cents(row.opening_balance),
                    payment: cents(row.payment),
                    interest: cents(row.interest),
                    principal: cents(row.principal),
                    closing_balance: cents(row.closing_balance),
                })?;
            }
        }
        wrt.flush()?;
        Ok(())
    }
}

pub const APPLICATION_HEADERS: [&str; 16] = [
    "application_id",
    "applicant_name",
    "mobile_number",
    "email",
    "aadhaar_number",
    "product_type",
    "loan_amount",
    "crop_type",
    "land_area",
    "state",
    "district",
    "village",
    "status",
    "status_remarks",
    "created_date",
    "updated_date",
];

/// Выгрузка заявок для администратора. Пустой список даёт пустой файл,
/// без заголовка.
pub struct ApplicationsCsv;

impl ApplicationsCsv {
    pub fn file_name(today: NaiveDate) -> String {
        format!("TMB_Loan_Applications_{}.csv", today.format("%Y-%m-%d"))
    }

    pub fn write<W: Write>(mut w: W, apps: &[SubmittedApplication]) -> Result<()> {
        if apps.is_empty() {
            return Ok(());
        }
        // заголовок без кавычек, значения всегда в кавычках
        writeln!(w, "{}", APPLICATION_HEADERS.join(","))?;

        let mut wrt = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Always)
            .from_writer(&mut w);
        for app in apps {
            let f = &app.form;
            let loan_amount = app.loan_amount.to_string();
            let land_area = app.land_area.map(|a| a.to_string()).unwrap_or_default();
            let created = app.submitted_on.to_string();
            let updated = app.updated_on.unwrap_or(app.submitted_on).to_string();
            let id = app.application_id.to_string();
            wrt.write_record([
                id.as_str(),
                f.applicant_name.as_str(),
                f.mobile_number.as_str(),
                f.email.as_str(),
                f.aadhaar_number.as_str(),
                f.product_type.as_str(),
                loan_amount.as_str(),
                f.crop_type.as_str(),
                land_area.as_str(),
                f.state.as_str(),
                f.district.as_str(),
                f.village.as_str(),
                app.status.key(),
                app.status_remarks.as_str(),
                created.as_str(),
                updated.as_str(),
            ])?;
        }
        wrt.flush()?;
        tracing::debug!(rows = apps.len(), "applications exported");
        Ok(())
    }
}

/// Срок — только целое число месяцев; `12.5` отвергается как неверный ввод.
pub fn parse_tenure(s: &str) -> Result<u32> {
    let s = s.trim();
    s.parse::<u32>().map_err(|_| {
        EmiError::invalid("tenure_months", format!("`{s}` is not a whole number of months"))
    })
}
