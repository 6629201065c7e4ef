//! Текстовый отчёт для терминала.

use crate::{
    error::Result,
    model::Report,
    money::{format_inr, format_inr_full},
    traits::WriteReport,
};
use std::io::Write;

pub struct Text;

impl WriteReport for Text {
    fn write<W: Write>(mut w: W, reports: &[Report]) -> Result<()> {
        for (i, rep) in reports.iter().enumerate() {
            if i > 0 {
                writeln!(w)?;
            }
            let q = &rep.quote;
            let r = &rep.result;

            if let Some(p) = &rep.product {
                writeln!(w, "{:<16}{p}", "Product")?;
            }
            writeln!(w, "{:<16}{}", "Principal", format_inr(q.principal()))?;
            writeln!(w, "{:<16}{}% p.a.", "Interest rate", q.annual_rate_percent().normalize())?;
            writeln!(
                w,
                "{:<16}{} months ({:.1} yrs)",
                "Tenure",
                q.tenure_months(),
                f64::from(q.tenure_months()) / 12.0
            )?;
            writeln!(w, "{:<16}{}", "Monthly EMI", format_inr_full(r.monthly_installment))?;
            writeln!(w, "{:<16}{}", "Total interest", format_inr(r.total_interest))?;
            writeln!(w, "{:<16}{}", "Total payment", format_inr(r.total_payment))?;
            writeln!(
                w,
                "{:<16}principal {}% / interest {}%",
                "Breakdown", r.principal_share, r.interest_share
            )?;

            if let Some(rows) = &rep.schedule {
                writeln!(w)?;
                writeln!(
                    w,
                    "{:>5} {:>14} {:>12} {:>12} {:>12} {:>14}",
                    "month", "opening", "payment", "interest", "principal", "closing"
                )?;
                for row in rows {
                    writeln!(
                        w,
                        "{:>5} {:>14.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
                        row.month,
                        row.opening_balance,
                        row.payment,
                        row.interest,
                        row.principal,
                        row.closing_balance
                    )?;
                }
            }
        }
        Ok(())
    }
}
