use emicalclib::{
    formats::{csv::Csv, text::Text},
    model::Report,
    traits::{ReadQuotes, WriteReport},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Пример: пакет расчётов из CSV (stdin) -> текстовый отчёт (stdout)
    let rows = Csv::read(std::io::BufReader::new(std::io::stdin()))?;
    let reports = rows
        .into_iter()
        .map(|row| Report::new(row.quote))
        .collect::<Result<Vec<_>, _>>()?;
    Text::write(std::io::stdout(), &reports)?;
    Ok(())
}
