mod config;

use anyhow::{bail, Context};
use clap::{ArgAction, Args, Parser, Subcommand};
use config::Fmt;
use emicalclib::{
    application::{ApplicationForm, ApplicationStatus, FormValidator, SubmittedApplication, WizardStep},
    catalog::{Catalog, SliderBounds},
    formats::{
        csv::{parse_tenure, ApplicationsCsv, Csv, ScheduleCsv},
        json::Json,
        text::Text,
    },
    model::{LoanQuote, Report},
    money::format_inr,
    traits::{ReadQuotes, WriteReport},
};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "emicalc", version, about = "Расчёт EMI и проверка заявок по агрокредитам")]
struct Cli {
    /// Файл конфигурации TOML (по умолчанию ./emicalc.toml)
    #[arg(long, global = true, env = "EMICALC_CONFIG")]
    config: Option<PathBuf>,

    /// Подробнее в лог: -v debug, -vv trace
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct QuoteArgs {
    /// Сумма кредита
    #[arg(short = 'a', long, default_value = "500000")]
    amount: Decimal,

    /// Годовая ставка, %; с --product по умолчанию минимальная ставка продукта
    #[arg(short = 'r', long)]
    rate: Option<Decimal>,

    /// Срок в месяцах
    #[arg(short = 't', long, default_value = "36", value_parser = tenure_arg)]
    tenure: u32,

    /// Кредитный продукт из каталога (см. `emicalc products`)
    #[arg(short = 'p', long)]
    product: Option<String>,

    /// Формат вывода
    #[arg(long = "format", value_enum)]
    format: Option<Fmt>,

    /// Выходной файл (по умолчанию stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ежемесячный платёж, переплата и доли
    Calc(QuoteArgs),

    /// Помесячный график погашения
    Schedule(QuoteArgs),

    /// Каталог продуктов и границы параметров
    Products,

    /// Пакетный расчёт из CSV
    Batch {
        /// Входной файл (по умолчанию stdin)
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Выходной файл (по умолчанию stdout)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        #[arg(long = "format", value_enum)]
        format: Option<Fmt>,

        /// Добавить помесячный график
        #[arg(long)]
        schedule: bool,
    },

    /// Проверка заявки (JSON) по правилам мастера
    Validate {
        /// Файл заявки (по умолчанию stdin)
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Проверить только один шаг (1..=3)
        #[arg(long)]
        step: Option<u8>,
    },

    /// Прогресс заявки по статусу
    Status { status: String },

    /// Выгрузка поданных заявок (JSON-массив) в CSV
    Export {
        /// Файл заявок (по умолчанию stdin)
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Выходной файл (по умолчанию stdout)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
}

fn tenure_arg(s: &str) -> Result<u32, String> {
    parse_tenure(s).map_err(|e| e.to_string())
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir().context("current directory")?;
    let config_path = config::resolve_path(cli.config.clone(), &cwd);
    let cfg = config::load_or_default(config_path.as_deref())?;

    let mut stdout = io::stdout();
    run(cli.command, &cfg, &mut stdout)?;
    stdout.flush().context("flushing stdout")
}

fn run(command: Command, cfg: &config::Config, stdout: &mut dyn Write) -> anyhow::Result<()> {
    let catalog = cfg.catalog()?;

    match command {
        Command::Calc(args) => {
            let report = quote_report(&catalog, &args)?;
            emit(args.output, stdout, args.format.unwrap_or(cfg.default_format), false, &[report])
        }
        Command::Schedule(args) => {
            let report = quote_report(&catalog, &args)?.with_schedule()?;
            emit(args.output, stdout, args.format.unwrap_or(cfg.default_format), true, &[report])
        }
        Command::Products => list_products(&catalog, stdout),
        Command::Batch { input, output, format, schedule } => {
            let reader: Box<dyn Read> = match input {
                Some(path) => Box::new(File::open(&path).with_context(|| format!("opening {}", path.display()))?),
                None => Box::new(io::stdin()),
            };
            let rows = Csv::read(BufReader::new(reader))?;

            let mut reports = Vec::with_capacity(rows.len());
            for row in rows {
                let mut report = Report::new(row.quote).with_context(|| format!("line {}", row.line))?;
                if let Some(id) = row.product {
                    let name = catalog.get(&id).map_or(id.clone(), |p| p.name.clone());
                    report = report.with_product(name);
                }
                if schedule {
                    report = report.with_schedule().with_context(|| format!("line {}", row.line))?;
                }
                reports.push(report);
            }
            tracing::info!(quotes = reports.len(), "batch computed");
            emit(output, stdout, format.unwrap_or(cfg.default_format), schedule, &reports)
        }
        Command::Validate { input, step } => {
            let reader: Box<dyn Read> = match input {
                Some(path) => Box::new(File::open(&path).with_context(|| format!("opening {}", path.display()))?),
                None => Box::new(io::stdin()),
            };
            let form: ApplicationForm = serde_json::from_reader(BufReader::new(reader)).context("reading application form")?;
            validate(&form, step, stdout)
        }
        Command::Export { input, output } => {
            let reader: Box<dyn Read> = match input {
                Some(path) => Box::new(File::open(&path).with_context(|| format!("opening {}", path.display()))?),
                None => Box::new(io::stdin()),
            };
            let apps: Vec<SubmittedApplication> =
                serde_json::from_reader(BufReader::new(reader)).context("reading applications")?;
            let mut file;
            let w: &mut dyn Write = match output {
                Some(path) => {
                    file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
                    &mut file
                }
                None => stdout,
            };
            ApplicationsCsv::write(&mut *w, &apps)?;
            w.flush()?;
            tracing::info!(applications = apps.len(), "applications exported");
            Ok(())
        }
        Command::Status { status } => {
            let status: ApplicationStatus = status.parse()?;
            match status.progress_percent() {
                Some(pct) => writeln!(stdout, "{} ({pct}%)", status.label())?,
                None => writeln!(stdout, "{}", status.label())?,
            }
            Ok(())
        }
    }
}

fn quote_report(catalog: &Catalog, args: &QuoteArgs) -> anyhow::Result<Report> {
    let default_rate = Decimal::from(10);
    let mut quote = LoanQuote::new(args.amount, args.rate.unwrap_or(default_rate), args.tenure)?;

    let Some(id) = args.product.as_deref() else {
        return Ok(Report::new(quote)?);
    };
    let product = catalog.require(id)?;
    quote = product.apply(&quote)?;
    if let Some(rate) = args.rate {
        quote = quote.with_rate(rate)?;
    }
    if quote.principal() != args.amount || quote.tenure_months() != args.tenure {
        tracing::warn!(
            product = %product.id,
            amount = %quote.principal(),
            tenure = quote.tenure_months(),
            "amount or tenure clamped to product limits"
        );
    }
    product.bounds().check(&quote)?;
    Ok(Report::new(quote)?.with_product(product.name.clone()))
}

fn emit(
    output: Option<PathBuf>,
    stdout: &mut dyn Write,
    format: Fmt,
    schedule: bool,
    reports: &[Report],
) -> anyhow::Result<()> {
    let mut file;
    let w: &mut dyn Write = match output {
        Some(path) => {
            file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            &mut file
        }
        None => stdout,
    };

    match (format, schedule) {
        (Fmt::Text, _) => Text::write(&mut *w, reports),
        (Fmt::Json, _) => Json::write(&mut *w, reports),
        (Fmt::Csv, false) => Csv::write(&mut *w, reports),
        (Fmt::Csv, true) => ScheduleCsv::write(&mut *w, reports),
    }?;
    w.flush()?;
    Ok(())
}

fn list_products(catalog: &Catalog, out: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(out, "{:<22}{:<26}{:>14}{:>16}{:>10}", "id", "name", "rate, %", "max amount", "months")?;
    for p in catalog.iter() {
        let b = p.bounds();
        writeln!(
            out,
            "{:<22}{:<26}{:>14}{:>16}{:>10}",
            p.id,
            p.name,
            format!("{}-{}", b.rate.min.normalize(), b.rate.max.normalize()),
            format_inr(b.amount.max),
            format!("{}-{}", b.tenure.min, b.tenure.max),
        )?;
    }
    let d = SliderBounds::for_product(None);
    writeln!(
        out,
        "{:<22}{:<26}{:>14}{:>16}{:>10}",
        "-",
        "(no product)",
        format!("{}-{}", d.rate.min, d.rate.max),
        format_inr(d.amount.max),
        format!("{}-{}", d.tenure.min, d.tenure.max),
    )?;
    Ok(())
}

fn validate(form: &ApplicationForm, step: Option<u8>, out: &mut dyn Write) -> anyhow::Result<()> {
    let validator = FormValidator::new()?;
    let checked = match step {
        Some(n) => {
            let Some(step) = WizardStep::from_number(n) else {
                bail!("step must be between 1 and {}", WizardStep::COUNT);
            };
            validator.check_step(form, step)
        }
        None => validator.check_all(form),
    };

    match checked {
        Ok(()) => {
            writeln!(out, "ok")?;
            Ok(())
        }
        Err(errs) => {
            for field in errs.fields() {
                writeln!(out, "{field}: {}", errs.get(field).unwrap_or_default())?;
            }
            bail!("{} field(s) failed validation", errs.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn run_args(args: &[&str]) -> anyhow::Result<String> {
        let cli = Cli::try_parse_from(args)?;
        let mut out = Vec::new();
        run(cli.command, &config::Config::default(), &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn calc_defaults_match_calculator_start_state() {
        let out = run_args(&["emicalc", "calc"]).unwrap();
        assert!(out.contains("₹16,134"), "{out}");
    }

    #[test]
    fn calc_with_product_clamps_and_uses_min_rate() {
        let out = run_args(&["emicalc", "calc", "-p", "Kisan_Credit_Card", "--format", "json"]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v[0]["quote"]["principal"], "300000");
        assert_eq!(v[0]["quote"]["annual_rate_percent"], "9");
        assert_eq!(v[0]["quote"]["tenure_months"], 12);
    }

    #[test]
    fn rate_outside_product_range_is_rejected() {
        let err = run_args(&["emicalc", "calc", "-p", "Tractor_Loan", "-r", "15"]).unwrap_err();
        assert!(err.to_string().contains("annual_rate_percent"), "{err}");
    }

    #[test]
    fn fractional_tenure_rejected_by_parser() {
        assert!(Cli::try_parse_from(["emicalc", "calc", "-t", "12.5"]).is_err());
    }

    #[test]
    fn schedule_csv_output() {
        let out = run_args(&["emicalc", "schedule", "-a", "60000", "-r", "12", "-t", "6", "--format", "csv"]).unwrap();
        assert_eq!(out.lines().count(), 7);
    }

    #[test]
    fn products_lists_catalog() {
        let out = run_args(&["emicalc", "products"]).unwrap();
        assert!(out.contains("Rice_Mill_Loan"));
        assert!(out.contains("11-13"));
    }

    #[test]
    fn status_progress_line() {
        assert_eq!(run_args(&["emicalc", "status", "Approved"]).unwrap().trim(), "Approved (75%)");
        assert_eq!(run_args(&["emicalc", "status", "rejected"]).unwrap().trim(), "Rejected");
    }

    #[test]
    fn validate_reports_fields() {
        let form = ApplicationForm { mobile_number: "123".into(), ..Default::default() };
        let mut out = Vec::new();
        assert!(validate(&form, Some(1), &mut out).is_err());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("mobile_number: Please enter a valid 10-digit mobile number"));
        assert!(validate(&form, Some(9), &mut Vec::new()).is_err());
    }

    #[test]
    fn batch_from_file_names_products() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("quotes.csv");
        std::fs::write(&path, "principal,annual_rate_percent,tenure_months,product\n500000,10,36,Mini_Dairy\n").unwrap();
        let out = run_args(&["emicalc", "batch", "-i", path.to_str().unwrap(), "--format", "csv"]).unwrap();
        assert!(out.lines().nth(1).unwrap().starts_with("Mini Dairy,500000,10,36,16134,"), "{out}");
    }

    #[test]
    fn export_writes_applications_csv() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("applications.json");
        std::fs::write(
            &path,
            r#"[{
                "application_id": "TMB-AG-2026-4821",
                "status": "Documents_Verified",
                "submitted_on": "2026-05-02",
                "loan_amount": "250000",
                "land_area": null,
                "status_remarks": "Verified at branch",
                "form": {
                    "applicant_name": "Kavitha R",
                    "mobile_number": "9843011223",
                    "aadhaar_number": "456745674567",
                    "product_type": "Tractor_Loan",
                    "loan_amount": "250000",
                    "state": "Tamil Nadu",
                    "district": "Erode"
                }
            }]"#,
        )
        .unwrap();
        let out = run_args(&["emicalc", "export", "-i", path.to_str().unwrap()]).unwrap();
        let mut lines = out.lines();
        assert!(lines.next().unwrap().starts_with("application_id,applicant_name,"));
        let row = lines.next().unwrap();
        assert!(row.starts_with(r#""TMB-AG-2026-4821","Kavitha R","9843011223","""#), "{row}");
        assert!(row.ends_with(r#""Documents_Verified","Verified at branch","2026-05-02","2026-05-02""#), "{row}");
    }

    #[test]
    fn quote_report_without_product() {
        let cli = Cli::try_parse_from(["emicalc", "calc", "-a", "120000", "-r", "0.0000001", "-t", "12"]).unwrap();
        let Command::Calc(args) = cli.command else { panic!("expected calc") };
        let report = quote_report(&Catalog::builtin(), &args).unwrap();
        assert_eq!(report.result.monthly_installment, dec!(10000));
    }
}
