//! Заявка на кредит: пошаговая проверка полей мастера, номер заявки и статусы.

use crate::error::{EmiError, Result};
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Продукты, которые можно выбрать в заявке (шире, чем каталог калькулятора).
pub const APPLICATION_PRODUCTS: &[(&str, &str)] = &[
    ("Kisan_Credit_Card", "Kisan Credit Card (KCC)"),
    ("Tractor_Loan", "Tractor Loan"),
    ("Agri_Transport", "Agri Transport"),
    ("Banana_Cultivation", "Banana Cultivation"),
    ("Agri_Jewel_Loan", "Gold Overdraft (Agri)"),
    ("Rice_Mill_Loan", "Rice Mill Loan"),
    ("Dhall_Mill_Loan", "Dhall Mill Loan"),
    ("Poultry_Broiler", "Poultry Farm - Broiler"),
    ("Poultry_Layer", "Poultry Farm - Layer"),
    ("Mini_Dairy", "Mini Dairy Loan"),
    ("Commercial_Dairy", "Commercial Dairy Loan"),
    ("Brackish_Water_Shrimp", "Brackish Water Shrimp Farm"),
    ("Composite_Fish_Farm", "Composite Fish Farm"),
    ("Gold_Overdraft_Agri", "Gold Overdraft Agri"),
    ("Bhoomi_Heen_Kisan", "Bhoomi Heen Kisan"),
    ("Genset_Loan", "Genset Loan"),
];

pub const STATES: &[&str] = &[
    "Tamil Nadu",
    "Andhra Pradesh",
    "Karnataka",
    "Kerala",
    "Maharashtra",
    "Gujarat",
    "Rajasthan",
    "Madhya Pradesh",
    "Uttar Pradesh",
    "Bihar",
    "Punjab",
    "Haryana",
    "Telangana",
    "Odisha",
    "West Bengal",
];

pub fn product_name(id: &str) -> Option<&'static str> {
    APPLICATION_PRODUCTS.iter().find(|(pid, _)| *pid == id).map(|(_, name)| *name)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub doc_type: String,
    pub doc_url: String,
}

/// Поля формы как их вводит пользователь: строки, пустая строка = не заполнено.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApplicationForm {
    pub applicant_name: String,
    pub mobile_number: String,
    pub email: String,
    pub aadhaar_number: String,
    pub product_type: String,
    pub loan_amount: String,
    pub crop_type: String,
    pub land_area: String,
    pub land_survey_number: String,
    pub village: String,
    pub district: String,
    pub state: String,
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Applicant = 1,
    Loan = 2,
    Location = 3,
    Documents = 4,
    Done = 5,
}

impl WizardStep {
    pub const COUNT: u8 = 5;

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Applicant),
            2 => Some(Self::Loan),
            3 => Some(Self::Location),
            4 => Some(Self::Documents),
            5 => Some(Self::Done),
            _ => None,
        }
    }

    fn next(self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(Self::Done)
    }

    fn prev(self) -> Self {
        Self::from_number(self.number().saturating_sub(1)).unwrap_or(Self::Applicant)
    }

    /// Прогресс мастера в процентах.
    pub fn progress_percent(self) -> u8 {
        self.number() * 100 / Self::COUNT
    }
}

/// Ошибки по полям: имя поля -> сообщение для пользователя.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    fn add(&mut self, field: &'static str, message: &str) {
        self.0.insert(field, message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, msg)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {msg}")?;
        }
        Ok(())
    }
}

/// Скомпилированные правила проверки полей.
#[derive(Debug, Clone)]
pub struct FormValidator {
    name: Regex,
    mobile: Regex,
    email: Regex,
    aadhaar: Regex,
}

impl FormValidator {
    pub fn new() -> Result<Self> {
        let re = |p: &str| Regex::new(p).map_err(|e| EmiError::Parse(e.to_string()));
        Ok(Self {
            name: re(r"^[a-zA-Z\s]+$")?,
            // только ASCII: `\d` в regex совпадает с любыми юникодными цифрами
            mobile: re(r"^[0-9]{10}$")?,
            email: re(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")?,
            aadhaar: re(r"^[0-9]{12}$")?,
        })
    }

    /// Проверяет только поля указанного шага.
    pub fn check_step(&self, form: &ApplicationForm, step: WizardStep) -> std::result::Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::default();

        match step {
            WizardStep::Applicant => {
                if !self.name.is_match(&form.applicant_name) {
                    errs.add("applicant_name", "Please enter a valid name (letters only)");
                }
                if !self.mobile.is_match(&form.mobile_number) {
                    errs.add("mobile_number", "Please enter a valid 10-digit mobile number");
                }
                // email необязателен
                if !form.email.is_empty() && !self.email.is_match(&form.email) {
                    errs.add("email", "Please enter a valid email address");
                }
                if !self.aadhaar.is_match(&form.aadhaar_number) {
                    errs.add("aadhaar_number", "Please enter a valid 12-digit Aadhaar number");
                }
            }
            WizardStep::Loan => {
                if product_name(&form.product_type).is_none() {
                    errs.add("product_type", "Please select a loan product");
                }
                match form.loan_amount.trim().parse::<Decimal>() {
                    Ok(v) if v > Decimal::ZERO => {}
                    _ => errs.add("loan_amount", "Please enter loan amount"),
                }
            }
            WizardStep::Location => {
                if form.state.is_empty() || !STATES.contains(&form.state.as_str()) {
                    errs.add("state", "Please select state");
                }
                if form.district.trim().is_empty() {
                    errs.add("district", "Please enter district");
                }
            }
            WizardStep::Documents | WizardStep::Done => {}
        }

        if errs.is_empty() {
            Ok(())
        } else {
            tracing::debug!(step = step.number(), errors = %errs, "application step rejected");
            Err(errs)
        }
    }

    /// Все шаги, которые имеют правила, разом.
    pub fn check_all(&self, form: &ApplicationForm) -> std::result::Result<(), ValidationErrors> {
        let mut all = ValidationErrors::default();
        for step in [WizardStep::Applicant, WizardStep::Loan, WizardStep::Location] {
            if let Err(errs) = self.check_step(form, step) {
                all.0.extend(errs.0);
            }
        }
        if all.is_empty() { Ok(()) } else { Err(all) }
    }
}

impl ApplicationForm {
    pub fn validate_step(&self, step: WizardStep) -> Result<()> {
        FormValidator::new()?.check_step(self, step).map_err(EmiError::Validation)
    }

    pub fn validate(&self) -> Result<()> {
        FormValidator::new()?.check_all(self).map_err(EmiError::Validation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApplicationId {
    year: i32,
    serial: u16,
}

impl ApplicationId {
    pub const PREFIX: &'static str = "TMB-AG";

    pub fn new(year: i32, serial: u16) -> Result<Self> {
        if !(1000..=9999).contains(&serial) {
            return Err(EmiError::invalid("application_id", format!("serial {serial} is not 4 digits")));
        }
        if !(1000..=9999).contains(&year) {
            return Err(EmiError::invalid("application_id", format!("year {year} is not 4 digits")));
        }
        Ok(Self { year, serial })
    }

    /// Новый номер на год `today` со случайным четырёхзначным хвостом.
    pub fn generate<R: Rng>(today: NaiveDate, rng: &mut R) -> Result<Self> {
        Self::new(today.year(), rng.gen_range(1000..=9999))
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:04}", Self::PREFIX, self.year, self.serial)
    }
}

impl FromStr for ApplicationId {
    type Err = EmiError;

    // ввод пользователя: регистр не важен, пробелы по краям игнорируются
    fn from_str(s: &str) -> Result<Self> {
        let up = s.trim().to_uppercase();
        let bad = || EmiError::Parse(format!("application id `{}`", s.trim()));
        let rest = up.strip_prefix(Self::PREFIX).and_then(|r| r.strip_prefix('-')).ok_or_else(bad)?;
        let (year, serial) = rest.split_once('-').ok_or_else(bad)?;
        if year.len() != 4 || serial.len() != 4 {
            return Err(bad());
        }
        Self::new(year.parse().map_err(|_| bad())?, serial.parse().map_err(|_| bad())?)
    }
}

impl TryFrom<String> for ApplicationId {
    type Error = EmiError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ApplicationId> for String {
    fn from(id: ApplicationId) -> String {
        id.to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApplicationStatus {
    Submitted,
    #[serde(rename = "Under_Review")]
    UnderReview,
    #[serde(rename = "Documents_Verified")]
    DocumentsVerified,
    Approved,
    Disbursed,
    Rejected,
}

impl ApplicationStatus {
    /// Этапы шкалы прогресса; `Rejected` на шкале не отображается.
    pub const PROGRESS: [ApplicationStatus; 5] = [
        Self::Submitted,
        Self::UnderReview,
        Self::DocumentsVerified,
        Self::Approved,
        Self::Disbursed,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::UnderReview => "Under_Review",
            Self::DocumentsVerified => "Documents_Verified",
            Self::Approved => "Approved",
            Self::Disbursed => "Disbursed",
            Self::Rejected => "Rejected",
        }
    }

    pub fn label(self) -> String {
        self.key().replace('_', " ")
    }

    pub fn progress_index(self) -> Option<usize> {
        Self::PROGRESS.iter().position(|s| *s == self)
    }

    pub fn progress_percent(self) -> Option<u8> {
        self.progress_index().map(|i| (i * 100 / (Self::PROGRESS.len() - 1)) as u8)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Disbursed | Self::Rejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ApplicationStatus {
    type Err = EmiError;

    fn from_str(s: &str) -> Result<Self> {
        let norm = s.trim().replace([' ', '-'], "_").to_ascii_lowercase();
        [Self::Rejected]
            .into_iter()
            .chain(Self::PROGRESS)
            .find(|st| st.key().to_ascii_lowercase() == norm)
            .ok_or_else(|| EmiError::Parse(format!("unknown status `{}`", s.trim())))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmittedApplication {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub submitted_on: NaiveDate,
    pub loan_amount: Decimal,
    pub land_area: Option<Decimal>,
    pub form: ApplicationForm,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status_remarks: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<NaiveDate>,
}

impl SubmittedApplication {
    /// Смена статуса сотрудником банка; замечание заменяет предыдущее.
    pub fn update_status(&mut self, status: ApplicationStatus, remarks: impl Into<String>, today: NaiveDate) {
        tracing::debug!(id = %self.application_id, from = %self.status, to = %status, "status updated");
        self.status = status;
        self.status_remarks = remarks.into();
        self.updated_on = Some(today);
    }
}

/// Пошаговый мастер заявки: вперёд — только после проверки текущего шага.
#[derive(Debug, Clone)]
pub struct Wizard {
    form: ApplicationForm,
    step: WizardStep,
    validator: FormValidator,
}

impl Wizard {
    pub fn new(form: ApplicationForm) -> Result<Self> {
        Ok(Self { form, step: WizardStep::Applicant, validator: FormValidator::new()? })
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn form(&self) -> &ApplicationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ApplicationForm {
        &mut self.form
    }

    pub fn next(&mut self) -> Result<WizardStep> {
        if self.step >= WizardStep::Documents {
            return Err(EmiError::invalid("step", "use submit on the documents step"));
        }
        self.validator.check_step(&self.form, self.step).map_err(EmiError::Validation)?;
        self.step = self.step.next();
        Ok(self.step)
    }

    pub fn back(&mut self) -> WizardStep {
        if self.step != WizardStep::Done {
            self.step = self.step.prev();
        }
        self.step
    }

    /// Проверяет все шаги и оформляет заявку со статусом `Submitted`.
    pub fn submit<R: Rng>(&mut self, today: NaiveDate, rng: &mut R) -> Result<SubmittedApplication> {
        if self.step == WizardStep::Done {
            return Err(EmiError::invalid("step", "application already submitted"));
        }
        self.validator.check_all(&self.form).map_err(EmiError::Validation)?;

        let loan_amount = self
            .form
            .loan_amount
            .trim()
            .parse::<Decimal>()
            .map_err(|e| EmiError::Parse(format!("loan_amount: {e}")))?;
        // площадь необязательна и не проверяется; нечисловое значение не сохраняется
        let land_area = match self.form.land_area.trim() {
            "" => None,
            v => v
                .parse::<Decimal>()
                .inspect_err(|e| tracing::debug!(land_area = v, error = %e, "land area is not a number"))
                .ok(),
        };

        let app = SubmittedApplication {
            application_id: ApplicationId::generate(today, rng)?,
            status: ApplicationStatus::Submitted,
            submitted_on: today,
            loan_amount,
            land_area,
            form: self.form.clone(),
            status_remarks: String::new(),
            updated_on: None,
        };
        self.step = WizardStep::Done;
        tracing::info!(id = %app.application_id, product = %app.form.product_type, "application submitted");
        Ok(app)
    }
}

/// Поиск заявки для отслеживания: по номеру или по телефону.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackQuery {
    ApplicationId(ApplicationId),
    Mobile(String),
}

impl TrackQuery {
    pub fn by_id(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(EmiError::invalid("search", "Please enter a search value"));
        }
        Ok(Self::ApplicationId(input.parse()?))
    }

    pub fn by_mobile(input: &str) -> Result<Self> {
        match input.trim() {
            "" => Err(EmiError::invalid("search", "Please enter a search value")),
            v => Ok(Self::Mobile(v.to_string())),
        }
    }

    pub fn matches(&self, app: &SubmittedApplication) -> bool {
        match self {
            Self::ApplicationId(id) => app.application_id == *id,
            Self::Mobile(m) => app.form.mobile_number == *m,
        }
    }

    /// Самая свежая подходящая заявка.
    pub fn find_latest<'a>(&self, apps: &'a [SubmittedApplication]) -> Option<&'a SubmittedApplication> {
        apps.iter().filter(|a| self.matches(a)).max_by_key(|a| a.submitted_on)
    }
}
