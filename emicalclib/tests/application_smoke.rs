use chrono::NaiveDate;
use emicalclib::{
    application::{ApplicationForm, ApplicationStatus, TrackQuery, Wizard, WizardStep},
    EmiError,
};

fn form_from_json() -> ApplicationForm {
    serde_json::from_str(
        r#"{
            "applicant_name": "Lakshmi Devi",
            "mobile_number": "9443012345",
            "aadhaar_number": "987654321098",
            "product_type": "Mini_Dairy",
            "loan_amount": "400000",
            "state": "Kerala",
            "district": "Palakkad"
        }"#,
    )
    .expect("form json")
}

#[test]
fn wizard_walks_all_steps_and_submits() {
    let mut w = Wizard::new(form_from_json()).unwrap();
    assert_eq!(w.step().progress_percent(), 20);
    w.next().unwrap();
    w.next().unwrap();
    assert_eq!(w.next().unwrap(), WizardStep::Documents);

    let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let app = w.submit(today, &mut rand::thread_rng()).unwrap();
    assert_eq!(app.status, ApplicationStatus::Submitted);
    assert_eq!(w.step(), WizardStep::Done);

    let id = app.application_id.to_string();
    let q = TrackQuery::by_id(&id.to_lowercase()).unwrap();
    assert!(q.matches(&app));
}

#[test]
fn submit_checks_every_step() {
    let mut form = form_from_json();
    form.aadhaar_number = "12".into();
    form.state = "Atlantis".into();
    let mut w = Wizard::new(form).unwrap();
    let err = w.submit(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(), &mut rand::thread_rng()).unwrap_err();
    let EmiError::Validation(errs) = err else { panic!("expected validation error, got {err}") };
    assert_eq!(errs.fields().collect::<Vec<_>>(), vec!["aadhaar_number", "state"]);
    assert_eq!(errs.get("state"), Some("Please select state"));
}
