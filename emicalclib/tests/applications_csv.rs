use chrono::NaiveDate;
use emicalclib::{
    application::{ApplicationForm, ApplicationStatus, SubmittedApplication, Wizard},
    formats::csv::{ApplicationsCsv, APPLICATION_HEADERS},
};
use rand::{rngs::StdRng, SeedableRng};

fn submitted() -> SubmittedApplication {
    let form = ApplicationForm {
        applicant_name: "Murugan S".into(),
        mobile_number: "9443012345".into(),
        aadhaar_number: "987654321098".into(),
        product_type: "Mini_Dairy".into(),
        loan_amount: "400000".into(),
        crop_type: "Paddy".into(),
        land_area: "1.75".into(),
        village: "Kovilur, North".into(),
        state: "Tamil Nadu".into(),
        district: "Thanjavur".into(),
        ..Default::default()
    };
    let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    Wizard::new(form).unwrap().submit(today, &mut StdRng::seed_from_u64(3)).unwrap()
}

#[test]
fn export_has_fixed_header_and_quoted_values() {
    let mut app = submitted();
    app.update_status(
        ApplicationStatus::UnderReview,
        r#"Land record "patta" missing, resubmit"#,
        NaiveDate::from_ymd_opt(2026, 6, 9).unwrap(),
    );

    let mut out = Vec::new();
    ApplicationsCsv::write(&mut out, std::slice::from_ref(&app)).expect("write applications");
    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();

    assert_eq!(lines.next(), Some(APPLICATION_HEADERS.join(",").as_str()));
    let expected = format!(
        concat!(
            r#""{}","Murugan S","9443012345","","987654321098","Mini_Dairy","400000","Paddy","1.75","#,
            r#""Tamil Nadu","Thanjavur","Kovilur, North","Under_Review","#,
            r#""Land record ""patta"" missing, resubmit","2026-06-01","2026-06-09""#
        ),
        app.application_id
    );
    assert_eq!(lines.next(), Some(expected.as_str()));
    assert_eq!(lines.next(), None);
}

#[test]
fn export_reads_back_with_a_csv_reader() {
    let app = submitted();
    let mut out = Vec::new();
    ApplicationsCsv::write(&mut out, &[app.clone(), app]).unwrap();

    let mut rdr = csv::Reader::from_reader(out.as_slice());
    assert_eq!(rdr.headers().unwrap().len(), APPLICATION_HEADERS.len());
    let rows: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][11], "Kovilur, North");
    assert_eq!(&rows[0][12], "Submitted");
    // без смены статуса дата обновления равна дате подачи
    assert_eq!(&rows[0][15], "2026-06-01");
}

#[test]
fn empty_export_is_empty() {
    let mut out = Vec::new();
    ApplicationsCsv::write(&mut out, &[]).unwrap();
    assert!(out.is_empty());
    assert_eq!(
        ApplicationsCsv::file_name(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()),
        "TMB_Loan_Applications_2026-10-19.csv"
    );
}
