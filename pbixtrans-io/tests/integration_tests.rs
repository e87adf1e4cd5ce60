//! Package round trip and pipeline tests

use pbixtrans_io::{
    execute_translate, layout_path, load_layout, pack, read_member, unpack, unpack_into, ErrorKind,
    LanguageCode, RetryPolicy, TranslateRequest, TranslationError,
};
use pbixtrans_test_utils::{
    decoded_config, read_package, sample_members, sample_package, write_package, FailingTranslator,
    LayoutBuilder, RecordingTranslator, SectionBuilder, Visuals,
};
use serde_json::Value;
use std::fs;
use std::path::Path;

fn report_layout() -> Value {
    LayoutBuilder::new()
        .section(
            SectionBuilder::new("ReportSection")
                .display_name("Sales overview")
                .visual(Visuals::textbox(&[&["Hello", "World"]]))
                .visual(Visuals::shape("'Details'"))
                .visual(Visuals::slicer_from_query(&[("Sales.Region", "Region")]))
                .visual(Visuals::other("lineChart", "Trend")),
        )
        .build()
}

fn lang(code: &str) -> LanguageCode {
    LanguageCode::parse(code).unwrap()
}

#[test]
fn unpack_pack_round_trip_keeps_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pbix");
    let layout = report_layout();
    sample_package(&input, &layout);

    let extracted = unpack(&input).unwrap();
    assert_eq!(extracted, dir.path().join("report_extracted"));
    assert!(layout_path(&extracted).is_file());

    let output = dir.path().join("copy.pbix");
    let summary = pack(&extracted, &output).unwrap();
    assert!(summary.security_bindings_removed);
    assert!(!extracted.exists());

    let original = read_package(&input);
    let copy = read_package(&output);
    assert_eq!(copy.len(), original.len() - 1);
    assert!(!copy.contains_key("SecurityBindings"));
    for (name, bytes) in &copy {
        assert_eq!(Some(bytes), original.get(name), "member {} changed", name);
    }
    // input untouched
    assert!(input.is_file());
}

#[test]
fn pack_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pbix");
    sample_package(&input, &report_layout());

    let first_dir = dir.path().join("first");
    let second_dir = dir.path().join("second");
    unpack_into(&input, &first_dir).unwrap();
    unpack_into(&input, &second_dir).unwrap();

    let first = dir.path().join("first.pbix");
    let second = dir.path().join("second.pbix");
    pack(&first_dir, &first).unwrap();
    pack(&second_dir, &second).unwrap();
    assert_eq!(fs::read(first).unwrap(), fs::read(second).unwrap());
}

#[test]
fn pack_overwrites_existing_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pbix");
    sample_package(&input, &report_layout());
    let output = dir.path().join("out.pbix");
    fs::write(&output, b"stale").unwrap();

    let extracted = unpack(&input).unwrap();
    pack(&extracted, &output).unwrap();
    assert!(read_package(&output).contains_key("Report/Layout"));
}

#[test]
fn unpack_rejects_unsafe_member_names() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("evil.pbix");
    write_package(&input, &[("../escape.txt", b"x".to_vec())]);

    let target = dir.path().join("target");
    let err = unpack_into(&input, &target).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(!dir.path().join("escape.txt").exists());
}

#[test]
fn unpack_error_kinds() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        unpack(&dir.path().join("missing.pbix")).unwrap_err().kind(),
        ErrorKind::NotFound
    );

    let wrong = dir.path().join("report.zip");
    write_package(&wrong, &sample_members(&report_layout()));
    assert_eq!(unpack(&wrong).unwrap_err().kind(), ErrorKind::Format);
    assert!(!dir.path().join("report_extracted").exists());
}

#[test]
fn read_member_without_extracting() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pbix");
    sample_package(&input, &report_layout());

    let bytes = read_member(&input, "Report/Layout").unwrap();
    assert_eq!(bytes.len() % 2, 0);
    assert_eq!(
        read_member(&input, "Report/Missing").unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn translate_pipeline_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pbix");
    let layout = report_layout();
    sample_package(&input, &layout);

    let translator = RecordingTranslator::uppercase();
    let summary = execute_translate(TranslateRequest::new(&input, lang("de"), &translator)).unwrap();

    let output = dir.path().join("report_de.pbix");
    assert_eq!(summary.output, output);
    assert_eq!(summary.language, "de");
    assert_eq!(summary.traversal.sections_renamed, 1);
    assert_eq!(summary.traversal.visuals_handled, 3);
    assert_eq!(summary.traversal.visuals_passed_through, 1);
    assert_eq!(
        translator.calls(),
        vec!["Sales overview", "Hello", "World", "Details", "Region"]
    );
    assert!(!dir.path().join("report_extracted").exists());

    let members = read_package(&output);
    assert!(!members.contains_key("SecurityBindings"));
    let original = read_package(&input);
    for (name, bytes) in &members {
        if name != "Report/Layout" {
            assert_eq!(Some(bytes), original.get(name), "member {} changed", name);
        }
    }

    let check = dir.path().join("check");
    unpack_into(&output, &check).unwrap();
    let translated = load_layout(&check).unwrap().into_value();
    assert_eq!(translated["sections"][0]["displayName"], "SALES OVERVIEW");
    assert_eq!(
        decoded_config(&translated, 0, 1)["singleVisual"]["objects"]["text"][0]["properties"]["text"]["expr"]["Literal"]["Value"],
        "'DETAILS'"
    );
    assert_eq!(
        translated["sections"][0]["visualContainers"][3]["config"],
        layout["sections"][0]["visualContainers"][3]["config"]
    );
}

#[test]
fn translate_pipeline_custom_paths() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pbix");
    sample_package(&input, &report_layout());

    let mut request = TranslateRequest::new(&input, lang("fr"), RecordingTranslator::identity());
    request.output = Some(dir.path().join("out").join("translated.pbix"));
    request.work_dir = Some(dir.path().join("scratch"));
    fs::create_dir_all(dir.path().join("out")).unwrap();

    let summary = execute_translate(request).unwrap();
    assert!(summary.output.ends_with("translated.pbix"));
    assert!(summary.output.is_file());
    assert!(!dir.path().join("scratch").exists());
}

#[test]
fn translate_failure_leaves_no_output_and_no_scratch() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pbix");
    sample_package(&input, &report_layout());

    let mut request = TranslateRequest::new(&input, lang("de"), FailingTranslator::offline());
    request.retry = RetryPolicy {
        max_attempts: 2,
        initial_backoff: std::time::Duration::ZERO,
        max_backoff: std::time::Duration::ZERO,
    };
    let err = execute_translate(request).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Translation);
    assert!(!dir.path().join("report_de.pbix").exists());
    assert!(!dir.path().join("report_extracted").exists());
}

#[test]
fn translate_non_retryable_error_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pbix");
    sample_package(&input, &report_layout());

    let translator = FailingTranslator::new(TranslationError::Unsupported("xx".into()));
    let err = execute_translate(TranslateRequest::new(&input, lang("xx"), translator)).unwrap_err();
    assert!(matches!(
        err,
        pbixtrans_io::PbixError::Translation(TranslationError::Unsupported(_))
    ));
}

#[test]
fn translate_missing_layout_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.pbix");
    write_package(&input, &[("Version", b"1".to_vec())]);

    let err = execute_translate(TranslateRequest::new(&input, lang("de"), RecordingTranslator::identity()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!dir.path().join("empty_extracted").exists());
    assert!(!dir.path().join("empty_de.pbix").exists());
}

#[test]
fn translate_invalid_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.txt");
    fs::write(&input, b"hello").unwrap();

    let err = execute_translate(TranslateRequest::new(&input, lang("de"), RecordingTranslator::identity()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert!(Path::new(&input).is_file());
}

#[test]
fn translate_refuses_non_empty_work_dir() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pbix");
    sample_package(&input, &report_layout());
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, b"keep me").unwrap();

    let mut request = TranslateRequest::new(&input, lang("de"), FailingTranslator::offline());
    request.retry = RetryPolicy::none();
    request.work_dir = Some(dir.path().to_path_buf());
    let err = execute_translate(request).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(input.is_file());
    assert_eq!(fs::read(&notes).unwrap(), b"keep me");
    assert!(!dir.path().join("Report").exists());
    assert!(!dir.path().join("report_de.pbix").exists());
}

#[test]
fn translate_failed_unpack_leaves_nothing_for_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pbix");
    write_package(
        &input,
        &[("Stale", b"old".to_vec()), ("../escape.txt", b"x".to_vec())],
    );

    let err = execute_translate(TranslateRequest::new(&input, lang("de"), RecordingTranslator::identity()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(!dir.path().join("report_extracted").exists());

    sample_package(&input, &report_layout());
    let summary = execute_translate(TranslateRequest::new(&input, lang("de"), RecordingTranslator::identity()))
        .unwrap();
    let members = read_package(&summary.output);
    assert!(!members.contains_key("Stale"));
    let mut expected: Vec<String> = read_package(&input)
        .into_keys()
        .filter(|name| name != "SecurityBindings")
        .collect();
    expected.sort();
    assert_eq!(members.into_keys().collect::<Vec<_>>(), expected);
}

#[test]
fn translate_empty_work_dir_is_kept_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pbix");
    sample_package(&input, &report_layout());
    let scratch = dir.path().join("scratch");
    fs::create_dir(&scratch).unwrap();

    let mut request = TranslateRequest::new(&input, lang("de"), FailingTranslator::offline());
    request.retry = RetryPolicy::none();
    request.work_dir = Some(scratch.clone());
    assert_eq!(execute_translate(request).unwrap_err().kind(), ErrorKind::Translation);

    assert!(scratch.is_dir());
    assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    assert!(input.is_file());
}

#[test]
fn translate_rejects_output_inside_work_dir() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pbix");
    sample_package(&input, &report_layout());
    let scratch = dir.path().join("scratch");

    let mut request = TranslateRequest::new(&input, lang("de"), RecordingTranslator::identity());
    request.work_dir = Some(scratch.clone());
    request.output = Some(scratch.join("report_de.pbix"));
    assert_eq!(execute_translate(request).unwrap_err().kind(), ErrorKind::Config);

    assert!(!scratch.exists());
    assert!(input.is_file());
}
