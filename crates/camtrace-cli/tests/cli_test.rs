mod common;

use assert_cmd::Command;
use common::TestFixture;
use predicates::prelude::*;

fn camtrace() -> Command {
    Command::cargo_bin("camtrace").expect("binary builds")
}

#[test]
fn flow_overview_reports_the_tac_session() {
    let fixture = TestFixture::new();
    let trace = fixture.trace_file();

    camtrace()
        .arg("flow-overview")
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("TAC"));
}

#[test]
fn stats_json_reports_one_session() {
    let fixture = TestFixture::new();
    let trace = fixture.trace_file();

    camtrace()
        .arg("stats")
        .arg(&trace)
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"session_count\": 1"));
}

#[test]
fn iccid_reports_absence_when_none_present() {
    let fixture = TestFixture::new();
    let trace = fixture.trace_file();

    camtrace()
        .arg("iccid")
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("no ICCID"));
}

#[test]
fn invalid_xml_exits_three() {
    let fixture = TestFixture::new();
    let bad = fixture.invalid_trace_file();

    camtrace().arg("stats").arg(&bad).assert().failure().code(3);
}

#[test]
fn missing_trace_file_exits_two() {
    let fixture = TestFixture::new();

    camtrace()
        .arg("stats")
        .arg(fixture.dir.path().join("does-not-exist.xml"))
        .assert()
        .failure()
        .code(2);
}

#[test]
fn scenario_list_shows_defined_names() {
    let fixture = TestFixture::new();
    let scenarios = fixture.scenario_file();

    camtrace()
        .arg("scenario")
        .arg("--list")
        .arg("--scenarios")
        .arg(&scenarios)
        .assert()
        .success()
        .stdout(predicate::str::contains("tac-session"));
}

#[test]
fn scenario_run_passes_for_a_matching_trace() {
    let fixture = TestFixture::new();
    let scenarios = fixture.scenario_file();
    let trace = fixture.trace_file();

    camtrace()
        .arg("scenario")
        .arg("--scenarios")
        .arg(&scenarios)
        .arg("tac-session")
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("overall: OK"));
}

#[test]
fn scenario_run_without_name_is_invalid_input() {
    let fixture = TestFixture::new();
    let scenarios = fixture.scenario_file();

    camtrace()
        .arg("scenario")
        .arg("--scenarios")
        .arg(&scenarios)
        .assert()
        .failure()
        .code(2);
}

#[test]
fn parsing_log_all_flag_bypasses_filters() {
    let fixture = TestFixture::new();
    let trace = fixture.trace_file();

    camtrace()
        .arg("parsing-log")
        .arg(&trace)
        .arg("--all")
        .assert()
        .success();
}
