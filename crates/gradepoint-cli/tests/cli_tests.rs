//! CLI integration tests using assert_cmd.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn gradepoint() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("gradepoint").unwrap()
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../transcripts")
        .join(name)
}

/// Two terms where "CS 1A" retakes "CS 1" only through an equivalence.
const RENAMED_RETAKE: &str = r#"{
  "name": "Renamed",
  "terms": [
    { "name": "Fall", "rows": [{ "id": "1", "name": "CS 1", "units": 4, "grade": "D" }] },
    { "name": "Spring", "rows": [{ "id": "2", "name": "CS 1A", "units": 4, "grade": "B" }] }
  ]
}"#;

#[test]
fn calc_text_summary() {
    gradepoint()
        .arg("calc")
        .arg("--transcript")
        .arg("../../transcripts/retake.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. 2021 Fall Semester"))
        .stdout(predicate::str::contains("3.133"))
        .stdout(predicate::str::contains(
            "Cumulative as of term 3: 21.00 attempted, 9.00 earned, 30.30 quality points, GPA 2.330",
        ))
        .stdout(predicate::str::contains(
            "Transfer credit: 6.00 earned, overall earned 15.00",
        ))
        .stdout(predicate::str::contains(
            "2 retaken attempt(s) excluded from the cumulative GPA",
        ));
}

#[test]
fn calc_as_of_earlier_term() {
    gradepoint()
        .args(["calc", "--as-of", "2", "--transcript"])
        .arg(fixture("retake.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Cumulative as of term 2: 14.00 attempted, 9.00 earned, 28.20 quality points, GPA 3.133",
        ))
        .stdout(predicate::str::contains("1 retaken attempt(s) excluded"))
        .stdout(predicate::str::contains("2022 Fall Semester").not());
}

#[test]
fn calc_unknown_term_fails() {
    gradepoint()
        .args(["calc", "--as-of", "9", "--transcript"])
        .arg(fixture("retake.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("term 9 does not exist"));
}

#[test]
fn calc_unknown_format_fails() {
    gradepoint()
        .args(["calc", "--format", "pdf", "--transcript"])
        .arg(fixture("retake.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: pdf"));
}

#[test]
fn calc_toml_transcript_with_retake_link() {
    gradepoint()
        .args(["calc", "--transcript"])
        .arg(fixture("linked.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("2.550"))
        .stdout(predicate::str::contains(
            "Cumulative as of term 2: 18.00 attempted, 12.00 earned, 41.60 quality points, GPA 3.466",
        ))
        .stdout(predicate::str::contains("Transfer credit").not());
}

#[test]
fn calc_markdown() {
    gradepoint()
        .args(["calc", "--format", "markdown", "--transcript"])
        .arg(fixture("retake.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("# Jordan Lee"))
        .stdout(predicate::str::contains(
            "| 2021 Fall Semester | 8.00 | 6.00 | 12.00 | 2.000 | 2.000 |",
        ))
        .stdout(predicate::str::contains(
            "| 2022 Spring Semester | 6.00 | 6.00 | 19.20 | 3.200 | 3.133 |",
        ))
        .stdout(predicate::str::contains(
            "| 2022 Fall Semester | 7.00 | 3.00 | 11.10 | 1.585 | 2.330 |",
        ));
}

#[test]
fn calc_writes_json_and_html_reports() {
    let dir = TempDir::new().unwrap();

    gradepoint()
        .args(["calc", "--format", "json,html", "--transcript"])
        .arg(fixture("retake.json"))
        .arg("--output")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Report saved to:"))
        .stderr(predicate::str::contains("HTML report:"));

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    assert_eq!(files.len(), 2);

    let html = files.iter().find(|p| p.extension().unwrap() == "html").unwrap();
    let json = files.iter().find(|p| p.extension().unwrap() == "json").unwrap();
    assert!(json
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("jordan-lee-"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
    assert_eq!(report["transcript_name"], "Jordan Lee");
    assert_eq!(report["as_of"], 3);
    assert_eq!(report["analysis"]["summary"]["transfer_earned"], 6.0);
    assert_eq!(report["analysis"]["terms"].as_array().unwrap().len(), 3);

    let html = std::fs::read_to_string(html).unwrap();
    assert!(html.contains("Jordan Lee"));
    assert!(html.contains("2.330"));
}

#[test]
fn calc_uses_default_format_from_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("gradepoint.toml"),
        "default_format = \"markdown\"\n",
    )
    .unwrap();

    gradepoint()
        .current_dir(dir.path())
        .args(["calc", "--transcript"])
        .arg(fixture("retake.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("## Summary (as of term 3)"));
}

#[test]
fn config_equivalences_join_retake_groups() {
    let dir = TempDir::new().unwrap();
    let transcript = dir.path().join("renamed.json");
    std::fs::write(&transcript, RENAMED_RETAKE).unwrap();

    gradepoint()
        .current_dir(dir.path())
        .args(["groups", "--transcript"])
        .arg(&transcript)
        .assert()
        .success()
        .stdout(predicate::str::contains("No retaken courses."));

    std::fs::write(
        dir.path().join("gradepoint.toml"),
        "[[equivalences]]\ncourse_a = \"CS 1\"\ncourse_b = \"cs 1a\"\n",
    )
    .unwrap();

    gradepoint()
        .current_dir(dir.path())
        .args(["groups", "--transcript"])
        .arg(&transcript)
        .assert()
        .success()
        .stdout(predicate::str::contains("excluded from term 2"))
        .stdout(predicate::str::contains("1 retaken course(s)"));

    gradepoint()
        .current_dir(dir.path())
        .args(["calc", "--transcript"])
        .arg(&transcript)
        .assert()
        .success()
        .stdout(predicate::str::contains("GPA 3.000"));
}

#[test]
fn details_term_breakdown() {
    gradepoint()
        .args(["details", "--term", "1", "--transcript"])
        .arg(fixture("retake.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("2021 Fall Semester (term 1)"))
        .stdout(predicate::str::contains(
            "excluded from cumulative GPA from term 2",
        ))
        .stdout(predicate::str::contains("not in GPA"))
        .stdout(predicate::str::contains(
            "Attempted 8.00 | Earned 6.00 | Quality points 12.00 | GPA units 6.00 | GPA 2.000",
        ));
}

#[test]
fn details_cumulative_breakdown() {
    gradepoint()
        .args(["details", "--term", "3", "--cumulative", "--transcript"])
        .arg(fixture("retake.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("replaced by row 4"))
        .stdout(predicate::str::contains("replaced by row 7"))
        .stdout(predicate::str::contains("counted"))
        .stdout(predicate::str::contains(
            "Cumulative as of term 3: attempted 21.00 | earned 9.00 | quality points 30.30 | GPA units 13.00 | GPA 2.330",
        ));
}

#[test]
fn details_unknown_term_fails() {
    gradepoint()
        .args(["details", "--term", "4", "--transcript"])
        .arg(fixture("retake.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("term 4 does not exist"));
}

#[test]
fn groups_lists_retaken_courses() {
    gradepoint()
        .args(["groups", "--transcript"])
        .arg(fixture("retake.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("ENGL 101H"))
        .stdout(predicate::str::contains("kept"))
        .stdout(predicate::str::contains("excluded from term 2"))
        .stdout(predicate::str::contains("excluded from term 3"))
        .stdout(predicate::str::contains("2 retaken course(s)"));
}

#[test]
fn import_csv_then_calc() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("imported").join("registrar.json");

    gradepoint()
        .args(["import", "--csv"])
        .arg(fixture("registrar-export.csv"))
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Imported 2 term(s), 5 course(s) with the csv importer",
        ));
    assert!(out.exists());

    gradepoint()
        .args(["calc", "--transcript"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("2019 Fall Semester"))
        .stdout(predicate::str::contains(
            "Cumulative as of term 2: 13.00 attempted, 7.00 earned, 26.20 quality points, GPA 3.742",
        ));

    gradepoint()
        .args(["validate", "--transcript"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Transcript: registrar-export (2 terms, 5 courses)",
        ));
}

#[test]
fn import_with_name_writes_toml() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("casey.toml");

    gradepoint()
        .args(["import", "--name", "Casey", "--csv"])
        .arg(fixture("registrar-export.csv"))
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let content = std::fs::read_to_string(&out).unwrap();
    assert!(content.contains("name = \"Casey\""));
}

#[test]
fn import_unsupported_file_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("export.pdf");
    std::fs::write(&input, "not a csv").unwrap();

    gradepoint()
        .args(["import", "--csv"])
        .arg(&input)
        .arg("--out")
        .arg(dir.path().join("out.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_directory() {
    gradepoint()
        .arg("validate")
        .arg("--transcript")
        .arg("../../transcripts")
        .assert()
        .success()
        .stdout(predicate::str::contains("Transcript: Jordan Lee (3 terms, 7 courses)"))
        .stdout(predicate::str::contains("Transcript: Sam Ortiz (2 terms, 5 courses)"))
        .stdout(predicate::str::contains("All transcripts valid."));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("messy.json");
    std::fs::write(
        &path,
        r#"{"terms": [{"rows": [{"id": "1", "name": "X 1", "units": 3, "grade": "Q", "retake_of": "99"}]}]}"#,
    )
    .unwrap();

    gradepoint()
        .args(["validate", "--transcript"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Transcript: messy (1 terms, 1 courses)"))
        .stdout(predicate::str::contains("[row 1] WARNING: unknown grade 'Q'"))
        .stdout(predicate::str::contains("missing row 99"))
        .stdout(predicate::str::contains("2 warning(s) found."));
}

#[test]
fn validate_nonexistent_file() {
    gradepoint()
        .arg("validate")
        .arg("--transcript")
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn equiv_add_list_remove() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("retake.json");
    std::fs::copy(fixture("retake.json"), &path).unwrap();

    gradepoint()
        .args(["equiv", "add", "--transcript"])
        .arg(&path)
        .args(["HIST 200", "HIST 200H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added equivalence: HIST 200 = HIST 200H"));

    gradepoint()
        .args(["equiv", "add", "--transcript"])
        .arg(&path)
        .args(["hist200h", "hist 200"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Equivalence already exists"));

    gradepoint()
        .args(["equiv", "list", "--transcript"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("ENGL 101H"))
        .stdout(predicate::str::contains("HIST200H"));

    gradepoint()
        .args(["equiv", "remove", "--transcript"])
        .arg(&path)
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Removed equivalence 2: HIST200 = HIST200H",
        ));

    gradepoint()
        .args(["equiv", "remove", "--transcript"])
        .arg(&path)
        .arg("2")
        .assert()
        .failure()
        .stderr(predicate::str::contains("equivalence 2 does not exist"));
}

#[test]
fn equiv_rejects_self_equivalence() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("retake.json");
    std::fs::copy(fixture("retake.json"), &path).unwrap();

    gradepoint()
        .args(["equiv", "add", "--transcript"])
        .arg(&path)
        .args(["MATH 101", "math101"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be equivalent to itself"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    gradepoint()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created gradepoint.toml"))
        .stdout(predicate::str::contains("Created transcripts/example.json"));

    assert!(dir.path().join("gradepoint.toml").exists());
    assert!(dir.path().join("transcripts/example.json").exists());

    gradepoint()
        .current_dir(dir.path())
        .args(["validate", "--transcript", "transcripts/example.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All transcripts valid."));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("gradepoint.toml"), "# existing").unwrap();

    gradepoint()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists, skipping"))
        .stdout(predicate::str::contains("Created transcripts/example.json"));

    let content = std::fs::read_to_string(dir.path().join("gradepoint.toml")).unwrap();
    assert_eq!(content, "# existing");
}

#[test]
fn help_output() {
    gradepoint()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Retake-aware GPA calculator"))
        .stdout(predicate::str::contains("calc"))
        .stdout(predicate::str::contains("equiv"));
}

#[test]
fn version_output() {
    gradepoint()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gradepoint"));
}
