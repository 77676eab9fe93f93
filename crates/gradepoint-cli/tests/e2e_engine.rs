//! End-to-end engine tests.
//!
//! Builds transcripts through the editing API and checks the figures the
//! resolver, selector and aggregator produce together.

use gradepoint_core::engine::analyze;
use gradepoint_core::model::Transcript;
use gradepoint_core::numeric::fmt_gpa;
use gradepoint_core::resolver::{build_exclusion_map, resolve_groups};
use gradepoint_core::selector::select_best;
use gradepoint_core::statistics::{compute_cumulative, compute_term, cumulative_details, RowStatus};

/// Builds a transcript term by term through the editing API.
struct TranscriptBuilder(Transcript);

impl TranscriptBuilder {
    fn new() -> Self {
        Self(Transcript::new("e2e"))
    }

    fn term(mut self, name: &str, rows: &[(&str, f64, &str)]) -> Self {
        let index = self.0.add_term(name);
        for &(course, units, grade) in rows {
            self.0.add_course(index, course, units, grade).unwrap();
        }
        self
    }

    fn build(self) -> Transcript {
        self.0
    }
}

#[test]
fn retake_scenario_replaces_d_with_a() {
    let t = TranscriptBuilder::new()
        .term("Fall", &[("Math 101", 3.0, "D")])
        .term("Spring", &[("Math 101", 3.0, "A")])
        .build();
    let analysis = analyze(&t);

    let fall = analysis.term(1).unwrap();
    assert_eq!(fall.term.attempted, 3.0);
    assert_eq!(fall.term.earned, 3.0);
    assert_eq!(fall.term.quality_points, 3.0);
    assert_eq!(fmt_gpa(fall.term.gpa), "1.000");
    assert_eq!(fmt_gpa(fall.cumulative.gpa), "1.000");

    let spring = analysis.term(2).unwrap();
    assert_eq!(fmt_gpa(spring.term.gpa), "4.000");
    assert_eq!(spring.cumulative.attempted, 6.0);
    assert_eq!(spring.cumulative.earned, 3.0);
    assert_eq!(spring.cumulative.quality_points, 12.0);
    assert_eq!(spring.cumulative.gpa_units, 3.0);
    assert_eq!(fmt_gpa(spring.cumulative.gpa), "4.000");

    assert_eq!(analysis.exclusions.exclusion_start("1"), Some(2));
    assert_eq!(analysis.exclusions.exclusion_start("2"), None);
}

#[test]
fn lone_withdrawal_has_zero_gpa() {
    let t = TranscriptBuilder::new()
        .term("Fall", &[("Art 1", 3.0, "W")])
        .build();
    let cumulative = analyze(&t).cumulative();

    assert_eq!(cumulative.attempted, 3.0);
    assert_eq!(cumulative.earned, 0.0);
    assert_eq!(cumulative.quality_points, 0.0);
    assert_eq!(cumulative.gpa_units, 0.0);
    assert_eq!(cumulative.gpa, 0.0);
}

#[test]
fn cumulative_is_idempotent() {
    let t = TranscriptBuilder::new()
        .term("Fall", &[("Chem 1", 4.0, "C-"), ("Eng 1", 3.0, "B+")])
        .term("Spring", &[("Chem 1", 4.0, "B"), ("Hist 2", 3.0, "W")])
        .term("Summer", &[("Chem 1", 4.0, "B"), ("Eng 1", 3.0, "A-")])
        .build();
    let groups = resolve_groups(&t.terms, &t.equivalences);

    for as_of in 1..=3 {
        let a = compute_cumulative(&t.terms, as_of, &groups);
        let b = compute_cumulative(&t.terms, as_of, &groups);
        assert_eq!(a.gpa.to_bits(), b.gpa.to_bits());
        assert_eq!(a.quality_points.to_bits(), b.quality_points.to_bits());
        assert_eq!(a, b);
    }
    assert_eq!(analyze(&t), analyze(&t));
}

#[test]
fn later_retake_leaves_earlier_figures_alone() {
    let before = TranscriptBuilder::new()
        .term("Fall", &[("Bio 1", 4.0, "D+"), ("Eng 1", 3.0, "B")])
        .term("Spring", &[("Hist 2", 3.0, "C")])
        .build();
    let mut after = before.clone();
    let summer = after.add_term("Summer");
    after.add_course(summer, "Bio 1", 4.0, "A").unwrap();

    let (a, b) = (analyze(&before), analyze(&after));
    for index in 1..=2 {
        let (old, new) = (a.term(index).unwrap(), b.term(index).unwrap());
        assert_eq!(old.term.attempted, new.term.attempted);
        assert_eq!(old.term.earned, new.term.earned);
        assert_eq!(old.term.quality_points, new.term.quality_points);
        assert_eq!(old.term.gpa, new.term.gpa);
        assert_eq!(old.cumulative, new.cumulative);
    }
    // Only the annotation changes: the D+ now shows when it stops counting.
    assert_eq!(b.term(1).unwrap().term.rows[0].exclusion_start, Some(3));

    let summer_cumulative = b.term(3).unwrap().cumulative;
    assert_eq!(summer_cumulative.attempted, 14.0);
    assert_eq!(summer_cumulative.gpa_units, 10.0);
}

#[test]
fn exclusion_never_lifts_without_a_better_grade() {
    let t = TranscriptBuilder::new()
        .term("T1", &[("Phys 1", 4.0, "C")])
        .term("T2", &[("Phys 1", 4.0, "B")])
        .term("T3", &[("Phys 1", 4.0, "C+")])
        .term("T4", &[("Art 1", 2.0, "A")])
        .term("T5", &[("Phys 1", 4.0, "W")])
        .build();
    let groups = resolve_groups(&t.terms, &t.equivalences);
    let exclusions = build_exclusion_map(&groups);

    for row in ["1", "3"] {
        let start = exclusions.exclusion_start(row).unwrap();
        for as_of in start..=5 {
            let details = cumulative_details(&t.terms, as_of, &groups);
            let status = &details.rows.iter().find(|r| r.row_id == row).unwrap().status;
            assert_eq!(
                *status,
                RowStatus::Superseded { by: "2".into() },
                "row {row} as of term {as_of}"
            );
        }
    }
    assert_eq!(exclusions.exclusion_start("1"), Some(2));
    assert_eq!(exclusions.exclusion_start("3"), Some(3));
    assert_eq!(exclusions.exclusion_start("2"), None);
    assert_eq!(exclusions.exclusion_start("5"), None);
}

#[test]
fn equal_grades_keep_the_latest_attempt() {
    let t = TranscriptBuilder::new()
        .term("T1", &[("Calc 1", 4.0, "D")])
        .term("T2", &[("Calc 1", 4.0, "B")])
        .term("T3", &[("Calc 1", 4.0, "B")])
        .build();
    let groups = resolve_groups(&t.terms, &t.equivalences);
    let group = groups.group_of("1").unwrap();

    assert_eq!(select_best(group, 3).unwrap().row_id, "3");
    assert_eq!(select_best(group, 2).unwrap().row_id, "2");

    let details = cumulative_details(&t.terms, 3, &groups);
    let statuses: Vec<&RowStatus> = details.rows.iter().map(|r| &r.status).collect();
    assert_eq!(
        statuses,
        vec![
            &RowStatus::Superseded { by: "3".into() },
            &RowStatus::Superseded { by: "3".into() },
            &RowStatus::Counted,
        ]
    );
    assert_eq!(details.stats.gpa_units, 4.0);
    assert_eq!(fmt_gpa(details.stats.gpa), "3.000");
}

#[test]
fn withdrawal_is_grouped_but_never_kept_or_excluded() {
    let t = TranscriptBuilder::new()
        .term("T1", &[("Econ 1", 3.0, "W")])
        .term("T2", &[("Econ 1", 3.0, "C")])
        .term("T3", &[("Econ 1", 3.0, "P")])
        .build();
    let analysis = analyze(&t);
    let group = analysis.groups.group_of("1").unwrap();

    assert_eq!(group.len(), 3);
    assert!(select_best(group, 1).is_none());
    assert_eq!(select_best(group, 3).unwrap().row_id, "2");
    assert!(analysis.exclusions.is_empty());

    let cumulative = analysis.cumulative();
    assert_eq!(cumulative.attempted, 9.0);
    assert_eq!(cumulative.earned, 3.0);
    assert_eq!(cumulative.gpa_units, 3.0);
    assert_eq!(cumulative.quality_points, 6.0);
}

#[test]
fn equivalences_are_transitive() {
    let mut t = TranscriptBuilder::new()
        .term("T1", &[("Writ 1", 3.0, "C")])
        .term("T2", &[("Writ 1A", 3.0, "B")])
        .term("T3", &[("Writ 1B", 3.0, "A")])
        .build();
    t.add_equivalence("Writ 1", "Writ 1A").unwrap();
    t.add_equivalence("writ1a", "WRIT 1B").unwrap();

    let analysis = analyze(&t);
    assert!(analysis.groups.same_group("1", "3"));
    assert_eq!(analysis.groups.retaken_groups().count(), 1);
    assert_eq!(analysis.exclusions.exclusion_start("1"), Some(2));
    assert_eq!(analysis.exclusions.exclusion_start("2"), Some(3));
    assert_eq!(fmt_gpa(analysis.cumulative().gpa), "4.000");
}

#[test]
fn manual_link_merges_different_names() {
    let mut t = TranscriptBuilder::new()
        .term("T1", &[("Intro Prog", 4.0, "F")])
        .term("T2", &[("Programming I", 4.0, "B-")])
        .build();
    t.set_retake("2", "1").unwrap();

    let analysis = analyze(&t);
    assert_eq!(analysis.exclusions.exclusion_start("1"), Some(2));
    assert_eq!(analysis.cumulative().earned, 4.0);
    assert_eq!(fmt_gpa(analysis.cumulative().gpa), "2.700");
}

#[test]
fn inserting_a_term_renumbers_exclusions() {
    let mut t = TranscriptBuilder::new()
        .term("T1", &[("Stat 1", 3.0, "D")])
        .term("T2", &[("Stat 1", 3.0, "B")])
        .build();
    assert_eq!(analyze(&t).exclusions.exclusion_start("1"), Some(2));

    t.insert_term(1, "Winter").unwrap();
    let analysis = analyze(&t);
    assert_eq!(analysis.exclusions.exclusion_start("1"), Some(3));
    assert_eq!(analysis.term(2).unwrap().cumulative.gpa_units, 3.0);
}

#[test]
fn term_figures_count_retaken_rows_in_full() {
    let t = TranscriptBuilder::new()
        .term("T1", &[("Geo 1", 3.0, "B")])
        .term("T2", &[("Geo 1", 3.0, "C"), ("Geo 2", 3.0, "A")])
        .build();
    let groups = resolve_groups(&t.terms, &t.equivalences);
    let exclusions = build_exclusion_map(&groups);
    let spring = compute_term(&t.terms[1], &exclusions);

    assert_eq!(spring.quality_points, 18.0);
    assert_eq!(spring.gpa_units, 6.0);
    assert_eq!(spring.rows[0].exclusion_start, Some(2));
    assert_eq!(compute_cumulative(&t.terms, 2, &groups).quality_points, 21.0);
}

#[test]
fn malformed_input_still_produces_numbers() {
    let mut t = TranscriptBuilder::new()
        .term("T1", &[("", -2.0, "Z"), ("Lab", f64::NAN, "A")])
        .build();
    t.add_course(1, "Orphan", 3.0, "B").unwrap();
    t.course_mut("3").unwrap().retake_of = Some("404".into());

    let cumulative = analyze(&t).cumulative();
    assert_eq!(cumulative.attempted, 3.0);
    assert_eq!(cumulative.quality_points, 9.0);
    assert_eq!(fmt_gpa(cumulative.gpa), "3.000");
    assert!(cumulative.gpa.is_finite());
}

#[test]
fn transfer_credit_only_adds_to_overall_earned() {
    let mut t = TranscriptBuilder::new()
        .term("T1", &[("Span 1", 4.0, "B")])
        .build();
    t.add_transfer("Community College", 9.0);

    let summary = analyze(&t).summary;
    assert_eq!(summary.institution.attempted, 4.0);
    assert_eq!(summary.institution.earned, 4.0);
    assert_eq!(summary.transfer_earned, 9.0);
    assert_eq!(summary.overall_earned, 13.0);
    assert_eq!(fmt_gpa(summary.institution.gpa), "3.000");
}
