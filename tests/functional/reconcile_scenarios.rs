//! End-to-end reconciliation and rendering scenarios

use crate::common::{sample_data, snapshot};
use scorediff::{Comparison, ReportRenderer, Reconciler, ScorediffError};

#[test]
fn test_progress_in_shared_section() {
    let newer = snapshot(&[vec!["User ID", "Memo", "Arrays", "Total"], vec!["a1", "Alice", "5", "5"]]);
    let older = snapshot(&[vec!["User ID", "Memo", "Arrays", "Total"], vec!["a1", "Alice", "3", "3"]]);

    let reports = Reconciler::reconcile(&newer, &older).unwrap();
    let lines = ReportRenderer::render(&reports, false);

    assert_eq!(
        lines,
        vec!["Alice <a1> has done 2 more problems in section Arrays -- total = 5", ""]
    );
}

#[test]
fn test_new_student_reports_full_counts() {
    let newer = snapshot(&[
        vec!["User ID", "Memo", "Strings", "Total"],
        vec!["a1", "Alice", "2", "2"],
        vec!["b1", "Bob", "4", "4"],
    ]);
    let older = snapshot(&[vec!["User ID", "Memo", "Strings", "Total"], vec!["a1", "Alice", "2", "2"]]);

    let reports = Reconciler::reconcile(&newer, &older).unwrap();
    let lines = ReportRenderer::render(&reports, true);

    assert_eq!(
        lines,
        vec!["Bob <b1> has done 4 more problems in section Strings -- total = 4", ""]
    );
}

#[test]
fn test_unchanged_student_is_silent() {
    let data = vec![vec!["User ID", "Memo", "Arrays", "Total"], vec!["c1", "Carol", "7", "7"]];
    let newer = snapshot(&data);
    let older = snapshot(&data);

    let reports = Reconciler::reconcile(&newer, &older).unwrap();
    assert!(reports[0].is_silent());

    assert_eq!(
        ReportRenderer::render(&reports, false),
        vec!["Carol <c1> hasn't done any problems since the last score pull.", ""]
    );
    assert!(ReportRenderer::render(&reports, true).is_empty());
}

#[test]
fn test_no_prior_snapshot() {
    let newer = snapshot(&sample_data::week_one());
    assert_eq!(Reconciler::compare(&newer, None).unwrap(), Comparison::NoPriorSnapshot);
}

#[test]
fn test_full_week_report() {
    let older = snapshot(&sample_data::week_one());
    let newer = snapshot(&sample_data::week_two());

    let reports = Reconciler::reconcile(&newer, &older).unwrap();
    let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Bob", "Carol"]);

    assert_eq!(
        ReportRenderer::render(&reports, false),
        vec![
            "Alice <alice@example.com> has done 2 more problems in section Warmup-1 -- total = 5",
            "Alice <alice@example.com> has done 1 more problems in section String-1 -- total = 1",
            "Alice <alice@example.com> has done 2 more problems in section Logic-1 -- total = 2",
            "",
            "Bob <bob@example.com> has done 4 more problems in section String-1 -- total = 4",
            "",
            "Carol <carol@example.com> hasn't done any problems since the last score pull.",
            "",
        ]
    );
}

#[test]
fn test_output_order_ignores_row_order() {
    let older = snapshot(&sample_data::week_one());

    let mut shuffled = sample_data::week_two();
    shuffled[1..].reverse();
    let forward = snapshot(&sample_data::week_two());
    let backward = snapshot(&shuffled);

    assert_eq!(
        Reconciler::reconcile(&forward, &older).unwrap(),
        Reconciler::reconcile(&backward, &older).unwrap()
    );
}

#[test]
fn test_same_name_orders_by_identifier() {
    let newer = snapshot(&[
        vec!["User ID", "Memo", "Arrays", "Total"],
        vec!["sam2@example.com", "Sam", "1", "1"],
        vec!["sam1@example.com", "Sam", "1", "1"],
    ]);
    let older = snapshot(&[vec!["User ID", "Memo", "Arrays", "Total"]]);

    let reports = Reconciler::reconcile(&newer, &older).unwrap();
    assert_eq!(reports[0].identifier, "sam1@example.com");
    assert_eq!(reports[1].identifier, "sam2@example.com");
}

#[test]
fn test_total_column_is_not_a_section() {
    let newer = snapshot(&[vec!["User ID", "Memo", "Arrays", "Total"], vec!["a1", "Alice", "5", "9"]]);
    let older = snapshot(&[vec!["User ID", "Memo", "Arrays", "Total"], vec!["a1", "Alice", "5", "5"]]);

    let reports = Reconciler::reconcile(&newer, &older).unwrap();
    assert!(reports[0].is_silent());
}

#[test]
fn test_duplicate_identifier_in_newer() {
    let newer = snapshot(&[
        vec!["User ID", "Memo", "Arrays", "Total"],
        vec!["a1", "Alice", "5", "5"],
        vec!["a1", "Alicia", "1", "1"],
    ]);
    let older = snapshot(&[vec!["User ID", "Memo", "Arrays", "Total"]]);

    let err = Reconciler::reconcile(&newer, &older).unwrap_err();
    assert!(matches!(err, ScorediffError::MalformedInput { .. }));
    assert!(err.to_string().contains("a1"));
}

#[test]
fn test_deltas_match_count_differences() {
    let older = snapshot(&[
        vec!["User ID", "Memo", "A", "B", "C", "Total"],
        vec!["s1", "One", "0", "3", "10", "13"],
        vec!["s2", "Two", "4", "4", "4", "12"],
    ]);
    let newer = snapshot(&[
        vec!["User ID", "Memo", "A", "B", "C", "Total"],
        vec!["s1", "One", "2", "3", "17", "22"],
        vec!["s2", "Two", "9", "5", "4", "18"],
    ]);

    for report in Reconciler::reconcile(&newer, &older).unwrap() {
        let before = older.students().iter().find(|s| s.identifier == report.identifier).unwrap();
        let after = newer.students().iter().find(|s| s.identifier == report.identifier).unwrap();
        for delta in &report.deltas {
            let new = after.count(&delta.section).unwrap();
            let old = before.count(&delta.section).unwrap();
            assert_eq!(delta.delta, new - old);
            assert_eq!(delta.total, new);
        }
        assert_eq!(report.deltas.len(), 2);
    }
}
