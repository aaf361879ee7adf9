//! Records output for the grade command

use cohortgrade_core::records::{
    format_criterion_record, format_failure_record, format_grade_record, format_header_record,
    format_warning_record,
};
use cohortgrade_core::run::GradingReport;

pub fn output_records(report: &GradingReport, shown: usize) {
    let meta = &report.metadata;
    println!(
        "{}",
        format_header_record(
            "grade",
            &[
                ("entities", meta.entities_graded.to_string()),
                ("criteria", report.graph.len().to_string()),
                ("policy", meta.policy.to_string()),
                ("rank", meta.rank.to_string()),
                ("max", format!("{:.4}", report.graph.max_possible_score())),
                ("fingerprint", meta.input_fingerprint.clone()),
            ],
        )
    );

    for criterion in report.graph.criteria() {
        println!("{}", format_criterion_record(criterion));
    }
    for record in &report.grades[..shown] {
        println!("{}", format_grade_record(record));
    }
    for failure in &report.failures {
        println!("{}", format_failure_record(failure));
    }
    for warning in &report.warnings {
        println!("{}", format_warning_record(warning));
    }
}
