//! Plain-text rendering of a [`Report`].

use school_zone_report::summary::{GradeSummary, GroupSummary};
use school_zone_report::{RankedFacility, Report};

/// Prints every section of `report` to stdout.
pub fn print_report(report: &Report) {
    println!();
    println!("{} [{}]", report.scheme_name, report.grading);
    println!();

    let k = &report.kpis;
    println!(
        "Facilities: {}   Mean score: {:.1}   Safe (A+B): {:.0}%   Incidents: {:.0}",
        k.count, k.mean_score, k.safe_ratio, k.total_incidents
    );

    if !report.caution.is_empty() {
        let mut names = report.caution.names.join(" / ");
        if report.caution.overflow > 0 {
            names.push_str(&format!(" and {} more", report.caution.overflow));
        }
        println!();
        println!("Needs attention ({}): {names}", report.caution.total);
    }

    print_ranking("Top", &report.top);
    print_ranking("Bottom", &report.bottom);
    print_grades(&report.grades);
    print_groups("By category", &report.categories);
    print_groups("By district", &report.districts);

    if !report.components.is_empty() {
        println!();
        println!("Score components (mean)");
        for component in &report.components {
            println!("  {:<28} {:>7.1}", component.label, component.mean);
        }
    }

    if !report.suggestions.is_empty() {
        println!();
        println!("Suggestions");
        for suggestion in &report.suggestions {
            println!(
                "  [{}] {:<28} {:>6.1}  {}",
                suggestion.grade, suggestion.facility_name, suggestion.score, suggestion.advice
            );
        }
    }
}

fn print_ranking(title: &str, rows: &[RankedFacility]) {
    if rows.is_empty() {
        return;
    }
    println!();
    println!("{title} {}", rows.len());
    for row in rows {
        println!(
            "  {:>2}. {:<28} {:<10} {:<10} {:<14} {:>6.1}",
            row.rank,
            row.name,
            row.category,
            row.district,
            row.grade.label(),
            row.score
        );
    }
}

fn print_grades(grades: &[GradeSummary]) {
    println!();
    println!(
        "  {:<14} {:>6} {:>14} {:>12}",
        "Grade", "Count", "Mean incidents", "Mean score"
    );
    for g in grades {
        println!(
            "  {:<14} {:>6} {:>14} {:>12}",
            g.grade.label(),
            g.count,
            fmt_optional(g.mean_incidents),
            fmt_optional(g.mean_score)
        );
    }
}

fn print_groups(title: &str, groups: &[GroupSummary]) {
    if groups.is_empty() {
        return;
    }
    println!();
    println!("{title}");
    for g in groups {
        println!(
            "  {:<16} {:>4}  score {:>6.1}  incidents {:>5.1}",
            g.key, g.count, g.mean_score, g.mean_incidents
        );
    }
}

fn fmt_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}
