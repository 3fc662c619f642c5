use std::time::Duration;

use super::{Report, Status, UnitResult};

pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

/// `page 3` or `page 3 crop 1`.
pub fn unit_label(unit: &UnitResult) -> String {
    match unit.crop_index {
        Some(crop) => format!("page {} crop {crop}", unit.page_index),
        None => format!("page {}", unit.page_index),
    }
}

/// One line for a failed unit: pixel count and diff image, or the error.
pub fn format_unit(unit: &UnitResult) -> String {
    let label = unit_label(unit);
    match (&unit.error, unit.num_diff_pixels, &unit.diff_image_path) {
        (Some(msg), Some(n), Some(path)) => format!(
            "  \x1b[31mFAIL\x1b[0m  {label}  ({msg}, {n} pixels)  \x1b[2m{}\x1b[0m",
            path.display()
        ),
        (Some(msg), _, _) => format!("  \x1b[31m ERR\x1b[0m  {label}  ({msg})"),
        (None, Some(n), Some(path)) => format!(
            "  \x1b[31mFAIL\x1b[0m  {label}  ({n} pixels)  \x1b[2m{}\x1b[0m",
            path.display()
        ),
        _ => format!("  \x1b[31mFAIL\x1b[0m  {label}"),
    }
}

/// Print failed units followed by the verdict.
pub fn print_report(report: &Report, elapsed: Duration) {
    for unit in &report.details {
        println!("{}", format_unit(unit));
    }

    println!();
    match report.status {
        Status::Passed => println!("Result:  \x1b[32mPASSED\x1b[0m"),
        Status::Failed => {
            println!("Result:  \x1b[31mFAILED\x1b[0m");
            if let Some(msg) = &report.message {
                println!("         {msg}");
            }
        }
    }
    println!("Time:    {}", format_duration(elapsed));

    let diffs = report
        .details
        .iter()
        .filter(|u| u.diff_image_path.is_some())
        .count();
    if diffs > 0 {
        println!();
        println!("{diffs} diff image(s) written. Inspect them, then update the baseline if intended.");
    }
}
