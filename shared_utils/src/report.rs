//! Report Module
//!
//! Summary printed after a multi-file run.

use crate::batch::BatchResult;
use crate::progress::{format_bytes, format_duration};
use std::time::Duration;

pub fn print_summary_report(result: &BatchResult, duration: Duration, operation_name: &str) {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  📊 {:<53}║", format!("{} Summary Report", operation_name));
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  📁 Files Processed:    {:>10}                       ║", result.total);
    println!("║  ✅ Succeeded:          {:>10}                       ║", result.succeeded);
    println!("║  ❌ Failed:             {:>10}                       ║", result.failed);
    println!("║  ⚠️  Over size limit:    {:>10}                       ║", result.oversized);
    println!("║  📈 Success Rate:       {:>9.1}%                       ║", result.success_rate());
    println!("╠══════════════════════════════════════════════════════════╣");
    println!(
        "║  💾 Output Size:        {:>10}                       ║",
        format_bytes(result.output_bytes)
    );
    println!(
        "║  ⏱️  Total Time:         {:>10}                       ║",
        format_duration(duration)
    );
    println!("╚══════════════════════════════════════════════════════════╝");

    if !result.errors.is_empty() {
        println!();
        println!("❌ Errors encountered:");
        for (path, error) in &result.errors {
            println!("   {} → {}", path.display(), error);
        }
    }
}
