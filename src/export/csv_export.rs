use anyhow::{Context, Result};
use std::path::Path;

use crate::expenses::sorted_newest_first;
use crate::models::Expense;

/// Write expenses newest first as `id,date,category,amount,description`.
/// Returns the number of data rows written.
pub(crate) fn export_expenses_csv(path: &Path, expenses: &[Expense]) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    wtr.write_record(["id", "date", "category", "amount", "description"])?;

    let sorted = sorted_newest_first(expenses);
    for e in &sorted {
        let date = e.date.format("%Y-%m-%d").to_string();
        let amount = format!("{:.2}", e.amount);
        wtr.write_record([
            e.id.as_str(),
            date.as_str(),
            e.category.as_str(),
            amount.as_str(),
            e.description.as_deref().unwrap_or(""),
        ])?;
    }
    wtr.flush().context("Failed to flush CSV file")?;
    Ok(sorted.len())
}

#[cfg(test)]
#[path = "csv_export_tests.rs"]
mod tests;
