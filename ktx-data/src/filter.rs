use ktx_core::{FilterCriteria, KtxError, Result, Table};

/// Narrow `table` to the selected stations and inclusive date interval.
///
/// The interval is re-validated here even though the controls already clamp
/// it. Row order is preserved and the input table is left untouched.
///
/// # Errors
///
/// * `InvalidDateRange` if `date_from` is after `date_to`
/// * `EmptyResult` if no row survives
pub fn filter(table: &Table, criteria: &FilterCriteria) -> Result<Table> {
    criteria.validate()?;

    let filtered = table.select(|record| criteria.matches(record));
    log::info!(
        "[KTX] filter: kept {} of {} rows ({} stations, {} to {})",
        filtered.len(),
        table.len(),
        criteria.stations.len(),
        criteria.date_from,
        criteria.date_to
    );

    if filtered.is_empty() {
        return Err(KtxError::EmptyResult);
    }
    Ok(filtered)
}
