use crate::error::ReportError;
use crate::structs::{Table, Value};
use crate::transform::DATE_COLUMN;
use log::{info, warn};
use std::collections::BTreeMap;

pub const AMOUNT_COLUMN: &str = "Amount";
pub const CATEGORY_COLUMN: &str = "Category";
pub const SKU_COLUMN: &str = "SKU";
pub const TOP_PRODUCTS: usize = 10;

/// (group key, summed amount)
pub type Totals = Vec<(Value, f64)>;

/// Summary aggregations over a cleaned table. Logged, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryReport {
    pub sales_per_category: Totals,
    pub sales_over_time: Totals,
    pub top_products: Totals,
}

/// Computes and logs the three sales summaries.
///
/// - total `Amount` per `Category`
/// - total `Amount` per `Date`
/// - the ten `SKU`s with the highest total `Amount`
///
/// Groups are listed in ascending key order. The top-products ranking is a
/// stable sort on the total, so equal totals keep ascending key order. A
/// summary whose columns are missing is skipped with a warning.
///
/// # Errors
///
/// Returns `ReportError::NonNumeric` if an `Amount` cell is not a number.
pub fn analyze_data(table: &Table) -> Result<SummaryReport, ReportError> {
    info!("Starting data analysis");

    let sales_per_category = sum_by(table, CATEGORY_COLUMN)?.unwrap_or_default();
    info!(
        "Total Sales per Category:\n{}",
        render(CATEGORY_COLUMN, &sales_per_category)
    );

    let sales_over_time = sum_by(table, DATE_COLUMN)?.unwrap_or_default();
    info!(
        "Sales Over Time:\n{}",
        render(DATE_COLUMN, &sales_over_time)
    );

    let mut top_products = sum_by(table, SKU_COLUMN)?.unwrap_or_default();
    top_products.sort_by(|a, b| b.1.total_cmp(&a.1));
    top_products.truncate(TOP_PRODUCTS);
    info!(
        "Top {} Products by Sales:\n{}",
        TOP_PRODUCTS,
        render(SKU_COLUMN, &top_products)
    );

    Ok(SummaryReport {
        sales_per_category,
        sales_over_time,
        top_products,
    })
}

/// Sums `Amount` per distinct value of `group`. `None` when a column is missing.
fn sum_by(table: &Table, group: &str) -> Result<Option<Totals>, ReportError> {
    let (Some(key_idx), Some(amount_idx)) =
        (table.column_index(group), table.column_index(AMOUNT_COLUMN))
    else {
        warn!(
            "Skipping {} totals: table lacks '{}' or '{}'",
            group, group, AMOUNT_COLUMN
        );
        return Ok(None);
    };

    let mut totals: BTreeMap<&Value, f64> = BTreeMap::new();
    for (i, row) in table.rows().iter().enumerate() {
        let amount = match &row[amount_idx] {
            Value::Null => continue,
            value => value.as_f64().ok_or_else(|| ReportError::NonNumeric {
                row: i + 1,
                value: value.to_string(),
            })?,
        };
        *totals.entry(&row[key_idx]).or_insert(0.0) += amount;
    }

    Ok(Some(
        totals
            .into_iter()
            .map(|(key, sum)| (key.clone(), sum))
            .collect(),
    ))
}

fn render(label: &str, totals: &Totals) -> String {
    let width = totals
        .iter()
        .map(|(key, _)| key.to_string().len())
        .chain(std::iter::once(label.len()))
        .max()
        .unwrap_or(0);

    let mut lines = vec![format!("{:<width$}  {:>12}", label, AMOUNT_COLUMN)];
    lines.extend(
        totals
            .iter()
            .map(|(key, sum)| format!("{:<width$}  {:>12.2}", key.to_string(), sum)),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn sales(rows: Vec<(&str, &str, f64)>) -> Table {
        Table::new(
            vec!["Category".into(), "SKU".into(), "Amount".into()],
            rows.into_iter()
                .map(|(c, s, a)| vec![text(c), text(s), Value::Float(a)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn sums_amount_per_category() {
        let table = sales(vec![("X", "a", 10.0), ("X", "b", 5.0), ("Y", "c", 3.0)]);

        let report = analyze_data(&table).unwrap();
        assert_eq!(
            report.sales_per_category,
            vec![(text("X"), 15.0), (text("Y"), 3.0)]
        );
    }

    #[test]
    fn top_products_are_ranked_and_capped() {
        let rows: Vec<(String, f64)> = (0..12).map(|i| (format!("SKU-{:02}", i), i as f64)).collect();
        let table = sales(
            rows.iter()
                .map(|(sku, amount)| ("Set", sku.as_str(), *amount))
                .collect(),
        );

        let report = analyze_data(&table).unwrap();
        assert_eq!(report.top_products.len(), TOP_PRODUCTS);
        assert_eq!(report.top_products[0], (text("SKU-11"), 11.0));
        assert_eq!(report.top_products[9], (text("SKU-02"), 2.0));
    }

    #[test]
    fn tied_totals_keep_key_order() {
        let table = sales(vec![("X", "b", 5.0), ("X", "a", 5.0), ("X", "c", 7.0)]);

        let report = analyze_data(&table).unwrap();
        let order: Vec<String> = report
            .top_products
            .iter()
            .map(|(sku, _)| sku.to_string())
            .collect();
        assert_eq!(order, ["c", "a", "b"]);
    }

    #[test]
    fn missing_columns_skip_that_summary() {
        let table = sales(vec![("X", "a", 1.0)]);

        let report = analyze_data(&table).unwrap();
        assert!(report.sales_over_time.is_empty());
        assert_eq!(report.sales_per_category.len(), 1);
    }

    #[test]
    fn sums_amount_per_date_in_date_order() {
        let day = |d: u32| {
            Value::Timestamp(
                chrono::NaiveDate::from_ymd_opt(2022, 4, d)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
            )
        };
        let table = Table::new(
            vec!["Date".into(), "Amount".into()],
            vec![
                vec![day(30), Value::Float(647.62)],
                vec![day(29), Value::Float(329.0)],
                vec![day(30), Value::Float(406.0)],
            ],
        )
        .unwrap();

        let report = analyze_data(&table).unwrap();
        assert_eq!(report.sales_over_time.len(), 2);
        assert_eq!(report.sales_over_time[0], (day(29), 329.0));
        assert_eq!(report.sales_over_time[1].0, day(30));
        assert!((report.sales_over_time[1].1 - 1053.62).abs() < 1e-9);
    }

    #[test]
    fn integer_amounts_are_summed() {
        let table = Table::new(
            vec!["Category".into(), "Amount".into()],
            vec![
                vec![text("X"), Value::Integer(2)],
                vec![text("X"), Value::Integer(3)],
            ],
        )
        .unwrap();

        let report = analyze_data(&table).unwrap();
        assert_eq!(report.sales_per_category, vec![(text("X"), 5.0)]);
    }

    #[test]
    fn text_amount_is_rejected() {
        let table = Table::new(
            vec!["Category".into(), "Amount".into()],
            vec![vec![text("X"), text("ten")]],
        )
        .unwrap();

        assert!(matches!(
            analyze_data(&table),
            Err(ReportError::NonNumeric { row: 1, .. })
        ));
    }

    #[test]
    fn rendered_summary_lists_every_group() {
        let totals = vec![(text("Set"), 647.62), (text("kurta"), 406.0)];
        let out = render("Category", &totals);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Set"));
        assert!(lines[1].ends_with("647.62"));
        assert!(lines[2].ends_with("406.00"));
    }
}
