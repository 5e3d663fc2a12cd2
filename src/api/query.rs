//! Cheapest-first selection over the listings table

use serde_json::{Map, Value};
use std::cmp::Ordering;

use super::store::{is_na, StoreError, Table};
use crate::models::COST_COLUMN;

/// Numeric reading of a cost cell; anything non-numeric is missing
pub fn coerce_cost(value: &str) -> Option<f64> {
    if is_na(value) {
        return None;
    }
    value.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The `limit` cheapest rows as JSON objects keyed by column name.
///
/// Rows with equal cost keep their file order; rows without a numeric
/// cost come last and carry a `null` cost. Missing values become `null`.
pub fn cheapest(table: &Table, limit: usize) -> Result<Vec<Map<String, Value>>, StoreError> {
    let cost_idx = table
        .column(COST_COLUMN)
        .ok_or_else(|| StoreError::MissingColumn(COST_COLUMN.to_string()))?;

    let mut ranked: Vec<(Option<f64>, &Vec<String>)> = table
        .rows
        .iter()
        .map(|row| (row.get(cost_idx).and_then(|c| coerce_cost(c)), row))
        .collect();
    ranked.sort_by(|a, b| missing_last(a.0, b.0));

    Ok(ranked
        .into_iter()
        .take(limit)
        .map(|(cost, row)| {
            table
                .headers
                .iter()
                .enumerate()
                .map(|(idx, header)| {
                    let value = match row.get(idx) {
                        Some(_) if idx == cost_idx && cost.is_none() => Value::Null,
                        Some(v) if !is_na(v) => Value::String(v.clone()),
                        _ => Value::Null,
                    };
                    (header.clone(), value)
                })
                .collect()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn table(csv: &str) -> Table {
        Table::parse(csv.as_bytes(), Path::new("test.csv")).unwrap()
    }

    const HEADER: &str = "Title,Address,Headline Room Type,Cost (AUD),Review Score,# of Reviews\n";

    #[test]
    fn sorts_numeric_with_missing_last() {
        let t = table(&format!(
            "{HEADER}Pricey,A,Room,100,8.0,10\nOdd,B,Room,bad,N/A,N/A\nCheap,C,Room,50,9.1,3\n"
        ));
        let rows = cheapest(&t, 50).unwrap();

        let titles: Vec<_> = rows.iter().map(|r| r["Title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["Cheap", "Pricey", "Odd"]);
        assert_eq!(rows[0]["Cost (AUD)"], Value::String("50".to_string()));
        assert_eq!(rows[2]["Cost (AUD)"], Value::Null);
        assert_eq!(rows[2]["Review Score"], Value::Null);
        assert_eq!(rows[2]["Address"], Value::String("B".to_string()));
    }

    #[test]
    fn ties_keep_file_order() {
        let t = table(&format!(
            "{HEADER}First,A,R,75.5,N/A,N/A\nSecond,B,R,75.50,N/A,N/A\nZero,C,R,0,N/A,N/A\n"
        ));
        let rows = cheapest(&t, 50).unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r["Title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["Zero", "First", "Second"]);
    }

    #[test]
    fn never_more_than_limit() {
        let mut csv = HEADER.to_string();
        for i in 0..10_000 {
            csv.push_str(&format!("Hotel {i},Addr {i},Room,{},8,1\n", 10_000 - i));
        }
        let rows = cheapest(&table(&csv), 50).unwrap();

        assert_eq!(rows.len(), 50);
        assert_eq!(rows[0]["Title"], Value::String("Hotel 9999".to_string()));
        assert_eq!(rows[49]["Cost (AUD)"], Value::String("50".to_string()));
    }

    #[test]
    fn objects_keep_every_column_and_nothing_else() {
        let t = table(&format!("{HEADER}Solo,Somewhere,Studio,99,7,12\n"));
        let rows = cheapest(&t, 50).unwrap();
        assert_eq!(rows[0].len(), 6);
        assert!(rows[0].contains_key("# of Reviews"));
    }

    #[test]
    fn missing_cost_column_is_an_error() {
        let t = table("Title,Address\nA,B\n");
        assert!(matches!(cheapest(&t, 50), Err(StoreError::MissingColumn(_))));
    }

    #[test]
    fn coercion() {
        assert_eq!(coerce_cost("1234.00"), Some(1234.0));
        assert_eq!(coerce_cost(" 12 "), Some(12.0));
        assert_eq!(coerce_cost("N/A"), None);
        assert_eq!(coerce_cost("NaN"), None);
        assert_eq!(coerce_cost("1,234"), None);
    }
}
