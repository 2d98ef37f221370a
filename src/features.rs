//! Ratio feature derivation over the raw business table

use crate::error::Result;
use crate::schema;
use polars::prelude::*;

/// Append the three ratio features and drop rows that cannot support them.
///
/// A row survives only if every column is non-null and all three derived
/// ratios are finite. Division by a zero denominator produces a non-finite
/// value and the row is dropped, not reported as an error. Output height is
/// at most input height; an empty result is left to callers to reject.
pub fn engineer(df: &DataFrame) -> Result<DataFrame> {
    schema::require_columns(
        df,
        &[
            "Annual_Revenue_Year1",
            "Annual_Revenue_Year3",
            "Assets_Year1",
            "Assets_Year3",
            "Loan_Amount_Year3",
        ],
    )?;

    let revenue_y1 = numeric_column(df, "Annual_Revenue_Year1")?;
    let revenue_y3 = numeric_column(df, "Annual_Revenue_Year3")?;
    let assets_y1 = numeric_column(df, "Assets_Year1")?;
    let assets_y3 = numeric_column(df, "Assets_Year3")?;
    let loan_y3 = numeric_column(df, "Loan_Amount_Year3")?;

    let revenue_growth = ratio(&revenue_y3, &revenue_y1, |y3, y1| (y3 - y1) / y1);
    let asset_growth = ratio(&assets_y3, &assets_y1, |y3, y1| (y3 - y1) / y1);
    let loan_dependency = ratio(&loan_y3, &revenue_y3, |loan, rev| loan / rev);

    let mut result = df.clone();
    result
        .with_column(revenue_growth.with_name("Revenue_Growth_Rate".into()).into_series())?
        .with_column(asset_growth.with_name("Asset_Growth_Rate".into()).into_series())?
        .with_column(loan_dependency.with_name("Loan_Dependency_Ratio".into()).into_series())?;

    let mask = survivor_mask(&result)?;
    Ok(result.filter(&mask)?)
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let column = df.column(name)?;
    let casted = column.cast(&DataType::Float64)?;
    Ok(casted.f64()?.clone())
}

fn ratio(
    numerator: &Float64Chunked,
    denominator: &Float64Chunked,
    op: impl Fn(f64, f64) -> f64,
) -> Float64Chunked {
    numerator
        .into_iter()
        .zip(denominator)
        .map(|(num, den)| match (num, den) {
            (Some(n), Some(d)) => Some(op(n, d)),
            _ => None,
        })
        .collect()
}

/// Rows pass when every column is non-null and every derived ratio is finite.
fn survivor_mask(df: &DataFrame) -> Result<BooleanChunked> {
    let mut mask = BooleanChunked::full("mask".into(), true, df.height());

    for column in df.get_columns() {
        let not_null = column.as_materialized_series().is_not_null();
        mask = &mask & &not_null;
    }

    for name in schema::DERIVED {
        let ca = numeric_column(df, name)?;
        let finite: BooleanChunked = ca
            .into_iter()
            .map(|v| Some(v.is_some_and(f64::is_finite)))
            .collect();
        mask = &mask & &finite;
    }

    Ok(mask)
}
