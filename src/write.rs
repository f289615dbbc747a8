use crate::data::{
    Product, ProductId, Quantity, SalespersonKey, REPORT_DIGITS, UNKNOWN_SALESPERSON,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::HashMap;

/// Line of the sales-by-salesperson report: `name;revenue`.
#[derive(Serialize)]
struct SalespersonLine<'a> {
    name: &'a str,
    revenue: String,
}

/// Line of the sales-by-product report: `id;name;price;quantity`.
#[derive(Serialize)]
struct ProductLine<'a> {
    id: &'a str,
    name: &'a str,
    price: String,
    quantity: Quantity,
}

/// Reports are `;`-separated, without header and never quoted.
fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(b';')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never);
    builder
}

/// Two fractional digits, halves rounded away from zero, no grouping.
pub(crate) fn format_amount(amount: Decimal) -> String {
    let rounded =
        amount.round_dp_with_strategy(REPORT_DIGITS, RoundingStrategy::MidpointAwayFromZero);
    // formatting pads with zeros even where the mantissa has no room for scale 2
    format!("{:.*}", REPORT_DIGITS as usize, rounded)
}

/// Salespeople by revenue, highest first; equal revenues are ordered by key so
/// the output doesn't depend on hash map ordering. Keys missing from the
/// registry are kept, under the name "Unknown".
pub(crate) fn salesperson_ranking<'a>(
    revenue: &'a HashMap<SalespersonKey, Decimal>,
    salespeople: &'a HashMap<SalespersonKey, String>,
) -> Vec<(&'a str, Decimal)> {
    let mut ranking: Vec<_> = revenue.iter().collect();
    ranking.sort_by(|(key_a, a), (key_b, b)| b.cmp(a).then_with(|| key_a.cmp(key_b)));
    ranking
        .into_iter()
        .map(|(key, &total)| {
            let name = salespeople
                .get(key)
                .map_or(UNKNOWN_SALESPERSON, String::as_str);
            (name, total)
        })
        .collect()
}

/// Products by quantity sold, highest first, ties ordered by id. Unlike
/// salespeople, a product missing from the table is left out entirely.
pub(crate) fn product_ranking<'a>(
    quantities: &HashMap<ProductId, Quantity>,
    products: &'a HashMap<ProductId, Product>,
) -> Vec<(&'a Product, Quantity)> {
    let mut ranking: Vec<_> = quantities
        .iter()
        .filter_map(|(id, &total)| products.get(id).map(|product| (product, total)))
        .collect();
    ranking.sort_by(|(a, total_a), (b, total_b)| {
        total_b.cmp(total_a).then_with(|| a.id.cmp(&b.id))
    });
    ranking
}

/// Basic exporter for the sales-by-salesperson report
pub(crate) fn write_salesperson_report<W: std::io::Write>(
    writer: W,
    ranking: &[(&str, Decimal)],
) -> Result<(), anyhow::Error> {
    let mut wtr = writer_builder().from_writer(writer);
    for &(name, revenue) in ranking {
        wtr.serialize(SalespersonLine {
            name,
            revenue: format_amount(revenue),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Basic exporter for the sales-by-product report
pub(crate) fn write_product_report<W: std::io::Write>(
    writer: W,
    ranking: &[(&Product, Quantity)],
) -> Result<(), anyhow::Error> {
    let mut wtr = writer_builder().from_writer(writer);
    for &(product, quantity) in ranking {
        wtr.serialize(ProductLine {
            id: &product.id,
            name: &product.name,
            price: format_amount(product.price),
            quantity,
        })?;
    }
    wtr.flush()?;
    Ok(())
}
