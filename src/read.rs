use crate::data::{Error, LineItem, Product, ProductId, References, SalespersonKey};
use anyhow::Context;
use csv::StringRecord;
use rust_decimal::Decimal;
use std::{
    collections::HashMap,
    fs::{self, File},
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr,
};
use tracing::{debug, info, warn};

/// Trait for doing something with a `LineItem` read from a sales file. Used by
/// the aggregation to fold items into its totals, but also by mock tests that
/// only want to see what the scanner produced.
pub(crate) trait LineItemSink {
    fn use_item(&mut self, seller: &SalespersonKey, item: LineItem) -> Result<(), Error>;
}

/// All our inputs are `;`-separated text with no header row and no quoting.
fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .quoting(false);
    builder
}

/// Number of fields on a line, not counting trailing empty ones: `P0;5;` has
/// two fields, `P0;Laptop;` too.
fn field_count(record: &StringRecord) -> usize {
    record.len() - record.iter().rev().take_while(|field| field.is_empty()).count()
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |pos| pos.line())
}

/// Plain or scientific notation. Digit separators (`1_000`) are not numbers here.
fn parse_price(text: &str) -> Option<Decimal> {
    if text.contains('_') {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

pub(crate) fn open_input(path: &Path) -> Result<File, anyhow::Error> {
    match File::open(path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(Error::MissingFile(path.to_owned()).into())
        }
        Err(e) => Err(e).with_context(|| format!("cannot open {}", path.display())),
    }
}

/// Reads `docType;docNumber;firstName;lastName` lines. Short lines are skipped.
pub(crate) fn read_salespeople<R: Read>(
    reader: R,
) -> Result<HashMap<SalespersonKey, String>, anyhow::Error> {
    let mut salespeople = HashMap::new();
    for result in reader_builder().from_reader(reader).records() {
        let record = result?;
        if field_count(&record) < 4 {
            debug!(line = line_of(&record), "skipping short salesperson line");
            continue;
        }
        let key = SalespersonKey::new(&record[0], &record[1]);
        let name = format!("{} {}", record[2].trim(), record[3].trim());
        salespeople.insert(key, name);
    }
    Ok(salespeople)
}

/// Reads `productId;productName;price` lines. Short lines are skipped, but a
/// price that doesn't parse stops everything.
pub(crate) fn read_products<R: Read>(
    reader: R,
) -> Result<HashMap<ProductId, Product>, anyhow::Error> {
    let mut products = HashMap::new();
    for result in reader_builder().from_reader(reader).records() {
        let record = result?;
        let line = line_of(&record);
        if field_count(&record) < 3 {
            debug!(line, "skipping short product line");
            continue;
        }
        let text = record[2].trim();
        let price = parse_price(text).ok_or_else(|| Error::InvalidPrice {
            line,
            value: text.to_owned(),
        })?;
        let id = record[0].trim().to_owned();
        products.insert(
            id.clone(),
            Product {
                id,
                name: record[1].trim().to_owned(),
                price,
            },
        );
    }
    Ok(products)
}

pub(crate) fn load_references(
    salespeople_path: &Path,
    products_path: &Path,
) -> Result<References, anyhow::Error> {
    let salespeople = read_salespeople(open_input(salespeople_path)?)
        .with_context(|| format!("reading {}", salespeople_path.display()))?;
    let products = read_products(open_input(products_path)?)
        .with_context(|| format!("reading {}", products_path.display()))?;
    info!(
        salespeople = salespeople.len(),
        products = products.len(),
        "reference tables loaded"
    );
    Ok(References {
        salespeople,
        products,
    })
}

/// Reads one salesperson's sales file: a `docType;docNumber` header followed by
/// `productId;quantity[;...]` lines, each handed to `sink` as soon as it's
/// parsed. Returns the number of line items produced.
///
/// An empty file, a blank first line or a short header means the file is
/// ignored altogether; a short item line is ignored on its own.
pub(crate) fn read_sales<R: Read, U: LineItemSink>(
    reader: R,
    source: &str,
    sink: &mut U,
) -> Result<usize, anyhow::Error> {
    let mut reader = BufReader::new(reader);
    let mut first_line = String::new();
    if reader.read_line(&mut first_line)? == 0 {
        debug!(source, "skipping empty sales file");
        return Ok(0);
    }
    let header = match reader_builder()
        .from_reader(first_line.as_bytes())
        .records()
        .next()
        .transpose()?
    {
        Some(header) if field_count(&header) >= 2 => header,
        _ => {
            debug!(source, "skipping sales file without a valid header");
            return Ok(0);
        }
    };
    let seller = SalespersonKey::new(&header[0], &header[1]);

    let mut count = 0;
    for result in reader_builder().from_reader(reader).records() {
        let record = result?;
        // the header was consumed before the csv reader started counting
        let line = line_of(&record) + 1;
        if field_count(&record) < 2 {
            debug!(source, line, "skipping short sales line");
            continue;
        }
        let text = record[1].trim();
        let quantity = text.parse().map_err(|_| Error::InvalidQuantity {
            file: source.to_owned(),
            line,
            value: text.to_owned(),
        })?;
        sink.use_item(
            &seller,
            LineItem {
                product: record[0].trim().to_owned(),
                quantity,
            },
        )?;
        count += 1;
    }
    Ok(count)
}

/// Feeds every regular file found directly in `dir` through `read_sales`.
/// Returns the number of files read.
pub(crate) fn scan_sales_dir<U: LineItemSink>(
    dir: &Path,
    sink: &mut U,
) -> Result<usize, anyhow::Error> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(Error::MissingDirectory(dir.to_owned()).into()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::MissingDirectory(dir.to_owned()).into())
        }
        Err(e) => return Err(e).with_context(|| format!("cannot access {}", dir.display())),
    }
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        } else {
            warn!(path = %path.display(), "not a regular file, skipping");
        }
    }
    // totals don't depend on it, but logs are easier to follow in a fixed order
    paths.sort();

    for path in &paths {
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let items = read_sales(open_input(path)?, &source, sink)
            .with_context(|| format!("reading {}", path.display()))?;
        debug!(source = %source, items, "sales file read");
    }
    info!(files = paths.len(), dir = %dir.display(), "sales folder scanned");
    Ok(paths.len())
}
