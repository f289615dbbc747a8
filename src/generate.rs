use crate::data::{PRODUCTS_FILE, SALES_DIR, SELLERS_FILE};
use anyhow::Context;
use rand::Rng;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};
use tracing::{debug, info};

const FIRST_NAMES: [&str; 4] = ["Ana", "Luis", "Camila", "Sergio"];
const SURNAMES: [&str; 4] = ["barajas", "valenzuela", "rincon", "garcia"];
const DOC_TYPES: [&str; 3] = ["CC", "TI", "CE"];
const PRODUCT_NAMES: [&str; 7] = [
    "Laptop",
    "Phone",
    "Keyboard",
    "Mouse",
    "Monitor",
    "Headphones",
    "Speaker",
];
const FIRST_SELLER_ID: u64 = 10_000_000;
const MAX_QUANTITY: i64 = 20;

/// How much data to make up.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fixture {
    pub sellers: usize,
    pub products: usize,
    pub sales_per_seller: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Seller {
    pub doc_type: &'static str,
    pub id: u64,
    pub first_name: &'static str,
    pub last_name: &'static str,
}

fn pick<R: Rng>(rng: &mut R, words: &[&'static str]) -> &'static str {
    words[rng.gen_range(0..words.len())]
}

/// Writes `count` sellers with consecutive ids and returns them.
pub(crate) fn write_sellers<W: Write, R: Rng>(
    mut writer: W,
    rng: &mut R,
    count: usize,
) -> std::io::Result<Vec<Seller>> {
    let mut sellers = Vec::with_capacity(count);
    for id in (FIRST_SELLER_ID..).take(count) {
        let seller = Seller {
            doc_type: pick(rng, &DOC_TYPES),
            id,
            first_name: pick(rng, &FIRST_NAMES),
            last_name: pick(rng, &SURNAMES),
        };
        writeln!(
            writer,
            "{};{};{};{}",
            seller.doc_type, seller.id, seller.first_name, seller.last_name
        )?;
        sellers.push(seller);
    }
    writer.flush()?;
    Ok(sellers)
}

/// Writes products `P0..P{count}`, priced between 1000 and 99999.
pub(crate) fn write_products<W: Write, R: Rng>(
    mut writer: W,
    rng: &mut R,
    count: usize,
) -> std::io::Result<()> {
    for i in 0..count {
        let name = pick(rng, &PRODUCT_NAMES);
        let price: u32 = rng.gen_range(1000..100_000);
        writeln!(writer, "P{i};{name}{i};{price}")?;
    }
    writer.flush()
}

/// Writes one seller's sales file, drawing from the first `products` products.
pub(crate) fn write_sales<W: Write, R: Rng>(
    mut writer: W,
    rng: &mut R,
    seller: &Seller,
    products: usize,
    count: usize,
) -> std::io::Result<()> {
    writeln!(writer, "{};{}", seller.doc_type, seller.id)?;
    for _ in 0..count {
        let product = rng.gen_range(0..products);
        let quantity = rng.gen_range(1..=MAX_QUANTITY);
        writeln!(writer, "P{product};{quantity};")?;
    }
    writer.flush()
}

fn create(path: &Path) -> Result<BufWriter<File>, anyhow::Error> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Lays out a complete input set under `dir`: both registries plus a sales
/// folder holding one file per seller. Files left in the sales folder by an
/// earlier run are removed first.
pub(crate) fn generate<R: Rng>(
    dir: &Path,
    fixture: Fixture,
    rng: &mut R,
) -> Result<(), anyhow::Error> {
    anyhow::ensure!(
        fixture.products > 0 || fixture.sales_per_seller == 0,
        "cannot generate sales without any product"
    );
    let sales_dir = dir.join(SALES_DIR);
    fs::create_dir_all(&sales_dir)
        .with_context(|| format!("cannot create {}", sales_dir.display()))?;
    for entry in fs::read_dir(&sales_dir)? {
        let path = entry?.path();
        if path.is_file() {
            debug!(path = %path.display(), "removing old sales file");
            fs::remove_file(&path)
                .with_context(|| format!("cannot remove {}", path.display()))?;
        }
    }

    let sellers = write_sellers(create(&dir.join(SELLERS_FILE))?, rng, fixture.sellers)?;
    write_products(create(&dir.join(PRODUCTS_FILE))?, rng, fixture.products)?;
    for seller in &sellers {
        let path = sales_dir.join(format!("sales_{}.txt", seller.id));
        write_sales(
            create(&path)?,
            rng,
            seller,
            fixture.products,
            fixture.sales_per_seller,
        )?;
    }
    info!(
        sellers = fixture.sellers,
        products = fixture.products,
        dir = %dir.display(),
        "input files generated"
    );
    Ok(())
}
