use crate::{
    data::{Error, LineItem, Product, ProductId, Quantity, SalespersonKey},
    read::LineItemSink,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

/// This is where the running totals are stored; entries are created on the fly
/// the first time a salesperson or product gets credited. Prices come from the
/// product table borrowed for the whole run. Single-threaded, so no protections
/// for MT.
#[derive(Debug)]
pub(crate) struct Sales<'r> {
    products: &'r HashMap<ProductId, Product>,
    pub revenue: HashMap<SalespersonKey, Decimal>,
    pub quantities: HashMap<ProductId, Quantity>,
}

impl<'r> Sales<'r> {
    pub fn new(products: &'r HashMap<ProductId, Product>) -> Self {
        Self {
            products,
            revenue: HashMap::new(),
            quantities: HashMap::new(),
        }
    }
}

/// The join: a line item counts only if its product is known, in which case it
/// credits both the salesperson (in money) and the product (in units). Orphans
/// are dropped without a fuss. Quantities go in with whatever sign they have.
impl LineItemSink for Sales<'_> {
    fn use_item(&mut self, seller: &SalespersonKey, item: LineItem) -> Result<(), Error> {
        let Some(product) = self.products.get(&item.product) else {
            debug!(%seller, product = %item.product, "unknown product, dropping line item");
            return Ok(());
        };
        let amount = Decimal::from(item.quantity)
            .checked_mul(product.price)
            .ok_or_else(|| Error::Overflow(format!("revenue of {}", item.product)))?;

        let revenue = self.revenue.entry(seller.clone()).or_default();
        *revenue = revenue
            .checked_add(amount)
            .ok_or_else(|| Error::Overflow(format!("revenue of {seller}")))?;

        let quantity = self.quantities.entry(item.product).or_default();
        *quantity = quantity
            .checked_add(item.quantity)
            .ok_or_else(|| Error::Overflow(format!("quantity of {}", product.id)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        data::{Error, LineItem, Product, ProductId, SalespersonKey},
        read::LineItemSink,
    };
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    use super::Sales;

    fn catalog() -> HashMap<ProductId, Product> {
        [("P0", "Laptop", dec!(1000.00)), ("P1", "Mouse", dec!(12.50))]
            .into_iter()
            .map(|(id, name, price)| {
                (
                    id.to_owned(),
                    Product {
                        id: id.to_owned(),
                        name: name.to_owned(),
                        price,
                    },
                )
            })
            .collect()
    }

    fn item(product: &str, quantity: i64) -> LineItem {
        LineItem {
            product: product.to_owned(),
            quantity,
        }
    }

    #[test]
    fn test_single_sale() {
        let products = catalog();
        let mut sales = Sales::new(&products);
        let ana = SalespersonKey::new("CC", "123");
        sales.use_item(&ana, item("P0", 5)).unwrap();
        assert_eq!(sales.revenue, HashMap::from([(ana, dec!(5000.00))]));
        assert_eq!(sales.quantities, HashMap::from([("P0".to_owned(), 5)]));
    }

    #[test]
    fn test_accumulates_per_key() {
        let products = catalog();
        let mut sales = Sales::new(&products);
        let ana = SalespersonKey::new("CC", "1");
        let luis = SalespersonKey::new("TI", "2");
        sales.use_item(&ana, item("P0", 1)).unwrap();
        sales.use_item(&ana, item("P1", 4)).unwrap();
        sales.use_item(&luis, item("P1", 2)).unwrap();
        assert_eq!(sales.revenue[&ana], dec!(1050.00));
        assert_eq!(sales.revenue[&luis], dec!(25.00));
        assert_eq!(sales.quantities["P0"], 1);
        assert_eq!(sales.quantities["P1"], 6);
    }

    #[test]
    fn test_unknown_product_is_dropped() {
        let products = catalog();
        let mut sales = Sales::new(&products);
        let ana = SalespersonKey::new("CC", "1");
        sales.use_item(&ana, item("P9", 3)).unwrap();
        assert!(sales.revenue.is_empty());
        assert!(sales.quantities.is_empty());
    }

    #[test]
    fn test_negative_quantity_is_subtracted() {
        let products = catalog();
        let mut sales = Sales::new(&products);
        let ana = SalespersonKey::new("CC", "1");
        sales.use_item(&ana, item("P1", 2)).unwrap();
        sales.use_item(&ana, item("P1", -6)).unwrap();
        assert_eq!(sales.revenue[&ana], dec!(-50.00));
        assert_eq!(sales.quantities["P1"], -4);
    }

    #[test]
    fn test_overflow() {
        let products = HashMap::from([(
            "BIG".to_owned(),
            Product {
                id: "BIG".into(),
                name: "Big".into(),
                price: Decimal::MAX,
            },
        )]);
        let mut sales = Sales::new(&products);
        let ana = SalespersonKey::new("CC", "1");
        assert_eq!(
            sales.use_item(&ana, item("BIG", 2)),
            Err(Error::Overflow("revenue of BIG".into()))
        );
    }

    fn sale() -> impl Strategy<Value = (u8, u8, i64)> {
        (0u8..4, 0u8..3, -20i64..=20)
    }

    proptest! {
        #[test]
        fn test_order_does_not_matter(items in prop::collection::vec(sale(), 0..40), seed in any::<u64>()) {
            let products = catalog();
            let feed = |items: &[(u8, u8, i64)]| {
                let mut sales = Sales::new(&products);
                for &(seller, product, quantity) in items {
                    let seller = SalespersonKey::new("CC", &seller.to_string());
                    sales.use_item(&seller, item(&format!("P{product}"), quantity)).unwrap();
                }
                (sales.revenue, sales.quantities)
            };
            let mut shuffled = items.clone();
            // Fisher-Yates, driven by the seed
            for i in (1..shuffled.len()).rev() {
                let j = (seed.rotate_left(i as u32) as usize) % (i + 1);
                shuffled.swap(i, j);
            }
            prop_assert_eq!(feed(&items), feed(&shuffled));
        }

        #[test]
        fn test_revenue_matches_accepted_items(items in prop::collection::vec(sale(), 0..40)) {
            let products = catalog();
            let mut sales = Sales::new(&products);
            let mut expected = Decimal::ZERO;
            for &(seller, product, quantity) in &items {
                let id = format!("P{product}");
                if let Some(p) = products.get(&id) {
                    expected += Decimal::from(quantity) * p.price;
                }
                let seller = SalespersonKey::new("CC", &seller.to_string());
                sales.use_item(&seller, item(&id, quantity)).unwrap();
            }
            prop_assert_eq!(sales.revenue.values().copied().sum::<Decimal>(), expected);
        }
    }
}
