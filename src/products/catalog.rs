use std::collections::BTreeSet;

use storefront_api::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Products in `category`; an empty category or `"all"` keeps everything
pub fn filter_by_category<'a>(products: &'a [Product], category: &str) -> Vec<&'a Product> {
    if category.is_empty() || category.eq_ignore_ascii_case("all") {
        return products.iter().collect();
    }
    products.iter().filter(|p| p.category == category).collect()
}

/// Stable sort by price
pub fn sort_by_price(products: &mut [&Product], order: SortOrder) {
    products.sort_by(|a, b| {
        let ord = a.price.total_cmp(&b.price);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// Distinct non-empty categories, sorted
pub fn categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .filter(|p| !p.category.is_empty())
        .map(|p| p.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
