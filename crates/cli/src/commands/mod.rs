//! CLI command implementations.

pub mod products;
pub mod search;
pub mod seed;

use bozor_core::Product;

/// One listing per line: article, name, price, shop, city, status.
fn format_product(product: &Product) -> String {
    let name = if product.model.is_empty() {
        product.name.clone()
    } else {
        format!("{} {}", product.name, product.model)
    };
    let price = if product.discount_percent.is_discounted() {
        format!(
            "{} (-{}%, was {})",
            product.effective_price().display(),
            product.discount_percent.value(),
            product.price.display()
        )
    } else {
        product.price.display()
    };
    let delivery = if product.has_delivery { "delivery" } else { "pickup" };
    format!(
        "#{:<6} {name} | {} | {price} | {}, {}, {delivery} | {} | qty {}",
        product.article_number,
        product.category.as_str(),
        product.shop_name,
        product.city,
        product.status,
        product.quantity,
    )
}

/// Print listings to stdout.
#[allow(clippy::print_stdout)]
fn print_products(products: &[Product]) {
    for product in products {
        println!("{}", format_product(product));
    }
}
