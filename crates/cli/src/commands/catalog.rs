//! Catalog browsing commands.

use pocketshop_client::{Filter, ItemId};
use pocketshop_core::format_price;
use tracing::info;

use super::{CommandError, Context, item_row};

/// Print every category tag.
#[allow(clippy::print_stdout)]
pub async fn categories(ctx: &Context) -> Result<(), CommandError> {
    for category in ctx.catalog.categories().await? {
        println!("{category}");
    }
    Ok(())
}

/// Load up to `pages` pages for `category` and print them.
#[allow(clippy::print_stdout)]
pub async fn browse(
    ctx: &Context,
    category: Option<String>,
    pages: usize,
) -> Result<(), CommandError> {
    let filter = Filter::from(category);
    info!(filter = %filter, pages, "Browsing catalog");

    ctx.catalog.set_filter(filter).await;
    while ctx.catalog.pages().len() < pages && ctx.catalog.has_more() {
        let before = ctx.catalog.pages().len();
        ctx.catalog.fetch_next_page().await;
        if ctx.catalog.last_error().is_some() || ctx.catalog.pages().len() == before {
            break;
        }
    }

    if let Some(e) = ctx.catalog.last_error() {
        return Err(CommandError::Fetch(e));
    }

    for page in ctx.catalog.pages() {
        println!("-- page {} ({} items) --", page.index + 1, page.items.len());
        for item in &page.items {
            println!("{}", item_row(item));
        }
    }
    println!(
        "{} items shown, more available: {}",
        ctx.catalog.flattened_items().len(),
        if ctx.catalog.has_more() { "yes" } else { "no" }
    );
    Ok(())
}

/// Print one item with its cart and favorite status.
#[allow(clippy::print_stdout)]
pub async fn show(ctx: &Context, id: ItemId) -> Result<(), CommandError> {
    let item = ctx.catalog.item(id).await?;

    println!("#{} {}", item.id, item.title);
    println!("Category: {}", item.category);
    println!("Price:    {}", format_price(item.price));
    println!("Rating:   {:.1} ({} reviews)", item.rating.rate, item.rating.count);
    println!("In cart:  {}", ctx.store.quantity_in_cart(id));
    println!("Favorite: {}", if ctx.store.is_favorite(id) { "yes" } else { "no" });
    if !item.description.is_empty() {
        println!();
        println!("{}", item.description);
    }
    Ok(())
}
