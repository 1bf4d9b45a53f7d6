//! Cart commands.

use pocketshop_client::ItemId;
use pocketshop_core::format_price;
use tracing::info;

use super::{CommandError, Context, item_row};

#[allow(clippy::print_stdout)]
pub fn show(ctx: &Context) {
    let lines = ctx.store.cart_lines();
    if lines.is_empty() {
        println!("Cart is empty");
        return;
    }

    for line in &lines {
        println!(
            "{}  x{:<3} {:>10}",
            item_row(&line.item),
            line.quantity,
            format_price(line.total())
        );
    }
    println!(
        "{} items in {} lines, total {}",
        ctx.store.cart_item_count(),
        ctx.store.line_count(),
        format_price(ctx.store.cart_total())
    );
}

/// Fetch the item and add `quantity` of it.
pub async fn add(ctx: &Context, id: ItemId, quantity: u32) -> Result<(), CommandError> {
    let item = ctx.catalog.item(id).await?;
    ctx.store.add_to_cart(&item, quantity);
    info!(
        item_id = %id,
        quantity = ctx.store.quantity_in_cart(id),
        "Added to cart"
    );
    show(ctx);
    Ok(())
}

pub fn set(ctx: &Context, id: ItemId, quantity: i64) {
    if ctx.store.quantity_in_cart(id) == 0 {
        info!(item_id = %id, "Item is not in the cart");
        return;
    }
    ctx.store.set_quantity(id, quantity);
    show(ctx);
}

pub fn remove(ctx: &Context, id: ItemId) {
    if !ctx.store.remove_from_cart(id) {
        info!(item_id = %id, "Item is not in the cart");
    }
    show(ctx);
}

pub fn clear(ctx: &Context) {
    ctx.store.clear_cart();
    show(ctx);
}
