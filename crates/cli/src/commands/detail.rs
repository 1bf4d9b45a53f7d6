//! Detail view command.

use pocketshop_client::{ConfirmOutcome, DetailMode, DetailSession, ItemId};
use pocketshop_core::format_price;

use super::{CommandError, Context};

/// Open the detail session for `id`, set `quantity` and confirm.
#[allow(clippy::print_stdout)]
pub async fn confirm(ctx: &Context, id: ItemId, quantity: u32) -> Result<(), CommandError> {
    let item = ctx.catalog.item(id).await?;
    let mut session = DetailSession::open(&ctx.store, item);

    let mode = match session.mode() {
        DetailMode::Fresh => "not in cart",
        DetailMode::EditingExisting => "already in cart",
    };
    println!(
        "{} ({mode}), starting quantity {}",
        session.item().title,
        session.quantity()
    );

    session.set_quantity(quantity);
    match session.confirm(&ctx.store) {
        ConfirmOutcome::Added { quantity } => println!("Added {quantity} to cart"),
        ConfirmOutcome::Updated { quantity } => println!("Updated cart quantity to {quantity}"),
    }

    println!(
        "Cart now holds {} of this item, {}",
        ctx.store.quantity_in_cart(id),
        format_price(ctx.store.line_total(id))
    );
    Ok(())
}
