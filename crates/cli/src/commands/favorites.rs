//! Favorites commands.

use pocketshop_client::ItemId;
use tracing::info;

use super::{CommandError, Context, item_row};

#[allow(clippy::print_stdout)]
pub fn list(ctx: &Context) {
    let favorites = ctx.store.favorites();
    if favorites.is_empty() {
        println!("No favorites");
        return;
    }
    for item in &favorites {
        println!("{}", item_row(item));
    }
}

pub async fn add(ctx: &Context, id: ItemId) -> Result<(), CommandError> {
    if ctx.store.is_favorite(id) {
        info!(item_id = %id, "Already a favorite");
        return Ok(());
    }
    let item = ctx.catalog.item(id).await?;
    ctx.store.add_to_favorites(&item);
    info!(item_id = %id, title = %item.title, "Added to favorites");
    Ok(())
}

pub fn remove(ctx: &Context, id: ItemId) {
    if ctx.store.remove_from_favorites(id) {
        info!(item_id = %id, "Removed from favorites");
    } else {
        info!(item_id = %id, "Not a favorite");
    }
}

pub fn clear(ctx: &Context) {
    ctx.store.clear_favorites();
    info!("Favorites cleared");
}
