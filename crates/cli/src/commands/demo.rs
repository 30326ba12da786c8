use basket_core::config::LoadOptions;
use basket_core::{ProductId, DEMO_CART};

use crate::commands::{load_recommender, CommandResult};

/// Recommends for the fixed demo cart with every pipeline step logged.
pub fn run(options: &LoadOptions) -> CommandResult {
    let (config, recommender) = match load_recommender(options) {
        Ok(loaded) => loaded,
        Err(error) => return CommandResult::from_error("demo", &error),
    };

    let cart: Vec<ProductId> = DEMO_CART.iter().copied().map(ProductId).collect();
    let aisles = recommender.recommend_aisles(&cart, config.recommend.top_k, true);

    CommandResult { exit_code: 0, output: format!("Demo: {aisles:?}") }
}
