//! Home screen: discounted picks and search.

use bozor_core::Product;
use bozor_core::search::{self, SearchCriteria, SearchOutcome};

use crate::db::ProductRepository;
use crate::error::Result;
use crate::state::AppState;

/// Discounted picks for the home screen.
///
/// # Errors
///
/// Returns an error if the listings cannot be fetched.
pub async fn recommended(state: &AppState) -> Result<Vec<Product>> {
    Ok(ProductRepository::new(state.store())
        .recommended_products(state.recommended_min_discount(), state.recommended_limit())
        .await?)
}

/// Run a search: equality filters in the store, everything else here.
///
/// # Errors
///
/// Returns an error if the listings cannot be fetched.
#[tracing::instrument(skip(state))]
pub async fn search(state: &AppState, criteria: &SearchCriteria) -> Result<SearchOutcome> {
    let products = ProductRepository::new(state.store())
        .get_products(&criteria.filter)
        .await?;
    let outcome = search::compose(products, criteria);
    tracing::debug!(results = outcome.products().len(), "Search finished");
    Ok(outcome)
}
