use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::db::product_repository::ProductRepository;
use crate::errors::ApiError;
use crate::models::product::{
    CatalogFilters, CatalogPage, CatalogQuery, Product, ProductFilter, ProductSummary, SortColumn,
    SortDirection,
};

const TOP_LIMIT: usize = 8;
const SEARCH_LIMIT: usize = 5;

/// Store-branded categories that never show up in category listings.
fn is_hidden_category(category: &str) -> bool {
    category.contains("Steam") || category.contains("Valve")
}

fn parse_sort(query: &CatalogQuery) -> Result<(SortColumn, SortDirection), ApiError> {
    let column = match query.sort_column.as_str() {
        "gameTitle" => SortColumn::GameTitle,
        "price" => SortColumn::Price,
        "devCompany" => SortColumn::DevCompany,
        _ => return Err(ApiError::bad_request("Invalid sortColumn")),
    };
    let direction = match query.sort_direction.as_str() {
        "up" => SortDirection::Up,
        "down" => SortDirection::Down,
        _ => return Err(ApiError::bad_request("Invalid sortDirection")),
    };
    Ok((column, direction))
}

fn compare(a: &Product, b: &Product, column: SortColumn) -> Ordering {
    let primary = match column {
        SortColumn::GameTitle => a.game_title.cmp(&b.game_title),
        SortColumn::Price => a.effective_price().cmp(&b.effective_price()),
        SortColumn::DevCompany => a.dev_company.cmp(&b.dev_company),
    };
    primary.then_with(|| a.game_title.cmp(&b.game_title))
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values.cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Names ordered by descending count, ties by name, capped at `limit`.
fn top_by_count<'a>(names: impl Iterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(name, _)| name.to_string())
        .collect()
}

pub struct ProductService {
    products: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    async fn all_products(&self) -> Result<Vec<Product>, ApiError> {
        Ok(self.products.find_products(&ProductFilter::default()).await?)
    }

    pub async fn get_product(&self, title: &str) -> Result<Product, ApiError> {
        self.products
            .find_product_by_title(title)
            .await?
            .ok_or_else(|| {
                ApiError::bad_request(format!("Product with title \"{}\" not found", title))
            })
    }

    pub async fn random_products(&self, count: usize) -> Result<Vec<Product>, ApiError> {
        let products = self.products.sample_products(count, false).await?;
        if products.is_empty() {
            return Err(ApiError::bad_request("No random products found"));
        }
        Ok(products)
    }

    pub async fn random_discounted_products(&self, count: usize) -> Result<Vec<Product>, ApiError> {
        let products = self.products.sample_products(count, true).await?;
        if products.is_empty() {
            return Err(ApiError::bad_request(
                "No random products with discount found",
            ));
        }
        Ok(products)
    }

    pub async fn catalog(&self, query: CatalogQuery) -> Result<CatalogPage, ApiError> {
        let (column, direction) = parse_sort(&query)?;
        if query.page_number == 0 || query.page_limit == 0 {
            return Err(ApiError::bad_request(
                "pageNumber and pageLimit must be positive",
            ));
        }

        let filter = ProductFilter {
            tags: query.tags,
            themes: query.themes,
            genres: query.genres,
            min_price: query.min_price,
            max_price: query.max_price,
        };
        let mut matched = self.products.find_products(&filter).await?;

        let filters = CatalogFilters {
            themes: distinct_sorted(matched.iter().flat_map(|p| &p.game_theme)),
            genres: distinct_sorted(matched.iter().flat_map(|p| &p.game_genre)),
            tags: distinct_sorted(matched.iter().flat_map(|p| &p.category)),
        };
        let total_products = matched.len();

        matched.sort_by(|a, b| match direction {
            SortDirection::Up => compare(a, b, column),
            SortDirection::Down => compare(b, a, column),
        });
        let skip = (query.page_number as usize - 1).saturating_mul(query.page_limit as usize);
        let products = matched
            .into_iter()
            .skip(skip)
            .take(query.page_limit as usize)
            .collect();

        Ok(CatalogPage {
            products,
            filters,
            total_products,
        })
    }

    pub async fn all_categories(&self) -> Result<Vec<String>, ApiError> {
        let products = self.all_products().await?;
        Ok(distinct_sorted(
            products
                .iter()
                .flat_map(|p| &p.category)
                .filter(|c| !is_hidden_category(c)),
        ))
    }

    pub async fn top_categories(&self) -> Result<Vec<String>, ApiError> {
        let products = self.all_products().await?;
        Ok(top_by_count(
            products
                .iter()
                .flat_map(|p| p.category.iter().map(String::as_str))
                .filter(|c| !is_hidden_category(c)),
            TOP_LIMIT,
        ))
    }

    pub async fn top_first_genres(&self) -> Result<Vec<String>, ApiError> {
        let products = self.all_products().await?;
        Ok(top_by_count(
            products
                .iter()
                .filter_map(|p| p.game_genre.first().map(String::as_str)),
            TOP_LIMIT,
        ))
    }

    pub async fn top_first_themes(&self) -> Result<Vec<String>, ApiError> {
        let products = self.all_products().await?;
        Ok(top_by_count(
            products
                .iter()
                .filter_map(|p| p.game_theme.first().map(String::as_str)),
            TOP_LIMIT,
        ))
    }

    pub async fn search(&self, query: &str) -> Result<Vec<ProductSummary>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::bad_request("Search query is required"));
        }
        let results = self.products.search_titles(query, SEARCH_LIMIT).await?;
        if results.is_empty() {
            return Err(ApiError::bad_request("No products found"));
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;
    use rust_decimal::Decimal;

    fn query(column: &str, direction: &str) -> CatalogQuery {
        CatalogQuery {
            page_number: 1,
            page_limit: 100,
            sort_column: column.into(),
            sort_direction: direction.into(),
            tags: vec![],
            themes: vec![],
            genres: vec![],
            min_price: None,
            max_price: None,
        }
    }

    fn titles(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.game_title.as_str()).collect()
    }

    #[test]
    fn ranking_breaks_ties_by_name() {
        let names = ["b", "a", "c", "c", "b", "a", "d"];
        assert_eq!(top_by_count(names.into_iter(), 3), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn catalog_rejects_unknown_sort() {
        let state = test_state();
        assert!(state.products.catalog(query("rating", "up")).await.is_err());
        assert!(state.products.catalog(query("price", "sideways")).await.is_err());
    }

    #[tokio::test]
    async fn catalog_sorts_by_effective_price_and_pages() {
        let state = test_state();
        let page = state.products.catalog(query("price", "down")).await.unwrap();
        let prices: Vec<Decimal> = page.products.iter().map(|p| p.effective_price()).collect();
        let mut sorted = prices.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(prices, sorted);

        let mut second = query("gameTitle", "up");
        second.page_limit = 2;
        second.page_number = 2;
        let page2 = state.products.catalog(second).await.unwrap();
        assert_eq!(page2.products.len(), 2);
        assert_eq!(page2.total_products, page.total_products);

        let all = state.products.catalog(query("gameTitle", "up")).await.unwrap();
        assert_eq!(titles(&page2.products), titles(&all.products[2..4]));
    }

    #[tokio::test]
    async fn catalog_filters_and_reports_facets() {
        let state = test_state();
        let mut q = query("gameTitle", "up");
        q.themes = vec!["Sci-fi".into()];
        q.max_price = Some(Decimal::new(50, 0));

        let page = state.products.catalog(q).await.unwrap();
        assert!(page
            .products
            .iter()
            .all(|p| p.game_theme.contains(&"Sci-fi".to_string())
                && p.effective_price() <= Decimal::new(50, 0)));
        assert_eq!(page.total_products, page.products.len());
        let mut sorted = page.filters.genres.clone();
        sorted.sort();
        assert_eq!(page.filters.genres, sorted);
        assert!(page.filters.themes.contains(&"Sci-fi".to_string()));
    }

    #[tokio::test]
    async fn categories_hide_store_branding() {
        let state = test_state();
        let categories = state.products.all_categories().await.unwrap();
        assert!(!categories.iter().any(|c| c.contains("Steam") || c.contains("Valve")));
        assert!(categories.contains(&"Single-player".to_string()));

        let top = state.products.top_categories().await.unwrap();
        assert!(top.len() <= TOP_LIMIT);
        assert!(!top.iter().any(|c| c.contains("Steam")));
    }

    #[tokio::test]
    async fn top_genres_count_first_entries_only() {
        let state = test_state();
        let genres = state.products.top_first_genres().await.unwrap();
        assert_eq!(genres.first().map(String::as_str), Some("Action"));
        assert!(!genres.contains(&"Puzzle-Secondary".to_string()));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_capped() {
        let state = test_state();
        let hits = state.products.search("PORTAL").await.unwrap();
        assert!(hits.iter().all(|h| h.game_title.to_lowercase().contains("portal")));
        assert!(!hits.is_empty());

        let many = state.products.search("e").await.unwrap();
        assert!(many.len() <= SEARCH_LIMIT);

        assert!(state.products.search("   ").await.is_err());
        assert!(state.products.search("zzzz-no-such-game").await.is_err());
    }

    #[tokio::test]
    async fn lookups_and_samples() {
        let state = test_state();
        assert_eq!(
            state.products.get_product("Hundred").await.unwrap().price,
            Decimal::new(100, 0)
        );
        assert!(state.products.get_product("Nope").await.is_err());

        let discounted = state.products.random_discounted_products(3).await.unwrap();
        assert!(discounted.iter().all(|p| p.discount_price.is_some()));
        assert!(state.products.random_products(2).await.unwrap().len() <= 2);
    }
}
