use std::sync::Arc;

use crate::cache::Cache;
use crate::config::Config;
use crate::db::Store;
use crate::services::SearchService;
use crate::services::search::SearchQuery;

pub async fn cmd_search(config: &Config, lat: f64, lng: f64, query: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let cache = Cache::from_config(&config.cache, &store).await;
    let service = SearchService::new(Arc::new(store), config.search.clone(), cache);

    let request = SearchQuery {
        text: query.to_string(),
        latitude: lat,
        longitude: lng,
        page: Some(1),
        page_size: Some(config.search.max_page_size),
    };

    let response = service.search(&request).await?;

    if response.results.is_empty() {
        println!(
            "No businesses within {} miles of ({lat}, {lng}) matching '{query}'",
            config.search.radius_miles
        );
        return Ok(());
    }

    println!("Found {} business(es):", response.total);
    println!("{:-<60}", "");

    for hit in &response.results {
        let business = &hit.business;
        let open = if business.is_open { "open" } else { "closed" };
        let rating = business
            .rating
            .map_or_else(|| "no rating".to_string(), |r| format!("{r:.1}★"));

        println!("• {} ({:.2} mi)", business.name, hit.distance);
        println!(
            "  {} | {} | {} | ID: {}",
            business.category, open, rating, business.id
        );
        println!("  {}, {} {}", business.address, business.city, business.zipcode);
    }

    if !response.matching_keywords.is_empty() {
        println!();
        println!("Related keywords: {}", response.matching_keywords.join(", "));
    }

    Ok(())
}
