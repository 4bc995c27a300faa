use crate::config::Config;
use crate::db::Store;

pub async fn cmd_top_items(config: &Config, limit: u64) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let items = store.top_searched_items(limit).await?;

    if items.is_empty() {
        println!("No searches recorded yet.");
        return Ok(());
    }

    println!("Top searched items (top {}):", items.len());
    println!("{:-<40}", "");

    for (rank, item) in items.iter().enumerate() {
        let label = if item.item.is_empty() {
            "(empty query)"
        } else {
            item.item.as_str()
        };
        println!("{:>3}. {:<28} {:>6}", rank + 1, label, item.count);
    }

    Ok(())
}
