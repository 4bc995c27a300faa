mod search;
mod top_items;

pub use search::cmd_search;
pub use top_items::cmd_top_items;
