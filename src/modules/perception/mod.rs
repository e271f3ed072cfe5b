pub mod stock_directory;
pub mod feed;
pub mod morning_brief;

pub use stock_directory::{StockDirectory, StockRecord};
pub use feed::{NewsEntry, NewsFeedClient};
pub use morning_brief::MorningBrief;
