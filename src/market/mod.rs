mod collect;
pub(crate) mod entity;
mod filter;
mod parse;

pub use collect::collect_market_snapshot;
pub use entity::{MarketEntity, SizingMode, Timeframe};
pub use filter::{EntityFilter, select_entities};
