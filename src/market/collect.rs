use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use super::entity::MarketEntity;
use super::parse::parse_market_snapshot;

const EXCLUDED_TOKENS: [&str; 41] = [
    "usdt",
    "usdc",
    "busd",
    "dai",
    "usdd",
    "tusd",
    "usdp",
    "gusd",
    "usdn",
    "frax",
    "lusd",
    "susd",
    "ustc",
    "ust",
    "fei",
    "tribe",
    "usdk",
    "usdx",
    "wbtc",
    "weth",
    "wbnb",
    "renbtc",
    "hbtc",
    "tbtc",
    "steth",
    "reth",
    "wrapped",
    "tether",
    "usd-coin",
    "binance-usd",
    "true-usd",
    "paxos",
    "gemini",
    "liquity",
    "magic-internet-money",
    "mim",
    "wrapped-bitcoin",
    "wrapped-ether",
    "wrapped-bnb",
    "staked-ether",
    "first-digital-usd",
];

pub(super) fn is_excluded(entity: &MarketEntity) -> bool {
    let symbol = entity.symbol.to_lowercase();
    let id = entity.id.to_lowercase();
    EXCLUDED_TOKENS
        .iter()
        .any(|token| symbol.contains(token) || id.contains(token))
}

pub fn collect_market_snapshot(path: &Path, fetch_limit: usize) -> Result<Vec<MarketEntity>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read market snapshot {}", path.display()))?;

    let parsed = parse_market_snapshot(&raw)
        .with_context(|| format!("failed to parse market snapshot {}", path.display()))?;
    let total = parsed.len();

    let mut seen = std::collections::HashSet::with_capacity(total);
    let entities = parsed
        .into_iter()
        .filter(|entity| !is_excluded(entity))
        .filter(|entity| seen.insert(entity.id.clone()))
        .take(fetch_limit)
        .collect::<Vec<_>>();

    if entities.is_empty() && total > 0 {
        return Err(anyhow!(
            "market snapshot {} only contained excluded or duplicate entries",
            path.display()
        ));
    }

    tracing::info!(
        path = %path.display(),
        total,
        kept = entities.len(),
        "loaded market snapshot"
    );

    Ok(entities)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::market::entity::PriceChanges;

    fn entity(id: &str, symbol: &str) -> MarketEntity {
        MarketEntity {
            id: id.to_owned(),
            symbol: symbol.to_owned(),
            name: id.to_owned(),
            current_price: 1.0,
            market_cap: 1.0,
            market_cap_rank: None,
            changes: PriceChanges::default(),
            image: String::new(),
        }
    }

    #[test]
    fn stable_and_wrapped_assets_are_excluded() {
        assert!(is_excluded(&entity("tether", "usdt")));
        assert!(is_excluded(&entity("wrapped-bitcoin", "wbtc")));
        assert!(is_excluded(&entity("staked-ether", "steth")));
        assert!(!is_excluded(&entity("bitcoin", "btc")));
        assert!(!is_excluded(&entity("solana", "sol")));
    }

    #[test]
    fn snapshot_file_is_filtered_deduplicated_and_limited() {
        let path = std::env::temp_dir().join(format!(
            "coin-bubbles-snapshot-{}.json",
            std::process::id()
        ));
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"[
                {{"id": "bitcoin", "symbol": "btc"}},
                {{"id": "tether", "symbol": "usdt"}},
                {{"id": "bitcoin", "symbol": "btc"}},
                {{"id": "solana", "symbol": "sol"}},
                {{"id": "cardano", "symbol": "ada"}}
            ]"#
        )
        .unwrap();
        drop(file);

        let entities = collect_market_snapshot(&path, 2).unwrap();
        let _ = fs::remove_file(&path);

        let ids = entities.iter().map(|e| e.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["bitcoin", "solana"]);
    }

    #[test]
    fn missing_snapshot_is_an_error() {
        let path = Path::new("/definitely/not/here/markets.json");
        assert!(collect_market_snapshot(path, 10).is_err());
    }
}
