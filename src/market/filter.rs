use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::entity::{MarketEntity, SizingMode, Timeframe};

#[derive(Clone, Copy, Debug)]
pub struct EntityFilter<'a> {
    pub query: &'a str,
    pub timeframe: Timeframe,
    pub mode: SizingMode,
    pub auto_trim: usize,
    pub max_count: usize,
}

fn substring_matches(entity: &MarketEntity, query: &str) -> bool {
    entity.name.to_lowercase().contains(query) || entity.symbol.to_lowercase().contains(query)
}

fn search(entities: &[MarketEntity], query: &str) -> Vec<MarketEntity> {
    let query = query.to_lowercase();
    let direct = entities
        .iter()
        .filter(|entity| substring_matches(entity, &query))
        .cloned()
        .collect::<Vec<_>>();
    if !direct.is_empty() {
        return direct;
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = entities
        .iter()
        .filter_map(|entity| {
            matcher
                .fuzzy_match(&entity.symbol.to_lowercase(), &query)
                .map(|score| (score, entity))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, entity)| entity.clone()).collect()
}

pub fn select_entities(entities: &[MarketEntity], filter: &EntityFilter<'_>) -> Vec<MarketEntity> {
    let query = filter.query.trim();

    let mut selected = if query.is_empty() {
        entities.to_vec()
    } else {
        search(entities, query)
    };

    if query.is_empty() && filter.mode == SizingMode::Change && selected.len() > filter.auto_trim {
        selected.sort_by(|a, b| {
            let a_change = a.changes.for_timeframe(filter.timeframe).abs();
            let b_change = b.changes.for_timeframe(filter.timeframe).abs();
            b_change.total_cmp(&a_change)
        });
        selected.truncate(filter.auto_trim);
    }

    selected.truncate(filter.max_count);
    selected
}
