//! Free-text matching over an item's searchable fields.

use crate::item::Item;

/// Case-insensitive substring match against the item's search text.
/// An empty query matches everything.
pub fn matches(item: &Item, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let haystack = item.search_text().to_lowercase();
    query
        .split_whitespace()
        .all(|word| haystack.contains(&word.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ChainKind, TokenRef};
    use indexmap::IndexSet;

    fn token(id: &str, name: &str) -> Item {
        Item::Token {
            id: id.into(),
            name: name.into(),
            decimals: 18,
            price: "0".into(),
            volume_24h: "0".into(),
            change_24h: "0".into(),
            chains: IndexSet::new(),
            verified: false,
            tags: IndexSet::new(),
        }
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(matches(&token("uatom", "Cosmos Hub"), ""));
        assert!(matches(&token("uatom", "Cosmos Hub"), "   "));
    }

    #[test]
    fn match_is_case_insensitive() {
        let item = token("uatom", "Cosmos Hub");
        assert!(matches(&item, "cosmos"));
        assert!(matches(&item, "COSMOS"));
        assert!(matches(&item, "UATOM"));
        assert!(!matches(&item, "juno"));
    }

    #[test]
    fn multi_word_query_requires_all_words() {
        let item = token("uatom", "Cosmos Hub");
        assert!(matches(&item, "cosmos hub"));
        assert!(matches(&item, "hub uatom"));
        assert!(!matches(&item, "cosmos juno"));
    }

    #[test]
    fn chain_matches_on_unique_id_and_name() {
        let chain = Item::Chain {
            chain_id: 1,
            unique_id: "cosmoshub-4".into(),
            name: "Cosmos Hub".into(),
            kind: ChainKind::CosmWasm,
            explorer: String::new(),
            factory: String::new(),
        };
        assert!(matches(&chain, "cosmoshub-4"));
        assert!(matches(&chain, "hub"));
    }

    #[test]
    fn pool_matches_on_either_symbol() {
        let pool = Item::Pool {
            id: "pool-1".into(),
            token_a: TokenRef {
                id: "uatom".into(),
                symbol: "ATOM".into(),
            },
            token_b: TokenRef {
                id: "uosmo".into(),
                symbol: "OSMO".into(),
            },
            liquidity: "0".into(),
            volume_24h: "0".into(),
            fees_24h: "0".into(),
            apr: "0%".into(),
        };
        assert!(matches(&pool, "atom"));
        assert!(matches(&pool, "osmo"));
        assert!(matches(&pool, "pool-1"));
        assert!(!matches(&pool, "juno"));
    }
}
