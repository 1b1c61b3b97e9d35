//! Variant-specific auxiliary filters.
//!
//! A filter of one variant applied to an item of another keeps the item;
//! the pipeline has already narrowed the collection to one variant, so the
//! mismatch arms are unreachable in practice but spelled out for
//! exhaustiveness.

use crate::item::{AuxContext, AuxFilter, Item};

/// Apply the auxiliary toggles to a single item.
pub fn matches(item: &Item, aux: &AuxFilter, ctx: &AuxContext) -> bool {
    match (item, aux) {
        (
            Item::Token {
                chains,
                verified,
                tags,
                ..
            },
            AuxFilter::Token {
                chain,
                verified_only,
                tag,
            },
        ) => {
            if let Some(chain) = chain
                && !chains.contains(chain)
            {
                return false;
            }
            if *verified_only && !verified {
                return false;
            }
            if let Some(tag) = tag
                && !tags.contains(tag)
            {
                return false;
            }
            true
        }
        (Item::Chain { kind, .. }, AuxFilter::Chain { kind: wanted }) => {
            wanted.is_none_or(|wanted| *kind == wanted)
        }
        (Item::Pool { id, .. }, AuxFilter::Pool { my_pools_only }) => {
            !my_pools_only || ctx.owned_pools.contains(id)
        }
        // Variant mismatch: the pipeline filtered by data type already.
        (Item::Token { .. }, _) | (Item::Chain { .. }, _) | (Item::Pool { .. }, _) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ChainKind, TokenRef};
    use indexmap::IndexSet;

    fn token(chains: &[&str], verified: bool, tags: &[&str]) -> Item {
        Item::Token {
            id: "t".into(),
            name: "Token".into(),
            decimals: 6,
            price: "0".into(),
            volume_24h: "0".into(),
            change_24h: "0".into(),
            chains: chains.iter().map(|s| s.to_string()).collect(),
            verified,
            tags: tags.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn token_chain_filter() {
        let item = token(&["osmosis-1", "cosmoshub-4"], true, &[]);
        let aux = AuxFilter::Token {
            chain: Some("osmosis-1".into()),
            verified_only: false,
            tag: None,
        };
        assert!(matches(&item, &aux, &AuxContext::default()));

        let aux = AuxFilter::Token {
            chain: Some("juno-1".into()),
            verified_only: false,
            tag: None,
        };
        assert!(!matches(&item, &aux, &AuxContext::default()));
    }

    #[test]
    fn token_verified_and_tag_filters() {
        let item = token(&[], false, &["meme"]);
        let verified_only = AuxFilter::Token {
            chain: None,
            verified_only: true,
            tag: None,
        };
        assert!(!matches(&item, &verified_only, &AuxContext::default()));

        let tag = AuxFilter::Token {
            chain: None,
            verified_only: false,
            tag: Some("meme".into()),
        };
        assert!(matches(&item, &tag, &AuxContext::default()));

        let other_tag = AuxFilter::Token {
            chain: None,
            verified_only: false,
            tag: Some("stable".into()),
        };
        assert!(!matches(&item, &other_tag, &AuxContext::default()));
    }

    #[test]
    fn chain_kind_filter() {
        let chain = Item::Chain {
            chain_id: 1,
            unique_id: "eth".into(),
            name: "Ethereum".into(),
            kind: ChainKind::Evm,
            explorer: String::new(),
            factory: String::new(),
        };
        let evm = AuxFilter::Chain {
            kind: Some(ChainKind::Evm),
        };
        let wasm = AuxFilter::Chain {
            kind: Some(ChainKind::CosmWasm),
        };
        let any = AuxFilter::Chain { kind: None };
        assert!(matches(&chain, &evm, &AuxContext::default()));
        assert!(!matches(&chain, &wasm, &AuxContext::default()));
        assert!(matches(&chain, &any, &AuxContext::default()));
    }

    #[test]
    fn my_pools_only_consults_owned_set() {
        let pool = Item::Pool {
            id: "pool-7".into(),
            token_a: TokenRef {
                id: "a".into(),
                symbol: "A".into(),
            },
            token_b: TokenRef {
                id: "b".into(),
                symbol: "B".into(),
            },
            liquidity: "0".into(),
            volume_24h: "0".into(),
            fees_24h: "0".into(),
            apr: "0%".into(),
        };
        let mine = AuxFilter::Pool { my_pools_only: true };

        let mut ctx = AuxContext::default();
        assert!(!matches(&pool, &mine, &ctx));

        ctx.owned_pools = IndexSet::from(["pool-7".to_string()]);
        assert!(matches(&pool, &mine, &ctx));
    }
}
