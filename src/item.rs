//! Item model: the three collection variants and the state that drives a
//! processing cycle.
//!
//! `Item` is a closed sum type. Every place a variant is inspected matches
//! exhaustively, so adding a fourth data type is a compile-time exercise.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::ListError;

/// Tag identifying which variant a collection holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Fungible tokens
    Token,
    /// Supported chains
    Chain,
    /// Liquidity pools
    Pool,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataType::Token => write!(f, "token"),
            DataType::Chain => write!(f, "chain"),
            DataType::Pool => write!(f, "pool"),
        }
    }
}

/// Execution environment of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainKind {
    /// EVM-compatible chains
    Evm,
    /// CosmWasm chains
    CosmWasm,
}

/// Reference to a pool's constituent token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRef {
    /// Token id
    pub id: String,
    /// Display symbol
    pub symbol: String,
}

/// One element of a collection.
///
/// Items are immutable value records supplied by an external store. The core
/// only reorders, filters and slices `Arc` references; it never mutates.
///
/// Numeric market fields arrive as decimal strings from the upstream API
/// glue; they are parsed at sort time with a default of `0` for
/// missing/malformed values (see [`crate::engine::sort::parse_numeric`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    /// A fungible token.
    Token {
        /// Unique token id
        id: String,
        /// Display name
        name: String,
        /// Decimal precision
        decimals: u8,
        /// Current price, decimal string
        price: String,
        /// 24h trading volume, decimal string
        volume_24h: String,
        /// 24h price change in percent, decimal string
        change_24h: String,
        /// Chains this token is deployed on
        chains: IndexSet<String>,
        /// Whether the token is on the verified list
        verified: bool,
        /// Free-form tags
        tags: IndexSet<String>,
    },
    /// A supported chain.
    Chain {
        /// Numeric chain id
        chain_id: u64,
        /// Globally unique chain identifier
        unique_id: String,
        /// Display name
        name: String,
        /// Execution environment
        kind: ChainKind,
        /// Block explorer address
        explorer: String,
        /// Factory contract address
        factory: String,
    },
    /// A liquidity pool.
    Pool {
        /// Unique pool id
        id: String,
        /// First constituent token
        token_a: TokenRef,
        /// Second constituent token
        token_b: TokenRef,
        /// Total liquidity, decimal string
        liquidity: String,
        /// 24h volume, decimal string
        volume_24h: String,
        /// 24h fees, decimal string
        fees_24h: String,
        /// APR as displayed, e.g. "12.4%"
        apr: String,
    },
}

impl Item {
    /// The variant tag of this item.
    pub fn data_type(&self) -> DataType {
        match self {
            Item::Token { .. } => DataType::Token,
            Item::Chain { .. } => DataType::Chain,
            Item::Pool { .. } => DataType::Pool,
        }
    }

    /// Stable identifier used for selection and equality of views.
    pub fn id(&self) -> &str {
        match self {
            Item::Token { id, .. } => id,
            Item::Chain { unique_id, .. } => unique_id,
            Item::Pool { id, .. } => id,
        }
    }

    /// Display name of the item.
    pub fn name(&self) -> String {
        match self {
            Item::Token { name, .. } => name.clone(),
            Item::Chain { name, .. } => name.clone(),
            Item::Pool { token_a, token_b, .. } => format!("{}/{}", token_a.symbol, token_b.symbol),
        }
    }

    /// Text the free-text search runs against.
    pub fn search_text(&self) -> String {
        match self {
            Item::Token { id, name, .. } => format!("{name} {id}"),
            Item::Chain { unique_id, name, .. } => format!("{name} {unique_id}"),
            Item::Pool {
                id, token_a, token_b, ..
            } => format!("{} {} {id}", token_a.symbol, token_b.symbol),
        }
    }
}

/// Sort field. Not every key applies to every variant; see
/// [`SortKey::supports`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    /// Display name (all variants)
    Name,
    /// Token price
    Price,
    /// 24h volume (tokens, pools)
    Volume,
    /// 24h price change (tokens)
    Change,
    /// Numeric chain id (chains)
    ChainId,
    /// Total liquidity (pools)
    Liquidity,
    /// 24h fees (pools)
    Fees,
    /// APR (pools)
    Apr,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SortKey::Name => "name",
            SortKey::Price => "price",
            SortKey::Volume => "volume",
            SortKey::Change => "change",
            SortKey::ChainId => "chain-id",
            SortKey::Liquidity => "liquidity",
            SortKey::Fees => "fees",
            SortKey::Apr => "apr",
        };
        write!(f, "{name}")
    }
}

impl SortKey {
    /// Whether this key is meaningful for the given variant. An unsupported
    /// key is a caller bug and fails fast.
    pub fn supports(&self, data_type: DataType) -> bool {
        match self {
            SortKey::Name => true,
            SortKey::Price | SortKey::Change => data_type == DataType::Token,
            SortKey::Volume => matches!(data_type, DataType::Token | DataType::Pool),
            SortKey::ChainId => data_type == DataType::Chain,
            SortKey::Liquidity | SortKey::Fees | SortKey::Apr => data_type == DataType::Pool,
        }
    }

    /// Validate this key against a variant, producing a configuration error
    /// for mismatches.
    pub fn validate(&self, data_type: DataType) -> Result<(), ListError> {
        if self.supports(data_type) {
            Ok(())
        } else {
            Err(ListError::UnsupportedSortKey {
                key: *self,
                data_type,
            })
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

/// Variant-specific auxiliary filter toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuxFilter {
    /// Token list toggles
    Token {
        /// Keep only tokens deployed on this chain
        chain: Option<String>,
        /// Keep only verified tokens
        verified_only: bool,
        /// Keep only tokens carrying this tag
        tag: Option<String>,
    },
    /// Chain list toggles
    Chain {
        /// Keep only chains of this kind
        kind: Option<ChainKind>,
    },
    /// Pool list toggles
    Pool {
        /// Keep only pools the wallet has a position in
        my_pools_only: bool,
    },
}

impl AuxFilter {
    /// The neutral (keep-everything) filter for a variant.
    pub fn none(data_type: DataType) -> Self {
        match data_type {
            DataType::Token => AuxFilter::Token {
                chain: None,
                verified_only: false,
                tag: None,
            },
            DataType::Chain => AuxFilter::Chain { kind: None },
            DataType::Pool => AuxFilter::Pool { my_pools_only: false },
        }
    }
}

/// Context supplied by the host alongside the filter state. Carries data the
/// filters need but that is not part of the collection itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuxContext {
    /// Pool ids the connected wallet holds a position in; consulted by the
    /// "my pools only" toggle.
    pub owned_pools: IndexSet<String>,
}

/// The single source of truth for the visible view. Mutated only by user
/// input handlers; input to every processing cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Free-text search string
    pub query: String,
    /// Sort field
    pub sort_key: SortKey,
    /// Sort direction
    pub sort_direction: SortDirection,
    /// Variant-specific toggles
    pub aux: AuxFilter,
}

impl FilterState {
    /// Default token view: sorted by 24h volume, busiest first.
    pub fn for_tokens() -> Self {
        FilterState {
            query: String::new(),
            sort_key: SortKey::Volume,
            sort_direction: SortDirection::Descending,
            aux: AuxFilter::none(DataType::Token),
        }
    }

    /// Default chain view: sorted by name.
    pub fn for_chains() -> Self {
        FilterState {
            query: String::new(),
            sort_key: SortKey::Name,
            sort_direction: SortDirection::Ascending,
            aux: AuxFilter::none(DataType::Chain),
        }
    }

    /// Default pool view: sorted by liquidity, deepest first.
    pub fn for_pools() -> Self {
        FilterState {
            query: String::new(),
            sort_key: SortKey::Liquidity,
            sort_direction: SortDirection::Descending,
            aux: AuxFilter::none(DataType::Pool),
        }
    }

    /// The default view for a variant.
    pub fn for_data_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Token => Self::for_tokens(),
            DataType::Chain => Self::for_chains(),
            DataType::Pool => Self::for_pools(),
        }
    }
}

/// The full, unfiltered set of items of one variant, as last snapshotted
/// from the external store.
pub type Collection = Vec<Arc<Item>>;

/// The filtered, sorted subset/permutation of a [`Collection`] matching the
/// current [`FilterState`].
pub type ProcessedView = Vec<Arc<Item>>;
