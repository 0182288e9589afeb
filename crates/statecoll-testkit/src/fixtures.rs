//! Test fixtures and helpers.
//!
//! The fixture models a fee-share registry: each contract has a deployer and
//! a withdrawer, and the registry is indexed by both.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use statecoll::encoding::{CborValue, StringKey, STRING_KEY};
use statecoll::store::{KvStore, MemoryKvStore, SqliteKvStore};
use statecoll::{
    IndexSet, IndexedMap, Indexer, MultiIndex, PairRange, Range, Result, Schema, SchemaBuilder,
};

/// Namespace of the fee-share records.
pub const FEE_SHARE_NAMESPACE: u8 = 0x01;
/// Namespace of the by-deployer index.
pub const DEPLOYER_INDEX_NAMESPACE: u8 = 0x02;
/// Namespace of the by-withdrawer index.
pub const WITHDRAWER_INDEX_NAMESPACE: u8 = 0x03;

/// Fee-share registration of one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeShare {
    pub contract_address: String,
    pub deployer_address: String,
    pub withdrawer_address: String,
}

impl FeeShare {
    pub fn new(contract: &str, deployer: &str, withdrawer: &str) -> Self {
        Self {
            contract_address: contract.to_string(),
            deployer_address: deployer.to_string(),
            withdrawer_address: withdrawer.to_string(),
        }
    }
}

pub type FeeShareIndex = MultiIndex<String, String, FeeShare, StringKey, StringKey>;

/// Secondary indexes of the fee-share registry.
pub struct FeeShareIndexes {
    pub by_deployer: FeeShareIndex,
    pub by_withdrawer: FeeShareIndex,
}

impl IndexSet<String, FeeShare> for FeeShareIndexes {
    fn indexers(&self) -> Vec<&dyn Indexer<String, FeeShare>> {
        vec![&self.by_deployer, &self.by_withdrawer]
    }
}

pub type FeeShares = IndexedMap<String, FeeShare, StringKey, CborValue<FeeShare>, FeeShareIndexes>;

/// Register the fee-share collections with `schema`.
pub fn fee_shares(schema: &mut SchemaBuilder) -> Result<FeeShares> {
    let indexes = FeeShareIndexes {
        by_deployer: MultiIndex::new(
            schema,
            DEPLOYER_INDEX_NAMESPACE,
            "fee_shares_by_deployer",
            STRING_KEY,
            STRING_KEY,
            |fs: &FeeShare| fs.deployer_address.clone(),
        )?,
        by_withdrawer: MultiIndex::new(
            schema,
            WITHDRAWER_INDEX_NAMESPACE,
            "fee_shares_by_withdrawer",
            STRING_KEY,
            STRING_KEY,
            |fs: &FeeShare| fs.withdrawer_address.clone(),
        )?,
    };
    IndexedMap::new(
        schema,
        FEE_SHARE_NAMESPACE,
        "fee_shares",
        STRING_KEY,
        CborValue::new(),
        indexes,
    )
}

/// A test fixture with a store and the fee-share registry on it.
pub struct TestFixture<S: KvStore = MemoryKvStore> {
    pub store: S,
    pub fee_shares: FeeShares,
    pub schema: Schema,
}

impl TestFixture<MemoryKvStore> {
    /// Create a fixture over an empty in-memory store.
    pub fn new() -> Result<Self> {
        Self::with_store(MemoryKvStore::new())
    }
}

impl TestFixture<SqliteKvStore> {
    /// Create a fixture over an in-memory SQLite database.
    pub fn sqlite() -> Result<Self> {
        Self::with_store(SqliteKvStore::open_memory()?)
    }
}

impl<S: KvStore> TestFixture<S> {
    pub fn with_store(store: S) -> Result<Self> {
        let mut builder = SchemaBuilder::new();
        let fee_shares = fee_shares(&mut builder)?;
        Ok(Self {
            store,
            fee_shares,
            schema: builder.build(),
        })
    }

    pub fn register(&self, fee_share: &FeeShare) -> Result<()> {
        self.fee_shares
            .set(&self.store, &fee_share.contract_address, fee_share)
    }

    pub fn cancel(&self, contract: &str) -> Result<()> {
        self.fee_shares.delete(&self.store, &contract.to_string())
    }

    pub fn contracts_by_deployer(&self, deployer: &str) -> Result<Vec<String>> {
        self.fee_shares
            .indexes()
            .by_deployer
            .exact_match(&self.store, deployer.to_string())?
            .primary_keys()
    }

    pub fn contracts_by_withdrawer(&self, withdrawer: &str) -> Result<Vec<String>> {
        self.fee_shares
            .indexes()
            .by_withdrawer
            .exact_match(&self.store, withdrawer.to_string())?
            .primary_keys()
    }

    /// All records, ordered by contract.
    pub fn records(&self) -> Result<Vec<(String, FeeShare)>> {
        self.fee_shares
            .iterate(&self.store, Range::new())?
            .key_values()
    }

    /// True if every index holds exactly the entries derived from the
    /// records.
    pub fn indexes_consistent(&self) -> Result<bool> {
        let records = self.records()?;
        let indexes = self.fee_shares.indexes();
        for index in [&indexes.by_deployer, &indexes.by_withdrawer] {
            let expected: BTreeSet<(String, String)> = records
                .iter()
                .map(|(pk, fs)| (index.extract(fs), pk.clone()))
                .collect();
            let actual: BTreeSet<(String, String)> = index
                .iterate(&self.store, PairRange::new())?
                .full_keys()?
                .into_iter()
                .collect();
            if expected != actual {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Fee shares for `count` contracts, spread over three deployers and two
/// withdrawers.
pub fn sample_fee_shares(count: usize) -> Vec<FeeShare> {
    (0..count)
        .map(|i| {
            FeeShare::new(
                &format!("contract{:03}", i),
                &format!("deployer{}", i % 3),
                &format!("withdrawer{}", i % 2),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_registration() {
        let fixture = TestFixture::new().unwrap();
        for fs in sample_fee_shares(6) {
            fixture.register(&fs).unwrap();
        }

        assert_eq!(fixture.records().unwrap().len(), 6);
        assert_eq!(
            fixture.contracts_by_deployer("deployer0").unwrap(),
            vec!["contract000", "contract003"]
        );
        assert_eq!(fixture.contracts_by_withdrawer("withdrawer1").unwrap().len(), 3);
        assert!(fixture.indexes_consistent().unwrap());
    }

    #[test]
    fn test_fixture_schema() {
        let fixture = TestFixture::new().unwrap();
        let names: Vec<_> = fixture
            .schema
            .collections()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["fee_shares", "fee_shares_by_deployer", "fee_shares_by_withdrawer"]
        );
    }

    #[test]
    fn test_sqlite_fixture() {
        let fixture = TestFixture::sqlite().unwrap();
        fixture.register(&FeeShare::new("c", "d", "w")).unwrap();
        assert_eq!(fixture.contracts_by_withdrawer("w").unwrap(), vec!["c"]);
        fixture.cancel("c").unwrap();
        assert!(fixture.records().unwrap().is_empty());
        assert!(fixture.indexes_consistent().unwrap());
    }
}
