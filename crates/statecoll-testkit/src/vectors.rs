//! Golden byte-layout vectors.
//!
//! These pin the exact bytes collections write. Any change to an encoder or
//! to the composite layout changes state bytes on every node, so it must show
//! up here first.

use statecoll::encoding::{
    prefix_end, Address, CborValue, KeyEncoder, Namespace, PairKeyEncoder, ValueEncoder,
    ADDRESS_KEY, INT64_KEY, STRING_KEY, UINT64_KEY,
};
use statecoll::store::{KvStore, MemoryKvStore, Order};
use statecoll::{CollectionError, Result, SchemaBuilder};

use crate::fixtures::{
    fee_shares, FeeShare, DEPLOYER_INDEX_NAMESPACE, WITHDRAWER_INDEX_NAMESPACE,
};

/// A golden layout vector.
#[derive(Debug, Clone)]
pub struct LayoutVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Expected bytes (hex).
    pub expected: &'static str,
    /// Produces the bytes under test.
    pub build: fn() -> Result<Vec<u8>>,
}

fn ns(byte: u8) -> Namespace {
    Namespace::from(byte)
}

/// Get all golden layout vectors.
pub fn all_vectors() -> Vec<LayoutVector> {
    vec![
        LayoutVector {
            name: "string key as last component",
            expected: "0163747231",
            build: || Ok(ns(0x01).key(&STRING_KEY.encode(&"ctr1".to_string()))),
        },
        LayoutVector {
            name: "uint64 key",
            expected: "010000000000000001",
            build: || Ok(ns(0x01).key(&UINT64_KEY.encode(&1))),
        },
        LayoutVector {
            name: "int64 key -1",
            expected: "017fffffffffffffff",
            build: || Ok(ns(0x01).key(&INT64_KEY.encode(&-1))),
        },
        LayoutVector {
            name: "int64 key -2",
            expected: "017ffffffffffffffe",
            build: || Ok(ns(0x01).key(&INT64_KEY.encode(&-2))),
        },
        LayoutVector {
            name: "address key",
            expected: "041111111111111111111111111111111111111111",
            build: || Ok(ns(0x04).key(&ADDRESS_KEY.encode(&Address::from_bytes([0x11; 20])))),
        },
        LayoutVector {
            name: "pair key with escaped NUL",
            expected: "026100ff6200000000000000000007",
            build: || {
                let kc = PairKeyEncoder::new(STRING_KEY, UINT64_KEY);
                Ok(ns(0x02).key(&kc.encode(&("a\0b".to_string(), 7))))
            },
        },
        LayoutVector {
            name: "fee share record value",
            expected: "a370636f6e74726163745f616464726573736463747231706465706c6f7965725f61646472657373646465703172776974686472617765725f6164647265737363776431",
            build: || {
                let value = FeeShare::new("ctr1", "dep1", "wd1");
                CborValue::<FeeShare>::new()
                    .encode(&value)
                    .map_err(|source| CollectionError::Encode {
                        collection: "fee_shares".to_string(),
                        source,
                    })
            },
        },
        LayoutVector {
            name: "fee share deployer index entry",
            expected: "0264657031000063747231",
            build: || index_entry(DEPLOYER_INDEX_NAMESPACE),
        },
        LayoutVector {
            name: "fee share withdrawer index entry",
            expected: "03776431000063747231",
            build: || index_entry(WITHDRAWER_INDEX_NAMESPACE),
        },
    ]
}

/// The keys stored under `namespace` after registering
/// `FeeShare { ctr1, dep1, wd1 }` on an empty store.
fn index_entry(namespace: u8) -> Result<Vec<u8>> {
    let store = MemoryKvStore::new();
    let map = fee_shares(&mut SchemaBuilder::new())?;
    let value = FeeShare::new("ctr1", "dep1", "wd1");
    map.set(&store, &value.contract_address, &value)?;

    let start = [namespace];
    let end = prefix_end(&start);
    let mut keys = Vec::new();
    for entry in store.iterate(Some(&start[..]), end.as_deref(), Order::Ascending)? {
        keys.push(entry?.0);
    }
    Ok(keys.concat())
}

/// Verify all golden vectors.
///
/// Returns `(name, matches, actual hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let actual = match (v.build)() {
                Ok(bytes) => hex::encode(bytes),
                Err(e) => format!("error: {e}"),
            };
            (v.name.to_string(), actual == v.expected, actual)
        })
        .collect()
}
