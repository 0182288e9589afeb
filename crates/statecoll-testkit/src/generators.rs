//! Proptest generators for property-based testing.

use proptest::prelude::*;

use statecoll::encoding::{Address, Hash32};

use crate::fixtures::FeeShare;

/// Generate a random Address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from_bytes)
}

/// Generate a random Hash32.
pub fn hash32() -> impl Strategy<Value = Hash32> {
    any::<[u8; 32]>().prop_map(Hash32::from_bytes)
}

/// Short strings over a tiny alphabet that includes NUL and 0xFF-adjacent
/// characters, so composite keys hit the escape paths and share prefixes.
pub fn tricky_string() -> impl Strategy<Value = String> {
    "[ab\\x00\\x7f\u{ff}]{0,6}".prop_map(String::from)
}

/// Arbitrary byte strings, biased towards zero bytes.
pub fn tricky_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop_oneof![Just(0x00u8), Just(0xffu8), any::<u8>()], 0..8)
}

/// A fee share drawn from a small pool of contracts and owners, so that
/// updates and shared index keys are frequent.
pub fn fee_share() -> impl Strategy<Value = FeeShare> {
    (0..4u8, 0..3u8, 0..3u8).prop_map(|(c, d, w)| {
        FeeShare::new(&format!("ctr{}", c), &format!("dep{}", d), &format!("wd{}", w))
    })
}

/// One mutation of the fee-share registry.
#[derive(Debug, Clone)]
pub enum FeeShareOp {
    Register(FeeShare),
    Cancel(String),
}

impl Arbitrary for FeeShareOp {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            3 => fee_share().prop_map(FeeShareOp::Register),
            1 => (0..5u8).prop_map(|c| FeeShareOp::Cancel(format!("ctr{}", c))),
        ]
        .boxed()
    }
}

/// A sequence of registry mutations.
pub fn fee_share_ops(max_len: usize) -> impl Strategy<Value = Vec<FeeShareOp>> {
    prop::collection::vec(any::<FeeShareOp>(), 0..=max_len)
}
