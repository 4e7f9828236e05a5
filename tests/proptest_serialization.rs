//! Property-based tests for cache serialization.
//!
//! These tests use proptest to verify that serialization properties hold
//! for randomly generated inputs, catching edge cases that example-based
//! tests might miss.
//!
//! # Properties Tested
//!
//! 1. **Roundtrip Property**: deserialize(serialize(x)) == x for ANY x
//! 2. **Determinism Property**: serialize(x) == serialize(x) always
//! 3. **Envelope Property**: All serialized data has correct magic + version + kind
//! 4. **Memo Key Property**: Keys are deterministic and argument-sensitive
//! 5. **Corruption Detection**: Damaged envelopes never decode silently

use memo_kit::serialization::{
    deserialize_from_cache, peek_kind, serialize_counter, serialize_for_cache, CacheEnvelope,
    ValueKind, CACHE_MAGIC, CURRENT_SCHEMA_VERSION,
};
use memo_kit::CacheKeyBuilder;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// Test Types with Arbitrary Implementations
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
    email: String,
    active: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct ComplexRecord {
    id: u64,
    name: String,
    tags: Vec<String>,
    score: f64,
    active: bool,
    count: i64,
}

fn arb_user() -> impl Strategy<Value = User> {
    (
        any::<u64>(),
        any::<String>(),
        any::<String>(),
        any::<bool>(),
    )
        .prop_map(|(id, name, email, active)| User {
            id,
            name,
            email,
            active,
        })
}

fn arb_complex_record() -> impl Strategy<Value = ComplexRecord> {
    (
        any::<u64>(),
        any::<String>(),
        prop::collection::vec(any::<String>(), 0..10),
        any::<f64>(),
        any::<bool>(),
        any::<i64>(),
    )
        .prop_map(|(id, name, tags, score, active, count)| ComplexRecord {
            id,
            name,
            tags,
            score,
            active,
            count,
        })
}

// ============================================================================
// Property 1: Roundtrip Property
// ============================================================================

proptest! {
    /// Property: For any User, deserialize(serialize(user)) == user
    #[test]
    fn prop_user_roundtrip(user in arb_user()) {
        let bytes = serialize_for_cache(&user)
            .expect("Serialization should never fail for valid User");

        let deserialized: User = deserialize_from_cache(&bytes)
            .expect("Deserialization should never fail for valid bytes");

        prop_assert_eq!(user, deserialized);
    }

    /// Property: For any ComplexRecord with collections, roundtrip works
    #[test]
    fn prop_complex_record_roundtrip(record in arb_complex_record()) {
        let bytes = serialize_for_cache(&record)
            .expect("Serialization should never fail for valid ComplexRecord");

        let deserialized: ComplexRecord = deserialize_from_cache(&bytes)
            .expect("Deserialization should never fail for valid bytes");

        prop_assert_eq!(record, deserialized);
    }

    /// Property: Counters roundtrip for any u64
    #[test]
    fn prop_counter_roundtrip(value in any::<u64>()) {
        let bytes = serialize_counter(value)
            .expect("Counter serialization should succeed");

        let decoded: u64 = deserialize_from_cache(&bytes)
            .expect("Counter deserialization should succeed");

        prop_assert_eq!(value, decoded);
    }
}

// ============================================================================
// Property 2: Determinism Property
// ============================================================================

proptest! {
    /// Property: Serializing the same User twice produces identical bytes
    #[test]
    fn prop_user_determinism(user in arb_user()) {
        let bytes1 = serialize_for_cache(&user)
            .expect("Serialization should succeed");
        let bytes2 = serialize_for_cache(&user)
            .expect("Serialization should succeed");

        prop_assert_eq!(bytes1, bytes2, "Serialization must be deterministic");
    }

    /// Property: Determinism for complex records with collections
    #[test]
    fn prop_complex_determinism(record in arb_complex_record()) {
        let bytes1 = serialize_for_cache(&record)
            .expect("Serialization should succeed");
        let bytes2 = serialize_for_cache(&record)
            .expect("Serialization should succeed");

        prop_assert_eq!(bytes1, bytes2, "Serialization must be deterministic");
    }
}

// ============================================================================
// Property 3: Envelope Format Property
// ============================================================================

proptest! {
    /// Property: All serialized values have correct envelope and Value kind
    #[test]
    fn prop_value_envelope_format(user in arb_user()) {
        let bytes = serialize_for_cache(&user)
            .expect("Serialization should succeed");

        // Must have at least magic (4) bytes
        prop_assert!(bytes.len() >= 4, "Envelope too small: {} bytes", bytes.len());

        // Check magic header
        let magic: [u8; 4] = bytes[0..4].try_into().unwrap();
        prop_assert_eq!(magic, CACHE_MAGIC, "Invalid magic header");

        // Check version by deserializing envelope (postcard uses variable-length encoding)
        let envelope: CacheEnvelope<User> = postcard::from_bytes(&bytes)
            .expect("Failed to deserialize envelope");
        prop_assert_eq!(envelope.version, CURRENT_SCHEMA_VERSION, "Invalid schema version");
        prop_assert_eq!(envelope.kind, ValueKind::Value);

        // peek_kind agrees without decoding the payload
        prop_assert_eq!(peek_kind(&bytes).unwrap(), ValueKind::Value);
    }

    /// Property: All serialized counters carry the Counter kind tag
    #[test]
    fn prop_counter_envelope_format(value in any::<u64>()) {
        let bytes = serialize_counter(value)
            .expect("Counter serialization should succeed");

        let magic: [u8; 4] = bytes[0..4].try_into().unwrap();
        prop_assert_eq!(magic, CACHE_MAGIC);
        prop_assert_eq!(peek_kind(&bytes).unwrap(), ValueKind::Counter);
    }
}

// ============================================================================
// Property 4: Memo Key Property
// ============================================================================

proptest! {
    /// Property: Equal arguments always derive the same key
    #[test]
    fn prop_memo_key_deterministic(name in "[a-z_]{1,20}", args in arb_user()) {
        let key1 = CacheKeyBuilder::build_memo(&name, &args).unwrap();
        let key2 = CacheKeyBuilder::build_memo(&name, &args).unwrap();

        prop_assert_eq!(key1, key2);
    }

    /// Property: Distinct argument encodings derive distinct keys
    #[test]
    fn prop_memo_key_arg_sensitive(name in "[a-z_]{1,20}", a in any::<u64>(), b in any::<u64>()) {
        prop_assume!(a != b);

        let key_a = CacheKeyBuilder::build_memo(&name, &a).unwrap();
        let key_b = CacheKeyBuilder::build_memo(&name, &b).unwrap();

        prop_assert_ne!(key_a, key_b);
    }

    /// Property: Memo keys are fixed-shape regardless of argument size
    #[test]
    fn prop_memo_key_shape(tags in prop::collection::vec(any::<String>(), 0..100)) {
        let key = CacheKeyBuilder::build_memo("bulk", &tags).unwrap();
        let parts = CacheKeyBuilder::parse(&key);

        prop_assert_eq!(parts[0], "memo");
        prop_assert_eq!(parts[1], "bulk");
        prop_assert_eq!(parts[2].len(), 64);
    }
}

// ============================================================================
// Property 5: Size Efficiency Property
// ============================================================================

proptest! {
    /// Property: Postcard is competitive with JSON size
    ///
    /// Note: Postcard might be slightly larger for very small structs due to
    /// envelope overhead, but should be smaller for larger structs
    #[test]
    fn prop_user_size_efficiency(user in arb_user()) {
        let postcard_bytes = serialize_for_cache(&user)
            .expect("Postcard serialization should succeed");

        let json_bytes = serde_json::to_vec(&user)
            .expect("JSON serialization should succeed");

        // Property: Postcard should never be MORE than 2x JSON size
        prop_assert!(
            postcard_bytes.len() < json_bytes.len() * 2,
            "Postcard too large: {} bytes vs JSON {} bytes (ratio: {:.2}x)",
            postcard_bytes.len(),
            json_bytes.len(),
            postcard_bytes.len() as f64 / json_bytes.len() as f64
        );
    }
}

// ============================================================================
// Property 6: Edge Cases Property
// ============================================================================

proptest! {
    /// Property: Empty strings are handled correctly
    #[test]
    fn prop_empty_strings_work(id in any::<u64>(), active in any::<bool>()) {
        let user = User {
            id,
            name: String::new(),
            email: String::new(),
            active,
        };

        let bytes = serialize_for_cache(&user)?;
        let deserialized: User = deserialize_from_cache(&bytes)?;

        prop_assert_eq!(user, deserialized);
    }

    /// Property: Extreme integer values work
    #[test]
    fn prop_extreme_integers_work(
        name in any::<String>(),
        tags in prop::collection::vec(any::<String>(), 0..5)
    ) {
        let record = ComplexRecord {
            id: u64::MAX,
            name,
            tags,
            score: 0.0,
            active: false,
            count: i64::MIN,
        };

        let bytes = serialize_for_cache(&record)?;
        let deserialized: ComplexRecord = deserialize_from_cache(&bytes)?;

        prop_assert_eq!(record, deserialized);
    }

    /// Property: Large collections work
    #[test]
    fn prop_large_collections_work(
        id in any::<u64>(),
        name in any::<String>(),
        tags in prop::collection::vec(any::<String>(), 0..1000)  // Up to 1000 items
    ) {
        let record = ComplexRecord {
            id,
            name,
            tags,
            score: 0.0,
            active: true,
            count: 0,
        };

        let bytes = serialize_for_cache(&record)?;
        let deserialized: ComplexRecord = deserialize_from_cache(&bytes)?;

        prop_assert_eq!(record, deserialized);
    }

    /// Property: Special float values (NaN, Infinity) work
    #[test]
    fn prop_special_floats_work(
        id in any::<u64>(),
        name in any::<String>()
    ) {
        let record_nan = ComplexRecord {
            id,
            name: name.clone(),
            tags: vec![],
            score: f64::NAN,
            active: true,
            count: 0,
        };

        let bytes = serialize_for_cache(&record_nan)?;
        let deserialized: ComplexRecord = deserialize_from_cache(&bytes)?;
        prop_assert!(deserialized.score.is_nan());

        let record_inf = ComplexRecord {
            id,
            name,
            tags: vec![],
            score: f64::INFINITY,
            active: false,
            count: 0,
        };

        let bytes = serialize_for_cache(&record_inf)?;
        let deserialized: ComplexRecord = deserialize_from_cache(&bytes)?;
        prop_assert_eq!(deserialized.score, f64::INFINITY);
    }
}

// ============================================================================
// Property 7: Corruption Detection Property
// ============================================================================

proptest! {
    /// Property: Corrupted magic is always detected
    #[test]
    fn prop_corrupted_magic_detected(user in arb_user()) {
        let mut bytes = serialize_for_cache(&user)
            .expect("Serialization should succeed");

        // Corrupt the magic header
        bytes[0] = b'X';
        bytes[1] = b'X';
        bytes[2] = b'X';
        bytes[3] = b'X';

        let result: Result<User, _> = deserialize_from_cache(&bytes);
        prop_assert!(result.is_err(), "Should reject corrupted magic");
    }

    /// Property: Wrong version is always detected
    #[test]
    fn prop_wrong_version_detected(user in arb_user(), version in 2u32..) {
        let envelope = CacheEnvelope {
            magic: CACHE_MAGIC,
            version,
            kind: ValueKind::Value,
            payload: user,
        };
        let bytes = postcard::to_allocvec(&envelope)
            .expect("Envelope serialization should succeed");

        let result: Result<User, _> = deserialize_from_cache(&bytes);
        prop_assert!(result.is_err(), "Should reject wrong version");
    }

    /// Property: Truncated data is always detected
    #[test]
    fn prop_truncated_data_detected(record in arb_complex_record()) {
        let bytes = serialize_for_cache(&record)
            .expect("Serialization should succeed");

        if bytes.len() > 20 {
            // Truncate the payload
            let truncated = &bytes[..bytes.len() / 2];

            let result: Result<ComplexRecord, _> = deserialize_from_cache(truncated);
            prop_assert!(result.is_err(), "Should reject truncated data");
        }
    }
}
