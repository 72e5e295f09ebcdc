//! End-to-end tests for memory bank storage, lookup and bookkeeping.

use serde_json::json;

use ecoguardian_core::memory::{context, Context, MemoryBank};
use ecoguardian_core::MemoryBankConfig;

fn bank(max: usize, threshold: f64) -> MemoryBank {
    MemoryBank::new(MemoryBankConfig::new(max, threshold)).unwrap()
}

#[test]
fn test_capacity_holds_after_every_store() {
    let mut bank = bank(20, 0.8);
    for i in 0..200 {
        assert!(bank.store(&format!("reading_{i}"), &json!({ "aqi": i % 5 }), Context::new()));
        assert!(bank.len() <= 20, "store {i} left {} entries", bank.len());
    }
    assert!(bank.compaction_history().total_runs() > 0);
}

#[test]
fn test_capacity_holds_with_tiny_target() {
    let config = MemoryBankConfig::new(10, 1.0).with_target_reduction(1e-10);
    let mut bank = MemoryBank::new(config).unwrap();
    for i in 0..15 {
        assert!(bank.store(&format!("reading_{i}"), &json!(i), Context::new()));
        assert!(bank.len() <= 10, "store {i} left {} entries", bank.len());
    }
    assert!(bank.contains_key("reading_14"));

    // Overwriting an existing key at capacity needs no extra room.
    bank.store("reading_14", &json!("again"), Context::new());
    assert_eq!(bank.len(), 10);
}

#[test]
fn test_context_intersection() {
    let mut bank = MemoryBank::default();
    bank.store("k1", &json!(1), context([("a", "1"), ("b", "2")]));
    bank.store("k2", &json!(2), context([("a", "1")]));

    let keys = |query: Context| -> Vec<String> {
        bank.retrieve_by_context(&query, 10)
            .into_iter()
            .map(|snap| snap.key)
            .collect()
    };
    assert_eq!(keys(context([("a", "1")])), vec!["k1", "k2"]);
    assert_eq!(keys(context([("a", "1"), ("b", "2")])), vec!["k1"]);
    assert!(keys(context([("a", "9")])).is_empty());
    assert!(keys(Context::new()).is_empty());
}

#[test]
fn test_context_respects_limit() {
    let mut bank = MemoryBank::default();
    for i in 0..5 {
        bank.store(&format!("k{i}"), &json!(i), context([("city", "Paris")]));
    }
    assert_eq!(bank.retrieve_by_context(&context([("city", "Paris")]), 3).len(), 3);
}

#[test]
fn test_overwrite_moves_context_tags() {
    let mut bank = MemoryBank::default();
    bank.store("k", &json!(1), context([("city", "Paris")]));
    bank.store("k", &json!(2), context([("city", "Lyon")]));

    assert!(bank.retrieve_by_context(&context([("city", "Paris")]), 10).is_empty());
    let lyon = bank.retrieve_by_context(&context([("city", "Lyon")]), 10);
    assert_eq!(lyon.len(), 1);
    assert_eq!(lyon[0].value, json!(2));
}

#[test]
fn test_delete_is_idempotent() {
    let mut bank = MemoryBank::default();
    bank.store("k", &json!({ "v": 1 }), context([("t", "x")]));
    bank.store("other", &json!(2), Context::new());

    assert!(bank.delete("k"));
    let after_first = bank.get_statistics();
    assert!(!bank.delete("k"));
    assert_eq!(bank.get_statistics(), after_first);
    assert!(!bank.context_index().references("k"));
}

#[test]
fn test_access_count_monotonicity() {
    let mut bank = MemoryBank::default();
    bank.store("k", &json!({ "a": 1 }), Context::new());
    for _ in 0..4 {
        bank.retrieve("k");
    }
    assert_eq!(bank.metadata("k").unwrap().access_count, 4);

    assert!(bank.update("k", &json!({ "b": 2 }), true));
    assert_eq!(bank.metadata("k").unwrap().access_count, 4);
    assert_eq!(bank.peek("k"), Some(&json!({ "a": 1, "b": 2 })));

    bank.store("k", &json!("fresh"), Context::new());
    assert_eq!(bank.metadata("k").unwrap().access_count, 0);
}

#[test]
fn test_update_missing_never_creates() {
    let mut bank = MemoryBank::default();
    assert!(!bank.update("missing", &json!(1), false));
    assert!(!bank.update("missing", &json!({ "a": 1 }), true));
    assert!(!bank.contains_key("missing"));
    assert!(bank.metadata("missing").is_none());
}

#[test]
fn test_search_keys_before_values() {
    let mut bank = MemoryBank::default();
    bank.store("paris_air", &json!({ "aqi": 3 }), Context::new());
    bank.store("report", &json!({ "city": "Paris" }), Context::new());
    bank.store("unrelated", &json!(0), Context::new());

    let hits = bank.search("PARIS", 10);
    let found: Vec<(&str, String)> = hits
        .iter()
        .map(|h| (h.key.as_str(), h.match_type.to_string()))
        .collect();
    assert_eq!(
        found,
        vec![("paris_air", "key".to_string()), ("report", "value".to_string())]
    );
    assert_eq!(bank.search("paris", 1).len(), 1);
}

#[test]
fn test_statistics_report_most_accessed() {
    let mut bank = bank(100, 0.8);
    for i in 0..8 {
        bank.store(&format!("k{i}"), &json!(i), context([("slot", "x")]));
    }
    for (i, reads) in [(0, 1), (1, 5), (2, 3), (3, 2), (4, 4), (5, 6)] {
        for _ in 0..reads {
            bank.retrieve(&format!("k{i}"));
        }
    }

    let stats = bank.get_statistics();
    assert_eq!(stats.total_entries, 8);
    assert_eq!(stats.max_capacity, 100);
    assert_eq!(stats.utilization_percent, 8.0);
    assert_eq!(stats.context_indices, 1);
    assert_eq!(stats.total_accesses, 21);
    let top: Vec<&str> = stats
        .most_accessed_entries
        .iter()
        .map(|s| s.key.as_str())
        .collect();
    assert_eq!(top, vec!["k5", "k1", "k4", "k2", "k3"]);
}

#[test]
fn test_categories_are_namespaced() {
    let mut bank = MemoryBank::default();
    bank.store_in("sessions", "s1", &json!({ "user": "ana" }), Context::new());
    bank.store_in("sessions", "s2", &json!({ "user": "ben" }), Context::new());
    bank.store_in("workflows", "s1", &json!({}), Context::new());

    assert_eq!(bank.retrieve_in("sessions", "s1"), Some(&json!({ "user": "ana" })));
    assert_eq!(
        bank.metadata("sessions:s1").unwrap().category.as_deref(),
        Some("sessions")
    );

    let ben = bank.list_category("sessions", |v| v["user"] == json!("ben"));
    assert_eq!(ben.len(), 1);
    assert_eq!(ben[0].key, "sessions:s2");
    assert_eq!(bank.list_category("sessions", |_| true).len(), 2);

    assert!(bank.delete_in("sessions", "s1"));
    assert!(bank.contains_key("workflows:s1"));
}
