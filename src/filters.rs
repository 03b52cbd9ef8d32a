//! Topic and file predicates as Qdrant `Filter` trees.
//!
//! The store filters server-side while [`crate::payload::ChunkMetadata`]
//! accepts two payload schemas, so every predicate here is built dual-path:
//! a `should` group matching the nested key (`metadata.topic`) or the legacy
//! flat key (`topic`). Conjunctions nest these groups under `must`, keeping
//! predicate semantics equal to decoded-metadata semantics.

use qdrant_client::qdrant::condition::ConditionOneOf;
use qdrant_client::qdrant::r#match::MatchValue;
use qdrant_client::qdrant::{Condition, FieldCondition, Filter, Match, RepeatedStrings};

/// Payload paths checked for one logical field: nested schema first, legacy
/// flat schema second.
const TOPIC_KEYS: [&str; 2] = ["metadata.topic", "topic"];
const SOURCE_FILE_KEYS: [&str; 2] = ["metadata.source_file", "source_file"];

/// Points whose decoded topic equals `topic`.
pub fn topic_is(topic: &str) -> Filter {
    Filter {
        must: vec![either_key(&TOPIC_KEYS, |key| {
            keyword_eq(key, topic)
        })],
        ..Default::default()
    }
}

/// Points whose decoded topic is any of `topics`.
pub fn topic_any(topics: &[String]) -> Filter {
    Filter {
        must: vec![either_key(&TOPIC_KEYS, |key| {
            keyword_any(key, topics.to_vec())
        })],
        ..Default::default()
    }
}

/// Points belonging to `topic` that came from `filename`.
pub fn file_in_topic(topic: &str, filename: &str) -> Filter {
    Filter {
        must: vec![
            either_key(&TOPIC_KEYS, |key| keyword_eq(key, topic)),
            either_key(&SOURCE_FILE_KEYS, |key| keyword_eq(key, filename)),
        ],
        ..Default::default()
    }
}

/// Wraps one condition per candidate key into a nested `should` group, so a
/// single logical predicate matches whichever schema the point uses.
fn either_key(keys: &[&str], build: impl Fn(&str) -> Condition) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Filter(Filter {
            should: keys.iter().map(|key| build(key)).collect(),
            ..Default::default()
        })),
    }
}

fn keyword_eq(key: &str, value: &str) -> Condition {
    field_condition(key, MatchValue::Keyword(value.to_string()))
}

fn keyword_any(key: &str, values: Vec<String>) -> Condition {
    field_condition(key, MatchValue::Keywords(RepeatedStrings { strings: values }))
}

fn field_condition(key: &str, match_value: MatchValue) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: key.to_string(),
            r#match: Some(Match {
                match_value: Some(match_value),
            }),
            ..Default::default()
        })),
    }
}
