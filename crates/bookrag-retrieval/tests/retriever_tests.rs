mod common;

use bookrag_retrieval::retriever::EMBEDDING_FAILED;
use bookrag_retrieval::LocalCorpus;
use common::{offline_retriever, point, retriever, EmbedBehavior};

#[test]
fn unavailable_backend_serves_only_local_corpus() {
    let (retriever, calls) = offline_retriever();
    assert!(!retriever.backend_available());
    let corpus = LocalCorpus::builtin();

    for query in ["What is ROS2?", "Explain humanoid design principles", "How does VLA work?", "vision control simulation humanoid"] {
        let result = retriever.retrieve(query, 5, 0.0);
        assert!(result.error.is_none());
        for chunk in &result.results {
            assert!(corpus.contains_url(&chunk.url), "{} is not a corpus url", chunk.url);
            assert!(chunk.similarity_score <= 0.95);
        }
    }
    assert_eq!(calls.embeds(), 0, "embedding is skipped when the backend is down");
    assert_eq!(calls.searches(), 0);
}

#[test]
fn ros2_query_hits_ros_basics() {
    let (retriever, _) = offline_retriever();
    let result = retriever.retrieve("What is ROS2?", 5, 0.0);
    assert_eq!(result.results[0].url, "/docs/02-ros-foundations/ros2-basics");
    assert!(result.results[0].similarity_score <= 0.95);
    assert_eq!(result.metadata.total_results, result.results.len());
    assert_eq!(result.metadata.collection_name, "rag_embedding");
    assert!(result.metadata.query_time_ms >= 0.0);
}

#[test]
fn nonsense_query_returns_empty_results() {
    let (retriever, _) = offline_retriever();
    let result = retriever.retrieve("asdkjhasd nonsense", 5, 0.0);
    assert!(result.results.is_empty());
    assert!(result.error.is_none(), "no matches is not an error");
    assert_eq!(result.metadata.total_results, 0);
}

#[test]
fn top_k_caps_fallback_results() {
    let (retriever, _) = offline_retriever();
    let all = retriever.retrieve("vision control simulation humanoid", 10, 0.0).results;
    assert!(all.len() >= 4);
    let two = retriever.retrieve("vision control simulation humanoid", 2, 0.0).results;
    assert_eq!(two.len(), 2);
    assert_eq!(two, all[..2].to_vec());
}

#[test]
fn fallback_is_deterministic() {
    let (retriever, _) = offline_retriever();
    let a = retriever.retrieve("Explain AI control systems", 5, 0.0).results;
    let b = retriever.retrieve("Explain AI control systems", 5, 0.0).results;
    assert_eq!(a, b);
}

#[test]
fn vector_results_are_sorted_and_capped() {
    let points = vec![
        point("1", 0.42, "/docs/a"),
        point("2", 0.91, "/docs/b"),
        point("3", 0.66, "/docs/c"),
        point("4", 0.15, "/docs/d"),
    ];
    let (retriever, calls) = retriever(EmbedBehavior::Vector(vec![0.1, 0.2]), true, false, points);
    assert!(retriever.backend_available());

    let result = retriever.retrieve("robots", 3, 0.0);
    let scores: Vec<f32> = result.results.iter().map(|c| c.similarity_score).collect();
    assert_eq!(scores, vec![0.91, 0.66, 0.42]);
    for pair in result.results.windows(2) {
        assert!(pair[0].similarity_score >= pair[1].similarity_score);
    }
    assert_eq!(result.results[0].chunk_id, "2");
    assert_eq!(result.results[0].created_at, "2025-12-01");
    assert_eq!(calls.embeds(), 1);
    assert_eq!(calls.searches(), 1);
}

#[test]
fn threshold_is_forwarded_to_the_store() {
    let points = vec![point("1", 0.42, "/docs/a"), point("2", 0.91, "/docs/b")];
    let (retriever, _) = retriever(EmbedBehavior::Vector(vec![0.1]), true, false, points);
    let result = retriever.retrieve("robots", 5, 0.5);
    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0].url, "/docs/b");
}

#[test]
fn embedding_failure_is_a_hard_error_without_fallback() {
    let (retriever, calls) = retriever(EmbedBehavior::Fail, true, false, vec![point("1", 0.9, "/docs/a")]);
    let result = retriever.retrieve("What is ROS2?", 5, 0.0);
    assert_eq!(result.error.as_deref(), Some(EMBEDDING_FAILED));
    assert!(result.results.is_empty(), "no fallback for embedding failures");
    assert_eq!(result.metadata.total_results, 0);
    assert_eq!(calls.searches(), 0);
}

#[test]
fn empty_embedding_is_treated_as_failure() {
    let (retriever, calls) = retriever(EmbedBehavior::Empty, true, false, vec![point("1", 0.9, "/docs/a")]);
    let result = retriever.retrieve("What is ROS2?", 5, 0.0);
    assert!(result.is_error());
    assert!(result.results.is_empty());
    assert_eq!(calls.searches(), 0);
}

#[test]
fn search_failure_degrades_to_fallback() {
    let (retriever, calls) = retriever(EmbedBehavior::Vector(vec![0.3]), true, true, Vec::new());
    let result = retriever.retrieve("What is ROS2?", 5, 0.0);
    assert!(result.error.is_none());
    assert_eq!(calls.searches(), 1);
    assert_eq!(result.results[0].url, "/docs/02-ros-foundations/ros2-basics");
    assert!(retriever.backend_available(), "availability is not re-probed");
}

#[test]
fn invalid_chunks_are_returned_anyway() {
    let mut broken = point("9", 0.8, "");
    broken.payload.content = String::new();
    let (retriever, _) = retriever(EmbedBehavior::Vector(vec![0.3]), true, false, vec![broken]);
    let result = retriever.retrieve("robots", 5, 0.0);
    assert_eq!(result.results.len(), 1, "validation only logs");
}

#[test]
fn zero_top_k_yields_nothing() {
    let (retriever, _) = offline_retriever();
    assert!(retriever.retrieve("What is ROS2?", 0, 0.0).results.is_empty());
}

#[test]
fn json_schema_is_stable() {
    let (retriever, _) = offline_retriever();
    let result = retriever.retrieve("What is ROS2?", 5, 0.0);
    let value: serde_json::Value = serde_json::from_str(&result.to_json_pretty().expect("json")).expect("parse");
    assert_eq!(value["query"], "What is ROS2?");
    assert!(value.get("error").is_none());
    let chunk = &value["results"][0];
    for key in ["content", "url", "position", "similarity_score", "chunk_id", "created_at"] {
        assert!(chunk.get(key).is_some(), "results[].{key} missing");
    }
    for key in ["query_time_ms", "total_results", "timestamp", "collection_name"] {
        assert!(value["metadata"].get(key).is_some(), "metadata.{key} missing");
    }
}

#[test]
fn stored_chunks_require_a_reachable_backend() {
    let (offline, _) = offline_retriever();
    assert!(offline.stored_chunks().is_err());

    let (online, _) = retriever(EmbedBehavior::Vector(vec![0.1]), true, false, vec![point("1", 0.5, "/docs/a"), point("2", 0.4, "/docs/b")]);
    let chunks = online.stored_chunks().expect("scroll");
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[1].url, "/docs/b");
}
