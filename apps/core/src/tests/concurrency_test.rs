//! Concurrency Tests
//!
//! Readers keep working while the model is retrained, and the learner counts
//! every record submitted from parallel tasks.

use crate::config::{EngineConfig, LearningConfig};
use crate::engine::SentimentEngine;
use crate::models::{AnalysisInput, SentimentLabel, TrainingExample};
use std::sync::Arc;
use tokio::task::JoinSet;

fn shared_engine(config: EngineConfig) -> Arc<SentimentEngine> {
    Arc::new(SentimentEngine::new(config).unwrap())
}

fn examples(round: usize) -> Vec<TrainingExample> {
    vec![
        TrainingExample::new(format!("great update number {}", round), SentimentLabel::Positive),
        TrainingExample::new(format!("broken build number {}", round), SentimentLabel::Negative),
        TrainingExample::new(format!("release number {}", round), SentimentLabel::Neutral),
    ]
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_analysis_during_training() {
    let engine = shared_engine(EngineConfig::default());
    engine.train(&examples(0)).unwrap();

    let trainer = {
        let engine = engine.clone();
        tokio::task::spawn_blocking(move || {
            for round in 1..=20 {
                engine.incremental_train(&examples(round)).unwrap();
            }
        })
    };

    let mut readers = JoinSet::new();
    for worker in 0..8 {
        let engine = engine.clone();
        readers.spawn_blocking(move || {
            let mut last_version = 0;
            for i in 0..50 {
                let text = format!("worker {} says the update is great {}", worker, i);
                let result = engine.analyze(&text, None);
                assert!((-1.0..=1.0).contains(&result.score));
                assert!((0.0..=1.0).contains(&result.confidence));

                // Versions observed by one reader never go backwards.
                let version = engine.model_version();
                assert!(version >= last_version);
                last_version = version;
            }
        });
    }

    trainer.await.unwrap();
    while let Some(joined) = readers.join_next().await {
        joined.unwrap();
    }

    assert_eq!(engine.model_version(), 21);
    let counts = &engine.classifier().snapshot().class_doc_counts;
    assert_eq!(counts.get(&SentimentLabel::Positive), Some(&21));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_feedback_is_counted() {
    let engine = shared_engine(EngineConfig {
        learning: LearningConfig {
            feedback_batch_size: 7,
            buffer_capacity: 500,
            ..Default::default()
        },
        ..Default::default()
    });

    let mut tasks = JoinSet::new();
    for task in 0..10 {
        let engine = engine.clone();
        tasks.spawn_blocking(move || {
            for i in 0..10 {
                let label = if (task + i) % 2 == 0 {
                    SentimentLabel::Positive
                } else {
                    SentimentLabel::Negative
                };
                engine
                    .provide_feedback(&format!("feedback {} from task {}", i, task), label, None, None)
                    .unwrap();
            }
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }

    let stats = engine.force_process_buffer().unwrap();
    assert_eq!(stats.total_received, 100);
    assert_eq!(stats.total_incorporated, 100);
    assert_eq!(stats.buffer_size, 0);

    let doc_total: u64 = engine
        .classifier()
        .snapshot()
        .class_doc_counts
        .values()
        .sum();
    assert_eq!(doc_total, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_large_batch() {
    let engine = shared_engine(EngineConfig {
        batch_chunk_size: 16,
        ..Default::default()
    });

    let inputs: Vec<AnalysisInput> = (0..500)
        .map(|i| AnalysisInput {
            id: Some(i.to_string()),
            text: Some(match i % 3 {
                0 => format!("love this, order {}", i),
                1 => format!("terrible experience, order {}", i),
                _ => format!("order {} shipped", i),
            }),
            language: None,
        })
        .collect();

    let outcome = engine.analyze_batch(inputs).await;
    assert_eq!(outcome.results.len(), 500);
    assert!(outcome.failures.is_empty());
    assert!(outcome.results[0].label.agrees_with(SentimentLabel::Positive));
    assert!(outcome.results[1].label.agrees_with(SentimentLabel::Negative));
    assert_eq!(outcome.results[2].label, SentimentLabel::Neutral);
}
