use explorer_engine::core::ExplorerError;
use explorer_engine::metadata::Variant;
use explorer_engine::resolver::{CacheStats, CachedTargetResolver};
use explorer_engine::test_utils::{CountingService, init_test_logging, sample_service};
use explorer_engine::service::InMemoryExplorerService;
use futures::StreamExt;
use futures::future::join_all;
use std::sync::Arc;

type Cache = CachedTargetResolver<CountingService<InMemoryExplorerService>>;

fn cache() -> Cache {
    init_test_logging(None);
    CachedTargetResolver::new(CountingService::new(sample_service()))
}

fn gated_cache() -> Cache {
    init_test_logging(None);
    CachedTargetResolver::new(CountingService::gated(sample_service()))
}

#[tokio::test]
async fn test_same_tick_callers_share_one_fetch() {
    let cache = cache();

    let (a, b) = tokio::join!(
        cache.resolve("MediaEntity", Some(Variant::Section)),
        cache.resolve("MediaEntity", Some(Variant::Section)),
    );

    assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    assert_eq!(cache.service().target_calls(), 1);
    assert_eq!(cache.stats(), CacheStats { fetches: 1, hits: 0, joins: 1 });
}

#[tokio::test]
async fn test_concurrent_tasks_wait_on_one_fetch() {
    let cache = gated_cache();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.resolve("TaskEntity", Some(Variant::Section)).await })
        })
        .collect();
    tokio::task::yield_now().await;
    cache.service().open_gate();

    let results: Vec<_> = join_all(handles).await.into_iter().map(|joined| joined.unwrap().unwrap()).collect();
    assert!(results.iter().all(|data| Arc::ptr_eq(data, &results[0])));
    assert_eq!(cache.service().target_calls(), 1);

    let stats = cache.stats();
    assert_eq!(stats.fetches, 1);
    assert_eq!(stats.hits + stats.joins, 7);
}

#[tokio::test]
async fn test_late_subscriber_gets_replay_without_fetch() {
    let cache = cache();
    let first = cache.resolve("UserEntity", None).await.unwrap();

    let mut late = cache.subscribe("UserEntity", None);
    let replayed = late.next().await.unwrap().unwrap();

    assert!(Arc::ptr_eq(&first, &replayed));
    assert!(Arc::ptr_eq(&first, &late.latest().unwrap()));
    assert_eq!(cache.service().target_calls(), 1);
}

#[tokio::test]
async fn test_variant_shapes_columns() {
    let cache = cache();
    let section = cache.resolve("TaskEntity", Some(Variant::Section)).await.unwrap();
    let full = cache.resolve("TaskEntity", None).await.unwrap();

    assert!(section.entity.column("notes").is_none());
    assert!(full.entity.column("notes").is_some());
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn test_retire_ends_streams_and_refetches() {
    let cache = cache();
    let first = cache.resolve("UserEntity", None).await.unwrap();

    let mut stream = cache.subscribe("UserEntity", None);
    stream.next().await.unwrap().unwrap();

    assert!(cache.retire("UserEntity", None));
    assert!(!cache.retire("UserEntity", None));
    assert!(stream.next().await.is_none());
    assert!(cache.cached("UserEntity", None).is_none());

    let second = cache.resolve("UserEntity", None).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
    assert_eq!(cache.service().target_calls(), 2);
}

#[tokio::test]
async fn test_retire_during_fetch_still_delivers() {
    let cache = gated_cache();
    let mut stream = cache.subscribe("MediaEntity", None);

    assert!(cache.retire("MediaEntity", None));
    assert!(cache.is_empty());
    cache.service().open_gate();

    let delivered = stream.next().await.unwrap().unwrap();
    assert_eq!(delivered.name(), "MediaEntity");
    assert!(stream.next().await.is_none());
    assert!(cache.cached("MediaEntity", None).is_none());
}

#[tokio::test]
async fn test_failure_reaches_all_waiters_then_retries() {
    let cache = gated_cache();
    cache.service().fail_next(1);

    let waiting = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.resolve("UserEntity", None).await })
    };
    let mut stream = cache.subscribe("UserEntity", None);
    while cache.stats().joins == 0 {
        tokio::task::yield_now().await;
    }
    cache.service().open_gate();

    let error = waiting.await.unwrap().unwrap_err();
    assert!(matches!(
        error,
        ExplorerError::FetchFailed { ref target, ref reason } if target == "UserEntity" && reason == "injected failure"
    ));
    assert!(stream.next().await.unwrap().is_err());
    assert!(stream.next().await.is_none());

    // The failed entry is gone, so the next call fetches again
    let data = cache.resolve("UserEntity", None).await.unwrap();
    assert_eq!(data.name(), "UserEntity");
    assert_eq!(cache.service().target_calls(), 2);
}

#[tokio::test]
async fn test_refresh_pushes_new_value_to_subscribers() {
    let cache = cache();
    let first = cache.resolve("TaskEntity", None).await.unwrap();

    let mut stream = cache.subscribe("TaskEntity", None);
    stream.next().await.unwrap().unwrap();

    let refreshed = cache.refresh("TaskEntity", None).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &refreshed));

    let pushed = stream.next().await.unwrap().unwrap();
    assert!(Arc::ptr_eq(&pushed, &refreshed));
    assert!(Arc::ptr_eq(&cache.cached("TaskEntity", None).unwrap(), &refreshed));
    assert_eq!(cache.service().target_calls(), 2);
}

#[tokio::test]
async fn test_refresh_failure_keeps_stored_value() {
    let cache = cache();
    let first = cache.resolve("TaskEntity", None).await.unwrap();

    cache.service().fail_next(1);
    assert!(cache.refresh("TaskEntity", None).await.is_err());
    assert!(Arc::ptr_eq(&cache.cached("TaskEntity", None).unwrap(), &first));
}

#[tokio::test]
async fn test_stream_adapter_ends_after_retire_all() {
    let cache = cache();
    cache.resolve("MediaEntity", None).await.unwrap();

    let stream = cache.subscribe("MediaEntity", None).into_stream();
    assert_eq!(cache.retire_all(), 1);

    let items: Vec<_> = stream.collect().await;
    assert_eq!(items.len(), 1);
    assert!(items[0].is_ok());
}

#[tokio::test]
async fn test_unknown_target_is_fetch_failure() {
    let cache = cache();
    let error = cache.resolve("Ghost", Some(Variant::Section)).await.unwrap_err();
    assert!(error.to_string().contains("Target 'Ghost' not found"));
    assert!(cache.is_empty());
}
