//! Single-flight metadata cache using moka
//!
//! Each dataset has its own `moka::future::Cache`. Lookups go through
//! `try_get_with`, so concurrent misses on one key share a single fetch,
//! every waiter receives the same value or the same `Arc`'d error, and a
//! failed fetch leaves nothing behind.

use crate::error::{Dataset, FetchError, MetadataError, MetadataResult};
use crate::snapshot::MetadataSnapshot;
use crate::source::{
    AdaptationMap, AssessmentTypeMap, ConditionDescriptor, CourseSurvey, MetadataSource,
};
use moka::future::Cache;
use scenario_model::TrainingApplication;
use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tracing::{trace, warn};

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries across every dataset
    pub entry_count: u64,
}

/// Cached, coalescing front for a [`MetadataSource`]
#[derive(Clone)]
pub struct MetadataCache {
    source: Arc<dyn MetadataSource>,
    descriptors: Cache<String, Arc<ConditionDescriptor>>,
    assessment_types: Cache<(), Arc<AssessmentTypeMap>>,
    adaptations: Cache<(), Arc<AdaptationMap>>,
    self_completing: Cache<(), Arc<BTreeSet<String>>>,
    surveys: Cache<String, Arc<Vec<CourseSurvey>>>,
    application_conditions: Cache<TrainingApplication, Arc<BTreeSet<String>>>,
}

fn dataset_cache<K, V>(max_capacity: u64, ttl: Option<Duration>) -> Cache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let builder = Cache::builder().max_capacity(max_capacity);
    match ttl {
        Some(ttl) => builder.time_to_live(ttl).build(),
        None => builder.build(),
    }
}

async fn load<K, V, F, Fut>(
    cache: &Cache<K, Arc<V>>,
    dataset: Dataset,
    key: K,
    fetch: F,
) -> MetadataResult<Arc<V>>
where
    K: Hash + Eq + Send + Sync + fmt::Debug + 'static,
    V: Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, FetchError>>,
{
    if let Some(hit) = cache.get(&key).await {
        trace!(%dataset, ?key, "metadata cache hit");
        return Ok(hit);
    }
    cache
        .try_get_with(key, async move { fetch().await.map(Arc::new) })
        .await
        .map_err(|source| {
            warn!(%dataset, error = %source, "metadata fetch failed");
            MetadataError::fetch(dataset, source)
        })
}

impl MetadataCache {
    /// Create a cache holding up to `max_capacity` entries per dataset
    #[must_use]
    pub fn new(source: Arc<dyn MetadataSource>, max_capacity: u64) -> Self {
        Self::build(source, max_capacity, None)
    }

    /// Create a cache whose entries expire after `ttl`
    #[must_use]
    pub fn with_ttl(source: Arc<dyn MetadataSource>, max_capacity: u64, ttl: Duration) -> Self {
        Self::build(source, max_capacity, Some(ttl))
    }

    /// Create a cache with the default capacity (10,000 entries per dataset)
    #[must_use]
    pub fn with_source(source: Arc<dyn MetadataSource>) -> Self {
        Self::new(source, 10_000)
    }

    fn build(source: Arc<dyn MetadataSource>, max_capacity: u64, ttl: Option<Duration>) -> Self {
        Self {
            source,
            descriptors: dataset_cache(max_capacity, ttl),
            assessment_types: dataset_cache(max_capacity, ttl),
            adaptations: dataset_cache(max_capacity, ttl),
            self_completing: dataset_cache(max_capacity, ttl),
            surveys: dataset_cache(max_capacity, ttl),
            application_conditions: dataset_cache(max_capacity, ttl),
        }
    }

    /// Descriptor of a condition implementation
    ///
    /// # Errors
    /// Returns [`MetadataError::Fetch`] if the source fails.
    pub async fn condition_descriptor(
        &self,
        impl_name: &str,
    ) -> MetadataResult<Arc<ConditionDescriptor>> {
        let fetch = || self.source.condition_descriptor(impl_name);
        load(
            &self.descriptors,
            Dataset::ConditionDescriptor,
            impl_name.to_string(),
            fetch,
        )
        .await
    }

    /// Overall assessment types of every condition
    ///
    /// # Errors
    /// Returns [`MetadataError::Fetch`] if the source fails.
    pub async fn overall_assessment_types(&self) -> MetadataResult<Arc<AssessmentTypeMap>> {
        let fetch = || self.source.overall_assessment_types();
        load(&self.assessment_types, Dataset::OverallAssessmentTypes, (), fetch).await
    }

    /// Supported adaptation types per training application
    ///
    /// # Errors
    /// Returns [`MetadataError::Fetch`] if the source fails.
    pub async fn scenario_adaptations(&self) -> MetadataResult<Arc<AdaptationMap>> {
        let fetch = || self.source.scenario_adaptations();
        load(&self.adaptations, Dataset::ScenarioAdaptations, (), fetch).await
    }

    /// Condition implementations that complete on their own
    ///
    /// # Errors
    /// Returns [`MetadataError::Fetch`] if the source fails.
    pub async fn self_completing_conditions(&self) -> MetadataResult<Arc<BTreeSet<String>>> {
        let fetch = || self.source.self_completing_conditions();
        load(&self.self_completing, Dataset::SelfCompletingConditions, (), fetch).await
    }

    /// Surveys of a survey context
    ///
    /// # Errors
    /// Returns [`MetadataError::Fetch`] if the source fails.
    pub async fn course_surveys(
        &self,
        survey_context_id: &str,
    ) -> MetadataResult<Arc<Vec<CourseSurvey>>> {
        let fetch = || self.source.course_surveys(survey_context_id);
        load(
            &self.surveys,
            Dataset::CourseSurveys,
            survey_context_id.to_string(),
            fetch,
        )
        .await
    }

    /// Condition implementations supported by a training application
    ///
    /// # Errors
    /// Returns [`MetadataError::Fetch`] if the source fails.
    pub async fn conditions_for_application(
        &self,
        application: TrainingApplication,
    ) -> MetadataResult<Arc<BTreeSet<String>>> {
        let fetch = || self.source.conditions_for_application(application);
        load(
            &self.application_conditions,
            Dataset::ApplicationConditions,
            application,
            fetch,
        )
        .await
    }

    /// Resolve the datasets the synchronous validator needs
    ///
    /// # Errors
    /// Returns the first [`MetadataError`] encountered.
    pub async fn snapshot(&self) -> MetadataResult<MetadataSnapshot> {
        let (self_completing, assessment_types) = futures::try_join!(
            self.self_completing_conditions(),
            self.overall_assessment_types()
        )?;
        Ok(MetadataSnapshot::new()
            .with_self_completing(self_completing)
            .with_assessment_types(assessment_types))
    }

    /// Drop every cached entry
    pub fn invalidate_all(&self) {
        self.descriptors.invalidate_all();
        self.assessment_types.invalidate_all();
        self.adaptations.invalidate_all();
        self.self_completing.invalidate_all();
        self.surveys.invalidate_all();
        self.application_conditions.invalidate_all();
    }

    /// Apply pending evictions and invalidations so counts are current
    pub async fn run_pending_tasks(&self) {
        self.descriptors.run_pending_tasks().await;
        self.assessment_types.run_pending_tasks().await;
        self.adaptations.run_pending_tasks().await;
        self.self_completing.run_pending_tasks().await;
        self.surveys.run_pending_tasks().await;
        self.application_conditions.run_pending_tasks().await;
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.descriptors.entry_count()
                + self.assessment_types.entry_count()
                + self.adaptations.entry_count()
                + self.self_completing.entry_count()
                + self.surveys.entry_count()
                + self.application_conditions.entry_count(),
        }
    }
}

impl fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataCache")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockMetadataSource;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn descriptor(name: &str) -> ConditionDescriptor {
        ConditionDescriptor {
            impl_name: name.to_string(),
            display_name: format!("{name} display"),
            ..ConditionDescriptor::default()
        }
    }

    #[tokio::test]
    async fn descriptor_fetched_once() {
        let mut source = MockMetadataSource::new();
        source
            .expect_condition_descriptor()
            .times(1)
            .returning(|name| Ok(descriptor(name)));
        let cache = MetadataCache::with_source(Arc::new(source));

        let first = cache.condition_descriptor("domain.Timer").await.unwrap();
        let second = cache.condition_descriptor("domain.Timer").await.unwrap();
        assert_eq!(first.display_name, "domain.Timer display");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn failure_is_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut source = MockMetadataSource::new();
        source
            .expect_self_completing_conditions()
            .times(2)
            .returning(move || {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(FetchError::Unavailable("offline".into()))
                } else {
                    Ok(BTreeSet::from(["domain.Timer".to_string()]))
                }
            });
        let cache = MetadataCache::with_source(Arc::new(source));

        let err = cache.self_completing_conditions().await.unwrap_err();
        assert_eq!(err.dataset(), Dataset::SelfCompletingConditions);
        assert_eq!(
            &**err.source_error(),
            &FetchError::Unavailable("offline".into())
        );

        let set = cache.self_completing_conditions().await.unwrap();
        assert!(set.contains("domain.Timer"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let mut source = MockMetadataSource::new();
        source
            .expect_course_surveys()
            .times(2)
            .returning(|ctx| {
                Ok(vec![CourseSurvey {
                    key: format!("{ctx}-key"),
                    name: "Survey".into(),
                }])
            });
        let cache = MetadataCache::with_source(Arc::new(source));

        let a = cache.course_surveys("ctx-a").await.unwrap();
        let b = cache.course_surveys("ctx-b").await.unwrap();
        let a_again = cache.course_surveys("ctx-a").await.unwrap();
        assert_eq!(a[0].key, "ctx-a-key");
        assert_eq!(b[0].key, "ctx-b-key");
        assert!(Arc::ptr_eq(&a, &a_again));
    }

    #[tokio::test]
    async fn stats_and_invalidation() {
        let mut source = MockMetadataSource::new();
        source
            .expect_condition_descriptor()
            .times(4)
            .returning(|name| Ok(descriptor(name)));
        let cache = MetadataCache::new(Arc::new(source), 100);

        for name in ["a", "b", "c"] {
            cache.condition_descriptor(name).await.unwrap();
        }
        cache.run_pending_tasks().await;
        assert_eq!(cache.stats().entry_count, 3);

        cache.invalidate_all();
        cache.run_pending_tasks().await;
        assert_eq!(cache.stats().entry_count, 0);

        cache.condition_descriptor("a").await.unwrap();
    }

    #[tokio::test]
    async fn snapshot_reads_self_completing_set() {
        let mut source = MockMetadataSource::new();
        source
            .expect_self_completing_conditions()
            .returning(|| Ok(BTreeSet::from(["domain.Timer".to_string()])));
        source
            .expect_overall_assessment_types()
            .returning(|| Ok(AssessmentTypeMap::new()));
        let cache = MetadataCache::with_source(Arc::new(source));

        let snapshot = cache.snapshot().await.unwrap();
        assert!(snapshot.can_self_complete("domain.Timer"));
        assert!(!snapshot.can_self_complete("domain.Radio"));
    }
}
