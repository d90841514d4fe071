use super::rules::RulesEngine;
use crate::config::BatchConfig;
use crate::error::{GardenOpsError, Result};
use crate::models::Finding;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Evaluates many contexts against one shared engine on the blocking pool.
///
/// Results come back in input order regardless of completion order.
pub struct BatchEvaluator<C> {
    engine: Arc<RulesEngine<C>>,
    deadline: Duration,
    max_concurrency: usize,
}

impl<C: Send + Sync + 'static> BatchEvaluator<C> {
    pub fn new(engine: Arc<RulesEngine<C>>, config: &BatchConfig) -> Self {
        Self {
            engine,
            deadline: config.deadline(),
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    /// Evaluate every context, failing the whole batch if the deadline passes.
    ///
    /// On deadline the waiting tasks are aborted, but evaluations already
    /// running on the blocking pool cannot be interrupted. They run to
    /// completion in the background and their results are discarded.
    pub async fn evaluate_all(&self, contexts: Vec<C>) -> Result<Vec<Vec<Finding>>> {
        let started = Instant::now();
        let total = contexts.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));

        let mut handles: Vec<JoinHandle<Result<Vec<Finding>>>> = Vec::with_capacity(total);
        for ctx in contexts {
            let engine = Arc::clone(&self.engine);
            let semaphore = Arc::clone(&semaphore);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| GardenOpsError::Task(e.to_string()))?;
                tokio::task::spawn_blocking(move || engine.evaluate(&ctx))
                    .await
                    .map_err(|e| GardenOpsError::Task(e.to_string()))
            }));
        }

        let collected = tokio::time::timeout(self.deadline, async {
            let mut results = Vec::with_capacity(total);
            for handle in handles.iter_mut() {
                let findings = handle
                    .await
                    .map_err(|e| GardenOpsError::Task(e.to_string()))??;
                results.push(findings);
            }
            Ok::<_, GardenOpsError>(results)
        })
        .await;

        match collected {
            Ok(results) => {
                let results = results?;
                tracing::info!(
                    registry = self.engine.registry().name(),
                    contexts = total,
                    findings = results.iter().map(Vec::len).sum::<usize>(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Batch evaluated"
                );
                Ok(results)
            }
            Err(_) => {
                for handle in &handles {
                    handle.abort();
                }
                tracing::error!(
                    registry = self.engine.registry().name(),
                    contexts = total,
                    deadline_ms = self.deadline.as_millis() as u64,
                    "Batch evaluation exceeded deadline"
                );
                Err(GardenOpsError::DeadlineExceeded(self.deadline))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::rules::registry::{plant_health, Registry};
    use crate::logic::rules::Rule;
    use crate::models::{FindingCategory, PlantContext};

    fn batch_config(deadline_ms: u64, max_concurrency: usize) -> BatchConfig {
        BatchConfig {
            deadline_ms,
            max_concurrency,
        }
    }

    fn contexts() -> Vec<PlantContext> {
        (0..24)
            .map(|i| PlantContext {
                moisture_percent: Some(5.0 + (i as f64) * 4.0),
                soil_ph: Some(5.0 + (i as f64) * 0.1),
                temperature_f: Some(40.0 + (i as f64) * 2.5),
                ..PlantContext::for_plant(if i % 2 == 0 { "Tomato" } else { "Lettuce" })
            })
            .collect()
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let engine = Arc::new(RulesEngine::new(plant_health().unwrap()));
        let batch = BatchEvaluator::new(Arc::clone(&engine), &batch_config(5000, 4));

        let inputs = contexts();
        let expected: Vec<Vec<Finding>> = inputs.iter().map(|c| engine.evaluate(c)).collect();
        let results = batch.evaluate_all(inputs).await.unwrap();

        assert_eq!(results, expected);
    }

    #[tokio::test]
    async fn empty_batch() {
        let engine = Arc::new(RulesEngine::new(plant_health().unwrap()));
        let batch = BatchEvaluator::new(engine, &BatchConfig::default());
        assert!(batch.evaluate_all(Vec::new()).await.unwrap().is_empty());
    }

    struct Slow;

    impl Rule<PlantContext> for Slow {
        fn code(&self) -> &'static str {
            "GROWTH.900"
        }

        fn name(&self) -> &'static str {
            "Slow"
        }

        fn category(&self) -> FindingCategory {
            FindingCategory::GrowthStage
        }

        fn is_applicable(&self, _ctx: &PlantContext) -> bool {
            true
        }

        fn evaluate(&self, _ctx: &PlantContext) -> Option<Finding> {
            std::thread::sleep(Duration::from_millis(300));
            None
        }
    }

    #[tokio::test]
    async fn deadline_fails_the_batch() {
        let rules: Vec<Box<dyn Rule<PlantContext>>> = vec![Box::new(Slow)];
        let registry = Registry::new("slow", rules).unwrap();
        let engine = Arc::new(RulesEngine::new(registry));
        let batch = BatchEvaluator::new(engine, &batch_config(50, 1));

        let result = batch
            .evaluate_all(vec![PlantContext::default(), PlantContext::default()])
            .await;
        assert!(matches!(result, Err(GardenOpsError::DeadlineExceeded(_))));
    }
}
