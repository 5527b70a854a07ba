use async_trait::async_trait;
use house_price_serving::{
    Error, PredictError, Result,
    features::FeatureVector,
    ledger::{TaskLedger, TaskRecord},
    model::Regressor,
};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory ledger that records every write.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    pub records: Mutex<Vec<TaskRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TaskRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskLedger for MemoryLedger {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn record_completion(&self, record: &TaskRecord) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.task_id == record.task_id) {
            return Err(Error::ledger(format!("duplicate task id {}", record.task_id)));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn update_completion(&self, record: &TaskRecord) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.task_id == record.task_id) {
            Some(existing) => {
                existing.status = record.status.clone();
                existing.end_date = record.end_date;
                existing.messages = record.messages.clone();
                Ok(())
            }
            None => Err(Error::TaskNotFound {
                task_id: record.task_id.clone(),
            }),
        }
    }

    async fn get(&self, task_id: &str) -> Result<Option<TaskRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.task_id == task_id)
            .cloned())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<TaskRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.lock().unwrap().len() as u64)
    }
}

/// Ledger whose every operation fails, like a full disk.
#[derive(Debug, Default)]
pub struct FailingLedger;

#[async_trait]
impl TaskLedger for FailingLedger {
    async fn ensure_schema(&self) -> Result<()> {
        Err(Error::ledger("disk I/O error"))
    }

    async fn record_completion(&self, _record: &TaskRecord) -> Result<()> {
        Err(Error::ledger("disk I/O error"))
    }

    async fn update_completion(&self, _record: &TaskRecord) -> Result<()> {
        Err(Error::ledger("disk I/O error"))
    }

    async fn get(&self, _task_id: &str) -> Result<Option<TaskRecord>> {
        Err(Error::ledger("disk I/O error"))
    }

    async fn list_recent(&self, _limit: usize) -> Result<Vec<TaskRecord>> {
        Err(Error::ledger("disk I/O error"))
    }

    async fn count(&self) -> Result<u64> {
        Err(Error::ledger("disk I/O error"))
    }
}

/// Returns a fixed value for any row.
#[derive(Debug)]
pub struct ConstantRegressor {
    pub feature_names: Vec<String>,
    pub value: f64,
}

impl Regressor for ConstantRegressor {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, _row: &FeatureVector) -> std::result::Result<f64, PredictError> {
        Ok(self.value)
    }
}

#[derive(Debug, Default)]
pub struct FailingRegressor {
    pub feature_names: Vec<String>,
}

impl Regressor for FailingRegressor {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, _row: &FeatureVector) -> std::result::Result<f64, PredictError> {
        Err(PredictError::inference("Input contains NaN"))
    }
}

/// Blocks the calling thread before answering.
#[derive(Debug)]
pub struct SlowRegressor {
    pub feature_names: Vec<String>,
    pub delay: Duration,
}

impl Regressor for SlowRegressor {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, _row: &FeatureVector) -> std::result::Result<f64, PredictError> {
        std::thread::sleep(self.delay);
        Ok(1.0)
    }
}

#[derive(Debug, Default)]
pub struct PanickingRegressor {
    pub feature_names: Vec<String>,
}

impl Regressor for PanickingRegressor {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, _row: &FeatureVector) -> std::result::Result<f64, PredictError> {
        panic!("model state corrupted");
    }
}
