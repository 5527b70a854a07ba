use super::{
    PipelineEvent, PipelineStateMachine, PredictionEnvelope, PredictionOutcome, PredictionResult,
};
use crate::{
    Error, Result,
    config::Config,
    error::PredictError,
    features::{FeatureVector, ReferenceSchema, SchemaAligner},
    ledger::{LibsqlLedger, PREDICT_TASK_TYPE, TaskLedger, TaskRecord},
    model::{ModelInvoker, Regressor},
};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde_json::{Map, Value};
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};
use uuid::Uuid;

const DEFAULT_UTC_OFFSET_SECS: i32 = 7 * 3600;
const DEFAULT_DEADLINE: Duration = Duration::from_millis(5000);

/// Runs requests through alignment, inference and audit recording.
///
/// Holds the process-wide model, schema and ledger handles. Alignment and
/// inference failures are contained here and surface only as a `NOK` status;
/// a failed ledger write is logged and never changes the returned result.
#[derive(Clone)]
pub struct PredictionService {
    aligner: Arc<SchemaAligner>,
    model: Arc<dyn Regressor>,
    ledger: Arc<dyn TaskLedger>,
    audit_offset: FixedOffset,
    deadline: Duration,
}

impl PredictionService {
    pub fn new(
        aligner: Arc<SchemaAligner>,
        model: Arc<dyn Regressor>,
        ledger: Arc<dyn TaskLedger>,
    ) -> Self {
        Self {
            aligner,
            model,
            ledger,
            audit_offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECS)
                .unwrap_or_else(|| Utc.fix()),
            deadline: DEFAULT_DEADLINE,
        }
    }

    pub fn with_audit_offset(mut self, offset: FixedOffset) -> Self {
        self.audit_offset = offset;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Loads the reference schema, the model and the ledger. Any failure
    /// here is fatal for the process.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let model_config = &config.model;

        let aligner = SchemaAligner::load(
            &model_config.reference_path,
            &model_config.target_column,
            model_config.reference_rows,
        )?;
        let model = ModelInvoker::load(&model_config.path).await?;
        check_schema_coverage(&aligner.schema(), &model);

        let ledger = LibsqlLedger::open(&config.ledger.path).await?;

        let offset = audit_offset(config.ledger.utc_offset_hours)?;

        Ok(Self::new(Arc::new(aligner), Arc::new(model), Arc::new(ledger))
            .with_audit_offset(offset)
            .with_deadline(Duration::from_millis(model_config.max_processing_ms)))
    }

    pub fn ledger(&self) -> &Arc<dyn TaskLedger> {
        &self.ledger
    }

    pub fn aligner(&self) -> &Arc<SchemaAligner> {
        &self.aligner
    }

    pub async fn predict(&self, raw: &Map<String, Value>) -> PredictionEnvelope {
        self.predict_task(raw).await.envelope
    }

    /// Handles one request end to end and reports the audit task id.
    pub async fn predict_task(&self, raw: &Map<String, Value>) -> PredictionOutcome {
        let task_id = Uuid::new_v4().to_string();
        let start_date = self.now();

        let result = match self.run(raw).await {
            Ok(prediction) => PredictionResult::ok(prediction),
            Err(e) => {
                warn!("Prediction failed for task {}: {}", task_id, e);
                PredictionResult::failed(&e)
            }
        };
        let envelope = PredictionEnvelope {
            predictions: vec![result],
        };

        let end_date = self.now();
        self.audit(&task_id, &envelope, start_date, end_date).await;

        info!(
            "Task {} completed with status: {}",
            task_id, envelope.predictions[0].status
        );
        PredictionOutcome { task_id, envelope }
    }

    pub fn reload_reference(&self) -> Result<usize> {
        let schema = self.aligner.reload()?;
        check_schema_coverage(&schema, self.model.as_ref());
        Ok(schema.columns().len())
    }

    async fn run(&self, raw: &Map<String, Value>) -> std::result::Result<f64, PredictError> {
        let mut fsm = PipelineStateMachine::new();
        advance(&mut fsm, PipelineEvent::BeginAlignment)?;

        let vector = match self.aligner.align(raw) {
            Ok(vector) => vector,
            Err(e) => {
                advance(&mut fsm, PipelineEvent::Failed)?;
                return Err(e);
            }
        };
        advance(&mut fsm, PipelineEvent::Aligned)?;

        match self.invoke(vector).await {
            Ok(prediction) => {
                advance(&mut fsm, PipelineEvent::Predicted)?;
                Ok(prediction)
            }
            Err(e) => {
                advance(&mut fsm, PipelineEvent::Failed)?;
                Err(e)
            }
        }
    }

    /// Runs the model on the blocking pool under the processing deadline.
    ///
    /// On timeout the worker thread is abandoned, not cancelled.
    async fn invoke(&self, vector: FeatureVector) -> std::result::Result<f64, PredictError> {
        let model = Arc::clone(&self.model);
        let handle = tokio::task::spawn_blocking(move || model.predict(&vector));

        match tokio::time::timeout(self.deadline, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(PredictError::inference(format!(
                "model invocation aborted: {join_error}"
            ))),
            Err(_) => Err(PredictError::DeadlineExceeded {
                millis: self.deadline.as_millis() as u64,
            }),
        }
    }

    async fn audit(
        &self,
        task_id: &str,
        envelope: &PredictionEnvelope,
        start_date: DateTime<FixedOffset>,
        end_date: DateTime<FixedOffset>,
    ) {
        let messages = serde_json::to_string(&envelope.predictions)
            .unwrap_or_else(|_| format!("{:?}", envelope.predictions));

        let record = TaskRecord {
            task_id: task_id.to_string(),
            task_type: PREDICT_TASK_TYPE.to_string(),
            status: envelope.predictions[0].status.clone(),
            start_date,
            end_date,
            messages,
        };

        if let Err(e) = self.ledger.record_completion(&record).await {
            error!("Failed to record task {} in ledger: {}", task_id, e);
        }
    }

    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.audit_offset)
    }
}

fn audit_offset(hours: i32) -> Result<FixedOffset> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| Error::config(format!("invalid audit offset: {hours} hours")))
}

fn advance(
    fsm: &mut PipelineStateMachine,
    event: PipelineEvent,
) -> std::result::Result<(), PredictError> {
    fsm.transition(event)
        .map_err(|e| PredictError::inference(e.to_string()))
}

// Mismatches are left to surface per request as inference failures.
fn check_schema_coverage(schema: &ReferenceSchema, model: &dyn Regressor) {
    if schema.columns() != model.feature_names() {
        warn!(
            "Reference schema columns {:?} differ from model features {:?}",
            schema.columns(),
            model.feature_names()
        );
    }
}
