mod engine;
mod workflow;

pub use engine::{InMemoryWorkflowEngine, StepFuture, WorkflowEngine, WorkflowError, WorkflowStepSpec};
pub use workflow::{PhoneLookupWorkflow, TASK_QUEUE_EMAIL_VERIFICATION, TASK_QUEUE_ORION, TASK_QUEUE_SECONDARY};
