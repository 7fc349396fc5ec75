mod job_key;
pub use job_key::JobKey;

mod job_kind;
pub use job_kind::{JobKind, is_ancillary_name};

mod job_status;
pub use job_status::JobStatus;

mod params;
pub use params::{Hyps, TrainParams};

mod request;
pub use request::{
    ExportRequest, InferenceRequest, StopRequest, TensorboardRequest, TrainRequest,
};

mod train_config;
pub use train_config::TrainConfig;
