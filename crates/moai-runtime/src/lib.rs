mod error;
pub use error::{RuntimeError, RuntimeResult};

mod spec;
pub use spec::{PortMapping, RunSpec};

mod state;
pub use state::{ContainerBrief, ContainerState};

mod runtime;
pub use runtime::ContainerRuntime;

mod docker;
pub use docker::DockerRuntime;
