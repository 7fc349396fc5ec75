//! In-memory [`ContainerRuntime`] for exercising the core without an
//! engine.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use moai_runtime::{
    ContainerBrief, ContainerRuntime, ContainerState, RunSpec, RuntimeError, RuntimeResult,
};

#[derive(Default)]
struct Inner {
    states: HashMap<String, ContainerState>,
    calls: Vec<String>,
    busy_ports: HashSet<u16>,
    fail_listing: bool,
    block_exec: bool,
}

#[derive(Default)]
pub struct MockRuntime {
    inner: Mutex<Inner>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(self, name: impl Into<String>, state: ContainerState) -> Self {
        self.inner
            .lock()
            .unwrap()
            .states
            .insert(name.into(), state);
        self
    }

    /// Make `list_running` fail, as a broken engine socket would.
    pub fn fail_listing(self) -> Self {
        self.inner.lock().unwrap().fail_listing = true;
        self
    }

    /// Make exec streams stay open forever.
    pub fn block_exec(self) -> Self {
        self.inner.lock().unwrap().block_exec = true;
        self
    }

    /// Mark host ports as taken; binding them answers `PortAllocated`.
    pub fn with_busy_ports(self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.inner.lock().unwrap().busy_ports.extend(ports);
        self
    }

    /// Every mutating call in order, as `verb:container` strings.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.inner.lock().unwrap().states.contains_key(name)
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn list_running(&self) -> RuntimeResult<Vec<ContainerBrief>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_listing {
            return Err(RuntimeError::Unavailable("mock listing failure".into()));
        }
        Ok(inner
            .states
            .iter()
            .filter(|(_, state)| state.is_live())
            .map(|(name, state)| ContainerBrief {
                name: name.clone(),
                state: *state,
            })
            .collect())
    }

    async fn inspect_state(&self, name: &str) -> RuntimeResult<ContainerState> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .states
            .get(name)
            .copied()
            .unwrap_or(ContainerState::Missing))
    }

    async fn create_and_start(&self, spec: &RunSpec) -> RuntimeResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("create:{}", spec.name));
        if let Some(mapping) = spec.port {
            if inner.busy_ports.contains(&mapping.host) {
                return Err(RuntimeError::PortAllocated);
            }
        }
        inner
            .states
            .insert(spec.name.clone(), ContainerState::Running);
        Ok(())
    }

    async fn exec_drain(&self, name: &str, _cmd: &[String]) -> RuntimeResult<()> {
        let block = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(format!("exec:{name}"));
            inner.block_exec
        };
        if block {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn stop(&self, name: &str) -> RuntimeResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("stop:{name}"));
        match inner.states.get_mut(name) {
            Some(state) => {
                *state = ContainerState::Exited;
                Ok(())
            }
            None => Err(RuntimeError::NotFound(name.to_string())),
        }
    }

    async fn kill(&self, name: &str) -> RuntimeResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("kill:{name}"));
        match inner.states.get_mut(name) {
            Some(state) => {
                *state = ContainerState::Exited;
                Ok(())
            }
            None => Err(RuntimeError::NotFound(name.to_string())),
        }
    }

    async fn remove(&self, name: &str) -> RuntimeResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("remove:{name}"));
        inner.states.remove(name);
        Ok(())
    }
}
