use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Everything needed to launch one attempt of a worker process.
///
/// Retries re-use the same spec unchanged, so an attempt is fully determined by it.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSpec {
    /// Program to execute (e.g. `"/opt/cloud/onboard.sh"`, `"node"`).
    pub program: String,
    /// Positional arguments passed first, verbatim.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Free-form argument string, tokenized on whitespace and appended after `args`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg_string: Option<String>,
    /// Extra environment variables for the process.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Working directory.
    ///
    /// If `None`, the worker inherits the working directory of the supervisor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl WorkerSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn arg_string(mut self, s: impl Into<String>) -> Self {
        self.arg_string = Some(s.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Short human-readable identity used in logs and reports.
    pub fn label(&self) -> String {
        match self.args.first() {
            Some(first) => format!("{} {}", self.program, first),
            None => self.program.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.program.trim().is_empty() {
            return Err(ModelError::InvalidWorker("program is empty".into()));
        }
        Ok(())
    }
}

/// Set of workers launched together by one `cohortd supervise` invocation.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub workers: Vec<WorkerSpec>,
}

impl Manifest {
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let manifest: Manifest =
            serde_json::from_str(raw).map_err(|e| ModelError::InvalidManifest(e.to_string()))?;
        for (idx, worker) in manifest.workers.iter().enumerate() {
            worker
                .validate()
                .map_err(|e| ModelError::InvalidManifest(format!("worker #{idx}: {e}")))?;
        }
        Ok(manifest)
    }
}
