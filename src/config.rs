//! TOML configuration.
//!
//! ```toml
//! [solver]
//! timeout_ms = 30000
//! node_limit = 2000000
//! backend = "in-process"   # or "process"
//!
//! [solver.external]
//! program = "python3"
//! args = ["python/ortools_scheduler.py"]
//!
//! [tuning]
//! seed = 42
//! max_passes = 4
//!
//! [logging]
//! filter = "info"
//! ```
//!
//! Every key is optional; a missing file means all defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cp::{CpSolver, DEFAULT_NODE_LIMIT};
use crate::error::SchedulingError;
use crate::solver::{ConstraintSolver, ProcessSolver};

/// Crate configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// `[solver]`
    pub solver: SolverSection,
    /// `[tuning]`
    pub tuning: TuningSection,
    /// `[logging]`
    pub logging: LoggingSection,
}

/// Which constraint solver backs `complex` and `multi-stage` problems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// [`CpSolver`].
    #[default]
    InProcess,
    /// [`ProcessSolver`].
    Process,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSection {
    /// Budget of one constraint solve.
    pub timeout_ms: u64,
    /// Node limit of the in-process search.
    pub node_limit: u64,
    pub backend: Backend,
    /// Used when `backend = "process"`.
    pub external: ExternalSection,
}

impl Default for SolverSection {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            node_limit: DEFAULT_NODE_LIMIT,
            backend: Backend::InProcess,
            external: ExternalSection::default(),
        }
    }
}

/// External solver command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalSection {
    /// Executable to spawn.
    pub program: String,
    /// Arguments placed before `--input` and `--output`.
    pub args: Vec<String>,
    /// Parent of the handoff directories; system temp dir when unset.
    pub work_dir: Option<PathBuf>,
}

impl Default for ExternalSection {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["python/ortools_scheduler.py".to_string()],
            work_dir: None,
        }
    }
}

/// Multi-stage fine-tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningSection {
    /// Seed of the fine-tuning shuffle.
    pub seed: u64,
    /// Improvement passes before fine-tuning stops.
    pub max_passes: usize,
}

impl Default for TuningSection {
    fn default() -> Self {
        Self {
            seed: 42,
            max_passes: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl RosterConfig {
    /// Loads a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SchedulingError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| SchedulingError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Writes the config as TOML.
    pub fn save(&self, path: &Path) -> Result<(), SchedulingError> {
        let text = toml::to_string_pretty(self).map_err(|e| SchedulingError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Constraint solve budget.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.solver.timeout_ms)
    }

    /// The configured constraint solver backend.
    pub fn constraint_solver(&self) -> Arc<dyn ConstraintSolver> {
        match self.solver.backend {
            Backend::InProcess => Arc::new(CpSolver::new().with_node_limit(self.solver.node_limit)),
            Backend::Process => {
                let external = &self.solver.external;
                let mut solver =
                    ProcessSolver::new(external.program.clone(), external.args.clone());
                if let Some(dir) = &external.work_dir {
                    solver = solver.with_work_dir(dir.clone());
                }
                Arc::new(solver)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = RosterConfig::load(&dir.path().join("roster.toml")).unwrap();
        assert_eq!(config, RosterConfig::default());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.toml");
        fs::write(
            &path,
            "[solver]\nbackend = \"process\"\ntimeout_ms = 500\n\n[solver.external]\nprogram = \"/opt/solver\"\n",
        )
        .unwrap();

        let config = RosterConfig::load(&path).unwrap();
        assert_eq!(config.solver.backend, Backend::Process);
        assert_eq!(config.solver.timeout_ms, 500);
        assert_eq!(config.solver.external.program, "/opt/solver");
        assert_eq!(config.solver.external.args, vec!["python/ortools_scheduler.py"]);
        assert_eq!(config.tuning.seed, 42);
        assert_eq!(config.constraint_solver().name(), "external-process");
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.toml");
        let mut config = RosterConfig::default();
        config.tuning.max_passes = 9;
        config.save(&path).unwrap();
        assert_eq!(RosterConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.toml");
        fs::write(&path, "[solver\n").unwrap();
        let err = RosterConfig::load(&path).unwrap_err();
        assert!(matches!(err, SchedulingError::Config { .. }));
    }
}
