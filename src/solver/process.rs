//! External solver process backend.
//!
//! The problem is written as JSON to `input.json` inside a fresh temp
//! directory, the program is run as
//! `<program> <args..> --input <input.json> --output <output.json>`, and
//! `output.json` is read back once the process exits. The temp directory
//! is removed when the solve returns, on every path.
//!
//! The process runs on a private current-thread tokio runtime so the wait
//! can be bounded by [`tokio::time::timeout`]; the child is spawned with
//! `kill_on_drop`, so an expired budget also kills it. Because it owns a
//! runtime, [`ProcessSolver::solve`] must not be called from inside an
//! async context.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

use super::ConstraintSolver;
use crate::error::SolverError;
use crate::models::{
    SchedulingProblem, SchedulingSolution, ShiftAssignment, SolutionMetrics, SolveStatus,
    SolverKind, UnassignableShift,
};

const INPUT_FILE: &str = "input.json";
const OUTPUT_FILE: &str = "output.json";

/// Longest stderr excerpt kept in an error.
const STDERR_EXCERPT: usize = 2_000;

/// Document the external solver writes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalOutput {
    /// Solve status.
    pub status: SolveStatus,
    /// Chosen assignments.
    #[serde(default)]
    pub assignments: Vec<ExternalAssignment>,
    /// Shifts left open.
    #[serde(default)]
    pub unassignable: Vec<UnassignableShift>,
    /// Solve time in milliseconds, possibly fractional.
    #[serde(default)]
    pub solve_time: f64,
    /// Free-text explanation.
    #[serde(default)]
    pub explanation: String,
}

/// An assignment as written by the external solver.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalAssignment {
    /// Staffed shift.
    pub shift_id: String,
    /// Assigned employee.
    pub employee_id: String,
    /// Score, any scale; clamped to 0..=100.
    #[serde(default)]
    pub score: f64,
    /// Positive factors.
    #[serde(default)]
    pub reasons: Vec<String>,
    /// Soft violations.
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Runs an external constraint solver program.
#[derive(Debug, Clone)]
pub struct ProcessSolver {
    program: String,
    args: Vec<String>,
    work_dir: Option<PathBuf>,
}

impl ProcessSolver {
    /// Creates a solver that runs `program` with `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            work_dir: None,
        }
    }

    /// Places handoff directories under `dir` instead of the system temp
    /// directory.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Program that is launched.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn handoff_dir(&self) -> std::io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("roster-solve-");
        match &self.work_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        }
    }

    async fn run(
        &self,
        input: &Path,
        output: &Path,
        timeout: Duration,
    ) -> Result<(), SolverError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg("--input")
            .arg(input)
            .arg("--output")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SolverError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let finished = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| SolverError::Timeout {
                budget_ms: timeout.as_millis() as u64,
            })??;

        if !finished.status.success() {
            let mut stderr = String::from_utf8_lossy(&finished.stderr).trim().to_string();
            if stderr.len() > STDERR_EXCERPT {
                let mut cut = STDERR_EXCERPT;
                while !stderr.is_char_boundary(cut) {
                    cut -= 1;
                }
                stderr.truncate(cut);
            }
            return Err(SolverError::NonZeroExit {
                code: finished.status.code(),
                stderr,
            });
        }
        Ok(())
    }
}

/// Checks external output against the problem and converts it.
fn into_solution(
    problem: &SchedulingProblem,
    output: ExternalOutput,
) -> Result<SchedulingSolution, SolverError> {
    if output.status == SolveStatus::Error {
        return Err(SolverError::Reported(output.explanation));
    }

    let mut staffed = HashSet::new();
    let mut assignments = Vec::with_capacity(output.assignments.len());
    for a in output.assignments {
        let shift = problem.shift(&a.shift_id).ok_or_else(|| {
            SolverError::InconsistentOutput(format!("unknown shift '{}'", a.shift_id))
        })?;
        let employee = problem.employee(&a.employee_id).ok_or_else(|| {
            SolverError::InconsistentOutput(format!("unknown employee '{}'", a.employee_id))
        })?;
        if !staffed.insert(a.shift_id.clone()) {
            return Err(SolverError::InconsistentOutput(format!(
                "shift '{}' assigned more than once",
                a.shift_id
            )));
        }
        let missing = employee.missing_skills(&shift.required_skills);
        if !missing.is_empty() {
            return Err(SolverError::InconsistentOutput(format!(
                "employee '{}' lacks required skills for shift '{}': {}",
                employee.id,
                shift.id,
                missing.join(", ")
            )));
        }
        assignments.push(ShiftAssignment {
            shift_id: a.shift_id,
            employee_id: a.employee_id,
            score: a.score.clamp(0.0, 100.0).round() as u8,
            reasons: a.reasons,
            warnings: a.warnings,
        });
    }

    let mut unassignable = output.unassignable;
    unassignable.retain(|u| !staffed.contains(&u.shift_id));
    let listed: HashSet<String> = unassignable.iter().map(|u| u.shift_id.clone()).collect();
    for shift in &problem.shifts {
        if !staffed.contains(&shift.id) && !listed.contains(&shift.id) {
            unassignable.push(UnassignableShift {
                shift_id: shift.id.clone(),
                reasons: vec!["Not assigned by solver".to_string()],
            });
        }
    }

    let metrics = SolutionMetrics::calculate(&assignments, problem);
    Ok(SchedulingSolution {
        assignments,
        unassignable,
        solver: SolverKind::ConstraintProgramming,
        status: output.status,
        solve_time_ms: output.solve_time.max(0.0).round() as u64,
        explanation: output.explanation,
        metrics,
    })
}

impl ConstraintSolver for ProcessSolver {
    fn name(&self) -> &'static str {
        "external-process"
    }

    fn solve(
        &self,
        problem: &SchedulingProblem,
        timeout: Duration,
    ) -> Result<SchedulingSolution, SolverError> {
        let started = Instant::now();
        let dir = self.handoff_dir()?;
        let input = dir.path().join(INPUT_FILE);
        let output = dir.path().join(OUTPUT_FILE);
        let encoded = serde_json::to_vec_pretty(problem).map_err(std::io::Error::from)?;
        std::fs::write(&input, encoded)?;
        debug!(program = %self.program, dir = %dir.path().display(), "starting external solver");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.run(&input, &output, timeout))?;

        let raw = std::fs::read(&output)?;
        let parsed: ExternalOutput = serde_json::from_slice(&raw)
            .map_err(|e| SolverError::MalformedOutput(e.to_string()))?;
        let mut solution = into_solution(problem, parsed)?;
        if solution.solve_time_ms == 0 {
            solution.solve_time_ms = started.elapsed().as_millis() as u64;
        }

        if let Err(e) = dir.close() {
            warn!(error = %e, "failed to remove solver handoff directory");
        }
        Ok(solution)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::models::{Employee, Shift};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 11, hour, 0, 0).unwrap()
    }

    fn make_problem() -> SchedulingProblem {
        SchedulingProblem::new("org")
            .with_shift(Shift::new("S1", at(9), at(13), "L1").with_required_skill("cashier"))
            .with_shift(Shift::new("S2", at(14), at(18), "L1"))
            .with_employee(Employee::new("E1", "Ann").with_skill("cashier"))
            .with_employee(Employee::new("E2", "Bob"))
    }

    /// A solver script that writes `body` to the output path.
    fn script_writing(dir: &Path, body: &str) -> ProcessSolver {
        let script = dir.join("solver.sh");
        std::fs::write(
            &script,
            format!("#!/bin/sh\ncat > \"$4\" <<'JSON'\n{body}\nJSON\n"),
        )
        .unwrap();
        ProcessSolver::new("sh", vec![script.display().to_string()])
    }

    fn script(dir: &Path, text: &str) -> ProcessSolver {
        let script = dir.join("solver.sh");
        std::fs::write(&script, format!("#!/bin/sh\n{text}\n")).unwrap();
        ProcessSolver::new("sh", vec![script.display().to_string()])
    }

    fn leftover(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_round_trip_through_process() {
        let scripts = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let solver = script_writing(
            scripts.path(),
            r#"{"status":"OPTIMAL","assignments":[{"shiftId":"S1","employeeId":"E1","score":87.4,"reasons":["ok"]}],"solveTime":12.6,"explanation":"Assigned 1 of 2 shifts"}"#,
        )
        .with_work_dir(work.path());

        let solution = solver.solve(&make_problem(), Duration::from_secs(10)).unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.solver, SolverKind::ConstraintProgramming);
        assert_eq!(solution.assignments[0].score, 87);
        assert_eq!(solution.solve_time_ms, 13);
        assert_eq!(solution.unassignable.len(), 1);
        assert_eq!(solution.unassignable[0].shift_id, "S2");
        assert!((solution.metrics.coverage_rate - 0.5).abs() < 1e-10);
        assert_eq!(leftover(work.path()), 0);
    }

    #[test]
    fn test_input_is_the_problem() {
        let scripts = TempDir::new().unwrap();
        let copy = scripts.path().join("seen.json");
        let solver = script(
            scripts.path(),
            &format!(
                "cp \"$2\" '{}'\necho '{{\"status\":\"INFEASIBLE\"}}' > \"$4\"",
                copy.display()
            ),
        );

        let problem = make_problem();
        solver.solve(&problem, Duration::from_secs(10)).unwrap();
        let seen: SchedulingProblem =
            serde_json::from_slice(&std::fs::read(&copy).unwrap()).unwrap();
        assert_eq!(seen, problem);
    }

    #[test]
    fn test_non_zero_exit() {
        let scripts = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let solver = script(scripts.path(), "echo boom >&2\nexit 3").with_work_dir(work.path());

        let err = solver.solve(&make_problem(), Duration::from_secs(10)).unwrap_err();
        match err {
            SolverError::NonZeroExit { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(leftover(work.path()), 0);
    }

    #[test]
    fn test_timeout_kills_and_cleans_up() {
        let scripts = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let solver = script(scripts.path(), "sleep 5").with_work_dir(work.path());

        let started = Instant::now();
        let err = solver
            .solve(&make_problem(), Duration::from_millis(200))
            .unwrap_err();
        assert!(matches!(err, SolverError::Timeout { budget_ms: 200 }));
        assert!(started.elapsed() < Duration::from_secs(4));
        assert_eq!(leftover(work.path()), 0);
    }

    #[test]
    fn test_malformed_output() {
        let scripts = TempDir::new().unwrap();
        let solver = script_writing(scripts.path(), "not json");
        let err = solver.solve(&make_problem(), Duration::from_secs(10)).unwrap_err();
        assert!(matches!(err, SolverError::MalformedOutput(_)));
    }

    #[test]
    fn test_missing_output_file() {
        let scripts = TempDir::new().unwrap();
        let solver = script(scripts.path(), "exit 0");
        let err = solver.solve(&make_problem(), Duration::from_secs(10)).unwrap_err();
        assert!(matches!(err, SolverError::Handoff(_)));
    }

    #[test]
    fn test_reported_error() {
        let scripts = TempDir::new().unwrap();
        let solver = script_writing(
            scripts.path(),
            r#"{"status":"ERROR","explanation":"Solver error: no model"}"#,
        );
        let err = solver.solve(&make_problem(), Duration::from_secs(10)).unwrap_err();
        assert!(matches!(err, SolverError::Reported(ref m) if m == "Solver error: no model"));
    }

    #[test]
    fn test_spawn_failure() {
        let solver = ProcessSolver::new("/nonexistent/roster-solver", vec![]);
        let err = solver.solve(&make_problem(), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, SolverError::Spawn { .. }));
    }

    #[test]
    fn test_inconsistent_outputs() {
        let problem = make_problem();
        let parse = |json: &str| -> ExternalOutput { serde_json::from_str(json).unwrap() };

        let unknown =
            parse(r#"{"status":"FEASIBLE","assignments":[{"shiftId":"S9","employeeId":"E1"}]}"#);
        assert!(matches!(
            into_solution(&problem, unknown),
            Err(SolverError::InconsistentOutput(_))
        ));

        let twice = parse(
            r#"{"status":"FEASIBLE","assignments":[{"shiftId":"S2","employeeId":"E1"},{"shiftId":"S2","employeeId":"E2"}]}"#,
        );
        assert!(matches!(
            into_solution(&problem, twice),
            Err(SolverError::InconsistentOutput(_))
        ));

        let unskilled =
            parse(r#"{"status":"FEASIBLE","assignments":[{"shiftId":"S1","employeeId":"E2"}]}"#);
        let err = into_solution(&problem, unskilled).unwrap_err();
        assert!(err.to_string().contains("cashier"));
    }
}
