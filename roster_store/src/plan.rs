//! The planning operation.
//!
//! `plan` is the one entry point collaborators call: validate the request,
//! load the snapshot, assemble the context, compile and solve on a blocking
//! worker, and persist the result under the requested merge policy.
//! INFEASIBLE and UNKNOWN are normal outcomes; nothing is written and zero
//! rows are reported for them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::info;

use roster_core::compiler::{PenaltyWeights, RosterCompiler};
use roster_core::context::{PlanningContext, PlanningWindow};
use roster_core::solver::{self, SolveStatus};
use roster_core::types::{EmployeeId, MergePolicy};

use crate::error::PlanError;
use crate::{loader, writer};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub existing_assignments_handling: MergePolicy,
    pub allow_overplanning: bool,
    /// Ad-hoc absences on top of the store's absence table.
    pub absences: HashSet<(EmployeeId, NaiveDate)>,
    pub time_limit_seconds: Option<f64>,
    pub weights: PenaltyWeights,
}

impl PlanRequest {
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        existing_assignments_handling: MergePolicy,
    ) -> Self {
        PlanRequest {
            start_date,
            end_date,
            existing_assignments_handling,
            allow_overplanning: false,
            absences: HashSet::new(),
            time_limit_seconds: None,
            weights: PenaltyWeights::default(),
        }
    }

    pub fn with_overplanning(mut self, allow: bool) -> Self {
        self.allow_overplanning = allow;
        self
    }

    pub fn with_absences(
        mut self,
        absences: impl IntoIterator<Item = (EmployeeId, NaiveDate)>,
    ) -> Self {
        self.absences.extend(absences);
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_seconds = Some(seconds);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOutcome {
    pub status: SolveStatus,
    pub objective_value: f64,
    pub assignments_created: u64,
    /// Pairs the solver produced that already existed as rows.
    pub assignments_skipped: u64,
}

pub async fn plan(pool: &SqlitePool, request: PlanRequest) -> Result<PlanOutcome, PlanError> {
    let window = PlanningWindow::for_dates(request.start_date, request.end_date)
        .map_err(PlanError::Input)?;

    let mut snapshot = loader::load_snapshot(pool, &window).await?;
    snapshot.absences.extend(request.absences.iter().copied());

    let ctx =
        PlanningContext::assemble(window, request.existing_assignments_handling, snapshot)
            .map_err(PlanError::Data)?;

    let allow_overplanning = request.allow_overplanning;
    let weights = request.weights;
    let time_limit = request.time_limit_seconds;
    let outcome = tokio::task::spawn_blocking(move || {
        let model = RosterCompiler::new(&ctx, allow_overplanning, weights).compile();
        solver::solve(model, time_limit)
    })
    .await
    .map_err(|err| PlanError::SolverTask(err.to_string()))?;

    if !outcome.status.has_solution() {
        info!(status = %outcome.status, "planning finished without a writable solution");
        return Ok(PlanOutcome {
            status: outcome.status,
            objective_value: outcome.objective_value,
            assignments_created: 0,
            assignments_skipped: 0,
        });
    }

    let summary = writer::write_assignments(
        pool,
        request.existing_assignments_handling,
        request.start_date,
        request.end_date,
        &outcome.assignments,
    )
    .await?;

    info!(
        status = %outcome.status,
        created = summary.created,
        skipped = summary.skipped,
        "planning finished"
    );

    Ok(PlanOutcome {
        status: outcome.status,
        objective_value: outcome.objective_value,
        assignments_created: summary.created,
        assignments_skipped: summary.skipped,
    })
}
