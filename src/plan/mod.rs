//! JSON plan format for sequential multi-step splices.
//!
//! A plan lists splice steps that run in order against files under one
//! workspace directory.

use crate::document::SpliceBoundary;
use crate::error::{Result, SpliceError};
use crate::splice::{apply_splice, SpliceRequest, SpliceSummary};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A splice plan containing sequential steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Steps to execute, in order.
    pub steps: Vec<SpliceStep>,
}

/// A single step in the plan.
///
/// Each step is equivalent to one `linesplice splice` invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpliceStep {
    /// Target file, relative to the workspace unless absolute.
    pub file: String,

    /// Replacement content file.
    #[serde(rename = "with")]
    pub with_file: String,

    /// First line removed (0-based).
    pub start: usize,

    /// First line kept after the cut (0-based).
    pub end: usize,

    /// Optional SHA-256 the target must match before this step runs.
    #[serde(default)]
    pub expected_hash: Option<String>,
}

impl SpliceStep {
    /// Build the request for this step, resolving paths against `workspace_dir`.
    pub fn to_request(&self, workspace_dir: &Path) -> SpliceRequest {
        let request = SpliceRequest::new(
            workspace_dir.join(&self.file),
            workspace_dir.join(&self.with_file),
            SpliceBoundary::new(self.start, self.end),
        );
        match &self.expected_hash {
            Some(hash) => request.with_expected_hash(hash.clone()),
            None => request,
        }
    }
}

/// Parse and validate a plan from a JSON file.
///
/// # Returns
/// * `Ok(Plan)` - Parsed plan with validated schema
/// * `Err(SpliceError)` - I/O error, JSON parse error or schema violation
pub fn parse_plan(plan_path: &Path) -> Result<Plan> {
    let content = fs::read_to_string(plan_path).map_err(|e| SpliceError::io(plan_path, e))?;
    parse_plan_str(&content)
}

/// Parse and validate a plan from JSON text.
pub fn parse_plan_str(content: &str) -> Result<Plan> {
    let plan: Plan = serde_json::from_str(content).map_err(|e| SpliceError::InvalidPlanSchema {
        message: format!("JSON parse error: {}", e),
    })?;

    if plan.steps.is_empty() {
        return Err(SpliceError::InvalidPlanSchema {
            message: "Plan must contain at least one step".to_string(),
        });
    }

    for (i, step) in plan.steps.iter().enumerate() {
        if step.file.is_empty() {
            return Err(SpliceError::InvalidPlanSchema {
                message: format!("Step {} has empty 'file' field", i + 1),
            });
        }

        if step.with_file.is_empty() {
            return Err(SpliceError::InvalidPlanSchema {
                message: format!("Step {} has empty 'with' field", i + 1),
            });
        }

        if step.start > step.end {
            return Err(SpliceError::InvalidPlanSchema {
                message: format!(
                    "Step {} has 'start' ({}) after 'end' ({})",
                    i + 1,
                    step.start,
                    step.end
                ),
            });
        }
    }

    Ok(plan)
}

/// Execute a plan step by step.
///
/// Stops on the first failure. Steps that already ran stay applied; there is
/// no global rollback.
pub fn execute_plan(plan_path: &Path, workspace_dir: &Path) -> Result<Vec<SpliceSummary>> {
    let plan = parse_plan(plan_path)?;
    let mut summaries = Vec::with_capacity(plan.steps.len());

    for (step_num, step) in plan.steps.iter().enumerate() {
        let step_index = step_num + 1;
        let request = step.to_request(workspace_dir);

        match apply_splice(&request) {
            Ok(summary) => {
                log::info!(
                    "Step {}: spliced {} at lines {}",
                    step_index,
                    step.file,
                    summary.boundary
                );
                summaries.push(summary);
            }
            Err(e) => {
                return Err(SpliceError::PlanExecutionFailed {
                    step: step_index,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(summaries)
}
