//! Runs every problem of a problems file against a SPARQL endpoint and collects
//! the solutions, one request at a time.

use crate::config::Config;
use crate::endpoint::{HttpEndpoint, SparqlEndpoint};
use crate::problem::{read_problems_file, Problem, ProblemKind};
use crate::query::{query_for, UNKNOWN_PROBLEM_QUERY};
use crate::solution::{format_solution, write_solutions_file, Solution};
use anyhow::Result;
use log::{info, warn};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub problems: usize,
    pub answered: usize,
    /// Requests that failed or whose results could not be read
    pub failed: usize,
    pub unknown: usize,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Problems: {} (answered {}, failed {}, unknown type {})",
            self.problems, self.answered, self.failed, self.unknown
        )
    }
}

/// Answers each problem in order. Failed problems are logged and left out of
/// the returned solutions; unknown kinds get a placeholder and are never sent.
pub fn solve<E: SparqlEndpoint + ?Sized>(
    problems: &[Problem],
    endpoint: &mut E,
) -> (Vec<Solution>, RunReport) {
    let mut solutions = Vec::with_capacity(problems.len());
    let mut report = RunReport {
        problems: problems.len(),
        ..RunReport::default()
    };

    for problem in problems {
        let query = match query_for(problem) {
            Some(query) => query,
            None => {
                if let ProblemKind::Unknown { kind } = &problem.kind {
                    warn!("Problem {} has unknown type '{kind}'", problem.id);
                }
                report.unknown += 1;
                solutions.push(Solution::empty(&problem.id, UNKNOWN_PROBLEM_QUERY));
                continue;
            }
        };
        let outcome = endpoint
            .select(&query)
            .and_then(|xml| format_solution(&problem.id, &query, &xml));
        match outcome {
            Ok(solution) => {
                info!(
                    "Problem {}: {} answers",
                    problem.id,
                    solution.answers.len()
                );
                report.answered += 1;
                solutions.push(solution);
            }
            Err(e) => {
                warn!(
                    "No solution for problem {} from {}: {e:#}",
                    problem.id,
                    endpoint.location()
                );
                report.failed += 1;
            }
        }
    }
    (solutions, report)
}

/// Reads `problems_path`, queries the configured endpoint and writes the
/// solutions report to `output_path`.
pub fn solve_file(problems_path: &Path, output_path: &Path, config: &Config) -> Result<RunReport> {
    let problems = read_problems_file(problems_path)?;
    info!(
        "Solving {} problems against {}",
        problems.len(),
        config.endpoint
    );
    let mut endpoint = HttpEndpoint::from_config(config)?;
    let (solutions, report) = solve(&problems, &mut endpoint);
    write_solutions_file(&solutions, output_path)?;
    info!("{report}");
    Ok(report)
}
