//! Run results and the human-readable run transcript.

use crate::problem::Problem;
use crate::solution::Solution;
use crate::utils::{round2, to_column};
use itertools::Itertools;
use log::{info, trace};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

/// Everything a run hands back to its caller.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Strategy name with its parameters
    pub algorithm: String,
    /// Node sequences of the non-empty routes of the best solution
    pub routes: Vec<Vec<usize>>,
    /// Arrival time at every stop of `routes`
    pub arrival_times: Vec<Vec<f64>>,
    /// Best cost rounded to two decimals, or `f64::MAX` when no feasible solution was found
    pub total_cost: f64,
    /// Seconds, rounded to two decimals
    pub run_time: f64,
    /// Executed sequences (or ALNS iterations)
    pub iterations: u64,
    pub feasible: bool,
    pub transcript: String,
    /// Final arm-to-arm probabilities; ALNS reports one weight row per operator family
    pub transitions: Vec<Vec<f64>>,
    /// Final per-arm apply probabilities; empty for ALNS
    pub apply: Vec<f64>,
}

impl RunReport {
    /// Assemble the report of a finished run.
    pub fn new(
        algorithm: String,
        best: &Solution,
        run_time: f64,
        iterations: u64,
        transcript: String,
        transitions: Vec<Vec<f64>>,
        apply: Vec<f64>,
    ) -> Self {
        RunReport {
            algorithm,
            routes: best.non_empty_routes(),
            arrival_times: best.arrival_times(),
            total_cost: if best.feasible {
                round2(best.total_cost)
            } else {
                f64::MAX
            },
            run_time: round2(run_time),
            iterations,
            feasible: best.feasible,
            transcript,
            transitions,
            apply,
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self).map_err(io::Error::from)
    }
}

/// Accumulates the run transcript, echoing it through the logger when verbose.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    verbose: bool,
    text: String,
}

impl Transcript {
    pub fn new(verbose: bool) -> Self {
        Transcript {
            verbose,
            text: String::new(),
        }
    }

    /// Append one line.
    pub fn line(&mut self, line: &str) {
        if self.verbose {
            info!("{}", line);
        }
        self.text.push_str(line);
        self.text.push('\n');
    }

    /// Instance description and banner naming the algorithm.
    pub fn header(&mut self, problem: &Problem, algorithm: &str, arms: Option<usize>) {
        for line in problem.info().lines() {
            self.line(line);
        }
        self.line("");
        self.line(&"*".repeat(80));
        self.line(&format!("running {}", algorithm));
        if let Some(arms) = arms {
            self.line(&format!("number of low-level heuristics: {}", arms));
        }
        self.line(&"*".repeat(80));
        self.line("");
        self.line(&format!(
            "{}|{}|{}|{}|{}|{}",
            to_column("time", 12),
            to_column("apply", 10),
            to_column("best", 18),
            to_column("current", 18),
            to_column("tmp", 18),
            to_column("sequence", 20)
        ));
        self.line(&"-".repeat(92));
    }

    /// One executed sequence.
    pub fn row(
        &mut self,
        seconds: f64,
        iterations: u64,
        best: f64,
        current: f64,
        candidate: f64,
        sequence: &[usize],
    ) {
        let row = format!(
            "{}|{}|{}|{}|{}|{}",
            to_column(&format!("{:.3}", seconds), 12),
            to_column(&iterations.to_string(), 10),
            to_column(&round2(best).to_string(), 18),
            to_column(&round2(current).to_string(), 18),
            to_column(&round2(candidate).to_string(), 18),
            to_column(&format!("[{}]", sequence.iter().join(", ")), 20)
        );
        if !self.verbose {
            trace!("{}", row);
        }
        self.line(&row);
    }

    /// Closing rule and the best solution found.
    pub fn footer(&mut self, best: &Solution, seconds: f64) {
        self.line(&"-".repeat(92));
        self.line("");
        self.line(&format!("feasible solution: {}", best.feasible));
        self.line(&format!("total cost: {}", round2(best.total_cost)));
        self.line(&format!("total time: {:.3}", seconds));
        self.line("");
        if best.feasible {
            for route in best.non_empty_routes() {
                self.line(&format!("[{}]", route.iter().join(", ")));
            }
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
