//! Problem definition and data structures for the VRPTW.

use crate::error::ProblemError;
use serde::{Deserialize, Serialize};
use std::f64;
use std::fs;
use std::path::Path;

/// Represents a node (customer or depot) in the VRPTW.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub demand: f64,
    /// Earliest time service may start
    pub ready_time: f64,
    /// Latest allowed arrival time
    pub due_time: f64,
    pub service_time: f64,
}

impl Node {
    /// Create a new node.
    pub fn new(
        id: usize,
        x: f64,
        y: f64,
        demand: f64,
        ready_time: f64,
        due_time: f64,
        service_time: f64,
    ) -> Self {
        Node {
            id,
            x,
            y,
            demand,
            ready_time,
            due_time,
            service_time,
        }
    }

    /// Calculate the Euclidean distance between two nodes.
    pub fn distance(&self, other: &Node) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Rounding applied to the Euclidean travel times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DistancePrecision {
    /// Truncate to one decimal digit.
    #[default]
    OneDecimal,
    /// Keep the full floating point value.
    Exact,
}

impl DistancePrecision {
    fn apply(self, distance: f64) -> f64 {
        match self {
            DistancePrecision::OneDecimal => (distance * 1e1).floor() / 1e1,
            DistancePrecision::Exact => distance,
        }
    }
}

/// Represents a VRPTW problem instance.
///
/// Node ids are positions in `nodes`; the travel time matrix is symmetric and
/// never changes after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub name: String,
    pub nodes: Vec<Node>,
    pub depot_index: usize,
    pub vehicle_count: usize,
    pub vehicle_capacity: f64,
    pub precision: DistancePrecision,
    pub time_matrix: Vec<Vec<f64>>,
    penalty: f64,
    max_time: f64,
}

impl Problem {
    /// Create a new VRPTW problem.
    pub fn new(
        name: String,
        nodes: Vec<Node>,
        depot_index: usize,
        vehicle_count: usize,
        vehicle_capacity: f64,
        precision: DistancePrecision,
    ) -> Self {
        let time_matrix = Self::compute_time_matrix(&nodes, precision);

        let max_time = time_matrix
            .iter()
            .flat_map(|row| row.iter().copied())
            .fold(0.0, f64::max);

        // Big-M: one violated constraint outweighs any sum of real travel times.
        let customers = nodes.len().saturating_sub(1);
        let out_and_back: f64 = (0..nodes.len())
            .filter(|&i| i != depot_index)
            .map(|i| 2.0 * time_matrix[depot_index][i])
            .sum();
        let penalty = (1.0 + out_and_back) * (customers + 1) as f64;

        Problem {
            name,
            nodes,
            depot_index,
            vehicle_count,
            vehicle_capacity,
            precision,
            time_matrix,
            penalty,
            max_time,
        }
    }

    /// Travel time between two node ids.
    #[inline]
    pub fn get_time(&self, from: usize, to: usize) -> f64 {
        self.time_matrix[from][to]
    }

    /// Get the number of customers (excluding the depot).
    pub fn get_customer_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Get the depot node.
    pub fn get_depot(&self) -> &Node {
        &self.nodes[self.depot_index]
    }

    /// Ids of every non-depot node, ascending.
    pub fn customers(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.nodes.len()).filter(move |&i| i != self.depot_index)
    }

    /// Cost added once per violated constraint instance.
    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    /// Largest entry of the travel time matrix.
    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    fn compute_time_matrix(nodes: &[Node], precision: DistancePrecision) -> Vec<Vec<f64>> {
        let n = nodes.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let value = precision.apply(nodes[i].distance(&nodes[j]));
                matrix[i][j] = value;
                matrix[j][i] = value;
            }
        }

        matrix
    }

    /// Short description used at the top of run transcripts.
    pub fn info(&self) -> String {
        format!(
            "instance: {}\nnumber of nodes: {}\nvehicles: {}",
            self.name,
            self.nodes.len(),
            self.vehicle_count
        )
    }

    /// Load a problem from a Solomon formatted file.
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        precision: DistancePrecision,
    ) -> Result<Self, ProblemError> {
        let content = fs::read_to_string(path)?;
        Self::from_solomon(&content, precision)
    }

    /// Parse the Solomon text layout: name on the first line, vehicle count and
    /// capacity on the fifth, one customer row per line from the tenth on.
    pub fn from_solomon(content: &str, precision: DistancePrecision) -> Result<Self, ProblemError> {
        let lines: Vec<&str> = content.lines().collect();

        let name = lines
            .first()
            .map(|line| line.replace(' ', "").trim().to_string())
            .ok_or(ProblemError::MissingSection("name"))?;

        let vehicle_line = lines
            .get(4)
            .ok_or(ProblemError::MissingSection("VEHICLE"))?;
        let parts: Vec<&str> = vehicle_line.split_whitespace().collect();
        if parts.len() < 2 {
            return Err(ProblemError::Parse {
                line: 5,
                message: "expected vehicle count and capacity".to_string(),
            });
        }
        let vehicle_count = parts[0].parse::<usize>()?;
        let vehicle_capacity = parts[1].parse::<f64>()?;

        let mut rows: Vec<[f64; 7]> = Vec::new();
        for line in lines.iter().skip(9) {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 7 {
                continue;
            }

            let mut row = [0.0; 7];
            for (j, part) in parts.iter().take(7).enumerate() {
                let value = part.parse::<f64>()?;
                row[j] = if j == 0 {
                    value
                } else {
                    (value * 1e2).round() / 1e2
                };
            }
            rows.push(row);
        }

        if rows.len() < 2 {
            return Err(ProblemError::Empty);
        }

        let mut nodes = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row[0] as usize != index {
                return Err(ProblemError::Parse {
                    line: index + 10,
                    message: format!("expected node id {}, found {}", index, row[0]),
                });
            }
            nodes.push(Node::new(
                index, row[1], row[2], row[3], row[4], row[5], row[6],
            ));
        }

        Ok(Problem::new(
            name,
            nodes,
            0,
            vehicle_count,
            vehicle_capacity,
            precision,
        ))
    }
}
