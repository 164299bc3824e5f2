//! The indexed low-level heuristics the selection strategies choose from.

use crate::destroy;
use crate::local_search::LocalSearch;
use crate::problem::Problem;
use crate::repair;
use crate::solution::Solution;
use crate::utils::Random;
use std::collections::BTreeSet;
use std::fmt;

/// A local search operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Improvement {
    Shift,
    Interchange,
    TwoOpt,
    CrossExchange(usize),
    TwoOptInter,
    PathRelocation,
    OrOpt,
}

impl Improvement {
    pub fn apply(&self, solution: &mut Solution, problem: &Problem, rng: &mut Random) {
        let search = LocalSearch::new(problem);
        match *self {
            Improvement::Shift => search.shift(solution, rng),
            Improvement::Interchange => search.interchange(solution, rng),
            Improvement::TwoOpt => search.two_opt(solution),
            Improvement::CrossExchange(len) => search.cross_exchange(solution, len, rng),
            Improvement::TwoOptInter => search.two_opt_inter(solution, rng),
            Improvement::PathRelocation => search.path_relocation(solution, rng),
            Improvement::OrOpt => search.or_opt(solution),
        };
    }
}

impl fmt::Display for Improvement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Improvement::Shift => write!(f, "shift"),
            Improvement::Interchange => write!(f, "interchange"),
            Improvement::TwoOpt => write!(f, "2-opt"),
            Improvement::CrossExchange(len) => write!(f, "cross-exchange({})", len),
            Improvement::TwoOptInter => write!(f, "2-opt*"),
            Improvement::PathRelocation => write!(f, "path-relocation"),
            Improvement::OrOpt => write!(f, "or-opt"),
        }
    }
}

/// A removal operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Removal {
    Random,
    Shaw,
    Worst,
    DistanceRadial(f64),
    TimeRadial(f64),
    Window,
    Route,
}

impl Removal {
    pub fn apply(
        &self,
        solution: &mut Solution,
        problem: &Problem,
        rng: &mut Random,
    ) -> BTreeSet<usize> {
        match *self {
            Removal::Random => destroy::random_removal(solution, problem, rng),
            Removal::Shaw => destroy::shaw_removal(solution, problem, rng),
            Removal::Worst => destroy::worst_removal(solution, problem, rng),
            Removal::DistanceRadial(div) => {
                destroy::distance_radial_removal(solution, problem, div, rng)
            }
            Removal::TimeRadial(div) => destroy::time_radial_removal(solution, problem, div, rng),
            Removal::Window => destroy::window_removal(solution, problem, rng),
            Removal::Route => destroy::route_removal(solution, problem, rng),
        }
    }
}

impl fmt::Display for Removal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Removal::Random => write!(f, "random"),
            Removal::Shaw => write!(f, "shaw"),
            Removal::Worst => write!(f, "worst"),
            Removal::DistanceRadial(div) => write!(f, "distance-radial({})", div),
            Removal::TimeRadial(div) => write!(f, "time-radial({})", div),
            Removal::Window => write!(f, "window"),
            Removal::Route => write!(f, "route"),
        }
    }
}

/// An insertion operator; `noise` perturbs every insertion cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Greedy { noise: bool },
    Regret { k: usize, noise: bool },
    RegretAll { noise: bool },
}

impl Insertion {
    pub fn apply(
        &self,
        solution: &mut Solution,
        problem: &Problem,
        nodes: BTreeSet<usize>,
        rng: &mut Random,
    ) {
        match *self {
            Insertion::Greedy { noise } => {
                repair::greedy_insertion(solution, problem, nodes, noise, rng)
            }
            Insertion::Regret { k, noise } => {
                repair::regret_insertion(solution, problem, k, nodes, noise, rng)
            }
            Insertion::RegretAll { noise } => {
                repair::regret_all_insertion(solution, problem, nodes, noise, rng)
            }
        }
    }
}

impl fmt::Display for Insertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, noise) = match self {
            Insertion::Greedy { noise } => ("greedy".to_string(), *noise),
            Insertion::Regret { k, noise } => (format!("regret-{}", k), *noise),
            Insertion::RegretAll { noise } => ("regret-all".to_string(), *noise),
        };
        if noise {
            write!(f, "{}~", name)
        } else {
            write!(f, "{}", name)
        }
    }
}

/// One selectable arm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LowLevel {
    Improve(Improvement),
    RuinRecreate(Removal, Insertion),
    /// Leaves the solution untouched
    Noop,
    /// Splits one route into out-and-back routes
    DissolveOne,
    /// Splits every multi-customer route into out-and-back routes
    DissolveAll,
}

impl LowLevel {
    pub fn apply(&self, solution: &mut Solution, problem: &Problem, rng: &mut Random) {
        match *self {
            LowLevel::Improve(improvement) => improvement.apply(solution, problem, rng),
            LowLevel::RuinRecreate(removal, insertion) => {
                let removed = removal.apply(solution, problem, rng);
                insertion.apply(solution, problem, removed, rng);
            }
            LowLevel::Noop => {}
            LowLevel::DissolveOne => destroy::dissolve_one_route(solution, problem, rng),
            LowLevel::DissolveAll => destroy::dissolve_all_routes(solution, problem),
        }
    }
}

impl fmt::Display for LowLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LowLevel::Improve(improvement) => write!(f, "{}", improvement),
            LowLevel::RuinRecreate(removal, insertion) => write!(f, "{}+{}", removal, insertion),
            LowLevel::Noop => write!(f, "noop"),
            LowLevel::DissolveOne => write!(f, "dissolve-one"),
            LowLevel::DissolveAll => write!(f, "dissolve-all"),
        }
    }
}

/// Ordered list of arms; the position of an operator is its arm index.
#[derive(Debug, Clone)]
pub struct Catalog {
    operators: Vec<LowLevel>,
}

impl Catalog {
    /// The 27 standard arms: 7 local searches followed by 20 ruin-and-recreate pairs.
    pub fn standard() -> Self {
        let regret = |k| Insertion::Regret { k, noise: false };
        let regret_noise = |k| Insertion::Regret { k, noise: true };
        let greedy = Insertion::Greedy { noise: false };
        let regret_all = Insertion::RegretAll { noise: false };
        let regret_all_noise = Insertion::RegretAll { noise: true };

        let mut operators: Vec<LowLevel> =
            improvements().into_iter().map(LowLevel::Improve).collect();
        operators.extend(
            [
                (Removal::TimeRadial(15.0), regret(2)),
                (Removal::DistanceRadial(15.0), regret(2)),
                (Removal::TimeRadial(20.0), regret(3)),
                (Removal::DistanceRadial(20.0), regret(3)),
                (Removal::Shaw, regret(3)),
                (Removal::Shaw, regret_noise(3)),
                (Removal::Shaw, regret(4)),
                (Removal::Shaw, regret_noise(4)),
                (Removal::Shaw, regret_all),
                (Removal::Shaw, greedy),
                (Removal::Random, regret(4)),
                (Removal::Random, regret_noise(4)),
                (Removal::Random, greedy),
                (Removal::Random, regret_all),
                (Removal::Random, regret_all_noise),
                (Removal::Worst, regret(4)),
                (Removal::Worst, regret_noise(4)),
                (Removal::Window, regret(3)),
                (Removal::Route, regret_all_noise),
                (Removal::Route, regret_all),
            ]
            .into_iter()
            .map(|(removal, insertion)| LowLevel::RuinRecreate(removal, insertion)),
        );

        Catalog { operators }
    }

    /// The standard arms plus probing arms: no-op, dissolve one route,
    /// dissolve all routes and a second shift.
    pub fn diagnostic() -> Self {
        let mut catalog = Catalog::standard();
        catalog.operators.extend([
            LowLevel::Noop,
            LowLevel::DissolveOne,
            LowLevel::DissolveAll,
            LowLevel::Improve(Improvement::Shift),
        ]);
        catalog
    }

    /// Build a catalog from an explicit operator list.
    pub fn from_operators(operators: Vec<LowLevel>) -> Self {
        Catalog { operators }
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LowLevel> {
        self.operators.get(index)
    }

    /// Apply arm `index` to `solution`.
    ///
    /// An index past the catalog is a caller bug: it panics in debug builds
    /// and leaves `solution` untouched otherwise.
    pub fn apply(&self, index: usize, solution: &mut Solution, problem: &Problem, rng: &mut Random) {
        debug_assert!(
            index < self.len(),
            "arm {} outside a catalog of {}",
            index,
            self.len()
        );
        if let Some(operator) = self.operators.get(index) {
            operator.apply(solution, problem, rng);
        }
    }

    /// Display names, in arm order.
    pub fn names(&self) -> Vec<String> {
        self.operators.iter().map(|op| op.to_string()).collect()
    }
}

/// The local searches, in arm order.
pub fn improvements() -> Vec<Improvement> {
    vec![
        Improvement::Shift,
        Improvement::Interchange,
        Improvement::TwoOpt,
        Improvement::CrossExchange(crate::local_search::CROSS_EXCHANGE_LENGTH),
        Improvement::TwoOptInter,
        Improvement::PathRelocation,
        Improvement::OrOpt,
    ]
}

/// The removal arms of the adaptive large neighbourhood search.
pub fn removals() -> Vec<Removal> {
    vec![
        Removal::Random,
        Removal::Shaw,
        Removal::Worst,
        Removal::DistanceRadial(15.0),
        Removal::TimeRadial(15.0),
        Removal::DistanceRadial(20.0),
        Removal::TimeRadial(20.0),
        Removal::Window,
        Removal::Route,
    ]
}

/// The insertion arms of the adaptive large neighbourhood search.
pub fn insertions() -> Vec<Insertion> {
    let mut list = Vec::with_capacity(10);
    for noise in [false, true] {
        list.push(Insertion::Greedy { noise });
    }
    for k in 2..=4 {
        for noise in [false, true] {
            list.push(Insertion::Regret { k, noise });
        }
    }
    for noise in [false, true] {
        list.push(Insertion::RegretAll { noise });
    }
    list
}
