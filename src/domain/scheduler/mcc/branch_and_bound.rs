use crate::domain::conflict::conflict_graph::ConflictGraph;
use crate::domain::schedule::slot::Slot;
use crate::domain::schedule::transmission::Transmission;
use crate::domain::schedule::tsch_schedule::PlacementRules;

/// Result of a minimum colouring of the transmission conflict graph.
#[derive(Debug, Clone)]
pub struct ColoringResult {
    /// Slot per transmission, relabelled in transmission order (first transmission in slot 0).
    pub colors: Vec<usize>,
    pub num_colors: usize,
    pub lower_bound: usize,
    pub explored: u64,

    /// `false` when the search limit stopped the search before optimality was proven.
    pub proven_optimal: bool,
}

/// DSATUR branch and bound over the transmissions of one channel.
///
/// Vertices are transmissions, an edge joins two transmissions that may not
/// share a slot. The greedy first-fit colouring in input order seeds the
/// upper bound and a greedy clique gives the lower bound.
pub struct EdgeColoring {
    adjacency: Vec<Vec<bool>>,
    neighbours: Vec<Vec<usize>>,
    search_limit: u64,

    colors: Vec<Option<usize>>,
    best: Vec<usize>,
    best_count: usize,
    lower_bound: usize,
    explored: u64,
    truncated: bool,
}

impl EdgeColoring {
    pub fn new(transmissions: &[Transmission], graph: &ConflictGraph, rules: &PlacementRules) -> Self {
        let n = transmissions.len();
        let mut adjacency = vec![vec![false; n]; n];

        for i in 0..n {
            for j in (i + 1)..n {
                if Slot::pair_conflicts(&transmissions[i], &transmissions[j], graph, rules) {
                    adjacency[i][j] = true;
                    adjacency[j][i] = true;
                }
            }
        }

        let neighbours = adjacency.iter().map(|row| row.iter().enumerate().filter(|(_, c)| **c).map(|(j, _)| j).collect()).collect();

        EdgeColoring {
            adjacency,
            neighbours,
            search_limit: u64::MAX,
            colors: vec![None; n],
            best: Vec::new(),
            best_count: 0,
            lower_bound: 0,
            explored: 0,
            truncated: false,
        }
    }

    pub fn search_limit(mut self, search_limit: u64) -> Self {
        self.search_limit = search_limit;
        self
    }

    pub fn solve(mut self) -> ColoringResult {
        let n = self.adjacency.len();

        self.best = self.greedy();
        self.best_count = self.best.iter().map(|c| c + 1).max().unwrap_or(0);
        self.lower_bound = self.clique_bound();

        if self.best_count > self.lower_bound {
            self.branch(0, 0);
        }

        let colors = relabel(&self.best);
        let num_colors = if n == 0 { 0 } else { self.best_count };

        ColoringResult {
            colors,
            num_colors,
            lower_bound: self.lower_bound,
            explored: self.explored,
            proven_optimal: !self.truncated,
        }
    }

    /// First fit in input order.
    fn greedy(&self) -> Vec<usize> {
        let mut colors: Vec<usize> = Vec::with_capacity(self.adjacency.len());

        for v in 0..self.adjacency.len() {
            let color = (0..).find(|c| self.neighbours[v].iter().all(|u| *u >= v || colors[*u] != *c)).unwrap_or(0);
            colors.push(color);
        }
        colors
    }

    /// Size of a clique grown greedily from the highest-degree vertex.
    fn clique_bound(&self) -> usize {
        let mut order: Vec<usize> = (0..self.adjacency.len()).collect();
        order.sort_by(|a, b| self.neighbours[*b].len().cmp(&self.neighbours[*a].len()).then(a.cmp(b)));

        let mut clique: Vec<usize> = Vec::new();
        for v in order {
            if clique.iter().all(|u| self.adjacency[v][*u]) {
                clique.push(v);
            }
        }
        clique.len()
    }

    fn saturation(&self, v: usize) -> usize {
        let mut seen: Vec<usize> = self.neighbours[v].iter().filter_map(|u| self.colors[*u]).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    /// Uncoloured vertex with the highest saturation, then highest degree, then lowest index.
    fn next_vertex(&self) -> Option<usize> {
        (0..self.colors.len()).filter(|v| self.colors[*v].is_none()).max_by(|a, b| {
            self.saturation(*a)
                .cmp(&self.saturation(*b))
                .then(self.neighbours[*a].len().cmp(&self.neighbours[*b].len()))
                .then(b.cmp(a))
        })
    }

    fn branch(&mut self, colored: usize, used: usize) {
        if self.explored >= self.search_limit {
            self.truncated = true;
            return;
        }
        self.explored += 1;

        if colored == self.colors.len() {
            if used < self.best_count {
                self.best = self.colors.iter().map(|c| c.unwrap_or(0)).collect();
                self.best_count = used;
            }
            return;
        }

        if used >= self.best_count {
            return;
        }

        let Some(v) = self.next_vertex() else {
            return;
        };

        // Reuse an open colour, then try opening one more
        for color in 0..=used {
            if color == used && used + 1 >= self.best_count {
                break;
            }
            if self.neighbours[v].iter().any(|u| self.colors[*u] == Some(color)) {
                continue;
            }

            self.colors[v] = Some(color);
            self.branch(colored + 1, used.max(color + 1));
            self.colors[v] = None;

            if self.best_count <= self.lower_bound || self.truncated {
                return;
            }
        }
    }
}

/// Renumbers colours by first appearance so equal colourings yield equal schedules.
fn relabel(colors: &[usize]) -> Vec<usize> {
    let mut mapping: Vec<Option<usize>> = vec![None; colors.iter().map(|c| c + 1).max().unwrap_or(0)];
    let mut next = 0;

    colors
        .iter()
        .map(|c| {
            *mapping[*c].get_or_insert_with(|| {
                next += 1;
                next - 1
            })
        })
        .collect()
}
