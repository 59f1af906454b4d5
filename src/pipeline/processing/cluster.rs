use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::duplicate::DuplicateDetector;
use crate::domain::RawEventItem;

/// Raw events judged to describe one occurrence, in original input order
pub type DuplicateGroup<'a> = Vec<&'a RawEventItem>;

/// How duplicate verdicts are turned into groups
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStrategy {
    /// Greedy single pass: each group's first member is the only one compared
    /// against later candidates. Not transitive.
    #[default]
    Anchor,
    /// Connected components of the full pairwise duplicate relation
    Transitive,
}

impl fmt::Display for ClusterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterStrategy::Anchor => f.write_str("anchor"),
            ClusterStrategy::Transitive => f.write_str("transitive"),
        }
    }
}

impl FromStr for ClusterStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anchor" => Ok(ClusterStrategy::Anchor),
            "transitive" => Ok(ClusterStrategy::Transitive),
            other => Err(format!(
                "unknown clustering strategy '{}' (expected anchor or transitive)",
                other
            )),
        }
    }
}

/// Partitions a batch of raw events into duplicate groups
#[derive(Debug, Clone)]
pub struct Clusterer {
    detector: DuplicateDetector,
    strategy: ClusterStrategy,
}

impl Clusterer {
    pub fn new(detector: DuplicateDetector, strategy: ClusterStrategy) -> Self {
        Self { detector, strategy }
    }

    pub fn strategy(&self) -> ClusterStrategy {
        self.strategy
    }

    pub fn detector(&self) -> &DuplicateDetector {
        &self.detector
    }

    /// Every input event lands in exactly one non-empty group. Groups are ordered
    /// by the input position of their first member.
    pub fn cluster<'a>(&self, events: &'a [RawEventItem]) -> Vec<DuplicateGroup<'a>> {
        let groups = match self.strategy {
            ClusterStrategy::Anchor => self.anchor_groups(events),
            ClusterStrategy::Transitive => self.transitive_groups(events),
        };

        debug!(
            strategy = %self.strategy,
            input = events.len(),
            groups = groups.len(),
            "Clustered raw events"
        );

        groups
            .into_iter()
            .map(|members| members.into_iter().map(|i| &events[i]).collect())
            .collect()
    }

    // Assignment is tracked by input position, so repeated ids still each get a group.
    fn anchor_groups(&self, events: &[RawEventItem]) -> Vec<Vec<usize>> {
        let mut assigned = vec![false; events.len()];
        let mut groups = Vec::new();

        for i in 0..events.len() {
            if assigned[i] {
                continue;
            }
            assigned[i] = true;
            let mut group = vec![i];

            for j in (i + 1)..events.len() {
                if assigned[j] {
                    continue;
                }
                if self.detector.are_duplicates(&events[i], &events[j]).is_duplicate {
                    assigned[j] = true;
                    group.push(j);
                }
            }

            groups.push(group);
        }

        groups
    }

    fn transitive_groups(&self, events: &[RawEventItem]) -> Vec<Vec<usize>> {
        let mut components = DisjointSet::new(events.len());

        for i in 0..events.len() {
            for j in (i + 1)..events.len() {
                if self.detector.are_duplicates(&events[i], &events[j]).is_duplicate {
                    components.union(i, j);
                }
            }
        }

        // Walking in input order keeps members sorted and groups ordered by first member.
        let mut slot_for_root: Vec<Option<usize>> = vec![None; events.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for i in 0..events.len() {
            let root = components.find(i);
            match slot_for_root[root] {
                Some(slot) => groups[slot].push(i),
                None => {
                    slot_for_root[root] = Some(groups.len());
                    groups.push(vec![i]);
                }
            }
        }

        groups
    }
}

impl Default for Clusterer {
    fn default() -> Self {
        Self::new(DuplicateDetector::default(), ClusterStrategy::default())
    }
}

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}
