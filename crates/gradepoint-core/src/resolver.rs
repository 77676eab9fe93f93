//! Equivalence resolution.
//!
//! Partitions every course row of a transcript into retake groups: rows that
//! satisfy the same academic requirement. Rows join a group by sharing a
//! normalized name, through an explicit retake link, or through a declared
//! name equivalence, and membership is transitive across all three.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::grade::GradeValue;
use crate::model::{normalize_course_name, CourseRow, NameEquivalence, Term};
use crate::selector;

/// Identifies a retake group within one [`GroupIndex`].
///
/// Ids are dense and assigned in order of each group's first row. They are
/// only meaningful for the index that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub usize);

/// One attempt as seen by the selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub row_id: String,
    pub term_index: u32,
    pub grade: GradeValue,
    pub units: f64,
    /// Position of the row in transcript order.
    pub position: usize,
}

/// All attempts at the same requirement, in transcript order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetakeGroup {
    pub id: GroupId,
    pub members: Vec<GroupMember>,
}

impl RetakeGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// A group with more than one attempt.
    pub fn is_retaken(&self) -> bool {
        self.members.len() > 1
    }

    pub fn member(&self, row_id: &str) -> Option<&GroupMember> {
        self.members.iter().find(|m| m.row_id == row_id)
    }
}

/// Maps every row of a transcript to its retake group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupIndex {
    groups: Vec<RetakeGroup>,
    by_row: HashMap<String, GroupId>,
}

impl GroupIndex {
    pub fn groups(&self) -> &[RetakeGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group_id(&self, row_id: &str) -> Option<GroupId> {
        self.by_row.get(row_id).copied()
    }

    pub fn group(&self, id: GroupId) -> Option<&RetakeGroup> {
        self.groups.get(id.0)
    }

    pub fn group_of(&self, row_id: &str) -> Option<&RetakeGroup> {
        self.group_id(row_id).and_then(|id| self.group(id))
    }

    /// Whether two rows belong to the same group.
    pub fn same_group(&self, a: &str, b: &str) -> bool {
        match (self.group_id(a), self.group_id(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Groups with more than one attempt.
    pub fn retaken_groups(&self) -> impl Iterator<Item = &RetakeGroup> {
        self.groups.iter().filter(|g| g.is_retaken())
    }
}

/// Disjoint-set forest over row positions, with path halving and union by
/// rank. Roots are an internal detail; [`resolve_groups`] never exposes them.
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
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

/// Partition all rows of `terms` into retake groups.
///
/// Rows with an empty name, no retake link and no equivalence stay in
/// singleton groups. Retake links to ids that do not exist are ignored.
pub fn resolve_groups(terms: &[Term], equivalences: &[NameEquivalence]) -> GroupIndex {
    let rows: Vec<(u32, &CourseRow)> = terms
        .iter()
        .flat_map(|t| t.rows.iter().map(move |r| (t.index, r)))
        .collect();
    let mut set = DisjointSet::new(rows.len());

    let mut position_by_id: HashMap<&str, usize> = HashMap::new();
    for (position, (_, row)) in rows.iter().enumerate() {
        position_by_id.entry(row.id.as_str()).or_insert(position);
    }

    let mut by_name: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (position, (_, row)) in rows.iter().enumerate() {
        let name = row.normalized_name();
        if !name.is_empty() {
            by_name.entry(name).or_default().push(position);
        }
    }
    for positions in by_name.values() {
        for &other in &positions[1..] {
            set.union(positions[0], other);
        }
    }

    for (position, (_, row)) in rows.iter().enumerate() {
        let Some(target) = row.retake_of.as_deref().filter(|t| !t.trim().is_empty()) else {
            continue;
        };
        match position_by_id.get(target.trim()) {
            Some(&target_position) => set.union(position, target_position),
            None => {
                tracing::debug!(row = %row.id, retake_of = target, "ignoring retake link to missing row")
            }
        }
    }

    for eq in equivalences {
        let a = by_name.get(&normalize_course_name(&eq.course_a));
        let b = by_name.get(&normalize_course_name(&eq.course_b));
        if let (Some(a), Some(b)) = (a, b) {
            set.union(a[0], b[0]);
        }
    }

    let mut group_by_root: HashMap<usize, GroupId> = HashMap::new();
    let mut groups: Vec<RetakeGroup> = Vec::new();
    let mut by_row: HashMap<String, GroupId> = HashMap::new();
    for (position, (term_index, row)) in rows.iter().enumerate() {
        let root = set.find(position);
        let id = *group_by_root.entry(root).or_insert_with(|| {
            let id = GroupId(groups.len());
            groups.push(RetakeGroup {
                id,
                members: Vec::new(),
            });
            id
        });
        groups[id.0].members.push(GroupMember {
            row_id: row.id.clone(),
            term_index: *term_index,
            grade: row.grade_value(),
            units: row.units,
            position,
        });
        by_row.entry(row.id.clone()).or_insert(id);
    }

    tracing::debug!(
        rows = rows.len(),
        groups = groups.len(),
        retaken = groups.iter().filter(|g| g.is_retaken()).count(),
        "resolved retake groups"
    );

    GroupIndex { groups, by_row }
}

/// For each excluded row, the first observation term from which it no
/// longer counts toward cumulative figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionMap {
    starts: BTreeMap<String, u32>,
}

impl ExclusionMap {
    /// The term from which this row is excluded, if it ever is.
    pub fn exclusion_start(&self, row_id: &str) -> Option<u32> {
        self.starts.get(row_id).copied()
    }

    /// Whether the row is excluded from cumulative figures as of `as_of`.
    pub fn is_excluded(&self, row_id: &str, as_of: u32) -> bool {
        self.exclusion_start(row_id)
            .is_some_and(|start| as_of >= start)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.starts.iter().map(|(id, start)| (id.as_str(), *start))
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

/// Precompute exclusion starts for every group, anchored on each group's
/// eventual best attempt.
pub fn build_exclusion_map(index: &GroupIndex) -> ExclusionMap {
    let mut starts = BTreeMap::new();
    for group in index.retaken_groups() {
        for member in &group.members {
            if let Some(start) = selector::exclusion_start(group, member) {
                starts.entry(member.row_id.clone()).or_insert(start);
            }
        }
    }
    ExclusionMap { starts }
}
