//! Running a [`Query`] over a tree.
//!
//! Every node below the starting node is tried as the first node of every
//! pattern, in document order. Matching is backtracking: each element
//! yields all the ways it can match, and text predicates run on complete
//! structural matches only.

use std::collections::{HashSet, VecDeque};
use std::ops::Range;
use std::rc::Rc;

use tessel_runtime::Node;
use tessel_table::FieldId;

use crate::pattern::{CaptureId, Element, NodeElement, NodeTest};
use crate::{Query, QueryError};

const DEFAULT_EXEC_FUEL: u64 = 1_000_000;
const DEFAULT_RECURSION_LIMIT: u32 = 1024;

/// Matching limits and the part of the tree to search.
#[derive(Debug, Clone)]
pub struct QueryCursor {
    exec_fuel: u64,
    recursion_limit: u32,
    byte_range: Option<Range<usize>>,
    max_start_depth: Option<u32>,
}

impl Default for QueryCursor {
    fn default() -> Self {
        Self {
            exec_fuel: DEFAULT_EXEC_FUEL,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            byte_range: None,
            max_start_depth: None,
        }
    }
}

impl QueryCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node tests one `matches` call may perform.
    pub fn with_exec_fuel(mut self, fuel: u64) -> Self {
        self.exec_fuel = fuel;
        self
    }

    /// How deep nested node patterns may descend.
    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn with_byte_range(mut self, range: Range<usize>) -> Self {
        self.byte_range = Some(range);
        self
    }

    /// Only nodes intersecting `range` start a match.
    pub fn set_byte_range(&mut self, range: Range<usize>) -> &mut Self {
        self.byte_range = Some(range);
        self
    }

    /// Only nodes at most `depth` levels below the starting node start a
    /// match.
    pub fn set_max_start_depth(&mut self, depth: Option<u32>) -> &mut Self {
        self.max_start_depth = depth;
        self
    }

    /// Lazily finds the matches of `query` in the subtree of `node`.
    ///
    /// Matches come in document order of their first node, then in pattern
    /// order. Running out of fuel or recursion yields one error and ends
    /// the iteration.
    pub fn matches<'query, 'tree, 'src>(
        &self,
        query: &'query Query,
        node: Node<'tree>,
        source: &'src [u8],
    ) -> QueryMatches<'query, 'tree, 'src> {
        tracing::debug!(
            patterns = query.pattern_count(),
            start = node.start_byte(),
            "running query"
        );
        let same_language = node.language() == query.language();
        if !same_language {
            tracing::warn!("query and tree use different languages");
        }
        QueryMatches {
            query,
            matcher: Matcher {
                fuel: self.exec_fuel,
                recursion_limit: self.recursion_limit,
                depth: 0,
                source,
            },
            stack: vec![Frame {
                siblings: Rc::from([Sibling { node, field: None }]),
                index: 0,
                depth: 0,
            }],
            buffer: VecDeque::new(),
            byte_range: self.byte_range.clone(),
            max_start_depth: self.max_start_depth,
            done: !same_language,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryCapture<'tree> {
    pub node: Node<'tree>,
    /// Index into [`Query::capture_names`].
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch<'tree> {
    pub pattern_index: usize,
    /// Captures in the order the pattern binds them.
    pub captures: Vec<QueryCapture<'tree>>,
}

impl<'tree> QueryMatch<'tree> {
    pub fn nodes_for_capture_index(&self, index: u32) -> impl Iterator<Item = Node<'tree>> + '_ {
        self.captures
            .iter()
            .filter(move |c| c.index == index)
            .map(|c| c.node)
    }
}

#[derive(Clone, Copy)]
struct Sibling<'tree> {
    node: Node<'tree>,
    field: Option<FieldId>,
}

fn siblings(node: Node<'_>) -> Vec<Sibling<'_>> {
    node.children()
        .with_fields()
        .map(|(field, node)| Sibling { node, field })
        .collect()
}

/// What may be skipped before the next element matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gap {
    Any,
    /// After an anchor: anonymous nodes only.
    Anonymous,
    /// The first node of a pattern is the start node itself.
    None,
}

impl Gap {
    fn can_skip(self, sibling: &Sibling<'_>) -> bool {
        match self {
            Gap::Any => true,
            Gap::Anonymous => !sibling.node.is_named(),
            Gap::None => false,
        }
    }
}

type Captures<'tree> = Vec<(CaptureId, Node<'tree>)>;

/// Position after a match and what it captured.
type Outcome<'tree> = (usize, Captures<'tree>);

struct Matcher<'src> {
    fuel: u64,
    recursion_limit: u32,
    depth: u32,
    source: &'src [u8],
}

impl Matcher<'_> {
    fn tick(&mut self) -> Result<(), QueryError> {
        if self.fuel == 0 {
            return Err(QueryError::ExecFuelExhausted);
        }
        self.fuel -= 1;
        Ok(())
    }

    fn seq<'tree>(
        &mut self,
        seq: &[Element],
        siblings: &[Sibling<'tree>],
        pos: usize,
        gap: Gap,
        captures: Captures<'tree>,
    ) -> Result<Vec<Outcome<'tree>>, QueryError> {
        let Some((first, rest)) = seq.split_first() else {
            return Ok(vec![(pos, captures)]);
        };

        if let Element::Anchor = first {
            if rest.is_empty() {
                let only_anonymous_left = siblings[pos..].iter().all(|s| !s.node.is_named());
                return Ok(if only_anonymous_left {
                    vec![(pos, captures)]
                } else {
                    Vec::new()
                });
            }
            return self.seq(rest, siblings, pos, Gap::Anonymous, captures);
        }

        let mut out = Vec::new();
        for (next, captures) in self.element(first, siblings, pos, gap, captures)? {
            let gap = if next > pos { Gap::Any } else { gap };
            out.extend(self.seq(rest, siblings, next, gap, captures)?);
        }
        Ok(out)
    }

    fn element<'tree>(
        &mut self,
        element: &Element,
        siblings: &[Sibling<'tree>],
        pos: usize,
        gap: Gap,
        captures: Captures<'tree>,
    ) -> Result<Vec<Outcome<'tree>>, QueryError> {
        match element {
            Element::Node(node) => {
                let mut out = Vec::new();
                for i in pos..siblings.len() {
                    if i > pos && !gap.can_skip(&siblings[i - 1]) {
                        break;
                    }
                    for captures in self.node(node, &siblings[i], captures.clone())? {
                        out.push((i + 1, captures));
                    }
                }
                Ok(out)
            }
            Element::Alt(branches) => {
                let mut out = Vec::new();
                for branch in branches {
                    out.extend(self.seq(branch, siblings, pos, gap, captures.clone())?);
                }
                Ok(out)
            }
            Element::Repeat { body, min, max } => {
                self.repeat(body, *min, *max, siblings, pos, gap, captures)
            }
            Element::Anchor => Ok(vec![(pos, captures)]),
        }
    }

    /// Greedy: longer runs come first. Later iterations may only skip
    /// anonymous nodes, and an iteration that consumes nothing ends the run.
    ///
    /// Iterations always move forward, so positions are visited in order
    /// and each keeps only its longest run. Every candidate costs fuel.
    #[allow(clippy::too_many_arguments)]
    fn repeat<'tree>(
        &mut self,
        body: &[Element],
        min: u32,
        max: Option<u32>,
        siblings: &[Sibling<'tree>],
        pos: usize,
        gap: Gap,
        captures: Captures<'tree>,
    ) -> Result<Vec<Outcome<'tree>>, QueryError> {
        let mut best: Vec<Option<(u32, Captures<'tree>)>> = vec![None; siblings.len() + 1];
        best[pos] = Some((0, captures));

        for at in pos..=siblings.len() {
            let Some((count, captures)) = best[at].clone() else {
                continue;
            };
            if max.is_some_and(|max| count >= max) {
                continue;
            }
            let gap = if count == 0 { gap } else { Gap::Anonymous };
            for (next, captures) in self.seq(body, siblings, at, gap, captures)? {
                self.tick()?;
                if next <= at {
                    continue;
                }
                let slot = &mut best[next];
                if slot.as_ref().is_none_or(|(seen, _)| *seen < count + 1) {
                    *slot = Some((count + 1, captures));
                }
            }
        }

        let mut runs: Vec<(u32, Outcome<'tree>)> = best
            .into_iter()
            .enumerate()
            .filter_map(|(at, run)| run.map(|(count, captures)| (count, (at, captures))))
            .filter(|(count, _)| *count >= min)
            .collect();
        runs.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.0.cmp(&b.1.0)));
        Ok(runs.into_iter().map(|(_, outcome)| outcome).collect())
    }

    /// The capture sets under which `sibling` matches `element`.
    fn node<'tree>(
        &mut self,
        element: &NodeElement,
        sibling: &Sibling<'tree>,
        mut captures: Captures<'tree>,
    ) -> Result<Vec<Captures<'tree>>, QueryError> {
        self.tick()?;
        let node = sibling.node;
        let accepted = match &element.test {
            NodeTest::Any => true,
            NodeTest::AnyNamed => node.is_named(),
            NodeTest::Kinds(ids) => ids.contains(&node.kind_id()),
            NodeTest::Error => node.is_error(),
            NodeTest::Never => false,
        };
        if !accepted
            || element.field.is_some_and(|f| sibling.field != Some(f))
            || element
                .negated_fields
                .iter()
                .any(|f| node.child_by_field_id(*f).is_some())
        {
            return Ok(Vec::new());
        }

        captures.extend(element.captures.iter().map(|id| (*id, node)));
        let Some(children) = &element.children else {
            return Ok(vec![captures]);
        };

        if self.depth >= self.recursion_limit {
            return Err(QueryError::RecursionLimitExceeded);
        }
        self.depth += 1;
        let child_siblings = siblings(node);
        let result = self.seq(children, &child_siblings, 0, Gap::Any, captures);
        self.depth -= 1;

        let mut seen = HashSet::new();
        Ok(result?
            .into_iter()
            .map(|(_, captures)| captures)
            .filter(|captures| seen.insert(capture_keys(captures).collect::<Vec<_>>()))
            .collect())
    }

    /// Matches of every pattern starting at `siblings[index]`.
    fn matches_at<'tree>(
        &mut self,
        query: &Query,
        siblings: &[Sibling<'tree>],
        index: usize,
    ) -> Result<Vec<QueryMatch<'tree>>, QueryError> {
        let start = siblings[index].node;
        let mut out = Vec::new();
        for (pattern_index, pattern) in query.patterns.iter().enumerate() {
            if let Some(kinds) = &pattern.first_kinds
                && !kinds.contains(&start.kind_id())
            {
                continue;
            }

            let outcomes = self.seq(&pattern.seq, siblings, index, Gap::None, Vec::new())?;
            let mut kept: Vec<Captures<'tree>> = Vec::new();
            let mut kept_keys: Vec<HashSet<CaptureKey>> = Vec::new();
            for (next, captures) in outcomes {
                if next == index {
                    continue;
                }
                let source = self.source;
                let passes = pattern
                    .text_predicates
                    .iter()
                    .all(|p| p.satisfied(|id| nodes_for(&captures, id), source));
                if !passes
                    || kept_keys
                        .iter()
                        .any(|k| capture_keys(&captures).all(|key| k.contains(&key)))
                {
                    continue;
                }
                kept_keys.push(capture_keys(&captures).collect());
                kept.push(captures);
            }

            for captures in kept {
                tracing::trace!(pattern_index, start = start.start_byte(), "pattern matched");
                out.push(QueryMatch {
                    pattern_index,
                    captures: captures
                        .into_iter()
                        .map(|(index, node)| QueryCapture { node, index })
                        .collect(),
                });
            }
        }
        Ok(out)
    }
}

fn nodes_for<'tree>(captures: &Captures<'tree>, id: CaptureId) -> Vec<Node<'tree>> {
    captures
        .iter()
        .filter(|(c, _)| *c == id)
        .map(|(_, node)| *node)
        .collect()
}

/// Capture, node identity and start byte.
type CaptureKey = (CaptureId, usize, usize);

fn capture_keys<'a>(captures: &'a Captures<'_>) -> impl Iterator<Item = CaptureKey> + 'a {
    captures
        .iter()
        .map(|(id, node)| (*id, node.id(), node.start_byte()))
}

struct Frame<'tree> {
    siblings: Rc<[Sibling<'tree>]>,
    index: usize,
    depth: u32,
}

/// Iterator over the matches of one [`QueryCursor::matches`] call.
pub struct QueryMatches<'query, 'tree, 'src> {
    query: &'query Query,
    matcher: Matcher<'src>,
    stack: Vec<Frame<'tree>>,
    buffer: VecDeque<QueryMatch<'tree>>,
    byte_range: Option<Range<usize>>,
    max_start_depth: Option<u32>,
    done: bool,
}

impl QueryMatches<'_, '_, '_> {
    fn in_range(&self, node: &Node<'_>) -> bool {
        let Some(range) = &self.byte_range else {
            return true;
        };
        let (start, end) = (node.start_byte(), node.end_byte());
        if start == end {
            return range.start <= start && start <= range.end;
        }
        start < range.end && end > range.start
    }
}

impl<'tree> Iterator for QueryMatches<'_, 'tree, '_> {
    type Item = Result<QueryMatch<'tree>, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(found) = self.buffer.pop_front() {
                return Some(Ok(found));
            }
            if self.done {
                return None;
            }
            let Some(frame) = self.stack.pop() else {
                self.done = true;
                return None;
            };

            let node = frame.siblings[frame.index].node;
            if !self.in_range(&node) {
                continue;
            }
            if self.max_start_depth.is_none_or(|max| frame.depth < max) {
                let children: Rc<[Sibling<'tree>]> = siblings(node).into();
                for index in (0..children.len()).rev() {
                    self.stack.push(Frame {
                        siblings: Rc::clone(&children),
                        index,
                        depth: frame.depth + 1,
                    });
                }
            }

            match self
                .matcher
                .matches_at(self.query, &frame.siblings, frame.index)
            {
                Ok(found) => self.buffer.extend(found),
                Err(err) => {
                    self.done = true;
                    self.stack.clear();
                    return Some(Err(err));
                }
            }
        }
    }
}
