//! The GLR driver loop.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tessel_core::Length;
use tessel_table::{Action, GrammarTable, ProductionId, StateId};

use super::balance::balance;
use super::recovery::Recovery;
use super::reuse::ReusableNodes;
use super::stack::{StackNode, Version, entries, pop_entries, split_extras};
use super::{ParseError, ParseOptions};
use crate::subtree::{NodeSpec, Subtree};
use crate::{Language, Tree};

/// A version that reached `Accept`.
struct Accepted {
    root: Arc<Subtree>,
    /// Position in the version list when it was accepted.
    rank: usize,
}

pub(crate) struct ParseRun<'a> {
    pub(super) language: &'a Language,
    pub(super) table: &'a GrammarTable,
    pub(super) text: &'a str,
    pub(super) options: &'a ParseOptions,
    versions: Vec<Version>,
    failed: Vec<Version>,
    accepted: Vec<Accepted>,
    reusable: Option<ReusableNodes<'a>>,
    fuel: Option<u64>,
}

enum Step {
    Continue(Vec<Version>),
    Done,
}

impl<'a> ParseRun<'a> {
    pub fn new(
        language: &'a Language,
        text: &'a str,
        options: &'a ParseOptions,
        old_tree: Option<&'a Tree>,
    ) -> Self {
        let table = language.table();
        Self {
            language,
            table,
            text,
            options,
            versions: vec![Version::new(table.start_state)],
            failed: Vec::new(),
            accepted: Vec::new(),
            reusable: old_tree.map(|t| ReusableNodes::new(t.root())),
            fuel: options.exec_fuel,
        }
    }

    pub fn run(mut self) -> Result<Arc<Subtree>, ParseError> {
        tracing::debug!(
            target: "tessel::parse",
            language = %self.table.name,
            bytes = self.text.len(),
            incremental = self.reusable.is_some(),
            "parse started"
        );
        loop {
            self.tick()?;
            if self.versions.is_empty() {
                if !self.accepted.is_empty() {
                    break;
                }
                let Some(version) = self.take_failed() else {
                    break;
                };
                self.failed.clear();
                match self.recover(version)? {
                    Recovery::Resume(version) => self.versions.push(version),
                    Recovery::Root(root) => {
                        self.accepted.push(Accepted { root, rank: 0 });
                        break;
                    }
                }
                continue;
            }

            let index = self.next_version();
            let version = self.versions.remove(index);
            match self.advance(version, index)? {
                Step::Continue(results) => {
                    for (offset, result) in results.into_iter().enumerate() {
                        self.versions.insert(index + offset, result);
                    }
                    self.merge();
                }
                Step::Done => {}
            }
        }

        let root = self.finish();
        tracing::debug!(
            target: "tessel::parse",
            bytes = root.size.bytes,
            errors = root.error_cost,
            "parse finished"
        );
        Ok(root)
    }

    fn tick(&mut self) -> Result<(), ParseError> {
        if let Some(fuel) = self.fuel.as_mut() {
            if *fuel == 0 {
                return Err(ParseError::ExecFuelExhausted);
            }
            *fuel -= 1;
        }
        if self
            .options
            .cancellation_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return Err(ParseError::Cancelled);
        }
        Ok(())
    }

    /// The active version furthest behind; the earliest one on ties.
    fn next_version(&self) -> usize {
        let mut best = 0;
        for (i, version) in self.versions.iter().enumerate().skip(1) {
            if version.position().bytes < self.versions[best].position().bytes {
                best = i;
            }
        }
        best
    }

    /// The failed version that got furthest; the earliest one on ties.
    fn take_failed(&mut self) -> Option<Version> {
        let mut best: Option<usize> = None;
        for (i, version) in self.failed.iter().enumerate() {
            if best.is_none_or(|b| version.position().bytes > self.failed[b].position().bytes) {
                best = Some(i);
            }
        }
        best.map(|i| self.failed.swap_remove(i))
    }

    fn advance(&mut self, mut version: Version, index: usize) -> Result<Step, ParseError> {
        if version.lookahead.is_none() {
            if self.versions.is_empty() && self.try_reuse(&mut version)? {
                return Ok(Step::Continue(vec![version]));
            }
            if version.lookahead.is_none() {
                let leaf = self.lex(&version);
                if !leaf.extra {
                    version.lex_state = None;
                }
                version.lookahead = Some(leaf);
            }
        }
        let Some(lookahead) = version.lookahead.clone() else {
            return Ok(Step::Done);
        };

        let state = version.stack.state;
        let actions = self.table.state(state).actions(lookahead.symbol);
        if actions.is_empty() {
            tracing::trace!(
                target: "tessel::parse",
                state,
                lookahead = %self.table.symbol_name(lookahead.symbol),
                position = version.position().bytes,
                "version failed"
            );
            self.failed.push(version);
            return Ok(Step::Done);
        }

        let ambiguous = !self.versions.is_empty() || actions.len() > 1;
        if actions.len() > 1 {
            tracing::trace!(
                target: "tessel::parse",
                state,
                lookahead = %self.table.symbol_name(lookahead.symbol),
                actions = actions.len(),
                "fork"
            );
        }

        let mut results = Vec::with_capacity(actions.len());
        for (i, &action) in actions.iter().enumerate() {
            if i > 0 && self.versions.len() + results.len() >= self.options.max_versions {
                tracing::trace!(target: "tessel::parse", dropped = actions.len() - i, "version limit");
                break;
            }
            let fork = version.clone();
            match action {
                Action::Shift { state: next } => results.push(self.shift(fork, next, false)?),
                Action::ShiftExtra => results.push(self.shift(fork, state, true)?),
                Action::Reduce { production } => {
                    if let Some(reduced) = self.reduce(fork, production, ambiguous)? {
                        results.push(reduced);
                    }
                }
                Action::Accept => self.accept(fork, index + results.len()),
            }
        }
        Ok(Step::Continue(results))
    }

    /// Takes the next node of the old tree if it can stand in for what this
    /// parse would build at the version's position. Inner nodes are pushed
    /// directly and `true` is returned; a leaf becomes the lookahead.
    fn try_reuse(&mut self, version: &mut Version) -> Result<bool, ParseError> {
        let position = version.position().bytes;
        loop {
            let Some((node, _)) = self.reusable.as_mut().and_then(|r| r.seek(position)) else {
                return Ok(false);
            };
            let blocker = self.reuse_blocker(node, version);
            let Some(reusable) = self.reusable.as_mut() else {
                return Ok(false);
            };
            if let Some(reason) = blocker {
                tracing::trace!(
                    target: "tessel::parse",
                    kind = %self.table.symbol_name(node.symbol),
                    position,
                    reason,
                    "cannot reuse"
                );
                if node.leaf {
                    reusable.advance();
                } else {
                    reusable.descend();
                }
                continue;
            }

            reusable.advance();
            let node = Arc::clone(node);
            tracing::trace!(
                target: "tessel::parse",
                kind = %self.table.symbol_name(node.symbol),
                position,
                bytes = node.size.bytes,
                "reused node"
            );
            if node.leaf {
                if !node.extra {
                    version.lex_state = None;
                }
                version.lookahead = Some(node);
                return Ok(false);
            }
            let Some(target) = self.table.state(version.stack.state).goto(node.symbol) else {
                return Ok(false);
            };
            version.scanner = node.scanner_after.clone();
            version.lex_state = node.next_state;
            version.stack = self.push(&version.stack, target, node)?;
            return Ok(true);
        }
    }

    /// Why `node` cannot be reused at the top of `version`, if it cannot.
    fn reuse_blocker(&self, node: &Subtree, version: &Version) -> Option<&'static str> {
        if node.has_changes {
            return Some("changed");
        }
        if node.error_cost > 0 {
            return Some("contains errors");
        }
        if node.fragile {
            return Some("fragile");
        }
        let lex_state = version.lex_state();
        if node.first_lex_mode != Some(self.table.state(lex_state).lex_mode) {
            return Some("different lex mode");
        }
        if node.scanner_before != version.scanner {
            return Some("different scanner state");
        }
        if node.leaf {
            return (node.parse_state != lex_state).then_some("different parse state");
        }

        let top = self.table.state(version.stack.state);
        if node.parse_state != version.stack.state {
            return Some("different parse state");
        }
        if node.next_state.is_none() {
            return Some("unknown follow state");
        }
        let first = node.first_leaf()?;
        if !matches!(top.actions(first.symbol), [Action::Shift { .. }]) {
            return Some("first token does not shift");
        }
        if top.goto(node.symbol).is_none() {
            return Some("no goto");
        }
        None
    }

    /// Lexes the next token of `version` into a leaf.
    pub(super) fn lex(&self, version: &Version) -> Arc<Subtree> {
        let lex_state = version.lex_state();
        let mode = self.table.state(lex_state).lex_mode;
        let valid = &self.table.lex_modes[mode as usize].valid;
        let start = version.position();
        let token = self
            .language
            .lexer()
            .lex(self.text, start.bytes, Some(valid), &version.scanner);
        let lookahead = token.lookahead();
        let size = Length::of_text(&self.text.as_bytes()[token.start..token.end]);
        let actions = self.table.state(version.stack.state).actions(token.symbol);
        let mut leaf = Subtree::leaf(
            token.symbol,
            size,
            lookahead,
            lex_state,
            Some(mode),
            version.scanner.clone(),
            token.scanner_after.unwrap_or_else(|| version.scanner.clone()),
        );
        leaf.extra = matches!(actions, [Action::ShiftExtra]);
        leaf.fragile = !self.versions.is_empty();
        Arc::new(leaf)
    }

    fn shift(&self, mut version: Version, state: StateId, extra: bool) -> Result<Version, ParseError> {
        let Some(mut leaf) = version.lookahead.take() else {
            return Ok(version);
        };
        if leaf.extra != extra {
            leaf = Arc::new(leaf.with_extra(extra));
        }
        version.scanner = leaf.scanner_after.clone();
        version.stack = self.push(&version.stack, state, leaf)?;
        Ok(version)
    }

    pub(super) fn push(
        &self,
        stack: &Arc<StackNode>,
        state: StateId,
        subtree: Arc<Subtree>,
    ) -> Result<Arc<StackNode>, ParseError> {
        if stack.depth >= self.options.max_stack_depth {
            return Err(ParseError::StackDepthExceeded {
                limit: self.options.max_stack_depth,
            });
        }
        Ok(stack.push(state, subtree))
    }

    fn reduce(
        &self,
        mut version: Version,
        production: ProductionId,
        ambiguous: bool,
    ) -> Result<Option<Version>, ParseError> {
        let rule = self.table.production(production);
        let (base, trailing) = split_extras(&version.stack);
        let Some((below, popped)) = pop_entries(&base, rule.steps.len()) else {
            return Ok(None);
        };
        let Some(target) = self.table.state(below.state).goto(rule.lhs) else {
            return Ok(None);
        };

        let (next_state, reach) = match &version.lookahead {
            Some(token) if token.first_lex_mode.is_some() => {
                let token_end = version.position().bytes + token.size.bytes + token.lookahead;
                (Some(token.parse_state), token_end)
            }
            _ => (None, 0),
        };
        let node_end = base.position.bytes;

        let mut steps = rule.steps.iter();
        let children: Vec<_> = popped
            .into_iter()
            .map(|child| {
                if child.extra {
                    (child, None, None)
                } else {
                    let step = steps.next();
                    (
                        child,
                        step.and_then(|s| s.field),
                        step.and_then(|s| s.alias),
                    )
                }
            })
            .collect();
        let spec = NodeSpec {
            symbol: rule.lhs,
            dynamic_precedence: rule.dynamic_precedence,
            parse_state: below.state,
            extra: false,
            fragile: ambiguous,
            next_state,
            lookahead: reach.saturating_sub(node_end),
            scanner: version.scanner.clone(),
        };
        let node = Arc::new(Subtree::node(spec, children));

        let mut stack = self.push(&below, target, node)?;
        for extra in trailing {
            stack = self.push(&stack, target, extra)?;
        }
        version.stack = stack;
        Ok(Some(version))
    }

    fn accept(&mut self, version: Version, rank: usize) {
        let root = self.build_root(&version.stack);
        tracing::trace!(
            target: "tessel::parse",
            errors = root.error_cost,
            rank,
            "version accepted"
        );
        let cost = root.error_cost;
        self.versions.retain(|v| v.stack.error_cost <= cost);
        self.accepted.push(Accepted { root, rank });
    }

    /// Folds extras around the start symbol's node into one root.
    fn build_root(&self, stack: &Arc<StackNode>) -> Arc<Subtree> {
        let all = entries(stack);
        let Some(main) = all.iter().position(|s| !s.extra) else {
            return self.error_root(all, stack);
        };
        if all.len() == 1 {
            return Arc::clone(&all[main]);
        }
        let node = &all[main];
        let mut children = Vec::new();
        for extra in &all[..main] {
            children.push((Arc::clone(extra), None, None));
        }
        for child in &node.children {
            children.push((Arc::clone(&child.node), child.field, child.alias));
        }
        for extra in &all[main + 1..] {
            children.push((Arc::clone(extra), None, None));
        }
        let spec = NodeSpec {
            symbol: node.symbol,
            dynamic_precedence: node.dynamic_precedence
                - node
                    .children
                    .iter()
                    .map(|c| c.node.dynamic_precedence)
                    .sum::<i32>(),
            parse_state: self.table.start_state,
            extra: false,
            fragile: node.fragile,
            next_state: None,
            lookahead: 0,
            scanner: node.scanner_before.clone(),
        };
        Arc::new(Subtree::node(spec, children))
    }

    /// An `ERROR` root holding everything on the stack.
    pub(super) fn error_root(&self, all: Vec<Arc<Subtree>>, stack: &Arc<StackNode>) -> Arc<Subtree> {
        let spec = NodeSpec {
            symbol: GrammarTable::ERROR,
            dynamic_precedence: 0,
            parse_state: self.table.start_state,
            extra: false,
            fragile: true,
            next_state: None,
            lookahead: 0,
            scanner: stack
                .subtree
                .as_ref()
                .map(|s| s.scanner_after.clone())
                .unwrap_or_default(),
        };
        Arc::new(Subtree::node(spec, all.into_iter().map(|s| (s, None, None))))
    }

    /// Drops versions that another version makes redundant.
    fn merge(&mut self) {
        let mut i = 0;
        while i < self.versions.len() {
            let mut j = i + 1;
            while j < self.versions.len() {
                if self.versions[i].can_merge(&self.versions[j]) {
                    let drop = if self.versions[i].beats(&self.versions[j]) { j } else { i };
                    tracing::trace!(
                        target: "tessel::parse",
                        kept = if drop == j { i } else { j },
                        dropped = drop,
                        position = self.versions[i].position().bytes,
                        "merge"
                    );
                    self.versions.remove(drop);
                    if drop == i {
                        j = i + 1;
                        continue;
                    }
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
    }

    fn finish(&mut self) -> Arc<Subtree> {
        let best = self
            .accepted
            .iter()
            .enumerate()
            .min_by_key(|(order, a)| (a.root.error_cost, -a.root.dynamic_precedence, a.rank, *order))
            .map(|(_, a)| Arc::clone(&a.root));
        let root = best.unwrap_or_else(|| {
            let empty = StackNode::bottom(self.table.start_state);
            self.error_root(Vec::new(), &empty)
        });
        balance(self.table, &root)
    }
}
