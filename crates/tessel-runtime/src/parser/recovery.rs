//! Error recovery.
//!
//! Runs once every version has failed, on the version that got furthest.
//! The error starts where the last reduction ended: the terminals above
//! the topmost reduced node are popped. A bounded search then looks for
//! the first combination of skipped tokens and extra pops after which the
//! table accepts the next token. The popped and skipped input becomes one
//! `ERROR` node, pushed as an extra, and parsing resumes at that token.

use std::sync::Arc;

use tessel_core::Length;
use tessel_table::{Action, GrammarTable, StateId, SymbolId};

use super::ParseError;
use super::engine::ParseRun;
use super::stack::{StackNode, Version, entries, pop_entries, split_extras};
use crate::subtree::{NodeSpec, Subtree};

/// Reductions simulated per resume check before giving up.
const SIMULATION_LIMIT: usize = 256;

pub(crate) enum Recovery {
    Resume(Version),
    /// Nothing fits: the whole input becomes an `ERROR` root.
    Root(Arc<Subtree>),
}

/// A token met while skipping, with the extras lexed before it.
struct Skipped {
    extras: Vec<Arc<Subtree>>,
    token: Arc<Subtree>,
    start: Length,
}

impl ParseRun<'_> {
    pub(super) fn recover(&self, mut version: Version) -> Result<Recovery, ParseError> {
        let failing = match version.lookahead.take() {
            Some(token) => token,
            None => self.lex(&version),
        };
        if failing.symbol == GrammarTable::END {
            return self.recover_at_end(version, failing);
        }

        let (base, top_extras) = split_extras(&version.stack);
        let unreduced = unreduced_entries(&base);
        let mut skipped = vec![Skipped {
            extras: Vec::new(),
            start: version.position(),
            token: Arc::clone(&failing),
        }];

        for j in 1..=self.options.recovery_lookahead {
            if skipped.len() <= j {
                let Some(next) = self.skip_token(&skipped[j - 1]) else {
                    break;
                };
                skipped.push(next);
            }
            let resume = skipped[j].token.symbol;
            for pops in unreduced..=unreduced + self.options.recovery_max_pops {
                let below = if pops == 0 {
                    Arc::clone(&version.stack)
                } else {
                    match pop_entries(&base, pops) {
                        Some((below, _)) => below,
                        None => break,
                    }
                };
                if can_resume(self.table, &below, resume) {
                    return self
                        .wrap(&mut version, &base, &top_extras, pops, &skipped, j)
                        .map(|()| Recovery::Resume(version));
                }
            }
        }

        // Nothing resumes within bounds: wrap the failing token alone and go on.
        if skipped.len() < 2 {
            let Some(next) = self.skip_token(&skipped[0]) else {
                return Ok(Recovery::Root(self.error_root(entries(&version.stack), &version.stack)));
            };
            skipped.push(next);
        }
        self.wrap(&mut version, &base, &top_extras, 0, &skipped, 1)?;
        Ok(Recovery::Resume(version))
    }

    /// Builds the `ERROR` node from `pops` stack entries and the first
    /// `resume` skipped tokens, then makes `skipped[resume]` the lookahead.
    fn wrap(
        &self,
        version: &mut Version,
        base: &Arc<StackNode>,
        top_extras: &[Arc<Subtree>],
        pops: usize,
        skipped: &[Skipped],
        resume: usize,
    ) -> Result<(), ParseError> {
        let mut content = Vec::new();
        let mut stack = if pops == 0 {
            Arc::clone(&version.stack)
        } else {
            let Some((below, popped)) = pop_entries(base, pops) else {
                return Ok(());
            };
            content.extend(popped);
            content.extend(top_extras.iter().cloned());
            below
        };
        for (i, item) in skipped[..resume].iter().enumerate() {
            if i > 0 {
                content.extend(item.extras.iter().cloned());
            }
            content.push(Arc::clone(&item.token));
        }

        let start = stack.position;
        stack = self.push_error(&stack, content)?;
        let state = stack.state;
        let next = &skipped[resume];
        for extra in &next.extras {
            stack = self.push(&stack, state, Arc::clone(extra))?;
        }

        tracing::debug!(
            target: "tessel::parse",
            start = start.bytes,
            end = next.start.bytes,
            resume = %self.table.symbol_name(next.token.symbol),
            "recovered from syntax error"
        );

        let mut lookahead = next.token.shallow_clone();
        lookahead.parse_state = state;
        version.scanner = skipped[0].token.scanner_after.clone();
        version.lex_state = None;
        version.lookahead = Some(Arc::new(lookahead));
        version.stack = stack;
        Ok(())
    }

    /// At end of input: pop until the end can be accepted, or give up and
    /// make the whole input an `ERROR`.
    fn recover_at_end(&self, mut version: Version, end: Arc<Subtree>) -> Result<Recovery, ParseError> {
        let (base, trailing) = split_extras(&version.stack);
        let mut pops = 1;
        while let Some((below, popped)) = pop_entries(&base, pops) {
            if can_resume(self.table, &below, GrammarTable::END) {
                let start = below.position;
                let mut stack = self.push_error(&below, popped)?;
                let state = stack.state;
                for extra in trailing {
                    stack = self.push(&stack, state, extra)?;
                }
                tracing::debug!(
                    target: "tessel::parse",
                    start = start.bytes,
                    end = stack.position.bytes,
                    "recovered at end of input"
                );
                version.stack = stack;
                version.lookahead = Some(end);
                version.lex_state = None;
                return Ok(Recovery::Resume(version));
            }
            pops += 1;
        }
        tracing::debug!(target: "tessel::parse", "no parse fits; the whole input is an error");
        Ok(Recovery::Root(self.error_root(entries(&version.stack), &version.stack)))
    }

    /// Pushes an `ERROR` extra holding `content`. An `ERROR` directly on
    /// top of `stack` is absorbed and nested ones are flattened, so
    /// adjacent errors become one node.
    fn push_error(
        &self,
        stack: &Arc<StackNode>,
        content: Vec<Arc<Subtree>>,
    ) -> Result<Arc<StackNode>, ParseError> {
        let mut below = Arc::clone(stack);
        let mut parts = Vec::new();
        if let (Some(top), Some(prev)) = (&stack.subtree, &stack.prev)
            && top.symbol == GrammarTable::ERROR
            && top.extra
        {
            parts.push(Arc::clone(top));
            below = Arc::clone(prev);
        }
        parts.extend(content);
        let mut children: Vec<Arc<Subtree>> = Vec::new();
        for part in parts {
            if part.symbol == GrammarTable::ERROR && !part.leaf {
                children.extend(part.children.iter().map(|c| Arc::clone(&c.node)));
            } else {
                children.push(part);
            }
        }
        // Unlexable text alone needs no wrapper.
        if let [only] = children.as_slice()
            && only.leaf
            && only.symbol == GrammarTable::ERROR
        {
            let leaf = Arc::new(only.with_extra(true));
            return self.push(&below, below.state, leaf);
        }
        let spec = NodeSpec {
            symbol: GrammarTable::ERROR,
            dynamic_precedence: 0,
            parse_state: below.state,
            extra: true,
            fragile: true,
            next_state: None,
            lookahead: 0,
            scanner: Default::default(),
        };
        let error = Subtree::node(spec, children.into_iter().map(|c| (c, None, None)));
        self.push(&below, below.state, Arc::new(error))
    }

    /// Lexes, in error mode, the next non-extra token after `previous`.
    fn skip_token(&self, previous: &Skipped) -> Option<Skipped> {
        if previous.token.symbol == GrammarTable::END {
            return None;
        }
        let mut position = previous.start + previous.token.size;
        let mut extras = Vec::new();
        loop {
            let token = self.language.lexer().lex(
                self.text,
                position.bytes,
                None,
                &previous.token.scanner_after,
            );
            let size = Length::of_text(&self.text.as_bytes()[token.start..token.end]);
            let mut leaf = Subtree::leaf(
                token.symbol,
                size,
                token.lookahead(),
                0,
                None,
                previous.token.scanner_after.clone(),
                previous.token.scanner_after.clone(),
            );
            let is_extra = token.symbol != GrammarTable::END && self.table.symbol(token.symbol).extra;
            leaf.extra = is_extra;
            leaf.fragile = true;
            let leaf = Arc::new(leaf);
            if is_extra && !size.is_zero() {
                position = position + size;
                extras.push(leaf);
                continue;
            }
            return Some(Skipped {
                extras,
                token: leaf,
                start: position,
            });
        }
    }
}

/// Non-extra entries above the topmost inner node.
fn unreduced_entries(stack: &Arc<StackNode>) -> usize {
    let mut count = 0;
    let mut node = Some(stack);
    while let Some(current) = node {
        let Some(subtree) = &current.subtree else {
            break;
        };
        if !subtree.extra {
            if !subtree.leaf {
                break;
            }
            count += 1;
        }
        node = current.prev.as_ref();
    }
    count
}

/// Whether `symbol` would be shifted or accepted after the reductions it
/// triggers on `stack`.
fn can_resume(table: &GrammarTable, stack: &Arc<StackNode>, symbol: SymbolId) -> bool {
    let mut states = StateWalk::new(stack);
    for _ in 0..SIMULATION_LIMIT {
        let actions = table.state(states.top()).actions(symbol);
        if actions
            .iter()
            .any(|a| matches!(a, Action::Shift { .. } | Action::Accept))
        {
            return true;
        }
        let Some(production) = actions.iter().find_map(|a| match a {
            Action::Reduce { production } => Some(*production),
            _ => None,
        }) else {
            return false;
        };
        let rule = table.production(production);
        if !states.pop(rule.steps.len()) {
            return false;
        }
        let Some(next) = table.state(states.top()).goto(rule.lhs) else {
            return false;
        };
        states.pushed.push(next);
    }
    false
}

/// The state sequence of a stack with simulated pushes on top.
struct StateWalk<'s> {
    pushed: Vec<StateId>,
    /// Topmost non-extra entry not covered by `pushed`.
    below: &'s StackNode,
}

impl<'s> StateWalk<'s> {
    fn new(stack: &'s Arc<StackNode>) -> Self {
        Self {
            pushed: Vec::new(),
            below: skip_extras(stack),
        }
    }

    fn top(&self) -> StateId {
        self.pushed.last().copied().unwrap_or(self.below.state)
    }

    fn pop(&mut self, count: usize) -> bool {
        for _ in 0..count {
            if self.pushed.pop().is_some() {
                continue;
            }
            let Some(prev) = &self.below.prev else {
                return false;
            };
            self.below = skip_extras(prev);
        }
        true
    }
}

fn skip_extras(mut node: &StackNode) -> &StackNode {
    while node.is_extra() {
        match &node.prev {
            Some(prev) => node = prev,
            None => break,
        }
    }
    node
}
