//! Parse actions, conflict resolution and table assembly.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use tessel_core::Grammar;
use tessel_table::{
    Action, ConflictPolicy, GrammarTable, LexMode, ParseState, Production, StateId, Step,
    SymbolId, TerminalSet,
};

use crate::flatten::{Assoc, FlatGrammar};
use crate::lr::{Automaton, FirstSets, closure};
use crate::{GenerateError, TableOptions};

struct ShiftCandidate {
    state: usize,
    precedence: i32,
    /// Earliest production that shifts the terminal.
    rank: u32,
    /// Left-hand sides of the shifting items.
    lhs: Vec<SymbolId>,
}

pub(crate) fn build_table(
    grammar: &Grammar,
    flat: FlatGrammar,
    firsts: &FirstSets,
    automaton: &Automaton,
    options: &TableOptions,
) -> Result<GrammarTable, GenerateError> {
    if automaton.states.len() >= StateId::MAX as usize {
        return Err(GenerateError::TooLarge(format!(
            "{} parse states",
            automaton.states.len()
        )));
    }

    let mut states = Vec::with_capacity(automaton.states.len());
    let mut lex_modes: IndexMap<TerminalSet, u16> = IndexMap::new();
    let mut conflicts = 0usize;

    for (index, set) in automaton.states.iter().enumerate() {
        let items = closure(&flat, firsts, &set.kernel);
        let mut shifts: BTreeMap<SymbolId, ShiftCandidate> = BTreeMap::new();
        let mut reduces: BTreeMap<SymbolId, Vec<u32>> = BTreeMap::new();
        let mut accepts = false;

        for (item, lookahead) in &items {
            let production = &flat.productions[item.production as usize];
            match production.steps.get(item.dot as usize) {
                Some(step) if flat.is_terminal(step.symbol) => {
                    let Some(&target) = set.transitions.get(&step.symbol) else {
                        continue;
                    };
                    let candidate = shifts.entry(step.symbol).or_insert(ShiftCandidate {
                        state: target,
                        precedence: i32::MIN,
                        rank: u32::MAX,
                        lhs: Vec::new(),
                    });
                    candidate.precedence = candidate.precedence.max(step.precedence());
                    candidate.rank = candidate.rank.min(item.production);
                    candidate.lhs.push(production.lhs);
                }
                Some(_) => {}
                None if item.production == 0 => accepts = true,
                None => {
                    for terminal in lookahead.iter() {
                        reduces.entry(terminal).or_default().push(item.production);
                    }
                }
            }
        }

        let mut actions: BTreeMap<SymbolId, Vec<Action>> = BTreeMap::new();
        let terminals: Vec<SymbolId> = {
            let mut all: Vec<SymbolId> = shifts.keys().chain(reduces.keys()).copied().collect();
            all.sort_unstable();
            all.dedup();
            all
        };
        for terminal in terminals {
            let resolution = Resolution {
                grammar,
                flat: &flat,
                policy: options.conflict_policy,
                state: index,
                terminal,
            };
            let chosen = resolution.resolve(
                shifts.get(&terminal),
                reduces.get(&terminal).map_or(&[][..], Vec::as_slice),
            )?;
            if chosen.len() > 1 {
                conflicts += 1;
            }
            actions.insert(terminal, chosen);
        }
        if accepts {
            actions.insert(GrammarTable::END, vec![Action::Accept]);
        }
        for &extra in &flat.extras {
            actions.entry(extra).or_insert_with(|| vec![Action::ShiftExtra]);
        }

        let valid: TerminalSet = actions.keys().copied().collect();
        let next_mode = lex_modes.len() as u16;
        let lex_mode = *lex_modes.entry(valid).or_insert(next_mode);

        states.push(ParseState {
            actions: actions.into_iter().collect(),
            gotos: set
                .transitions
                .iter()
                .filter(|(symbol, _)| !flat.is_terminal(**symbol))
                .map(|(&symbol, &target)| (symbol, target as StateId))
                .collect(),
            lex_mode,
        });
    }

    tracing::debug!(
        target: "tessel::generate",
        grammar = %flat.name,
        states = states.len(),
        lex_modes = lex_modes.len(),
        conflicts,
        "built parse table"
    );

    let lex_dfa = crate::lexical::compile_lexer(&flat.tokens)?;

    Ok(GrammarTable {
        name: flat.name,
        language_version: options.language_version,
        conflict_policy: options.conflict_policy,
        productions: flat
            .productions
            .into_iter()
            .map(|p| Production {
                lhs: p.lhs,
                steps: p
                    .steps
                    .into_iter()
                    .map(|s| Step {
                        symbol: s.symbol,
                        field: s.field,
                        alias: s.alias,
                    })
                    .collect(),
                dynamic_precedence: p.dynamic_precedence,
            })
            .collect(),
        symbols: flat.symbols,
        fields: flat.fields,
        states,
        lex_modes: lex_modes
            .into_keys()
            .map(|valid| LexMode { valid })
            .collect(),
        tokens: flat.tokens,
        lex_dfa,
        externals: flat.externals,
        word: flat.word,
        start_state: 0,
    })
}

/// Resolves the actions of one state on one lookahead terminal.
struct Resolution<'a> {
    grammar: &'a Grammar,
    flat: &'a FlatGrammar,
    policy: ConflictPolicy,
    state: usize,
    terminal: SymbolId,
}

impl Resolution<'_> {
    fn resolve(
        &self,
        shift: Option<&ShiftCandidate>,
        reduces: &[u32],
    ) -> Result<Vec<Action>, GenerateError> {
        let productions = &self.flat.productions;
        let mut reduces = reduces.to_vec();
        reduces.sort_unstable();
        reduces.dedup();

        if let Some(best) = reduces
            .iter()
            .map(|&r| productions[r as usize].precedence)
            .max()
        {
            reduces.retain(|&r| productions[r as usize].precedence == best);
        }

        let mut keep_shift = shift.is_some();
        if let Some(shift) = shift {
            let mut kept = Vec::new();
            for r in reduces {
                let production = &productions[r as usize];
                if shift.precedence > production.precedence {
                    continue;
                }
                if production.precedence > shift.precedence {
                    keep_shift = false;
                    kept.push(r);
                    continue;
                }
                match production.assoc {
                    Assoc::Left => {
                        keep_shift = false;
                        kept.push(r);
                    }
                    Assoc::Right => {}
                    Assoc::None => kept.push(r),
                }
            }
            reduces = kept;
        }

        let mut ranked: Vec<(u32, Action)> = Vec::new();
        if let Some(shift) = shift.filter(|_| keep_shift) {
            ranked.push((
                shift.rank,
                Action::Shift {
                    state: shift.state as StateId,
                },
            ));
        }
        ranked.extend(
            reduces
                .iter()
                .map(|&r| (r, Action::Reduce { production: r })),
        );
        ranked.sort_by_key(|(rank, _)| *rank);

        if ranked.len() > 1 {
            tracing::trace!(
                target: "tessel::generate",
                state = self.state,
                lookahead = %self.flat.symbols[self.terminal as usize].name,
                actions = ranked.len(),
                "unresolved conflict"
            );
            let shift = shift.filter(|_| keep_shift);
            match self.policy {
                ConflictPolicy::Fork => {}
                ConflictPolicy::PreferShift if shift.is_some() => {
                    ranked.retain(|(_, action)| matches!(action, Action::Shift { .. }));
                }
                ConflictPolicy::PreferShift => ranked.truncate(1),
                ConflictPolicy::Error => {
                    if !self.is_declared(shift, &reduces) {
                        return Err(self.conflict_error(shift.is_some(), &reduces));
                    }
                }
            }
        }
        Ok(ranked.into_iter().map(|(_, action)| action).collect())
    }

    /// Whether one of the grammar's declared conflict groups covers every
    /// rule taking part in the conflict.
    fn is_declared(&self, shift: Option<&ShiftCandidate>, reduces: &[u32]) -> bool {
        let lhs = reduces
            .iter()
            .map(|&r| self.flat.productions[r as usize].lhs)
            .chain(shift.into_iter().flat_map(|s| s.lhs.iter().copied()));
        let mut names: Vec<&str> = Vec::new();
        for symbol in lhs {
            if let Some(name) = self.flat.origin[symbol as usize].as_deref()
                && !names.contains(&name)
            {
                names.push(name);
            }
        }
        !names.is_empty()
            && self
                .grammar
                .conflicts
                .iter()
                .any(|group| names.iter().all(|n| group.iter().any(|g| g == n)))
    }

    fn conflict_error(&self, shifting: bool, reduces: &[u32]) -> GenerateError {
        let mut parts = Vec::new();
        if shifting {
            parts.push("shift".to_owned());
        }
        for &r in reduces {
            let production = &self.flat.productions[r as usize];
            let rhs: Vec<&str> = production
                .steps
                .iter()
                .map(|s| self.flat.symbols[s.symbol as usize].name.as_str())
                .collect();
            parts.push(format!(
                "reduce {} -> {}",
                self.flat.symbols[production.lhs as usize].name,
                rhs.join(" ")
            ));
        }
        GenerateError::UnresolvedConflict {
            state: self.state,
            lookahead: self.flat.symbols[self.terminal as usize].name.clone(),
            description: parts.join(" / "),
        }
    }
}
