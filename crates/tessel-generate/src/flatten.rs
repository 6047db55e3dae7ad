//! Grammar rules to flat productions.
//!
//! Choices and optionals become alternative productions, repetitions become
//! hidden auxiliary symbols (`R -> R R | x`), tokens become terminals.
//! Fields, aliases and precedences are attached to individual steps.

use std::collections::HashMap;

use tessel_core::{Grammar, Rule};
use tessel_table::{FieldId, SymbolId, SymbolInfo, SymbolKind, TokenDef, TokenKind};

use crate::GenerateError;
use crate::lexical::{LexicalToken, PrecedenceLevels, check_pattern, matches_entirely};

/// Longest sequence expansion kept inline before a member is hoisted into
/// its own auxiliary symbol.
const MAX_ALTERNATIVES: usize = 64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Assoc {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FlatStep {
    pub symbol: SymbolId,
    pub field: Option<FieldId>,
    pub alias: Option<SymbolId>,
    pub precedence: Option<i32>,
    pub assoc: Option<Assoc>,
}

impl FlatStep {
    fn new(symbol: SymbolId) -> Self {
        Self {
            symbol,
            field: None,
            alias: None,
            precedence: None,
            assoc: None,
        }
    }

    pub fn precedence(&self) -> i32 {
        self.precedence.unwrap_or(0)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct FlatProduction {
    pub lhs: SymbolId,
    pub steps: Vec<FlatStep>,
    pub precedence: i32,
    pub assoc: Assoc,
    pub dynamic_precedence: i32,
}

#[derive(Debug)]
pub(crate) struct FlatGrammar {
    pub name: String,
    pub symbols: Vec<SymbolInfo>,
    /// Rule each symbol comes from; auxiliary symbols report their parent rule.
    pub origin: Vec<Option<String>>,
    pub productions: Vec<FlatProduction>,
    pub tokens: Vec<TokenDef>,
    pub externals: Vec<SymbolId>,
    pub extras: Vec<SymbolId>,
    pub fields: Vec<String>,
    pub word: Option<SymbolId>,
}

impl FlatGrammar {
    pub fn is_terminal(&self, symbol: SymbolId) -> bool {
        self.symbols[symbol as usize].is_terminal()
    }
}

#[derive(Clone, Debug, Default)]
struct Alt {
    steps: Vec<FlatStep>,
    precedence: Option<i32>,
    assoc: Option<Assoc>,
    dynamic_precedence: i32,
}

impl Alt {
    fn single(step: FlatStep) -> Self {
        Self {
            steps: vec![step],
            ..Self::default()
        }
    }

    fn then(&self, next: &Alt) -> Alt {
        let mut steps = self.steps.clone();
        steps.extend(next.steps.iter().cloned());
        Alt {
            steps,
            precedence: self.precedence.or(next.precedence),
            assoc: self.assoc.or(next.assoc),
            dynamic_precedence: self.dynamic_precedence + next.dynamic_precedence,
        }
    }
}

pub(crate) fn flatten(grammar: &Grammar) -> Result<FlatGrammar, GenerateError> {
    let start = grammar.start_rule().ok_or(GenerateError::EmptyGrammar)?;
    let mut f = Flattener::new(grammar);

    f.declare_tokens()?;
    f.declare_externals()?;
    f.declare_extras()?;
    f.declare_nonterminals();

    let start_symbol = f.by_rule[start];
    if f.symbols[start_symbol as usize].is_terminal() {
        return Err(GenerateError::TokenStartRule(start.to_owned()));
    }
    let augmented = f.add_symbol("_start", SymbolKind::Auxiliary, false, false, None);
    f.productions.push(FlatProduction {
        lhs: augmented,
        steps: vec![FlatStep::new(start_symbol)],
        precedence: 0,
        assoc: Assoc::None,
        dynamic_precedence: 0,
    });

    for (name, rule) in &grammar.rules {
        let symbol = f.by_rule[name.as_str()];
        if f.symbols[symbol as usize].kind != SymbolKind::NonTerminal {
            continue;
        }
        f.current_rule = name.clone();
        let alts = f.expand(rule)?;
        f.add_productions(symbol, alts);
    }

    f.mark_keywords()?;
    if f.symbols.len() >= u16::MAX as usize {
        return Err(GenerateError::TooLarge(format!("{} symbols", f.symbols.len())));
    }

    Ok(FlatGrammar {
        name: grammar.name.clone(),
        word: grammar
            .word
            .as_deref()
            .and_then(|w| f.by_rule.get(w).copied())
            .filter(|&w| f.symbols[w as usize].is_terminal()),
        symbols: f.symbols,
        origin: f.origin,
        productions: f.productions,
        tokens: f.tokens,
        externals: f.externals,
        extras: f.extras,
        fields: f.fields,
    })
}

struct Flattener<'g> {
    grammar: &'g Grammar,
    levels: PrecedenceLevels,
    symbols: Vec<SymbolInfo>,
    origin: Vec<Option<String>>,
    by_rule: HashMap<&'g str, SymbolId>,
    anonymous: HashMap<LexicalToken, SymbolId>,
    tokens: Vec<TokenDef>,
    externals: Vec<SymbolId>,
    extras: Vec<SymbolId>,
    fields: Vec<String>,
    productions: Vec<FlatProduction>,
    current_rule: String,
    aux_count: usize,
}

impl<'g> Flattener<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        let mut f = Self {
            grammar,
            levels: PrecedenceLevels::new(grammar),
            symbols: Vec::new(),
            origin: Vec::new(),
            by_rule: HashMap::new(),
            anonymous: HashMap::new(),
            tokens: Vec::new(),
            externals: Vec::new(),
            extras: Vec::new(),
            fields: Vec::new(),
            productions: Vec::new(),
            current_rule: String::new(),
            aux_count: 0,
        };
        f.add_symbol("end", SymbolKind::Terminal, false, false, None);
        f.add_symbol("ERROR", SymbolKind::NonTerminal, true, true, None);
        f
    }

    fn add_symbol(
        &mut self,
        name: &str,
        kind: SymbolKind,
        named: bool,
        visible: bool,
        origin: Option<String>,
    ) -> SymbolId {
        let id = self.symbols.len() as SymbolId;
        self.symbols.push(SymbolInfo {
            name: name.to_owned(),
            kind,
            named,
            visible,
            extra: false,
        });
        self.origin.push(origin);
        id
    }

    fn add_rule_symbol(&mut self, name: &'g str, kind: SymbolKind) -> SymbolId {
        let named = !name.starts_with('_');
        let visible = !self.grammar.is_hidden(name);
        let id = self.add_symbol(name, kind, named, visible, Some(name.to_owned()));
        self.by_rule.insert(name, id);
        id
    }

    fn add_token(&mut self, symbol: SymbolId, token: &LexicalToken, kind: TokenKind) {
        self.tokens.push(TokenDef {
            symbol,
            pattern: token.pattern.clone(),
            kind,
            precedence: token.precedence,
            immediate: token.immediate,
            keyword: false,
        });
    }

    fn declare_tokens(&mut self) -> Result<(), GenerateError> {
        let grammar = self.grammar;
        for (name, rule) in &grammar.rules {
            if !rule.is_lexical() {
                continue;
            }
            let token = LexicalToken::from_rule(grammar, rule, &self.levels)?;
            check_pattern(name, &token.pattern)?;
            let id = self.add_rule_symbol(name, SymbolKind::Terminal);
            self.add_token(id, &token, token.kind);
        }
        Ok(())
    }

    fn declare_externals(&mut self) -> Result<(), GenerateError> {
        let grammar = self.grammar;
        for external in &grammar.externals {
            let id = match external {
                Rule::Symbol(name) => match self.by_rule.get(name.as_str()) {
                    Some(&id) => id,
                    None => self.add_rule_symbol(name, SymbolKind::External),
                },
                Rule::String(_) => self.anonymous_token(external)?,
                other => {
                    return Err(GenerateError::InvalidToken {
                        name: format!("{other:?}"),
                        message: "externals must be symbols or strings".into(),
                    });
                }
            };
            self.externals.push(id);
        }
        Ok(())
    }

    fn declare_extras(&mut self) -> Result<(), GenerateError> {
        let grammar = self.grammar;
        let mut separators = Vec::new();
        for extra in &grammar.extras {
            match extra {
                Rule::Symbol(name) => {
                    let id = match self.by_rule.get(name.as_str()) {
                        Some(&id) if self.symbols[id as usize].is_terminal() => id,
                        None if grammar.rule(name).is_none() => {
                            return Err(GenerateError::UnknownSymbol(name.clone()));
                        }
                        _ => return Err(GenerateError::NonTerminalExtra(name.clone())),
                    };
                    self.symbols[id as usize].extra = true;
                    self.extras.push(id);
                }
                rule => {
                    let token = LexicalToken::from_rule(grammar, rule, &self.levels)?;
                    separators.push(token.pattern);
                }
            }
        }
        if grammar.extras.is_empty() {
            separators.push(r"\s".to_owned());
        }
        if separators.is_empty() {
            return Ok(());
        }

        let alternation: Vec<_> = separators.iter().map(|s| format!("(?:{s})")).collect();
        let token = LexicalToken {
            pattern: format!("(?:{})+", alternation.join("|")),
            kind: TokenKind::Separator,
            precedence: 0,
            immediate: false,
        };
        check_pattern("_trivia", &token.pattern)?;
        let id = self.add_symbol("_trivia", SymbolKind::Terminal, false, false, None);
        self.symbols[id as usize].extra = true;
        self.add_token(id, &token, TokenKind::Separator);
        self.extras.push(id);
        Ok(())
    }

    fn declare_nonterminals(&mut self) {
        let grammar = self.grammar;
        for (name, rule) in &grammar.rules {
            if !rule.is_lexical() && !self.by_rule.contains_key(name.as_str()) {
                self.add_rule_symbol(name, SymbolKind::NonTerminal);
            }
        }
    }

    fn anonymous_token(&mut self, rule: &Rule) -> Result<SymbolId, GenerateError> {
        let token = LexicalToken::from_rule(self.grammar, rule, &self.levels)?;
        if let Some(&id) = self.anonymous.get(&token) {
            return Ok(id);
        }

        let id = match literal_text(rule) {
            Some(text) => {
                check_pattern(text, &token.pattern)?;
                self.add_symbol(text, SymbolKind::Terminal, false, true, None)
            }
            None => {
                let name = format!("_token{}", self.anonymous.len() + 1);
                check_pattern(&name, &token.pattern)?;
                self.add_symbol(&name, SymbolKind::Terminal, false, false, None)
            }
        };
        self.add_token(id, &token, token.kind);
        self.anonymous.insert(token, id);
        Ok(id)
    }

    fn field(&mut self, name: &str) -> FieldId {
        match self.fields.iter().position(|f| f == name) {
            Some(i) => i as FieldId,
            None => {
                self.fields.push(name.to_owned());
                (self.fields.len() - 1) as FieldId
            }
        }
    }

    fn alias_symbol(&mut self, name: &str, named: bool) -> SymbolId {
        let existing = self.symbols.iter().position(|s| {
            s.name == name && s.named == named && s.kind != SymbolKind::Auxiliary
        });
        match existing {
            Some(i) => i as SymbolId,
            None => self.add_symbol(name, SymbolKind::Alias, named, true, None),
        }
    }

    fn aux_symbol(&mut self, suffix: &str) -> SymbolId {
        self.aux_count += 1;
        let name = format!("{}_{suffix}{}", self.current_rule, self.aux_count);
        let origin = Some(self.current_rule.clone());
        self.add_symbol(&name, SymbolKind::Auxiliary, false, false, origin)
    }

    fn add_productions(&mut self, lhs: SymbolId, alts: Vec<Alt>) {
        for alt in alts {
            let last = alt.steps.last();
            let precedence = last
                .and_then(|s| s.precedence)
                .or(alt.precedence)
                .unwrap_or(0);
            let assoc = last
                .and_then(|s| s.assoc)
                .or(alt.assoc)
                .unwrap_or_default();
            self.productions.push(FlatProduction {
                lhs,
                steps: alt.steps,
                precedence,
                assoc,
                dynamic_precedence: alt.dynamic_precedence,
            });
        }
    }

    fn hoist(&mut self, alts: Vec<Alt>) -> SymbolId {
        let symbol = self.aux_symbol("group");
        self.add_productions(symbol, alts);
        symbol
    }

    /// `R -> R R | x...`; `None` when the content only matches nothing.
    fn repetition(&mut self, content: &Rule) -> Result<Option<SymbolId>, GenerateError> {
        let alts: Vec<Alt> = self
            .expand(content)?
            .into_iter()
            .filter(|alt| !alt.steps.is_empty())
            .collect();
        if alts.is_empty() {
            return Ok(None);
        }

        let symbol = self.aux_symbol("repeat");
        let recursive = FlatStep {
            precedence: Some(0),
            assoc: Some(Assoc::Left),
            ..FlatStep::new(symbol)
        };
        self.productions.push(FlatProduction {
            lhs: symbol,
            steps: vec![recursive.clone(), recursive],
            precedence: 0,
            assoc: Assoc::Left,
            dynamic_precedence: 0,
        });
        self.add_productions(symbol, alts);
        Ok(Some(symbol))
    }

    fn expand(&mut self, rule: &Rule) -> Result<Vec<Alt>, GenerateError> {
        let alts = match rule {
            Rule::Blank => vec![Alt::default()],
            Rule::String(_) | Rule::Pattern { .. } | Rule::Token(_) | Rule::ImmediateToken(_) => {
                vec![Alt::single(FlatStep::new(self.anonymous_token(rule)?))]
            }
            Rule::Symbol(name) => {
                let id = *self
                    .by_rule
                    .get(name.as_str())
                    .ok_or_else(|| GenerateError::UnknownSymbol(name.clone()))?;
                vec![Alt::single(FlatStep::new(id))]
            }
            Rule::Seq(members) => {
                let mut acc = vec![Alt::default()];
                for member in members {
                    let mut alts = self.expand(member)?;
                    if acc.len() * alts.len() > MAX_ALTERNATIVES {
                        alts = vec![Alt::single(FlatStep::new(self.hoist(alts)))];
                    }
                    acc = acc
                        .iter()
                        .flat_map(|a| alts.iter().map(move |b| a.then(b)))
                        .collect();
                }
                acc
            }
            Rule::Choice(members) => {
                let mut acc: Vec<Alt> = Vec::new();
                for member in members {
                    for alt in self.expand(member)? {
                        if !acc.iter().any(|a| a.steps == alt.steps) {
                            acc.push(alt);
                        }
                    }
                }
                acc
            }
            Rule::Repeat(content) => match self.repetition(content)? {
                Some(r) => vec![Alt::default(), Alt::single(FlatStep::new(r))],
                None => vec![Alt::default()],
            },
            Rule::Repeat1(content) => match self.repetition(content)? {
                Some(r) => vec![Alt::single(FlatStep::new(r))],
                None => vec![Alt::default()],
            },
            Rule::Field { name, content } => {
                let field = self.field(name);
                let mut alts = self.expand(content)?;
                for step in alts.iter_mut().flat_map(|a| a.steps.iter_mut()) {
                    step.field.get_or_insert(field);
                }
                alts
            }
            Rule::Alias {
                content,
                value,
                named,
            } => {
                let alias = self.alias_symbol(value, *named);
                let mut alts = self.expand(content)?;
                if alts.iter().all(|a| a.steps.len() == 1) {
                    for step in alts.iter_mut().flat_map(|a| a.steps.iter_mut()) {
                        step.alias.get_or_insert(alias);
                    }
                    alts
                } else {
                    let wrapper = self.hoist(alts);
                    vec![Alt::single(FlatStep {
                        alias: Some(alias),
                        ..FlatStep::new(wrapper)
                    })]
                }
            }
            Rule::Prec { value, content } => {
                let precedence = self.levels.resolve(value)?;
                with_precedence(self.expand(content)?, precedence, None)
            }
            Rule::PrecLeft { value, content } => {
                let precedence = self.levels.resolve(value)?;
                with_precedence(self.expand(content)?, precedence, Some(Assoc::Left))
            }
            Rule::PrecRight { value, content } => {
                let precedence = self.levels.resolve(value)?;
                with_precedence(self.expand(content)?, precedence, Some(Assoc::Right))
            }
            Rule::PrecDynamic { value, content } => {
                let mut alts = self.expand(content)?;
                for alt in &mut alts {
                    if alt.dynamic_precedence == 0 {
                        alt.dynamic_precedence = *value;
                    }
                }
                alts
            }
            Rule::Reserved { content, .. } => self.expand(content)?,
        };
        Ok(alts)
    }

    fn mark_keywords(&mut self) -> Result<(), GenerateError> {
        let Some(word) = self.grammar.word.as_deref() else {
            return Ok(());
        };
        let Some(word_pattern) = self
            .by_rule
            .get(word)
            .and_then(|&id| self.tokens.iter().find(|t| t.symbol == id))
            .map(|t| t.pattern.clone())
        else {
            return Ok(());
        };
        for i in 0..self.tokens.len() {
            if self.tokens[i].kind != TokenKind::Literal {
                continue;
            }
            let text = &self.symbols[self.tokens[i].symbol as usize].name;
            if self.symbols[self.tokens[i].symbol as usize].named {
                continue;
            }
            if matches_entirely(&word_pattern, text)? {
                self.tokens[i].keyword = true;
            }
        }
        Ok(())
    }
}

fn with_precedence(mut alts: Vec<Alt>, precedence: i32, assoc: Option<Assoc>) -> Vec<Alt> {
    for alt in &mut alts {
        alt.precedence.get_or_insert(precedence);
        if let Some(assoc) = assoc {
            alt.assoc.get_or_insert(assoc);
        }
        for step in &mut alt.steps {
            step.precedence.get_or_insert(precedence);
            if let Some(assoc) = assoc {
                step.assoc.get_or_insert(assoc);
            }
        }
    }
    alts
}

/// Text of a literal token, looking through token and precedence wrappers.
fn literal_text(rule: &Rule) -> Option<&str> {
    match rule {
        Rule::String(text) => Some(text),
        Rule::Token(content)
        | Rule::ImmediateToken(content)
        | Rule::Prec { content, .. }
        | Rule::PrecLeft { content, .. }
        | Rule::PrecRight { content, .. } => literal_text(content),
        _ => None,
    }
}
