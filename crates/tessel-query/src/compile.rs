//! Lowering parsed patterns to [`Pattern`]s for one language.
//!
//! Names are resolved here: node kinds, literal tokens and fields against
//! the language, capture names against the pattern that defines them.

use indexmap::IndexSet;
use rowan::TextRange;
use tessel_core::Interner;
use tessel_runtime::Language;
use tessel_table::{FieldId, SymbolId};

use crate::QueryError;
use crate::parser::ast::{self, Expr, PredicateArg, TreeKind};
use crate::pattern::{CaptureId, Element, NodeElement, NodeTest, Pattern, Seq};
use crate::predicate::{self, Arg, Built};

fn offset(range: TextRange) -> usize {
    range.start().into()
}

pub(crate) struct Compiler<'a> {
    language: &'a Language,
    captures: &'a mut Interner,
}

/// Per-pattern state.
#[derive(Default)]
struct Scope {
    captures: IndexSet<CaptureId>,
    predicates: Vec<ast::Predicate>,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(language: &'a Language, captures: &'a mut Interner) -> Self {
        Self { language, captures }
    }

    pub(crate) fn pattern(&mut self, pattern: &ast::Pattern) -> Result<Pattern, QueryError> {
        let mut scope = Scope::default();
        let mut seq = Seq::new();
        let mut negated = Vec::new();
        match pattern.expr() {
            Some(Expr::Group(group)) => {
                for child in group.children() {
                    self.expr(&child, &mut seq, &mut negated, &mut scope)?;
                }
            }
            Some(expr) => self.expr(&expr, &mut seq, &mut negated, &mut scope)?,
            None => {}
        }

        let mut text_predicates = Vec::new();
        let mut general_predicates = Vec::new();
        for node in std::mem::take(&mut scope.predicates) {
            match self.predicate(&node, &scope)? {
                Built::Text(p) => text_predicates.push(p),
                Built::General(p) => general_predicates.push(p),
            }
        }

        let first_kinds = seq.first().and_then(Element::first_kinds);
        Ok(Pattern {
            seq,
            start_byte: offset(pattern.text_range()),
            text_predicates,
            general_predicates,
            first_kinds,
        })
    }

    fn seq_of(
        &mut self,
        exprs: impl Iterator<Item = Expr>,
        negated: &mut Vec<FieldId>,
        scope: &mut Scope,
    ) -> Result<Seq, QueryError> {
        let mut seq = Seq::new();
        for expr in exprs {
            self.expr(&expr, &mut seq, negated, scope)?;
        }
        Ok(seq)
    }

    /// Appends the elements for `expr` to `out`. Negated fields go to the
    /// enclosing node.
    fn expr(
        &mut self,
        expr: &Expr,
        out: &mut Seq,
        negated: &mut Vec<FieldId>,
        scope: &mut Scope,
    ) -> Result<(), QueryError> {
        match expr {
            Expr::Tree(tree) => out.push(self.tree(tree, scope)?),
            Expr::Group(group) => {
                let seq = self.seq_of(group.children(), negated, scope)?;
                out.extend(seq);
            }
            Expr::Alt(alt) => {
                let mut branches = Vec::new();
                for branch in alt.branches() {
                    let mut seq = Seq::new();
                    match branch {
                        Expr::Group(group) => {
                            seq = self.seq_of(group.children(), negated, scope)?;
                        }
                        other => self.expr(&other, &mut seq, negated, scope)?,
                    }
                    branches.push(seq);
                }
                out.push(Element::Alt(branches));
            }
            Expr::Str(s) => {
                let value = s.value();
                let ids = self.kinds(&value, false);
                if ids.is_empty() {
                    return Err(QueryError::NodeType {
                        offset: offset(s.text_range()),
                        name: value,
                    });
                }
                out.push(leaf(NodeTest::Kinds(ids)));
            }
            Expr::Wildcard(_) => out.push(leaf(NodeTest::Any)),
            Expr::Field(field) => {
                let Some(name) = field.name() else {
                    return Ok(());
                };
                let id = self.field(name.text(), name.text_range())?;
                let mut seq = Seq::new();
                if let Some(value) = field.value() {
                    self.expr(&value, &mut seq, negated, scope)?;
                }
                for element in &mut seq {
                    element.for_each_node_mut(&mut |node| node.field = Some(id));
                }
                out.extend(seq);
            }
            Expr::NegatedField(field) => {
                if let Some(name) = field.name() {
                    negated.push(self.field(name.text(), name.text_range())?);
                }
            }
            Expr::Anchor(_) => out.push(Element::Anchor),
            Expr::Quantifier(quantifier) => {
                let mut body = Seq::new();
                if let Some(inner) = quantifier.inner() {
                    self.expr(&inner, &mut body, negated, scope)?;
                }
                let (min, max) = match quantifier.operator().map(|t| t.kind()) {
                    Some(crate::parser::SyntaxKind::Star) => (0, None),
                    Some(crate::parser::SyntaxKind::Plus) => (1, None),
                    _ => (0, Some(1)),
                };
                out.push(Element::Repeat { body, min, max });
            }
            Expr::Capture(capture) => {
                let mut seq = Seq::new();
                if let Some(inner) = capture.inner() {
                    self.expr(&inner, &mut seq, negated, scope)?;
                }
                if let Some(name) = capture.name() {
                    let id = self.captures.intern(name.text()).index() as CaptureId;
                    scope.captures.insert(id);
                    for element in &mut seq {
                        element.for_each_node_mut(&mut |node| node.captures.push(id));
                    }
                }
                out.extend(seq);
            }
            Expr::Predicate(p) => scope.predicates.push(p.clone()),
        }
        Ok(())
    }

    fn tree(&mut self, tree: &ast::Tree, scope: &mut Scope) -> Result<Element, QueryError> {
        let test = match tree.kind() {
            Some(TreeKind::Named(token)) => {
                let ids = self.kinds(token.text(), true);
                if ids.is_empty() {
                    return Err(QueryError::NodeType {
                        offset: offset(token.text_range()),
                        name: token.text().to_owned(),
                    });
                }
                NodeTest::Kinds(ids)
            }
            Some(TreeKind::AnyNamed) => NodeTest::AnyNamed,
            Some(TreeKind::Error) => NodeTest::Error,
            Some(TreeKind::Missing) | None => return Ok(leaf(NodeTest::Never)),
        };

        let mut negated_fields = Vec::new();
        let children = self.seq_of(tree.children(), &mut negated_fields, scope)?;
        Ok(Element::Node(NodeElement {
            test,
            field: None,
            children: (!children.is_empty()).then_some(children),
            negated_fields,
            captures: Vec::new(),
        }))
    }

    /// Visible ids for a kind name.
    fn kinds(&self, name: &str, named: bool) -> Vec<SymbolId> {
        self.language
            .ids_for_node_kind(name, named)
            .into_iter()
            .filter(|id| self.language.node_kind_is_visible(*id))
            .collect()
    }

    fn field(&self, name: &str, range: TextRange) -> Result<FieldId, QueryError> {
        self.language
            .field_id_for_name(name)
            .ok_or_else(|| QueryError::Field {
                offset: offset(range),
                name: name.to_owned(),
            })
    }

    fn predicate(&self, node: &ast::Predicate, scope: &Scope) -> Result<Built, QueryError> {
        let at = offset(node.text_range());
        let name = node
            .name()
            .map(|t| t.text().trim_start_matches('#').to_owned())
            .unwrap_or_default();

        let mut args = Vec::new();
        for arg in node.args() {
            args.push(match arg {
                PredicateArg::Capture { name, range } => {
                    let id = self
                        .captures
                        .get(&name)
                        .map(|n| n.index() as CaptureId)
                        .filter(|id| scope.captures.contains(id))
                        .ok_or_else(|| QueryError::Capture {
                            offset: offset(range),
                            name: name.clone(),
                        })?;
                    Arg::Capture(id)
                }
                PredicateArg::String(value) | PredicateArg::Identifier(value) => Arg::String(value),
            });
        }

        predicate::build(&name, args).map_err(|problem| QueryError::Predicate {
            offset: at,
            message: format!("#{name}: {problem}"),
        })
    }
}

fn leaf(test: NodeTest) -> Element {
    Element::Node(NodeElement {
        test,
        field: None,
        children: None,
        negated_fields: Vec::new(),
        captures: Vec::new(),
    })
}
