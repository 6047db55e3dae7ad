use crate::{
    Action, ConflictPolicy, GrammarTable, LexMode, ParseState, Production, Step, SymbolInfo,
    SymbolKind, TerminalSet, TokenDef, TokenKind,
};

fn symbol(name: &str, kind: SymbolKind, named: bool) -> SymbolInfo {
    SymbolInfo {
        name: name.into(),
        kind,
        named,
        visible: true,
        extra: false,
    }
}

/// `s -> "a"`
pub(crate) fn tiny_table() -> GrammarTable {
    let step = |symbol| Step {
        symbol,
        field: None,
        alias: None,
    };
    GrammarTable {
        name: "tiny".into(),
        language_version: 3,
        conflict_policy: ConflictPolicy::Fork,
        symbols: vec![
            symbol("end", SymbolKind::Terminal, false),
            symbol("ERROR", SymbolKind::NonTerminal, true),
            symbol("a", SymbolKind::Terminal, false),
            symbol("s", SymbolKind::NonTerminal, true),
        ],
        fields: vec!["body".into()],
        productions: vec![
            Production {
                lhs: 3,
                steps: vec![step(3)],
                dynamic_precedence: 0,
            },
            Production {
                lhs: 3,
                steps: vec![step(2)],
                dynamic_precedence: 0,
            },
        ],
        states: vec![
            ParseState {
                actions: vec![(2, vec![Action::Shift { state: 1 }])],
                gotos: vec![(3, 2)],
                lex_mode: 0,
            },
            ParseState {
                actions: vec![(0, vec![Action::Reduce { production: 1 }])],
                gotos: vec![],
                lex_mode: 1,
            },
            ParseState {
                actions: vec![(0, vec![Action::Accept])],
                gotos: vec![],
                lex_mode: 1,
            },
        ],
        lex_modes: vec![
            LexMode {
                valid: [2].into_iter().collect(),
            },
            LexMode {
                valid: [GrammarTable::END].into_iter().collect(),
            },
        ],
        tokens: vec![TokenDef {
            symbol: 2,
            pattern: "a".into(),
            kind: TokenKind::Literal,
            precedence: 0,
            immediate: false,
            keyword: false,
        }],
        externals: vec![],
        lex_dfa: Vec::new(),
        word: None,
        start_state: 0,
    }
}

#[test]
fn action_and_goto_lookup() {
    let table = tiny_table();
    assert_eq!(table.state(0).actions(2), [Action::Shift { state: 1 }]);
    assert!(table.state(0).actions(GrammarTable::END).is_empty());
    assert_eq!(table.state(0).goto(3), Some(2));
    assert_eq!(table.state(1).goto(3), None);
}

#[test]
fn names_and_fields() {
    let table = tiny_table();
    assert_eq!(table.symbol_name(3), "s");
    assert_eq!(table.symbol_name(99), "<unknown>");
    assert_eq!(table.field_id("body"), Some(0));
    assert_eq!(table.field_name(0), Some("body"));
    assert_eq!(table.symbols_named("a", false).collect::<Vec<_>>(), [2]);
    assert_eq!(table.symbols_named("a", true).count(), 0);
}

#[test]
fn terminal_set_operations() {
    let mut set = TerminalSet::new();
    assert!(set.is_empty());
    assert!(set.insert(3));
    assert!(!set.insert(3));
    assert!(set.insert(130));

    let other: TerminalSet = [3, 64].into_iter().collect();
    assert!(set.union_with(&other));
    assert!(!set.union_with(&other));

    assert_eq!(set.iter().collect::<Vec<_>>(), [3, 64, 130]);
    assert_eq!(set.len(), 3);
    assert!(set.contains(64));
    assert!(!set.contains(65));
    assert!(!set.contains(1000));
}

#[test]
fn equal_sets_compare_equal_regardless_of_insert_order() {
    let a: TerminalSet = [70, 1].into_iter().collect();
    let b: TerminalSet = [1, 70].into_iter().collect();
    assert_eq!(a, b);
}
