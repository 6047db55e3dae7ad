use rowan::TextRange;

use super::*;

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

#[test]
fn severity_display() {
    insta::assert_snapshot!(format!("{}", Severity::Error), @"error");
    insta::assert_snapshot!(format!("{}", Severity::Warning), @"warning");
}

#[test]
fn report_with_default_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ExpectedCaptureName, range(0, 5))
        .emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    insta::assert_snapshot!(diagnostics.to_string(), @"error at 0..5: expected capture name");
}

#[test]
fn custom_messages_extend_the_default() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(0, 1))
        .message("expected `)`")
        .emit();
    diagnostics
        .report(DiagnosticKind::UnclosedTree, range(2, 4))
        .message("expected `)`")
        .emit();

    insta::assert_snapshot!(diagnostics.to_string(), @r"
    error at 0..1: unexpected token: expected `)`
    error at 2..4: missing closing `)`; expected `)`
    ");
}

#[test]
fn builder_with_related() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedTree, range(0, 5))
        .message("primary")
        .related_to("related info", range(6, 10))
        .emit();

    let result = diagnostics.printer("hello world!").render();
    insta::assert_snapshot!(result, @r"
    error: missing closing `)`; primary
      |
    1 | hello world!
      | ^^^^^ ---- related info
    ");
}

#[test]
fn builder_with_fix() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedTree, range(0, 5))
        .message("fixable")
        .fix("apply this fix", "fixed")
        .emit();

    let result = diagnostics.printer("hello world").render();
    insta::assert_snapshot!(result, @r"
    error: missing closing `)`; fixable
      |
    1 | hello world
      | ^^^^^
      |
    help: apply this fix
      |
    1 - hello world
    1 + fixed world
      |
    ");
}

#[test]
fn hints_are_kept_on_the_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::EmptyTree, range(0, 2))
        .emit();

    let message = diagnostics.iter().next().cloned();
    insta::assert_snapshot!(
        message.map(|m| m.to_string()).unwrap_or_default(),
        @"error at 0..2: empty `()` is not allowed (hint: use `(_)` to match any named node, or `_` for any node)"
    );
    assert!(diagnostics.render("()").contains("use `(_)`"));
}

#[test]
fn printer_colored() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(0, 5))
        .message("test")
        .emit();

    let result = diagnostics.printer("hello").colored(true).render();
    assert!(result.contains("test"));
    assert!(result.contains('\x1b'));
}

#[test]
fn printer_empty_diagnostics() {
    let diagnostics = Diagnostics::new();
    assert!(diagnostics.printer("source").render().is_empty());
}

#[test]
fn printer_with_path() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(0, 5))
        .message("test error")
        .emit();

    let result = diagnostics.printer("hello world").path("test.scm").render();
    insta::assert_snapshot!(result, @r"
    error: unexpected token: test error
     --> test.scm:1:1
      |
    1 | hello world
      | ^^^^^
    ");
}

#[test]
fn printer_zero_width_span() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ExpectedExpression, TextRange::empty(0.into()))
        .message("zero width error")
        .emit();

    let result = diagnostics.printer("hello").render();
    insta::assert_snapshot!(result, @r"
    error: expected a pattern: zero width error
      |
    1 | hello
      | ^
    ");
}

#[test]
fn printer_multiple_diagnostics() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedTree, range(0, 5))
        .message("first error")
        .emit();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(6, 10))
        .message("second error")
        .emit();

    let result = diagnostics.printer("hello world!").render();
    insta::assert_snapshot!(result, @r"
    error: missing closing `)`; first error
      |
    1 | hello world!
      | ^^^^^
    error: unexpected token: second error
      |
    1 | hello world!
      |       ^^^^
    ");
}

#[test]
fn filtering_drops_cascades() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedTree, range(0, 10))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(3, 4))
        .emit();
    diagnostics
        .report(DiagnosticKind::ExpectedCaptureName, range(12, 12))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnclosedAlternation, range(12, 14))
        .emit();

    let filtered = diagnostics.filtered();
    insta::assert_snapshot!(filtered.to_string(), @r"
    error at 0..10: missing closing `)`
    error at 12..12: expected capture name
    ");
    assert_eq!(filtered.error_count(), 2);
}
