//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("tessel")
        .about("Incremental GLR parsing and tree queries")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(color_arg())
        .subcommand(generate_command())
        .subcommand(parse_command())
        .subcommand(query_command())
        .subcommand(langs_command())
}

/// Compile a JSON grammar into a Grammar Table artifact.
pub fn generate_command() -> Command {
    Command::new("generate")
        .about("Compile a JSON grammar into a Grammar Table artifact")
        .after_help(
            r#"EXAMPLES:
  tessel generate grammar.json                      # writes <name>.tsl
  tessel generate grammar.json -o lang.tsl
  tessel generate grammar.json --conflicts error    # fail on undeclared conflicts"#,
        )
        .arg(grammar_json_arg())
        .arg(output_file_arg())
        .arg(conflicts_arg())
}

/// Parse a source and print its tree.
pub fn parse_command() -> Command {
    Command::new("parse")
        .about("Parse a source file and print its syntax tree")
        .override_usage(
            "\
  tessel parse <SOURCE>
  tessel parse -s <TEXT> -l <LANG>
  tessel parse <SOURCE> --grammar <ARTIFACT>",
        )
        .after_help(
            r#"EXAMPLES:
  tessel parse script.rpy                  # language from extension
  tessel parse -s '1 + 2' -l expr          # inline source
  tessel parse -s 'a b' --grammar lang.tsl # generated artifact
  tessel parse script.rpy --raw --spans    # anonymous nodes and positions"#,
        )
        .arg(source_path_arg())
        .arg(source_text_arg())
        .arg(lang_arg())
        .arg(grammar_artifact_arg())
        .arg(spans_arg())
        .arg(raw_arg())
}

/// Run a query against a source.
pub fn query_command() -> Command {
    Command::new("query")
        .about("Run a query against a source file and print the matches")
        .override_usage(
            "\
  tessel query <QUERY> <SOURCE>
  tessel query -q <TEXT> <SOURCE>
  tessel query -q <TEXT> -s <TEXT> -l <LANG>",
        )
        .after_help(
            r#"EXAMPLES:
  tessel query calls.scm script.rpy
  tessel query -q '(say_statement speaker: (identifier) @who)' script.rpy
  tessel query -q '(number) @n' -s '1 + 2' -l expr"#,
        )
        .arg(query_path_arg())
        .arg(source_path_arg())
        .arg(query_text_arg())
        .arg(source_text_arg())
        .arg(lang_arg())
        .arg(grammar_artifact_arg())
}

/// List bundled languages.
pub fn langs_command() -> Command {
    Command::new("langs").about("List bundled languages")
}
