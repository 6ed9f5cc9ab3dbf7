//! Debug commands: `lex` and `parse` for inspecting the front end.

use vela_diagnostic::Diagnostic;
use vela_ir::StringInterner;
use vela_parse::ParseOptions;
use velac::ScriptError;

use super::{fail, read_file};

/// Lex a file and display the token stream.
pub fn lex_file(path: &str) {
    let source = read_file(path);
    let interner = StringInterner::new();
    let tokens = match vela_lexer::lex(&source, &interner) {
        Ok(tokens) => tokens,
        Err(err) => fail(&ScriptError::Diagnostic(Diagnostic::from(err)), &source, path),
    };

    println!("Tokens for '{path}' ({} tokens):", tokens.len());
    for token in tokens.iter() {
        println!("  {:?} @ {}..{}", token.kind, token.span.start, token.span.end);
    }
}

/// Parse a file and display a summary of its declarations.
pub fn parse_file(path: &str) {
    let source = read_file(path);
    let interner = StringInterner::new();
    let script = match vela_parse::parse_source(&source, &interner, ParseOptions::default()) {
        Ok(script) => script,
        Err(diagnostic) => fail(&ScriptError::Diagnostic(diagnostic), &source, path),
    };

    println!("Parse result for '{path}':");
    println!("  Usings: {}", script.usings.len());
    println!("  Modules: {}", script.modules.len());
    println!("  Vars: {}", script.vars.len());
    println!("  Assignments: {}", script.assignments.len());
    println!("  Expressions: {}", script.arena.expr_count());
    println!("  Result expression: {}", if script.body.is_some() { "yes" } else { "no" });

    for module in &script.modules {
        println!();
        println!("module {} {}", module.name.display(&interner), module.version);
        for member in &module.members {
            println!(
                "  {} : {}",
                interner.lookup(member.name.name),
                member.kind.describe()
            );
        }
    }
}
