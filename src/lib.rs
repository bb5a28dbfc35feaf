//! Source analysis for a Zig-like systems language.
//!
//! The pipeline is strictly one-way: text is tokenized, the tokens are parsed
//! into a syntax tree, and the tree is either type checked (producing
//! diagnostics) or emitted back as formatted source. Every stage is a pure
//! function of its input.

/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The type checker takes an AST and reports every semantic error in it.
pub mod type_checker;

/// The code generator emits formatted source from an AST.
pub mod codegen;

pub mod ast;
pub mod scope;
pub mod token;
pub mod types;

pub mod util {
    pub mod fmt {
        pub mod tree;
    }
    #[cfg(test)]
    pub(crate) mod test_utils;
}

use crate::{ast::Program, parser::ParseError, type_checker::TypeError};

/// Outcome of running the front stages over one source text.
#[derive(Debug)]
pub enum Analysis {
    /// The source could not be parsed. No tree exists.
    Unparsable(ParseError),
    /// The source parsed, but the type checker reported errors.
    Invalid {
        program: Program,
        errors: Vec<TypeError>,
    },
    Valid(Program),
}

impl Analysis {
    pub fn is_valid(&self) -> bool {
        matches!(self, Analysis::Valid(_))
    }

    /// Returns the parsed program, if parsing succeeded.
    pub fn program(&self) -> Option<&Program> {
        match self {
            Analysis::Unparsable(_) => None,
            Analysis::Invalid { program, .. } | Analysis::Valid(program) => Some(program),
        }
    }

    /// Every diagnostic, each formatted as `line:column: message`.
    pub fn errors(&self) -> Vec<String> {
        match self {
            Analysis::Unparsable(error) => vec![format!("{error:#}")],
            Analysis::Invalid { errors, .. } => errors.iter().map(|e| format!("{e:#}")).collect(),
            Analysis::Valid(_) => Vec::new(),
        }
    }
}

/// Tokenizes, parses and type checks the source.
pub fn analyze(src: &str) -> Analysis {
    let program = match parser::parse_program(src) {
        Ok(program) => program,
        Err(error) => return Analysis::Unparsable(error),
    };
    let errors = type_checker::check(&program);
    if errors.is_empty() {
        Analysis::Valid(program)
    } else {
        Analysis::Invalid { program, errors }
    }
}

/// Tokenizes and parses the source, emitting it back formatted. Type errors
/// don't prevent formatting.
pub fn format(src: &str, options: &codegen::Options) -> Result<String, ParseError> {
    let program = parser::parse_program(src)?;
    Ok(codegen::generate(&program, options))
}
