use std::fmt::Write;

use crate::{
    ast::{
        Block, Decl, Expr, ExprKind, FnDecl, FnModifier, Program, Stmt, StmtKind, StructDecl,
        UnaryOperator, VarDecl, ASSIGN_BINDING_POWER, POSTFIX_BINDING_POWER,
    },
    lexer,
};

/// Formatting options for [`generate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Spaces per indentation level. Ignored when `use_tabs` is set.
    pub indent_width: usize,
    pub use_tabs: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            indent_width: 4,
            use_tabs: false,
        }
    }
}

impl Options {
    #[must_use]
    pub fn with_indent_width(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }

    #[must_use]
    pub fn with_tabs(mut self, use_tabs: bool) -> Self {
        self.use_tabs = use_tabs;
        self
    }
}

/// Emits formatted source for the program. Declarations are separated by a
/// blank line and the output ends with a newline.
///
/// No semantic validation happens here: any tree the parser produces is
/// emitted, including ones the type checker rejects.
pub fn generate(program: &Program, options: &Options) -> String {
    let mut g = Generator {
        options,
        buf: String::with_capacity(1024),
        indent: 0,
    };
    for (i, decl) in program.decls.iter().enumerate() {
        if i > 0 {
            g.buf.push('\n');
        }
        match decl {
            Decl::Function(f) => g.function(f),
            Decl::Variable(v) => g.line(&format!("{};", var_decl(v))),
            Decl::Struct(s) => g.structure(s),
        }
    }
    g.buf
}

struct Generator<'opt> {
    options: &'opt Options,
    buf: String,
    indent: usize,
}

impl Generator<'_> {
    fn function(&mut self, f: &FnDecl) {
        let mut header = String::new();
        if f.is_pub {
            header.push_str("pub ");
        }
        match f.modifier {
            Some(FnModifier::Inline) => header.push_str("inline "),
            Some(FnModifier::Comptime) => header.push_str("comptime "),
            None => {}
        }
        write!(header, "fn {}(", f.name).unwrap();
        for (i, param) in f.params.iter().enumerate() {
            if i > 0 {
                header.push_str(", ");
            }
            if param.is_comptime {
                header.push_str("comptime ");
            }
            write!(header, "{}: {}", param.name, param.ty).unwrap();
        }
        write!(header, ") {}", f.return_ty).unwrap();
        self.block(&header, &f.body);
    }

    fn structure(&mut self, s: &StructDecl) {
        let visibility = if s.is_pub { "pub " } else { "" };
        if s.fields.is_empty() {
            self.line(&format!("{visibility}const {} = struct {{}};", s.name));
            return;
        }
        self.line(&format!("{visibility}const {} = struct {{", s.name));
        self.indent += 1;
        for field in &s.fields {
            self.line(&format!("{}: {},", field.name, field.ty));
        }
        self.indent -= 1;
        self.line("};");
    }

    /// Emits `header {`, the block's statements one level deeper, and the
    /// closing brace. Empty blocks are emitted as `header {}`.
    fn block(&mut self, header: &str, block: &Block) {
        let sep = if header.is_empty() { "" } else { " " };
        if block.stmts.is_empty() {
            self.line(&format!("{header}{sep}{{}}"));
            return;
        }
        self.line(&format!("{header}{sep}{{"));
        self.statements(block);
        self.line("}");
    }

    fn statements(&mut self, block: &Block) {
        self.indent += 1;
        for stmt in &block.stmts {
            self.statement(stmt);
        }
        self.indent -= 1;
    }

    fn statement(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block(block) => self.block("", block),
            StmtKind::Return(None) => self.line("return;"),
            StmtKind::Return(Some(value)) => self.line(&format!("return {};", expr(value))),
            StmtKind::If { .. } => self.if_chain("", stmt),
            StmtKind::While { cond, body } => {
                self.block(&format!("while ({})", expr(cond)), body);
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                let mut header = String::from("for (");
                match init.as_deref().map(|init| &init.kind) {
                    Some(StmtKind::Var(decl)) => header.push_str(&var_decl(decl)),
                    Some(StmtKind::Expr(init)) => header.push_str(&expr(init)),
                    _ => {}
                }
                header.push(';');
                if let Some(cond) = cond {
                    write!(header, " {}", expr(cond)).unwrap();
                }
                header.push(';');
                if let Some(step) = step {
                    write!(header, " {}", expr(step)).unwrap();
                }
                header.push(')');
                self.block(&header, body);
            }
            StmtKind::Break => self.line("break;"),
            StmtKind::Continue => self.line("continue;"),
            StmtKind::Expr(e) => self.line(&format!("{};", expr(e))),
            StmtKind::Comptime(block) => self.block("comptime", block),
            StmtKind::Var(decl) => self.line(&format!("{};", var_decl(decl))),
        }
    }

    /// Emits an `if` statement and its `else if` / `else` continuations. The
    /// `prefix` is `} else ` for chained branches.
    fn if_chain(&mut self, prefix: &str, stmt: &Stmt) {
        let StmtKind::If {
            cond,
            then_block,
            else_branch,
        } = &stmt.kind
        else {
            unreachable!("if_chain called on a non-if statement");
        };
        self.line(&format!("{prefix}if ({}) {{", expr(cond)));
        self.statements(then_block);
        match else_branch.as_deref() {
            None => self.line("}"),
            Some(branch @ Stmt {
                kind: StmtKind::If { .. },
                ..
            }) => self.if_chain("} else ", branch),
            Some(Stmt {
                kind: StmtKind::Block(block),
                ..
            }) => {
                self.line("} else {");
                self.statements(block);
                self.line("}");
            }
            Some(other) => {
                // Not produced by the parser; emitted as a braced block.
                self.line("} else {");
                self.indent += 1;
                self.statement(other);
                self.indent -= 1;
                self.line("}");
            }
        }
    }

    /// Writes one line at the current indentation.
    fn line(&mut self, text: &str) {
        if self.options.use_tabs {
            for _ in 0..self.indent {
                self.buf.push('\t');
            }
        } else {
            let width = self.indent * self.options.indent_width;
            write!(self.buf, "{:width$}", "").unwrap();
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }
}

fn var_decl(v: &VarDecl) -> String {
    let mut out = String::new();
    if v.is_pub {
        out.push_str("pub ");
    }
    out.push_str(if v.is_const { "const " } else { "var " });
    out.push_str(&v.name.name);
    if let Some(ty) = &v.ty {
        write!(out, ": {ty}").unwrap();
    }
    if let Some(init) = &v.init {
        write!(out, " = {}", expr(init)).unwrap();
    }
    out
}

fn expr(e: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, e, 0);
    out
}

/// Binding power of the expression's outermost operator.
fn precedence(e: &Expr) -> u8 {
    match &e.kind {
        ExprKind::Binary { op, .. } => op.binding_power().0,
        ExprKind::Unary { .. } => UnaryOperator::BINDING_POWER,
        ExprKind::Assign { .. } => ASSIGN_BINDING_POWER.0,
        _ => POSTFIX_BINDING_POWER,
    }
}

/// Writes the expression, parenthesized if it binds less tightly than
/// `min_bp`.
fn write_expr(out: &mut String, e: &Expr, min_bp: u8) {
    let parens = precedence(e) < min_bp;
    if parens {
        out.push('(');
    }
    match &e.kind {
        ExprKind::Number(text) | ExprKind::Ident(text) => out.push_str(text),
        ExprKind::String(text) => write!(out, "\"{}\"", lexer::escape(text)).unwrap(),
        ExprKind::Bool(value) => write!(out, "{value}").unwrap(),
        ExprKind::Null => out.push_str("null"),
        ExprKind::Undefined => out.push_str("undefined"),
        ExprKind::Binary { op, lhs, rhs } => {
            let (lbp, rbp) = op.binding_power();
            write_expr(out, lhs, lbp);
            write!(out, " {} ", op.symbol()).unwrap();
            write_expr(out, rhs, rbp);
        }
        ExprKind::Unary { op, expr } => {
            out.push_str(op.symbol());
            // `& &x` must not be emitted as the `&&` token.
            if let (
                UnaryOperator::AddrOf,
                ExprKind::Unary {
                    op: UnaryOperator::AddrOf,
                    ..
                },
            ) = (op, &expr.kind)
            {
                out.push(' ');
            }
            write_expr(out, expr, UnaryOperator::BINDING_POWER);
        }
        ExprKind::Call { callee, args } => {
            write_expr(out, callee, POSTFIX_BINDING_POWER);
            out.push('(');
            write_list(out, args, ", ", |out, arg| write_expr(out, arg, 0));
            out.push(')');
        }
        ExprKind::Member { object, field } => {
            write_expr(out, object, POSTFIX_BINDING_POWER);
            write!(out, ".{field}").unwrap();
        }
        ExprKind::Index { object, index } => {
            write_expr(out, object, POSTFIX_BINDING_POWER);
            out.push('[');
            write_expr(out, index, 0);
            out.push(']');
        }
        ExprKind::Deref(object) => {
            write_expr(out, object, POSTFIX_BINDING_POWER);
            out.push_str(".*");
        }
        ExprKind::Unwrap(object) => {
            write_expr(out, object, POSTFIX_BINDING_POWER);
            out.push_str(".?");
        }
        ExprKind::Assign { op, target, value } => {
            let (lbp, rbp) = ASSIGN_BINDING_POWER;
            write_expr(out, target, lbp);
            let op = op.map_or("", |op| op.symbol());
            write!(out, " {op}= ").unwrap();
            write_expr(out, value, rbp);
        }
        ExprKind::StructLit { name, fields } => {
            write!(out, "{name}{{").unwrap();
            if !fields.is_empty() {
                out.push(' ');
                write_list(out, fields, ", ", |out, field| {
                    write!(out, ".{} = ", field.name).unwrap();
                    write_expr(out, &field.value, 0);
                });
                out.push(' ');
            }
            out.push('}');
        }
        ExprKind::ArrayLit {
            len,
            elem_ty,
            elems,
        } => {
            match len {
                Some(len) => write!(out, "[{len}]{elem_ty}{{").unwrap(),
                None => write!(out, "[_]{elem_ty}{{").unwrap(),
            }
            if !elems.is_empty() {
                out.push(' ');
                write_list(out, elems, ", ", |out, elem| write_expr(out, elem, 0));
                out.push(' ');
            }
            out.push('}');
        }
    }
    if parens {
        out.push(')');
    }
}

fn write_list<T>(out: &mut String, items: &[T], sep: &str, mut f: impl FnMut(&mut String, &T)) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        f(out, item);
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{parser, util::test_utils::program_shape};

    fn format(src: &str, options: &Options) -> String {
        let program = parser::parse_program(src).unwrap();
        generate(&program, options)
    }

    #[test]
    fn test_layout() {
        let src = indoc! {r#"
            pub const Point = struct { x: i32, y: i32, };
            const Empty = struct {};
            var   total:i32=0;
            pub inline fn add(comptime a: i32, b: *const u8) !?[4]i32 { if (a > 0) { return a; } else if (a < 0) { total += 1; } else { {} } return undefined; }
            fn loop() void { while (true) { break; } for (var i: usize = 0; i < 3; i += 1) { continue; } for (;;) {} comptime { f(); } }
        "#};
        let expected = indoc! {"
            pub const Point = struct {
                x: i32,
                y: i32,
            };

            const Empty = struct {};

            var total: i32 = 0;

            pub inline fn add(comptime a: i32, b: *const u8) !?[4]i32 {
                if (a > 0) {
                    return a;
                } else if (a < 0) {
                    total += 1;
                } else {
                    {}
                }
                return undefined;
            }

            fn loop() void {
                while (true) {
                    break;
                }
                for (var i: usize = 0; i < 3; i += 1) {
                    continue;
                }
                for (;;) {}
                comptime {
                    f();
                }
            }
        "};
        assert_eq!(format(src, &Options::default()), expected);
    }

    #[test]
    fn test_indentation_options() {
        let src = "fn f() void { if (x) { y(); } }";
        let tabs = format(src, &Options::default().with_tabs(true));
        assert_eq!(tabs, "fn f() void {\n\tif (x) {\n\t\ty();\n\t}\n}\n");
        let two = format(src, &Options::default().with_indent_width(2));
        assert_eq!(two, "fn f() void {\n  if (x) {\n    y();\n  }\n}\n");
    }

    #[test]
    fn test_strings_are_reescaped() {
        let src = r#"const s = 'it\'s "q"\n\t\\';"#;
        assert_eq!(
            format(src, &Options::default()),
            "const s = \"it\\'s \\\"q\\\"\\n\\t\\\\\";\n"
        );
    }

    #[test]
    fn test_parenthesization() {
        let cases = [
            ("(a + b) * c - (d - e)", "(a + b) * c - (d - e)"),
            ("((a)) + (b * c)", "a + b * c"),
            ("(a == b) == (c == d)", "a == b == (c == d)"),
            ("-(a + b) * !(c && d)", "-(a + b) * !(c && d)"),
            ("(-a).b(c)[0].*.?", "(-a).b(c)[0].*.?"),
            ("a = (b = c)", "a = b = c"),
            ("x + (y = 1)", "x + (y = 1)"),
            ("try (f(x))", "try f(x)"),
            ("(&p).* += - -1", "(&p).* += --1"),
            ("& &p", "& &p"),
            ("&(&(&p))", "& & &p"),
            ("f(a || b && c, (a || b) && c)", "f(a || b && c, (a || b) && c)"),
        ];
        for (src, expected) in cases {
            let src = format!("const r = {src};");
            let out = format(&src, &Options::default());
            assert_eq!(out, format!("const r = {expected};\n"), "source {src:?}");
            let reparsed = parser::parse_program(&out).unwrap();
            let original = parser::parse_program(&src).unwrap();
            assert_eq!(program_shape(&reparsed), program_shape(&original));
        }
    }

    #[test]
    fn test_literals() {
        let src = "const r = f(P{}, P{ .x = 1, .y = [_]u8{} }, [2]bool{ true, false }, null, 1.25);";
        assert_eq!(format(src, &Options::default()), format!("{src}\n"));
    }

    #[test]
    fn test_round_trip_preserves_shape() {
        let src = include_str!("../samples/linked_list.zig");
        let original = parser::parse_program(src).unwrap();
        let generated = generate(&original, &Options::default());
        let reparsed = parser::parse_program(&generated).unwrap();
        assert_eq!(reparsed.decls.len(), original.decls.len());
        assert_eq!(program_shape(&reparsed), program_shape(&original));
    }

    #[test]
    fn test_generation_is_idempotent() {
        let src = include_str!("../samples/linked_list.zig");
        let program = parser::parse_program(src).unwrap();
        for options in [
            Options::default(),
            Options::default().with_tabs(true),
            Options::default().with_indent_width(2),
        ] {
            let first = generate(&program, &options);
            assert_eq!(generate(&program, &options), first);
            // Formatting formatted output changes nothing.
            let reparsed = parser::parse_program(&first).unwrap();
            assert_eq!(generate(&reparsed, &options), first);
        }
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(generate(&Program::default(), &Options::default()), "");
    }
}
