use std::io::Write;

use crate::{ast::*, lexer};

const INDENT_WIDTH: usize = 2;

pub fn print_program_string(program: &Program) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_program(&mut buf, program).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_expr_string(expr: &Expr) -> String {
    let mut buf = Vec::with_capacity(512);
    print_expr(&mut buf, 0, expr).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_program(w: &mut impl Write, program: &Program) -> std::io::Result<()> {
    for decl in &program.decls {
        match decl {
            Decl::Function(f) => print_fn(w, 0, f)?,
            Decl::Variable(v) => print_var(w, 0, v)?,
            Decl::Struct(s) => print_struct(w, 0, s)?,
        }
    }
    Ok(())
}

fn print_fn(w: &mut impl Write, i: usize, f: &FnDecl) -> std::io::Result<()> {
    sp(w, i)?;
    if f.is_pub {
        write!(w, "pub ")?;
    }
    match f.modifier {
        Some(FnModifier::Inline) => write!(w, "inline ")?,
        Some(FnModifier::Comptime) => write!(w, "comptime ")?,
        None => {}
    }
    write!(w, "fn {}(", f.name)?;
    for (idx, param) in f.params.iter().enumerate() {
        if idx > 0 {
            write!(w, ", ")?;
        }
        if param.is_comptime {
            write!(w, "comptime ")?;
        }
        write!(w, "{}: {}", param.name, param.ty)?;
    }
    writeln!(w, ") {} ({})", f.return_ty, f.pos)?;
    print_block(w, i + 1, &f.body)
}

fn print_var(w: &mut impl Write, i: usize, v: &VarDecl) -> std::io::Result<()> {
    sp(w, i)?;
    if v.is_pub {
        write!(w, "pub ")?;
    }
    let keyword = if v.is_const { "const" } else { "var" };
    write!(w, "{keyword} {}", v.name)?;
    if let Some(ty) = &v.ty {
        write!(w, ": {ty}")?;
    }
    writeln!(w, " ({})", v.pos)?;
    if let Some(init) = &v.init {
        print_expr(w, i + 1, init)?;
    }
    Ok(())
}

fn print_struct(w: &mut impl Write, i: usize, s: &StructDecl) -> std::io::Result<()> {
    sp(w, i)?;
    if s.is_pub {
        write!(w, "pub ")?;
    }
    writeln!(w, "struct {} ({})", s.name, s.pos)?;
    for field in &s.fields {
        sp(w, i + 1)?;
        writeln!(w, "field {}: {}", field.name, field.ty)?;
    }
    Ok(())
}

fn print_block(w: &mut impl Write, i: usize, block: &Block) -> std::io::Result<()> {
    for stmt in &block.stmts {
        print_stmt(w, i, stmt)?;
    }
    Ok(())
}

fn print_stmt(w: &mut impl Write, i: usize, stmt: &Stmt) -> std::io::Result<()> {
    let pos = stmt.pos;
    match &stmt.kind {
        StmtKind::Expr(expr) => return print_expr(w, i, expr),
        StmtKind::Var(decl) => return print_var(w, i, decl),
        _ => sp(w, i)?,
    }
    match &stmt.kind {
        StmtKind::Block(block) => {
            writeln!(w, "block ({pos})")?;
            print_block(w, i + 1, block)?;
        }
        StmtKind::Return(value) => {
            writeln!(w, "return ({pos})")?;
            if let Some(value) = value {
                print_expr(w, i + 1, value)?;
            }
        }
        StmtKind::If {
            cond,
            then_block,
            else_branch,
        } => {
            writeln!(w, "if ({pos})")?;
            print_expr(w, i + 1, cond)?;
            print_block(w, i + 1, then_block)?;
            if let Some(else_branch) = else_branch {
                sp(w, i)?;
                writeln!(w, "else")?;
                print_stmt(w, i + 1, else_branch)?;
            }
        }
        StmtKind::While { cond, body } => {
            writeln!(w, "while ({pos})")?;
            print_expr(w, i + 1, cond)?;
            print_block(w, i + 1, body)?;
        }
        StmtKind::For {
            init,
            cond,
            step,
            body,
        } => {
            writeln!(w, "for ({pos})")?;
            if let Some(init) = init {
                sp(w, i + 1)?;
                writeln!(w, "init")?;
                print_stmt(w, i + 2, init)?;
            }
            for (label, expr) in [("cond", cond), ("step", step)] {
                if let Some(expr) = expr {
                    sp(w, i + 1)?;
                    writeln!(w, "{label}")?;
                    print_expr(w, i + 2, expr)?;
                }
            }
            print_block(w, i + 1, body)?;
        }
        StmtKind::Break => writeln!(w, "break ({pos})")?,
        StmtKind::Continue => writeln!(w, "continue ({pos})")?,
        StmtKind::Comptime(block) => {
            writeln!(w, "comptime ({pos})")?;
            print_block(w, i + 1, block)?;
        }
        StmtKind::Expr(_) | StmtKind::Var(_) => unreachable!(),
    }
    Ok(())
}

pub fn print_expr(w: &mut impl Write, i: usize, expr: &Expr) -> std::io::Result<()> {
    sp(w, i)?;
    let pos = expr.pos;
    match &expr.kind {
        ExprKind::Number(text) => writeln!(w, "number {text} ({pos})")?,
        ExprKind::String(text) => writeln!(w, "string \"{}\" ({pos})", lexer::escape(text))?,
        ExprKind::Bool(value) => writeln!(w, "bool {value} ({pos})")?,
        ExprKind::Null => writeln!(w, "null ({pos})")?,
        ExprKind::Undefined => writeln!(w, "undefined ({pos})")?,
        ExprKind::Ident(name) => writeln!(w, "ident {name} ({pos})")?,
        ExprKind::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {op:?} ({pos})")?;
            print_expr(w, i + 1, lhs)?;
            print_expr(w, i + 1, rhs)?;
        }
        ExprKind::Unary { op, expr } => {
            writeln!(w, "unary {op:?} ({pos})")?;
            print_expr(w, i + 1, expr)?;
        }
        ExprKind::Call { callee, args } => {
            writeln!(w, "call ({pos})")?;
            print_expr(w, i + 1, callee)?;
            if !args.is_empty() {
                sp(w, i + 1)?;
                writeln!(w, "arguments")?;
                for arg in args {
                    print_expr(w, i + 2, arg)?;
                }
            }
        }
        ExprKind::Member { object, field } => {
            writeln!(w, "member {field} ({pos})")?;
            print_expr(w, i + 1, object)?;
        }
        ExprKind::Index { object, index } => {
            writeln!(w, "index ({pos})")?;
            print_expr(w, i + 1, object)?;
            print_expr(w, i + 1, index)?;
        }
        ExprKind::Deref(object) => {
            writeln!(w, "deref ({pos})")?;
            print_expr(w, i + 1, object)?;
        }
        ExprKind::Unwrap(object) => {
            writeln!(w, "unwrap ({pos})")?;
            print_expr(w, i + 1, object)?;
        }
        ExprKind::Assign { op, target, value } => {
            let op = op.map_or("", BinaryOperator::symbol);
            writeln!(w, "assign {op}= ({pos})")?;
            print_expr(w, i + 1, target)?;
            print_expr(w, i + 1, value)?;
        }
        ExprKind::StructLit { name, fields } => {
            writeln!(w, "struct literal {name} ({pos})")?;
            for field in fields {
                sp(w, i + 1)?;
                writeln!(w, "field {}", field.name)?;
                print_expr(w, i + 2, &field.value)?;
            }
        }
        ExprKind::ArrayLit {
            len,
            elem_ty,
            elems,
        } => {
            match len {
                Some(len) => write!(w, "array literal [{len}]")?,
                None => write!(w, "array literal [_]")?,
            }
            writeln!(w, "{elem_ty} ({pos})")?;
            for elem in elems {
                print_expr(w, i + 1, elem)?;
            }
        }
    }
    Ok(())
}

fn sp(w: &mut impl Write, i: usize) -> std::io::Result<()> {
    write!(w, "{:i$}", "", i = i * INDENT_WIDTH)
}
