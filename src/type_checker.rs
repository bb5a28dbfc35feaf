use std::{fmt, mem, rc::Rc};

use crate::{
    ast::{
        BinaryOperator, Block, Decl, Expr, ExprKind, FieldInit, FnDecl, Ident, OperatorClass,
        Program, Stmt, StmtKind, StructDecl, TypeExpr, TypeExprKind, UnaryOperator, VarDecl,
    },
    scope::{Role, Scopes, Symbol},
    token::Position,
    types::{Signature, Type, TypeRegistry},
};

/// Checks the whole program, collecting every semantic error found. The
/// returned errors are sorted by position.
pub fn check(program: &Program) -> Vec<TypeError> {
    Checker::with_capacity(16).check(program)
}

pub struct Checker {
    registry: TypeRegistry,
    scopes: Scopes,
    errors: Vec<TypeError>,
    /// The function whose body is being checked, if any.
    current_fn: Option<FnContext>,
    loop_depth: usize,
}

struct FnContext {
    name: Box<str>,
    ret: Type,
}

impl Checker {
    pub fn with_capacity(capacity: usize) -> Checker {
        Checker {
            registry: TypeRegistry::with_capacity(capacity),
            scopes: Scopes::new(),
            errors: Vec::with_capacity(8),
            current_fn: None,
            loop_depth: 0,
        }
    }

    pub fn check(mut self, program: &Program) -> Vec<TypeError> {
        let (signatures, annotations) = self.register_globals(program);
        let mut signatures = signatures.into_iter();
        let mut annotations = annotations.into_iter();

        for decl in &program.decls {
            match decl {
                Decl::Function(f) => {
                    let sig = signatures
                        .next()
                        .expect("one signature is registered per function");
                    self.check_fn(f, &sig);
                }
                Decl::Variable(v) => {
                    let annotated = annotations
                        .next()
                        .expect("one annotation is registered per global");
                    self.check_var_annotated(v, annotated);
                }
                Decl::Struct(s) => self.mark_declared(&s.name),
            }
        }

        let mut errors = self.errors;
        errors.sort_by_key(|e| e.pos);
        errors
    }

    /// First pass. Registers every struct, function and global variable in
    /// the global scope so that they can be referenced before their
    /// declaration. Returns the signature of each function and the resolved
    /// annotation of each global variable, in order.
    ///
    /// Symbols are registered as not yet `declared`; the second pass flips
    /// the flag as it reaches each declaration, which is how duplicates are
    /// detected.
    fn register_globals(&mut self, program: &Program) -> (Vec<Rc<Signature>>, Vec<Option<Type>>) {
        // Define struct names first, so that fields and signatures may refer
        // to any of them.
        let mut defined = Vec::new();
        for decl in &program.decls {
            if let Decl::Struct(s) = decl {
                if let Ok(ty) = self.registry.define(&s.name.name) {
                    self.register(&s.name, ty, Role::Struct, true);
                    defined.push(s);
                }
            }
        }
        for s in defined {
            self.define_fields(s);
        }

        let mut signatures = Vec::new();
        let mut annotations = Vec::new();
        for decl in &program.decls {
            match decl {
                Decl::Function(f) => {
                    let sig = Rc::new(Signature {
                        params: f.params.iter().map(|p| self.resolve_type(&p.ty)).collect(),
                        ret: self.resolve_type(&f.return_ty),
                    });
                    self.register(&f.name, Type::Function(Rc::clone(&sig)), Role::Function, true);
                    signatures.push(sig);
                }
                Decl::Variable(v) => {
                    let annotated = v.ty.as_ref().map(|ty| self.resolve_type(ty));
                    // Unannotated, the type is only known once the
                    // initializer is checked.
                    let ty = annotated.clone().unwrap_or(Type::Unknown);
                    self.register(&v.name, ty, Role::Variable, v.is_const);
                    annotations.push(annotated);
                }
                Decl::Struct(_) => {}
            }
        }
        (signatures, annotations)
    }

    fn define_fields(&mut self, s: &StructDecl) {
        let mut fields: Vec<(Box<str>, Type)> = Vec::with_capacity(s.fields.len());
        for field in &s.fields {
            let ty = self.resolve_type(&field.ty);
            if fields.iter().any(|(name, _)| *name == field.name.name) {
                self.error(field.name.pos, Error::DuplicateDeclaration(field.name.name.clone()));
                continue;
            }
            fields.push((field.name.name.clone(), ty));
        }
        self.registry.set_fields(&s.name.name, fields);
    }

    /// Registers a global symbol ahead of its declaration. The first
    /// registration of a name wins.
    fn register(&mut self, name: &Ident, ty: Type, role: Role, is_const: bool) {
        if self.scopes.lookup(&name.name).is_some() {
            return;
        }
        let symbol = Symbol {
            ty,
            role,
            is_const,
            declared: false,
            pos: name.pos,
        };
        self.scopes.insert(&name.name, symbol);
    }

    /// Declares the symbol in the innermost scope, reporting a duplicate if
    /// the name was already declared there.
    fn declare(&mut self, name: &Ident, symbol: Symbol) {
        match self.scopes.get_local_mut(&name.name) {
            Some(existing) if existing.declared => {
                self.error(name.pos, Error::DuplicateDeclaration(name.name.clone()));
            }
            Some(existing) => *existing = symbol,
            None => {
                self.scopes.insert(&name.name, symbol);
            }
        }
    }

    /// Marks a symbol registered by the first pass as declared.
    fn mark_declared(&mut self, name: &Ident) {
        match self.scopes.get_local_mut(&name.name) {
            Some(existing) if !existing.declared => existing.declared = true,
            _ => self.error(name.pos, Error::DuplicateDeclaration(name.name.clone())),
        }
    }

    fn check_fn(&mut self, f: &FnDecl, sig: &Signature) {
        self.mark_declared(&f.name);

        self.scopes.push();
        for (param, ty) in f.params.iter().zip(&sig.params) {
            let symbol = Symbol {
                ty: ty.clone(),
                role: Role::Parameter,
                is_const: true,
                declared: true,
                pos: param.pos,
            };
            self.declare(&param.name, symbol);
        }

        let context = FnContext {
            name: f.name.name.clone(),
            ret: sig.ret.clone(),
        };
        let outer = self.current_fn.replace(context);
        let outer_loop_depth = mem::take(&mut self.loop_depth);

        // Parameters and the outermost body statements share a scope.
        for stmt in &f.body.stmts {
            self.check_stmt(stmt);
        }

        self.loop_depth = outer_loop_depth;
        self.current_fn = outer;
        self.scopes.pop();

        if needs_return_value(&sig.ret) && !has_return(&f.body) {
            self.error(f.pos, Error::MissingReturn(f.name.name.clone()));
        }
    }

    fn check_var(&mut self, v: &VarDecl) {
        let annotated = v.ty.as_ref().map(|ty| self.resolve_type(ty));
        self.check_var_annotated(v, annotated);
    }

    /// Checks a variable whose annotation, if any, is already resolved.
    fn check_var_annotated(&mut self, v: &VarDecl, annotated: Option<Type>) {
        let init = v.init.as_ref().map(|init| (init.pos, self.check_expr(init)));

        let ty = match (annotated, init) {
            (Some(expected), Some((pos, actual))) => {
                self.expect_coercible(pos, &expected, actual);
                expected
            }
            (Some(ty), None) | (None, Some((_, ty))) => ty,
            (None, None) => {
                self.error(v.pos, Error::MissingTypeOrInit(v.name.name.clone()));
                Type::Unknown
            }
        };

        let symbol = Symbol {
            ty,
            role: Role::Variable,
            is_const: v.is_const,
            declared: true,
            pos: v.pos,
        };
        self.declare(&v.name, symbol);
    }

    /// Checks the block's statements in a new scope.
    fn check_block(&mut self, block: &Block) {
        self.scopes.push();
        for stmt in &block.stmts {
            self.check_stmt(stmt);
        }
        self.scopes.pop();
    }

    fn check_loop_body(&mut self, body: &Block) {
        self.loop_depth += 1;
        self.check_block(body);
        self.loop_depth -= 1;
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block(block) | StmtKind::Comptime(block) => self.check_block(block),
            StmtKind::Return(value) => self.check_return(stmt.pos, value.as_ref()),
            StmtKind::If {
                cond,
                then_block,
                else_branch,
            } => {
                self.check_condition(cond);
                self.check_block(then_block);
                if let Some(else_branch) = else_branch {
                    self.check_stmt(else_branch);
                }
            }
            StmtKind::While { cond, body } => {
                self.check_condition(cond);
                self.check_loop_body(body);
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                self.scopes.push();
                if let Some(init) = init {
                    self.check_stmt(init);
                }
                if let Some(cond) = cond {
                    self.check_condition(cond);
                }
                if let Some(step) = step {
                    self.check_expr(step);
                }
                self.check_loop_body(body);
                self.scopes.pop();
            }
            StmtKind::Break if self.loop_depth == 0 => {
                self.error(stmt.pos, Error::BreakOutsideLoop);
            }
            StmtKind::Continue if self.loop_depth == 0 => {
                self.error(stmt.pos, Error::ContinueOutsideLoop);
            }
            StmtKind::Break | StmtKind::Continue => {}
            StmtKind::Expr(expr) => {
                self.check_expr(expr);
            }
            StmtKind::Var(decl) => self.check_var(decl),
        }
    }

    fn check_return(&mut self, pos: Position, value: Option<&Expr>) {
        let Some(FnContext { name, ret }) = &self.current_fn else {
            return;
        };
        let (name, ret) = (name.clone(), ret.clone());
        match value {
            Some(value) => {
                let actual = self.check_expr(value);
                if ret.is_void() {
                    self.error(pos, Error::VoidReturnValue(name));
                } else {
                    self.expect_coercible(value.pos, &ret, actual);
                }
            }
            None if needs_return_value(&ret) => {
                self.error(pos, Error::MissingReturn(name));
            }
            None => {}
        }
    }

    fn check_condition(&mut self, cond: &Expr) {
        let ty = self.check_expr(cond);
        if !ty.is_unknown() && !ty.is_bool() {
            self.error(cond.pos, Error::NonBooleanCondition(ty));
        }
    }

    fn check_expr(&mut self, expr: &Expr) -> Type {
        let pos = expr.pos;
        match &expr.kind {
            ExprKind::Number(text) if text.contains('.') => Type::comptime_float(),
            ExprKind::Number(_) => Type::comptime_int(),
            ExprKind::String(_) => Type::string(),
            ExprKind::Bool(_) => Type::bool(),
            ExprKind::Null => Type::Null,
            ExprKind::Undefined => Type::Unknown,
            ExprKind::Ident(name) => self.resolve_ident(pos, name),
            ExprKind::Binary { op, lhs, rhs } => self.check_binary(pos, *op, lhs, rhs),
            ExprKind::Unary { op, expr } => self.check_unary(pos, *op, expr),
            ExprKind::Call { callee, args } => self.check_call(pos, callee, args),
            ExprKind::Member { object, field } => {
                let object_ty = self.check_expr(object);
                self.check_member(object_ty, field)
            }
            ExprKind::Index { object, index } => {
                let object_ty = self.check_expr(object);
                let index_ty = self.check_expr(index);
                if !index_ty.is_unknown() && !index_ty.is_integer() {
                    self.error(index.pos, Error::NonIntegerIndex(index_ty));
                }
                match object_ty {
                    Type::Array { elem, .. } | Type::Slice { elem, .. } => *elem,
                    Type::Pointer { is_const, pointee } => match *pointee {
                        Type::Array { elem, .. } => *elem,
                        pointee => {
                            let ty = Type::Pointer {
                                is_const,
                                pointee: Box::new(pointee),
                            };
                            self.error(object.pos, Error::NotIndexable(ty));
                            Type::Unknown
                        }
                    },
                    Type::Unknown => Type::Unknown,
                    ty => {
                        self.error(object.pos, Error::NotIndexable(ty));
                        Type::Unknown
                    }
                }
            }
            ExprKind::Deref(object) => match self.check_expr(object) {
                Type::Pointer { pointee, .. } => *pointee,
                Type::Unknown => Type::Unknown,
                ty => {
                    self.error(pos, Error::NotAPointer(ty));
                    Type::Unknown
                }
            },
            ExprKind::Unwrap(object) => match self.check_expr(object) {
                Type::Optional(inner) => *inner,
                Type::Unknown => Type::Unknown,
                ty => {
                    self.error(pos, Error::NotAnOptional(ty));
                    Type::Unknown
                }
            },
            ExprKind::Assign { op, target, value } => self.check_assign(*op, target, value),
            ExprKind::StructLit { name, fields } => self.check_struct_literal(pos, name, fields),
            ExprKind::ArrayLit {
                len,
                elem_ty,
                elems,
            } => {
                let elem = self.resolve_type(elem_ty);
                for e in elems {
                    let actual = self.check_expr(e);
                    self.expect_coercible(e.pos, &elem, actual);
                }
                if let Some(len) = *len {
                    if len != elems.len() as u64 {
                        let error = Error::ArrayLength {
                            expected: len,
                            actual: elems.len(),
                        };
                        self.error(pos, error);
                    }
                }
                Type::Array {
                    len: len.unwrap_or(elems.len() as u64),
                    elem: Box::new(elem),
                }
            }
        }
    }

    fn resolve_ident(&mut self, pos: Position, name: &str) -> Type {
        if let Some(symbol) = self.scopes.lookup(name) {
            symbol.ty.clone()
        } else {
            self.error(pos, Error::UndefinedVariable(name.into()));
            Type::Unknown
        }
    }

    fn check_binary(&mut self, pos: Position, op: BinaryOperator, lhs: &Expr, rhs: &Expr) -> Type {
        let lhs = self.check_expr(lhs);
        let rhs = self.check_expr(rhs);
        match op.class() {
            OperatorClass::Arithmetic => {
                if is_numeric_or_unknown(&lhs) && is_numeric_or_unknown(&rhs) {
                    lhs
                } else {
                    let op = op.symbol();
                    self.error(pos, Error::NonNumericOperands { op, lhs, rhs });
                    Type::Unknown
                }
            }
            OperatorClass::Comparison => {
                if !lhs.is_comparable_with(&rhs) {
                    self.error(pos, Error::Incomparable { lhs, rhs });
                }
                Type::bool()
            }
            OperatorClass::Logical => {
                if !is_bool_or_unknown(&lhs) || !is_bool_or_unknown(&rhs) {
                    let op = op.symbol();
                    self.error(pos, Error::NonBooleanOperands { op, lhs, rhs });
                }
                Type::bool()
            }
        }
    }

    fn check_unary(&mut self, pos: Position, op: UnaryOperator, operand: &Expr) -> Type {
        let ty = self.check_expr(operand);
        match op {
            UnaryOperator::Neg if is_numeric_or_unknown(&ty) => ty,
            UnaryOperator::Neg => {
                self.error(pos, Error::NonNumericNegation(ty));
                Type::Unknown
            }
            UnaryOperator::Not => {
                if !is_bool_or_unknown(&ty) {
                    self.error(pos, Error::NonBooleanNot(ty));
                }
                Type::bool()
            }
            UnaryOperator::AddrOf => {
                let is_const = match &operand.kind {
                    ExprKind::Ident(name) => self.scopes.lookup(name).is_some_and(|s| s.is_const),
                    _ => false,
                };
                Type::Pointer {
                    is_const,
                    pointee: Box::new(ty),
                }
            }
            UnaryOperator::Try => {
                if let Some(FnContext { name, ret }) = &self.current_fn {
                    if !matches!(ret, Type::ErrorUnion(_) | Type::Unknown) {
                        let name = name.clone();
                        self.error(pos, Error::TryOutsideErrorFunction(name));
                    }
                }
                match ty {
                    Type::ErrorUnion(inner) => *inner,
                    Type::Unknown => Type::Unknown,
                    ty => {
                        self.error(pos, Error::TryWithoutErrorUnion(ty));
                        Type::Unknown
                    }
                }
            }
        }
    }

    fn check_call(&mut self, pos: Position, callee: &Expr, args: &[Expr]) -> Type {
        let callee_ty = self.check_expr(callee);
        let sig = match callee_ty {
            Type::Function(sig) => sig,
            Type::Unknown => {
                for arg in args {
                    self.check_expr(arg);
                }
                return Type::Unknown;
            }
            ty => {
                let error = match &callee.kind {
                    ExprKind::Ident(name) => Error::NotAFunction(name.clone()),
                    _ => Error::NotCallable(ty),
                };
                self.error(pos, error);
                for arg in args {
                    self.check_expr(arg);
                }
                return Type::Unknown;
            }
        };

        if args.len() != sig.params.len() {
            let error = Error::ArgumentCount {
                expected: sig.params.len(),
                actual: args.len(),
            };
            self.error(pos, error);
            for arg in args {
                self.check_expr(arg);
            }
        } else {
            for (i, (arg, expected)) in args.iter().zip(&sig.params).enumerate() {
                let actual = self.check_expr(arg);
                if !actual.coerces_to(expected) {
                    let error = Error::ArgumentMismatch {
                        position: i + 1,
                        expected: expected.clone(),
                        actual,
                    };
                    self.error(arg.pos, error);
                }
            }
        }
        sig.ret.clone()
    }

    fn check_member(&mut self, object_ty: Type, field: &Ident) -> Type {
        // Pointers to structs are dereferenced implicitly.
        let object_ty = match object_ty {
            Type::Pointer { pointee, .. } if matches!(*pointee, Type::Struct(_)) => *pointee,
            ty => ty,
        };
        match object_ty {
            Type::Struct(name) => {
                let field_ty = self
                    .registry
                    .get(&name)
                    .map(|def| def.field(&field.name).cloned());
                match field_ty {
                    Some(Some(ty)) => ty,
                    Some(None) => {
                        let error = Error::UnknownField {
                            struct_name: name,
                            field: field.name.clone(),
                        };
                        self.error(field.pos, error);
                        Type::Unknown
                    }
                    None => Type::Unknown,
                }
            }
            Type::Array { .. } | Type::Slice { .. } if &*field.name == "len" => {
                Type::primitive("usize")
            }
            Type::Unknown => Type::Unknown,
            ty => {
                self.error(field.pos, Error::NoMembers(ty));
                Type::Unknown
            }
        }
    }

    fn check_assign(&mut self, op: Option<BinaryOperator>, target: &Expr, value: &Expr) -> Type {
        // `_ = expr;` discards a value.
        if op.is_none() && matches!(&target.kind, ExprKind::Ident(name) if &**name == "_") {
            self.check_expr(value);
            return Type::Unknown;
        }

        if let ExprKind::Ident(name) = &target.kind {
            if self.scopes.lookup(name).is_some_and(|s| s.is_const) {
                self.error(target.pos, Error::AssignToConst(name.clone()));
            }
        }
        let target_ty = self.check_expr(target);
        let value_ty = self.check_expr(value);

        if let Some(op) = op {
            if !is_numeric_or_unknown(&target_ty) || !is_numeric_or_unknown(&value_ty) {
                let error = Error::NonNumericOperands {
                    op: compound_symbol(op),
                    lhs: target_ty.clone(),
                    rhs: value_ty,
                };
                self.error(target.pos, error);
                return target_ty;
            }
        }
        self.expect_coercible(value.pos, &target_ty, value_ty);
        target_ty
    }

    fn check_struct_literal(&mut self, pos: Position, name: &Ident, inits: &[FieldInit]) -> Type {
        let Some(def) = self.registry.get(&name.name) else {
            self.error(name.pos, Error::UnknownType(name.name.clone()));
            for init in inits {
                self.check_expr(&init.value);
            }
            return Type::Unknown;
        };
        let fields = def.fields.clone();

        for init in inits {
            let actual = self.check_expr(&init.value);
            match fields.iter().find(|(field, _)| *field == init.name.name) {
                Some((_, expected)) => self.expect_coercible(init.value.pos, expected, actual),
                None => {
                    let error = Error::UnknownField {
                        struct_name: name.name.clone(),
                        field: init.name.name.clone(),
                    };
                    self.error(init.name.pos, error);
                }
            }
        }
        for (field, _) in &fields {
            if !inits.iter().any(|init| init.name.name == *field) {
                let error = Error::MissingField {
                    struct_name: name.name.clone(),
                    field: field.clone(),
                };
                self.error(pos, error);
            }
        }
        Type::Struct(name.name.clone())
    }

    fn resolve_type(&mut self, ty: &TypeExpr) -> Type {
        match &ty.kind {
            TypeExprKind::Primitive(name) => Type::primitive(name),
            TypeExprKind::Named(name) if self.registry.has(name) => Type::Struct(name.clone()),
            TypeExprKind::Named(name) => {
                self.error(ty.pos, Error::UnknownType(name.clone()));
                Type::Unknown
            }
            TypeExprKind::Pointer { is_const, pointee } => Type::Pointer {
                is_const: *is_const,
                pointee: Box::new(self.resolve_type(pointee)),
            },
            TypeExprKind::Array { len, elem } => Type::Array {
                len: *len,
                elem: Box::new(self.resolve_type(elem)),
            },
            TypeExprKind::Slice { is_const, elem } => Type::Slice {
                is_const: *is_const,
                elem: Box::new(self.resolve_type(elem)),
            },
            TypeExprKind::ErrorUnion(inner) => Type::ErrorUnion(Box::new(self.resolve_type(inner))),
            TypeExprKind::Optional(inner) => Type::Optional(Box::new(self.resolve_type(inner))),
        }
    }

    /// Reports a type mismatch unless `actual` coerces to `expected`.
    fn expect_coercible(&mut self, pos: Position, expected: &Type, actual: Type) {
        if !actual.coerces_to(expected) {
            let error = Error::TypeMismatch {
                expected: expected.clone(),
                actual,
            };
            self.error(pos, error);
        }
    }

    fn error(&mut self, pos: Position, kind: Error) {
        self.errors.push(TypeError {
            kind,
            pos: Some(pos),
        });
    }
}

fn is_numeric_or_unknown(ty: &Type) -> bool {
    ty.is_unknown() || ty.is_numeric()
}

fn is_bool_or_unknown(ty: &Type) -> bool {
    ty.is_unknown() || ty.is_bool()
}

fn compound_symbol(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::Add => "+=",
        BinaryOperator::Sub => "-=",
        BinaryOperator::Mul => "*=",
        BinaryOperator::Div => "/=",
        BinaryOperator::Rem => "%=",
        other => other.symbol(),
    }
}

/// Whether a function returning `ret` must end in a `return` with a value.
fn needs_return_value(ret: &Type) -> bool {
    match ret {
        Type::Void | Type::Unknown => false,
        Type::ErrorUnion(inner) => !inner.is_void(),
        Type::Primitive(name) => &**name != "noreturn",
        _ => true,
    }
}

/// Conservative return reachability: a block returns if it contains a
/// `return`, a nested block that returns, or an `if` whose branches all
/// return. Loops are never considered to return.
fn has_return(block: &Block) -> bool {
    block.stmts.iter().any(stmt_returns)
}

fn stmt_returns(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Return(_) => true,
        StmtKind::Block(block) | StmtKind::Comptime(block) => has_return(block),
        StmtKind::If {
            then_block,
            else_branch: Some(else_branch),
            ..
        } => has_return(then_block) && stmt_returns(else_branch),
        _ => false,
    }
}

/// A semantic error and, when known, where it was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeError {
    pub kind: Error,
    pub pos: Option<Position>,
}

impl TypeError {
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for TypeError {
    /// The alternate form (`{:#}`) prefixes the message with `line:column`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (true, Some(pos)) = (f.alternate(), self.pos) {
            write!(f, "{pos}: ")?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for TypeError {}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Undefined variable '{0}'")]
    UndefinedVariable(Box<str>),
    #[error("Unknown type '{0}'")]
    UnknownType(Box<str>),
    #[error("Duplicate declaration of '{0}'")]
    DuplicateDeclaration(Box<str>),
    #[error("Variable '{0}' needs a type annotation or an initializer")]
    MissingTypeOrInit(Box<str>),
    #[error("Type mismatch: expected '{expected}', got '{actual}'")]
    TypeMismatch { expected: Type, actual: Type },
    #[error("Operator '{op}' requires numeric operands, got '{lhs}' and '{rhs}'")]
    NonNumericOperands {
        op: &'static str,
        lhs: Type,
        rhs: Type,
    },
    #[error("Cannot compare '{lhs}' with '{rhs}'")]
    Incomparable { lhs: Type, rhs: Type },
    #[error("Operator '{op}' requires boolean operands, got '{lhs}' and '{rhs}'")]
    NonBooleanOperands {
        op: &'static str,
        lhs: Type,
        rhs: Type,
    },
    #[error("Unary '-' requires a numeric operand, got '{0}'")]
    NonNumericNegation(Type),
    #[error("Unary '!' requires a boolean operand, got '{0}'")]
    NonBooleanNot(Type),
    #[error("'{0}' is not a function")]
    NotAFunction(Box<str>),
    #[error("Cannot call value of type '{0}'")]
    NotCallable(Type),
    #[error("Expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
    #[error("Argument {position} type mismatch: expected '{expected}', got '{actual}'")]
    ArgumentMismatch {
        position: usize,
        expected: Type,
        actual: Type,
    },
    #[error("Type '{0}' has no members")]
    NoMembers(Type),
    #[error("Struct '{struct_name}' has no field '{field}'")]
    UnknownField {
        struct_name: Box<str>,
        field: Box<str>,
    },
    #[error("Cannot index into type '{0}'")]
    NotIndexable(Type),
    #[error("Index must be an integer, got '{0}'")]
    NonIntegerIndex(Type),
    #[error("Cannot assign to const '{0}'")]
    AssignToConst(Box<str>),
    #[error("Function '{0}' must return a value")]
    MissingReturn(Box<str>),
    #[error("Void function '{0}' cannot return a value")]
    VoidReturnValue(Box<str>),
    #[error("Condition must be of type 'bool', got '{0}'")]
    NonBooleanCondition(Type),
    #[error("'break' outside of a loop")]
    BreakOutsideLoop,
    #[error("'continue' outside of a loop")]
    ContinueOutsideLoop,
    #[error("Missing field '{field}' in '{struct_name}' literal")]
    MissingField {
        struct_name: Box<str>,
        field: Box<str>,
    },
    #[error("Expected {expected} array elements, got {actual}")]
    ArrayLength { expected: u64, actual: usize },
    #[error("Cannot dereference non-pointer type '{0}'")]
    NotAPointer(Type),
    #[error("Cannot unwrap non-optional type '{0}'")]
    NotAnOptional(Type),
    #[error("'try' requires an error union, got '{0}'")]
    TryWithoutErrorUnion(Type),
    #[error("'try' used in function '{0}' that does not return an error union")]
    TryOutsideErrorFunction(Box<str>),
}
