// program   ::= decl*
// decl      ::= ['pub'] (fn_decl | var_decl | struct_decl)
// fn_decl   ::= ['inline' | 'comptime'] 'fn' ID '(' [param (',' param)*] ')' type block
// param     ::= ['comptime'] ID ':' type
// var_decl  ::= ('const' | 'var') ID [':' type] ['=' expr] ';'
// struct    ::= 'const' ID '=' 'struct' '{' [field (',' field)* [',']] '}' ';'
// field     ::= ID ':' type
// type      ::= PRIMITIVE | ID | '*' ['const'] type | '[' [NUMBER] ']' ['const'] type
//             | '?' type | '!' type
// block     ::= '{' stmt* '}'
// stmt      ::= block
//             | 'return' [expr] ';'
//             | 'if' '(' expr ')' block ['else' (block | if_stmt)]
//             | 'while' '(' expr ')' block
//             | 'for' '(' [var_decl | expr ';' | ';'] [expr] ';' [expr] ')' block
//             | 'break' ';' | 'continue' ';'
//             | 'comptime' block
//             | var_decl
//             | expr ';'
//
// Precedence (loosest first)
//
// = += -= *= /= %=   (right)
// ||
// &&
// == !=
// < > <= >=
// + -
// * / %
// - ! & try          (prefix)
// () . [] .* .?      (postfix)

use crate::token::Position;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Function(FnDecl),
    Variable(VarDecl),
    Struct(StructDecl),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FnModifier {
    Inline,
    Comptime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub is_pub: bool,
    pub modifier: Option<FnModifier>,
    pub name: Ident,
    pub params: Vec<Param>,
    /// An error-union return (`!T`) is represented by a
    /// [`TypeExprKind::ErrorUnion`] here.
    pub return_ty: TypeExpr,
    pub body: Block,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub is_comptime: bool,
    pub name: Ident,
    pub ty: TypeExpr,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub is_pub: bool,
    pub is_const: bool,
    pub name: Ident,
    pub ty: Option<TypeExpr>,
    pub init: Option<Expr>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub is_pub: bool,
    pub name: Ident,
    pub fields: Vec<Field>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: Ident,
    pub ty: TypeExpr,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Block(Block),
    Return(Option<Expr>),
    If {
        cond: Expr,
        then_block: Block,
        /// Either a [`StmtKind::Block`] or a chained [`StmtKind::If`].
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Block,
    },
    For {
        /// Either a [`StmtKind::Var`] or a [`StmtKind::Expr`].
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Block,
    },
    Break,
    Continue,
    Expr(Expr),
    Comptime(Block),
    Var(VarDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Number literal, kept as written (`42`, `1.5`).
    Number(Box<str>),
    /// String literal, already decoded.
    String(Box<str>),
    Bool(bool),
    Null,
    Undefined,
    Ident(Box<str>),
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOperator,
        expr: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        field: Ident,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// `p.*`
    Deref(Box<Expr>),
    /// `opt.?`
    Unwrap(Box<Expr>),
    Assign {
        /// `Some` for compound assignments such as `+=`.
        op: Option<BinaryOperator>,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    StructLit {
        name: Ident,
        fields: Vec<FieldInit>,
    },
    ArrayLit {
        /// `None` for the inferred `[_]T{...}` form.
        len: Option<u64>,
        elem_ty: TypeExpr,
        elems: Vec<Expr>,
    },
}

impl Expr {
    /// Whether the expression may appear on the left side of an assignment.
    pub fn is_place(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Ident(_) | ExprKind::Member { .. } | ExprKind::Index { .. } | ExprKind::Deref(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInit {
    pub name: Ident,
    pub value: Expr,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Neg,
    Not,
    AddrOf,
    Try,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Neg => "-",
            UnaryOperator::Not => "!",
            UnaryOperator::AddrOf => "&",
            UnaryOperator::Try => "try ",
        }
    }

    /// Right binding power of prefix operators.
    pub const BINDING_POWER: u8 = 15;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperatorClass {
    Arithmetic,
    Comparison,
    Logical,
}

impl BinaryOperator {
    pub fn class(self) -> OperatorClass {
        use BinaryOperator::*;
        match self {
            Add | Sub | Mul | Div | Rem => OperatorClass::Arithmetic,
            Eq | Neq | Lt | Gt | Le | Ge => OperatorClass::Comparison,
            And | Or => OperatorClass::Logical,
        }
    }

    pub fn symbol(self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Rem => "%",
            Eq => "==",
            Neq => "!=",
            Lt => "<",
            Gt => ">",
            Le => "<=",
            Ge => ">=",
            And => "&&",
            Or => "||",
        }
    }

    /// Left and right binding powers. All binary operators are
    /// left-associative.
    pub fn binding_power(self) -> (u8, u8) {
        use BinaryOperator::*;
        match self {
            Or => (3, 4),
            And => (5, 6),
            Eq | Neq => (7, 8),
            Lt | Gt | Le | Ge => (9, 10),
            Add | Sub => (11, 12),
            Mul | Div | Rem => (13, 14),
        }
    }
}

/// Assignment binds the loosest and is right-associative.
pub const ASSIGN_BINDING_POWER: (u8, u8) = (2, 1);

/// Postfix operators (call, member, index, deref, unwrap) bind the tightest.
pub const POSTFIX_BINDING_POWER: u8 = 17;

#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    Primitive(Box<str>),
    /// A reference to a struct by name.
    Named(Box<str>),
    Pointer {
        is_const: bool,
        pointee: Box<TypeExpr>,
    },
    Array {
        len: u64,
        elem: Box<TypeExpr>,
    },
    Slice {
        is_const: bool,
        elem: Box<TypeExpr>,
    },
    ErrorUnion(Box<TypeExpr>),
    Optional(Box<TypeExpr>),
}

impl std::fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TypeExprKind::Primitive(name) | TypeExprKind::Named(name) => f.write_str(name),
            TypeExprKind::Pointer { is_const, pointee } => {
                let c = if *is_const { "const " } else { "" };
                write!(f, "*{c}{pointee}")
            }
            TypeExprKind::Array { len, elem } => write!(f, "[{len}]{elem}"),
            TypeExprKind::Slice { is_const, elem } => {
                let c = if *is_const { "const " } else { "" };
                write!(f, "[]{c}{elem}")
            }
            TypeExprKind::ErrorUnion(inner) => write!(f, "!{inner}"),
            TypeExprKind::Optional(inner) => write!(f, "?{inner}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: Box<str>,
    pub pos: Position,
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
