use std::fmt;

use crate::{
    ast::{
        BinaryOperator, Block, Decl, Expr, ExprKind, Field, FieldInit, FnDecl, FnModifier, Ident,
        Param, Program, Stmt, StmtKind, StructDecl, TypeExpr, TypeExprKind, UnaryOperator,
        VarDecl, ASSIGN_BINDING_POWER, POSTFIX_BINDING_POWER,
    },
    lexer,
    token::{Position, Token, TokenKind},
};

type Result<T, E = ParseError> = std::result::Result<T, E>;

/// How deep expressions, blocks, `else if` chains and types may nest. Every
/// later stage walks the tree recursively, so this also bounds their stack
/// usage.
pub const MAX_DEPTH: usize = 128;

/// Parses a whole translation unit out of the provided tokens.
///
/// The first structural error is fatal: no partial tree is ever returned.
pub fn parse(tokens: &[Token]) -> Result<Program> {
    let mut p = Parser::new(tokens);
    p.parse_program()
}

/// Lexes and parses the provided source.
pub fn parse_program(src: &str) -> Result<Program> {
    parse(&lexer::tokenize(src))
}

/// Lexes and parses a single expression, which must span the whole input.
pub fn parse_expr(src: &str) -> Result<Expr> {
    let tokens = lexer::tokenize(src);
    let mut p = Parser::new(&tokens);
    let expr = p.parse_expr()?;
    p.consume(TokenKind::Eof)?;
    Ok(expr)
}

struct Parser<'tok> {
    tokens: &'tok [Token],
    cursor: usize,
    /// Current nesting, see [`MAX_DEPTH`].
    depth: usize,
    /// Returned by `peek` once the cursor runs past the provided tokens.
    eof: Token,
}

impl Parser<'_> {
    fn parse_program(&mut self) -> Result<Program> {
        let mut decls = Vec::with_capacity(8);
        while self.except([]) {
            decls.push(self.parse_decl()?);
        }
        self.consume(TokenKind::Eof)?;
        Ok(Program { decls })
    }

    fn parse_decl(&mut self) -> Result<Decl> {
        let pos = self.peek().pos;
        let is_pub = self.take(TokenKind::Pub);
        match self.peek().kind {
            TokenKind::Fn | TokenKind::Inline | TokenKind::Comptime => {
                self.parse_fn(is_pub, pos).map(Decl::Function)
            }
            TokenKind::Const if self.is_struct_decl() => {
                self.parse_struct(is_pub, pos).map(Decl::Struct)
            }
            TokenKind::Const | TokenKind::Var => {
                self.parse_var_decl(is_pub, pos).map(Decl::Variable)
            }
            actual => Err(self.error(Error::ExpectedDeclaration { actual })),
        }
    }

    /// Checks for the `const Name = struct` prefix without consuming it.
    fn is_struct_decl(&self) -> bool {
        self.peek_nth(1).kind == TokenKind::Identifier
            && self.peek_nth(2).kind == TokenKind::Assign
            && self.peek_nth(3).kind == TokenKind::Struct
    }

    fn parse_fn(&mut self, is_pub: bool, pos: Position) -> Result<FnDecl> {
        let modifier = if self.take(TokenKind::Inline) {
            Some(FnModifier::Inline)
        } else if self.take(TokenKind::Comptime) {
            Some(FnModifier::Comptime)
        } else {
            None
        };
        self.consume(TokenKind::Fn)?;
        let name = self.parse_ident()?;

        self.consume(TokenKind::LParen)?;
        let params = self.parse_list(TokenKind::RParen, TokenKind::Comma, Parser::parse_param)?;
        self.consume(TokenKind::RParen)?;

        let return_ty = self.parse_type()?;
        let body = self.parse_block()?;

        Ok(FnDecl {
            is_pub,
            modifier,
            name,
            params,
            return_ty,
            body,
            pos,
        })
    }

    fn parse_param(&mut self) -> Result<Param> {
        let pos = self.peek().pos;
        let is_comptime = self.take(TokenKind::Comptime);
        let name = self.parse_ident()?;
        self.consume(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        Ok(Param {
            is_comptime,
            name,
            ty,
            pos,
        })
    }

    fn parse_struct(&mut self, is_pub: bool, pos: Position) -> Result<StructDecl> {
        self.consume(TokenKind::Const)?;
        let name = self.parse_ident()?;
        self.consume(TokenKind::Assign)?;
        self.consume(TokenKind::Struct)?;

        self.consume(TokenKind::LBrace)?;
        let fields = self.parse_list(TokenKind::RBrace, TokenKind::Comma, |p| {
            let pos = p.peek().pos;
            let name = p.parse_ident()?;
            p.consume(TokenKind::Colon)?;
            let ty = p.parse_type()?;
            Ok(Field { name, ty, pos })
        })?;
        self.consume(TokenKind::RBrace)?;
        self.consume(TokenKind::Semicolon)?;

        Ok(StructDecl {
            is_pub,
            name,
            fields,
            pos,
        })
    }

    fn parse_var_decl(&mut self, is_pub: bool, pos: Position) -> Result<VarDecl> {
        let is_const = self.consume_any(&[TokenKind::Const, TokenKind::Var])?.kind == TokenKind::Const;
        let name = self.parse_ident()?;
        let ty = if self.take(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.take(TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon)?;

        Ok(VarDecl {
            is_pub,
            is_const,
            name,
            ty,
            init,
            pos,
        })
    }

    fn parse_type(&mut self) -> Result<TypeExpr> {
        let depth = self.enter()?;
        let token = self.advance().clone();
        let kind = match token.kind {
            TokenKind::PrimitiveType => TypeExprKind::Primitive(token.text),
            TokenKind::Identifier => TypeExprKind::Named(token.text),
            TokenKind::Star => {
                let is_const = self.take(TokenKind::Const);
                let pointee = Box::new(self.parse_type()?);
                TypeExprKind::Pointer { is_const, pointee }
            }
            TokenKind::LBracket if self.take(TokenKind::RBracket) => {
                let is_const = self.take(TokenKind::Const);
                let elem = Box::new(self.parse_type()?);
                TypeExprKind::Slice { is_const, elem }
            }
            TokenKind::LBracket => {
                let len = self.parse_array_len()?;
                self.consume(TokenKind::RBracket)?;
                let elem = Box::new(self.parse_type()?);
                TypeExprKind::Array { len, elem }
            }
            TokenKind::Question => TypeExprKind::Optional(Box::new(self.parse_type()?)),
            TokenKind::Bang => TypeExprKind::ErrorUnion(Box::new(self.parse_type()?)),
            actual => return Err(self.error_at(&token, Error::ExpectedType { actual })),
        };
        self.depth = depth;
        Ok(TypeExpr {
            kind,
            pos: token.pos,
        })
    }

    fn parse_array_len(&mut self) -> Result<u64> {
        let token = self.consume(TokenKind::Number)?;
        token
            .text
            .parse()
            .map_err(|_| self.error_at(&token, Error::InvalidArrayLength(token.text.clone())))
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(Ident {
            name: token.text,
            pos: token.pos,
        })
    }

    fn parse_block(&mut self) -> Result<Block> {
        let depth = self.enter()?;
        self.consume(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while self.except([TokenKind::RBrace]) {
            stmts.push(self.parse_stmt()?);
        }
        self.consume(TokenKind::RBrace)?;
        self.depth = depth;
        Ok(Block { stmts })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        let pos = self.peek().pos;
        let kind = match self.peek().kind {
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::Return => {
                self.advance();
                let value = if self.is(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.consume(TokenKind::Semicolon)?;
                StmtKind::Return(value)
            }
            TokenKind::If => return self.parse_if(),
            TokenKind::While => {
                self.advance();
                let cond = self.parse_condition()?;
                let body = self.parse_block()?;
                StmtKind::While { cond, body }
            }
            TokenKind::For => self.parse_for()?,
            TokenKind::Break => {
                self.advance();
                self.consume(TokenKind::Semicolon)?;
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                self.consume(TokenKind::Semicolon)?;
                StmtKind::Continue
            }
            TokenKind::Comptime => {
                self.advance();
                StmtKind::Comptime(self.parse_block()?)
            }
            TokenKind::Const | TokenKind::Var => StmtKind::Var(self.parse_var_decl(false, pos)?),
            _ => {
                let expr = self.parse_expr()?;
                self.consume(TokenKind::Semicolon)?;
                StmtKind::Expr(expr)
            }
        };
        Ok(Stmt { kind, pos })
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        let depth = self.enter()?;
        let pos = self.consume(TokenKind::If)?.pos;
        let cond = self.parse_condition()?;
        let then_block = self.parse_block()?;
        let else_branch = if self.take(TokenKind::Else) {
            let branch = if self.is(TokenKind::If) {
                self.parse_if()?
            } else {
                let pos = self.peek().pos;
                Stmt {
                    kind: StmtKind::Block(self.parse_block()?),
                    pos,
                }
            };
            Some(Box::new(branch))
        } else {
            None
        };
        self.depth = depth;
        Ok(Stmt {
            kind: StmtKind::If {
                cond,
                then_block,
                else_branch,
            },
            pos,
        })
    }

    /// Parses `for ([init]; [cond]; [step]) block`.
    fn parse_for(&mut self) -> Result<StmtKind> {
        self.consume(TokenKind::For)?;
        self.consume(TokenKind::LParen)?;

        let init_pos = self.peek().pos;
        let init = match self.peek().kind {
            TokenKind::Semicolon => {
                self.advance();
                None
            }
            TokenKind::Const | TokenKind::Var => {
                let decl = self.parse_var_decl(false, init_pos)?;
                Some(Box::new(Stmt {
                    kind: StmtKind::Var(decl),
                    pos: init_pos,
                }))
            }
            _ => {
                let expr = self.parse_expr()?;
                self.consume(TokenKind::Semicolon)?;
                Some(Box::new(Stmt {
                    kind: StmtKind::Expr(expr),
                    pos: init_pos,
                }))
            }
        };

        let cond = self.parse_optional_expr(TokenKind::Semicolon)?;
        self.consume(TokenKind::Semicolon)?;
        let step = self.parse_optional_expr(TokenKind::RParen)?;
        self.consume(TokenKind::RParen)?;
        let body = self.parse_block()?;

        Ok(StmtKind::For {
            init,
            cond,
            step,
            body,
        })
    }

    /// Parses an expression unless `terminator` is the current token. Does
    /// **NOT** consume the terminator.
    fn parse_optional_expr(&mut self, terminator: TokenKind) -> Result<Option<Expr>> {
        if self.is(terminator) {
            Ok(None)
        } else {
            self.parse_expr().map(Some)
        }
    }

    /// Parses a parenthesized condition, as in `if` and `while`.
    fn parse_condition(&mut self) -> Result<Expr> {
        self.consume(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.consume(TokenKind::RParen)?;
        Ok(cond)
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let depth = self.enter()?;
        let lhs_token = self.advance().clone();
        let mut lhs = self.parse_nud(&lhs_token)?;

        loop {
            let op_token = self.peek().clone();

            if let Some((lbp, rbp)) = Self::infix_binding_power(op_token.kind) {
                if lbp < min_bp {
                    // Operator binds less tightly than the minimum required
                    break;
                }

                // Each operator wraps the tree built so far one level deeper.
                self.enter()?;
                self.advance(); // Operator
                lhs = self.parse_led(&op_token, lhs, rbp)?;
            } else {
                // Not an infix operator
                break;
            }
        }

        self.depth = depth;
        Ok(lhs)
    }

    /// nud: Parses tokens that start an expression
    /// (prefix operators, literals, grouping)
    fn parse_nud(&mut self, token: &Token) -> Result<Expr> {
        let kind = match token.kind {
            // Struct literal: Name{ .field = expr, ... }
            TokenKind::Identifier if self.is_struct_literal() => {
                let name = Ident {
                    name: token.text.clone(),
                    pos: token.pos,
                };
                self.parse_struct_literal(name)?
            }
            TokenKind::Identifier => ExprKind::Ident(token.text.clone()),
            TokenKind::Number => ExprKind::Number(token.text.clone()),
            TokenKind::String => ExprKind::String(token.text.clone()),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Null => ExprKind::Null,
            TokenKind::Undefined => ExprKind::Undefined,

            // Grouping: ( expr ). Parentheses are not kept in the tree; the
            // code generator re-derives them from precedence.
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                self.consume(TokenKind::RParen)?;
                return Ok(Expr {
                    kind: expr.kind,
                    pos: token.pos,
                });
            }

            // Array literal: [N]T{ expr, ... } or [_]T{ expr, ... }
            TokenKind::LBracket => self.parse_array_literal()?,

            // Prefix operators: -, !, &, try
            kind @ (TokenKind::Minus | TokenKind::Bang | TokenKind::Amp | TokenKind::Try) => {
                let op = match kind {
                    TokenKind::Minus => UnaryOperator::Neg,
                    TokenKind::Bang => UnaryOperator::Not,
                    TokenKind::Amp => UnaryOperator::AddrOf,
                    TokenKind::Try => UnaryOperator::Try,
                    _ => unreachable!(),
                };
                let expr = self.parse_expr_bp(UnaryOperator::BINDING_POWER)?;
                ExprKind::Unary {
                    op,
                    expr: Box::new(expr),
                }
            }

            other => {
                return Err(self.error_at(token, Error::UnexpectedTokenInExpr { token: other }));
            }
        };

        Ok(Expr {
            kind,
            pos: token.pos,
        })
    }

    /// led: Parses tokens that follow a left-hand-side expression
    /// (infix/postfix operators)
    fn parse_led(&mut self, op_token: &Token, lhs: Expr, rbp: u8) -> Result<Expr> {
        let pos = lhs.pos;
        let kind = match op_token.kind {
            kind if binary_operator(kind).is_some() => {
                let op = binary_operator(kind).expect("guarded by match arm");
                // Parse right operand with correct precedence
                let rhs = self.parse_expr_bp(rbp)?;
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }
            }

            // Assignment: place (op)= expr
            kind @ (TokenKind::Assign
            | TokenKind::PlusAssign
            | TokenKind::MinusAssign
            | TokenKind::StarAssign
            | TokenKind::SlashAssign
            | TokenKind::PercentAssign) => {
                if !lhs.is_place() {
                    return Err(self.error_at(op_token, Error::InvalidAssignmentTarget));
                }
                let op = match kind {
                    TokenKind::PlusAssign => Some(BinaryOperator::Add),
                    TokenKind::MinusAssign => Some(BinaryOperator::Sub),
                    TokenKind::StarAssign => Some(BinaryOperator::Mul),
                    TokenKind::SlashAssign => Some(BinaryOperator::Div),
                    TokenKind::PercentAssign => Some(BinaryOperator::Rem),
                    _ => None,
                };
                let value = self.parse_expr_bp(rbp)?;
                ExprKind::Assign {
                    op,
                    target: Box::new(lhs),
                    value: Box::new(value),
                }
            }

            // Member access (obj.field), dereference (ptr.*) and optional
            // unwrap (opt.?)
            TokenKind::Dot => {
                let next = self.advance().clone();
                match next.kind {
                    TokenKind::Identifier => ExprKind::Member {
                        object: Box::new(lhs),
                        field: Ident {
                            name: next.text,
                            pos: next.pos,
                        },
                    },
                    TokenKind::Star => ExprKind::Deref(Box::new(lhs)),
                    TokenKind::Question => ExprKind::Unwrap(Box::new(lhs)),
                    actual => {
                        let error = Error::Unexpected {
                            expected: TokenKind::Identifier,
                            actual,
                        };
                        return Err(self.error_at(&next, error));
                    }
                }
            }

            // Call: expr ( [expr [, expr]*] )
            TokenKind::LParen => {
                let args = self.parse_list(TokenKind::RParen, TokenKind::Comma, Parser::parse_expr)?;
                self.consume(TokenKind::RParen)?;
                ExprKind::Call {
                    callee: Box::new(lhs),
                    args,
                }
            }

            // Index: expr [ expr ]
            TokenKind::LBracket => {
                let index = self.parse_expr()?;
                self.consume(TokenKind::RBracket)?;
                ExprKind::Index {
                    object: Box::new(lhs),
                    index: Box::new(index),
                }
            }

            other => {
                return Err(self.error_at(op_token, Error::UnexpectedOperator { actual: other }));
            }
        };

        Ok(Expr { kind, pos })
    }

    /// A struct literal is an identifier immediately followed by `{` and
    /// then either `.` or `}`.
    fn is_struct_literal(&self) -> bool {
        self.is(TokenKind::LBrace)
            && matches!(self.peek_nth(1).kind, TokenKind::Dot | TokenKind::RBrace)
    }

    fn parse_struct_literal(&mut self, name: Ident) -> Result<ExprKind> {
        self.consume(TokenKind::LBrace)?;
        let fields = self.parse_list(TokenKind::RBrace, TokenKind::Comma, |p| {
            p.consume(TokenKind::Dot)?;
            let name = p.parse_ident()?;
            p.consume(TokenKind::Assign)?;
            let value = p.parse_expr()?;
            Ok(FieldInit { name, value })
        })?;
        self.consume(TokenKind::RBrace)?;
        Ok(ExprKind::StructLit { name, fields })
    }

    /// Parses the rest of an array literal, after its opening `[`.
    fn parse_array_literal(&mut self) -> Result<ExprKind> {
        let len = if self.is(TokenKind::Identifier) && &*self.peek().text == "_" {
            self.advance();
            None
        } else {
            Some(self.parse_array_len()?)
        };
        self.consume(TokenKind::RBracket)?;
        let elem_ty = self.parse_type()?;

        self.consume(TokenKind::LBrace)?;
        let elems = self.parse_list(TokenKind::RBrace, TokenKind::Comma, Parser::parse_expr)?;
        self.consume(TokenKind::RBrace)?;

        Ok(ExprKind::ArrayLit {
            len,
            elem_ty,
            elems,
        })
    }

    /// Parses `item (delim item)* [delim]` until `end_delim` is found. Does
    /// **NOT** consume the end delimiter.
    fn parse_list<T>(
        &mut self,
        end_delim: TokenKind,
        separator: TokenKind,
        mut parse_item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        debug_assert_ne!(end_delim, separator);

        let mut items = Vec::new();
        while self.except([end_delim]) {
            items.push(parse_item(self)?);

            // After consuming an item, we must consume the separator, unless
            // the list ends right here.
            if !self.take(separator) {
                if self.is(end_delim) {
                    break;
                }
                let actual = self.peek().kind;
                return Err(self.error(Error::UnexpectedAny {
                    actual,
                    expected: Box::from([separator, end_delim]),
                }));
            }
        }
        Ok(items)
    }

    fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8)> {
        let bp = match kind {
            TokenKind::Assign
            | TokenKind::PlusAssign
            | TokenKind::MinusAssign
            | TokenKind::StarAssign
            | TokenKind::SlashAssign
            | TokenKind::PercentAssign => ASSIGN_BINDING_POWER,

            TokenKind::Dot | TokenKind::LParen | TokenKind::LBracket => {
                (POSTFIX_BINDING_POWER, POSTFIX_BINDING_POWER + 1)
            }

            kind => binary_operator(kind)?.binding_power(),
        };
        Some(bp)
    }
}

fn binary_operator(kind: TokenKind) -> Option<BinaryOperator> {
    let op = match kind {
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Minus => BinaryOperator::Sub,
        TokenKind::Star => BinaryOperator::Mul,
        TokenKind::Slash => BinaryOperator::Div,
        TokenKind::Percent => BinaryOperator::Rem,
        TokenKind::EqEq => BinaryOperator::Eq,
        TokenKind::BangEq => BinaryOperator::Neq,
        TokenKind::Less => BinaryOperator::Lt,
        TokenKind::Greater => BinaryOperator::Gt,
        TokenKind::LessEq => BinaryOperator::Le,
        TokenKind::GreaterEq => BinaryOperator::Ge,
        TokenKind::AmpAmp => BinaryOperator::And,
        TokenKind::PipePipe => BinaryOperator::Or,
        _ => return None,
    };
    Some(op)
}

impl Parser<'_> {
    fn new(tokens: &[Token]) -> Parser<'_> {
        let eof_pos = tokens.last().map_or(Position::START, |t| t.pos);
        Parser {
            tokens,
            cursor: 0,
            depth: 0,
            eof: Token::new(TokenKind::Eof, "", eof_pos),
        }
    }

    /// Goes one nesting level deeper, returning the depth to restore once
    /// the nested construct is parsed. Errors are fatal, so the depth is
    /// never restored on failure.
    fn enter(&mut self) -> Result<usize> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(Error::NestingTooDeep));
        }
        self.depth += 1;
        Ok(self.depth - 1)
    }

    /// Builds an error located at the current token.
    fn error(&self, error: Error) -> ParseError {
        self.error_at(self.peek(), error)
    }

    /// Builds an error located at the provided token. Error-kind tokens
    /// report the lexical problem instead of the structural one.
    fn error_at(&self, token: &Token, error: Error) -> ParseError {
        let kind = match lexer::Error::of(token) {
            Some(lexical) => Error::Lexer(lexical),
            None => error,
        };
        ParseError {
            kind,
            token: token.clone(),
        }
    }

    /// Returns the current token.
    #[inline]
    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    /// Returns the token `n` positions after the current one.
    fn peek_nth(&self, n: usize) -> &Token {
        self.tokens.get(self.cursor + n).unwrap_or(&self.eof)
    }

    /// Returns the current token and advances.
    fn advance(&mut self) -> &Token {
        let cursor = self.cursor;
        if cursor < self.tokens.len() {
            self.cursor += 1;
        }
        self.tokens.get(cursor).unwrap_or(&self.eof)
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one, returning it.
    /// If not, returns an error.
    fn consume(&mut self, expect: TokenKind) -> Result<Token> {
        if self.is(expect) {
            Ok(self.advance().clone())
        } else {
            let actual = self.peek().kind;
            Err(self.error(Error::Unexpected {
                expected: expect,
                actual,
            }))
        }
    }

    /// Advances if the current token matches any of the provided tokens,
    /// returning it. If not, returns an error.
    fn consume_any(&mut self, expect: &'static [TokenKind]) -> Result<Token> {
        for t in expect {
            if self.is(*t) {
                return Ok(self.advance().clone());
            }
        }
        let actual = self.peek().kind;
        Err(self.error(Error::UnexpectedAny {
            actual,
            expected: Box::from(expect),
        }))
    }

    /// Returns true while the current token does *not* match one of the
    /// provided ones. [`TokenKind::Eof`] is implicitly included in the list.
    ///
    /// This won't advance the cursor.
    fn except(&self, except: impl IntoIterator<Item = TokenKind>) -> bool {
        let c = self.peek().kind;
        if c == TokenKind::Eof {
            return false;
        }
        except.into_iter().all(|e| c != e)
    }
}

/// A fatal syntax error, with the token at which parsing stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub kind: Error,
    pub token: Token,
}

impl ParseError {
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn pos(&self) -> Position {
        self.token.pos
    }

    pub fn line(&self) -> u32 {
        self.token.pos.line
    }

    pub fn column(&self) -> u32 {
        self.token.pos.column
    }
}

impl fmt::Display for ParseError {
    /// The alternate form (`{:#}`) prefixes the message with `line:column`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}: ", self.token.pos)?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ParseError {}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("invalid array length '{0}'")]
    InvalidArrayLength(Box<str>),
    #[error("unexpected token {token} in expression")]
    UnexpectedTokenInExpr { token: TokenKind },
    #[error("expected {expected}, but got {actual}")]
    Unexpected {
        expected: TokenKind,
        actual: TokenKind,
    },
    #[error("expected one of {}, but got {actual}", join(.expected))]
    UnexpectedAny {
        actual: TokenKind,
        expected: Box<[TokenKind]>,
    },
    #[error("unexpected operator {actual}")]
    UnexpectedOperator { actual: TokenKind },
    #[error("expected a declaration, but got {actual}")]
    ExpectedDeclaration { actual: TokenKind },
    #[error("expected a type, but got {actual}")]
    ExpectedType { actual: TokenKind },
    #[error("nesting is too deep, the limit is {} levels", MAX_DEPTH)]
    NestingTooDeep,
    #[error(transparent)]
    Lexer(#[from] lexer::Error),
}

fn join(kinds: &[TokenKind]) -> String {
    let names: Vec<_> = kinds.iter().map(ToString::to_string).collect();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use crate::util::test_utils::tree_tests;

    tree_tests!(
        use parser;

        fn test_precedence_mul_over_add() {
            let expr = "a + b * c";
            let tree_ok = "
                binary Add (1:1)
                  ident a (1:1)
                  binary Mul (1:5)
                    ident b (1:5)
                    ident c (1:9)
            ";
        }

        fn test_precedence_add_then_mul() {
            let expr = "a * b + c";
            let tree_ok = "
                binary Add (1:1)
                  binary Mul (1:1)
                    ident a (1:1)
                    ident b (1:5)
                  ident c (1:9)
            ";
        }

        fn test_grouping_is_dropped() {
            let expr = "(a + b) * c";
            let tree_ok = "
                binary Mul (1:1)
                  binary Add (1:1)
                    ident a (1:2)
                    ident b (1:6)
                  ident c (1:11)
            ";
        }

        fn test_left_associative_sub() {
            let expr = "a - b - c";
            let tree_ok = "
                binary Sub (1:1)
                  binary Sub (1:1)
                    ident a (1:1)
                    ident b (1:5)
                  ident c (1:9)
            ";
        }

        fn test_logical_and_comparison_levels() {
            let expr = "a < b && c == d || !e";
            let tree_ok = "
                binary Or (1:1)
                  binary And (1:1)
                    binary Lt (1:1)
                      ident a (1:1)
                      ident b (1:5)
                    binary Eq (1:10)
                      ident c (1:10)
                      ident d (1:15)
                  unary Not (1:20)
                    ident e (1:21)
            ";
        }

        fn test_unary_binds_tighter_than_binary() {
            let expr = "-a * b";
            let tree_ok = "
                binary Mul (1:1)
                  unary Neg (1:1)
                    ident a (1:2)
                  ident b (1:6)
            ";
        }

        fn test_postfix_binds_tighter_than_unary() {
            let expr = "-p.x[1]";
            let tree_ok = "
                unary Neg (1:1)
                  index (1:2)
                    member x (1:2)
                      ident p (1:2)
                    number 1 (1:6)
            ";
        }

        fn test_literals() {
            let expr = r#"f(1, 2.5, "hi\n", true, false, null, undefined)"#;
            let tree_ok = r#"
                call (1:1)
                  ident f (1:1)
                  arguments
                    number 1 (1:3)
                    number 2.5 (1:6)
                    string "hi\n" (1:11)
                    bool true (1:19)
                    bool false (1:25)
                    null (1:32)
                    undefined (1:38)
            "#;
        }

        fn test_call_chain() {
            let expr = "a.b(c)(d)";
            let tree_ok = "
                call (1:1)
                  call (1:1)
                    member b (1:1)
                      ident a (1:1)
                    arguments
                      ident c (1:5)
                  arguments
                    ident d (1:8)
            ";
        }

        fn test_deref_unwrap_addr_of_try() {
            let expr = "try f(&x).?.*";
            let tree_ok = "
                unary Try (1:1)
                  deref (1:5)
                    unwrap (1:5)
                      call (1:5)
                        ident f (1:5)
                        arguments
                          unary AddrOf (1:7)
                            ident x (1:8)
            ";
        }

        fn test_assignment_is_right_associative() {
            let expr = "a = b = c + d";
            let tree_ok = "
                assign = (1:1)
                  ident a (1:1)
                  assign = (1:5)
                    ident b (1:5)
                    binary Add (1:9)
                      ident c (1:9)
                      ident d (1:13)
            ";
        }

        fn test_compound_assignment_to_member() {
            let expr = "p.x += 1";
            let tree_ok = "
                assign += (1:1)
                  member x (1:1)
                    ident p (1:1)
                  number 1 (1:8)
            ";
        }

        fn test_struct_literal() {
            let expr = "Point{ .x = 1, .y = 2, }";
            let tree_ok = "
                struct literal Point (1:1)
                  field x
                    number 1 (1:13)
                  field y
                    number 2 (1:21)
            ";
        }

        fn test_empty_struct_literal() {
            let expr = "Unit{}";
            let tree_ok = "struct literal Unit (1:1)";
        }

        fn test_array_literals() {
            let expr = "f([3]i32{ 1, 2, 3 }, [_]u8{})";
            let tree_ok = "
                call (1:1)
                  ident f (1:1)
                  arguments
                    array literal [3]i32 (1:3)
                      number 1 (1:11)
                      number 2 (1:14)
                      number 3 (1:17)
                    array literal [_]u8 (1:22)
            ";
        }

        fn test_function_declaration() {
            let program = "pub inline fn add(comptime a: i32, b: *const u8) !?[4]i32 { return a; }";
            let tree_ok = "
                pub inline fn add(comptime a: i32, b: *const u8) !?[4]i32 (1:1)
                  return (1:61)
                    ident a (1:68)
            ";
        }

        fn test_variable_declarations() {
            let program = "
                const a: u8 = 1;
                var b = a;
                var c: []const u8;
            ";
            let tree_ok = "
                const a: u8 (1:1)
                  number 1 (1:15)
                var b (2:1)
                  ident a (2:9)
                var c: []const u8 (3:1)
            ";
        }

        fn test_struct_declaration() {
            let program = "
                const Point = struct {
                    x: i32,
                    y: i32,
                };
                pub const Empty = struct {};
            ";
            let tree_ok = "
                struct Point (1:1)
                  field x: i32
                  field y: i32
                pub struct Empty (5:1)
            ";
        }

        fn test_statements() {
            let program = "
                fn main() void {
                    var i: i32 = 0;
                    while (i < 10) {
                        i += 1;
                        if (i == 5) {
                            continue;
                        } else if (i == 8) {
                            break;
                        } else {
                            {}
                        }
                    }
                    comptime {
                        f();
                    }
                    return;
                }
            ";
            let tree_ok = "
                fn main() void (1:1)
                  var i: i32 (2:5)
                    number 0 (2:18)
                  while (3:5)
                    binary Lt (3:12)
                      ident i (3:12)
                      number 10 (3:16)
                    assign += (4:9)
                      ident i (4:9)
                      number 1 (4:14)
                    if (5:9)
                      binary Eq (5:13)
                        ident i (5:13)
                        number 5 (5:18)
                      continue (6:13)
                    else
                      if (7:16)
                        binary Eq (7:20)
                          ident i (7:20)
                          number 8 (7:25)
                        break (8:13)
                      else
                        block (9:16)
                          block (10:13)
                  comptime (13:5)
                    call (14:9)
                      ident f (14:9)
                  return (16:5)
            ";
        }

        fn test_for_loop_clauses() {
            let program = "
                fn f() void {
                    for (var i: usize = 0; i < n; i += 1) {}
                    for (;;) {}
                    for (i = 0; ; ) {}
                }
            ";
            let tree_ok = "
                fn f() void (1:1)
                  for (2:5)
                    init
                      var i: usize (2:10)
                        number 0 (2:25)
                    cond
                      binary Lt (2:28)
                        ident i (2:28)
                        ident n (2:32)
                    step
                      assign += (2:35)
                        ident i (2:35)
                        number 1 (2:40)
                  for (3:5)
                  for (4:5)
                    init
                      assign = (4:10)
                        ident i (4:10)
                        number 0 (4:14)
            ";
        }

        fn test_program_precedence_in_return() {
            let program = "fn t() i32 { return a + b * c; }";
            let tree_ok = "
                fn t() i32 (1:1)
                  return (1:14)
                    binary Add (1:21)
                      ident a (1:21)
                      binary Mul (1:25)
                        ident b (1:25)
                        ident c (1:29)
            ";
        }

        fn test_error_missing_semicolon() {
            let program = "const a = 1 const b = 2;";
            let expected_errors = &["1:13: expected ';', but got 'const'"];
        }

        fn test_error_statement_at_top_level() {
            let program = "x = 2;";
            let expected_errors = &["1:1: expected a declaration, but got identifier"];
        }

        fn test_error_missing_return_type() {
            let program = "fn f() { }";
            let expected_errors = &["1:8: expected a type, but got '{'"];
        }

        fn test_error_param_missing_colon() {
            let program = "fn f(a i32) void {}";
            let expected_errors = &["1:8: expected ':', but got type name"];
        }

        fn test_error_list_separator() {
            let program = "fn f() void { g(a b); }";
            let expected_errors = &["1:19: expected one of ',', ')', but got identifier"];
        }

        fn test_error_unexpected_token_in_expr() {
            let expr = "1 + ;";
            let expected_errors = &["1:5: unexpected token ';' in expression"];
        }

        fn test_error_unclosed_paren() {
            let expr = "(1 + 2";
            let expected_errors = &["1:7: expected ')', but got end of input"];
        }

        fn test_error_trailing_input() {
            let expr = "1 + 2)";
            let expected_errors = &["1:6: expected end of input, but got ')'"];
        }

        fn test_error_invalid_assignment_target() {
            let expr = "1 = 2";
            let expected_errors = &["1:3: invalid assignment target"];
        }

        fn test_error_bad_member() {
            let expr = "a.1";
            let expected_errors = &["1:3: expected identifier, but got number"];
        }

        fn test_error_array_length() {
            let expr = "[1.5]i32{}";
            let expected_errors = &["1:2: invalid array length '1.5'"];
        }

        fn test_error_unterminated_string() {
            let program = "const s = \"abc;";
            let expected_errors = &["1:11: Unterminated string"];
        }

        fn test_error_unexpected_char() {
            let program = "const s = 1 $ 2;";
            let expected_errors = &["1:13: Unexpected character '$'"];
        }

        fn test_error_struct_in_var() {
            let program = "var P = struct {};";
            let expected_errors = &["1:9: unexpected token 'struct' in expression"];
        }

        fn test_error_type_nested_too_deep() {
            let program = "const a: ?????????????????????????????????????????????????????????????????????????????????????????????????????????????????????????????????i32 = null;";
            let expected_errors = &["1:138: nesting is too deep, the limit is 128 levels"];
        }
    );

    #[test]
    fn test_empty_input_is_empty_program() {
        let program = super::parse_program("  // nothing here\n").unwrap();
        assert!(program.decls.is_empty());
    }

    #[test]
    fn test_parse_without_trailing_eof() {
        // Tokens produced by something other than the lexer may omit Eof.
        let mut tokens = crate::lexer::tokenize("const a = 1;");
        tokens.pop();
        let program = super::parse(&tokens).unwrap();
        assert_eq!(program.decls.len(), 1);
    }

    #[test]
    fn test_error_carries_token() {
        let error = super::parse_program("fn f() void {\n  return 1\n}").unwrap_err();
        assert_eq!(error.token.kind, crate::token::TokenKind::RBrace);
        assert_eq!((error.line(), error.column()), (3, 1));
        assert_eq!(error.message(), "expected ';', but got '}'");
        assert_eq!(format!("{error:#}"), "3:1: expected ';', but got '}'");
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let parens = format!("const a = {}1{};", "(".repeat(5_000), ")".repeat(5_000));
        let error = super::parse_program(&parens).unwrap_err();
        assert_eq!(error.kind, super::Error::NestingTooDeep);
        assert_eq!((error.line(), error.column()), (1, 139));

        let sources = [
            format!("const a = {}1;", "-".repeat(200_000)),
            format!("const a = 1{};", " + 1".repeat(1_000)),
            format!("const a = x{};", ".y".repeat(1_000)),
            format!("const a = {}1;", "b = ".repeat(1_000)),
            format!("fn f() void {}{}", "{".repeat(1_000), "}".repeat(1_000)),
            format!("fn f() void {{ if (a) {{}}{} }}", " else if (a) {}".repeat(1_000)),
        ];
        for src in sources {
            let error = super::parse_program(&src).unwrap_err();
            assert_eq!(error.kind, super::Error::NestingTooDeep, "source {:.40}", src);
        }
    }

    #[test]
    fn test_nesting_below_limit() {
        let src = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        let expr = super::parse_expr(&src).unwrap();
        assert_eq!(expr.kind, crate::ast::ExprKind::Number("1".into()));

        let src = format!("fn f() void {}{}", "{".repeat(100), "}".repeat(100));
        let program = super::parse_program(&src).unwrap();
        assert!(crate::type_checker::check(&program).is_empty());
    }
}
