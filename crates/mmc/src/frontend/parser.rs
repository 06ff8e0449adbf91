//! Recursive-descent parser performing syntax-directed translation
//!
//! Every production calls straight into the [`Translator`] session as it is
//! recognized: declarations go to the scope manager, expressions allocate
//! temporaries and emit tacos, and control-flow constructs emit pending
//! jumps that are backpatched once their extent is known.

use super::scanner::Scanner;
use super::token::{Token, TokenKind};
use crate::common::{Span, TranslateError, TranslateResult};
use crate::ir::{Address, BinOp, Taco, UnOp, PENDING};
use crate::sema::{InitialValue, SymbolRef};
use crate::translator::Translator;
use crate::types::DataType;

/// Result of translating one expression: where its value lives, its type,
/// and the literal constant it denotes when it is a bare literal
struct ExprValue {
    place: SymbolRef,
    ty: DataType,
    literal: Option<InitialValue>,
    span: Span,
}

pub struct Parser<'a> {
    scanner: Scanner<'a>,
    current: Token,
    tr: &'a mut Translator,
    trace: bool,
    /// Pending break jumps per enclosing loop, innermost last
    loop_breaks: Vec<Vec<Address>>,
    /// Return type of the function body being translated
    current_ret: Option<DataType>,
}

impl<'a> Parser<'a> {
    pub fn new(
        source: &'a str,
        translator: &'a mut Translator,
        trace_scan: bool,
        trace_parse: bool,
    ) -> TranslateResult<Self> {
        let mut scanner = Scanner::new(source).with_trace(trace_scan);
        let current = scanner.next_token()?;
        Ok(Self {
            scanner,
            current,
            tr: translator,
            trace: trace_parse,
            loop_breaks: Vec::new(),
            current_ret: None,
        })
    }

    /// Translate a complete program, closing the global scope at the end
    pub fn translate_program(&mut self) -> TranslateResult<()> {
        self.trace("program");
        while !self.at_end() {
            self.item()?;
        }
        self.tr.scopes.exit_scope();
        debug_assert_eq!(self.tr.scopes.depth(), 0, "unbalanced scope stack");
        Ok(())
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn trace(&self, rule: &str) {
        if self.trace {
            eprintln!("[parse] {rule}");
        }
    }

    fn at_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> TranslateResult<Token> {
        let next = self.scanner.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> TranslateResult<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> TranslateResult<Token> {
        if self.check(&kind) {
            self.advance()
        } else {
            Err(TranslateError::parser(
                format!("expected {}, found {}", kind, self.current.kind),
                self.current.span,
            ))
        }
    }

    fn expect_identifier(&mut self) -> TranslateResult<(String, Span)> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Identifier(name) => Ok((name, token.span)),
            other => Err(TranslateError::parser(
                format!("expected an identifier, found {other}"),
                token.span,
            )),
        }
    }

    /// Resolve a name by walking the parent chain table by table, starting
    /// at the active scope. Reports an undeclared-identifier diagnostic on
    /// a miss; the caller decides how to continue.
    fn resolve(&mut self, name: &str, span: Span) -> Option<SymbolRef> {
        let mut scope = self.tr.scopes.current_scope_id();
        loop {
            if let Some(sym) = self.tr.scopes.lookup(name, scope) {
                return Some(sym);
            }
            let parent = self.tr.scopes.table(scope).parent;
            if parent == scope {
                break;
            }
            scope = parent;
        }
        self.tr
            .error_at(span, &format!("'{name}' is not declared in this scope"));
        None
    }

    /// Placeholder value used to keep translating after a semantic error
    fn poison(&mut self, span: Span) -> ExprValue {
        ExprValue {
            place: self.tr.gen_temp(DataType::Int),
            ty: DataType::Int,
            literal: None,
            span,
        }
    }

    // =========================================================================
    // Items and declarations
    // =========================================================================

    fn item(&mut self) -> TranslateResult<()> {
        let ty = self.parse_type()?;
        let (name, name_span) = self.expect_identifier()?;
        if self.check(&TokenKind::LParen) {
            self.function_definition(ty, &name, name_span)
        } else {
            self.declaration(ty, &name, name_span)
        }
    }

    fn parse_type(&mut self) -> TranslateResult<DataType> {
        match self.current.kind {
            TokenKind::Void => {
                self.advance()?;
                Ok(DataType::Void)
            }
            TokenKind::Char => {
                self.advance()?;
                Ok(DataType::Char)
            }
            TokenKind::Int => {
                self.advance()?;
                Ok(DataType::Int)
            }
            TokenKind::Real => {
                self.advance()?;
                Ok(DataType::Real)
            }
            TokenKind::Matrix => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let rows = self.expect_dimension()?;
                self.expect(TokenKind::Comma)?;
                let cols = self.expect_dimension()?;
                self.expect(TokenKind::RParen)?;
                Ok(DataType::matrix(rows, cols))
            }
            _ => Err(TranslateError::parser(
                format!("expected a type, found {}", self.current.kind),
                self.current.span,
            )),
        }
    }

    fn expect_dimension(&mut self) -> TranslateResult<usize> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::IntLiteral(n) => Ok(n as usize),
            other => Err(TranslateError::parser(
                format!("expected a matrix dimension, found {other}"),
                token.span,
            )),
        }
    }

    fn declaration(&mut self, ty: DataType, name: &str, name_span: Span) -> TranslateResult<()> {
        self.trace("declaration");
        self.tr.type_context.push(ty.clone());
        let scope = self.tr.scopes.current_scope_id();
        let declared = match self.tr.scopes.declare(name, ty, scope) {
            Ok(sym) => Some(sym),
            Err(err) => {
                self.tr.error_at(name_span, &err.to_string());
                None
            }
        };

        if self.match_token(&TokenKind::Assign)? {
            let init = self.expression()?;
            let literal = init.literal;
            if let Some(dst) = declared {
                self.assign_into(dst, init);
                if let Some(literal) = literal {
                    self.tr.scopes.symbol_mut(dst).set_initial(literal);
                }
            }
        }

        self.expect(TokenKind::Semi)?;
        self.tr.type_context.pop();
        Ok(())
    }

    fn function_definition(
        &mut self,
        ret: DataType,
        name: &str,
        name_span: Span,
    ) -> TranslateResult<()> {
        self.trace("function-definition");
        let outer = self.tr.scopes.current_scope_id();
        let func = match self
            .tr
            .scopes
            .declare(name, DataType::function(ret.clone()), outer)
        {
            Ok(sym) => Some(sym),
            Err(err) => {
                self.tr.error_at(name_span, &err.to_string());
                None
            }
        };

        let body_scope = self.tr.scopes.enter_scope(name);
        if let Some(func) = func {
            self.tr.scopes.symbol_mut(func).child = Some(body_scope);
            self.tr.quads.emit(Taco::Enter { func });
        }

        self.expect(TokenKind::LParen)?;
        if !self.check(&TokenKind::RParen) {
            loop {
                let ty = self.parse_type()?;
                let (param, param_span) = self.expect_identifier()?;
                if let Err(err) = self.tr.scopes.declare(&param, ty, body_scope) {
                    self.tr.error_at(param_span, &err.to_string());
                }
                if !self.match_token(&TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let prev_ret = self.current_ret.replace(ret);
        self.expect(TokenKind::LBrace)?;
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            self.statement()?;
        }
        self.expect(TokenKind::RBrace)?;

        // fall off the end of a body: synthesize the missing return
        if !self.tr.quads.last().is_some_and(Taco::is_return) {
            self.tr.quads.emit(Taco::Return { value: None });
        }

        self.current_ret = prev_ret;
        self.tr.scopes.exit_scope();
        Ok(())
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn statement(&mut self) -> TranslateResult<()> {
        self.trace("statement");
        match self.current.kind {
            TokenKind::LBrace => self.block(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Break => self.break_statement(),
            TokenKind::Return => self.return_statement(),
            TokenKind::Void
            | TokenKind::Char
            | TokenKind::Int
            | TokenKind::Real
            | TokenKind::Matrix => {
                let ty = self.parse_type()?;
                let (name, name_span) = self.expect_identifier()?;
                self.declaration(ty, &name, name_span)
            }
            TokenKind::Identifier(_) => {
                let assigns = matches!(self.scanner.peek()?.kind, TokenKind::Assign);
                if assigns {
                    self.assignment()
                } else {
                    self.expression()?;
                    self.expect(TokenKind::Semi)?;
                    Ok(())
                }
            }
            _ => {
                self.expression()?;
                self.expect(TokenKind::Semi)?;
                Ok(())
            }
        }
    }

    fn block(&mut self) -> TranslateResult<()> {
        self.trace("block");
        self.expect(TokenKind::LBrace)?;
        self.tr.scopes.enter_scope("block");
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            self.statement()?;
        }
        self.expect(TokenKind::RBrace)?;
        self.tr.scopes.exit_scope();
        Ok(())
    }

    fn assignment(&mut self) -> TranslateResult<()> {
        self.trace("assignment");
        let (name, name_span) = self.expect_identifier()?;
        self.expect(TokenKind::Assign)?;
        let target = self.resolve(&name, name_span);
        let value = self.expression()?;
        if let Some(dst) = target {
            self.assign_into(dst, value);
            self.tr.scopes.symbol_mut(dst).initialized = true;
        }
        self.expect(TokenKind::Semi)?;
        Ok(())
    }

    /// Store `src` into `dst`, converting between basic types when their
    /// widths differ
    fn assign_into(&mut self, dst: SymbolRef, src: ExprValue) {
        let dst_ty = self.tr.symbol(dst).ty.clone();
        if dst_ty == src.ty {
            self.tr.quads.emit(Taco::Copy {
                dst,
                src: src.place,
            });
        } else if dst_ty.is_basic() && src.ty.is_basic() {
            let converted = self.tr.gen_temp(dst_ty.clone());
            self.tr.quads.emit(Taco::Convert {
                dst: converted,
                src: src.place,
                to: dst_ty,
            });
            self.tr.quads.emit(Taco::Copy {
                dst,
                src: converted,
            });
        } else {
            self.tr.error_at(
                src.span,
                &format!("cannot assign a value of type {} to {}", src.ty, dst_ty),
            );
        }
    }

    fn if_statement(&mut self) -> TranslateResult<()> {
        self.trace("if-statement");
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.condition()?;
        self.expect(TokenKind::RParen)?;

        let jump_false = self.tr.quads.emit(Taco::IfFalse {
            cond,
            target: PENDING,
        });
        self.statement()?;

        if self.match_token(&TokenKind::Else)? {
            let jump_end = self.tr.quads.emit(Taco::Goto { target: PENDING });
            let else_start = self.tr.quads.next_address();
            self.tr.quads.patch(jump_false, else_start);
            self.statement()?;
            let end = self.tr.quads.next_address();
            self.tr.quads.patch(jump_end, end);
        } else {
            let end = self.tr.quads.next_address();
            self.tr.quads.patch(jump_false, end);
        }
        Ok(())
    }

    fn while_statement(&mut self) -> TranslateResult<()> {
        self.trace("while-statement");
        self.expect(TokenKind::While)?;
        let start = self.tr.quads.next_address();
        self.expect(TokenKind::LParen)?;
        let cond = self.condition()?;
        self.expect(TokenKind::RParen)?;

        let jump_false = self.tr.quads.emit(Taco::IfFalse {
            cond,
            target: PENDING,
        });
        self.loop_breaks.push(Vec::new());
        self.statement()?;
        self.tr.quads.emit(Taco::Goto { target: start });

        let exit = self.tr.quads.next_address();
        self.tr.quads.patch(jump_false, exit);
        let breaks = self.loop_breaks.pop().unwrap_or_default();
        self.tr.quads.patch_list(&breaks, exit);
        Ok(())
    }

    fn break_statement(&mut self) -> TranslateResult<()> {
        self.trace("break-statement");
        let token = self.expect(TokenKind::Break)?;
        self.expect(TokenKind::Semi)?;
        if self.loop_breaks.is_empty() {
            self.tr.error_at(token.span, "break outside of a loop");
            return Ok(());
        }
        let addr = self.tr.quads.emit(Taco::Goto { target: PENDING });
        if let Some(chain) = self.loop_breaks.last_mut() {
            chain.push(addr);
        }
        Ok(())
    }

    fn return_statement(&mut self) -> TranslateResult<()> {
        self.trace("return-statement");
        let token = self.expect(TokenKind::Return)?;
        let ret = self.current_ret.clone();
        if ret.is_none() {
            self.tr.error_at(token.span, "return outside of a function");
        }

        if self.match_token(&TokenKind::Semi)? {
            if let Some(expected) = &ret {
                if *expected != DataType::Void {
                    self.tr
                        .error_at(token.span, &format!("missing return value of type {expected}"));
                }
            }
            self.tr.quads.emit(Taco::Return { value: None });
            return Ok(());
        }

        let value = self.expression()?;
        let place = match &ret {
            Some(expected) if *expected != value.ty => {
                if expected.is_basic() && value.ty.is_basic() {
                    self.widen(value.place, &value.ty, expected)
                } else {
                    self.tr.error_at(
                        value.span,
                        &format!("cannot return a value of type {} as {expected}", value.ty),
                    );
                    value.place
                }
            }
            _ => value.place,
        };
        self.tr.quads.emit(Taco::Return { value: Some(place) });
        self.expect(TokenKind::Semi)?;
        Ok(())
    }

    /// Translate a controlling expression and check that it can be tested
    fn condition(&mut self) -> TranslateResult<SymbolRef> {
        let cond = self.expression()?;
        if !cond.ty.is_basic() {
            self.tr.error_at(
                cond.span,
                &format!("condition must be a basic type, found {}", cond.ty),
            );
        }
        Ok(cond.place)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn expression(&mut self) -> TranslateResult<ExprValue> {
        self.equality()
    }

    fn equality(&mut self) -> TranslateResult<ExprValue> {
        let mut lhs = self.relational()?;
        loop {
            let op = match self.current.kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                _ => break,
            };
            self.advance()?;
            let rhs = self.relational()?;
            lhs = self.binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn relational(&mut self) -> TranslateResult<ExprValue> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::LtEq => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::GtEq => BinOp::Ge,
                _ => break,
            };
            self.advance()?;
            let rhs = self.additive()?;
            lhs = self.binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> TranslateResult<ExprValue> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance()?;
            let rhs = self.term()?;
            lhs = self.binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn term(&mut self) -> TranslateResult<ExprValue> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance()?;
            let rhs = self.unary()?;
            lhs = self.binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> TranslateResult<ExprValue> {
        if self.check(&TokenKind::Minus) {
            let token = self.advance()?;
            let operand = self.unary()?;
            let span = token.span.merge(operand.span);
            if !operand.ty.is_basic() {
                self.tr.error_at(
                    span,
                    &format!("cannot negate a value of type {}", operand.ty),
                );
                return Ok(self.poison(span));
            }
            let dst = self.tr.gen_temp(operand.ty.clone());
            self.tr.quads.emit(Taco::Unary {
                op: UnOp::Neg,
                dst,
                src: operand.place,
            });
            return Ok(ExprValue {
                place: dst,
                ty: operand.ty,
                literal: None,
                span,
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> TranslateResult<ExprValue> {
        match self.current.kind.clone() {
            TokenKind::IntLiteral(n) => {
                let token = self.advance()?;
                Ok(self.literal(DataType::Int, InitialValue::Int(n), token.span))
            }
            TokenKind::RealLiteral(x) => {
                let token = self.advance()?;
                Ok(self.literal(DataType::Real, InitialValue::Real(x), token.span))
            }
            TokenKind::CharLiteral(c) => {
                let token = self.advance()?;
                Ok(self.literal(DataType::Char, InitialValue::Char(c), token.span))
            }
            TokenKind::Identifier(name) => {
                let token = self.advance()?;
                if self.check(&TokenKind::LParen) {
                    return self.call(&name, token.span);
                }
                match self.resolve(&name, token.span) {
                    Some(place) => Ok(ExprValue {
                        ty: self.tr.symbol(place).ty.clone(),
                        place,
                        literal: None,
                        span: token.span,
                    }),
                    None => Ok(self.poison(token.span)),
                }
            }
            TokenKind::LParen => {
                self.advance()?;
                let value = self.expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(value)
            }
            other => Err(TranslateError::parser(
                format!("expected an expression, found {other}"),
                self.current.span,
            )),
        }
    }

    /// Materialize a literal as an initialized temporary
    fn literal(&mut self, ty: DataType, value: InitialValue, span: Span) -> ExprValue {
        let place = self.tr.gen_temp(ty.clone());
        self.tr.scopes.symbol_mut(place).set_initial(value);
        ExprValue {
            place,
            ty,
            literal: Some(value),
            span,
        }
    }

    fn call(&mut self, name: &str, span: Span) -> TranslateResult<ExprValue> {
        self.trace("call");
        let callee = self.resolve(name, span);

        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.expression()?);
                if !self.match_token(&TokenKind::Comma)? {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RParen)?;
        let span = span.merge(close.span);

        let Some(func) = callee else {
            return Ok(self.poison(span));
        };
        let ret = match &self.tr.symbol(func).ty {
            DataType::Function { ret } => (**ret).clone(),
            other => {
                let message = format!("'{name}' has type {other} and cannot be called");
                self.tr.error_at(span, &message);
                return Ok(self.poison(span));
            }
        };

        let argc = args.len();
        for arg in args {
            self.tr.quads.emit(Taco::Param { src: arg.place });
        }
        let dst = if ret == DataType::Void {
            None
        } else {
            Some(self.tr.gen_temp(ret.clone()))
        };
        self.tr.quads.emit(Taco::Call {
            dst,
            func,
            args: argc,
        });

        Ok(ExprValue {
            place: dst.unwrap_or(func),
            ty: ret,
            literal: None,
            span,
        })
    }

    /// Emit one binary operation, widening operands to the promoted type
    fn binary(&mut self, op: BinOp, lhs: ExprValue, rhs: ExprValue) -> ExprValue {
        let span = lhs.span.merge(rhs.span);

        // matrix-vs-matrix and matrix-vs-scalar rules live here, not in the
        // lattice
        if lhs.ty.is_matrix() || rhs.ty.is_matrix() {
            return self.matrix_binary(op, lhs, rhs, span);
        }

        let promoted = DataType::promote(&lhs.ty, &rhs.ty);
        if promoted == DataType::Void {
            self.tr.error_at(
                span,
                &format!("invalid operands of types {} and {}", lhs.ty, rhs.ty),
            );
            return self.poison(span);
        }

        let lhs_place = self.widen(lhs.place, &lhs.ty, &promoted);
        let rhs_place = self.widen(rhs.place, &rhs.ty, &promoted);
        let result_ty = if op.is_comparison() {
            DataType::Int
        } else {
            promoted
        };
        let dst = self.tr.gen_temp(result_ty.clone());
        self.tr.quads.emit(Taco::Binary {
            op,
            dst,
            lhs: lhs_place,
            rhs: rhs_place,
        });
        ExprValue {
            place: dst,
            ty: result_ty,
            literal: None,
            span,
        }
    }

    /// Element-wise matrix addition and subtraction of equal shapes; every
    /// other matrix combination is rejected
    fn matrix_binary(&mut self, op: BinOp, lhs: ExprValue, rhs: ExprValue, span: Span) -> ExprValue {
        let elementwise = matches!(op, BinOp::Add | BinOp::Sub);
        if elementwise && lhs.ty == rhs.ty {
            let dst = self.tr.gen_temp(lhs.ty.clone());
            self.tr.quads.emit(Taco::Binary {
                op,
                dst,
                lhs: lhs.place,
                rhs: rhs.place,
            });
            return ExprValue {
                place: dst,
                ty: lhs.ty,
                literal: None,
                span,
            };
        }
        self.tr.error_at(
            span,
            &format!("invalid matrix operands of types {} and {}", lhs.ty, rhs.ty),
        );
        self.poison(span)
    }

    /// Convert `place` to `to` through a fresh temporary when the types
    /// differ
    fn widen(&mut self, place: SymbolRef, from: &DataType, to: &DataType) -> SymbolRef {
        if from == to {
            return place;
        }
        let dst = self.tr.gen_temp(to.clone());
        self.tr.quads.emit(Taco::Convert {
            dst,
            src: place,
            to: to.clone(),
        });
        dst
    }
}
