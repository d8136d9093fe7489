use std::rc::Rc;

use crate::error::{Diagnostics, LoxError};
use crate::syntax::{Expr, ExprId, FunctionExpr, FunctionKind, LiteralValue, Stmt};
use crate::token::{Token, TokenType};

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    next_id: ExprId,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_start_id(tokens, 0)
    }

    // Lets a multi-file run keep handing out fresh `ExprId`s instead of every
    // file's parser starting back at 0 and colliding with the resolver's
    // locals table from a file parsed earlier in the same run.
    pub fn with_start_id(tokens: Vec<Token>, next_id: ExprId) -> Self {
        Self {
            tokens,
            current: 0,
            next_id,
        }
    }

    pub fn next_id_counter(&self) -> ExprId {
        self.next_id
    }

    fn next_id(&mut self) -> ExprId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // program        → declaration* EOF ;
    pub fn parse(&mut self, diagnostics: &mut Diagnostics) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(statement) = self.declaration(diagnostics) {
                statements.push(statement);
            }
        }
        statements
    }

    // declaration    → classDecl | funDecl | varDecl | statement ;
    fn declaration(&mut self, diagnostics: &mut Diagnostics) -> Option<Stmt> {
        let result = if self.advance_if_matches(&[TokenType::Var]) {
            self.var_declaration(diagnostics)
        } else if self.advance_if_matches(&[TokenType::Class]) {
            self.class_declaration(diagnostics)
        } else if self.advance_if_matches(&[TokenType::Fun]) {
            self.function_declaration(diagnostics)
        } else {
            self.statement(diagnostics)
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(LoxError::Parse) => {
                self.synchronize();
                None
            }
            Err(_) => unreachable!("parser only ever produces Parse errors"),
        }
    }

    // classDecl      → "class" IDENTIFIER ( "<" IDENTIFIER )? "{" function* "}" ;
    fn class_declaration(&mut self, diagnostics: &mut Diagnostics) -> Result<Stmt, LoxError> {
        let name = self.consume(TokenType::Identifier, "Expect class name.", diagnostics)?;

        let superclass = if self.advance_if_matches(&[TokenType::Less]) {
            self.consume(TokenType::Identifier, "Expect superclass name.", diagnostics)?;
            let id = self.next_id();
            Some(Expr::Variable {
                id,
                name: self.previous().clone(),
            })
        } else {
            None
        };

        self.consume(TokenType::LeftBrace, "Expect '{' before class body.", diagnostics)?;

        let mut methods = Vec::new();
        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            methods.push(self.function("method", diagnostics)?);
        }

        self.consume(TokenType::RightBrace, "Expect '}' after class body.", diagnostics)?;

        Ok(Stmt::Class {
            name,
            superclass,
            methods,
        })
    }

    // funDecl        → "fun" function ;
    fn function_declaration(&mut self, diagnostics: &mut Diagnostics) -> Result<Stmt, LoxError> {
        let declaration = self.function("function", diagnostics)?;
        Ok(Stmt::Function { declaration })
    }

    // function       → IDENTIFIER "(" parameters? ")" block ;
    // parameters     → IDENTIFIER ( "," IDENTIFIER )* ;
    // shared by named function declarations and methods.
    fn function(&mut self, kind_label: &str, diagnostics: &mut Diagnostics) -> Result<Rc<FunctionExpr>, LoxError> {
        let name = self.consume(
            TokenType::Identifier,
            &format!("Expect {kind_label} name."),
            diagnostics,
        )?;

        let (params, body) = self.function_tail(kind_label, diagnostics)?;

        let kind = if kind_label == "method" {
            if name.lexeme == "init" {
                FunctionKind::Init
            } else {
                FunctionKind::Method
            }
        } else {
            FunctionKind::Function
        };

        Ok(Rc::new(FunctionExpr {
            name: Some(name),
            params,
            body,
            kind,
        }))
    }

    // Anonymous `fun (...) { ... }` lambda expression.
    fn lambda(&mut self, diagnostics: &mut Diagnostics) -> Result<Expr, LoxError> {
        let (params, body) = self.function_tail("function", diagnostics)?;
        Ok(Expr::Function {
            declaration: Rc::new(FunctionExpr {
                name: None,
                params,
                body,
                kind: FunctionKind::Lambda,
            }),
        })
    }

    fn function_tail(
        &mut self,
        kind_label: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<(Vec<Token>, Vec<Stmt>), LoxError> {
        self.consume(
            TokenType::LeftParen,
            &format!("Expect '(' after {kind_label} name."),
            diagnostics,
        )?;

        let mut params = Vec::new();
        if !self.check(TokenType::RightParen) {
            loop {
                if params.len() >= 255 {
                    self.error(self.peek().clone(), "Can't have more than 255 parameters.", diagnostics);
                }
                params.push(self.consume(TokenType::Identifier, "Expect parameter name.", diagnostics)?);
                if !self.advance_if_matches(&[TokenType::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenType::RightParen, "Expect ')' after parameters.", diagnostics)?;

        self.consume(
            TokenType::LeftBrace,
            &format!("Expect '{{' before {kind_label} body."),
            diagnostics,
        )?;
        let body = self.block(diagnostics)?;

        Ok((params, body))
    }

    // statement → exprStmt | printStmt | ifStmt | block | returnStmt | whileStmt | forStmt | breakStmt ;
    fn statement(&mut self, diagnostics: &mut Diagnostics) -> Result<Stmt, LoxError> {
        if self.advance_if_matches(&[TokenType::For]) {
            self.for_statement(diagnostics)
        } else if self.advance_if_matches(&[TokenType::If]) {
            self.if_statement(diagnostics)
        } else if self.advance_if_matches(&[TokenType::Print]) {
            self.print_statement(diagnostics)
        } else if self.advance_if_matches(&[TokenType::Return]) {
            self.return_statement(diagnostics)
        } else if self.advance_if_matches(&[TokenType::While]) {
            self.while_statement(diagnostics)
        } else if self.advance_if_matches(&[TokenType::Break]) {
            self.break_statement(diagnostics)
        } else if self.advance_if_matches(&[TokenType::LeftBrace]) {
            Ok(Stmt::Block {
                statements: self.block(diagnostics)?,
            })
        } else {
            self.expression_statement(diagnostics)
        }
    }

    // breakStmt      → "break" ";" ;
    fn break_statement(&mut self, diagnostics: &mut Diagnostics) -> Result<Stmt, LoxError> {
        let keyword = self.previous().clone();
        self.consume(TokenType::Semicolon, "Expect ';' after 'break'.", diagnostics)?;
        Ok(Stmt::Break { keyword })
    }

    // returnStmt     → "return" expression? ";" ;
    fn return_statement(&mut self, diagnostics: &mut Diagnostics) -> Result<Stmt, LoxError> {
        let keyword = self.previous().clone();
        let value = if !self.check(TokenType::Semicolon) {
            Some(self.expression(diagnostics)?)
        } else {
            None
        };
        self.consume(TokenType::Semicolon, "Expect ';' after return value.", diagnostics)?;
        Ok(Stmt::Return { keyword, value })
    }

    // ifStmt         → "if" "(" expression ")" statement ( "else" statement )? ;
    fn if_statement(&mut self, diagnostics: &mut Diagnostics) -> Result<Stmt, LoxError> {
        self.consume(TokenType::LeftParen, "Expect '(' after 'if'.", diagnostics)?;
        let condition = self.expression(diagnostics)?;
        self.consume(TokenType::RightParen, "Expect ')' after if condition.", diagnostics)?;

        let then_branch = Box::new(self.statement(diagnostics)?);
        let else_branch = if self.advance_if_matches(&[TokenType::Else]) {
            Some(Box::new(self.statement(diagnostics)?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    // block          → "{" declaration* "}" ;
    fn block(&mut self, diagnostics: &mut Diagnostics) -> Result<Vec<Stmt>, LoxError> {
        let mut statements = Vec::new();
        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            if let Some(statement) = self.declaration(diagnostics) {
                statements.push(statement);
            }
        }
        self.consume(TokenType::RightBrace, "Expect '}' after block.", diagnostics)?;
        Ok(statements)
    }

    // whileStmt      → "while" "(" expression ")" statement ;
    fn while_statement(&mut self, diagnostics: &mut Diagnostics) -> Result<Stmt, LoxError> {
        self.consume(TokenType::LeftParen, "Expect '(' after 'while'.", diagnostics)?;
        let condition = self.expression(diagnostics)?;
        self.consume(TokenType::RightParen, "Expect ')' after condition.", diagnostics)?;
        let body = self.statement(diagnostics)?;

        Ok(Stmt::While {
            condition,
            body: Box::new(body),
        })
    }

    // forStmt        → "for" "(" ( varDecl | exprStmt | ";" ) expression? ";" expression? ")" statement ;
    // Desugared into a Block containing the initializer followed by a While.
    fn for_statement(&mut self, diagnostics: &mut Diagnostics) -> Result<Stmt, LoxError> {
        self.consume(TokenType::LeftParen, "Expect '(' after 'for'.", diagnostics)?;

        let initializer = if self.advance_if_matches(&[TokenType::Semicolon]) {
            None
        } else if self.advance_if_matches(&[TokenType::Var]) {
            Some(self.var_declaration(diagnostics)?)
        } else {
            Some(self.expression_statement(diagnostics)?)
        };

        let condition = if !self.check(TokenType::Semicolon) {
            Some(self.expression(diagnostics)?)
        } else {
            None
        };
        self.consume(TokenType::Semicolon, "Expect ';' after loop condition.", diagnostics)?;

        let increment = if !self.check(TokenType::RightParen) {
            Some(self.expression(diagnostics)?)
        } else {
            None
        };
        self.consume(TokenType::RightParen, "Expect ')' after for clauses.", diagnostics)?;

        let mut body = self.statement(diagnostics)?;

        if let Some(incr) = increment {
            body = Stmt::Block {
                statements: vec![body, Stmt::Expression { expression: incr }],
            };
        }

        body = Stmt::While {
            condition: condition.unwrap_or(Expr::Literal {
                value: LiteralValue::Boolean(true),
            }),
            body: Box::new(body),
        };

        if let Some(init) = initializer {
            body = Stmt::Block {
                statements: vec![init, body],
            };
        }

        Ok(body)
    }

    // varDecl        → "var" IDENTIFIER ( "=" expression )? ";" ;
    fn var_declaration(&mut self, diagnostics: &mut Diagnostics) -> Result<Stmt, LoxError> {
        let name = self.consume(TokenType::Identifier, "Expect variable name.", diagnostics)?;
        let initializer = if self.advance_if_matches(&[TokenType::Equal]) {
            Some(self.expression(diagnostics)?)
        } else {
            None
        };
        self.consume(
            TokenType::Semicolon,
            "Expect ';' after variable declaration.",
            diagnostics,
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    // printStmt      → "print" expression ";" ;
    fn print_statement(&mut self, diagnostics: &mut Diagnostics) -> Result<Stmt, LoxError> {
        let value = self.expression(diagnostics)?;
        self.consume(TokenType::Semicolon, "Expect ';' after value.", diagnostics)?;
        Ok(Stmt::Print { expression: value })
    }

    // exprStmt       → expression ";" ;
    fn expression_statement(&mut self, diagnostics: &mut Diagnostics) -> Result<Stmt, LoxError> {
        let value = self.expression(diagnostics)?;
        self.consume(TokenType::Semicolon, "Expect ';' after expression.", diagnostics)?;
        Ok(Stmt::Expression { expression: value })
    }

    // expression     → assignment ;
    fn expression(&mut self, diagnostics: &mut Diagnostics) -> Result<Expr, LoxError> {
        self.assignment(diagnostics)
    }

    // assignment     → ( call "." )? IDENTIFIER "=" assignment | logic_or ;
    // Parses the LHS as a normal expression first, then reinterprets it as an
    // assignment target if `=` follows — every valid target is also valid
    // expression syntax, so no lookahead is needed.
    fn assignment(&mut self, diagnostics: &mut Diagnostics) -> Result<Expr, LoxError> {
        let expr = self.logic_or(diagnostics)?;

        if self.advance_if_matches(&[TokenType::Equal]) {
            let equals = self.previous().clone();
            let value = Box::new(self.assignment(diagnostics)?);

            match expr {
                Expr::Variable { name, .. } => {
                    let id = self.next_id();
                    return Ok(Expr::Assign { id, name, value });
                }
                Expr::Get { object, name } => {
                    return Ok(Expr::Set {
                        object,
                        name,
                        value,
                    });
                }
                _ => {
                    // The parser isn't in a confused state, so we report and
                    // keep going rather than entering panic-mode recovery.
                    diagnostics.error_at(&equals, "Invalid assignment target.");
                }
            }
        }

        Ok(expr)
    }

    // logic_or       → logic_and ( "or" logic_and )* ;
    fn logic_or(&mut self, diagnostics: &mut Diagnostics) -> Result<Expr, LoxError> {
        let mut expr = self.logic_and(diagnostics)?;
        while self.advance_if_matches(&[TokenType::Or]) {
            let operator = self.previous().clone();
            let right = self.logic_and(diagnostics)?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    // logic_and      → equality ( "and" equality )* ;
    fn logic_and(&mut self, diagnostics: &mut Diagnostics) -> Result<Expr, LoxError> {
        let mut expr = self.equality(diagnostics)?;
        while self.advance_if_matches(&[TokenType::And]) {
            let operator = self.previous().clone();
            let right = self.equality(diagnostics)?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    // equality       → comparison ( ( "!=" | "==" ) comparison )* ;
    fn equality(&mut self, diagnostics: &mut Diagnostics) -> Result<Expr, LoxError> {
        let mut expr = self.comparison(diagnostics)?;
        while self.advance_if_matches(&[TokenType::BangEqual, TokenType::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison(diagnostics)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    // comparison     → addition ( ( ">" | ">=" | "<" | "<=" ) addition )* ;
    fn comparison(&mut self, diagnostics: &mut Diagnostics) -> Result<Expr, LoxError> {
        let mut expr = self.addition(diagnostics)?;
        while self.advance_if_matches(&[
            TokenType::GreaterEqual,
            TokenType::Greater,
            TokenType::LessEqual,
            TokenType::Less,
        ]) {
            let operator = self.previous().clone();
            let right = self.addition(diagnostics)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    // addition       → multiplication ( ( "-" | "+" ) multiplication )* ;
    fn addition(&mut self, diagnostics: &mut Diagnostics) -> Result<Expr, LoxError> {
        let mut expr = self.multiplication(diagnostics)?;
        while self.advance_if_matches(&[TokenType::Minus, TokenType::Plus]) {
            let operator = self.previous().clone();
            let right = self.multiplication(diagnostics)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    // multiplication → unary ( ( "/" | "*" ) unary )* ;
    fn multiplication(&mut self, diagnostics: &mut Diagnostics) -> Result<Expr, LoxError> {
        let mut expr = self.unary(diagnostics)?;
        while self.advance_if_matches(&[TokenType::Slash, TokenType::Star]) {
            let operator = self.previous().clone();
            let right = self.unary(diagnostics)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    // unary          → ( "!" | "-" ) unary | call ;
    fn unary(&mut self, diagnostics: &mut Diagnostics) -> Result<Expr, LoxError> {
        if self.advance_if_matches(&[TokenType::Bang, TokenType::Minus]) {
            let operator = self.previous().clone();
            let right = self.unary(diagnostics)?;
            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }
        self.call(diagnostics)
    }

    // call           → primary ( "(" arguments? ")" | "." IDENTIFIER )* ;
    fn call(&mut self, diagnostics: &mut Diagnostics) -> Result<Expr, LoxError> {
        let mut expr = self.primary(diagnostics)?;

        loop {
            if self.advance_if_matches(&[TokenType::LeftParen]) {
                expr = self.finish_call(expr, diagnostics)?;
            } else if self.advance_if_matches(&[TokenType::Dot]) {
                let name = self.consume(TokenType::Identifier, "Expect property name after '.'.", diagnostics)?;
                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    // arguments      → expression ( "," expression )* ;
    fn finish_call(&mut self, callee: Expr, diagnostics: &mut Diagnostics) -> Result<Expr, LoxError> {
        let mut arguments = Vec::new();
        if !self.check(TokenType::RightParen) {
            loop {
                if arguments.len() >= 255 {
                    self.error(self.peek().clone(), "Can't have more than 255 arguments.", diagnostics);
                }
                arguments.push(self.expression(diagnostics)?);
                if !self.advance_if_matches(&[TokenType::Comma]) {
                    break;
                }
            }
        }

        let paren = self.consume(TokenType::RightParen, "Expect ')' after arguments.", diagnostics)?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    // primary        → NUMBER | STRING | "true" | "false" | "nil"
    //                | "(" expression ")" | IDENTIFIER | "this"
    //                | "super" "." IDENTIFIER | "fun" lambda ;
    fn primary(&mut self, diagnostics: &mut Diagnostics) -> Result<Expr, LoxError> {
        if self.advance_if_matches(&[TokenType::False]) {
            return Ok(Expr::Literal {
                value: LiteralValue::Boolean(false),
            });
        }
        if self.advance_if_matches(&[TokenType::True]) {
            return Ok(Expr::Literal {
                value: LiteralValue::Boolean(true),
            });
        }
        if self.advance_if_matches(&[TokenType::Nil]) {
            return Ok(Expr::Literal {
                value: LiteralValue::Nil,
            });
        }
        if let TokenType::Number { literal } = &self.peek().token_type {
            let literal = *literal;
            self.advance();
            return Ok(Expr::Literal {
                value: LiteralValue::Number(literal),
            });
        }
        if let TokenType::String { literal } = &self.peek().token_type {
            let literal = literal.clone();
            self.advance();
            return Ok(Expr::Literal {
                value: LiteralValue::String(literal),
            });
        }
        if self.advance_if_matches(&[TokenType::Super]) {
            let keyword = self.previous().clone();
            self.consume(TokenType::Dot, "Expect '.' after 'super'.", diagnostics)?;
            let method = self.consume(TokenType::Identifier, "Expect superclass method name.", diagnostics)?;
            let id = self.next_id();
            return Ok(Expr::Super { id, keyword, method });
        }
        if self.advance_if_matches(&[TokenType::This]) {
            let id = self.next_id();
            return Ok(Expr::This {
                id,
                keyword: self.previous().clone(),
            });
        }
        if self.advance_if_matches(&[TokenType::Identifier]) {
            let id = self.next_id();
            return Ok(Expr::Variable {
                id,
                name: self.previous().clone(),
            });
        }
        if self.advance_if_matches(&[TokenType::LeftParen]) {
            let expr = self.expression(diagnostics)?;
            self.consume(TokenType::RightParen, "Expect ')' after expression.", diagnostics)?;
            return Ok(Expr::Grouping {
                expression: Box::new(expr),
            });
        }
        if self.advance_if_matches(&[TokenType::Fun]) {
            return self.lambda(diagnostics);
        }

        Err(self.error(self.peek().clone(), "Expect expression.", diagnostics))
    }

    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().token_type == TokenType::Semicolon {
                return;
            }

            match self.peek().token_type {
                TokenType::Class
                | TokenType::Fun
                | TokenType::Var
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn advance_if_matches(&mut self, types: &[TokenType]) -> bool {
        if types.iter().any(|t| self.check(t.clone())) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, token_type: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.peek().token_type == token_type
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.current)
            .expect("parser never advances past EOF")
    }

    fn previous(&self) -> &Token {
        self.tokens
            .get(self.current - 1)
            .expect("previous called before any token was consumed")
    }

    fn consume(&mut self, token_type: TokenType, msg: &str, diagnostics: &mut Diagnostics) -> Result<Token, LoxError> {
        if self.check(token_type) {
            Ok(self.advance().clone())
        } else {
            Err(self.error(self.peek().clone(), msg, diagnostics))
        }
    }

    fn error(&self, token: Token, msg: &str, diagnostics: &mut Diagnostics) -> LoxError {
        diagnostics.error_at(&token, msg);
        LoxError::Parse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;

    fn parse(source: &str) -> (Vec<Stmt>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(source).scan_tokens(&mut diagnostics);
        let statements = Parser::new(tokens).parse(&mut diagnostics);
        (statements, diagnostics)
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let (statements, diagnostics) = parse("1 + 2 * 3;");
        assert!(!diagnostics.had_error());
        assert_eq!(statements.len(), 1);
        match &statements[0] {
            Stmt::Expression {
                expression: Expr::Binary { operator, .. },
            } => assert_eq!(operator.token_type, TokenType::Plus),
            other => panic!("expected a binary expression statement, got {other:?}"),
        }
    }

    #[test]
    fn for_loop_desugars_to_block_and_while() {
        let (statements, diagnostics) = parse("for (var i = 0; i < 3; i = i + 1) print i;");
        assert!(!diagnostics.had_error());
        assert!(matches!(statements[0], Stmt::Block { .. }));
    }

    #[test]
    fn missing_semicolon_reports_error_and_recovers() {
        let (statements, diagnostics) = parse("var a = 1\nvar b = 2;");
        assert!(diagnostics.had_error());
        // recovery should still pick up the second, well-formed declaration
        assert!(statements
            .iter()
            .any(|s| matches!(s, Stmt::Var { name, .. } if name.lexeme == "b")));
    }

    #[test]
    fn invalid_assignment_target_reports_but_does_not_abort_parse() {
        let (statements, diagnostics) = parse("1 + 2 = 3;");
        assert!(diagnostics.had_error());
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn break_outside_loop_parses_fine_syntactically() {
        let (statements, diagnostics) = parse("break;");
        assert!(!diagnostics.had_error());
        assert!(matches!(statements[0], Stmt::Break { .. }));
    }

    #[test]
    fn class_with_superclass_and_methods_parses() {
        let (statements, diagnostics) =
            parse("class A {} class B < A { speak() { print \"hi\"; } }");
        assert!(!diagnostics.had_error());
        match &statements[1] {
            Stmt::Class {
                superclass, methods, ..
            } => {
                assert!(superclass.is_some());
                assert_eq!(methods.len(), 1);
            }
            other => panic!("expected class statement, got {other:?}"),
        }
    }

    #[test]
    fn lambda_expression_parses() {
        let (statements, diagnostics) = parse("var f = fun (a) { return a; };");
        assert!(!diagnostics.had_error());
        match &statements[0] {
            Stmt::Var {
                initializer: Some(Expr::Function { .. }),
                ..
            } => {}
            other => panic!("expected a lambda initializer, got {other:?}"),
        }
    }
}
