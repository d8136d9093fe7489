use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use crate::error::Diagnostics;
use crate::syntax::{Expr, ExprId, FunctionExpr, Stmt};
use crate::token::Token;

/// Tracks whether the code currently being walked is inside a function body,
/// and if so what kind — methods and initializers need different `return`
/// and `this` handling than plain functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurrentFunction {
    None,
    Function,
    Method,
    Initializer,
    Lambda,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurrentClass {
    None,
    Class,
    Subclass,
}

/// Static scope analysis: resolves every variable reference to a lexical
/// depth ahead of time so the interpreter never has to walk the
/// `Environment` chain at runtime. The resolved depths are handed back as a
/// side table keyed by `ExprId` rather than stashed on the interpreter
/// directly, keeping the two passes decoupled.
pub struct Resolver<'d> {
    scopes: Vec<HashMap<String, bool>>,
    locals: HashMap<ExprId, usize>,
    current_function: CurrentFunction,
    current_class: CurrentClass,
    loop_depth: usize,
    diagnostics: &'d mut Diagnostics,
}

impl<'d> Resolver<'d> {
    pub fn new(diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            scopes: Vec::new(),
            locals: HashMap::new(),
            current_function: CurrentFunction::None,
            current_class: CurrentClass::None,
            loop_depth: 0,
            diagnostics,
        }
    }

    pub fn resolve(mut self, statements: &[Stmt]) -> HashMap<ExprId, usize> {
        self.resolve_stmts(statements);
        self.locals
    }

    fn resolve_stmts(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    // Declares a variable as "not ready yet" (false) in the innermost scope,
    // catching mistakes like `var a = a + 1;`.
    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                self.diagnostics.error_at(
                    name,
                    "Already a variable with this name in this scope.",
                );
            }
            scope.insert(name.lexeme.clone(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    // Walks outward from the innermost scope; the number of hops to the
    // scope holding the name is the resolved depth. Unresolved means global.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.locals.insert(id, depth);
                return;
            }
        }
    }

    fn resolve_function(&mut self, declaration: &FunctionExpr, kind: CurrentFunction) {
        let enclosing_function = self.current_function;
        let enclosing_loop_depth = mem::take(&mut self.loop_depth);
        self.current_function = kind;

        self.begin_scope();
        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&declaration.body);
        self.end_scope();

        self.current_function = enclosing_function;
        self.loop_depth = enclosing_loop_depth;
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression { expression } => self.resolve_expr(expression),
            Stmt::Print { expression } => self.resolve_expr(expression),
            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(init) = initializer {
                    self.resolve_expr(init);
                }
                self.define(name);
            }
            Stmt::Block { statements } => {
                self.begin_scope();
                self.resolve_stmts(statements);
                self.end_scope();
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_stmt) = else_branch {
                    self.resolve_stmt(else_stmt);
                }
            }
            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.loop_depth += 1;
                self.resolve_stmt(body);
                self.loop_depth -= 1;
            }
            Stmt::Break { keyword } => {
                if self.loop_depth == 0 {
                    self.diagnostics
                        .error_at(keyword, "Can't use 'break' outside of a loop.");
                }
            }
            Stmt::Function { declaration } => {
                if let Some(name) = &declaration.name {
                    self.declare(name);
                    self.define(name);
                }
                self.resolve_function(declaration, CurrentFunction::Function);
            }
            Stmt::Return { keyword, value } => {
                if self.current_function == CurrentFunction::None {
                    self.diagnostics
                        .error_at(keyword, "Can't return from top-level code.");
                }
                if let Some(value) = value {
                    if self.current_function == CurrentFunction::Initializer {
                        self.diagnostics
                            .error_at(keyword, "Can't return a value from an initializer.");
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass, methods),
        }
    }

    fn resolve_class(
        &mut self,
        name: &Token,
        superclass: &Option<Expr>,
        methods: &[Rc<FunctionExpr>],
    ) {
        let enclosing_class = self.current_class;
        self.current_class = CurrentClass::Class;

        self.declare(name);
        self.define(name);

        if let Some(superclass_expr) = superclass {
            if let Expr::Variable {
                name: super_name, ..
            } = superclass_expr
            {
                if super_name.lexeme == name.lexeme {
                    self.diagnostics
                        .error_at(super_name, "A class can't inherit from itself.");
                }
            }
            self.current_class = CurrentClass::Subclass;
            self.resolve_expr(superclass_expr);

            self.begin_scope();
            self.scopes
                .last_mut()
                .expect("scope just pushed")
                .insert("super".to_owned(), true);
        }

        self.begin_scope();
        self.scopes
            .last_mut()
            .expect("scope just pushed")
            .insert("this".to_owned(), true);

        for method in methods {
            let kind = match &method.name {
                Some(name) if name.lexeme == "init" => CurrentFunction::Initializer,
                _ => CurrentFunction::Method,
            };
            self.resolve_function(method, kind);
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal { .. } => {}
            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if let Some(false) = scope.get(&name.lexeme).copied() {
                        self.diagnostics
                            .error_at(name, "Can't read local variable in its own initializer.");
                    }
                }
                self.resolve_local(*id, name);
            }
            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }
            Expr::Unary { right, .. } => self.resolve_expr(right),
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Grouping { expression } => self.resolve_expr(expression),
            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for argument in arguments {
                    self.resolve_expr(argument);
                }
            }
            Expr::Get { object, .. } => self.resolve_expr(object),
            Expr::Set {
                object,
                value,
                ..
            } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }
            Expr::This { id, keyword } => {
                if self.current_class == CurrentClass::None {
                    self.diagnostics
                        .error_at(keyword, "Can't use 'this' outside of a class.");
                } else {
                    self.resolve_local(*id, keyword);
                }
            }
            Expr::Super { id, keyword, .. } => match self.current_class {
                CurrentClass::None => self
                    .diagnostics
                    .error_at(keyword, "Can't use 'super' outside of a class."),
                CurrentClass::Class => self
                    .diagnostics
                    .error_at(keyword, "Can't use 'super' in a class with no superclass."),
                CurrentClass::Subclass => self.resolve_local(*id, keyword),
            },
            Expr::Function { declaration } => {
                self.resolve_function(declaration, CurrentFunction::Lambda);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn resolve(source: &str) -> (HashMap<ExprId, usize>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(source).scan_tokens(&mut diagnostics);
        let statements = Parser::new(tokens).parse(&mut diagnostics);
        let locals = Resolver::new(&mut diagnostics).resolve(&statements);
        (locals, diagnostics)
    }

    #[test]
    fn break_outside_loop_is_an_error() {
        let (_, diagnostics) = resolve("break;");
        assert!(diagnostics.had_error());
    }

    #[test]
    fn break_inside_loop_is_fine() {
        let (_, diagnostics) = resolve("while (true) { break; }");
        assert!(!diagnostics.had_error());
    }

    #[test]
    fn break_inside_nested_function_inside_loop_is_an_error() {
        let (_, diagnostics) =
            resolve("while (true) { fun f() { break; } f(); }");
        assert!(diagnostics.had_error());
    }

    #[test]
    fn this_outside_class_is_an_error() {
        let (_, diagnostics) = resolve("print this;");
        assert!(diagnostics.had_error());
    }

    #[test]
    fn return_from_top_level_is_an_error() {
        let (_, diagnostics) = resolve("return 1;");
        assert!(diagnostics.had_error());
    }

    #[test]
    fn local_shadowing_resolves_to_innermost_scope() {
        let (locals, diagnostics) =
            resolve("var a = 1; { var a = 2; print a; }");
        assert!(!diagnostics.had_error());
        assert!(locals.values().any(|&depth| depth == 0));
    }

    #[test]
    fn initializer_cannot_return_a_value() {
        let (_, diagnostics) = resolve("class A { init() { return 1; } }");
        assert!(diagnostics.had_error());
    }

    #[test]
    fn class_cannot_inherit_from_itself() {
        let (_, diagnostics) = resolve("class A < A {}");
        assert!(diagnostics.had_error());
    }
}
