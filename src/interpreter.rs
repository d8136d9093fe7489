use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::class::{LoxClass, LoxInstance};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::function::LoxFunction;
use crate::native;
use crate::object::Object;
use crate::syntax::{Expr, ExprId, FunctionExpr, FunctionKind, LiteralValue, Stmt};
use crate::token::{Token, TokenType};

/// The outcome of executing a statement. Control flow that the book's
/// ancestors model as a thrown/caught exception (`Return`, `Break`) is
/// represented here as an ordinary return value instead, so unwinding a
/// loop or a call is just a `match`, not a panic.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Normal,
    Return(Object),
    Break,
}

pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));
        for (name, native_fn) in native::globals() {
            globals
                .borrow_mut()
                .define(name.to_string(), Object::Native(native_fn));
        }

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
        }
    }

    // Merges rather than replaces: in a multi-file run every file is resolved
    // separately but `ExprId`s are unique across the whole run, so an earlier
    // file's entries (e.g. a closure's body, still reachable from a variable
    // a later file calls) must survive a later file's resolve pass.
    pub fn resolve(&mut self, locals: HashMap<ExprId, usize>) {
        self.locals.extend(locals);
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<Signal, RuntimeError> {
        match stmt {
            Stmt::Expression { expression } => {
                self.evaluate(expression)?;
                Ok(Signal::Normal)
            }
            Stmt::Print { expression } => {
                let value = self.evaluate(expression)?;
                println!("{}", self.stringify(&value));
                Ok(Signal::Normal)
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Object::Nil,
                };
                self.environment
                    .borrow_mut()
                    .define(name.lexeme.clone(), value);
                Ok(Signal::Normal)
            }
            Stmt::Block { statements } => {
                let scope = Rc::new(RefCell::new(Environment::from(&self.environment)));
                self.execute_block(statements, scope)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Signal::Normal)
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Signal::Break => break,
                        Signal::Normal => {}
                        signal @ Signal::Return(_) => return Ok(signal),
                    }
                }
                Ok(Signal::Normal)
            }
            Stmt::Break { .. } => Ok(Signal::Break),
            Stmt::Function { declaration } => {
                let function = LoxFunction::new(Rc::clone(declaration), Rc::clone(&self.environment));
                self.environment.borrow_mut().define(
                    declaration
                        .name
                        .as_ref()
                        .expect("a function statement always names its function")
                        .lexeme
                        .clone(),
                    Object::Function(Rc::new(function)),
                );
                Ok(Signal::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Object::Nil,
                };
                Ok(Signal::Return(value))
            }
            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass, methods),
        }
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: &Option<Expr>,
        methods: &[Rc<FunctionExpr>],
    ) -> Result<Signal, RuntimeError> {
        let superclass_value = match superclass {
            Some(expr) => {
                let value = self.evaluate(expr)?;
                match value {
                    Object::Class(class) => Some(class),
                    _ => {
                        let token = match expr {
                            Expr::Variable { name, .. } => name,
                            _ => name,
                        }
                        .clone();
                        return Err(RuntimeError::new(token, "Superclass must be a class."));
                    }
                }
            }
            None => None,
        };

        self.environment
            .borrow_mut()
            .define(name.lexeme.clone(), Object::Nil);

        let method_env = if let Some(superclass_value) = &superclass_value {
            let env = Rc::new(RefCell::new(Environment::from(&self.environment)));
            env.borrow_mut()
                .define("super".to_string(), Object::Class(Rc::clone(superclass_value)));
            env
        } else {
            Rc::clone(&self.environment)
        };

        let mut class_methods = HashMap::new();
        for method in methods {
            let function = if matches!(method.kind, FunctionKind::Init) {
                LoxFunction::new_initializer(Rc::clone(method), Rc::clone(&method_env))
            } else {
                LoxFunction::new(Rc::clone(method), Rc::clone(&method_env))
            };
            class_methods.insert(
                method
                    .name
                    .as_ref()
                    .expect("methods always have a name")
                    .lexeme
                    .clone(),
                Rc::new(function),
            );
        }

        let class = Rc::new(LoxClass::new(
            name.lexeme.clone(),
            superclass_value,
            class_methods,
        ));

        self.environment
            .borrow_mut()
            .assign(name, Object::Class(class))?;

        Ok(Signal::Normal)
    }

    /// Runs `statements` in `environment`, restoring the caller's environment
    /// on every exit path — normal completion, an early `Signal`, or an error.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<Signal, RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut result = Ok(Signal::Normal);
        for statement in statements {
            match self.execute(statement) {
                Ok(Signal::Normal) => continue,
                Ok(signal) => {
                    result = Ok(signal);
                    break;
                }
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }

        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        match expr {
            Expr::Literal { value } => Ok(Self::literal(value)),
            Expr::Grouping { expression } => self.evaluate(expression),
            Expr::Variable { id, name } => self.look_up_variable(*id, name),
            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                match self.locals.get(id) {
                    Some(&depth) => {
                        Environment::assign_at(&self.environment, depth, name, value.clone());
                    }
                    None => {
                        self.globals.borrow_mut().assign(name, value.clone())?;
                    }
                }
                Ok(value)
            }
            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),
            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),
            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right),
            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_call(callee, paren, arguments),
            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;
                match object {
                    Object::Instance(instance) => instance.get(name),
                    other => Err(RuntimeError::new(
                        name.clone(),
                        format!("Only instances have properties, got {}.", other.type_name()),
                    )),
                }
            }
            Expr::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(object)?;
                match object {
                    Object::Instance(instance) => {
                        let value = self.evaluate(value)?;
                        instance.set(name, value.clone());
                        Ok(value)
                    }
                    other => Err(RuntimeError::new(
                        name.clone(),
                        format!("Only instances have fields, got {}.", other.type_name()),
                    )),
                }
            }
            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),
            Expr::Super { id, keyword, method } => self.evaluate_super(*id, keyword, method),
            Expr::Function { declaration } => Ok(Object::Function(Rc::new(LoxFunction::new(
                Rc::clone(declaration),
                Rc::clone(&self.environment),
            )))),
        }
    }

    fn literal(value: &LiteralValue) -> Object {
        match value {
            LiteralValue::Number(n) => Object::Number(*n),
            LiteralValue::String(s) => Object::String(s.clone()),
            LiteralValue::Boolean(b) => Object::Boolean(*b),
            LiteralValue::Nil => Object::Nil,
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Object, RuntimeError> {
        match self.locals.get(&id) {
            Some(&depth) => Ok(Environment::get_at(&self.environment, depth, name)),
            None => self.globals.borrow().get(name),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Object, RuntimeError> {
        let right = self.evaluate(right)?;
        match operator.token_type {
            TokenType::Minus => match right {
                Object::Number(n) => Ok(Object::Number(-n)),
                _ => Self::number_operand_error(operator),
            },
            TokenType::Bang => Ok(Object::Boolean(!right.is_truthy())),
            _ => unreachable!("parser never produces another unary operator"),
        }
    }

    fn evaluate_logical(
        &mut self,
        left: &Expr,
        operator: &Token,
        right: &Expr,
    ) -> Result<Object, RuntimeError> {
        let left = self.evaluate(left)?;
        match operator.token_type {
            TokenType::Or => {
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            TokenType::And => {
                if !left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            _ => unreachable!("parser never produces another logical operator"),
        }
    }

    fn evaluate_binary(
        &mut self,
        left: &Expr,
        operator: &Token,
        right: &Expr,
    ) -> Result<Object, RuntimeError> {
        let l = self.evaluate(left)?;
        let r = self.evaluate(right)?;

        match operator.token_type {
            TokenType::Minus => Self::numeric(operator, l, r, |a, b| a - b),
            TokenType::Slash => match (l, r) {
                (Object::Number(_), Object::Number(b)) if b == 0.0 => {
                    Err(RuntimeError::new(operator.clone(), "Division by zero."))
                }
                (Object::Number(a), Object::Number(b)) => Ok(Object::Number(a / b)),
                _ => Self::number_operand_error(operator),
            },
            TokenType::Star => Self::numeric(operator, l, r, |a, b| a * b),
            TokenType::Plus => match (l, r) {
                (Object::Number(a), Object::Number(b)) => Ok(Object::Number(a + b)),
                (Object::String(a), Object::String(b)) => Ok(Object::String(a + &b)),
                _ => Err(RuntimeError::new(
                    operator.clone(),
                    "Operands must be two numbers or two strings.",
                )),
            },
            TokenType::Greater => Self::compare(operator, l, r, |a, b| a > b),
            TokenType::GreaterEqual => Self::compare(operator, l, r, |a, b| a >= b),
            TokenType::Less => Self::compare(operator, l, r, |a, b| a < b),
            TokenType::LessEqual => Self::compare(operator, l, r, |a, b| a <= b),
            TokenType::BangEqual => Ok(Object::Boolean(l != r)),
            TokenType::EqualEqual => Ok(Object::Boolean(l == r)),
            _ => unreachable!("parser never produces another binary operator"),
        }
    }

    fn numeric(
        operator: &Token,
        l: Object,
        r: Object,
        op: impl Fn(f64, f64) -> f64,
    ) -> Result<Object, RuntimeError> {
        match (l, r) {
            (Object::Number(a), Object::Number(b)) => Ok(Object::Number(op(a, b))),
            _ => Self::number_operand_error(operator),
        }
    }

    fn compare(
        operator: &Token,
        l: Object,
        r: Object,
        op: impl Fn(f64, f64) -> bool,
    ) -> Result<Object, RuntimeError> {
        match (l, r) {
            (Object::Number(a), Object::Number(b)) => Ok(Object::Boolean(op(a, b))),
            _ => Self::number_operand_error(operator),
        }
    }

    fn number_operand_error<T>(operator: &Token) -> Result<T, RuntimeError> {
        Err(RuntimeError::new(
            operator.clone(),
            "Operands must be numbers.",
        ))
    }

    fn evaluate_call(
        &mut self,
        callee: &Expr,
        paren: &Token,
        arguments: &[Expr],
    ) -> Result<Object, RuntimeError> {
        let callee = self.evaluate(callee)?;

        // Callability is checked before arguments are evaluated: a call on a
        // non-callable must fail without running any argument expressions.
        let arity = match &callee {
            Object::Function(f) => f.arity(),
            Object::Native(f) => f.arity,
            Object::Class(c) => c.arity(),
            other => {
                return Err(RuntimeError::new(
                    paren.clone(),
                    format!("Can only call functions and classes, got {}.", other.type_name()),
                ))
            }
        };

        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.evaluate(argument)?);
        }

        if args.len() != arity {
            return Err(RuntimeError::new(
                paren.clone(),
                format!("Expected {} arguments but got {}.", arity, args.len()),
            ));
        }

        match callee {
            Object::Function(f) => f.call(self, &args),
            Object::Native(f) => f.call(&args),
            Object::Class(class) => {
                let instance = LoxInstance::new(Rc::clone(&class));
                if let Some(init) = class.find_method("init") {
                    init.bind(Object::Instance(Rc::clone(&instance))).call(self, &args)?;
                }
                Ok(Object::Instance(instance))
            }
            _ => unreachable!("checked above"),
        }
    }

    fn evaluate_super(
        &mut self,
        id: ExprId,
        keyword: &Token,
        method: &Token,
    ) -> Result<Object, RuntimeError> {
        let distance = *self
            .locals
            .get(&id)
            .expect("resolver always resolves 'super' to a depth");

        let superclass = match Environment::get_at(&self.environment, distance, keyword) {
            Object::Class(class) => class,
            _ => unreachable!("'super' always resolves to a class"),
        };

        let this_token = Token::new(TokenType::This, "this", keyword.line);
        let instance = match Environment::get_at(&self.environment, distance - 1, &this_token) {
            Object::Instance(instance) => instance,
            _ => unreachable!("'this' always resolves to an instance one scope inside 'super'"),
        };

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Object::Function(Rc::new(
                found.bind(Object::Instance(instance)),
            ))),
            None => Err(RuntimeError::new(
                method.clone(),
                format!("Undefined property '{}'.", method.lexeme),
            )),
        }
    }

    fn stringify(&self, object: &Object) -> String {
        match object {
            Object::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Diagnostics;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;

    fn run(source: &str) -> Result<(), RuntimeError> {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(source).scan_tokens(&mut diagnostics);
        let statements = Parser::new(tokens).parse(&mut diagnostics);
        assert!(!diagnostics.had_error(), "unexpected static error: {:?}", diagnostics.log());
        let locals = Resolver::new(&mut diagnostics).resolve(&statements);
        let mut interpreter = Interpreter::new();
        interpreter.resolve(locals);
        interpreter.interpret(&statements)
    }

    #[test]
    fn arithmetic_precedence() {
        assert!(run("print 1 + 2 * 3;").is_ok());
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let err = run("print 1 / 0;").unwrap_err();
        assert!(err.message.contains("Division by zero"));
    }

    #[test]
    fn mixed_string_number_plus_is_a_type_error() {
        let err = run("print \"a\" + 1;").unwrap_err();
        assert!(err.message.contains("two numbers or two strings"));
    }

    #[test]
    fn arity_mismatch_formats_both_numbers() {
        let err = run("fun f(a, b) { return a; } f(1);").unwrap_err();
        assert_eq!(err.message, "Expected 2 arguments but got 1.");
    }

    #[test]
    fn closures_capture_their_defining_environment() {
        assert!(run(
            "fun makeCounter() { var i = 0; fun c() { i = i + 1; return i; } return c; } \
             var c = makeCounter(); print c(); print c();"
        )
        .is_ok());
    }

    #[test]
    fn break_stops_only_the_innermost_loop() {
        assert!(run("var i = 0; while (true) { i = i + 1; if (i == 3) break; } print i;").is_ok());
    }

    #[test]
    fn super_dispatch_resolves_this_to_the_original_receiver() {
        assert!(run(
            "class A { speak() { print \"A\"; } } \
             class B < A { speak() { super.speak(); print \"B\"; } } \
             B().speak();"
        )
        .is_ok());
    }

    #[test]
    fn zero_and_empty_string_are_truthy() {
        assert!(run("if (0) { print \"truthy\"; } else { print \"falsey\"; }").is_ok());
    }
}
