use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::interpreter::{Interpreter, Signal};
use crate::object::Object;
use crate::syntax::FunctionExpr;
use crate::token::{Token, TokenType};

fn this_token() -> Token {
    Token::new(TokenType::This, "this", 0)
}

/// A `fun` declaration, method, or lambda closed over its defining
/// environment. Keeping `declaration` behind an `Rc` means `bind()` only
/// has to clone a pointer and a closure, not the method's params/body.
#[derive(Clone)]
pub struct LoxFunction {
    declaration: Rc<FunctionExpr>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionExpr>, closure: Rc<RefCell<Environment>>) -> Self {
        Self {
            declaration,
            closure,
            is_initializer: false,
        }
    }

    pub fn new_initializer(declaration: Rc<FunctionExpr>, closure: Rc<RefCell<Environment>>) -> Self {
        Self {
            declaration,
            closure,
            is_initializer: true,
        }
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    pub fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: &[Object],
    ) -> Result<Object, RuntimeError> {
        let environment = Rc::new(RefCell::new(Environment::from(&self.closure)));
        for (param, argument) in self.declaration.params.iter().zip(arguments.iter()) {
            environment
                .borrow_mut()
                .define(param.lexeme.clone(), argument.clone());
        }

        let signal = interpreter.execute_block(&self.declaration.body, environment)?;

        if self.is_initializer {
            return Ok(self.closure.borrow().get(&this_token())?);
        }

        match signal {
            Signal::Return(value) => Ok(value),
            Signal::Normal | Signal::Break => Ok(Object::Nil),
        }
    }

    /// Creates a closure-within-a-closure binding `this` to `instance`,
    /// becoming the parent scope the method body resolves `this` in.
    pub fn bind(&self, instance: Object) -> Self {
        let environment = Rc::new(RefCell::new(Environment::from(&self.closure)));
        environment
            .borrow_mut()
            .define("this".to_string(), instance);
        Self {
            declaration: Rc::clone(&self.declaration),
            closure: environment,
            is_initializer: self.is_initializer,
        }
    }
}

impl fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.declaration.name {
            Some(name) => write!(f, "<fn {}>", name.lexeme),
            None => write!(f, "<fn>"),
        }
    }
}

impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
