use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::{error::RuntimeError, object::Object, token::Token};

pub struct Environment {
    values: HashMap<String, Object>,
    enclosing: Option<Rc<RefCell<Environment>>>, // Parent-pointer
}

impl Environment {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn from(enclosing: &Rc<RefCell<Environment>>) -> Self {
        Self {
            values: HashMap::new(),
            enclosing: Some(Rc::clone(enclosing)),
        }
    }

    pub fn define(&mut self, name: String, value: Object) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        let key = &*name.lexeme;
        if let Some(value) = self.values.get(key) {
            Ok(value.clone())
        } else if let Some(ref enclosing) = self.enclosing {
            // it is probably faster to iteratively walk the chain but recursion here is prettier
            enclosing.borrow().get(name)
        } else {
            Err(RuntimeError::new(
                name.clone(),
                format!("Undefined variable '{}'.", key),
            ))
        }
    }

    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        let key = &*name.lexeme;
        if self.values.contains_key(key) {
            self.values.insert(name.lexeme.clone(), value);
            Ok(())
        } else if let Some(ref enclosing) = self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(RuntimeError::new(
                name.clone(),
                format!("Undefined variable '{}'.", key),
            ))
        }
    }

    /// Walks `distance` links up the parent-pointer chain. The resolver
    /// guarantees `distance` is always reachable, so a missing link here
    /// would be a resolver bug, not a user-facing runtime fault.
    fn ancestor(env: &Rc<RefCell<Environment>>, distance: usize) -> Rc<RefCell<Environment>> {
        let mut current = Rc::clone(env);
        for _ in 0..distance {
            let next = current
                .borrow()
                .enclosing
                .as_ref()
                .expect("resolver-computed distance exceeds the environment chain")
                .clone();
            current = next;
        }
        current
    }

    pub fn get_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &Token) -> Object {
        Self::ancestor(env, distance)
            .borrow()
            .values
            .get(&name.lexeme)
            .cloned()
            .expect("resolver-resolved variable missing from its scope")
    }

    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &Token,
        value: Object,
    ) {
        Self::ancestor(env, distance)
            .borrow_mut()
            .values
            .insert(name.lexeme.clone(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn tok(lexeme: &str) -> Token {
        Token::new(TokenType::Identifier, lexeme, 1)
    }

    #[test]
    fn reads_through_enclosing_scopes() {
        let global = Rc::new(RefCell::new(Environment::new()));
        global.borrow_mut().define("a".into(), Object::Number(1.0));
        let inner = Rc::new(RefCell::new(Environment::from(&global)));

        assert_eq!(inner.borrow().get(&tok("a")).unwrap(), Object::Number(1.0));
    }

    #[test]
    fn assign_fails_for_undeclared_variable() {
        let mut env = Environment::new();
        assert!(env.assign(&tok("missing"), Object::Nil).is_err());
    }

    #[test]
    fn get_at_and_assign_at_target_the_right_ancestor() {
        let global = Rc::new(RefCell::new(Environment::new()));
        global.borrow_mut().define("x".into(), Object::Number(1.0));
        let middle = Rc::new(RefCell::new(Environment::from(&global)));
        let inner = Rc::new(RefCell::new(Environment::from(&middle)));

        assert_eq!(Environment::get_at(&inner, 2, &tok("x")), Object::Number(1.0));

        Environment::assign_at(&inner, 2, &tok("x"), Object::Number(2.0));
        assert_eq!(Environment::get_at(&inner, 2, &tok("x")), Object::Number(2.0));
        // the write landed on the actual ancestor, not a copy
        assert_eq!(global.borrow().get(&tok("x")).unwrap(), Object::Number(2.0));
    }
}
