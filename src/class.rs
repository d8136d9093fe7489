use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::function::LoxFunction;
use crate::object::Object;
use crate::token::Token;

/// The class stores behaviour; instances store state.
#[derive(Debug)]
pub struct LoxClass {
    pub name: String,
    pub superclass: Option<Rc<LoxClass>>,
    pub methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(
        name: String,
        superclass: Option<Rc<LoxClass>>,
        methods: HashMap<String, Rc<LoxFunction>>,
    ) -> Self {
        Self {
            name,
            superclass,
            methods,
        }
    }

    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        if let Some(method) = self.methods.get(name) {
            Some(Rc::clone(method))
        } else if let Some(superclass) = &self.superclass {
            superclass.find_method(name)
        } else {
            None
        }
    }

    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }
}

impl fmt::Display for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug)]
pub struct LoxInstance {
    pub class: Rc<LoxClass>,
    fields: RefCell<HashMap<String, Object>>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Rc<Self> {
        Rc::new(Self {
            class,
            fields: RefCell::new(HashMap::new()),
        })
    }

    /// Looks up a field first, then falls back to a bound method.
    /// `instance` is the `Rc<LoxInstance>` wrapping `self`, needed so
    /// `bind()` can close over it as an `Object::Instance`.
    pub fn get(self: &Rc<Self>, name: &Token) -> Result<Object, RuntimeError> {
        if let Some(value) = self.fields.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(method) = self.class.find_method(&name.lexeme) {
            let bound = method.bind(Object::Instance(Rc::clone(self)));
            return Ok(Object::Function(Rc::new(bound)));
        }

        Err(RuntimeError::new(
            name.clone(),
            format!("Undefined property '{}'.", name.lexeme),
        ))
    }

    // Lox allows freely creating new fields on instances, so there's no
    // need to check whether the key is already present.
    pub fn set(&self, name: &Token, value: Object) {
        self.fields.borrow_mut().insert(name.lexeme.clone(), value);
    }
}

impl fmt::Display for LoxInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} instance", self.class.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(lexeme: &str) -> Token {
        Token::new(crate::token::TokenType::Identifier, lexeme, 1)
    }

    #[test]
    fn undefined_field_is_a_runtime_error() {
        let class = Rc::new(LoxClass::new("Foo".into(), None, HashMap::new()));
        let instance = LoxInstance::new(class);
        assert!(instance.get(&tok("bar")).is_err());
    }

    #[test]
    fn fields_set_then_get_round_trip() {
        let class = Rc::new(LoxClass::new("Foo".into(), None, HashMap::new()));
        let instance = LoxInstance::new(class);
        instance.set(&tok("bar"), Object::Number(42.0));
        assert_eq!(instance.get(&tok("bar")).unwrap(), Object::Number(42.0));
    }

    #[test]
    fn find_method_walks_the_superclass_chain() {
        let base = Rc::new(LoxClass::new("Base".into(), None, HashMap::new()));
        let derived = LoxClass::new("Derived".into(), Some(base), HashMap::new());
        assert!(derived.find_method("missing").is_none());
    }
}
