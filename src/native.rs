use std::fmt;
use std::time::Instant;

use crate::error::RuntimeError;
use crate::object::Object;

/// A function implemented in the host language rather than in Lox itself.
/// The book calls these primitives / foreign functions; this crate only
/// ships `clock`, the one the language grammar assumes exists.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    func: fn(&[Object]) -> Result<Object, RuntimeError>,
}

impl NativeFunction {
    pub fn call(&self, arguments: &[Object]) -> Result<Object, RuntimeError> {
        (self.func)(arguments)
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

thread_local! {
    static CLOCK_START: Instant = Instant::now();
}

/// Seconds since the interpreter process started, matching the book's
/// `clock()` contract. Built on `Instant` since nothing here needs
/// wall-clock semantics, only a monotonic duration.
fn clock(_arguments: &[Object]) -> Result<Object, RuntimeError> {
    CLOCK_START.with(|start| Ok(Object::Number(start.elapsed().as_secs_f64())))
}

pub fn globals() -> Vec<(&'static str, NativeFunction)> {
    vec![(
        "clock",
        NativeFunction {
            name: "clock",
            arity: 0,
            func: clock,
        },
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_takes_no_arguments_and_returns_a_number() {
        let (_, clock) = &globals()[0];
        assert_eq!(clock.arity, 0);
        assert!(matches!(clock.call(&[]).unwrap(), Object::Number(_)));
    }
}
