// ABOUTME: Lexically nested name-to-value tables backing scopes and closures

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    values: RefCell<HashMap<String, Value>>,
    enclosing: Option<Rc<Environment>>,
}

impl Environment {
    /// The global environment has no enclosing scope.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            values: RefCell::new(HashMap::new()),
            enclosing: None,
        })
    }

    pub fn with_parent(enclosing: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            values: RefCell::new(HashMap::new()),
            enclosing: Some(enclosing),
        })
    }

    /// Idempotent insert in the current table; re-declaring a name in the
    /// same scope silently overwrites it (the resolver is what rejects
    /// illegal redeclaration, not the environment).
    pub fn define(&self, name: String, value: Value) {
        self.values.borrow_mut().insert(name, value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }
        if let Some(parent) = &self.enclosing {
            return parent.get(name);
        }
        Err(RuntimeError::new(
            name.clone(),
            format!("undefined variable '{}'", name.lexeme),
        ))
    }

    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.values.borrow().contains_key(&name.lexeme) {
            self.values.borrow_mut().insert(name.lexeme.clone(), value);
            return Ok(());
        }
        if let Some(parent) = &self.enclosing {
            return parent.assign(name, value);
        }
        Err(RuntimeError::new(
            name.clone(),
            format!("undefined variable '{}'", name.lexeme),
        ))
    }

    fn ancestor(&self, distance: usize) -> &Environment {
        let mut env = self;
        for _ in 0..distance {
            env = env
                .enclosing
                .as_deref()
                .expect("resolver-computed distance must stay within the enclosing chain");
        }
        env
    }

    /// Skips exactly `distance` parents, then looks the name up directly.
    /// Never fails when the resolver did its job.
    pub fn get_at(&self, distance: usize, name: &str) -> Value {
        self.ancestor(distance)
            .values
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("resolver promised '{name}' at distance {distance}"))
    }

    pub fn assign_at(&self, distance: usize, name: &Token, value: Value) {
        self.ancestor(distance)
            .values
            .borrow_mut()
            .insert(name.lexeme.clone(), value);
    }
}
