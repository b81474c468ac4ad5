// ABOUTME: Tree-walking evaluator: executes statements and holds the runtime value model

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::diagnostics::Diagnostics;
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::natives;
use crate::token::{Token, TokenKind};
use crate::value::{LoxClass, LoxFunction, LoxInstance, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

/// Unwinds the statement walk for a `return` (carrying its value) or an
/// uncaught runtime error; `?` propagates both uniformly up the call stack,
/// and `call_function` catches `Return` specifically.
pub enum Control {
    Error(RuntimeError),
    Return(Value),
}

impl From<RuntimeError> for Control {
    fn from(e: RuntimeError) -> Self {
        Control::Error(e)
    }
}

type EResult<T> = Result<T, Control>;

pub struct Interpreter<'a> {
    globals: Rc<Environment>,
    environment: Rc<Environment>,
    locals: HashMap<ExprId, usize>,
    diagnostics: &'a Diagnostics,
    out: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(diagnostics: &'a Diagnostics, out: &'a mut dyn Write) -> Self {
        let globals = Environment::new();
        natives::register(&globals);
        Interpreter {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
            diagnostics,
            out,
        }
    }

    /// Runs a resolved program. In REPL mode, a top-level bare expression
    /// statement prints its value instead of being silently discarded.
    pub fn interpret(&mut self, statements: &[Stmt], locals: HashMap<ExprId, usize>, repl: bool) {
        self.locals = locals;
        for stmt in statements {
            let result = if repl {
                if let Stmt::Expression(expr) = stmt {
                    self.evaluate(expr).map(|v| {
                        let _ = writeln!(self.out, "{v}");
                    })
                } else {
                    self.execute(stmt)
                }
            } else {
                self.execute(stmt)
            };

            if let Err(Control::Error(err)) = result {
                self.diagnostics.runtime_error(&err.token, &err.message);
                return;
            }
        }
    }

    fn execute(&mut self, stmt: &Stmt) -> EResult<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                let _ = writeln!(self.out, "{value}");
                Ok(())
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.define(name.lexeme.clone(), value);
                Ok(())
            }
            Stmt::Block(stmts) => {
                let block_env = Environment::with_parent(self.environment.clone());
                self.execute_block(stmts, block_env)
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
                    Ok(())
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Err(Control::Return(value))
            }
            Stmt::Function(decl) => {
                let function = LoxFunction::new(decl.clone(), self.environment.clone(), false);
                self.environment
                    .define(decl.name.lexeme.clone(), Value::Function(Rc::new(function)));
                Ok(())
            }
            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    fn execute_block(&mut self, stmts: &[Stmt], block_env: Rc<Environment>) -> EResult<()> {
        let previous = std::mem::replace(&mut self.environment, block_env);
        let result = (|| {
            for stmt in stmts {
                self.execute(stmt)?;
            }
            Ok(())
        })();
        self.environment = previous;
        result
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass_expr: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> EResult<()> {
        let superclass = match superclass_expr {
            Some(expr) => {
                let value = self.evaluate(expr)?;
                match value {
                    Value::Class(class) => Some(class),
                    _ => {
                        return Err(self
                            .runtime_error(expr_token(expr), "superclass must be a class")
                            .into())
                    }
                }
            }
            None => None,
        };

        self.environment.define(name.lexeme.clone(), Value::Nil);

        let method_env = match &superclass {
            Some(superclass) => {
                let env = Environment::with_parent(self.environment.clone());
                env.define("super".to_string(), Value::Class(superclass.clone()));
                env
            }
            None => self.environment.clone(),
        };

        let mut method_table = HashMap::new();
        for method in methods {
            let is_initializer = method.name.lexeme == "init";
            let function = LoxFunction::new(method.clone(), method_env.clone(), is_initializer);
            method_table.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        let class = Rc::new(LoxClass {
            name: name.lexeme.clone(),
            superclass,
            methods: method_table,
        });

        self.environment
            .assign(name, Value::Class(class))
            .map_err(Control::Error)?;
        Ok(())
    }

    fn evaluate(&mut self, expr: &Expr) -> EResult<Value> {
        match expr {
            Expr::Literal { value, .. } => Ok(literal_value(value)),
            Expr::Grouping { inner, .. } => self.evaluate(inner),
            Expr::Variable { id, name } => self.lookup_variable(*id, name),
            Expr::This { id, keyword } => self.lookup_variable(*id, keyword),
            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                match self.locals.get(id) {
                    Some(&distance) => self.environment.assign_at(distance, name, value.clone()),
                    None => self.globals.assign(name, value.clone()).map_err(Control::Error)?,
                }
                Ok(value)
            }
            Expr::Unary { op, right, .. } => self.evaluate_unary(op, right),
            Expr::Binary {
                left, op, right, ..
            } => self.evaluate_binary(left, op, right),
            Expr::Logical {
                left, op, right, ..
            } => self.evaluate_logical(left, op, right),
            Expr::Call {
                callee, paren, args, ..
            } => self.evaluate_call(callee, paren, args),
            Expr::Get { target, name, .. } => self.evaluate_get(target, name),
            Expr::Set {
                target,
                name,
                value,
                ..
            } => self.evaluate_set(target, name, value),
            Expr::Super {
                id, keyword, method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn lookup_variable(&self, id: ExprId, name: &Token) -> EResult<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Ok(self.environment.get_at(distance, &name.lexeme)),
            None => self.globals.get(name).map_err(Control::Error),
        }
    }

    fn evaluate_unary(&mut self, op: &Token, right: &Expr) -> EResult<Value> {
        let right = self.evaluate(right)?;
        match op.kind {
            TokenKind::Minus => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(self.runtime_error(op.clone(), "operand must be a number").into()),
            },
            TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
            _ => unreachable!("scanner/parser only emit unary `-`/`!`"),
        }
    }

    fn evaluate_logical(&mut self, left: &Expr, op: &Token, right: &Expr) -> EResult<Value> {
        let left = self.evaluate(left)?;
        match op.kind {
            TokenKind::Or => {
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            _ => {
                if !left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, op: &Token, right: &Expr) -> EResult<Value> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        use TokenKind::*;
        match op.kind {
            Plus => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
                _ => Err(self
                    .runtime_error(op.clone(), "operands must be two numbers or two strings")
                    .into()),
            },
            Minus => {
                let (a, b) = self.number_operands(op, &left, &right)?;
                Ok(Value::Number(a - b))
            }
            Star => {
                let (a, b) = self.number_operands(op, &left, &right)?;
                Ok(Value::Number(a * b))
            }
            Slash => {
                let (a, b) = self.number_operands(op, &left, &right)?;
                if b == 0.0 {
                    return Err(self.runtime_error(op.clone(), "division by zero").into());
                }
                Ok(Value::Number(a / b))
            }
            Greater => {
                let (a, b) = self.number_operands(op, &left, &right)?;
                Ok(Value::Bool(a > b))
            }
            GreaterEqual => {
                let (a, b) = self.number_operands(op, &left, &right)?;
                Ok(Value::Bool(a >= b))
            }
            Less => {
                let (a, b) = self.number_operands(op, &left, &right)?;
                Ok(Value::Bool(a < b))
            }
            LessEqual => {
                let (a, b) = self.number_operands(op, &left, &right)?;
                Ok(Value::Bool(a <= b))
            }
            BangEqual => Ok(Value::Bool(left != right)),
            EqualEqual => Ok(Value::Bool(left == right)),
            _ => unreachable!("scanner/parser only emit binary operator tokens here"),
        }
    }

    fn number_operands(&self, op: &Token, left: &Value, right: &Value) -> EResult<(f64, f64)> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
            _ => Err(self
                .runtime_error(op.clone(), "operands must be numbers")
                .into()),
        }
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &Token, args: &[Expr]) -> EResult<Value> {
        let callee_value = self.evaluate(callee)?;

        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.evaluate(arg)?);
        }

        self.call(callee_value, paren, arg_values)
    }

    fn call(&mut self, callee: Value, paren: &Token, args: Vec<Value>) -> EResult<Value> {
        match callee {
            Value::Function(function) => self.call_function(&function, args, paren),
            Value::Native(native) => {
                if args.len() != native.arity {
                    return Err(self
                        .runtime_error(
                            paren.clone(),
                            format!(
                                "expected {} arguments but got {}",
                                native.arity,
                                args.len()
                            ),
                        )
                        .into());
                }
                Ok((native.func)(&args))
            }
            Value::Class(class) => self.instantiate(&class, args, paren),
            _ => Err(self
                .runtime_error(paren.clone(), "can only call functions and classes")
                .into()),
        }
    }

    fn call_function(
        &mut self,
        function: &Rc<LoxFunction>,
        args: Vec<Value>,
        paren: &Token,
    ) -> EResult<Value> {
        if args.len() != function.arity() {
            return Err(self
                .runtime_error(
                    paren.clone(),
                    format!(
                        "expected {} arguments but got {}",
                        function.arity(),
                        args.len()
                    ),
                )
                .into());
        }

        let call_env = Environment::with_parent(function.closure.clone());
        for (param, arg) in function.declaration.params.iter().zip(args) {
            call_env.define(param.lexeme.clone(), arg);
        }

        let previous = std::mem::replace(&mut self.environment, call_env);
        let result = (|| {
            for stmt in &function.declaration.body {
                self.execute(stmt)?;
            }
            Ok(Value::Nil)
        })();
        self.environment = previous;

        match result {
            Ok(value) => {
                if function.is_initializer {
                    Ok(function.closure.get_at(0, "this"))
                } else {
                    Ok(value)
                }
            }
            Err(Control::Return(value)) => {
                if function.is_initializer {
                    Ok(function.closure.get_at(0, "this"))
                } else {
                    Ok(value)
                }
            }
            Err(err @ Control::Error(_)) => Err(err),
        }
    }

    fn instantiate(
        &mut self,
        class: &Rc<LoxClass>,
        args: Vec<Value>,
        paren: &Token,
    ) -> EResult<Value> {
        if args.len() != class.arity() {
            return Err(self
                .runtime_error(
                    paren.clone(),
                    format!("expected {} arguments but got {}", class.arity(), args.len()),
                )
                .into());
        }

        let instance = Rc::new(RefCell::new(LoxInstance::new(class.clone())));
        if let Some(initializer) = class.find_method("init") {
            let bound = initializer.bind(instance.clone());
            self.call_function(&bound, args, paren)?;
        }
        Ok(Value::Instance(instance))
    }

    fn evaluate_get(&mut self, target: &Expr, name: &Token) -> EResult<Value> {
        let target_value = self.evaluate(target)?;
        let instance = match target_value {
            Value::Instance(instance) => instance,
            _ => {
                return Err(self
                    .runtime_error(name.clone(), "only instances have properties")
                    .into())
            }
        };

        if let Some(value) = instance.borrow().fields.get(&name.lexeme).cloned() {
            return Ok(value);
        }

        if let Some(method) = instance.borrow().class.find_method(&name.lexeme) {
            return Ok(Value::Function(method.bind(instance.clone())));
        }

        Err(self
            .runtime_error(name.clone(), format!("undefined property '{}'", name.lexeme))
            .into())
    }

    fn evaluate_set(&mut self, target: &Expr, name: &Token, value: &Expr) -> EResult<Value> {
        let target_value = self.evaluate(target)?;
        let instance = match target_value {
            Value::Instance(instance) => instance,
            _ => {
                return Err(self
                    .runtime_error(name.clone(), "only instances have fields")
                    .into())
            }
        };

        let value = self.evaluate(value)?;
        instance
            .borrow_mut()
            .fields
            .insert(name.lexeme.clone(), value.clone());
        Ok(value)
    }

    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> EResult<Value> {
        let distance = *self
            .locals
            .get(&id)
            .expect("resolver always records a distance for `super`");

        let superclass = match self.environment.get_at(distance, "super") {
            Value::Class(class) => class,
            _ => unreachable!("resolver only binds `super` scopes to a Class value"),
        };
        // `this` lives one scope inside the `super` scope the class declaration pushed.
        let instance = match self.environment.get_at(distance - 1, "this") {
            Value::Instance(instance) => instance,
            _ => unreachable!("the class-body scope always binds `this`"),
        };

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Function(found.bind(instance))),
            None => Err(self
                .runtime_error(
                    method.clone(),
                    format!("undefined property '{}'", method.lexeme),
                )
                .into()),
        }
    }

    fn runtime_error(&self, token: Token, message: impl Into<String>) -> RuntimeError {
        RuntimeError::new(token, message)
    }
}

fn literal_value(value: &LiteralValue) -> Value {
    match value {
        LiteralValue::Nil => Value::Nil,
        LiteralValue::Bool(b) => Value::Bool(*b),
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::String(s) => Value::String(s.clone()),
    }
}

/// Recovers a representative token from an expression for error reporting
/// (used only where the grammar hands us an `Expr` but a diagnostic wants a
/// token, e.g. a bad superclass expression).
fn expr_token(expr: &Expr) -> Token {
    match expr {
        Expr::Variable { name, .. } => name.clone(),
        Expr::This { keyword, .. } | Expr::Super { keyword, .. } => keyword.clone(),
        _ => Token::new(TokenKind::Identifier, String::new(), None, 0),
    }
}
