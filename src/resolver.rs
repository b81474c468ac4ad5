// ABOUTME: Static scope pass computing variable resolution distances ahead of evaluation

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::diagnostics::Diagnostics;
use crate::token::Token;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Copy, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

pub struct Resolver<'a> {
    scopes: Vec<HashMap<String, bool>>,
    locals: HashMap<ExprId, usize>,
    current_function: FunctionType,
    current_class: ClassType,
    diagnostics: &'a Diagnostics,
}

impl<'a> Resolver<'a> {
    pub fn new(diagnostics: &'a Diagnostics) -> Self {
        Resolver {
            scopes: Vec::new(),
            locals: HashMap::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            diagnostics,
        }
    }

    /// Resolves a whole program, returning the expression id -> scope
    /// distance map the evaluator consults at runtime.
    pub fn resolve(mut self, statements: &[Stmt]) -> HashMap<ExprId, usize> {
        self.resolve_stmts(statements);
        self.locals
    }

    fn resolve_stmts(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(e) | Stmt::Print(e) => self.resolve_expr(e),
            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(init) = initializer {
                    self.resolve_expr(init);
                }
                self.define(name);
            }
            Stmt::Block(stmts) => {
                self.begin_scope();
                self.resolve_stmts(stmts);
                self.end_scope();
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }
            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.diagnostics
                        .token_error(keyword, "can't return from top-level code");
                }
                if let Some(value) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.diagnostics
                            .token_error(keyword, "can't return a value from an initializer");
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Function(decl) => {
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(decl, FunctionType::Function);
            }
            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods),
        }
    }

    fn resolve_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) {
        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(name);
        self.define(name);

        if let Some(Expr::Variable {
            name: super_name, ..
        }) = superclass
        {
            if super_name.lexeme == name.lexeme {
                self.diagnostics
                    .token_error(super_name, "a class can't inherit from itself");
            }
            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass.expect("checked Some above"));

            self.begin_scope();
            self.scopes
                .last_mut()
                .expect("scope just pushed")
                .insert("super".to_string(), true);
        }

        self.begin_scope();
        self.scopes
            .last_mut()
            .expect("scope just pushed")
            .insert("this".to_string(), true);

        for method in methods {
            let kind = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(method, kind);
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_function(&mut self, decl: &FunctionDecl, kind: FunctionType) {
        let enclosing_function = self.current_function;
        self.current_function = kind;

        self.begin_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&decl.body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal { .. } => {}
            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        self.diagnostics.token_error(
                            name,
                            "can't read local variable in its own initializer",
                        );
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
            Expr::Grouping { inner, .. } => self.resolve_expr(inner),
            Expr::Call { callee, args, .. } => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::Get { target, .. } => self.resolve_expr(target),
            Expr::Set { target, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(target);
            }
            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.diagnostics
                        .token_error(keyword, "can't use 'this' outside of a class");
                    return;
                }
                self.resolve_local(*id, keyword);
            }
            Expr::Super { id, keyword, .. } => {
                match self.current_class {
                    ClassType::None => {
                        self.diagnostics
                            .token_error(keyword, "can't use 'super' outside of a class");
                        return;
                    }
                    ClassType::Class => {
                        self.diagnostics.token_error(
                            keyword,
                            "can't use 'super' in a class with no superclass",
                        );
                        return;
                    }
                    ClassType::Subclass => {}
                }
                self.resolve_local(*id, keyword);
            }
        }
    }

    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (i, scope) in self.scopes.iter().enumerate().rev() {
            if scope.contains_key(&name.lexeme) {
                self.locals.insert(id, self.scopes.len() - 1 - i);
                return;
            }
        }
        // Not found in any scope: treated as global, left unrecorded.
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        if scope.contains_key(&name.lexeme) {
            self.diagnostics.token_error(
                name,
                "variable with this name already exists in this scope",
            );
        }
        scope.insert(name.lexeme.clone(), false);
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }
}
