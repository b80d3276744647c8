use crate::source::Span;
use crate::types::{BinaryFunc, Node, Procedure, VariadicFunc};
use std::collections::{HashMap, HashSet};

/// Value bound to `pi` in the standard environment.
#[allow(clippy::approx_constant)]
pub const PI: f64 = 3.141592;

// --- Environment Definition ---

/// A single flat frame of bindings. There is no outer frame: every `define`
/// lands here and every lookup is answered from here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    bindings: HashMap<String, Node>, // Maps variable names to Nodes
}

impl Environment {
    /// Creates a new, empty environment.
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
        }
    }

    /// Creates the standard environment: `pi`, `*` and `begin`.
    pub fn new_global_populated() -> Self {
        let mut env = Environment::new();
        env.define("pi".to_string(), Node::new_number(PI, Span::default()));
        env.add_binary("*", crate::primitives::prim_mul);
        env.add_variadic("begin", crate::primitives::prim_begin);
        env
    }

    /// Binds `name`, replacing any previous value.
    pub fn define(&mut self, name: String, value_node: Node) {
        self.bindings.insert(name, value_node);
    }

    /// Looks up a binding. An unbound name is `None`; the evaluator decides
    /// whether that is an error.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Gets a list of all identifiers in the environment
    pub fn get_identifiers(&self) -> HashSet<String> {
        self.bindings.keys().cloned().collect()
    }

    fn add_binary(&mut self, name: &str, func: BinaryFunc) {
        let node = Node::new_procedure(Procedure::Binary(func, name.to_string()), Span::default());
        self.define(name.to_string(), node);
    }

    fn add_variadic(&mut self, name: &str, func: VariadicFunc) {
        let node = Node::new_procedure(
            Procedure::Variadic(func, name.to_string()),
            Span::default(),
        );
        self.define(name.to_string(), node);
    }
}
