use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt::Debug,
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

use serde_json::Value;

/// One node of a remote computation graph.
#[derive(Debug, PartialEq)]
pub enum Node {
    Constant(Value),
    Invocation {
        function: String,
        args: BTreeMap<String, Expr>,
    },
    Array(Vec<Expr>),
    Dictionary(BTreeMap<String, Expr>),
    /// Reference to an argument of an enclosing [Node::Function].
    Argument(String),
    Function {
        arguments: Vec<String>,
        body: Expr,
    },
}

/// Shared, immutable handle to a [Node].
///
/// Cloning is cheap and keeps sharing, so the same subgraph used twice is
/// one allocation and is encoded once.
#[derive(Clone, PartialEq)]
pub struct Expr(Rc<Node>);

impl Debug for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Expr {
    pub fn new(node: Node) -> Self {
        Self(Rc::new(node))
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Self::new(Node::Constant(value.into()))
    }

    pub fn invoke<'a>(
        function: &str,
        args: impl IntoIterator<Item = (&'a str, Expr)>,
    ) -> Self {
        Self::new(Node::Invocation {
            function: function.into(),
            args: args
                .into_iter()
                .map(|(name, expr)| (name.to_string(), expr))
                .collect(),
        })
    }

    pub fn array(items: impl IntoIterator<Item = Expr>) -> Self {
        Self::new(Node::Array(items.into_iter().collect()))
    }

    pub fn dictionary<'a>(entries: impl IntoIterator<Item = (&'a str, Expr)>) -> Self {
        Self::new(Node::Dictionary(
            entries
                .into_iter()
                .map(|(key, expr)| (key.to_string(), expr))
                .collect(),
        ))
    }

    pub fn argument(name: &str) -> Self {
        Self::new(Node::Argument(name.into()))
    }

    pub fn strings<S: AsRef<str>>(items: &[S]) -> Self {
        Self::constant(items.iter().map(|s| s.as_ref()).collect::<Vec<_>>())
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    pub(crate) fn ptr(&self) -> *const Node {
        Rc::as_ptr(&self.0)
    }

    /// Function name if this node is an invocation.
    pub fn function(&self) -> Option<&str> {
        match self.node() {
            Node::Invocation { function, .. } => Some(function),
            _ => None,
        }
    }

    pub fn arg(&self, name: &str) -> Option<&Expr> {
        match self.node() {
            Node::Invocation { args, .. } => args.get(name),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match self.node() {
            Node::Constant(value) => Some(value),
            _ => None,
        }
    }

    pub fn children(&self) -> Vec<&Expr> {
        match self.node() {
            Node::Constant(_) | Node::Argument(_) => Vec::new(),
            Node::Invocation { args, .. } | Node::Dictionary(args) => args.values().collect(),
            Node::Array(items) => items.iter().collect(),
            Node::Function { body, .. } => vec![body],
        }
    }

    /// Every distinct node reachable from `self`, each visited once, parents
    /// before children.
    pub fn walk(&self) -> Vec<&Expr> {
        let mut seen = HashSet::new();
        let mut stack = vec![self];
        let mut order = Vec::new();
        while let Some(expr) = stack.pop() {
            if !seen.insert(expr.ptr()) {
                continue;
            }
            order.push(expr);
            stack.extend(expr.children().into_iter().rev());
        }
        order
    }

    /// All invocations of `function` reachable from `self`.
    pub fn invocations_of(&self, function: &str) -> Vec<&Expr> {
        self.walk()
            .into_iter()
            .filter(|expr| expr.function() == Some(function))
            .collect()
    }

    /// Deepest nesting of function definitions inside this graph.
    pub fn function_depth(&self) -> usize {
        fn depth(expr: &Expr, memo: &mut HashMap<*const Node, usize>) -> usize {
            if let Some(known) = memo.get(&expr.ptr()) {
                return *known;
            }
            let own = usize::from(matches!(expr.node(), Node::Function { .. }));
            let deepest = expr
                .children()
                .into_iter()
                .map(|child| depth(child, memo))
                .max()
                .unwrap_or(0);
            memo.insert(expr.ptr(), own + deepest);
            own + deepest
        }
        depth(self, &mut HashMap::new())
    }

    /// Rename argument references `from` to `to`, keeping unaffected
    /// subgraphs shared.
    pub fn rename_argument(&self, from: &str, to: &str) -> Expr {
        fn rename(
            expr: &Expr,
            from: &str,
            to: &str,
            memo: &mut HashMap<*const Node, Expr>,
        ) -> Expr {
            if let Some(done) = memo.get(&expr.ptr()) {
                return done.clone();
            }
            let renamed = match expr.node() {
                Node::Argument(name) if name == from => Expr::argument(to),
                Node::Constant(_) | Node::Argument(_) => expr.clone(),
                Node::Invocation { function, args } => {
                    let renamed: BTreeMap<_, _> = args
                        .iter()
                        .map(|(k, v)| (k.clone(), rename(v, from, to, memo)))
                        .collect();
                    let unchanged = renamed
                        .values()
                        .zip(args.values())
                        .all(|(new, old)| new.ptr() == old.ptr());
                    if unchanged {
                        expr.clone()
                    } else {
                        Expr::new(Node::Invocation {
                            function: function.clone(),
                            args: renamed,
                        })
                    }
                }
                Node::Dictionary(entries) => Expr::new(Node::Dictionary(
                    entries
                        .iter()
                        .map(|(k, v)| (k.clone(), rename(v, from, to, memo)))
                        .collect(),
                )),
                Node::Array(items) => Expr::new(Node::Array(
                    items.iter().map(|v| rename(v, from, to, memo)).collect(),
                )),
                // Shadowed by an inner definition.
                Node::Function { arguments, .. } if arguments.iter().any(|a| a == from) => {
                    expr.clone()
                }
                Node::Function { arguments, body } => Expr::new(Node::Function {
                    arguments: arguments.clone(),
                    body: rename(body, from, to, memo),
                }),
            };
            memo.insert(expr.ptr(), renamed.clone());
            renamed
        }
        rename(self, from, to, &mut HashMap::new())
    }

    /// Build a one-argument function from a Rust closure.
    ///
    /// The closure is called once with a placeholder argument; the argument
    /// is then named `_MAPPING_VAR_<depth>_0` after the nesting depth of the
    /// body, which keeps names of nested definitions distinct.
    pub fn lambda(body: impl FnOnce(Expr) -> Expr) -> Expr {
        static PLACEHOLDERS: AtomicUsize = AtomicUsize::new(0);
        let placeholder = format!(
            "__placeholder_{}",
            PLACEHOLDERS.fetch_add(1, Ordering::Relaxed)
        );
        let body = body(Expr::argument(&placeholder));
        let name = format!("_MAPPING_VAR_{}_0", body.function_depth());
        Expr::new(Node::Function {
            arguments: vec![name.clone()],
            body: body.rename_argument(&placeholder, &name),
        })
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::constant(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::constant(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::constant(value)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::constant(value)
    }
}
