//! Operator trees
//!
//! An [`Expr`] is an already-built equation: constants, field references and
//! calls to registered functions. Trees serialize so hosts can store them
//! alongside their display settings.
//!
//! ```yaml
//! call:
//!   name: advct
//!   args:
//!     - field: { source: gem, element: temp, level: 850mb, kind: continuous }
//!     - field: { source: gem, element: uuwind, level: 850mb, kind: continuous }
//!     - field: { source: gem, element: vvwind, level: 850mb, kind: continuous }
//! ```

use std::fmt;

use metcalc_eqtn_db::FieldDescriptor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Node", into = "Node")]
pub enum Expr {
    Constant(f64),
    Field(FieldDescriptor),
    Call { name: String, args: Vec<Expr> },
}

/// Serialized form of an [`Expr`]: a map with a single key naming the node.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Node {
    Constant { constant: f64 },
    Field { field: FieldDescriptor },
    Call { call: CallNode },
}

#[derive(Serialize, Deserialize)]
struct CallNode {
    name: String,
    #[serde(default)]
    args: Vec<Expr>,
}

impl From<Node> for Expr {
    fn from(node: Node) -> Self {
        match node {
            Node::Constant { constant } => Expr::Constant(constant),
            Node::Field { field } => Expr::Field(field),
            Node::Call { call } => Expr::Call {
                name: call.name,
                args: call.args,
            },
        }
    }
}

impl From<Expr> for Node {
    fn from(expr: Expr) -> Self {
        match expr {
            Expr::Constant(constant) => Node::Constant { constant },
            Expr::Field(field) => Node::Field { field },
            Expr::Call { name, args } => Node::Call {
                call: CallNode { name, args },
            },
        }
    }
}

impl Expr {
    pub fn constant(value: f64) -> Self {
        Expr::Constant(value)
    }

    pub fn field(descriptor: FieldDescriptor) -> Self {
        Expr::Field(descriptor)
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    /// Every field referenced by the tree, leftmost first.
    pub fn fields(&self) -> Vec<&FieldDescriptor> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a FieldDescriptor>) {
        match self {
            Expr::Constant(_) => {}
            Expr::Field(descriptor) => out.push(descriptor),
            Expr::Call { args, .. } => args.iter().for_each(|a| a.collect_fields(out)),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(v) => write!(f, "{v}"),
            Expr::Field(d) => write!(f, "[{} {}]", d.element, d.level),
            Expr::Call { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}
