// AST definitions for the snippet language

/// Source location information for error reporting and trace line numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical (short-circuit)
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg, // -x
    Not, // !x
}

/// Expressions
#[derive(Debug, Clone)]
pub enum Expr {
    IntLiteral(i64, SourceLocation),
    FloatLiteral(f64, SourceLocation),
    StringLiteral(String, SourceLocation),
    BoolLiteral(bool, SourceLocation),
    Null(SourceLocation),
    Variable(String, SourceLocation),
    ListLiteral(Vec<Expr>, SourceLocation),
    ObjectLiteral {
        fields: Vec<(String, Expr)>,
        location: SourceLocation,
    },
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    UnaryOp {
        op: UnOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        location: SourceLocation,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        location: SourceLocation,
    },
    Member {
        object: Box<Expr>,
        field: String,
        location: SourceLocation,
    },
}

impl Expr {
    /// Get the source location of this expression
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::IntLiteral(_, loc)
            | Expr::FloatLiteral(_, loc)
            | Expr::StringLiteral(_, loc)
            | Expr::BoolLiteral(_, loc)
            | Expr::Null(loc)
            | Expr::Variable(_, loc)
            | Expr::ListLiteral(_, loc) => *loc,
            Expr::ObjectLiteral { location, .. }
            | Expr::BinaryOp { location, .. }
            | Expr::UnaryOp { location, .. }
            | Expr::Call { location, .. }
            | Expr::Index { location, .. }
            | Expr::Member { location, .. } => *location,
        }
    }

    /// Check whether this expression is a valid assignment target
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self,
            Expr::Variable(..) | Expr::Index { .. } | Expr::Member { .. }
        )
    }
}

/// Statements
#[derive(Debug, Clone)]
pub enum Stmt {
    FunctionDef {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    Assignment {
        target: Expr,
        value: Expr,
        location: SourceLocation,
    },
    CompoundAssignment {
        target: Expr,
        op: BinOp,
        value: Expr,
        location: SourceLocation,
    },
    ExpressionStatement {
        expr: Expr,
        location: SourceLocation,
    },
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
        location: SourceLocation,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        step: Option<Box<Stmt>>,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    ForIn {
        var: String,
        iterable: Expr,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    Return {
        expr: Option<Expr>,
        location: SourceLocation,
    },
}

impl Stmt {
    /// Get the source location of this statement
    pub fn location(&self) -> SourceLocation {
        match self {
            Stmt::FunctionDef { location, .. }
            | Stmt::Assignment { location, .. }
            | Stmt::CompoundAssignment { location, .. }
            | Stmt::ExpressionStatement { location, .. }
            | Stmt::If { location, .. }
            | Stmt::While { location, .. }
            | Stmt::For { location, .. }
            | Stmt::ForIn { location, .. }
            | Stmt::Break { location }
            | Stmt::Continue { location }
            | Stmt::Return { location, .. } => *location,
        }
    }
}

/// Top-level program structure: a flat list of module-level statements
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
