use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    UndefinedVariable(String),
    UnknownOperator(String),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompileError::UndefinedVariable(name) => write!(f, "undefined variable: {}", name),
            CompileError::UnknownOperator(op) => write!(f, "unknown operator: {}", op),
        }
    }
}

impl std::error::Error for CompileError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    StackOverflow,
    UnsupportedBinaryTypes(&'static str, &'static str),
    UnknownIntegerOperator(u8),
    UnknownStringOperator(u8),
    UnsupportedPrefixType(&'static str),
    IndexNotSupported(&'static str),
    UnusableHashKey(&'static str),
    CallingNonFunction,
    WrongNumberOfArguments { want: usize, got: usize },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RuntimeError::StackOverflow => write!(f, "stack overflow"),
            RuntimeError::UnsupportedBinaryTypes(left, right) => {
                write!(f, "unsupported types for binary operation: {} {}", left, right)
            }
            RuntimeError::UnknownIntegerOperator(op) => {
                write!(f, "unknown integer operator: {}", op)
            }
            RuntimeError::UnknownStringOperator(op) => {
                write!(f, "unknown string operator: {}", op)
            }
            RuntimeError::UnsupportedPrefixType(t) => {
                write!(f, "unsupported type for prefix expression: {}", t)
            }
            RuntimeError::IndexNotSupported(t) => {
                write!(f, "index operator not supported: {}", t)
            }
            RuntimeError::UnusableHashKey(t) => write!(f, "unusable as hash key: {}", t),
            RuntimeError::CallingNonFunction => {
                write!(f, "calling non-function and non-built-in")
            }
            RuntimeError::WrongNumberOfArguments { want, got } => {
                write!(f, "wrong number of arguments: want={}, got={}", want, got)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}
