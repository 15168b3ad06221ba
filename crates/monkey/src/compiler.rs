use std::mem;
use std::rc::Rc;

use crate::builtins::BUILTINS;
use crate::bytecode::{make, Instructions, Op};
use crate::error::CompileError;
use crate::parser::{BlockStatement, Expr, Program, Statement};
use crate::symbols::{Symbol, SymbolScope, SymbolTable};
use crate::value::{CompiledFunction, Value};

// Jump operand emitted before the target is known; always patched before
// compilation of the surrounding expression finishes.
const PLACEHOLDER: usize = 9999;

#[derive(Debug, Clone, Copy)]
struct EmittedInstruction {
    opcode: Op,
    position: usize,
}

#[derive(Default)]
struct CompilationScope {
    instructions: Instructions,
    last_instruction: Option<EmittedInstruction>,
    previous_instruction: Option<EmittedInstruction>,
}

/// The compiled output: the main scope's instructions plus the constants
/// pool, and the symbol table a REPL needs to carry into its next line.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Value>,
    pub symbol_table: SymbolTable,
}

/// Lowers an AST to bytecode. Function literals are compiled in their own
/// scope; the scope stack tracks one instruction buffer per nesting level.
pub struct Compiler {
    constants: Vec<Value>,
    symbol_table: SymbolTable,
    scopes: Vec<CompilationScope>,
    scope_index: usize,
}

impl Compiler {
    pub fn new() -> Self {
        let mut symbol_table = SymbolTable::new();
        for (i, builtin) in BUILTINS.iter().enumerate() {
            symbol_table.define_builtin(i, builtin.name);
        }

        Self::with_state(symbol_table, Vec::new())
    }

    /// Resumes compilation with the symbol table and constants of a previous
    /// run, so `let` bindings survive across REPL lines.
    pub fn with_state(symbol_table: SymbolTable, constants: Vec<Value>) -> Self {
        Self {
            constants,
            symbol_table,
            scopes: vec![CompilationScope::default()],
            scope_index: 0,
        }
    }

    pub fn bytecode(&self) -> Bytecode {
        Bytecode {
            instructions: self.scopes[0].instructions.clone(),
            constants: self.constants.clone(),
            symbol_table: self.symbol_table.clone(),
        }
    }

    pub fn into_state(self) -> (SymbolTable, Vec<Value>) {
        (self.symbol_table.into_root(), self.constants)
    }

    pub fn compile(&mut self, program: &Program) -> Result<(), CompileError> {
        for stmt in &program.statements {
            self.compile_statement(stmt)?;
        }
        Ok(())
    }

    fn compile_statement(&mut self, stmt: &Statement) -> Result<(), CompileError> {
        match stmt {
            Statement::Expression(value) => {
                self.compile_expression(value)?;
                self.emit(Op::Pop, &[]);
            }
            Statement::Let { name, value } => {
                // Defined before the value compiles, so `let f = fn() { f() }`
                // resolves the name inside the function body.
                let symbol = self.symbol_table.define(name);
                self.compile_expression(value)?;
                match symbol.scope {
                    SymbolScope::Global => self.emit(Op::SetGlobal, &[symbol.index]),
                    _ => self.emit(Op::SetLocal, &[symbol.index]),
                };
            }
            Statement::Return(value) => {
                self.compile_expression(value)?;
                self.emit(Op::ReturnValue, &[]);
            }
        }
        Ok(())
    }

    fn compile_block(&mut self, block: &BlockStatement) -> Result<(), CompileError> {
        for stmt in &block.statements {
            self.compile_statement(stmt)?;
        }
        Ok(())
    }

    fn compile_expression(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Integer(value) => {
                let idx = self.add_constant(Value::Integer(*value));
                self.emit(Op::Constant, &[idx]);
            }
            Expr::Str(value) => {
                let idx = self.add_constant(Value::String(value.clone()));
                self.emit(Op::Constant, &[idx]);
            }
            Expr::Boolean(true) => {
                self.emit(Op::True, &[]);
            }
            Expr::Boolean(false) => {
                self.emit(Op::False, &[]);
            }
            Expr::Identifier(name) => {
                let symbol = self
                    .symbol_table
                    .resolve(name)
                    .ok_or_else(|| CompileError::UndefinedVariable(name.clone()))?;
                self.load_symbol(&symbol);
            }
            Expr::Prefix { operator, right } => {
                self.compile_expression(right)?;
                match operator.as_str() {
                    "!" => self.emit(Op::Bang, &[]),
                    "-" => self.emit(Op::Minus, &[]),
                    other => return Err(CompileError::UnknownOperator(other.to_string())),
                };
            }
            Expr::Infix {
                left,
                operator,
                right,
            } => self.compile_infix_expression(left, operator, right)?,
            Expr::If {
                condition,
                consequence,
                alternative,
            } => self.compile_if_expression(condition, consequence, alternative.as_ref())?,
            Expr::Array(elements) => {
                for elem in elements {
                    self.compile_expression(elem)?;
                }
                self.emit(Op::Array, &[elements.len()]);
            }
            Expr::Hash(pairs) => {
                // Source order lives in an AST the parser built; sorting by
                // the printed key keeps the emitted bytecode deterministic.
                let mut pairs: Vec<&(Expr, Expr)> = pairs.iter().collect();
                pairs.sort_by_key(|(key, _)| key.to_string());

                for (key, value) in &pairs {
                    self.compile_expression(key)?;
                    self.compile_expression(value)?;
                }
                self.emit(Op::Hash, &[pairs.len() * 2]);
            }
            Expr::Index { left, index } => {
                self.compile_expression(left)?;
                self.compile_expression(index)?;
                self.emit(Op::Index, &[]);
            }
            Expr::Function {
                parameters,
                body,
                name,
            } => self.compile_function_literal(parameters, body, name)?,
            Expr::Call {
                function,
                arguments,
            } => {
                self.compile_expression(function)?;
                for arg in arguments {
                    self.compile_expression(arg)?;
                }
                self.emit(Op::Call, &[arguments.len()]);
            }
            // Macro literals are consumed by the expansion pass and never
            // reach a well-formed compilation.
            Expr::Macro { .. } => {}
        }
        Ok(())
    }

    fn compile_infix_expression(
        &mut self,
        left: &Expr,
        operator: &str,
        right: &Expr,
    ) -> Result<(), CompileError> {
        // The VM only knows `>`; `<` compiles to swapped operands.
        if operator == "<" {
            self.compile_expression(right)?;
            self.compile_expression(left)?;
            self.emit(Op::GreaterThan, &[]);
            return Ok(());
        }

        self.compile_expression(left)?;
        self.compile_expression(right)?;

        match operator {
            "+" => self.emit(Op::Add, &[]),
            "-" => self.emit(Op::Sub, &[]),
            "*" => self.emit(Op::Mul, &[]),
            "/" => self.emit(Op::Div, &[]),
            "==" => self.emit(Op::Equal, &[]),
            "!=" => self.emit(Op::NotEqual, &[]),
            ">" => self.emit(Op::GreaterThan, &[]),
            other => return Err(CompileError::UnknownOperator(other.to_string())),
        };
        Ok(())
    }

    fn compile_if_expression(
        &mut self,
        condition: &Expr,
        consequence: &BlockStatement,
        alternative: Option<&BlockStatement>,
    ) -> Result<(), CompileError> {
        self.compile_expression(condition)?;

        let jump_not_truthy_pos = self.emit(Op::JumpNotTruthy, &[PLACEHOLDER]);

        self.compile_block(consequence)?;
        if self.last_instruction_is(Op::Pop) {
            self.remove_last_pop();
        }

        let jump_pos = self.emit(Op::Jump, &[PLACEHOLDER]);

        let after_consequence = self.current_instructions().len();
        self.change_operand(jump_not_truthy_pos, after_consequence);

        match alternative {
            None => {
                self.emit(Op::Null, &[]);
            }
            Some(alternative) => {
                self.compile_block(alternative)?;
                if self.last_instruction_is(Op::Pop) {
                    self.remove_last_pop();
                }
            }
        }

        let after_alternative = self.current_instructions().len();
        self.change_operand(jump_pos, after_alternative);

        Ok(())
    }

    fn compile_function_literal(
        &mut self,
        parameters: &[String],
        body: &BlockStatement,
        name: &str,
    ) -> Result<(), CompileError> {
        self.enter_scope();

        if !name.is_empty() {
            self.symbol_table.define_function_name(name);
        }
        for param in parameters {
            self.symbol_table.define(param);
        }

        self.compile_block(body)?;

        if self.last_instruction_is(Op::Pop) {
            self.replace_last_pop_with_return();
        }
        if !self.last_instruction_is(Op::ReturnValue) {
            self.emit(Op::Return, &[]);
        }

        let free_symbols = self.symbol_table.free_symbols.clone();
        let num_locals = self.symbol_table.num_definitions;
        let instructions = self.leave_scope();

        // Load each capture in the enclosing scope so OpClosure can snapshot
        // them off the stack.
        for symbol in &free_symbols {
            self.load_symbol(symbol);
        }

        let func = CompiledFunction {
            instructions,
            num_locals,
            num_parameters: parameters.len(),
        };
        let idx = self.add_constant(Value::CompiledFunction(Rc::new(func)));
        self.emit(Op::Closure, &[idx, free_symbols.len()]);

        Ok(())
    }

    fn load_symbol(&mut self, symbol: &Symbol) {
        match symbol.scope {
            SymbolScope::Global => self.emit(Op::GetGlobal, &[symbol.index]),
            SymbolScope::Local => self.emit(Op::GetLocal, &[symbol.index]),
            SymbolScope::Builtin => self.emit(Op::GetBuiltin, &[symbol.index]),
            SymbolScope::Free => self.emit(Op::GetFree, &[symbol.index]),
            SymbolScope::Function => self.emit(Op::CurrentClosure, &[]),
        };
    }

    fn add_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    fn emit(&mut self, op: Op, operands: &[usize]) -> usize {
        let pos = self.add_instruction(&make(op, operands));
        self.set_last_instruction(op, pos);
        pos
    }

    fn add_instruction(&mut self, ins: &Instructions) -> usize {
        let pos = self.current_instructions().len();
        self.scopes[self.scope_index].instructions.extend(ins);
        pos
    }

    fn set_last_instruction(&mut self, opcode: Op, position: usize) {
        let scope = &mut self.scopes[self.scope_index];
        scope.previous_instruction = scope.last_instruction;
        scope.last_instruction = Some(EmittedInstruction { opcode, position });
    }

    fn current_instructions(&self) -> &Instructions {
        &self.scopes[self.scope_index].instructions
    }

    fn last_instruction_is(&self, op: Op) -> bool {
        self.scopes[self.scope_index]
            .last_instruction
            .is_some_and(|last| last.opcode == op)
    }

    fn remove_last_pop(&mut self) {
        let scope = &mut self.scopes[self.scope_index];
        let last = scope
            .last_instruction
            .expect("no last instruction to remove");

        scope.instructions.truncate(last.position);
        scope.last_instruction = scope.previous_instruction;
    }

    fn replace_instruction(&mut self, pos: usize, new_instruction: &Instructions) {
        self.scopes[self.scope_index]
            .instructions
            .replace(pos, new_instruction);
    }

    fn replace_last_pop_with_return(&mut self) {
        let scope = &mut self.scopes[self.scope_index];
        let last = scope
            .last_instruction
            .expect("no last instruction to replace")
            .position;

        self.replace_instruction(last, &make(Op::ReturnValue, &[]));
        self.scopes[self.scope_index]
            .last_instruction
            .replace(EmittedInstruction {
                opcode: Op::ReturnValue,
                position: last,
            });
    }

    fn change_operand(&mut self, op_pos: usize, operand: usize) {
        let op = Op::try_from(self.current_instructions()[op_pos])
            .expect("patching an unknown opcode");
        let new_instruction = make(op, &[operand]);
        self.replace_instruction(op_pos, &new_instruction);
    }

    fn enter_scope(&mut self) {
        self.scopes.push(CompilationScope::default());
        self.scope_index += 1;

        let table = mem::take(&mut self.symbol_table);
        self.symbol_table = SymbolTable::enclosed(table);
    }

    fn leave_scope(&mut self) -> Instructions {
        let scope = self.scopes.pop().expect("left the main scope");
        self.scope_index -= 1;

        let table = mem::take(&mut self.symbol_table);
        self.symbol_table = table
            .into_parent()
            .expect("leave_scope without an enclosing symbol table");

        scope.instructions
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
