use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SymbolScope {
    Global,
    Local,
    Free,
    Builtin,
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Symbol {
    pub name: String,
    pub scope: SymbolScope,
    pub index: usize,
}

/// Compile-time name resolution with lexical nesting. Enclosed tables own
/// their parent; the compiler moves the chain in and out as it enters and
/// leaves function scopes.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SymbolTable {
    parent: Option<Box<SymbolTable>>,
    store: HashMap<String, Symbol>,
    pub num_definitions: usize,
    pub free_symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enclosed(parent: SymbolTable) -> Self {
        Self {
            parent: Some(Box::new(parent)),
            ..Self::default()
        }
    }

    /// Pops this scope, returning the enclosing table.
    pub fn into_parent(self) -> Option<SymbolTable> {
        self.parent.map(|parent| *parent)
    }

    /// Unwinds to the outermost table. A compile error can abandon the
    /// compiler mid-function; the REPL continues from the root scope.
    pub fn into_root(mut self) -> SymbolTable {
        while let Some(parent) = self.parent.take() {
            self = *parent;
        }
        self
    }

    pub fn define(&mut self, name: &str) -> Symbol {
        let scope = if self.parent.is_none() {
            SymbolScope::Global
        } else {
            SymbolScope::Local
        };
        let symbol = Symbol {
            name: name.to_string(),
            scope,
            index: self.num_definitions,
        };

        self.store.insert(name.to_string(), symbol.clone());
        self.num_definitions += 1;

        symbol
    }

    pub fn define_builtin(&mut self, index: usize, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.to_string(),
            scope: SymbolScope::Builtin,
            index,
        };
        self.store.insert(name.to_string(), symbol.clone());
        symbol
    }

    /// Installs the name a function literal is being bound to, so its body
    /// can refer to itself without capturing anything.
    pub fn define_function_name(&mut self, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.to_string(),
            scope: SymbolScope::Function,
            index: 0,
        };
        self.store.insert(name.to_string(), symbol.clone());
        symbol
    }

    fn define_free(&mut self, original: Symbol) -> Symbol {
        let symbol = Symbol {
            name: original.name.clone(),
            scope: SymbolScope::Free,
            index: self.free_symbols.len(),
        };
        self.free_symbols.push(original);

        self.store.insert(symbol.name.clone(), symbol.clone());
        symbol
    }

    /// Looks a name up through the scope chain. A hit in an enclosing
    /// function scope is re-recorded as a free variable here, so that every
    /// intermediate closure reloads and re-passes the capture.
    pub fn resolve(&mut self, name: &str) -> Option<Symbol> {
        if let Some(symbol) = self.store.get(name) {
            return Some(symbol.clone());
        }

        let outer = self.parent.as_mut()?.resolve(name)?;
        if outer.scope == SymbolScope::Global || outer.scope == SymbolScope::Builtin {
            return Some(outer);
        }

        Some(self.define_free(outer))
    }
}
