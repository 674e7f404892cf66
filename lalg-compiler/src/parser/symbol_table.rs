use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Integer,
    Real,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub ty: VarType,
    pub kind: SymbolKind,
    /// Cell index in the machine's flat data area.
    pub address: usize,
}

/// Name resolution with lexical scoping over a flat address space.
///
/// Scopes form a stack: index 0 is the global scope and is never popped;
/// declarations go into the top scope, lookups walk top to bottom so an
/// inner declaration shadows an outer one. Addresses come from a single
/// counter that only ever grows — scope controls visibility, not address
/// reuse, because the machine's data area is flat.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
    next_address: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
            next_address: 0,
        }
    }

    /// Push an empty scope.
    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop the innermost scope. The global scope stays.
    pub fn leave_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Drop every scope above the global one. Used when error recovery
    /// bails out of a half-parsed procedure.
    pub fn reset_to_global(&mut self) {
        self.scopes.truncate(1);
    }

    /// Declare a name in the current scope and allocate its address.
    /// Returns the existing symbol when the name is already taken in this
    /// scope; the address counter is untouched in that case.
    pub fn declare(&mut self, name: &str, ty: VarType, kind: SymbolKind) -> Result<usize, Symbol> {
        let scope = self.scopes.last_mut().expect("global scope always exists");
        if let Some(existing) = scope.get(name) {
            return Err(existing.clone());
        }
        let address = self.next_address;
        self.next_address += 1;
        scope.insert(name.to_string(), Symbol { ty, kind, address });
        Ok(address)
    }

    /// Resolve a name, innermost scope first.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn type_of(&self, name: &str) -> Option<VarType> {
        self.resolve(name).map(|s| s.ty)
    }

    /// Number of names declared in the innermost scope. For a procedure
    /// scope this is parameters plus locals — exactly the frame size its
    /// epilogue has to tear down.
    pub fn current_scope_len(&self) -> usize {
        self.scopes.last().map(HashMap::len).unwrap_or(0)
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
