use monkey::symbols::{Symbol, SymbolScope, SymbolTable};

fn symbol(name: &str, scope: SymbolScope, index: usize) -> Symbol {
    Symbol {
        name: name.to_string(),
        scope,
        index,
    }
}

#[test]
fn define_assigns_sequential_indices_per_scope() {
    let mut global = SymbolTable::new();
    assert_eq!(global.define("a"), symbol("a", SymbolScope::Global, 0));
    assert_eq!(global.define("b"), symbol("b", SymbolScope::Global, 1));

    let mut first_local = SymbolTable::enclosed(global);
    assert_eq!(first_local.define("c"), symbol("c", SymbolScope::Local, 0));
    assert_eq!(first_local.define("d"), symbol("d", SymbolScope::Local, 1));

    let mut second_local = SymbolTable::enclosed(first_local);
    assert_eq!(second_local.define("e"), symbol("e", SymbolScope::Local, 0));
    assert_eq!(second_local.define("f"), symbol("f", SymbolScope::Local, 1));
}

#[test]
fn resolve_global() {
    let mut global = SymbolTable::new();
    global.define("a");
    global.define("b");

    assert_eq!(
        global.resolve("a"),
        Some(symbol("a", SymbolScope::Global, 0))
    );
    assert_eq!(
        global.resolve("b"),
        Some(symbol("b", SymbolScope::Global, 1))
    );
    assert_eq!(global.resolve("c"), None);
}

#[test]
fn resolve_local_sees_enclosing_globals() {
    let mut global = SymbolTable::new();
    global.define("a");
    global.define("b");

    let mut local = SymbolTable::enclosed(global);
    local.define("c");
    local.define("d");

    assert_eq!(local.resolve("a"), Some(symbol("a", SymbolScope::Global, 0)));
    assert_eq!(local.resolve("b"), Some(symbol("b", SymbolScope::Global, 1)));
    assert_eq!(local.resolve("c"), Some(symbol("c", SymbolScope::Local, 0)));
    assert_eq!(local.resolve("d"), Some(symbol("d", SymbolScope::Local, 1)));
}

#[test]
fn define_resolve_builtins_at_every_depth() {
    let mut global = SymbolTable::new();
    let expected = [
        symbol("a", SymbolScope::Builtin, 0),
        symbol("c", SymbolScope::Builtin, 1),
        symbol("e", SymbolScope::Builtin, 2),
        symbol("f", SymbolScope::Builtin, 3),
    ];
    for (i, sym) in expected.iter().enumerate() {
        global.define_builtin(i, &sym.name);
    }

    for sym in &expected {
        assert_eq!(global.resolve(&sym.name), Some(sym.clone()));
    }

    let mut first_local = SymbolTable::enclosed(global);
    for sym in &expected {
        assert_eq!(first_local.resolve(&sym.name), Some(sym.clone()));
    }

    let mut second_local = SymbolTable::enclosed(first_local);
    for sym in &expected {
        assert_eq!(second_local.resolve(&sym.name), Some(sym.clone()));
    }
}

#[test]
fn resolve_promotes_locals_of_enclosing_functions_to_free() {
    let mut global = SymbolTable::new();
    global.define("a");
    global.define("b");

    let mut first_local = SymbolTable::enclosed(global);
    first_local.define("c");
    first_local.define("d");

    let mut second_local = SymbolTable::enclosed(first_local);
    second_local.define("e");
    second_local.define("f");

    assert_eq!(
        second_local.resolve("a"),
        Some(symbol("a", SymbolScope::Global, 0))
    );
    assert_eq!(
        second_local.resolve("b"),
        Some(symbol("b", SymbolScope::Global, 1))
    );
    assert_eq!(
        second_local.resolve("c"),
        Some(symbol("c", SymbolScope::Free, 0))
    );
    assert_eq!(
        second_local.resolve("d"),
        Some(symbol("d", SymbolScope::Free, 1))
    );
    assert_eq!(
        second_local.resolve("e"),
        Some(symbol("e", SymbolScope::Local, 0))
    );
    assert_eq!(
        second_local.resolve("f"),
        Some(symbol("f", SymbolScope::Local, 1))
    );

    // The promoted entries record the symbols as they live in the enclosing
    // scope.
    assert_eq!(
        second_local.free_symbols,
        vec![
            symbol("c", SymbolScope::Local, 0),
            symbol("d", SymbolScope::Local, 1),
        ]
    );
}

#[test]
fn resolve_is_stable_across_repeated_lookups() {
    let mut global = SymbolTable::new();
    global.define("a");

    let mut local = SymbolTable::enclosed(global);
    let mut inner = SymbolTable::enclosed(local);
    inner.define("b");

    let first = inner.resolve("b");
    assert_eq!(first, inner.resolve("b"));
    assert_eq!(inner.free_symbols.len(), 0);

    // Promotion happens once even when a free name is resolved twice.
    local = SymbolTable::enclosed(inner.into_parent().unwrap());
    local.define("c");
    let mut innermost = SymbolTable::enclosed(local);
    let once = innermost.resolve("c");
    let twice = innermost.resolve("c");
    assert_eq!(once, twice);
    assert_eq!(innermost.free_symbols.len(), 1);
}

#[test]
fn unresolvable_names_stay_unresolved_through_free_promotion() {
    let mut global = SymbolTable::new();
    global.define("a");

    let mut first_local = SymbolTable::enclosed(global);
    first_local.define("c");

    let mut second_local = SymbolTable::enclosed(first_local);
    second_local.define("e");
    second_local.define("f");

    assert_eq!(
        second_local.resolve("a"),
        Some(symbol("a", SymbolScope::Global, 0))
    );
    assert_eq!(
        second_local.resolve("c"),
        Some(symbol("c", SymbolScope::Free, 0))
    );
    assert_eq!(
        second_local.resolve("e"),
        Some(symbol("e", SymbolScope::Local, 0))
    );
    assert_eq!(second_local.resolve("b"), None);
    assert_eq!(second_local.resolve("d"), None);
}

#[test]
fn function_name_resolves_in_its_own_scope() {
    let mut global = SymbolTable::new();
    global.define_function_name("a");

    assert_eq!(
        global.resolve("a"),
        Some(symbol("a", SymbolScope::Function, 0))
    );
}

#[test]
fn shadowing_the_function_name_wins() {
    let mut global = SymbolTable::new();
    global.define_function_name("a");
    global.define("a");

    assert_eq!(
        global.resolve("a"),
        Some(symbol("a", SymbolScope::Global, 0))
    );
}

#[test]
fn builtin_and_function_symbols_do_not_count_as_definitions() {
    let mut global = SymbolTable::new();
    global.define_builtin(0, "len");
    global.define_function_name("f");
    assert_eq!(global.num_definitions, 0);

    global.define("a");
    assert_eq!(global.num_definitions, 1);
}
