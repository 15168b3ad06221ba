use monkey::lexer::Lexer;
use monkey::parser::{Expr, Parser, Program, Statement};

fn parse(input: &str) -> Program {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();
    assert!(
        parser.errors().is_empty(),
        "parser errors for {:?}: {:?}",
        input,
        parser.errors()
    );
    program
}

fn parse_single_expression(input: &str) -> Expr {
    let program = parse(input);
    assert_eq!(program.statements.len(), 1, "input: {:?}", input);
    match &program.statements[0] {
        Statement::Expression(expr) => expr.clone(),
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn let_statements() {
    let cases = [
        ("let x = 5;", "x", Expr::Integer(5)),
        ("let y = true;", "y", Expr::Boolean(true)),
        (
            "let foobar = y;",
            "foobar",
            Expr::Identifier("y".to_string()),
        ),
    ];

    for (input, expected_name, expected_value) in cases {
        let program = parse(input);
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Statement::Let { name, value } => {
                assert_eq!(name, expected_name);
                assert_eq!(value, &expected_value);
            }
            other => panic!("expected let statement, got {:?}", other),
        }
    }
}

#[test]
fn return_statements() {
    let program = parse("return 5; return foobar;");
    assert_eq!(
        program.statements,
        vec![
            Statement::Return(Expr::Integer(5)),
            Statement::Return(Expr::Identifier("foobar".to_string())),
        ]
    );
}

#[test]
fn prefix_expressions() {
    let cases = [
        ("!5;", "!", Expr::Integer(5)),
        ("-15;", "-", Expr::Integer(15)),
        ("!true;", "!", Expr::Boolean(true)),
    ];

    for (input, expected_op, expected_right) in cases {
        match parse_single_expression(input) {
            Expr::Prefix { operator, right } => {
                assert_eq!(operator, expected_op);
                assert_eq!(*right, expected_right);
            }
            other => panic!("expected prefix expression, got {:?}", other),
        }
    }
}

#[test]
fn infix_expressions() {
    for op in ["+", "-", "*", "/", ">", "<", "==", "!="] {
        let input = format!("5 {} 5;", op);
        match parse_single_expression(&input) {
            Expr::Infix {
                left,
                operator,
                right,
            } => {
                assert_eq!(*left, Expr::Integer(5));
                assert_eq!(operator, op);
                assert_eq!(*right, Expr::Integer(5));
            }
            other => panic!("expected infix expression, got {:?}", other),
        }
    }
}

#[test]
fn operator_precedence() {
    let cases = [
        ("-a * b", "((-a) * b)"),
        ("!-a", "(!(-a))"),
        ("a + b + c", "((a + b) + c)"),
        ("a + b - c", "((a + b) - c)"),
        ("a * b * c", "((a * b) * c)"),
        ("a * b / c", "((a * b) / c)"),
        ("a + b / c", "(a + (b / c))"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
        ("3 + 4; -5 * 5", "(3 + 4)((-5) * 5)"),
        ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
        ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
        (
            "3 + 4 * 5 == 3 * 1 + 4 * 5",
            "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))",
        ),
        ("true", "true"),
        ("false", "false"),
        ("3 > 5 == false", "((3 > 5) == false)"),
        ("3 < 5 == true", "((3 < 5) == true)"),
        ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
        ("(5 + 5) * 2", "((5 + 5) * 2)"),
        ("2 / (5 + 5)", "(2 / (5 + 5))"),
        ("-(5 + 5)", "(-(5 + 5))"),
        ("!(true == true)", "(!(true == true))"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        (
            "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
            "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
        ),
        ("add(a + b + c * d / f + g)", "add((((a + b) + ((c * d) / f)) + g))"),
        (
            "a * [1, 2, 3, 4][b * c] * d",
            "((a * ([1, 2, 3, 4][(b * c)])) * d)",
        ),
        (
            "add(a * b[2], b[1], 2 * [1, 2][1])",
            "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))",
        ),
    ];

    for (input, expected) in cases {
        let program = parse(input);
        assert_eq!(program.to_string(), expected, "input: {:?}", input);
    }
}

#[test]
fn if_expression() {
    match parse_single_expression("if (x < y) { x }") {
        Expr::If {
            condition,
            consequence,
            alternative,
        } => {
            assert_eq!(condition.to_string(), "(x < y)");
            assert_eq!(consequence.statements.len(), 1);
            assert_eq!(consequence.to_string(), "x");
            assert!(alternative.is_none());
        }
        other => panic!("expected if expression, got {:?}", other),
    }
}

#[test]
fn if_else_expression() {
    match parse_single_expression("if (x < y) { x } else { y }") {
        Expr::If { alternative, .. } => {
            assert_eq!(alternative.expect("missing alternative").to_string(), "y");
        }
        other => panic!("expected if expression, got {:?}", other),
    }
}

#[test]
fn function_literal() {
    match parse_single_expression("fn(x, y) { x + y; }") {
        Expr::Function {
            parameters,
            body,
            name,
        } => {
            assert_eq!(parameters, vec!["x", "y"]);
            assert_eq!(body.to_string(), "(x + y)");
            assert_eq!(name, "");
        }
        other => panic!("expected function literal, got {:?}", other),
    }
}

#[test]
fn function_parameter_lists() {
    let cases: [(&str, &[&str]); 3] = [
        ("fn() {};", &[]),
        ("fn(x) {};", &["x"]),
        ("fn(x, y, z) {};", &["x", "y", "z"]),
    ];

    for (input, expected) in cases {
        match parse_single_expression(input) {
            Expr::Function { parameters, .. } => assert_eq!(parameters, expected),
            other => panic!("expected function literal, got {:?}", other),
        }
    }
}

#[test]
fn let_binding_names_the_function_literal() {
    let program = parse("let myFunction = fn() { };");
    match &program.statements[0] {
        Statement::Let { value, .. } => match value {
            Expr::Function { name, .. } => assert_eq!(name, "myFunction"),
            other => panic!("expected function literal, got {:?}", other),
        },
        other => panic!("expected let statement, got {:?}", other),
    }
}

#[test]
fn call_expression() {
    match parse_single_expression("add(1, 2 * 3, 4 + 5);") {
        Expr::Call {
            function,
            arguments,
        } => {
            assert_eq!(function.to_string(), "add");
            assert_eq!(arguments.len(), 3);
            assert_eq!(arguments[0], Expr::Integer(1));
            assert_eq!(arguments[1].to_string(), "(2 * 3)");
            assert_eq!(arguments[2].to_string(), "(4 + 5)");
        }
        other => panic!("expected call expression, got {:?}", other),
    }
}

#[test]
fn string_literal() {
    assert_eq!(
        parse_single_expression("\"hello world\";"),
        Expr::Str("hello world".to_string())
    );
}

#[test]
fn array_literal_and_index() {
    match parse_single_expression("[1, 2 * 2, 3 + 3]") {
        Expr::Array(elements) => {
            assert_eq!(elements.len(), 3);
            assert_eq!(elements[0], Expr::Integer(1));
            assert_eq!(elements[1].to_string(), "(2 * 2)");
            assert_eq!(elements[2].to_string(), "(3 + 3)");
        }
        other => panic!("expected array literal, got {:?}", other),
    }

    match parse_single_expression("myArray[1 + 1]") {
        Expr::Index { left, index } => {
            assert_eq!(left.to_string(), "myArray");
            assert_eq!(index.to_string(), "(1 + 1)");
        }
        other => panic!("expected index expression, got {:?}", other),
    }
}

#[test]
fn hash_literals_keep_source_pair_order() {
    match parse_single_expression("{\"one\": 1, \"two\": 2, \"three\": 3}") {
        Expr::Hash(pairs) => {
            let keys: Vec<String> = pairs.iter().map(|(k, _)| k.to_string()).collect();
            assert_eq!(keys, vec!["one", "two", "three"]);
        }
        other => panic!("expected hash literal, got {:?}", other),
    }

    match parse_single_expression("{}") {
        Expr::Hash(pairs) => assert!(pairs.is_empty()),
        other => panic!("expected hash literal, got {:?}", other),
    }

    match parse_single_expression("{1: 0 + 1, 2: 10 - 8}") {
        Expr::Hash(pairs) => {
            assert_eq!(pairs.len(), 2);
            assert_eq!(pairs[0].1.to_string(), "(0 + 1)");
            assert_eq!(pairs[1].1.to_string(), "(10 - 8)");
        }
        other => panic!("expected hash literal, got {:?}", other),
    }
}

#[test]
fn macro_literal() {
    match parse_single_expression("macro(x, y) { x + y; }") {
        Expr::Macro { parameters, body } => {
            assert_eq!(parameters, vec!["x", "y"]);
            assert_eq!(body.to_string(), "(x + y)");
        }
        other => panic!("expected macro literal, got {:?}", other),
    }
}

#[test]
fn parse_errors_are_collected() {
    let mut parser = Parser::new(Lexer::new("let x 5;"));
    parser.parse_program();
    assert!(parser
        .errors()
        .iter()
        .any(|e| e == "expected next token to be =, got INT instead"));

    let mut parser = Parser::new(Lexer::new("let = 10;"));
    parser.parse_program();
    assert!(parser
        .errors()
        .iter()
        .any(|e| e == "expected next token to be IDENT, got = instead"));
}
