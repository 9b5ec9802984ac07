use pretty_assertions::assert_eq;

use plc_st_ast_lib::ast::*;
use plc_st_ast_lib::parser::parse_source_code;

const CORPUS: &[(&str, &str)] = &[
    (
        "program.st",
        r#"
PROGRAM Main
VAR
    (* holds the count *)
    count : INT := 0;
    flags : ARRAY [1..8] OF BOOL := [8(FALSE)];
    name : STRING[20] := 'pump $'A$'';
    timer : TON(PT := T#5S);
END_VAR
VAR
    pos AT %QW4 : WORD;
END_VAR
VAR CONSTANT
    LIMIT : DINT := 16#FF;
END_VAR
count := count + 1;   // bump
IF count > LIMIT AND NOT flags[1] THEN
    count := 0;
ELSIF count = 5 THEN
    flags[2] := TRUE;
ELSE
    ;
END_IF
CASE count OF
    1, 2: name := 'low';
    3..9: name := "mid";
ELSE
    name := 'high';
END_CASE
FOR count := 1 TO 10 BY 2 DO
    IF count MOD 3 = 0 THEN CONTINUE; END_IF
END_FOR
WHILE count < 100 DO
    count := count * 2;
END_WHILE
REPEAT
    count := count - 1;
UNTIL count <= 0
END_REPEAT
timer(IN := TRUE, Q => flags[3]);
pos := WORD#2#1010_0101;
END_PROGRAM
"#,
    ),
    (
        "types.st",
        r#"
TYPE
    E_Color : (Red, Green := 5, Blue) DINT := Green;
    Percent : INT (0..100) := 50;
    Point : STRUCT
        x : REAL := 1.5;
        y : REAL;
    END_STRUCT
    Point3 EXTENDS Point : STRUCT
        z : REAL;
    END_STRUCT
    Matrix : ARRAY [0..2, 0..2] OF LREAL;
    Label : STRING(80) := 'none';
    Origin : Point := (x := 0.0, y := 0.0);
    Handle : POINTER TO Point;
END_TYPE
"#,
    ),
    (
        "function_block.st",
        r#"
{attribute 'hide'}
FUNCTION_BLOCK ABSTRACT FB_Motor EXTENDS FB_Base IMPLEMENTS I_Motor, I_Device
VAR_INPUT
    enable : BOOL R_EDGE;
    speed : REAL;
END_VAR
VAR_OUTPUT
    running : BOOL;
END_VAR
VAR_IN_OUT
    shared : ARRAY [*] OF INT;
END_VAR
VAR_EXTERNAL
    g_mode : E_Mode;
END_VAR
running := enable AND speed > 0.0;
END_FUNCTION_BLOCK

METHOD PUBLIC FINAL Start : BOOL
VAR_INST
    calls : UDINT;
END_VAR
calls := calls + 1;
THIS^.running S= TRUE;
Start := TRUE;
RETURN;
END_METHOD

ACTION Reset:
    running R= TRUE;
END_ACTION

FUNCTION Clamp : REAL
VAR_INPUT
    value, low, high : REAL;
END_VAR
Clamp := LIMIT(low, value, high);
END_FUNCTION
"#,
    ),
    (
        "globals.st",
        r#"
VAR_GLOBAL RETAIN
    g_counter : UDINT := 0;
    g_start AT %IX0.0 : BOOL;
    g_any AT %Q* : INT;
    g_started : DATE_AND_TIME := DT#2024-01-31-12:30:05;
    g_day : TIME_OF_DAY := TOD#06:00:00;
END_VAR
"#,
    ),
    (
        "interface.st",
        r#"
INTERFACE I_Motor
    METHOD Start : BOOL
    END_METHOD
END_INTERFACE

PROGRAM P
x := y ** 2 - (a - b) / 4;
ptr REF= target;
END_PROGRAM
"#,
    ),
];

fn parse(source: &str, filename: &str) -> SourceCode {
    match parse_source_code(source, filename) {
        Ok(code) => code,
        Err(err) => panic!("{filename}: {err}"),
    }
}

fn first_body(code: &SourceCode) -> &StatementList {
    let body = match &code.items()[0] {
        SourceCodeItem::Program(p) => p.body.as_ref(),
        other => panic!("expected a program, found {other}"),
    };
    &body.expect("program has a body").statements
}

#[test]
fn round_trip_is_idempotent() {
    for (filename, source) in CORPUS {
        let first = parse(source, filename);
        let rendered = first.to_string();
        let second = parse(&rendered, filename);
        assert_eq!(first, second, "{filename} changed after a round trip");
        assert_eq!(rendered, second.to_string(), "{filename} rendered differently");
    }
}

#[test]
fn operator_chains_fold_left() {
    let code = parse("PROGRAM P\ny := 1 + 2 + 3;\nEND_PROGRAM", "p.st");
    let Statement::Assignment(assignment) = &first_body(&code).statements[0] else {
        panic!("expected an assignment");
    };
    let Expression::Binary(outer) = &assignment.value else {
        panic!("expected a binary operation");
    };
    assert_eq!(outer.right.to_string(), "3");
    assert!(matches!(*outer.left, Expression::Binary(ref inner) if inner.left.to_string() == "1"));
    assert_eq!(assignment.value.to_string(), "1 + 2 + 3");
}

#[test]
fn integer_literals_keep_their_base() {
    let code = parse("PROGRAM P\na := INT#16#2A;\nb := 42;\nEND_PROGRAM", "p.st");
    let rendered = first_body(&code).to_string();
    assert_eq!(rendered, "a := INT#16#2A;\nb := 42;");
}

#[test]
fn durations_compose_their_parts() {
    let code = parse("PROGRAM P\na := t#1d2h;\nb := TIME#30s;\nEND_PROGRAM", "p.st");
    assert_eq!(
        first_body(&code).to_string(),
        "a := TIME#1D2H;\nb := TIME#30S;"
    );
}

#[test]
fn comment_lands_on_the_declaration_below_it() {
    let source = "PROGRAM P\nVAR\n    (* holds the count *)\n    x : INT;\nEND_VAR\nEND_PROGRAM";
    let code = parse(source, "p.st");
    let block = &code.items()[0].variable_blocks()[0];
    assert!(block.meta().comments.is_empty());
    let index = code.items()[0].declarations_by_name();
    let x = index.get("x").expect("x is declared");
    assert_eq!(x.meta.comments.len(), 1);
    assert_eq!(
        block.to_string(),
        "VAR\n    (* holds the count *)\n    x : INT;\nEND_VAR"
    );
}

#[test]
fn minimal_if_renders_without_else_lines() {
    let code = parse("PROGRAM P\nif ok then x := 1; end_if;\nEND_PROGRAM", "p.st");
    assert_eq!(first_body(&code).to_string(), "IF ok THEN\n    x := 1;\nEND_IF");
}

#[test]
fn else_clause_is_only_taken_from_the_end() {
    let code = parse(
        "PROGRAM P\nIF a THEN x := 1; ELSIF b THEN x := 2; ELSE x := 3; END_IF\nIF a THEN ELSE END_IF\nEND_PROGRAM",
        "p.st",
    );
    let statements = &first_body(&code).statements;
    let Statement::If(full) = &statements[0] else {
        panic!("expected an if statement");
    };
    assert_eq!(full.else_ifs.len(), 1);
    assert!(full.else_clause.is_some());
    let Statement::If(empty) = &statements[1] else {
        panic!("expected an if statement");
    };
    assert!(empty.statements.is_none());
    assert!(empty.else_clause.as_ref().is_some_and(|e| e.statements.is_none()));
}

#[test]
fn interfaces_pass_through_verbatim() {
    let source = "(* api *)\nINTERFACE I_Run\n  METHOD Run\n  END_METHOD (* keep *)\nEND_INTERFACE";
    let code = parse(source, "i.st");
    let SourceCodeItem::Unknown(item) = &code.items()[0] else {
        panic!("expected a pass-through item");
    };
    assert_eq!(item.rule, "interface_declaration");
    assert_eq!(code.to_string(), source);
}

#[test]
fn pass_through_items_do_not_grow_across_round_trips() {
    let source = "INTERFACE I\nEND_INTERFACE\n\nPROGRAM P\n    x := 1;\nEND_PROGRAM";
    let mut rendered = source.to_string();
    for _ in 0..3 {
        rendered = parse(&rendered, "i.st").to_string();
        assert_eq!(rendered, source);
    }
}

#[test]
fn comment_after_a_pass_through_item_belongs_to_the_next_unit() {
    let source = "INTERFACE I\nEND_INTERFACE\n// next\nPROGRAM P\nEND_PROGRAM";
    let code = parse(source, "i.st");
    let SourceCodeItem::Unknown(item) = &code.items()[0] else {
        panic!("expected a pass-through item");
    };
    assert_eq!(item.text, "INTERFACE I\nEND_INTERFACE");
    assert!(item.meta.comments.is_empty());
    assert_eq!(code.items()[1].meta().comments.len(), 1);
    assert_eq!(
        code.to_string(),
        "INTERFACE I\nEND_INTERFACE\n\n// next\nPROGRAM P\nEND_PROGRAM"
    );
}

#[test]
fn comment_markers_inside_strings_are_text() {
    let code = parse("PROGRAM P\ns := '(* not a comment *)';\nEND_PROGRAM", "p.st");
    let statement = &first_body(&code).statements[0];
    assert!(statement.meta().comments.is_empty());
    assert_eq!(statement.to_string(), "s := '(* not a comment *)';");
}

#[test]
fn multi_line_comments_keep_their_shape() {
    let source = "PROGRAM P\n    (* first\n       second *)\n    x := 1;\nEND_PROGRAM";
    let code = parse(source, "p.st");
    assert_eq!(
        code.to_string(),
        "PROGRAM P\n    (* first\n       second *)\n    x := 1;\nEND_PROGRAM"
    );
}

#[test]
fn keyword_case_is_normalized() {
    let code = parse("function_block fb\nvar x : int; end_var\nx := x + 1;\nend_function_block", "f.st");
    assert_eq!(
        code.to_string(),
        "FUNCTION_BLOCK fb\n    VAR\n        x : int;\n    END_VAR\n    x := x + 1;\nEND_FUNCTION_BLOCK"
    );
    assert!(code.find("FB").is_some());
}

#[test]
fn construction_errors_are_reported_as_such() {
    use plc_st_ast_lib::transform::{Args, Element};
    use plc_st_ast_lib::parser::Rule;

    let handler = plc_st_ast_lib::transform::handler_for(Rule::for_statement).expect("registered");
    let args = Args::new(
        Rule::for_statement,
        3,
        0..0,
        vec![Element::Token(Rule::identifier, Token::new("i", 3))],
    );
    let err = handler(args).unwrap_err();
    assert_eq!(err.rule, "for_statement");
    assert_eq!(err.line, 3);
    assert_eq!(err.received, 1);
}
