// Scenario tests for the specification parser
//
// Covers the specification shapes found in real checking scripts plus the
// error taxonomy: syntax errors for malformed grammar, semantic errors for
// wrong statement counts, unknown aggregators/scopes and unresolvable fields.

use super::*;

const COIN_SPEC: &str = "
Input list of real;
Output real;
ACC Probability over runs [ Output ] == 0.5
";

fn semantic_message(text: &str) -> String {
    match parse(text) {
        Err(SpecError::Semantic { message, .. }) => message,
        other => panic!("Expected semantic error, got {:?}", other),
    }
}

fn syntax_message(text: &str) -> String {
    match parse(text) {
        Err(SpecError::Syntax { message, .. }) => message,
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_parse_coin_flip_spec() {
    let spec = parse(COIN_SPEC).unwrap();

    assert_eq!(spec.inputs, vec![ValueType::List(Box::new(ValueType::Real))]);
    assert_eq!(spec.output, ValueType::Real);
    assert_eq!(spec.clauses.len(), 1);

    let Clause::ProbabilityOverRuns(clause) = &spec.clauses[0];
    assert_eq!(clause.field, FieldExpr::Output);
    assert_eq!(clause.op, CmpOp::Eq);
    assert_eq!(clause.target, 0.5);
    assert_eq!(clause.line, 4);
}

#[test]
fn test_parse_list_without_of() {
    let spec = parse("Input list int, bool;\nOutput bool;\nACC Probability over runs [ Output ] == 0.25").unwrap();
    assert_eq!(
        spec.inputs,
        vec![ValueType::List(Box::new(ValueType::Int)), ValueType::Bool]
    );
}

#[test]
fn test_parse_nested_list_output_element() {
    let spec = parse(
        "Input int;\nOutput list of bool;\nACC Probability over runs [ Output[3] ] == 0.1;",
    )
    .unwrap();
    let Clause::ProbabilityOverRuns(clause) = &spec.clauses[0];
    assert_eq!(clause.field, FieldExpr::OutputElement(3));
}

#[test]
fn test_parse_multiple_clauses_and_comments() {
    let text = "# two-qubit register\n\
                Input real;\n\
                Output list of int;\n\
                ACC Probability over runs [ Output[0] ] == 0.5  # first qubit\n\
                ACC Probability over runs [ Output[1] ] == 0.5\n";
    let spec = parse(text).unwrap();
    assert_eq!(spec.clauses.len(), 2);
    assert_eq!(spec.clauses[0].line(), 4);
    assert_eq!(spec.clauses[1].line(), 5);
}

#[test]
fn test_parse_statements_in_any_order() {
    let spec = parse("ACC Probability over runs [ Output ] == 1\nOutput int;\nInput real;").unwrap();
    assert_eq!(spec.output, ValueType::Int);
}

#[test]
fn test_non_equality_operators_parse() {
    for op in ["!=", "<", ">", "<=", ">="] {
        let text = format!("Input real;\nOutput int;\nACC Probability over runs [ Output ] {} 0.3", op);
        let spec = parse(&text).unwrap();
        let Clause::ProbabilityOverRuns(clause) = &spec.clauses[0];
        assert_eq!(clause.op.symbol(), op);
    }
}

#[test]
fn test_missing_semicolon_is_syntax_error() {
    let message = syntax_message("Input real\nOutput int;\nACC Probability over runs [ Output ] == 0.5");
    assert!(message.contains("missing `;`"), "{}", message);
}

#[test]
fn test_missing_bracket_is_syntax_error() {
    let message = syntax_message("Input real;\nOutput int;\nACC Probability over runs Output ] == 0.5");
    assert!(message.contains("`[`"), "{}", message);
}

#[test]
fn test_truncated_clause_is_syntax_error() {
    let message = syntax_message("Input real;\nOutput int;\nACC Probability over runs [ Output ] ==");
    assert!(message.contains("unexpected end"), "{}", message);
}

#[test]
fn test_unknown_statement_is_syntax_error() {
    let message = syntax_message("Input real;\nOutput int;\nASSERT Output");
    assert!(message.contains("ASSERT"), "{}", message);
}

#[test]
fn test_unknown_type_is_syntax_error() {
    let message = syntax_message("Input string;\nOutput int;\nACC Probability over runs [ Output ] == 0.5");
    assert!(message.contains("unknown type `string`"), "{}", message);
}

#[test]
fn test_empty_spec_is_syntax_error() {
    assert!(matches!(parse(""), Err(SpecError::Syntax { .. })));
    assert!(matches!(parse("# only a comment\n"), Err(SpecError::Syntax { .. })));
}

#[test]
fn test_missing_input_is_semantic_error() {
    let message = semantic_message("Output int;\nACC Probability over runs [ Output ] == 0.5");
    assert!(message.contains("no Input"), "{}", message);
}

#[test]
fn test_missing_output_is_semantic_error() {
    let message = semantic_message("Input int;\nACC Probability over runs [ Output ] == 0.5");
    assert!(message.contains("no Output"), "{}", message);
}

#[test]
fn test_two_outputs_is_semantic_error() {
    let message = semantic_message(
        "Input int;\nOutput int;\nOutput real;\nACC Probability over runs [ Output ] == 0.5",
    );
    assert!(message.contains("exactly one Output"), "{}", message);

    let message = semantic_message("Input int;\nOutput int, real;\nACC Probability over runs [ Output ] == 0.5");
    assert!(message.contains("exactly one type"), "{}", message);
}

#[test]
fn test_missing_clause_is_semantic_error() {
    let message = semantic_message("Input int;\nOutput int;");
    assert!(message.contains("no acceptance clause"), "{}", message);
}

#[test]
fn test_unknown_aggregator_is_semantic_error() {
    let message = semantic_message("Input int;\nOutput int;\nACC Expectation over runs [ Output ] == 0.5");
    assert!(message.contains("unknown aggregator `Expectation`"), "{}", message);
}

#[test]
fn test_unknown_scope_is_semantic_error() {
    let message = semantic_message("Input int;\nOutput int;\nACC Probability over inputs [ Output ] == 0.5");
    assert!(message.contains("unknown scope `inputs`"), "{}", message);
}

#[test]
fn test_unknown_field_is_semantic_error() {
    let message = semantic_message("Input int;\nOutput int;\nACC Probability over runs [ Result ] == 0.5");
    assert!(message.contains("unknown field `Result`"), "{}", message);
}

#[test]
fn test_resource_field_is_semantic_error() {
    let message = semantic_message("Input int;\nOutput int;\nACC Probability over runs [ time ] == 0.5");
    assert!(message.contains("`time`"), "{}", message);
}

#[test]
fn test_field_must_resolve_against_output_type() {
    let message = semantic_message("Input int;\nOutput int;\nACC Probability over runs [ Output[0] ] == 0.5");
    assert!(message.contains("does not resolve"), "{}", message);

    let message = semantic_message("Input int;\nOutput list of int;\nACC Probability over runs [ Output ] == 0.5");
    assert!(message.contains("Output[k]"), "{}", message);
}

#[test]
fn test_probability_target_out_of_range() {
    let message = semantic_message("Input int;\nOutput int;\nACC Probability over runs [ Output ] == 1.5");
    assert!(message.contains("outside [0, 1]"), "{}", message);
}

#[test]
fn test_error_location_points_at_line() {
    let err = parse("Input int;\nOutput int;\nACC Probability over runs [ Output ] == 2").unwrap_err();
    assert_eq!(err.location().line, 3);
    assert!(err.to_string().contains("line 3"));
    assert!(err.to_string().contains("ACC Probability"));
}

#[test]
fn test_deeply_nested_list_is_rejected_without_overflow() {
    let text = format!(
        "Input {}real;\nOutput int;\nACC Probability over runs [ Output ] == 0.5",
        "list ".repeat(10_000)
    );
    let message = semantic_message(&text);
    assert!(message.contains("list nesting deeper than 32"), "{}", message);
}

#[test]
fn test_list_nesting_at_limit_is_accepted() {
    let text = format!(
        "Input {}real;\nOutput int;\nACC Probability over runs [ Output ] == 0.5",
        "list of ".repeat(MAX_LIST_DEPTH)
    );
    let spec = parse(&text).unwrap();
    let mut depth = 0;
    let mut ty = &spec.inputs[0];
    while let ValueType::List(inner) = ty {
        depth += 1;
        ty = inner;
    }
    assert_eq!(depth, MAX_LIST_DEPTH);
    assert_eq!(ty, &ValueType::Real);
}

#[test]
fn test_unexpected_end_points_past_last_token() {
    let err = parse("Input int;\nOutput int;\nACC Probability over").unwrap_err();
    assert!(matches!(err, SpecError::Syntax { .. }));
    // `over` starts at column 17 and is four characters wide
    assert_eq!((err.location().line, err.location().column), (3, 21));
}
