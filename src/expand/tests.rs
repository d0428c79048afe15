use super::preprocess;
use crate::diagnostics::Severity;
use crate::token::{Punct, TokenKind};

fn spellings(source: &str) -> Vec<String> {
    let (tokens, diagnostics) = preprocess(source, "test.c");
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics for {source:?}: {diagnostics:?}"
    );
    tokens.iter().map(|token| token.spelling()).collect()
}

fn spellings_with_diagnostics(source: &str) -> (Vec<String>, Vec<String>) {
    let (tokens, diagnostics) = preprocess(source, "test.c");
    (
        tokens.iter().map(|token| token.spelling()).collect(),
        diagnostics
            .iter()
            .map(|diagnostic| diagnostic.message.clone())
            .collect(),
    )
}

#[test]
fn object_macro_expands_every_mention() {
    assert_eq!(spellings("#define A 1\nA A A"), ["1", "1", "1"]);
}

#[test]
fn expanded_tokens_are_independent_copies() {
    let (tokens, _) = preprocess("#define A 1\nA A", "test.c");
    assert_eq!(tokens.len(), 2);
    assert!(
        !std::ptr::eq(tokens[0].text.as_ptr(), tokens[1].text.as_ptr()),
        "each expansion duplicates the body tokens"
    );
}

#[test]
fn self_recursion_is_blocked_by_the_hideset() {
    assert_eq!(spellings("#define A A\nA"), ["A"]);
}

#[test]
fn mutual_recursion_terminates_after_one_round_trip() {
    assert_eq!(spellings("#define X Y\n#define Y X\nX"), ["X"]);
    assert_eq!(spellings("#define X Y\n#define Y X\nY"), ["Y"]);
}

#[test]
fn function_macro_substitutes_arguments() {
    assert_eq!(
        spellings("#define M(x,y) x+y\nM(1,2)"),
        ["1", "+", "2"]
    );
}

#[test]
fn parenthesized_commas_do_not_split_arguments() {
    assert_eq!(
        spellings("#define M(x,y) x+y\nM((1,2),3)"),
        ["(", "1", ",", "2", ")", "+", "3"]
    );
}

#[test]
fn variadic_arguments_absorb_remaining_commas() {
    assert_eq!(
        spellings("#define V(x,...) x:__VA_ARGS__\nV(1,2,3)"),
        ["1", ":", "2", ",", "3"]
    );
}

#[test]
fn named_variadic_parameter_binds_the_tail() {
    assert_eq!(
        spellings("#define V(x, rest...) x|rest\nV(1,2,3)"),
        ["1", "|", "2", ",", "3"]
    );
}

#[test]
fn stringize_preserves_recorded_spacing() {
    let (tokens, diagnostics) = preprocess("#define S(x) #x\nS(a + b)", "test.c");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Str(crate::token::EncodingPrefix::None));
    assert_eq!(tokens[0].text, "a + b");
}

#[test]
fn stringize_requotes_string_arguments() {
    let (tokens, _) = preprocess("#define S(x) #x\nS(\"hi\")", "test.c");
    assert_eq!(tokens[0].text, "\"hi\"", "inner quotes are escaped in the spelling");
}

#[test]
fn paste_forms_one_identifier() {
    let (tokens, diagnostics) = preprocess("#define P(x,y) x##y\nP(fo,o)", "test.c");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Ident);
    assert_eq!(tokens[0].text, "foo");
}

#[test]
fn paste_forms_one_number() {
    let (tokens, _) = preprocess("#define P(x,y) x##y\nP(1,2)", "test.c");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].text, "12");
}

#[test]
fn empty_argument_paste_leaves_no_stray_token() {
    assert_eq!(
        spellings("#define P2(x,y) a x##y b\nP2(,z)"),
        ["a", "z", "b"]
    );
}

#[test]
fn empty_right_argument_keeps_the_left_token() {
    assert_eq!(spellings("#define P2(x,y) a x##y b\nP2(q,)"), ["a", "q", "b"]);
}

#[test]
fn paste_result_is_rescanned_for_macros() {
    assert_eq!(
        spellings("#define FOO 99\n#define GLUE(a,b) a##b\nGLUE(F,OO)"),
        ["99"]
    );
}

#[test]
fn multi_token_paste_is_an_error_not_a_split() {
    let (tokens, messages) = spellings_with_diagnostics("#define P(x,y) x##y\nP(1,+)");
    assert!(
        messages.iter().any(|message| message.contains("invalid preprocessing token")),
        "expected a paste diagnostic, got {messages:?}"
    );
    assert_eq!(tokens, ["P"], "the macro name stays as a literal token");
}

#[test]
fn function_macro_without_parens_is_not_an_invocation() {
    assert_eq!(spellings("#define F(x) x\nF + 1"), ["F", "+", "1"]);
}

#[test]
fn missing_closing_paren_reports_and_leaves_the_name() {
    let (tokens, messages) = spellings_with_diagnostics("#define F(x) x\nF(1, 2");
    assert!(
        messages.iter().any(|message| message.contains("unterminated argument list")),
        "{messages:?}"
    );
    assert_eq!(tokens, ["F"]);
}

#[test]
fn nested_invocations_expand_transitively() {
    assert_eq!(
        spellings("#define TWICE(x) x x\n#define ONE 1\nTWICE(ONE)"),
        ["1", "1"]
    );
}

#[test]
fn arguments_are_captured_unexpanded_but_rescanned() {
    // The capture is raw; expansion happens on rescan of the whole result.
    assert_eq!(
        spellings("#define A B\n#define B 7\n#define ID(x) x\nID(A)"),
        ["7"]
    );
}

#[test]
fn closing_paren_hideset_intersection_allows_reexpansion_through_args() {
    // The invocation comes out of a previous expansion; the intersection
    // with the closing parenthesis hideset keeps it expandable.
    assert_eq!(
        spellings("#define CALL(f) f(9)\n#define NINE(x) x\nCALL(NINE)"),
        ["9"]
    );
}

#[test]
fn object_macro_chain_terminates_with_partial_result() {
    // Z -> Y -> X stops when X re-appears hidden.
    assert_eq!(
        spellings("#define X Y\n#define Y X\n#define Z X\nZ"),
        ["X"]
    );
}

#[test]
fn redefinition_always_warns_and_replaces() {
    let (tokens, diagnostics) = preprocess("#define A 1\n#define A 1\nA", "test.c");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].text, "1");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert!(diagnostics[0].message.contains("redefined"));
}

#[test]
fn undef_removes_a_definition() {
    assert_eq!(spellings("#define A 1\n#undef A\nA"), ["A"]);
}

#[test]
fn unknown_directive_is_reported_and_skipped() {
    let (tokens, messages) = spellings_with_diagnostics("#include <stdio.h>\nx");
    assert!(
        messages.iter().any(|message| message.contains("unsupported preprocessor directive")),
        "{messages:?}"
    );
    assert_eq!(tokens, ["x"]);
}

#[test]
fn null_directive_is_ignored() {
    assert_eq!(spellings("#\nx"), ["x"]);
}

#[test]
fn hash_mid_line_is_an_ordinary_token() {
    assert_eq!(spellings("a # define"), ["a", "#", "define"]);
}

#[test]
fn digraph_hash_introduces_directives() {
    assert_eq!(spellings("%:define A 4\nA"), ["4"]);
}

#[test]
fn body_may_use_digraph_paste() {
    let (tokens, _) = preprocess("#define P(x,y) x%:%:y\nP(ab,cd)", "test.c");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].text, "abcd");
}

#[test]
fn define_body_cannot_start_or_end_with_paste() {
    let (_, messages) = spellings_with_diagnostics("#define A ## b\nA");
    assert!(
        messages.iter().any(|message| message.contains("either end")),
        "{messages:?}"
    );
    let (_, messages) = spellings_with_diagnostics("#define B b ##\nB");
    assert!(
        messages.iter().any(|message| message.contains("either end")),
        "{messages:?}"
    );
}

#[test]
fn malformed_parameter_lists_discard_the_directive() {
    for source in [
        "#define M(a b) a\nM(1)",
        "#define M(,a) a\nM(1)",
        "#define M(a,) a\nM(1)",
        "#define M(a,a) a\nM(1)",
    ] {
        let (_, diagnostics) = preprocess(source, "test.c");
        assert!(
            diagnostics.iter().any(|diagnostic| diagnostic.severity.is_error()),
            "expected an error for {source:?}"
        );
    }
}

#[test]
fn stray_hash_in_function_body_abandons_the_invocation() {
    let (tokens, messages) =
        spellings_with_diagnostics("#define M(x) # 1\nM(2)");
    assert!(
        messages.iter().any(|message| message.contains("`#` is not followed")),
        "{messages:?}"
    );
    assert_eq!(tokens, ["M"]);
}

#[test]
fn line_macro_reports_the_invocation_line() {
    let (tokens, _) = preprocess("__LINE__\n__LINE__", "test.c");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].text, "1");
    assert_eq!(tokens[1].text, "2");
    assert_eq!(tokens[0].kind, TokenKind::Number);
}

#[test]
fn file_macro_expands_to_the_buffer_name() {
    let (tokens, _) = preprocess("__FILE__", "demo.c");
    assert_eq!(tokens[0].kind, TokenKind::Str(crate::token::EncodingPrefix::None));
    assert_eq!(tokens[0].text, "demo.c");
}

#[test]
fn counter_macro_increments_per_use() {
    let (tokens, _) = preprocess("__COUNTER__ __COUNTER__ __COUNTER__", "test.c");
    let texts: Vec<&str> = tokens.iter().map(|token| token.text.as_str()).collect();
    assert_eq!(texts, ["0", "1", "2"]);
}

#[test]
fn expansion_keeps_the_invocation_site_spacing() {
    let (tokens, _) = preprocess("#define A 1\nx   A", "test.c");
    assert_eq!(tokens[1].text, "1");
    assert_eq!(tokens[1].leading_space, 3, "spacing moves onto the first copy");
}

#[test]
fn arguments_may_span_multiple_lines() {
    assert_eq!(
        spellings("#define M(x,y) x+y\nM(1,\n   2)"),
        ["1", "+", "2"]
    );
}

#[test]
fn eof_token_repeats_after_exhaustion() {
    let mut expander = super::Expander::new("#define A 1\nA", "test.c");
    let first = expander.next_token();
    assert_eq!(first.text, "1");
    assert!(expander.next_token().is_eof());
    assert!(expander.next_token().is_eof());
}

#[test]
fn predefined_macros_can_be_installed_through_the_table() {
    use super::Macro;
    let mut expander = super::Expander::new("VERSION", "test.c");
    let body = {
        let (tokens, _) = crate::lexer::lex("3", "<built-in>");
        tokens
            .into_iter()
            .filter(|token| token.kind == TokenKind::Number)
            .collect()
    };
    expander.table_mut().define("VERSION", Macro::Object { body });
    assert_eq!(expander.next_token().text, "3");
}

#[test]
fn comments_count_as_a_single_space() {
    let (tokens, _) = preprocess("#define S(x) #x\nS(a/* gap */b)", "test.c");
    assert_eq!(tokens[0].text, "a b");
}

#[test]
fn keyword_like_identifiers_are_just_identifiers() {
    assert_eq!(spellings("define undef"), ["define", "undef"]);
}

#[test]
fn expander_output_is_punctuation_aware() {
    let (tokens, _) = preprocess("#define SEMI ;\nSEMI", "test.c");
    assert_eq!(tokens[0].kind, TokenKind::Punct(Punct::Semi));
}
