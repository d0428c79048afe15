use precc::{EncodingPrefix, Punct, Token, TokenKind, preprocess};

/// Rebuild source text from spellings plus the recorded spacing.
fn reserialize(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (index, token) in tokens.iter().enumerate() {
        if token.at_line_start && index > 0 {
            out.push('\n');
        }
        for _ in 0..token.leading_space {
            out.push(' ');
        }
        out.push_str(&token.spelling());
    }
    out
}

#[test]
fn directive_free_input_round_trips() {
    let source = "int main(void) {\n  return x + 41;\n}";
    let (tokens, diagnostics) = preprocess(source, "main.c");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(reserialize(&tokens), source);
}

#[test]
fn expanded_stream_reads_like_source() {
    let source = "#define SQUARE(x) ((x) * (x))\nint nine = SQUARE(3);";
    let (tokens, diagnostics) = preprocess(source, "main.c");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(reserialize(&tokens), "int nine = ((3) * (3));");
}

#[test]
fn a_small_program_expands_end_to_end() {
    let source = "\
#define LEN 4
#define AT(base, i) (base)[(i)]
#define MSG \"hi\"

int total(int *v) {
  int sum = 0;
  for (int i = 0; i < LEN; i++)
    sum += AT(v, i);
  puts(MSG);
  return sum;
}
";
    let (tokens, diagnostics) = preprocess(source, "main.c");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let expanded = reserialize(&tokens);
    assert!(expanded.contains("i < 4;"), "LEN expanded: {expanded}");
    assert!(
        expanded.contains("sum += (v)[(i)];"),
        "AT expanded: {expanded}"
    );
    assert!(expanded.contains("puts(\"hi\");"), "MSG expanded: {expanded}");
    assert!(
        !expanded.contains("define"),
        "directives must not leak into the stream"
    );
}

#[test]
fn tokens_carry_final_locations() {
    let source = "#define ONE 1\nint x = ONE;";
    let (tokens, _) = preprocess(source, "main.c");
    let one = tokens
        .iter()
        .find(|token| token.text == "1")
        .map(|token| (token.location.line, &*token.location.file));
    // The copy is stamped from the definition site of the body token.
    assert_eq!(one, Some((1, "main.c")));
    let int = &tokens[0];
    assert_eq!((int.location.line, int.location.column), (2, 1));
}

#[test]
fn lexical_and_macro_diagnostics_surface_together() {
    let source = "#define P(x,y) x##y\n\"open\nP(1,+)";
    let (tokens, diagnostics) = preprocess(source, "main.c");
    let messages: Vec<&str> = diagnostics
        .iter()
        .map(|diagnostic| diagnostic.message.as_str())
        .collect();
    assert!(
        messages
            .iter()
            .any(|message| message.contains("unterminated string literal")),
        "{messages:?}"
    );
    assert!(
        messages
            .iter()
            .any(|message| message.contains("invalid preprocessing token")),
        "{messages:?}"
    );
    // The stream is still total: the bad literal and the unexpanded macro
    // name both come through as tokens.
    assert!(tokens.iter().any(|token| token.text == "open"));
    assert!(tokens.iter().any(|token| token.text == "P"));
}

#[test]
fn variadic_logging_macro_expands_like_the_real_thing() {
    let source = "#define debug(fmt, ...) fprintf(stderr, fmt, __VA_ARGS__)\n\
                  debug(\"x=%d\", x);";
    let (tokens, diagnostics) = preprocess(source, "main.c");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(
        reserialize(&tokens),
        "fprintf(stderr, \"x=%d\", x);"
    );
}

#[test]
fn stringize_and_paste_compose() {
    let source = "#define NAME(n) config_##n\n\
                  #define DESCRIBE(n) #n\n\
                  NAME(port) DESCRIBE(NAME(port))";
    let (tokens, diagnostics) = preprocess(source, "main.c");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(tokens[0].kind, TokenKind::Ident);
    assert_eq!(tokens[0].text, "config_port");
    // Stringize captures its argument unexpanded.
    assert_eq!(tokens[1].kind, TokenKind::Str(EncodingPrefix::None));
    assert_eq!(tokens[1].text, "NAME(port)");
}

#[test]
fn punctuation_reaches_the_consumer_unscathed() {
    let (tokens, _) = preprocess("a <<= b ->c ... d", "main.c");
    let puncts: Vec<Punct> = tokens
        .iter()
        .filter_map(|token| match token.kind {
            TokenKind::Punct(punct) => Some(punct),
            _ => None,
        })
        .collect();
    assert_eq!(
        puncts,
        [Punct::ShlAssign, Punct::Arrow, Punct::Ellipsis]
    );
}
