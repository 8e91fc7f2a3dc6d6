//! End-to-end validation against on-disk CSS specs.

use std::io::Write;

use stylecheck::prelude::*;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

const AMP4ADS_SPEC: &str = r#"
validate_amp4ads = true

[[at_rules]]
name = "$DEFAULT"
block_type = "parse-as-error"

[[at_rules]]
name = "font-face"
block_type = "parse-as-declarations"

[[at_rules]]
name = "keyframes"
block_type = "parse-as-rules"

[[at_rules]]
name = "media"
block_type = "parse-as-rules"

[[at_rules]]
name = "supports"
block_type = "parse-as-rules"
"#;

fn spec_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write spec");
    file
}

#[test]
fn test_spec_from_file() {
    init_logging();
    let file = spec_file(AMP4ADS_SPEC);
    let spec = CssSpec::from_file(file.path()).expect("Failed to load spec");
    assert!(spec.validate_amp4ads);
    assert!(spec.is_at_rule_valid("-webkit-keyframes"));
    assert!(!spec.is_at_rule_valid("import"));
}

#[test]
fn test_spec_file_round_trip() {
    init_logging();
    let mut spec = CssSpec::from_toml_str(AMP4ADS_SPEC).expect("Failed to parse spec");
    spec.allow_important = true;
    spec.declarations
        .insert("display".into(), vec!["block".into(), "none".into()]);

    let file = spec_file(&spec.to_toml_string().expect("Failed to serialize spec"));
    let reloaded = CssSpec::from_file(file.path()).expect("Failed to reload spec");
    assert_eq!(reloaded, spec);
}

#[test]
fn test_invalid_spec_file() {
    init_logging();
    let file = spec_file("allow_important = \"yes\"");
    let result = CssSpec::from_file(file.path());
    assert!(matches!(result, Err(Error::Toml { .. })), "{result:?}");
}

#[test]
fn test_amp4ads_stylesheet() {
    init_logging();
    let spec = CssSpec::from_toml_str(AMP4ADS_SPEC).expect("Failed to parse spec");
    let css = "@font-face { font-family: x; src: url(https://example.com/x.woff) }\n\
               .ad { position: fixed; transition: width 1s; background: url('bg.png') }\n\
               @keyframes fade { from { opacity: 0; width: 0 } to { opacity: 1 } }\n\
               @media screen and (max-width: 300px) { .ad { position: absolute } }\n\
               @import 'more.css';";
    let report = validate_stylesheet(css, 1, 0, &spec);

    let found: Vec<(ErrorCode, SourcePos)> = report
        .errors
        .iter()
        .map(|e| (e.code(), e.pos()))
        .collect();
    assert_eq!(
        found,
        [
            (
                ErrorCode::CssSyntaxDisallowedPropertyValueWithHint,
                SourcePos::new(2, 23)
            ),
            (ErrorCode::CssSyntaxDisallowedPropertyValue, SourcePos::new(2, 6)),
            (
                ErrorCode::CssSyntaxPropertyDisallowedWithinAtRule,
                SourcePos::new(3, 37)
            ),
            (ErrorCode::CssSyntaxInvalidAtRule, SourcePos::new(5, 0)),
        ]
    );

    let urls: Vec<(&str, &str)> = report
        .urls
        .iter()
        .map(|u| (u.utf8_url.as_str(), u.at_rule_scope.as_str()))
        .collect();
    assert_eq!(
        urls,
        [("https://example.com/x.woff", "font-face"), ("bg.png", "")]
    );

    let types: Vec<String> = report.media_types.iter().map(|t| t.string_value()).collect();
    assert_eq!(types, ["screen"]);
}

#[test]
fn test_context_name_replaces_placeholder() {
    init_logging();
    let report = validate_stylesheet("a { b: c !important }", 1, 0, &CssSpec::default());
    let mut error = report.errors[0].clone();
    assert_eq!(error.params(), ["style"]);
    error.set_context_name("style amp-custom");
    assert_eq!(error.params(), ["style amp-custom"]);
}

#[test]
fn test_lexical_errors_are_reported_with_pass_errors() {
    init_logging();
    let spec = CssSpec::from_toml_str(AMP4ADS_SPEC).expect("Failed to parse spec");
    let report = validate_stylesheet("a { content: \"broken\n; position: sticky }", 1, 0, &spec);
    let codes: Vec<ErrorCode> = report.errors.iter().map(ErrorToken::code).collect();
    assert_eq!(
        codes,
        [
            ErrorCode::CssSyntaxUnterminatedString,
            ErrorCode::CssSyntaxDisallowedPropertyValue,
        ]
    );
}

#[test]
fn test_inline_style_end_to_end() {
    init_logging();
    let spec = spec_file("[declarations]\ncolor = []\nbackground = []\n");
    let spec = CssSpec::from_file(spec.path()).expect("Failed to load spec");

    let report = validate_inline_style("color: red; background: url(a.png)", 4, 10, &spec);
    assert!(report.is_valid(), "{:?}", report.errors);
    assert_eq!(report.urls.len(), 1);
    assert_eq!(report.urls[0].pos(), SourcePos::new(4, 34));

    let report = validate_inline_style("margin: 0", 4, 10, &spec);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(
        report.errors[0].params(),
        ["style", "margin", "['background', 'color']"]
    );
}

#[test]
fn test_deeply_nested_input_degrades() {
    init_logging();
    let css = format!("a {{ b: {}c{} }}", "(".repeat(500), ")".repeat(500));
    let report = validate_stylesheet(&css, 1, 0, &CssSpec::default());
    assert!(
        report
            .errors
            .iter()
            .any(|e| e.code() == ErrorCode::CssExcessivelyNested)
    );
}

#[test]
fn test_media_bodies_are_validated_in_any_case() {
    init_logging();
    let file = spec_file(AMP4ADS_SPEC);
    let spec = CssSpec::from_file(file.path()).expect("Failed to load spec");

    for name in ["media", "MEDIA", "Media"] {
        let css = format!("@{name} print {{ .ad {{ position: fixed; background: url(bg.png) }} }}");
        let report = validate_stylesheet(&css, 1, 0, &spec);

        let codes: Vec<ErrorCode> = report.errors.iter().map(ErrorToken::code).collect();
        assert_eq!(codes, [ErrorCode::CssSyntaxDisallowedPropertyValue], "@{name}");
        assert_eq!(report.errors[0].pos(), SourcePos::new(1, 21));

        let urls: Vec<(&str, &str)> = report
            .urls
            .iter()
            .map(|u| (u.utf8_url.as_str(), u.at_rule_scope.as_str()))
            .collect();
        assert_eq!(urls, [("bg.png", name)], "@{name}");
    }
}

#[test]
fn test_empty_spec_file_keeps_builtin_block_types() {
    init_logging();
    let file = spec_file("validate_amp4ads = true\n");
    let spec = CssSpec::from_file(file.path()).expect("Failed to load spec");

    let css = "@MEDIA screen { a { position: sticky; b: url(x.png) } }\n\
               @font-face { src: url(f.woff) }";
    let report = validate_stylesheet(css, 1, 0, &spec);
    let codes: Vec<ErrorCode> = report.errors.iter().map(ErrorToken::code).collect();
    assert_eq!(codes, [ErrorCode::CssSyntaxDisallowedPropertyValue]);

    let urls: Vec<(&str, &str)> = report
        .urls
        .iter()
        .map(|u| (u.utf8_url.as_str(), u.at_rule_scope.as_str()))
        .collect();
    assert_eq!(urls, [("x.png", "MEDIA"), ("f.woff", "font-face")]);
}
