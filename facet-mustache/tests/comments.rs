use facet_mustache::render;
use facet_testhelpers::test;

#[test]
fn inline_comment_is_removed() {
    assert_eq!(
        render("12345{{! Comment Block! }}67890", &()).unwrap(),
        "1234567890"
    );
}

#[test]
fn multiline_comment_is_removed() {
    assert_eq!(
        render("12345{{!\n  This is a\n  multi-line comment...\n}}67890\n", &()).unwrap(),
        "1234567890\n"
    );
}

#[test]
fn standalone_comment_line_is_removed() {
    assert_eq!(
        render("Begin.\n{{! Comment Block! }}\nEnd.\n", &()).unwrap(),
        "Begin.\nEnd.\n"
    );
}

#[test]
fn indented_standalone_comment() {
    assert_eq!(
        render("Begin.\n  {{! Indented Comment Block! }}\nEnd.\n", &()).unwrap(),
        "Begin.\nEnd.\n"
    );
}

#[test]
fn standalone_crlf() {
    assert_eq!(
        render("|\r\n{{! Standalone Comment }}\r\n|", &()).unwrap(),
        "|\r\n|"
    );
}

#[test]
fn standalone_without_previous_line() {
    assert_eq!(render("  {{! I'm Still Standalone }}\n!", &()).unwrap(), "!");
}

#[test]
fn standalone_without_newline() {
    assert_eq!(render("!\n  {{! I'm Still Standalone }}", &()).unwrap(), "!\n");
}

#[test]
fn multiline_standalone() {
    assert_eq!(
        render("Begin.\n{{!\nSomething's going on here...\n}}\nEnd.\n", &()).unwrap(),
        "Begin.\nEnd.\n"
    );
}

#[test]
fn inline_comment_keeps_surrounding_whitespace() {
    assert_eq!(
        render("  12 {{! 34 }}\n", &()).unwrap(),
        "  12 \n"
    );
}

#[test]
fn comment_with_braces() {
    assert_eq!(render("*{{! {{comment}} }*", &()).unwrap(), "* }*");
}
