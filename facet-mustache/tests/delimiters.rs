use facet::Facet;
use facet_mustache::{render, render_with_partials};
use facet_testhelpers::test;

#[derive(Facet)]
struct Text {
    text: &'static str,
}

#[derive(Facet)]
struct Section {
    section: bool,
    data: &'static str,
}

const HEY: Text = Text { text: "Hey!" };

#[test]
fn pair_behavior() {
    assert_eq!(render("{{=<% %>=}}(<%text%>)", &HEY).unwrap(), "(Hey!)");
}

#[test]
fn special_characters() {
    assert_eq!(render("({{=[ ]=}}[text])", &HEY).unwrap(), "(Hey!)");
}

#[test]
fn regex_metacharacters_are_literal() {
    assert_eq!(render("{{=.* *.=}}(.*text*.)", &HEY).unwrap(), "(Hey!)");
}

#[test]
fn delimiters_apply_to_sections() {
    let data = Section {
        section: true,
        data: "I got interpolated.",
    };
    let template = "[\n{{#section}}\n  {{data}}\n  |data|\n{{/section}}\n{{= | | =}}\n|#section|\n  {{data}}\n  |data|\n|/section|\n]\n";
    assert_eq!(
        render(template, &data).unwrap(),
        "[\n  I got interpolated.\n  |data|\n  {{data}}\n  I got interpolated.\n]\n"
    );
}

#[test]
fn delimiters_apply_to_inverted_sections() {
    let data = Section {
        section: false,
        data: "I got interpolated.",
    };
    let template = "[\n{{^section}}\n  {{data}}\n  |data|\n{{/section}}\n{{= | | =}}\n|^section|\n  {{data}}\n  |data|\n|/section|\n]\n";
    assert_eq!(
        render(template, &data).unwrap(),
        "[\n  I got interpolated.\n  |data|\n  {{data}}\n  I got interpolated.\n]\n"
    );
}

#[test]
fn partials_start_with_default_delimiters() {
    let partials = [("include", ".{{value}}.")];
    #[derive(Facet)]
    struct Data {
        value: &'static str,
    }
    let data = Data { value: "yes" };
    assert_eq!(
        render_with_partials("[ {{>include}} ]\n{{= | | =}}\n[ |>include| ]\n", &partials, &data)
            .unwrap(),
        "[ .yes. ]\n[ .yes. ]\n"
    );
}

#[test]
fn partials_do_not_leak_delimiters() {
    let partials = [("include", ".{{value}}. {{= | | =}} .|value|.")];
    #[derive(Facet)]
    struct Data {
        value: &'static str,
    }
    let data = Data { value: "yes" };
    assert_eq!(
        render_with_partials("[ {{>include}} ]\n[ .{{value}}.  .|value|. ]\n", &partials, &data)
            .unwrap(),
        "[ .yes.  .yes. ]\n[ .yes.  .|value|. ]\n"
    );
}

#[test]
fn surrounding_whitespace_is_kept() {
    assert_eq!(render("| {{=@ @=}} |", &()).unwrap(), "|  |");
}

#[test]
fn outlying_whitespace_inline() {
    assert_eq!(render(" | {{=@ @=}}\n", &()).unwrap(), " | \n");
}

#[test]
fn standalone_tag_line_is_removed() {
    assert_eq!(render("Begin.\n{{=@ @=}}\nEnd.\n", &()).unwrap(), "Begin.\nEnd.\n");
}

#[test]
fn indented_standalone_tag() {
    assert_eq!(render("Begin.\n  {{=@ @=}}\nEnd.\n", &()).unwrap(), "Begin.\nEnd.\n");
}

#[test]
fn standalone_crlf() {
    assert_eq!(render("|\r\n{{= @ @ =}}\r\n|", &()).unwrap(), "|\r\n|");
}

#[test]
fn standalone_without_previous_line() {
    assert_eq!(render("  {{=@ @=}}\n=", &()).unwrap(), "=");
}

#[test]
fn standalone_without_newline() {
    assert_eq!(render("=\n  {{=@ @=}}", &()).unwrap(), "=\n");
}

#[test]
fn pair_with_padding() {
    assert_eq!(render("|{{= @   @ =}}|", &()).unwrap(), "||");
}
