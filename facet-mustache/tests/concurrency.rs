use std::collections::HashMap;
use std::thread;

use facet::Facet;
use facet_mustache::{Template, render_to_writer};
use facet_testhelpers::test;

#[derive(Facet)]
struct Row {
    id: u32,
    label: String,
}

#[test]
fn templates_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Template<'static>>();
}

#[test]
fn one_template_many_threads() {
    let template = Template::compile("{{id}}={{label}}").unwrap();
    let outputs: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|id| {
                let template = &template;
                scope.spawn(move || {
                    let row = Row {
                        id,
                        label: format!("row{id}"),
                    };
                    template.render(&row).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for (id, out) in outputs.iter().enumerate() {
        assert_eq!(out, &format!("{id}=row{id}"));
    }
}

#[test]
fn shared_partials_across_threads() {
    let partials: HashMap<&str, &str> = HashMap::from([("row", "<{{label}}>")]);
    let template = Template::compile("{{>row}}").unwrap();
    thread::scope(|scope| {
        for id in 0..4 {
            let (template, partials) = (&template, &partials);
            scope.spawn(move || {
                let row = Row {
                    id,
                    label: "x".into(),
                };
                assert_eq!(template.render_with_partials(partials, &row).unwrap(), "<x>");
            });
        }
    });
}

#[test]
fn owned_templates_outlive_their_source() {
    let template = {
        let source = String::from("{{label}}!");
        Template::compile(source.as_str()).unwrap().into_owned()
    };
    let row = Row {
        id: 1,
        label: "done".into(),
    };
    assert_eq!(template.render(&row).unwrap(), "done!");
    assert_eq!(template.source(), "{{label}}!");
}

#[test]
fn streams_into_a_byte_buffer() {
    let mut buf = Vec::new();
    let row = Row {
        id: 9,
        label: "café".into(),
    };
    render_to_writer("{{id}}: {{label}}\n", &facet_mustache::NoPartials, &row, &mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "9: café\n");
}
