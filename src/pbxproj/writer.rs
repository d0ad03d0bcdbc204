use std::collections::{BTreeMap, HashMap};

use super::Document;
use super::value::{Dictionary, Value};

const HEADER: &str = "// !$*UTF8*$!";

/// Object types Xcode writes on a single line.
const INLINE_ISAS: &[&str] = &["PBXBuildFile", "PBXFileReference"];

/// Serializes a document in the layout Xcode itself produces.
///
/// `annotations` maps object IDs to the text written in the `/* ... */`
/// comment that follows every occurrence of that ID.
pub fn write(document: &Document, annotations: &HashMap<String, String>) -> String {
    let mut writer = Writer {
        out: String::new(),
        annotations,
    };
    writer.out.push_str(HEADER);
    writer.out.push('\n');
    writer.out.push_str("{\n");
    for (key, value) in document.root.iter() {
        writer.indent(1);
        writer.out.push_str(&quote(key));
        writer.out.push_str(" = ");
        if key == "objects" {
            writer.write_objects(&document.objects);
        } else {
            writer.write_value(value, 1);
        }
        writer.out.push_str(";\n");
    }
    writer.out.push_str("}\n");
    writer.out
}

struct Writer<'a> {
    out: String,
    annotations: &'a HashMap<String, String>,
}

impl Writer<'_> {
    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push('\t');
        }
    }

    fn write_string(&mut self, s: &str) {
        self.out.push_str(&quote(s));
        if let Some(comment) = self.annotations.get(s) {
            self.out.push_str(" /* ");
            self.out.push_str(comment);
            self.out.push_str(" */");
        }
    }

    fn write_data(&mut self, hex: &str) {
        self.out.push('<');
        self.out.push_str(hex);
        self.out.push('>');
    }

    fn write_objects(&mut self, objects: &BTreeMap<String, Dictionary>) {
        let mut sections: BTreeMap<&str, Vec<(&String, &Dictionary)>> = BTreeMap::new();
        for (id, object) in objects {
            let isa = object.get_str("isa").unwrap_or("");
            sections.entry(isa).or_default().push((id, object));
        }

        self.out.push_str("{\n");
        for (isa, members) in sections {
            self.out.push_str(&format!("\n/* Begin {isa} section */\n"));
            let inline = INLINE_ISAS.contains(&isa);
            for (id, object) in members {
                self.indent(2);
                self.write_string(id);
                self.out.push_str(" = ");
                if inline {
                    self.write_inline_dictionary(object);
                } else {
                    self.write_dictionary(object, 2);
                }
                self.out.push_str(";\n");
            }
            self.out.push_str(&format!("/* End {isa} section */\n"));
        }
        self.indent(1);
        self.out.push('}');
    }

    fn write_value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::String(s) => self.write_string(s),
            Value::Data(hex) => self.write_data(hex),
            Value::Array(items) => {
                self.out.push_str("(\n");
                for item in items {
                    self.indent(depth + 1);
                    self.write_value(item, depth + 1);
                    self.out.push_str(",\n");
                }
                self.indent(depth);
                self.out.push(')');
            }
            Value::Dictionary(dict) => self.write_dictionary(dict, depth),
        }
    }

    fn write_dictionary(&mut self, dict: &Dictionary, depth: usize) {
        self.out.push_str("{\n");
        for (key, value) in dict.iter() {
            self.indent(depth + 1);
            self.write_string(key);
            self.out.push_str(" = ");
            self.write_value(value, depth + 1);
            self.out.push_str(";\n");
        }
        self.indent(depth);
        self.out.push('}');
    }

    fn write_inline_value(&mut self, value: &Value) {
        match value {
            Value::String(s) => self.write_string(s),
            Value::Data(hex) => self.write_data(hex),
            Value::Array(items) => {
                self.out.push('(');
                for item in items {
                    self.write_inline_value(item);
                    self.out.push_str(", ");
                }
                self.out.push(')');
            }
            Value::Dictionary(dict) => self.write_inline_dictionary(dict),
        }
    }

    fn write_inline_dictionary(&mut self, dict: &Dictionary) {
        self.out.push('{');
        for (key, value) in dict.iter() {
            self.write_string(key);
            self.out.push_str(" = ");
            self.write_inline_value(value);
            self.out.push_str("; ");
        }
        self.out.push('}');
    }
}

/// Quotes and escapes a string unless it can be written bare.
fn quote(s: &str) -> String {
    let bare = !s.is_empty()
        && !s.contains("//")
        && !s.contains("___")
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | '.'));
    if bare {
        return s.to_string();
    }

    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
