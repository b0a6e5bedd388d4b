//! Deterministic rendering of the syntax model into C# text.
//!
//! Output is a pure function of the [`CompilationUnit`]: four-space indentation, `\n` line
//! endings, one blank line between members and between classes, and a fixed header. Nothing
//! time- or environment-dependent is ever written.

use crate::codegen::syntax::{
    AttributeDecl, Block, ClassDecl, CompilationUnit, Expr, Member, MethodDecl, Modifiers,
    ParamDecl, Stmt,
};

const INDENT: &str = "    ";

/// Header written on top of every unit
const HEADER: &[&str] = &[
    "// <auto-generated>",
    "//     This code was generated by hubscope.",
    "//     Changes to this file will be lost when the code is regenerated.",
    "// </auto-generated>",
    "",
    "#nullable disable",
];

/// Renders compilation units to source text
#[derive(Default)]
pub struct CodeWriter {
    out: String,
    indent: usize,
}

impl CodeWriter {
    /// Create a writer with an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `unit` into a fresh string
    #[must_use]
    pub fn render(unit: &CompilationUnit) -> String {
        let mut writer = CodeWriter::new();
        writer.write_unit(unit);
        writer.out
    }

    /// Render `unit` into this writers buffer
    pub fn write_unit(&mut self, unit: &CompilationUnit) {
        for line in HEADER {
            self.line(line);
        }

        match &unit.namespace {
            Some(namespace) => {
                self.line("");
                self.line(&format!("namespace {}", namespace));
                self.open();
                self.write_classes(&unit.classes);
                self.close("}");
            }
            None => {
                if !unit.classes.is_empty() {
                    self.line("");
                }
                self.write_classes(&unit.classes);
            }
        }
    }

    /// The rendered text so far
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn open(&mut self) {
        self.line("{");
        self.indent += 1;
    }

    fn close(&mut self, text: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    fn doc(&mut self, doc: Option<&String>) {
        if let Some(doc) = doc {
            self.line("/// <summary>");
            for line in doc.lines() {
                self.line(&format!("/// {}", line));
            }
            self.line("/// </summary>");
        }
    }

    fn write_classes(&mut self, classes: &[ClassDecl]) {
        for (index, class) in classes.iter().enumerate() {
            if index > 0 {
                self.line("");
            }
            self.write_class(class);
        }
    }

    fn write_class(&mut self, class: &ClassDecl) {
        self.doc(class.doc.as_ref());

        let mut header = prefixed(class.modifiers, "class");
        header.push(' ');
        header.push_str(&class.name);
        if !class.bases.is_empty() {
            let bases: Vec<String> = class.bases.iter().map(ToString::to_string).collect();
            header.push_str(" : ");
            header.push_str(&bases.join(", "));
        }
        self.line(&header);

        self.open();
        for (index, member) in class.members.iter().enumerate() {
            if index > 0 {
                self.line("");
            }
            self.write_member(member);
        }
        self.close("}");
    }

    fn write_member(&mut self, member: &Member) {
        match member {
            Member::Field {
                attributes,
                modifiers,
                event,
                field_type,
                name,
                initializer,
            } => {
                self.write_attributes(attributes);
                let keyword = if *event { "event " } else { "" };
                let mut text = format!("{}{}{} {}", prefix(*modifiers), keyword, field_type, name);
                if let Some(initializer) = initializer {
                    text.push_str(" = ");
                    text.push_str(&expr(initializer));
                }
                text.push(';');
                self.line(&text);
            }
            Member::Property {
                modifiers,
                property_type,
                name,
                setter,
            } => {
                let accessors = match setter {
                    Some(setter) => format!("get; {}set;", prefix(*setter)),
                    None => "get;".to_string(),
                };
                self.line(&format!(
                    "{}{} {} {{ {} }}",
                    prefix(*modifiers),
                    property_type,
                    name,
                    accessors
                ));
            }
            Member::Method(method) => self.write_method(method),
        }
    }

    fn write_attributes(&mut self, attributes: &[AttributeDecl]) {
        for attribute in attributes {
            match attribute.target {
                Some(target) => self.line(&format!("[{}: {}]", target, attribute.attribute_type)),
                None => self.line(&format!("[{}]", attribute.attribute_type)),
            }
        }
    }

    fn write_method(&mut self, method: &MethodDecl) {
        self.doc(method.doc.as_ref());

        let params: Vec<String> = method.params.iter().map(param).collect();
        let signature = format!(
            "{}{} {}({})",
            prefix(method.modifiers),
            method.return_type,
            method.name,
            params.join(", ")
        );

        match &method.body {
            Some(body) => {
                self.line(&signature);
                self.write_block(body);
            }
            None => self.line(&format!("{};", signature)),
        }
    }

    fn write_block(&mut self, block: &Block) {
        self.open();
        for stmt in &block.0 {
            self.write_stmt(stmt);
        }
        self.close("}");
    }

    fn write_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(e) => self.line(&format!("{};", expr(e))),
            Stmt::Local { name, value } => self.line(&format!("var {} = {};", name, expr(value))),
            Stmt::Return(None) => self.line("return;"),
            Stmt::Return(Some(e)) => self.line(&format!("return {};", expr(e))),
            Stmt::Throw(e) => self.line(&format!("throw {};", expr(e))),
            Stmt::If {
                condition,
                then,
                otherwise,
            } => {
                self.line(&format!("if ({})", expr(condition)));
                self.write_block(then);
                if let Some(otherwise) = otherwise {
                    self.line("else");
                    self.write_block(otherwise);
                }
            }
            Stmt::ForEach {
                item,
                collection,
                body,
            } => {
                self.line(&format!("foreach (var {} in {})", item, expr(collection)));
                self.write_block(body);
            }
        }
    }
}

fn prefix(modifiers: Modifiers) -> String {
    let keywords = modifiers.keywords();
    if keywords.is_empty() {
        String::new()
    } else {
        format!("{} ", keywords.join(" "))
    }
}

fn prefixed(modifiers: Modifiers, keyword: &str) -> String {
    format!("{}{}", prefix(modifiers), keyword)
}

fn param(param: &ParamDecl) -> String {
    match &param.default {
        Some(default) => format!("{} {} = {}", param.param_type, param.name, expr(default)),
        None => format!("{} {}", param.param_type, param.name),
    }
}

fn list(items: &[Expr]) -> String {
    items.iter().map(expr).collect::<Vec<_>>().join(", ")
}

/// Whether `e` can be used as the target of member access, invocation or indexing as-is
fn is_primary(e: &Expr) -> bool {
    matches!(
        e,
        Expr::Ident(_)
            | Expr::Type(_)
            | Expr::Null
            | Expr::Default
            | Expr::Bool(_)
            | Expr::Int(_)
            | Expr::Str(_)
            | Expr::Member { .. }
            | Expr::Invoke { .. }
            | Expr::Index { .. }
            | Expr::TypeOf(_)
            | Expr::New { .. }
    )
}

/// Whether `e` binds at least as tight as a unary operator
fn is_unary(e: &Expr) -> bool {
    is_primary(e) || matches!(e, Expr::Await(_) | Expr::Cast { .. } | Expr::Not(_))
}

fn primary(e: &Expr) -> String {
    if is_primary(e) {
        expr(e)
    } else {
        format!("({})", expr(e))
    }
}

fn unary(e: &Expr) -> String {
    if is_unary(e) {
        expr(e)
    } else {
        format!("({})", expr(e))
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\0' => escaped.push_str("\\0"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Render a single expression
#[must_use]
pub fn expr(e: &Expr) -> String {
    match e {
        Expr::Ident(name) => name.clone(),
        Expr::Type(syntax) => syntax.to_string(),
        Expr::Null => "null".to_string(),
        Expr::Default => "default".to_string(),
        Expr::Bool(value) => value.to_string(),
        Expr::Int(value) => value.to_string(),
        Expr::Str(value) => format!("\"{}\"", escape(value)),
        Expr::Member { target, name } => format!("{}.{}", primary(target), name),
        Expr::Invoke { target, args } => format!("{}({})", primary(target), list(args)),
        Expr::Await(inner) => format!("await {}", unary(inner)),
        Expr::Cast { target_type, expr } => format!("({}){}", target_type, unary(expr)),
        Expr::TypeOf(syntax) => format!("typeof({})", syntax),
        Expr::NewArray {
            element_type,
            items,
        } => {
            if items.is_empty() {
                format!("new {}[0]", element_type)
            } else {
                format!("new {}[] {{ {} }}", element_type, list(items))
            }
        }
        Expr::Index { target, index } => format!("{}[{}]", primary(target), expr(index)),
        Expr::Lambda { params, body } => format!("({}) => {}", params.join(", "), expr(body)),
        Expr::Conditional {
            condition,
            then,
            otherwise,
        } => format!(
            "{} ? {} : {}",
            expr(condition),
            expr(then),
            expr(otherwise)
        ),
        Expr::Compare {
            left,
            negated,
            right,
        } => {
            let operator = if *negated { "!=" } else { "==" };
            format!("{} {} {}", unary(left), operator, unary(right))
        }
        Expr::Not(inner) => format!("!{}", unary(inner)),
        Expr::Assign { target, value } => format!("{} = {}", expr(target), expr(value)),
        Expr::New { created_type, args } => format!("new {}({})", created_type, list(args)),
    }
}
