use clo_provider::schema::Elem;
use clo_provider::{Attribute, Schema, data_sources, find_data_source, find_resource, resources};
use colored::Colorize;

pub fn handle(name: Option<&str>, data: bool) -> anyhow::Result<()> {
    let Some(name) = name else {
        println!("{}", "Resources:".bold());
        for resource in resources::all() {
            println!("  {}", resource.type_name().cyan());
        }
        println!("{}", "Data sources:".bold());
        for source in data_sources::all() {
            println!("  {}", source.type_name().cyan());
        }
        return Ok(());
    };

    let schema = if data {
        find_data_source(name)?.schema()
    } else {
        find_resource(name)?.schema()
    };
    print_schema(name, &schema);
    Ok(())
}

fn print_schema(name: &str, schema: &Schema) {
    println!("{}", name.bold());
    println!("  {}", schema.description);
    println!();
    for attr in &schema.attributes {
        print_attribute(attr, 1);
    }
}

fn print_attribute(attr: &Attribute, depth: usize) {
    let indent = "  ".repeat(depth);
    let description = if attr.description.is_empty() {
        String::new()
    } else {
        format!(" - {}", attr.description)
    };
    println!(
        "{}{} ({}){}{}",
        indent,
        attr.name.cyan(),
        kind(attr),
        flags(attr).dimmed(),
        description
    );
    if let Some(Elem::Block(fields)) = &attr.elem {
        for field in fields {
            print_attribute(field, depth + 1);
        }
    }
}

fn kind(attr: &Attribute) -> String {
    match &attr.elem {
        Some(Elem::Scalar(elem)) => format!("list of {}", elem),
        Some(Elem::Block(_)) => "list of blocks".to_string(),
        None => attr.kind.to_string(),
    }
}

fn flags(attr: &Attribute) -> String {
    let mut flags = Vec::new();
    if attr.required {
        flags.push("required".to_string());
    }
    if attr.optional {
        flags.push("optional".to_string());
    }
    if attr.computed {
        flags.push("computed".to_string());
    }
    if attr.force_new {
        flags.push("forces replacement".to_string());
    }
    if attr.sensitive {
        flags.push("sensitive".to_string());
    }
    if let Some(default) = &attr.default {
        flags.push(format!("default {}", default));
    }
    if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    }
}
