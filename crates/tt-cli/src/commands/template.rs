use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use tt_core::{Difficulty, EventTemplate, TemplateCatalog};

/// Fields collected from `tt template new` flags.
pub struct NewTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: String,
    pub triggers: Vec<String>,
    pub outcomes: Vec<String>,
    pub tools: Vec<String>,
    pub hints: Vec<String>,
    pub tags: Vec<String>,
}

/// Open the catalog, writing the built-in templates into an empty directory.
fn open_catalog(dir: &Path) -> Result<TemplateCatalog, String> {
    let mut catalog = TemplateCatalog::open(dir).map_err(|e| e.to_string())?;
    catalog.seed_defaults().map_err(|e| e.to_string())?;
    Ok(catalog)
}

pub fn list(dir: &Path) -> Result<(), String> {
    let catalog = open_catalog(dir)?;

    if catalog.is_empty() {
        println!("  No templates in {}.", dir.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Difficulty", "Tags", "Description"]);

    for t in catalog.templates() {
        table.add_row(vec![
            t.id.clone(),
            t.name.clone(),
            t.difficulty.to_string(),
            t.tags.join(", "),
            super::truncate(&t.description, 60),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} templates", catalog.len());
    Ok(())
}

pub fn show(dir: &Path, id: &str) -> Result<(), String> {
    let catalog = open_catalog(dir)?;
    let template = catalog
        .get(id)
        .ok_or_else(|| format!("event template '{id}' not found"))?;
    print_template(template);
    Ok(())
}

pub fn random(dir: &Path, tags: &[String], seed: Option<u64>) -> Result<(), String> {
    let catalog = open_catalog(dir)?;
    let mut rng = super::rng_from(seed);
    match catalog.random(tags, &mut rng) {
        Some(template) => {
            print_template(template);
            Ok(())
        }
        None if tags.is_empty() => Err("no event templates available".into()),
        None => Err(format!("no event templates tagged {}", tags.join(", "))),
    }
}

pub fn new(dir: &Path, fields: NewTemplate) -> Result<(), String> {
    let difficulty = Difficulty::parse(&fields.difficulty).ok_or_else(|| {
        format!(
            "unknown difficulty '{}' (expected easy, medium, or hard)",
            fields.difficulty
        )
    })?;

    let mut template = EventTemplate::new(fields.id, fields.name, fields.description);
    template.difficulty = difficulty;
    template.triggers = fields.triggers;
    template.possible_outcomes = fields.outcomes;
    template.required_tools = fields.tools;
    template.context_hints = fields.hints;
    template.tags = fields
        .tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let mut catalog = TemplateCatalog::open(dir).map_err(|e| e.to_string())?;
    let replaced = catalog.get(&template.id).is_some();
    let name = template.name.clone();
    let path = catalog.save(template).map_err(|e| e.to_string())?;

    let verb = if replaced { "Updated" } else { "Created" };
    println!("  {} template '{name}' at {}", verb.green().bold(), path.display());
    Ok(())
}

fn print_template(t: &EventTemplate) {
    println!("{} ({})", t.name.bold(), t.id);
    println!("  Difficulty: {}", t.difficulty);
    if !t.tags.is_empty() {
        println!("  Tags: {}", t.tags.join(", "));
    }
    println!();
    println!("  {}", t.description);
    print_list("Triggers", &t.triggers);
    print_list("Possible outcomes", &t.possible_outcomes);
    print_list("Required tools", &t.required_tools);
    print_list("Context hints", &t.context_hints);
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!();
    println!("  {label}:");
    for item in items {
        println!("    - {item}");
    }
}
