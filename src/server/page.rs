//! The upload form, rendered from `templates/index.html`.

use crate::conversions::{Category, CONVERSION_TABLE};
use minijinja::{context, Environment};
use serde::Serialize;

const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

const CATEGORIES: [Category; 4] = [Category::Image, Category::Data, Category::Yaml, Category::Document];

#[derive(Serialize)]
struct OptionGroup {
    label: &'static str,
    options: Vec<ConversionOption>,
}

#[derive(Serialize)]
struct ConversionOption {
    id: &'static str,
    label: &'static str,
}

fn option_groups() -> Vec<OptionGroup> {
    CATEGORIES
        .iter()
        .map(|&category| OptionGroup {
            label: category.label(),
            options: CONVERSION_TABLE
                .iter()
                .filter(|spec| spec.category == category)
                .map(|spec| ConversionOption {
                    id: spec.id,
                    label: spec.label,
                })
                .collect(),
        })
        .collect()
}

/// Render the index page with any pending flash `messages`.
///
/// The template name ends in `.html`, so minijinja HTML-escapes every value.
pub fn render_index(messages: &[String]) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("index.html", INDEX_TEMPLATE)?;
    env.get_template("index.html")?.render(context! {
        messages => messages,
        groups => option_groups(),
    })
}
