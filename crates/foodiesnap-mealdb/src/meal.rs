//! TheMealDB wire format and its mapping onto [`Recipe`].

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use foodiesnap_core::{Error, Recipe, Result};

/// TheMealDB numbers its ingredient/measure columns 1 through 20.
pub const MAX_INGREDIENTS: usize = 20;
const DESCRIPTION_CHARS: usize = 150;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id_meal: String,
    pub str_meal: String,
    #[serde(default)]
    pub str_meal_thumb: Option<String>,
    #[serde(default)]
    pub str_category: Option<String>,
    #[serde(default)]
    pub str_area: Option<String>,
    #[serde(default)]
    pub str_instructions: Option<String>,
    #[serde(default)]
    pub str_youtube: Option<String>,
    #[serde(default)]
    pub str_tags: Option<String>,
    /// `strIngredientN` / `strMeasureN` and anything else not modelled above.
    #[serde(flatten)]
    pub rest: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct MealsResponse {
    pub meals: Option<Vec<Meal>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id_category: String,
    pub str_category: String,
    #[serde(default)]
    pub str_category_thumb: Option<String>,
    #[serde(default)]
    pub str_category_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default)]
    pub categories: Vec<Category>,
}

fn non_blank(s: Option<&str>) -> Option<&str> { s.map(str::trim).filter(|s| !s.is_empty()) }

impl Meal {
    fn column(&self, name: &str) -> Option<&str> { non_blank(self.rest.get(name).and_then(Value::as_str)) }

    /// "<measure> <ingredient>" lines in column order, blanks skipped.
    pub fn ingredients(&self) -> Vec<String> {
        (1..=MAX_INGREDIENTS)
            .filter_map(|i| {
                let ingredient = self.column(&format!("strIngredient{i}"))?;
                Some(match self.column(&format!("strMeasure{i}")) {
                    Some(measure) => format!("{measure} {ingredient}"),
                    None => ingredient.to_string(),
                })
            })
            .collect()
    }

    pub fn description(&self) -> String {
        match non_blank(self.str_instructions.as_deref()) {
            Some(text) => {
                let head: String = text.chars().take(DESCRIPTION_CHARS).collect();
                format!("{head}...")
            }
            None => "No description available".to_string(),
        }
    }

    pub fn parse_id(&self) -> Result<u64> {
        self.id_meal.trim().parse().map_err(|_| Error::Fetch(format!("unexpected meal id '{}'", self.id_meal)))
    }

    pub fn into_recipe(self) -> Result<Recipe> {
        let id = self.parse_id()?;
        let tags = self
            .str_tags
            .as_deref()
            .map(|t| t.split(',').map(str::trim).filter(|t| !t.is_empty()).map(String::from).collect())
            .unwrap_or_default();
        Ok(Recipe {
            id,
            description: self.description(),
            ingredients: self.ingredients(),
            title: self.str_meal,
            image: self.str_meal_thumb.unwrap_or_default(),
            category: self.str_category,
            area: self.str_area,
            instructions: self.str_instructions,
            youtube_link: self.str_youtube.filter(|s| !s.trim().is_empty()),
            tags: Some(tags),
        })
    }

    /// Filter endpoints only return id, name and thumbnail.
    pub fn into_summary(self, category: &str) -> Result<Recipe> {
        let mut recipe = Recipe::new(self.parse_id()?, self.str_meal);
        recipe.image = self.str_meal_thumb.unwrap_or_default();
        recipe.category = Some(category.to_string());
        Ok(recipe)
    }
}
