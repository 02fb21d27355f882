//! Small built-in recipe set for offline use and demos.

use async_trait::async_trait;
use rand::seq::SliceRandom;

use foodiesnap_core::{Error, Recipe, RecipeId, RecipeSource, Result};

pub struct StaticCatalog {
    recipes: Vec<Recipe>,
}

impl StaticCatalog {
    pub fn new(recipes: Vec<Recipe>) -> Self { Self { recipes } }

    pub fn builtin() -> Self {
        let entry = |id, title: &str, description: &str, image: &str, ingredients: &[&str]| {
            let mut recipe = Recipe::new(id, title);
            recipe.description = description.to_string();
            recipe.image = image.to_string();
            recipe.ingredients = ingredients.iter().map(|s| (*s).to_string()).collect();
            recipe
        };
        Self::new(vec![
            entry(
                1,
                "Classic Pancakes",
                "Fluffy, soft, and delicious breakfast pancakes.",
                "https://bromabakery.com/wp-content/uploads/2020/07/Perfect-Chocolate-Chip-Pancakes-4.jpg",
                &["Flour", "Milk", "Eggs", "Sugar", "Baking Powder"],
            ),
            entry(
                2,
                "Caesar Salad",
                "Fresh romaine lettuce with creamy Caesar dressing and croutons.",
                "https://www.maggi.co.uk/sites/default/files/srh_recipes/3ee1954a36009dd59be2d362a2a44cf6.jpg",
                &["Lettuce", "Chicken", "Parmesan", "Croutons", "Caesar Dressing"],
            ),
            entry(
                3,
                "Spaghetti Carbonara",
                "Classic Italian pasta with eggs, cheese, pancetta, and pepper.",
                "https://ineveskitchen.com/wp-content/uploads/2024/05/Spaghetti-carbonara-1.jpg",
                &["Spaghetti", "Eggs", "Pancetta", "Pecorino Cheese", "Black Pepper"],
            ),
        ])
    }
}

#[async_trait]
impl RecipeSource for StaticCatalog {
    async fn search_by_name(&self, query: &str) -> Result<Vec<Recipe>> {
        let needle = query.trim().to_lowercase();
        Ok(self.recipes.iter().filter(|r| r.title.to_lowercase().contains(&needle)).cloned().collect())
    }

    async fn fetch_random(&self) -> Result<Recipe> {
        self.recipes
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| Error::NotFound("catalog is empty".to_string()))
    }

    async fn fetch_by_id(&self, id: RecipeId) -> Result<Option<Recipe>> {
        Ok(self.recipes.iter().find(|r| r.id == id).cloned())
    }
}
