use foodiesnap_core::config::ApiConfig;
use foodiesnap_core::RecipeSource;
use foodiesnap_mealdb::get_default_source;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let query = std::env::args().nth(1).unwrap_or_else(|| "chicken".to_string());
    let source = get_default_source(&ApiConfig::default())?;
    for recipe in source.search_by_name(&query).await? {
        println!("{:>6}  {}  ({} ingredients)", recipe.id, recipe.title, recipe.ingredients.len());
    }
    Ok(())
}
