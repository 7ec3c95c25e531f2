use serde::Deserialize;
use sqlx::SqlitePool;
use std::fs;

use crate::domain::users::{self, NewUser};
use crate::models::Tag;

#[derive(Deserialize)]
struct CatalogIngredient {
    name: String,
    measurement_unit: String,
}

/// Load the ingredient catalog from a JSON array of
/// `{"name": ..., "measurement_unit": ...}` objects. Rows already present
/// (same name and unit) are skipped.
pub async fn import_ingredients(pool: &SqlitePool, file_path: &str) -> Result<usize, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file_path)?;
    let ingredients: Vec<CatalogIngredient> = serde_json::from_str(&content)?;

    let mut imported = 0;
    let mut tx = pool.begin().await?;

    for ingredient in ingredients {
        let name = ingredient.name.trim();
        let unit = ingredient.measurement_unit.trim();
        if name.is_empty() || unit.is_empty() {
            eprintln!("Skipping ingredient with blank name or unit");
            continue;
        }

        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM ingredients WHERE name = ? AND measurement_unit = ?")
                .bind(name)
                .bind(unit)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            continue;
        }

        sqlx::query("INSERT INTO ingredients (name, measurement_unit) VALUES (?, ?)")
            .bind(name)
            .bind(unit)
            .execute(&mut *tx)
            .await?;
        imported += 1;
    }

    tx.commit().await?;
    println!("Imported {} ingredients", imported);
    Ok(imported)
}

pub async fn create_tag(
    pool: &SqlitePool,
    name: &str,
    color: &str,
    slug: Option<&str>,
) -> Result<Tag, Box<dyn std::error::Error>> {
    if !Tag::is_valid_color(color) {
        return Err(format!("Color '{}' is not a #RRGGBB value", color).into());
    }
    let slug = slug.map(str::to_string).unwrap_or_else(|| Tag::slugify(name));

    let tag: Tag = sqlx::query_as("INSERT INTO tags (name, color, slug) VALUES (?, ?, ?) RETURNING *")
        .bind(name.trim())
        .bind(color)
        .bind(&slug)
        .fetch_one(pool)
        .await?;

    println!("Created tag:");
    println!("  ID: {}", tag.id);
    println!("  Name: {}", tag.name);
    println!("  Slug: {}", tag.slug);

    Ok(tag)
}

pub async fn create_user(pool: &SqlitePool, new: NewUser) -> Result<(), Box<dyn std::error::Error>> {
    let user = users::register(pool, new)
        .await
        .map_err(|e| format!("Could not create user: {:?}", e))?;

    println!("Created user:");
    println!("  ID: {}", user.id);
    println!("  Username: {}", user.username);
    println!("  Email: {}", user.email);

    Ok(())
}
