//! Shopping list: every ingredient line of every recipe in a user's cart,
//! summed per catalog ingredient and rendered as plain text.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::IngredientLine;
use crate::store;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListRow {
    pub ingredient_id: i64,
    pub name: String,
    pub unit: String,
    pub total_amount: i64,
}

/// Groups lines by ingredient id and sums their amounts, saturating at
/// `i64::MAX`. Rows come out in
/// ascending ingredient id order. Two catalog entries sharing a name but not
/// a unit stay separate rows.
pub fn aggregate<I>(lines: I) -> Vec<ShoppingListRow>
where
    I: IntoIterator<Item = IngredientLine>,
{
    let mut rows: BTreeMap<i64, ShoppingListRow> = BTreeMap::new();
    for line in lines {
        rows.entry(line.ingredient_id)
            .and_modify(|row| row.total_amount = row.total_amount.saturating_add(line.amount))
            .or_insert_with(|| ShoppingListRow {
                ingredient_id: line.ingredient_id,
                name: line.name.clone(),
                unit: line.measurement_unit.clone(),
                total_amount: line.amount,
            });
    }
    rows.into_values().collect()
}

pub async fn build_shopping_list(db: &SqlitePool, user_id: i64) -> Result<Vec<ShoppingListRow>, AppError> {
    let recipes = store::find_recipes_in_cart(db, user_id).await?;

    let mut lines = Vec::new();
    for recipe in &recipes {
        lines.extend(store::find_ingredient_lines(db, recipe.id).await?);
    }

    let rows = aggregate(lines);
    tracing::debug!(user_id, recipes = recipes.len(), rows = rows.len(), "shopping list built");
    Ok(rows)
}

/// One `"<name> - <amount> <unit>"` line per row, newline separated, with no
/// blank line before or after.
pub fn render_shopping_list_text(rows: &[ShoppingListRow]) -> String {
    rows.iter()
        .map(|row| format!("{} - {} {}", row.name, row.total_amount, row.unit))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(recipe_id: i64, ingredient_id: i64, name: &str, unit: &str, amount: i64) -> IngredientLine {
        IngredientLine {
            id: 0,
            recipe_id,
            ingredient_id,
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn sums_duplicate_ingredients_across_recipes() {
        let lines = vec![
            line(1, 10, "Tomato", "pcs", 2),
            line(1, 20, "Salt", "g", 1),
            line(2, 10, "Tomato", "pcs", 3),
            line(2, 30, "Onion", "pcs", 1),
        ];

        let rows = aggregate(lines);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "Tomato");
        assert_eq!(rows[0].total_amount, 5);
        assert_eq!(rows[1].name, "Salt");
        assert_eq!(rows[1].total_amount, 1);
        assert_eq!(rows[2].name, "Onion");
        assert_eq!(rows[2].total_amount, 1);
    }

    #[test]
    fn duplicate_lines_within_one_recipe_are_summed() {
        let rows = aggregate(vec![line(1, 5, "Egg", "pcs", 2), line(1, 5, "Egg", "pcs", 4)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_amount, 6);
    }

    #[test]
    fn same_name_different_unit_is_not_merged() {
        let rows = aggregate(vec![line(1, 1, "Milk", "ml", 200), line(2, 2, "Milk", "cup", 1)]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].unit, "ml");
        assert_eq!(rows[1].unit, "cup");
    }

    #[test]
    fn ordering_does_not_depend_on_input_order() {
        let forward = aggregate(vec![line(1, 3, "C", "g", 1), line(1, 1, "A", "g", 1), line(1, 2, "B", "g", 1)]);
        let backward = aggregate(vec![line(1, 2, "B", "g", 1), line(1, 1, "A", "g", 1), line(1, 3, "C", "g", 1)]);
        assert_eq!(forward, backward);
        let ids: Vec<i64> = forward.iter().map(|row| row.ingredient_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn large_totals_saturate_instead_of_overflowing() {
        let rows = aggregate(vec![
            line(1, 7, "Salt", "g", i64::MAX),
            line(2, 7, "Salt", "g", 1),
            line(3, 8, "Rice", "g", i64::from(i32::MAX)),
            line(4, 8, "Rice", "g", i64::from(i32::MAX)),
        ]);
        assert_eq!(rows[0].total_amount, i64::MAX);
        assert_eq!(rows[1].total_amount, 2 * i64::from(i32::MAX));
        assert_eq!(render_shopping_list_text(&rows[..1]), format!("Salt - {} g", i64::MAX));
    }

    #[test]
    fn empty_input_yields_no_rows_and_empty_text() {
        let rows = aggregate(Vec::new());
        assert!(rows.is_empty());
        assert_eq!(render_shopping_list_text(&rows), "");
    }

    #[test]
    fn renders_one_line_per_row_without_trailing_newline() {
        let rows = aggregate(vec![
            line(1, 10, "Tomato", "pcs", 2),
            line(1, 20, "Salt", "g", 1),
            line(2, 10, "Tomato", "pcs", 3),
        ]);
        let text = render_shopping_list_text(&rows);
        assert_eq!(text, "Tomato - 5 pcs\nSalt - 1 g");
        assert!(!text.ends_with('\n'));
        assert!(!text.starts_with('\n'));
    }
}
