//! Dungeon map: a styled grid table, a legend table, and a heading for the
//! legend.

use super::{EvalContext, EvaluationError, Rubric, RubricResult, Scorecard};
use crate::html::{Document, Node};

/// Minimum rows and columns of the map grid.
const GRID: usize = 5;
/// Minimum rows of the legend.
const LEGEND_ROWS: usize = 6;
/// Minimum cells per legend row.
const LEGEND_COLS: usize = 2;

/// Rubric for "dungeon", out of 40.
#[derive(Debug, Clone, Copy, Default)]
pub struct DungeonMap;

impl Rubric for DungeonMap {
    fn name(&self) -> &'static str {
        "dungeon"
    }

    fn max_score(&self) -> u32 {
        40
    }

    fn evaluate(
        &self,
        doc: &Document,
        _ctx: &EvalContext<'_>,
    ) -> Result<RubricResult, EvaluationError> {
        let mut card = Scorecard::full(self.max_score());
        let tables = doc.find_all(&["table"]);

        let Some(map) = tables.first() else {
            card.deduct(25, "Missing the first table for the dungeon map.");
            return Ok(card.finish());
        };

        if is_grid(map) {
            card.check(map.find_first("img").is_some(), 5, "First table is missing an image.");
            card.check(
                map.find_first("a")
                    .and_then(|a| a.attr("href"))
                    .is_some_and(|href| href.contains("http")),
                5,
                "First table is missing an external link.",
            );
            let styled = map.has_value("style")
                || map.find_all(&["td", "th"]).iter().any(|cell| cell.has_value("style"));
            card.check(styled, 5, "First table is missing background or font styles.");
        } else {
            card.deduct(10, "First table does not have at least 5 rows and 5 columns.");
        }

        let legend = tables.get(1);
        match legend {
            None => card.deduct(10, "Missing the second table for the key/legend."),
            Some(legend) => {
                let rows = legend.find_all(&["tr"]);
                let sized = rows.len() >= LEGEND_ROWS
                    && rows.iter().all(|row| cells(row) >= LEGEND_COLS);
                if !sized {
                    card.deduct(5, "Second table does not have at least 6 rows and 2 columns.");
                } else if rows[0].find_first("th").is_none() {
                    card.deduct(5, "Second table is missing a styled header row.");
                }
            }
        }

        let headed = legend.is_some_and(|legend| {
            doc.find_all(&["h1", "h2", "h3"]).iter().any(|heading| {
                doc.next_after(heading, "table")
                    .is_some_and(|next| next.same_as(legend))
            })
        });
        card.check(
            headed,
            5,
            "Ensure the second table has a corresponding heading before it.",
        );

        Ok(card.finish())
    }
}

/// At least five rows, the first five holding at least five cells each.
fn is_grid(table: &Node<'_>) -> bool {
    let rows = table.find_all(&["tr"]);
    rows.len() >= GRID && rows.iter().take(GRID).all(|row| cells(row) >= GRID)
}

/// Header and data cells in a row.
fn cells(row: &Node<'_>) -> usize {
    row.find_all(&["td", "th"]).len()
}
