//! Turning a whole schema into a list of per-entity changes.

use entigen_schema::{Schema, Table};
use tracing::warn;

use crate::sync::EntityChange;

/// One entity update of a whole-schema synchronization.
#[derive(Debug, Clone)]
pub struct PlannedChange<'a> {
    /// Entity receiving the change.
    pub entity: String,
    pub change: EntityChange<'a>,
}

/// Every entity update implied by `schema`, in schema order.
///
/// Regular tables get their columns merged into their own entity, and each of
/// their foreign keys with a reverse name adds a one-to-many property on the
/// referenced entity. Junction tables have no entity of their own: each of
/// their two foreign keys adds a many-to-many property on the other side.
pub fn plan_schema(schema: &Schema) -> Vec<PlannedChange<'_>> {
    let mut planned = Vec::new();
    for table in schema.iter_tables() {
        match &table.junction {
            Some(junction) => plan_junction(table, junction.main.as_deref(), &mut planned),
            None => {
                planned.push(PlannedChange {
                    entity: table.entity_name(),
                    change: EntityChange::Columns(table),
                });
                for foreign in table.foreign_keys.values() {
                    if foreign.reverse_name.is_some() {
                        planned.push(PlannedChange {
                            entity: foreign.target_entity(),
                            change: EntityChange::OneToMany {
                                source: table,
                                foreign,
                            },
                        });
                    }
                }
            }
        }
    }
    planned
}

fn plan_junction<'a>(
    table: &'a Table,
    main: Option<&str>,
    planned: &mut Vec<PlannedChange<'a>>,
) {
    let keys: Vec<_> = table.foreign_keys.values().collect();
    let [first, second] = keys.as_slice() else {
        warn!(
            table = %table.name,
            foreign_keys = keys.len(),
            "junction table needs exactly two foreign keys, skipping"
        );
        return;
    };

    for (from, to) in [(*first, *second), (*second, *first)] {
        planned.push(PlannedChange {
            entity: from.target_entity(),
            change: EntityChange::ManyToMany {
                from,
                to,
                is_main: main == Some(from.key_column.as_str()),
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entigen_schema::{Column, ColumnType, Foreign, Junction, PrimaryKey};

    fn blog() -> Schema {
        let mut schema = Schema::new();
        schema.add_table(
            Table::new("user")
                .with_column(Column::new("id", ColumnType::Integer))
                .with_primary_key(PrimaryKey::new(["id"])),
        );
        schema.add_table(
            Table::new("article")
                .with_column(Column::new("id", ColumnType::Integer))
                .with_column(Column::new("author_id", ColumnType::Integer))
                .with_column(Column::new("editor_id", ColumnType::Integer).nullable())
                .with_primary_key(PrimaryKey::new(["id"]))
                .with_foreign(Foreign::new("user", "author_id").with_reverse_name("articles"))
                .with_foreign(Foreign::new("user", "editor_id")),
        );
        schema.add_table(
            Table::new("article_tag")
                .with_column(Column::new("article_id", ColumnType::Integer))
                .with_column(Column::new("tag_id", ColumnType::Integer))
                .with_foreign(Foreign::new("article", "article_id"))
                .with_foreign(Foreign::new("tag", "tag_id").with_reverse_name("articles"))
                .with_junction(Junction {
                    main: Some("article_id".to_string()),
                }),
        );
        schema
    }

    fn describe(planned: &[PlannedChange<'_>]) -> Vec<String> {
        planned
            .iter()
            .map(|p| match p.change {
                EntityChange::Columns(table) => format!("{}: columns of {}", p.entity, table.name),
                EntityChange::OneToMany { source, foreign } => {
                    format!("{}: 1:m {}.{}", p.entity, source.name, foreign.key_column)
                }
                EntityChange::ManyToMany { from, to, is_main } => format!(
                    "{}: m:m {} -> {} main={is_main}",
                    p.entity, from.key_column, to.key_column
                ),
                EntityChange::Column { .. } | EntityChange::Sort => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn test_plan_schema() {
        let schema = blog();
        let planned = plan_schema(&schema);
        assert_eq!(
            describe(&planned),
            vec![
                "User: columns of user",
                "Article: columns of article",
                "User: 1:m article.author_id",
                "Article: m:m article_id -> tag_id main=true",
                "Tag: m:m tag_id -> article_id main=false",
            ]
        );
    }

    #[test]
    fn test_junction_without_two_keys_is_skipped() {
        let mut schema = Schema::new();
        schema.add_table(
            Table::new("broken")
                .with_column(Column::new("a_id", ColumnType::Integer))
                .with_foreign(Foreign::new("a", "a_id"))
                .with_junction(Junction::default()),
        );
        assert!(plan_schema(&schema).is_empty());
    }
}
