//! Rendering schema facts into annotation lines.
//!
//! Every function here is pure: the same schema facts always produce the same
//! bytes, and nothing depends on map iteration order.

use entigen_schema::{Column, Foreign, Table, camelize, lcfirst, property_name};

use super::{
    AnnotationEntry, Category, MANY_TO_MANY_MARKER, MANY_TO_ONE_MARKER,
    ONE_TO_MANY_MARKER, PRIMARY_MARKER, PROPERTY_MARKER, Reference,
};
use crate::layout::ModelLayout;

/// Date/time value class used for temporal columns.
pub const DATE_TIME_CLASS: &str = "Nextras\\Dbal\\Utils\\DateTimeImmutable";

/// Collection classes used by relationship properties.
pub const ONE_HAS_MANY_CLASS: &str = "Nextras\\Orm\\Relationships\\OneHasMany";
pub const MANY_HAS_MANY_CLASS: &str = "Nextras\\Orm\\Relationships\\ManyHasMany";

/// A rendered line together with the imports it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub entry: AnnotationEntry,
    pub references: Vec<Reference>,
}

/// Render one column of `table`.
///
/// ```text
/// @property <Type> $<name> [{default <value>}] [{primary}] [{m:1 <Target>(::$<reverse>|, oneSided=true)}]
/// ```
pub fn column_property(table: &Table, column: &Column, layout: &ModelLayout) -> Candidate {
    let foreign = table.foreign(&column.name);
    let is_primary = table.is_primary(&column.name);
    let mut references = Vec::new();

    let mut ty = match foreign {
        Some(fk) => {
            let target = fk.target_entity();
            references.push(layout.entity_class(&target));
            target
        }
        None => {
            if column.column_type.is_temporal() {
                references.push(Reference::new(DATE_TIME_CLASS));
            }
            column.column_type.to_php_type().to_string()
        }
    };
    if column.nullable {
        ty.push_str("|null");
    }

    let mut parts = vec![
        PROPERTY_MARKER.to_string(),
        ty,
        format!("${}", property_name(&column.name, foreign.is_some())),
    ];
    if let Some(default) = &column.default {
        parts.push(format!("{{default {default}}}"));
    }
    if is_primary {
        parts.push(PRIMARY_MARKER.to_string());
    }
    if let Some(fk) = foreign {
        parts.push(many_to_one_modifier(fk));
    }

    // Same precedence as the marker table, so reloading the line yields the same group.
    let category = if is_primary {
        Category::Primary
    } else if foreign.is_none() && column.column_type.is_temporal() {
        Category::Date
    } else if foreign.is_some() {
        Category::ManyToOne
    } else {
        Category::Simple
    };

    Candidate {
        entry: AnnotationEntry::new(category, parts.join(" ")),
        references,
    }
}

fn many_to_one_modifier(fk: &Foreign) -> String {
    let target = fk.target_entity();
    match &fk.reverse_name {
        Some(reverse) => format!("{{{MANY_TO_ONE_MARKER} {target}::${reverse}}}"),
        None => format!("{{{MANY_TO_ONE_MARKER} {target}, oneSided=true}}"),
    }
}

/// Render the collection side of a foreign key held by `source`, to be placed
/// on the entity `foreign` points at.
///
/// ```text
/// @property OneHasMany|<Source>[] $<name> {1:m <Source>::$<key>[, orderBy=<expr>]}
/// ```
pub fn one_to_many_property(source: &Table, foreign: &Foreign, layout: &ModelLayout) -> Candidate {
    let target = source.entity_name();
    let name = foreign
        .reverse_name
        .clone()
        .unwrap_or_else(|| default_collection_name(&source.name));

    let mut modifier = format!(
        "{ONE_TO_MANY_MARKER} {target}::${}",
        foreign.key_property()
    );
    if let Some(order) = &foreign.reverse_order {
        modifier.push_str(&format!(", orderBy={order}"));
    }

    let text = format!("{PROPERTY_MARKER} OneHasMany|{target}[] ${name} {{{modifier}}}");
    Candidate {
        entry: AnnotationEntry::new(Category::OneToMany, text),
        references: vec![
            Reference::new(ONE_HAS_MANY_CLASS),
            layout.entity_class(&target),
        ],
    }
}

/// Render one side of a many-to-many join.
///
/// `from` is the junction key pointing at the entity receiving the property,
/// `to` the key pointing at the other side. `is_main` marks the owning side.
///
/// ```text
/// @property ManyHasMany|<Target>[] $<name> {m:m <Target>[::$<reverse>][, orderBy=<expr>][, isMain=true][, oneSided=true]}
/// ```
pub fn many_to_many_property(
    from: &Foreign,
    to: &Foreign,
    is_main: bool,
    layout: &ModelLayout,
) -> Candidate {
    let target = to.target_entity();
    let name = from
        .reverse_name
        .clone()
        .unwrap_or_else(|| default_collection_name(&to.table));

    let mut modifier = format!("{MANY_TO_MANY_MARKER} {target}");
    if let Some(reverse) = &to.reverse_name {
        modifier.push_str(&format!("::${reverse}"));
    }
    if let Some(order) = &to.reverse_order {
        modifier.push_str(&format!(", orderBy={order}"));
    }
    if is_main {
        modifier.push_str(", isMain=true");
    }
    if to.reverse_name.is_none() {
        modifier.push_str(", oneSided=true");
    }

    let text = format!("{PROPERTY_MARKER} ManyHasMany|{target}[] ${name} {{{modifier}}}");
    Candidate {
        entry: AnnotationEntry::new(Category::ManyToMany, text),
        references: vec![
            Reference::new(MANY_HAS_MANY_CLASS),
            layout.entity_class(&target),
        ],
    }
}

/// Render the registry line exposing a model's repository.
///
/// ```text
/// @property-read <Model>Repository $<model>Repository
/// ```
pub fn repository_property(model: &str, layout: &ModelLayout) -> Candidate {
    let text = format!(
        "{PROPERTY_MARKER}-read {model}Repository ${}Repository",
        lcfirst(model)
    );
    Candidate {
        entry: AnnotationEntry::untagged(text),
        references: vec![layout.repository_class(model)],
    }
}

/// `article_tag` -> `articleTags`.
fn default_collection_name(table: &str) -> String {
    format!("{}s", camelize(table))
}
