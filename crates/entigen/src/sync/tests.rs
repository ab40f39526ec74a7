use super::*;
use entigen_schema::{ColumnType, PrimaryKey};

const REGISTRY: &str = "<?php

declare(strict_types=1);

namespace App\\Model;

use App\\Model\\Article\\ArticleRepository;
use Nextras\\Orm\\Model\\Model;


/**
 * @property-read ArticleRepository $articleRepository
 */
final class Orm extends Model
{
}
";

fn registry_doc(text: &str) -> PhpDocument {
    PhpDocument::parse(text).unwrap()
}

#[test]
fn test_reference_removal_from_str() {
    assert_eq!("drop".parse::<ReferenceRemoval>(), Ok(ReferenceRemoval::Drop));
    assert_eq!("retain-if-used".parse::<ReferenceRemoval>(), Ok(ReferenceRemoval::RetainIfUsed));
    assert!("keep".parse::<ReferenceRemoval>().is_err());
    assert_eq!(ReferenceRemoval::default(), ReferenceRemoval::Drop);
}

#[test]
fn test_mentions() {
    assert!(mentions("@property-read ArticleRepository $x", "ArticleRepository"));
    assert!(!mentions("@property-read MyArticleRepository $x", "ArticleRepository"));
    assert!(!mentions("@property-read ArticleRepositoryV2 $x", "ArticleRepository"));
    assert!(!mentions("@property-read Foo $ArticleRepository", "ArticleRepository"));
    assert!(!mentions(
        "@property-read \\App\\Model\\Article\\ArticleRepository $x",
        "ArticleRepository"
    ));
}

#[test]
fn test_candidates_follow_column_order() {
    let table = Table::new("article")
        .with_column(Column::new("id", ColumnType::Integer))
        .with_column(Column::new("title", ColumnType::String))
        .with_primary_key(PrimaryKey::new(["id"]));
    let sync = Synchronizer::default();
    let lines: Vec<String> = sync
        .candidates(&EntityChange::Columns(&table))
        .into_iter()
        .map(|c| c.entry.text().to_string())
        .collect();
    assert_eq!(
        lines,
        vec!["@property int $id {primary}", "@property string $title"]
    );
    assert!(sync.candidates(&EntityChange::Sort).is_empty());
}

#[test]
fn test_registry_add() {
    let sync = Synchronizer::default();
    let (text, report) = sync.update_registry(REGISTRY, &RegistryChange::Add("Tag")).unwrap();
    assert_eq!(
        report.added_lines,
        vec!["@property-read TagRepository $tagRepository"]
    );
    assert_eq!(
        report.added_references,
        vec![Reference::new("App\\Model\\Tag\\TagRepository")]
    );
    insta::assert_snapshot!(text, @r"
    <?php

    declare(strict_types=1);

    namespace App\Model;

    use App\Model\Article\ArticleRepository;
    use App\Model\Tag\TagRepository;
    use Nextras\Orm\Model\Model;


    /**
     * @property-read ArticleRepository $articleRepository
     * @property-read TagRepository $tagRepository
     */
    final class Orm extends Model
    {
    }
    ");

    let (again, report) = sync.update_registry(&text, &RegistryChange::Add("Tag")).unwrap();
    assert!(report.is_noop());
    assert_eq!(again, text);
}

#[test]
fn test_registry_remove_drops_import() {
    let sync = Synchronizer::default();
    let (text, report) = sync
        .update_registry(REGISTRY, &RegistryChange::Remove("Article"))
        .unwrap();
    assert_eq!(
        report.removed_references,
        vec![Reference::new("App\\Model\\Article\\ArticleRepository")]
    );
    insta::assert_snapshot!(text, @r"
    <?php

    declare(strict_types=1);

    namespace App\Model;

    use Nextras\Orm\Model\Model;


    final class Orm extends Model
    {
    }
    ");
}

#[test]
fn test_registry_remove_unknown_is_noop() {
    let sync = Synchronizer::default();
    let (text, report) = sync
        .update_registry(REGISTRY, &RegistryChange::Remove("Comment"))
        .unwrap();
    assert!(report.is_noop());
    assert_eq!(text, REGISTRY);
}

fn registry_with_second_user() -> PhpDocument {
    let mut doc = registry_doc(REGISTRY);
    doc.set_comment_lines(vec![
        "@property-read ArticleRepository $articleRepository".to_string(),
        "@property-read ArticleRepository $articles".to_string(),
    ]);
    doc
}

#[test]
fn test_registry_remove_still_used_drop() {
    let sync = Synchronizer::default();
    let mut doc = registry_with_second_user();
    let report = sync.apply_registry(&mut doc, &RegistryChange::Remove("Article"));
    assert_eq!(report.removed_references.len(), 1);
    assert!(report.retained_references.is_empty());
    assert!(
        !doc.references()
            .contains(&Reference::new("App\\Model\\Article\\ArticleRepository"))
    );
    assert_eq!(
        doc.comment_lines(),
        vec!["@property-read ArticleRepository $articles"]
    );
}

#[test]
fn test_registry_remove_still_used_retain() {
    let sync = Synchronizer::default().with_removal(ReferenceRemoval::RetainIfUsed);
    let mut doc = registry_with_second_user();
    let report = sync.apply_registry(&mut doc, &RegistryChange::Remove("Article"));
    assert!(report.removed_references.is_empty());
    assert_eq!(
        report.retained_references,
        vec![Reference::new("App\\Model\\Article\\ArticleRepository")]
    );
    assert!(
        doc.references()
            .contains(&Reference::new("App\\Model\\Article\\ArticleRepository"))
    );
}

#[test]
fn test_malformed_source_is_reported() {
    let sync = Synchronizer::default();
    let err = sync
        .update_entity("<?php\n// nothing here\n", &EntityChange::Sort)
        .unwrap_err();
    assert!(matches!(
        err,
        crate::Error::MalformedSource {
            path: None,
            source: crate::source::SourceError::MissingNamespace
        }
    ));
}
