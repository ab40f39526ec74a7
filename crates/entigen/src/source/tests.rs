use super::*;
use crate::annotation::Reference;

const ENTITY: &str = "<?php

declare(strict_types=1);

namespace App\\Model\\Article;

use Nextras\\Orm\\Entity\\Entity;


/**
 * @property int $id {primary}
 *
 * @property string $title
 */
final class Article extends Entity
{
}
";

const BARE: &str = "<?php

declare(strict_types=1);

namespace App\\Model\\Tag;

class Tag extends \\Nextras\\Orm\\Entity\\Entity
{
}
";

fn parse(text: &str) -> PhpDocument {
    PhpDocument::parse(text).unwrap()
}

#[test]
fn test_print_unchanged_is_identity() {
    assert_eq!(parse(ENTITY).print(), ENTITY);
    assert_eq!(parse(BARE).print(), BARE);

    let crlf = ENTITY.replace('\n', "\r\n");
    assert_eq!(parse(&crlf).print(), crlf);
}

#[test]
fn test_locates_parts() {
    let doc = parse(ENTITY);
    assert_eq!(doc.namespace(), "App\\Model\\Article");
    assert_eq!(doc.class_name(), "Article");
    assert_eq!(
        doc.comment_lines(),
        vec!["@property int $id {primary}", "", "@property string $title"]
    );
    assert_eq!(
        doc.references(),
        vec![Reference::new("Nextras\\Orm\\Entity\\Entity")]
    );
}

#[test]
fn test_no_doc_block() {
    let doc = parse(BARE);
    assert!(doc.comment_lines().is_empty());
    assert!(doc.references().is_empty());
}

#[test]
fn test_set_comment_lines_replaces_block() {
    let mut doc = parse(ENTITY);
    doc.set_comment_lines(vec![
        "@property int $id {primary}".to_string(),
        String::new(),
        "@property string $body".to_string(),
        "@property string $title".to_string(),
    ]);
    insta::assert_snapshot!(doc.print(), @r"
    <?php

    declare(strict_types=1);

    namespace App\Model\Article;

    use Nextras\Orm\Entity\Entity;


    /**
     * @property int $id {primary}
     *
     * @property string $body
     * @property string $title
     */
    final class Article extends Entity
    {
    }
    ");
}

#[test]
fn test_set_comment_lines_creates_block() {
    let mut doc = parse(BARE);
    doc.set_comment_lines(vec!["@property int $id {primary}".to_string()]);
    insta::assert_snapshot!(doc.print(), @r"
    <?php

    declare(strict_types=1);

    namespace App\Model\Tag;

    /**
     * @property int $id {primary}
     */
    class Tag extends \Nextras\Orm\Entity\Entity
    {
    }
    ");
    assert_eq!(doc.comment_lines(), vec!["@property int $id {primary}"]);
}

#[test]
fn test_block_goes_above_attributes() {
    let text = "<?php\nnamespace App;\n\n#[Attribute]\nclass Foo\n{\n}\n";
    let mut doc = parse(text);
    doc.set_comment_lines(vec!["@property int $id".to_string()]);
    assert_eq!(
        doc.print(),
        "<?php\nnamespace App;\n\n/**\n * @property int $id\n */\n#[Attribute]\nclass Foo\n{\n}\n"
    );

    // and is found again through the attribute
    let reparsed = parse(&doc.print());
    assert_eq!(reparsed.comment_lines(), vec!["@property int $id"]);
}

#[test]
fn test_setting_same_lines_keeps_bytes() {
    let text = "<?php\nnamespace App;\n/** @property int $id */\nclass Foo {}\n";
    let mut doc = parse(text);
    assert_eq!(doc.comment_lines(), vec!["@property int $id"]);
    doc.set_comment_lines(vec!["@property int $id".to_string()]);
    assert_eq!(doc.print(), text);
}

#[test]
fn test_add_reference_sorted() {
    let mut doc = parse(ENTITY);
    assert!(doc.add_reference(&Reference::new("App\\Model\\User\\User")));
    assert!(doc.add_reference(&Reference::new("Nextras\\Orm\\Relationships\\OneHasMany")));
    assert!(!doc.add_reference(&Reference::new("App\\Model\\User\\User")));

    let printed = doc.print();
    assert!(printed.contains(
        "use App\\Model\\User\\User;\nuse Nextras\\Orm\\Entity\\Entity;\nuse Nextras\\Orm\\Relationships\\OneHasMany;\n"
    ));
    assert_eq!(
        doc.references(),
        vec![
            Reference::new("App\\Model\\User\\User"),
            Reference::new("Nextras\\Orm\\Entity\\Entity"),
            Reference::new("Nextras\\Orm\\Relationships\\OneHasMany"),
        ]
    );
}

#[test]
fn test_add_reference_without_imports() {
    let mut doc = parse(BARE);
    assert!(doc.add_reference(&Reference::new("App\\Model\\Article\\Article")));
    insta::assert_snapshot!(doc.print(), @r"
    <?php

    declare(strict_types=1);

    namespace App\Model\Tag;

    use App\Model\Article\Article;

    class Tag extends \Nextras\Orm\Entity\Entity
    {
    }
    ");
}

#[test]
fn test_own_namespace_is_not_imported() {
    let mut doc = parse(BARE);
    assert!(!doc.add_reference(&Reference::new("App\\Model\\Tag\\TagRepository")));
    assert_eq!(doc.print(), BARE);
}

#[test]
fn test_remove_reference() {
    let mut doc = parse(BARE);
    let article = Reference::new("App\\Model\\Article\\Article");
    doc.add_reference(&article);
    assert!(doc.remove_reference(&article));
    assert!(!doc.remove_reference(&article));
    assert_eq!(doc.print(), BARE);
}

#[test]
fn test_edits_keep_positions_consistent() {
    let mut doc = parse(BARE);
    doc.add_reference(&Reference::new("App\\Model\\User\\User"));
    doc.set_comment_lines(vec!["@property User $author".to_string()]);
    doc.add_reference(&Reference::new("App\\Model\\Article\\Article"));
    doc.set_comment_lines(vec![
        "@property Article $article".to_string(),
        "@property User $author".to_string(),
    ]);

    let reparsed = parse(&doc.print());
    assert_eq!(
        reparsed.comment_lines(),
        vec!["@property Article $article", "@property User $author"]
    );
    assert_eq!(reparsed.references(), doc.references());
    assert!(doc.print().ends_with(" */\nclass Tag extends \\Nextras\\Orm\\Entity\\Entity\n{\n}\n"));
}

#[test]
fn test_use_alias_and_trait_use() {
    let text = "<?php
namespace App\\Model;

use Nextras\\Orm\\Model\\Model as BaseModel;

class Orm extends BaseModel
{
    use SomeTrait;
}
";
    let doc = parse(text);
    assert_eq!(doc.references(), vec![Reference::new("Nextras\\Orm\\Model\\Model")]);
}

#[test]
fn test_ignores_commented_out_code() {
    let text = "<?php
namespace App;

/*
class Old {}
*/
// class Older {}
class Foo {}
";
    assert_eq!(parse(text).class_name(), "Foo");
}

#[test]
fn test_block_separated_by_blank_line_is_reused() {
    let text = "<?php
namespace App\\Model\\Article;

/**
 * @property int $id {primary}
 */

class Article
{
}
";
    let mut doc = parse(text);
    assert_eq!(doc.comment_lines(), vec!["@property int $id {primary}"]);

    doc.set_comment_lines(vec![
        "@property int $id {primary}".to_string(),
        String::new(),
        "@property string $title".to_string(),
    ]);
    let printed = doc.print();
    assert_eq!(printed.matches("/**").count(), 1);
    assert_eq!(
        printed,
        "<?php
namespace App\\Model\\Article;

/**
 * @property int $id {primary}
 *
 * @property string $title
 */

class Article
{
}
"
    );
}

#[test]
fn test_braces_in_strings_do_not_shift_depth() {
    let text = "<?php
namespace App;

const OPEN = '{';
const QUOTED = \"\\\"{\";

class Foo
{
\tpublic function close(): string
\t{
\t\treturn '}';
\t}
}
";
    let doc = parse(text);
    assert_eq!(doc.class_name(), "Foo");
    assert_eq!(doc.print(), text);
}

#[test]
fn test_shape_errors() {
    assert_eq!(
        PhpDocument::parse("<?php\nclass Foo {}\n").unwrap_err(),
        SourceError::MissingNamespace
    );
    assert_eq!(
        PhpDocument::parse("<?php\nnamespace A;\nnamespace B;\nclass Foo {}\n").unwrap_err(),
        SourceError::MultipleNamespaces { count: 2 }
    );
    assert_eq!(
        PhpDocument::parse("<?php\nnamespace A;\n").unwrap_err(),
        SourceError::MissingClass
    );
    assert_eq!(
        PhpDocument::parse("<?php\nnamespace A;\nclass Foo {}\nclass Bar {}\n").unwrap_err(),
        SourceError::MultipleClasses { count: 2 }
    );
    assert_eq!(
        PhpDocument::parse("<?php\nnamespace A;\n/**\n * @property int $id\nclass Foo {}\n")
            .unwrap_err(),
        SourceError::UnterminatedComment { line: 3 }
    );
}
