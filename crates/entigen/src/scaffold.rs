//! Templates for freshly created model and service files.
//!
//! Files are assembled from a small PHP syntax tree ([`PhpFile`], [`PhpClass`],
//! [`PhpMethod`]) and printed with tab indentation, so every generated file has
//! the same shape the synchronizer later parses.

use std::collections::BTreeSet;
use std::fmt::{self, Write};

use entigen_schema::underscore;

use crate::annotation::Reference;
use crate::layout::ModelLayout;

pub const DEFAULT_BASE_ENTITY: &str = "Nextras\\Orm\\Entity\\Entity";
pub const DEFAULT_BASE_MAPPER: &str = "Nextras\\Orm\\Mapper\\Mapper";
pub const DEFAULT_BASE_REPOSITORY: &str = "Nextras\\Orm\\Repository\\Repository";

const CONVENTIONS_INTERFACE: &str = "Nextras\\Orm\\Mapper\\Dbal\\Conventions\\IConventions";
const CONVENTIONS_BASE: &str = "Nextras\\Orm\\Mapper\\Dbal\\Conventions\\Conventions";

/// Base classes generated model classes extend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseClasses {
    pub entity: Reference,
    pub mapper: Reference,
    pub repository: Reference,
}

impl Default for BaseClasses {
    fn default() -> Self {
        Self {
            entity: Reference::new(DEFAULT_BASE_ENTITY),
            mapper: Reference::new(DEFAULT_BASE_MAPPER),
            repository: Reference::new(DEFAULT_BASE_REPOSITORY),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
}

impl Visibility {
    fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
        }
    }
}

/// One method of a generated class.
#[derive(Debug, Clone)]
pub struct PhpMethod {
    name: String,
    visibility: Visibility,
    is_static: bool,
    return_type: Option<String>,
    body: Vec<String>,
}

impl PhpMethod {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_static: false,
            return_type: None,
            body: Vec::new(),
        }
    }

    pub fn vis(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn set_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn ret(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    /// Set the body; each line is indented one level inside the method.
    pub fn body(mut self, code: &str) -> Self {
        self.body = code.lines().map(str::to_string).collect();
        self
    }

    fn fmt_into(&self, out: &mut String) -> fmt::Result {
        write!(out, "\t{} ", self.visibility.as_str())?;
        if self.is_static {
            out.push_str("static ");
        }
        write!(out, "function {}()", self.name)?;
        if let Some(ty) = &self.return_type {
            write!(out, ": {ty}")?;
        }
        out.push_str("\n\t{\n");
        for line in &self.body {
            if line.is_empty() {
                out.push('\n');
            } else {
                writeln!(out, "\t\t{line}")?;
            }
        }
        out.push_str("\t}\n");
        Ok(())
    }
}

/// A generated class.
#[derive(Debug, Clone)]
pub struct PhpClass {
    name: String,
    extends: Option<Reference>,
    methods: Vec<PhpMethod>,
}

impl PhpClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: None,
            methods: Vec::new(),
        }
    }

    pub fn extends(mut self, base: &Reference) -> Self {
        self.extends = Some(base.clone());
        self
    }

    pub fn method(mut self, method: PhpMethod) -> Self {
        self.methods.push(method);
        self
    }
}

/// A generated file: one namespace, its imports and one class.
#[derive(Debug, Clone)]
pub struct PhpFile {
    namespace: String,
    uses: BTreeSet<Reference>,
    class: PhpClass,
}

impl PhpFile {
    /// A file holding `class`; its base class is imported automatically.
    pub fn new(namespace: impl Into<String>, class: PhpClass) -> Self {
        let mut file = Self {
            namespace: namespace.into(),
            uses: BTreeSet::new(),
            class,
        };
        if let Some(base) = file.class.extends.clone() {
            file.import(base);
        }
        file
    }

    pub fn with_use(mut self, reference: Reference) -> Self {
        self.import(reference);
        self
    }

    fn import(&mut self, reference: Reference) {
        if reference.namespace() != self.namespace {
            self.uses.insert(reference);
        }
    }

    pub fn print(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PhpFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        out.push_str("<?php\n\ndeclare(strict_types=1);\n\n");
        writeln!(out, "namespace {};\n", self.namespace)?;
        for reference in &self.uses {
            writeln!(out, "use {reference};")?;
        }
        if !self.uses.is_empty() {
            out.push_str("\n\n");
        }

        write!(out, "class {}", self.class.name)?;
        if let Some(base) = &self.class.extends {
            write!(out, " extends {}", base.short_name())?;
        }
        out.push_str("\n{\n");
        for (i, method) in self.class.methods.iter().enumerate() {
            if i > 0 {
                out.push_str("\n\n");
            }
            method.fmt_into(&mut out)?;
        }
        out.push_str("}\n");
        f.write_str(&out)
    }
}

/// `<Name>.php`: the entity class, with no properties yet.
pub fn entity_file(model: &str, layout: &ModelLayout, bases: &BaseClasses) -> PhpFile {
    PhpFile::new(
        layout.model_namespace(model),
        PhpClass::new(model).extends(&bases.entity),
    )
}

/// `<Name>Mapper.php`: maps the entity to its snake_case table.
pub fn mapper_file(
    model: &str,
    layout: &ModelLayout,
    bases: &BaseClasses,
    with_conventions: bool,
) -> PhpFile {
    let mut class = PhpClass::new(format!("{model}Mapper"))
        .extends(&bases.mapper)
        .method(
            PhpMethod::new("getTableName")
                .ret("string")
                .body(&format!("return '{}';", underscore(model))),
        );
    if !with_conventions {
        return PhpFile::new(layout.model_namespace(model), class);
    }

    let interface = Reference::new(CONVENTIONS_INTERFACE);
    class = class.method(
        PhpMethod::new("createConventions")
            .vis(Visibility::Protected)
            .ret(interface.short_name())
            .body(&format!(
                "return new {model}Conventions(
\t$this->createInflector(),
\t$this->connection,
\t$this->getTableName(),
\t$this->getRepository()->getEntityMetadata(),
\t$this->cache,
);"
            )),
    );
    PhpFile::new(layout.model_namespace(model), class).with_use(interface)
}

/// `<Name>Repository.php`: declares the entity class it serves.
pub fn repository_file(model: &str, layout: &ModelLayout, bases: &BaseClasses) -> PhpFile {
    PhpFile::new(
        layout.model_namespace(model),
        PhpClass::new(format!("{model}Repository"))
            .extends(&bases.repository)
            .method(
                PhpMethod::new("getEntityClassNames")
                    .set_static()
                    .ret("array")
                    .body(&format!("return [{model}::class];")),
            ),
    )
}

/// `<Name>Conventions.php`: empty storage mapping overrides.
pub fn conventions_file(model: &str, layout: &ModelLayout) -> PhpFile {
    PhpFile::new(
        layout.model_namespace(model),
        PhpClass::new(format!("{model}Conventions"))
            .extends(&Reference::new(CONVENTIONS_BASE))
            .method(
                PhpMethod::new("getStoragePrimaryKey")
                    .ret("array")
                    .body("return [];"),
            )
            .method(
                PhpMethod::new("getDefaultMappings")
                    .ret("array")
                    .body("return [\n\t[],\n\t[],\n\t[],\n];"),
            ),
    )
}

/// `Lib/<Name>.php`: a service class with an empty constructor.
pub fn service_file(name: &str, layout: &ModelLayout) -> PhpFile {
    PhpFile::new(
        layout.service_namespace(),
        PhpClass::new(name).method(PhpMethod::new("__construct")),
    )
}
